//! DHAV Carver - recovers NVR video frames from raw images
//!
//! Scans a disk image (or unallocated space dump) for DHAV frame headers,
//! joins byte-adjacent frames into runs and writes each run back out as a
//! playable `.dav` container, optionally with CSV tables of every frame.
//!
//! The library crate exposes the pipeline for the binary and for
//! integration tests.

pub mod carve;
pub mod config;
pub mod dhav;
pub mod input;
pub mod output;
pub mod progress;
