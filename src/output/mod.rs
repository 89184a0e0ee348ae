//! Carved output: container files and CSV frame tables

pub mod exporter;
pub mod metadata;

pub use exporter::{ExportOutcome, Exporter};
pub use metadata::MetadataSink;
