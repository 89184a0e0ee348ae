//! DHAV frame format: header layout and packed date codec

pub mod date;
pub mod header;

pub use date::{DateError, PackedDate};
pub use header::{parse_frame, Frame, FrameHeader, ParseError, HEADER_LEN, MAGIC};
