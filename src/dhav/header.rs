//! DHAV frame header parser
//!
//! Header layout (22 bytes, little-endian):
//!
//! | offset | size | field            |
//! |--------|------|------------------|
//! | 0      | 4    | signature "DHAV" |
//! | 4      | 1    | type             |
//! | 5      | 1    | subtype          |
//! | 6      | 1    | channel          |
//! | 7      | 1    | frame subnumber  |
//! | 8      | 4    | frame number     |
//! | 12     | 4    | frame length     |
//! | 16     | 4    | packed date      |
//! | 20     | 2    | extra timestamp  |
//!
//! `frame_length` counts the whole frame including this header.

use thiserror::Error;

use super::date::PackedDate;

/// Frame signature
pub const MAGIC: &[u8; 4] = b"DHAV";

/// Fixed header size in bytes
pub const HEADER_LEN: usize = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no DHAV signature at offset {offset}")]
    MissingSignature { offset: usize },

    #[error("truncated header at offset {offset}: {available} of 22 bytes available")]
    TruncatedHeader { offset: usize, available: usize },

    #[error("frame length {frame_length} at offset {offset} is shorter than the header")]
    FrameTooShort { offset: usize, frame_length: u32 },

    #[error("frame length {frame_length} at offset {offset} overruns the region by {overrun} bytes")]
    FrameOverrun {
        offset: usize,
        frame_length: u32,
        overrun: usize,
    },
}

/// Decoded fixed-size header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameHeader {
    pub frame_type: u8,
    pub subtype: u8,
    pub channel: u8,
    pub frame_subnumber: u8,
    pub frame_number: u32,
    pub frame_length: u32,
    pub date: PackedDate,
    pub extra_timestamp: u16,
}

impl FrameHeader {
    /// Decode the header fields from the first [`HEADER_LEN`] bytes of `buf`.
    ///
    /// The signature is checked; the declared length is not.
    pub fn read(buf: &[u8]) -> Result<Self, ParseError> {
        if buf.len() < HEADER_LEN {
            return Err(ParseError::TruncatedHeader {
                offset: 0,
                available: buf.len(),
            });
        }
        if &buf[0..4] != MAGIC {
            return Err(ParseError::MissingSignature { offset: 0 });
        }

        Ok(Self {
            frame_type: buf[4],
            subtype: buf[5],
            channel: buf[6],
            frame_subnumber: buf[7],
            frame_number: read_u32_le(buf, 8),
            frame_length: read_u32_le(buf, 12),
            date: PackedDate(read_u32_le(buf, 16)),
            extra_timestamp: u16::from_le_bytes([buf[20], buf[21]]),
        })
    }

    /// Encode the header, signature included
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(MAGIC);
        out[4] = self.frame_type;
        out[5] = self.subtype;
        out[6] = self.channel;
        out[7] = self.frame_subnumber;
        out[8..12].copy_from_slice(&self.frame_number.to_le_bytes());
        out[12..16].copy_from_slice(&self.frame_length.to_le_bytes());
        out[16..20].copy_from_slice(&self.date.raw().to_le_bytes());
        out[20..22].copy_from_slice(&self.extra_timestamp.to_le_bytes());
        out
    }

    /// Type code as two lower-case hex digits
    pub fn type_hex(&self) -> String {
        hex::encode([self.frame_type])
    }

    /// Subtype code as two lower-case hex digits
    pub fn subtype_hex(&self) -> String {
        hex::encode([self.subtype])
    }
}

/// One carved frame, borrowing its raw bytes from the scanned region
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub header: FrameHeader,
    /// Absolute offset of the signature within the input file
    pub offset: u64,
    /// `[offset, offset + frame_length)`: header and payload, verbatim
    pub data: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Declared span in bytes
    pub fn span(&self) -> usize {
        self.data.len()
    }
}

/// Parse the frame whose signature starts at `offset` within `region`.
///
/// `base_offset` is the absolute file position of `region[0]`. The full
/// declared span must lie inside the region; nothing is truncated.
pub fn parse_frame(region: &[u8], offset: usize, base_offset: u64) -> Result<Frame<'_>, ParseError> {
    let available = region.len().saturating_sub(offset);
    let header = FrameHeader::read(region.get(offset..).unwrap_or_default()).map_err(|e| match e {
        ParseError::TruncatedHeader { .. } => ParseError::TruncatedHeader { offset, available },
        ParseError::MissingSignature { .. } => ParseError::MissingSignature { offset },
        other => other,
    })?;

    let frame_length = header.frame_length;
    let span = frame_length as usize;
    if span < HEADER_LEN {
        return Err(ParseError::FrameTooShort { offset, frame_length });
    }
    if span > available {
        return Err(ParseError::FrameOverrun {
            offset,
            frame_length,
            overrun: span - available,
        });
    }

    Ok(Frame {
        header,
        offset: base_offset + offset as u64,
        data: &region[offset..offset + span],
    })
}

fn read_u32_le(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}
