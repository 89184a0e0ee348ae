//! Packed DHAV date codec
//!
//! Frame headers carry their wall-clock time as a 32-bit little-endian word
//! with the calendar fields packed least-significant first:
//!
//! | bits  | field              |
//! |-------|--------------------|
//! | 0-5   | seconds            |
//! | 6-11  | minutes            |
//! | 12-16 | hours              |
//! | 17-21 | day                |
//! | 22-25 | month              |
//! | 26-31 | year - 2000        |

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use thiserror::Error;

const SECOND_SHIFT: u32 = 0;
const MINUTE_SHIFT: u32 = 6;
const HOUR_SHIFT: u32 = 12;
const DAY_SHIFT: u32 = 17;
const MONTH_SHIFT: u32 = 22;
const YEAR_SHIFT: u32 = 26;

const SIX_BITS: u32 = 0x3F;
const FIVE_BITS: u32 = 0x1F;
const FOUR_BITS: u32 = 0x0F;

/// First year representable by the 6-bit year offset
pub const EPOCH_YEAR: i32 = 2000;

/// Last year representable by the 6-bit year offset
pub const LAST_YEAR: i32 = EPOCH_YEAR + SIX_BITS as i32;

/// Compact timestamp layout used in file names and on the command line
pub const COMPACT_FORMAT: &str = "%Y%m%d%H%M%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("invalid calendar fields in packed date {raw:#010x} ({fields})")]
    InvalidFields { raw: u32, fields: DateFields },

    #[error("timestamp {0} is outside the packed date range 2000-2063")]
    OutOfRange(NaiveDateTime),
}

/// Raw sub-fields of a packed date, before any calendar validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFields {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl std::fmt::Display for DateFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Bit-packed date word as stored in a frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PackedDate(pub u32);

impl PackedDate {
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Split the word into its sub-fields without validating them
    pub fn fields(self) -> DateFields {
        let raw = self.0;
        DateFields {
            second: (raw >> SECOND_SHIFT) & SIX_BITS,
            minute: (raw >> MINUTE_SHIFT) & SIX_BITS,
            hour: (raw >> HOUR_SHIFT) & FIVE_BITS,
            day: (raw >> DAY_SHIFT) & FIVE_BITS,
            month: (raw >> MONTH_SHIFT) & FOUR_BITS,
            year: ((raw >> YEAR_SHIFT) & SIX_BITS) as i32 + EPOCH_YEAR,
        }
    }

    /// Decode into a calendar timestamp.
    ///
    /// Fails when any field is outside its calendar range (month 0 or 13,
    /// day 0, hour 24, second 60, Feb 30, ...).
    pub fn decode(self) -> Result<NaiveDateTime, DateError> {
        let fields = self.fields();
        NaiveDate::from_ymd_opt(fields.year, fields.month, fields.day)
            .and_then(|date| date.and_hms_opt(fields.hour, fields.minute, fields.second))
            .ok_or(DateError::InvalidFields {
                raw: self.0,
                fields,
            })
    }

    /// Encode a calendar timestamp. Sub-second precision is discarded.
    pub fn encode(timestamp: &NaiveDateTime) -> Result<Self, DateError> {
        let year = timestamp.year();
        if !(EPOCH_YEAR..=LAST_YEAR).contains(&year) {
            return Err(DateError::OutOfRange(*timestamp));
        }

        // Leap seconds are carried by chrono in the nanosecond field, so
        // `second()` is always 0-59 here.
        let raw = ((year - EPOCH_YEAR) as u32) << YEAR_SHIFT
            | timestamp.month() << MONTH_SHIFT
            | timestamp.day() << DAY_SHIFT
            | timestamp.hour() << HOUR_SHIFT
            | timestamp.minute() << MINUTE_SHIFT
            | timestamp.second() << SECOND_SHIFT;

        Ok(Self(raw))
    }
}

/// Format a timestamp as `YYYYMMDDHHMMSS`
pub fn format_compact(timestamp: &NaiveDateTime) -> String {
    timestamp.format(COMPACT_FORMAT).to_string()
}

/// Parse a `YYYYMMDDHHMMSS` timestamp
pub fn parse_compact(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s.trim(), COMPACT_FORMAT)
}
