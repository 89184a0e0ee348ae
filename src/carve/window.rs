//! Inclusive time-window filter

use chrono::NaiveDateTime;

/// Optional `[start, stop]` bounds; an absent bound disables that side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeWindow {
    pub start: Option<NaiveDateTime>,
    pub stop: Option<NaiveDateTime>,
}

impl TimeWindow {
    pub fn new(start: Option<NaiveDateTime>, stop: Option<NaiveDateTime>) -> Self {
        Self { start, stop }
    }

    /// True when at least one bound is set
    pub fn is_configured(&self) -> bool {
        self.start.is_some() || self.stop.is_some()
    }

    pub fn accepts(&self, timestamp: &NaiveDateTime) -> bool {
        if matches!(self.start, Some(start) if *timestamp < start) {
            return false;
        }
        if matches!(self.stop, Some(stop) if *timestamp > stop) {
            return false;
        }
        true
    }
}
