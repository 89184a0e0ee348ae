//! Scan progress and ETA reporting

use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Tracks how far the scan has got and logs a throttled ETA line
pub struct Progress {
    started: Instant,
    last_report: Option<Instant>,
    interval: Duration,
    /// Absolute offset of the first mapped byte
    base_offset: u64,
    /// Mapped bytes to scan
    region_len: u64,
}

impl Progress {
    pub fn new(base_offset: u64, region_len: usize, interval: Duration) -> Self {
        Self {
            started: Instant::now(),
            last_report: None,
            interval,
            base_offset,
            region_len: region_len as u64,
        }
    }

    /// Total input size as seen from the mapping
    pub fn total(&self) -> u64 {
        self.base_offset + self.region_len
    }

    /// Record a signature at region offset `offset`
    pub fn update(&mut self, offset: usize) {
        let absolute = self.base_offset + offset as u64;
        let percent = percent(absolute, self.total());
        debug!("Found DHAV frame at offset {}/{} ({}%)", absolute, self.total(), percent);

        let due = self
            .last_report
            .map_or(true, |last| last.elapsed() >= self.interval);
        if !due {
            return;
        }

        let eta = estimate_remaining(offset as u64, self.region_len, self.started.elapsed());
        info!(
            "Scanning offset {}/{} ({}%) ETA:{}",
            absolute,
            self.total(),
            percent,
            format_eta(eta)
        );
        self.last_report = Some(Instant::now());
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Linear extrapolation of the remaining scan time from the rate so far.
///
/// `None` when nothing has been scanned yet or no time has passed.
pub fn estimate_remaining(scanned: u64, total: u64, elapsed: Duration) -> Option<Duration> {
    let secs = elapsed.as_secs_f64();
    if scanned == 0 || secs <= 0.0 {
        return None;
    }
    let rate = scanned as f64 / secs;
    let remaining = total.saturating_sub(scanned) as f64 / rate;
    Some(Duration::from_secs_f64(remaining))
}

/// `H:MM:SS`, or `N/A` without an estimate
pub fn format_eta(eta: Option<Duration>) -> String {
    match eta {
        Some(eta) => {
            let secs = eta.as_secs();
            format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
        }
        None => "N/A".to_string(),
    }
}

fn percent(done: u64, total: u64) -> u64 {
    if total == 0 {
        100
    } else {
        (done as u128 * 100 / total as u128) as u64
    }
}
