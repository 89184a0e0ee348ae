//! Scan / parse / group / export pipeline
//!
//! 1. Find the next DHAV signature at or after the cursor
//! 2. Close the buffered run if the signature lies past the cursor
//! 3. Parse the header and take the declared frame span
//! 4. Frames with a valid date join the run and get a CSV row; frames
//!    with an invalid date only advance the cursor
//! 5. Flush whatever is buffered when no signature is left

mod scanner;
mod segment;
mod window;

pub use scanner::SignatureScanner;
pub use segment::{DatedFrame, RunAccumulator, Segment};
pub use window::TimeWindow;

use anyhow::Result;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::dhav::{parse_frame, MAGIC};
use crate::output::{ExportOutcome, Exporter, MetadataSink};
use crate::progress::Progress;

/// Counters for one carving pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CarveStats {
    pub signatures_found: u64,
    pub frames_accepted: u64,
    pub invalid_dates: u64,
    pub rejected_reads: u64,
    pub segments_flushed: u64,
    pub segments_exported: u64,
    pub segments_filtered: u64,
    pub segments_dry_run: u64,
    pub bytes_written: u64,
}

impl CarveStats {
    pub fn summary(&self) -> String {
        format!(
            "signatures={} frames={} invalid_dates={} rejected={} segments={} exported={} filtered={} dry_run={} bytes_written={}",
            self.signatures_found,
            self.frames_accepted,
            self.invalid_dates,
            self.rejected_reads,
            self.segments_flushed,
            self.segments_exported,
            self.segments_filtered,
            self.segments_dry_run,
            self.bytes_written
        )
    }
}

/// Result of a completed pass: counters plus the flushed CSV writers
pub struct CarveOutput<W> {
    pub stats: CarveStats,
    pub tables: Option<(W, Option<W>)>,
}

pub struct Carver<'a, W: Write> {
    region: &'a [u8],
    base_offset: u64,
    exporter: Exporter,
    metadata: Option<MetadataSink<W>>,
    progress: Progress,
    stats: CarveStats,
}

impl<'a, W: Write> Carver<'a, W> {
    /// `region` is the mapped input; `base_offset` is the absolute file
    /// position of its first byte.
    pub fn new(
        region: &'a [u8],
        base_offset: u64,
        exporter: Exporter,
        metadata: Option<MetadataSink<W>>,
    ) -> Self {
        Self {
            region,
            base_offset,
            exporter,
            metadata,
            progress: Progress::new(base_offset, region.len(), Duration::from_secs(5)),
            stats: CarveStats::default(),
        }
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress = Progress::new(self.base_offset, self.region.len(), interval);
        self
    }

    pub fn run(mut self) -> Result<CarveOutput<W>> {
        let region = self.region;
        let mut scanner = SignatureScanner::new(region);
        let mut runs = RunAccumulator::new(scanner.cursor());

        while let Some(hit) = scanner.next() {
            self.stats.signatures_found += 1;
            self.progress.update(hit);

            if let Some(segment) = runs.observe(hit) {
                self.flush(segment)?;
            }

            match parse_frame(region, hit, self.base_offset) {
                Ok(frame) => match frame.header.date.decode() {
                    Ok(timestamp) => {
                        let dated = DatedFrame { frame, timestamp };
                        if let Some(sink) = self.metadata.as_mut() {
                            sink.record(&dated)?;
                        }
                        self.stats.frames_accepted += 1;
                        runs.push(hit, dated);
                    }
                    Err(e) => {
                        debug!("Illegal date at offset {}: {} header={:?}", frame.offset, e, frame.header);
                        self.stats.invalid_dates += 1;
                        runs.skip(hit, frame.span());
                    }
                },
                Err(e) => {
                    warn!("Rejected frame at offset {}: {}", self.base_offset + hit as u64, e);
                    self.stats.rejected_reads += 1;
                    // The bytes at `hit` belong to no frame, so nothing after
                    // them is adjacent to the buffered run.
                    if let Some(segment) = runs.take() {
                        self.flush(segment)?;
                    }
                    runs.skip(hit, MAGIC.len());
                }
            }

            scanner.advance_to(runs.cursor());
        }

        if let Some(segment) = runs.finish() {
            self.flush(segment)?;
        }

        debug!("Scan finished in {:?}", self.progress.elapsed());

        let tables = match self.metadata {
            Some(sink) => {
                debug!("Frame tables: {} rows, {} selected", sink.rows(), sink.selected_rows());
                Some(sink.finish()?)
            }
            None => None,
        };

        Ok(CarveOutput {
            stats: self.stats,
            tables,
        })
    }

    fn flush(&mut self, segment: Segment<'a>) -> Result<()> {
        self.stats.segments_flushed += 1;
        match self.exporter.export(&segment)? {
            ExportOutcome::Written { path, bytes } => {
                trace!("Segment {} -> {}", segment.offset(), path.display());
                self.stats.segments_exported += 1;
                self.stats.bytes_written += bytes;
            }
            ExportOutcome::Filtered => self.stats.segments_filtered += 1,
            ExportOutcome::DryRun => self.stats.segments_dry_run += 1,
        }
        Ok(())
    }
}
