//! Container export: one `.dav` file per accepted segment

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::carve::{Segment, TimeWindow};
use crate::dhav::date::format_compact;

/// Subdirectory of the output directory that receives container files
pub const VIDEO_DIR: &str = "video";

/// What happened to a flushed segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written { path: PathBuf, bytes: u64 },
    /// First frame fell outside the time window
    Filtered,
    /// Accepted, but nothing written in dry-run mode
    DryRun,
}

pub struct Exporter {
    video_dir: PathBuf,
    window: TimeWindow,
    dry_run: bool,
}

impl Exporter {
    /// Prepare `<output_dir>/video`. The directory is only created when
    /// files will actually be written.
    pub fn new(output_dir: &Path, window: TimeWindow, dry_run: bool) -> Result<Self> {
        let video_dir = output_dir.join(VIDEO_DIR);
        if !dry_run {
            fs::create_dir_all(&video_dir)
                .with_context(|| format!("Failed to create output directory {}", video_dir.display()))?;
        }

        Ok(Self {
            video_dir,
            window,
            dry_run,
        })
    }

    /// `NVR_<channel>_main_<first>_<last>.dav`
    pub fn file_name(segment: &Segment<'_>) -> String {
        format!(
            "NVR_{}_main_{}_{}.dav",
            segment.channel(),
            format_compact(&segment.first().timestamp),
            format_compact(&segment.last().timestamp)
        )
    }

    /// Filter on the first frame's timestamp only, then write the
    /// concatenated frame spans unless this is a dry run.
    pub fn export(&self, segment: &Segment<'_>) -> Result<ExportOutcome> {
        if !self.window.accepts(&segment.first().timestamp) {
            debug!(
                "Segment at offset {} ({} frames) starts at {}, outside time window",
                segment.offset(),
                segment.frame_count(),
                segment.first().timestamp
            );
            return Ok(ExportOutcome::Filtered);
        }

        if self.dry_run {
            info!(
                "[dry run] Would write {} ({} frames, {} bytes)",
                Self::file_name(segment),
                segment.frame_count(),
                segment.byte_len()
            );
            return Ok(ExportOutcome::DryRun);
        }

        let path = self.video_dir.join(Self::file_name(segment));
        let bytes = write_segment(&path, segment)?;
        info!(
            "Wrote {} ({} frames, {} bytes, offset {})",
            path.display(),
            segment.frame_count(),
            bytes,
            segment.offset()
        );

        Ok(ExportOutcome::Written { path, bytes })
    }
}

fn write_segment(path: &Path, segment: &Segment<'_>) -> Result<u64> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let mut bytes = 0u64;

    for dated in segment.frames() {
        writer
            .write_all(dated.frame.data)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        bytes += dated.frame.span() as u64;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;

    Ok(bytes)
}
