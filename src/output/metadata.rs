//! CSV frame tables
//!
//! `found_all.csv` gets a row for every frame with a valid date.
//! `found_selection.csv` exists only when a time window is set and gets the
//! rows whose own timestamp is inside it, independent of how the frame's
//! segment was judged at export.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::carve::{DatedFrame, TimeWindow};

pub const ALL_FRAMES_FILE: &str = "found_all.csv";
pub const SELECTION_FILE: &str = "found_selection.csv";

pub const CSV_HEADER: &str =
    "timestamp,offset,type,subtype,channel,frame_number,frame_subnumber,frame_length,extra_timestamp";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct MetadataSink<W: Write> {
    all: W,
    selection: Option<W>,
    window: TimeWindow,
    rows: u64,
    selected_rows: u64,
}

impl MetadataSink<BufWriter<File>> {
    /// Create the table files under `output_dir` and write their headers
    pub fn create(output_dir: &Path, window: TimeWindow) -> Result<Self> {
        let all = create_table(&output_dir.join(ALL_FRAMES_FILE))?;
        let selection = if window.is_configured() {
            Some(create_table(&output_dir.join(SELECTION_FILE))?)
        } else {
            None
        };
        Self::new(all, selection, window)
    }
}

impl<W: Write> MetadataSink<W> {
    pub fn new(mut all: W, mut selection: Option<W>, window: TimeWindow) -> Result<Self> {
        writeln!(all, "{CSV_HEADER}").context("Failed to write CSV header")?;
        if let Some(selection) = selection.as_mut() {
            writeln!(selection, "{CSV_HEADER}").context("Failed to write CSV header")?;
        }

        Ok(Self {
            all,
            selection,
            window,
            rows: 0,
            selected_rows: 0,
        })
    }

    pub fn record(&mut self, dated: &DatedFrame<'_>) -> Result<()> {
        let row = format_row(dated);
        writeln!(self.all, "{row}").context("Failed to append to frame table")?;
        self.rows += 1;

        if let Some(selection) = self.selection.as_mut() {
            if self.window.accepts(&dated.timestamp) {
                writeln!(selection, "{row}").context("Failed to append to selection table")?;
                self.selected_rows += 1;
            }
        }
        Ok(())
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn selected_rows(&self) -> u64 {
        self.selected_rows
    }

    /// Flush both tables and hand back the writers
    pub fn finish(mut self) -> Result<(W, Option<W>)> {
        self.all.flush().context("Failed to flush frame table")?;
        if let Some(selection) = self.selection.as_mut() {
            selection.flush().context("Failed to flush selection table")?;
        }
        Ok((self.all, self.selection))
    }
}

/// One CSV row, without the trailing newline
pub fn format_row(dated: &DatedFrame<'_>) -> String {
    let header = &dated.frame.header;
    format!(
        "{},{},{},{},{},{},{},{},{}",
        dated.timestamp.format(TIMESTAMP_FORMAT),
        dated.frame.offset,
        header.type_hex(),
        header.subtype_hex(),
        header.channel,
        header.frame_number,
        header.frame_subnumber,
        header.frame_length,
        header.extra_timestamp
    )
}

fn create_table(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}
