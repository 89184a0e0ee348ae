//! Contiguous run grouping
//!
//! A segment is a run of byte-adjacent frames with valid dates. The
//! accumulator tracks the offset where the next adjacent frame would start
//! (the cursor) and flushes the buffered segment when a signature turns up
//! beyond it.

use chrono::NaiveDateTime;

use crate::dhav::Frame;

/// A frame whose packed date decoded successfully
#[derive(Debug, Clone, Copy)]
pub struct DatedFrame<'a> {
    pub frame: Frame<'a>,
    pub timestamp: NaiveDateTime,
}

/// Non-empty run of adjacent frames, in file order
#[derive(Debug, Clone)]
pub struct Segment<'a> {
    frames: Vec<DatedFrame<'a>>,
}

impl<'a> Segment<'a> {
    fn new(first: DatedFrame<'a>) -> Self {
        Self { frames: vec![first] }
    }

    pub fn frames(&self) -> &[DatedFrame<'a>] {
        &self.frames
    }

    pub fn first(&self) -> &DatedFrame<'a> {
        &self.frames[0]
    }

    pub fn last(&self) -> &DatedFrame<'a> {
        &self.frames[self.frames.len() - 1]
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Channel of the first frame
    pub fn channel(&self) -> u8 {
        self.first().frame.header.channel
    }

    /// Total size of all frame spans
    pub fn byte_len(&self) -> usize {
        self.frames.iter().map(|f| f.frame.span()).sum()
    }

    /// Absolute offset of the first frame
    pub fn offset(&self) -> u64 {
        self.first().frame.offset
    }
}

/// Run accumulator state: `EMPTY` when `segment` is `None`, `ACCUMULATING`
/// otherwise
#[derive(Debug)]
pub struct RunAccumulator<'a> {
    cursor: usize,
    segment: Option<Segment<'a>>,
}

impl<'a> RunAccumulator<'a> {
    /// Start empty with the cursor at the region offset where scanning begins
    pub fn new(start: usize) -> Self {
        Self {
            cursor: start,
            segment: None,
        }
    }

    /// Region offset where the next adjacent frame would begin
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Gap test for a newly found signature at region offset `offset`.
    ///
    /// Compares against the cursor, not the last buffered frame: a skipped
    /// invalid-date frame still advances the cursor, so a frame following
    /// it counts as adjacent to the buffered run.
    pub fn observe(&mut self, offset: usize) -> Option<Segment<'a>> {
        if offset > self.cursor {
            self.segment.take()
        } else {
            None
        }
    }

    /// Append a frame that starts at region offset `offset`
    pub fn push(&mut self, offset: usize, frame: DatedFrame<'a>) {
        self.cursor = offset + frame.frame.span();
        match &mut self.segment {
            Some(segment) => segment.frames.push(frame),
            None => self.segment = Some(Segment::new(frame)),
        }
    }

    /// Consume `len` bytes at `offset` without touching the buffered run
    pub fn skip(&mut self, offset: usize, len: usize) {
        self.cursor = offset + len;
    }

    /// Close the buffered run regardless of adjacency
    pub fn take(&mut self) -> Option<Segment<'a>> {
        self.segment.take()
    }

    /// Terminal flush on scanner exhaustion
    pub fn finish(self) -> Option<Segment<'a>> {
        self.segment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dhav::FrameHeader;
    use chrono::NaiveDate;

    fn dated(offset: u64, data: &[u8]) -> DatedFrame<'_> {
        DatedFrame {
            frame: Frame {
                header: FrameHeader {
                    frame_length: data.len() as u32,
                    ..FrameHeader::default()
                },
                offset,
                data,
            },
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_adjacent_frames_grow_one_segment() {
        let body = [0u8; 100];
        let mut acc = RunAccumulator::new(0);
        for offset in [0usize, 100, 200] {
            assert!(acc.observe(offset).is_none());
            acc.push(offset, dated(offset as u64, &body));
        }
        assert_eq!(acc.cursor(), 300);

        let flushed = acc.observe(500).expect("gap should flush");
        assert_eq!(flushed.frame_count(), 3);
        assert_eq!(flushed.offset(), 0);
        assert_eq!(flushed.last().frame.offset, 200);
        assert_eq!(flushed.byte_len(), 300);
        assert!(acc.take().is_none());

        acc.push(500, dated(500, &body));
        let tail = acc.finish().unwrap();
        assert_eq!(tail.frame_count(), 1);
        assert_eq!(tail.offset(), 500);
    }

    #[test]
    fn test_gap_while_empty_flushes_nothing() {
        let mut acc = RunAccumulator::new(0);
        assert!(acc.observe(64).is_none());
        assert!(acc.finish().is_none());
    }

    #[test]
    fn test_skip_advances_cursor_only() {
        let body = [0u8; 50];
        let mut acc = RunAccumulator::new(0);
        acc.push(0, dated(0, &body));
        acc.skip(50, 50);
        assert_eq!(acc.cursor(), 100);

        // Adjacent to the skipped frame, so it joins the buffered run
        assert!(acc.observe(100).is_none());
        acc.push(100, dated(100, &body));
        let segment = acc.finish().unwrap();
        assert_eq!(segment.frame_count(), 2);
        assert_eq!(segment.frames()[1].frame.offset, 100);
    }

    #[test]
    fn test_take_closes_run_and_keeps_cursor() {
        let body = [0u8; 40];
        let mut acc = RunAccumulator::new(0);
        acc.push(0, dated(0, &body));
        let closed = acc.take().unwrap();
        assert_eq!(closed.frame_count(), 1);
        assert_eq!(acc.cursor(), 40);
        assert!(acc.take().is_none());
        assert!(acc.finish().is_none());
    }

    #[test]
    fn test_start_cursor_counts_as_adjacent() {
        let body = [0u8; 30];
        let mut acc = RunAccumulator::new(16);
        assert!(acc.observe(16).is_none());
        acc.push(16, dated(16, &body));
        assert_eq!(acc.cursor(), 46);
    }
}
