//! Forward-only signature search over the mapped region

use memchr::memmem::Finder;

use crate::dhav::MAGIC;

/// Yields successive offsets of the DHAV signature at or after a cursor.
///
/// Each hit moves the cursor one byte past the hit, so the sequence is
/// finite even if the caller never advances it. Callers skip over a frame
/// body with [`SignatureScanner::advance_to`].
pub struct SignatureScanner<'a> {
    region: &'a [u8],
    finder: Finder<'static>,
    cursor: usize,
}

impl<'a> SignatureScanner<'a> {
    pub fn new(region: &'a [u8]) -> Self {
        Self {
            region,
            finder: Finder::new(MAGIC),
            cursor: 0,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor forward. Requests to move backward are ignored.
    pub fn advance_to(&mut self, cursor: usize) {
        self.cursor = self.cursor.max(cursor).min(self.region.len());
    }
}

impl Iterator for SignatureScanner<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let hit = self.cursor + self.finder.find(&self.region[self.cursor..])?;
        self.cursor = hit + 1;
        Some(hit)
    }
}
