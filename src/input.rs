//! Read-only memory mapping of the input image

use anyhow::{bail, Context, Result};
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::path::Path;

/// Mapping offsets are rounded down to this. It is a multiple of the page
/// size and of the Windows allocation granularity.
pub const MAP_GRANULARITY: u64 = 64 * 1024;

/// Round `offset` down to [`MAP_GRANULARITY`]
pub fn align_down(offset: u64) -> u64 {
    offset - offset % MAP_GRANULARITY
}

/// Input file mapped from an aligned offset to its end
#[derive(Debug)]
pub struct MappedInput {
    map: Option<Mmap>,
    base_offset: u64,
    file_len: u64,
}

impl MappedInput {
    /// Map `path` starting at `skip` rounded down to the mapping granularity.
    ///
    /// A skip at or past the end of a non-empty file is an error. Empty
    /// files map to an empty region.
    pub fn open(path: &Path, skip: u64) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Failed to open input {}", path.display()))?;
        let file_len = file
            .metadata()
            .with_context(|| format!("Failed to stat input {}", path.display()))?
            .len();

        if file_len == 0 {
            return Ok(Self {
                map: None,
                base_offset: 0,
                file_len,
            });
        }
        if skip >= file_len {
            bail!(
                "Skip offset {} is beyond the end of {} ({} bytes)",
                skip,
                path.display(),
                file_len
            );
        }

        let base_offset = align_down(skip);
        // SAFETY: read-only mapping; the image is not modified while carving.
        let map = unsafe { MmapOptions::new().offset(base_offset).map(&file) }
            .with_context(|| format!("Failed to map {} at offset {}", path.display(), base_offset))?;

        Ok(Self {
            map: Some(map),
            base_offset,
            file_len,
        })
    }

    /// Mapped bytes; `region()[0]` is at file offset [`Self::base_offset`]
    pub fn region(&self) -> &[u8] {
        self.map.as_deref().unwrap_or_default()
    }

    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    pub fn file_len(&self) -> u64 {
        self.file_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn image(len: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let bytes: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        file.write_all(&bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_align_down() {
        assert_eq!(align_down(0), 0);
        assert_eq!(align_down(65_535), 0);
        assert_eq!(align_down(65_536), 65_536);
        assert_eq!(align_down(200_000), 196_608);
    }

    #[test]
    fn test_maps_whole_file() {
        let file = image(1000);
        let input = MappedInput::open(file.path(), 0).unwrap();
        assert_eq!(input.base_offset(), 0);
        assert_eq!(input.file_len(), 1000);
        assert_eq!(input.region().len(), 1000);
        assert_eq!(input.region()[999], (999 % 251) as u8);
    }

    #[test]
    fn test_unaligned_skip_is_rounded_down() {
        let file = image(150_000);
        let input = MappedInput::open(file.path(), 70_000).unwrap();
        assert_eq!(input.base_offset(), 65_536);
        assert_eq!(input.region().len(), 150_000 - 65_536);
        assert_eq!(input.region()[0], (65_536 % 251) as u8);
    }

    #[test]
    fn test_skip_past_end_is_an_error() {
        let file = image(100);
        assert!(MappedInput::open(file.path(), 100).is_err());
    }

    #[test]
    fn test_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let input = MappedInput::open(file.path(), 0).unwrap();
        assert!(input.region().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = MappedInput::open(&dir.path().join("absent.dd"), 0).unwrap_err();
        assert!(err.to_string().contains("Failed to open input"));
    }
}
