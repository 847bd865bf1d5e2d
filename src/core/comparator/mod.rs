//! # Comparator Module
//!
//! Exact byte-for-byte comparison of two files.
//!
//! ## How It Works
//! 1. Stat both files; different sizes short-circuit without reading
//! 2. Map both files
//! 3. Compare the mapped views chunk by chunk, stopping at the first mismatch
//!
//! A file that cannot be opened or mapped is an error, never a
//! "different" verdict.

use super::mapped::MappedFile;
use crate::error::{FileKitError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Bytes compared per step before checking for a mismatch
const COMPARE_CHUNK: usize = 64 * 1024;

/// Outcome of comparing two readable files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareResult {
    /// Same size and identical bytes
    Equal,
    /// Sizes differ; content was not read
    DifferentSize,
    /// Same size, at least one byte differs
    DifferentContent,
}

impl CompareResult {
    pub fn is_equal(&self) -> bool {
        matches!(self, CompareResult::Equal)
    }
}

impl std::fmt::Display for CompareResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompareResult::Equal => write!(f, "equal"),
            CompareResult::DifferentSize => write!(f, "different size"),
            CompareResult::DifferentContent => write!(f, "different content"),
        }
    }
}

/// Compare the contents of two files exactly
pub fn compare_files(a: impl AsRef<Path>, b: impl AsRef<Path>) -> Result<CompareResult> {
    let a = a.as_ref();
    let b = b.as_ref();

    let size_a = regular_file_len(a)?;
    let size_b = regular_file_len(b)?;

    if size_a != size_b {
        debug!(a = %a.display(), b = %b.display(), size_a, size_b, "sizes differ");
        return Ok(CompareResult::DifferentSize);
    }
    if size_a == 0 {
        return Ok(CompareResult::Equal);
    }

    let mapped_a = MappedFile::open(a)?;
    let mapped_b = MappedFile::open(b)?;

    // Either file may have changed size since the stat.
    if mapped_a.len() != mapped_b.len() {
        return Ok(CompareResult::DifferentSize);
    }

    let result = if views_equal(mapped_a.as_bytes(), mapped_b.as_bytes()) {
        CompareResult::Equal
    } else {
        CompareResult::DifferentContent
    };
    debug!(a = %a.display(), b = %b.display(), %result, "compared files");
    Ok(result)
}

fn regular_file_len(path: &Path) -> Result<u64> {
    let metadata = fs::metadata(path).map_err(|e| FileKitError::from_io("stat", path, e))?;
    if !metadata.is_file() {
        return Err(FileKitError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    Ok(metadata.len())
}

fn views_equal(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len()
        && a
            .chunks(COMPARE_CHUNK)
            .zip(b.chunks(COMPARE_CHUNK))
            .all(|(x, y)| x == y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn file_equals_itself() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.jpg", b"same bytes");
        assert_eq!(compare_files(&path, &path).unwrap(), CompareResult::Equal);
    }

    #[test]
    fn identical_copies_are_equal() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.jpg", b"same bytes");
        let b = write_file(&dir, "b.jpg", b"same bytes");
        assert_eq!(compare_files(&a, &b).unwrap(), CompareResult::Equal);
    }

    #[test]
    fn size_mismatch_short_circuits() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.jpg", b"short");
        let b = write_file(&dir, "b.jpg", b"longer content");
        assert_eq!(compare_files(&a, &b).unwrap(), CompareResult::DifferentSize);
    }

    #[test]
    fn content_mismatch_is_detected() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.jpg", b"abcdef");
        let b = write_file(&dir, "b.jpg", b"abcdeX");
        assert_eq!(compare_files(&a, &b).unwrap(), CompareResult::DifferentContent);
    }

    #[test]
    fn comparison_is_symmetric() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.jpg", b"abcdef");
        let b = write_file(&dir, "b.jpg", b"Xbcdef");
        let c = write_file(&dir, "c.jpg", b"abc");

        assert_eq!(compare_files(&a, &b).unwrap(), compare_files(&b, &a).unwrap());
        assert_eq!(compare_files(&a, &c).unwrap(), compare_files(&c, &a).unwrap());
    }

    #[test]
    fn empty_files_are_equal() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.jpg", b"");
        let b = write_file(&dir, "b.jpg", b"");
        assert_eq!(compare_files(&a, &b).unwrap(), CompareResult::Equal);
    }

    #[test]
    fn missing_file_is_an_error_not_a_difference() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.jpg", b"abc");
        let err = compare_files(&a, dir.path().join("missing.jpg")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn mismatch_in_later_chunk_is_detected() {
        let a = vec![7u8; COMPARE_CHUNK * 3];
        let mut b = a.clone();
        b[COMPARE_CHUNK * 2 + 5] = 8;
        assert!(!views_equal(&a, &b));
        assert!(views_equal(&a, &a.clone()));
    }

    #[test]
    fn display_names() {
        assert_eq!(CompareResult::Equal.to_string(), "equal");
        assert_eq!(CompareResult::DifferentSize.to_string(), "different size");
        assert_eq!(CompareResult::DifferentContent.to_string(), "different content");
    }
}
