//! # Mapped File Module
//!
//! Read-only, scope-bound views of file contents backed by `mmap`.
//!
//! A [`MappedFile`] owns both the open file handle and the mapping. Both
//! are released when the value is dropped or passed to
//! [`MappedFile::close`], on every exit path. If the mapping fails after
//! the file was opened, the handle is dropped before the error returns.

use crate::error::{FileKitError, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default upper bound for [`MappedFile::read_padded`] (10 KiB).
pub const DEFAULT_MAX_SLICE_LEN: usize = 10 * 1024;

/// An open, memory-mapped, read-only file.
pub struct MappedFile {
    path: PathBuf,
    mmap: Mmap,
    // Kept open for the lifetime of the mapping.
    _file: File,
}

impl MappedFile {
    /// Open and map `path`.
    ///
    /// Fails with `NotFound` / `PermissionDenied` / `Io` when the file
    /// cannot be opened or mapped, and with `EmptyFile` / `NotAFile` when
    /// there is nothing mappable behind the path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| FileKitError::from_io("open", path, e))?;

        let metadata = file
            .metadata()
            .map_err(|e| FileKitError::from_io("stat", path, e))?;
        if !metadata.is_file() {
            return Err(FileKitError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        if metadata.len() == 0 {
            return Err(FileKitError::EmptyFile {
                path: path.to_path_buf(),
            });
        }

        // SAFETY: the mapping is read-only and the handle lives as long as
        // the mapping. Concurrent truncation by another process is outside
        // what a read-only view can guard against.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| FileKitError::from_io("map", path, e))?;

        debug!(path = %path.display(), len = mmap.len(), "mapped file");

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
            _file: file,
        })
    }

    /// Path this mapping was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Length of the mapped view in bytes (never zero)
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Always false; empty files are rejected by [`MappedFile::open`].
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// The whole mapped view
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap
    }

    /// A sub-view of `len` bytes starting at `offset`.
    ///
    /// Fails with `InvalidArgument` if the range extends past the end.
    pub fn get(&self, offset: u64, len: usize) -> Result<&[u8]> {
        let start = usize::try_from(offset).map_err(|_| self.out_of_bounds(offset, len))?;
        let end = start
            .checked_add(len)
            .filter(|end| *end <= self.len())
            .ok_or_else(|| self.out_of_bounds(offset, len))?;
        Ok(&self.mmap[start..end])
    }

    /// Copy out up to `len` bytes starting at `offset`.
    ///
    /// The result is `min(len, max_len)` bytes long. Bytes beyond the end
    /// of the file are zero. `len == 0` and `offset > self.len()` are
    /// rejected rather than producing an all-zero buffer.
    pub fn read_padded(&self, offset: u64, len: usize, max_len: usize) -> Result<Vec<u8>> {
        if len == 0 {
            return Err(FileKitError::InvalidArgument(
                "slice length must be greater than zero".to_string(),
            ));
        }
        let start = usize::try_from(offset)
            .ok()
            .filter(|start| *start <= self.len())
            .ok_or_else(|| {
                FileKitError::InvalidArgument(format!(
                    "offset {} is past the end of {} ({} bytes)",
                    offset,
                    self.path.display(),
                    self.len()
                ))
            })?;

        let wanted = len.min(max_len);
        let mut out = vec![0u8; wanted];
        let available = (self.len() - start).min(wanted);
        out[..available].copy_from_slice(&self.mmap[start..start + available]);
        Ok(out)
    }

    /// Release the mapping and the file handle now.
    pub fn close(self) {
        debug!(path = %self.path.display(), "unmapping file");
        drop(self);
    }

    fn out_of_bounds(&self, offset: u64, len: usize) -> FileKitError {
        FileKitError::InvalidArgument(format!(
            "range {}+{} is outside {} ({} bytes)",
            offset,
            len,
            self.path.display(),
            self.len()
        ))
    }
}

impl AsRef<[u8]> for MappedFile {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl std::fmt::Debug for MappedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedFile")
            .field("path", &self.path)
            .field("len", &self.len())
            .finish()
    }
}
