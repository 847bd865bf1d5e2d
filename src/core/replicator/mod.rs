//! # Replicator Module
//!
//! Copies a file to a new path using the fastest primitive the platform
//! offers, then carries over the source's timestamps and permissions.
//!
//! ## Guarantees
//! - The destination is created exclusively; an existing file is never
//!   overwritten or modified
//! - Data moves through kernel primitives (clone, `copy_file_range`,
//!   `sendfile`, `fcopyfile`) before any user-space fallback
//! - Short transfers are continued until the full source size is copied
//! - Any failure is returned to the caller with the OS reason; a
//!   partially written destination is removed
//! - Both descriptors are closed on every path
//!
//! ## Example
//! ```rust,ignore
//! use photo_filekit::core::replicator::Replicator;
//!
//! let report = Replicator::new().copy("DSC_0001.JPG", "/backup/DSC_0001.JPG")?;
//! println!("copied {} bytes via {}", report.bytes_copied, report.method);
//! ```

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
mod stream;
mod traits;

#[cfg(target_os = "linux")]
pub use linux::{CopyFileRange, Reflink, Sendfile};
#[cfg(target_os = "macos")]
pub use macos::Fcopyfile;
pub use stream::StreamCopy;
pub use traits::{is_unsupported, TransferBackend, TransferMethod};

use crate::error::{FileKitError, Result};
use filetime::FileTime;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, Metadata, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Successful copy details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyReport {
    /// Bytes written to the destination
    pub bytes_copied: u64,
    /// Primitive that moved the data
    pub method: TransferMethod,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

/// Flat success/failure record for callers that cannot take a `Result`.
///
/// `ok` is true only when every byte was transferred and the metadata
/// was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyOutcome {
    pub ok: bool,
    pub error_code: Option<i32>,
    pub error_message: Option<String>,
    pub bytes_copied: u64,
    pub method: Option<TransferMethod>,
}

impl From<Result<CopyReport>> for CopyOutcome {
    fn from(result: Result<CopyReport>) -> Self {
        match result {
            Ok(report) => CopyOutcome {
                ok: true,
                error_code: None,
                error_message: None,
                bytes_copied: report.bytes_copied,
                method: Some(report.method),
            },
            Err(err) => CopyOutcome {
                ok: false,
                error_code: err.raw_os_error(),
                error_message: Some(err.to_string()),
                bytes_copied: 0,
                method: None,
            },
        }
    }
}

/// Copies files through an ordered chain of transfer backends
pub struct Replicator {
    backends: Vec<Box<dyn TransferBackend>>,
}

impl Replicator {
    /// Replicator using the platform's preferred backends
    pub fn new() -> Self {
        Self {
            backends: platform_backends(),
        }
    }

    /// Replicator with an explicit backend chain, tried in order.
    ///
    /// An empty chain falls back to [`StreamCopy`].
    pub fn with_backends(backends: Vec<Box<dyn TransferBackend>>) -> Self {
        if backends.is_empty() {
            return Self {
                backends: vec![Box::new(StreamCopy)],
            };
        }
        Self { backends }
    }

    /// Copy `src` to the new path `dst`.
    ///
    /// Fails with `AlreadyExists` if `dst` exists, leaving it untouched.
    pub fn copy(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<CopyReport> {
        let src_path = src.as_ref();
        let dst_path = dst.as_ref();
        let start = Instant::now();

        let src = File::open(src_path).map_err(|e| FileKitError::from_io("open", src_path, e))?;
        let src_meta = src
            .metadata()
            .map_err(|e| FileKitError::from_io("stat", src_path, e))?;
        if !src_meta.is_file() {
            return Err(FileKitError::NotAFile {
                path: src_path.to_path_buf(),
            });
        }

        let dst = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dst_path)
            .map_err(|e| FileKitError::from_io("create", dst_path, e))?;
        let mut guard = PartialDestination::new(dst_path);
        let (bytes_copied, method) = self.fill_destination(&src, dst, &src_meta, dst_path)?;
        guard.disarm();

        let report = CopyReport {
            bytes_copied,
            method,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        debug!(
            src = %src_path.display(),
            dst = %dst_path.display(),
            bytes = report.bytes_copied,
            method = %report.method,
            "copied file"
        );
        Ok(report)
    }

    /// Transfer the data and apply the source metadata. Takes `dst` by
    /// value so the handle is closed before any cleanup runs.
    fn fill_destination(
        &self,
        src: &File,
        dst: File,
        src_meta: &Metadata,
        dst_path: &Path,
    ) -> Result<(u64, TransferMethod)> {
        let transferred = self
            .transfer_all(src, &dst, src_meta.len())
            .map_err(|e| FileKitError::from_io("copy data to", dst_path, e))?;

        dst.set_permissions(src_meta.permissions())
            .map_err(|e| FileKitError::from_io("set permissions on", dst_path, e))?;
        filetime::set_file_handle_times(
            &dst,
            Some(FileTime::from_last_access_time(src_meta)),
            Some(FileTime::from_last_modification_time(src_meta)),
        )
        .map_err(|e| FileKitError::from_io("set timestamps on", dst_path, e))?;

        Ok(transferred)
    }

    /// Move `total` bytes, continuing after short transfers and moving
    /// down the backend chain while nothing has been written yet.
    fn transfer_all(&self, src: &File, dst: &File, total: u64) -> io::Result<(u64, TransferMethod)> {
        if total == 0 {
            return Ok((0, TransferMethod::Empty));
        }

        let mut index = 0;
        let mut offset = 0u64;

        while offset < total {
            let backend = &self.backends[index];
            match backend.transfer(src, dst, offset, total - offset) {
                Ok(0) if offset == 0 && index + 1 < self.backends.len() => {
                    debug!(
                        method = %backend.method(),
                        next = %self.backends[index + 1].method(),
                        "transfer backend moved nothing, falling back"
                    );
                    index += 1;
                }
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("incomplete transfer: {} of {} bytes", offset, total),
                    ));
                }
                Ok(n) => {
                    offset += n.min(total - offset);
                    trace!(method = %backend.method(), moved = n, offset, total, "transfer step");
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e)
                    if offset == 0
                        && index + 1 < self.backends.len()
                        && backend.can_fall_back(&e) =>
                {
                    debug!(
                        method = %backend.method(),
                        next = %self.backends[index + 1].method(),
                        error = %e,
                        "transfer backend unavailable, falling back"
                    );
                    index += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok((offset, self.backends[index].method()))
    }
}

impl Default for Replicator {
    fn default() -> Self {
        Self::new()
    }
}

/// Backends for the current platform, most efficient first
pub fn platform_backends() -> Vec<Box<dyn TransferBackend>> {
    #[cfg(target_os = "linux")]
    {
        vec![
            Box::new(Reflink),
            Box::new(CopyFileRange),
            Box::new(Sendfile),
            Box::new(StreamCopy),
        ]
    }

    #[cfg(target_os = "macos")]
    {
        vec![Box::new(Fcopyfile), Box::new(StreamCopy)]
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        vec![Box::new(StreamCopy)]
    }
}

/// Removes a destination this copy created unless the copy succeeded
struct PartialDestination {
    path: PathBuf,
    armed: bool,
}

impl PartialDestination {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PartialDestination {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!(path = %self.path.display(), error = %e, "failed to remove partial copy");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Moves at most `step` bytes per call through the stream backend
    struct Trickle {
        step: u64,
        calls: Arc<AtomicUsize>,
    }

    impl TransferBackend for Trickle {
        fn method(&self) -> TransferMethod {
            TransferMethod::Stream
        }

        fn transfer(&self, src: &File, dst: &File, offset: u64, remaining: u64) -> io::Result<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            StreamCopy.transfer(src, dst, offset, remaining.min(self.step))
        }
    }

    /// Always reports the primitive as unavailable
    struct Unsupported;

    impl TransferBackend for Unsupported {
        fn method(&self) -> TransferMethod {
            TransferMethod::Reflink
        }

        fn transfer(&self, _: &File, _: &File, _: u64, _: u64) -> io::Result<u64> {
            Err(io::Error::from(io::ErrorKind::Unsupported))
        }
    }

    /// Reports success without moving anything
    struct Stalled;

    impl TransferBackend for Stalled {
        fn method(&self) -> TransferMethod {
            TransferMethod::Sendfile
        }

        fn transfer(&self, _: &File, _: &File, _: u64, _: u64) -> io::Result<u64> {
            Ok(0)
        }
    }

    /// Fails hard after the first call
    struct Broken {
        calls: AtomicUsize,
    }

    impl TransferBackend for Broken {
        fn method(&self) -> TransferMethod {
            TransferMethod::Stream
        }

        fn transfer(&self, src: &File, dst: &File, offset: u64, remaining: u64) -> io::Result<u64> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return StreamCopy.transfer(src, dst, offset, remaining.min(3));
            }
            Err(io::Error::from_raw_os_error(libc::EIO))
        }
    }

    fn source(dir: &TempDir, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join("src.jpg");
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn copies_content() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir, b"photo bytes");
        let dst = dir.path().join("dst.jpg");

        let report = Replicator::new().copy(&src, &dst).unwrap();
        assert_eq!(report.bytes_copied, 11);
        assert_eq!(fs::read(&dst).unwrap(), b"photo bytes");
    }

    #[test]
    fn copies_empty_file() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir, b"");
        let dst = dir.path().join("dst.jpg");

        let report = Replicator::new().copy(&src, &dst).unwrap();
        assert_eq!(report.bytes_copied, 0);
        assert_eq!(report.method, TransferMethod::Empty);
        assert!(dst.exists());
    }

    #[test]
    fn short_transfers_are_continued() {
        let dir = TempDir::new().unwrap();
        let data: Vec<u8> = (0..100u8).collect();
        let src = source(&dir, &data);
        let dst = dir.path().join("dst.jpg");
        let calls = Arc::new(AtomicUsize::new(0));

        let replicator = Replicator::with_backends(vec![Box::new(Trickle {
            step: 7,
            calls: Arc::clone(&calls),
        })]);
        let report = replicator.copy(&src, &dst).unwrap();

        assert_eq!(report.bytes_copied, 100);
        assert_eq!(calls.load(Ordering::SeqCst), 15);
        assert_eq!(fs::read(&dst).unwrap(), data);
    }

    #[test]
    fn unsupported_backend_falls_back() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir, b"fallback");
        let dst = dir.path().join("dst.jpg");

        let replicator = Replicator::with_backends(vec![Box::new(Unsupported), Box::new(StreamCopy)]);
        let report = replicator.copy(&src, &dst).unwrap();

        assert_eq!(report.method, TransferMethod::Stream);
        assert_eq!(fs::read(&dst).unwrap(), b"fallback");
    }

    #[test]
    fn backend_moving_nothing_falls_back() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir, b"stalled then streamed");
        let dst = dir.path().join("dst.jpg");

        let replicator = Replicator::with_backends(vec![Box::new(Stalled), Box::new(StreamCopy)]);
        let report = replicator.copy(&src, &dst).unwrap();

        assert_eq!(report.method, TransferMethod::Stream);
        assert_eq!(fs::read(&dst).unwrap(), b"stalled then streamed");
    }

    #[test]
    fn last_backend_moving_nothing_is_an_error() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir, b"never moves");
        let dst = dir.path().join("dst.jpg");

        let replicator = Replicator::with_backends(vec![Box::new(Stalled)]);
        let err = replicator.copy(&src, &dst).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(!dst.exists());
    }

    #[test]
    fn last_backend_unsupported_is_an_error() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir, b"nowhere to go");
        let dst = dir.path().join("dst.jpg");

        let replicator = Replicator::with_backends(vec![Box::new(Unsupported)]);
        assert!(replicator.copy(&src, &dst).is_err());
        assert!(!dst.exists());
    }

    #[test]
    fn failure_mid_copy_removes_destination() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir, b"0123456789");
        let dst = dir.path().join("dst.jpg");

        let replicator = Replicator::with_backends(vec![Box::new(Broken {
            calls: AtomicUsize::new(0),
        })]);
        let err = replicator.copy(&src, &dst).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.raw_os_error(), Some(libc::EIO));
        assert!(!dst.exists());
    }

    #[test]
    fn existing_destination_is_untouched() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir, b"new content");
        let dst = dir.path().join("dst.jpg");
        fs::write(&dst, b"precious").unwrap();

        let err = Replicator::new().copy(&src, &dst).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&dst).unwrap(), b"precious");
    }

    #[test]
    fn missing_source_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("dst.jpg");

        let err = Replicator::new()
            .copy(dir.path().join("missing.jpg"), &dst)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!dst.exists());
    }

    #[test]
    fn directory_source_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = Replicator::new()
            .copy(dir.path(), dir.path().join("dst"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn preserves_modification_time() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir, b"dated photo");
        let mtime = FileTime::from_unix_time(1_500_000_000, 0);
        let atime = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_times(&src, atime, mtime).unwrap();
        let dst = dir.path().join("dst.jpg");

        Replicator::new().copy(&src, &dst).unwrap();

        let meta = fs::metadata(&dst).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&meta), mtime);
    }

    #[test]
    fn outcome_from_error_carries_code() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir, b"x");
        let dst = dir.path().join("dst.jpg");
        fs::write(&dst, b"y").unwrap();

        let outcome = CopyOutcome::from(Replicator::new().copy(&src, &dst));
        assert!(!outcome.ok);
        assert_eq!(outcome.error_code, Some(libc::EEXIST));
        assert!(outcome.error_message.unwrap().contains("already exists"));
    }

    #[test]
    fn empty_backend_chain_uses_stream() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir, b"streamed");
        let dst = dir.path().join("dst.jpg");

        let report = Replicator::with_backends(Vec::new()).copy(&src, &dst).unwrap();
        assert_eq!(report.method, TransferMethod::Stream);
        assert_eq!(fs::read(&dst).unwrap(), b"streamed");
    }
}
