//! Transfer backend trait definition.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;

/// The primitive that moved a file's bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferMethod {
    /// Copy-on-write clone (FICLONE)
    Reflink,
    /// In-kernel copy (copy_file_range)
    CopyFileRange,
    /// In-kernel copy (sendfile)
    Sendfile,
    /// macOS fcopyfile, which clones on APFS
    Fcopyfile,
    /// Buffered read/write loop
    Stream,
    /// Nothing to transfer; the source was empty
    Empty,
}

impl std::fmt::Display for TransferMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferMethod::Reflink => write!(f, "reflink"),
            TransferMethod::CopyFileRange => write!(f, "copy_file_range"),
            TransferMethod::Sendfile => write!(f, "sendfile"),
            TransferMethod::Fcopyfile => write!(f, "fcopyfile"),
            TransferMethod::Stream => write!(f, "stream"),
            TransferMethod::Empty => write!(f, "none"),
        }
    }
}

/// One way of moving bytes between two open files.
///
/// The replicator drives a backend in a loop: each call moves some
/// prefix of the `remaining` bytes starting at `offset` (in both files)
/// and reports how many it moved. Returning fewer bytes than requested
/// is normal; returning zero means the source ran out early.
pub trait TransferBackend: Send + Sync {
    /// The primitive this backend uses
    fn method(&self) -> TransferMethod;

    /// Move up to `remaining` bytes from `src` at `offset` to `dst` at `offset`.
    fn transfer(&self, src: &File, dst: &File, offset: u64, remaining: u64) -> io::Result<u64>;

    /// Whether `err`, raised before any byte moved, should hand the copy
    /// to the next backend instead of failing it.
    fn can_fall_back(&self, err: &io::Error) -> bool {
        is_unsupported(err)
    }
}

/// Errors that mean "this primitive does not work here" rather than
/// "this copy failed".
pub fn is_unsupported(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::Unsupported {
        return true;
    }

    #[cfg(unix)]
    {
        // EOPNOTSUPP and ENOTSUP share a value on Linux
        #[allow(unreachable_patterns)]
        let unsupported = match err.raw_os_error() {
            Some(libc::ENOSYS)
            | Some(libc::EXDEV)
            | Some(libc::EOPNOTSUPP)
            | Some(libc::ENOTSUP)
            | Some(libc::EINVAL)
            | Some(libc::ENOTTY) => true,
            _ => false,
        };
        unsupported
    }

    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_display() {
        assert_eq!(TransferMethod::Reflink.to_string(), "reflink");
        assert_eq!(TransferMethod::CopyFileRange.to_string(), "copy_file_range");
        assert_eq!(TransferMethod::Sendfile.to_string(), "sendfile");
        assert_eq!(TransferMethod::Stream.to_string(), "stream");
        assert_eq!(TransferMethod::Empty.to_string(), "none");
    }

    #[test]
    fn unsupported_errors_are_recognised() {
        assert!(is_unsupported(&io::Error::from(io::ErrorKind::Unsupported)));
        assert!(!is_unsupported(&io::Error::from(io::ErrorKind::NotFound)));
    }

    #[cfg(unix)]
    #[test]
    fn unsupported_errnos_are_recognised() {
        assert!(is_unsupported(&io::Error::from_raw_os_error(libc::EXDEV)));
        assert!(is_unsupported(&io::Error::from_raw_os_error(libc::ENOSYS)));
        assert!(!is_unsupported(&io::Error::from_raw_os_error(libc::ENOSPC)));
        assert!(!is_unsupported(&io::Error::from_raw_os_error(libc::EIO)));
    }
}
