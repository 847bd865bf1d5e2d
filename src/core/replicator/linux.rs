//! Linux transfer backends.
//!
//! Tried in order:
//! 1. `ioctl(FICLONE)` - copy-on-write clone on btrfs, xfs, bcachefs
//! 2. `copy_file_range` - in-kernel copy, may also reflink or use server-side copy
//! 3. `sendfile` - in-kernel copy for kernels or filesystems without the above

use super::traits::{TransferBackend, TransferMethod};
use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;

/// Upper bound on bytes requested per syscall
const MAX_TRANSFER: u64 = 1 << 30;

// _IOW(0x94, 9, int)
const FICLONE: libc::c_ulong = 0x40049409;

/// Whole-file copy-on-write clone
#[derive(Debug, Default)]
pub struct Reflink;

impl TransferBackend for Reflink {
    fn method(&self) -> TransferMethod {
        TransferMethod::Reflink
    }

    fn transfer(&self, src: &File, dst: &File, offset: u64, remaining: u64) -> io::Result<u64> {
        if offset != 0 {
            return Err(io::Error::from(io::ErrorKind::Unsupported));
        }

        // SAFETY: both descriptors are open for the duration of the call.
        let rc = unsafe { libc::ioctl(dst.as_raw_fd(), FICLONE as _, src.as_raw_fd()) };
        if rc == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(remaining)
    }

    // Cloning is opportunistic; whatever the reason it failed, the
    // destination is still empty and the next backend can start over.
    fn can_fall_back(&self, _err: &io::Error) -> bool {
        true
    }
}

/// `copy_file_range(2)` with explicit offsets on both sides
#[derive(Debug, Default)]
pub struct CopyFileRange;

impl TransferBackend for CopyFileRange {
    fn method(&self) -> TransferMethod {
        TransferMethod::CopyFileRange
    }

    fn transfer(&self, src: &File, dst: &File, offset: u64, remaining: u64) -> io::Result<u64> {
        let mut off_in = to_off(offset)? as libc::loff_t;
        let mut off_out = off_in;
        let len = remaining.min(MAX_TRANSFER) as usize;

        // SAFETY: offsets point at live locals; descriptors are open.
        let n = unsafe {
            libc::copy_file_range(
                src.as_raw_fd(),
                &mut off_in,
                dst.as_raw_fd(),
                &mut off_out,
                len,
                0,
            )
        };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as u64)
    }
}

/// `sendfile(2)` from the source offset to the destination's file position.
///
/// Only correct when the destination position equals `offset`, which
/// holds because the replicator only switches backends before the
/// first byte has moved.
#[derive(Debug, Default)]
pub struct Sendfile;

impl TransferBackend for Sendfile {
    fn method(&self) -> TransferMethod {
        TransferMethod::Sendfile
    }

    fn transfer(&self, src: &File, dst: &File, offset: u64, remaining: u64) -> io::Result<u64> {
        let mut off = to_off(offset)? as libc::off_t;
        let len = remaining.min(MAX_TRANSFER) as usize;

        // SAFETY: `off` is a live local; descriptors are open.
        let n = unsafe { libc::sendfile(dst.as_raw_fd(), src.as_raw_fd(), &mut off, len) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as u64)
    }
}

fn to_off(offset: u64) -> io::Result<i64> {
    i64::try_from(offset).map_err(|_| io::Error::from_raw_os_error(libc::EOVERFLOW))
}
