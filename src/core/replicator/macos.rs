//! macOS transfer backend.
//!
//! `fcopyfile(COPYFILE_DATA)` clones the data on APFS and falls back to
//! an in-kernel copy elsewhere. Timestamps and permissions are applied
//! by the replicator afterwards, so only the data flag is requested.

use super::traits::{TransferBackend, TransferMethod};
use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;

const COPYFILE_DATA: u32 = 1 << 3;

extern "C" {
    fn fcopyfile(
        from: libc::c_int,
        to: libc::c_int,
        state: *mut libc::c_void,
        flags: u32,
    ) -> libc::c_int;
}

/// Whole-file copy through `fcopyfile`
#[derive(Debug, Default)]
pub struct Fcopyfile;

impl TransferBackend for Fcopyfile {
    fn method(&self) -> TransferMethod {
        TransferMethod::Fcopyfile
    }

    fn transfer(&self, src: &File, dst: &File, offset: u64, remaining: u64) -> io::Result<u64> {
        if offset != 0 {
            return Err(io::Error::from(io::ErrorKind::Unsupported));
        }

        // SAFETY: both descriptors are open; a null state is allowed.
        let rc = unsafe {
            fcopyfile(
                src.as_raw_fd(),
                dst.as_raw_fd(),
                std::ptr::null_mut(),
                COPYFILE_DATA,
            )
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(remaining)
    }
}
