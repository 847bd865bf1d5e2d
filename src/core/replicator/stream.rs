//! Portable buffered copy, used where no kernel primitive is available.

use super::traits::{TransferBackend, TransferMethod};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

/// Bytes copied per call
const STREAM_CHUNK: u64 = 8 * 1024 * 1024;

/// `std::io::copy` over seeked handles
#[derive(Debug, Default)]
pub struct StreamCopy;

impl TransferBackend for StreamCopy {
    fn method(&self) -> TransferMethod {
        TransferMethod::Stream
    }

    fn transfer(&self, src: &File, dst: &File, offset: u64, remaining: u64) -> io::Result<u64> {
        let mut reader = src;
        let mut writer = dst;
        reader.seek(SeekFrom::Start(offset))?;
        writer.seek(SeekFrom::Start(offset))?;

        io::copy(&mut reader.take(remaining.min(STREAM_CHUNK)), &mut writer)
    }

    fn can_fall_back(&self, _err: &io::Error) -> bool {
        false
    }
}
