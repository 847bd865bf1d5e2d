//! Sampling plans: which byte ranges of a file feed the hash.

use super::FingerprintConfig;
use serde::{Deserialize, Serialize};

/// A half-open byte range `[offset, offset + len)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub offset: u64,
    pub len: u64,
}

impl ByteRange {
    pub fn new(offset: u64, len: u64) -> Self {
        Self { offset, len }
    }

    /// Exclusive end offset
    pub fn end(&self) -> u64 {
        self.offset + self.len
    }
}

/// Ordered byte ranges to hash for a file of a given size.
///
/// A plan depends only on the total size and the config it was built
/// from, so two files of the same size are always sampled at the same
/// offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingPlan {
    ranges: Vec<ByteRange>,
    covers_whole_file: bool,
}

impl SamplingPlan {
    /// Plan covering the whole file
    pub fn whole_file(total_size: u64) -> Self {
        let ranges = if total_size == 0 {
            Vec::new()
        } else {
            vec![ByteRange::new(0, total_size)]
        };
        Self {
            ranges,
            covers_whole_file: true,
        }
    }

    /// Plan for sampled fingerprinting.
    ///
    /// Files up to `full_hash_threshold` are hashed whole. Larger files
    /// contribute three windows: the head, the window starting at
    /// `(total - window) / 2`, and the tail. Bytes outside the windows
    /// do not influence the digest.
    pub fn sampled(total_size: u64, config: &FingerprintConfig) -> Self {
        if total_size <= config.full_hash_threshold {
            return Self::whole_file(total_size);
        }

        let window = config.window_size;
        let ranges = vec![
            ByteRange::new(0, window),
            ByteRange::new((total_size - window) / 2, window),
            ByteRange::new(total_size - window, window),
        ];
        Self {
            ranges,
            covers_whole_file: false,
        }
    }

    pub fn ranges(&self) -> &[ByteRange] {
        &self.ranges
    }

    pub fn covers_whole_file(&self) -> bool {
        self.covers_whole_file
    }

    /// Total number of bytes the plan feeds into the hash
    pub fn sampled_bytes(&self) -> u64 {
        self.ranges.iter().map(|r| r.len).sum()
    }
}
