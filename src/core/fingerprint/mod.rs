//! # Fingerprint Module
//!
//! Computes MD5 fingerprints of files, either over the full contents or
//! over a fixed sample of them.
//!
//! ## Modes
//! - **Full** - every byte of the file feeds the hash
//! - **Sampled** - files up to 96 KiB are hashed whole; larger files
//!   contribute only their first, middle and last 32 KiB
//!
//! ## Limitations
//! A sampled fingerprint is a cheap duplicate hint, not an identity.
//! Two files of the same size that differ only outside the sampled
//! windows get the same sampled digest. Use `Full` mode or the exact
//! comparator when that matters. MD5 itself is not collision resistant
//! against crafted input.
//!
//! ## Example
//! ```rust,ignore
//! use photo_filekit::core::fingerprint::{FingerprintConfig, FingerprintMode};
//!
//! let fingerprinter = FingerprintConfig::new()
//!     .window_size(32 * 1024)
//!     .build()?;
//!
//! let digest = fingerprinter.fingerprint_path(&path, FingerprintMode::Sampled)?;
//! println!("{}", digest);
//! ```

mod digest;
mod plan;

pub use digest::{Digest, DIGEST_LEN};
pub use plan::{ByteRange, SamplingPlan};

use super::mapped::MappedFile;
use crate::error::{FileKitError, Result};
use md5::{Digest as _, Md5};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

/// How much of a file feeds the fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintMode {
    /// Hash every byte
    Full,
    /// Hash the head, middle and tail windows of large files
    Sampled,
}

impl FingerprintMode {
    /// Get a human-readable description of the mode
    pub fn description(&self) -> &'static str {
        match self {
            FingerprintMode::Full => "Full - hashes every byte of the file",
            FingerprintMode::Sampled => {
                "Sampled - hashes the first, middle and last window of large files"
            }
        }
    }
}

impl std::fmt::Display for FingerprintMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FingerprintMode::Full => write!(f, "full"),
            FingerprintMode::Sampled => write!(f, "sampled"),
        }
    }
}

impl std::str::FromStr for FingerprintMode {
    type Err = FileKitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(FingerprintMode::Full),
            "sampled" => Ok(FingerprintMode::Sampled),
            other => Err(FileKitError::InvalidArgument(format!(
                "unknown fingerprint mode: {}",
                other
            ))),
        }
    }
}

/// Configuration builder for the fingerprinter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintConfig {
    /// Size of each sampled window in bytes
    window_size: u64,
    /// Files up to this size are hashed whole even in sampled mode
    full_hash_threshold: u64,
    /// Bytes fed to the MD5 state per update call
    block_size: usize,
}

impl FingerprintConfig {
    /// Create a configuration with the default 3 x 32 KiB policy
    pub fn new() -> Self {
        Self {
            window_size: 32 * 1024,
            full_hash_threshold: 3 * 32 * 1024,
            block_size: 512,
        }
    }

    /// Set the window size.
    ///
    /// Also resets the whole-file threshold to three windows; call
    /// [`full_hash_threshold`](Self::full_hash_threshold) afterwards to
    /// raise it.
    pub fn window_size(mut self, bytes: u64) -> Self {
        self.window_size = bytes;
        self.full_hash_threshold = bytes.saturating_mul(3);
        self
    }

    /// Set the size at or below which sampled mode hashes the whole file
    pub fn full_hash_threshold(mut self, bytes: u64) -> Self {
        self.full_hash_threshold = bytes;
        self
    }

    /// Set the block size used when feeding data to MD5.
    ///
    /// Any non-zero value produces the same digest; it only bounds the
    /// work done per update call.
    pub fn block_size(mut self, bytes: usize) -> Self {
        self.block_size = bytes;
        self
    }

    /// Check the invariants the sampling plan relies on
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(FileKitError::Config(
                "fingerprint window size must be non-zero".to_string(),
            ));
        }
        if self.block_size == 0 {
            return Err(FileKitError::Config(
                "fingerprint block size must be non-zero".to_string(),
            ));
        }
        if self.full_hash_threshold < self.window_size.saturating_mul(3) {
            return Err(FileKitError::Config(format!(
                "whole-file threshold {} is below three windows of {} bytes",
                self.full_hash_threshold, self.window_size
            )));
        }
        Ok(())
    }

    /// Build the fingerprinter
    pub fn build(self) -> Result<Fingerprinter> {
        self.validate()?;
        Ok(Fingerprinter { config: self })
    }
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes full or sampled MD5 fingerprints.
///
/// Holds only configuration, so one instance can be shared freely
/// across threads. Every call maps and releases its own file.
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    config: FingerprintConfig,
}

impl Fingerprinter {
    /// Fingerprinter with the default configuration
    pub fn new() -> Self {
        Self {
            config: FingerprintConfig::default(),
        }
    }

    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    /// The ranges that `mode` hashes for a file of `total_size` bytes
    pub fn plan(&self, total_size: u64, mode: FingerprintMode) -> SamplingPlan {
        match mode {
            FingerprintMode::Full => SamplingPlan::whole_file(total_size),
            FingerprintMode::Sampled => SamplingPlan::sampled(total_size, &self.config),
        }
    }

    /// Fingerprint an already mapped file
    pub fn fingerprint(&self, file: &MappedFile, mode: FingerprintMode) -> Result<Digest> {
        let plan = self.plan(file.len() as u64, mode);
        let mut hasher = BlockHasher::new(self.config.block_size);

        for range in plan.ranges() {
            let len = usize::try_from(range.len).map_err(|_| {
                FileKitError::InvalidArgument(format!("range of {} bytes is too large", range.len))
            })?;
            hasher.update(file.get(range.offset, len)?);
        }

        let digest = hasher.finalize();
        debug!(
            path = %file.path().display(),
            %mode,
            sampled_bytes = plan.sampled_bytes(),
            whole_file = plan.covers_whole_file(),
            %digest,
            "fingerprinted file"
        );
        Ok(digest)
    }

    /// Open `path`, fingerprint it, and release the mapping.
    ///
    /// A zero-length file has nothing to map; it yields the digest of
    /// empty input in either mode.
    pub fn fingerprint_path(&self, path: impl AsRef<Path>, mode: FingerprintMode) -> Result<Digest> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|e| FileKitError::from_io("stat", path, e))?;
        if !metadata.is_file() {
            return Err(FileKitError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        if metadata.len() == 0 {
            debug!(path = %path.display(), "empty file, using digest of empty input");
            return Ok(BlockHasher::new(self.config.block_size).finalize());
        }

        let file = MappedFile::open(path)?;
        self.fingerprint(&file, mode)
    }

    /// Fingerprint exactly `len` bytes of `path` starting at `offset`
    pub fn fingerprint_range(&self, path: impl AsRef<Path>, offset: u64, len: usize) -> Result<Digest> {
        if len == 0 {
            return Err(FileKitError::InvalidArgument(
                "range length must be greater than zero".to_string(),
            ));
        }
        let file = MappedFile::open(path)?;
        let mut hasher = BlockHasher::new(self.config.block_size);
        hasher.update(file.get(offset, len)?);
        Ok(hasher.finalize())
    }

    /// Recompute the fingerprint of `path` and compare it to `expected`
    pub fn verify(&self, path: impl AsRef<Path>, expected: &Digest, mode: FingerprintMode) -> Result<bool> {
        let path = path.as_ref();
        let actual = self.fingerprint_path(path, mode)?;
        if &actual != expected {
            debug!(path = %path.display(), %expected, %actual, "fingerprint mismatch");
        }
        Ok(&actual == expected)
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

/// MD5 state fed in fixed-size blocks
struct BlockHasher {
    inner: Md5,
    block_size: usize,
    fed: u64,
}

impl BlockHasher {
    fn new(block_size: usize) -> Self {
        Self {
            inner: Md5::new(),
            block_size: block_size.max(1),
            fed: 0,
        }
    }

    fn update(&mut self, data: &[u8]) {
        for block in data.chunks(self.block_size) {
            self.inner.update(block);
        }
        self.fed += data.len() as u64;
        trace!(bytes = data.len(), total = self.fed, "fed hash input");
    }

    fn finalize(self) -> Digest {
        let bytes: [u8; DIGEST_LEN] = self.inner.finalize().into();
        Digest::from_bytes(bytes)
    }
}
