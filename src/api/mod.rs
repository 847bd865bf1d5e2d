//! # API Module
//!
//! The boundary exposed to host applications. Each call acquires its own
//! mapping or descriptors and releases them before returning, so a
//! [`Toolkit`] can be shared across threads.
//!
//! ## Example
//! ```no_run
//! use photo_filekit::api::Toolkit;
//! use photo_filekit::core::fingerprint::FingerprintMode;
//!
//! let toolkit = Toolkit::default();
//! let digest = toolkit.get_fingerprint("IMG_0001.jpg", FingerprintMode::Sampled)?;
//! println!("{}", digest);
//! # Ok::<(), photo_filekit::FileKitError>(())
//! ```

use crate::config::ToolkitConfig;
use crate::core::comparator::{self, CompareResult};
use crate::core::fingerprint::{Digest, FingerprintMode, Fingerprinter};
use crate::core::mapped::MappedFile;
use crate::core::metadata::{ExifParser, MetadataParser, MetadataRecord};
use crate::core::replicator::{CopyOutcome, Replicator};
use crate::core::summary::{MetadataSummary, SummaryBuilder};
use crate::error::{FileKitError, Result};
use chrono::NaiveDateTime;
use std::path::Path;
use tracing::debug;

/// Entry point bundling every operation with one configuration
pub struct Toolkit {
    fingerprinter: Fingerprinter,
    replicator: Replicator,
    summaries: SummaryBuilder,
    max_slice_len: usize,
}

impl Default for Toolkit {
    fn default() -> Self {
        Self {
            fingerprinter: Fingerprinter::new(),
            replicator: Replicator::new(),
            summaries: SummaryBuilder::default(),
            max_slice_len: ToolkitConfig::default().max_slice_len,
        }
    }
}

impl Toolkit {
    /// Build a toolkit from a validated configuration
    pub fn from_config(config: &ToolkitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fingerprinter: config.fingerprint.clone().build()?,
            replicator: Replicator::new(),
            summaries: SummaryBuilder::new(config.summary_capacity),
            max_slice_len: config.max_slice_len,
        })
    }

    /// Replace the replicator, e.g. to force a particular backend chain
    pub fn with_replicator(mut self, replicator: Replicator) -> Self {
        self.replicator = replicator;
        self
    }

    pub fn fingerprinter(&self) -> &Fingerprinter {
        &self.fingerprinter
    }

    pub fn max_slice_len(&self) -> usize {
        self.max_slice_len
    }

    /// 16-byte MD5 fingerprint of a file
    pub fn get_fingerprint(&self, path: impl AsRef<Path>, mode: FingerprintMode) -> Result<Digest> {
        self.fingerprinter.fingerprint_path(path, mode)
    }

    /// Exact byte-level comparison
    pub fn compare_files(&self, a: impl AsRef<Path>, b: impl AsRef<Path>) -> Result<CompareResult> {
        comparator::compare_files(a, b)
    }

    /// Copy to a new destination, reporting the outcome as a flat record
    pub fn copy_file(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>) -> CopyOutcome {
        CopyOutcome::from(self.replicator.copy(src, dst))
    }

    /// Copy `length` bytes from `offset`.
    ///
    /// The result holds `min(length, max_slice_len)` bytes; positions past
    /// the end of the file read as zero.
    pub fn read_slice(&self, path: impl AsRef<Path>, offset: u64, length: usize) -> Result<Vec<u8>> {
        let path = path.as_ref();
        if length == 0 {
            return Err(FileKitError::InvalidArgument(
                "slice length must be greater than zero".to_string(),
            ));
        }
        if length > self.max_slice_len {
            debug!(
                path = %path.display(),
                requested = length,
                max = self.max_slice_len,
                "truncating slice request"
            );
        }

        let file = MappedFile::open(path)?;
        let bytes = file.read_padded(offset, length, self.max_slice_len)?;
        file.close();
        Ok(bytes)
    }

    /// Parse a file's EXIF metadata into a record
    pub fn parse_metadata(&self, path: impl AsRef<Path>) -> Result<MetadataRecord> {
        let path = path.as_ref();
        let file = MappedFile::open(path)?;
        ExifParser
            .parse(file.as_bytes())
            .map_err(|e| FileKitError::ParseFailure {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Best available capture time from the file's EXIF dates.
    ///
    /// Files without parseable metadata have no capture time.
    pub fn capture_time(&self, path: impl AsRef<Path>) -> Result<Option<NaiveDateTime>> {
        match self.parse_metadata(path) {
            Ok(record) => Ok(record.capture_time()),
            Err(FileKitError::ParseFailure { .. }) | Err(FileKitError::EmptyFile { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Bounded summary of a file's metadata, keeping whether it was complete
    pub fn metadata_summary(&self, path: impl AsRef<Path>) -> Result<MetadataSummary> {
        self.summaries.summarize_path(path)
    }

    /// Bounded summary of a file's metadata, or "no summary available"
    pub fn summarize_metadata(&self, path: impl AsRef<Path>) -> Result<String> {
        Ok(self.metadata_summary(path)?.into_text())
    }
}

/// [`Toolkit::get_fingerprint`] with the default configuration
pub fn get_fingerprint(path: impl AsRef<Path>, mode: FingerprintMode) -> Result<Digest> {
    Fingerprinter::new().fingerprint_path(path, mode)
}

/// [`Toolkit::compare_files`]
pub fn compare_files(a: impl AsRef<Path>, b: impl AsRef<Path>) -> Result<CompareResult> {
    comparator::compare_files(a, b)
}

/// [`Toolkit::copy_file`] with the platform backends
pub fn copy_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> CopyOutcome {
    CopyOutcome::from(Replicator::new().copy(src, dst))
}

/// [`Toolkit::read_slice`] with the default maximum slice size
pub fn read_slice(path: impl AsRef<Path>, offset: u64, length: usize) -> Result<Vec<u8>> {
    Toolkit::default().read_slice(path, offset, length)
}

/// [`Toolkit::summarize_metadata`] with the default capacity
pub fn summarize_metadata(path: impl AsRef<Path>) -> Result<String> {
    SummaryBuilder::default()
        .summarize_path(path)
        .map(|summary| summary.into_text())
}
