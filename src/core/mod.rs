//! # Core Module
//!
//! The file-processing engine behind the toolkit API.
//!
//! ## Modules
//! - `mapped` - Scoped read-only memory maps
//! - `fingerprint` - Full and sampled MD5 fingerprints
//! - `comparator` - Exact byte-level comparison
//! - `replicator` - Metadata-preserving copies over kernel fast paths
//! - `metadata` - Extracts EXIF metadata from photos
//! - `summary` - Bounded structured summaries of metadata

pub mod comparator;
pub mod fingerprint;
pub mod mapped;
pub mod metadata;
pub mod replicator;
pub mod summary;

// Re-export commonly used types
pub use comparator::CompareResult;
pub use fingerprint::{Digest, FingerprintConfig, FingerprintMode, Fingerprinter};
pub use mapped::MappedFile;
pub use metadata::MetadataRecord;
pub use replicator::{CopyOutcome, CopyReport, Replicator};
pub use summary::{MetadataSummary, SummaryBuilder};
