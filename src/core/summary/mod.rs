//! # Summary Module
//!
//! Renders a [`MetadataRecord`] as one flat JSON-shaped object through a
//! [`BoundedWriter`], so the output never exceeds the requested capacity.
//!
//! Fields are always emitted in the same order. Strings and dates are
//! quoted; numbers are bare. Values are not escaped.

mod writer;

pub use writer::{BoundedWriter, FieldValue};

use super::mapped::MappedFile;
use super::metadata::{ExifParser, MetadataParser, MetadataRecord};
use crate::error::{FileKitError, Result};
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Default summary capacity in bytes
pub const DEFAULT_SUMMARY_CAPACITY: usize = 1024;

/// Returned in place of a document when no metadata could be parsed
pub const NO_SUMMARY: &str = "no summary available";

/// Summary keys, in emission order
pub const SUMMARY_KEYS: [&str; 14] = [
    "Make",
    "Model",
    "ImageWidth",
    "ImageHeight",
    "DateTime",
    "DateTimeOriginal",
    "DateTimeDigitized",
    "ExposureTime",
    "FNumber",
    "ISO",
    "FocalLengthIn35mmFormat",
    "GPSLatitude",
    "GPSLongitude",
    "GPSAltitude",
];

/// Result of summarizing a file
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataSummary {
    /// A complete document
    Document(String),
    /// Capacity ran out; the text is a prefix of the full document
    Truncated(String),
    /// The file carried no parseable metadata
    Unavailable,
}

impl MetadataSummary {
    pub fn is_available(&self) -> bool {
        !matches!(self, MetadataSummary::Unavailable)
    }

    pub fn as_str(&self) -> &str {
        match self {
            MetadataSummary::Document(text) | MetadataSummary::Truncated(text) => text,
            MetadataSummary::Unavailable => NO_SUMMARY,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            MetadataSummary::Document(text) | MetadataSummary::Truncated(text) => text,
            MetadataSummary::Unavailable => NO_SUMMARY.to_string(),
        }
    }
}

impl fmt::Display for MetadataSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds bounded summaries with a pluggable metadata parser
pub struct SummaryBuilder {
    capacity: usize,
    parser: Box<dyn MetadataParser>,
}

impl Default for SummaryBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SUMMARY_CAPACITY)
    }
}

impl SummaryBuilder {
    /// Builder using the EXIF parser
    pub fn new(capacity: usize) -> Self {
        Self::with_parser(capacity, Box::new(ExifParser))
    }

    pub fn with_parser(capacity: usize, parser: Box<dyn MetadataParser>) -> Self {
        Self { capacity, parser }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Render a record into a writer of this builder's capacity
    pub fn render(&self, record: &MetadataRecord) -> BoundedWriter {
        let mut writer = BoundedWriter::with_capacity(self.capacity);
        let values: [FieldValue<'_>; 14] = [
            (&record.make).into(),
            (&record.model).into(),
            record.image_width.into(),
            record.image_height.into(),
            (&record.date_time).into(),
            (&record.date_time_original).into(),
            (&record.date_time_digitized).into(),
            record.exposure_time.into(),
            record.f_number.into(),
            record.iso.into(),
            record.focal_length_35mm.into(),
            record.gps_latitude.into(),
            record.gps_longitude.into(),
            record.gps_altitude.into(),
        ];

        writer.begin_object();
        let last = SUMMARY_KEYS.len() - 1;
        for (i, (key, value)) in SUMMARY_KEYS.iter().zip(values).enumerate() {
            writer.write_field(key, value, i == last);
        }
        writer.end_object();
        writer
    }

    /// Summarize an already parsed record
    pub fn summarize(&self, record: &MetadataRecord) -> MetadataSummary {
        let writer = self.render(record);
        if writer.is_completed() {
            MetadataSummary::Document(writer.into_string())
        } else {
            warn!(capacity = self.capacity, "Summary truncated");
            MetadataSummary::Truncated(writer.into_string())
        }
    }

    /// Parse raw file bytes and summarize them
    pub fn summarize_bytes(&self, bytes: &[u8]) -> MetadataSummary {
        match self.parser.parse(bytes) {
            Ok(record) => self.summarize(&record),
            Err(e) => {
                debug!("No metadata: {}", e);
                MetadataSummary::Unavailable
            }
        }
    }

    /// Map a file and summarize its metadata.
    ///
    /// Empty files have no metadata and yield [`MetadataSummary::Unavailable`].
    pub fn summarize_path(&self, path: impl AsRef<Path>) -> Result<MetadataSummary> {
        let path = path.as_ref();
        let file = match MappedFile::open(path) {
            Ok(file) => file,
            Err(FileKitError::EmptyFile { .. }) => return Ok(MetadataSummary::Unavailable),
            Err(e) => return Err(e),
        };

        let summary = self.summarize_bytes(file.as_bytes());
        file.close();
        Ok(summary)
    }
}

/// Summarize a record with the default capacity, returning plain text
pub fn summarize(record: &MetadataRecord) -> String {
    SummaryBuilder::default().summarize(record).into_text()
}
