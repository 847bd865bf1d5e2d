//! # Metadata Module
//!
//! Turns raw photo bytes into a flat [`MetadataRecord`].
//!
//! ## Extracted Fields
//! - Camera make and model
//! - Image dimensions (pixel dimensions, falling back to image width/length)
//! - DateTime, DateTimeOriginal, DateTimeDigitized
//! - Exposure time, f-number, ISO, 35 mm focal length
//! - GPS latitude/longitude (signed decimal degrees) and altitude (signed metres)
//!
//! ## Supported Formats
//! Whatever `kamadak-exif` reads from a container: JPEG, TIFF, HEIF,
//! PNG and WebP. Other parsers plug in through [`MetadataParser`].

use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use thiserror::Error;

/// EXIF date format: "YYYY:MM:DD HH:MM:SS"
const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Parsed photo metadata.
///
/// Attributes missing from the source are left at their zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Camera make (e.g., "NIKON CORPORATION")
    pub make: String,
    /// Camera model (e.g., "NIKON D750")
    pub model: String,
    /// Image width in pixels
    pub image_width: u32,
    /// Image height in pixels
    pub image_height: u32,
    /// File change date/time, EXIF format
    pub date_time: String,
    /// Original capture date/time, EXIF format
    pub date_time_original: String,
    /// Digitization date/time, EXIF format
    pub date_time_digitized: String,
    /// Exposure time in seconds
    pub exposure_time: f64,
    /// F-number
    pub f_number: f64,
    /// ISO sensitivity
    pub iso: u32,
    /// Focal length in 35 mm equivalent millimetres
    pub focal_length_35mm: u32,
    /// Latitude in decimal degrees, negative for south
    pub gps_latitude: f64,
    /// Longitude in decimal degrees, negative for west
    pub gps_longitude: f64,
    /// Altitude in metres, negative below sea level
    pub gps_altitude: f64,
}

impl MetadataRecord {
    /// Best available capture time.
    ///
    /// Tries DateTimeOriginal, then DateTimeDigitized, then DateTime.
    pub fn capture_time(&self) -> Option<NaiveDateTime> {
        [
            &self.date_time_original,
            &self.date_time_digitized,
            &self.date_time,
        ]
        .into_iter()
        .find_map(|s| parse_exif_date(s))
    }
}

/// Errors raised by a metadata parser
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("no EXIF data found")]
    NoExif,

    #[error("malformed EXIF data: {0}")]
    Malformed(String),
}

/// Parses raw file bytes into a metadata record
pub trait MetadataParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<MetadataRecord, MetadataError>;
}

/// [`MetadataParser`] backed by `kamadak-exif`
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifParser;

impl MetadataParser for ExifParser {
    fn parse(&self, bytes: &[u8]) -> Result<MetadataRecord, MetadataError> {
        let exif = Reader::new()
            .read_from_container(&mut Cursor::new(bytes))
            .map_err(|e| match e {
                exif::Error::NotFound(_) => MetadataError::NoExif,
                other => MetadataError::Malformed(other.to_string()),
            })?;

        let field = |tag: Tag| exif.get_field(tag, In::PRIMARY).map(|f| &f.value);
        let mut record = MetadataRecord::default();

        record.make = field(Tag::Make).and_then(get_string_value).unwrap_or_default();
        record.model = field(Tag::Model).and_then(get_string_value).unwrap_or_default();

        // Prefer actual pixel dimensions
        record.image_width = field(Tag::PixelXDimension)
            .or_else(|| field(Tag::ImageWidth))
            .and_then(get_u32_value)
            .unwrap_or_default();
        record.image_height = field(Tag::PixelYDimension)
            .or_else(|| field(Tag::ImageLength))
            .and_then(get_u32_value)
            .unwrap_or_default();

        record.date_time = field(Tag::DateTime).and_then(get_string_value).unwrap_or_default();
        record.date_time_original = field(Tag::DateTimeOriginal)
            .and_then(get_string_value)
            .unwrap_or_default();
        record.date_time_digitized = field(Tag::DateTimeDigitized)
            .and_then(get_string_value)
            .unwrap_or_default();

        record.exposure_time = field(Tag::ExposureTime).and_then(get_f64_value).unwrap_or_default();
        record.f_number = field(Tag::FNumber).and_then(get_f64_value).unwrap_or_default();
        record.iso = field(Tag::PhotographicSensitivity)
            .and_then(get_u32_value)
            .unwrap_or_default();
        record.focal_length_35mm = field(Tag::FocalLengthIn35mmFilm)
            .and_then(get_u32_value)
            .unwrap_or_default();

        if let Some(degrees) = field(Tag::GPSLatitude).and_then(get_degrees) {
            let south = field(Tag::GPSLatitudeRef).and_then(get_string_value).as_deref() == Some("S");
            record.gps_latitude = if south { -degrees } else { degrees };
        }
        if let Some(degrees) = field(Tag::GPSLongitude).and_then(get_degrees) {
            let west = field(Tag::GPSLongitudeRef).and_then(get_string_value).as_deref() == Some("W");
            record.gps_longitude = if west { -degrees } else { degrees };
        }
        if let Some(metres) = field(Tag::GPSAltitude).and_then(get_f64_value) {
            let below_sea_level = field(Tag::GPSAltitudeRef).and_then(get_u32_value) == Some(1);
            record.gps_altitude = if below_sea_level { -metres } else { metres };
        }

        Ok(record)
    }
}

/// Parse an EXIF "YYYY:MM:DD HH:MM:SS" timestamp, ignoring any suffix
pub fn parse_exif_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.get(..19)?;
    NaiveDateTime::parse_from_str(s, EXIF_DATE_FORMAT).ok()
}

/// Convert degrees, minutes, seconds to decimal degrees
pub fn dms_to_degrees(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60.0 + seconds / 3600.0
}

/// Helper to extract u32 from various EXIF value types
fn get_u32_value(value: &Value) -> Option<u32> {
    match value {
        Value::Long(vec) => vec.first().copied(),
        Value::Short(vec) => vec.first().map(|v| *v as u32),
        Value::Byte(vec) => vec.first().map(|v| *v as u32),
        _ => None,
    }
}

/// Helper to extract a rational as f64
fn get_f64_value(value: &Value) -> Option<f64> {
    match value {
        Value::Rational(vec) => vec.first().filter(|r| r.denom != 0).map(|r| r.to_f64()),
        Value::SRational(vec) => vec.first().filter(|r| r.denom != 0).map(|r| r.to_f64()),
        _ => None,
    }
}

/// Helper to extract a degrees/minutes/seconds triple as decimal degrees
fn get_degrees(value: &Value) -> Option<f64> {
    match value {
        Value::Rational(vec) if vec.len() >= 3 && vec[..3].iter().all(|r| r.denom != 0) => Some(
            dms_to_degrees(vec[0].to_f64(), vec[1].to_f64(), vec[2].to_f64()),
        ),
        _ => None,
    }
}

/// Helper to extract string from EXIF ASCII value
fn get_string_value(value: &Value) -> Option<String> {
    if let Value::Ascii(ref vec) = value {
        if let Some(bytes) = vec.first() {
            if let Ok(s) = std::str::from_utf8(bytes) {
                let trimmed = s.trim_end_matches('\0').trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}
