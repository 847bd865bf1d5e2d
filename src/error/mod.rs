//! # Error Module
//!
//! Typed failures for every file operation in the toolkit.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, the operation that failed, the OS reason
//! - **Distinguishable kinds** - callers branch on [`ErrorKind`], not on message text
//! - **No stale results** - a failed operation never yields a zeroed value

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level toolkit error
#[derive(Error, Debug)]
pub enum FileKitError {
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to {op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Destination already exists: {path}. Choose another name or remove it first.")]
    AlreadyExists { path: PathBuf },

    #[error("File is empty and cannot be mapped: {path}")]
    EmptyFile { path: PathBuf },

    #[error("Not a regular file: {path}")]
    NotAFile { path: PathBuf },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to parse metadata in {path}: {reason}")]
    ParseFailure { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure categories visible to callers of the toolkit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    Io,
    AlreadyExists,
    InvalidArgument,
    ParseFailure,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::PermissionDenied => "permission denied",
            ErrorKind::Io => "I/O error",
            ErrorKind::AlreadyExists => "already exists",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::ParseFailure => "parse failure",
        };
        f.write_str(name)
    }
}

impl FileKitError {
    /// Classify an I/O error raised while performing `op` on `path`.
    pub fn from_io(op: &'static str, path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => FileKitError::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => FileKitError::PermissionDenied {
                path: path.to_path_buf(),
            },
            io::ErrorKind::AlreadyExists => FileKitError::AlreadyExists {
                path: path.to_path_buf(),
            },
            _ => FileKitError::Io {
                op,
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// The category of this failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            FileKitError::NotFound { .. } => ErrorKind::NotFound,
            FileKitError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            FileKitError::Io { .. } => ErrorKind::Io,
            FileKitError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            FileKitError::EmptyFile { .. }
            | FileKitError::NotAFile { .. }
            | FileKitError::InvalidArgument(_)
            | FileKitError::Config(_) => ErrorKind::InvalidArgument,
            FileKitError::ParseFailure { .. } => ErrorKind::ParseFailure,
        }
    }

    /// OS error code behind this failure, when there is one.
    ///
    /// Variants classified from an I/O error keep only the path, so the
    /// code is reconstructed from the errno the kind implies.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            FileKitError::Io { source, .. } => source.raw_os_error(),
            FileKitError::NotFound { .. } => Some(libc::ENOENT),
            FileKitError::PermissionDenied { .. } => Some(libc::EACCES),
            FileKitError::AlreadyExists { .. } => Some(libc::EEXIST),
            _ => None,
        }
    }
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, FileKitError>;
