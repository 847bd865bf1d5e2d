//! # Photo FileKit
//!
//! Identify, compare, copy and summarize photo files without reading
//! them in full when that can be avoided.
//!
//! ## Architecture
//! - `core` - Mapping, fingerprinting, comparison, replication and summaries
//! - `api` - The boundary operations host applications call
//! - `config` - Toolkit settings, loadable from JSON
//! - `error` - User-friendly error types

pub mod api;
pub mod config;
pub mod core;
pub mod error;

// Re-export commonly used types at the crate root
pub use error::{ErrorKind, FileKitError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
