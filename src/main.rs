//! # photo-filekit CLI
//!
//! Command-line front end for the photo file toolkit.
//!
//! ## Usage
//! ```bash
//! photo-filekit fingerprint ~/Photos/*.jpg --mode sampled
//! photo-filekit compare a.jpg b.jpg --output json
//! photo-filekit copy a.jpg backup/a.jpg
//! ```

mod cli;

use photo_filekit::Result;

fn main() -> Result<()> {
    photo_filekit::init_tracing();
    cli::run()
}
