//! # CLI Module
//!
//! Command-line interface for the photo file toolkit.
//!
//! ## Usage
//! ```bash
//! # Sampled fingerprints of many photos, computed in parallel
//! photo-filekit fingerprint ~/Photos/*.jpg
//!
//! # Check a stored digest
//! photo-filekit verify IMG_0001.jpg 5eb63bbbe01eeed093cb22bb8f5acdc3 --mode full
//!
//! # Exact comparison, JSON output
//! photo-filekit compare a.jpg b.jpg --output json
//!
//! # Metadata-preserving copy to a new file
//! photo-filekit copy a.jpg backup/a.jpg
//!
//! # First 64 bytes as hex
//! photo-filekit read a.jpg --offset 0 --length 64
//!
//! # EXIF summary
//! photo-filekit summary a.jpg
//! ```

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use photo_filekit::api::Toolkit;
use photo_filekit::config::ToolkitConfig;
use photo_filekit::core::fingerprint::{Digest, FingerprintMode};
use photo_filekit::core::summary::MetadataSummary;
use photo_filekit::error::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process;

/// Photo FileKit - fingerprint, compare, copy and summarize photos
#[derive(Parser, Debug)]
#[command(name = "photo-filekit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "pretty")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fingerprint one or more files
    Fingerprint {
        /// Files to fingerprint
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Hash the whole file or sampled windows
        #[arg(short, long, default_value = "sampled")]
        mode: Mode,
    },

    /// Check a file against a stored fingerprint
    Verify {
        path: PathBuf,

        /// Expected digest as 32 hex characters
        digest: String,

        #[arg(short, long, default_value = "sampled")]
        mode: Mode,
    },

    /// Compare two files byte for byte
    Compare { a: PathBuf, b: PathBuf },

    /// Copy a file to a new destination, keeping its timestamps
    Copy { src: PathBuf, dst: PathBuf },

    /// Read a slice of a file
    Read {
        path: PathBuf,

        #[arg(long, default_value = "0")]
        offset: u64,

        #[arg(short, long, default_value = "256")]
        length: usize,
    },

    /// Summarize a photo's EXIF metadata
    Summary { path: PathBuf },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Hash every byte
    Full,
    /// Hash three windows of large files
    Sampled,
}

impl From<Mode> for FingerprintMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Full => FingerprintMode::Full,
            Mode::Sampled => FingerprintMode::Sampled,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ToolkitConfig::load(path)?,
        None => ToolkitConfig::load_default()?,
    };
    let toolkit = Toolkit::from_config(&config)?;
    let term = Term::stdout();

    match cli.command {
        Commands::Fingerprint { paths, mode } => {
            run_fingerprint(&term, &toolkit, &paths, mode.into(), cli.output)
        }
        Commands::Verify { path, digest, mode } => {
            run_verify(&term, &toolkit, &path, &digest, mode.into(), cli.output)
        }
        Commands::Compare { a, b } => run_compare(&term, &toolkit, &a, &b, cli.output),
        Commands::Copy { src, dst } => run_copy(&term, &toolkit, &src, &dst, cli.output),
        Commands::Read {
            path,
            offset,
            length,
        } => run_read(&term, &toolkit, &path, offset, length, cli.output),
        Commands::Summary { path } => run_summary(&term, &toolkit, &path, cli.output),
    }
}

fn run_fingerprint(
    term: &Term,
    toolkit: &Toolkit,
    paths: &[PathBuf],
    mode: FingerprintMode,
    output: OutputFormat,
) -> Result<()> {
    let results: Vec<(&PathBuf, Result<Digest>)> = paths
        .par_iter()
        .map(|path| (path, toolkit.get_fingerprint(path, mode)))
        .collect();

    let failures = results.iter().filter(|(_, r)| r.is_err()).count();

    match output {
        OutputFormat::Pretty => {
            for (path, result) in &results {
                let line = match result {
                    Ok(digest) => format!("{}  {}", style(digest).cyan(), path.display()),
                    Err(e) => format!("{} {}", style("✗").red().bold(), style(e).red()),
                };
                term.write_line(&line).ok();
            }
            if failures > 0 {
                term.write_line(&format!(
                    "{}",
                    style(format!("{} of {} files failed", failures, results.len())).dim()
                ))
                .ok();
            }
        }
        OutputFormat::Json => {
            let items: Vec<_> = results
                .iter()
                .map(|(path, result)| match result {
                    Ok(digest) => serde_json::json!({
                        "path": path,
                        "mode": mode,
                        "digest": digest,
                    }),
                    Err(e) => serde_json::json!({
                        "path": path,
                        "mode": mode,
                        "error": e.to_string(),
                        "kind": e.kind(),
                    }),
                })
                .collect();
            print_json(&serde_json::Value::Array(items));
        }
    }

    if failures > 0 {
        process::exit(1);
    }
    Ok(())
}

fn run_verify(
    term: &Term,
    toolkit: &Toolkit,
    path: &Path,
    digest: &str,
    mode: FingerprintMode,
    output: OutputFormat,
) -> Result<()> {
    let expected: Digest = digest.parse()?;
    let matches = toolkit.fingerprinter().verify(path, &expected, mode)?;

    match output {
        OutputFormat::Pretty => {
            let line = if matches {
                format!("{} {}", style("✓").green().bold(), path.display())
            } else {
                format!(
                    "{} {} does not match {}",
                    style("✗").red().bold(),
                    path.display(),
                    expected
                )
            };
            term.write_line(&line).ok();
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "path": path,
            "mode": mode,
            "expected": expected,
            "matches": matches,
        })),
    }

    if !matches {
        process::exit(1);
    }
    Ok(())
}

fn run_compare(
    term: &Term,
    toolkit: &Toolkit,
    a: &Path,
    b: &Path,
    output: OutputFormat,
) -> Result<()> {
    let result = toolkit.compare_files(a, b)?;

    match output {
        OutputFormat::Pretty => {
            let verdict = if result.is_equal() {
                style(result.to_string()).green().bold()
            } else {
                style(result.to_string()).yellow().bold()
            };
            term.write_line(&format!("{}: {} / {}", verdict, a.display(), b.display()))
                .ok();
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "a": a,
            "b": b,
            "result": result,
        })),
    }
    Ok(())
}

fn run_copy(
    term: &Term,
    toolkit: &Toolkit,
    src: &Path,
    dst: &Path,
    output: OutputFormat,
) -> Result<()> {
    let outcome = toolkit.copy_file(src, dst);

    match output {
        OutputFormat::Pretty => {
            let line = match (&outcome.method, &outcome.error_message) {
                (Some(method), _) if outcome.ok => format!(
                    "{} Copied {} to {} via {}",
                    style("✓").green().bold(),
                    format_bytes(outcome.bytes_copied),
                    dst.display(),
                    style(method).cyan()
                ),
                (_, Some(message)) => format!("{} {}", style("✗").red().bold(), style(message).red()),
                _ => format!("{} Copy failed", style("✗").red().bold()),
            };
            term.write_line(&line).ok();
        }
        OutputFormat::Json => print_json(&outcome),
    }

    if !outcome.ok {
        process::exit(outcome.error_code.unwrap_or(1).clamp(1, 255));
    }
    Ok(())
}

fn run_read(
    term: &Term,
    toolkit: &Toolkit,
    path: &Path,
    offset: u64,
    length: usize,
    output: OutputFormat,
) -> Result<()> {
    let bytes = toolkit.read_slice(path, offset, length)?;

    match output {
        OutputFormat::Pretty => {
            if length > bytes.len() {
                term.write_line(&format!(
                    "{}",
                    style(format!(
                        "Request truncated to {} bytes",
                        toolkit.max_slice_len()
                    ))
                    .dim()
                ))
                .ok();
            }
            for (i, row) in bytes.chunks(16).enumerate() {
                let hex: Vec<String> = row.iter().map(|b| format!("{:02x}", b)).collect();
                term.write_line(&format!(
                    "{}  {}",
                    style(format!("{:08x}", offset + (i * 16) as u64)).dim(),
                    hex.join(" ")
                ))
                .ok();
            }
        }
        OutputFormat::Json => {
            let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
            print_json(&serde_json::json!({
                "path": path,
                "offset": offset,
                "length": bytes.len(),
                "hex": hex,
            }));
        }
    }
    Ok(())
}

fn run_summary(term: &Term, toolkit: &Toolkit, path: &Path, output: OutputFormat) -> Result<()> {
    let summary = toolkit.metadata_summary(path)?;
    let captured = toolkit.capture_time(path)?;

    match output {
        OutputFormat::Json => print_json(&summary_json(path, &summary, captured)),
        OutputFormat::Pretty => {
            term.write_line(&format!("{}", style(path.display()).bold())).ok();
            if let Some(time) = captured {
                term.write_line(&format!("  {} {}", style("Captured:").dim(), time))
                    .ok();
            }
            term.write_line(summary.as_str()).ok();
            if let MetadataSummary::Truncated(_) = summary {
                term.write_line(&format!("{}", style("(summary truncated)").dim()))
                    .ok();
            }
        }
    }
    Ok(())
}

/// JSON envelope for a summary. A document that parses is embedded as an
/// object; a truncated one stays text.
fn summary_json(
    path: &Path,
    summary: &MetadataSummary,
    captured: Option<NaiveDateTime>,
) -> serde_json::Value {
    let document = match summary {
        MetadataSummary::Unavailable => serde_json::Value::Null,
        MetadataSummary::Document(text) | MetadataSummary::Truncated(text) => {
            serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.clone()))
        }
    };

    serde_json::json!({
        "path": path,
        "summary": document,
        "truncated": matches!(summary, MetadataSummary::Truncated(_)),
        "capture_time": captured.map(|time| time.to_string()),
    })
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
