//! # Photo Archiver
//!
//! Sorts photos and videos into a date-organized archive and never stores
//! the same content twice.
//!
//! ## Core Philosophy
//! - **Never touch the source** - files are copied, inputs stay as they are
//! - **Never overwrite** - name collisions get a disambiguation id
//! - **One bad file is one bad file** - per-file failures never stop a run
//!
//! ## Architecture
//! - `core` - The archival engine
//! - `events` - Event-driven progress reporting
//! - `error` - Error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{ArchiveError, Result};

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is not set
const DEFAULT_LOG_FILTER: &str = "warn";
/// Filter for the optional log file
const DEFAULT_FILE_LOG_FILTER: &str = "info";

/// Initialize tracing for the application.
///
/// Logs go to stderr, filtered by `RUST_LOG`. With `log_file`, records are
/// also appended to that file without ANSI colors.
pub fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let stderr_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(stderr_filter);

    let file_layer = match log_file {
        Some(path) => {
            let file = open_log_file(path)
                .map_err(|e| ArchiveError::Logging(format!("{}: {}", path.display(), e)))?;
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILE_LOG_FILTER));
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ArchiveError::Logging(e.to_string()))
}

fn open_log_file(path: &Path) -> std::io::Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
