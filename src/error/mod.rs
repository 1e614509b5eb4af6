//! # Error Module
//!
//! Error types for the photo archiver.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, template text, what went wrong
//! - **Per-file errors stay per-file** - only [`ArchiveError`] ends a run

use std::path::PathBuf;
use thiserror::Error;

/// Run-level error. Anything that reaches `main` through this type
/// stops the run with a nonzero exit code.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Output directory unavailable: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}

/// Errors that occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid value for [{section}] {key}: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        reason: String,
    },

    #[error("Invalid template for [{section}] {key}: {source}")]
    InvalidTemplate {
        section: String,
        key: String,
        #[source]
        source: TemplateError,
    },
}

/// Errors that occur while walking input directories
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to read {path}: {reason}")]
    Walk { path: PathBuf, reason: String },
}

/// Errors that stop processing of a single file.
///
/// The engine logs these and moves on to the next file.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("Cannot decode {path} as {kind}: {reason}")]
    Undecodable {
        path: PathBuf,
        kind: String,
        reason: String,
    },

    #[error("Fingerprint failed: {0}")]
    Fingerprint(#[from] FingerprintError),

    #[error("Naming failed: {0}")]
    Template(#[from] TemplateError),

    #[error("No free output slot for {path} (tried {attempts} disambiguation ids)")]
    OutputSlotsExhausted { path: PathBuf, attempts: usize },

    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Registry failed: {0}")]
    Registry(#[from] RegistryError),
}

/// Errors that occur while computing a fingerprint
#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
}

/// Errors that occur while copying a file into the archive
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open source {path}: {source}")]
    OpenSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create destination {path}: {source}")]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy permissions or timestamps to {path}: {source}")]
    PreserveMetadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur with a fingerprint registry bucket
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to read registry {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Registry corruption detected at {path}: {reason}. Fix or move this file and try again.")]
    Corrupted { path: PathBuf, reason: String },

    #[error("Failed to write registry {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Registry lock for {path} was poisoned by a panicking writer")]
    LockPoisoned { path: PathBuf },
}

/// Errors in naming templates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Unknown placeholder {{{name}}} in template \"{template}\"")]
    UnknownPlaceholder { name: String, template: String },

    #[error("Unbalanced braces in template \"{template}\"")]
    Unbalanced { template: String },

    #[error("No value for {{{name}}} in template \"{template}\"")]
    MissingValue { name: String, template: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ArchiveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/photos/import"),
        };
        assert!(error.to_string().contains("/photos/import"));
    }

    #[test]
    fn slots_exhausted_reports_attempts() {
        let error = FileError::OutputSlotsExhausted {
            path: PathBuf::from("/archive/2024/img_0001.jpg"),
            attempts: 27,
        };
        let message = error.to_string();
        assert!(message.contains("/archive/2024/img_0001.jpg"));
        assert!(message.contains("27"));
    }

    #[test]
    fn corrupted_registry_suggests_recovery() {
        let error = RegistryError::Corrupted {
            path: PathBuf::from("/archive/checksums.json"),
            reason: "expected value at line 1".to_string(),
        };
        assert!(error.to_string().contains("move this file"));
    }

    #[test]
    fn unknown_placeholder_shows_braces() {
        let error = TemplateError::UnknownPlaceholder {
            name: "camera".to_string(),
            template: "{camera}.{ext}".to_string(),
        };
        assert!(error.to_string().contains("{camera}"));
    }
}
