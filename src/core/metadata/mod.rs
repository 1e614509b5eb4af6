//! # Metadata Module
//!
//! Derives the named attributes that drive output naming and bucketing.
//!
//! ## Date Cascade
//! Each media kind supplies an ordered list of [`DateTier`]s. The first tier
//! that yields a usable date wins:
//! 1. Embedded `DateTimeOriginal` (images)
//! 2. Embedded `DateTime` (images)
//! 3. Date in the file name (`YYYY-MM-DD HH.MM.SS` or `DD-MM-YY HH MM SS`)
//! 4. Filesystem timestamp (videos)
//!
//! When every tier fails, a sentinel date of 1900-01-01 (keeping the current
//! time of day) marks the date as unknown.
//!
//! ## Attributes
//! Date components are produced twice: once for the capture time and once,
//! with a `_` suffix, shifted back by the night-shift offset so that a
//! recording session running past midnight stays on one "photo day".

mod date;
mod embedded;
mod resolver;

pub use date::{date_from_file_name, date_vars, parse_exif_datetime, sentinel_date, DateTier};
pub use embedded::{read_embedded_tags, EmbeddedTags};
pub use resolver::{Device, Inspection, MetadataResolver, ResolveContext};

use serde::Serialize;
use std::collections::BTreeMap;

/// Default offset, in hours, for the shifted ("photo night") date attributes.
///
/// Applied to every media kind.
pub const DEFAULT_NIGHT_SHIFT_HOURS: i64 = 5;

/// Attribute keys produced for both the capture date and its shifted variant
pub const DATE_KEYS: [&str; 14] = [
    "yyyy", "ce", "yy", "m", "mm", "mmm", "MMM", "d", "dd", "doy", "dow", "HH", "MM", "SS",
];

/// Non-date attribute keys every resolved set carries
pub const DEVICE_AND_NAME_KEYS: [&str; 7] = ["make", "model", "base", "stem", "ext", "user", "id"];

/// Suffix marking the night-shifted date attributes
pub const SHIFTED_SUFFIX: &str = "_";

/// Which tier of the cascade produced the capture date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    /// Named embedded tag (`DateTimeOriginal`, `DateTime`)
    Embedded(&'static str),
    FileName,
    FileTimestamp,
    /// No source produced a date
    Sentinel,
}

impl std::fmt::Display for DateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateSource::Embedded(tag) => write!(f, "embedded {}", tag),
            DateSource::FileName => write!(f, "file name"),
            DateSource::FileTimestamp => write!(f, "file timestamp"),
            DateSource::Sentinel => write!(f, "unknown"),
        }
    }
}

/// Named placeholder values for one media file.
///
/// Keys match template placeholders. The only value that changes after
/// resolution is the disambiguation `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAttributes {
    values: BTreeMap<String, String>,
    date_source: DateSource,
}

impl ResolvedAttributes {
    pub(crate) fn new(values: BTreeMap<String, String>, date_source: DateSource) -> Self {
        Self {
            values,
            date_source,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn date_source(&self) -> DateSource {
        self.date_source
    }

    /// Set the disambiguation id (`""`, `"a"`..`"z"`)
    pub fn set_id(&mut self, id: &str) {
        self.values.insert("id".to_string(), id.to_string());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Whether a placeholder name can appear in a resolved attribute set.
///
/// GPS attributes are only present when the file carries them.
pub fn is_known_key(key: &str) -> bool {
    let date_key = key.strip_suffix(SHIFTED_SUFFIX).unwrap_or(key);
    DATE_KEYS.contains(&key)
        || DATE_KEYS.contains(&date_key)
        || DEVICE_AND_NAME_KEYS.contains(&key)
        || key.starts_with("gps_")
}

/// Make a value safe to use as a path component.
///
/// Lowercases, trims, replaces spaces and path separators with `_` and drops
/// NUL bytes.
pub fn to_filename_component(value: &str) -> String {
    value
        .replace('\0', "")
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}
