//! Capture date derivation and date attributes.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use std::collections::BTreeMap;

/// EXIF date format (`2019:07:14 18:02:33`)
const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// File name date patterns, tried in order against the tail of the stem
const FILE_NAME_PATTERNS: [(usize, &str); 2] =
    [(19, "%Y-%m-%d %H.%M.%S"), (17, "%d-%m-%y %H %M %S")];

/// One step of a date cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTier {
    /// Named embedded tag in EXIF format
    EmbeddedTag(&'static str),
    /// Date encoded at the end of the file stem
    FileName,
    /// Filesystem creation time, else modification time
    FileTimestamp,
}

/// Parse an EXIF date string. Returns `None` for blank or zeroed dates.
pub fn parse_exif_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), EXIF_DATETIME_FORMAT).ok()
}

/// Recover a date from the end of a file stem.
///
/// `"Holiday 2019-07-14 18.02.33"` and `"14-07-19 18 02 33"` both parse.
pub fn date_from_file_name(stem: &str) -> Option<NaiveDateTime> {
    FILE_NAME_PATTERNS.iter().find_map(|(len, format)| {
        let tail = last_chars(stem, *len)?;
        NaiveDateTime::parse_from_str(tail, format).ok()
    })
}

/// The "unknown date" marker: `now` with the date forced to 1900-01-01
pub fn sentinel_date(now: NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .map(|date| date.and_time(now.time()))
        .unwrap_or(now)
}

/// Date attributes for one point in time, each key followed by `suffix`.
pub fn date_vars(dt: &NaiveDateTime, suffix: &str) -> BTreeMap<String, String> {
    let yyyy = dt.format("%Y").to_string();
    let ce: String = yyyy.chars().take(2).collect();
    let month_abbrev = dt.format("%b").to_string();

    let vars = [
        ("yyyy", yyyy.clone()),
        ("ce", ce),
        ("yy", dt.format("%y").to_string()),
        ("m", dt.month().to_string()),
        ("mm", dt.format("%m").to_string()),
        ("mmm", month_abbrev.to_lowercase()),
        ("MMM", month_abbrev.to_uppercase()),
        ("d", dt.day().to_string()),
        ("dd", dt.format("%d").to_string()),
        ("doy", dt.format("%j").to_string()),
        ("dow", dt.weekday().num_days_from_sunday().to_string()),
        ("HH", format!("{:02}", dt.hour())),
        ("MM", format!("{:02}", dt.minute())),
        ("SS", format!("{:02}", dt.second())),
    ];

    vars.into_iter()
        .map(|(key, value)| (format!("{}{}", key, suffix), value))
        .collect()
}

fn last_chars(s: &str, n: usize) -> Option<&str> {
    let count = s.chars().count();
    if count < n {
        return None;
    }
    let start = s
        .char_indices()
        .nth(count - n)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    Some(&s[start..])
}
