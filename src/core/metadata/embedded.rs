//! Embedded (EXIF) tag extraction.
//!
//! EXIF metadata is typically found in JPEG and TIFF files. A file without an
//! EXIF block yields `None`, which is distinct from a block that carries none
//! of the tags we look at (an empty [`EmbeddedTags`]).

use exif::{Field, In, Reader, Tag, Value};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Tags consulted by the metadata cascade, with the names they are stored under
const NAMED_TAGS: &[(Tag, &str)] = &[
    (Tag::DateTimeOriginal, "DateTimeOriginal"),
    (Tag::DateTime, "DateTime"),
    (Tag::Make, "Make"),
    (Tag::Model, "Model"),
    (Tag::GPSLatitudeRef, "GPSLatitudeRef"),
    (Tag::GPSLatitude, "GPSLatitude"),
    (Tag::GPSLongitudeRef, "GPSLongitudeRef"),
    (Tag::GPSLongitude, "GPSLongitude"),
    (Tag::GPSAltitudeRef, "GPSAltitudeRef"),
    (Tag::GPSAltitude, "GPSAltitude"),
    (Tag::GPSTimeStamp, "GPSTimeStamp"),
    (Tag::GPSDateStamp, "GPSDateStamp"),
];

/// Embedded tag values keyed by tag name (`"DateTimeOriginal"`, `"Make"`, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedTags {
    values: BTreeMap<String, String>,
}

impl EmbeddedTags {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// GPS tags present in the block, in tag-name order
    pub fn gps(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .filter(|(name, _)| name.starts_with("GPS"))
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EmbeddedTags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Read the embedded tags of a file.
///
/// Returns `None` when the file cannot be read or has no EXIF block.
pub fn read_embedded_tags(path: &Path) -> Option<EmbeddedTags> {
    let file = File::open(path).ok()?;
    let mut bufreader = BufReader::new(file);
    let exif_reader = Reader::new().read_from_container(&mut bufreader).ok()?;

    let values = NAMED_TAGS
        .iter()
        .filter_map(|(tag, name)| {
            let field = exif_reader.get_field(*tag, In::PRIMARY)?;
            field_to_string(field).map(|value| (name.to_string(), value))
        })
        .collect();

    Some(EmbeddedTags { values })
}

fn field_to_string(field: &Field) -> Option<String> {
    match field.value {
        Value::Ascii(ref vec) => vec.first().and_then(|bytes| get_string_value(bytes)),
        _ => {
            let shown = field.display_value().to_string();
            (!shown.is_empty()).then_some(shown)
        }
    }
}

/// Helper to extract a trimmed string from an EXIF ASCII value
fn get_string_value(bytes: &[u8]) -> Option<String> {
    let s = std::str::from_utf8(bytes).ok()?;
    let trimmed = s.trim_end_matches('\0').trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
