//! Attribute resolution for one media file.

use super::date::{date_from_file_name, date_vars, parse_exif_datetime, sentinel_date, DateTier};
use super::embedded::EmbeddedTags;
use super::{to_filename_component, DateSource, ResolvedAttributes, DEFAULT_NIGHT_SHIFT_HOURS, SHIFTED_SUFFIX};
use crate::core::media::MediaFile;
use chrono::{DateTime, Duration, Local, NaiveDateTime};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

/// Camera-style original names: `IMG_0001.JPG`, `dsc1234.jpeg`, `SAM_0042.jpg`
static CAMERA_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)((?:dsc|img|sam)_?\d{4})\.jpe?g").unwrap());

const UNKNOWN_MAKE: &str = "Unknown";
const UNKNOWN_MODEL: &str = "Unknown model";

/// Run-wide inputs to attribute resolution
#[derive(Debug, Clone)]
pub struct ResolveContext {
    /// Identity used in naming and bucketing
    pub user: String,
    /// Hours subtracted for the `_`-suffixed date attributes
    pub night_shift_hours: i64,
    /// Fixed processing time for the sentinel date; `None` reads the clock
    pub now: Option<NaiveDateTime>,
}

impl ResolveContext {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            night_shift_hours: DEFAULT_NIGHT_SHIFT_HOURS,
            now: None,
        }
    }

    pub fn with_night_shift_hours(mut self, hours: i64) -> Self {
        self.night_shift_hours = hours;
        self
    }

    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }
}

/// Capture device, before sanitization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub make: String,
    pub model: String,
}

impl Device {
    /// Device from embedded `Make`/`Model` tags.
    ///
    /// Only the first word of the make is kept (`"NIKON CORPORATION"` is
    /// `"NIKON"`).
    pub fn from_tags(tags: Option<&EmbeddedTags>) -> Self {
        let make = tags
            .and_then(|t| t.get("Make"))
            .and_then(|m| m.split_whitespace().next())
            .unwrap_or(UNKNOWN_MAKE);
        let model = tags.and_then(|t| t.get("Model")).unwrap_or(UNKNOWN_MODEL);

        Self {
            make: make.to_string(),
            model: model.to_string(),
        }
    }

    /// Device with the same marker for make and model
    pub fn fixed(marker: &str) -> Self {
        Self {
            make: marker.to_string(),
            model: marker.to_string(),
        }
    }

    /// Sanitized `(make, model)`, with the model always starting with `make_`
    fn attributes(&self) -> (String, String) {
        let make = to_filename_component(&self.make);
        let model = to_filename_component(&self.model);
        let prefix = format!("{}_", make);
        if model.starts_with(&prefix) {
            (make, model)
        } else {
            (make, format!("{}{}", prefix, model))
        }
    }
}

/// What a media kind policy learned about a file before resolution
#[derive(Debug, Clone)]
pub struct Inspection {
    /// Embedded tags; `None` when the file has no tag block at all
    pub tags: Option<EmbeddedTags>,
    /// Canonical extension, without the dot
    pub extension: String,
    pub device: Device,
}

/// Resolves the attribute set used for naming and bucketing
#[derive(Debug, Clone)]
pub struct MetadataResolver {
    context: ResolveContext,
}

impl MetadataResolver {
    pub fn new(context: ResolveContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &ResolveContext {
        &self.context
    }

    /// Resolve all attributes for `file`, walking `tiers` for the capture date.
    ///
    /// Never fails: a file with no usable date gets the sentinel date.
    pub fn resolve(
        &self,
        file: &MediaFile,
        inspection: &Inspection,
        tiers: &[DateTier],
    ) -> ResolvedAttributes {
        let (date, date_source) = self.capture_date(file, inspection.tags.as_ref(), tiers);
        let shifted = date
            .checked_sub_signed(Duration::hours(self.context.night_shift_hours))
            .unwrap_or(date);

        let mut values = BTreeMap::new();
        values.extend(date_vars(&date, ""));
        values.extend(date_vars(&shifted, SHIFTED_SUFFIX));

        let (make, model) = inspection.device.attributes();
        values.insert("make".to_string(), make);
        values.insert("model".to_string(), model);
        values.insert("base".to_string(), original_name(file.file_name(), &date));
        values.insert("stem".to_string(), to_filename_component(file.stem()));
        values.insert("ext".to_string(), to_filename_component(&inspection.extension));
        values.insert("user".to_string(), to_filename_component(&self.context.user));
        values.insert("id".to_string(), String::new());

        if let Some(tags) = &inspection.tags {
            for (name, value) in tags.gps() {
                values.insert(gps_key(name), to_filename_component(value));
            }
        }

        ResolvedAttributes::new(values, date_source)
    }

    fn capture_date(
        &self,
        file: &MediaFile,
        tags: Option<&EmbeddedTags>,
        tiers: &[DateTier],
    ) -> (NaiveDateTime, DateSource) {
        tiers
            .iter()
            .find_map(|tier| match *tier {
                DateTier::EmbeddedTag(name) => tags
                    .and_then(|t| t.get(name))
                    .and_then(parse_exif_datetime)
                    .map(|d| (d, DateSource::Embedded(name))),
                DateTier::FileName => {
                    date_from_file_name(file.stem()).map(|d| (d, DateSource::FileName))
                }
                DateTier::FileTimestamp => {
                    file_timestamp(file.path()).map(|d| (d, DateSource::FileTimestamp))
                }
            })
            .unwrap_or_else(|| {
                let now = self.context.now.unwrap_or_else(|| Local::now().naive_local());
                (sentinel_date(now), DateSource::Sentinel)
            })
    }
}

/// Camera-style original name if the file name has one, else `HHMMSS`
fn original_name(file_name: &str, date: &NaiveDateTime) -> String {
    match CAMERA_NAME.captures(file_name).and_then(|c| c.get(1)) {
        Some(m) => to_filename_component(m.as_str()),
        None => date.format("%H%M%S").to_string(),
    }
}

/// Creation time, falling back to modification time, in local time
fn file_timestamp(path: &Path) -> Option<NaiveDateTime> {
    let metadata = std::fs::metadata(path).ok()?;
    let time = metadata.created().or_else(|_| metadata.modified()).ok()?;
    Some(DateTime::<Local>::from(time).naive_local())
}

/// `GPSLatitudeRef` -> `gps_latitude_ref`
fn gps_key(tag_name: &str) -> String {
    let rest = tag_name.strip_prefix("GPS").unwrap_or(tag_name);
    let mut key = String::from("gps");
    for c in rest.chars() {
        if c.is_ascii_uppercase() {
            key.push('_');
            key.push(c.to_ascii_lowercase());
        } else {
            key.push(c);
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::media::MediaKind;
    use chrono::NaiveDate;

    const IMAGE_TIERS: [DateTier; 3] = [
        DateTier::EmbeddedTag("DateTimeOriginal"),
        DateTier::EmbeddedTag("DateTime"),
        DateTier::FileName,
    ];

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 20, 30)
            .unwrap()
    }

    fn resolver() -> MetadataResolver {
        MetadataResolver::new(ResolveContext::new("Alice").with_now(now()))
    }

    fn image(path: &str) -> MediaFile {
        MediaFile::new(path, MediaKind::Image, Some("image/jpeg".to_string()))
    }

    fn inspection(tags: Option<EmbeddedTags>) -> Inspection {
        Inspection {
            device: Device::from_tags(tags.as_ref()),
            tags,
            extension: "jpg".to_string(),
        }
    }

    #[test]
    fn file_without_metadata_gets_sentinel_and_unknown_device() {
        let attrs = resolver().resolve(&image("/in/IMG_0001.JPG"), &inspection(None), &IMAGE_TIERS);

        assert_eq!(attrs.date_source(), DateSource::Sentinel);
        assert_eq!(attrs.get("yyyy"), Some("1900"));
        assert_eq!(attrs.get("mm"), Some("01"));
        assert_eq!(attrs.get("dd"), Some("01"));
        assert_eq!(attrs.get("HH"), Some("10"));
        assert_eq!(attrs.get("make"), Some("unknown"));
        assert_eq!(attrs.get("model"), Some("unknown_model"));
        assert_eq!(attrs.get("base"), Some("img_0001"));
        assert_eq!(attrs.get("stem"), Some("img_0001"));
        assert_eq!(attrs.get("user"), Some("alice"));
        assert_eq!(attrs.get("id"), Some(""));
    }

    #[test]
    fn embedded_original_date_beats_file_name() {
        let tags: EmbeddedTags = [
            ("DateTimeOriginal", "2018:12:24 19:30:00"),
            ("DateTime", "2020:01:01 00:00:00"),
        ]
        .into_iter()
        .collect();
        let file = image("/in/party 2019-07-14 18.02.33.jpg");

        let attrs = resolver().resolve(&file, &inspection(Some(tags)), &IMAGE_TIERS);

        assert_eq!(attrs.date_source(), DateSource::Embedded("DateTimeOriginal"));
        assert_eq!(attrs.get("yyyy"), Some("2018"));
        assert_eq!(attrs.get("MMM"), Some("DEC"));
    }

    #[test]
    fn embedded_date_time_used_when_original_is_missing() {
        let tags: EmbeddedTags = [("DateTime", "2016:03:05 07:08:09"), ("Make", "Canon")]
            .into_iter()
            .collect();
        let file = image("/in/party 2019-07-14 18.02.33.jpg");

        let attrs = resolver().resolve(&file, &inspection(Some(tags)), &IMAGE_TIERS);

        assert_eq!(attrs.date_source(), DateSource::Embedded("DateTime"));
        assert_eq!(attrs.get("yyyy"), Some("2016"));
        assert_eq!(attrs.get("mm"), Some("03"));
        assert_eq!(attrs.get("base"), Some("070809"));
    }

    #[test]
    fn unparseable_embedded_date_falls_through() {
        let tags: EmbeddedTags = [("DateTimeOriginal", "    :  :     :  :  ")]
            .into_iter()
            .collect();
        let file = image("/in/party 2019-07-14 18.02.33.jpg");

        let attrs = resolver().resolve(&file, &inspection(Some(tags)), &IMAGE_TIERS);

        assert_eq!(attrs.date_source(), DateSource::FileName);
        assert_eq!(attrs.get("yyyy"), Some("2019"));
        assert_eq!(attrs.get("base"), Some("180233"));
    }

    #[test]
    fn shifted_attributes_move_late_night_back_a_day() {
        let tags: EmbeddedTags = [("DateTimeOriginal", "2019:01:01 02:15:00")]
            .into_iter()
            .collect();
        let attrs = resolver().resolve(&image("/in/a.jpg"), &inspection(Some(tags)), &IMAGE_TIERS);

        assert_eq!(attrs.get("yyyy"), Some("2019"));
        assert_eq!(attrs.get("yyyy_"), Some("2018"));
        assert_eq!(attrs.get("dd_"), Some("31"));
        assert_eq!(attrs.get("HH_"), Some("21"));
    }

    #[test]
    fn model_is_prefixed_by_make() {
        let tags: EmbeddedTags = [("Make", "NIKON CORPORATION"), ("Model", "D750")]
            .into_iter()
            .collect();
        let attrs = resolver().resolve(&image("/in/a.jpg"), &inspection(Some(tags)), &IMAGE_TIERS);

        assert_eq!(attrs.get("make"), Some("nikon"));
        assert_eq!(attrs.get("model"), Some("nikon_d750"));
    }

    #[test]
    fn model_already_prefixed_is_kept() {
        let tags: EmbeddedTags = [("Make", "Canon"), ("Model", "Canon EOS 5D")]
            .into_iter()
            .collect();
        let attrs = resolver().resolve(&image("/in/a.jpg"), &inspection(Some(tags)), &IMAGE_TIERS);

        assert_eq!(attrs.get("model"), Some("canon_eos_5d"));
    }

    #[test]
    fn fixed_device_marker_is_prefixed_too() {
        let (make, model) = Device::fixed("video").attributes();
        assert_eq!(make, "video");
        assert_eq!(model, "video_video");
    }

    #[test]
    fn gps_tags_become_snake_case_attributes() {
        let tags: EmbeddedTags = [("GPSLatitude", "59 deg 54 min"), ("GPSLatitudeRef", "N")]
            .into_iter()
            .collect();
        let attrs = resolver().resolve(&image("/in/a.jpg"), &inspection(Some(tags)), &IMAGE_TIERS);

        assert_eq!(attrs.get("gps_latitude"), Some("59_deg_54_min"));
        assert_eq!(attrs.get("gps_latitude_ref"), Some("n"));
    }

    #[test]
    fn camera_name_needs_jpeg_extension() {
        let date = now();
        assert_eq!(original_name("DSC1234.jpeg", &date), "dsc1234");
        assert_eq!(original_name("sam_0042.JPG", &date), "sam_0042");
        assert_eq!(original_name("IMG_0001.png", &date), "102030");
    }
}
