//! Media files as seen by the engine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Coarse media kind, decided from file content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Unrecognized,
}

impl MediaKind {
    /// Map a MIME type (`image/jpeg`, `video/mp4`, ...) to a kind by its
    /// top-level type.
    pub fn from_mime(mime: &str) -> Self {
        match mime.split('/').next().unwrap_or("") {
            "image" => MediaKind::Image,
            "video" => MediaKind::Video,
            _ => MediaKind::Unrecognized,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Unrecognized => write!(f, "unrecognized"),
        }
    }
}

/// A classified file. Immutable once created; the source is never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    path: PathBuf,
    kind: MediaKind,
    mime: Option<String>,
}

impl MediaFile {
    pub fn new(path: impl Into<PathBuf>, kind: MediaKind, mime: Option<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            mime,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Detected MIME type, if the detector reported one
    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    /// MIME subtype (`jpeg` for `image/jpeg`)
    pub fn mime_subtype(&self) -> Option<&str> {
        self.mime
            .as_deref()
            .and_then(|m| m.split_once('/'))
            .map(|(_, sub)| sub)
            .filter(|sub| !sub.is_empty())
    }

    /// File name including extension
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
    }

    /// File name without its final extension
    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or("")
    }

    /// Lowercased extension from the file name, if any
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .map(|e| e.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_mime_uses_top_level_type() {
        assert_eq!(MediaKind::from_mime("image/jpeg"), MediaKind::Image);
        assert_eq!(MediaKind::from_mime("video/quicktime"), MediaKind::Video);
        assert_eq!(MediaKind::from_mime("text/plain"), MediaKind::Unrecognized);
        assert_eq!(MediaKind::from_mime(""), MediaKind::Unrecognized);
    }

    #[test]
    fn file_name_parts() {
        let file = MediaFile::new(
            "/import/2019/IMG_0001.JPG",
            MediaKind::Image,
            Some("image/jpeg".to_string()),
        );
        assert_eq!(file.file_name(), "IMG_0001.JPG");
        assert_eq!(file.stem(), "IMG_0001");
        assert_eq!(file.extension().as_deref(), Some("jpg"));
        assert_eq!(file.mime_subtype(), Some("jpeg"));
    }

    #[test]
    fn missing_extension_is_none() {
        let file = MediaFile::new("/import/clip", MediaKind::Video, None);
        assert_eq!(file.extension(), None);
        assert_eq!(file.mime_subtype(), None);
    }
}
