//! Content-based media type detection.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Bytes read for signature checks
const HEADER_LEN: usize = 64;

/// Detects the MIME type of a file from its content
pub trait MediaTypeDetector: Send + Sync {
    /// MIME type such as `image/jpeg`, or `None` when undetermined
    fn detect(&self, path: &Path) -> Option<String>;
}

/// Detector backed by the shared MIME database, with built-in signatures for
/// common photo and video containers when the database has no answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentSniffer;

impl ContentSniffer {
    pub fn new() -> Self {
        Self
    }
}

impl MediaTypeDetector for ContentSniffer {
    fn detect(&self, path: &Path) -> Option<String> {
        let from_database = tree_magic_mini::from_filepath(path);
        if let Some(mime) = from_database {
            if mime.starts_with("image/") || mime.starts_with("video/") {
                return Some(mime.to_string());
            }
        }

        let header = read_header(path)?;
        sniff_header(&header).or_else(|| from_database.map(str::to_string))
    }
}

fn read_header(path: &Path) -> Option<Vec<u8>> {
    let mut file = File::open(path).ok()?;
    let mut header = Vec::with_capacity(HEADER_LEN);
    file.by_ref()
        .take(HEADER_LEN as u64)
        .read_to_end(&mut header)
        .ok()?;
    Some(header)
}

/// MIME type from the leading bytes of a file
pub fn sniff_header(header: &[u8]) -> Option<String> {
    if let Ok(format) = image::guess_format(header) {
        return Some(format.to_mime_type().to_string());
    }
    video_signature(header).map(str::to_string)
}

fn video_signature(header: &[u8]) -> Option<&'static str> {
    // ISO base media: size, "ftyp", major brand
    if header.len() >= 12 && &header[4..8] == b"ftyp" {
        return match &header[8..12] {
            b"qt  " => Some("video/quicktime"),
            b"M4V " | b"M4VH" | b"M4VP" => Some("video/x-m4v"),
            b"heic" | b"heix" | b"mif1" | b"msf1" => Some("image/heic"),
            b"M4A " | b"M4B " => None,
            brand if brand.starts_with(b"3g") => Some("video/3gpp"),
            _ => Some("video/mp4"),
        };
    }
    if header.len() >= 12 && &header[..4] == b"RIFF" && &header[8..12] == b"AVI " {
        return Some("video/x-msvideo");
    }
    if header.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return Some("video/x-matroska");
    }
    if header.starts_with(b"FLV") {
        return Some("video/x-flv");
    }
    if header.starts_with(&[
        0x30, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11, 0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE,
        0x6C,
    ]) {
        return Some("video/x-ms-wmv");
    }
    if header.starts_with(&[0x00, 0x00, 0x01, 0xBA]) || header.starts_with(&[0x00, 0x00, 0x01, 0xB3]) {
        return Some("video/mpeg");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn recognises_jpeg_and_png_headers() {
        assert_eq!(
            sniff_header(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10]).as_deref(),
            Some("image/jpeg")
        );
        assert_eq!(
            sniff_header(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR").as_deref(),
            Some("image/png")
        );
    }

    #[test]
    fn recognises_iso_media_brands() {
        assert_eq!(
            sniff_header(b"\x00\x00\x00\x18ftypmp42\x00\x00\x00\x00").as_deref(),
            Some("video/mp4")
        );
        assert_eq!(
            sniff_header(b"\x00\x00\x00\x14ftypqt  \x00\x00\x00\x00").as_deref(),
            Some("video/quicktime")
        );
        assert_eq!(
            sniff_header(b"\x00\x00\x00\x18ftypheic\x00\x00\x00\x00").as_deref(),
            Some("image/heic")
        );
    }

    #[test]
    fn recognises_riff_avi_and_matroska() {
        assert_eq!(
            sniff_header(b"RIFF\x00\x10\x00\x00AVI LIST").as_deref(),
            Some("video/x-msvideo")
        );
        assert_eq!(
            sniff_header(&[0x1A, 0x45, 0xDF, 0xA3, 0x01]).as_deref(),
            Some("video/x-matroska")
        );
    }

    #[test]
    fn plain_text_is_not_media() {
        assert_eq!(sniff_header(b"hello world, nothing to see"), None);
    }

    #[test]
    fn content_wins_over_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.jpg");
        fs::write(&path, b"just some notes, not a photo").unwrap();

        let mime = ContentSniffer::new().detect(&path);

        assert!(!mime.unwrap_or_default().starts_with("image/"));
    }

    #[test]
    fn missing_file_is_undetermined() {
        assert_eq!(ContentSniffer::new().detect(Path::new("/nonexistent/a.jpg")), None);
    }
}
