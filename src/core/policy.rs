//! Per-kind behaviour of the archive engine.
//!
//! Images and videos go through the same pipeline and differ only in where
//! the capture date comes from, how device fields are found and how the
//! content is fingerprinted. [`MediaKindPolicy`] captures exactly that.

use crate::core::fingerprint::{ExactFingerprinter, Fingerprint, FingerprintPolicy, Fingerprinter};
use crate::core::media::{MediaFile, MediaKind};
use crate::core::metadata::{
    read_embedded_tags, DateTier, Device, Inspection, MetadataResolver, ResolvedAttributes,
};
use crate::error::FileError;
use image::{ImageFormat, ImageReader};

/// Date cascade for still images
pub const IMAGE_DATE_TIERS: [DateTier; 3] = [
    DateTier::EmbeddedTag("DateTimeOriginal"),
    DateTier::EmbeddedTag("DateTime"),
    DateTier::FileName,
];

/// Date cascade for videos
pub const VIDEO_DATE_TIERS: [DateTier; 2] = [DateTier::FileName, DateTier::FileTimestamp];

/// Device marker used for videos
pub const VIDEO_DEVICE: &str = "video";

/// Metadata and fingerprint strategy for one media kind
pub trait MediaKindPolicy: Send + Sync {
    /// Kind this policy handles
    fn kind(&self) -> MediaKind;

    /// Ordered date sources
    fn date_tiers(&self) -> &[DateTier];

    /// Read what the resolver needs from the file.
    ///
    /// Fails with [`FileError::Undecodable`] when the file cannot be opened
    /// as this kind.
    fn inspect(&self, file: &MediaFile) -> Result<Inspection, FileError>;

    fn fingerprint_policy(&self) -> FingerprintPolicy;

    fn compute_fingerprint(&self, file: &MediaFile) -> Result<Fingerprint, FileError>;

    fn resolve_metadata(
        &self,
        file: &MediaFile,
        resolver: &MetadataResolver,
    ) -> Result<ResolvedAttributes, FileError> {
        let inspection = self.inspect(file)?;
        Ok(resolver.resolve(file, &inspection, self.date_tiers()))
    }
}

/// Still images: EXIF dates and device, configurable fingerprint policy
pub struct ImagePolicy {
    fingerprinter: Box<dyn Fingerprinter>,
}

impl ImagePolicy {
    pub fn new(policy: FingerprintPolicy) -> Self {
        Self {
            fingerprinter: policy.build(),
        }
    }
}

impl Default for ImagePolicy {
    fn default() -> Self {
        Self::new(FingerprintPolicy::default())
    }
}

impl MediaKindPolicy for ImagePolicy {
    fn kind(&self) -> MediaKind {
        MediaKind::Image
    }

    fn date_tiers(&self) -> &[DateTier] {
        &IMAGE_DATE_TIERS
    }

    fn inspect(&self, file: &MediaFile) -> Result<Inspection, FileError> {
        let undecodable = |reason: String| FileError::Undecodable {
            path: file.path().to_path_buf(),
            kind: MediaKind::Image.to_string(),
            reason,
        };

        let reader = ImageReader::open(file.path())
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| undecodable(e.to_string()))?;
        let format = reader
            .format()
            .ok_or_else(|| undecodable("unrecognized image format".to_string()))?;
        let extension = image_extension(format)
            .ok_or_else(|| undecodable(format!("no extension for {:?}", format)))?;

        let tags = read_embedded_tags(file.path());
        Ok(Inspection {
            device: Device::from_tags(tags.as_ref()),
            tags,
            extension,
        })
    }

    fn fingerprint_policy(&self) -> FingerprintPolicy {
        self.fingerprinter.policy()
    }

    fn compute_fingerprint(&self, file: &MediaFile) -> Result<Fingerprint, FileError> {
        Ok(self.fingerprinter.fingerprint(file.path())?)
    }
}

/// Lowercased format name, with `jpeg` shortened to `jpg`
fn image_extension(format: ImageFormat) -> Option<String> {
    match format {
        ImageFormat::Jpeg => Some("jpg".to_string()),
        ImageFormat::Tiff => Some("tiff".to_string()),
        other => other.extensions_str().first().map(|ext| ext.to_string()),
    }
}

/// Videos: dates from the file name or filesystem, exact fingerprints
#[derive(Debug, Default)]
pub struct VideoPolicy {
    fingerprinter: ExactFingerprinter,
}

impl VideoPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MediaKindPolicy for VideoPolicy {
    fn kind(&self) -> MediaKind {
        MediaKind::Video
    }

    fn date_tiers(&self) -> &[DateTier] {
        &VIDEO_DATE_TIERS
    }

    fn inspect(&self, file: &MediaFile) -> Result<Inspection, FileError> {
        let extension = file
            .extension()
            .or_else(|| file.mime_subtype().map(str::to_string))
            .ok_or_else(|| FileError::Undecodable {
                path: file.path().to_path_buf(),
                kind: MediaKind::Video.to_string(),
                reason: "no file extension or detected subtype".to_string(),
            })?;

        Ok(Inspection {
            tags: None,
            extension,
            device: Device::fixed(VIDEO_DEVICE),
        })
    }

    fn fingerprint_policy(&self) -> FingerprintPolicy {
        FingerprintPolicy::Exact
    }

    fn compute_fingerprint(&self, file: &MediaFile) -> Result<Fingerprint, FileError> {
        Ok(self.fingerprinter.fingerprint(file.path())?)
    }
}
