//! # Dispatcher Module
//!
//! Classifies incoming files by content and routes them to the policy for
//! their media kind.
//!
//! Detection never looks at the file extension: a JPEG named `clip.mov` is an
//! image and a text file named `photo.jpg` is ignored. Files with no matching
//! policy are reported as ignored, which is not an error.

mod sniffer;

pub use sniffer::{sniff_header, ContentSniffer, MediaTypeDetector};

use crate::core::media::{MediaFile, MediaKind};
use crate::core::policy::MediaKindPolicy;
use std::path::Path;
use tracing::debug;

/// Where a classified file goes next
pub enum Route<'a> {
    /// Handled by a policy
    Handled(MediaFile, &'a dyn MediaKindPolicy),
    /// No policy for this content
    Ignored(MediaFile),
}

/// Routes files to media kind policies
pub struct Dispatcher {
    detector: Box<dyn MediaTypeDetector>,
    policies: Vec<Box<dyn MediaKindPolicy>>,
}

impl Dispatcher {
    pub fn new(detector: Box<dyn MediaTypeDetector>) -> Self {
        Self {
            detector,
            policies: Vec::new(),
        }
    }

    /// Register a policy. A later policy for the same kind replaces the
    /// earlier one.
    pub fn with_policy(mut self, policy: Box<dyn MediaKindPolicy>) -> Self {
        self.policies.retain(|p| p.kind() != policy.kind());
        self.policies.push(policy);
        self
    }

    /// Policy registered for a kind
    pub fn policy_for(&self, kind: MediaKind) -> Option<&dyn MediaKindPolicy> {
        self.policies
            .iter()
            .find(|p| p.kind() == kind)
            .map(|p| &**p)
    }

    /// Detect the kind of `path` from its content
    pub fn classify(&self, path: &Path) -> MediaFile {
        let mime = self.detector.detect(path);
        let kind = mime
            .as_deref()
            .map(MediaKind::from_mime)
            .unwrap_or(MediaKind::Unrecognized);

        debug!(
            path = %path.display(),
            kind = %kind,
            mime = mime.as_deref().unwrap_or("unknown"),
            "Classified file"
        );
        MediaFile::new(path, kind, mime)
    }

    /// Classify `path` and pick its policy
    pub fn route(&self, path: &Path) -> Route<'_> {
        let file = self.classify(path);
        match self.policy_for(file.kind()) {
            Some(policy) => Route::Handled(file, policy),
            None => Route::Ignored(file),
        }
    }
}
