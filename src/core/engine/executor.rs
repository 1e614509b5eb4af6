//! Engine construction and execution.

use super::FileOutcome;
use crate::core::archive::ArchiveWriter;
use crate::core::config::{
    validate_night_shift, Settings, DEFAULT_CHECKSUM_TEMPLATE, DEFAULT_FILE_TEMPLATE,
};
use crate::core::dispatcher::{ContentSniffer, Dispatcher, MediaTypeDetector, Route};
use crate::core::fingerprint::FingerprintPolicy;
use crate::core::metadata::{MetadataResolver, ResolveContext, DEFAULT_NIGHT_SHIFT_HOURS};
use crate::core::naming::{NamingTemplate, PathResolver};
use crate::core::policy::{ImagePolicy, VideoPolicy};
use crate::core::registry::FingerprintRegistry;
use crate::core::scanner::{ScanConfig, WalkDirScanner};
use crate::error::{ArchiveError, ConfigError, FileError, RegistryError, StorageError};
use crate::events::{null_sender, EventSender, FileEvent, RunEvent, RunSummary};
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Configuration for the engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub output_dir: PathBuf,
    pub file_template: String,
    pub checksum_template: String,
    pub user: String,
    pub image_policy: FingerprintPolicy,
    pub night_shift_hours: i64,
    pub scan_config: ScanConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("archive"),
            file_template: DEFAULT_FILE_TEMPLATE.to_string(),
            checksum_template: DEFAULT_CHECKSUM_TEMPLATE.to_string(),
            user: "default".to_string(),
            image_policy: FingerprintPolicy::default(),
            night_shift_hours: DEFAULT_NIGHT_SHIFT_HOURS,
            scan_config: ScanConfig::default(),
        }
    }
}

/// Builder for [`ArchiveEngine`]
pub struct EngineBuilder {
    config: EngineConfig,
    detector: Option<Box<dyn MediaTypeDetector>>,
    now: Option<NaiveDateTime>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            detector: None,
            now: None,
        }
    }

    /// Start from loaded settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new()
            .output_dir(&settings.output_dir)
            .file_template(&settings.file_template)
            .checksum_template(&settings.checksum_template)
            .user(&settings.user)
            .image_policy(settings.image_policy)
            .night_shift_hours(settings.night_shift_hours)
            .scan_config(ScanConfig {
                follow_symlinks: settings.follow_symlinks,
                max_depth: settings.max_depth,
            })
    }

    /// Archive root
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Naming template for archived files
    pub fn file_template(mut self, template: impl Into<String>) -> Self {
        self.config.file_template = template.into();
        self
    }

    /// Template for registry bucket files
    pub fn checksum_template(mut self, template: impl Into<String>) -> Self {
        self.config.checksum_template = template.into();
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.config.user = user.into();
        self
    }

    /// Duplicate policy for still images
    pub fn image_policy(mut self, policy: FingerprintPolicy) -> Self {
        self.config.image_policy = policy;
        self
    }

    pub fn night_shift_hours(mut self, hours: i64) -> Self {
        self.config.night_shift_hours = hours;
        self
    }

    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    /// Replace content detection
    pub fn detector(mut self, detector: Box<dyn MediaTypeDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Fix the processing time used for unknown dates
    pub fn now(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// Validate templates and the night shift, then build the engine
    pub fn build(self) -> Result<ArchiveEngine, ArchiveError> {
        validate_night_shift(self.config.night_shift_hours)?;
        let file_template = parse_template(&self.config.file_template, "file_name")?;
        let bucket_template = parse_template(&self.config.checksum_template, "checksum_file")?;

        let mut context = ResolveContext::new(self.config.user.clone())
            .with_night_shift_hours(self.config.night_shift_hours);
        if let Some(now) = self.now {
            context = context.with_now(now);
        }

        let detector = self
            .detector
            .unwrap_or_else(|| Box::new(ContentSniffer::new()));
        let dispatcher = Dispatcher::new(detector)
            .with_policy(Box::new(ImagePolicy::new(self.config.image_policy)))
            .with_policy(Box::new(VideoPolicy::new()));

        Ok(ArchiveEngine {
            paths: PathResolver::new(&self.config.output_dir, file_template, bucket_template),
            scanner: WalkDirScanner::new(self.config.scan_config.clone()),
            resolver: MetadataResolver::new(context),
            registry: FingerprintRegistry::new(),
            writer: ArchiveWriter::new(),
            dispatcher,
            config: self.config,
        })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_template(template: &str, key: &str) -> Result<NamingTemplate, ConfigError> {
    NamingTemplate::parse(template).map_err(|source| ConfigError::InvalidTemplate {
        section: "output".to_string(),
        key: key.to_string(),
        source,
    })
}

/// The archive engine
pub struct ArchiveEngine {
    config: EngineConfig,
    dispatcher: Dispatcher,
    resolver: MetadataResolver,
    paths: PathResolver,
    registry: FingerprintRegistry,
    writer: ArchiveWriter,
    scanner: WalkDirScanner,
}

impl ArchiveEngine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn output_dir(&self) -> &Path {
        self.paths.output_dir()
    }

    /// Process one file without events
    pub fn process_file(&self, path: &Path) -> Result<FileOutcome, FileError> {
        self.process_file_with_events(path, &null_sender())
    }

    /// Process one file, reporting its classification
    pub fn process_file_with_events(
        &self,
        path: &Path,
        events: &EventSender,
    ) -> Result<FileOutcome, FileError> {
        let route = self.dispatcher.route(path);
        let file = match &route {
            Route::Handled(file, _) | Route::Ignored(file) => file,
        };
        events.file(FileEvent::Classified {
            path: path.to_path_buf(),
            kind: file.kind(),
            mime: file.mime().map(str::to_string),
        });

        let (file, policy) = match route {
            Route::Handled(file, policy) => (file, policy),
            Route::Ignored(file) => {
                return Ok(FileOutcome::Ignored {
                    source: path.to_path_buf(),
                    mime: file.mime().map(str::to_string),
                });
            }
        };

        let mut attrs = policy.resolve_metadata(&file, &self.resolver)?;
        let fingerprint = policy.compute_fingerprint(&file)?;
        let bucket = self.paths.bucket_path(&attrs)?;

        if let Some(existing) = self.registry.lookup(&bucket, &fingerprint)? {
            debug!(
                path = %path.display(),
                existing = %existing.display(),
                bucket = %bucket.display(),
                "Content already archived"
            );
            return Ok(FileOutcome::Duplicate {
                source: path.to_path_buf(),
                existing,
            });
        }

        let destination = self.paths.resolve(&mut attrs)?;
        self.writer.store(file.path(), &destination)?;
        // No archived file without a registry entry
        if let Err(e) = self.registry.append(&bucket, &fingerprint, &destination) {
            self.writer.discard(&destination);
            return Err(e.into());
        }

        debug!(
            path = %path.display(),
            destination = %destination.display(),
            date_source = %attrs.date_source(),
            fingerprint = %fingerprint,
            "Archived"
        );
        Ok(FileOutcome::Archived {
            source: path.to_path_buf(),
            destination,
            fingerprint,
        })
    }

    /// Archive every file under `roots`.
    ///
    /// Missing roots and per-file failures are counted in the summary. An
    /// unusable output directory or a registry that cannot be written ends
    /// the run with an error.
    pub fn run(&self, roots: &[PathBuf], events: &EventSender) -> Result<RunSummary, ArchiveError> {
        let start_time = Instant::now();
        let mut summary = RunSummary::default();

        let output_dir = self.paths.output_dir();
        fs::create_dir_all(output_dir).map_err(|source| StorageError::CreateDirectory {
            path: output_dir.to_path_buf(),
            source,
        })?;

        info!(
            roots = roots.len(),
            output = %output_dir.display(),
            image_policy = %self.config.image_policy,
            "Starting archive run"
        );
        events.run(RunEvent::Started {
            roots: roots.to_vec(),
            output_dir: output_dir.to_path_buf(),
            image_policy: self.config.image_policy.to_string(),
        });

        for root in roots {
            let scan = match self.scanner.scan_root(root, events) {
                Ok(scan) => scan,
                Err(e) => {
                    warn!(root = %root.display(), "{}", e);
                    summary.roots_missing += 1;
                    summary.errors.push(e.to_string());
                    continue;
                }
            };
            summary
                .errors
                .extend(scan.errors.iter().map(|e| e.to_string()));

            for path in &scan.files {
                match self.process_file_with_events(path, events) {
                    Err(FileError::Registry(e @ RegistryError::Write { .. })) => {
                        error!(path = %path.display(), error = %e, "Registry cannot be written, stopping");
                        events.file(FileEvent::Failed {
                            path: path.to_path_buf(),
                            message: e.to_string(),
                        });
                        return Err(ArchiveError::Registry(e));
                    }
                    result => self.record(path, result, &mut summary, events),
                }
            }
        }

        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            archived = summary.archived,
            duplicates = summary.duplicates,
            ignored = summary.ignored,
            failed = summary.failed,
            duration_ms = summary.duration_ms,
            "Archive run finished"
        );
        events.run(RunEvent::Completed {
            summary: summary.clone(),
        });

        Ok(summary)
    }

    fn record(
        &self,
        path: &Path,
        result: Result<FileOutcome, FileError>,
        summary: &mut RunSummary,
        events: &EventSender,
    ) {
        match result {
            Ok(FileOutcome::Archived {
                source,
                destination,
                ..
            }) => {
                summary.archived += 1;
                info!(path = %source.display(), destination = %destination.display(), "Archived");
                events.file(FileEvent::Archived {
                    source,
                    destination,
                });
            }
            Ok(FileOutcome::Duplicate { source, existing }) => {
                summary.duplicates += 1;
                info!(path = %source.display(), existing = %existing.display(), "Skipping duplicate");
                events.file(FileEvent::Duplicate { source, existing });
            }
            Ok(FileOutcome::Ignored { source, mime }) => {
                summary.ignored += 1;
                debug!(path = %source.display(), mime = ?mime, "Ignored");
                events.file(FileEvent::Ignored { path: source, mime });
            }
            Err(e) => {
                summary.failed += 1;
                error!(path = %path.display(), error = %e, "Failed to archive");
                summary.errors.push(format!("{}: {}", path.display(), e));
                events.file(FileEvent::Failed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
        }
    }
}
