//! JSON bucket files with locked, atomic updates.

use crate::core::fingerprint::Fingerprint;
use crate::error::RegistryError;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

type BucketContents = BTreeMap<String, String>;

/// Fingerprint registry backed by one JSON file per bucket
#[derive(Debug, Default)]
pub struct FingerprintRegistry {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl FingerprintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Archived path for `fingerprint` in `bucket`, if any.
    ///
    /// An absent bucket file is an empty bucket.
    pub fn lookup(
        &self,
        bucket: &Path,
        fingerprint: &Fingerprint,
    ) -> Result<Option<PathBuf>, RegistryError> {
        let lock = self.bucket_lock(bucket)?;
        let _guard = lock.lock().map_err(|_| RegistryError::LockPoisoned {
            path: bucket.to_path_buf(),
        })?;

        let contents = read_bucket(bucket)?;
        Ok(contents.get(fingerprint.as_str()).map(PathBuf::from))
    }

    /// Record that `fingerprint` is archived at `stored`.
    ///
    /// Reads the bucket, sets the entry and atomically replaces the file.
    pub fn append(
        &self,
        bucket: &Path,
        fingerprint: &Fingerprint,
        stored: &Path,
    ) -> Result<(), RegistryError> {
        let lock = self.bucket_lock(bucket)?;
        let _guard = lock.lock().map_err(|_| RegistryError::LockPoisoned {
            path: bucket.to_path_buf(),
        })?;

        let mut contents = read_bucket(bucket)?;
        if let Some(previous) = contents.insert(
            fingerprint.to_string(),
            stored.to_string_lossy().into_owned(),
        ) {
            warn!(bucket = %bucket.display(), previous = %previous, "Replacing registry entry");
        }
        write_bucket(bucket, &contents)?;

        debug!(
            bucket = %bucket.display(),
            entries = contents.len(),
            "Registry updated"
        );
        Ok(())
    }

    /// All entries of a bucket
    pub fn entries(&self, bucket: &Path) -> Result<BTreeMap<Fingerprint, PathBuf>, RegistryError> {
        let lock = self.bucket_lock(bucket)?;
        let _guard = lock.lock().map_err(|_| RegistryError::LockPoisoned {
            path: bucket.to_path_buf(),
        })?;

        Ok(read_bucket(bucket)?
            .into_iter()
            .map(|(fp, path)| (Fingerprint::new(fp), PathBuf::from(path)))
            .collect())
    }

    fn bucket_lock(&self, bucket: &Path) -> Result<Arc<Mutex<()>>, RegistryError> {
        let mut locks = self.locks.lock().map_err(|_| RegistryError::LockPoisoned {
            path: bucket.to_path_buf(),
        })?;
        Ok(locks.entry(bucket.to_path_buf()).or_default().clone())
    }
}

fn read_bucket(bucket: &Path) -> Result<BucketContents, RegistryError> {
    let raw = match fs::read_to_string(bucket) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BucketContents::new()),
        Err(source) => {
            return Err(RegistryError::Read {
                path: bucket.to_path_buf(),
                source,
            })
        }
    };

    if raw.trim().is_empty() {
        return Ok(BucketContents::new());
    }

    serde_json::from_str(&raw).map_err(|e| RegistryError::Corrupted {
        path: bucket.to_path_buf(),
        reason: e.to_string(),
    })
}

fn write_bucket(bucket: &Path, contents: &BucketContents) -> Result<(), RegistryError> {
    let write_error = |source| RegistryError::Write {
        path: bucket.to_path_buf(),
        source,
    };

    let dir = bucket.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(write_error)?;

    let json = serde_json::to_string_pretty(contents)
        .map_err(|e| write_error(std::io::Error::new(ErrorKind::InvalidData, e)))?;

    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp.write_all(json.as_bytes()).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;
    temp.persist(bucket).map_err(|e| write_error(e.error))?;

    Ok(())
}
