//! Filesystem image store keyed by pictogram id.
//!
//! # Responsibility
//! - Write/read/remove the one fixed-format image artifact per pictogram.
//! - Compute the content hash returned to the record-keeping layer.
//!
//! # Invariants
//! - The artifact path is derived solely from the pictogram id; no other
//!   attribute participates, so renames and re-tiering never touch it.
//! - A write becomes observable only via atomic rename; a failed or aborted
//!   write never leaves a partial artifact at the final path.
//! - The returned hash is a function of the written bytes only, so
//!   concurrent writers on the same key cannot cross-contaminate hash and
//!   content.
//! - Permission failures, missing artifacts and other I/O failures are
//!   reported as distinct error kinds.

use crate::model::pictogram::PictogramId;
use sha2::{Digest, Sha256};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

pub type StoreResult<T> = Result<T, ImageStoreError>;

/// Image store error, kept distinct per failure class so callers can map
/// them to different outcomes.
#[derive(Debug)]
pub enum ImageStoreError {
    /// The storage medium denied read or write permission.
    AccessDenied(PathBuf),
    /// The artifact is absent despite being expected on disk.
    NotFound(PathBuf),
    /// Any other I/O failure.
    Storage(std::io::Error),
}

impl Display for ImageStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccessDenied(path) => {
                write!(f, "storage denied access to `{}`", path.display())
            }
            Self::NotFound(path) => write!(f, "image artifact missing: `{}`", path.display()),
            Self::Storage(err) => write!(f, "image storage failure: {err}"),
        }
    }
}

impl Error for ImageStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::AccessDenied(_) | Self::NotFound(_) => None,
        }
    }
}

/// Filesystem store holding one `<id>.png` artifact per pictogram.
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Creates a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| map_io_error(err, &root))?;
        Ok(Self { root })
    }

    /// Returns the artifact path for a pictogram id.
    pub fn image_path(&self, id: PictogramId) -> PathBuf {
        self.root.join(format!("{id}.png"))
    }

    /// Writes `bytes` as the pictogram's image and returns its content hash.
    ///
    /// # Contract
    /// - Empty payload is a no-op: no write happens and `Ok(None)` is
    ///   returned so the caller keeps the prior hash.
    /// - Overwrite semantics, no versioning.
    /// - The hash (lowercase hex SHA-256) is assigned only after the write
    ///   fully succeeded.
    pub fn put_image(&self, id: PictogramId, bytes: &[u8]) -> StoreResult<Option<String>> {
        if bytes.is_empty() {
            return Ok(None);
        }

        let final_path = self.image_path(id);
        let temp_path = self.temp_path(id);

        fs::write(&temp_path, bytes).map_err(|err| map_io_error(err, &temp_path))?;
        if let Err(err) = fs::rename(&temp_path, &final_path) {
            // Leave no partial artifact behind.
            let _ = fs::remove_file(&temp_path);
            return Err(map_io_error(err, &final_path));
        }

        Ok(Some(content_hash(bytes)))
    }

    /// Reads the stored image bytes for a pictogram id.
    ///
    /// Fails with `NotFound` when the artifact is absent; with a non-null
    /// recorded hash that is a consistency fault the caller must surface.
    pub fn get_image(&self, id: PictogramId) -> StoreResult<Vec<u8>> {
        let path = self.image_path(id);
        fs::read(&path).map_err(|err| map_io_error(err, &path))
    }

    /// Removes the stored image artifact, if any.
    ///
    /// A missing artifact is not an error; removal is idempotent.
    pub fn remove_image(&self, id: PictogramId) -> StoreResult<()> {
        let path = self.image_path(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(map_io_error(err, &path)),
        }
    }

    fn temp_path(&self, id: PictogramId) -> PathBuf {
        let sequence = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!(
            ".{id}.{}.{sequence}.tmp",
            std::process::id()
        ))
    }
}

/// Computes the lowercase hex SHA-256 content hash over `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn map_io_error(err: std::io::Error, path: &Path) -> ImageStoreError {
    match err.kind() {
        ErrorKind::NotFound => ImageStoreError::NotFound(path.to_path_buf()),
        ErrorKind::PermissionDenied => ImageStoreError::AccessDenied(path.to_path_buf()),
        _ => ImageStoreError::Storage(err),
    }
}
