//! On-disk store for the single session snapshot.
//!
//! Capture overwrites the file on every notification; resolve reads it on
//! every click. There is no locking: writes go through a temp file and a
//! rename so a reader sees either the old or the new snapshot, and anything
//! unreadable loads as "no snapshot".

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{CacheError, CacheResult};
use crate::snapshot::SessionSnapshot;

/// File-backed store for the last captured [`SessionSnapshot`].
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    /// Creates a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the snapshot.
    ///
    /// Returns `Ok(None)` when the file is absent, empty or torn.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Read` if the file exists but cannot be read.
    pub fn load(&self) -> CacheResult<Option<SessionSnapshot>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No cached snapshot");
                return Ok(None);
            }
            Err(source) => {
                return Err(CacheError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let payload = String::from_utf8_lossy(&bytes);
        Ok(SessionSnapshot::parse(&payload))
    }

    /// Atomically replaces the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Write` if the directory cannot be created or the
    /// temp file cannot be written and renamed into place.
    pub fn store(&self, snapshot: &SessionSnapshot) -> CacheResult<()> {
        let json = serde_json::to_string_pretty(snapshot)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|source| self.write_error(source))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|source| self.write_error(source))?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|source| self.write_error(source))?;
        tmp.persist(&self.path)
            .map_err(|e| self.write_error(e.error))?;

        debug!(
            path = %self.path.display(),
            project_dir = %snapshot.project_dir,
            hwnd = ?snapshot.hwnd,
            pane_id = ?snapshot.pane_id,
            "Stored session snapshot"
        );
        Ok(())
    }

    fn write_error(&self, source: io::Error) -> CacheError {
        CacheError::Write {
            path: self.path.clone(),
            source,
        }
    }
}
