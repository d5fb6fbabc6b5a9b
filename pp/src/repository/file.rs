//! Directory-backed repository
//!
//! ```text
//! {base_path}/
//! ├── completedEntities.json
//! ├── completedSteps.json
//! └── entityProgress.json
//! ```

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{ProgressRepository, parse_document};
use crate::error::RepositoryError;

const EXTENSION: &str = "json";

/// Stores each key as a pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct FileRepository {
    base_path: PathBuf,
}

impl FileRepository {
    /// Open or create a repository at the given directory
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).map_err(|source| RepositoryError::Io {
            path: base_path.clone(),
            source,
        })?;
        debug!(?base_path, "Opened file repository");
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, RepositoryError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
        if !valid {
            return Err(RepositoryError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(format!("{}.{}", key, EXTENSION)))
    }
}

impl ProgressRepository for FileRepository {
    fn get(&self, key: &str) -> Result<Option<Value>, RepositoryError> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => parse_document(key, &raw).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(RepositoryError::Io { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), RepositoryError> {
        self.set_many(vec![(key, value)])
    }

    /// Every document is encoded and written to its temp file before any
    /// rename, so a failed encode or write leaves the stored documents as
    /// they were.
    fn set_many(&mut self, entries: Vec<(&str, Value)>) -> Result<(), RepositoryError> {
        let mut staged = Vec::with_capacity(entries.len());
        for (key, value) in &entries {
            let path = self.key_path(key)?;
            let content = serde_json::to_string_pretty(value).map_err(|source| RepositoryError::Encode {
                key: key.to_string(),
                source,
            })?;
            staged.push((*key, path, content));
        }

        let mut written: Vec<(&str, PathBuf, PathBuf)> = Vec::with_capacity(staged.len());
        for (key, path, content) in staged {
            let tmp_path = path.with_extension("json.tmp");
            if let Err(source) = fs::write(&tmp_path, content) {
                discard(written.iter().map(|(_, tmp, _)| tmp.as_path()).chain([tmp_path.as_path()]));
                return Err(RepositoryError::Io { path: tmp_path, source });
            }
            written.push((key, tmp_path, path));
        }

        // Write then rename; readers never observe a partial document
        for (key, tmp_path, path) in &written {
            fs::rename(tmp_path, path).map_err(|source| RepositoryError::Io {
                path: path.clone(),
                source,
            })?;
            debug!(key, "set: wrote document");
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), RepositoryError> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(RepositoryError::Io { path, source }),
        }
    }

    fn keys(&self) -> Result<Vec<String>, RepositoryError> {
        let io_err = |source| RepositoryError::Io {
            path: self.base_path.clone(),
            source,
        };

        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.base_path).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file()
                && path.extension().map(|e| e == EXTENSION).unwrap_or(false)
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

fn discard<'a>(tmp_paths: impl Iterator<Item = &'a Path>) {
    for tmp in tmp_paths {
        if let Err(e) = fs::remove_file(tmp)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(path = %tmp.display(), error = %e, "Failed to remove temp file");
        }
    }
}
