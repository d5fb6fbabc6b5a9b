//! Error types for the progress store, its repositories and the catalog

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a `ProgressRepository` backend
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Malformed JSON under key '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid repository key: '{0}'")]
    InvalidKey(String),
}

/// Errors from progress store operations
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Step '{step_id}' of '{entity_id}' is locked")]
    StepLocked { entity_id: String, step_id: String },

    #[error("Unknown step '{step_id}' for '{entity_id}'")]
    UnknownStep { entity_id: String, step_id: String },

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Entity '{0}' is not a quest")]
    NotAQuest(String),
}

/// Errors from loading or validating a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Duplicate entity id: {0}")]
    DuplicateEntity(String),

    #[error("Entity '{0}' must have at least one step")]
    ZeroSteps(String),

    #[error("Entity '{id}' declares {declared} total steps but lists {listed}")]
    StepCountMismatch { id: String, declared: u32, listed: usize },

    #[error("Entity '{id}' lists {listed} steps, more than a catalog entry can hold")]
    TooManySteps { id: String, listed: usize },

    #[error("Duplicate step '{step_id}' in '{entity_id}'")]
    DuplicateStep { entity_id: String, step_id: String },
}
