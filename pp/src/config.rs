//! Configuration for passport

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::StaticCatalog;
use crate::progress::DEFAULT_RESET_BASELINE_RATIO;
use crate::repository::{FileRepository, MemoryRepository, ProgressRepository, SqliteRepository};
use crate::store::StoreOptions;

/// Database file name used by the sqlite backend
const SQLITE_FILE: &str = "progress.db";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where progress is persisted
    pub storage: StorageConfig,

    /// Progress tuning
    pub progress: ProgressConfig,

    /// Catalog source
    pub catalog: CatalogConfig,

    /// Log level (trace, debug, info, warn, error)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Directory holding progress data
    pub path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("passport")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Share of the total a step-less entity keeps after reset
    #[serde(rename = "reset-baseline-ratio")]
    pub reset_baseline_ratio: f64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            reset_baseline_ratio: DEFAULT_RESET_BASELINE_RATIO,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// YAML catalog file; the embedded catalog is used when unset
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load config from an explicit path, the default locations, or defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config, then user config
        let default_paths = [
            Some(PathBuf::from("passport.yml")),
            dirs::config_dir().map(|p| p.join("passport").join("passport.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                match Self::load_from_file(path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        let ratio = self.progress.reset_baseline_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(eyre::eyre!("reset-baseline-ratio must be between 0 and 1, got {}", ratio));
        }
        Ok(())
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            reset_baseline_ratio: self.progress.reset_baseline_ratio,
        }
    }

    /// Open the configured repository backend
    pub fn open_repository(&self) -> Result<Box<dyn ProgressRepository>> {
        let path = &self.storage.path;
        let repo: Box<dyn ProgressRepository> = match self.storage.backend {
            StorageBackend::File => Box::new(
                FileRepository::open(path).context(format!("Failed to open progress directory {}", path.display()))?,
            ),
            StorageBackend::Sqlite => {
                let db_path = path.join(SQLITE_FILE);
                Box::new(
                    SqliteRepository::open(&db_path)
                        .context(format!("Failed to open progress database {}", db_path.display()))?,
                )
            }
            StorageBackend::Memory => Box::new(MemoryRepository::new()),
        };
        Ok(repo)
    }

    /// Load the configured catalog, or the embedded one
    pub fn load_catalog(&self) -> Result<StaticCatalog> {
        match &self.catalog.path {
            Some(path) => StaticCatalog::load(path).context(format!("Failed to load catalog {}", path.display())),
            None => StaticCatalog::embedded().context("Embedded catalog is invalid"),
        }
    }
}
