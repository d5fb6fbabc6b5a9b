//! Passport - challenge and quest progress tracking
//!
//! Tracks which steps of a challenge (or tasks of a city quest) a traveller
//! has completed, derives progress and completion, and persists the state
//! through a pluggable key/value repository.
//!
//! # Architecture
//!
//! ```text
//! Catalog (read-only) ──► ProgressStore ──► ProgressRepository
//!        │                     │             (memory | files | sqlite)
//!        └──── merge() ◄───────┘
//!               EntityView
//! ```
//!
//! # Example
//!
//! ```ignore
//! use passport::{Catalog, FileRepository, ProgressStore, StaticCatalog};
//!
//! let catalog = StaticCatalog::embedded()?;
//! let mut store = ProgressStore::new(FileRepository::open(".passport")?);
//! let challenge = catalog.challenge("seoul-street-food").unwrap();
//! let outcome = store.toggle(challenge, "namdaemun-kimbap")?;
//! println!("{}/{}", outcome.progress, challenge.total_steps);
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod merge;
pub mod model;
pub mod progress;
pub mod quest;
pub mod repository;
pub mod store;

pub use catalog::{Catalog, StaticCatalog};
pub use error::{CatalogError, ProgressError, RepositoryError};
pub use merge::{EntityView, StepView, merge};
pub use model::{
    Difficulty, Entity, EntityId, EntityKind, EntityProgress, ProgressSnapshot, ProgressState, Step, StepId,
    StepStates, ToggleOutcome, quest_entity_id,
};
pub use progress::DEFAULT_RESET_BASELINE_RATIO;
pub use quest::{MigrationReport, legacy_quest_key};
pub use repository::{FileRepository, MemoryRepository, ProgressRepository, SqliteRepository};
pub use store::{ProgressExport, ProgressStore, StoreOptions};
