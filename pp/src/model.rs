//! Domain types for progress tracking
//!
//! An `Entity` is a trackable unit (challenge or quest) made of `Step`s.
//! Catalog data is authored; completion state lives in the progress store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable identifier of a challenge or quest
pub type EntityId = String;

/// Identifier of a step, unique within its entity
pub type StepId = String;

/// Per-entity map of persisted step completion flags
pub type StepStates = BTreeMap<StepId, bool>;

/// Kind of trackable entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Challenge,
    Quest,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Challenge => write!(f, "challenge"),
            Self::Quest => write!(f, "quest"),
        }
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "challenge" => Ok(Self::Challenge),
            "quest" => Ok(Self::Quest),
            _ => Err(format!("Unknown entity kind: {}", s)),
        }
    }
}

/// Challenge difficulty as authored in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Medium => write!(f, "medium"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

/// A step of a challenge or a task of a quest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,

    #[serde(default)]
    pub title: String,

    /// Authored default, overridden by persisted state
    #[serde(default)]
    pub completed: bool,

    /// Quest tasks only; locked steps cannot be toggled
    #[serde(default)]
    pub locked: bool,
}

impl Step {
    pub fn new(id: impl Into<StepId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
            locked: false,
        }
    }

    /// Mark the authored default as completed
    pub fn done(mut self) -> Self {
        self.completed = true;
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }
}

/// A challenge or quest as supplied by the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub title: String,

    /// Challenge category (food, culture, ...)
    pub category: Option<String>,

    pub difficulty: Option<Difficulty>,

    /// Owning city for quests
    pub city_id: Option<String>,

    /// Fixed by the catalog, always >= 1
    pub total_steps: u32,

    /// Ordered steps; empty for entities tracked only by aggregate progress
    pub steps: Vec<Step>,
}

impl Entity {
    /// Create a challenge whose total is the number of steps
    pub fn challenge(id: impl Into<EntityId>, title: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            id: id.into(),
            kind: EntityKind::Challenge,
            title: title.into(),
            category: None,
            difficulty: None,
            city_id: None,
            total_steps: u32::try_from(steps.len()).unwrap_or(u32::MAX),
            steps,
        }
    }

    /// Create a quest; its id is composed from city and quest ids
    pub fn quest(city_id: &str, quest_id: &str, title: impl Into<String>, tasks: Vec<Step>) -> Self {
        Self {
            id: quest_entity_id(city_id, quest_id),
            kind: EntityKind::Quest,
            title: title.into(),
            category: None,
            difficulty: None,
            city_id: Some(city_id.to_string()),
            total_steps: u32::try_from(tasks.len()).unwrap_or(u32::MAX),
            steps: tasks,
        }
    }

    /// Create an entity with no discrete steps
    pub fn stepless(id: impl Into<EntityId>, title: impl Into<String>, total_steps: u32) -> Self {
        Self {
            id: id.into(),
            kind: EntityKind::Challenge,
            title: title.into(),
            category: None,
            difficulty: None,
            city_id: None,
            total_steps,
            steps: Vec::new(),
        }
    }

    pub fn has_steps(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == step_id)
    }
}

/// Entity id for a quest within a city
pub fn quest_entity_id(city_id: &str, quest_id: &str) -> EntityId {
    format!("{}-{}", city_id, quest_id)
}

/// Persisted progress for one entity, as stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityProgress {
    /// Persisted step flags; steps absent here fall back to authored defaults
    pub step_states: StepStates,

    /// Explicit entity-level completion flag
    pub is_completed: bool,

    /// Aggregate progress recorded for entities without steps
    pub recorded_progress: Option<u32>,
}

impl EntityProgress {
    /// Effective completion of a step: persisted value, else authored default
    pub fn step_completed(&self, step: &Step) -> bool {
        self.step_states.get(&step.id).copied().unwrap_or(step.completed)
    }
}

/// Coarse lifecycle state of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressState {
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressState {
    /// Derive the state from a progress count and the explicit flag
    pub fn derive(progress: u32, total_steps: u32, flagged: bool) -> Self {
        if crate::progress::is_fully_completed(progress, total_steps, flagged) {
            Self::Completed
        } else if progress == 0 {
            Self::NotStarted
        } else {
            Self::InProgress
        }
    }
}

impl std::fmt::Display for ProgressState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not started"),
            Self::InProgress => write!(f, "in progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Result of toggling a single step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub step_id: StepId,

    /// New value of the toggled step
    pub step_completed: bool,

    /// Persisted step map after the toggle
    pub step_states: StepStates,

    /// Completed known steps, clamped to the total
    pub progress: u32,

    pub now_completed: bool,
}

/// Aggregate progress returned by mark-complete and reset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub entity_id: EntityId,
    pub progress: u32,
    pub total_steps: u32,
    pub is_completed: bool,
}

impl ProgressSnapshot {
    pub fn state(&self) -> ProgressState {
        ProgressState::derive(self.progress, self.total_steps, self.is_completed)
    }
}
