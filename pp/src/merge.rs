//! Catalog-merge adapter
//!
//! Overlays persisted progress on a catalog entity to produce the view a
//! caller renders. Pure: no repository access.

use serde::Serialize;

use crate::model::{Entity, EntityId, EntityKind, EntityProgress, ProgressState, StepId};
use crate::progress::{count_completed, is_fully_completed};

/// A step as it should be displayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepView {
    pub id: StepId,
    pub title: String,
    pub completed: bool,
    pub locked: bool,
}

/// An entity merged with its persisted progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityView {
    pub id: EntityId,
    pub kind: EntityKind,
    pub title: String,
    pub steps: Vec<StepView>,

    /// Display progress; equals `total_steps` once the entity is flagged complete
    pub progress: u32,

    /// Steps actually completed (recorded aggregate for step-less entities)
    pub completed_steps: u32,

    pub total_steps: u32,
    pub is_completed: bool,
    pub state: ProgressState,
}

/// Merge a catalog entity with persisted progress
pub fn merge(entity: &Entity, progress: &EntityProgress) -> EntityView {
    let steps: Vec<StepView> = entity
        .steps
        .iter()
        .map(|step| StepView {
            id: step.id.clone(),
            title: step.title.clone(),
            completed: progress.step_completed(step),
            locked: step.locked,
        })
        .collect();

    let completed_steps = if entity.has_steps() {
        count_completed(&entity.steps, &progress.step_states, entity.total_steps)
    } else {
        progress.recorded_progress.unwrap_or(0).min(entity.total_steps)
    };

    let is_completed = is_fully_completed(completed_steps, entity.total_steps, progress.is_completed);
    let display_progress = if progress.is_completed {
        entity.total_steps
    } else {
        completed_steps
    };

    EntityView {
        id: entity.id.clone(),
        kind: entity.kind,
        title: entity.title.clone(),
        steps,
        progress: display_progress,
        completed_steps,
        total_steps: entity.total_steps,
        is_completed,
        state: ProgressState::derive(display_progress, entity.total_steps, progress.is_completed),
    }
}
