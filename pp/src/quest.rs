//! Quest task tracking
//!
//! Quest tasks share the canonical `completedSteps` map with challenges, keyed
//! by `{cityId}-{questId}`. Older data kept a flat array of completed task ids
//! under `{cityId}-{questId}-completed-tasks`; the migrations here fold that
//! shape into the map and drop the legacy key.

use tracing::{debug, info};

use crate::error::ProgressError;
use crate::model::{Entity, EntityId, EntityKind, StepStates, ToggleOutcome, quest_entity_id};
use crate::repository::ProgressRepository;
use crate::store::{COMPLETED_STEPS_KEY, ProgressStore, decode};

/// Suffix of legacy per-quest keys
pub const LEGACY_QUEST_SUFFIX: &str = "-completed-tasks";

/// Legacy key for a quest's completed-task array
pub fn legacy_quest_key(city_id: &str, quest_id: &str) -> String {
    format!("{}{}", quest_entity_id(city_id, quest_id), LEGACY_QUEST_SUFFIX)
}

/// Outcome of migrating one legacy key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub entity_id: EntityId,

    /// Task ids read from the legacy array
    pub found: usize,

    /// Task ids written to the step map (ids already present are kept as is)
    pub migrated: usize,
}

impl<R: ProgressRepository> ProgressStore<R> {
    /// Toggle a quest task
    ///
    /// Only quest entities are accepted, and locked or unknown tasks are
    /// rejected without writing.
    pub fn toggle_quest_task(&mut self, quest: &Entity, task_id: &str) -> Result<ToggleOutcome, ProgressError> {
        debug!(quest_id = %quest.id, task_id, "toggle_quest_task: called");
        if quest.kind != EntityKind::Quest {
            return Err(ProgressError::NotAQuest(quest.id.clone()));
        }
        self.toggle(quest, task_id)
    }

    /// Fold `{city}-{quest}-completed-tasks` into the step map
    ///
    /// Returns `None` when there is no legacy key. Entries already in the
    /// step map win over the legacy array.
    pub fn migrate_legacy_quest_tasks(
        &mut self,
        city_id: &str,
        quest_id: &str,
    ) -> Result<Option<MigrationReport>, ProgressError> {
        let key = legacy_quest_key(city_id, quest_id);
        self.migrate_legacy_key(&key)
    }

    /// Migrate every legacy quest key in the repository
    pub fn migrate_all_legacy_quests(&mut self) -> Result<Vec<MigrationReport>, ProgressError> {
        let keys: Vec<String> = self
            .repository()
            .keys()?
            .into_iter()
            .filter(|k| k.ends_with(LEGACY_QUEST_SUFFIX) && k.len() > LEGACY_QUEST_SUFFIX.len())
            .collect();

        let mut reports = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(report) = self.migrate_legacy_key(&key)? {
                reports.push(report);
            }
        }
        Ok(reports)
    }

    fn migrate_legacy_key(&mut self, key: &str) -> Result<Option<MigrationReport>, ProgressError> {
        let Some(entity_id) = key.strip_suffix(LEGACY_QUEST_SUFFIX) else {
            return Ok(None);
        };
        let task_ids: Vec<String> = match self.repository().get(key)? {
            Some(value) => decode(key, value)?,
            None => {
                debug!(key, "migrate_legacy_key: no legacy data");
                return Ok(None);
            }
        };

        let mut all_steps: std::collections::BTreeMap<EntityId, StepStates> = self.load(COMPLETED_STEPS_KEY)?;
        let states = all_steps.entry(entity_id.to_string()).or_default();
        let mut migrated = 0;
        for task_id in &task_ids {
            if !states.contains_key(task_id) {
                states.insert(task_id.clone(), true);
                migrated += 1;
            }
        }

        self.save(COMPLETED_STEPS_KEY, &all_steps)?;
        self.repository_mut().remove(key)?;

        info!(entity_id, found = task_ids.len(), migrated, "Migrated legacy quest tasks");
        Ok(Some(MigrationReport {
            entity_id: entity_id.to_string(),
            found: task_ids.len(),
            migrated,
        }))
    }
}
