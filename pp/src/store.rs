//! ProgressStore - single source of truth for completion state
//!
//! All reads and mutations of challenge/quest progress go through the store,
//! which keeps three namespaces in its repository:
//!
//! ```text
//! completedEntities  { entityId: true }
//! completedSteps     { entityId: { stepId: bool } }
//! entityProgress     { entityId: u32 }          # step-less entities only
//! ```
//!
//! The entity-level completion flag is written only by `toggle_step`,
//! `mark_complete` and `reset_entity`, so it never disagrees with the step map
//! after a toggle. Operations touching more than one namespace commit them
//! through a single `set_many`, so a failed write changes neither.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use crate::error::{ProgressError, RepositoryError};
use crate::merge::{EntityView, merge};
use crate::model::{Entity, EntityId, EntityProgress, ProgressSnapshot, Step, StepStates, ToggleOutcome};
use crate::progress::{DEFAULT_RESET_BASELINE_RATIO, baseline_progress, count_completed};
use crate::repository::ProgressRepository;

/// Key of the completed-entities set
pub const COMPLETED_ENTITIES_KEY: &str = "completedEntities";

/// Key of the per-entity step maps
pub const COMPLETED_STEPS_KEY: &str = "completedSteps";

/// Key of recorded aggregate progress for step-less entities
pub const ENTITY_PROGRESS_KEY: &str = "entityProgress";

type CompletedEntities = BTreeMap<EntityId, bool>;
type CompletedSteps = BTreeMap<EntityId, StepStates>;
type RecordedProgress = BTreeMap<EntityId, u32>;

/// Store tuning
#[derive(Debug, Clone, PartialEq)]
pub struct StoreOptions {
    /// Share of the total a step-less entity keeps after reset
    pub reset_baseline_ratio: f64,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            reset_baseline_ratio: DEFAULT_RESET_BASELINE_RATIO,
        }
    }
}

/// Every persisted namespace at a point in time
#[derive(Debug, Clone, Serialize)]
pub struct ProgressExport {
    pub exported_at: DateTime<Utc>,
    pub completed_entities: BTreeMap<EntityId, bool>,
    pub completed_steps: BTreeMap<EntityId, StepStates>,
    pub entity_progress: BTreeMap<EntityId, u32>,
}

/// The progress store
pub struct ProgressStore<R> {
    repo: R,
    options: StoreOptions,
}

impl<R: ProgressRepository> ProgressStore<R> {
    pub fn new(repo: R) -> Self {
        Self::with_options(repo, StoreOptions::default())
    }

    pub fn with_options(repo: R, options: StoreOptions) -> Self {
        Self { repo, options }
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub(crate) fn repository_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    // === Core operations ===

    /// Persisted progress for an entity; unknown ids yield the empty default
    pub fn get_entity_progress(&self, entity_id: &str) -> Result<EntityProgress, ProgressError> {
        debug!(entity_id, "get_entity_progress: called");
        let steps: CompletedSteps = self.load(COMPLETED_STEPS_KEY)?;
        let completed: CompletedEntities = self.load(COMPLETED_ENTITIES_KEY)?;
        let recorded: RecordedProgress = self.load(ENTITY_PROGRESS_KEY)?;

        Ok(EntityProgress {
            step_states: steps.get(entity_id).cloned().unwrap_or_default(),
            is_completed: is_flagged(&completed, entity_id),
            recorded_progress: recorded.get(entity_id).copied(),
        })
    }

    /// Flip one step and recompute aggregate progress
    ///
    /// A step with no persisted entry flips from its authored default in
    /// `steps` (false when it is not listed). Locking is not checked here;
    /// use [`ProgressStore::toggle`] for catalog entities.
    pub fn toggle_step(
        &mut self,
        entity_id: &str,
        step_id: &str,
        steps: &[Step],
        total_steps: u32,
    ) -> Result<ToggleOutcome, ProgressError> {
        debug!(entity_id, step_id, total_steps, "toggle_step: called");
        let mut all_steps: CompletedSteps = self.load(COMPLETED_STEPS_KEY)?;
        let mut completed: CompletedEntities = self.load(COMPLETED_ENTITIES_KEY)?;

        let states = all_steps.entry(entity_id.to_string()).or_default();
        let authored = steps.iter().find(|s| s.id == step_id).map(|s| s.completed).unwrap_or(false);
        let current = states.get(step_id).copied().unwrap_or(authored);
        let step_completed = !current;
        states.insert(step_id.to_string(), step_completed);

        let progress = count_completed(steps, states, total_steps);
        let now_completed = total_steps > 0 && progress == total_steps;
        let step_states = states.clone();

        let mut writes = vec![(COMPLETED_STEPS_KEY, encode(COMPLETED_STEPS_KEY, &all_steps)?)];
        let was_flagged = is_flagged(&completed, entity_id);
        if now_completed != was_flagged {
            if now_completed {
                completed.insert(entity_id.to_string(), true);
            } else {
                completed.remove(entity_id);
            }
            writes.push((COMPLETED_ENTITIES_KEY, encode(COMPLETED_ENTITIES_KEY, &completed)?));
        }
        self.repo.set_many(writes)?;

        if now_completed && !was_flagged {
            info!(entity_id, progress, total_steps, "Entity completed");
        } else if !now_completed && was_flagged {
            info!(entity_id, progress, total_steps, "Entity completion retracted");
        }

        Ok(ToggleOutcome {
            step_id: step_id.to_string(),
            step_completed,
            step_states,
            progress,
            now_completed,
        })
    }

    /// Force an entity into the completed state
    ///
    /// Only the completion flag is written; individual step flags are left
    /// as they are. Idempotent.
    pub fn mark_complete(&mut self, entity_id: &str, total_steps: u32) -> Result<ProgressSnapshot, ProgressError> {
        debug!(entity_id, total_steps, "mark_complete: called");
        let mut completed: CompletedEntities = self.load(COMPLETED_ENTITIES_KEY)?;
        if !is_flagged(&completed, entity_id) {
            completed.insert(entity_id.to_string(), true);
            self.save(COMPLETED_ENTITIES_KEY, &completed)?;
            info!(entity_id, "Entity marked complete");
        }

        Ok(ProgressSnapshot {
            entity_id: entity_id.to_string(),
            progress: total_steps,
            total_steps,
            is_completed: true,
        })
    }

    /// Clear completion and rewind progress
    ///
    /// Entities with steps get an explicit `false` for every known step (the
    /// catalog's steps and any already persisted), so authored defaults no
    /// longer count. Step-less entities fall back to the configured baseline.
    pub fn reset_entity(
        &mut self,
        entity_id: &str,
        steps: &[Step],
        total_steps: u32,
    ) -> Result<ProgressSnapshot, ProgressError> {
        debug!(entity_id, step_count = steps.len(), total_steps, "reset_entity: called");
        let mut writes = Vec::with_capacity(2);
        let mut completed: CompletedEntities = self.load(COMPLETED_ENTITIES_KEY)?;
        if completed.remove(entity_id).is_some() {
            writes.push((COMPLETED_ENTITIES_KEY, encode(COMPLETED_ENTITIES_KEY, &completed)?));
        }

        let progress = if steps.is_empty() {
            let baseline = baseline_progress(total_steps, self.options.reset_baseline_ratio);
            let mut recorded: RecordedProgress = self.load(ENTITY_PROGRESS_KEY)?;
            recorded.insert(entity_id.to_string(), baseline);
            writes.push((ENTITY_PROGRESS_KEY, encode(ENTITY_PROGRESS_KEY, &recorded)?));
            baseline
        } else {
            let mut all_steps: CompletedSteps = self.load(COMPLETED_STEPS_KEY)?;
            let states = all_steps.entry(entity_id.to_string()).or_default();
            states.values_mut().for_each(|v| *v = false);
            for step in steps {
                states.insert(step.id.clone(), false);
            }
            writes.push((COMPLETED_STEPS_KEY, encode(COMPLETED_STEPS_KEY, &all_steps)?));
            0
        };
        self.repo.set_many(writes)?;

        info!(entity_id, progress, "Entity reset");
        Ok(ProgressSnapshot {
            entity_id: entity_id.to_string(),
            progress,
            total_steps,
            is_completed: false,
        })
    }

    // === Catalog-aware wrappers ===

    /// Current merged view of a catalog entity
    pub fn view(&self, entity: &Entity) -> Result<EntityView, ProgressError> {
        let progress = self.get_entity_progress(&entity.id)?;
        Ok(merge(entity, &progress))
    }

    /// Current aggregate progress of a catalog entity
    pub fn snapshot(&self, entity: &Entity) -> Result<ProgressSnapshot, ProgressError> {
        let view = self.view(entity)?;
        Ok(ProgressSnapshot {
            entity_id: view.id,
            progress: view.progress,
            total_steps: view.total_steps,
            is_completed: view.is_completed,
        })
    }

    /// Toggle a step of a catalog entity, rejecting locked and unknown steps
    ///
    /// A rejected toggle writes nothing.
    pub fn toggle(&mut self, entity: &Entity, step_id: &str) -> Result<ToggleOutcome, ProgressError> {
        let step = entity.step(step_id).ok_or_else(|| ProgressError::UnknownStep {
            entity_id: entity.id.clone(),
            step_id: step_id.to_string(),
        })?;
        if step.locked {
            debug!(entity_id = %entity.id, step_id, "toggle: rejected locked step");
            return Err(ProgressError::StepLocked {
                entity_id: entity.id.clone(),
                step_id: step_id.to_string(),
            });
        }
        self.toggle_step(&entity.id, step_id, &entity.steps, entity.total_steps)
    }

    pub fn complete(&mut self, entity: &Entity) -> Result<ProgressSnapshot, ProgressError> {
        self.mark_complete(&entity.id, entity.total_steps)
    }

    pub fn reset(&mut self, entity: &Entity) -> Result<ProgressSnapshot, ProgressError> {
        self.reset_entity(&entity.id, &entity.steps, entity.total_steps)
    }

    // === Inspection ===

    /// Ids of every entity with any persisted record
    pub fn list_tracked(&self) -> Result<Vec<EntityId>, ProgressError> {
        let steps: CompletedSteps = self.load(COMPLETED_STEPS_KEY)?;
        let completed: CompletedEntities = self.load(COMPLETED_ENTITIES_KEY)?;
        let recorded: RecordedProgress = self.load(ENTITY_PROGRESS_KEY)?;

        let ids: BTreeSet<EntityId> = steps
            .into_keys()
            .chain(completed.into_keys())
            .chain(recorded.into_keys())
            .collect();
        Ok(ids.into_iter().collect())
    }

    /// Snapshot of every namespace
    pub fn export(&self) -> Result<ProgressExport, ProgressError> {
        Ok(ProgressExport {
            exported_at: Utc::now(),
            completed_entities: self.load(COMPLETED_ENTITIES_KEY)?,
            completed_steps: self.load(COMPLETED_STEPS_KEY)?,
            entity_progress: self.load(ENTITY_PROGRESS_KEY)?,
        })
    }

    // === Namespace I/O ===

    pub(crate) fn load<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, RepositoryError> {
        match self.repo.get(key)? {
            Some(value) => decode(key, value),
            None => Ok(T::default()),
        }
    }

    pub(crate) fn save<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), RepositoryError> {
        let value = encode(key, value)?;
        self.repo.set(key, value)
    }
}

pub(crate) fn decode<T: DeserializeOwned>(key: &str, value: serde_json::Value) -> Result<T, RepositoryError> {
    serde_json::from_value(value).map_err(|source| RepositoryError::Corrupt {
        key: key.to_string(),
        source,
    })
}

fn encode<T: Serialize>(key: &str, value: &T) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(value).map_err(|source| RepositoryError::Encode {
        key: key.to_string(),
        source,
    })
}

fn is_flagged(completed: &CompletedEntities, entity_id: &str) -> bool {
    completed.get(entity_id).copied().unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProgressState;
    use crate::repository::MemoryRepository;
    use proptest::prelude::*;
    use serde_json::json;

    fn street_food() -> Entity {
        Entity::challenge(
            "seoul-street-food",
            "Seoul Street Food",
            vec![
                Step::new("gwangjang-tteokbokki", "Gwangjang Market Tteokbokki").done(),
                Step::new("myeongdong-food", "Myeongdong Food Street").done(),
                Step::new("hongdae-eggbread", "Hongdae Egg Bread").done(),
                Step::new("namdaemun-kimbap", "Namdaemun Kimbap"),
                Step::new("dongdaemun-hotteok", "Dongdaemun Hotteok"),
            ],
        )
    }

    fn bakery() -> Entity {
        Entity::challenge(
            "seoul-bakery-pilgrimage",
            "Seoul Bakery Pilgrimage",
            (1..=6).map(|i| Step::new(format!("bakery-{i}"), format!("Bakery {i}"))).collect(),
        )
    }

    fn store() -> ProgressStore<MemoryRepository> {
        ProgressStore::new(MemoryRepository::new())
    }

    #[test]
    fn test_unknown_entity_is_empty() {
        let store = store();
        let progress = store.get_entity_progress("nowhere").unwrap();
        assert!(progress.step_states.is_empty());
        assert!(!progress.is_completed);
        assert_eq!(progress.recorded_progress, None);
    }

    #[test]
    fn test_street_food_scenario() {
        let mut store = store();
        let entity = street_food();

        let initial = store.snapshot(&entity).unwrap();
        assert_eq!(initial.progress, 3);
        assert!(!initial.is_completed);

        let outcome = store.toggle(&entity, "namdaemun-kimbap").unwrap();
        assert_eq!(outcome.progress, 4);
        assert!(!outcome.now_completed);

        let outcome = store.toggle(&entity, "dongdaemun-hotteok").unwrap();
        assert_eq!(outcome.progress, 5);
        assert!(outcome.now_completed);
        assert!(store.get_entity_progress(&entity.id).unwrap().is_completed);

        let outcome = store.toggle(&entity, "namdaemun-kimbap").unwrap();
        assert_eq!(outcome.progress, 4);
        assert!(!outcome.now_completed);
        assert!(!store.get_entity_progress(&entity.id).unwrap().is_completed);
        assert_eq!(store.snapshot(&entity).unwrap().state(), ProgressState::InProgress);
    }

    #[test]
    fn test_first_toggle_of_unlisted_step_sets_true() {
        let mut store = store();
        let outcome = store.toggle_step("seoul-street-food", "new-stall", &[], 5).unwrap();
        assert!(outcome.step_completed);
        assert_eq!(outcome.progress, 0);
        assert_eq!(outcome.step_states.get("new-stall"), Some(&true));
    }

    #[test]
    fn test_bakery_reset_from_completed() {
        let mut store = store();
        let entity = bakery();
        for step in &entity.steps {
            store.toggle(&entity, &step.id).unwrap();
        }
        assert!(store.snapshot(&entity).unwrap().is_completed);

        let snapshot = store.reset_entity(&entity.id, &entity.steps, 6).unwrap();
        assert_eq!(snapshot.progress, 0);
        assert!(!snapshot.is_completed);

        let progress = store.get_entity_progress(&entity.id).unwrap();
        assert!(!progress.is_completed);
        assert_eq!(progress.step_states.len(), 6);
        assert!(progress.step_states.values().all(|done| !done));
    }

    #[test]
    fn test_reset_overrides_authored_defaults() {
        let mut store = store();
        let entity = street_food();
        store.reset(&entity).unwrap();

        let snapshot = store.snapshot(&entity).unwrap();
        assert_eq!(snapshot.progress, 0);
        assert_eq!(snapshot.state(), ProgressState::NotStarted);
    }

    #[test]
    fn test_reset_stepless_uses_baseline() {
        let mut store = store();
        let entity = Entity::stepless("han-river-sunsets", "Han River Sunsets", 10);
        store.complete(&entity).unwrap();

        let snapshot = store.reset(&entity).unwrap();
        assert_eq!(snapshot.progress, 3);
        assert!(!snapshot.is_completed);

        let view = store.view(&entity).unwrap();
        assert_eq!(view.progress, 3);
        assert!(!view.is_completed);
    }

    #[test]
    fn test_reset_baseline_is_configurable() {
        let options = StoreOptions {
            reset_baseline_ratio: 0.5,
        };
        let mut store = ProgressStore::with_options(MemoryRepository::new(), options);
        let snapshot = store.reset_entity("han-river-sunsets", &[], 9).unwrap();
        assert_eq!(snapshot.progress, 4);
    }

    #[test]
    fn test_mark_complete_keeps_step_flags() {
        let mut store = store();
        let entity = street_food();
        let snapshot = store.complete(&entity).unwrap();
        assert_eq!(snapshot.progress, 5);
        assert!(snapshot.is_completed);

        let progress = store.get_entity_progress(&entity.id).unwrap();
        assert!(progress.is_completed);
        assert!(progress.step_states.is_empty());
    }

    #[test]
    fn test_toggle_after_mark_complete_retracts_flag() {
        let mut store = store();
        let entity = street_food();
        store.complete(&entity).unwrap();

        let outcome = store.toggle(&entity, "gwangjang-tteokbokki").unwrap();
        assert_eq!(outcome.progress, 2);
        assert!(!store.get_entity_progress(&entity.id).unwrap().is_completed);
    }

    #[test]
    fn test_locked_step_is_rejected_without_writes() {
        let mut store = store();
        let quest = Entity::quest(
            "seoul",
            "palace-trail",
            "Palace Trail",
            vec![Step::new("gyeongbokgung", "Gyeongbokgung"), Step::new("secret-garden", "Secret Garden").locked()],
        );
        store.toggle(&quest, "gyeongbokgung").unwrap();
        let before = store.export().unwrap();

        let err = store.toggle(&quest, "secret-garden").unwrap_err();
        assert!(matches!(err, ProgressError::StepLocked { .. }));

        let after = store.export().unwrap();
        assert_eq!(before.completed_steps, after.completed_steps);
        assert_eq!(before.completed_entities, after.completed_entities);
    }

    #[test]
    fn test_unknown_step_is_rejected() {
        let mut store = store();
        let err = store.toggle(&street_food(), "itaewon-kebab").unwrap_err();
        assert!(matches!(err, ProgressError::UnknownStep { .. }));
        assert!(store.list_tracked().unwrap().is_empty());
    }

    #[test]
    fn test_list_tracked_spans_namespaces() {
        let mut store = store();
        store.toggle_step("b-challenge", "s1", &[], 3).unwrap();
        store.mark_complete("a-challenge", 2).unwrap();
        store.reset_entity("c-challenge", &[], 10).unwrap();

        assert_eq!(store.list_tracked().unwrap(), vec!["a-challenge", "b-challenge", "c-challenge"]);
    }

    #[test]
    fn test_persisted_layout() {
        let mut store = store();
        let entity = street_food();
        store.toggle(&entity, "namdaemun-kimbap").unwrap();
        store.toggle(&entity, "dongdaemun-hotteok").unwrap();

        let repo = store.repository();
        assert_eq!(
            repo.get(COMPLETED_ENTITIES_KEY).unwrap(),
            Some(json!({"seoul-street-food": true}))
        );
        assert_eq!(
            repo.get(COMPLETED_STEPS_KEY).unwrap(),
            Some(json!({"seoul-street-food": {"dongdaemun-hotteok": true, "namdaemun-kimbap": true}}))
        );
    }

    #[test]
    fn test_malformed_namespace_is_an_error() {
        let mut repo = MemoryRepository::new();
        repo.set(COMPLETED_STEPS_KEY, json!(["not", "a", "map"])).unwrap();
        let store = ProgressStore::new(repo);

        let err = store.get_entity_progress("seoul-street-food").unwrap_err();
        assert!(matches!(
            err,
            ProgressError::Repository(RepositoryError::Corrupt { ref key, .. }) if key == COMPLETED_STEPS_KEY
        ));
    }

    /// Memory repository that refuses any write touching `reject_key`
    struct RejectingRepository {
        inner: MemoryRepository,
        reject_key: &'static str,
    }

    impl RejectingRepository {
        fn rejected(&self, key: &str) -> Result<(), RepositoryError> {
            if key == self.reject_key {
                return Err(RepositoryError::InvalidKey(key.to_string()));
            }
            Ok(())
        }
    }

    impl ProgressRepository for RejectingRepository {
        fn get(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: serde_json::Value) -> Result<(), RepositoryError> {
            self.rejected(key)?;
            self.inner.set(key, value)
        }

        fn set_many(&mut self, entries: Vec<(&str, serde_json::Value)>) -> Result<(), RepositoryError> {
            for (key, _) in &entries {
                self.rejected(key)?;
            }
            self.inner.set_many(entries)
        }

        fn remove(&mut self, key: &str) -> Result<(), RepositoryError> {
            self.inner.remove(key)
        }

        fn keys(&self) -> Result<Vec<String>, RepositoryError> {
            self.inner.keys()
        }
    }

    /// Street food completed through its steps, then writes to `reject_key` fail
    fn completed_street_food_rejecting(reject_key: &'static str) -> ProgressStore<RejectingRepository> {
        let entity = street_food();
        let mut store = store();
        store.toggle(&entity, "namdaemun-kimbap").unwrap();
        store.toggle(&entity, "dongdaemun-hotteok").unwrap();
        let inner = store.repo;
        ProgressStore::new(RejectingRepository { inner, reject_key })
    }

    #[test]
    fn test_failed_flag_write_keeps_step_map() {
        let entity = street_food();
        let mut store = completed_street_food_rejecting(COMPLETED_ENTITIES_KEY);
        let before = store.export().unwrap();

        let err = store.toggle(&entity, "dongdaemun-hotteok").unwrap_err();
        assert!(matches!(err, ProgressError::Repository(_)));

        let after = store.export().unwrap();
        assert_eq!(before.completed_steps, after.completed_steps);
        assert_eq!(before.completed_entities, after.completed_entities);
        let view = store.view(&entity).unwrap();
        assert_eq!(view.completed_steps, 5);
        assert!(view.steps.iter().all(|s| s.completed));
    }

    #[test]
    fn test_failed_reset_changes_nothing() {
        let entity = street_food();
        let mut store = completed_street_food_rejecting(COMPLETED_STEPS_KEY);
        let before = store.export().unwrap();

        assert!(store.reset(&entity).is_err());

        let after = store.export().unwrap();
        assert_eq!(before.completed_steps, after.completed_steps);
        assert_eq!(before.completed_entities, after.completed_entities);
        assert_eq!(store.snapshot(&entity).unwrap().state(), ProgressState::Completed);
    }

    #[test]
    fn test_failed_stepless_reset_keeps_completion() {
        let entity = Entity::stepless("han-river-sunsets", "Han River Sunsets", 10);
        let mut store = store();
        store.complete(&entity).unwrap();
        let inner = store.repo;
        let mut store = ProgressStore::new(RejectingRepository {
            inner,
            reject_key: ENTITY_PROGRESS_KEY,
        });

        assert!(store.reset(&entity).is_err());

        let progress = store.get_entity_progress(&entity.id).unwrap();
        assert!(progress.is_completed);
        assert_eq!(progress.recorded_progress, None);
    }

    fn plain_steps(count: usize) -> Vec<Step> {
        (0..count).map(|i| Step::new(format!("step-{i}"), format!("Step {i}"))).collect()
    }

    proptest! {
        #[test]
        fn toggling_every_step_completes(count in 1usize..10) {
            let steps = plain_steps(count);
            let total = count as u32;
            let mut store = store();
            for step in &steps {
                store.toggle_step("entity", &step.id, &steps, total).unwrap();
            }
            let entity = Entity::challenge("entity", "Entity", steps);
            let snapshot = store.snapshot(&entity).unwrap();
            prop_assert!(snapshot.is_completed);
            prop_assert_eq!(snapshot.progress, total);
        }

        #[test]
        fn toggling_twice_restores_step(
            authored in proptest::collection::vec(any::<bool>(), 1..8),
            pick in any::<proptest::sample::Index>(),
        ) {
            let steps: Vec<Step> = authored
                .iter()
                .enumerate()
                .map(|(i, done)| Step { completed: *done, ..Step::new(format!("step-{i}"), "") })
                .collect();
            let entity = Entity::challenge("entity", "Entity", steps);
            let step = &entity.steps[pick.index(entity.steps.len())];

            let mut store = store();
            let before = store.view(&entity).unwrap();
            store.toggle(&entity, &step.id).unwrap();
            store.toggle(&entity, &step.id).unwrap();
            let after = store.view(&entity).unwrap();

            prop_assert_eq!(before.steps, after.steps);
            prop_assert_eq!(before.progress, after.progress);
        }

        #[test]
        fn reset_always_zeroes_stepped_entities(toggles in proptest::collection::vec(0usize..6, 0..20), completed in any::<bool>()) {
            let entity = Entity::challenge("entity", "Entity", plain_steps(6));
            let mut store = store();
            for i in toggles {
                store.toggle(&entity, &entity.steps[i].id).unwrap();
            }
            if completed {
                store.complete(&entity).unwrap();
            }

            let snapshot = store.reset(&entity).unwrap();
            prop_assert_eq!(snapshot.progress, 0);
            prop_assert!(!snapshot.is_completed);
            let view = store.view(&entity).unwrap();
            prop_assert_eq!(view.progress, 0);
            prop_assert!(!view.is_completed);
        }

        #[test]
        fn reset_stepless_keeps_floor_of_baseline(total in 1u32..200) {
            let mut store = store();
            let snapshot = store.reset_entity("entity", &[], total).unwrap();
            prop_assert_eq!(snapshot.progress, ((total as f64) * 0.3).floor() as u32);
        }

        #[test]
        fn mark_complete_is_idempotent(total in 1u32..20) {
            let mut once = store();
            let first = once.mark_complete("entity", total).unwrap();
            let single = once.export().unwrap();

            let mut twice = store();
            twice.mark_complete("entity", total).unwrap();
            let second = twice.mark_complete("entity", total).unwrap();
            let double = twice.export().unwrap();

            prop_assert_eq!(first, second);
            prop_assert_eq!(single.completed_entities, double.completed_entities);
            prop_assert_eq!(single.completed_steps, double.completed_steps);
        }
    }
}
