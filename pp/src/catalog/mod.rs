//! Read-only catalog of challenges and quests
//!
//! The progress store never reads catalog data itself; callers look entities
//! up here and hand them to the store. `StaticCatalog` is loaded from YAML,
//! falling back to the dataset compiled into the binary.

mod embedded;

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{CatalogError, ProgressError};
use crate::model::{Difficulty, Entity, EntityKind, Step, quest_entity_id};

pub use embedded::DEFAULT_CATALOG;

/// Read-only source of trackable entities
pub trait Catalog {
    /// All entities in catalog order
    fn entities(&self) -> &[Entity];

    fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities().iter().find(|e| e.id == id)
    }

    /// Like [`Catalog::entity`], but an unknown id is an error
    fn require(&self, id: &str) -> Result<&Entity, ProgressError> {
        self.entity(id).ok_or_else(|| ProgressError::UnknownEntity(id.to_string()))
    }

    fn challenge(&self, id: &str) -> Option<&Entity> {
        self.entity(id).filter(|e| e.kind == EntityKind::Challenge)
    }

    fn quest(&self, city_id: &str, quest_id: &str) -> Option<&Entity> {
        self.entity(&quest_entity_id(city_id, quest_id))
            .filter(|e| e.kind == EntityKind::Quest)
    }

    fn challenges(&self) -> Vec<&Entity> {
        self.entities().iter().filter(|e| e.kind == EntityKind::Challenge).collect()
    }

    fn quests(&self) -> Vec<&Entity> {
        self.entities().iter().filter(|e| e.kind == EntityKind::Quest).collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CatalogFile {
    #[serde(default)]
    challenges: Vec<ChallengeDef>,
    #[serde(default)]
    quests: Vec<QuestDef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ChallengeDef {
    id: String,
    title: String,
    category: Option<String>,
    difficulty: Option<Difficulty>,
    /// Required when the challenge has no steps
    total_steps: Option<u32>,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct QuestDef {
    city: String,
    id: String,
    title: String,
    tasks: Vec<Step>,
}

impl ChallengeDef {
    fn into_entity(self) -> Result<Entity, CatalogError> {
        let total_steps = match self.total_steps {
            Some(total) => total,
            None => step_count(&self.id, self.steps.len())?,
        };
        Ok(Entity {
            id: self.id,
            kind: EntityKind::Challenge,
            title: self.title,
            category: self.category,
            difficulty: self.difficulty,
            city_id: None,
            total_steps,
            steps: self.steps,
        })
    }
}

impl QuestDef {
    fn into_entity(self) -> Result<Entity, CatalogError> {
        step_count(&quest_entity_id(&self.city, &self.id), self.tasks.len())?;
        let mut entity = Entity::quest(&self.city, &self.id, self.title, self.tasks);
        entity.category = Some("quest".to_string());
        Ok(entity)
    }
}

fn step_count(id: &str, listed: usize) -> Result<u32, CatalogError> {
    u32::try_from(listed).map_err(|_| CatalogError::TooManySteps {
        id: id.to_string(),
        listed,
    })
}

/// Catalog held entirely in memory
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    entities: Vec<Entity>,
}

impl StaticCatalog {
    /// Build from entities, validating them
    pub fn new(entities: Vec<Entity>) -> Result<Self, CatalogError> {
        validate(&entities)?;
        Ok(Self { entities })
    }

    /// Parse a YAML catalog document
    pub fn from_yaml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(content)?;
        let entities = file
            .challenges
            .into_iter()
            .map(ChallengeDef::into_entity)
            .chain(file.quests.into_iter().map(QuestDef::into_entity))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(entities)
    }

    /// Load a YAML catalog file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_yaml_str(&content)?;
        info!(path = %path.display(), entities = catalog.entities.len(), "Loaded catalog");
        Ok(catalog)
    }

    /// The dataset compiled into the binary
    pub fn embedded() -> Result<Self, CatalogError> {
        debug!("Using embedded catalog");
        Self::from_yaml_str(DEFAULT_CATALOG)
    }
}

impl Catalog for StaticCatalog {
    fn entities(&self) -> &[Entity] {
        &self.entities
    }
}

fn validate(entities: &[Entity]) -> Result<(), CatalogError> {
    let mut ids = HashSet::new();
    for entity in entities {
        if !ids.insert(entity.id.as_str()) {
            return Err(CatalogError::DuplicateEntity(entity.id.clone()));
        }
        if entity.total_steps == 0 {
            return Err(CatalogError::ZeroSteps(entity.id.clone()));
        }
        if entity.has_steps() && entity.steps.len() != entity.total_steps as usize {
            return Err(CatalogError::StepCountMismatch {
                id: entity.id.clone(),
                declared: entity.total_steps,
                listed: entity.steps.len(),
            });
        }

        let mut step_ids = HashSet::new();
        for step in &entity.steps {
            if !step_ids.insert(step.id.as_str()) {
                return Err(CatalogError::DuplicateStep {
                    entity_id: entity.id.clone(),
                    step_id: step.id.clone(),
                });
            }
        }
    }
    Ok(())
}
