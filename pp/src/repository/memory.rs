//! In-memory repository

use serde_json::Value;
use std::collections::HashMap;

use super::ProgressRepository;
use crate::error::RepositoryError;

/// Process-local repository; state is lost when dropped
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    entries: HashMap<String, Value>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressRepository for MemoryRepository {
    fn get(&self, key: &str) -> Result<Option<Value>, RepositoryError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), RepositoryError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn set_many(&mut self, entries: Vec<(&str, Value)>) -> Result<(), RepositoryError> {
        self.entries
            .extend(entries.into_iter().map(|(key, value)| (key.to_string(), value)));
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), RepositoryError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, RepositoryError> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
