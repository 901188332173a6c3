use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{CatalogError, Result};
use crate::storage::{KeyValueStore, ListEntry, ListKind, UserListStore};

/// Volatile store for tests and database-less runs
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
    lists: Mutex<Vec<ListEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
        mutex
            .lock()
            .map_err(|_| CatalogError::Storage("memory store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(Self::guard(&self.slots)?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::guard(&self.slots)?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[async_trait]
impl UserListStore for MemoryStore {
    async fn add(&self, kind: ListKind, user_id: &str, game_id: u64) -> Result<ListEntry> {
        let mut lists = Self::guard(&self.lists)?;
        if lists
            .iter()
            .any(|e| e.kind == kind && e.user_id == user_id && e.game_id == game_id)
        {
            return Err(CatalogError::AlreadyListed {
                list: kind.to_string(),
                game_id,
            });
        }

        let entry = ListEntry {
            user_id: user_id.to_string(),
            game_id,
            kind,
            created_at: Utc::now(),
        };
        lists.push(entry.clone());
        Ok(entry)
    }

    async fn remove(&self, kind: ListKind, user_id: &str, game_id: u64) -> Result<bool> {
        let mut lists = Self::guard(&self.lists)?;
        let before = lists.len();
        lists.retain(|e| !(e.kind == kind && e.user_id == user_id && e.game_id == game_id));
        Ok(lists.len() < before)
    }

    async fn list(&self, kind: ListKind, user_id: &str) -> Result<Vec<ListEntry>> {
        let lists = Self::guard(&self.lists)?;
        // Insertion order is chronological; reverse for newest first
        Ok(lists
            .iter()
            .rev()
            .filter(|e| e.kind == kind && e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn contains(&self, kind: ListKind, user_id: &str, game_id: u64) -> Result<bool> {
        let lists = Self::guard(&self.lists)?;
        Ok(lists
            .iter()
            .any(|e| e.kind == kind && e.user_id == user_id && e.game_id == game_id))
    }
}
