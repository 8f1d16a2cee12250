//! `LoadRepository` over a map.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{LoadPersistenceError, LoadRepository};
use crate::domain::{Load, LoadId, UserId};

#[derive(Debug, Default)]
pub struct InMemoryLoadRepository {
    loads: RwLock<HashMap<LoadId, Load>>,
}

impl InMemoryLoadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-populated with `loads`.
    pub fn with_loads(loads: impl IntoIterator<Item = Load>) -> Self {
        Self {
            loads: RwLock::new(loads.into_iter().map(|load| (load.id, load)).collect()),
        }
    }
}

fn newest_first<'a>(loads: impl Iterator<Item = &'a Load>) -> Vec<Load> {
    let mut rows: Vec<Load> = loads.cloned().collect();
    rows.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
    });
    rows
}

#[async_trait]
impl LoadRepository for InMemoryLoadRepository {
    async fn list_all(&self) -> Result<Vec<Load>, LoadPersistenceError> {
        Ok(newest_first(self.loads.read().await.values()))
    }

    async fn list_assigned_to(&self, user: &UserId) -> Result<Vec<Load>, LoadPersistenceError> {
        let loads = self.loads.read().await;
        Ok(newest_first(
            loads.values().filter(|load| load.is_assigned_to(user)),
        ))
    }

    async fn find(&self, id: &LoadId) -> Result<Option<Load>, LoadPersistenceError> {
        Ok(self.loads.read().await.get(id).cloned())
    }

    async fn insert(&self, load: &Load) -> Result<(), LoadPersistenceError> {
        let mut loads = self.loads.write().await;
        if loads.contains_key(&load.id) {
            return Err(LoadPersistenceError::query(format!(
                "load {} already exists",
                load.id
            )));
        }
        loads.insert(load.id, load.clone());
        Ok(())
    }

    async fn update(&self, load: &Load) -> Result<(), LoadPersistenceError> {
        let mut loads = self.loads.write().await;
        match loads.get_mut(&load.id) {
            Some(stored) => {
                *stored = load.clone();
                Ok(())
            }
            None => Err(LoadPersistenceError::query("record not found")),
        }
    }

    async fn delete(&self, id: &LoadId) -> Result<bool, LoadPersistenceError> {
        Ok(self.loads.write().await.remove(id).is_some())
    }

    async fn count_created_by(&self, user: &UserId) -> Result<u64, LoadPersistenceError> {
        let loads = self.loads.read().await;
        let count = loads.values().filter(|load| load.created_by == *user).count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}
