use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use standup_core::{newest_first, NewUpdate, Update, UpdateFilter, UpdatePatch};

use super::UpdateStore;
use crate::error::AppError;

/// In-process update store, used by tests and local fixtures
pub struct MemoryStore {
    records: RwLock<HashMap<Uuid, Update>>,
    ttl: Duration,
}

impl MemoryStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Insert a fully formed record as-is, timestamps included
    pub async fn seed(&self, update: Update) {
        self.records.write().await.insert(update.id, update);
    }

    /// Number of records held, expired ones included
    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }

    fn is_live(&self, update: &Update) -> bool {
        !update.is_expired(Utc::now(), self.ttl)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(standup_core::default_ttl())
    }
}

#[async_trait]
impl UpdateStore for MemoryStore {
    async fn create(&self, new: NewUpdate) -> Result<Update, AppError> {
        let update = new.into_update(Uuid::new_v4(), Utc::now());
        self.records.write().await.insert(update.id, update.clone());
        Ok(update)
    }

    async fn list(&self, filter: &UpdateFilter) -> Result<Vec<Update>, AppError> {
        let records = self.records.read().await;
        let mut updates: Vec<Update> = records
            .values()
            .filter(|u| self.is_live(u) && filter.matches(u))
            .cloned()
            .collect();
        updates.sort_by(newest_first);
        Ok(updates)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Update>, AppError> {
        let records = self.records.read().await;
        Ok(records.get(&id).filter(|u| self.is_live(u)).cloned())
    }

    async fn patch(&self, id: Uuid, patch: &UpdatePatch) -> Result<Option<Update>, AppError> {
        let now = Utc::now();
        let mut records = self.records.write().await;
        let Some(update) = records.get_mut(&id) else {
            return Ok(None);
        };
        if update.is_expired(now, self.ttl) {
            return Ok(None);
        }
        patch.apply(update, now);
        Ok(Some(update.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut records = self.records.write().await;
        let live = records.get(&id).is_some_and(|u| self.is_live(u));
        if live {
            records.remove(&id);
        }
        Ok(live)
    }

    async fn purge_expired(&self) -> Result<u64, AppError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, u| self.is_live(u));
        Ok((before - records.len()) as u64)
    }
}
