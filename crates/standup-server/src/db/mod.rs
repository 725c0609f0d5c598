pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use standup_core::{NewUpdate, Update, UpdateFilter, UpdatePatch};
use uuid::Uuid;

use crate::error::AppError;

pub use memory::MemoryStore;
pub use postgres::Database;

/// Persistence for update records.
///
/// Implementations apply the record lifetime themselves: an expired record
/// is invisible to every read and write, whether or not it has been purged.
#[async_trait]
pub trait UpdateStore: Send + Sync {
    /// Store a new record and return it with its assigned id and timestamps
    async fn create(&self, new: NewUpdate) -> Result<Update, AppError>;

    /// Records matching the filter, latest date first
    async fn list(&self, filter: &UpdateFilter) -> Result<Vec<Update>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Update>, AppError>;

    /// Apply a partial update, `None` if no live record has this id
    async fn patch(&self, id: Uuid, patch: &UpdatePatch) -> Result<Option<Update>, AppError>;

    /// Returns whether a record was removed
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Physically remove expired records, returning how many were removed
    async fn purge_expired(&self) -> Result<u64, AppError>;
}
