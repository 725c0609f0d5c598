//! Background removal of expired update records.
//!
//! Reads already hide expired records; the sweeper keeps them from piling
//! up in storage.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::db::UpdateStore;

/// Run one purge, logging the outcome. Errors are logged and swallowed so
/// the next tick can retry.
pub async fn sweep_once(store: &dyn UpdateStore) -> u64 {
    match store.purge_expired().await {
        Ok(0) => 0,
        Ok(removed) => {
            tracing::info!(removed, "purged expired updates");
            removed
        }
        Err(e) => {
            tracing::warn!("expiry sweep failed: {}", e);
            0
        }
    }
}

/// Spawn a task that purges expired records every `period`, starting now
pub fn spawn_sweeper(store: Arc<dyn UpdateStore>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep_once(store.as_ref()).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use chrono::{Duration as TtlDuration, Utc};
    use standup_core::{NewUpdate, UpdateFields};
    use uuid::Uuid;

    fn expired() -> standup_core::Update {
        NewUpdate::try_from(UpdateFields {
            employee_name: Some("Asha".into()),
            date: Some("2024-05-01".into()),
            updates: Some("work".into()),
            ..Default::default()
        })
        .unwrap()
        .into_update(Uuid::new_v4(), Utc::now() - TtlDuration::days(40))
    }

    #[tokio::test]
    async fn test_sweep_once_reports_removed() {
        let store = MemoryStore::default();
        store.seed(expired()).await;
        store.seed(expired()).await;

        assert_eq!(sweep_once(&store).await, 2);
        assert_eq!(sweep_once(&store).await, 0);
    }

    #[tokio::test]
    async fn test_sweeper_runs_immediately() {
        let store = Arc::new(MemoryStore::default());
        store.seed(expired()).await;

        let handle = spawn_sweeper(store.clone(), Duration::from_secs(3600));
        for _ in 0..100 {
            if store.count().await == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert_eq!(store.count().await, 0);
    }
}
