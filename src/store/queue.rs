//! Persistence of the queue record.

use std::sync::Arc;

use crate::download::QueueState;
use crate::error::Result;
use crate::store::KeyValueStore;

/// Store key of the queue record.
pub const DOWNLOAD_STATE_KEY: &str = "downloadState";

/// Saves, loads and clears the [`QueueState`] record.
#[derive(Clone)]
pub struct QueueStore {
    store: Arc<dyn KeyValueStore>,
}

impl QueueStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Underlying key-value store.
    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub async fn save(&self, state: &QueueState) -> Result<()> {
        let value = serde_json::to_value(state)?;
        self.store.set(DOWNLOAD_STATE_KEY, value).await
    }

    /// Load the saved record. A record without queued items counts as absent.
    pub async fn load(&self) -> Result<Option<QueueState>> {
        let Some(value) = self.store.get(DOWNLOAD_STATE_KEY).await? else {
            return Ok(None);
        };

        let state: QueueState = serde_json::from_value(value)?;
        if state.items.is_empty() {
            return Ok(None);
        }

        Ok(Some(state))
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.remove(DOWNLOAD_STATE_KEY).await
    }
}
