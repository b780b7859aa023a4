//! Rate-limit settings and their hot-reload handle.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;

use crate::config::validation::{
    validate_cooldown_after_100, validate_cooldown_ms, validate_settings,
};
use crate::error::Result;
use crate::store::KeyValueStore;

/// Default delay between two downloads.
pub const DEFAULT_COOLDOWN_MS: u64 = 2_000;

/// Default pause after every 100 downloads.
pub const DEFAULT_COOLDOWN_AFTER_100_MS: u64 = 120_000;

/// Store key of the inter-item delay.
pub const COOLDOWN_MS_KEY: &str = "cooldownMs";

/// Store key of the milestone cooldown.
pub const COOLDOWN_AFTER_100_KEY: &str = "cooldownAfter100";

/// Process-wide rate-limit settings.
///
/// Serialised as the settings record `{cooldownMs, cooldownAfter100}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "cooldownMs")]
    pub inter_item_delay_ms: u64,

    #[serde(rename = "cooldownAfter100")]
    pub milestone_cooldown_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            inter_item_delay_ms: DEFAULT_COOLDOWN_MS,
            milestone_cooldown_ms: DEFAULT_COOLDOWN_AFTER_100_MS,
        }
    }
}

impl Settings {
    pub fn inter_item_delay(&self) -> Duration {
        Duration::from_millis(self.inter_item_delay_ms)
    }

    pub fn milestone_cooldown(&self) -> Duration {
        Duration::from_millis(self.milestone_cooldown_ms)
    }

    /// Read stored settings, keeping `defaults` for absent or unusable keys.
    pub async fn load(store: &dyn KeyValueStore, defaults: Settings) -> Settings {
        let mut settings = defaults;

        if let Some(ms) = read_millis(store, COOLDOWN_MS_KEY, validate_cooldown_ms).await {
            settings.inter_item_delay_ms = ms;
        }

        if let Some(ms) =
            read_millis(store, COOLDOWN_AFTER_100_KEY, validate_cooldown_after_100).await
        {
            settings.milestone_cooldown_ms = ms;
        }

        settings
    }

    /// Write both keys of the settings record.
    pub async fn persist(&self, store: &dyn KeyValueStore) -> Result<()> {
        store
            .set(COOLDOWN_MS_KEY, Value::from(self.inter_item_delay_ms))
            .await?;
        store
            .set(COOLDOWN_AFTER_100_KEY, Value::from(self.milestone_cooldown_ms))
            .await
    }
}

/// A stored value for `key`, if present, numeric and accepted by `check`.
async fn read_millis(
    store: &dyn KeyValueStore,
    key: &str,
    check: fn(u64) -> Result<()>,
) -> Option<u64> {
    let value = match store.get(key).await {
        Ok(Some(value)) => value,
        Ok(None) => {
            tracing::debug!("Using default {}", key);
            return None;
        }
        Err(e) => {
            tracing::warn!("Failed to read setting {}: {}", key, e);
            return None;
        }
    };

    let Some(ms) = value.as_u64() else {
        tracing::warn!("Ignoring non-numeric setting {}: {}", key, value);
        return None;
    };

    match check(ms) {
        Ok(()) => Some(ms),
        Err(e) => {
            tracing::warn!("Ignoring stored {}: {}", key, e);
            None
        }
    }
}

/// Shared, hot-reloadable view of the current [`Settings`].
///
/// Readers always see the latest value; a change applies to the next
/// scheduling decision and never to a wait already in progress.
#[derive(Debug, Clone)]
pub struct SettingsHandle {
    sender: Arc<watch::Sender<Settings>>,
}

impl SettingsHandle {
    pub fn new(settings: Settings) -> Self {
        let (sender, _) = watch::channel(settings);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn current(&self) -> Settings {
        *self.sender.borrow()
    }

    /// Validate and publish new settings.
    pub fn update(&self, settings: Settings) -> Result<()> {
        validate_settings(&settings)?;
        self.sender.send_replace(settings);
        tracing::info!(
            "Settings updated: {}ms between downloads, {}ms after every 100",
            settings.inter_item_delay_ms,
            settings.milestone_cooldown_ms
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_load_falls_back_to_defaults() {
        let store = MemoryStore::new();
        let defaults = Settings {
            inter_item_delay_ms: 900,
            milestone_cooldown_ms: 90_000,
        };
        assert_eq!(Settings::load(&store, defaults).await, defaults);

        store.set(COOLDOWN_MS_KEY, json!(1500)).await.unwrap();
        store.set(COOLDOWN_AFTER_100_KEY, json!("soon")).await.unwrap();
        let loaded = Settings::load(&store, defaults).await;
        assert_eq!(loaded.inter_item_delay_ms, 1500);
        assert_eq!(loaded.milestone_cooldown_ms, 90_000);
    }

    #[tokio::test]
    async fn test_load_ignores_out_of_range_values() {
        let store = MemoryStore::new();
        let defaults = Settings::default();

        store.set(COOLDOWN_MS_KEY, json!(0)).await.unwrap();
        store.set(COOLDOWN_AFTER_100_KEY, json!(5)).await.unwrap();
        assert_eq!(Settings::load(&store, defaults).await, defaults);

        store.set(COOLDOWN_MS_KEY, json!(60_001)).await.unwrap();
        store
            .set(COOLDOWN_AFTER_100_KEY, json!(3_600_000))
            .await
            .unwrap();
        let loaded = Settings::load(&store, defaults).await;
        assert_eq!(loaded.inter_item_delay_ms, DEFAULT_COOLDOWN_MS);
        assert_eq!(loaded.milestone_cooldown_ms, 3_600_000);
    }

    #[tokio::test]
    async fn test_persist_round_trip() {
        let store = MemoryStore::new();
        let settings = Settings {
            inter_item_delay_ms: 3000,
            milestone_cooldown_ms: 600_000,
        };
        settings.persist(&store).await.unwrap();
        assert_eq!(store.get(COOLDOWN_MS_KEY).await.unwrap(), Some(json!(3000)));
        assert_eq!(Settings::load(&store, Settings::default()).await, settings);
    }

    #[test]
    fn test_handle_rejects_out_of_range() {
        let handle = SettingsHandle::new(Settings::default());
        let shared = handle.clone();

        let bad = Settings {
            inter_item_delay_ms: 100,
            milestone_cooldown_ms: 60_000,
        };
        assert!(handle.update(bad).is_err());
        assert_eq!(handle.current(), Settings::default());

        let good = Settings {
            inter_item_delay_ms: 500,
            milestone_cooldown_ms: 3_600_000,
        };
        handle.update(good).unwrap();
        assert_eq!(handle.current(), good);
        assert_eq!(shared.current(), good);
    }
}
