//! Test doubles for the download pipeline.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{Settings, SettingsHandle};
use crate::download::events::EventBus;
use crate::download::fetch::Downloader;
use crate::download::orchestrator::{Orchestrator, OrchestratorOptions};
use crate::error::{Error, Result};
use crate::store::{MemoryStore, QueueStore};

/// Records every fetch and fails the URLs it was told to.
#[derive(Debug, Default)]
pub struct ScriptedDownloader {
    attempts: Mutex<Vec<PathBuf>>,
    failing: HashSet<String>,
    latency: Duration,
}

impl ScriptedDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing<'a>(urls: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            failing: urls.into_iter().map(str::to_string).collect(),
            ..Self::default()
        }
    }

    /// Every fetch takes `latency` before it reports back.
    pub fn slow(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Destinations of all fetches, in dispatch order.
    pub fn attempts(&self) -> Vec<PathBuf> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Downloader for ScriptedDownloader {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<()> {
        self.attempts.lock().unwrap().push(destination.to_path_buf());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.failing.contains(url) {
            return Err(Error::Download(format!("scripted failure for {}", url)));
        }
        Ok(())
    }
}

/// Orchestrator over an in-memory store, writing under `root`.
pub fn test_orchestrator(
    store: Arc<MemoryStore>,
    downloader: Arc<ScriptedDownloader>,
    settings: Settings,
    root: PathBuf,
) -> Orchestrator {
    Orchestrator::new(
        QueueStore::new(store),
        downloader,
        SettingsHandle::new(settings),
        EventBus::new(),
        OrchestratorOptions {
            download_root: root,
            skip_existing: true,
        },
    )
}
