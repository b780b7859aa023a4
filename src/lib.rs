//! Threads Downloader - rate-limited, resumable media downloads
//!
//! This library turns batches of media URLs scraped from a Threads profile
//! into files on disk, one at a time, without tripping the CDN's abuse
//! detection.
//!
//! # Features
//!
//! - Validation of media URLs against the Threads/Instagram CDNs
//! - Per-profile folders with stable, sortable file names
//! - Inter-item delay plus a long cooldown after every 100 files
//! - Stop, resume and clear, with the queue persisted between runs
//! - Skips files finished by an earlier run
//! - Newline-delimited JSON command interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use threads_downloader::{
//!     config::SettingsHandle,
//!     download::{EventBus, HttpDownloader, Orchestrator, OrchestratorOptions},
//!     store::{JsonFileStore, QueueStore},
//!     Config,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let orchestrator = Orchestrator::new(
//!         QueueStore::new(Arc::new(JsonFileStore::new(config.state_file()))),
//!         Arc::new(HttpDownloader::new(&config.options.user_agent)?),
//!         SettingsHandle::new(config.rate_limit.settings()),
//!         EventBus::new(),
//!         OrchestratorOptions {
//!             download_root: threads_downloader::fs::download_root(&config),
//!             skip_existing: true,
//!         },
//!     );
//!     let (handle, _task) = orchestrator.spawn();
//!
//!     let urls = vec!["https://scontent.cdninstagram.com/v/t51/1.jpg".to_string()];
//!     handle.enqueue(urls, "someone").await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod command;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod media;
pub mod output;
pub mod store;

// Re-exports for convenience
pub use command::{serve, OrchestratorHandle, Request, Response, StatusReport};
pub use config::{Config, Settings, SettingsHandle};
pub use download::{EventBus, HttpDownloader, Notification, Orchestrator, OrchestratorOptions};
pub use error::{Error, Result};
pub use media::QueueItem;
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, QueueStore};
