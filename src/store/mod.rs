//! Durable key-value storage.
//!
//! This module provides:
//! - The [`KeyValueStore`] abstraction the core persists through
//! - A JSON file backend and an in-memory backend
//! - The queue record store built on top of them

pub mod file;
pub mod memory;
pub mod queue;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use queue::{QueueStore, DOWNLOAD_STATE_KEY};

/// Async key-value store with per-key get/set/delete.
///
/// No atomicity is offered across keys; writes are last-write-wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Delete a key. Deleting an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
