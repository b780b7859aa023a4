//! Download state tracking.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::media::QueueItem;

/// The durable unit of a batch: what is left to download plus progress.
///
/// Serialised as the `downloadState` record:
/// `{queue, totalFiles, downloadCount, username}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueState {
    /// Items still waiting, in dispatch order.
    #[serde(rename = "queue", default)]
    pub items: VecDeque<QueueItem>,

    /// Number of files in the batch.
    #[serde(rename = "totalFiles", default)]
    pub total_files: u32,

    /// Items downloaded or skipped so far.
    #[serde(rename = "downloadCount", default)]
    pub completed_count: u32,

    /// Profile the batch belongs to.
    #[serde(rename = "username", default)]
    pub owner_name: String,
}

impl QueueState {
    /// Create the state of a fresh batch.
    pub fn new(owner_name: String, total_files: u32) -> Self {
        Self {
            owner_name,
            total_files,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.items.len()
    }

    /// Whether the counter has reached the batch size.
    pub fn reached_target(&self) -> bool {
        self.completed_count >= self.total_files
    }

    /// Count one more item as done, never exceeding the batch size.
    pub fn mark_completed(&mut self) {
        if self.completed_count < self.total_files {
            self.completed_count += 1;
        }
    }
}
