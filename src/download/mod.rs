//! Download module: the orchestration core.
//!
//! This module provides:
//! - Queue state tracking
//! - Rate limiting with milestone cooldowns
//! - The file fetch primitive
//! - Progress notifications
//! - The scheduling loop

pub mod events;
pub mod fetch;
pub mod limiter;
pub mod orchestrator;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use events::{EventBus, Notification};
pub use fetch::{Downloader, HttpDownloader};
pub use limiter::{milestone_for, Gate, RateLimiter, MILESTONE_INTERVAL};
pub use orchestrator::{Orchestrator, OrchestratorOptions, Phase};
pub use state::QueueState;
