//! Media module for queue items and URL policy.

pub mod item;
pub mod validate;

pub use item::{MediaExtension, QueueItem};
pub use validate::is_acceptable_media_url;
