//! Path and directory management.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::fs::naming::sanitize_owner;
use crate::media::QueueItem;

/// Get the namespaced root all batches are written under.
pub fn download_root(config: &Config) -> PathBuf {
    config
        .download_directory()
        .join(sanitize_owner(&config.options.namespace))
}

/// Get the folder holding one owner's files.
pub fn owner_folder(root: &Path, owner_name: &str) -> PathBuf {
    root.join(sanitize_owner(owner_name))
}

/// Get the destination path for a queue item: `<root>/<owner>/<filename>`.
pub fn destination_path(root: &Path, item: &QueueItem) -> PathBuf {
    root.join(item.owner_folder()).join(item.file_name())
}
