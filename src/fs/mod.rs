//! Filesystem module.
//!
//! Provides:
//! - Name sanitisation and filename generation
//! - Destination path layout
//! - Detection of files completed by an earlier run

pub mod naming;
pub mod paths;
pub mod scan;

pub use naming::{media_file_name, sanitize_name, sanitize_owner, DEFAULT_OWNER};
pub use paths::{destination_path, download_root, owner_folder};
pub use scan::scan_completed_indices;
