//! Detection of files already completed by an earlier run.

use std::collections::HashSet;
use std::path::Path;

use regex::Regex;

use crate::error::{Error, Result};

/// Scan an owner folder for files of the same batch signature.
///
/// A file counts as completed when it is named
/// `<owner>_<index>_of_<total>.<ext>` with `1 <= index <= total`. In-progress
/// `.part` files never match because the downloader only renames a file into
/// place once it is complete.
pub async fn scan_completed_indices(dir: &Path, owner: &str, total: u32) -> Result<HashSet<u32>> {
    let mut found = HashSet::new();

    if !tokio::fs::try_exists(dir).await? {
        return Ok(found);
    }

    let pattern = Regex::new(&format!(
        r"^{}_(\d+)_of_{}\.[A-Za-z0-9]+$",
        regex::escape(owner),
        total
    ))
    .map_err(|e| Error::InvalidFilename(format!("Bad owner pattern '{}': {}", owner, e)))?;

    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };

        let index = pattern
            .captures(name)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok());

        if let Some(index) = index {
            if index > 0 && index <= total {
                found.insert(index);
            }
        }
    }

    tracing::debug!(
        "Found {} existing files for {} in {}",
        found.len(),
        owner,
        dir.display()
    );

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let found = scan_completed_indices(&tmp.path().join("nobody"), "jo", 3)
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_matches_same_batch_signature_only() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        for name in [
            "jo_01_of_12.jpg",
            "jo_07_of_12.mp4",
            "jo_13_of_12.jpg",
            "jo_00_of_12.jpg",
            "jo_02_of_13.jpg",
            "jo_03_of_12.jpg.part",
            "other_04_of_12.jpg",
            "jo.x_05_of_12.jpg",
        ] {
            std::fs::write(dir.join(name), b"data").unwrap();
        }
        std::fs::create_dir(dir.join("jo_09_of_12.jpg")).unwrap();

        let found = scan_completed_indices(dir, "jo", 12).await.unwrap();
        let mut found: Vec<_> = found.into_iter().collect();
        found.sort_unstable();
        assert_eq!(found, vec![1, 7]);
    }

    #[tokio::test]
    async fn test_owner_is_matched_literally() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a+b_1_of_2.png"), b"x").unwrap();
        std::fs::write(tmp.path().join("aab_2_of_2.png"), b"x").unwrap();

        let found = scan_completed_indices(tmp.path(), "a+b", 2).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found.contains(&1));
    }
}
