//! Queue item representation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fs::naming::{media_file_name, sanitize_owner};

/// File extension chosen for a downloaded item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaExtension {
    Mp4,
    Webp,
    Png,
    Gif,
    Jpeg,
    Jpg,
}

impl MediaExtension {
    /// Derive the extension from a URL path.
    ///
    /// The first matching rule wins; anything unrecognised is saved as `jpg`.
    pub fn from_url(url: &str) -> Self {
        let path = match url::Url::parse(url) {
            Ok(parsed) => parsed.path().to_ascii_lowercase(),
            Err(_) => url.split('?').next().unwrap_or(url).to_ascii_lowercase(),
        };

        if path.contains(".mp4") || path.contains("video") {
            MediaExtension::Mp4
        } else if path.contains(".webp") {
            MediaExtension::Webp
        } else if path.contains(".png") {
            MediaExtension::Png
        } else if path.contains(".gif") {
            MediaExtension::Gif
        } else if path.contains(".jpeg") {
            MediaExtension::Jpeg
        } else {
            MediaExtension::Jpg
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaExtension::Mp4 => "mp4",
            MediaExtension::Webp => "webp",
            MediaExtension::Png => "png",
            MediaExtension::Gif => "gif",
            MediaExtension::Jpeg => "jpeg",
            MediaExtension::Jpg => "jpg",
        }
    }
}

impl fmt::Display for MediaExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One URL of a batch, waiting to be downloaded.
///
/// Serialised with the field names of the persisted `downloadState` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Media URL.
    pub url: String,

    /// Profile the batch belongs to.
    #[serde(rename = "username")]
    pub owner_name: String,

    /// Position in the batch, starting at 1.
    pub index: u32,

    /// Number of files in the batch.
    pub total: u32,
}

impl QueueItem {
    pub fn new(url: impl Into<String>, owner_name: impl Into<String>, index: u32, total: u32) -> Self {
        Self {
            url: url.into(),
            owner_name: owner_name.into(),
            index,
            total,
        }
    }

    pub fn extension(&self) -> MediaExtension {
        MediaExtension::from_url(&self.url)
    }

    /// Owner name as used on disk. Sanitised again at use-site since items
    /// may come back from persisted state.
    pub fn owner_folder(&self) -> String {
        sanitize_owner(&self.owner_name)
    }

    /// Generate the filename for this item, e.g. `owner_007_of_120.jpg`.
    pub fn file_name(&self) -> String {
        media_file_name(&self.owner_folder(), self.index, self.total, self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_rules() {
        assert_eq!(
            MediaExtension::from_url("https://cdn.example/a.mp4?x=.png"),
            MediaExtension::Mp4
        );
        assert_eq!(
            MediaExtension::from_url("https://cdn.example/video/abc"),
            MediaExtension::Mp4
        );
        assert_eq!(
            MediaExtension::from_url("https://cdn.example/a.WEBP"),
            MediaExtension::Webp
        );
        assert_eq!(
            MediaExtension::from_url("https://cdn.example/a.png"),
            MediaExtension::Png
        );
        assert_eq!(
            MediaExtension::from_url("https://cdn.example/a.gif"),
            MediaExtension::Gif
        );
        assert_eq!(
            MediaExtension::from_url("https://cdn.example/a.jpeg"),
            MediaExtension::Jpeg
        );
        assert_eq!(
            MediaExtension::from_url("https://cdn.example/media/xyz"),
            MediaExtension::Jpg
        );
    }

    #[test]
    fn test_file_name_scenario() {
        let first = QueueItem::new("https://cdn.example/scontent/a.jpg", "Jo/e", 1, 2);
        let second = QueueItem::new("https://cdn.example/scontent/b.mp4", "Jo/e", 2, 2);

        assert_eq!(first.owner_folder(), "Jo_e");
        assert_eq!(first.file_name(), "Jo_e_1_of_2.jpg");
        assert_eq!(second.file_name(), "Jo_e_2_of_2.mp4");
    }

    #[test]
    fn test_serialized_field_names() {
        let item = QueueItem::new("https://cdn.example/a.jpg", "jo", 3, 10);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["username"], "jo");
        assert_eq!(value["index"], 3);
        assert_eq!(value["total"], 10);
    }
}
