//! Request and response messages of the command interface.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::{Error, Result};

/// A command sent to the orchestrator.
///
/// Tagged by `action`. The action names used by the browser extension
/// (`downloadMedia`, `stopDownload`, ...) are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// Start a new batch from scraped URLs.
    #[serde(alias = "downloadMedia", alias = "downloadMediaFromList")]
    Enqueue {
        #[serde(default)]
        urls: Vec<String>,
        #[serde(default, rename = "ownerName", alias = "username")]
        owner_name: Option<String>,
    },

    /// Halt after the current item, keeping saved state.
    #[serde(alias = "stopDownload")]
    Stop,

    /// Reload saved state and continue.
    #[serde(alias = "resumeDownload")]
    Resume,

    /// Discard the queue and saved state.
    #[serde(alias = "clearQueue")]
    Clear,

    /// Report the current state.
    #[serde(alias = "getStatus")]
    Status,

    /// Replace the rate-limit settings.
    UpdateSettings {
        #[serde(rename = "cooldownMs")]
        cooldown_ms: u64,
        #[serde(rename = "cooldownAfter100")]
        cooldown_after_100: u64,
    },
}

impl Request {
    pub fn enqueue(urls: Vec<String>, owner_name: impl Into<String>) -> Self {
        Request::Enqueue {
            urls,
            owner_name: Some(owner_name.into()),
        }
    }

    pub fn update_settings(settings: Settings) -> Self {
        Request::UpdateSettings {
            cooldown_ms: settings.inter_item_delay_ms,
            cooldown_after_100: settings.milestone_cooldown_ms,
        }
    }
}

/// Snapshot answered to a status request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub is_downloading: bool,
    pub queue_length: usize,
    pub download_count: u32,
    pub total_files: u32,
    /// End of the current or last cooldown in Unix milliseconds, 0 if none.
    pub cooldown_until: i64,
    pub has_saved_state: bool,
}

/// The single reply to a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Enqueued {
        success: bool,
        queued: u32,
        skipped: u32,
    },
    Resumed {
        success: bool,
        resumed: bool,
    },
    Status(StatusReport),
    Failure {
        success: bool,
        error: String,
    },
    Ack {
        success: bool,
    },
}

impl Response {
    pub fn ack() -> Self {
        Response::Ack { success: true }
    }

    pub fn enqueued(queued: u32, skipped: u32) -> Self {
        Response::Enqueued {
            success: true,
            queued,
            skipped,
        }
    }

    pub fn resumed() -> Self {
        Response::Resumed {
            success: true,
            resumed: true,
        }
    }

    pub fn failure(error: impl fmt::Display) -> Self {
        Response::Failure {
            success: false,
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Response::Enqueued { success, .. }
            | Response::Resumed { success, .. }
            | Response::Failure { success, .. }
            | Response::Ack { success } => *success,
            Response::Status(_) => true,
        }
    }

    /// Error text of a failed request.
    pub fn error(&self) -> Option<&str> {
        match self {
            Response::Failure { error, .. } => Some(error.as_str()),
            _ => None,
        }
    }

    /// Turn a failure response into [`Error::Rejected`].
    pub fn into_result(self) -> Result<Response> {
        match self {
            Response::Failure { error, .. } => Err(Error::Rejected(error)),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_requests() {
        let request: Request = serde_json::from_value(json!({
            "action": "enqueue",
            "urls": ["https://cdn.example/a.jpg"],
            "ownerName": "jo"
        }))
        .unwrap();
        assert_eq!(
            request,
            Request::enqueue(vec!["https://cdn.example/a.jpg".to_string()], "jo")
        );

        let request: Request = serde_json::from_value(json!({"action": "status"})).unwrap();
        assert_eq!(request, Request::Status);

        let request: Request = serde_json::from_value(json!({
            "action": "updateSettings",
            "cooldownMs": 1000,
            "cooldownAfter100": 60000
        }))
        .unwrap();
        assert_eq!(
            request,
            Request::UpdateSettings {
                cooldown_ms: 1000,
                cooldown_after_100: 60_000
            }
        );
    }

    #[test]
    fn test_extension_action_names() {
        let request: Request = serde_json::from_value(json!({
            "action": "downloadMedia",
            "urls": [],
            "username": "jo"
        }))
        .unwrap();
        assert_eq!(request, Request::enqueue(Vec::new(), "jo"));

        for (action, expected) in [
            ("stopDownload", Request::Stop),
            ("resumeDownload", Request::Resume),
            ("clearQueue", Request::Clear),
            ("getStatus", Request::Status),
        ] {
            let request: Request = serde_json::from_value(json!({ "action": action })).unwrap();
            assert_eq!(request, expected);
        }
    }

    #[test]
    fn test_failure_into_error() {
        let err = Response::failure("No saved state found")
            .into_result()
            .unwrap_err();
        assert_eq!(err.to_string(), "Request rejected: No saved state found");
        assert!(Response::ack().into_result().is_ok());
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        assert!(serde_json::from_value::<Request>(json!({"action": "explode"})).is_err());
    }

    #[test]
    fn test_response_wire_format() {
        assert_eq!(
            serde_json::to_value(Response::enqueued(2, 1)).unwrap(),
            json!({"success": true, "queued": 2, "skipped": 1})
        );
        assert_eq!(
            serde_json::to_value(Response::failure("No valid media URLs found")).unwrap(),
            json!({"success": false, "error": "No valid media URLs found"})
        );
        assert_eq!(
            serde_json::to_value(Response::resumed()).unwrap(),
            json!({"success": true, "resumed": true})
        );
        assert_eq!(
            serde_json::to_value(Response::ack()).unwrap(),
            json!({"success": true})
        );

        let status = Response::Status(StatusReport {
            is_downloading: false,
            queue_length: 0,
            download_count: 0,
            total_files: 0,
            cooldown_until: 0,
            has_saved_state: false,
        });
        assert_eq!(
            serde_json::to_value(status).unwrap(),
            json!({
                "isDownloading": false,
                "queueLength": 0,
                "downloadCount": 0,
                "totalFiles": 0,
                "cooldownUntil": 0,
                "hasSavedState": false
            })
        );
    }
}
