//! Error types for the threads-downloader application.

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // Validation errors
    #[error("Invalid media URL: {0}")]
    InvalidUrl(String),

    #[error("No valid media URLs found")]
    NoValidUrls,

    #[error("No saved state found")]
    NoSavedState,

    // Download errors
    #[error("Download failed: {0}")]
    Download(String),

    #[error("Server returned HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    // Persistence errors
    #[error("Storage error: {0}")]
    Store(String),

    // File system errors
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    // Command channel errors
    #[error("Download orchestrator is no longer running")]
    OrchestratorGone,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const ABORT: i32 = 1;
    pub const CONFIG_ERROR: i32 = 3;
    pub const DOWNLOAD_ERROR: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
}
