//! Configuration structures and loading logic.

use crate::config::settings::{Settings, DEFAULT_COOLDOWN_AFTER_100_MS, DEFAULT_COOLDOWN_MS};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Folder created under the download directory for all batches.
pub const DEFAULT_NAMESPACE: &str = "threads-downloads";

/// Name of the state file inside the platform data directory.
const STATE_FILE_NAME: &str = "state.json";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// Download options configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Base directory for downloads.
    #[serde(default)]
    pub download_directory: Option<PathBuf>,

    /// Folder under the download directory that holds per-owner folders.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Durable store holding queue state and rate-limit settings.
    #[serde(default)]
    pub state_file: Option<PathBuf>,

    /// Browser user agent string sent with media requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whether to count files finished by an earlier run as already done.
    #[serde(default = "default_true")]
    pub skip_existing: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            download_directory: None,
            namespace: default_namespace(),
            state_file: None,
            user_agent: default_user_agent(),
            skip_existing: true,
        }
    }
}

/// Rate limit defaults, used until settings are stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Milliseconds between two downloads.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    /// Milliseconds to pause after every 100 downloads.
    #[serde(default = "default_cooldown_after_100")]
    pub cooldown_after_100: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            cooldown_after_100: DEFAULT_COOLDOWN_AFTER_100_MS,
        }
    }
}

impl RateLimitConfig {
    pub fn settings(&self) -> Settings {
        Settings {
            inter_item_delay_ms: self.cooldown_ms,
            milestone_cooldown_ms: self.cooldown_after_100,
        }
    }
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0".to_string()
}

fn default_true() -> bool {
    true
}

fn default_cooldown_ms() -> u64 {
    DEFAULT_COOLDOWN_MS
}

fn default_cooldown_after_100() -> u64 {
    DEFAULT_COOLDOWN_AFTER_100_MS
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the effective download directory.
    pub fn download_directory(&self) -> PathBuf {
        self.options
            .download_directory
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Get the effective state file, defaulting to the platform data directory.
    pub fn state_file(&self) -> PathBuf {
        if let Some(path) = &self.options.state_file {
            return path.clone();
        }

        directories::ProjectDirs::from("", "", "threads-downloader")
            .map(|dirs| dirs.data_dir().join(STATE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(STATE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.options.namespace, DEFAULT_NAMESPACE);
        assert!(config.options.skip_existing);
        assert_eq!(config.rate_limit.cooldown_ms, 2000);
        assert_eq!(config.rate_limit.cooldown_after_100, 120_000);
    }

    #[test]
    fn test_load_and_save() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[options]
download_directory = "/data/media"
state_file = "/data/state.json"
skip_existing = false

[rate_limit]
cooldown_ms = 750
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.download_directory(), PathBuf::from("/data/media"));
        assert_eq!(config.state_file(), PathBuf::from("/data/state.json"));
        assert!(!config.options.skip_existing);
        assert_eq!(config.rate_limit.settings().inter_item_delay_ms, 750);
        assert_eq!(config.rate_limit.settings().milestone_cooldown_ms, 120_000);

        let copy = tmp.path().join("copy.toml");
        config.save(&copy).unwrap();
        let reloaded = Config::load(&copy).unwrap();
        assert_eq!(reloaded.rate_limit.cooldown_ms, 750);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
