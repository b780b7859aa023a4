//! Configuration validation logic.

use std::ops::RangeInclusive;

use crate::config::loader::Config;
use crate::config::settings::Settings;
use crate::error::{Error, Result};
use crate::fs::sanitize_name;

/// Accepted delay between two downloads, in milliseconds.
pub const COOLDOWN_MS_RANGE: RangeInclusive<u64> = 500..=60_000;

/// Accepted pause after every 100 downloads, in milliseconds.
pub const COOLDOWN_AFTER_100_RANGE: RangeInclusive<u64> = 60_000..=3_600_000;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    if sanitize_name(config.options.namespace.trim()).is_empty() {
        return Err(Error::ConfigValidation {
            field: "namespace".to_string(),
            message: "Namespace folder name cannot be empty".to_string(),
        });
    }

    if config.options.user_agent.trim().is_empty() {
        return Err(Error::ConfigValidation {
            field: "user_agent".to_string(),
            message: "User agent cannot be empty".to_string(),
        });
    }

    validate_settings(&config.rate_limit.settings())
}

/// Validate rate-limit settings.
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_cooldown_ms(settings.inter_item_delay_ms)?;
    validate_cooldown_after_100(settings.milestone_cooldown_ms)
}

/// Validate the delay between two downloads.
pub fn validate_cooldown_ms(ms: u64) -> Result<()> {
    validate_range("cooldownMs", ms, &COOLDOWN_MS_RANGE, "between downloads")
}

/// Validate the pause after every 100 downloads.
pub fn validate_cooldown_after_100(ms: u64) -> Result<()> {
    validate_range(
        "cooldownAfter100",
        ms,
        &COOLDOWN_AFTER_100_RANGE,
        "after every 100 downloads",
    )
}

fn validate_range(
    field: &str,
    value: u64,
    range: &RangeInclusive<u64>,
    what: &str,
) -> Result<()> {
    if range.contains(&value) {
        return Ok(());
    }

    Err(Error::ConfigValidation {
        field: field.to_string(),
        message: format!(
            "Cooldown {} must be between {}ms and {}ms (got {}ms)",
            what,
            range.start(),
            range.end(),
            value
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(delay: u64, cooldown: u64) -> Settings {
        Settings {
            inter_item_delay_ms: delay,
            milestone_cooldown_ms: cooldown,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_config_rejections() {
        let mut config = Config::default();
        config.options.namespace = ".".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(Error::ConfigValidation { ref field, .. }) if field == "namespace"
        ));

        let mut config = Config::default();
        config.options.user_agent = "  ".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.rate_limit.cooldown_ms = 100;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_valid_settings() {
        assert!(validate_settings(&Settings::default()).is_ok());
        assert!(validate_settings(&settings(500, 60_000)).is_ok());
        assert!(validate_settings(&settings(60_000, 3_600_000)).is_ok());
    }

    #[test]
    fn test_delay_out_of_range() {
        let err = validate_settings(&settings(499, 120_000)).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { ref field, .. } if field == "cooldownMs"));
        assert!(validate_settings(&settings(60_001, 120_000)).is_err());
    }

    #[test]
    fn test_milestone_out_of_range() {
        let err = validate_settings(&settings(2_000, 59_999)).unwrap_err();
        assert!(
            matches!(err, Error::ConfigValidation { ref field, .. } if field == "cooldownAfter100")
        );
        assert!(validate_settings(&settings(2_000, 3_600_001)).is_err());
    }

    #[test]
    fn test_single_field_checks() {
        assert!(validate_cooldown_ms(500).is_ok());
        assert!(validate_cooldown_ms(0).is_err());
        assert!(validate_cooldown_after_100(60_000).is_ok());
        assert!(validate_cooldown_after_100(2_000).is_err());
    }
}
