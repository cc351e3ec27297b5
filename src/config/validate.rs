//! Configuration validation.

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.discord.token.trim().is_empty() {
        errors.push("discord token is required".to_string());
    }

    if config.health.port == 0 {
        errors.push("liveness port must be non-zero".to_string());
    }

    if !config.store.url.starts_with("sqlite://") {
        errors.push(format!(
            "database url '{}' must use the sqlite:// scheme",
            config.store.url
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("; "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{DiscordConfig, HealthConfig, StoreConfig};

    fn make_test_config() -> Config {
        Config {
            discord: DiscordConfig {
                token: "token-value".to_string(),
            },
            health: HealthConfig { port: 3000 },
            store: StoreConfig {
                url: "sqlite://rules.sqlite".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&make_test_config()).is_ok());
    }

    #[test]
    fn test_blank_token_rejected() {
        let mut config = make_test_config();
        config.discord.token = "   ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_unsupported_scheme_rejected() {
        let mut config = make_test_config();
        config.store.url = "redis://localhost".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("sqlite://"));
    }
}
