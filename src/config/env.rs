//! Environment-derived configuration.
//!
//! All settings are read once at startup:
//! - `CORRECTOR_TOKEN` - Discord bot token (required)
//! - `CORRECTOR_PORT` - liveness endpoint port (default 3000)
//! - `CORRECTOR_DATABASE_URL` - store connection URL
//!   (default `sqlite://corrector.sqlite`)

use std::env;

use crate::common::error::ConfigError;
use crate::config::types::{Config, DiscordConfig, HealthConfig, StoreConfig};

/// Environment variable prefix for all settings.
const ENV_PREFIX: &str = "CORRECTOR";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://corrector.sqlite";

/// Read one prefixed variable, treating an empty value as unset.
fn var(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}"))
        .ok()
        .filter(|value| !value.is_empty())
}

/// Build the configuration from the process environment.
pub fn load_from_env() -> Result<Config, ConfigError> {
    let token = var("TOKEN").ok_or_else(|| ConfigError::MissingVar {
        name: format!("{ENV_PREFIX}_TOKEN"),
    })?;

    let port = match var("PORT") {
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            name: format!("{ENV_PREFIX}_PORT"),
            message: format!("'{raw}' is not a valid port"),
        })?,
        None => DEFAULT_PORT,
    };

    let url = var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

    Ok(Config {
        discord: DiscordConfig { token },
        health: HealthConfig { port },
        store: StoreConfig { url },
    })
}
