//! Configuration type definitions.

/// Root configuration structure.
#[derive(Debug, Clone)]
pub struct Config {
    pub discord: DiscordConfig,
    pub health: HealthConfig,
    pub store: StoreConfig,
}

/// Discord bot configuration.
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub token: String,
}

/// Liveness endpoint configuration.
#[derive(Debug, Clone)]
pub struct HealthConfig {
    pub port: u16,
}

/// Persistence store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Connection URL, e.g. `sqlite://corrector.sqlite`.
    pub url: String,
}
