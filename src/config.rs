use std::collections::HashMap;

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://fintrack.db?mode=rwc";
pub const DEFAULT_LOG_FILTER: &str = "fintrack=info,store=info";

/// Runtime configuration of the `fintrack` binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub log_filter: String,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// `database_url`, when given, wins over `DATABASE_URL`.
    pub fn load(database_url: Option<String>) -> Result<Self> {
        Self::build(None, database_url)
    }

    /// `env` replaces the process environment when set.
    fn build(env: Option<HashMap<String, String>>, database_url: Option<String>) -> Result<Self> {
        Config::builder()
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("log_filter", DEFAULT_LOG_FILTER)?
            .add_source(Environment::default().source(env))
            .set_override_option("database_url", database_url)?
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        )
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = AppConfig::build(env(&[]), None).unwrap();

        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = AppConfig::build(
            env(&[
                ("DATABASE_URL", "sqlite::memory:"),
                ("LOG_FILTER", "fintrack=debug"),
            ]),
            None,
        )
        .unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.log_filter, "fintrack=debug");
    }

    #[test]
    fn flag_overrides_environment() {
        let config = AppConfig::build(
            env(&[("DATABASE_URL", "sqlite://from-env.db")]),
            Some("sqlite://from-flag.db".to_string()),
        )
        .unwrap();

        assert_eq!(config.database_url, "sqlite://from-flag.db");
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }
}
