//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::DEFAULT_BALANCE_TOLERANCE;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger behaviour.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Ledger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Prefix of the display reference (e.g. `JE-`).
    #[serde(default = "default_reference_prefix")]
    pub reference_prefix: String,
    /// Zero-padded width of the numeric part of the reference.
    #[serde(default = "default_reference_width")]
    pub reference_width: usize,
    /// Maximum trial balance column difference still reported as balanced.
    #[serde(default = "default_balance_tolerance")]
    pub balance_tolerance: Decimal,
}

fn default_reference_prefix() -> String {
    "JE-".to_string()
}

fn default_reference_width() -> usize {
    6
}

fn default_balance_tolerance() -> Decimal {
    DEFAULT_BALANCE_TOLERANCE
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            reference_prefix: default_reference_prefix(),
            reference_width: default_reference_width(),
            balance_tolerance: default_balance_tolerance(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "tally=info,sea_orm=warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones overriding earlier ones:
    /// `config/default`, `config/{RUN_MODE}`, then `TALLY__SECTION__KEY`
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("TALLY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ledger_config_defaults() {
        let ledger = LedgerConfig::default();
        assert_eq!(ledger.reference_prefix, "JE-");
        assert_eq!(ledger.reference_width, 6);
        assert_eq!(ledger.balance_tolerance, dec!(0.01));
    }

    #[test]
    fn test_logging_config_defaults() {
        let logging = LoggingConfig::default();
        assert!(logging.filter.starts_with("tally="));
        assert!(!logging.json);
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("TALLY__DATABASE__URL", Some("postgres://localhost/tally_test")),
                ("TALLY__LEDGER__REFERENCE_WIDTH", Some("8")),
                ("RUN_MODE", Some("test-without-files")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/tally_test");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.ledger.reference_width, 8);
                assert_eq!(config.ledger.reference_prefix, "JE-");
            },
        );
    }

    #[test]
    fn test_load_requires_database_url() {
        temp_env::with_vars(
            [
                ("TALLY__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("test-without-files")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
