//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use khata_core::BalanceMode;
use serde::{Deserialize, Serialize};
use std::env;

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP server port
    pub http_port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// How slip-level cash is charged against sale lines
    pub sale_balance_mode: BalanceMode,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./khata.db".to_string()),

            sale_balance_mode: env::var("SALE_BALANCE_MODE")
                .unwrap_or_else(|_| "whole_slip".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SALE_BALANCE_MODE".to_string()))?,
        };

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Only assert defaults when the variables are unset in the test env.
        if env::var("HTTP_PORT").is_err() && env::var("SALE_BALANCE_MODE").is_err() {
            let config = ApiConfig::load().unwrap();
            assert_eq!(config.http_port, 8080);
            assert_eq!(config.sale_balance_mode, BalanceMode::WholeSlip);
        }
    }
}
