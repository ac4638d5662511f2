//! Runtime configuration.
//!
//! The configuration is a TOML document with a single `[api]` table:
//!
//! ```toml
//! [api]
//! retry_attempts = 3
//! retry_delay_seconds = 2
//! currency = "USD"
//! market_providers = ["BinanceWrapper", "YFinanceWrapper"]
//! news_providers = []
//! social_providers = ["RedditWrapper"]
//! ```
//!
//! Every key is optional. An empty provider list enables every known wrapper
//! of that domain in its default order.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::retry::RetryPolicy;

/// Root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
}

impl AppConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, CoreError> {
        toml::from_str(input).map_err(|error| CoreError::Config(error.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|error| {
            CoreError::Config(format!("cannot read '{}': {error}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }
}

/// Data access settings shared by the three toolkits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub retry_attempts: u32,
    pub retry_delay_seconds: u64,
    pub currency: String,
    pub market_providers: Vec<String>,
    pub news_providers: Vec<String>,
    pub social_providers: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            retry_delay_seconds: 2,
            currency: String::from("USD"),
            market_providers: Vec::new(),
            news_providers: Vec::new(),
            social_providers: Vec::new(),
        }
    }
}

impl ApiConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_attempts,
            Duration::from_secs(self.retry_delay_seconds),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_uses_defaults() {
        let config = AppConfig::from_toml_str("").expect("empty config is valid");

        assert_eq!(config.api, ApiConfig::default());
        assert_eq!(config.api.currency, "USD");
        assert_eq!(config.api.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn partial_table_keeps_remaining_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [api]
            retry_attempts = 5
            market_providers = ["CryptoCompareWrapper", "BinanceWrapper"]
            "#,
        )
        .expect("valid config");

        assert_eq!(config.api.retry_attempts, 5);
        assert_eq!(config.api.retry_delay_seconds, 2);
        assert_eq!(
            config.api.market_providers,
            vec!["CryptoCompareWrapper", "BinanceWrapper"]
        );
        assert!(config.api.news_providers.is_empty());
    }

    #[test]
    fn malformed_document_is_a_config_error() {
        let error = AppConfig::from_toml_str("[api]\nretry_attempts = \"many\"")
            .expect_err("wrong type must fail");
        assert!(matches!(error, CoreError::Config(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[api]\ncurrency = \"EUR\"\nretry_delay_seconds = 0").expect("write");

        let config = AppConfig::from_path(file.path()).expect("valid file");
        assert_eq!(config.api.currency, "EUR");
        assert_eq!(config.api.retry_policy().delay(), Duration::ZERO);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let error = AppConfig::from_path("/definitely/not/here.toml").expect_err("must fail");
        assert!(error.to_string().contains("cannot read"));
    }
}
