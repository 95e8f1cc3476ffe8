//! TOML configuration for the annotator and its rate cache.

use crate::currency::SymbolTable;
use crate::error::{HoursError, Result};
use crate::types::DEFAULT_BASE_CURRENCY;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `api.api_key`
pub const API_KEY_ENV: &str = "EXCHANGE_RATE_API_KEY";

const DEFAULT_API_URL: &str = "https://v6.exchangerate-api.com";
const DEFAULT_API_KEY: &str = "----";
const DEFAULT_STALENESS_HOURS: i64 = 48;
const APP_DIR_NAME: &str = "hours-of-work";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_currency: String,
    /// Maximum age of the cached rate table before a refresh is forced
    pub staleness_hours: i64,
    pub api: ApiConfig,
    pub storage: StorageConfig,
    /// Extra symbol → code entries layered over the built-in table
    pub symbols: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_currency: DEFAULT_BASE_CURRENCY.to_string(),
            staleness_hours: DEFAULT_STALENESS_HOURS,
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
            symbols: BTreeMap::new(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            timeout_secs: None,
        }
    }
}

impl Config {
    /// Load from a TOML file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default().with_env_overrides());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map(Self::with_env_overrides)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.base_currency = config.base_currency.trim().to_ascii_uppercase();
        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.api.api_key = key.trim().to_string();
            }
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if self.base_currency.is_empty() {
            return Err(HoursError::Config("base_currency must not be empty".into()));
        }
        if self.staleness_hours <= 0 {
            return Err(HoursError::Config(format!(
                "staleness_hours must be positive, got {}",
                self.staleness_hours
            )));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(HoursError::Config("api.base_url must not be empty".into()));
        }
        Ok(())
    }

    pub fn staleness_window(&self) -> chrono::Duration {
        chrono::Duration::hours(self.staleness_hours)
    }

    /// `GET {base_url}/v6/{key}/latest/{base}`
    pub fn rates_url(&self) -> String {
        format!(
            "{}/v6/{}/latest/{}",
            self.api.base_url.trim_end_matches('/'),
            self.api.api_key,
            self.base_currency
        )
    }

    pub fn symbol_table(&self) -> SymbolTable {
        SymbolTable::with_overrides(&self.symbols)
    }

    /// Directory holding the persisted storage areas
    pub fn storage_dir(&self) -> PathBuf {
        match &self.storage.dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR_NAME)),
        }
    }

    /// Default config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.base_currency, "INR");
        assert_eq!(config.staleness_window(), chrono::Duration::days(2));
        assert_eq!(
            config.rates_url(),
            "https://v6.exchangerate-api.com/v6/----/latest/INR"
        );
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml_str(
            r#"
            base_currency = "usd"
            staleness_hours = 12

            [api]
            base_url = "http://localhost:8080/"
            api_key = "abc123"
            timeout_secs = 5

            [storage]
            dir = "/tmp/hours"

            [symbols]
            "zł" = "PLN"
            "#,
        )
        .unwrap();

        assert_eq!(config.base_currency, "USD");
        assert_eq!(config.api.timeout_secs, Some(5));
        assert_eq!(config.rates_url(), "http://localhost:8080/v6/abc123/latest/USD");
        assert_eq!(config.storage_dir(), PathBuf::from("/tmp/hours"));
        assert_eq!(config.symbol_table().code_for("zł"), Some("PLN"));
    }

    #[test]
    fn test_rejects_non_positive_staleness() {
        let result = Config::from_toml_str("staleness_hours = 0");
        assert!(matches!(result, Err(HoursError::Config(_))));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let result = Config::from_toml_str("base_currency = ");
        assert!(matches!(result, Err(HoursError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "base_currency = \"EUR\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.base_currency, "EUR");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load(Path::new("/definitely/not/here.toml")).unwrap();
        assert_eq!(config.base_currency, "INR");
        assert_eq!(config.staleness_hours, 48);
    }
}
