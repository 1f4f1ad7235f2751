//! Configuration management for txview
//!
//! This module handles loading, validation, and management of
//! txview configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Transaction source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to the JSON transaction document
    #[serde(default = "default_source_path")]
    pub path: PathBuf,
    /// User whose transactions are listed
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: default_source_path(),
            user_id: default_user_id(),
        }
    }
}

fn default_source_path() -> PathBuf {
    PathBuf::from("./data/transactions.json")
}

fn default_user_id() -> String {
    "Fake-ID".to_string()
}

/// Display settings for the transaction list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Locale used for month labels, dates and amounts
    #[serde(default)]
    pub locale: DisplayLocale,
    /// Sort direction applied when the list is first shown
    #[serde(default)]
    pub default_sort: SortOrder,
}

/// Sort direction of the time-based comparator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Latest first
    Newest,
    /// Earliest first
    Oldest,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Newest
    }
}

impl SortOrder {
    /// The opposite direction
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Newest => SortOrder::Oldest,
            SortOrder::Oldest => SortOrder::Newest,
        }
    }

    /// Arrow shown next to the time column header
    pub fn indicator(self) -> &'static str {
        match self {
            SortOrder::Newest => "↓",
            SortOrder::Oldest => "↑",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" | "desc" => Ok(SortOrder::Newest),
            "oldest" | "asc" => Ok(SortOrder::Oldest),
            _ => Err(format!("Invalid sort order: {}", s)),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Newest => write!(f, "newest"),
            SortOrder::Oldest => write!(f, "oldest"),
        }
    }
}

/// Locales supported for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayLocale {
    /// Danish (da-DK)
    #[serde(rename = "da-DK")]
    Danish,
    /// American English (en-US)
    #[serde(rename = "en-US")]
    English,
}

impl Default for DisplayLocale {
    fn default() -> Self {
        DisplayLocale::Danish
    }
}

impl DisplayLocale {
    /// BCP 47 tag, also used as the `lang` attribute of rendered pages
    pub fn tag(self) -> &'static str {
        match self {
            DisplayLocale::Danish => "da-DK",
            DisplayLocale::English => "en-US",
        }
    }
}

impl std::str::FromStr for DisplayLocale {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "da-dk" | "da" => Ok(DisplayLocale::Danish),
            "en-us" | "en" => Ok(DisplayLocale::English),
            _ => Err(format!("Invalid locale: {}", s)),
        }
    }
}

impl std::fmt::Display for DisplayLocale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Currency assumed when a record carries no currency code
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// Number of decimal places
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            decimal_places: default_decimal_places(),
        }
    }
}

fn default_currency() -> String {
    "DKK".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Transaction source settings
    #[serde(default)]
    pub source: SourceConfig,
    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_yaml(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from YAML text without validating it
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // serde_yaml reads an empty document as unit, not as an empty mapping
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.source.user_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "source.user_id".to_string(),
                reason: "User id must not be empty".to_string(),
            });
        }

        if self.currency.decimal_places > 10 {
            return Err(ConfigError::InvalidValue {
                field: "currency.decimal_places".to_string(),
                reason: "Decimal places must be between 0 and 10".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Log level must be one of: {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.source.user_id, "Fake-ID");
        assert_eq!(config.display.locale, DisplayLocale::Danish);
        assert_eq!(config.display.default_sort, SortOrder::Newest);
        assert_eq!(config.currency.default_currency, "DKK");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "display:\n  locale: en-US\n  default_sort: oldest\nsource:\n  user_id: alice\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.display.locale, DisplayLocale::English);
        assert_eq!(config.display.default_sort, SortOrder::Oldest);
        assert_eq!(config.source.user_id, "alice");
        assert_eq!(config.source.path, PathBuf::from("./data/transactions.json"));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYaml(_)));

        let err = Config::from_yaml("server:\n  port: eighty\n").unwrap_err();
        match err {
            ConfigError::InvalidYaml(source) => {
                assert!(source.location().is_some());
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_default_template_parses() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "server.port"
        ));

        let mut config = Config::default();
        config.source.user_id = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.currency.decimal_places = 11;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 9000").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
        assert_eq!(err.suggestions().len(), 2);
    }

    #[test]
    fn test_sort_order() {
        assert_eq!(SortOrder::Newest.toggled(), SortOrder::Oldest);
        assert_eq!(SortOrder::Newest.toggled().toggled(), SortOrder::Newest);
        assert_eq!(SortOrder::Newest.indicator(), "↓");
        assert_eq!(SortOrder::Oldest.indicator(), "↑");
        assert_eq!("oldest".parse::<SortOrder>().unwrap(), SortOrder::Oldest);
        assert_eq!(SortOrder::Newest.to_string(), "newest");
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_display_locale() {
        assert_eq!("da_DK".parse::<DisplayLocale>().unwrap(), DisplayLocale::Danish);
        assert_eq!("en-us".parse::<DisplayLocale>().unwrap(), DisplayLocale::English);
        assert_eq!(DisplayLocale::English.to_string(), "en-US");
        assert!("fr-FR".parse::<DisplayLocale>().is_err());
    }
}
