//! Configuration management for the boba-map service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::BobaError;
use crate::search::{DEFAULT_SHORTCUT_SIZE, SearchKeywords};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "BOBA_CONFIG";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BobaConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub catalogue: CatalogueConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served for non-API paths, if any
    #[serde(default)]
    pub static_dir: Option<String>,
}

/// Where places come from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogueConfig {
    #[serde(default = "default_places_path")]
    pub places_path: String,
    /// Append the built-in Stuttgart hotels
    #[serde(default = "default_true")]
    pub include_hotels: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of hotels returned by the cheap/expensive shortcut
    #[serde(default = "default_shortcut_size")]
    pub shortcut_size: usize,
    #[serde(default)]
    pub keywords: SearchKeywords,
}

/// Search result cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_places_path() -> String {
    "data/places.json".to_string()
}

fn default_true() -> bool {
    true
}

fn default_shortcut_size() -> usize {
    DEFAULT_SHORTCUT_SIZE
}

fn default_cache_location() -> String {
    dirs::cache_dir()
        .map(|dir| dir.join("boba-map").to_string_lossy().into_owned())
        .unwrap_or_else(|| ".cache/boba-map".to_string())
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

const MAX_CACHE_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;
const MAX_SHORTCUT_SIZE: usize = 50;

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            places_path: default_places_path(),
            include_hotels: true,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            shortcut_size: default_shortcut_size(),
            keywords: SearchKeywords::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            location: default_cache_location(),
            ttl_seconds: default_cache_ttl(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl BobaConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
            .or_else(|| Self::get_config_path().filter(|p| p.exists()))
            .unwrap_or_else(|| PathBuf::from("config.toml"));

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // BOBA__SERVER__PORT=8080 and friends
        builder = builder.add_source(
            Environment::with_prefix("BOBA")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| format!("Failed to build configuration from {}", config_file.display()))?;

        let mut config: BobaConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("boba-map").join("config.toml"))
    }

    /// Apply default values to blank configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.catalogue.places_path.is_empty() {
            self.catalogue.places_path = default_places_path();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.cache.ttl_seconds == 0 {
            self.cache.ttl_seconds = default_cache_ttl();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        self.search.keywords.normalize();
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_keywords()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(BobaError::config("Server port cannot be 0").into());
        }

        if self.cache.ttl_seconds > MAX_CACHE_TTL_SECONDS {
            return Err(
                BobaError::config("Cache TTL cannot exceed 604800 seconds (1 week)").into(),
            );
        }

        if !(1..=MAX_SHORTCUT_SIZE).contains(&self.search.shortcut_size) {
            return Err(BobaError::config(format!(
                "Search shortcut size must be between 1 and {MAX_SHORTCUT_SIZE}"
            ))
            .into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(BobaError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(BobaError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }

    fn validate_keywords(&self) -> Result<()> {
        if self
            .search
            .keywords
            .all_keywords()
            .any(|k| k.trim().is_empty())
        {
            return Err(BobaError::config("Search keywords cannot be empty").into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = BobaConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.catalogue.places_path, "data/places.json");
        assert!(config.catalogue.include_hotels);
        assert_eq!(config.search.shortcut_size, 5);
        assert_eq!(config.cache.ttl_seconds, 300);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = BobaConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_invalid_log_format() {
        let mut config = BobaConfig::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = BobaConfig::default();
        config.cache.ttl_seconds = MAX_CACHE_TTL_SECONDS + 1;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Cache TTL"));

        let mut config = BobaConfig::default();
        config.search.shortcut_size = 0;
        assert!(config.validate().is_err());

        let mut config = BobaConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_keyword() {
        let mut config = BobaConfig::default();
        config.search.keywords.cheap.push("  ".to_string());
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("keywords"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8088

[search]
shortcut_size = 3

[search.keywords]
cheap = ["Günstig", "cheap"]

[logging]
format = "json"
"#
        )
        .unwrap();

        let config = BobaConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.search.shortcut_size, 3);
        assert_eq!(config.search.keywords.cheap, vec!["günstig", "cheap"]);
        // untouched lists keep their defaults
        assert!(config.search.keywords.lodging.contains(&"hotel".to_string()));
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[logging]\nlevel = \"loud\"").unwrap();
        assert!(BobaConfig::load_from_path(Some(file.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = BobaConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("boba-map"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
