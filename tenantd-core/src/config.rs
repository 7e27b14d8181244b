use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::ConnectionString;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub bootstrap: BootstrapConfig,
    pub logging: LoggingConfig,
}

/// Catalog database settings.
///
/// `provider` and `url` together form the externally supplied connection
/// descriptor for the catalog; both must be non-empty before any migration
/// attempt (fatal configuration error otherwise). There are no usable
/// defaults for the url: the catalog location always comes from the host.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub provider: String,
    pub url: ConnectionString,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            provider: "postgres".to_string(),
            url: ConnectionString::default(),
            max_connections: 20,
            min_connections: 5,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Skip tenants whose validity window has closed. Off by default: a
    /// ledger-style bootstrap should not silently skip data it owns.
    pub skip_inactive: bool,
    /// Validity window granted to the root tenant when it is first seeded.
    pub root_validity_days: u32,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            skip_inactive: false,
            root_validity_days: 365,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // Override with environment variables (TENANTD_DATABASE_URL, etc.)
        builder = builder.add_source(
            Environment::with_prefix("TENANTD")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only (for Docker/K8s)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    /// The catalog connection string, which doubles as the root tenant's
    /// connection descriptor when the root record is seeded.
    #[must_use]
    pub const fn catalog_url(&self) -> &ConnectionString {
        &self.database.url
    }

    /// Validate the configuration, collecting every problem at once so a
    /// misconfigured deployment fails with the full picture.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.database.url.is_empty() {
            errors.push("database.url is not configured".to_string());
        }
        if self.database.provider.is_empty() {
            errors.push("database.provider is not configured".to_string());
        }
        if self.database.max_connections == 0 {
            errors.push("database.max_connections must be at least 1".to_string());
        }
        if self.database.min_connections > self.database.max_connections {
            errors.push("database.min_connections exceeds max_connections".to_string());
        }
        if self.bootstrap.root_validity_days == 0 {
            errors.push("bootstrap.root_validity_days must be at least 1".to_string());
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            errors.push(format!(
                "logging.format must be \"json\" or \"pretty\", got \"{}\"",
                self.logging.format
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.database.provider, "postgres");
        assert!(config.database.url.is_empty());
        assert!(!config.bootstrap.skip_inactive);
        assert_eq!(config.bootstrap.root_validity_days, 365);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate_rejects_missing_catalog_descriptor() {
        let mut config = Config::default();
        config.database.provider = String::new();

        let errors = config.validate().expect_err("must fail");
        assert!(errors.iter().any(|e| e.contains("database.url")));
        assert!(errors.iter().any(|e| e.contains("database.provider")));
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        let mut config = Config::default();
        config.database.url = ConnectionString::from("postgres://catalog-db/catalog");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_pool_bounds() {
        let mut config = Config::default();
        config.database.url = ConnectionString::from("postgres://catalog-db/catalog");
        config.database.min_connections = 50;

        let errors = config.validate().expect_err("must fail");
        assert!(errors.iter().any(|e| e.contains("min_connections")));
    }

    #[test]
    fn test_validate_rejects_unknown_log_format() {
        let mut config = Config::default();
        config.database.url = ConnectionString::from("postgres://catalog-db/catalog");
        config.logging.format = "xml".to_string();

        assert!(config.validate().is_err());
    }
}
