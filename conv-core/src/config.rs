use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf, time::Duration};

use crate::model::CurrencyCode;

/// Environment variable overriding the directory that holds `config.toml`.
pub const CONFIG_DIR_ENV: &str = "CONV_CONFIG_DIR";

pub const DEFAULT_RATES_URL: &str =
    "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1/currencies/{code}.json";
pub const DEFAULT_CATALOG_URL: &str =
    "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1/currencies.min.json";
pub const DEFAULT_CATALOG_CACHE: &str = "conf/currencies.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Endpoint and transport settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NetworkConfig {
    pub timeout_secs: Option<u64>,

    /// URL template; `{code}` is replaced by the lower-case source currency.
    pub rates_url: Option<String>,

    pub catalog_url: Option<String>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// default_currency = "EUR"
///
/// [network]
/// timeout_secs = 5
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub default_currency: Option<String>,

    pub catalog_cache: Option<PathBuf>,

    #[serde(default)]
    pub network: NetworkConfig,
}

impl Config {
    /// Configured default target, `None` when unset or blank.
    pub fn default_currency(&self) -> Option<&str> {
        self.default_currency
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    pub fn set_default_currency(&mut self, code: &CurrencyCode) {
        self.default_currency = Some(code.as_str().to_string());
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.network.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn rates_url(&self) -> &str {
        self.network
            .rates_url
            .as_deref()
            .unwrap_or(DEFAULT_RATES_URL)
    }

    pub fn catalog_url(&self) -> &str {
        self.network
            .catalog_url
            .as_deref()
            .unwrap_or(DEFAULT_CATALOG_URL)
    }

    pub fn catalog_cache_path(&self) -> PathBuf {
        self.catalog_cache
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_CACHE))
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self)
            .context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file, honouring `CONV_CONFIG_DIR`.
    pub fn config_file_path() -> Result<PathBuf> {
        if let Some(dir) = env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir).join("config.toml"));
        }

        let dirs = ProjectDirs::from("dev", "conv", "conv")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
