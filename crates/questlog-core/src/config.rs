use crate::{
    constants::DEFAULT_CATALOG_SOURCE,
    eligibility::GateRule,
    query::{FilterMode, SortOrder, TrackPolicy},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
///
/// Loaded from `config.toml` in the platform config dir. CLI flags win
/// over the file, the file wins over defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub storage: StorageConfig,
    pub filters: FilterConfig,
    pub eligibility: EligibilityConfig,
    pub report: ReportConfig,
}

impl Config {
    /// Load config from default location, or defaults if there isn't one
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// XDG config dir on Linux, Application Support on macOS, AppData on Windows
    pub fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("questlog");

        Ok(config_dir.join("config.toml"))
    }

    /// Where progress and logs live
    pub fn data_dir() -> crate::Result<PathBuf> {
        Ok(dirs::data_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find data directory".into()))?
            .join("questlog"))
    }

    pub fn catalog_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.catalog.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// URL or local path of the quest catalog document
    #[serde(default = "default_catalog_source")]
    pub source: String,

    /// Give up on the catalog fetch after this many seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_catalog_source() -> String {
    DEFAULT_CATALOG_SOURCE.to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: default_catalog_source(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// SQLite file for progress; defaults to `<data dir>/questlog/progress.db`
    pub db_path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn resolved_db_path(&self) -> crate::Result<PathBuf> {
        match &self.db_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Config::data_dir()?.join("progress.db")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FilterConfig {
    /// Filter mode the quest list opens with
    #[serde(default)]
    pub default_mode: FilterMode,

    /// Whether Kappa/Lightkeeper views keep completed quests
    #[serde(default)]
    pub track_policy: TrackPolicy,

    #[serde(default)]
    pub sort: SortOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityConfig {
    /// Extra dependencies on top of the catalog's requirement lists
    #[serde(default)]
    pub gates: Vec<GateRule>,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            gates: vec![GateRule::new("New Beginnings", "Collector")],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReportConfig {
    /// Webhook for bug reports; reporting is off when unset
    pub webhook_url: Option<String>,

    /// User id to ping in the report message
    pub mention: Option<String>,
}
