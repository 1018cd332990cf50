//! Configuration file loading and path resolution
//!
//! Bootstrap configuration is a single TOML file with two tables:
//!
//! ```toml
//! [engine]
//! tiers = [4320, 2160, 1440, 1080, 720, 480]
//! segment_count = 12
//! fill_interval_ms = 1500
//! playback_interval_ms = 1200
//! fill_base_threshold = 0.6
//! rank_speed_increment = 0.2
//! preferred_tier = 1080
//! seed = 42
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every field is optional; missing fields take the built-in defaults below.
//! Values are only parsed here. Range and consistency checks happen when the
//! player turns [`EngineSettings`] into its validated engine configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::tier::DEFAULT_TIERS;
use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "ABRSIM_CONFIG";

/// Directory name under the platform config dir
const CONFIG_DIR_NAME: &str = "abrsim";

/// File name of the default config file
const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level TOML configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct TomlConfig {
    #[serde(default)]
    pub engine: EngineSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Raw engine settings as read from TOML
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EngineSettings {
    /// Quality tiers, best first
    #[serde(default = "default_tiers")]
    pub tiers: Vec<u32>,

    /// Number of segments on the timeline
    #[serde(default = "default_segment_count")]
    pub segment_count: usize,

    /// Period of the fill simulator tick
    #[serde(default = "default_fill_interval_ms")]
    pub fill_interval_ms: u64,

    /// Period of the playback tick
    #[serde(default = "default_playback_interval_ms")]
    pub playback_interval_ms: u64,

    /// Base constant of the fill decision (a draw above `base / speed` fills)
    #[serde(default = "default_fill_base_threshold")]
    pub fill_base_threshold: f64,

    /// Speed-factor increment per rank below the best tier
    #[serde(default = "default_rank_speed_increment")]
    pub rank_speed_increment: f64,

    /// Initially preferred tier; best tier of the ladder when unset
    #[serde(default)]
    pub preferred_tier: Option<u32>,

    /// Seed of the fill random source; drawn from entropy when unset
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
            segment_count: default_segment_count(),
            fill_interval_ms: default_fill_interval_ms(),
            playback_interval_ms: default_playback_interval_ms(),
            fill_base_threshold: default_fill_base_threshold(),
            rank_speed_increment: default_rank_speed_increment(),
            preferred_tier: None,
            seed: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
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

fn default_tiers() -> Vec<u32> {
    DEFAULT_TIERS.to_vec()
}

fn default_segment_count() -> usize {
    12
}

fn default_fill_interval_ms() -> u64 {
    1500
}

fn default_playback_interval_ms() -> u64 {
    1200
}

fn default_fill_base_threshold() -> f64 {
    0.6
}

fn default_rank_speed_increment() -> f64 {
    0.2
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a file that must exist
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Resolve and load configuration
    ///
    /// Priority order:
    /// 1. Explicit path (command line)
    /// 2. `ABRSIM_CONFIG` environment variable
    /// 3. `<config_dir>/abrsim/config.toml` if present
    /// 4. Built-in defaults
    ///
    /// An explicitly named file (1 or 2) that cannot be read is an error; a
    /// missing default file silently falls through to the defaults.
    pub fn resolve(cli_path: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_path) {
            Some(path) => Self::load_from_file(&path),
            None => {
                debug!("No configuration file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Determine which config file to read, if any
pub fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory, only if the file exists
    default_config_path().filter(|path| path.exists())
}

/// Platform default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
