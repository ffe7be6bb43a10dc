//! Configuration loading and database/collection resolution
//!
//! Every setting follows the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is never an error: the tools log a warning and run
//! on defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the document store path
pub const DATABASE_ENV: &str = "NNDB_DATABASE";

/// Environment variable overriding the collection name
pub const COLLECTION_ENV: &str = "NNDB_COLLECTION";

/// Collection used when nothing else is configured
pub const DEFAULT_COLLECTION: &str = "nndb";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Path to the SQLite document store
    #[serde(default)]
    pub database: Option<PathBuf>,

    /// Collection the importer writes and the optimizer reads
    #[serde(default)]
    pub collection: Option<String>,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Food selection criteria for the optimizer
    #[serde(default)]
    pub selector: SelectorConfig,

    /// Genetic search parameters for the optimizer
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
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

/// Optional overrides for the selector; unset fields keep built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectorConfig {
    pub food_groups: Option<Vec<String>>,
    pub survey_only: Option<bool>,
    pub exclude_words: Option<Vec<String>>,
    pub exclude_parts: Option<Vec<String>>,
}

/// Optional overrides for the genetic search; unset fields keep built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub init_randoms: Option<usize>,
    pub expected_entries: Option<usize>,
    pub max_amount: Option<f64>,
    pub population_size: Option<usize>,
    pub mutate_rate: Option<f64>,
    pub big_mutate_share: Option<f64>,
    pub immortals: Option<usize>,
    pub merge_size: Option<usize>,
    pub generations: Option<usize>,
    pub seed: Option<u64>,
}

/// Load the TOML configuration
///
/// An explicitly requested file must exist and parse. Without one, the
/// platform config locations are searched and defaults are used when
/// nothing is found.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return read_toml_config(path);
    }

    match find_config_file() {
        Some(path) => read_toml_config(&path),
        None => {
            warn!("No config file found, using defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Read and parse a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Locate the config file: ~/.config/nndb/config.toml first, then /etc/nndb/config.toml
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("nndb").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/nndb/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Resolve the document store path
pub fn resolve_database_path(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DATABASE_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml_config.database {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_database_path()
}

/// Resolve the collection name
pub fn resolve_collection(cli_arg: Option<&str>, toml_config: &TomlConfig) -> String {
    if let Some(name) = cli_arg {
        return name.to_string();
    }

    if let Ok(name) = std::env::var(COLLECTION_ENV) {
        if !name.trim().is_empty() {
            return name;
        }
    }

    if let Some(name) = &toml_config.collection {
        return name.clone();
    }

    DEFAULT_COLLECTION.to_string()
}

/// OS-dependent default database location
///
/// Linux: ~/.local/share/nndb/nndb.db, macOS: ~/Library/Application Support/nndb/nndb.db,
/// Windows: %LOCALAPPDATA%\nndb\nndb.db
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("nndb"))
        .unwrap_or_else(|| PathBuf::from("./nndb_data"))
        .join("nndb.db")
}
