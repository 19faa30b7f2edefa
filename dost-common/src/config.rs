//! Configuration loading and path resolution
//!
//! Bootstrap configuration comes from a TOML file. Every field has a
//! built-in default, so a missing file at the implicit locations is not an
//! error: the engine logs a warning and starts with defaults.
//!
//! # Config file priority
//! 1. Command-line argument (highest priority)
//! 2. `DOST_CONFIG` environment variable
//! 3. `~/.config/dost/config.toml` (platform config dir)
//! 4. Compiled defaults (fallback)
//!
//! # Curriculum snapshot priority
//! 1. Command-line argument
//! 2. `DOST_TREE_PATH` environment variable
//! 3. `tree_path` in the TOML file
//! 4. None (startup fails: the tree is mandatory)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::params::ParamSpecTable;
use crate::{Error, Result};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "DOST_CONFIG";

/// Environment variable naming the curriculum snapshot
pub const TREE_PATH_ENV_VAR: &str = "DOST_TREE_PATH";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Curriculum snapshot (JSON)
    #[serde(default)]
    pub tree_path: Option<PathBuf>,

    /// Student id injected into every payload's user field
    #[serde(default)]
    pub student_id: Option<String>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub aggregation: AggregationConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Overrides for the parameter default table, keyed by task type
    #[serde(default)]
    pub params: BTreeMap<String, toml::Table>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Similarity cutoffs for taxonomy resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_cutoff")]
    pub chapter_cutoff: f64,

    /// Single relaxation tier tried when no chapter matches at `chapter_cutoff`
    #[serde(default = "default_relaxed_cutoff")]
    pub relaxed_chapter_cutoff: f64,

    #[serde(default = "default_cutoff")]
    pub concept_cutoff: f64,

    #[serde(default = "default_cutoff")]
    pub subconcept_cutoff: f64,
}

/// External validation round settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Validator endpoint; without one every resolution is accepted as-is
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Aggregation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// `per-request`, `extractor-marked` or `by-subject`
    #[serde(default = "default_merge_policy")]
    pub merge_policy: String,
}

/// Resource-creation API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub auth_token: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cutoff() -> f64 {
    0.7
}

fn default_relaxed_cutoff() -> f64 {
    0.5
}

fn default_max_retries() -> u32 {
    2
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_merge_policy() -> String {
    "extractor-marked".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            chapter_cutoff: default_cutoff(),
            relaxed_chapter_cutoff: default_relaxed_cutoff(),
            concept_cutoff: default_cutoff(),
            subconcept_cutoff: default_cutoff(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            merge_policy: default_merge_policy(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            auth_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ResolverConfig {
    /// Cutoffs must satisfy `0 < relaxed <= chapter <= 1` and lie in (0, 1]
    pub fn validate(&self) -> Result<()> {
        let in_range = |v: f64| v > 0.0 && v <= 1.0;
        for (name, value) in [
            ("chapter_cutoff", self.chapter_cutoff),
            ("relaxed_chapter_cutoff", self.relaxed_chapter_cutoff),
            ("concept_cutoff", self.concept_cutoff),
            ("subconcept_cutoff", self.subconcept_cutoff),
        ] {
            if !in_range(value) {
                return Err(Error::Config(format!(
                    "resolver.{}: value {} out of range (0.0, 1.0]",
                    name, value
                )));
            }
        }
        if self.relaxed_chapter_cutoff > self.chapter_cutoff {
            return Err(Error::Config(format!(
                "resolver.relaxed_chapter_cutoff ({}) must not exceed chapter_cutoff ({})",
                self.relaxed_chapter_cutoff, self.chapter_cutoff
            )));
        }
        Ok(())
    }
}

impl TomlConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.resolver.validate()?;
        Ok(config)
    }

    /// Load a specific TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Build the parameter table with this config's overrides applied
    pub fn param_table(&self) -> Result<ParamSpecTable> {
        ParamSpecTable::builtin().with_overrides(&self.params)
    }
}

/// Locate the config file following the priority order
///
/// Returns `None` when no explicit path was given and no file exists at the
/// implicit location.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config dir
    default_config_path().filter(|p| p.exists())
}

/// `~/.config/dost/config.toml` (or the platform equivalent)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dost").join("config.toml"))
}

/// Load configuration with graceful degradation
///
/// An explicit path (CLI or environment) that cannot be read or parsed is an
/// error. With no explicit path, a missing file yields compiled defaults.
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg) {
        Some(path) => {
            let config = TomlConfig::load(&path)?;
            info!("Configuration loaded from {}", path.display());
            Ok(config)
        }
        None => {
            warn!("No config file found, using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Resolve the curriculum snapshot path following the priority order
pub fn resolve_tree_path(cli_arg: Option<&Path>, config: &TomlConfig) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(TREE_PATH_ENV_VAR) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    // Priority 3: TOML config
    if let Some(path) = &config.tree_path {
        return Ok(path.clone());
    }

    Err(Error::Config(format!(
        "Curriculum snapshot not configured. Use one of:\n\
         1. Command line: --tree <path>\n\
         2. Environment: {}=<path>\n\
         3. TOML config: tree_path = \"<path>\"",
        TREE_PATH_ENV_VAR
    )))
}
