//! Reader settings: TOML file, environment and command-line layers.
//!
//! Every layer is optional. [`merge_config`] fills gaps from [`ResolvedConfig::default`],
//! then [`apply_env_overrides`] and [`apply_cli_overrides`] replace single values.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::model::{Basis, Size};

/// Why settings could not be loaded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The settings file exists but could not be read.
    #[error("cannot read settings file {path}: {reason}")]
    ReadError {
        /// Settings file.
        path: PathBuf,
        /// I/O error text.
        reason: String,
    },

    /// The settings file is not valid TOML or names an unknown key.
    #[error("malformed settings file {path}: {reason}")]
    ParseError {
        /// Settings file.
        path: PathBuf,
        /// TOML error text.
        reason: String,
    },

    /// An environment override holds an unusable value.
    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Contents of `config.toml`. Absent keys keep their default.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Number of page view models kept materialized around the visible pages.
    #[serde(default)]
    pub pool_capacity: Option<usize>,

    /// Pans shorter than this (ms) animate to the adjacent page.
    #[serde(default)]
    pub swipe_threshold_ms: Option<u64>,

    /// Page transition animation time (ms).
    #[serde(default)]
    pub animation_ms: Option<u64>,

    /// Momentum deceleration in px/ms².
    #[serde(default)]
    pub deceleration: Option<f64>,

    /// Smallest projected momentum travel (px).
    #[serde(default)]
    pub momentum_min_distance: Option<f64>,

    /// Largest projected momentum travel (px).
    #[serde(default)]
    pub momentum_max_distance: Option<f64>,

    /// Average character width as a fraction of the line height.
    #[serde(default)]
    pub avg_char_width: Option<f64>,

    /// Where tracing output goes.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Reference measurements for article layout.
    #[serde(default)]
    pub basis: Option<BasisSection>,
}

/// `[basis]` section.
///
/// ```toml
/// [basis]
/// line_width = 300
/// line_height = 20
/// column_width = 320
/// column_height = 800
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BasisSection {
    /// Text measure.
    #[serde(default)]
    pub line_width: Option<f64>,
    /// Line height.
    #[serde(default)]
    pub line_height: Option<f64>,
    /// Column slot width.
    #[serde(default)]
    pub column_width: Option<f64>,
    /// Column slot height.
    #[serde(default)]
    pub column_height: Option<f64>,
}

/// Resolved basis measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasisConfig {
    /// Text measure.
    pub line_width: f64,
    /// Line height.
    pub line_height: f64,
    /// Column slot width.
    pub column_width: f64,
    /// Column slot height.
    pub column_height: f64,
}

impl Default for BasisConfig {
    fn default() -> Self {
        Self {
            line_width: 300.0,
            line_height: 20.0,
            column_width: 320.0,
            column_height: 800.0,
        }
    }
}

impl BasisConfig {
    /// Layout basis. The block area is the text measure by the column height rounded down
    /// to whole lines.
    pub fn to_basis(&self) -> Basis {
        let line = Size::new(self.line_width, self.line_height);
        let column = Size::new(self.column_width, self.column_height);
        let partial = Basis::new(line, column, column);
        let block_max = Size::new(self.line_width, partial.floor_to_lines(self.column_height));
        Basis::new(line, column, block_max)
    }
}

/// Effective settings once every layer has been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Pool window capacity.
    pub pool_capacity: usize,
    /// Swipe threshold in ms.
    pub swipe_threshold_ms: u64,
    /// Animation time in ms.
    pub animation_ms: u64,
    /// Momentum deceleration.
    pub deceleration: f64,
    /// Lower momentum bound.
    pub momentum_min_distance: f64,
    /// Upper momentum bound.
    pub momentum_max_distance: f64,
    /// Text estimator character width.
    pub avg_char_width: f64,
    /// Layout basis.
    pub basis: BasisConfig,
    /// Tracing output file.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            pool_capacity: 5,
            swipe_threshold_ms: 300,
            animation_ms: 300,
            deceleration: 0.0006,
            momentum_min_distance: 0.0,
            momentum_max_distance: 2000.0,
            avg_char_width: 0.5,
            basis: BasisConfig::default(),
            log_file_path: default_log_path(),
        }
    }
}

/// `smartflow/smartflow.log` under the platform state directory, or `smartflow.log` in the
/// working directory when there is none.
pub fn default_log_path() -> PathBuf {
    match dirs::state_dir() {
        Some(state_dir) => state_dir.join("smartflow").join("smartflow.log"),
        None => PathBuf::from("smartflow.log"),
    }
}

/// Read the settings file at `path`; `Ok(None)` when there is no such file.
///
/// # Errors
///
/// [`ConfigError::ReadError`] or [`ConfigError::ParseError`] for an existing but unusable
/// file.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// `smartflow/config.toml` under the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("smartflow").join("config.toml"))
}

/// Pick the settings file and read it.
///
/// The first of `config_path` (`--config`), `SMARTFLOW_CONFIG` and [`default_config_path`]
/// that is set wins, even when that file turns out to be missing.
///
/// # Errors
///
/// See [`load_config_file`].
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var("SMARTFLOW_CONFIG") {
        return load_config_file(PathBuf::from(env_path));
    }

    match default_config_path() {
        Some(default_path) => load_config_file(default_path),
        None => Ok(None),
    }
}

/// Apply `SMARTFLOW_POOL_CAPACITY` and `SMARTFLOW_LOG_FILE`.
///
/// # Errors
///
/// [`ConfigError::InvalidEnv`] when the capacity is not a positive integer.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> Result<ResolvedConfig, ConfigError> {
    if let Ok(raw) = std::env::var("SMARTFLOW_POOL_CAPACITY") {
        config.pool_capacity = match raw.trim().parse::<usize>() {
            Ok(capacity) if capacity > 0 => capacity,
            _ => {
                return Err(ConfigError::InvalidEnv {
                    name: "SMARTFLOW_POOL_CAPACITY",
                    value: raw,
                })
            }
        };
    }

    if let Ok(path) = std::env::var("SMARTFLOW_LOG_FILE") {
        config.log_file_path = PathBuf::from(path);
    }

    Ok(config)
}

/// Settings from `config_file`, with defaults for every absent key.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    let basis = config.basis.unwrap_or_default();
    ResolvedConfig {
        pool_capacity: config.pool_capacity.unwrap_or(defaults.pool_capacity),
        swipe_threshold_ms: config
            .swipe_threshold_ms
            .unwrap_or(defaults.swipe_threshold_ms),
        animation_ms: config.animation_ms.unwrap_or(defaults.animation_ms),
        deceleration: config.deceleration.unwrap_or(defaults.deceleration),
        momentum_min_distance: config
            .momentum_min_distance
            .unwrap_or(defaults.momentum_min_distance),
        momentum_max_distance: config
            .momentum_max_distance
            .unwrap_or(defaults.momentum_max_distance),
        avg_char_width: config.avg_char_width.unwrap_or(defaults.avg_char_width),
        basis: BasisConfig {
            line_width: basis.line_width.unwrap_or(defaults.basis.line_width),
            line_height: basis.line_height.unwrap_or(defaults.basis.line_height),
            column_width: basis.column_width.unwrap_or(defaults.basis.column_width),
            column_height: basis.column_height.unwrap_or(defaults.basis.column_height),
        },
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply flags given on the command line. A capacity below one is raised to one.
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    capacity_override: Option<usize>,
) -> ResolvedConfig {
    if let Some(capacity) = capacity_override {
        config.pool_capacity = capacity.max(1);
    }
    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
