//! Configuration module.
//!
//! Settings come from defaults, an optional TOML file, environment overrides and CLI flags,
//! in increasing order of precedence. See [`loader`].

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, load_config_with_precedence, merge_config,
    BasisConfig, ConfigError, ConfigFile, ResolvedConfig,
};
