//! Configuration file support for the Qt Cloud Services SDK.
//!
//! Loads the per-service client settings (`[eds]`, `[mws]`, `[mar]`,
//! `[platform]`) from a TOML file, `~/.qtcrc` by default or the path in
//! `QTC_CONFIG`. The core client crate never reads files itself; callers
//! load a [`QtcConfig`] here and hand its sections to the clients.

pub mod error;
pub mod qtcrc;

pub use error::{ConfigError, Result};
pub use qtcrc::{CONFIG_ENV_VAR, QtcConfig, config_path, load_config, load_config_from, save_config};
