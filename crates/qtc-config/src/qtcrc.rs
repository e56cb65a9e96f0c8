//! The `.qtcrc` configuration file.
//!
//! One TOML table per service:
//!
//! ```toml
//! [eds]
//! backend-id = "524d53a6e5bde570640010b3"
//! secret = "..."
//!
//! [mar]
//! instance-id = "a1b2c3"
//! address = "https://mar-eu-1.qtc.io"
//!
//! [platform]
//! secret = "..."
//! debug = true
//! ```

use std::path::{Path, PathBuf};

use qtc_client::{EdsConfig, MarConfig, MwsConfig, PlatformConfig};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "QTC_CONFIG";

/// Default config filename, in the home directory.
const CONFIG_FILE: &str = ".qtcrc";

/// All service sections of a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QtcConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eds: Option<EdsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mws: Option<MwsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mar: Option<MarConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<PlatformConfig>,
}

impl QtcConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The `[eds]` section, which must be present.
    pub fn eds(&self) -> Result<EdsConfig> {
        self.eds.clone().ok_or(ConfigError::MissingSection("eds"))
    }

    /// The `[mws]` section, which must be present.
    pub fn mws(&self) -> Result<MwsConfig> {
        self.mws.clone().ok_or(ConfigError::MissingSection("mws"))
    }

    /// The `[mar]` section, which must be present.
    pub fn mar(&self) -> Result<MarConfig> {
        self.mar.clone().ok_or(ConfigError::MissingSection("mar"))
    }

    /// The `[platform]` section; every field has a default, so an absent
    /// section yields the default configuration.
    pub fn platform(&self) -> PlatformConfig {
        self.platform.clone().unwrap_or_default()
    }

    /// Turn request logging on for every section present, and for the
    /// platform section, which always resolves to a default.
    pub fn enable_debug(&mut self) {
        if let Some(eds) = &mut self.eds {
            eds.debug = true;
        }
        if let Some(mws) = &mut self.mws {
            mws.debug = true;
        }
        if let Some(mar) = &mut self.mar {
            mar.debug = true;
        }
        self.platform
            .get_or_insert_with(PlatformConfig::default)
            .debug = true;
    }
}

/// Get the path to the config file.
///
/// `QTC_CONFIG` wins when set and non-empty; otherwise `~/.qtcrc`.
pub fn config_path() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => dirs::home_dir().map(|home| home.join(CONFIG_FILE)),
    }
}

/// Load the configuration.
///
/// Returns an empty config if the file doesn't exist.
pub fn load_config() -> Result<QtcConfig> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(QtcConfig::new()),
    }
}

/// Load config from a specific path.
pub fn load_config_from(path: &Path) -> Result<QtcConfig> {
    if !path.exists() {
        return Ok(QtcConfig::new());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;

    QtcConfig::from_toml(&contents)
}

/// Save config to `path`, creating parent directories.
pub fn save_config(config: &QtcConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFile {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let contents = config.to_toml()?;
    std::fs::write(path, contents).map_err(|e| ConfigError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config() {
        let config = QtcConfig::from_toml("").unwrap();
        assert_eq!(config, QtcConfig::new());
        assert!(matches!(config.eds(), Err(ConfigError::MissingSection("eds"))));
        assert_eq!(config.platform(), PlatformConfig::default());
    }

    #[test]
    fn test_parse_sections() {
        let toml = r#"
[eds]
backend-id = "b1"
secret = "s1"

[mws]
gateway-id = "g1"

[mar]
instance-id = "app-1"
address = "http://localhost:9000"
debug = true
"#;
        let config = QtcConfig::from_toml(toml).unwrap();

        let eds = config.eds().unwrap();
        assert_eq!(eds.backend_id.as_deref(), Some("b1"));
        assert_eq!(eds.secret.as_deref(), Some("s1"));
        assert!(!eds.debug);

        assert_eq!(config.mws().unwrap().socket_id.as_deref(), Some("g1"));

        let mar = config.mar().unwrap();
        assert_eq!(mar.address.as_deref(), Some("http://localhost:9000"));
        assert!(mar.debug);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            QtcConfig::from_toml("[eds\nbackend-id = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_enable_debug() {
        let mut config = QtcConfig {
            eds: Some(EdsConfig::new("b1")),
            ..Default::default()
        };
        config.enable_debug();
        assert!(config.eds().unwrap().debug);
        assert!(config.mws.is_none());
    }

    #[test]
    fn test_enable_debug_without_platform_section() {
        let mut config = QtcConfig::new();
        config.enable_debug();
        assert!(config.platform().debug);
        assert_eq!(config.platform().address, PlatformConfig::default().address);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, QtcConfig::new());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(".qtcrc");

        let config = QtcConfig {
            eds: Some(EdsConfig::new("b1").with_secret("s1")),
            platform: Some(PlatformConfig::new().with_address("https://api.qtc.io")),
            ..Default::default()
        };
        save_config(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_path_env_override() {
        // SAFETY: Test-specific env var, restored below
        unsafe {
            std::env::set_var(CONFIG_ENV_VAR, "/tmp/qtc-test-config.toml");
        }
        assert_eq!(
            config_path(),
            Some(PathBuf::from("/tmp/qtc-test-config.toml"))
        );
        // SAFETY: Cleanup test env var
        unsafe {
            std::env::remove_var(CONFIG_ENV_VAR);
        }
    }
}
