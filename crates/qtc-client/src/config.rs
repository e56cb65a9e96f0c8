//! Service configuration.
//!
//! Each resource client is built from one of these structs. They
//! deserialize from the `[eds]`, `[mws]`, `[mar]` and `[platform]` tables
//! of a `.qtcrc` file (see the `qtc-config` crate).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_EDS_ADDRESS: &str = "https://api.engin.io";
pub const DEFAULT_MWS_ADDRESS: &str = "https://mws-eu-1.qtc.io";
pub const DEFAULT_MAR_ADDRESS: &str = "https://mar-eu-1.qtc.io";
pub const DEFAULT_PLATFORM_ADDRESS: &str = "https://api.qtc.io";

/// Data store configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EdsConfig {
    /// Service address; defaults to [`DEFAULT_EDS_ADDRESS`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Backend id; required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Log every outgoing request through `tracing`.
    #[serde(default)]
    pub debug: bool,
}

impl EdsConfig {
    pub fn new(backend_id: impl Into<String>) -> Self {
        Self {
            backend_id: Some(backend_id.into()),
            ..Default::default()
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Socket gateway configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MwsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Gateway instance id; required.
    #[serde(default, alias = "gateway-id", skip_serializing_if = "Option::is_none")]
    pub socket_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default)]
    pub debug: bool,
}

impl MwsConfig {
    pub fn new(socket_id: impl Into<String>) -> Self {
        Self {
            socket_id: Some(socket_id.into()),
            ..Default::default()
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Application runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MarConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Runtime instance id; required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default)]
    pub debug: bool,
}

impl MarConfig {
    pub fn new(instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: Some(instance_id.into()),
            ..Default::default()
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Platform (account management) configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default)]
    pub debug: bool,
}

impl PlatformConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Return a required identifier, treating empty strings as missing.
pub(crate) fn require_id<'a>(value: Option<&'a str>, what: &str) -> Result<&'a str> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::Config(format!("{} is required", what)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_id() {
        assert_eq!(require_id(Some("abc"), "backend id").unwrap(), "abc");
        assert!(matches!(require_id(Some("  "), "backend id"), Err(Error::Config(_))));
        let err = require_id(None, "backend id").unwrap_err();
        assert!(err.to_string().contains("backend id is required"));
    }

    #[test]
    fn test_config_builders() {
        let eds = EdsConfig::new("b1")
            .with_address("http://localhost:9000")
            .with_secret("s")
            .with_debug(true);
        assert_eq!(eds.backend_id.as_deref(), Some("b1"));
        assert_eq!(eds.address.as_deref(), Some("http://localhost:9000"));
        assert!(eds.debug);
    }

    #[test]
    fn test_mws_accepts_gateway_id_alias() {
        let config: MwsConfig = serde_json::from_str(r#"{"gateway-id": "g1"}"#).unwrap();
        assert_eq!(config.socket_id.as_deref(), Some("g1"));
    }
}
