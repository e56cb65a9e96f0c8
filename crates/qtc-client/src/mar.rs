//! Managed Application Runtime (MAR) client.

use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::client::{Endpoint, ServiceClient, default_executor};
use crate::config::{DEFAULT_MAR_ADDRESS, MarConfig, require_id};
use crate::error::Result;
use crate::executor::Executor;
use crate::request::{Method, Response};
use crate::types::RestOptions;

/// Application runtime client.
#[derive(Clone)]
pub struct Mar {
    service: ServiceClient,
}

impl Mar {
    /// Create a client. Fails if the instance id is missing.
    pub fn new(config: MarConfig) -> Result<Self> {
        let executor = default_executor(config.debug)?;
        Self::with_executor(config, executor)
    }

    pub fn with_executor(config: MarConfig, executor: Executor) -> Result<Self> {
        let instance_id = require_id(config.instance_id.as_deref(), "MAR instance id")?;
        let address = config.address.as_deref().unwrap_or(DEFAULT_MAR_ADDRESS);
        let endpoint = Endpoint::parse(address, &format!("v1/apps/{}", instance_id))?;
        Ok(Self {
            service: ServiceClient::new(executor, endpoint, config.secret, HeaderMap::new()),
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.service.endpoint()
    }

    /// Custom request under `/v1/apps/<id>/`.
    pub async fn rest(&self, verb: &str, path: &str, options: RestOptions) -> Result<Response> {
        self.service.rest(verb, path, options).await
    }

    /// Instance information.
    pub async fn get_instance_info(&self) -> Result<Value> {
        Ok(self.rest("GET", "/", RestOptions::new()).await?.into_value())
    }

    /// Stdout/stderr log lines.
    pub async fn get_logs(&self, limit: Option<u64>, offset: Option<u64>) -> Result<Value> {
        let mut options = RestOptions::new();
        if let Some(limit) = limit {
            options = options.query("limit", limit.to_string());
        }
        if let Some(offset) = offset {
            options = options.query("offset", offset.to_string());
        }
        Ok(self.rest("GET", "/logs", options).await?.into_value())
    }

    /// Custom environment variables.
    pub async fn get_env_vars(&self) -> Result<Value> {
        Ok(self
            .rest("GET", "/env_vars", RestOptions::new())
            .await?
            .into_value())
    }

    /// Replace the custom environment variables.
    pub async fn set_env_vars(&self, env_vars: &Value) -> Result<Value> {
        self.service
            .send_json(Method::Put, "env_vars", env_vars, None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_instance_id_is_required() {
        let err = Mar::new(MarConfig::default()).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_api_path() {
        let mar = Mar::new(MarConfig::new("app-1")).unwrap();
        assert_eq!(mar.endpoint().host, "mar-eu-1.qtc.io");
        assert_eq!(mar.endpoint().api_path, "/v1/apps/app-1/");
    }
}
