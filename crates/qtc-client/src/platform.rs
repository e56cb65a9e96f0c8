//! Platform (account management) client.
//!
//! Covers the signed-in user, clouds (accounts), service instances,
//! access tokens and SSH keys.

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde_json::{Value, json};

use crate::client::{Endpoint, ServiceClient, default_executor};
use crate::config::{DEFAULT_PLATFORM_ADDRESS, PlatformConfig};
use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::query::{encode_pairs, with_question_mark};
use crate::request::{Method, Response};
use crate::types::RestOptions;

/// Datacenter used when none is given.
pub const DEFAULT_DATACENTER: &str = "eu-1";

/// Latest image version of each managed database kind.
const LATEST_MDB_VERSIONS: &[(&str, &str)] =
    &[("redis", "2.8"), ("mysql", "5.6"), ("mongodb", "2.6")];

/// Body of an instance creation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInstance {
    pub name: String,
    pub service_provider_id: String,
    pub datacenter_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

impl NewInstance {
    fn new(name: &str, provider: &str, datacenter: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            service_provider_id: provider.to_string(),
            datacenter_id: datacenter
                .filter(|d| !d.is_empty())
                .unwrap_or(DEFAULT_DATACENTER)
                .to_string(),
            config: None,
        }
    }

    fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }
}

/// Resolve a database kind such as `MySQL` or `redis:2.6` to an image tag.
///
/// A kind without a version gets the latest known one.
pub fn mdb_image(kind: &str) -> Result<String> {
    let kind = kind.trim().to_lowercase();
    if kind.contains(':') {
        return Ok(format!("qtcs/{}", kind));
    }
    LATEST_MDB_VERSIONS
        .iter()
        .find(|(name, _)| *name == kind)
        .map(|(name, version)| format!("qtcs/{}:{}", name, version))
        .ok_or_else(|| Error::Config(format!("unknown database kind '{}'", kind)))
}

/// Account management client.
#[derive(Clone)]
pub struct Platform {
    service: ServiceClient,
}

impl Platform {
    pub fn new(config: PlatformConfig) -> Result<Self> {
        let executor = default_executor(config.debug)?;
        Self::with_executor(config, executor)
    }

    pub fn with_executor(config: PlatformConfig, executor: Executor) -> Result<Self> {
        let address = config.address.as_deref().unwrap_or(DEFAULT_PLATFORM_ADDRESS);
        let endpoint = Endpoint::parse(address, "v1")?;
        let mut fixed = HeaderMap::new();
        fixed.insert(ACCEPT, HeaderValue::from_static("application/json"));
        fixed.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(Self {
            service: ServiceClient::new(executor, endpoint, config.secret, fixed),
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.service.endpoint()
    }

    /// Custom request under `/v1/`.
    pub async fn rest(&self, verb: &str, path: &str, options: RestOptions) -> Result<Response> {
        self.service.rest(verb, path, options).await
    }

    async fn post_empty(&self, relative: &str) -> Result<Value> {
        let descriptor = self.service.descriptor(Method::Post, relative, None)?;
        Ok(self.service.send(descriptor).await?.into_value())
    }

    // -- user --

    pub async fn get_user(&self) -> Result<Value> {
        self.service.get("user", None).await
    }

    // -- clouds --

    pub async fn get_clouds(&self) -> Result<Value> {
        self.service.get("user/accounts", None).await
    }

    pub async fn create_cloud(&self, name: &str) -> Result<Value> {
        self.service
            .send_json(Method::Post, "accounts", &json!({ "name": name }), None)
            .await
    }

    pub async fn remove_cloud(&self, cloud_id: &str) -> Result<Value> {
        self.service
            .delete(&format!("accounts/{}", cloud_id), None)
            .await
    }

    pub async fn get_cloud_info(&self, cloud_id: &str) -> Result<Value> {
        self.service
            .get(&format!("accounts/{}", cloud_id), None)
            .await
    }

    pub async fn get_cloud_log(&self, cloud_id: &str) -> Result<Value> {
        self.service
            .get(&format!("accounts/{}/log", cloud_id), None)
            .await
    }

    // -- instances --

    /// Instances of a cloud, optionally only those of one service provider.
    pub async fn get_cloud_instances(
        &self,
        cloud_id: &str,
        provider: Option<&str>,
    ) -> Result<Value> {
        let provider = provider.unwrap_or_default().to_lowercase();
        let query = with_question_mark(encode_pairs([("provider", provider.as_str())]));
        self.service
            .get(&format!("accounts/{}/instances{}", cloud_id, query), None)
            .await
    }

    pub async fn get_instance_info(&self, instance_id: &str) -> Result<Value> {
        self.service
            .get(&format!("instances/{}", instance_id), None)
            .await
    }

    pub async fn get_instance_tokens(&self, instance_id: &str) -> Result<Value> {
        self.service
            .get(&format!("instances/{}/authorizations", instance_id), None)
            .await
    }

    /// Rename an instance, keeping its tags.
    pub async fn rename_instance(&self, instance_id: &str, name: &str) -> Result<Value> {
        let current = self.get_instance_info(instance_id).await?;
        let tags = current.get("tags").cloned().unwrap_or(Value::Null);
        self.update_instance(instance_id, json!(name), tags).await
    }

    /// Replace an instance's tags, keeping its name.
    pub async fn set_instance_tags(&self, instance_id: &str, tags: &[String]) -> Result<Value> {
        let current = self.get_instance_info(instance_id).await?;
        let name = current.get("name").cloned().unwrap_or(Value::Null);
        self.update_instance(instance_id, name, json!(tags)).await
    }

    async fn update_instance(&self, instance_id: &str, name: Value, tags: Value) -> Result<Value> {
        self.service
            .send_json(
                Method::Put,
                &format!("instances/{}", instance_id),
                &json!({ "name": name, "tags": tags }),
                None,
            )
            .await
    }

    async fn create_instance(&self, cloud_id: &str, instance: &NewInstance) -> Result<Value> {
        let body = serde_json::to_value(instance)?;
        self.service
            .send_json(
                Method::Post,
                &format!("accounts/{}/instances", cloud_id),
                &body,
                None,
            )
            .await
    }

    pub async fn create_eds_instance(
        &self,
        cloud_id: &str,
        name: &str,
        datacenter: Option<&str>,
    ) -> Result<Value> {
        self.create_instance(cloud_id, &NewInstance::new(name, "eds", datacenter))
            .await
    }

    pub async fn create_mws_instance(
        &self,
        cloud_id: &str,
        name: &str,
        datacenter: Option<&str>,
    ) -> Result<Value> {
        self.create_instance(cloud_id, &NewInstance::new(name, "mws", datacenter))
            .await
    }

    /// Create an application runtime of `size` units (1, 2 or 4).
    pub async fn create_mar_app_instance(
        &self,
        cloud_id: &str,
        name: &str,
        size: u32,
        datacenter: Option<&str>,
    ) -> Result<Value> {
        let instance = NewInstance::new(name, "mar", datacenter)
            .with_config(json!({ "runtimeType": "app", "runtimeSize": size }));
        self.create_instance(cloud_id, &instance).await
    }

    /// Create a managed database, e.g. kind `mongodb` or `mysql:5.6`.
    pub async fn create_mdb_instance(
        &self,
        cloud_id: &str,
        name: &str,
        size: u32,
        kind: &str,
        datacenter: Option<&str>,
    ) -> Result<Value> {
        let instance = NewInstance::new(name, "mar", datacenter).with_config(json!({
            "runtimeType": "service_container",
            "runtimeSize": size,
            "serviceImage": mdb_image(kind)?,
        }));
        self.create_instance(cloud_id, &instance).await
    }

    // -- access tokens --

    pub async fn get_access_tokens(&self) -> Result<Value> {
        self.service.get("authorizations", None).await
    }

    pub async fn create_access_token(&self) -> Result<Value> {
        self.post_empty("authorizations").await
    }

    pub async fn remove_access_token(&self, token_id: &str) -> Result<Value> {
        self.service
            .delete(&format!("authorizations/{}", token_id), None)
            .await
    }

    // -- ssh keys --

    pub async fn get_ssh_keys(&self) -> Result<Value> {
        self.service.get("user/ssh_keys", None).await
    }

    pub async fn add_ssh_key(&self, name: &str, key: &str) -> Result<Value> {
        self.service
            .send_json(
                Method::Post,
                "user/ssh_keys",
                &json!({ "name": name, "key": key }),
                None,
            )
            .await
    }

    pub async fn remove_ssh_key(&self, key_id: &str) -> Result<Value> {
        self.service
            .delete(&format!("user/ssh_keys/{}", key_id), None)
            .await
    }
}
