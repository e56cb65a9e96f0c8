//! Managed WebSocket (MWS) gateway client.
//!
//! Only the REST side of the gateway lives here: looking up a socket
//! address to connect to, and pushing messages to connected sockets.

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::client::{Endpoint, ServiceClient, default_executor};
use crate::config::{DEFAULT_MWS_ADDRESS, MwsConfig, require_id};
use crate::error::Result;
use crate::executor::Executor;
use crate::request::{Method, Response};
use crate::types::{CallOptions, RestOptions};

/// Who receives a pushed message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Receivers {
    /// Socket ids.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sockets: Vec<String>,
    /// Socket tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Receivers {
    /// Every socket connected to the gateway.
    pub fn everyone() -> Self {
        Self {
            sockets: vec!["*".to_string()],
            tags: Vec::new(),
        }
    }

    pub fn sockets<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sockets: ids.into_iter().map(Into::into).collect(),
            tags: Vec::new(),
        }
    }

    pub fn tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sockets: Vec::new(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// Socket gateway client.
#[derive(Clone)]
pub struct Mws {
    service: ServiceClient,
    socket_id: String,
}

impl Mws {
    /// Create a client. Fails if the socket id is missing.
    pub fn new(config: MwsConfig) -> Result<Self> {
        let executor = default_executor(config.debug)?;
        Self::with_executor(config, executor)
    }

    pub fn with_executor(config: MwsConfig, executor: Executor) -> Result<Self> {
        let socket_id = require_id(config.socket_id.as_deref(), "MWS socket id")?.to_string();
        let address = config.address.as_deref().unwrap_or(DEFAULT_MWS_ADDRESS);
        let endpoint = Endpoint::parse(address, &format!("v1/instances/{}", socket_id))?;
        Ok(Self {
            service: ServiceClient::new(executor, endpoint, config.secret, HeaderMap::new()),
            socket_id,
        })
    }

    pub fn socket_id(&self) -> &str {
        &self.socket_id
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.service.endpoint()
    }

    /// Custom request under `/v1/instances/<id>/`.
    pub async fn rest(&self, verb: &str, path: &str, options: RestOptions) -> Result<Response> {
        self.service.rest(verb, path, options).await
    }

    /// Request a WebSocket address (`{"uri": ...}`) for a new client.
    pub async fn get_socket_address(&self, options: CallOptions) -> Result<Value> {
        self.service
            .send_json(
                Method::Post,
                "websocket_uri",
                &json!({}),
                options.access_token.as_deref(),
            )
            .await
    }

    /// Push `data` to the given receivers.
    pub async fn send_message(
        &self,
        data: &Value,
        receivers: &Receivers,
        options: CallOptions,
    ) -> Result<Value> {
        let body = json!({ "data": data, "receivers": receivers });
        self.service
            .send_json(
                Method::Post,
                "messages",
                &body,
                options.access_token.as_deref(),
            )
            .await
    }
}
