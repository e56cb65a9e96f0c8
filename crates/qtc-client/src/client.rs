//! Plumbing shared by the resource clients.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::logging::TracingRequestLogger;
use crate::query::{encode_pairs, with_question_mark};
use crate::request::{Method, RequestDescriptor, Response, Scheme};
use crate::types::RestOptions;

/// `User-Agent` sent with every request.
pub const SDK_USER_AGENT: &str = concat!("qtc-sdk-rust/", env!("CARGO_PKG_VERSION"));

/// Executor used by a client built without an explicit one.
pub(crate) fn default_executor(debug: bool) -> Result<Executor> {
    let builder = Executor::builder();
    if debug {
        builder.logger(Arc::new(TracingRequestLogger)).build()
    } else {
        builder.build()
    }
}

/// Where a service lives: scheme, `host[:port]` and API path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: Scheme,
    pub host: String,
    /// Always starts and ends with `/`.
    pub api_path: String,
}

impl Endpoint {
    /// Parse a service address such as `https://api.engin.io`.
    ///
    /// Any path in the address is ignored; `api_path` is used instead.
    pub fn parse(address: &str, api_path: &str) -> Result<Self> {
        let url = Url::parse(address)?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::Config(format!("address '{}' has no host", address)))?;
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let mut api_path = format!("/{}", api_path.trim_matches('/'));
        if !api_path.ends_with('/') {
            api_path.push('/');
        }

        Ok(Self {
            scheme: Scheme::from_protocol(Some(url.scheme())),
            host,
            api_path,
        })
    }

    /// Absolute path for `relative` under the API prefix.
    pub fn path(&self, relative: &str) -> String {
        format!("{}{}", self.api_path, relative.trim_start_matches('/'))
    }

    /// Whether `url` points at this service's scheme, host and port.
    pub fn serves(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        Scheme::from_protocol(Some(url.scheme())) == self.scheme && authority == self.host
    }
}

/// Headers for a request to a host outside the service: no credentials.
pub(crate) fn anonymous_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(SDK_USER_AGENT));
    headers
}

/// State shared by a resource client and its collections.
#[derive(Clone)]
pub(crate) struct ServiceClient {
    executor: Executor,
    endpoint: Endpoint,
    secret: Option<String>,
    fixed_headers: HeaderMap,
}

impl ServiceClient {
    pub(crate) fn new(
        executor: Executor,
        endpoint: Endpoint,
        secret: Option<String>,
        fixed_headers: HeaderMap,
    ) -> Self {
        Self {
            executor,
            endpoint,
            secret: secret.filter(|s| !s.is_empty()),
            fixed_headers,
        }
    }

    pub(crate) fn executor(&self) -> &Executor {
        &self.executor
    }

    pub(crate) fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Headers for one call. A non-empty `token` wins over the client secret.
    pub(crate) fn headers(&self, token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(SDK_USER_AGENT));
        for (name, value) in &self.fixed_headers {
            headers.insert(name.clone(), value.clone());
        }

        let bearer = token
            .filter(|t| !t.is_empty())
            .or(self.secret.as_deref());
        if let Some(bearer) = bearer {
            let value = HeaderValue::from_str(&format!("Bearer {}", bearer))
                .map_err(|_| Error::InvalidHeader(AUTHORIZATION.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Descriptor for `relative` under the API prefix.
    pub(crate) fn descriptor(
        &self,
        method: Method,
        relative: &str,
        token: Option<&str>,
    ) -> Result<RequestDescriptor> {
        Ok(
            RequestDescriptor::new(method, &self.endpoint.host, self.endpoint.path(relative))
                .with_scheme(self.endpoint.scheme)
                .with_headers(self.headers(token)?),
        )
    }

    pub(crate) async fn send(&self, descriptor: RequestDescriptor) -> Result<Response> {
        self.executor.execute(descriptor).await
    }

    pub(crate) async fn get(&self, relative: &str, token: Option<&str>) -> Result<Value> {
        let descriptor = self.descriptor(Method::Get, relative, token)?;
        Ok(self.send(descriptor).await?.into_value())
    }

    pub(crate) async fn send_json(
        &self,
        method: Method,
        relative: &str,
        body: &Value,
        token: Option<&str>,
    ) -> Result<Value> {
        let descriptor = with_json_body(self.descriptor(method, relative, token)?, body)?;
        Ok(self.send(descriptor).await?.into_value())
    }

    pub(crate) async fn delete(&self, relative: &str, token: Option<&str>) -> Result<Value> {
        let descriptor = self.descriptor(Method::Delete, relative, token)?;
        Ok(self.send(descriptor).await?.into_value())
    }

    /// Custom call: any verb, any path under the API prefix.
    ///
    /// The body is attached only for POST and PUT.
    pub(crate) async fn rest(
        &self,
        verb: &str,
        path: &str,
        options: RestOptions,
    ) -> Result<Response> {
        let method: Method = verb.parse()?;
        let query = with_question_mark(encode_pairs(
            options
                .query
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        ));
        let relative = format!("{}{}", path.trim_start_matches('/'), query);

        let mut descriptor =
            self.descriptor(method, &relative, options.access_token.as_deref())?;
        if method.carries_body()
            && let Some(body) = &options.body
        {
            descriptor = with_json_body(descriptor, body)?;
        }
        self.send(descriptor).await
    }
}

/// Attach `body` as JSON, declaring the content type unless already set.
pub(crate) fn with_json_body(
    mut descriptor: RequestDescriptor,
    body: &Value,
) -> Result<RequestDescriptor> {
    if !descriptor.headers.contains_key(CONTENT_TYPE) {
        descriptor
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    descriptor.with_json(body)
}

/// Build a header map from name/value pairs.
pub(crate) fn header_map(pairs: &[(HeaderName, &str)]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let value =
            HeaderValue::from_str(value).map_err(|_| Error::InvalidHeader(name.to_string()))?;
        headers.insert(name.clone(), value);
    }
    Ok(headers)
}
