//! Request descriptors and buffered responses.

use std::fmt;
use std::str::FromStr;

use reqwest::header::{CONTENT_LENGTH, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};

/// HTTP verbs accepted by the executors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Whether custom REST calls attach a body for this verb.
    pub fn carries_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(verb: &str) -> Result<Self> {
        match verb.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            _ => Err(Error::InvalidMethod(verb.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Transport scheme of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    /// Resolve a protocol name.
    ///
    /// A missing protocol means `http`. Only `http` (in any letter case)
    /// selects plain HTTP; every other value, including unknown ones,
    /// selects `https`.
    pub fn from_protocol(protocol: Option<&str>) -> Self {
        match protocol {
            None => Scheme::Http,
            Some(p) if p.to_lowercase() == "http" => Scheme::Http,
            Some(_) => Scheme::Https,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single pending HTTP call, consumed once by [`Executor::execute`].
///
/// [`Executor::execute`]: crate::Executor::execute
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub scheme: Scheme,
    /// Host name, optionally with `:port`.
    pub host: String,
    /// Absolute path including any query string.
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl RequestDescriptor {
    /// Create a descriptor with no headers and no body.
    pub fn new(method: Method, host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method,
            scheme: Scheme::default(),
            host: host.into(),
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Set the scheme.
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Replace the header map.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Add a single header.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| Error::InvalidHeader(name.to_string()))?;
        let value =
            HeaderValue::from_str(value).map_err(|_| Error::InvalidHeader(name.to_string()))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Set a raw body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON body.
    pub fn with_json<T: serde::Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value)?;
        Ok(self.with_body(body))
    }

    /// Absolute URL this descriptor targets.
    pub fn url(&self) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}://{}{}",
            self.scheme, self.host, self.path
        ))?)
    }

    /// Headers as they go on the wire.
    ///
    /// A non-empty body without an explicit `Content-Length` gets one equal
    /// to the body's byte length.
    pub fn outgoing_headers(&self) -> HeaderMap {
        let mut headers = self.headers.clone();
        if let Some(body) = self.body.as_ref().filter(|b| !b.is_empty())
            && !headers.contains_key(CONTENT_LENGTH)
        {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        }
        headers
    }
}

/// A buffered response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Body of a response declared as `application/json`.
    Json(Value),
    /// Any other body, decoded lossily as UTF-8.
    Text(String),
}

impl Payload {
    /// Decode a buffered body according to the response content type.
    pub(crate) fn decode(content_type: Option<&str>, bytes: &[u8]) -> Result<Self> {
        let is_json = content_type
            .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false);
        if is_json {
            Ok(Payload::Json(serde_json::from_slice(bytes)?))
        } else {
            Ok(Payload::Text(String::from_utf8_lossy(bytes).into_owned()))
        }
    }

    /// The body as a JSON value; text bodies become JSON strings.
    pub fn into_value(self) -> Value {
        match self {
            Payload::Json(value) => value,
            Payload::Text(text) => Value::String(text),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Json(value) => write!(f, "{}", value),
            Payload::Text(text) => f.write_str(text),
        }
    }
}

/// A successful (status < 400) response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Payload,
}

impl Response {
    /// The body as a JSON value.
    pub fn into_value(self) -> Value {
        self.body.into_value()
    }

    /// Deserialize a JSON body into `T`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T> {
        match self.body {
            Payload::Json(value) => Ok(serde_json::from_value(value)?),
            Payload::Text(text) => Ok(serde_json::from_str(&text)?),
        }
    }
}
