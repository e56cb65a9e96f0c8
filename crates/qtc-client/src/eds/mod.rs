//! Enginio Data Storage (EDS) client.

mod collection;

pub use collection::{Collection, FindResult};

use std::path::Path;

use reqwest::header::HeaderName;
use serde_json::Value;
use url::Url;

use crate::client::{Endpoint, ServiceClient, anonymous_headers, default_executor, header_map};
use crate::config::{DEFAULT_EDS_ADDRESS, EdsConfig, require_id};
use crate::download::{DownloadDescriptor, DownloadedFile};
use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::query::{encode_pairs, with_question_mark};
use crate::request::Response;
use crate::types::{CallOptions, RestOptions};

/// Header carrying the backend id.
pub const BACKEND_ID_HEADER: &str = "enginio-backend-id";

/// Data store client.
///
/// # Example
///
/// ```no_run
/// use qtc_client::{Eds, EdsConfig, QueryOptions};
/// use serde_json::json;
///
/// # async fn example() -> qtc_client::Result<()> {
/// let eds = Eds::new(EdsConfig::new("524d53a6e5bde570640010b3"))?;
/// let contacts = eds.collection("contacts");
///
/// let created = contacts.insert(&json!({"name": "John", "age": 31}), Default::default()).await?;
/// let adults = contacts
///     .find(&QueryOptions::new().filter(json!({"age": {"$gte": 18}})).limit(10), Default::default())
///     .await?;
/// println!("{} -> {} adults", created["id"], adults.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Eds {
    service: ServiceClient,
}

impl Eds {
    /// Create a client. Fails if the backend id is missing.
    pub fn new(config: EdsConfig) -> Result<Self> {
        let executor = default_executor(config.debug)?;
        Self::with_executor(config, executor)
    }

    /// Create a client that issues requests through `executor`.
    pub fn with_executor(config: EdsConfig, executor: Executor) -> Result<Self> {
        let backend_id = require_id(config.backend_id.as_deref(), "EDS backend id")?;
        let address = config.address.as_deref().unwrap_or(DEFAULT_EDS_ADDRESS);
        let endpoint = Endpoint::parse(address, "v1")?;
        let fixed = header_map(&[(HeaderName::from_static(BACKEND_ID_HEADER), backend_id)])?;
        Ok(Self {
            service: ServiceClient::new(executor, endpoint, config.secret, fixed),
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.service.endpoint()
    }

    /// A user-defined collection (object type `objects.<name>`).
    pub fn collection(&self, name: &str) -> Collection {
        Collection::new(self.service.clone(), &format!("objects.{}", name))
    }

    /// The built-in users collection.
    pub fn users(&self) -> Collection {
        Collection::new(self.service.clone(), "users")
    }

    /// The built-in user groups collection.
    pub fn usergroups(&self) -> Collection {
        Collection::new(self.service.clone(), "usergroups")
    }

    /// Custom request against any path under `/v1`.
    pub async fn rest(&self, verb: &str, path: &str, options: RestOptions) -> Result<Response> {
        self.service.rest(verb, path, options).await
    }

    /// File metadata.
    pub async fn get_file_info(&self, file_id: &str, options: CallOptions) -> Result<Value> {
        self.service
            .get(&format!("files/{}", file_id), options.access_token.as_deref())
            .await
    }

    /// Time-limited download URL of a file, optionally for an image variant.
    pub async fn get_file_download_url(
        &self,
        file_id: &str,
        variant: Option<&str>,
        options: CallOptions,
    ) -> Result<Value> {
        let query = with_question_mark(encode_pairs(variant.map(|v| ("variant", v))));
        self.service
            .get(
                &format!("files/{}/download_url{}", file_id, query),
                options.access_token.as_deref(),
            )
            .await
    }

    /// Download a file to `destination`.
    ///
    /// Resolves the file's expiring URL first, then streams it to disk. A
    /// destination ending in a path separator receives the file under the
    /// URL's last path segment. Credentials are only sent when the expiring
    /// URL points back at the data store itself.
    pub async fn download_file(
        &self,
        file_id: &str,
        destination: impl AsRef<Path>,
        variant: Option<&str>,
        options: CallOptions,
    ) -> Result<DownloadedFile> {
        let info = self
            .get_file_download_url(file_id, variant, options.clone())
            .await?;
        let url = info
            .get("expiringUrl")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::UnexpectedResponse(format!(
                    "download_url for file '{}' has no expiringUrl",
                    file_id
                ))
            })?;

        let expiring = Url::parse(url)?;
        let headers = if self.endpoint().serves(&expiring) {
            self.service.headers(options.access_token.as_deref())?
        } else {
            anonymous_headers()
        };
        let descriptor =
            DownloadDescriptor::new(url, destination.as_ref()).with_headers(headers);
        self.service.executor().download_file(descriptor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_id_is_required() {
        let err = Eds::new(EdsConfig::default()).err().unwrap();
        assert!(matches!(err, Error::Config(_)));

        let err = Eds::new(EdsConfig::new("")).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_default_address() {
        let eds = Eds::new(EdsConfig::new("b1")).unwrap();
        assert_eq!(eds.endpoint().host, "api.engin.io");
        assert_eq!(eds.endpoint().api_path, "/v1/");
    }

    #[test]
    fn test_backend_header() {
        let eds = Eds::new(EdsConfig::new("b1").with_secret("s")).unwrap();
        let headers = eds.service.headers(None).unwrap();
        assert_eq!(headers.get(BACKEND_ID_HEADER).unwrap(), "b1");
        assert_eq!(headers.get("authorization").unwrap(), "Bearer s");
    }
}
