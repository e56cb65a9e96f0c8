//! Collection operations.
//!
//! User collections, users and user groups share one implementation,
//! parameterized by object type.

use std::path::Path;

use serde_json::Value;

use crate::client::ServiceClient;
use crate::error::{Error, Result};
use crate::multipart::MultipartUploadDescriptor;
use crate::query::{QueryOptions, build_query_string, encode_pairs, with_question_mark};
use crate::request::Method;
use crate::types::{CallOptions, CountResponse};

/// Outcome of [`Collection::query`].
#[derive(Debug, Clone, PartialEq)]
pub enum FindResult {
    /// Matching objects.
    Objects(Vec<Value>),
    /// Number of matches, for count-only queries.
    Count(u64),
}

/// A collection of JSON objects.
#[derive(Clone)]
pub struct Collection {
    service: ServiceClient,
    name: String,
    object_type: String,
    /// Path under the API prefix, ending with `/`.
    name_path: String,
}

impl Collection {
    pub(crate) fn new(service: ServiceClient, object_type: &str) -> Self {
        let (name, name_path) = match object_type.split_once('.') {
            Some((kind, rest)) => {
                let name = rest.split('.').next().unwrap_or(rest);
                (name.to_string(), format!("{}/{}/", kind, name))
            }
            None => (object_type.to_string(), format!("{}/", object_type)),
        };
        Self {
            service,
            name,
            object_type: object_type.to_string(),
            name_path,
        }
    }

    /// Short name, e.g. `contacts`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full object type, e.g. `objects.contacts`.
    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    /// Absolute path of the collection, e.g. `/v1/objects/contacts/`.
    pub fn path(&self) -> String {
        self.service.endpoint().path(&self.name_path)
    }

    fn object_path(&self, id: &str) -> String {
        format!("{}{}", self.name_path, id)
    }

    /// Insert an object; returns the stored object with its id.
    pub async fn insert(&self, object: &Value, options: CallOptions) -> Result<Value> {
        self.service
            .send_json(
                Method::Post,
                &self.name_path,
                object,
                options.access_token.as_deref(),
            )
            .await
    }

    /// Replace fields of an object.
    pub async fn update(&self, id: &str, object: &Value, options: CallOptions) -> Result<Value> {
        self.service
            .send_json(
                Method::Put,
                &self.object_path(id),
                object,
                options.access_token.as_deref(),
            )
            .await
    }

    /// Remove an object.
    pub async fn remove(&self, id: &str, options: CallOptions) -> Result<()> {
        self.service
            .delete(&self.object_path(id), options.access_token.as_deref())
            .await?;
        Ok(())
    }

    async fn fetch(&self, query: &QueryOptions, options: &CallOptions) -> Result<Value> {
        let relative = format!("{}?{}", self.name_path, build_query_string(query));
        self.service
            .get(&relative, options.access_token.as_deref())
            .await
    }

    fn decode_results(&self, body: Value) -> Result<Vec<Value>> {
        match body {
            Value::Object(mut map) => match map.remove("results") {
                Some(Value::Array(results)) => Ok(results),
                _ => Err(self.unexpected("no results array")),
            },
            _ => Err(self.unexpected("no results array")),
        }
    }

    fn decode_count(&self, body: Value) -> Result<u64> {
        serde_json::from_value::<CountResponse>(body)
            .map(|count| count.value())
            .map_err(|e| self.unexpected(&format!("unreadable count: {}", e)))
    }

    fn unexpected(&self, what: &str) -> Error {
        Error::UnexpectedResponse(format!("find on '{}': {}", self.object_type, what))
    }

    /// Run a find and decode it according to `query.count_only`.
    pub async fn query(&self, query: &QueryOptions, options: CallOptions) -> Result<FindResult> {
        let body = self.fetch(query, &options).await?;
        if query.count_only {
            Ok(FindResult::Count(self.decode_count(body)?))
        } else {
            Ok(FindResult::Objects(self.decode_results(body)?))
        }
    }

    /// Objects matching `query`.
    ///
    /// Count-only queries are rejected; use [`Collection::count`].
    pub async fn find(&self, query: &QueryOptions, options: CallOptions) -> Result<Vec<Value>> {
        if query.count_only {
            return Err(Error::Config(
                "count-only query passed to find; use count".to_string(),
            ));
        }
        let body = self.fetch(query, &options).await?;
        self.decode_results(body)
    }

    /// Number of objects matching `filter` (all objects when `None`).
    pub async fn count(&self, filter: Option<Value>, options: CallOptions) -> Result<u64> {
        let query = QueryOptions {
            filter,
            count_only: true,
            ..Default::default()
        };
        let body = self.fetch(&query, &options).await?;
        self.decode_count(body)
    }

    /// A single object by id, optionally with related objects included.
    pub async fn find_one(
        &self,
        id: &str,
        include: Option<&Value>,
        options: CallOptions,
    ) -> Result<Value> {
        let include = include.map(Value::to_string);
        let query = with_question_mark(encode_pairs(
            include.as_deref().map(|value| ("include", value)),
        ));
        self.service
            .get(
                &format!("{}{}", self.object_path(id), query),
                options.access_token.as_deref(),
            )
            .await
    }

    /// Upload a local file into property `field_name` of object `id`.
    ///
    /// Returns the created file object.
    pub async fn attach_file(
        &self,
        id: &str,
        field_name: &str,
        file_path: impl AsRef<Path>,
        options: CallOptions,
    ) -> Result<Value> {
        let endpoint = self.service.endpoint();
        let descriptor = MultipartUploadDescriptor {
            scheme: endpoint.scheme,
            host: endpoint.host.clone(),
            path: endpoint.path("files/"),
            headers: self.service.headers(options.access_token.as_deref())?,
            object_id: id.to_string(),
            object_type: self.object_type.clone(),
            field_name: field_name.to_string(),
            file_path: file_path.as_ref().to_path_buf(),
        };
        let response = self.service.executor().upload_file(descriptor).await?;
        Ok(response.into_value())
    }
}
