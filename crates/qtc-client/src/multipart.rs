//! Multipart file upload.
//!
//! Attaching a file to a data-store object is a `multipart/form-data` POST
//! with three parts in a fixed order:
//!
//! 1. `object` - JSON naming the object and property the file belongs to
//! 2. `filename` - base name of the local file
//! 3. `file` - the file contents, streamed from disk
//!
//! The body length is computed up front from the encoded envelope and the
//! file size, so the request carries an exact `Content-Length`.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::{StreamExt, stream};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use tokio_util::io::ReaderStream;
use url::Url;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::executor::{Executor, content_type};
use crate::logging::RequestSummary;
use crate::request::{Payload, Response, Scheme};

/// The only status the file service answers a successful upload with.
///
/// Any other status, 200 included, is reported as [`Error::Remote`].
pub const UPLOAD_SUCCESS_STATUS: u16 = 201;

/// A pending file attachment.
#[derive(Debug, Clone)]
pub struct MultipartUploadDescriptor {
    pub scheme: Scheme,
    pub host: String,
    pub path: String,
    pub headers: HeaderMap,
    /// Id of the object receiving the file.
    pub object_id: String,
    /// Dotted object type, e.g. `objects.contacts`.
    pub object_type: String,
    /// Property of the object the file is stored under.
    pub field_name: String,
    pub file_path: PathBuf,
}

impl MultipartUploadDescriptor {
    pub fn url(&self) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}://{}{}",
            self.scheme, self.host, self.path
        ))?)
    }

    /// Body of the `object` part.
    pub fn metadata(&self) -> Value {
        json!({
            "targetFileProperty": {
                "id": self.object_id,
                "objectType": self.object_type,
                "propertyName": self.field_name,
            }
        })
    }
}

/// Encoded multipart bytes surrounding the file contents.
#[derive(Debug, Clone)]
pub struct MultipartEnvelope {
    boundary: String,
    head: Vec<u8>,
    tail: Vec<u8>,
}

impl MultipartEnvelope {
    /// Encode the `object` and `filename` parts and the header of the
    /// `file` part.
    pub fn new(boundary: impl Into<String>, metadata: &str, file_name: &str) -> Self {
        let boundary = boundary.into();
        let mut head = Vec::new();
        push_text_part(&mut head, &boundary, "object", metadata);
        push_text_part(&mut head, &boundary, "filename", file_name);
        head.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        head.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                escape_quoted(file_name)
            )
            .as_bytes(),
        );
        head.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");

        let tail = format!("\r\n--{}--\r\n", boundary).into_bytes();
        Self {
            boundary,
            head,
            tail,
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn head(&self) -> &[u8] {
        &self.head
    }

    pub fn tail(&self) -> &[u8] {
        &self.tail
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Total body length for a file of `file_len` bytes.
    pub fn content_length(&self, file_len: u64) -> u64 {
        self.head.len() as u64 + file_len + self.tail.len() as u64
    }
}

fn push_text_part(buf: &mut Vec<u8>, boundary: &str, name: &str, value: &str) {
    buf.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    buf.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
    );
    buf.extend_from_slice(value.as_bytes());
    buf.extend_from_slice(b"\r\n");
}

fn escape_quoted(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn gen_boundary() -> String {
    format!("------------------------{}", Uuid::new_v4().simple())
}

fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| Error::Config(format!("'{}' does not name a file", path.display())))
}

impl Executor {
    /// Upload a local file as an attachment of a data-store object.
    ///
    /// The file is opened and measured before any network I/O, so a missing
    /// or unreadable file fails with [`Error::Io`] without contacting the
    /// server. Only [`UPLOAD_SUCCESS_STATUS`] counts as success.
    pub async fn upload_file(&self, descriptor: MultipartUploadDescriptor) -> Result<Response> {
        let file_name = file_name_of(&descriptor.file_path)?;
        let path = descriptor.file_path.as_path();
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| Error::io(path, e))?;
        let meta = file.metadata().await.map_err(|e| Error::io(path, e))?;
        if !meta.is_file() {
            return Err(Error::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }

        let url = descriptor.url()?;
        let envelope = MultipartEnvelope::new(
            gen_boundary(),
            &descriptor.metadata().to_string(),
            &file_name,
        );

        let mut headers = descriptor.headers.clone();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(&envelope.content_type())
                .map_err(|_| Error::InvalidHeader(CONTENT_TYPE.to_string()))?,
        );
        headers.insert(
            CONTENT_LENGTH,
            HeaderValue::from(envelope.content_length(meta.len())),
        );
        self.log(RequestSummary::new("upload", "POST", url.as_str(), &headers));

        let head = Bytes::from(envelope.head);
        let tail = Bytes::from(envelope.tail);
        let body = stream::iter([Ok::<Bytes, std::io::Error>(head)])
            .chain(ReaderStream::new(file))
            .chain(stream::iter([Ok(tail)]));

        let response = self
            .http()
            .post(url)
            .headers(headers)
            .body(reqwest::Body::wrap_stream(body))
            .send()
            .await?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;

        if status == UPLOAD_SUCCESS_STATUS {
            let body = Payload::Json(serde_json::from_slice(&bytes)?);
            Ok(Response {
                status,
                headers,
                body,
            })
        } else {
            tracing::warn!(status, file = %path.display(), "file upload rejected");
            let body = Payload::decode(content_type(&headers), &bytes)?;
            Err(Error::Remote { status, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(envelope: &MultipartEnvelope, contents: &[u8]) -> Vec<u8> {
        let mut body = envelope.head().to_vec();
        body.extend_from_slice(contents);
        body.extend_from_slice(envelope.tail());
        body
    }

    #[test]
    fn test_metadata_shape() {
        let desc = MultipartUploadDescriptor {
            scheme: Scheme::Https,
            host: "api.engin.io".into(),
            path: "/v1/files/".into(),
            headers: HeaderMap::new(),
            object_id: "abc123".into(),
            object_type: "objects.contacts".into(),
            field_name: "someData".into(),
            file_path: PathBuf::from("/tmp/data.txt"),
        };
        assert_eq!(
            desc.metadata(),
            json!({"targetFileProperty": {
                "id": "abc123",
                "objectType": "objects.contacts",
                "propertyName": "someData"
            }})
        );
    }

    #[test]
    fn test_parts_in_fixed_order() {
        let envelope = MultipartEnvelope::new("XYZ", "{\"a\":1}", "data.txt");
        let body = String::from_utf8(encode(&envelope, b"0123456789")).unwrap();

        let object = body.find("name=\"object\"").unwrap();
        let filename = body.find("name=\"filename\"").unwrap();
        let file = body.find("name=\"file\";").unwrap();
        assert!(object < filename && filename < file);

        assert!(body.starts_with("--XYZ\r\n"));
        assert!(body.ends_with("\r\n--XYZ--\r\n"));
        assert_eq!(body.matches("--XYZ\r\n").count(), 3);
        assert!(body.contains("\r\n\r\ndata.txt\r\n"));
        assert!(body.contains("\r\n\r\n0123456789\r\n--XYZ--"));
    }

    #[test]
    fn test_content_length_counts_envelope() {
        let envelope = MultipartEnvelope::new("XYZ", "{}", "f.bin");
        let contents = [7u8; 10];
        let encoded = encode(&envelope, &contents);
        assert_eq!(envelope.content_length(10), encoded.len() as u64);
        assert!(envelope.content_length(10) > 10);
    }

    #[test]
    fn test_file_name_is_escaped() {
        let envelope = MultipartEnvelope::new("B", "{}", "we\"ird.txt");
        let head = String::from_utf8(envelope.head().to_vec()).unwrap();
        assert!(head.contains("filename=\"we\\\"ird.txt\""));
    }

    #[test]
    fn test_generated_boundaries_differ() {
        assert_ne!(gen_boundary(), gen_boundary());
    }

    #[tokio::test]
    async fn test_missing_file_fails_before_network() {
        let executor = Executor::new().unwrap();
        let desc = MultipartUploadDescriptor {
            scheme: Scheme::Http,
            // Unroutable; reaching the network would surface as Transport.
            host: "127.0.0.1:9".into(),
            path: "/v1/files/".into(),
            headers: HeaderMap::new(),
            object_id: "abc123".into(),
            object_type: "objects.contacts".into(),
            field_name: "someData".into(),
            file_path: PathBuf::from("/nonexistent/qtc/data.txt"),
        };
        let err = executor.upload_file(desc).await.unwrap_err();
        assert!(matches!(err, Error::Io { .. }), "got {err:?}");
    }
}
