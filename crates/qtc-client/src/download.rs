//! Streaming file download.

use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use futures::StreamExt;
use percent_encoding::percent_decode_str;
use reqwest::header::{AUTHORIZATION, COOKIE, HeaderMap, LOCATION};
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::error::{Error, Result};
use crate::executor::{Executor, content_type};
use crate::logging::RequestSummary;
use crate::request::Payload;

/// A pending download of a (possibly pre-signed) URL to a local path.
#[derive(Debug, Clone)]
pub struct DownloadDescriptor {
    /// Absolute source URL.
    pub source_url: String,
    pub headers: HeaderMap,
    /// Target file, or a directory when it ends with a path separator.
    pub destination: PathBuf,
}

impl DownloadDescriptor {
    pub fn new(source_url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source_url: source_url.into(),
            headers: HeaderMap::new(),
            destination: destination.into(),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// A file written by [`Executor::download_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub path: PathBuf,
    /// Number of bytes written.
    pub bytes: u64,
}

/// Redirect hops a download follows before giving up.
pub const MAX_DOWNLOAD_REDIRECTS: usize = 10;

/// Work out the file a download is written to.
///
/// A destination ending in a path separator is a directory; the last path
/// segment of the source URL (query excluded, percent-decoded) is appended
/// to it.
pub fn resolve_destination(source: &Url, destination: &Path) -> Result<PathBuf> {
    let raw = destination.to_string_lossy();
    if !(raw.ends_with('/') || raw.ends_with(MAIN_SEPARATOR)) {
        return Ok(destination.to_path_buf());
    }

    let no_name = || Error::Config(format!("cannot derive a file name from '{}'", source));
    let segment = source
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .ok_or_else(no_name)?;
    let name = percent_decode_str(segment)
        .decode_utf8()
        .map_err(|_| no_name())?;
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains(MAIN_SEPARATOR)
    {
        return Err(no_name());
    }
    Ok(destination.join(name.as_ref()))
}

fn is_redirect(status: u16) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308)
}

fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}

impl Executor {
    /// Download `source_url` into a local file.
    ///
    /// Redirects are followed (up to [`MAX_DOWNLOAD_REDIRECTS`]); credentials
    /// are dropped once a redirect leaves the original origin. Only status
    /// 200 writes a file; the body is streamed to disk chunk by chunk. Any
    /// other status is an [`Error::Remote`] and nothing is created. A
    /// failure while streaming removes the partial file.
    pub async fn download_file(&self, descriptor: DownloadDescriptor) -> Result<DownloadedFile> {
        let mut url = Url::parse(&descriptor.source_url)?;
        let destination = resolve_destination(&url, &descriptor.destination)?;
        let mut headers = descriptor.headers;

        let mut hops = 0;
        let response = loop {
            self.log(RequestSummary::new("download", "GET", url.as_str(), &headers));
            let response = self
                .http()
                .get(url.clone())
                .headers(headers.clone())
                .send()
                .await?;

            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let location = match location {
                Some(location) if is_redirect(response.status().as_u16()) => location,
                _ => break response,
            };
            if hops == MAX_DOWNLOAD_REDIRECTS {
                return Err(Error::UnexpectedResponse(format!(
                    "too many redirects downloading '{}'",
                    descriptor.source_url
                )));
            }

            let next = url.join(&location)?;
            if !same_origin(&url, &next) {
                headers.remove(AUTHORIZATION);
                headers.remove(COOKIE);
            }
            tracing::debug!(from = %url, to = %next, "following download redirect");
            url = next;
            hops += 1;
        };

        let status = response.status().as_u16();
        if status != 200 {
            let headers = response.headers().clone();
            let bytes = response.bytes().await?;
            let body = Payload::decode(content_type(&headers), &bytes)?;
            return Err(Error::Remote { status, body });
        }

        let mut file = tokio::fs::File::create(&destination)
            .await
            .map_err(|e| Error::io(&destination, e))?;

        match write_body(&mut file, &destination, response).await {
            Ok(bytes) => {
                tracing::debug!(path = %destination.display(), bytes, "download complete");
                Ok(DownloadedFile {
                    path: destination,
                    bytes,
                })
            }
            Err(e) => {
                drop(file);
                if let Err(cleanup) = tokio::fs::remove_file(&destination).await {
                    tracing::warn!(
                        path = %destination.display(),
                        error = %cleanup,
                        "failed to remove partial download"
                    );
                }
                Err(e)
            }
        }
    }
}

async fn write_body(
    file: &mut tokio::fs::File,
    path: &Path,
    response: reqwest::Response,
) -> Result<u64> {
    let mut written: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .map_err(|e| Error::io(path, e))?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(|e| Error::io(path, e))?;
    Ok(written)
}
