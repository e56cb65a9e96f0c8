//! Generic request executor.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::redirect::Policy;

use crate::error::{Error, Result};
use crate::logging::{RequestLogger, RequestSummary, SilentRequestLogger};
use crate::request::{Payload, RequestDescriptor, Response};

/// Issues requests, uploads and downloads.
///
/// Cloning is cheap; clones share the underlying connection pool and logger.
/// No per-call state is kept, so any number of calls may run concurrently.
#[derive(Clone)]
pub struct Executor {
    inner: Arc<ExecutorInner>,
}

struct ExecutorInner {
    http: reqwest::Client,
    logger: Arc<dyn RequestLogger>,
}

impl Executor {
    /// Create an executor that logs nothing.
    pub fn new() -> Result<Self> {
        ExecutorBuilder::new().build()
    }

    /// Create an executor builder.
    pub fn builder() -> ExecutorBuilder {
        ExecutorBuilder::new()
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub(crate) fn log(&self, summary: RequestSummary) {
        self.inner.logger.log_request(&summary);
    }

    /// Perform a single request and buffer its response.
    ///
    /// Statuses 200-399 are returned as `Ok`; redirects are not followed.
    /// Statuses >= 400 become [`Error::Remote`] carrying the decoded body.
    /// A body declared as JSON that fails to parse is an [`Error::Decode`].
    pub async fn execute(&self, descriptor: RequestDescriptor) -> Result<Response> {
        let url = descriptor.url()?;
        let headers = descriptor.outgoing_headers();
        self.log(RequestSummary::new(
            "request",
            descriptor.method.as_str(),
            url.as_str(),
            &headers,
        ));

        let mut request = self
            .inner
            .http
            .request(descriptor.method.into(), url)
            .headers(headers);
        if let Some(body) = descriptor.body {
            request = request.body(body);
        }

        let response = request.send().await?;
        read_response(response).await
    }
}

/// Buffer a response and classify it by status.
pub(crate) async fn read_response(response: reqwest::Response) -> Result<Response> {
    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let bytes = response.bytes().await?;
    let body = Payload::decode(content_type(&headers), &bytes)?;
    classify(status, headers, body)
}

pub(crate) fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
}

pub(crate) fn classify(status: u16, headers: HeaderMap, body: Payload) -> Result<Response> {
    if status >= 400 {
        tracing::debug!(status, "request failed with remote error");
        Err(Error::Remote { status, body })
    } else {
        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

/// Builder for an [`Executor`].
pub struct ExecutorBuilder {
    logger: Arc<dyn RequestLogger>,
    http: Option<reqwest::Client>,
}

impl ExecutorBuilder {
    pub fn new() -> Self {
        Self {
            logger: Arc::new(SilentRequestLogger),
            http: None,
        }
    }

    /// Set the sink for outgoing request summaries.
    pub fn logger(mut self, logger: Arc<dyn RequestLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Use a preconfigured HTTP client.
    ///
    /// The client should not follow redirects, or 3xx responses will be
    /// replaced by their targets.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> Result<Executor> {
        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder().redirect(Policy::none()).build()?,
        };
        Ok(Executor {
            inner: Arc::new(ExecutorInner {
                http,
                logger: self.logger,
            }),
        })
    }
}

impl Default for ExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
