//! Request logging collaborator.
//!
//! Clients echo every outgoing descriptor through a [`RequestLogger`] handed
//! to them at construction. The `debug` flag of a service config selects
//! [`TracingRequestLogger`]; otherwise [`SilentRequestLogger`] is used.

use reqwest::header::{AUTHORIZATION, HeaderMap};

/// What a logger sees of an outgoing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSummary {
    /// `request`, `upload` or `download`.
    pub kind: &'static str,
    pub method: &'static str,
    pub url: String,
    /// Header pairs with credentials redacted.
    pub headers: Vec<(String, String)>,
}

impl RequestSummary {
    pub(crate) fn new(
        kind: &'static str,
        method: &'static str,
        url: impl Into<String>,
        headers: &HeaderMap,
    ) -> Self {
        let headers = headers
            .iter()
            .map(|(name, value)| {
                let value = if *name == AUTHORIZATION {
                    "Bearer ***".to_string()
                } else {
                    value.to_str().unwrap_or("<binary>").to_string()
                };
                (name.as_str().to_string(), value)
            })
            .collect();
        Self {
            kind,
            method,
            url: url.into(),
            headers,
        }
    }
}

/// Sink for outgoing request summaries.
pub trait RequestLogger: Send + Sync {
    fn log_request(&self, summary: &RequestSummary);
}

/// Emits summaries as `tracing` debug events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRequestLogger;

impl RequestLogger for TracingRequestLogger {
    fn log_request(&self, summary: &RequestSummary) {
        tracing::debug!(
            kind = summary.kind,
            method = summary.method,
            url = %summary.url,
            headers = ?summary.headers,
            "outgoing request"
        );
    }
}

/// Discards summaries.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentRequestLogger;

impl RequestLogger for SilentRequestLogger {
    fn log_request(&self, _summary: &RequestSummary) {}
}
