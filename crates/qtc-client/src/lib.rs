//! HTTP client SDK for Qt Cloud Services.
//!
//! This crate provides typed, async clients for the data store (EDS), the
//! socket gateway (MWS), the application runtime (MAR) and the account
//! platform, on top of a small request layer that can also be used on its
//! own.
//!
//! # Example
//!
//! ```no_run
//! use qtc_client::{CallOptions, Eds, EdsConfig, QueryOptions, Result};
//! use serde_json::json;
//!
//! # async fn example() -> Result<()> {
//! let eds = Eds::new(
//!     EdsConfig::new("524d53a6e5bde570640010b3").with_secret("my-secret"),
//! )?;
//!
//! let todos = eds.collection("todos");
//! let todo = todos.insert(&json!({"title": "Write docs"}), CallOptions::default()).await?;
//!
//! let open = todos
//!     .find(&QueryOptions::new().filter(json!({"done": false})), CallOptions::default())
//!     .await?;
//! println!("{} open, newest {}", open.len(), todo["id"]);
//!
//! todos
//!     .attach_file(todo["id"].as_str().unwrap_or_default(), "attachment", "notes.txt", Default::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Layers
//!
//! - **Executor**: one HTTP request per [`RequestDescriptor`], multipart
//!   uploads and streaming downloads
//! - **Query builder**: [`QueryOptions`] to find query strings
//! - **Resource clients**: [`Eds`], [`Mws`], [`Mar`], [`Platform`]

pub mod client;
pub mod config;
pub mod download;
pub mod eds;
pub mod error;
pub mod executor;
pub mod logging;
pub mod mar;
pub mod multipart;
pub mod mws;
pub mod platform;
pub mod query;
pub mod request;
pub mod types;

pub use client::{Endpoint, SDK_USER_AGENT};
pub use config::{EdsConfig, MarConfig, MwsConfig, PlatformConfig};
pub use download::{DownloadDescriptor, DownloadedFile, resolve_destination};
pub use eds::{Collection, Eds, FindResult};
pub use error::{Error, Result};
pub use executor::{Executor, ExecutorBuilder};
pub use logging::{RequestLogger, RequestSummary, SilentRequestLogger, TracingRequestLogger};
pub use mar::Mar;
pub use multipart::{MultipartUploadDescriptor, UPLOAD_SUCCESS_STATUS};
pub use mws::{Mws, Receivers};
pub use platform::Platform;
pub use query::{QueryOptions, build_query_string};
pub use request::{Method, Payload, RequestDescriptor, Response, Scheme};
pub use types::*;
