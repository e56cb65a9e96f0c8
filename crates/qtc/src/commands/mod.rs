//! CLI command handlers.

pub mod eds;
pub mod mar;
pub mod mws;
pub mod platform;

use anyhow::{Context as _, Result};
use console::Style;
use qtc_client::CallOptions;
use qtc_config::QtcConfig;
use serde_json::Value;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded service configuration.
    pub config: QtcConfig,
    /// Per-call access token override.
    pub token: Option<String>,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    pub fn call_options(&self) -> CallOptions {
        CallOptions {
            access_token: self.token.clone(),
        }
    }
}

/// Parse a JSON command-line argument.
pub fn parse_json(raw: &str, what: &str) -> Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("invalid JSON for {}: {}", what, raw))
}

/// Parse an optional JSON argument.
pub fn parse_json_opt(raw: Option<&str>, what: &str) -> Result<Option<Value>> {
    raw.map(|raw| parse_json(raw, what)).transpose()
}

/// Print a result as pretty JSON on stdout.
pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a short status line on stderr, dimmed.
pub fn note(ctx: &Context, message: &str) {
    if ctx.verbose {
        eprintln!("{}", Style::new().dim().apply_to(message));
    }
}
