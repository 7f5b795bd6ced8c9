//! SolarWinds Information Service (SWIS) record source.
//!
//! Sends one SWQL query to the SWIS JSON endpoint and returns the result rows
//! as flat [`Record`]s. There is no pagination and no retry: a failed fetch
//! aborts the invocation before any inventory is built.

mod parser;

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use swinventory_shared::{InventoryError, Record, Result, SolarWindsConfig, resolve_password};
use tracing::{debug, info, instrument};
use url::Url;

pub use parser::parse_query_response;

/// Fixed SWIS path for JSON queries.
pub const QUERY_PATH: &str = "/SolarWinds/InformationService/v3/Json/Query";

/// User-Agent string for query requests.
const USER_AGENT: &str = concat!("swinventory/", env!("CARGO_PKG_VERSION"));

/// Matches hosts that already carry an HTTP(S) scheme.
static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("scheme regex"));

// ---------------------------------------------------------------------------
// Source options
// ---------------------------------------------------------------------------

/// Resolved connection settings for one query.
#[derive(Clone)]
pub struct SourceOptions {
    /// Server address, with or without scheme and port.
    pub host: String,
    pub username: String,
    pub password: String,
    /// SWQL query, passed through uninterpreted.
    pub query: String,
    pub validate_certs: bool,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for SourceOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceOptions")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("query", &self.query)
            .field("validate_certs", &self.validate_certs)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl SourceOptions {
    /// Build options from the `[solarwinds]` config section, reading the
    /// password from the configured env var.
    pub fn from_config(config: &SolarWindsConfig) -> Result<Self> {
        let host = required(config.host.as_deref(), "host", "SOLARWINDS_HOST")?;
        let username = required(config.username.as_deref(), "username", "SOLARWINDS_USERNAME")?;
        let password = resolve_password(config)?;

        Ok(Self {
            host,
            username,
            password,
            query: config.query.clone(),
            validate_certs: config.validate_certs,
            timeout_secs: config.timeout_secs,
        })
    }
}

fn required(value: Option<&str>, key: &str, env_var: &str) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(InventoryError::config(format!(
            "SolarWinds {key} is not set. Set [solarwinds].{key} or the {env_var} environment variable."
        ))),
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Run the configured query and return its rows as records.
#[instrument(skip_all, fields(host = %opts.host))]
pub async fn fetch_records(opts: &SourceOptions) -> Result<Vec<Record>> {
    let url = query_url(&opts.host)?;
    let client = build_client(opts)?;

    info!(%url, "querying SolarWinds");
    debug!(query = %opts.query, "SWQL query");

    let response = client
        .get(url.clone())
        .query(&[("query", opts.query.as_str())])
        .basic_auth(&opts.username, Some(&opts.password))
        .send()
        .await
        .map_err(|e| {
            InventoryError::RemoteFetch(format!("connection to {url} failed: {e}"))
        })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        InventoryError::RemoteFetch(format!("{url}: failed to read body: {e}"))
    })?;

    if !status.is_success() {
        let mut message = format!("{url}: HTTP {status}");
        // Surface SWIS's own error text when it sends one.
        let detail = body.trim();
        if !detail.is_empty() {
            message.push_str(&format!(" with message: {detail}"));
        }
        return Err(InventoryError::RemoteFetch(message));
    }

    let records = parse_query_response(&body)?;
    info!(records = records.len(), "query returned records");

    Ok(records)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build the SWIS query URL for a host, defaulting to `https://`.
pub fn query_url(host: &str) -> Result<Url> {
    let host = host.trim();
    let base = if SCHEME_RE.is_match(host) {
        host.to_string()
    } else {
        format!("https://{host}")
    };

    let base = Url::parse(&base)
        .map_err(|e| InventoryError::config(format!("invalid SolarWinds host '{host}': {e}")))?;

    base.join(QUERY_PATH)
        .map_err(|e| InventoryError::config(format!("invalid SolarWinds host '{host}': {e}")))
}

/// Build a reqwest client with appropriate settings.
fn build_client(opts: &SourceOptions) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(std::time::Duration::from_secs(opts.timeout_secs))
        .danger_accept_invalid_certs(!opts.validate_certs)
        .build()
        .map_err(|e| InventoryError::RemoteFetch(format!("failed to build HTTP client: {e}")))
}
