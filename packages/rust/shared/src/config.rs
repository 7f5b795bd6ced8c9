//! Application configuration for swinventory.
//!
//! User config lives at `~/.swinventory/swinventory.toml` unless a path is
//! given explicitly. Environment variables and CLI flags override config file
//! values, which override defaults.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{InventoryError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "swinventory.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".swinventory";

/// Default SWQL query: Orion nodes joined with their custom properties.
///
/// Field lookup is case-sensitive, so the custom property is aliased to the
/// `Asset_group` name used by the default field lists.
pub const DEFAULT_QUERY: &str = "SELECT CP.Asset_Group AS Asset_group, SysName, DNS, IP, MachineType FROM Orion.Nodes as N JOIN Orion.NodesCustomProperties as CP on N.NodeID = CP.NodeID";

/// Default category definition in compact form.
pub const DEFAULT_CATEGORIES: &str =
    "Windows;Linux:Linux,Red Hat,Debian;Network:Cisco,Catalyst;Other:";

// ---------------------------------------------------------------------------
// Config structs (matching swinventory.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Connection settings for the SolarWinds Information Service.
    #[serde(default)]
    pub solarwinds: SolarWindsConfig,

    /// Field mapping and grouping rules.
    #[serde(default)]
    pub inventory: InventoryConfig,
}

/// `[solarwinds]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolarWindsConfig {
    /// Network address (and optional port) of the SolarWinds server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// User for the REST API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Name of the env var holding the password (never store the password itself).
    #[serde(default = "default_password_env")]
    pub password_env: String,

    /// SWQL query sent to the server.
    #[serde(default = "default_query")]
    pub query: String,

    /// Whether to verify the server's TLS certificate.
    #[serde(default = "default_true")]
    pub validate_certs: bool,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SolarWindsConfig {
    fn default() -> Self {
        Self {
            host: None,
            username: None,
            password_env: default_password_env(),
            query: default_query(),
            validate_certs: true,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_password_env() -> String {
    "SOLARWINDS_PASSWORD".into()
}
fn default_query() -> String {
    DEFAULT_QUERY.into()
}
fn default_true() -> bool {
    true
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[inventory]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Record field used as the inventory hostname.
    #[serde(default = "default_hostname_field")]
    pub hostname_field: String,

    /// Record field matched against category substrings.
    #[serde(default = "default_category_field")]
    pub category_field: String,

    /// Record fields copied into each host's variables.
    #[serde(default = "default_hostvar_fields")]
    pub hostvar_fields: Vec<String>,

    /// Record fields whose values become additional groups.
    #[serde(default = "default_group_on_fields")]
    pub group_on_fields: Vec<String>,

    /// Categories in compact form, e.g. `Windows;Linux:Linux,Red Hat;Other:`.
    #[serde(default = "default_categories_definition")]
    pub categories_definition: String,

    /// Group variables keyed by category name (or `all`).
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub category_vars: IndexMap<String, IndexMap<String, serde_json::Value>>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            hostname_field: default_hostname_field(),
            category_field: default_category_field(),
            hostvar_fields: default_hostvar_fields(),
            group_on_fields: default_group_on_fields(),
            categories_definition: default_categories_definition(),
            category_vars: IndexMap::new(),
        }
    }
}

fn default_hostname_field() -> String {
    "DNS".into()
}
fn default_category_field() -> String {
    "MachineType".into()
}
fn default_hostvar_fields() -> Vec<String> {
    vec!["DNS".into(), "IP".into(), "Asset_group".into()]
}
fn default_group_on_fields() -> Vec<String> {
    vec!["Asset_group".into(), "MachineType".into()]
}
fn default_categories_definition() -> String {
    DEFAULT_CATEGORIES.into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.swinventory/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| InventoryError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.swinventory/swinventory.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| InventoryError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        InventoryError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| InventoryError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| InventoryError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| InventoryError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the SolarWinds password from the env var named in the config.
pub fn resolve_password(config: &SolarWindsConfig) -> Result<String> {
    let var_name = &config.password_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(InventoryError::config(format!(
            "SolarWinds password not found. Set the {var_name} environment variable."
        ))),
    }
}

/// Split a comma-separated field list as accepted from env vars and flags.
///
/// An empty string or `False` (any case) yields an empty list, meaning
/// "no fields".
pub fn parse_field_list(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("false") {
        return Vec::new();
    }

    trimmed
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(String::from)
        .collect()
}
