//! Shared types, error model, and configuration for swinventory.
//!
//! This crate is the foundation depended on by all other swinventory crates.
//! It provides:
//! - [`InventoryError`]: the unified error type
//! - Domain types ([`Record`], [`HostVars`], [`Group`], [`InventoryDocument`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_CATEGORIES, DEFAULT_QUERY, InventoryConfig, SolarWindsConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, parse_field_list,
    resolve_password,
};
pub use error::{InventoryError, Result};
pub use types::{
    ALL_GROUP, ANSIBLE_HOST_VAR, Group, HostVars, InventoryDocument, InventoryMeta, META_KEY,
    Record,
};
