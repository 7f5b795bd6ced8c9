//! Inventory builder for swinventory.
//!
//! Turns a flat SolarWinds result set into a grouped inventory document:
//! host-variable extraction, category classification, field-based grouping,
//! and assembly. [`pipeline`] wires this to the record source for the
//! `--list` and `--host` modes.

pub mod assembler;
pub mod builder;
pub mod classify;
pub mod grouping;
pub mod hostvars;
pub mod pipeline;
pub mod policy;

pub use builder::build;
pub use policy::{Category, InventoryPolicy, parse_categories};
