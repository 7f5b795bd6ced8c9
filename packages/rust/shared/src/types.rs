//! Core data model: flat query records and the grouped inventory document.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::{InventoryError, Result};

/// Host variable that always carries the host's identity.
pub const ANSIBLE_HOST_VAR: &str = "ansible_host";

/// Name of the synthetic root group.
pub const ALL_GROUP: &str = "all";

/// Top-level key holding per-host variables.
pub const META_KEY: &str = "_meta";

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One flat result row from the upstream query (field name -> value).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, String>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a field value.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Look up a field that the configuration requires to be present.
    ///
    /// `index` is the record's position in the result set, used only for
    /// the error message.
    pub fn require(&self, field: &str, index: usize) -> Result<&str> {
        self.get(field)
            .ok_or_else(|| InventoryError::missing_field(field, index))
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// HostVars
// ---------------------------------------------------------------------------

/// Variables attached to one host under `_meta.hostvars`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostVars(IndexMap<String, String>);

impl HostVars {
    /// Start a variable set seeded with `ansible_host = identity`.
    pub fn for_host(identity: &str) -> Self {
        let mut vars = IndexMap::new();
        vars.insert(ANSIBLE_HOST_VAR.to_string(), identity.to_string());
        Self(vars)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Overlay `other` onto `self`; colliding keys take `other`'s value.
    pub fn merge(&mut self, other: HostVars) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Group
// ---------------------------------------------------------------------------

/// A named node in the inventory tree.
///
/// `hosts` and `children` are insertion-ordered sets: adding an existing
/// member is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub hosts: IndexSet<String>,
    #[serde(default)]
    pub children: IndexSet<String>,
    #[serde(default)]
    pub vars: IndexMap<String, serde_json::Value>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a host. Returns `false` if it was already a member.
    pub fn add_host(&mut self, host: impl Into<String>) -> bool {
        self.hosts.insert(host.into())
    }

    /// Add a child group. Returns `false` if it was already a child.
    pub fn add_child(&mut self, child: impl Into<String>) -> bool {
        self.children.insert(child.into())
    }

    /// Union another group into this one. Existing members and vars are
    /// never dropped; colliding var names take `other`'s value.
    pub fn merge(&mut self, other: Group) {
        self.hosts.extend(other.hosts);
        self.children.extend(other.children);
        self.vars.extend(other.vars);
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty() && self.children.is_empty() && self.vars.is_empty()
    }
}

// ---------------------------------------------------------------------------
// InventoryDocument
// ---------------------------------------------------------------------------

/// The `_meta` block of an inventory document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryMeta {
    #[serde(default)]
    pub hostvars: IndexMap<String, HostVars>,
}

/// The full inventory handed to the orchestrator.
///
/// Serializes as `{"_meta": {"hostvars": {..}}, "<group>": {..}, ..}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryDocument {
    #[serde(rename = "_meta")]
    pub meta: InventoryMeta,
    #[serde(flatten)]
    pub groups: IndexMap<String, Group>,
}

impl InventoryDocument {
    /// The document returned for host-mode lookups: `{"_meta": {"hostvars": {}}}`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Return the named group, creating it empty if it does not exist yet.
    pub fn ensure(&mut self, name: &str) -> &mut Group {
        self.groups.entry(name.to_string()).or_default()
    }

    /// Merge `group` into the group called `name` (created if absent).
    pub fn merge_group(&mut self, name: &str, group: Group) {
        self.ensure(name).merge(group);
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    pub fn hostvars(&self, host: &str) -> Option<&HostVars> {
        self.meta.hostvars.get(host)
    }

    /// Verify the document is consumable: every host listed in a group has
    /// an entry in `_meta.hostvars`, every child names a top-level group, and
    /// no group reaches itself through `children`.
    pub fn check_integrity(&self) -> Result<()> {
        if self.groups.contains_key(META_KEY) {
            return Err(InventoryError::validation(format!(
                "group name '{META_KEY}' is reserved"
            )));
        }

        for (name, group) in &self.groups {
            if let Some(host) = group
                .hosts
                .iter()
                .find(|h| !self.meta.hostvars.contains_key(h.as_str()))
            {
                return Err(InventoryError::validation(format!(
                    "group '{name}' lists host '{host}' which has no hostvars entry"
                )));
            }
            if let Some(child) = group
                .children
                .iter()
                .find(|c| !self.groups.contains_key(c.as_str()))
            {
                return Err(InventoryError::validation(format!(
                    "group '{name}' references undefined child group '{child}'"
                )));
            }
        }

        let mut on_path = HashMap::new();
        for name in self.groups.keys() {
            if self.reaches_cycle(name, &mut on_path) {
                return Err(InventoryError::validation(format!(
                    "group '{name}' leads into a child group cycle"
                )));
            }
        }

        Ok(())
    }

    /// Depth-first walk over `children`. `on_path` maps visited groups to
    /// whether they are on the current walk.
    fn reaches_cycle<'a>(&'a self, name: &'a str, on_path: &mut HashMap<&'a str, bool>) -> bool {
        if let Some(&active) = on_path.get(name) {
            return active;
        }

        on_path.insert(name, true);
        if let Some(group) = self.groups.get(name) {
            for child in &group.children {
                if self.reaches_cycle(child, on_path) {
                    return true;
                }
            }
        }
        on_path.insert(name, false);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_serialization() {
        let json = serde_json::to_string(&InventoryDocument::empty()).expect("serialize");
        assert_eq!(json, r#"{"_meta":{"hostvars":{}}}"#);
    }

    #[test]
    fn document_serializes_meta_then_groups() {
        let mut doc = InventoryDocument::empty();
        doc.meta
            .hostvars
            .insert("h1".into(), HostVars::for_host("h1"));
        doc.ensure(ALL_GROUP).add_child("Linux");
        doc.ensure("Linux").add_host("h1");

        let json = serde_json::to_string(&doc).expect("serialize");
        assert_eq!(
            json,
            r#"{"_meta":{"hostvars":{"h1":{"ansible_host":"h1"}}},"all":{"hosts":[],"children":["Linux"],"vars":{}},"Linux":{"hosts":["h1"],"children":[],"vars":{}}}"#
        );

        let parsed: InventoryDocument = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, doc);
    }

    #[test]
    fn group_add_is_idempotent() {
        let mut group = Group::new();
        assert!(group.add_host("h1"));
        assert!(!group.add_host("h1"));
        assert!(group.add_child("web"));
        assert!(!group.add_child("web"));
        assert_eq!(group.hosts.len(), 1);
        assert_eq!(group.children.len(), 1);
    }

    #[test]
    fn group_merge_unions_without_reset() {
        let mut doc = InventoryDocument::empty();
        doc.ensure("web").add_host("h1");

        let mut incoming = Group::new();
        incoming.add_host("h1");
        incoming.add_host("h2");
        doc.merge_group("web", incoming);

        let hosts: Vec<&str> = doc.groups["web"].hosts.iter().map(String::as_str).collect();
        assert_eq!(hosts, vec!["h1", "h2"]);
    }

    #[test]
    fn hostvars_merge_last_write_wins() {
        let mut first = HostVars::for_host("h1");
        first.set("IP", "10.0.0.1");
        let mut second = HostVars::for_host("h1");
        second.set("IP", "10.0.0.2");

        first.merge(second);
        assert_eq!(first.get("IP"), Some("10.0.0.2"));
        assert_eq!(first.get(ANSIBLE_HOST_VAR), Some("h1"));
    }

    #[test]
    fn record_require_reports_index() {
        let record: Record = [("DNS", "h1")].into_iter().collect();
        assert_eq!(record.require("DNS", 0).expect("present"), "h1");

        let err = record.require("IP", 7).unwrap_err();
        assert!(matches!(
            err,
            InventoryError::MissingField { ref field, record: 7 } if field == "IP"
        ));
    }

    #[test]
    fn integrity_rejects_dangling_references() {
        let mut doc = InventoryDocument::empty();
        doc.ensure("Linux").add_host("ghost");
        assert!(doc.check_integrity().is_err());

        let mut doc = InventoryDocument::empty();
        doc.ensure(ALL_GROUP).add_child("Missing");
        let err = doc.check_integrity().unwrap_err();
        assert!(err.to_string().contains("Missing"));
    }

    #[test]
    fn integrity_rejects_child_cycles() {
        let mut doc = InventoryDocument::empty();
        doc.ensure(ALL_GROUP).add_child("Other");
        doc.ensure("Other").add_child(ALL_GROUP);
        let err = doc.check_integrity().unwrap_err();
        assert!(err.to_string().contains("cycle"));

        let mut doc = InventoryDocument::empty();
        doc.ensure("web").add_child("web");
        assert!(doc.check_integrity().is_err());

        // Shared children are not cycles.
        let mut doc = InventoryDocument::empty();
        doc.ensure(ALL_GROUP).add_child("Linux");
        doc.ensure(ALL_GROUP).add_child("Network");
        doc.ensure("Linux").add_child("lab");
        doc.ensure("Network").add_child("lab");
        doc.ensure("lab");
        assert!(doc.check_integrity().is_ok());
    }
}
