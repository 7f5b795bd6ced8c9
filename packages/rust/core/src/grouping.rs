//! Ad hoc groups derived from record field values.

use indexmap::{IndexMap, IndexSet};
use tracing::trace;

use swinventory_shared::{Record, Result};

use crate::hostvars::host_identity;

/// Hosts partitioned by the value of one field, in first-seen order.
pub type FieldGroups = IndexMap<String, IndexSet<String>>;

/// Partition hosts by the value of `field`.
///
/// The field must be present on every record. Records with an empty value
/// are left out, since an empty group name is not addressable.
pub fn group_by_field(records: &[Record], field: &str, hostname_field: &str) -> Result<FieldGroups> {
    let mut groups = FieldGroups::new();

    for (index, record) in records.iter().enumerate() {
        let value = record.require(field, index)?;
        let host = host_identity(record, hostname_field, index)?;

        if value.is_empty() {
            trace!(host, field, "empty group value, skipping");
            continue;
        }

        groups
            .entry(value.to_string())
            .or_default()
            .insert(host.to_string());
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use swinventory_shared::InventoryError;

    fn record(host: &str, group: &str) -> Record {
        [("DNS", host), ("Asset_group", group)].into_iter().collect()
    }

    #[test]
    fn groups_hosts_by_value() {
        let records = vec![record("h1", "web"), record("h2", "db"), record("h3", "web")];
        let groups = group_by_field(&records, "Asset_group", "DNS").unwrap();

        let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["web", "db"]);
        let web: Vec<&str> = groups["web"].iter().map(String::as_str).collect();
        assert_eq!(web, vec!["h1", "h3"]);
    }

    #[test]
    fn duplicate_host_is_listed_once() {
        let records = vec![record("h1", "web"), record("h1", "web")];
        let groups = group_by_field(&records, "Asset_group", "DNS").unwrap();
        assert_eq!(groups["web"].len(), 1);
    }

    #[test]
    fn empty_values_are_skipped() {
        let records = vec![record("h1", ""), record("h2", "web")];
        let groups = group_by_field(&records, "Asset_group", "DNS").unwrap();
        assert_eq!(groups.len(), 1);
        assert!(groups.contains_key("web"));
    }

    #[test]
    fn missing_field_aborts() {
        let records = vec![record("h1", "web"), [("DNS", "h2")].into_iter().collect()];
        let err = group_by_field(&records, "Asset_group", "DNS").unwrap_err();
        assert!(matches!(err, InventoryError::MissingField { record: 1, .. }));
    }
}
