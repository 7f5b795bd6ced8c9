//! Host-variable extraction.

use indexmap::IndexMap;
use tracing::debug;

use swinventory_shared::{HostVars, InventoryError, Record, Result};

/// Read a record's host identity. An empty identity is treated like a
/// missing field, since it cannot serve as a host key.
pub fn host_identity<'a>(record: &'a Record, hostname_field: &str, index: usize) -> Result<&'a str> {
    let identity = record.require(hostname_field, index)?;
    if identity.is_empty() {
        return Err(InventoryError::missing_field(hostname_field, index));
    }
    Ok(identity)
}

/// Build `_meta.hostvars` from the record sequence.
///
/// Each host gets `ansible_host` plus every field in `hostvar_fields`
/// copied verbatim. When two records share a hostname, the later record's
/// values win for colliding keys.
pub fn extract(
    records: &[Record],
    hostname_field: &str,
    hostvar_fields: &[String],
) -> Result<IndexMap<String, HostVars>> {
    let mut hostvars: IndexMap<String, HostVars> = IndexMap::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let identity = host_identity(record, hostname_field, index)?;

        let mut vars = HostVars::for_host(identity);
        for field in hostvar_fields {
            vars.set(field.as_str(), record.require(field, index)?);
        }

        match hostvars.get_mut(identity) {
            Some(existing) => {
                debug!(host = identity, record = index, "duplicate hostname, overlaying vars");
                existing.merge(vars);
            }
            None => {
                hostvars.insert(identity.to_string(), vars);
            }
        }
    }

    Ok(hostvars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use swinventory_shared::ANSIBLE_HOST_VAR;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn extract_copies_configured_fields() {
        let records = vec![
            [("DNS", "h1"), ("IP", "10.0.0.1"), ("Asset_group", "web"), ("NodeID", "7")]
                .into_iter()
                .collect::<Record>(),
        ];
        let hostvars = extract(&records, "DNS", &fields(&["DNS", "IP", "Asset_group"])).unwrap();

        let vars = &hostvars["h1"];
        assert_eq!(vars.get(ANSIBLE_HOST_VAR), Some("h1"));
        assert_eq!(vars.get("IP"), Some("10.0.0.1"));
        assert_eq!(vars.get("Asset_group"), Some("web"));
        assert_eq!(vars.get("NodeID"), None);

        let keys: Vec<&str> = vars.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["ansible_host", "DNS", "IP", "Asset_group"]);
    }

    #[test]
    fn extract_with_no_hostvar_fields() {
        let records = vec![[("SysName", "sw1")].into_iter().collect::<Record>()];
        let hostvars = extract(&records, "SysName", &[]).unwrap();
        assert_eq!(hostvars["sw1"].iter().count(), 1);
    }

    #[test]
    fn extract_keeps_empty_values() {
        let records = vec![[("DNS", "h1"), ("IP", "")].into_iter().collect::<Record>()];
        let hostvars = extract(&records, "DNS", &fields(&["IP"])).unwrap();
        assert_eq!(hostvars["h1"].get("IP"), Some(""));
    }

    #[test]
    fn extract_last_record_wins() {
        let records = vec![
            [("DNS", "h1"), ("IP", "10.0.0.1")].into_iter().collect::<Record>(),
            [("DNS", "h2"), ("IP", "10.0.0.2")].into_iter().collect::<Record>(),
            [("DNS", "h1"), ("IP", "10.0.0.9")].into_iter().collect::<Record>(),
        ];
        let hostvars = extract(&records, "DNS", &fields(&["IP"])).unwrap();

        assert_eq!(hostvars.len(), 2);
        assert_eq!(hostvars["h1"].get("IP"), Some("10.0.0.9"));
        let order: Vec<&str> = hostvars.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["h1", "h2"]);
    }

    #[test]
    fn extract_fails_on_missing_hostname_field() {
        let records = vec![
            [("DNS", "h1")].into_iter().collect::<Record>(),
            [("IP", "10.0.0.2")].into_iter().collect::<Record>(),
        ];
        let err = extract(&records, "DNS", &[]).unwrap_err();
        assert!(matches!(
            err,
            InventoryError::MissingField { ref field, record: 1 } if field == "DNS"
        ));
    }

    #[test]
    fn extract_fails_on_missing_hostvar_field() {
        let records = vec![[("DNS", "h1")].into_iter().collect::<Record>()];
        let err = extract(&records, "DNS", &fields(&["IP"])).unwrap_err();
        assert!(err.to_string().contains("'IP'"));
    }

    #[test]
    fn extract_rejects_empty_identity() {
        let records = vec![[("DNS", "")].into_iter().collect::<Record>()];
        assert!(extract(&records, "DNS", &[]).is_err());
    }
}
