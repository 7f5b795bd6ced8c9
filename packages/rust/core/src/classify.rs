//! Category classification.
//!
//! A record belongs to the first category, in declaration order, with a
//! match substring contained in the record's category field. Records that
//! hit nothing fall back to the first catch-all category, or to no category
//! at all when none is declared.

use indexmap::IndexMap;

use swinventory_shared::{Record, Result};

use crate::hostvars::host_identity;
use crate::policy::Category;

/// Case-sensitive substring match of `value` against any of `substrings`.
pub fn matches(value: &str, substrings: &[String]) -> bool {
    substrings.iter().any(|s| value.contains(s.as_str()))
}

/// Pick the category for a category-field value.
pub fn categorize<'a>(value: &str, categories: &'a [Category]) -> Option<&'a Category> {
    categories
        .iter()
        .find(|c| !c.is_catch_all() && matches(value, &c.matches))
        .or_else(|| categories.iter().find(|c| c.is_catch_all()))
}

/// Classify one record. `index` is only used for error reporting.
pub fn classify_record<'a>(
    record: &Record,
    index: usize,
    category_field: &str,
    categories: &'a [Category],
) -> Result<Option<&'a Category>> {
    let value = record.require(category_field, index)?;
    Ok(categorize(value, categories))
}

/// Classify every record, keyed by hostname.
///
/// On duplicate hostnames the later record's classification wins.
pub fn classify(
    records: &[Record],
    hostname_field: &str,
    category_field: &str,
    categories: &[Category],
) -> Result<IndexMap<String, Option<String>>> {
    let mut assigned = IndexMap::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let host = host_identity(record, hostname_field, index)?;
        let category = classify_record(record, index, category_field, categories)?;
        assigned.insert(host.to_string(), category.map(|c| c.name.clone()));
    }

    Ok(assigned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::parse_categories;
    use swinventory_shared::{DEFAULT_CATEGORIES, InventoryError};

    fn record(host: &str, machine_type: &str) -> Record {
        [("DNS", host), ("MachineType", machine_type)]
            .into_iter()
            .collect()
    }

    fn defaults() -> Vec<Category> {
        parse_categories(DEFAULT_CATEGORIES).unwrap()
    }

    #[test]
    fn matches_is_case_sensitive_substring() {
        let subs = vec!["Red Hat".to_string(), "Debian".to_string()];
        assert!(matches("Red Hat Enterprise Linux", &subs));
        assert!(matches("Debian", &subs));
        assert!(!matches("red hat", &subs));
        assert!(!matches("Ubuntu", &subs));
        assert!(!matches("anything", &[]));
    }

    #[test]
    fn first_declared_match_wins() {
        let categories = vec![Category::new("A", ["x"]), Category::new("B", ["x", "y"])];
        let picked = categorize("xy", &categories).unwrap();
        assert_eq!(picked.name, "A");

        let picked = categorize("y", &categories).unwrap();
        assert_eq!(picked.name, "B");
    }

    #[test]
    fn declaration_order_not_alphabetical() {
        let categories = parse_categories("Zeta:Linux;Alpha:Linux").unwrap();
        assert_eq!(categorize("Linux", &categories).unwrap().name, "Zeta");
    }

    #[test]
    fn catch_all_is_fallback_even_when_declared_first() {
        let categories = parse_categories("Other:;Linux:Linux").unwrap();
        assert_eq!(categorize("Linux 5.x", &categories).unwrap().name, "Linux");
        assert_eq!(categorize("Solaris", &categories).unwrap().name, "Other");
    }

    #[test]
    fn unmatched_without_catch_all_is_unassigned() {
        let categories = parse_categories("Windows;Linux:Linux").unwrap();
        assert!(categorize("Cisco IOS", &categories).is_none());
    }

    #[test]
    fn classify_default_categories() {
        let records = vec![
            record("h1", "Red Hat Linux"),
            record("h2", "Cisco Switch"),
            record("h3", "Windows 2019 Server"),
            record("h4", "APC UPS"),
        ];
        let assigned = classify(&records, "DNS", "MachineType", &defaults()).unwrap();

        assert_eq!(assigned["h1"].as_deref(), Some("Linux"));
        assert_eq!(assigned["h2"].as_deref(), Some("Network"));
        assert_eq!(assigned["h3"].as_deref(), Some("Windows"));
        assert_eq!(assigned["h4"].as_deref(), Some("Other"));
    }

    #[test]
    fn classify_fails_on_missing_category_field() {
        let records = vec![[("DNS", "h1")].into_iter().collect::<Record>()];
        let err = classify(&records, "DNS", "MachineType", &defaults()).unwrap_err();
        assert!(matches!(
            err,
            InventoryError::MissingField { ref field, record: 0 } if field == "MachineType"
        ));
    }
}
