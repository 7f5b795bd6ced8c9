//! Inventory policy: field mapping, grouping rules, and category declarations.
//!
//! An [`InventoryPolicy`] is built once per invocation from the
//! `[inventory]` config section, validated, and then passed by reference
//! into every build step.

use indexmap::IndexMap;
use tracing::debug;

use swinventory_shared::{ALL_GROUP, InventoryConfig, InventoryError, META_KEY, Result};

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// A named classification bucket with ordered match substrings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    /// Case-sensitive substrings; empty means catch-all.
    pub matches: Vec<String>,
}

impl Category {
    pub fn new<S: Into<String>>(name: impl Into<String>, matches: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            matches: matches.into_iter().map(Into::into).collect(),
        }
    }

    /// A category with no substrings is only ever reached as a fallback.
    pub fn is_catch_all(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Parse the compact categories format.
///
/// `Windows;Linux:Linux,Red Hat,Debian;Network:Cisco,Catalyst;Other:`
/// - `Name:a,b` matches on `a` or `b`
/// - `Name:` is a catch-all
/// - bare `Name` matches on its own name
pub fn parse_categories(definition: &str) -> Result<Vec<Category>> {
    let mut categories: Vec<Category> = Vec::new();

    for entry in definition.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let category = match entry.split_once(':') {
            None => Category::new(entry, [entry]),
            Some((name, list)) => Category::new(
                name.trim(),
                list.split(',').map(str::trim).filter(|m| !m.is_empty()),
            ),
        };

        if category.name.is_empty() {
            return Err(InventoryError::config(format!(
                "category entry '{entry}' has no name"
            )));
        }
        categories.push(category);
    }

    Ok(categories)
}

// ---------------------------------------------------------------------------
// InventoryPolicy
// ---------------------------------------------------------------------------

/// Immutable build configuration.
#[derive(Debug, Clone)]
pub struct InventoryPolicy {
    /// Field whose value is the host identity.
    pub hostname_field: String,
    /// Field matched against category substrings.
    pub category_field: String,
    /// Fields copied into host variables, in order.
    pub hostvar_fields: Vec<String>,
    /// Fields whose values become extra groups, in order.
    pub group_on_fields: Vec<String>,
    /// Categories in declaration order.
    pub categories: Vec<Category>,
    /// Vars seeded onto category groups (or `all`).
    pub category_vars: IndexMap<String, IndexMap<String, serde_json::Value>>,
}

impl InventoryPolicy {
    /// A policy with the default field mapping and categories, keyed on
    /// `hostname_field`.
    pub fn new(hostname_field: impl Into<String>) -> Self {
        let defaults = InventoryConfig::default();
        Self {
            hostname_field: hostname_field.into(),
            category_field: defaults.category_field,
            hostvar_fields: defaults.hostvar_fields,
            group_on_fields: defaults.group_on_fields,
            categories: parse_categories(&defaults.categories_definition)
                .unwrap_or_default(),
            category_vars: IndexMap::new(),
        }
    }

    /// Build and validate a policy from the `[inventory]` config section.
    pub fn from_config(config: &InventoryConfig) -> Result<Self> {
        let policy = Self {
            hostname_field: config.hostname_field.trim().to_string(),
            category_field: config.category_field.trim().to_string(),
            hostvar_fields: config.hostvar_fields.clone(),
            group_on_fields: config.group_on_fields.clone(),
            categories: parse_categories(&config.categories_definition)?,
            category_vars: config.category_vars.clone(),
        };
        policy.validate()?;

        debug!(
            hostname_field = %policy.hostname_field,
            category_field = %policy.category_field,
            categories = policy.categories.len(),
            group_on_fields = ?policy.group_on_fields,
            "inventory policy loaded"
        );

        Ok(policy)
    }

    pub fn with_category_field(mut self, field: impl Into<String>) -> Self {
        self.category_field = field.into();
        self
    }

    pub fn with_hostvar_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.hostvar_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_group_on_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.group_on_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    /// Check the policy is usable before any records are fetched.
    pub fn validate(&self) -> Result<()> {
        if self.hostname_field.is_empty() {
            return Err(InventoryError::config("hostname_field must not be empty"));
        }
        if self.category_field.is_empty() {
            return Err(InventoryError::config("category_field must not be empty"));
        }

        for (list, fields) in [
            ("hostvar_fields", &self.hostvar_fields),
            ("group_on_fields", &self.group_on_fields),
        ] {
            if fields.iter().any(|f| f.trim().is_empty()) {
                return Err(InventoryError::config(format!(
                    "{list} contains an empty field name"
                )));
            }
        }

        for (i, category) in self.categories.iter().enumerate() {
            if category.name.is_empty() {
                return Err(InventoryError::config("category name must not be empty"));
            }
            if category.name == ALL_GROUP || category.name == META_KEY {
                return Err(InventoryError::config(format!(
                    "category name '{}' is reserved",
                    category.name
                )));
            }
            if self.categories[..i].iter().any(|c| c.name == category.name) {
                return Err(InventoryError::config(format!(
                    "category '{}' is declared more than once",
                    category.name
                )));
            }
        }

        if let Some(unknown) = self
            .category_vars
            .keys()
            .find(|name| name.as_str() != ALL_GROUP && self.category(name).is_none())
        {
            return Err(InventoryError::config(format!(
                "category_vars names undeclared category '{unknown}'"
            )));
        }

        Ok(())
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// The first declared catch-all category, if any.
    pub fn catch_all(&self) -> Option<&Category> {
        self.categories.iter().find(|c| c.is_catch_all())
    }

    /// Whether category-field values form an intermediate group level
    /// between a category and its hosts.
    pub fn nests_category_values(&self) -> bool {
        self.group_on_fields.contains(&self.category_field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(categories: &[Category]) -> Vec<&str> {
        categories.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn parse_default_categories() {
        let categories = parse_categories(swinventory_shared::DEFAULT_CATEGORIES).unwrap();
        assert_eq!(names(&categories), vec!["Windows", "Linux", "Network", "Other"]);
        assert_eq!(categories[0].matches, vec!["Windows"]);
        assert_eq!(categories[1].matches, vec!["Linux", "Red Hat", "Debian"]);
        assert_eq!(categories[2].matches, vec!["Cisco", "Catalyst"]);
        assert!(categories[3].is_catch_all());
    }

    #[test]
    fn parse_trims_and_skips_empties() {
        let categories = parse_categories(" Storage : NetApp, ,EMC ;; Misc: ;").unwrap();
        assert_eq!(names(&categories), vec!["Storage", "Misc"]);
        assert_eq!(categories[0].matches, vec!["NetApp", "EMC"]);
        assert!(categories[1].is_catch_all());
    }

    #[test]
    fn parse_rejects_nameless_entry() {
        let err = parse_categories("Linux:Linux;:Cisco").unwrap_err();
        assert!(err.to_string().contains(":Cisco"));
    }

    #[test]
    fn default_policy_from_config() {
        let policy = InventoryPolicy::from_config(&InventoryConfig::default()).unwrap();
        assert_eq!(policy.hostname_field, "DNS");
        assert_eq!(policy.category_field, "MachineType");
        assert!(policy.nests_category_values());
        assert_eq!(policy.catch_all().map(|c| c.name.as_str()), Some("Other"));
        assert_eq!(policy.categories, InventoryPolicy::new("DNS").categories);
    }

    #[test]
    fn empty_hostname_field_is_rejected() {
        let config = InventoryConfig {
            hostname_field: "  ".into(),
            ..InventoryConfig::default()
        };
        let err = InventoryPolicy::from_config(&config).unwrap_err();
        assert!(matches!(err, InventoryError::Config { .. }));
        assert!(err.to_string().contains("hostname_field"));
    }

    #[test]
    fn duplicate_and_reserved_categories_are_rejected() {
        let config = InventoryConfig {
            categories_definition: "Linux:Linux;Linux:Debian".into(),
            ..InventoryConfig::default()
        };
        let err = InventoryPolicy::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("'Linux' is declared more than once"));

        let config = InventoryConfig {
            categories_definition: "all:Linux".into(),
            ..InventoryConfig::default()
        };
        let err = InventoryPolicy::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }

    #[test]
    fn category_vars_must_name_declared_categories() {
        let mut config = InventoryConfig::default();
        config
            .category_vars
            .insert("Solaris".into(), IndexMap::new());
        let err = InventoryPolicy::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("'Solaris'"));

        let mut config = InventoryConfig::default();
        config.category_vars.insert("all".into(), IndexMap::new());
        config.category_vars.insert("Windows".into(), IndexMap::new());
        assert!(InventoryPolicy::from_config(&config).is_ok());
    }

    #[test]
    fn empty_field_names_are_rejected() {
        let policy = InventoryPolicy::new("DNS").with_group_on_fields(["Asset_group", ""]);
        let err = policy.validate().unwrap_err();
        assert!(err.to_string().contains("group_on_fields"));
    }

    #[test]
    fn no_catch_all_when_none_declared() {
        let policy = InventoryPolicy::new("DNS")
            .with_categories(parse_categories("Windows;Linux:Linux").unwrap());
        assert!(policy.catch_all().is_none());
        assert!(policy.validate().is_ok());
    }
}
