//! Single-pass inventory build: records + policy -> document.

use indexmap::IndexMap;
use tracing::{info, instrument, trace};

use swinventory_shared::{ALL_GROUP, Group, InventoryDocument, Record, Result};

use crate::assembler::assemble;
use crate::classify::classify;
use crate::grouping::group_by_field;
use crate::hostvars::{extract, host_identity};
use crate::policy::InventoryPolicy;

/// Build the inventory document for one record set.
///
/// Any missing field aborts the whole build; no partial document is
/// returned.
#[instrument(skip_all, fields(records = records.len()))]
pub fn build(records: &[Record], policy: &InventoryPolicy) -> Result<InventoryDocument> {
    let hostvars = extract(records, &policy.hostname_field, &policy.hostvar_fields)?;
    let categories = category_groups(records, policy)?;

    let field_groups = policy
        .group_on_fields
        .iter()
        .map(|field| group_by_field(records, field, &policy.hostname_field))
        .collect::<Result<Vec<_>>>()?;

    let mut doc = assemble(hostvars, categories, field_groups)?;

    if let Some(vars) = policy.category_vars.get(ALL_GROUP) {
        doc.ensure(ALL_GROUP)
            .vars
            .extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    info!(
        hosts = doc.meta.hostvars.len(),
        groups = doc.groups.len(),
        "inventory built"
    );

    Ok(doc)
}

/// Compute one group per declared category, in declaration order.
///
/// Every category gets a group even if no record lands in it. Membership
/// follows [`classify`], so a hostname repeated across records sits in the
/// category of its last record only. When the category field is also a
/// group-on field, that record's category value is nested as a child group
/// and the host lives there; otherwise the host is attached to the category
/// directly.
pub fn category_groups(
    records: &[Record],
    policy: &InventoryPolicy,
) -> Result<IndexMap<String, Group>> {
    let mut groups: IndexMap<String, Group> = policy
        .categories
        .iter()
        .map(|category| {
            let mut group = Group::new();
            if let Some(vars) = policy.category_vars.get(&category.name) {
                group.vars = vars.clone();
            }
            (category.name.clone(), group)
        })
        .collect();

    let assigned = classify(
        records,
        &policy.hostname_field,
        &policy.category_field,
        &policy.categories,
    )?;

    let mut values: IndexMap<&str, &str> = IndexMap::with_capacity(assigned.len());
    for (index, record) in records.iter().enumerate() {
        let host = host_identity(record, &policy.hostname_field, index)?;
        values.insert(host, record.require(&policy.category_field, index)?);
    }

    let nest = policy.nests_category_values();

    for (host, category) in assigned {
        let Some(category) = category else {
            trace!(host = %host, "no category matched");
            continue;
        };

        let value = values.get(host.as_str()).copied().unwrap_or_default();
        let group = groups.entry(category).or_default();

        if nest && nests_under_category(value, policy) {
            group.add_child(value);
        } else {
            group.add_host(host);
        }
    }

    Ok(groups)
}

/// A category value becomes a child group unless it is empty, names a
/// declared category, or names the root group. Either of the last two would
/// make the group graph cyclic.
fn nests_under_category(value: &str, policy: &InventoryPolicy) -> bool {
    !value.is_empty() && value != ALL_GROUP && policy.category(value).is_none()
}
