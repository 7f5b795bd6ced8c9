//! Inventory document assembler.
//!
//! Takes extracted host variables, category groups, and field-derived
//! groups, then merges them into one [`InventoryDocument`] rooted at `all`.

use indexmap::IndexMap;
use tracing::{debug, instrument};

use swinventory_shared::{
    ALL_GROUP, Group, HostVars, InventoryDocument, InventoryError, META_KEY, Result,
};

use crate::grouping::FieldGroups;

/// Assemble the final document.
///
/// - `_meta.hostvars` comes straight from `hostvars`
/// - `all.children` lists every category, in order
/// - every group is merged by name, so a name reached twice (a field value
///   equal to a category name, or the same value under two fields) unions
///   its members instead of replacing them
/// - every referenced child exists as a top-level group, even if empty
#[instrument(skip_all, fields(
    hosts = hostvars.len(),
    categories = category_groups.len(),
    group_fields = field_groups.len(),
))]
pub fn assemble(
    hostvars: IndexMap<String, HostVars>,
    category_groups: IndexMap<String, Group>,
    field_groups: Vec<FieldGroups>,
) -> Result<InventoryDocument> {
    let mut doc = InventoryDocument::empty();
    doc.meta.hostvars = hostvars;

    let all = doc.ensure(ALL_GROUP);
    for name in category_groups.keys() {
        all.add_child(name.as_str());
    }

    for (name, group) in category_groups {
        doc.merge_group(&name, group);
    }

    for groups in field_groups {
        for (name, hosts) in groups {
            if name == META_KEY {
                return Err(InventoryError::validation(format!(
                    "a record field value produced the reserved group name '{META_KEY}'"
                )));
            }
            let group = doc.ensure(&name);
            for host in hosts {
                group.add_host(host);
            }
        }
    }

    let dangling: Vec<String> = doc
        .groups
        .values()
        .flat_map(|g| g.children.iter())
        .filter(|child| !doc.groups.contains_key(child.as_str()))
        .cloned()
        .collect();
    for child in dangling {
        debug!(group = %child, "creating empty child group");
        doc.ensure(&child);
    }

    doc.check_integrity()?;

    debug!(groups = doc.groups.len(), "inventory assembled");
    Ok(doc)
}
