use std::collections::{BTreeSet, HashSet};

use tracing::warn;

use crate::model::CatalogEntry;
use crate::report::AuditRow;

/// Read-only audit of the feed as it arrived.
pub fn run(entries: &[CatalogEntry]) -> Vec<AuditRow> {
    let materials: BTreeSet<&str> = entries.iter().map(|e| e.get("material")).collect();
    if materials.len() > 1 {
        warn!(?materials, "Multiple material strings found");
    }

    entries.iter().map(audit_entry).collect()
}

fn audit_entry(entry: &CatalogEntry) -> AuditRow {
    let material = entry.get("material");
    let color = entry.get("color");
    let group = entry.get("item_group_id");
    let additional = &entry.additional_image_links;

    let mut flags = Vec::new();
    if material.is_empty() {
        flags.push("missing_material");
    }
    if color.is_empty() {
        flags.push("missing_color");
    }
    if group.is_empty() {
        flags.push("missing_item_group_id");
    }
    if additional.is_empty() {
        flags.push("missing_additional_image_link");
    }
    let mut seen = HashSet::new();
    if additional.iter().any(|u| !seen.insert(u)) {
        flags.push("duplicate_image_url");
    }

    AuditRow {
        id: entry.id().to_string(),
        title: entry.get("title").to_string(),
        link: entry.link().to_string(),
        item_group_id: group.to_string(),
        color: color.to_string(),
        material: material.to_string(),
        image_count: usize::from(!entry.get("image_link").is_empty()),
        additional_image_count: additional.len(),
        flags: flags.join(";"),
    }
}
