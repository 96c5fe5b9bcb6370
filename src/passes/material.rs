use crate::model::CatalogEntry;
use crate::report::MaterialChange;

use super::{product_line, ProductLine};

const MATERIAL_ORIS: &str = "Weather-Resistant Performance Weave";
const MATERIAL_DEFAULT: &str = "Performance Fabric";

/// Normalize `material` by product line. Returns the changes made.
pub fn run(entries: &mut [CatalogEntry]) -> Vec<MaterialChange> {
    let mut changes = Vec::new();
    for entry in entries.iter_mut() {
        let new = match product_line(entry) {
            ProductLine::Oris => MATERIAL_ORIS,
            _ => MATERIAL_DEFAULT,
        };
        let old = entry.get("material").to_string();
        if old != new {
            entry.set("material", new);
            changes.push(MaterialChange {
                id: entry.id().to_string(),
                old_material: old,
                new_material: new.to_string(),
            });
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry;

    #[test]
    fn normalizes_by_line() {
        let mut entries = vec![
            entry(&[("id", "a"), ("title", "Atlas Sofa"), ("material", "Boucle")]),
            entry(&[("id", "o"), ("title", "Oris Loveseat"), ("material", MATERIAL_ORIS)]),
            entry(&[("id", "o2"), ("item_group_id", "oris-chair")]),
        ];
        let changes = run(&mut entries);

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].old_material, "Boucle");
        assert_eq!(entries[0].get("material"), MATERIAL_DEFAULT);
        assert_eq!(entries[1].get("material"), MATERIAL_ORIS);
        assert_eq!(changes[1].id, "o2");
        assert_eq!(changes[1].new_material, MATERIAL_ORIS);
    }
}
