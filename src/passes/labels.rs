use crate::model::CatalogEntry;
use crate::report::LabelChange;

use super::{configuration, Configuration};

const HERO_COLORS: &[&str] = &["Taupe", "Ivory", "Light Gray", "Charcoal"];

fn wanted_labels(entry: &CatalogEntry) -> [(&'static str, &'static str); 5] {
    let config = configuration(entry);
    let tier = match config {
        Configuration::Sectional | Configuration::ThreeSeat => "hero",
        _ => "supporting",
    };
    let kind = match config {
        Configuration::Sectional => "sectional",
        Configuration::ThreeSeat => "sofa",
        _ => "loveseat",
    };
    let color = if HERO_COLORS.iter().any(|c| *c == entry.get("color")) {
        "hero_color"
    } else {
        "supporting_color"
    };
    [
        ("custom_label_0", tier),
        ("custom_label_1", "high_aov"),
        ("custom_label_2", kind),
        ("custom_label_3", "core_collection"),
        ("custom_label_4", color),
    ]
}

/// Set the five campaign labels. Returns every label that changed.
pub fn run(entries: &mut [CatalogEntry]) -> Vec<LabelChange> {
    let mut changes = Vec::new();
    for entry in entries.iter_mut() {
        for (label, want) in wanted_labels(entry) {
            if entry.has(label) && entry.get(label) == want {
                continue;
            }
            changes.push(LabelChange {
                id: entry.id().to_string(),
                label_name: label.to_string(),
                old_value: entry.get(label).to_string(),
                new_value: want.to_string(),
            });
            entry.set(label, want);
        }
    }
    changes
}
