use std::collections::HashSet;

use crate::model::CatalogEntry;
use crate::report::ImageAuditRow;

/// Preferred order of additional images, by URL token.
const ORDER_TOKENS: &[&str] = &["angle", "side", "back", "lifestyle", "detail"];

fn order_key(url: &str) -> usize {
    let lower = url.to_lowercase();
    ORDER_TOKENS
        .iter()
        .position(|tok| lower.contains(tok))
        .unwrap_or(usize::MAX)
}

/// Dedupe and reorder `additional_image_link` per entry.
pub fn run(entries: &mut [CatalogEntry]) -> Vec<ImageAuditRow> {
    entries
        .iter_mut()
        .map(|entry| {
            let original = std::mem::take(&mut entry.additional_image_links);
            let original_count = original.len();

            let mut seen = HashSet::new();
            let deduped: Vec<String> = original
                .into_iter()
                .filter(|u| seen.insert(u.clone()))
                .collect();
            let deduped_count = deduped.len();

            let mut ordered = deduped.clone();
            ordered.sort_by_key(|u| order_key(u));
            let reordered = ordered != deduped;
            entry.additional_image_links = ordered;

            ImageAuditRow {
                id: entry.id().to_string(),
                additional_image_count: original_count,
                deduped_count,
                reordered,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry;

    #[test]
    fn dedupes_then_orders_stably() {
        let mut e = entry(&[("id", "a")]);
        e.additional_image_links = [
            "https://cdn/x/detail-1.jpg",
            "https://cdn/x/misc.jpg",
            "https://cdn/x/Angle.jpg",
            "https://cdn/x/detail-1.jpg",
            "https://cdn/x/detail-2.jpg",
            "https://cdn/x/side.jpg",
        ]
        .map(String::from)
        .to_vec();

        let rows = run(std::slice::from_mut(&mut e));

        assert_eq!(
            e.additional_image_links,
            [
                "https://cdn/x/Angle.jpg",
                "https://cdn/x/side.jpg",
                "https://cdn/x/detail-1.jpg",
                "https://cdn/x/detail-2.jpg",
                "https://cdn/x/misc.jpg",
            ]
        );
        assert_eq!(rows[0].additional_image_count, 6);
        assert_eq!(rows[0].deduped_count, 5);
        assert!(rows[0].reordered);
    }

    #[test]
    fn already_ordered_is_not_reordered() {
        let mut e = entry(&[("id", "a")]);
        e.additional_image_links = vec!["https://cdn/angle.jpg".into(), "https://cdn/back.jpg".into()];
        let rows = run(std::slice::from_mut(&mut e));
        assert!(!rows[0].reordered);
        assert_eq!(rows[0].deduped_count, 2);
    }
}
