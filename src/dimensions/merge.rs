use super::resolver::{LinkCache, LinkResolutionResult};
use super::DimensionStatus;
use crate::model::{CatalogEntry, ProductDetail};
use crate::report::DimensionLogRow;

/// Feed-supplied dimensions win over anything resolved from the product page.
pub fn merge_dimensions(
    entry: &CatalogEntry,
    result: Option<&LinkResolutionResult>,
) -> (Vec<ProductDetail>, DimensionStatus) {
    if has_feed_dimensions(entry) {
        return (entry.feed_details.clone(), DimensionStatus::AlreadyHasDimensions);
    }
    match result {
        Some(r) => (r.product_detail.clone(), r.status),
        None => (Vec::new(), DimensionStatus::DimensionImageNotFound),
    }
}

fn has_feed_dimensions(entry: &CatalogEntry) -> bool {
    entry.feed_details.iter().any(|pd| {
        let name = pd.name.to_lowercase();
        name.contains("dimension") || name == "overall dimensions"
    })
}

/// Write the merged details onto every entry and return one log row each.
pub fn apply_dimensions(entries: &mut [CatalogEntry], cache: &LinkCache) -> Vec<DimensionLogRow> {
    entries
        .iter_mut()
        .map(|entry| {
            let result = cache.get(entry.link());
            let (details, status) = merge_dimensions(entry, result);
            entry.product_details = details;

            let result = result.cloned().unwrap_or_default();
            DimensionLogRow {
                id: entry.id().to_string(),
                link: entry.link().to_string(),
                dimension_image_url: result.dimension_image_url.unwrap_or_default(),
                ocr_text_snippet: result.ocr_text_snippet,
                parsed_overall: result.parsed_overall.unwrap_or_default(),
                parsed_seat_height: result.parsed_seat_height.unwrap_or_default(),
                parsed_seat_depth: result.parsed_seat_depth.unwrap_or_default(),
                status: status.as_str().to_string(),
            }
        })
        .collect()
}
