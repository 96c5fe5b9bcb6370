use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

/// Find the first `<img>` in document order that looks like a dimension
/// diagram and return its absolute URL.
///
/// `src` or `alt` containing "dimension" (case-insensitive) qualifies; that
/// also covers "dimensions" and a file name like `sofa-dimension.png`.
pub fn find_dimension_image(markup: &str, base_url: &str) -> Option<String> {
    let base = Url::parse(base_url).ok()?;
    let document = Html::parse_document(markup);

    document
        .select(&IMG)
        .filter_map(|img| {
            let src = img.value().attr("src").unwrap_or("").trim();
            if src.is_empty() {
                return None;
            }
            let alt = img.value().attr("alt").unwrap_or("");
            is_dimension_image(src, alt).then_some(src)
        })
        .find_map(|src| base.join(src).ok())
        .map(String::from)
}

fn is_dimension_image(src: &str, alt: &str) -> bool {
    src.to_lowercase().contains("dimension") || alt.to_lowercase().contains("dimension")
}
