use std::collections::BTreeMap;

use serde::Serialize;

/// A `g:product_detail` name/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetail {
    pub name: String,
    pub value: String,
}

impl ProductDetail {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One `<item>` of the merchant feed.
///
/// Scalar fields are keyed by their local tag name (`id`, `link`, `title`, ...).
/// `additional_image_link` is repeatable and kept separately, as are the
/// product details read from the feed and the ones chosen for output.
#[derive(Debug, Clone, Default)]
pub struct CatalogEntry {
    pub fields: BTreeMap<String, String>,
    pub additional_image_links: Vec<String>,
    pub feed_details: Vec<ProductDetail>,
    pub product_details: Vec<ProductDetail>,
}

impl CatalogEntry {
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn id(&self) -> &str {
        self.get("id")
    }

    pub fn link(&self) -> &str {
        self.get("link")
    }
}

/// Parsed feed: channel metadata plus its items in document order.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub entries: Vec<CatalogEntry>,
}

#[cfg(test)]
pub(crate) fn entry(fields: &[(&str, &str)]) -> CatalogEntry {
    let mut e = CatalogEntry::default();
    for (k, v) in fields {
        e.set(k, *v);
    }
    e
}
