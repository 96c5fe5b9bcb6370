use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use thiserror::Error;
use tracing::info;

use crate::model::{CatalogEntry, Feed, ProductDetail};

const G_NAMESPACE: &str = "http://base.google.com/ns/1.0";

/// Item fields written first, in this order. Anything else follows sorted.
const PREFERRED_ORDER: &[&str] = &[
    "id", "item_group_id", "title", "description", "link", "image_link",
    "additional_image_link", "availability", "price", "condition", "brand", "mpn",
    "color", "material", "size", "product_type", "google_product_category",
    "custom_label_0", "custom_label_1", "custom_label_2", "custom_label_3", "custom_label_4",
    "room", "style", "identifier_exists",
];

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("no <channel> in feed")]
    MissingChannel,
    #[error("malformed feed XML: {0}")]
    Xml(#[from] quick_xml::Error),
}

pub fn read_feed(path: &Path) -> Result<Feed> {
    let xml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read feed {}", path.display()))?;
    let feed = parse_feed(&xml).with_context(|| format!("Failed to parse feed {}", path.display()))?;
    info!("Loaded {} items from {}", feed.entries.len(), path.display());
    Ok(feed)
}

/// Parse a merchant RSS feed. Namespace prefixes are ignored; every child of
/// an `<item>` is keyed by its local name.
pub fn parse_feed(xml: &str) -> Result<Feed, FeedError> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut feed = Feed::default();
    let mut saw_channel = false;
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut item: Option<CatalogEntry> = None;
    let mut detail: Option<ProductDetail> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = local_name(e.local_name().as_ref());
                open(&name, &path, &mut saw_channel, &mut item, &mut detail);
                path.push(name);
                text.clear();
            }
            Event::Empty(e) => {
                let name = local_name(e.local_name().as_ref());
                open(&name, &path, &mut saw_channel, &mut item, &mut detail);
                text.clear();
                close(&name, &path, "", &mut feed, &mut item, &mut detail);
            }
            Event::Text(e) => text.push_str(&e.unescape().map_err(quick_xml::Error::from)?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e.into_inner())),
            Event::End(_) => {
                let Some(name) = path.pop() else { continue };
                close(&name, &path, text.trim(), &mut feed, &mut item, &mut detail);
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_channel {
        return Err(FeedError::MissingChannel);
    }
    Ok(feed)
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn open(
    name: &str,
    parents: &[String],
    saw_channel: &mut bool,
    item: &mut Option<CatalogEntry>,
    detail: &mut Option<ProductDetail>,
) {
    let parent = parents.last().map(String::as_str);
    match name {
        "channel" if parents.len() == 1 => *saw_channel = true,
        "item" if parent == Some("channel") => *item = Some(CatalogEntry::default()),
        "product_detail" if item.is_some() && parent == Some("item") => {
            *detail = Some(ProductDetail::new("", ""))
        }
        _ => {}
    }
}

/// Handle a closing tag. `parents` no longer contains `name` itself.
fn close(
    name: &str,
    parents: &[String],
    text: &str,
    feed: &mut Feed,
    item: &mut Option<CatalogEntry>,
    detail: &mut Option<ProductDetail>,
) {
    let parent = parents.last().map(String::as_str);

    if detail.is_some() {
        match name {
            "attribute_name" | "attribute_value" => {
                if let Some(d) = detail.as_mut() {
                    if name == "attribute_name" {
                        d.name = text.to_string();
                    } else {
                        d.value = text.to_string();
                    }
                }
            }
            "product_detail" => {
                if let (Some(d), Some(entry)) = (detail.take(), item.as_mut()) {
                    if !d.name.is_empty() || !d.value.is_empty() {
                        entry.feed_details.push(d);
                    }
                }
            }
            _ => {}
        }
        return;
    }

    match (name, parent) {
        ("item", Some("channel")) => {
            if let Some(entry) = item.take() {
                feed.entries.push(entry);
            }
        }
        (_, Some("item")) => {
            if let Some(entry) = item.as_mut() {
                // Empty links are kept for the audit; the writer drops them
                if name == "additional_image_link" {
                    entry.additional_image_links.push(text.to_string());
                } else {
                    entry.set(name, text);
                }
            }
        }
        ("title", Some("channel")) => feed.title = Some(text.to_string()),
        ("link", Some("channel")) => feed.link = Some(text.to_string()),
        ("description", Some("channel")) => feed.description = Some(text.to_string()),
        _ => {}
    }
}

// ── Output ──

pub fn write_feed(feed: &Feed, path: &Path) -> Result<()> {
    std::fs::write(path, render_feed(feed))
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Render the enriched feed with the `g:` namespace.
pub fn render_feed(feed: &Feed) -> String {
    let mut lines = vec![
        r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string(),
        format!(r#"<rss version="2.0" xmlns:g="{}">"#, G_NAMESPACE),
        "  <channel>".to_string(),
    ];

    for (tag, value) in [
        ("title", &feed.title),
        ("link", &feed.link),
        ("description", &feed.description),
    ] {
        if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
            lines.push(format!("    <{tag}>{}</{tag}>", escape(v)));
        }
    }

    for entry in &feed.entries {
        lines.push("    <item>".to_string());
        render_entry(entry, &mut lines);
        lines.push("    </item>".to_string());
    }

    lines.push("  </channel>".to_string());
    lines.push("</rss>".to_string());
    lines.join("\n")
}

fn render_entry(entry: &CatalogEntry, lines: &mut Vec<String>) {
    let field = |key: &str, value: &str| format!("      <g:{key}>{}</g:{key}>", escape(value));

    for &key in PREFERRED_ORDER {
        if key == "additional_image_link" {
            for url in entry.additional_image_links.iter().filter(|u| !u.is_empty()) {
                lines.push(field(key, url));
            }
            continue;
        }
        let value = entry.get(key);
        if !value.is_empty() {
            lines.push(field(key, value));
        }
    }

    for pd in &entry.product_details {
        lines.push("      <g:product_detail>".to_string());
        lines.push(format!(
            "        <g:attribute_name>{}</g:attribute_name>",
            escape(pd.name.as_str())
        ));
        lines.push(format!(
            "        <g:attribute_value>{}</g:attribute_value>",
            escape(pd.value.as_str())
        ));
        lines.push("      </g:product_detail>".to_string());
    }

    // BTreeMap iteration is already sorted
    for (key, value) in &entry.fields {
        if value.is_empty() || PREFERRED_ORDER.iter().any(|k| *k == key.as_str()) {
            continue;
        }
        lines.push(field(key, value));
    }
}
