use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A CSV log row. Headers are written even when there are no rows.
pub trait CsvRow: Serialize {
    const HEADERS: &'static [&'static str];
}

pub fn write_csv<T: CsvRow>(path: &Path, rows: &[T]) -> Result<()> {
    let mut w = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    w.write_record(T::HEADERS)?;
    for row in rows {
        w.serialize(row)?;
    }
    w.flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

// ── Rows ──

#[derive(Debug, Clone, Serialize)]
pub struct AuditRow {
    pub id: String,
    pub title: String,
    pub link: String,
    pub item_group_id: String,
    pub color: String,
    pub material: String,
    pub image_count: usize,
    pub additional_image_count: usize,
    pub flags: String,
}

impl CsvRow for AuditRow {
    const HEADERS: &'static [&'static str] = &[
        "id", "title", "link", "item_group_id", "color", "material",
        "image_count", "additional_image_count", "flags",
    ];
}

#[derive(Debug, Clone, Serialize)]
pub struct MaterialChange {
    pub id: String,
    pub old_material: String,
    pub new_material: String,
}

impl CsvRow for MaterialChange {
    const HEADERS: &'static [&'static str] = &["id", "old_material", "new_material"];
}

#[derive(Debug, Clone, Serialize)]
pub struct MpnRow {
    pub id: String,
    pub mpn: String,
}

impl CsvRow for MpnRow {
    const HEADERS: &'static [&'static str] = &["id", "mpn"];
}

#[derive(Debug, Clone, Serialize)]
pub struct DimensionLogRow {
    pub id: String,
    pub link: String,
    pub dimension_image_url: String,
    pub ocr_text_snippet: String,
    pub parsed_overall: String,
    pub parsed_seat_height: String,
    pub parsed_seat_depth: String,
    pub status: String,
}

impl CsvRow for DimensionLogRow {
    const HEADERS: &'static [&'static str] = &[
        "id", "link", "dimension_image_url", "ocr_text_snippet",
        "parsed_overall", "parsed_seat_height", "parsed_seat_depth", "status",
    ];
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageAuditRow {
    pub id: String,
    pub additional_image_count: usize,
    pub deduped_count: usize,
    pub reordered: bool,
}

impl CsvRow for ImageAuditRow {
    const HEADERS: &'static [&'static str] =
        &["id", "additional_image_count", "deduped_count", "reordered"];
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelChange {
    pub id: String,
    pub label_name: String,
    pub old_value: String,
    pub new_value: String,
}

impl CsvRow for LabelChange {
    const HEADERS: &'static [&'static str] = &["id", "label_name", "old_value", "new_value"];
}

// ── Summary ──

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total_items: usize,
    pub unique_links: usize,
    pub dimension_success_links: usize,
    pub dimension_status_counts: BTreeMap<String, usize>,
    pub materials_normalized: usize,
    pub label_changes: usize,
    pub output_feed: PathBuf,
}

impl RunSummary {
    pub fn print(&self) {
        println!("--- Summary ---");
        println!("Total items processed: {}", self.total_items);
        println!("Unique product links: {}", self.unique_links);
        println!(
            "Dimensions successfully added (unique links): {}",
            self.dimension_success_links
        );
        println!("Dimension extraction status counts: {:?}", self.dimension_status_counts);
        println!("Materials normalized: {}", self.materials_normalized);
        println!("Label changes: {}", self.label_changes);
        println!("Output feed: {}", self.output_feed.display());
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }
}

pub fn status_counts(rows: &[DimensionLogRow]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for r in rows {
        *counts.entry(r.status.clone()).or_insert(0) += 1;
    }
    counts
}
