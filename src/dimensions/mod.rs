pub mod fetch;
pub mod locate;
pub mod merge;
pub mod ocr;
pub mod resolver;
pub mod text;

use std::fmt;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::model::CatalogEntry;
use crate::report::{self, DimensionLogRow};
use fetch::Fetcher;
use ocr::Recognizer;
use resolver::{DimensionResolver, LinkCache};

/// Per-link and per-entry outcome of dimension discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionStatus {
    Skipped,
    DimensionImageNotFound,
    OcrFailed,
    ParseFailed,
    Success,
    AlreadyHasDimensions,
}

impl DimensionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::DimensionImageNotFound => "dimension_image_not_found",
            Self::OcrFailed => "ocr_failed",
            Self::ParseFailed => "parse_failed",
            Self::Success => "success",
            Self::AlreadyHasDimensions => "already_has_dimensions",
        }
    }
}

impl fmt::Display for DimensionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dimension stage: resolve each unique link, merge per entry, write the log.
pub async fn run<F: Fetcher, R: Recognizer>(
    entries: &mut [CatalogEntry],
    resolver: &DimensionResolver<F, R>,
    fetch_enabled: bool,
    log_path: &Path,
) -> Result<(LinkCache, Vec<DimensionLogRow>)> {
    let links: Vec<String> = entries.iter().map(|e| e.link().to_string()).collect();
    let cache = resolver
        .resolve_all(links.iter().map(String::as_str), fetch_enabled)
        .await;

    let rows = merge::apply_dimensions(entries, &cache);
    report::write_csv(log_path, &rows)?;
    Ok((cache, rows))
}
