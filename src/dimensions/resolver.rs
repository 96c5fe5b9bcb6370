use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use super::fetch::Fetcher;
use super::locate::find_dimension_image;
use super::ocr::Recognizer;
use super::text::parse_dimensions;
use super::DimensionStatus;
use crate::model::ProductDetail;

const SNIPPET_CHARS: usize = 300;
const ERROR_CHARS: usize = 200;

/// Outcome of resolving one product link. Built once, never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResolutionResult {
    pub dimension_image_url: Option<String>,
    pub ocr_text_snippet: String,
    pub parsed_overall: Option<String>,
    pub parsed_seat_height: Option<String>,
    pub parsed_seat_depth: Option<String>,
    pub status: DimensionStatus,
    pub product_detail: Vec<ProductDetail>,
}

impl LinkResolutionResult {
    fn with_status(status: DimensionStatus) -> Self {
        Self {
            dimension_image_url: None,
            ocr_text_snippet: String::new(),
            parsed_overall: None,
            parsed_seat_height: None,
            parsed_seat_depth: None,
            status,
            product_detail: Vec::new(),
        }
    }
}

impl Default for LinkResolutionResult {
    fn default() -> Self {
        Self::with_status(DimensionStatus::DimensionImageNotFound)
    }
}

/// Results of one resolution pass, keyed by product link.
#[derive(Debug, Default)]
pub struct LinkCache {
    results: HashMap<String, LinkResolutionResult>,
}

impl LinkCache {
    pub fn get(&self, link: &str) -> Option<&LinkResolutionResult> {
        self.results.get(link)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn count(&self, status: DimensionStatus) -> usize {
        self.results.values().filter(|r| r.status == status).count()
    }

    pub(super) fn insert(&mut self, link: &str, result: LinkResolutionResult) {
        self.results.entry(link.to_string()).or_insert(result);
    }
}

/// Page → diagram → OCR → measurements, once per unique product link.
pub struct DimensionResolver<F, R> {
    fetcher: F,
    recognizer: R,
    work_dir: PathBuf,
}

impl<F: Fetcher, R: Recognizer> DimensionResolver<F, R> {
    /// Creates `work_dir` and its `ocr/` subdirectory up front.
    pub fn new(fetcher: F, recognizer: R, work_dir: impl Into<PathBuf>) -> Result<Self> {
        let work_dir = work_dir.into();
        let ocr_dir = work_dir.join("ocr");
        std::fs::create_dir_all(&ocr_dir)
            .with_context(|| format!("Failed to create work dir {}", ocr_dir.display()))?;
        Ok(Self {
            fetcher,
            recognizer,
            work_dir,
        })
    }

    /// Resolve every unique, non-empty link in first-seen order.
    ///
    /// Failures stay local to their link and end up in its status.
    pub async fn resolve_all<'a, I>(&self, links: I, fetch_enabled: bool) -> LinkCache
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        let unique: Vec<&str> = links
            .into_iter()
            .filter(|l| !l.is_empty() && seen.insert(*l))
            .collect();

        let mut cache = LinkCache::default();
        if !fetch_enabled {
            info!("Dimension fetch disabled, skipping {} links", unique.len());
            for link in unique {
                cache.insert(link, LinkResolutionResult::with_status(DimensionStatus::Skipped));
            }
            return cache;
        }

        info!("Resolving dimensions for {} unique links", unique.len());
        let pb = ProgressBar::new(unique.len() as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("=> "));
        }

        for link in unique {
            pb.set_message(link.to_string());
            let result = self.resolve_one(link).await;
            debug!(link, status = %result.status, "resolved");
            cache.insert(link, result);
            pb.inc(1);
        }
        pb.finish_and_clear();

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for r in cache.results.values() {
            *counts.entry(r.status.as_str()).or_default() += 1;
        }
        info!(?counts, "Dimension resolution done");
        cache
    }

    async fn resolve_one(&self, link: &str) -> LinkResolutionResult {
        let mut result = LinkResolutionResult::default();

        let page = match self.fetcher.fetch(link).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!("Page fetch failed for {}: {}", link, e);
                result.status = DimensionStatus::OcrFailed;
                result.ocr_text_snippet = e.to_string().chars().take(ERROR_CHARS).collect();
                return result;
            }
        };

        let Some(image_url) = find_dimension_image(&page, link) else {
            debug!("No dimension image on {}", link);
            return result;
        };
        result.dimension_image_url = Some(image_url.clone());

        let image = match self.fetcher.fetch(&image_url).await {
            Ok(bytes) if !bytes.is_empty() => bytes,
            Ok(_) | Err(_) => {
                warn!("Dimension image download failed: {}", image_url);
                result.status = DimensionStatus::OcrFailed;
                result.ocr_text_snippet = "download_failed".to_string();
                return result;
            }
        };

        let safe_id = safe_id(link);
        let ext = if image_url.to_lowercase().ends_with(".png") { "png" } else { "jpg" };
        self.persist(&self.work_dir.join(format!("{}.{}", safe_id, ext)), &image);

        let text = self.recognizer.recognize(&image).await;
        self.persist(
            &self.work_dir.join("ocr").join(format!("{}.txt", safe_id)),
            text.as_bytes(),
        );
        result.ocr_text_snippet = snippet(&text);

        let parsed = parse_dimensions(&text);
        let Some(overall) = parsed.overall else {
            result.status = DimensionStatus::ParseFailed;
            return result;
        };

        result.product_detail.push(ProductDetail::new("Overall Dimensions", overall.as_str()));
        if let Some(sh) = &parsed.seat_height {
            result.product_detail.push(ProductDetail::new("Seat Height", sh.as_str()));
        }
        if let Some(sd) = &parsed.seat_depth {
            result.product_detail.push(ProductDetail::new("Seat Depth", sd.as_str()));
        }
        result.parsed_overall = Some(overall);
        result.parsed_seat_height = parsed.seat_height;
        result.parsed_seat_depth = parsed.seat_depth;
        result.status = DimensionStatus::Success;
        result
    }

    /// Debug artifacts only; a failed write does not affect the result.
    fn persist(&self, path: &Path, bytes: &[u8]) {
        if let Err(e) = std::fs::write(path, bytes) {
            warn!("Could not write {}: {}", path.display(), e);
        }
    }
}

/// File-name-safe form of the link's last path segment.
fn safe_id(link: &str) -> String {
    let last = link.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "product".to_string()
    } else {
        cleaned
    }
}

fn snippet(text: &str) -> String {
    if text.chars().count() > SNIPPET_CHARS {
        let head: String = text.chars().take(SNIPPET_CHARS).collect();
        format!("{}…", head)
    } else {
        text.to_string()
    }
}
