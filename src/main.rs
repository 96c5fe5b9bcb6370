mod dimensions;
mod feed;
mod model;
mod passes;
mod report;
mod settings;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;

use dimensions::fetch::{Fetcher, HttpFetcher, Offline};
use dimensions::ocr::{Recognizer, TesseractRecognizer};
use dimensions::resolver::DimensionResolver;
use dimensions::DimensionStatus;
use model::Feed;
use report::RunSummary;
use settings::Settings;

const FALLBACK_FEED: &str = "public/merchant/feed.xml";

#[derive(Parser)]
#[command(name = "feed_enricher", about = "Merchant feed enrichment: materials, MPNs, dimensions, images, labels")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every stage and write feed_enriched.xml plus CSV logs
    Run {
        /// Input feed XML (default: settings `feed`)
        #[arg(long)]
        feed: Option<PathBuf>,
        /// Output directory (default: same as feed)
        #[arg(long)]
        outdir: Option<PathBuf>,
        /// Where downloaded diagrams and OCR text are kept
        #[arg(long)]
        work_dir: Option<PathBuf>,
        /// Skip dimension extraction (no fetch/OCR)
        #[arg(long)]
        skip_dimensions: bool,
    },
    /// Audit the feed without changing it
    Audit {
        #[arg(long)]
        feed: Option<PathBuf>,
        #[arg(long)]
        outdir: Option<PathBuf>,
    },
    /// Resolve dimensions for product page URLs and print the outcome
    Dimensions {
        #[arg(required = true)]
        links: Vec<String>,
        #[arg(long)]
        work_dir: Option<PathBuf>,
    },
    /// OCR a local image and parse dimensions from the text
    Ocr { image: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;
    info!(settings = ?settings, "Settings loaded");

    let result = match cli.command {
        Commands::Run {
            feed,
            outdir,
            work_dir,
            skip_dimensions,
        } => {
            let feed_path = locate_feed(feed.unwrap_or_else(|| settings.feed.clone()))?;
            let outdir = outdir.unwrap_or_else(|| parent_dir(&feed_path));
            let work_dir = work_dir.unwrap_or_else(|| settings.work_dir.clone());
            std::fs::create_dir_all(&outdir)
                .with_context(|| format!("Failed to create {}", outdir.display()))?;

            let mut feed = feed::read_feed(&feed_path)?;
            if feed.entries.is_empty() {
                bail!("no items in feed");
            }

            // Collaborators are checked before any per-link work starts
            let summary = if skip_dimensions {
                let resolver = DimensionResolver::new(Offline, Offline, &work_dir)?;
                enrich(&mut feed, &outdir, &resolver, false).await?
            } else {
                let fetcher = HttpFetcher::new(settings.request_timeout(), &settings.user_agent)?;
                let recognizer =
                    TesseractRecognizer::probe(&settings.tesseract_cmd, &settings.ocr_language)?;
                let resolver = DimensionResolver::new(fetcher, recognizer, &work_dir)?;
                enrich(&mut feed, &outdir, &resolver, true).await?
            };

            summary.print();
            println!(
                "Logs: feed_audit.csv, material_changes.csv, mpn_changes.csv, \
                 dimension_extraction_log.csv, image_audit.csv, label_changes.csv"
            );
            summary.write(&outdir.join("enrichment_summary.json"))
        }
        Commands::Audit { feed, outdir } => {
            let feed_path = locate_feed(feed.unwrap_or_else(|| settings.feed.clone()))?;
            let outdir = outdir.unwrap_or_else(|| parent_dir(&feed_path));
            std::fs::create_dir_all(&outdir)?;

            let feed = feed::read_feed(&feed_path)?;
            let rows = passes::audit::run(&feed.entries);
            let flagged = rows.iter().filter(|r| !r.flags.is_empty()).count();
            let path = outdir.join("feed_audit.csv");
            report::write_csv(&path, &rows)?;
            println!(
                "Audited {} items ({} flagged) -> {}",
                rows.len(),
                flagged,
                path.display()
            );
            Ok(())
        }
        Commands::Dimensions { links, work_dir } => {
            let fetcher = HttpFetcher::new(settings.request_timeout(), &settings.user_agent)?;
            let recognizer =
                TesseractRecognizer::probe(&settings.tesseract_cmd, &settings.ocr_language)?;
            let work_dir = work_dir.unwrap_or_else(|| settings.work_dir.clone());
            let resolver = DimensionResolver::new(fetcher, recognizer, work_dir)?;

            let cache = resolver
                .resolve_all(links.iter().map(String::as_str), true)
                .await;

            for link in &links {
                let Some(r) = cache.get(link) else { continue };
                println!("{}", link);
                println!("  status:      {}", r.status);
                println!("  image:       {}", r.dimension_image_url.as_deref().unwrap_or("-"));
                println!("  overall:     {}", r.parsed_overall.as_deref().unwrap_or("-"));
                println!("  seat height: {}", r.parsed_seat_height.as_deref().unwrap_or("-"));
                println!("  seat depth:  {}", r.parsed_seat_depth.as_deref().unwrap_or("-"));
                if !r.ocr_text_snippet.is_empty() {
                    println!("  text:        {}", truncate(&r.ocr_text_snippet.replace('\n', " "), 80));
                }
            }
            Ok(())
        }
        Commands::Ocr { image } => {
            let recognizer =
                TesseractRecognizer::probe(&settings.tesseract_cmd, &settings.ocr_language)?;
            let bytes = std::fs::read(&image)
                .with_context(|| format!("Failed to read {}", image.display()))?;
            let text = recognizer.recognize(&bytes).await;
            let parsed = dimensions::text::parse_dimensions(&text);

            println!("--- Recognized text ---\n{}", text.trim_end());
            println!("--- Parsed ---");
            println!("Overall:     {}", parsed.overall.as_deref().unwrap_or("-"));
            println!("Seat height: {}", parsed.seat_height.as_deref().unwrap_or("-"));
            println!("Seat depth:  {}", parsed.seat_depth.as_deref().unwrap_or("-"));
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Stages A–G over the whole feed. Every stage writes its log into `outdir`.
async fn enrich<F: Fetcher, R: Recognizer>(
    feed: &mut Feed,
    outdir: &Path,
    resolver: &DimensionResolver<F, R>,
    fetch_enabled: bool,
) -> Result<RunSummary> {
    let started_at = Utc::now();
    let entries = feed.entries.as_mut_slice();

    // A: audit
    report::write_csv(&outdir.join("feed_audit.csv"), &passes::audit::run(entries))?;

    // B: material
    let material_changes = passes::material::run(entries);
    if !material_changes.is_empty() {
        report::write_csv(&outdir.join("material_changes.csv"), &material_changes)?;
    }

    // C: MPN
    report::write_csv(&outdir.join("mpn_changes.csv"), &passes::mpn::run(entries))?;

    // D: dimensions
    let (cache, dimension_rows) = dimensions::run(
        entries,
        resolver,
        fetch_enabled,
        &outdir.join("dimension_extraction_log.csv"),
    )
    .await?;

    // E: image QA
    report::write_csv(&outdir.join("image_audit.csv"), &passes::images::run(entries))?;

    // F: labels
    let label_changes = passes::labels::run(entries);
    if !label_changes.is_empty() {
        report::write_csv(&outdir.join("label_changes.csv"), &label_changes)?;
    }

    // G: output
    let output_feed = outdir.join("feed_enriched.xml");
    feed::write_feed(feed, &output_feed)?;
    info!("Wrote {}", output_feed.display());

    Ok(RunSummary {
        started_at,
        finished_at: Utc::now(),
        total_items: feed.entries.len(),
        unique_links: cache.len(),
        dimension_success_links: cache.count(DimensionStatus::Success),
        dimension_status_counts: report::status_counts(&dimension_rows),
        materials_normalized: material_changes.len(),
        label_changes: label_changes.len(),
        output_feed,
    })
}

fn locate_feed(path: PathBuf) -> Result<PathBuf> {
    if path.is_file() {
        return Ok(path);
    }
    let fallback = PathBuf::from(FALLBACK_FEED);
    if fallback.is_file() {
        eprintln!("Using feed at {}", fallback.display());
        return Ok(fallback);
    }
    bail!("feed not found: {}", path.display())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
