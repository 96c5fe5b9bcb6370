use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Runtime settings: defaults, then `enrich.toml` if present, then `ENRICH_*` env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub feed: PathBuf,
    pub work_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub tesseract_cmd: String,
    pub ocr_language: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::builder()?
            .add_source(File::with_name("enrich").required(false))
            .add_source(Environment::with_prefix("ENRICH"))
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("feed", "feed.xml")?
            .set_default("work_dir", "/tmp/arva_dimensions")?
            .set_default("request_timeout_secs", 15)?
            .set_default("user_agent", concat!("feed_enricher/", env!("CARGO_PKG_VERSION")))?
            .set_default("tesseract_cmd", "tesseract")?
            .set_default("ocr_language", "eng")?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
