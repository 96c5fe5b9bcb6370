use std::process::Command;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::fetch::Offline;

/// Converts image bytes to plain text. Never fails: an image that cannot be
/// recognized yields empty text.
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> String;
}

/// Runs the `tesseract` CLI over a temporary PNG.
pub struct TesseractRecognizer {
    command: String,
    language: String,
}

impl TesseractRecognizer {
    /// Check that the binary is runnable before any work starts.
    pub fn probe(command: &str, language: &str) -> Result<Self> {
        let output = Command::new(command)
            .arg("--version")
            .output()
            .with_context(|| {
                format!(
                    "Missing dependency for dimension extraction: cannot run `{}`. \
                     Install tesseract-ocr or pass --skip-dimensions",
                    command
                )
            })?;
        if !output.status.success() {
            bail!("`{} --version` exited with {}", command, output.status);
        }
        let version = String::from_utf8_lossy(&output.stdout);
        debug!(version = %version.lines().next().unwrap_or("").trim(), "tesseract available");

        Ok(Self {
            command: command.to_string(),
            language: language.to_string(),
        })
    }

    async fn run(&self, image: &[u8]) -> Result<String> {
        let bytes = image.to_vec();
        let input = tokio::task::spawn_blocking(move || prepare_input(&bytes)).await??;

        let output = tokio::process::Command::new(&self.command)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .await
            .context("cannot run tesseract")?;
        if !output.status.success() {
            bail!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Decode, normalize and write the image as a temporary PNG.
fn prepare_input(image: &[u8]) -> Result<NamedTempFile> {
    let decoded = image::load_from_memory(image).context("cannot decode image")?;
    let normalized = normalize_color(decoded);

    let input = tempfile::Builder::new()
        .prefix("dimension")
        .suffix(".png")
        .tempfile()
        .context("cannot create tesseract input file")?;
    normalized
        .save_with_format(input.path(), ImageFormat::Png)
        .context("cannot write tesseract input file")?;
    Ok(input)
}

#[async_trait]
impl Recognizer for TesseractRecognizer {
    async fn recognize(&self, image: &[u8]) -> String {
        match self.run(image).await {
            Ok(text) => text,
            Err(e) => {
                warn!("OCR failed: {:#}", e);
                String::new()
            }
        }
    }
}

#[async_trait]
impl Recognizer for Offline {
    async fn recognize(&self, _image: &[u8]) -> String {
        String::new()
    }
}

/// Grayscale, RGB and RGBA pass through; every other color mode becomes RGB.
pub fn normalize_color(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => {
            img
        }
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, GrayImage, LumaA, Rgb, RgbImage};

    #[test]
    fn supported_modes_pass_through() {
        let gray = DynamicImage::ImageLuma8(GrayImage::new(4, 4));
        assert!(matches!(normalize_color(gray), DynamicImage::ImageLuma8(_)));

        let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([10, 20, 30])));
        assert!(matches!(normalize_color(rgb), DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn other_modes_become_rgb() {
        let la = DynamicImage::ImageLumaA8(GrayAlphaImage::from_pixel(3, 2, LumaA([200, 255])));
        let out = normalize_color(la);
        let DynamicImage::ImageRgb8(rgb) = out else {
            panic!("expected RGB output");
        };
        assert_eq!(rgb.dimensions(), (3, 2));
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([200, 200, 200]));
    }

    #[tokio::test]
    async fn undecodable_bytes_yield_empty_text() {
        let recognizer = TesseractRecognizer {
            command: "tesseract".to_string(),
            language: "eng".to_string(),
        };
        assert_eq!(recognizer.recognize(b"definitely not an image").await, "");
    }

    #[tokio::test]
    async fn recognizer_failure_yields_empty_text() {
        let recognizer = TesseractRecognizer {
            command: "/nonexistent/tesseract-binary".to_string(),
            language: "eng".to_string(),
        };
        let png = {
            let mut buf = std::io::Cursor::new(Vec::new());
            DynamicImage::ImageLuma8(GrayImage::new(8, 8))
                .write_to(&mut buf, ImageFormat::Png)
                .unwrap();
            buf.into_inner()
        };
        assert_eq!(recognizer.recognize(&png).await, "");
    }

    #[test]
    fn missing_binary_fails_probe() {
        assert!(TesseractRecognizer::probe("/nonexistent/tesseract-binary", "eng").is_err());
    }
}
