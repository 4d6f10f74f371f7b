// Image-to-text for photographed essays. The engine is optional: when no
// recognizer is configured the endpoint reports the feature as unavailable.

pub mod handlers;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::io::Write;
use tokio::process::Command;
use tracing::{debug, info};

const OCR_LANGUAGE: &str = "eng";

#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<String>;
}

/// Shells out to the `tesseract` binary on PATH.
pub struct TesseractCli {
    binary: String,
}

impl TesseractCli {
    /// Returns `None` when `tesseract --version` cannot be run.
    pub async fn detect() -> Option<Self> {
        let binary = "tesseract".to_string();
        match Command::new(&binary).arg("--version").output().await {
            Ok(output) if output.status.success() => {
                // Older builds print the version banner on stderr.
                let banner = if output.stdout.is_empty() {
                    String::from_utf8_lossy(&output.stderr).into_owned()
                } else {
                    String::from_utf8_lossy(&output.stdout).into_owned()
                };
                info!(
                    "Tesseract OCR available: {}",
                    banner.lines().next().unwrap_or_default()
                );
                Some(Self { binary })
            }
            _ => {
                debug!("Tesseract not found in PATH");
                None
            }
        }
    }
}

#[async_trait]
impl TextRecognizer for TesseractCli {
    async fn recognize(&self, image: &[u8]) -> Result<String> {
        let mut file = tempfile::NamedTempFile::new().context("Failed to create temporary image")?;
        file.write_all(image)
            .context("Failed to write temporary image")?;

        let output = Command::new(&self.binary)
            .arg(file.path())
            .arg("stdout")
            .arg("-l")
            .arg(OCR_LANGUAGE)
            .output()
            .await
            .context("Failed to execute Tesseract")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Tesseract failed: {stderr}");
        }

        String::from_utf8(output.stdout).context("Failed to parse Tesseract output as UTF-8")
    }
}

/// Accepts plain base64 or a `data:image/...;base64,` URL.
pub fn decode_image_payload(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let encoded = match payload.strip_prefix("data:image") {
        Some(rest) => rest.split_once(',').map_or("", |(_, data)| data),
        None => payload,
    };
    STANDARD.decode(encoded.trim())
}
