//! The capture job
//!
//! [`PageCaptureJob`] runs one capture from start to finish: stamp, open the
//! browser, load and settle the page, scroll it, export, verify, close.

use crate::artifact::{store_artifact, Artifact, ArtifactKind, ArtifactOrigin};
use crate::browser::capture::PdfLayout;
use crate::browser::controller::BrowserConfig;
use crate::browser::navigation::UrlValidator;
use crate::browser::scroll::scroll_through;
use crate::browser::session::{ChromeSession, PageSession};
use crate::config::CaptureConfig;
use crate::convert::png_to_pdf;
use crate::error::{ConversionError, Result};
use crate::timestamp::CaptureStamp;
use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Which artifacts a run produces
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum CaptureMode {
    /// Browser PDF only; any PDF failure is terminal
    Pdf,
    /// Full-page PNG only
    Png,
    /// PNG first, then PDF, converting the PNG if the PDF is unusable
    #[default]
    PngWithPdfFallback,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct CaptureResult {
    /// Zone-local start time of the run
    pub timestamp: DateTime<Tz>,
    /// Verified files, in the order they were produced
    pub artifacts: Vec<Artifact>,
    /// Every requested artifact was produced and verified
    pub success: bool,
}

impl CaptureResult {
    /// Paths of all artifacts
    pub fn paths(&self) -> Vec<&Path> {
        self.artifacts.iter().map(|a| a.path.as_path()).collect()
    }

    /// Combined size of all artifacts
    pub fn total_bytes(&self) -> u64 {
        self.artifacts.iter().map(|a| a.size).sum()
    }

    /// The PDF artifact, if any
    pub fn pdf(&self) -> Option<&Artifact> {
        self.find(ArtifactKind::Pdf)
    }

    /// The PNG artifact, if any
    pub fn png(&self) -> Option<&Artifact> {
        self.find(ArtifactKind::Png)
    }

    /// True when the PDF came from the PNG conversion
    pub fn used_fallback(&self) -> bool {
        self.pdf()
            .is_some_and(|a| a.origin == ArtifactOrigin::PngFallback)
    }

    fn find(&self, kind: ArtifactKind) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.kind == kind)
    }
}

/// One page capture
pub struct PageCaptureJob {
    config: CaptureConfig,
}

impl PageCaptureJob {
    /// Create a job from a config
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    /// Get the job configuration
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Output path for `kind` at `stamp`
    pub fn artifact_path(&self, stamp: &CaptureStamp, kind: ArtifactKind) -> PathBuf {
        self.config
            .out_dir
            .join(stamp.file_name(kind.extension()))
    }

    /// Run against a freshly launched Chromium
    pub async fn run(&self) -> Result<CaptureResult> {
        let stamp = CaptureStamp::now(self.config.zone, self.config.location_label.clone());
        UrlValidator::validate(&self.config.url)?;

        let session = ChromeSession::open(
            BrowserConfig::from(&self.config),
            &self.config.user_agent,
            &self.config.locale,
        )
        .await?;

        self.run_with(&session, stamp).await
    }

    /// Run against an already open session. The session is closed before
    /// returning, whether the capture succeeded or not.
    pub async fn run_with<S>(&self, session: &S, stamp: CaptureStamp) -> Result<CaptureResult>
    where
        S: PageSession + ?Sized,
    {
        info!("========================================");
        info!("Local time: {}", stamp);
        info!(
            "Saving to: {}",
            self.config.out_dir.join(stamp.file_stem()).display()
        );
        info!("========================================");

        let outcome = self.capture(session, &stamp).await;

        if let Err(e) = session.close().await {
            warn!("Failed to release browser session: {}", e);
        }

        match &outcome {
            Ok(result) => {
                for artifact in &result.artifacts {
                    info!("[OK] {} saved: {}", artifact.kind, artifact.path.display());
                }
                info!(
                    "{} artifact(s), {} KB total",
                    result.artifacts.len(),
                    result.total_bytes() / 1024
                );
            }
            Err(e) => warn!("Capture failed: {}", e),
        }
        outcome
    }

    async fn capture<S>(&self, session: &S, stamp: &CaptureStamp) -> Result<CaptureResult>
    where
        S: PageSession + ?Sized,
    {
        tokio::fs::create_dir_all(&self.config.out_dir).await?;

        self.prepare_page(session).await?;

        let png_path = self.artifact_path(stamp, ArtifactKind::Png);
        let pdf_path = self.artifact_path(stamp, ArtifactKind::Pdf);

        let artifacts = match self.config.mode {
            CaptureMode::Pdf => vec![self.export_pdf(session, &pdf_path).await?],
            CaptureMode::Png => vec![self.export_png(session, &png_path).await?.0],
            CaptureMode::PngWithPdfFallback => {
                let (png, png_bytes) = self.export_png(session, &png_path).await?;
                let pdf = self
                    .export_pdf_with_fallback(session, &pdf_path, &png_bytes)
                    .await?;
                vec![png, pdf]
            }
        };

        Ok(CaptureResult {
            timestamp: *stamp.local(),
            artifacts,
            success: true,
        })
    }

    /// Navigate, let the page settle, scroll it fully, return to the top
    #[instrument(skip(self, session))]
    async fn prepare_page<S>(&self, session: &S) -> Result<()>
    where
        S: PageSession + ?Sized,
    {
        let cfg = &self.config;

        session.navigate(&cfg.url, cfg.navigation_timeout).await?;
        info!("Page loaded, waiting for network to settle");
        session.wait_for_network_idle(cfg.network_idle_timeout).await?;
        tokio::time::sleep(cfg.settle_delay).await;

        scroll_through(session, cfg.scroll_step, cfg.scroll_delay).await?;
        tokio::time::sleep(cfg.top_settle_delay).await;
        Ok(())
    }

    /// Full-page PNG; an undersized PNG is terminal
    async fn export_png<S>(&self, session: &S, path: &Path) -> Result<(Artifact, Vec<u8>)>
    where
        S: PageSession + ?Sized,
    {
        let bytes = session.capture_png().await?;
        let artifact = store_artifact(
            ArtifactKind::Png,
            path,
            &bytes,
            self.config.min_bytes,
            ArtifactOrigin::Browser,
        )
        .await?;
        Ok((artifact, bytes))
    }

    /// Browser PDF scaled to the rendered content width
    async fn export_pdf<S>(&self, session: &S, path: &Path) -> Result<Artifact>
    where
        S: PageSession + ?Sized,
    {
        let cfg = &self.config;
        let content_width = session.content_width().await?;
        let layout =
            PdfLayout::new(cfg.paper, cfg.landscape, cfg.margins).fitted_to(content_width);

        let bytes = session.print_pdf(&layout).await?;
        store_artifact(
            ArtifactKind::Pdf,
            path,
            &bytes,
            cfg.min_bytes,
            ArtifactOrigin::Browser,
        )
        .await
    }

    async fn export_pdf_with_fallback<S>(
        &self,
        session: &S,
        path: &Path,
        png: &[u8],
    ) -> Result<Artifact>
    where
        S: PageSession + ?Sized,
    {
        let pdf_error = match self.export_pdf(session, path).await {
            Ok(artifact) => return Ok(artifact),
            Err(e) => e,
        };

        if pdf_error.is_verification_failure() {
            warn!("Browser PDF rejected ({}), converting PNG to PDF", pdf_error);
        } else {
            warn!("PDF export failed ({}), converting PNG to PDF", pdf_error);
        }

        self.convert_png(path, png).await.map_err(|source| {
            ConversionError::Fallback {
                pdf_error: pdf_error.to_string(),
                source: Box::new(source),
            }
            .into()
        })
    }

    async fn convert_png(&self, path: &Path, png: &[u8]) -> Result<Artifact> {
        let pdf = png_to_pdf(png)?;
        store_artifact(
            ArtifactKind::Pdf,
            path,
            &pdf,
            self.config.min_bytes,
            ArtifactOrigin::PngFallback,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn artifact(kind: ArtifactKind, size: u64, origin: ArtifactOrigin) -> Artifact {
        Artifact {
            kind,
            path: PathBuf::from(format!("captures/x.{}", kind.extension())),
            size,
            origin,
        }
    }

    fn result(artifacts: Vec<Artifact>) -> CaptureResult {
        CaptureResult {
            timestamp: chrono::Utc::now().with_timezone(&chrono_tz::America::Chicago),
            artifacts,
            success: true,
        }
    }

    #[test]
    fn test_capture_mode_default_is_fallback_chain() {
        assert_eq!(CaptureMode::default(), CaptureMode::PngWithPdfFallback);
        assert_eq!(
            serde_json::to_string(&CaptureMode::PngWithPdfFallback).unwrap(),
            "\"png-with-pdf-fallback\""
        );
    }

    #[test]
    fn test_result_accessors() {
        let r = result(vec![
            artifact(ArtifactKind::Png, 40_000, ArtifactOrigin::Browser),
            artifact(ArtifactKind::Pdf, 25_000, ArtifactOrigin::PngFallback),
        ]);
        assert_eq!(r.total_bytes(), 65_000);
        assert_eq!(r.paths().len(), 2);
        assert_eq!(r.png().map(|a| a.size), Some(40_000));
        assert!(r.used_fallback());
    }

    #[test]
    fn test_result_without_pdf() {
        let r = result(vec![artifact(
            ArtifactKind::Png,
            40_000,
            ArtifactOrigin::Browser,
        )]);
        assert!(r.pdf().is_none());
        assert!(!r.used_fallback());
    }

    #[test]
    fn test_artifact_path_embeds_stamp() {
        let job = PageCaptureJob::new(CaptureConfig::builder().out_dir("out").build());
        let utc = chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2025, 3, 9, 12, 0, 0).unwrap();
        let stamp = CaptureStamp::at(utc, chrono_tz::America::Chicago, "BatonRouge");
        assert_eq!(
            job.artifact_path(&stamp, ArtifactKind::Pdf),
            PathBuf::from("out/buoy_20250309_070000_BatonRouge.pdf")
        );
    }
}
