//! Page capture functionality
//!
//! Full-page PNG screenshots and PDF printing over CDP, plus the paper
//! geometry used to fit the rendered page onto a single printed width.

use crate::error::{CaptureError, Result};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, PrintToPdfParams};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// CSS pixels per inch, as used by Chromium's print pipeline
pub const CSS_PX_PER_INCH: f64 = 96.0;

/// Smallest scale CDP accepts for `Page.printToPDF`
pub const MIN_PDF_SCALE: f64 = 0.1;

/// Largest scale CDP accepts for `Page.printToPDF`
pub const MAX_PDF_SCALE: f64 = 2.0;

/// Paper sizes, in portrait inches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    /// ISO A2 (420 x 594 mm)
    #[default]
    A2,
    /// ISO A3 (297 x 420 mm)
    A3,
    /// ISO A4 (210 x 297 mm)
    A4,
    /// US Letter
    Letter,
    /// Arbitrary portrait width/height in inches
    Custom {
        /// Width in inches
        width: f64,
        /// Height in inches
        height: f64,
    },
}

impl PaperSize {
    /// Portrait (width, height) in inches
    pub fn inches(self) -> (f64, f64) {
        match self {
            PaperSize::A2 => (16.54, 23.39),
            PaperSize::A3 => (11.69, 16.54),
            PaperSize::A4 => (8.27, 11.69),
            PaperSize::Letter => (8.5, 11.0),
            PaperSize::Custom { width, height } => (width, height),
        }
    }

    /// (width, height) in inches for the given orientation
    pub fn oriented(self, landscape: bool) -> (f64, f64) {
        let (w, h) = self.inches();
        if landscape {
            (h, w)
        } else {
            (w, h)
        }
    }
}

/// Page margins in inches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    /// Top margin
    pub top: f64,
    /// Bottom margin
    pub bottom: f64,
    /// Left margin
    pub left: f64,
    /// Right margin
    pub right: f64,
}

impl Margins {
    /// Same margin on every side
    pub fn uniform(inches: f64) -> Self {
        Self {
            top: inches,
            bottom: inches,
            left: inches,
            right: inches,
        }
    }
}

/// Geometry of one PDF export
#[derive(Debug, Clone, PartialEq)]
pub struct PdfLayout {
    /// Paper size
    pub paper: PaperSize,
    /// Landscape orientation
    pub landscape: bool,
    /// Margins in inches
    pub margins: Margins,
    /// Print scale factor
    pub scale: f64,
    /// Print CSS backgrounds
    pub print_background: bool,
}

impl PdfLayout {
    /// Layout at scale 1.0
    pub fn new(paper: PaperSize, landscape: bool, margins: Margins) -> Self {
        Self {
            paper,
            landscape,
            margins,
            scale: 1.0,
            print_background: true,
        }
    }

    /// Printable width in CSS pixels
    pub fn printable_width_px(&self) -> f64 {
        let (width, _) = self.paper.oriented(self.landscape);
        (width - self.margins.left - self.margins.right).max(0.0) * CSS_PX_PER_INCH
    }

    /// Scale so that `content_width_px` fills the printable width
    pub fn fit_scale(&self, content_width_px: u32) -> f64 {
        if content_width_px == 0 {
            return 1.0;
        }
        let scale = self.printable_width_px() / f64::from(content_width_px);
        if scale.is_finite() {
            scale.clamp(MIN_PDF_SCALE, MAX_PDF_SCALE)
        } else {
            1.0
        }
    }

    /// Same layout, scaled to fit `content_width_px`
    pub fn fitted_to(mut self, content_width_px: u32) -> Self {
        self.scale = self.fit_scale(content_width_px);
        self
    }

    /// CDP parameters for this layout
    pub fn to_params(&self) -> PrintToPdfParams {
        let (width, height) = self.paper.inches();
        PrintToPdfParams::builder()
            .landscape(self.landscape)
            .print_background(self.print_background)
            .paper_width(width)
            .paper_height(height)
            .margin_top(self.margins.top)
            .margin_bottom(self.margins.bottom)
            .margin_left(self.margins.left)
            .margin_right(self.margins.right)
            .scale(self.scale)
            .prefer_css_page_size(false)
            .build()
    }
}

/// Page capture functionality
pub struct PageCapture;

impl PageCapture {
    /// Take a full-page PNG screenshot
    #[instrument(skip(page))]
    pub async fn full_page_png(page: &Page) -> Result<Vec<u8>> {
        info!("Capturing full-page PNG");

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .from_surface(true)
            .full_page(true)
            .build();

        let data = page
            .screenshot(params)
            .await
            .map_err(|e| CaptureError::ScreenshotFailed(e.to_string()))?;

        debug!("Screenshot captured: {} bytes", data.len());
        Ok(data)
    }

    /// Print the page to PDF
    #[instrument(skip(page))]
    pub async fn pdf(page: &Page, layout: &PdfLayout) -> Result<Vec<u8>> {
        info!(
            "Generating PDF: {:?} landscape={} scale={:.3}",
            layout.paper, layout.landscape, layout.scale
        );

        let data = page
            .pdf(layout.to_params())
            .await
            .map_err(|e| CaptureError::PdfFailed(e.to_string()))?;

        debug!("PDF generated: {} bytes", data.len());
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a2_landscape() -> PdfLayout {
        PdfLayout::new(PaperSize::A2, true, Margins::uniform(0.3))
    }

    #[test]
    fn test_paper_orientation() {
        assert_eq!(PaperSize::A2.oriented(false), (16.54, 23.39));
        assert_eq!(PaperSize::A2.oriented(true), (23.39, 16.54));
        assert_eq!(
            PaperSize::Custom {
                width: 10.0,
                height: 20.0
            }
            .oriented(true),
            (20.0, 10.0)
        );
    }

    #[test]
    fn test_printable_width_a2_landscape() {
        let width = a2_landscape().printable_width_px();
        assert!((width - (23.39 - 0.6) * 96.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_scale_shrinks_wide_content() {
        let layout = a2_landscape();
        let scale = layout.fit_scale(2400);
        assert!(scale < 1.0);
        assert!((scale * 2400.0 - layout.printable_width_px()).abs() < 1e-6);
    }

    #[test]
    fn test_fit_scale_is_clamped() {
        let layout = a2_landscape();
        assert_eq!(layout.fit_scale(1), MAX_PDF_SCALE);
        assert_eq!(layout.fit_scale(1_000_000), MIN_PDF_SCALE);
        assert_eq!(layout.fit_scale(0), 1.0);
    }

    #[test]
    fn test_fitted_to_keeps_geometry() {
        let layout = a2_landscape().fitted_to(2400);
        assert_eq!(layout.paper, PaperSize::A2);
        assert!(layout.landscape);
        assert!(layout.print_background);
        assert!(layout.scale < 1.0);
    }

    #[test]
    fn test_to_params() {
        let params = a2_landscape().fitted_to(2400).to_params();
        assert_eq!(params.landscape, Some(true));
        assert_eq!(params.print_background, Some(true));
        assert_eq!(params.paper_width, Some(16.54));
        assert_eq!(params.paper_height, Some(23.39));
        assert_eq!(params.margin_left, Some(0.3));
        assert!(params.scale.is_some());
    }
}
