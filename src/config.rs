//! Capture job configuration
//!
//! Every constant the job depends on lives in [`CaptureConfig`]. The
//! defaults reproduce the fixed Lake Maurepas capture; the builder exists so
//! the CLI and tests can override individual fields.

use crate::browser::capture::{Margins, PaperSize};
use crate::job::CaptureMode;
use chrono_tz::Tz;
use std::path::PathBuf;
use std::time::Duration;

/// Lake Maurepas buoy dashboard
pub const DEFAULT_URL: &str = "https://www.southeastern.edu/college-of-science-and-technology/center-for-environmental-research/lakemaurepas/buoydata/";

/// Desktop Safari identity presented to the site
pub const SAFARI_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_6) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) \
     Version/16.6 Safari/605.1.15";

/// Artifacts smaller than this are treated as broken renders
pub const MIN_ARTIFACT_BYTES: u64 = 10 * 1024;

/// Configuration for one capture run
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Page to capture
    pub url: String,
    /// Directory that receives the artifacts
    pub out_dir: PathBuf,
    /// Zone used for timestamps and file names
    pub zone: Tz,
    /// Suffix appended to file stems
    pub location_label: String,
    /// Which artifacts to produce
    pub mode: CaptureMode,
    /// Run without a visible window (default: true)
    pub headless: bool,
    /// Path to Chrome/Chromium executable (None = auto-detect)
    pub chrome_path: Option<String>,
    /// Viewport width; wide enough to force the multi-column layout
    pub width: u32,
    /// Viewport height
    pub height: u32,
    /// User agent override
    pub user_agent: String,
    /// Accept-Language / emulated locale
    pub locale: String,
    /// Continue past certificate errors
    pub ignore_https_errors: bool,
    /// Navigation timeout
    pub navigation_timeout: Duration,
    /// Upper bound for the network-idle wait
    pub network_idle_timeout: Duration,
    /// Fixed delay after load for iframes and charts
    pub settle_delay: Duration,
    /// Scroll increment in CSS pixels
    pub scroll_step: u32,
    /// Pause after each scroll increment
    pub scroll_delay: Duration,
    /// Pause after returning to the top, before export
    pub top_settle_delay: Duration,
    /// Paper used for the PDF export
    pub paper: PaperSize,
    /// Landscape orientation for the PDF export
    pub landscape: bool,
    /// PDF margins in inches
    pub margins: Margins,
    /// Minimum size for every artifact
    pub min_bytes: u64,
    /// Additional Chrome arguments
    pub extra_args: Vec<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            out_dir: PathBuf::from("captures"),
            zone: chrono_tz::America::Chicago,
            location_label: "BatonRouge".to_string(),
            mode: CaptureMode::default(),
            headless: true,
            chrome_path: None,
            width: 2400,
            height: 1400,
            user_agent: SAFARI_USER_AGENT.to_string(),
            locale: "en-US".to_string(),
            ignore_https_errors: true,
            navigation_timeout: Duration::from_millis(180_000),
            network_idle_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_millis(8000),
            scroll_step: 400,
            scroll_delay: Duration::from_millis(800),
            top_settle_delay: Duration::from_millis(2000),
            paper: PaperSize::A2,
            landscape: true,
            margins: Margins::uniform(0.3),
            min_bytes: MIN_ARTIFACT_BYTES,
            extra_args: vec![
                "--disable-dev-shm-usage".to_string(),
                "--no-sandbox".to_string(),
                "--disable-gpu".to_string(),
            ],
        }
    }
}

impl CaptureConfig {
    /// Create a new config builder
    pub fn builder() -> CaptureConfigBuilder {
        CaptureConfigBuilder::default()
    }
}

/// Builder for CaptureConfig
#[derive(Default)]
pub struct CaptureConfigBuilder {
    config: CaptureConfig,
}

impl CaptureConfigBuilder {
    /// Set the target URL
    pub fn url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.url = url.into();
        self
    }

    /// Set the output directory
    pub fn out_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.out_dir = dir.into();
        self
    }

    /// Set the time zone and the label used in file names
    pub fn zone<S: Into<String>>(mut self, zone: Tz, label: S) -> Self {
        self.config.zone = zone;
        self.config.location_label = label.into();
        self
    }

    /// Set the capture mode
    pub fn mode(mut self, mode: CaptureMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Set Chrome path
    pub fn chrome_path<S: Into<String>>(mut self, path: S) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    /// Set viewport dimensions
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    /// Set user agent
    pub fn user_agent<S: Into<String>>(mut self, ua: S) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Set navigation timeout
    pub fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.config.navigation_timeout = timeout;
        self
    }

    /// Set scroll increment and per-step pause
    pub fn scroll(mut self, step: u32, delay: Duration) -> Self {
        self.config.scroll_step = step;
        self.config.scroll_delay = delay;
        self
    }

    /// Set every fixed wait (network idle cap, settle, top settle, scroll)
    /// to the same duration. Tests use `Duration::ZERO`.
    pub fn waits(mut self, wait: Duration) -> Self {
        self.config.network_idle_timeout = wait;
        self.config.settle_delay = wait;
        self.config.scroll_delay = wait;
        self.config.top_settle_delay = wait;
        self
    }

    /// Set the minimum artifact size
    pub fn min_bytes(mut self, min: u64) -> Self {
        self.config.min_bytes = min;
        self
    }

    /// Add extra Chrome argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.config.extra_args.push(arg.into());
        self
    }

    /// Build the config
    pub fn build(self) -> CaptureConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_config_default() {
        let config = CaptureConfig::default();
        assert_eq!(config.url, DEFAULT_URL);
        assert_eq!(config.out_dir, PathBuf::from("captures"));
        assert_eq!(config.zone, chrono_tz::America::Chicago);
        assert_eq!((config.width, config.height), (2400, 1400));
        assert_eq!(config.navigation_timeout, Duration::from_secs(180));
        assert_eq!(config.scroll_step, 400);
        assert_eq!(config.min_bytes, 10240);
        assert_eq!(config.mode, CaptureMode::PngWithPdfFallback);
        assert!(config.headless);
        assert!(config.ignore_https_errors);
        assert!(config.landscape);
        assert!(config.extra_args.contains(&"--no-sandbox".to_string()));
    }

    #[test]
    fn test_capture_config_builder() {
        let config = CaptureConfig::builder()
            .url("https://example.com/")
            .out_dir("/tmp/out")
            .zone(chrono_tz::UTC, "Utc")
            .mode(CaptureMode::Pdf)
            .headless(false)
            .viewport(1280, 720)
            .scroll(250, Duration::from_millis(10))
            .min_bytes(1)
            .arg("--mute-audio")
            .build();

        assert_eq!(config.url, "https://example.com/");
        assert_eq!(config.out_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.location_label, "Utc");
        assert_eq!(config.mode, CaptureMode::Pdf);
        assert!(!config.headless);
        assert_eq!(config.width, 1280);
        assert_eq!(config.scroll_step, 250);
        assert_eq!(config.scroll_delay, Duration::from_millis(10));
        assert_eq!(config.min_bytes, 1);
        assert_eq!(config.extra_args.last().map(String::as_str), Some("--mute-audio"));
    }

    #[test]
    fn test_waits_zeroes_every_delay() {
        let config = CaptureConfig::builder().waits(Duration::ZERO).build();
        assert_eq!(config.settle_delay, Duration::ZERO);
        assert_eq!(config.scroll_delay, Duration::ZERO);
        assert_eq!(config.top_settle_delay, Duration::ZERO);
        assert_eq!(config.network_idle_timeout, Duration::ZERO);
        // navigation keeps its own timeout
        assert_eq!(config.navigation_timeout, Duration::from_secs(180));
    }
}
