//! Browser lifecycle management
//!
//! This module handles browser launch, shutdown, and page creation.

use crate::config::CaptureConfig;
use crate::error::{BrowserError, Error, Result};
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Configuration for browser launch
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode (default: true)
    pub headless: bool,
    /// Browser window width (default: 2400)
    pub width: u32,
    /// Browser window height (default: 1400)
    pub height: u32,
    /// Path to Chrome/Chromium executable (None = auto-detect)
    pub chrome_path: Option<String>,
    /// Continue past certificate errors (default: true)
    pub ignore_https_errors: bool,
    /// UI language passed as `--lang` (default: en-US)
    pub locale: String,
    /// Additional Chrome arguments
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self::from(&CaptureConfig::default())
    }
}

impl From<&CaptureConfig> for BrowserConfig {
    fn from(config: &CaptureConfig) -> Self {
        Self {
            headless: config.headless,
            width: config.width,
            height: config.height,
            chrome_path: config.chrome_path.clone(),
            ignore_https_errors: config.ignore_https_errors,
            locale: config.locale.clone(),
            extra_args: config.extra_args.clone(),
        }
    }
}

impl BrowserConfig {
    /// Chrome command-line arguments derived from this config
    pub fn launch_args(&self) -> Vec<String> {
        let mut args = vec![format!("--lang={}", self.locale)];
        if self.ignore_https_errors {
            args.push("--ignore-certificate-errors".to_string());
        }
        for arg in &self.extra_args {
            if !args.contains(arg) {
                args.push(arg.clone());
            }
        }
        args
    }
}

/// High-level browser controller
pub struct BrowserController {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserController {
    /// Create a new browser controller with custom config
    #[instrument(skip(config))]
    pub async fn with_config(config: BrowserConfig) -> Result<Self> {
        info!(
            "Launching browser: headless={} viewport={}x{}",
            config.headless, config.width, config.height
        );

        let mut builder = CdpBrowserConfig::builder()
            .window_size(config.width, config.height)
            .viewport(chromiumoxide::handler::viewport::Viewport {
                width: config.width,
                height: config.height,
                device_scale_factor: None,
                emulating_mobile: false,
                is_landscape: true,
                has_touch: false,
            });

        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        for arg in config.launch_args() {
            builder = builder.arg(arg);
        }

        let cdp_config = builder
            .build()
            .map_err(|e| BrowserError::ConfigError(e.to_string()))?;

        let (browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        // Spawn handler task
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    warn!("Browser handler event error");
                    break;
                }
            }
            debug!("Browser handler finished");
        });

        info!("Browser launched successfully");

        Ok(Self {
            browser,
            handler: handler_task,
        })
    }

    /// Create a new page/tab
    #[instrument(skip(self))]
    pub async fn new_page(&self) -> Result<Page> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::PageCreationFailed(e.to_string()))?;

        debug!("Created new page");
        Ok(page)
    }

    /// Close the browser
    #[instrument(skip(self))]
    pub async fn close(mut self) -> Result<()> {
        info!("Closing browser");

        let closed = self
            .browser
            .close()
            .await
            .map_err(|e| Error::cdp(e.to_string()));

        // Wait for handler to finish
        let _ = tokio::time::timeout(Duration::from_secs(5), &mut self.handler).await;
        self.handler.abort();

        closed?;
        info!("Browser closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_config_default() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert_eq!(config.width, 2400);
        assert_eq!(config.height, 1400);
        assert!(config.ignore_https_errors);
        assert_eq!(config.locale, "en-US");
        assert!(config.chrome_path.is_none());
    }

    #[test]
    fn test_launch_args() {
        let config = BrowserConfig::default();
        let args = config.launch_args();
        assert_eq!(args[0], "--lang=en-US");
        assert!(args.contains(&"--ignore-certificate-errors".to_string()));
        assert!(args.contains(&"--disable-dev-shm-usage".to_string()));
        assert!(args.contains(&"--no-sandbox".to_string()));
        assert!(args.contains(&"--disable-gpu".to_string()));
    }

    #[test]
    fn test_launch_args_respect_tls_errors() {
        let config = BrowserConfig {
            ignore_https_errors: false,
            extra_args: vec!["--no-sandbox".to_string(), "--no-sandbox".to_string()],
            ..BrowserConfig::default()
        };
        let args = config.launch_args();
        assert!(!args.contains(&"--ignore-certificate-errors".to_string()));
        assert_eq!(args.iter().filter(|a| *a == "--no-sandbox").count(), 1);
    }
}
