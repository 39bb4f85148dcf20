//! The browser seam used by the capture job
//!
//! [`PageSession`] is everything a capture needs from a browser tab. The
//! production implementation is [`ChromeSession`]; tests drive the job with
//! scripted sessions instead.

use super::capture::{PageCapture, PdfLayout};
use super::controller::{BrowserConfig, BrowserController};
use super::navigation::PageNavigator;
use crate::error::{BrowserError, NavigationError, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetLocaleOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::security::SetIgnoreCertificateErrorsParams;
use chromiumoxide::Page;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// One open page in a browser session
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigate and wait for DOMContentLoaded, bounded by `timeout`
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Wait for network activity to quiesce, giving up after `cap`
    async fn wait_for_network_idle(&self, cap: Duration) -> Result<()>;

    /// `document.body.scrollHeight` in CSS pixels
    async fn document_height(&self) -> Result<u32>;

    /// Rendered document width in CSS pixels
    async fn content_width(&self) -> Result<u32>;

    /// Scroll the window to vertical offset `y`
    async fn scroll_to(&self, y: u32) -> Result<()>;

    /// Full-page PNG
    async fn capture_png(&self) -> Result<Vec<u8>>;

    /// PDF print of the page
    async fn print_pdf(&self, layout: &PdfLayout) -> Result<Vec<u8>>;

    /// Release the session. Called exactly once by the job.
    async fn close(&self) -> Result<()>;
}

/// A Chromium tab plus the browser that owns it
pub struct ChromeSession {
    controller: Mutex<Option<BrowserController>>,
    page: Page,
}

impl ChromeSession {
    /// Launch a browser and open one configured tab
    #[instrument(skip(config, user_agent))]
    pub async fn open(config: BrowserConfig, user_agent: &str, locale: &str) -> Result<Self> {
        let ignore_https_errors = config.ignore_https_errors;
        let controller = BrowserController::with_config(config).await?;

        let page = match controller.new_page().await {
            Ok(page) => page,
            Err(e) => {
                if let Err(close_err) = controller.close().await {
                    warn!("Failed to close browser after page error: {}", close_err);
                }
                return Err(e);
            }
        };

        let session = Self {
            controller: Mutex::new(Some(controller)),
            page,
        };

        if let Err(e) = session
            .apply_identity(user_agent, locale, ignore_https_errors)
            .await
        {
            if let Err(close_err) = session.close().await {
                warn!("Failed to close browser after setup error: {}", close_err);
            }
            return Err(e);
        }

        Ok(session)
    }

    /// Spoofed user agent, locale and certificate policy for this tab
    async fn apply_identity(
        &self,
        user_agent: &str,
        locale: &str,
        ignore_https_errors: bool,
    ) -> Result<()> {
        let mut ua = SetUserAgentOverrideParams::new(user_agent);
        ua.accept_language = Some(locale.to_string());
        self.page
            .execute(ua)
            .await
            .map_err(|e| BrowserError::PageSetupFailed(format!("user agent: {e}")))?;

        let locale_params = SetLocaleOverrideParams {
            locale: Some(locale.to_string()),
        };
        self.page
            .execute(locale_params)
            .await
            .map_err(|e| BrowserError::PageSetupFailed(format!("locale: {e}")))?;

        if ignore_https_errors {
            self.page
                .execute(SetIgnoreCertificateErrorsParams::new(true))
                .await
                .map_err(|e| BrowserError::PageSetupFailed(format!("certificate policy: {e}")))?;
        }

        debug!("Page identity applied: locale={}", locale);
        Ok(())
    }

    async fn eval_u32(&self, expression: &str) -> Result<u32> {
        let value: f64 = self
            .page
            .evaluate(expression)
            .await
            .map_err(|e| NavigationError::ScriptFailed(e.to_string()))?
            .into_value()?;
        Ok(value.max(0.0).round() as u32)
    }
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        PageNavigator::goto(&self.page, url, timeout).await
    }

    async fn wait_for_network_idle(&self, cap: Duration) -> Result<()> {
        PageNavigator::wait_for_network_idle(&self.page, cap).await
    }

    async fn document_height(&self) -> Result<u32> {
        self.eval_u32("document.body.scrollHeight").await
    }

    async fn content_width(&self) -> Result<u32> {
        self.eval_u32(
            "Math.max(document.documentElement.scrollWidth, document.body ? document.body.scrollWidth : 0)",
        )
        .await
    }

    async fn scroll_to(&self, y: u32) -> Result<()> {
        let script = format!("window.scrollTo(0, {y});");
        self.page
            .evaluate(script.as_str())
            .await
            .map_err(|e| NavigationError::ScriptFailed(e.to_string()))?;
        Ok(())
    }

    async fn capture_png(&self) -> Result<Vec<u8>> {
        PageCapture::full_page_png(&self.page).await
    }

    async fn print_pdf(&self, layout: &PdfLayout) -> Result<Vec<u8>> {
        PageCapture::pdf(&self.page, layout).await
    }

    async fn close(&self) -> Result<()> {
        match self.controller.lock().await.take() {
            Some(controller) => controller.close().await,
            None => Ok(()),
        }
    }
}
