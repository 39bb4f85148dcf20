//! Page navigation functionality
//!
//! Navigation with a hard timeout, followed by readiness waits: the
//! DOMContentLoaded event and a network-idle heuristic for pages that keep
//! loading widgets after the document is parsed.

use crate::error::{Error, NavigationError, Result};
use chromiumoxide::Page;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Quiet period that counts as "network idle"
pub const NETWORK_QUIET_MS: u64 = 500;

/// URL validation utilities
pub struct UrlValidator;

impl UrlValidator {
    /// Validate a URL for navigation
    pub fn validate(raw: &str) -> std::result::Result<url::Url, NavigationError> {
        if raw.is_empty() {
            return Err(NavigationError::InvalidUrl("URL cannot be empty".to_string()));
        }

        let parsed =
            url::Url::parse(raw).map_err(|e| NavigationError::InvalidUrl(format!("{raw}: {e}")))?;

        match parsed.scheme() {
            "http" | "https" | "file" => Ok(parsed),
            other => Err(NavigationError::InvalidUrl(format!(
                "unsupported scheme '{other}' in {raw}"
            ))),
        }
    }
}

/// Page navigator
pub struct PageNavigator;

impl PageNavigator {
    /// Navigate to `url`, bounded by `timeout`, then wait for DOMContentLoaded
    #[instrument(skip(page))]
    pub async fn goto(page: &Page, url: &str, timeout: Duration) -> Result<()> {
        let url = UrlValidator::validate(url)?;
        let timeout_ms = timeout.as_millis() as u64;

        info!("Navigating to: {}", url);

        tokio::time::timeout(timeout, page.goto(url.as_str()))
            .await
            .map_err(|_| NavigationError::Timeout(timeout_ms))?
            .map_err(|e| NavigationError::LoadFailed(e.to_string()))?;

        Self::wait_for_dom_content_loaded(page, timeout).await?;

        let final_url = page
            .url()
            .await
            .map_err(|e| Error::cdp(e.to_string()))?
            .unwrap_or_else(|| url.to_string());
        debug!("Navigation complete: {} -> {}", url, final_url);

        Ok(())
    }

    async fn wait_for_dom_content_loaded(page: &Page, timeout: Duration) -> Result<()> {
        let script = r#"
            new Promise(resolve => {
                if (document.readyState !== 'loading') {
                    resolve(true);
                } else {
                    document.addEventListener('DOMContentLoaded', () => resolve(true));
                }
            })
        "#;

        tokio::time::timeout(timeout, page.evaluate(script))
            .await
            .map_err(|_| NavigationError::Timeout(timeout.as_millis() as u64))?
            .map_err(|e| NavigationError::ScriptFailed(e.to_string()))?;

        Ok(())
    }

    /// Wait until no new resources have started loading for
    /// [`NETWORK_QUIET_MS`], giving up after `cap`.
    ///
    /// Hitting the cap is logged, not returned as an error.
    #[instrument(skip(page))]
    pub async fn wait_for_network_idle(page: &Page, cap: Duration) -> Result<()> {
        if cap.is_zero() {
            return Ok(());
        }

        let cap_ms = cap.as_millis() as u64;
        let script = format!(
            r#"
                new Promise(resolve => {{
                    const quiet = {NETWORK_QUIET_MS};
                    const deadline = Date.now() + {cap_ms};
                    let seen = performance.getEntriesByType('resource').length;
                    let lastChange = Date.now();
                    (function check() {{
                        const now = Date.now();
                        const count = performance.getEntriesByType('resource').length;
                        if (count !== seen) {{
                            seen = count;
                            lastChange = now;
                        }}
                        if (now - lastChange >= quiet) {{
                            resolve(true);
                        }} else if (now >= deadline) {{
                            resolve(false);
                        }} else {{
                            setTimeout(check, 100);
                        }}
                    }})();
                }})
            "#
        );

        // the script resolves on its own deadline; the outer timeout only
        // guards against a wedged renderer
        let outer = cap + Duration::from_secs(5);
        let idle = tokio::time::timeout(outer, page.evaluate(script.as_str()))
            .await
            .map_err(|_| NavigationError::Timeout(outer.as_millis() as u64))?
            .map_err(|e| NavigationError::ScriptFailed(e.to_string()))?
            .into_value::<bool>()
            .unwrap_or(false);

        if idle {
            debug!("Network idle");
        } else {
            warn!("Network still busy after {}ms, continuing", cap_ms);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_validation_valid_https() {
        let url = UrlValidator::validate(crate::config::DEFAULT_URL).unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("www.southeastern.edu"));
    }

    #[test]
    fn test_url_validation_valid_file() {
        assert!(UrlValidator::validate("file:///tmp/dashboard.html").is_ok());
    }

    #[test]
    fn test_url_validation_empty() {
        let err = UrlValidator::validate("").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_url_validation_no_scheme() {
        assert!(UrlValidator::validate("example.com").is_err());
    }

    #[test]
    fn test_url_validation_unsupported_scheme() {
        let err = UrlValidator::validate("ftp://example.com").unwrap_err();
        assert!(err.to_string().contains("unsupported scheme 'ftp'"));
    }
}
