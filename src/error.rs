//! Error types for buoy-capture
//!
//! One `thiserror` hierarchy covers every stage of a capture job: browser
//! lifecycle, navigation, export, artifact verification and the PNG -> PDF
//! fallback.

use crate::artifact::ArtifactKind;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for capture operations
#[derive(Error, Debug)]
pub enum Error {
    /// Browser-related errors
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Navigation errors
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Capture errors (screenshot, PDF, artifact checks)
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// PNG -> PDF conversion errors
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ChromiumOxide errors
    #[error("CDP error: {0}")]
    Cdp(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Browser lifecycle and control errors
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Failed to launch browser
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Browser configuration error
    #[error("Invalid browser configuration: {0}")]
    ConfigError(String),

    /// Failed to create new page/tab
    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    /// Failed to apply the session identity (user agent, locale, TLS policy)
    #[error("Failed to configure page: {0}")]
    PageSetupFailed(String),
}

/// Navigation errors
#[derive(Error, Debug)]
pub enum NavigationError {
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Navigation timeout
    #[error("Navigation timed out after {0}ms")]
    Timeout(u64),

    /// Page load failed
    #[error("Page load failed: {0}")]
    LoadFailed(String),

    /// Script evaluation during page preparation failed
    #[error("Script evaluation failed: {0}")]
    ScriptFailed(String),
}

/// Capture errors (screenshots, PDFs, output checks)
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Screenshot failed
    #[error("Screenshot capture failed: {0}")]
    ScreenshotFailed(String),

    /// PDF generation failed
    #[error("PDF generation failed: {0}")]
    PdfFailed(String),

    /// Artifact was not written
    #[error("{kind} artifact missing at {}", path.display())]
    Missing {
        /// Which artifact
        kind: ArtifactKind,
        /// Expected location
        path: PathBuf,
    },

    /// Artifact is below the minimum size
    #[error("{kind} artifact {} is undersized: {size} bytes (minimum {min})", path.display())]
    Undersized {
        /// Which artifact
        kind: ArtifactKind,
        /// Location of the file
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Required minimum in bytes
        min: u64,
    },
}

/// PNG -> PDF conversion errors
#[derive(Error, Debug)]
pub enum ConversionError {
    /// PNG could not be decoded
    #[error("Failed to decode PNG: {0}")]
    Decode(String),

    /// PDF stream could not be encoded
    #[error("Failed to encode PDF: {0}")]
    Encode(String),

    /// The fallback chain itself failed after the browser PDF export failed
    #[error("PNG fallback failed after PDF export error ({pdf_error}): {source}")]
    Fallback {
        /// Why the browser PDF was rejected
        pdf_error: String,
        /// Why the fallback failed
        #[source]
        source: Box<Error>,
    },
}

/// Result type alias for capture operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }

    /// Create a CDP error from a string
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }

    /// True when this error is an undersized or missing artifact
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Error::Capture(CaptureError::Undersized { .. } | CaptureError::Missing { .. })
        )
    }
}

/// Convert chromiumoxide errors
impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

impl From<image::ImageError> for ConversionError {
    fn from(err: image::ImageError) -> Self {
        ConversionError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Browser(BrowserError::LaunchFailed("no chrome".to_string()));
        assert!(err.to_string().contains("Failed to launch browser"));
        assert!(err.to_string().contains("no chrome"));
    }

    #[test]
    fn test_undersized_names_artifact_and_size() {
        let err = CaptureError::Undersized {
            kind: ArtifactKind::Png,
            path: PathBuf::from("captures/buoy_20250101_000000_BatonRouge.png"),
            size: 812,
            min: 10240,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("PNG artifact"));
        assert!(msg.contains("buoy_20250101_000000_BatonRouge.png"));
        assert!(msg.contains("812 bytes"));
        assert!(msg.contains("10240"));
    }

    #[test]
    fn test_navigation_timeout() {
        let err = Error::from(NavigationError::Timeout(180000));
        assert_eq!(
            err.to_string(),
            "Navigation error: Navigation timed out after 180000ms"
        );
    }

    #[test]
    fn test_fallback_keeps_both_causes() {
        let err = ConversionError::Fallback {
            pdf_error: "PDF generation failed: printing disabled".to_string(),
            source: Box::new(Error::from(ConversionError::Decode("bad header".into()))),
        };
        let msg = err.to_string();
        assert!(msg.contains("printing disabled"));
        assert!(msg.contains("bad header"));
    }

    #[test]
    fn test_is_verification_failure() {
        let undersized = Error::from(CaptureError::Undersized {
            kind: ArtifactKind::Pdf,
            path: PathBuf::from("x.pdf"),
            size: 1,
            min: 2,
        });
        assert!(undersized.is_verification_failure());
        assert!(!Error::generic("other").is_verification_failure());
    }
}
