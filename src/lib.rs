//! buoy-capture - timestamped snapshots of the Lake Maurepas buoy dashboard
//!
//! This crate drives headless Chromium over CDP to render a public
//! environmental-monitoring page and save it as PNG and/or PDF files named
//! after the local (America/Chicago) time of capture.
//!
//! # Pipeline
//!
//! ```text
//! CaptureStamp ──▶ ChromeSession ──▶ navigate + network idle + settle
//!                                            │
//!                                            ▼
//!                                   scroll_through (lazy loading)
//!                                            │
//!                       ┌────────────────────┴───────────────┐
//!                       ▼                                    ▼
//!                 full-page PNG ──── PDF failed? ────▶ browser PDF
//!                       │          png_to_pdf()              │
//!                       ▼                                    ▼
//!                 verify_artifact ≥ 10 KB           verify_artifact ≥ 10 KB
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use buoy_capture::{CaptureConfig, PageCaptureJob};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let job = PageCaptureJob::new(CaptureConfig::default());
//!     let result = job.run().await?;
//!
//!     for path in result.paths() {
//!         println!("Saved: {}", path.display());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod artifact;
pub mod browser;
pub mod config;
pub mod convert;
pub mod error;
pub mod job;
pub mod timestamp;

// Re-exports for convenience
pub use artifact::{Artifact, ArtifactKind, ArtifactOrigin};
pub use browser::{ChromeSession, PageSession};
pub use config::CaptureConfig;
pub use error::{Error, Result};
pub use job::{CaptureMode, CaptureResult, PageCaptureJob};
pub use timestamp::CaptureStamp;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
