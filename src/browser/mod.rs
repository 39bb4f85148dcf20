//! Browser automation module
//!
//! Headless Chromium control through ChromiumOxide: lifecycle, navigation,
//! lazy-load scrolling, and PNG/PDF export.

pub mod capture;
pub mod controller;
pub mod navigation;
pub mod scroll;
pub mod session;

pub use capture::{Margins, PageCapture, PaperSize, PdfLayout};
pub use controller::{BrowserConfig, BrowserController};
pub use navigation::{PageNavigator, UrlValidator};
pub use scroll::{scroll_through, ScrollPlan};
pub use session::{ChromeSession, PageSession};
