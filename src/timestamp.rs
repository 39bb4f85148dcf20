//! Zone-local capture timestamps
//!
//! A [`CaptureStamp`] is taken once per run; both the output file names and
//! the console banner derive from it so they always agree.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt;

/// Format used inside file names
pub const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Human-readable format for console output
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %I:%M:%S %p %Z";

/// The local time a capture was started at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureStamp {
    local: DateTime<Tz>,
    label: String,
}

impl CaptureStamp {
    /// Stamp the current instant in `zone`
    pub fn now(zone: Tz, label: impl Into<String>) -> Self {
        Self::at(Utc::now(), zone, label)
    }

    /// Stamp a given instant in `zone`
    pub fn at(instant: DateTime<Utc>, zone: Tz, label: impl Into<String>) -> Self {
        Self {
            local: zone.from_utc_datetime(&instant.naive_utc()),
            label: label.into(),
        }
    }

    /// Zone-local time
    pub fn local(&self) -> &DateTime<Tz> {
        &self.local
    }

    /// `buoy_<YYYYmmdd_HHMMSS>_<label>`
    pub fn file_stem(&self) -> String {
        format!(
            "buoy_{}_{}",
            self.local.format(FILE_STAMP_FORMAT),
            self.label
        )
    }

    /// File name for the given extension
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.file_stem(), extension)
    }
}

impl fmt::Display for CaptureStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.local.format(DISPLAY_FORMAT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Chicago;

    #[test]
    fn test_file_stem_uses_local_time_in_summer() {
        // 2025-07-04 17:30:05 UTC is 12:30:05 CDT
        let utc = Utc.with_ymd_and_hms(2025, 7, 4, 17, 30, 5).unwrap();
        let stamp = CaptureStamp::at(utc, Chicago, "BatonRouge");
        assert_eq!(stamp.file_stem(), "buoy_20250704_123005_BatonRouge");
        assert_eq!(stamp.to_string(), "2025-07-04 12:30:05 PM CDT");
    }

    #[test]
    fn test_file_stem_uses_local_time_in_winter() {
        // 2025-01-15 03:00:00 UTC is the previous evening, 21:00 CST
        let utc = Utc.with_ymd_and_hms(2025, 1, 15, 3, 0, 0).unwrap();
        let stamp = CaptureStamp::at(utc, Chicago, "BatonRouge");
        assert_eq!(stamp.file_name("pdf"), "buoy_20250114_210000_BatonRouge.pdf");
        assert_eq!(stamp.to_string(), "2025-01-14 09:00:00 PM CST");
    }

    #[test]
    fn test_now_matches_zone_clock() {
        let before = Utc::now().with_timezone(&Chicago);
        let stamp = CaptureStamp::now(Chicago, "BatonRouge");
        let after = Utc::now().with_timezone(&Chicago);
        assert!(*stamp.local() >= before && *stamp.local() <= after);
        assert_eq!(stamp.local().timezone(), Chicago);
    }
}
