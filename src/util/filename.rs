//! Capture filename generation

use chrono::{DateTime, Utc};

/// Prefix of every screenshot filename
pub const SCREENSHOT_PREFIX: &str = "screenshot";

/// Builds `<prefix>_<YYYY-MM-DD>_<HH-MM-SS>.<ext>` from a UTC timestamp
///
/// Two captures within the same second get the same name; the later one
/// overwrites the earlier at every destination.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use shotpipe::util::filename::capture_filename;
///
/// let at = Utc.with_ymd_and_hms(2025, 8, 7, 14, 30, 52).unwrap();
/// assert_eq!(capture_filename("screenshot", "png", at), "screenshot_2025-08-07_14-30-52.png");
/// ```
pub fn capture_filename(prefix: &str, ext: &str, timestamp: DateTime<Utc>) -> String {
    format!("{}_{}.{}", prefix, timestamp.format("%Y-%m-%d_%H-%M-%S"), ext)
}

/// Screenshot filename for the current time
pub fn screenshot_filename_now() -> String {
    capture_filename(SCREENSHOT_PREFIX, "png", Utc::now())
}
