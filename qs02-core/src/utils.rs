//! Utility functions for formatting and path handling.
//!
//! Shared by the reports, the encoder progress handling and the CLI.

use crate::error::{CoreError, CoreResult};

use std::path::Path;

/// Formats a byte count with 1024-based units (e.g., 1536 -> "1.50 KB").
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut exp = 0usize;
    let mut scale: u64 = 1;
    while exp + 1 < UNITS.len() && bytes / scale >= 1024 {
        scale *= 1024;
        exp += 1;
    }
    format!("{:.2} {}", bytes as f64 / scale as f64, UNITS[exp])
}

/// Formats a bit rate in b/s, kb/s or Mb/s (decimal units).
#[must_use]
pub fn format_bitrate(bits_per_sec: u64) -> String {
    if bits_per_sec < 1_000 {
        format!("{bits_per_sec} b/s")
    } else if bits_per_sec < 1_000_000 {
        format!("{:.1} kb/s", bits_per_sec as f64 / 1_000.0)
    } else {
        format!("{:.2} Mb/s", bits_per_sec as f64 / 1_000_000.0)
    }
}

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Parses an ffmpeg progress time (HH:MM:SS.ms) to seconds.
#[must_use]
pub fn parse_ffmpeg_time(time: &str) -> Option<f64> {
    let mut parts = time.trim().split(':');
    let (Some(h), Some(m), Some(s), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    let hours = h.parse::<f64>().ok()?;
    let minutes = m.parse::<f64>().ok()?;
    let seconds = s.parse::<f64>().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Returns the file name component of `path` as a String.
pub fn get_filename_safe(path: &Path) -> CoreResult<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            CoreError::PathError(format!("Failed to get filename for {}", path.display()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023.00 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_size(18_233_145_678), "16.98 GB");
    }

    #[test]
    fn test_format_bitrate() {
        assert_eq!(format_bitrate(999), "999 b/s");
        assert_eq!(format_bitrate(192_000), "192.0 kb/s");
        assert_eq!(format_bitrate(20_077_421), "20.08 Mb/s");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "00:00:00");
        assert_eq!(format_duration(3725.0), "01:02:05");
        assert_eq!(format_duration(59.9), "00:00:59");
        assert_eq!(format_duration(-1.0), "??:??:??");
        assert_eq!(format_duration(f64::NAN), "??:??:??");
    }

    #[test]
    fn test_parse_ffmpeg_time() {
        assert_eq!(parse_ffmpeg_time("01:02:03"), Some(3723.0));
        assert_eq!(parse_ffmpeg_time("00:00:01.25"), Some(1.25));
        assert_eq!(parse_ffmpeg_time("00:00"), None);
        assert_eq!(parse_ffmpeg_time("00:00:00:00"), None);
        assert_eq!(parse_ffmpeg_time("aa:bb:cc"), None);
    }

    #[test]
    fn test_get_filename_safe() {
        assert_eq!(get_filename_safe(Path::new("/films/a.mkv")).unwrap(), "a.mkv");
        assert!(matches!(get_filename_safe(Path::new("/")), Err(CoreError::PathError(_))));
    }
}
