//! QS02 compatibility evaluation.
//!
//! Checks a file against the compatibility policy and itemizes every failed
//! criterion. Criteria are evaluated in a fixed order (codec, bitrate, pixel
//! format) and never short-circuit, so a file failing several checks reports
//! all of them.

use crate::config::CompatibilityPolicy;
use crate::error::{CoreError, CoreResult, RequiredStream};
use crate::media::{MediaMetadata, StreamDescriptor};
use crate::processing::color::{ColorVerdict, classify_color};

use serde::Serialize;

/// Outcome of a compatibility evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatibilityVerdict {
    pub compatible: bool,
    /// Failed criteria, in evaluation order
    pub issues: Vec<String>,
}

impl CompatibilityVerdict {
    fn from_issues(issues: Vec<String>) -> Self {
        Self {
            compatible: issues.is_empty(),
            issues,
        }
    }
}

fn megabits(bits_per_sec: u64) -> u64 {
    bits_per_sec / 1_000_000
}

/// Evaluates `video` (the file's video stream) and the container against the policy.
pub fn evaluate(
    metadata: &MediaMetadata,
    video: &StreamDescriptor,
    policy: &CompatibilityPolicy,
) -> CompatibilityVerdict {
    let color = classify_color(video);
    evaluate_with_color(metadata, video, &color, policy)
}

/// Same as [`evaluate`], reusing an existing color classification.
pub fn evaluate_with_color(
    metadata: &MediaMetadata,
    video: &StreamDescriptor,
    color: &ColorVerdict,
    policy: &CompatibilityPolicy,
) -> CompatibilityVerdict {
    let mut issues = Vec::new();
    let range = color.dynamic_range_label();

    // 1. Video codec
    let codec = video.codec_name.to_lowercase();
    let codec_allowed = policy
        .allowed_video_codecs
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(&codec));
    if !codec_allowed {
        let mut expected: Vec<String> = policy
            .allowed_video_codecs
            .iter()
            .map(|c| c.to_lowercase())
            .collect();
        expected.sort();
        expected.dedup();
        issues.push(format!(
            "Video codec: {} (expected: {})",
            codec,
            expected.join(", ")
        ));
    }

    // 2. Container bitrate
    let bitrate = metadata.format.total_bit_rate;
    let max_bitrate = policy.max_bitrate(color.is_hdr);
    if bitrate > max_bitrate {
        issues.push(format!(
            "Bitrate too high: {}M (max: {}M for {})",
            megabits(bitrate),
            megabits(max_bitrate),
            range
        ));
    }

    // 3. Pixel format
    let pixel_format = video.pixel_format_str();
    if color.is_hdr {
        if !pixel_format.ends_with(&policy.hdr_pixel_suffix) {
            issues.push(format!(
                "HDR pixel format: {} (expected: {})",
                pixel_format, policy.hdr_pixel_format_label
            ));
        }
    } else if pixel_format != policy.sdr_pixel_format {
        issues.push(format!(
            "SDR pixel format: {} (expected: {})",
            pixel_format, policy.sdr_pixel_format
        ));
    }

    let verdict = CompatibilityVerdict::from_issues(issues);
    log::debug!(
        "Compatibility for stream {}: compatible={} issues={:?}",
        video.index,
        verdict.compatible,
        verdict.issues
    );
    verdict
}

/// Locates the video stream and evaluates the file.
pub fn evaluate_metadata(
    metadata: &MediaMetadata,
    policy: &CompatibilityPolicy,
) -> CoreResult<CompatibilityVerdict> {
    let video = metadata
        .video_stream()
        .ok_or(CoreError::MissingRequiredStream {
            kind: RequiredStream::Video,
        })?;
    Ok(evaluate(metadata, video, policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{FormatInfo, StreamKind};

    fn file(codec: &str, pix: &str, trc: Option<&str>, bitrate: u64) -> MediaMetadata {
        let mut video = StreamDescriptor::new(0, StreamKind::Video, codec);
        video.pixel_format = Some(pix.to_string());
        video.color_transfer = trc.map(String::from);
        MediaMetadata::new(
            FormatInfo {
                total_bit_rate: bitrate,
                ..Default::default()
            },
            vec![video],
        )
    }

    fn run(metadata: &MediaMetadata) -> CompatibilityVerdict {
        evaluate_metadata(metadata, &CompatibilityPolicy::default()).unwrap()
    }

    #[test]
    fn test_compliant_sdr_and_hdr() {
        let verdict = run(&file("h264", "yuv420p", None, 8_000_000));
        assert!(verdict.compatible);
        assert!(verdict.issues.is_empty());

        let verdict = run(&file("HEVC", "yuv420p10le", Some("smpte2084"), 24_000_000));
        assert!(verdict.compatible);
    }

    #[test]
    fn test_codec_issue_names_codec_and_sorted_set() {
        let verdict = run(&file("AV1", "yuv420p", None, 1_000_000));
        assert!(!verdict.compatible);
        assert_eq!(
            verdict.issues,
            vec!["Video codec: av1 (expected: h264, h265, hevc)".to_string()]
        );
    }

    #[test]
    fn test_sdr_mpeg4_over_ceiling_reports_two_issues() {
        let verdict = run(&file("mpeg4", "yuv420p", None, 20_000_000));
        assert!(!verdict.compatible);
        assert_eq!(verdict.issues.len(), 2);
        assert!(verdict.issues[0].starts_with("Video codec: mpeg4"));
        assert_eq!(verdict.issues[1], "Bitrate too high: 20M (max: 15M for SDR)");
    }

    #[test]
    fn test_bitrate_equal_to_ceiling_passes() {
        assert!(run(&file("h264", "yuv420p", None, 15_000_000)).compatible);
        assert!(!run(&file("h264", "yuv420p", None, 15_000_001)).compatible);
    }

    #[test]
    fn test_bitrate_truncates_to_whole_megabits() {
        let verdict = run(&file("hevc", "yuv420p10le", Some("arib-std-b67"), 25_999_999));
        assert_eq!(verdict.issues, vec!["Bitrate too high: 25M (max: 25M for HDR)".to_string()]);
    }

    #[test]
    fn test_pixel_format_checks() {
        let verdict = run(&file("hevc", "yuv420p10le", None, 1_000_000));
        assert_eq!(
            verdict.issues,
            vec!["SDR pixel format: yuv420p10le (expected: yuv420p)".to_string()]
        );

        let verdict = run(&file("hevc", "yuv420p", Some("smpte2084"), 1_000_000));
        assert_eq!(
            verdict.issues,
            vec!["HDR pixel format: yuv420p (expected: p010le)".to_string()]
        );
    }

    #[test]
    fn test_all_three_issues_in_order() {
        let verdict = run(&file("vc1", "yuv422p", None, 40_000_000));
        assert_eq!(verdict.issues.len(), 3);
        assert!(verdict.issues[0].starts_with("Video codec"));
        assert!(verdict.issues[1].starts_with("Bitrate too high"));
        assert!(verdict.issues[2].starts_with("SDR pixel format"));
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let metadata = file("mpeg2video", "yuv420p", None, 30_000_000);
        assert_eq!(run(&metadata), run(&metadata));
    }

    #[test]
    fn test_missing_video_stream() {
        let metadata = MediaMetadata::default();
        let result = evaluate_metadata(&metadata, &CompatibilityPolicy::default());
        assert!(matches!(
            result,
            Err(CoreError::MissingRequiredStream {
                kind: RequiredStream::Video
            })
        ));
    }
}
