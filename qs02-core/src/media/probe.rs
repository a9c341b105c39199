//! FFprobe integration: the probe collaborator.
//!
//! Runs ffprobe on a file and turns its JSON report into a [`MediaMetadata`].
//! Any failure to obtain a usable report (missing binary, non-zero exit,
//! empty or malformed output) is surfaced as
//! [`CoreError::ProbeUnavailable`] so batch drivers can skip the file.

use crate::error::{CoreError, CoreResult};
use crate::media::metadata::{
    FormatInfo, LanguageTag, MediaMetadata, StreamDescriptor, StreamKind,
};

use serde::Deserialize;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Describes media files. Implemented by [`FfprobeProbe`] and by test stubs.
pub trait MetadataProbe {
    fn probe(&self, path: &Path) -> CoreResult<MediaMetadata>;
}

/// Probe backed by the `ffprobe` binary.
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    binary: PathBuf,
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl FfprobeProbe {
    /// Uses `ffprobe` from `PATH`.
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("ffprobe"),
        }
    }

    /// Uses a specific ffprobe binary.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl MetadataProbe for FfprobeProbe {
    fn probe(&self, path: &Path) -> CoreResult<MediaMetadata> {
        log::debug!("Running ffprobe on {}", path.display());

        let unavailable = |reason: String| CoreError::ProbeUnavailable {
            path: path.to_path_buf(),
            reason,
        };

        let output = Command::new(&self.binary)
            .args(["-v", "error", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .output()
            .map_err(|e| unavailable(format!("failed to execute ffprobe: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::warn!("ffprobe exited with {} for {}", output.status, path.display());
            return Err(unavailable(format!(
                "ffprobe exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_ffprobe_json(&stdout).map_err(|e| unavailable(e.to_string()))
    }
}

// ============================================================================
// RAW FFPROBE REPORT
// ============================================================================

/// ffprobe reports most numbers as strings, but not all of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawNumber {
    fn as_u64(&self) -> Option<u64> {
        match self {
            RawNumber::Int(v) => u64::try_from(*v).ok(),
            RawNumber::Float(v) if *v >= 0.0 && v.is_finite() => Some(*v as u64),
            RawNumber::Float(_) => None,
            RawNumber::Text(s) => s.trim().parse::<u64>().ok(),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            RawNumber::Int(v) => Some(*v as f64),
            RawNumber::Float(v) => Some(*v),
            RawNumber::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawReport {
    #[serde(default)]
    streams: Vec<RawStream>,
    #[serde(default)]
    format: RawFormat,
}

#[derive(Debug, Default, Deserialize)]
struct RawStream {
    index: Option<usize>,
    codec_type: Option<String>,
    codec_name: Option<String>,
    channels: Option<RawNumber>,
    channel_layout: Option<String>,
    sample_rate: Option<RawNumber>,
    pix_fmt: Option<String>,
    color_transfer: Option<String>,
    color_trc: Option<String>,
    color_primaries: Option<String>,
    color_space: Option<String>,
    width: Option<RawNumber>,
    height: Option<RawNumber>,
    bit_rate: Option<RawNumber>,
    r_frame_rate: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFormat {
    format_name: Option<String>,
    bit_rate: Option<RawNumber>,
    duration: Option<RawNumber>,
    size: Option<RawNumber>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn to_u32(value: Option<&RawNumber>) -> u32 {
    value
        .and_then(RawNumber::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

impl RawStream {
    fn into_descriptor(self, position: usize) -> StreamDescriptor {
        let kind = self
            .codec_type
            .as_deref()
            .map(StreamKind::from)
            .unwrap_or(StreamKind::Other);
        let mut stream = StreamDescriptor::new(
            self.index.unwrap_or(position),
            kind,
            self.codec_name.unwrap_or_default(),
        );

        // Matroska muxers disagree on the tag name; ffprobe may expose either.
        let language = self
            .tags
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("language"))
            .map(|(_, value)| value.as_str());

        stream.channels = to_u32(self.channels.as_ref());
        stream.language = LanguageTag::from_tag(language);
        stream.pixel_format = non_empty(self.pix_fmt);
        stream.color_transfer = non_empty(self.color_transfer).or_else(|| non_empty(self.color_trc));
        stream.color_primaries = non_empty(self.color_primaries);
        stream.color_space = non_empty(self.color_space);
        stream.width = to_u32(self.width.as_ref());
        stream.height = to_u32(self.height.as_ref());
        stream.bit_rate = self.bit_rate.as_ref().and_then(RawNumber::as_u64).unwrap_or(0);
        stream.channel_layout = non_empty(self.channel_layout);
        stream.sample_rate = self
            .sample_rate
            .as_ref()
            .and_then(RawNumber::as_u64)
            .and_then(|v| u32::try_from(v).ok());
        stream.frame_rate = non_empty(self.r_frame_rate);
        stream
    }
}

/// Parses an ffprobe JSON report (`-show_format -show_streams`).
///
/// Absent or malformed numeric attributes default to 0 and absent codec names
/// to "unknown". Only blank or syntactically invalid input is an error.
pub fn parse_ffprobe_json(json: &str) -> CoreResult<MediaMetadata> {
    if json.trim().is_empty() {
        return Err(CoreError::JsonParse("ffprobe produced no output".to_string()));
    }

    let report: RawReport = serde_json::from_str(json)
        .map_err(|e| CoreError::JsonParse(format!("ffprobe output deserialization: {e}")))?;

    let format = FormatInfo {
        format_name: report.format.format_name.unwrap_or_default(),
        total_bit_rate: report
            .format
            .bit_rate
            .as_ref()
            .and_then(RawNumber::as_u64)
            .unwrap_or(0),
        duration_seconds: report
            .format
            .duration
            .as_ref()
            .and_then(RawNumber::as_f64)
            .unwrap_or(0.0),
        size_bytes: report.format.size.as_ref().and_then(RawNumber::as_u64).unwrap_or(0),
    };

    let streams = report
        .streams
        .into_iter()
        .enumerate()
        .map(|(position, raw)| raw.into_descriptor(position))
        .collect();

    Ok(MediaMetadata::new(format, streams))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {
                "index": 0,
                "codec_name": "hevc",
                "codec_type": "video",
                "width": 3840,
                "height": 2160,
                "pix_fmt": "yuv420p10le",
                "color_space": "bt2020nc",
                "color_transfer": "smpte2084",
                "color_primaries": "bt2020",
                "r_frame_rate": "24000/1001"
            },
            {
                "index": 1,
                "codec_name": "eac3",
                "codec_type": "audio",
                "sample_rate": "48000",
                "channels": 6,
                "channel_layout": "5.1(side)",
                "bit_rate": "768000",
                "tags": { "language": "fre" }
            },
            {
                "index": 2,
                "codec_type": "audio",
                "channels": 2,
                "tags": { "LANGUAGE": "eng" }
            }
        ],
        "format": {
            "format_name": "matroska,webm",
            "duration": "7265.152000",
            "size": "18233145678",
            "bit_rate": "20077421"
        }
    }"#;

    #[test]
    fn test_parse_full_report() {
        let metadata = parse_ffprobe_json(SAMPLE).unwrap();
        assert_eq!(metadata.format.format_name, "matroska,webm");
        assert_eq!(metadata.format.total_bit_rate, 20_077_421);
        assert_eq!(metadata.format.size_bytes, 18_233_145_678);
        assert!((metadata.format.duration_seconds - 7265.152).abs() < 1e-6);
        assert_eq!(metadata.streams.len(), 3);

        let video = metadata.video_stream().unwrap();
        assert_eq!(video.height, 2160);
        assert_eq!(video.color_transfer.as_deref(), Some("smpte2084"));
        assert_eq!(video.frame_rate.as_deref(), Some("24000/1001"));

        let audio = metadata.audio_streams();
        assert_eq!(audio[0].language, LanguageTag::Fr);
        assert_eq!(audio[0].channels, 6);
        assert_eq!(audio[0].bit_rate, 768_000);
        assert_eq!(audio[0].sample_rate, Some(48_000));
        assert_eq!(audio[1].codec_name, "unknown");
        assert_eq!(audio[1].language, LanguageTag::En);
    }

    #[test]
    fn test_color_trc_fallback() {
        let json = r#"{"streams":[{"index":0,"codec_type":"video","codec_name":"hevc",
            "color_trc":"arib-std-b67","color_transfer":""}],"format":{}}"#;
        let metadata = parse_ffprobe_json(json).unwrap();
        let video = metadata.video_stream().unwrap();
        assert_eq!(video.color_transfer.as_deref(), Some("arib-std-b67"));
    }

    #[test]
    fn test_missing_values_default_to_zero() {
        let json = r#"{"streams":[{"codec_type":"video","bit_rate":"N/A"}],
            "format":{"bit_rate":"N/A"}}"#;
        let metadata = parse_ffprobe_json(json).unwrap();
        assert_eq!(metadata.format.total_bit_rate, 0);
        assert_eq!(metadata.format.format_name, "");
        let video = metadata.video_stream().unwrap();
        assert_eq!(video.index, 0);
        assert_eq!(video.bit_rate, 0);
        assert_eq!(video.width, 0);
        assert_eq!(video.pixel_format, None);
    }

    #[test]
    fn test_blank_and_invalid_output() {
        assert!(matches!(parse_ffprobe_json("   \n"), Err(CoreError::JsonParse(_))));
        assert!(matches!(parse_ffprobe_json("{not json"), Err(CoreError::JsonParse(_))));
    }

    #[test]
    fn test_missing_binary_is_probe_unavailable() {
        let probe = FfprobeProbe::with_binary("/nonexistent/ffprobe-qs02");
        let result = probe.probe(Path::new("/nonexistent/movie.mkv"));
        match result {
            Err(CoreError::ProbeUnavailable { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/movie.mkv"));
            }
            other => panic!("Unexpected result: {other:?}"),
        }
    }
}
