//! Normalized, read-only view of one media file.
//!
//! Every "unknown" default is resolved when the probe output is parsed
//! (see [`crate::media::probe`]); the engine only ever sees these typed
//! structures.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Codec name used when the probe does not report one.
pub const UNKNOWN_CODEC: &str = "unknown";

/// Media stream types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Other,
}

impl From<&str> for StreamKind {
    fn from(s: &str) -> Self {
        match s {
            "video" => StreamKind::Video,
            "audio" => StreamKind::Audio,
            "subtitle" => StreamKind::Subtitle,
            _ => StreamKind::Other,
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Video => write!(f, "video"),
            StreamKind::Audio => write!(f, "audio"),
            StreamKind::Subtitle => write!(f, "subtitle"),
            StreamKind::Other => write!(f, "other"),
        }
    }
}

/// Language of a stream, reduced to the values the audio ranking cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageTag {
    Fr,
    En,
    Other,
    Unknown,
}

impl LanguageTag {
    /// Normalizes an ISO 639 language tag.
    pub fn from_tag(tag: Option<&str>) -> Self {
        let Some(tag) = tag.map(str::trim).filter(|t| !t.is_empty()) else {
            return LanguageTag::Unknown;
        };
        match tag.to_lowercase().as_str() {
            "fra" | "fre" | "fr" => LanguageTag::Fr,
            "eng" | "en" => LanguageTag::En,
            _ => LanguageTag::Other,
        }
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageTag::Fr => write!(f, "fr"),
            LanguageTag::En => write!(f, "en"),
            LanguageTag::Other => write!(f, "other"),
            LanguageTag::Unknown => write!(f, "unknown"),
        }
    }
}

/// One elementary stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    /// Source stream index
    pub index: usize,

    pub kind: StreamKind,

    /// Codec name, "unknown" when not reported
    pub codec_name: String,

    /// Audio channel count, 0 for other kinds or when not reported
    pub channels: u32,

    pub language: LanguageTag,

    pub pixel_format: Option<String>,

    /// Transfer characteristic (`color_transfer`, or `color_trc` as fallback)
    pub color_transfer: Option<String>,

    pub color_primaries: Option<String>,

    pub color_space: Option<String>,

    pub width: u32,

    pub height: u32,

    /// Stream bitrate, 0 when not reported
    pub bit_rate: u64,

    // Report-only attributes
    pub channel_layout: Option<String>,
    pub sample_rate: Option<u32>,
    pub frame_rate: Option<String>,
}

impl StreamDescriptor {
    /// Creates a descriptor with every optional attribute absent.
    pub fn new(index: usize, kind: StreamKind, codec_name: impl Into<String>) -> Self {
        let codec_name = codec_name.into();
        Self {
            index,
            kind,
            codec_name: if codec_name.trim().is_empty() {
                UNKNOWN_CODEC.to_string()
            } else {
                codec_name
            },
            channels: 0,
            language: LanguageTag::Unknown,
            pixel_format: None,
            color_transfer: None,
            color_primaries: None,
            color_space: None,
            width: 0,
            height: 0,
            bit_rate: 0,
            channel_layout: None,
            sample_rate: None,
            frame_rate: None,
        }
    }

    pub fn is_video(&self) -> bool {
        self.kind == StreamKind::Video
    }

    pub fn is_audio(&self) -> bool {
        self.kind == StreamKind::Audio
    }

    /// Pixel format, or "" when absent.
    pub fn pixel_format_str(&self) -> &str {
        self.pixel_format.as_deref().unwrap_or("")
    }

    /// Transfer characteristic, or "" when absent.
    pub fn color_transfer_str(&self) -> &str {
        self.color_transfer.as_deref().unwrap_or("")
    }

    /// Color primaries, or "" when absent.
    pub fn color_primaries_str(&self) -> &str {
        self.color_primaries.as_deref().unwrap_or("")
    }

    /// Color space (matrix), or "" when absent.
    pub fn color_space_str(&self) -> &str {
        self.color_space.as_deref().unwrap_or("")
    }
}

/// Container-level attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatInfo {
    pub format_name: String,

    /// Overall bitrate in bits per second, 0 when not reported
    pub total_bit_rate: u64,

    pub duration_seconds: f64,

    pub size_bytes: u64,
}

/// Metadata snapshot of one media file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub format: FormatInfo,

    /// Streams in source index order
    pub streams: Vec<StreamDescriptor>,
}

impl MediaMetadata {
    pub fn new(format: FormatInfo, streams: Vec<StreamDescriptor>) -> Self {
        Self { format, streams }
    }

    /// The first video stream by index.
    pub fn video_stream(&self) -> Option<&StreamDescriptor> {
        self.streams.iter().find(|s| s.is_video())
    }

    /// All audio streams, in index order.
    pub fn audio_streams(&self) -> Vec<&StreamDescriptor> {
        self.streams.iter().filter(|s| s.is_audio()).collect()
    }

    /// Position of the stream with `index` among the audio streams, which is
    /// how the encoder addresses it (`0:a:N`).
    pub fn audio_ordinal(&self, index: usize) -> Option<usize> {
        self.streams
            .iter()
            .filter(|s| s.is_audio())
            .position(|s| s.index == index)
    }

    /// Codec names of the audio streams, in index order.
    pub fn audio_codecs(&self) -> Vec<String> {
        self.streams
            .iter()
            .filter(|s| s.is_audio())
            .map(|s| s.codec_name.clone())
            .collect()
    }
}
