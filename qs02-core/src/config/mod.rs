//! Policy configuration for the QS02 engine.
//!
//! Every component receives the parts of [`PolicyConfig`] it needs as an
//! explicit argument; nothing reads policy from global state. The defaults
//! reproduce the QS02 profile, and any subset can be overridden from a TOML
//! file or through [`PolicyConfigBuilder`].

mod builder;

use crate::error::{CoreError, CoreResult};

use serde::{Deserialize, Serialize};

use std::path::Path;

pub use builder::PolicyConfigBuilder;

// Default constants

/// Container bitrate ceiling (bits/s) for HDR sources.
pub const DEFAULT_MAX_BITRATE_HDR: u64 = 25_000_000;

/// Container bitrate ceiling (bits/s) for SDR sources.
pub const DEFAULT_MAX_BITRATE_SDR: u64 = 15_000_000;

/// Encoder buffer size (bits) for HDR output.
pub const DEFAULT_BUFFER_SIZE_HDR: u64 = 50_000_000;

/// Encoder buffer size (bits) for SDR output.
pub const DEFAULT_BUFFER_SIZE_SDR: u64 = 30_000_000;

/// NVENC constant quality level. Lower is better quality and larger files.
pub const DEFAULT_ENCODER_QUALITY: u8 = 20;

/// NVENC preset.
pub const DEFAULT_ENCODER_PRESET: &str = "slow";

/// Marker appended to every normalized output name.
pub const DEFAULT_COMPATIBILITY_MARKER: &str = "qs02";

/// Containers accepted for inventory and normalization.
pub const DEFAULT_VIDEO_EXTENSIONS: [&str; 4] = ["mkv", "mp4", "m4v", "mov"];

/// Title cleaning vocabulary revision shipped with this crate.
pub const DEFAULT_VOCABULARY_VERSION: u32 = 1;

/// Release-metadata tokens removed from filenames, as regex fragments.
///
/// Each entry is matched case-insensitively between word boundaries, so
/// entries must not carry their own anchors.
pub const DEFAULT_TITLE_TOKENS: &[&str] = &[
    // video codecs
    r"HEVC",
    r"H\.?264",
    r"H264",
    r"AVC",
    r"X264",
    r"X265",
    r"H\.?265",
    r"H265",
    // bit depth
    r"10[- ]?bit",
    r"8[- ]?bit",
    // audio codecs
    r"DTS(?:-HD)?",
    r"DTSHD",
    r"TrueHD",
    r"E[- ]?AC3",
    r"AC3",
    r"AAC",
    r"FLAC",
    r"MP3",
    // sources and rips
    r"Blu[- ]?Ray",
    r"BDRip",
    r"BDR",
    r"WEB[- ]?Rip",
    r"WEB[- ]?DL",
    r"WEB",
    r"HDTV",
    r"DVD[- ]?Rip",
    r"DVD",
    r"REMUX",
    r"REMASTERED",
    r"MULTI",
    // resolution and quality
    r"2160p",
    r"1080p",
    r"720p",
    r"480p",
    r"4K",
    r"UHD",
    // dynamic range
    r"HDR10?\+?",
    r"DV",
    r"Dolby\s+Vision",
    r"HLG",
    // channel layouts
    r"DD\+",
    r"DD5\.1",
    r"DD7\.1",
    r"5\.1",
    r"7\.1",
    r"2\.0",
    // distributors and platforms
    r"AMZN",
    r"NF",
    r"HMAX",
    r"Hulu",
    r"iTunes",
    r"iT",
];

/// Top-level, immutable policy handed to every engine component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// QS02 compatibility criteria
    pub compatibility: CompatibilityPolicy,

    /// Video encoder parameters used when a file is normalized
    pub encoder: EncoderPolicy,

    /// Output audio layout
    pub audio: AudioPolicy,

    /// Output naming
    pub naming: NamingPolicy,

    /// Release-metadata vocabulary used by the title extractor
    pub vocabulary: TitleVocabulary,

    /// Accepted container extensions, without the leading dot
    pub video_extensions: Vec<String>,

    /// Whether subtitle streams are copied into the normalized output.
    /// Off by default: bitmap subtitles can force server-side transcoding.
    pub keep_subtitles: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            compatibility: CompatibilityPolicy::default(),
            encoder: EncoderPolicy::default(),
            audio: AudioPolicy::default(),
            naming: NamingPolicy::default(),
            vocabulary: TitleVocabulary::default(),
            video_extensions: DEFAULT_VIDEO_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            keep_subtitles: false,
        }
    }
}

impl PolicyConfig {
    /// Parses a (possibly partial) TOML policy. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        let config: PolicyConfig = toml::from_str(content)
            .map_err(|e| CoreError::Config(format!("Invalid policy file: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a TOML policy file from disk.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("Failed to read policy file {}: {e}", path.display()))
        })?;
        log::debug!("Loaded policy file {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Checks the invariants the engine relies on.
    pub fn validate(&self) -> CoreResult<()> {
        if self.compatibility.allowed_video_codecs.is_empty() {
            return Err(CoreError::Config(
                "At least one allowed video codec is required".to_string(),
            ));
        }
        if self.compatibility.max_bitrate_hdr == 0 || self.compatibility.max_bitrate_sdr == 0 {
            return Err(CoreError::Config(
                "Bitrate ceilings must be greater than zero".to_string(),
            ));
        }
        if self.compatibility.hdr_pixel_suffix.trim().is_empty() {
            return Err(CoreError::Config(
                "HDR pixel format suffix must not be empty".to_string(),
            ));
        }
        if self.encoder.video_encoder.trim().is_empty() {
            return Err(CoreError::Config(
                "Video encoder must not be empty".to_string(),
            ));
        }
        if self.audio.slots.is_empty() {
            return Err(CoreError::Config(
                "At least one audio slot is required".to_string(),
            ));
        }
        if let Some(slot) = self.audio.slots.iter().find(|s| s.bitrate_kbps == 0) {
            return Err(CoreError::Config(format!(
                "Audio slot '{}' has a zero bitrate",
                slot.name
            )));
        }
        if self.naming.marker.trim().is_empty() {
            return Err(CoreError::Config(
                "Compatibility marker must not be empty".to_string(),
            ));
        }
        let output_ext = self.naming.output_extension.trim_start_matches('.');
        let report_ext = self.naming.report_extension.trim_start_matches('.');
        if output_ext.trim().is_empty() || report_ext.trim().is_empty() {
            return Err(CoreError::Config(
                "Output and report extensions must not be empty".to_string(),
            ));
        }
        if output_ext.eq_ignore_ascii_case(report_ext) {
            return Err(CoreError::Config(format!(
                "Report extension '{report_ext}' would overwrite the output file"
            )));
        }
        if self.video_extensions.is_empty() {
            return Err(CoreError::Config(
                "At least one video extension is required".to_string(),
            ));
        }
        if self.encoder.quality > 51 {
            return Err(CoreError::Config(format!(
                "Encoder quality {} is out of range (0-51)",
                self.encoder.quality
            )));
        }
        Ok(())
    }

    /// Returns true if `ext` (with or without a leading dot) is an accepted container.
    pub fn is_supported_extension(&self, ext: &str) -> bool {
        let ext = ext.trim_start_matches('.');
        self.video_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }
}

/// QS02 compatibility criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatibilityPolicy {
    /// Accepted video codec names, compared lower-cased
    pub allowed_video_codecs: Vec<String>,

    /// Maximum container bitrate (bits/s) for HDR content
    pub max_bitrate_hdr: u64,

    /// Maximum container bitrate (bits/s) for SDR content
    pub max_bitrate_sdr: u64,

    /// Exact pixel format required for SDR content
    pub sdr_pixel_format: String,

    /// Pixel format suffix required for HDR content (10-bit little-endian)
    pub hdr_pixel_suffix: String,

    /// Pixel format named in HDR issues
    pub hdr_pixel_format_label: String,
}

impl Default for CompatibilityPolicy {
    fn default() -> Self {
        Self {
            allowed_video_codecs: vec!["h264".into(), "h265".into(), "hevc".into()],
            max_bitrate_hdr: DEFAULT_MAX_BITRATE_HDR,
            max_bitrate_sdr: DEFAULT_MAX_BITRATE_SDR,
            sdr_pixel_format: "yuv420p".to_string(),
            hdr_pixel_suffix: "10le".to_string(),
            hdr_pixel_format_label: "p010le".to_string(),
        }
    }
}

impl CompatibilityPolicy {
    /// Bitrate ceiling for the given dynamic range.
    pub fn max_bitrate(&self, is_hdr: bool) -> u64 {
        if is_hdr {
            self.max_bitrate_hdr
        } else {
            self.max_bitrate_sdr
        }
    }
}

/// Video encoder parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderPolicy {
    /// ffmpeg encoder name
    pub video_encoder: String,

    /// Hardware decoder passed to `-hwaccel`, if any
    pub hwaccel: Option<String>,

    /// GPU used by the encoder
    pub gpu_index: u32,

    /// Encoder preset
    pub preset: String,

    /// Constant quality level (`-cq:v`)
    pub quality: u8,

    /// Peak bitrate clamp for HDR output (bits/s)
    pub max_bitrate_hdr: u64,

    /// Rate-control buffer for HDR output (bits)
    pub buffer_size_hdr: u64,

    /// Peak bitrate clamp for SDR output (bits/s)
    pub max_bitrate_sdr: u64,

    /// Rate-control buffer for SDR output (bits)
    pub buffer_size_sdr: u64,

    /// Output pixel format for HDR (10-bit)
    pub hdr_pixel_format: String,

    /// Output pixel format for SDR (8-bit 4:2:0)
    pub sdr_pixel_format: String,

    /// Adaptive quantization strength
    pub aq_strength: u8,

    /// Rate-control lookahead in frames
    pub rc_lookahead: u32,
}

impl Default for EncoderPolicy {
    fn default() -> Self {
        Self {
            video_encoder: "hevc_nvenc".to_string(),
            hwaccel: Some("cuda".to_string()),
            gpu_index: 0,
            preset: DEFAULT_ENCODER_PRESET.to_string(),
            quality: DEFAULT_ENCODER_QUALITY,
            max_bitrate_hdr: DEFAULT_MAX_BITRATE_HDR,
            buffer_size_hdr: DEFAULT_BUFFER_SIZE_HDR,
            max_bitrate_sdr: DEFAULT_MAX_BITRATE_SDR,
            buffer_size_sdr: DEFAULT_BUFFER_SIZE_SDR,
            hdr_pixel_format: "p010le".to_string(),
            sdr_pixel_format: "yuv420p".to_string(),
            aq_strength: 8,
            rc_lookahead: 32,
        }
    }
}

/// Channel behaviour of an output audio slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotLayout {
    /// 6 channels when the source has at least 6, otherwise 2
    Surround,
    /// Always 2 channels
    Stereo,
}

impl SlotLayout {
    /// Target channel count for a source with `source_channels` channels.
    pub fn target_channels(self, source_channels: u32) -> u32 {
        match self {
            SlotLayout::Surround if source_channels >= 6 => 6,
            SlotLayout::Surround | SlotLayout::Stereo => 2,
        }
    }
}

/// One output audio track derived from the selected source track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSlot {
    /// Human-readable slot name used in logs and reports
    pub name: String,

    /// Target codec (ffmpeg encoder and codec name)
    pub codec: String,

    /// Target bitrate in kbps
    pub bitrate_kbps: u32,

    /// Channel behaviour
    pub layout: SlotLayout,

    /// Whether a source already matching codec and channels is passed through
    #[serde(default = "default_allow_copy")]
    pub allow_copy: bool,
}

fn default_allow_copy() -> bool {
    true
}

impl AudioSlot {
    /// Soundbar-oriented slot: AC3 640k, 5.1 or 2.0.
    pub fn surround_ac3() -> Self {
        Self {
            name: "surround".to_string(),
            codec: "ac3".to_string(),
            bitrate_kbps: 640,
            layout: SlotLayout::Surround,
            allow_copy: true,
        }
    }

    /// Headphone-oriented slot: AAC 192k stereo.
    pub fn stereo_aac() -> Self {
        Self {
            name: "stereo".to_string(),
            codec: "aac".to_string(),
            bitrate_kbps: 192,
            layout: SlotLayout::Stereo,
            allow_copy: true,
        }
    }
}

/// Output audio layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioPolicy {
    /// Fail plan construction when the source has no audio stream
    pub audio_required: bool,

    /// Output tracks, in output order
    pub slots: Vec<AudioSlot>,
}

impl Default for AudioPolicy {
    fn default() -> Self {
        Self {
            audio_required: true,
            slots: vec![AudioSlot::surround_ac3(), AudioSlot::stereo_aac()],
        }
    }
}

/// Output naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingPolicy {
    /// Marker appended after the dynamic-range label
    pub marker: String,

    /// Container extension of normalized files
    pub output_extension: String,

    /// Extension of the per-file comparison report
    pub report_extension: String,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self {
            marker: DEFAULT_COMPATIBILITY_MARKER.to_string(),
            output_extension: "mkv".to_string(),
            report_extension: "md".to_string(),
        }
    }
}

/// Versioned list of release-metadata token patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleVocabulary {
    pub version: u32,
    pub tokens: Vec<String>,
}

impl Default for TitleVocabulary {
    fn default() -> Self {
        Self {
            version: DEFAULT_VOCABULARY_VERSION,
            tokens: DEFAULT_TITLE_TOKENS.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

impl TitleVocabulary {
    /// Returns a copy extended with additional token patterns.
    pub fn extended_with<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens = self.tokens.clone();
        tokens.extend(extra.into_iter().map(Into::into));
        Self {
            version: self.version,
            tokens,
        }
    }
}
