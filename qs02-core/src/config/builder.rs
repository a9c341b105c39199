// ============================================================================
// qs02-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for PolicyConfig
//
// This module implements the builder pattern for the PolicyConfig structure,
// providing a fluent API for overriding individual policy values on top of
// the QS02 defaults. The CLI layers file and flag overrides through it.

// ---- Internal crate imports ----
use super::{AudioSlot, PolicyConfig, TitleVocabulary};
use crate::error::CoreResult;

/// Builder for creating PolicyConfig instances.
///
/// Starts from [`PolicyConfig::default`] (or an existing policy) and
/// validates the result in [`build`](Self::build).
///
/// # Examples
///
/// ```rust
/// use qs02_core::config::PolicyConfigBuilder;
///
/// let policy = PolicyConfigBuilder::new()
///     .encoder_quality(19)
///     .encoder_preset("medium")
///     .keep_subtitles(true)
///     .build()
///     .unwrap();
///
/// assert_eq!(policy.encoder.quality, 19);
/// assert!(policy.keep_subtitles);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PolicyConfigBuilder {
    config: PolicyConfig,
}

impl PolicyConfigBuilder {
    /// Creates a new builder holding the QS02 defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder that starts from an existing policy.
    pub fn from_config(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Sets the accepted video codecs.
    pub fn allowed_video_codecs<I, S>(mut self, codecs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.compatibility.allowed_video_codecs = codecs
            .into_iter()
            .map(|c| c.into().to_lowercase())
            .collect();
        self
    }

    /// Sets the HDR container bitrate ceiling (bits/s).
    pub fn max_bitrate_hdr(mut self, bits_per_sec: u64) -> Self {
        self.config.compatibility.max_bitrate_hdr = bits_per_sec;
        self
    }

    /// Sets the SDR container bitrate ceiling (bits/s).
    pub fn max_bitrate_sdr(mut self, bits_per_sec: u64) -> Self {
        self.config.compatibility.max_bitrate_sdr = bits_per_sec;
        self
    }

    /// Sets the ffmpeg video encoder.
    pub fn video_encoder(mut self, encoder: impl Into<String>) -> Self {
        self.config.encoder.video_encoder = encoder.into();
        self
    }

    /// Sets or clears the hardware decoder.
    pub fn hwaccel(mut self, hwaccel: Option<String>) -> Self {
        self.config.encoder.hwaccel = hwaccel;
        self
    }

    /// Sets the GPU index used by the encoder.
    pub fn gpu_index(mut self, index: u32) -> Self {
        self.config.encoder.gpu_index = index;
        self
    }

    /// Sets the encoder preset.
    pub fn encoder_preset(mut self, preset: impl Into<String>) -> Self {
        self.config.encoder.preset = preset.into();
        self
    }

    /// Sets the constant quality level.
    pub fn encoder_quality(mut self, quality: u8) -> Self {
        self.config.encoder.quality = quality;
        self
    }

    /// Sets the HDR peak bitrate and buffer size (bits/s, bits).
    pub fn hdr_rate_limits(mut self, max_bitrate: u64, buffer_size: u64) -> Self {
        self.config.encoder.max_bitrate_hdr = max_bitrate;
        self.config.encoder.buffer_size_hdr = buffer_size;
        self
    }

    /// Sets the SDR peak bitrate and buffer size (bits/s, bits).
    pub fn sdr_rate_limits(mut self, max_bitrate: u64, buffer_size: u64) -> Self {
        self.config.encoder.max_bitrate_sdr = max_bitrate;
        self.config.encoder.buffer_size_sdr = buffer_size;
        self
    }

    /// Sets whether a source without audio is rejected.
    pub fn audio_required(mut self, required: bool) -> Self {
        self.config.audio.audio_required = required;
        self
    }

    /// Replaces the output audio slots.
    pub fn audio_slots(mut self, slots: Vec<AudioSlot>) -> Self {
        self.config.audio.slots = slots;
        self
    }

    /// Sets the compatibility marker used in output names.
    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.config.naming.marker = marker.into();
        self
    }

    /// Sets the output container extension.
    pub fn output_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.naming.output_extension = ext.into().trim_start_matches('.').to_string();
        self
    }

    /// Replaces the title cleaning vocabulary.
    pub fn vocabulary(mut self, vocabulary: TitleVocabulary) -> Self {
        self.config.vocabulary = vocabulary;
        self
    }

    /// Sets the accepted container extensions.
    pub fn video_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.video_extensions = exts
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Sets whether subtitle streams are copied.
    pub fn keep_subtitles(mut self, keep: bool) -> Self {
        self.config.keep_subtitles = keep;
        self
    }

    /// Validates and returns the policy.
    pub fn build(self) -> CoreResult<PolicyConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlotLayout;
    use crate::error::CoreError;

    #[test]
    fn test_builder_defaults() {
        let config = PolicyConfigBuilder::new().build().unwrap();
        assert_eq!(config, PolicyConfig::default());
    }

    #[test]
    fn test_builder_overrides() {
        let config = PolicyConfigBuilder::new()
            .allowed_video_codecs(["HEVC"])
            .max_bitrate_sdr(10_000_000)
            .gpu_index(1)
            .hwaccel(None)
            .output_extension(".mp4")
            .video_extensions([".MKV"])
            .audio_slots(vec![AudioSlot {
                name: "stereo".to_string(),
                codec: "aac".to_string(),
                bitrate_kbps: 256,
                layout: SlotLayout::Stereo,
                allow_copy: false,
            }])
            .build()
            .unwrap();

        assert_eq!(config.compatibility.allowed_video_codecs, vec!["hevc"]);
        assert_eq!(config.compatibility.max_bitrate_sdr, 10_000_000);
        assert_eq!(config.encoder.gpu_index, 1);
        assert_eq!(config.encoder.hwaccel, None);
        assert_eq!(config.naming.output_extension, "mp4");
        assert_eq!(config.video_extensions, vec!["mkv"]);
        assert_eq!(config.audio.slots.len(), 1);
    }

    #[test]
    fn test_builder_rejects_invalid_policy() {
        let result = PolicyConfigBuilder::new()
            .allowed_video_codecs(Vec::<String>::new())
            .build();
        assert!(matches!(result, Err(CoreError::Config(_))));

        let result = PolicyConfigBuilder::new().marker("  ").build();
        assert!(matches!(result, Err(CoreError::Config(_))));

        let result = PolicyConfigBuilder::new().encoder_quality(60).build();
        assert!(matches!(result, Err(CoreError::Config(_))));
    }
}
