// ============================================================================
// qs02-core/src/processing/plan.rs
// ============================================================================
//
// TRANSCODE PLANNING: From Metadata to Encode Parameters
//
// Combines the color classification, the audio selection and the policy into
// a TranscodePlan. The plan only carries parameters; turning it into an
// encoder command line is the job of crate::external::ffmpeg.
//
// KEY COMPONENTS:
// - PlanInputs: metadata snapshot plus the movie identity used for naming
// - TranscodePlan / VideoParams / AudioTrackPlan: the immutable result
// - build_plan: the planning entry point
//
// RULES:
// - Video is always re-encoded. HDR keeps its transfer characteristic and is
//   tagged BT.2020; SDR is tagged BT.709 throughout.
// - Every configured audio slot maps the same selected source track. A slot
//   passes the track through untouched when codec and channel count already
//   match its target.

// ---- Internal crate imports ----
use crate::config::{AudioSlot, EncoderPolicy, PolicyConfig};
use crate::error::{CoreError, CoreResult, RequiredStream};
use crate::media::{MediaMetadata, StreamDescriptor};
use crate::naming::{MovieIdentity, build_output_stem, resolution_tag};
use crate::processing::audio::select_best_audio;
use crate::processing::color::{ColorVerdict, TRANSFER_HLG, classify_color};

// ---- External crate imports ----
use serde::Serialize;

/// H.273 code for BT.2020 colour primaries.
const H273_PRIMARIES_BT2020: u8 = 9;
/// H.273 code for the BT.2020 non-constant luminance matrix.
const H273_MATRIX_BT2020NC: u8 = 9;
/// H.273 transfer code for SMPTE ST 2084 (PQ).
const H273_TRANSFER_PQ: u8 = 16;
/// H.273 transfer code for ARIB STD-B67 (HLG).
const H273_TRANSFER_HLG: u8 = 18;

/// Everything the planner needs about one source file.
#[derive(Debug, Clone, Copy)]
pub struct PlanInputs<'a> {
    pub metadata: &'a MediaMetadata,
    pub identity: &'a MovieIdentity,
}

impl<'a> PlanInputs<'a> {
    pub fn new(metadata: &'a MediaMetadata, identity: &'a MovieIdentity) -> Self {
        Self { metadata, identity }
    }
}

/// Video encoder parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoParams {
    pub encoder: String,
    pub preset: String,
    /// Constant quality level
    pub quality: u8,
    pub pixel_format: String,
    pub profile: String,
    pub color_primaries: String,
    pub color_space: String,
    pub color_transfer: String,
    /// Peak bitrate clamp in bits/s
    pub max_bitrate: u64,
    /// Rate-control buffer in bits
    pub buffer_size: u64,
    /// `hevc_metadata` bitstream filter options that rewrite the VUI color tags
    pub hevc_metadata: Option<String>,
}

/// One output audio track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioTrackPlan {
    /// Index of the source stream in the container
    pub source_stream_index: usize,
    /// Position of the source stream among the audio streams (`0:a:N`)
    pub source_audio_ordinal: usize,
    pub slot_name: String,
    pub target_codec: String,
    /// Target bitrate in kbps
    pub target_bitrate: u32,
    pub target_channels: u32,
    /// Bit-exact passthrough; bitrate and channels are not applied
    pub can_copy: bool,
}

/// Encode plan for one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscodePlan {
    pub is_hdr: bool,
    pub transfer_tag: String,
    pub video: VideoParams,
    /// Output audio tracks, in output order
    pub audio_tracks: Vec<AudioTrackPlan>,
    /// Output file name without extension
    pub output_stem: String,
}

impl TranscodePlan {
    /// "HDR" or "SDR".
    pub fn dynamic_range_label(&self) -> &'static str {
        if self.is_hdr { "HDR" } else { "SDR" }
    }
}

fn is_hevc_encoder(encoder: &str) -> bool {
    let encoder = encoder.to_lowercase();
    encoder.contains("hevc") || encoder.contains("265")
}

fn video_params(color: &ColorVerdict, encoder: &EncoderPolicy) -> VideoParams {
    if color.is_hdr {
        let transfer_code = if color.transfer_tag == TRANSFER_HLG {
            H273_TRANSFER_HLG
        } else {
            H273_TRANSFER_PQ
        };
        // Without this filter NVENC leaves the VUI color tags unset.
        let hevc_metadata = is_hevc_encoder(&encoder.video_encoder).then(|| {
            format!(
                "colour_primaries={H273_PRIMARIES_BT2020}:transfer_characteristics={transfer_code}:matrix_coefficients={H273_MATRIX_BT2020NC}"
            )
        });
        VideoParams {
            encoder: encoder.video_encoder.clone(),
            preset: encoder.preset.clone(),
            quality: encoder.quality,
            pixel_format: encoder.hdr_pixel_format.clone(),
            profile: "main10".to_string(),
            color_primaries: "bt2020".to_string(),
            color_space: "bt2020nc".to_string(),
            color_transfer: color.transfer_tag.clone(),
            max_bitrate: encoder.max_bitrate_hdr,
            buffer_size: encoder.buffer_size_hdr,
            hevc_metadata,
        }
    } else {
        VideoParams {
            encoder: encoder.video_encoder.clone(),
            preset: encoder.preset.clone(),
            quality: encoder.quality,
            pixel_format: encoder.sdr_pixel_format.clone(),
            profile: "main".to_string(),
            color_primaries: "bt709".to_string(),
            color_space: "bt709".to_string(),
            color_transfer: "bt709".to_string(),
            max_bitrate: encoder.max_bitrate_sdr,
            buffer_size: encoder.buffer_size_sdr,
            hevc_metadata: None,
        }
    }
}

fn audio_track_plan(source: &StreamDescriptor, ordinal: usize, slot: &AudioSlot) -> AudioTrackPlan {
    let target_channels = slot.layout.target_channels(source.channels);
    let can_copy = slot.allow_copy
        && source.codec_name.eq_ignore_ascii_case(&slot.codec)
        && source.channels == target_channels;

    AudioTrackPlan {
        source_stream_index: source.index,
        source_audio_ordinal: ordinal,
        slot_name: slot.name.clone(),
        target_codec: slot.codec.clone(),
        target_bitrate: slot.bitrate_kbps,
        target_channels,
        can_copy,
    }
}

/// Builds the transcode plan for one file.
///
/// # Errors
///
/// `MissingRequiredStream` when the file has no video stream, or no audio
/// stream while the policy requires audio.
pub fn build_plan(inputs: &PlanInputs<'_>, policy: &PolicyConfig) -> CoreResult<TranscodePlan> {
    let metadata = inputs.metadata;
    let video = metadata
        .video_stream()
        .ok_or(CoreError::MissingRequiredStream {
            kind: RequiredStream::Video,
        })?;

    let color = classify_color(video);
    let audio_streams = metadata.audio_streams();
    let selection = select_best_audio(&audio_streams);

    let audio_tracks = match selection {
        Some(selection) => {
            let source = selection.stream;
            let ordinal = metadata
                .audio_ordinal(source.index)
                .ok_or(CoreError::MissingRequiredStream {
                    kind: RequiredStream::Audio,
                })?;
            policy
                .audio
                .slots
                .iter()
                .map(|slot| audio_track_plan(source, ordinal, slot))
                .collect()
        }
        None if policy.audio.audio_required => {
            return Err(CoreError::MissingRequiredStream {
                kind: RequiredStream::Audio,
            });
        }
        None => {
            log::info!("No audio stream; planning a video-only output");
            Vec::new()
        }
    };

    let output_stem = build_output_stem(
        inputs.identity,
        &resolution_tag(video.height),
        color.dynamic_range_label(),
        &policy.naming.marker,
    );

    let plan = TranscodePlan {
        is_hdr: color.is_hdr,
        transfer_tag: color.transfer_tag.clone(),
        video: video_params(&color, &policy.encoder),
        audio_tracks,
        output_stem,
    };

    log::debug!(
        "Plan for '{}': {} {}, {} audio track(s)",
        plan.output_stem,
        plan.dynamic_range_label(),
        plan.transfer_tag,
        plan.audio_tracks.len()
    );
    Ok(plan)
}
