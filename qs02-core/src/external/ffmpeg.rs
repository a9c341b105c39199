//! FFmpeg argument rendering for normalization encodes
//!
//! This module turns a [`TranscodePlan`] into the ordered ffmpeg argument
//! list: stream mapping, the NVENC rate-control block, HDR/SDR color tagging,
//! and one codec directive per output audio track. Running the command is
//! handled by [`crate::external::ffmpeg_executor`].

use crate::config::PolicyConfig;
use crate::processing::plan::{AudioTrackPlan, TranscodePlan};

use std::path::Path;

/// Formats a bit rate for ffmpeg, using the `M` suffix for whole megabits.
#[must_use]
pub fn format_rate(bits: u64) -> String {
    if bits > 0 && bits % 1_000_000 == 0 {
        format!("{}M", bits / 1_000_000)
    } else {
        bits.to_string()
    }
}

fn push(args: &mut Vec<String>, items: &[&str]) {
    args.extend(items.iter().map(|s| (*s).to_string()));
}

fn push_audio_track(args: &mut Vec<String>, position: usize, track: &AudioTrackPlan) {
    if track.can_copy {
        args.push(format!("-c:a:{position}"));
        args.push("copy".to_string());
        return;
    }
    args.push(format!("-c:a:{position}"));
    args.push(track.target_codec.clone());
    args.push(format!("-b:a:{position}"));
    args.push(format!("{}k", track.target_bitrate));
    args.push(format!("-ac:a:{position}"));
    args.push(track.target_channels.to_string());
}

/// Builds the complete ffmpeg argument list (without the program name).
///
/// The argument order is fixed: global options, hardware decoding and input,
/// stream maps, video parameters, audio parameters, subtitles, output path.
/// With `overwrite` unset ffmpeg is told never to replace an existing file.
pub fn build_encoder_args(
    plan: &TranscodePlan,
    input: &Path,
    output: &Path,
    policy: &PolicyConfig,
    overwrite: bool,
) -> Vec<String> {
    let encoder = &policy.encoder;
    let video = &plan.video;
    let mut args: Vec<String> = Vec::with_capacity(96);

    push(&mut args, &["-hide_banner", if overwrite { "-y" } else { "-n" }]);
    if let Some(hwaccel) = encoder.hwaccel.as_deref().filter(|h| !h.is_empty()) {
        push(&mut args, &["-hwaccel", hwaccel]);
    }
    args.push("-i".to_string());
    args.push(input.to_string_lossy().into_owned());

    // ---- Stream selection ----
    push(&mut args, &["-map", "0:v:0"]);
    for track in &plan.audio_tracks {
        args.push("-map".to_string());
        args.push(format!("0:a:{}", track.source_audio_ordinal));
    }
    if policy.keep_subtitles {
        push(&mut args, &["-map", "0:s?"]);
    }
    push(&mut args, &["-map_metadata", "0", "-map_chapters", "0"]);

    // ---- Video ----
    push(&mut args, &["-c:v", video.encoder.as_str()]);
    args.push("-gpu".to_string());
    args.push(encoder.gpu_index.to_string());
    push(&mut args, &["-preset", video.preset.as_str(), "-rc:v", "vbr"]);
    args.push("-cq:v".to_string());
    args.push(video.quality.to_string());
    push(&mut args, &["-b:v", "0", "-spatial_aq", "1", "-temporal_aq", "1"]);
    args.push("-aq-strength".to_string());
    args.push(encoder.aq_strength.to_string());
    args.push("-rc-lookahead".to_string());
    args.push(encoder.rc_lookahead.to_string());

    args.push("-maxrate:v".to_string());
    args.push(format_rate(video.max_bitrate));
    args.push("-bufsize:v".to_string());
    args.push(format_rate(video.buffer_size));
    push(
        &mut args,
        &[
            "-profile:v",
            video.profile.as_str(),
            "-pix_fmt",
            video.pixel_format.as_str(),
            "-color_primaries",
            video.color_primaries.as_str(),
            "-colorspace",
            video.color_space.as_str(),
            "-color_trc",
            video.color_transfer.as_str(),
        ],
    );
    if let Some(metadata) = &video.hevc_metadata {
        args.push("-bsf:v".to_string());
        args.push(format!("hevc_metadata={metadata}"));
    }

    // ---- Audio ----
    for (position, track) in plan.audio_tracks.iter().enumerate() {
        push_audio_track(&mut args, position, track);
    }

    // ---- Subtitles ----
    if policy.keep_subtitles {
        push(&mut args, &["-c:s", "copy"]);
    }

    args.push(output.to_string_lossy().into_owned());
    args
}

/// Renders an argument list as a shell-like command line for display.
#[must_use]
pub fn display_command(program: &str, args: &[String]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
            line.push('\'');
            line.push_str(&arg.replace('\'', r"'\''"));
            line.push('\'');
        } else {
            line.push_str(arg);
        }
    }
    line
}
