// ============================================================================
// qs02-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: Running Normalization Encodes
//
// This module runs an ffmpeg argument list produced by
// crate::external::ffmpeg and reports progress while it runs.
//
// KEY COMPONENTS:
// - EncoderRunner: Trait for anything that can run an encode
// - SidecarEncoder: Concrete implementation using ffmpeg-sidecar
// - EncodeProgress: Progress snapshot handed to callers
// - encoder_available: Checks that ffmpeg was built with a given encoder
//
// The runner never retries: a failed encode is reported once and the caller
// decides what to do with the file.

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use crate::utils::parse_ffmpeg_time;

// ---- External crate imports ----
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};

// ---- Standard library imports ----
use std::process::{Command, ExitStatus};

/// Number of stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// Progress snapshot of a running encode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeProgress {
    /// Output time encoded so far, in seconds
    pub elapsed_seconds: f64,
    /// Source duration in seconds, 0 when unknown
    pub total_seconds: f64,
    /// Encoding speed relative to realtime
    pub speed: f32,
}

impl EncodeProgress {
    /// Completion percentage, or `None` when the duration is unknown.
    pub fn percent(&self) -> Option<f64> {
        (self.total_seconds > 0.0)
            .then(|| (self.elapsed_seconds / self.total_seconds * 100.0).clamp(0.0, 100.0))
    }
}

/// Runs encoder argument lists.
pub trait EncoderRunner {
    /// Runs ffmpeg with `args`, calling `on_progress` as the encode advances.
    fn run(
        &self,
        args: &[String],
        duration_seconds: f64,
        on_progress: &mut dyn FnMut(&EncodeProgress),
    ) -> CoreResult<()>;
}

/// [`EncoderRunner`] backed by `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarEncoder;

impl SidecarEncoder {
    pub fn new() -> Self {
        Self
    }
}

fn push_tail(tail: &mut Vec<String>, line: String) {
    if tail.len() == STDERR_TAIL_LINES {
        tail.remove(0);
    }
    tail.push(line);
}

impl EncoderRunner for SidecarEncoder {
    fn run(
        &self,
        args: &[String],
        duration_seconds: f64,
        on_progress: &mut dyn FnMut(&EncodeProgress),
    ) -> CoreResult<()> {
        log::debug!("Spawning ffmpeg with {} arguments", args.len());

        let mut cmd = FfmpegCommand::new();
        cmd.args(args);
        let mut child = cmd
            .spawn()
            .map_err(|e| command_start_error("ffmpeg (sidecar)", e))?;

        let events = child.iter().map_err(|e| {
            command_failed_error(
                "ffmpeg (sidecar - get iter)",
                ExitStatus::default(),
                e.to_string(),
            )
        })?;

        let mut stderr_tail: Vec<String> = Vec::new();
        for event in events {
            match event {
                FfmpegEvent::Progress(progress) => {
                    let elapsed_seconds = parse_ffmpeg_time(&progress.time).unwrap_or(0.0);
                    on_progress(&EncodeProgress {
                        elapsed_seconds,
                        total_seconds: duration_seconds,
                        speed: progress.speed,
                    });
                }
                FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, message) => {
                    log::debug!(target: "ffmpeg_log", "{message}");
                    push_tail(&mut stderr_tail, message);
                }
                FfmpegEvent::Log(LogLevel::Warning, message) => {
                    log::debug!(target: "ffmpeg_log", "{message}");
                }
                FfmpegEvent::Error(error) => {
                    log::debug!("ffmpeg error: {error}");
                    push_tail(&mut stderr_tail, error);
                }
                _ => {}
            }
        }

        let status = child
            .wait()
            .map_err(|e| command_start_error("ffmpeg (sidecar - wait)", e))?;

        if status.success() {
            log::info!("ffmpeg finished successfully");
            Ok(())
        } else {
            let stderr = stderr_tail.join("\n");
            log::error!("ffmpeg exited with {status}");
            Err(command_failed_error("ffmpeg", status, stderr))
        }
    }
}

/// Returns true when `listing` (output of `ffmpeg -encoders`) names `encoder`.
#[must_use]
pub fn encoder_listed(listing: &str, encoder: &str) -> bool {
    listing.lines().any(|line| {
        // " V....D hevc_nvenc    NVIDIA NVENC hevc encoder"
        let mut fields = line.split_whitespace();
        matches!((fields.next(), fields.next()), (Some(_flags), Some(name)) if name == encoder)
    })
}

/// Checks that the local ffmpeg build provides `encoder`.
pub fn encoder_available(encoder: &str) -> CoreResult<bool> {
    let output = Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .output()
        .map_err(|e| command_start_error("ffmpeg -encoders", e))?;

    if !output.status.success() {
        return Err(command_failed_error(
            "ffmpeg -encoders",
            output.status,
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ));
    }

    let listing = String::from_utf8_lossy(&output.stdout);
    Ok(encoder_listed(&listing, encoder))
}

/// Fails with `EncoderUnavailable` unless ffmpeg provides `encoder`.
pub fn ensure_encoder(encoder: &str) -> CoreResult<()> {
    if encoder_available(encoder)? {
        log::debug!("Encoder {encoder} is available");
        Ok(())
    } else {
        Err(CoreError::EncoderUnavailable(encoder.to_string()))
    }
}
