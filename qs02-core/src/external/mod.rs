// ============================================================================
// qs02-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg
//
// This module encapsulates the encoder collaborator: rendering a transcode
// plan into ffmpeg arguments, running them, and checking that the required
// binaries and encoders exist. Probing lives in crate::media::probe.
//
// KEY COMPONENTS:
// - build_encoder_args: TranscodePlan -> ordered ffmpeg arguments
// - EncoderRunner / SidecarEncoder: encode execution with progress callbacks
// - check_dependency: presence check for ffmpeg / ffprobe

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::io;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Contains ffmpeg argument building for normalization encodes
pub mod ffmpeg;

/// Contains the encoder runner trait and its ffmpeg-sidecar implementation
pub mod ffmpeg_executor;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg::{build_encoder_args, display_command, format_rate};
pub use ffmpeg_executor::{
    EncodeProgress, EncoderRunner, SidecarEncoder, encoder_available, encoder_listed,
    ensure_encoder,
};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs `cmd_name -version` and only looks at whether the process could be
/// started.
///
/// # Errors
///
/// * `CoreError::DependencyNotFound` - the command is not on `PATH`
/// * `CoreError::CommandStart` - the command exists but could not be started
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {cmd_name}");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{cmd_name}' not found.");
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{cmd_name}': {e}");
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependency() {
        let result = check_dependency("qs02-definitely-not-installed");
        assert!(matches!(result, Err(CoreError::DependencyNotFound(name)) if name == "qs02-definitely-not-installed"));
    }
}
