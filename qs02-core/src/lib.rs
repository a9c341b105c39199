//! Core library for classifying video files against the QS02 profile and
//! planning their normalization.
//!
//! The decision engine (HDR/SDR classification, compatibility evaluation,
//! audio selection, title extraction, output naming and transcode planning)
//! is a set of pure functions over [`MediaMetadata`] and an explicit
//! [`PolicyConfig`]. Probing, encoding and reporting sit around it as
//! collaborators.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use qs02_core::{FfprobeProbe, PolicyConfig, find_video_files, run_inventory};
//! use std::path::Path;
//!
//! let policy = PolicyConfig::default();
//! let files = find_video_files(Path::new("/films"), &policy.video_extensions).unwrap();
//!
//! let report = run_inventory(&files, &FfprobeProbe::new(), &policy, |_, _, _, _| {});
//! println!(
//!     "{} compatible, {} to normalize",
//!     report.compatible.len(),
//!     report.needs_normalization.len()
//! );
//! report.write_tsv_file(Path::new("/films/inventory.tsv")).unwrap();
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod external;
pub mod media;
pub mod naming;
pub mod processing;
pub mod reporting;
pub mod utils;

// Re-exports for public API
pub use config::{
    AudioPolicy, AudioSlot, CompatibilityPolicy, EncoderPolicy, NamingPolicy, PolicyConfig,
    PolicyConfigBuilder, SlotLayout, TitleVocabulary,
};
pub use discovery::{ensure_supported_extension, find_video_files};
pub use error::{CoreError, CoreResult, RequiredStream};
pub use external::{EncodeProgress, EncoderRunner, SidecarEncoder, check_dependency};
pub use media::{
    FfprobeProbe, FormatInfo, LanguageTag, MediaMetadata, MetadataProbe, StreamDescriptor,
    StreamKind,
};
pub use naming::{MovieIdentity, TitleExtractor};
pub use processing::{
    AudioTrackPlan, ColorVerdict, CompatibilityVerdict, NormalizationJob, NormalizationOutcome,
    PlanInputs, TranscodePlan, VideoParams, analyze_file, build_plan, classify_color, evaluate,
    prepare_normalization, run_inventory, run_normalization, select_best_audio,
};
pub use reporting::{InventoryEntry, InventoryReport};
pub use utils::{format_bitrate, format_duration, format_size};
