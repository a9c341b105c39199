// ============================================================================
// qs02-core/src/processing/mod.rs
// ============================================================================
//
// PROCESSING: Classification, Planning and Workflows
//
// The first four submodules form the decision engine. They are pure
// functions over MediaMetadata and the policy: no I/O, no global state.
// The workflow modules drive them together with the probe, the encoder and
// the reports.
//
// KEY COMPONENTS:
// - color: HDR/SDR classification
// - compatibility: QS02 verdict with itemized issues
// - audio: source audio track selection
// - plan: TranscodePlan construction
// - inventory / normalize: per-file workflows

pub mod audio;
pub mod color;
pub mod compatibility;
pub mod inventory;
pub mod normalize;
pub mod plan;

pub use audio::{AudioSelection, rank_audio_streams, select_best_audio};
pub use color::{ColorVerdict, classify_color};
pub use compatibility::{CompatibilityVerdict, evaluate, evaluate_metadata};
pub use inventory::{analyze_file, run_inventory};
pub use normalize::{
    NormalizationJob, NormalizationOutcome, prepare_normalization, run_normalization,
};
pub use plan::{AudioTrackPlan, PlanInputs, TranscodePlan, VideoParams, build_plan};
