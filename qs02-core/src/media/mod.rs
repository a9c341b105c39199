//! Media information and probing module
//!
//! This module provides the typed metadata view the engine works on, and the
//! ffprobe collaborator that produces it.

pub mod metadata;
pub mod probe;

// Re-export commonly used types
pub use metadata::{FormatInfo, LanguageTag, MediaMetadata, StreamDescriptor, StreamKind};
pub use probe::{FfprobeProbe, MetadataProbe, parse_ffprobe_json};
