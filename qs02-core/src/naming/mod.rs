//! Title extraction and output naming.

pub mod output;
pub mod title;
pub mod vocabulary;

pub use output::{
    build_output_stem, find_available_path, has_compatibility_marker, resolution_tag,
    resolve_output_path,
};
pub use title::{MovieIdentity, TitleExtractor, default_extractor};
pub use vocabulary::CompiledVocabulary;
