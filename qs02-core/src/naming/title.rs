//! Movie title and year extraction from release filenames.

use crate::config::TitleVocabulary;
use crate::error::{CoreError, CoreResult};
use crate::naming::vocabulary::CompiledVocabulary;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

use std::path::Path;

/// Title and release year recovered from a filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieIdentity {
    pub title: String,
    pub year: Option<String>,
}

/// Extracts a [`MovieIdentity`] from filenames using a compiled vocabulary.
#[derive(Debug, Clone)]
pub struct TitleExtractor {
    vocabulary: CompiledVocabulary,
    year: Regex,
    whitespace: Regex,
    dots: Regex,
    edges: Regex,
}

static DEFAULT_EXTRACTOR: Lazy<CoreResult<TitleExtractor>> =
    Lazy::new(|| TitleExtractor::new(&TitleVocabulary::default()));

/// Process-wide extractor for the built-in vocabulary, compiled on first use.
pub fn default_extractor() -> CoreResult<&'static TitleExtractor> {
    DEFAULT_EXTRACTOR
        .as_ref()
        .map_err(|e| CoreError::Config(e.to_string()))
}

fn fixed(pattern: &str) -> CoreResult<Regex> {
    Regex::new(pattern).map_err(|e| CoreError::Config(format!("Invalid pattern {pattern}: {e}")))
}

impl TitleExtractor {
    pub fn new(vocabulary: &TitleVocabulary) -> CoreResult<Self> {
        Ok(Self {
            vocabulary: CompiledVocabulary::compile(vocabulary)?,
            year: fixed(r"\b(19|20)\d{2}\b")?,
            whitespace: fixed(r"\s+")?,
            dots: fixed(r"\.+")?,
            edges: fixed(r"^[.\s]+|[.\s]+$")?,
        })
    }

    /// Version of the vocabulary this extractor was built from.
    pub fn vocabulary_version(&self) -> u32 {
        self.vocabulary.version()
    }

    /// Extracts title and year from `filename` (a bare name or a path).
    ///
    /// The year is the first 1900-2099 number delimited by word boundaries.
    /// When cleaning leaves fewer than two characters the filename stem is
    /// used as the title.
    pub fn extract(&self, filename: &str) -> MovieIdentity {
        let stem = Path::new(filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| filename.to_string());

        let year = self.year.find(&stem).map(|m| m.as_str().to_string());

        let mut title = self.clean(&stem);
        if let Some(year) = &year {
            let without_year = self.year.replace_all(&title, |caps: &Captures| {
                if &caps[0] == year.as_str() {
                    String::new()
                } else {
                    caps[0].to_string()
                }
            });
            title = self.clean(&without_year);
        }

        if title.chars().count() < 2 {
            log::debug!("Title of '{stem}' cleaned down to '{title}'; keeping the stem");
            title = stem;
        }

        MovieIdentity { title, year }
    }

    /// Removes release metadata and normalizes separators.
    pub fn clean(&self, name: &str) -> String {
        let cleaned = self.vocabulary.strip(name);
        let cleaned = self.whitespace.replace_all(&cleaned, " ");
        let cleaned = self.dots.replace_all(&cleaned, ".");
        let cleaned = self.edges.replace_all(&cleaned, "");
        cleaned.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(name: &str) -> MovieIdentity {
        default_extractor().unwrap().extract(name)
    }

    #[test]
    fn test_scene_release_name() {
        let identity = extract("Movie.Title.2019.1080p.BluRay.x265.HEVC.AC3-GROUP.mkv");
        assert_eq!(identity.year.as_deref(), Some("2019"));
        assert!(identity.title.starts_with("Movie.Title"));
        assert!(!identity.title.contains("2019"));
        assert!(!identity.title.to_lowercase().contains("bluray"));
    }

    #[test]
    fn test_plain_title_and_year() {
        let identity = extract("Amelie.2001.mkv");
        assert_eq!(
            identity,
            MovieIdentity {
                title: "Amelie".to_string(),
                year: Some("2001".to_string())
            }
        );
    }

    #[test]
    fn test_only_the_detected_year_is_removed() {
        let identity = extract("2001.A.Space.Odyssey.1968.2160p.UHD.mkv");
        assert_eq!(identity.year.as_deref(), Some("2001"));
        assert_eq!(identity.title, "A.Space.Odyssey.1968");
    }

    #[test]
    fn test_title_that_is_a_year_falls_back_to_stem() {
        let identity = extract("2012.mkv");
        assert_eq!(identity.title, "2012");
        assert_eq!(identity.year.as_deref(), Some("2012"));
    }

    #[test]
    fn test_all_metadata_falls_back_to_stem() {
        let identity = extract("/films/1080p.x264.mkv");
        assert_eq!(identity.title, "1080p.x264");
        assert_eq!(identity.year, None);
    }

    #[test]
    fn test_spaces_are_collapsed() {
        let identity = extract("Le   Fabuleux Destin  MULTI 1080p.mkv");
        assert_eq!(identity.title, "Le Fabuleux Destin");
        assert_eq!(identity.year, None);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let first = extract("Some.Film.1999.720p.WEB-DL.AAC.mp4");
        let second = extract("Some.Film.1999.720p.WEB-DL.AAC.mp4");
        assert_eq!(first, second);
        assert_eq!(first.title, "Some.Film");
    }

    #[test]
    fn test_custom_vocabulary() {
        let vocab = TitleVocabulary::default().extended_with(["GROUP"]);
        let extractor = TitleExtractor::new(&vocab).unwrap();
        let identity = extractor.extract("Movie.Title.2019.1080p.x265-GROUP.mkv");
        assert_eq!(identity.title, "Movie.Title.-");
        assert_eq!(extractor.vocabulary_version(), 1);
    }
}
