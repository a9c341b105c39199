//! Compiled title-cleaning vocabulary.
//!
//! A [`TitleVocabulary`] is plain data: a versioned list of regex fragments.
//! This module turns it into the three patterns the title extractor applies,
//! once, so extraction itself never compiles anything.

use crate::config::TitleVocabulary;
use crate::error::{CoreError, CoreResult};

use regex::Regex;

/// Release-metadata patterns ready to be applied to a filename stem.
#[derive(Debug, Clone)]
pub struct CompiledVocabulary {
    version: u32,
    token_count: usize,
    // None when the vocabulary is empty
    patterns: Option<TokenPatterns>,
}

#[derive(Debug, Clone)]
struct TokenPatterns {
    /// A bare token between word boundaries
    word: Regex,
    /// `[TOKEN...]`
    bracketed: Regex,
    /// `(TOKEN...)`
    parenthesized: Regex,
}

fn compile(pattern: &str) -> CoreResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| CoreError::Config(format!("Invalid title vocabulary pattern: {e}")))
}

impl CompiledVocabulary {
    /// Compiles every token of `vocabulary` into a single alternation.
    pub fn compile(vocabulary: &TitleVocabulary) -> CoreResult<Self> {
        let tokens: Vec<&str> = vocabulary
            .tokens
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();

        // Check tokens one by one so a bad entry is named in the error.
        for token in &tokens {
            Regex::new(token).map_err(|e| {
                CoreError::Config(format!("Invalid title vocabulary token '{token}': {e}"))
            })?;
        }

        let patterns = if tokens.is_empty() {
            None
        } else {
            let alternation = tokens.join("|");
            Some(TokenPatterns {
                word: compile(&format!(r"(?i)\b({alternation})\b"))?,
                bracketed: compile(&format!(r"(?i)\[({alternation})\w*\]"))?,
                parenthesized: compile(&format!(r"(?i)\(({alternation})\w*\)"))?,
            })
        };

        log::debug!(
            "Compiled title vocabulary v{} ({} tokens)",
            vocabulary.version,
            tokens.len()
        );

        Ok(Self {
            version: vocabulary.version,
            token_count: tokens.len(),
            patterns,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// Removes every vocabulary token, then bracketed and parenthesized
    /// groups that start with one.
    pub fn strip(&self, text: &str) -> String {
        let Some(patterns) = &self.patterns else {
            return text.to_string();
        };
        let text = patterns.word.replace_all(text, "");
        let text = patterns.bracketed.replace_all(&text, "");
        patterns.parenthesized.replace_all(&text, "").into_owned()
    }
}
