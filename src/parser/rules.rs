//! Pattern configuration for the text parser.
//!
//! Locale and formatting variants are expressed as data here rather than as
//! code changes in the parser.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Words that may label a question line, e.g. `Câu 3:` or `Question 3.`.
pub const DEFAULT_QUESTION_PREFIXES: [&str; 3] = ["Câu", "Bài", "Question"];

/// Letters used to label answer options, e.g. `A.` or `C)`.
pub const DEFAULT_OPTION_LETTERS: &str = "ABCD";

/// Tokens that mark an answer line as correct anywhere in the line.
pub const DEFAULT_CORRECT_MARKERS: [&str; 2] = ["(đúng)", "(correct)"];

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("failed to read rules file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse rules file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("at least one option letter is required")]
    NoOptionLetters,
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Question-prefix words, option letters and correct-answer tokens.
///
/// Every field falls back to its default when missing from a rules file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserRules {
    /// Matched case-insensitively.
    pub question_prefixes: Vec<String>,
    /// Matched case-sensitively when splitting inline options, and
    /// case-insensitively when stripping an option label.
    pub option_letters: String,
    /// Matched case-insensitively.
    pub correct_markers: Vec<String>,
}

impl Default for ParserRules {
    fn default() -> Self {
        Self {
            question_prefixes: DEFAULT_QUESTION_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            option_letters: DEFAULT_OPTION_LETTERS.to_string(),
            correct_markers: DEFAULT_CORRECT_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

impl ParserRules {
    /// Load rules from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, RulesError> {
        let content = fs::read_to_string(path)?;
        let rules: Self = serde_json::from_str(&content)?;
        if rules.option_letters.trim().is_empty() {
            return Err(RulesError::NoOptionLetters);
        }
        Ok(rules)
    }

    /// Regex alternation of the escaped question prefixes, if any.
    pub(crate) fn prefix_alternation(&self) -> Option<String> {
        let prefixes: Vec<String> = self
            .question_prefixes
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(regex::escape)
            .collect();

        if prefixes.is_empty() {
            None
        } else {
            Some(prefixes.join("|"))
        }
    }

    /// Regex character class body of the escaped option letters.
    pub(crate) fn letter_class(&self) -> Result<String, RulesError> {
        let class: String = self
            .option_letters
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| regex::escape(&c.to_string()))
            .collect();

        if class.is_empty() {
            Err(RulesError::NoOptionLetters)
        } else {
            Ok(class)
        }
    }

    pub(crate) fn marker_alternation(&self) -> Option<String> {
        let markers: Vec<String> = self
            .correct_markers
            .iter()
            .filter(|m| !m.trim().is_empty())
            .map(|m| regex::escape(m))
            .collect();

        if markers.is_empty() {
            None
        } else {
            Some(markers.join("|"))
        }
    }
}
