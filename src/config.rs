//! Runtime configuration shared by the CLI and the terminal UI.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::QuizError;
use crate::parser::{Parser, ParserRules};
use crate::store::{AnyStore, QuizCollection, RemoteStore};

pub const DEFAULT_TIME_LIMIT_MINUTES: u32 = 30;
pub const MIN_TIME_LIMIT_MINUTES: u32 = 1;
pub const MAX_TIME_LIMIT_MINUTES: u32 = 180;

/// Settings applied when a quiz is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub time_limit_minutes: u32,
    pub shuffle: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_limit_minutes: DEFAULT_TIME_LIMIT_MINUTES,
            shuffle: false,
        }
    }
}

impl Settings {
    pub fn new(time_limit_minutes: u32, shuffle: bool) -> Self {
        Self {
            time_limit_minutes: time_limit_minutes
                .clamp(MIN_TIME_LIMIT_MINUTES, MAX_TIME_LIMIT_MINUTES),
            shuffle,
        }
    }

    pub fn increase_time_limit(&mut self, minutes: u32) {
        self.time_limit_minutes = self
            .time_limit_minutes
            .saturating_add(minutes)
            .min(MAX_TIME_LIMIT_MINUTES);
    }

    pub fn decrease_time_limit(&mut self, minutes: u32) {
        self.time_limit_minutes = self
            .time_limit_minutes
            .saturating_sub(minutes)
            .max(MIN_TIME_LIMIT_MINUTES);
    }

    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
    }
}

/// Where quizzes are stored: a collection server or a local JSON file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Remote(String),
    File(PathBuf),
}

impl StoreLocation {
    pub fn open(&self) -> Result<AnyStore, QuizError> {
        match self {
            StoreLocation::Remote(addr) => {
                let store = RemoteStore::new(addr);
                info!(url = store.url(), "using collection server");
                Ok(AnyStore::Remote(store))
            }
            StoreLocation::File(path) => Ok(AnyStore::Local(QuizCollection::open(path)?)),
        }
    }
}

/// Build a parser from an optional rules file.
pub fn load_parser(rules: Option<&Path>) -> Result<Parser, QuizError> {
    match rules {
        Some(path) => {
            let rules = ParserRules::from_json_file(path)?;
            info!(path = %path.display(), "loaded parser rules");
            Ok(Parser::new(rules)?)
        }
        None => Ok(Parser::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_limit_is_clamped() {
        let mut settings = Settings::new(0, false);
        assert_eq!(settings.time_limit_minutes, MIN_TIME_LIMIT_MINUTES);

        settings.decrease_time_limit(5);
        assert_eq!(settings.time_limit_minutes, MIN_TIME_LIMIT_MINUTES);

        settings.increase_time_limit(1000);
        assert_eq!(settings.time_limit_minutes, MAX_TIME_LIMIT_MINUTES);

        settings.toggle_shuffle();
        assert!(settings.shuffle);
    }

    #[test]
    fn test_missing_rules_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("missing-rules-{}.json", uuid::Uuid::new_v4()));
        assert!(matches!(
            load_parser(Some(&path)),
            Err(QuizError::Rules(_))
        ));
        assert!(load_parser(None).is_ok());
    }
}
