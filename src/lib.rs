//! # smart-quiz
//!
//! Turn pasted or uploaded text into multiple-choice quizzes, keep them in a
//! quiz collection, and take them as timed quizzes in the terminal.
//!
//! ## Usage
//!
//! ```rust
//! use smart_quiz::{QuizSession, parser};
//!
//! let questions = parser::parse("Câu 1: 2+2=?\nA. 3\n*B. 4");
//! assert_eq!(questions[0].correct, 1);
//!
//! let mut session = QuizSession::new();
//! session.start(&questions, 30, false).unwrap();
//! session.select_answer(1).unwrap();
//! let report = session.submit().unwrap();
//! assert_eq!(report.display_score(), "10.0");
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod library;
pub mod logging;
pub mod models;
pub mod parser;
pub mod protocol;
pub mod server;
pub mod session;
pub mod store;
pub mod terminal;
mod ui;

use std::io;

use thiserror::Error;

pub use app::App;
pub use data::UploadError;
pub use library::{Library, LibraryStatus};
pub use models::{NewQuiz, Question, QuizDocument, QuizSummary};
pub use parser::{Parser, ParserRules, RulesError};
pub use session::{Countdown, QuizSession, ScoreReport, SessionError, SessionState};
pub use store::{AnyStore, QuizCollection, QuizStore, RemoteStore, StoreError};

/// Error type for quiz operations.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("failed to load questions: {0}")]
    Upload(#[from] UploadError),
    #[error("store request failed: {0}")]
    Store(#[from] StoreError),
    #[error("invalid parser rules: {0}")]
    Rules(#[from] RulesError),
    #[error("there are no questions to save")]
    EmptyDraft,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
