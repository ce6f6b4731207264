use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum number of answer options a question must carry.
pub const MIN_ANSWERS: usize = 2;

/// A single multiple-choice question.
///
/// `id` is the position of the question in the sequence it was parsed or
/// loaded from; it is not a global identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: usize,
    pub question: String,
    pub answers: Vec<String>,
    pub correct: usize,
}

/// Reason a question record breaks the question invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidQuestion {
    #[error("question has {0} answers, at least 2 are required")]
    TooFewAnswers(usize),
    #[error("correct index {correct} is out of range for {answers} answers")]
    CorrectOutOfRange { correct: usize, answers: usize },
}

impl Question {
    pub fn new(id: usize, question: String, answers: Vec<String>, correct: usize) -> Self {
        Self {
            id,
            question,
            answers,
            correct,
        }
    }

    /// Check `answers.len() >= 2` and `correct < answers.len()`.
    pub fn validate(&self) -> Result<(), InvalidQuestion> {
        if self.answers.len() < MIN_ANSWERS {
            return Err(InvalidQuestion::TooFewAnswers(self.answers.len()));
        }
        if self.correct >= self.answers.len() {
            return Err(InvalidQuestion::CorrectOutOfRange {
                correct: self.correct,
                answers: self.answers.len(),
            });
        }
        Ok(())
    }

    pub fn is_correct(&self, answer: Option<usize>) -> bool {
        answer == Some(self.correct)
    }
}
