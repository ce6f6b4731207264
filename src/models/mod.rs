mod document;
mod question;

pub use document::{NewQuiz, QuizDocument, QuizSummary};
pub use question::{InvalidQuestion, MIN_ANSWERS, Question};
