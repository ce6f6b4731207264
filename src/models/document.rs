use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Question;

/// A stored question set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDocument {
    pub id: Uuid,
    pub name: String,
    pub questions: Vec<Question>,
    pub count: usize,
    pub created_at: DateTime<Utc>,
}

impl QuizDocument {
    /// Build a document from a create request, assigning id and creation time.
    ///
    /// `count` is always recomputed from the questions.
    pub fn create(quiz: NewQuiz) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: quiz.name,
            count: quiz.questions.len(),
            questions: quiz.questions,
            created_at: Utc::now(),
        }
    }

    pub fn summary(&self) -> QuizSummary {
        QuizSummary {
            id: self.id,
            name: self.name.clone(),
            count: self.count,
            created_at: self.created_at,
        }
    }
}

/// List projection of a stored quiz (no questions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub id: Uuid,
    pub name: String,
    pub count: usize,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a quiz in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuiz {
    pub name: String,
    pub questions: Vec<Question>,
    pub count: usize,
}

impl NewQuiz {
    pub fn new(name: impl Into<String>, questions: Vec<Question>) -> Self {
        let count = questions.len();
        Self {
            name: name.into(),
            questions,
            count,
        }
    }
}
