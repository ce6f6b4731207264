//! Persistence for quiz documents.
//!
//! [`QuizStore`] is the seam between the library controller and wherever the
//! quizzes live: an in-process [`QuizCollection`] or a collection server
//! reached through [`RemoteStore`].

mod collection;
mod remote;

use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewQuiz, Question, QuizDocument, QuizSummary};
use crate::protocol::status;

pub use collection::QuizCollection;
pub use remote::RemoteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server error {status}: {message}")]
    Status { status: u16, message: String },
    #[error("quiz {0} not found")]
    NotFound(Uuid),
    #[error("invalid quiz: {0}")]
    Invalid(String),
    #[error("unexpected response from server")]
    UnexpectedResponse,
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed data: {0}")]
    Serde(#[from] serde_json::Error),
}

impl StoreError {
    /// Status code reported to clients for this error.
    pub fn status(&self) -> u16 {
        match self {
            StoreError::NotFound(_) => status::NOT_FOUND,
            StoreError::Invalid(_) => status::BAD_REQUEST,
            StoreError::Status { status, .. } => *status,
            _ => status::INTERNAL_ERROR,
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for StoreError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        StoreError::Network(err.to_string())
    }
}

/// Check every question of a stored or received quiz.
pub(crate) fn validate_questions(questions: &[Question]) -> Result<(), StoreError> {
    for (index, question) in questions.iter().enumerate() {
        question
            .validate()
            .map_err(|e| StoreError::Invalid(format!("question {}: {}", index + 1, e)))?;
    }
    Ok(())
}

/// Create, list, read and delete stored quizzes.
#[allow(async_fn_in_trait)]
pub trait QuizStore {
    /// Summaries of all quizzes, newest first.
    async fn list(&mut self) -> Result<Vec<QuizSummary>, StoreError>;

    async fn get(&mut self, id: Uuid) -> Result<QuizDocument, StoreError>;

    /// Store a quiz; the store assigns its id and creation time.
    async fn create(&mut self, quiz: NewQuiz) -> Result<QuizDocument, StoreError>;

    /// Delete a quiz. Deleting an unknown id succeeds.
    async fn delete(&mut self, id: Uuid) -> Result<(), StoreError>;
}

impl QuizStore for QuizCollection {
    async fn list(&mut self) -> Result<Vec<QuizSummary>, StoreError> {
        Ok(self.summaries())
    }

    async fn get(&mut self, id: Uuid) -> Result<QuizDocument, StoreError> {
        self.find(id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn create(&mut self, quiz: NewQuiz) -> Result<QuizDocument, StoreError> {
        self.insert(quiz)
    }

    async fn delete(&mut self, id: Uuid) -> Result<(), StoreError> {
        self.remove(id).map(|_| ())
    }
}

/// Store selected at startup: local file or collection server.
#[derive(Debug)]
pub enum AnyStore {
    Local(QuizCollection),
    Remote(RemoteStore),
}

impl QuizStore for AnyStore {
    async fn list(&mut self) -> Result<Vec<QuizSummary>, StoreError> {
        match self {
            AnyStore::Local(store) => store.list().await,
            AnyStore::Remote(store) => store.list().await,
        }
    }

    async fn get(&mut self, id: Uuid) -> Result<QuizDocument, StoreError> {
        match self {
            AnyStore::Local(store) => store.get(id).await,
            AnyStore::Remote(store) => store.get(id).await,
        }
    }

    async fn create(&mut self, quiz: NewQuiz) -> Result<QuizDocument, StoreError> {
        match self {
            AnyStore::Local(store) => store.create(quiz).await,
            AnyStore::Remote(store) => store.create(quiz).await,
        }
    }

    async fn delete(&mut self, id: Uuid) -> Result<(), StoreError> {
        match self {
            AnyStore::Local(store) => store.delete(id).await,
            AnyStore::Remote(store) => store.delete(id).await,
        }
    }
}
