//! Protocol messages for the quiz collection API.
//!
//! Every request and every response is a single JSON text frame over
//! WebSocket. Requests on one connection are answered in order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{NewQuiz, Question, QuizDocument, QuizSummary};

/// Default collection server port.
pub const DEFAULT_PORT: u16 = 8713;

/// HTTP-style status codes carried by error responses.
pub mod status {
    pub const BAD_REQUEST: u16 = 400;
    pub const NOT_FOUND: u16 = 404;
    pub const INTERNAL_ERROR: u16 = 500;
}

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreRequest {
    /// Summaries of every stored quiz, newest first.
    List,

    /// A full quiz document.
    Get { id: Uuid },

    /// Store a new quiz.
    Create {
        name: String,
        questions: Vec<Question>,
        count: usize,
    },

    /// Remove a quiz. Removing a missing id is not an error.
    Delete { id: Uuid },
}

impl From<NewQuiz> for StoreRequest {
    fn from(quiz: NewQuiz) -> Self {
        StoreRequest::Create {
            name: quiz.name,
            questions: quiz.questions,
            count: quiz.count,
        }
    }
}

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreResponse {
    /// Answer to `List`.
    Summaries { quizzes: Vec<QuizSummary> },

    /// Answer to `Get` and `Create`.
    Document { quiz: QuizDocument },

    /// Answer to `Delete`.
    Deleted { id: Uuid },

    /// The request failed.
    Error { status: u16, message: String },
}

impl StoreResponse {
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        StoreResponse::Error {
            status,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let json = serde_json::to_string(&StoreRequest::List).unwrap();
        assert_eq!(json, r#"{"type":"List"}"#);

        let request: StoreRequest = serde_json::from_str(
            r#"{"type":"Create","name":"Set","questions":[],"count":0}"#,
        )
        .unwrap();
        assert_eq!(request, StoreRequest::from(NewQuiz::new("Set", Vec::new())));
    }

    #[test]
    fn test_error_response_serialization() {
        let json = serde_json::to_string(&StoreResponse::error(status::NOT_FOUND, "missing")).unwrap();
        assert!(json.contains("\"type\":\"Error\""));
        assert!(json.contains("\"status\":404"));
    }
}
