//! Question ingestion from uploaded files and pasted text.
//!
//! JSON uploads are trusted to be structured already and skip the parser,
//! but every record is checked against the question invariant here so the
//! rest of the crate never sees a malformed question.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::models::Question;
use crate::parser::Parser;

#[derive(Debug, Error)]
pub enum UploadError {
    /// The parser found no questions in the text.
    #[error("no questions found")]
    ParseFailure,
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a list of questions or an object with a \"questions\" list")]
    UnexpectedShape,
    #[error("question {index} is invalid: {reason}")]
    InvalidRecord { index: usize, reason: String },
    #[error("the question list is empty")]
    Empty,
    #[error("unsupported file type: {0}")]
    UnsupportedExtension(String),
    #[error("file is not valid UTF-8 text")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

/// How an uploaded file is interpreted, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Json,
    Text,
}

impl UploadKind {
    pub fn from_file_name(file_name: &str) -> Result<Self, UploadError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(Self::Json),
            "txt" | "text" | "md" => Ok(Self::Text),
            _ => Err(UploadError::UnsupportedExtension(file_name.to_string())),
        }
    }
}

/// A question record as it appears in an uploaded JSON file.
#[derive(Deserialize)]
struct QuestionRecord {
    question: String,
    answers: Vec<String>,
    correct: usize,
}

/// Turn an uploaded file into questions.
pub fn ingest(file_name: &str, bytes: &[u8], parser: &Parser) -> Result<Vec<Question>, UploadError> {
    match UploadKind::from_file_name(file_name)? {
        UploadKind::Json => {
            let content = String::from_utf8(bytes.to_vec())?;
            parse_questions_json(&content)
        }
        UploadKind::Text => {
            let content = String::from_utf8(bytes.to_vec())?;
            ingest_text(&content, parser)
        }
    }
}

/// Run pasted or externally extracted document text through the parser.
pub fn ingest_text(text: &str, parser: &Parser) -> Result<Vec<Question>, UploadError> {
    let questions = parser.parse(text);
    if questions.is_empty() {
        return Err(UploadError::ParseFailure);
    }
    debug!(count = questions.len(), "parsed questions from text");
    Ok(questions)
}

/// Accepts either `[...]` or `{"questions": [...]}`.
pub fn parse_questions_json(content: &str) -> Result<Vec<Question>, UploadError> {
    let value: Value = serde_json::from_str(content)?;

    let records = match value {
        Value::Array(records) => records,
        Value::Object(mut object) => match object.remove("questions") {
            Some(Value::Array(records)) => records,
            _ => return Err(UploadError::UnexpectedShape),
        },
        _ => return Err(UploadError::UnexpectedShape),
    };

    if records.is_empty() {
        return Err(UploadError::Empty);
    }

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let record: QuestionRecord =
                serde_json::from_value(record).map_err(|e| UploadError::InvalidRecord {
                    index,
                    reason: e.to_string(),
                })?;

            let question = Question::new(index, record.question, record.answers, record.correct);
            question
                .validate()
                .map_err(|e| UploadError::InvalidRecord {
                    index,
                    reason: e.to_string(),
                })?;
            Ok(question)
        })
        .collect()
}

/// Read a file from disk and ingest it by extension.
pub fn load_questions_from_path<P: AsRef<Path>>(
    path: P,
    parser: &Parser,
) -> Result<Vec<Question>, UploadError> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    // Check the extension before touching the file.
    UploadKind::from_file_name(file_name)?;

    let bytes = fs::read(path)?;
    ingest(file_name, &bytes, parser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_array() {
        let json = r#"[
            {"id": 7, "question": "2+2?", "answers": ["3", "4"], "correct": 1},
            {"question": "1+1?", "answers": ["2", "3", "4"], "correct": 0}
        ]"#;
        let questions = parse_questions_json(json).unwrap();

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, 0);
        assert_eq!(questions[0].correct, 1);
        assert_eq!(questions[1].id, 1);
    }

    #[test]
    fn test_object_with_questions_field() {
        let json = r#"{"name": "Set", "questions": [
            {"question": "Q?", "answers": ["a", "b"], "correct": 1}
        ]}"#;
        let questions = parse_questions_json(json).unwrap();
        assert_eq!(questions.len(), 1);
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(parse_questions_json("{oops"), Err(UploadError::Json(_))));
        assert!(matches!(parse_questions_json("42"), Err(UploadError::UnexpectedShape)));
        assert!(matches!(
            parse_questions_json(r#"{"items": []}"#),
            Err(UploadError::UnexpectedShape)
        ));
        assert!(matches!(parse_questions_json("[]"), Err(UploadError::Empty)));
    }

    #[test]
    fn test_rejects_invalid_records() {
        let out_of_range = r#"[
            {"question": "ok", "answers": ["a", "b"], "correct": 0},
            {"question": "bad", "answers": ["a", "b"], "correct": 5}
        ]"#;
        assert!(matches!(
            parse_questions_json(out_of_range),
            Err(UploadError::InvalidRecord { index: 1, .. })
        ));

        let missing_field = r#"[{"question": "Q", "answers": ["a", "b"]}]"#;
        assert!(matches!(
            parse_questions_json(missing_field),
            Err(UploadError::InvalidRecord { index: 0, .. })
        ));

        let one_answer = r#"[{"question": "Q", "answers": ["a"], "correct": 0}]"#;
        assert!(matches!(
            parse_questions_json(one_answer),
            Err(UploadError::InvalidRecord { index: 0, .. })
        ));
    }

    #[test]
    fn test_ingest_by_extension() {
        let parser = Parser::default();

        let questions = ingest("quiz.TXT", "Câu 1: Q?\nA. a\n*B. b".as_bytes(), &parser).unwrap();
        assert_eq!(questions[0].correct, 1);

        assert!(matches!(
            ingest("notes.txt", b"nothing here", &parser),
            Err(UploadError::ParseFailure)
        ));
        assert!(matches!(
            ingest("exam.docx", b"PK", &parser),
            Err(UploadError::UnsupportedExtension(_))
        ));
        assert!(matches!(
            ingest("quiz.json", &[0xff, 0xfe], &parser),
            Err(UploadError::Encoding(_))
        ));
    }
}
