use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{NewQuiz, QuizDocument, QuizSummary};

use super::{StoreError, validate_questions};

/// An in-memory set of quiz documents, optionally mirrored to a JSON file.
#[derive(Debug, Default)]
pub struct QuizCollection {
    /// Documents in insertion order.
    documents: Vec<QuizDocument>,
    path: Option<PathBuf>,
}

impl QuizCollection {
    /// A collection that lives only in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a file-backed collection. A missing file starts empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let documents: Vec<QuizDocument> = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            Vec::new()
        };

        for document in &documents {
            validate_questions(&document.questions).map_err(|e| {
                StoreError::Invalid(format!("stored quiz {} is corrupt: {}", document.id, e))
            })?;
        }

        info!(path = %path.display(), count = documents.len(), "opened quiz collection");
        Ok(Self {
            documents,
            path: Some(path),
        })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Summaries ordered newest first.
    pub fn summaries(&self) -> Vec<QuizSummary> {
        let mut summaries: Vec<QuizSummary> =
            self.documents.iter().rev().map(QuizDocument::summary).collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries
    }

    pub fn find(&self, id: Uuid) -> Option<&QuizDocument> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Validate and store a new quiz.
    pub fn insert(&mut self, quiz: NewQuiz) -> Result<QuizDocument, StoreError> {
        validate(&quiz)?;

        let document = QuizDocument::create(quiz);
        self.documents.push(document.clone());
        if let Err(e) = self.save() {
            self.documents.pop();
            return Err(e);
        }

        info!(id = %document.id, name = %document.name, count = document.count, "quiz created");
        Ok(document)
    }

    /// Remove a quiz. Returns whether it existed.
    pub fn remove(&mut self, id: Uuid) -> Result<bool, StoreError> {
        let Some(pos) = self.documents.iter().position(|d| d.id == id) else {
            debug!(%id, "delete of unknown quiz ignored");
            return Ok(false);
        };

        self.documents.remove(pos);
        self.save()?;
        info!(%id, "quiz deleted");
        Ok(true)
    }

    /// Rewrite the backing file, if any.
    fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&self.documents)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

fn validate(quiz: &NewQuiz) -> Result<(), StoreError> {
    if quiz.name.trim().is_empty() {
        return Err(StoreError::Invalid("name is empty".to_string()));
    }
    if quiz.questions.is_empty() {
        return Err(StoreError::Invalid("quiz has no questions".to_string()));
    }
    validate_questions(&quiz.questions)
}

#[cfg(test)]
mod tests {
    use crate::models::Question;

    use super::*;

    fn new_quiz(name: &str) -> NewQuiz {
        let question = Question::new(0, "Q?".into(), vec!["a".into(), "b".into()], 1);
        NewQuiz::new(name, vec![question])
    }

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("smart-quiz-{}.json", Uuid::new_v4()))
    }

    #[test]
    fn test_summaries_newest_first() {
        let mut collection = QuizCollection::in_memory();
        collection.insert(new_quiz("first")).unwrap();
        collection.insert(new_quiz("second")).unwrap();
        collection.insert(new_quiz("third")).unwrap();

        let names: Vec<String> = collection.summaries().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["third", "second", "first"]);
    }

    #[test]
    fn test_insert_validates() {
        let mut collection = QuizCollection::in_memory();

        assert!(matches!(
            collection.insert(new_quiz("  ")),
            Err(StoreError::Invalid(_))
        ));
        assert!(matches!(
            collection.insert(NewQuiz::new("empty", Vec::new())),
            Err(StoreError::Invalid(_))
        ));

        let mut quiz = new_quiz("bad");
        quiz.questions[0].correct = 9;
        assert!(matches!(collection.insert(quiz), Err(StoreError::Invalid(_))));
        assert!(collection.is_empty());
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let mut collection = QuizCollection::in_memory();
        let doc = collection.insert(new_quiz("set")).unwrap();

        assert!(!collection.remove(Uuid::new_v4()).unwrap());
        assert!(collection.remove(doc.id).unwrap());
        assert!(!collection.remove(doc.id).unwrap());
        assert!(collection.find(doc.id).is_none());
    }

    #[test]
    fn test_file_backed_collection_persists() {
        let path = temp_path();

        let id = {
            let mut collection = QuizCollection::open(&path).unwrap();
            assert!(collection.is_empty());
            collection.insert(new_quiz("kept")).unwrap();
            collection.insert(new_quiz("dropped")).unwrap().id
        };

        {
            let mut collection = QuizCollection::open(&path).unwrap();
            assert_eq!(collection.len(), 2);
            collection.remove(id).unwrap();
        }

        let collection = QuizCollection::open(&path).unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.summaries()[0].name, "kept");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_open_rejects_question_without_answers() {
        let path = temp_path();
        let json = format!(
            r#"[{{"id": "{}", "name": "broken", "questions": [
                {{"id": 0, "question": "Q?", "answers": [], "correct": 0}}
            ], "count": 1, "createdAt": "2024-05-01T08:00:00Z"}}]"#,
            Uuid::new_v4()
        );
        fs::write(&path, json).unwrap();

        let result = QuizCollection::open(&path);
        fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(StoreError::Invalid(_))));
    }
}
