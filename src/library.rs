//! Library controller: the stored quiz listing plus the unsaved draft.
//!
//! The library never holds a store itself; the host passes one into every
//! call that needs it. Failed store calls leave the previous state in place,
//! except that a failed listing marks the library offline.

use std::path::Path;

use chrono::Local;
use tracing::{info, warn};
use uuid::Uuid;

use crate::QuizError;
use crate::data::{self, UploadError};
use crate::models::{NewQuiz, Question, QuizDocument, QuizSummary};
use crate::parser::Parser;
use crate::store::{QuizStore, StoreError};

/// Whether the listing reflects the store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LibraryStatus {
    /// Never listed yet.
    #[default]
    NotLoaded,
    Ready,
    /// The last listing failed with this message.
    Offline(String),
}

#[derive(Debug, Default)]
pub struct Library {
    entries: Vec<QuizSummary>,
    status: LibraryStatus,
    /// Questions parsed or uploaded but not yet saved.
    draft: Vec<Question>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[QuizSummary] {
        &self.entries
    }

    pub fn status(&self) -> &LibraryStatus {
        &self.status
    }

    pub fn is_offline(&self) -> bool {
        matches!(self.status, LibraryStatus::Offline(_))
    }

    pub fn draft(&self) -> &[Question] {
        &self.draft
    }

    /// Reload the listing from the store.
    pub async fn refresh<S: QuizStore>(&mut self, store: &mut S) -> Result<usize, StoreError> {
        match store.list().await {
            Ok(entries) => {
                self.entries = entries;
                self.status = LibraryStatus::Ready;
                Ok(self.entries.len())
            }
            Err(e) => {
                warn!(error = %e, "failed to load library");
                self.status = LibraryStatus::Offline(e.to_string());
                Err(e)
            }
        }
    }

    /// Parse pasted text into the draft. On failure the draft is unchanged.
    pub fn paste(&mut self, text: &str, parser: &Parser) -> Result<usize, UploadError> {
        let questions = data::ingest_text(text, parser)?;
        Ok(self.replace_draft(questions))
    }

    /// Load an uploaded file into the draft. On failure the draft is unchanged.
    pub fn upload<P: AsRef<Path>>(&mut self, path: P, parser: &Parser) -> Result<usize, UploadError> {
        let questions = data::load_questions_from_path(path, parser)?;
        Ok(self.replace_draft(questions))
    }

    pub fn replace_draft(&mut self, questions: Vec<Question>) -> usize {
        self.draft = questions;
        self.draft.len()
    }

    /// Save the draft under `name`, then reload the listing.
    pub async fn save_draft<S: QuizStore>(
        &mut self,
        store: &mut S,
        name: &str,
    ) -> Result<QuizDocument, QuizError> {
        if self.draft.is_empty() {
            return Err(QuizError::EmptyDraft);
        }

        let document = store
            .create(NewQuiz::new(name.trim(), self.draft.clone()))
            .await?;
        info!(id = %document.id, count = document.count, "draft saved");

        // The save succeeded even if the listing cannot be refreshed.
        let _ = self.refresh(store).await;
        Ok(document)
    }

    /// Delete a stored quiz, then reload the listing.
    pub async fn delete<S: QuizStore>(&mut self, store: &mut S, id: Uuid) -> Result<(), StoreError> {
        store.delete(id).await?;
        self.entries.retain(|entry| entry.id != id);

        let _ = self.refresh(store).await;
        Ok(())
    }

    /// Fetch a stored quiz for playing.
    pub async fn open<S: QuizStore>(&self, store: &mut S, id: Uuid) -> Result<QuizDocument, StoreError> {
        store.get(id).await
    }
}

/// Suggested name for a new quiz.
pub fn default_quiz_name() -> String {
    format!("Quiz {}", Local::now().format("%d/%m/%Y"))
}
