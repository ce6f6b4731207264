//! Quiz session state machine.
//!
//! A session moves from [`SessionState::Idle`] to [`SessionState::Active`]
//! when a quiz is started and ends in [`SessionState::Submitted`]. Operations
//! that do not apply to the current state return a [`SessionError`] and leave
//! the session untouched.

mod countdown;
mod score;

use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::models::{InvalidQuestion, Question};

pub use countdown::{Countdown, SessionEvent};
pub use score::{MAX_SCORE, ScoreReport};

/// Seconds per minute of time limit.
const SECONDS_PER_MINUTE: i64 = 60;

/// Current phase of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SessionState {
    /// No quiz loaded.
    #[default]
    Idle,
    /// Timer running, answers and navigation allowed.
    Active,
    /// Finished; holds the final score.
    Submitted(ScoreReport),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no quiz is in progress")]
    NotActive,
    #[error("index {index} is out of range for {len} items")]
    OutOfRange { index: usize, len: usize },
    #[error("cannot start a quiz without questions")]
    EmptyQuiz,
    #[error("question {} is invalid: {source}", .index + 1)]
    InvalidQuestion {
        index: usize,
        source: InvalidQuestion,
    },
}

/// An in-progress quiz over a private copy of its questions.
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    state: SessionState,
    questions: Vec<Question>,
    /// One slot per question, `None` until answered.
    answers: Vec<Option<usize>>,
    current_index: usize,
    time_left_seconds: i64,
    time_limit_minutes: u32,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a quiz, replacing any previous session data.
    pub fn start(
        &mut self,
        questions: &[Question],
        time_limit_minutes: u32,
        shuffle: bool,
    ) -> Result<(), SessionError> {
        self.start_with_rng(questions, time_limit_minutes, shuffle, &mut rand::thread_rng())
    }

    /// Like [`QuizSession::start`] with an explicit random source for shuffling.
    pub fn start_with_rng<R: Rng + ?Sized>(
        &mut self,
        questions: &[Question],
        time_limit_minutes: u32,
        shuffle: bool,
        rng: &mut R,
    ) -> Result<(), SessionError> {
        if questions.is_empty() {
            return Err(SessionError::EmptyQuiz);
        }
        for (index, question) in questions.iter().enumerate() {
            question
                .validate()
                .map_err(|source| SessionError::InvalidQuestion { index, source })?;
        }

        let mut questions = questions.to_vec();
        if shuffle {
            questions.shuffle(rng);
        }

        self.answers = vec![None; questions.len()];
        self.questions = questions;
        self.current_index = 0;
        self.time_limit_minutes = time_limit_minutes;
        self.time_left_seconds = i64::from(time_limit_minutes) * SECONDS_PER_MINUTE;
        self.state = SessionState::Active;
        Ok(())
    }

    /// Record `index` as the answer to the current question.
    pub fn select_answer(&mut self, index: usize) -> Result<(), SessionError> {
        self.ensure_active()?;

        let len = self.questions[self.current_index].answers.len();
        if index >= len {
            return Err(SessionError::OutOfRange { index, len });
        }

        self.answers[self.current_index] = Some(index);
        Ok(())
    }

    pub fn go_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.ensure_active()?;

        let len = self.questions.len();
        if index >= len {
            return Err(SessionError::OutOfRange { index, len });
        }

        self.current_index = index;
        Ok(())
    }

    /// Move to the next question; stays put on the last one.
    pub fn next(&mut self) -> Result<(), SessionError> {
        self.ensure_active()?;
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
        }
        Ok(())
    }

    /// Move to the previous question; stays put on the first one.
    pub fn prev(&mut self) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.current_index = self.current_index.saturating_sub(1);
        Ok(())
    }

    /// Count down one second. Returns the report when time ran out.
    pub fn tick(&mut self) -> Result<Option<ScoreReport>, SessionError> {
        self.ensure_active()?;

        self.time_left_seconds -= 1;
        if self.time_left_seconds <= 0 {
            return self.submit().map(Some);
        }
        Ok(None)
    }

    /// Finish the quiz and score it. Submitting again returns the same report.
    pub fn submit(&mut self) -> Result<ScoreReport, SessionError> {
        match self.state {
            SessionState::Idle => Err(SessionError::NotActive),
            SessionState::Submitted(report) => Ok(report),
            SessionState::Active => {
                let report = ScoreReport::compute(&self.questions, &self.answers);
                self.state = SessionState::Submitted(report);
                Ok(report)
            }
        }
    }

    /// Discard the session.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn report(&self) -> Option<ScoreReport> {
        match self.state {
            SessionState::Submitted(report) => Some(report),
            _ => None,
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn current_answer(&self) -> Option<usize> {
        self.answers.get(self.current_index).copied().flatten()
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    pub fn time_left_seconds(&self) -> i64 {
        self.time_left_seconds
    }

    pub fn time_limit_minutes(&self) -> u32 {
        self.time_limit_minutes
    }

    /// Remaining time as `MM:SS`, clamped at zero.
    pub fn format_time_left(&self) -> String {
        let seconds = self.time_left_seconds.max(0);
        format!("{:02}:{:02}", seconds / 60, seconds % 60)
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(SessionError::NotActive)
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn questions(correct: &[usize]) -> Vec<Question> {
        correct
            .iter()
            .enumerate()
            .map(|(id, &correct)| {
                Question::new(
                    id,
                    format!("Question {}", id + 1),
                    vec!["a".into(), "b".into(), "c".into()],
                    correct,
                )
            })
            .collect()
    }

    fn active_session(count: usize) -> QuizSession {
        let mut session = QuizSession::new();
        session
            .start(&questions(&vec![0; count]), 30, false)
            .unwrap();
        session
    }

    #[test]
    fn test_start_initializes_session() {
        let session = active_session(3);

        assert!(session.is_active());
        assert_eq!(session.answers(), &[None, None, None]);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.time_left_seconds(), 30 * 60);
        assert_eq!(session.format_time_left(), "30:00");
    }

    #[test]
    fn test_start_requires_questions() {
        let mut session = QuizSession::new();
        assert_eq!(session.start(&[], 5, false), Err(SessionError::EmptyQuiz));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_start_rejects_invalid_questions() {
        let mut source = questions(&[0, 1]);
        source[1].answers.clear();

        let mut session = QuizSession::new();
        assert!(matches!(
            session.start(&source, 5, false),
            Err(SessionError::InvalidQuestion { index: 1, .. })
        ));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.questions().is_empty());
    }

    #[test]
    fn test_session_copy_is_decoupled_from_source() {
        let source = questions(&[0, 1]);
        let mut session = QuizSession::new();
        session.start(&source, 1, false).unwrap();

        session.select_answer(2).unwrap();
        session.reset();

        assert_eq!(source, questions(&[0, 1]));
    }

    #[test]
    fn test_shuffle_keeps_all_questions() {
        let source = questions(&[0, 1, 2, 0, 1, 2, 0, 1]);
        let mut session = QuizSession::new();
        let mut rng = StdRng::seed_from_u64(7);
        session.start_with_rng(&source, 1, true, &mut rng).unwrap();

        let mut ids: Vec<usize> = session.questions().iter().map(|q| q.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_select_answer_round_trip() {
        let mut session = active_session(2);

        session.select_answer(1).unwrap();
        assert_eq!(session.current_answer(), Some(1));
        assert_eq!(session.current_index(), 0);

        session.select_answer(2).unwrap();
        assert_eq!(session.current_answer(), Some(2));
        assert_eq!(
            session.select_answer(3),
            Err(SessionError::OutOfRange { index: 3, len: 3 })
        );
        assert_eq!(session.current_answer(), Some(2));
    }

    #[test]
    fn test_navigation_bounds() {
        let mut session = active_session(3);

        session.prev().unwrap();
        assert_eq!(session.current_index(), 0);

        session.next().unwrap();
        session.next().unwrap();
        session.next().unwrap();
        assert_eq!(session.current_index(), 2);
        assert!(session.is_last_question());

        session.go_to(1).unwrap();
        assert_eq!(session.current_index(), 1);

        assert_eq!(
            session.go_to(3),
            Err(SessionError::OutOfRange { index: 3, len: 3 })
        );
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn test_operations_outside_active_are_rejected() {
        let mut session = QuizSession::new();
        assert_eq!(session.select_answer(0), Err(SessionError::NotActive));
        assert_eq!(session.go_to(0), Err(SessionError::NotActive));
        assert_eq!(session.next(), Err(SessionError::NotActive));
        assert_eq!(session.tick(), Err(SessionError::NotActive));
        assert_eq!(session.submit(), Err(SessionError::NotActive));

        let mut session = active_session(2);
        session.submit().unwrap();
        assert_eq!(session.select_answer(0), Err(SessionError::NotActive));
        assert_eq!(session.prev(), Err(SessionError::NotActive));
        assert_eq!(session.answers(), &[None, None]);
    }

    #[test]
    fn test_timeout_submits() {
        let mut session = QuizSession::new();
        session.start(&questions(&[0, 1, 2]), 1, false).unwrap();

        for _ in 0..59 {
            assert_eq!(session.tick(), Ok(None));
        }
        let report = session.tick().unwrap();

        assert!(report.is_some());
        assert!(matches!(session.state(), SessionState::Submitted(_)));
        assert!(session.time_left_seconds() <= 0);
        assert_eq!(session.format_time_left(), "00:00");
    }

    #[test]
    fn test_submit_scores_and_is_idempotent() {
        let mut session = QuizSession::new();
        session.start(&questions(&[0, 1, 2]), 10, false).unwrap();

        session.select_answer(0).unwrap();
        session.go_to(2).unwrap();
        session.select_answer(2).unwrap();

        let first = session.submit().unwrap();
        assert_eq!(first.correct, 2);
        assert_eq!(first.rounded_score(), 6.7);

        let second = session.submit().unwrap();
        assert_eq!(first, second);
        assert_eq!(session.report(), Some(first));
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut session = active_session(2);
        session.reset();

        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.questions().is_empty());
        assert!(session.current_question().is_none());
    }
}
