use serde::{Deserialize, Serialize};

use crate::models::Question;

/// Highest score on the display scale.
pub const MAX_SCORE: f64 = 10.0;

/// Outcome of a submitted quiz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub correct: usize,
    pub total: usize,
}

impl ScoreReport {
    /// Score `answers` against `questions`; unanswered slots count as wrong.
    pub fn compute(questions: &[Question], answers: &[Option<usize>]) -> Self {
        let correct = questions
            .iter()
            .zip(answers.iter())
            .filter(|(question, answer)| question.is_correct(**answer))
            .count();

        Self {
            correct,
            total: questions.len(),
        }
    }

    pub fn wrong(&self) -> usize {
        self.total - self.correct
    }

    /// Score on a 0-10 scale.
    pub fn score(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.correct as f64 / self.total as f64) * MAX_SCORE
    }

    /// Score rounded to one decimal.
    pub fn rounded_score(&self) -> f64 {
        (self.score() * 10.0).round() / 10.0
    }

    /// Rounded score with one decimal; halves round up.
    pub fn display_score(&self) -> String {
        format!("{:.1}", self.rounded_score())
    }

    pub fn percentage(&self) -> f64 {
        self.score() * 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: usize) -> Question {
        Question::new(
            0,
            "Q".into(),
            vec!["a".into(), "b".into(), "c".into()],
            correct,
        )
    }

    #[test]
    fn test_two_of_three() {
        let questions = vec![question(0), question(1), question(2)];
        let report = ScoreReport::compute(&questions, &[Some(0), None, Some(2)]);

        assert_eq!(report.correct, 2);
        assert_eq!(report.wrong(), 1);
        assert_eq!(report.rounded_score(), 6.7);
        assert_eq!(report.display_score(), "6.7");
    }

    #[test]
    fn test_display_rounds_halves_up() {
        let questions = vec![question(0); 8];

        let one = ScoreReport::compute(&questions, &[Some(0), None, None, None, None, None, None, None]);
        assert_eq!(one.score(), 1.25);
        assert_eq!(one.display_score(), "1.3");

        let three = ScoreReport { correct: 3, total: 8 };
        assert_eq!(three.display_score(), "3.8");
        assert_eq!(three.display_score(), format!("{:.1}", three.rounded_score()));
    }

    #[test]
    fn test_empty_quiz_scores_zero() {
        let report = ScoreReport::compute(&[], &[]);
        assert_eq!(report.score(), 0.0);
        assert_eq!(report.display_score(), "0.0");
    }

    #[test]
    fn test_all_correct() {
        let questions = vec![question(1), question(1)];
        let report = ScoreReport::compute(&questions, &[Some(1), Some(1)]);
        assert_eq!(report.display_score(), "10.0");
        assert_eq!(report.percentage(), 100.0);
    }
}
