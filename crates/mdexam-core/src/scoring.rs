//! Exact-match scoring.
//!
//! A question counts as correct only when every choice's selected flag equals
//! its `is_correct` flag. Missing answer entries count as unselected. There is
//! no partial credit: one wrong selection or one missed correct choice fails
//! the whole question. A question with no correct choices is therefore correct
//! exactly when nothing was selected.

use serde::{Deserialize, Serialize};

use crate::error::ExamError;
use crate::model::Question;
use crate::session::Answers;

/// Aggregate result of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Questions answered correctly.
    pub score: u32,
    /// Questions in the exam.
    pub total: u32,
    /// `round(score / total * 100)`.
    pub percent: u8,
}

/// Whether `selected` matches the question's correct flags exactly.
pub fn question_is_correct(question: &Question, selected: Option<&[bool]>) -> bool {
    let selected = selected.unwrap_or(&[]);
    question
        .choices
        .iter()
        .enumerate()
        .all(|(i, choice)| choice.is_correct == selected.get(i).copied().unwrap_or(false))
}

/// Score captured answers against the questions they were given for.
///
/// Rejects an empty question list instead of dividing by zero.
pub fn score_answers(questions: &[Question], answers: &Answers) -> Result<ScoreSummary, ExamError> {
    if questions.is_empty() {
        return Err(ExamError::EmptyExam);
    }

    let score = questions
        .iter()
        .enumerate()
        .filter(|(idx, q)| question_is_correct(q, answers.get(idx).map(Vec::as_slice)))
        .count() as u32;
    let total = questions.len() as u32;

    Ok(ScoreSummary {
        score,
        total,
        percent: score_percent(score, total),
    })
}

/// Percentage rounded half up. `total` must be non-zero.
pub fn score_percent(score: u32, total: u32) -> u8 {
    debug_assert!(total > 0, "score_percent with zero total");
    (f64::from(score) / f64::from(total) * 100.0).round() as u8
}
