//! Exam domain error types.
//!
//! Parsing never fails (malformed lines are dropped), so these cover the few
//! places where the core has to refuse to proceed: scoring an empty exam,
//! interpreting a time limit, and looking up records that are not stored.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the exam core.
#[derive(Debug, Error)]
pub enum ExamError {
    /// The exam has no questions; there is nothing to take or score.
    #[error("exam has no questions")]
    EmptyExam,

    /// A `Time:` value that is not `HH:MM:SS`.
    #[error("invalid time limit '{value}', expected HH:MM:SS")]
    InvalidTimeLimit { value: String },

    /// No exam record with this id.
    #[error("exam not found: {id}")]
    ExamNotFound { id: Uuid },

    /// The exam's result log has no attempt with this number.
    #[error("attempt {attempt} not found for exam {exam_id}")]
    AttemptNotFound { exam_id: Uuid, attempt: u32 },
}

impl ExamError {
    /// Returns `true` for lookups that came back empty.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ExamError::ExamNotFound { .. } | ExamError::AttemptNotFound { .. }
        )
    }
}
