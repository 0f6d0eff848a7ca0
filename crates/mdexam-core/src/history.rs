//! Result history: append-only attempt logs, one per exam.
//!
//! Every scored attempt becomes an [`AttemptRecord`] carrying a frozen copy of
//! the questions exactly as they were displayed (shuffled order included) and
//! the raw answers. Records are never edited; a correction is a new attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Question;
use crate::scoring::ScoreSummary;
use crate::session::{Answers, Session};

/// One scored attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    /// 1-based, increasing by one per exam.
    pub attempt_number: u32,
    pub score_percent: u8,
    pub score: u32,
    pub total: u32,
    pub date: DateTime<Utc>,
    #[serde(rename = "attemptData")]
    pub snapshot: AttemptSnapshot,
}

impl AttemptRecord {
    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary {
            score: self.score,
            total: self.total,
            percent: self.score_percent,
        }
    }
}

/// The questions and answers of an attempt as they were at scoring time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptSnapshot {
    pub exam_title: String,
    pub questions: Vec<Question>,
    pub user_answers: Answers,
}

impl AttemptSnapshot {
    /// Freeze a session's display-order questions and captured answers.
    pub fn from_session(session: &Session) -> Self {
        Self {
            exam_title: session.exam().title.clone(),
            questions: session.exam().questions.clone(),
            user_answers: session.answers().clone(),
        }
    }
}

/// All attempts for one exam, ordered by attempt number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResultLog {
    pub exam_id: Uuid,
    #[serde(default)]
    pub results: Vec<AttemptRecord>,
}

impl ExamResultLog {
    pub fn new(exam_id: Uuid) -> Self {
        Self {
            exam_id,
            results: Vec::new(),
        }
    }

    /// Number the next attempt will get.
    pub fn next_attempt_number(&self) -> u32 {
        self.results.len() as u32 + 1
    }

    /// Append a new attempt and return it.
    pub fn append(
        &mut self,
        summary: ScoreSummary,
        snapshot: AttemptSnapshot,
        date: DateTime<Utc>,
    ) -> &AttemptRecord {
        let record = AttemptRecord {
            attempt_number: self.next_attempt_number(),
            score_percent: summary.percent,
            score: summary.score,
            total: summary.total,
            date,
            snapshot,
        };
        self.results.push(record);
        &self.results[self.results.len() - 1]
    }

    pub fn attempt(&self, attempt_number: u32) -> Option<&AttemptRecord> {
        self.results
            .iter()
            .find(|r| r.attempt_number == attempt_number)
    }

    pub fn latest(&self) -> Option<&AttemptRecord> {
        self.results.last()
    }

    /// Title from the first attempt's snapshot, empty if there are no attempts.
    pub fn title(&self) -> &str {
        self.results
            .first()
            .map(|r| r.snapshot.exam_title.as_str())
            .unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Sort logs by exam title, case-insensitively.
pub fn sort_by_title(logs: &mut [ExamResultLog]) {
    logs.sort_by_key(|log| log.title().to_lowercase());
}
