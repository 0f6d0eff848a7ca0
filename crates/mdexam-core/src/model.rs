//! Core data model types for mdexam.
//!
//! An [`Exam`] is produced by the parser and never edited afterwards; a fresh
//! parse of the source text is the only way to pick up changes. The serde
//! shapes match the records kept in the result history, so a question
//! serializes as `{ "question": ..., "choices": [{ "text", "isCorrect" }] }`.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ExamError;

/// Title given to stored exams whose text has no `# ` line.
pub const UNTITLED_EXAM: &str = "Untitled Exam";

/// A parsed exam document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    /// Text of the last `# ` line, empty if there was none.
    pub title: String,
    /// Raw `Time:` value, kept verbatim. Interpreted by [`Exam::time_limit_duration`].
    #[serde(default)]
    pub time_limit: Option<String>,
    /// Questions in document order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Exam {
    /// Returns `true` if the exam has no questions.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Interpret the time limit, if any.
    pub fn time_limit_duration(&self) -> Result<Option<Duration>, ExamError> {
        self.time_limit
            .as_deref()
            .map(parse_time_limit)
            .transpose()
    }
}

/// One question with its choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Prompt text. May contain `![[image]]` tokens, which are kept as-is.
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl Question {
    /// Number of choices marked correct.
    pub fn correct_count(&self) -> usize {
        self.choices.iter().filter(|c| c.is_correct).count()
    }

    /// How the question takes input, derived from the number of correct choices.
    pub fn answer_mode(&self) -> AnswerMode {
        if self.correct_count() == 1 {
            AnswerMode::Single
        } else {
            AnswerMode::Multiple
        }
    }
}

/// A single answer option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub text: String,
    pub is_correct: bool,
}

/// Single-answer questions select exclusively; multi-answer ones toggle freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerMode {
    Single,
    Multiple,
}

impl fmt::Display for AnswerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerMode::Single => write!(f, "single"),
            AnswerMode::Multiple => write!(f, "multiple"),
        }
    }
}

/// Parse an `HH:MM:SS` time limit.
///
/// Hours are unbounded up to what fits in a `u64` of seconds; minutes and
/// seconds must be below 60.
pub fn parse_time_limit(value: &str) -> Result<Duration, ExamError> {
    let invalid = || ExamError::InvalidTimeLimit {
        value: value.to_string(),
    };

    let parts: Vec<&str> = value.trim().split(':').collect();
    let [hours, minutes, seconds] = parts.as_slice() else {
        return Err(invalid());
    };

    let field = |s: &str| -> Result<u64, ExamError> {
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        s.parse::<u64>().map_err(|_| invalid())
    };

    let (h, m, s) = (field(hours)?, field(minutes)?, field(seconds)?);
    if m >= 60 || s >= 60 {
        return Err(invalid());
    }

    let total = h
        .checked_mul(3600)
        .and_then(|secs| secs.checked_add(m * 60 + s))
        .ok_or_else(invalid)?;
    Ok(Duration::from_secs(total))
}

/// Format a duration as `HH:MM:SS`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// A stored exam: the source text plus enough metadata to list it.
///
/// The text is re-parsed every time the exam is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamRecord {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    /// Image file name to a displayable reference, used for `![[name]]` tokens.
    #[serde(default)]
    pub images: BTreeMap<String, String>,
}

impl ExamRecord {
    /// Build a record for new exam text with a fresh id.
    pub fn new(text: impl Into<String>, images: BTreeMap<String, String>) -> Self {
        let text = text.into();
        let parsed = crate::parser::parse_exam(&text);
        let title = if parsed.title.is_empty() {
            UNTITLED_EXAM.to_string()
        } else {
            parsed.title
        };
        Self {
            id: Uuid::new_v4(),
            title,
            text,
            images,
        }
    }

    /// Parse the stored text.
    pub fn exam(&self) -> Exam {
        crate::parser::parse_exam(&self.text)
    }
}
