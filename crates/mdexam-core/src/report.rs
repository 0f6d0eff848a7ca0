//! Attempt review and attempt-to-attempt comparison.
//!
//! Everything here is computed from the frozen snapshot inside an
//! [`AttemptRecord`], never from the current exam text, so a review shows the
//! questions exactly as they were answered.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::history::AttemptRecord;
use crate::scoring::{question_is_correct, ScoreSummary};

/// Per-question outcome of one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptReview {
    pub exam_title: String,
    pub attempt_number: u32,
    pub date: DateTime<Utc>,
    pub summary: ScoreSummary,
    pub questions: Vec<QuestionReview>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionReview {
    /// 1-based position as displayed in the attempt.
    pub number: usize,
    pub prompt: String,
    pub correct: bool,
    pub choices: Vec<ChoiceReview>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceReview {
    pub text: String,
    pub is_correct: bool,
    pub selected: bool,
}

impl AttemptReview {
    pub fn from_record(record: &AttemptRecord) -> Self {
        let snapshot = &record.snapshot;
        let questions = snapshot
            .questions
            .iter()
            .enumerate()
            .map(|(idx, question)| {
                let answer = snapshot.user_answers.get(&idx).map(Vec::as_slice);
                let selected = answer.unwrap_or(&[]);
                QuestionReview {
                    number: idx + 1,
                    prompt: question.prompt.clone(),
                    correct: question_is_correct(question, answer),
                    choices: question
                        .choices
                        .iter()
                        .enumerate()
                        .map(|(i, choice)| ChoiceReview {
                            text: choice.text.clone(),
                            is_correct: choice.is_correct,
                            selected: selected.get(i).copied().unwrap_or(false),
                        })
                        .collect(),
                }
            })
            .collect();

        Self {
            exam_title: snapshot.exam_title.clone(),
            attempt_number: record.attempt_number,
            date: record.date,
            summary: record.summary(),
            questions,
        }
    }

    /// Questions answered incorrectly.
    pub fn missed(&self) -> Vec<&QuestionReview> {
        self.questions.iter().filter(|q| !q.correct).collect()
    }

    /// Render as markdown, optionally limited to missed questions.
    pub fn to_markdown(&self, missed_only: bool) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "## {} - Attempt {}\n\n",
            self.exam_title, self.attempt_number
        ));
        md.push_str(&format!(
            "**Score:** {}% ({}/{}) on {}\n\n",
            self.summary.percent,
            self.summary.score,
            self.summary.total,
            self.date.format("%Y-%m-%d %H:%M UTC")
        ));

        let shown: Vec<&QuestionReview> = if missed_only {
            self.missed()
        } else {
            self.questions.iter().collect()
        };

        if shown.is_empty() {
            md.push_str(if missed_only {
                "No missed questions.\n"
            } else {
                "No questions.\n"
            });
            return md;
        }

        for question in shown {
            let verdict = if question.correct { "correct" } else { "missed" };
            md.push_str(&format!(
                "### {}. {} ({verdict})\n\n",
                question.number, question.prompt
            ));
            for choice in &question.choices {
                let mark = if choice.selected { "x" } else { " " };
                let note = match (choice.is_correct, choice.selected) {
                    (true, true) => " (correct)",
                    (true, false) => " (correct, not selected)",
                    (false, true) => " (wrong)",
                    (false, false) => "",
                };
                md.push_str(&format!("- [{mark}] {}{note}\n", choice.text));
            }
            md.push('\n');
        }

        md
    }
}

/// Result of comparing two attempts of the same exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptComparison {
    pub baseline_attempt: u32,
    pub current_attempt: u32,
    pub baseline_percent: u8,
    pub current_percent: u8,
    /// Questions correct in the baseline and missed now.
    pub regressions: Vec<String>,
    /// Questions missed in the baseline and correct now.
    pub improvements: Vec<String>,
    /// Questions with the same outcome in both.
    pub unchanged: usize,
    /// Questions only in the current attempt.
    pub new_questions: usize,
    /// Questions only in the baseline attempt.
    pub removed_questions: usize,
}

/// Compare two attempts question by question, matching on prompt text.
pub fn compare_attempts(baseline: &AttemptRecord, current: &AttemptRecord) -> AttemptComparison {
    let outcomes = |record: &AttemptRecord| -> HashMap<String, bool> {
        let mut map = HashMap::new();
        for question in AttemptReview::from_record(record).questions {
            map.entry(question.prompt).or_insert(question.correct);
        }
        map
    };

    let baseline_outcomes = outcomes(baseline);
    let current_outcomes = outcomes(current);

    let mut regressions = Vec::new();
    let mut improvements = Vec::new();
    let mut unchanged = 0usize;
    let mut new_questions = 0usize;

    for (prompt, &now) in &current_outcomes {
        match baseline_outcomes.get(prompt) {
            Some(&before) if before && !now => regressions.push(prompt.clone()),
            Some(&before) if !before && now => improvements.push(prompt.clone()),
            Some(_) => unchanged += 1,
            None => new_questions += 1,
        }
    }
    regressions.sort();
    improvements.sort();

    let removed_questions = baseline_outcomes
        .keys()
        .filter(|p| !current_outcomes.contains_key(*p))
        .count();

    AttemptComparison {
        baseline_attempt: baseline.attempt_number,
        current_attempt: current.attempt_number,
        baseline_percent: baseline.score_percent,
        current_percent: current.score_percent,
        regressions,
        improvements,
        unchanged,
        new_questions,
        removed_questions,
    }
}

impl AttemptComparison {
    /// Score change in percentage points.
    pub fn delta(&self) -> i16 {
        i16::from(self.current_percent) - i16::from(self.baseline_percent)
    }

    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }

    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Attempt {} vs {}:** {}% -> {}% ({:+} points)\n\n",
            self.baseline_attempt,
            self.current_attempt,
            self.baseline_percent,
            self.current_percent,
            self.delta()
        ));
        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged
        ));

        if !self.regressions.is_empty() {
            md.push_str("### Regressions\n\n");
            for prompt in &self.regressions {
                md.push_str(&format!("- {prompt}\n"));
            }
            md.push('\n');
        }

        if !self.improvements.is_empty() {
            md.push_str("### Improvements\n\n");
            for prompt in &self.improvements {
                md.push_str(&format!("- {prompt}\n"));
            }
            md.push('\n');
        }

        if self.new_questions > 0 || self.removed_questions > 0 {
            md.push_str(&format!(
                "{} new, {} removed questions\n",
                self.new_questions, self.removed_questions
            ));
        }

        md
    }
}
