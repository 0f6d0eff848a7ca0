//! Line-oriented exam document parser.
//!
//! Each line is trimmed and classified on its own, first match wins:
//!
//! - `# Title` sets the title (the last one wins)
//! - `Time: HH:MM:SS` sets the time limit, verbatim
//! - `## Prompt` closes the open question and starts a new one
//! - `- [x] text` / `- [ ] text` adds a choice to the open question; `x` or
//!   `X` marks it correct, any other single character marks it incorrect
//!
//! Everything else is ignored. Parsing never fails: the worst input yields an
//! exam with an empty title and no questions.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::{Choice, Exam, Question};

/// Parse exam text into an [`Exam`].
pub fn parse_exam(text: &str) -> Exam {
    let mut exam = Exam::default();
    let mut current: Option<Question> = None;

    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(title) = line.strip_prefix("# ") {
            exam.title = title.trim().to_string();
        } else if let Some(time) = line.strip_prefix("Time:") {
            let time = time.trim();
            exam.time_limit = (!time.is_empty()).then(|| time.to_string());
        } else if let Some(prompt) = line.strip_prefix("## ") {
            if let Some(done) = current.take() {
                exam.questions.push(done);
            }
            current = Some(Question {
                prompt: prompt.trim().to_string(),
                choices: Vec::new(),
            });
        } else if let Some(choice) = parse_choice(line) {
            match current.as_mut() {
                Some(question) => question.choices.push(choice),
                None => {
                    tracing::debug!(line = line_no + 1, "dropping choice outside of a question");
                }
            }
        }
    }

    if let Some(done) = current {
        exam.questions.push(done);
    }

    exam
}

/// Match `- [<marker>] <text>` where the marker is exactly one character.
fn parse_choice(line: &str) -> Option<Choice> {
    let rest = line.strip_prefix("- [")?;
    let mut chars = rest.chars();
    let marker = chars.next()?;
    let text = chars.as_str().strip_prefix(']')?.trim();
    if text.is_empty() {
        return None;
    }

    Some(Choice {
        text: text.to_string(),
        is_correct: marker.eq_ignore_ascii_case(&'x'),
    })
}

/// Read and parse an exam file.
pub fn parse_exam_file(path: &Path) -> Result<Exam> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read exam file: {}", path.display()))?;

    Ok(parse_exam(&content))
}

/// Recursively load all `.md` exam files from a directory.
pub fn load_exam_directory(dir: &Path) -> Result<Vec<(PathBuf, Exam)>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();

    let mut exams = Vec::new();
    for path in entries {
        if path.is_dir() {
            exams.extend(load_exam_directory(&path)?);
        } else if is_markdown(&path) {
            match parse_exam_file(&path) {
                Ok(exam) => exams.push((path, exam)),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(exams)
}

/// `.md` extension, any case.
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

/// A data-quality issue found in a parsed exam.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// 1-based question number (if applicable).
    pub question: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Check a parsed exam for problems that do not stop it from loading.
pub fn validate_exam(exam: &Exam) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let exam_warning = |message: &str| ValidationWarning {
        question: None,
        message: message.to_string(),
    };

    if exam.title.is_empty() {
        warnings.push(exam_warning("exam has no title line"));
    }

    if exam.questions.is_empty() {
        warnings.push(exam_warning("exam has no questions"));
    }

    if let Some(limit) = &exam.time_limit {
        if let Err(e) = crate::model::parse_time_limit(limit) {
            warnings.push(exam_warning(&e.to_string()));
        }
    }

    let mut seen_prompts = HashSet::new();
    for (idx, question) in exam.questions.iter().enumerate() {
        let number = Some(idx + 1);

        if question.choices.is_empty() {
            warnings.push(ValidationWarning {
                question: number,
                message: "question has no choices".into(),
            });
        } else if question.correct_count() == 0 {
            warnings.push(ValidationWarning {
                question: number,
                message: "no choice is marked correct".into(),
            });
        }

        if !seen_prompts.insert(question.prompt.as_str()) {
            warnings.push(ValidationWarning {
                question: number,
                message: format!("duplicate question prompt: {}", question.prompt),
            });
        }
    }

    warnings
}
