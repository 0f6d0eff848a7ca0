//! The `mdexam validate` command.

use std::path::PathBuf;

use anyhow::Result;

use mdexam_core::parser::{load_exam_directory, parse_exam_file, validate_exam};

pub fn execute(path: PathBuf) -> Result<()> {
    let exams = if path.is_dir() {
        load_exam_directory(&path)?
    } else {
        vec![(path.clone(), parse_exam_file(&path)?)]
    };

    if exams.is_empty() {
        println!("No .md exam files found in {}.", path.display());
        return Ok(());
    }

    let mut total_warnings = 0;

    for (file, exam) in &exams {
        let title = if exam.title.is_empty() {
            "(untitled)"
        } else {
            exam.title.as_str()
        };
        println!(
            "Exam: {title} ({} questions) [{}]",
            exam.questions.len(),
            file.display()
        );

        let warnings = validate_exam(exam);
        for w in &warnings {
            let prefix = w
                .question
                .map(|n| format!("  [Q{n}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All exams valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
