//! The `mdexam add` command.

use std::path::PathBuf;

use anyhow::Result;

use mdexam_core::import::ImportBundle;
use mdexam_core::parser::validate_exam;
use mdexam_core::store::ExamStore;

use super::Context;

pub async fn execute(ctx: &Context, files: Vec<PathBuf>) -> Result<()> {
    let bundle = ImportBundle::from_paths(&files)?;
    let source = bundle.source.clone();
    let record = bundle.into_record();
    let exam = record.exam();

    for w in validate_exam(&exam) {
        let prefix = w
            .question
            .map(|n| format!("[Q{n}] "))
            .unwrap_or_default();
        eprintln!("Warning: {prefix}{}", w.message);
    }

    ctx.store.put_exam(&record).await?;

    println!(
        "Added '{}' from {} ({} questions, {} images)",
        record.title,
        source.display(),
        exam.questions.len(),
        record.images.len()
    );
    println!("id: {}", record.id);
    Ok(())
}
