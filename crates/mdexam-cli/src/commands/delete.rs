//! The `mdexam delete` and `mdexam clear-results` commands.

use anyhow::Result;

use mdexam_core::store::{ExamStore, ResultStore};

use super::Context;

/// Remove a stored exam. Its results are kept.
pub async fn execute(ctx: &Context, exam: &str) -> Result<()> {
    let record = ctx.find_exam(exam).await?;
    ctx.store.delete_exam(record.id).await?;
    println!("Deleted exam '{}' ({})", record.title, record.id);
    Ok(())
}

/// Remove an exam's whole result log.
pub async fn clear_results(ctx: &Context, exam: &str) -> Result<()> {
    let log = ctx.find_results(exam).await?;
    let count = log.results.len();
    ctx.store.delete(log.exam_id).await?;
    println!("Cleared {count} result(s) for exam {}", log.exam_id);
    Ok(())
}
