//! The `mdexam list` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use mdexam_core::store::ExamStore;

use super::Context;

pub async fn execute(ctx: &Context) -> Result<()> {
    let exams = ctx.store.list_exams().await?;

    if exams.is_empty() {
        println!("No exams stored. Add one with `mdexam add <exam.md>`.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Title", "Questions", "Time limit", "Images", "ID"]);

    for record in &exams {
        let exam = record.exam();
        table.add_row(vec![
            Cell::new(&record.title),
            Cell::new(exam.questions.len()),
            Cell::new(exam.time_limit.as_deref().unwrap_or("-")),
            Cell::new(record.images.len()),
            Cell::new(record.id),
        ]);
    }

    println!("{table}");
    Ok(())
}
