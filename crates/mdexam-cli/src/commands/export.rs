//! The `mdexam export-html` command.

use std::path::PathBuf;

use anyhow::Result;

use mdexam_core::history::sort_by_title;
use mdexam_core::store::{ExamStore, ResultStore};
use mdexam_report::{write_html_report, ImageMaps};

use super::Context;

pub async fn execute(ctx: &Context, output: PathBuf) -> Result<()> {
    let mut logs = ctx.store.get_all().await?;
    sort_by_title(&mut logs);

    let images: ImageMaps = ctx
        .store
        .list_exams()
        .await?
        .into_iter()
        .map(|record| (record.id, record.images))
        .collect();

    write_html_report(&logs, &images, &output)?;
    println!(
        "HTML report: {} ({} exams)",
        output.display(),
        logs.iter().filter(|l| !l.is_empty()).count()
    );
    Ok(())
}
