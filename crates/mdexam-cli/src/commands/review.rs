//! The `mdexam review` command.

use anyhow::Result;

use mdexam_core::error::ExamError;
use mdexam_core::import::resolve_images;
use mdexam_core::report::AttemptReview;

use super::Context;

pub async fn execute(ctx: &Context, exam: &str, attempt: u32, missed_only: bool) -> Result<()> {
    let log = ctx.find_results(exam).await?;
    let record = log.attempt(attempt).ok_or(ExamError::AttemptNotFound {
        exam_id: log.exam_id,
        attempt,
    })?;

    let review = AttemptReview::from_record(record);
    let images = ctx
        .find_exam(&log.exam_id.to_string())
        .await
        .map(|r| r.images)
        .unwrap_or_default();
    println!("{}", resolve_images(&review.to_markdown(missed_only), &images));
    Ok(())
}
