//! The `mdexam compare` command.

use anyhow::Result;

use mdexam_core::error::ExamError;
use mdexam_core::report::compare_attempts;

use super::Context;

pub async fn execute(
    ctx: &Context,
    exam: &str,
    baseline: u32,
    current: u32,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    let log = ctx.find_results(exam).await?;
    let attempt = |n: u32| {
        log.attempt(n).ok_or(ExamError::AttemptNotFound {
            exam_id: log.exam_id,
            attempt: n,
        })
    };
    let report = compare_attempts(attempt(baseline)?, attempt(current)?);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!(
                "Attempt {} -> {}: {}% -> {}% ({:+} points)",
                report.baseline_attempt,
                report.current_attempt,
                report.baseline_percent,
                report.current_percent,
                report.delta()
            );
            println!(
                "Comparison: {} regressions, {} improvements, {} unchanged",
                report.regressions.len(),
                report.improvements.len(),
                report.unchanged
            );

            if !report.regressions.is_empty() {
                println!("\nRegressions (correct before, missed now):");
                for prompt in &report.regressions {
                    println!("  {prompt}");
                }
            }

            if !report.improvements.is_empty() {
                println!("\nImprovements (missed before, correct now):");
                for prompt in &report.improvements {
                    println!("  {prompt}");
                }
            }

            if report.new_questions > 0 {
                println!("\n{} new question(s)", report.new_questions);
            }
            if report.removed_questions > 0 {
                println!("{} removed question(s)", report.removed_questions);
            }
        }
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}
