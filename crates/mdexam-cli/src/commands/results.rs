//! The `mdexam results` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use mdexam_core::history::{sort_by_title, ExamResultLog};
use mdexam_core::statistics::{compute_trend, most_missed};
use mdexam_core::store::ResultStore;

use super::{sparkline, Context};

pub async fn execute(ctx: &Context, exam: Option<String>) -> Result<()> {
    let mut logs = match &exam {
        Some(query) => vec![ctx.find_results(query).await?],
        None => ctx.store.get_all().await?,
    };
    logs.retain(|log| !log.is_empty());
    sort_by_title(&mut logs);

    if logs.is_empty() {
        println!("No results yet. Take an exam with `mdexam take <exam>`.");
        return Ok(());
    }

    for log in &logs {
        print_log(log);
    }
    Ok(())
}

fn print_log(log: &ExamResultLog) {
    println!("{} ({})", log.title(), log.exam_id);

    if let Some(trend) = compute_trend(log) {
        let change = trend
            .change
            .map(|d| format!(", change {d:+}"))
            .unwrap_or_default();
        let percents: Vec<u8> = log.results.iter().map(|r| r.score_percent).collect();
        println!(
            "  {} attempts, latest {}%, best {}%, worst {}%, mean {:.1}%{change}  {}",
            trend.attempts,
            trend.latest,
            trend.best,
            trend.worst,
            trend.mean,
            sparkline(&percents)
        );
    }

    let mut table = Table::new();
    table.set_header(vec!["Attempt", "Date", "Score", "Percent"]);
    for record in &log.results {
        table.add_row(vec![
            Cell::new(record.attempt_number),
            Cell::new(record.date.format("%Y-%m-%d %H:%M")),
            Cell::new(format!("{}/{}", record.score, record.total)),
            Cell::new(format!("{}%", record.score_percent)),
        ]);
    }
    println!("{table}");

    let missed = most_missed(log);
    if !missed.is_empty() {
        println!("  Most missed:");
        for q in missed.iter().take(3) {
            println!("    {}/{} {}", q.missed, q.seen, q.prompt);
        }
    }
    println!();
}
