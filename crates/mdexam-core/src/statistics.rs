//! Score trends across the attempts of one exam.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::history::ExamResultLog;
use crate::scoring::question_is_correct;

/// One point of the score chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub attempt_number: u32,
    /// Axis label, `Attempt n`.
    pub label: String,
    pub percent: u8,
}

/// `(label, percent)` series in attempt order.
pub fn trend_points(log: &ExamResultLog) -> Vec<TrendPoint> {
    log.results
        .iter()
        .map(|r| TrendPoint {
            attempt_number: r.attempt_number,
            label: format!("Attempt {}", r.attempt_number),
            percent: r.score_percent,
        })
        .collect()
}

/// Summary of an exam's attempt history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendStats {
    pub attempts: usize,
    pub latest: u8,
    pub best: u8,
    pub worst: u8,
    /// Mean score percent.
    pub mean: f64,
    /// Latest minus previous percent; `None` with fewer than two attempts.
    pub change: Option<i16>,
}

/// Summarize a log. `None` when the log has no attempts.
pub fn compute_trend(log: &ExamResultLog) -> Option<TrendStats> {
    let percents: Vec<u8> = log.results.iter().map(|r| r.score_percent).collect();
    let (&latest, rest) = percents.split_last()?;

    let best = percents.iter().copied().max().unwrap_or(latest);
    let worst = percents.iter().copied().min().unwrap_or(latest);
    let mean = percents.iter().map(|&p| f64::from(p)).sum::<f64>() / percents.len() as f64;
    let change = rest
        .last()
        .map(|&previous| i16::from(latest) - i16::from(previous));

    Some(TrendStats {
        attempts: percents.len(),
        latest,
        best,
        worst,
        mean,
        change,
    })
}

/// How often one question was missed across attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionMisses {
    pub prompt: String,
    pub seen: u32,
    pub missed: u32,
}

/// Questions ranked by times missed, most missed first. Questions are matched
/// by prompt text since display order differs between attempts. Questions
/// never missed are left out.
pub fn most_missed(log: &ExamResultLog) -> Vec<QuestionMisses> {
    let mut counts: HashMap<&str, (u32, u32)> = HashMap::new();
    for record in &log.results {
        let snapshot = &record.snapshot;
        for (idx, question) in snapshot.questions.iter().enumerate() {
            let entry = counts.entry(question.prompt.as_str()).or_default();
            entry.0 += 1;
            let answer = snapshot.user_answers.get(&idx).map(Vec::as_slice);
            if !question_is_correct(question, answer) {
                entry.1 += 1;
            }
        }
    }

    let mut ranked: Vec<QuestionMisses> = counts
        .into_iter()
        .filter(|(_, (_, missed))| *missed > 0)
        .map(|(prompt, (seen, missed))| QuestionMisses {
            prompt: prompt.to_string(),
            seen,
            missed,
        })
        .collect();
    ranked.sort_by(|a, b| b.missed.cmp(&a.missed).then_with(|| a.prompt.cmp(&b.prompt)));
    ranked
}
