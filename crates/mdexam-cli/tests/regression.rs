//! History regression tests: stored attempts compared and summarized after a
//! round trip through the on-disk store.

use chrono::{TimeZone, Utc};
use mdexam_core::history::{AttemptSnapshot, ExamResultLog};
use mdexam_core::parser::parse_exam;
use mdexam_core::report::compare_attempts;
use mdexam_core::scoring::score_answers;
use mdexam_core::session::Answers;
use mdexam_core::statistics::{compute_trend, most_missed, trend_points};
use mdexam_core::store::{JsonStore, ResultStore};
use tempfile::TempDir;
use uuid::Uuid;

const EXAM: &str = "\
# Geography
## Capital of France
- [x] Paris
- [ ] Lyon
## Rivers in Germany
- [x] Rhine
- [x] Elbe
- [ ] Seine
## Highest mountain in the Alps
- [x] Mont Blanc
- [ ] Matterhorn
";

const EXAM_REVISED: &str = "\
# Geography
## Capital of France
- [x] Paris
- [ ] Lyon
## Rivers in Germany
- [x] Rhine
- [x] Elbe
- [ ] Seine
## Capital of Spain
- [x] Madrid
- [ ] Seville
";

fn answers(rows: &[&[bool]]) -> Answers {
    rows.iter()
        .enumerate()
        .map(|(i, row)| (i, row.to_vec()))
        .collect()
}

fn record_attempt(log: &mut ExamResultLog, text: &str, rows: &[&[bool]], day: u32) {
    let exam = parse_exam(text);
    let user_answers = answers(rows);
    let summary = score_answers(&exam.questions, &user_answers).unwrap();
    let snapshot = AttemptSnapshot {
        exam_title: exam.title.clone(),
        questions: exam.questions,
        user_answers,
    };
    let date = Utc.with_ymd_and_hms(2026, 3, day, 9, 0, 0).unwrap();
    log.append(summary, snapshot, date);
}

async fn stored_log(dir: &TempDir) -> ExamResultLog {
    let exam_id = Uuid::new_v4();
    let mut log = ExamResultLog::new(exam_id);

    // 3/3, then 1/3 with two misses, then 2/3 on the revised exam.
    record_attempt(
        &mut log,
        EXAM,
        &[&[true, false], &[true, true, false], &[true, false]],
        1,
    );
    record_attempt(
        &mut log,
        EXAM,
        &[&[true, false], &[true, false, false], &[false, true]],
        2,
    );
    record_attempt(
        &mut log,
        EXAM_REVISED,
        &[&[false, true], &[true, true, false], &[true, false]],
        3,
    );

    let store = JsonStore::new(dir.path());
    store.put(&log).await.unwrap();

    let reopened = JsonStore::new(dir.path());
    reopened.get(exam_id).await.unwrap().unwrap()
}

#[tokio::test]
async fn log_round_trips_unchanged() {
    let dir = TempDir::new().unwrap();
    let log = stored_log(&dir).await;

    assert_eq!(log.title(), "Geography");
    let scores: Vec<(u32, u32, u8)> = log
        .results
        .iter()
        .map(|r| (r.score, r.total, r.score_percent))
        .collect();
    assert_eq!(scores, vec![(3, 3, 100), (1, 3, 33), (2, 3, 67)]);
    assert_eq!(
        log.results[1].date,
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn stored_json_uses_record_field_names() {
    let dir = TempDir::new().unwrap();
    let log = stored_log(&dir).await;

    let path = dir
        .path()
        .join("results")
        .join(format!("{}.json", log.exam_id));
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();

    let first = &value["results"][0];
    assert_eq!(first["attemptNumber"], 1);
    assert_eq!(first["scorePercent"], 100);
    assert_eq!(first["attemptData"]["examTitle"], "Geography");
    assert_eq!(
        first["attemptData"]["questions"][0]["question"],
        "Capital of France"
    );
    assert!(first["attemptData"]["userAnswers"].is_object());
}

#[tokio::test]
async fn comparison_finds_regressions() {
    let dir = TempDir::new().unwrap();
    let log = stored_log(&dir).await;

    let report = compare_attempts(log.attempt(1).unwrap(), log.attempt(2).unwrap());
    assert_eq!(report.delta(), -67);
    assert!(report.has_regressions());
    assert_eq!(
        report.regressions,
        vec![
            "Highest mountain in the Alps".to_string(),
            "Rivers in Germany".to_string()
        ]
    );
    assert!(report.improvements.is_empty());
    assert_eq!(report.unchanged, 1);
}

#[tokio::test]
async fn comparison_across_exam_revisions() {
    let dir = TempDir::new().unwrap();
    let log = stored_log(&dir).await;

    let report = compare_attempts(log.attempt(2).unwrap(), log.attempt(3).unwrap());
    assert_eq!(report.regressions, vec!["Capital of France".to_string()]);
    assert_eq!(report.improvements, vec!["Rivers in Germany".to_string()]);
    assert_eq!(report.new_questions, 1);
    assert_eq!(report.removed_questions, 1);
    assert_eq!(report.unchanged, 0);

    let md = report.to_markdown();
    assert!(md.contains("33% -> 67% (+34 points)"));
}

#[tokio::test]
async fn same_attempt_has_no_changes() {
    let dir = TempDir::new().unwrap();
    let log = stored_log(&dir).await;

    let attempt = log.attempt(1).unwrap();
    let report = compare_attempts(attempt, attempt);
    assert_eq!(report.delta(), 0);
    assert!(!report.has_regressions());
    assert_eq!(report.unchanged, 3);
}

#[tokio::test]
async fn trend_over_stored_attempts() {
    let dir = TempDir::new().unwrap();
    let log = stored_log(&dir).await;

    let trend = compute_trend(&log).unwrap();
    assert_eq!(trend.attempts, 3);
    assert_eq!(trend.latest, 67);
    assert_eq!(trend.best, 100);
    assert_eq!(trend.worst, 33);
    assert_eq!(trend.change, Some(34));
    assert!((trend.mean - 200.0 / 3.0).abs() < 1e-9);

    let labels: Vec<String> = trend_points(&log).into_iter().map(|p| p.label).collect();
    assert_eq!(labels, vec!["Attempt 1", "Attempt 2", "Attempt 3"]);
}

#[tokio::test]
async fn most_missed_counts_by_prompt() {
    let dir = TempDir::new().unwrap();
    let log = stored_log(&dir).await;

    let missed = most_missed(&log);
    let rivers = missed
        .iter()
        .find(|m| m.prompt == "Rivers in Germany")
        .unwrap();
    assert_eq!((rivers.seen, rivers.missed), (3, 1));
    assert!(missed.iter().all(|m| m.prompt != "Capital of Spain"));
}
