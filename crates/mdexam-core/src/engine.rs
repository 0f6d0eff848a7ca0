//! Attempt orchestration.
//!
//! Ties a [`Session`] to a result store: actions go to the session, and the
//! first transition into the scored state runs scoring and then persistence,
//! strictly in that order. The store write is a whole-log read-modify-write
//! keyed by exam id.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::history::{AttemptRecord, AttemptSnapshot, ExamResultLog};
use crate::model::Exam;
use crate::scoring::ScoreSummary;
use crate::session::{Action, Session, Termination, Transition};
use crate::shuffle::{arrange, ShuffleOptions};
use crate::store::ResultStore;

/// Whether a scored attempt reached the store.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveStatus {
    Saved { exam_id: Uuid, record: AttemptRecord },
    /// The store rejected the write. The score is still valid.
    NotSaved { reason: String },
}

impl SaveStatus {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveStatus::Saved { .. })
    }

    pub fn record(&self) -> Option<&AttemptRecord> {
        match self {
            SaveStatus::Saved { record, .. } => Some(record),
            SaveStatus::NotSaved { .. } => None,
        }
    }
}

/// Result of finishing an attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptOutcome {
    pub summary: ScoreSummary,
    pub termination: Termination,
    pub saved: SaveStatus,
}

/// Append a scored session to its exam's result log and write the log back.
///
/// A session without an exam id gets a fresh one. Returns the id used and the
/// appended record.
pub async fn persist_attempt<S: ResultStore + ?Sized>(
    store: &S,
    exam_id: Option<Uuid>,
    summary: ScoreSummary,
    session: &Session,
) -> Result<(Uuid, AttemptRecord)> {
    let exam_id = exam_id.unwrap_or_else(Uuid::new_v4);

    let mut log = store
        .get(exam_id)
        .await
        .with_context(|| format!("failed to load results for exam {exam_id}"))?
        .unwrap_or_else(|| ExamResultLog::new(exam_id));

    let record = log
        .append(summary, AttemptSnapshot::from_session(session), Utc::now())
        .clone();

    store
        .put(&log)
        .await
        .with_context(|| format!("failed to save results for exam {exam_id}"))?;

    tracing::info!(
        exam = %exam_id,
        attempt = record.attempt_number,
        score = record.score,
        total = record.total,
        "attempt saved"
    );
    Ok((exam_id, record))
}

/// Drives one attempt from first question to stored result.
pub struct AttemptRunner<S: ResultStore + ?Sized> {
    session: Session,
    store: Arc<S>,
}

impl<S: ResultStore + ?Sized> AttemptRunner<S> {
    pub fn new(session: Session, store: Arc<S>) -> Self {
        Self { session, store }
    }

    /// Arrange `exam` for display and start a session on it.
    pub fn start<R: Rng + ?Sized>(
        exam: &Exam,
        exam_id: Option<Uuid>,
        options: ShuffleOptions,
        rng: &mut R,
        store: Arc<S>,
    ) -> Result<Self> {
        let session = Session::new(arrange(exam, options, rng), exam_id)?;
        Ok(Self::new(session, store))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    /// Forward an action to the session.
    ///
    /// Returns an outcome only for the action that finished the attempt; the
    /// session ignores everything after that, so a late timeout or a second
    /// submit never produces another record.
    pub async fn dispatch(&mut self, action: Action) -> Result<Option<AttemptOutcome>> {
        let Transition::Finished(termination) = self.session.dispatch(action) else {
            return Ok(None);
        };

        let summary = self.session.score()?;
        let saved = match persist_attempt(
            self.store.as_ref(),
            self.session.exam_id(),
            summary,
            &self.session,
        )
        .await
        {
            Ok((exam_id, record)) => {
                self.session.set_exam_id(exam_id);
                SaveStatus::Saved { exam_id, record }
            }
            Err(e) => {
                tracing::warn!("attempt not saved: {e:#}");
                SaveStatus::NotSaved {
                    reason: format!("{e:#}"),
                }
            }
        };

        Ok(Some(AttemptOutcome {
            summary,
            termination,
            saved,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_exam;
    use crate::store::MemoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SAMPLE: &str = "# T\n## Q1\n- [ ] a\n- [x] b\n## Q2\n- [x] c\n- [ ] d\n";

    fn make_runner(store: Arc<MemoryStore>, exam_id: Option<Uuid>) -> AttemptRunner<MemoryStore> {
        let session = Session::new(parse_exam(SAMPLE), exam_id).unwrap();
        AttemptRunner::new(session, store)
    }

    #[tokio::test]
    async fn submit_scores_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let id = Uuid::new_v4();
        let mut runner = make_runner(Arc::clone(&store), Some(id));

        assert!(runner.dispatch(Action::Toggle(1)).await.unwrap().is_none());
        assert!(runner.dispatch(Action::Next).await.unwrap().is_none());
        runner.dispatch(Action::Toggle(0)).await.unwrap();
        let outcome = runner.dispatch(Action::Submit).await.unwrap().unwrap();

        assert_eq!(outcome.termination, Termination::Submitted);
        assert_eq!(
            outcome.summary,
            ScoreSummary {
                score: 2,
                total: 2,
                percent: 100
            }
        );
        let record = outcome.saved.record().unwrap();
        assert_eq!(record.attempt_number, 1);

        let log = store.get(id).await.unwrap().unwrap();
        assert_eq!(log.results, vec![record.clone()]);
    }

    #[tokio::test]
    async fn timeout_after_submit_adds_nothing() {
        let store = Arc::new(MemoryStore::new());
        let id = Uuid::new_v4();
        let mut runner = make_runner(Arc::clone(&store), Some(id));

        runner.dispatch(Action::Next).await.unwrap();
        assert!(runner.dispatch(Action::Submit).await.unwrap().is_some());
        assert!(runner.dispatch(Action::Timeout).await.unwrap().is_none());
        assert!(runner.dispatch(Action::Submit).await.unwrap().is_none());

        assert_eq!(store.get(id).await.unwrap().unwrap().results.len(), 1);
    }

    #[tokio::test]
    async fn timeout_scores_captured_answers() {
        let store = Arc::new(MemoryStore::new());
        let mut runner = make_runner(Arc::clone(&store), None);

        runner.dispatch(Action::Toggle(1)).await.unwrap();
        let outcome = runner.dispatch(Action::Timeout).await.unwrap().unwrap();

        assert_eq!(outcome.termination, Termination::TimedOut);
        assert_eq!((outcome.summary.score, outcome.summary.total), (1, 2));
        let SaveStatus::Saved { exam_id, .. } = outcome.saved else {
            panic!("expected saved outcome");
        };
        assert_eq!(runner.session().exam_id(), Some(exam_id));
    }

    #[tokio::test]
    async fn attempts_append_to_existing_log() {
        let store = Arc::new(MemoryStore::new());
        let id = Uuid::new_v4();

        for expected in 1..=3 {
            let mut runner = make_runner(Arc::clone(&store), Some(id));
            runner.dispatch(Action::Timeout).await.unwrap();
            let log = store.get(id).await.unwrap().unwrap();
            assert_eq!(log.results.len(), expected);
        }

        let log = store.get(id).await.unwrap().unwrap();
        let numbers: Vec<u32> = log.results.iter().map(|r| r.attempt_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn failed_write_keeps_the_score() {
        let store = Arc::new(MemoryStore::failing());
        let mut runner = make_runner(store, Some(Uuid::new_v4()));

        runner.dispatch(Action::Toggle(1)).await.unwrap();
        runner.dispatch(Action::Next).await.unwrap();
        let outcome = runner.dispatch(Action::Submit).await.unwrap().unwrap();

        assert_eq!((outcome.summary.score, outcome.summary.percent), (1, 50));
        match outcome.saved {
            SaveStatus::NotSaved { reason } => assert!(reason.contains("failed to save")),
            other => panic!("expected NotSaved, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn snapshot_keeps_display_order() {
        let store = Arc::new(MemoryStore::new());
        let exam = parse_exam(SAMPLE);
        let mut rng = StdRng::seed_from_u64(11);
        let mut runner = AttemptRunner::start(
            &exam,
            None,
            ShuffleOptions::default(),
            &mut rng,
            Arc::clone(&store),
        )
        .unwrap();

        let shown = runner.session().exam().questions.clone();
        let outcome = runner.dispatch(Action::Timeout).await.unwrap().unwrap();
        assert_eq!(outcome.saved.record().unwrap().snapshot.questions, shown);
    }

    #[test]
    fn start_rejects_empty_exam() {
        let store = Arc::new(MemoryStore::new());
        let mut rng = StdRng::seed_from_u64(1);
        let result = AttemptRunner::start(
            &parse_exam("# Empty"),
            None,
            ShuffleOptions::none(),
            &mut rng,
            store,
        );
        assert!(result.is_err());
    }
}
