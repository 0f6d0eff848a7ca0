//! Record stores for exams and result logs.
//!
//! The core treats storage as a key-value table with whole-record upserts:
//! a `put` either replaces the full record or fails, and readers never see a
//! partially written one. Missing records come back as `None`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::history::ExamResultLog;
use crate::model::ExamRecord;

// ---------------------------------------------------------------------------
// Store traits
// ---------------------------------------------------------------------------

/// Per-exam result logs.
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn get(&self, exam_id: Uuid) -> Result<Option<ExamResultLog>>;

    async fn get_all(&self) -> Result<Vec<ExamResultLog>>;

    /// Insert or replace the whole log.
    async fn put(&self, log: &ExamResultLog) -> Result<()>;

    async fn delete(&self, exam_id: Uuid) -> Result<()>;
}

/// Stored exam source texts.
#[async_trait]
pub trait ExamStore: Send + Sync {
    async fn get_exam(&self, id: Uuid) -> Result<Option<ExamRecord>>;

    async fn list_exams(&self) -> Result<Vec<ExamRecord>>;

    async fn put_exam(&self, record: &ExamRecord) -> Result<()>;

    async fn delete_exam(&self, id: Uuid) -> Result<()>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Store kept in process memory, for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStore {
    exams: Mutex<HashMap<Uuid, ExamRecord>>,
    results: Mutex<HashMap<Uuid, ExamResultLog>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes {
            anyhow::bail!("store is read-only");
        }
        Ok(())
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn get(&self, exam_id: Uuid) -> Result<Option<ExamResultLog>> {
        Ok(self.results.lock().await.get(&exam_id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<ExamResultLog>> {
        Ok(self.results.lock().await.values().cloned().collect())
    }

    async fn put(&self, log: &ExamResultLog) -> Result<()> {
        self.check_writable()?;
        self.results.lock().await.insert(log.exam_id, log.clone());
        Ok(())
    }

    async fn delete(&self, exam_id: Uuid) -> Result<()> {
        self.check_writable()?;
        self.results.lock().await.remove(&exam_id);
        Ok(())
    }
}

#[async_trait]
impl ExamStore for MemoryStore {
    async fn get_exam(&self, id: Uuid) -> Result<Option<ExamRecord>> {
        Ok(self.exams.lock().await.get(&id).cloned())
    }

    async fn list_exams(&self) -> Result<Vec<ExamRecord>> {
        let mut exams: Vec<ExamRecord> = self.exams.lock().await.values().cloned().collect();
        sort_exams(&mut exams);
        Ok(exams)
    }

    async fn put_exam(&self, record: &ExamRecord) -> Result<()> {
        self.check_writable()?;
        self.exams.lock().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn delete_exam(&self, id: Uuid) -> Result<()> {
        self.check_writable()?;
        self.exams.lock().await.remove(&id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON directory store
// ---------------------------------------------------------------------------

/// Store backed by one JSON file per record:
/// `<root>/exams/<id>.json` and `<root>/results/<id>.json`.
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn exams_dir(&self) -> PathBuf {
        self.root.join("exams")
    }

    fn results_dir(&self) -> PathBuf {
        self.root.join("results")
    }

    fn record_path(dir: &Path, id: Uuid) -> PathBuf {
        dir.join(format!("{id}.json"))
    }
}

/// Read a JSON record, `None` if the file does not exist.
async fn read_record<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read record {}", path.display()))
        }
    };
    let record = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse record {}", path.display()))?;
    Ok(Some(record))
}

/// Read every `.json` record in a directory. A missing directory is empty.
/// Records that fail to read or parse are skipped with a warning.
async fn read_all<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read directory {}", dir.display()))
        }
    };

    let mut records = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            match read_record(&path).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => tracing::warn!("skipping {}: {:#}", path.display(), e),
            }
        }
    }
    Ok(records)
}

/// Write a record to a temporary sibling and rename it into place.
async fn write_record<T: Serialize + Sync>(dir: &Path, path: &Path, record: &T) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let json = serde_json::to_string_pretty(record).context("failed to serialize record")?;
    let tmp = path.with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));
    tokio::fs::write(&tmp, json)
        .await
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

async fn remove_record(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("failed to delete {}", path.display())),
    }
}

#[async_trait]
impl ResultStore for JsonStore {
    async fn get(&self, exam_id: Uuid) -> Result<Option<ExamResultLog>> {
        read_record(&Self::record_path(&self.results_dir(), exam_id)).await
    }

    async fn get_all(&self) -> Result<Vec<ExamResultLog>> {
        read_all(&self.results_dir()).await
    }

    async fn put(&self, log: &ExamResultLog) -> Result<()> {
        let dir = self.results_dir();
        write_record(&dir, &Self::record_path(&dir, log.exam_id), log).await
    }

    async fn delete(&self, exam_id: Uuid) -> Result<()> {
        remove_record(&Self::record_path(&self.results_dir(), exam_id)).await
    }
}

#[async_trait]
impl ExamStore for JsonStore {
    async fn get_exam(&self, id: Uuid) -> Result<Option<ExamRecord>> {
        read_record(&Self::record_path(&self.exams_dir(), id)).await
    }

    async fn list_exams(&self) -> Result<Vec<ExamRecord>> {
        let mut exams: Vec<ExamRecord> = read_all(&self.exams_dir()).await?;
        sort_exams(&mut exams);
        Ok(exams)
    }

    async fn put_exam(&self, record: &ExamRecord) -> Result<()> {
        let dir = self.exams_dir();
        write_record(&dir, &Self::record_path(&dir, record.id), record).await?;
        tracing::info!(id = %record.id, title = %record.title, "stored exam");
        Ok(())
    }

    async fn delete_exam(&self, id: Uuid) -> Result<()> {
        remove_record(&Self::record_path(&self.exams_dir(), id)).await
    }
}

/// Exams are listed alphabetically by title.
fn sort_exams(exams: &mut [ExamRecord]) {
    exams.sort_by(|a, b| {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
}
