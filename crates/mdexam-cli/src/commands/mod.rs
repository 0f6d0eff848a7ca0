pub mod add;
pub mod compare;
pub mod delete;
pub mod export;
pub mod init;
pub mod list;
pub mod results;
pub mod review;
pub mod take;
pub mod validate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use uuid::Uuid;

use mdexam_core::config::{load_config_from, MdexamConfig};
use mdexam_core::error::ExamError;
use mdexam_core::history::ExamResultLog;
use mdexam_core::model::ExamRecord;
use mdexam_core::store::{ExamStore, JsonStore, ResultStore};

/// Loaded configuration plus the store it points at.
pub struct Context {
    pub config: MdexamConfig,
    pub store: Arc<JsonStore>,
}

impl Context {
    /// Load config (explicit path or search order) and apply `--data-dir`.
    pub fn load(config_path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = load_config_from(config_path)?;
        if let Some(dir) = data_dir {
            config.data_dir = dir;
        }
        tracing::debug!(data_dir = %config.data_dir.display(), "using data directory");
        let store = Arc::new(JsonStore::new(config.data_dir.clone()));
        Ok(Self { config, store })
    }

    /// Find a stored exam by id or by title (case-insensitive).
    pub async fn find_exam(&self, query: &str) -> Result<ExamRecord> {
        if let Ok(id) = Uuid::parse_str(query.trim()) {
            return self
                .store
                .get_exam(id)
                .await?
                .ok_or_else(|| ExamError::ExamNotFound { id }.into());
        }

        let exams = self.store.list_exams().await?;
        let mut matches = exams
            .into_iter()
            .filter(|e| e.title.eq_ignore_ascii_case(query.trim()));
        match (matches.next(), matches.next()) {
            (Some(exam), None) => Ok(exam),
            (Some(_), Some(_)) => {
                anyhow::bail!("several exams are titled '{query}', use the exam id instead")
            }
            (None, _) => anyhow::bail!("no exam matches '{query}'"),
        }
    }

    /// Find an exam's result log by id or title. Falls back to the titles in
    /// stored results so history of deleted exams stays reachable.
    pub async fn find_results(&self, query: &str) -> Result<ExamResultLog> {
        let exam_id = match self.find_exam(query).await {
            Ok(record) => record.id,
            Err(lookup_err) => {
                let logs = self.store.get_all().await?;
                let by_title = logs.into_iter().find(|log| {
                    log.title().eq_ignore_ascii_case(query.trim())
                        || log.exam_id.to_string() == query.trim()
                });
                match by_title {
                    Some(log) => return Ok(log),
                    None => return Err(lookup_err),
                }
            }
        };

        Ok(self
            .store
            .get(exam_id)
            .await?
            .unwrap_or_else(|| ExamResultLog::new(exam_id)))
    }
}

/// One-line bar of score percents, oldest first.
pub fn sparkline(percents: &[u8]) -> String {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    percents
        .iter()
        .map(|&p| BARS[usize::from(p.min(100)) * (BARS.len() - 1) / 100])
        .collect()
}
