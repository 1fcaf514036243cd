//! Append-only run journal
//!
//! Batch jobs write one JSON object per line describing what happened to each
//! unit of work, so skipped items can be inspected after the run finishes.
//! Writes are serialized through an internal async mutex; clones share the
//! same file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Identifies which run and which item a journal entry belongs to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JournalContext {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub run_id: Option<String>,

  /// Key of the record being processed
  #[serde(skip_serializing_if = "Option::is_none")]
  pub employee_id: Option<String>,

  /// Pipeline stage that produced the entry (e.g. `embedding`, `storage`)
  #[serde(skip_serializing_if = "Option::is_none")]
  pub stage: Option<String>,
}

impl JournalContext {
  pub fn for_run(run_id: &str) -> Self {
    Self { run_id: Some(run_id.to_string()), ..Self::default() }
  }

  pub fn with_employee(mut self, employee_id: &str) -> Self {
    self.employee_id = Some(employee_id.to_string());
    self
  }

  pub fn with_stage(mut self, stage: &str) -> Self {
    self.stage = Some(stage.to_string());
    self
  }
}

/// A single line of the journal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
  pub timestamp: DateTime<Utc>,
  pub level: String,
  pub message: String,
  pub component: String,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub context: Option<JournalContext>,
}

struct JournalFile {
  path: PathBuf,
}

impl JournalFile {
  fn open(path: &Path) -> std::io::Result<Self> {
    if let Some(parent) = path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent)?;
      }
    }

    // Never truncate: repeated runs accumulate in the same file
    OpenOptions::new().create(true).append(true).open(path)?;

    Ok(Self { path: path.to_path_buf() })
  }

  fn append(&mut self, entry: &JournalEntry) -> std::io::Result<()> {
    let line = serde_json::to_string(entry)
      .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let mut file = OpenOptions::new().append(true).open(&self.path)?;
    writeln!(file, "{line}")?;
    file.flush()
  }

  fn read(&self, limit: Option<usize>, level: Option<&str>) -> std::io::Result<Vec<JournalEntry>> {
    if !self.path.exists() {
      return Ok(Vec::new());
    }

    let reader = BufReader::new(std::fs::File::open(&self.path)?);
    let mut entries = Vec::new();

    for line in reader.lines() {
      let line = line?;
      if line.trim().is_empty() {
        continue;
      }

      // Malformed lines are skipped
      let Ok(entry) = serde_json::from_str::<JournalEntry>(&line) else {
        continue;
      };

      if level.is_none_or(|filter| filter == "all" || entry.level == filter) {
        entries.push(entry);
      }
    }

    // Keep the most recent N, oldest first
    if let Some(limit) = limit {
      let skip = entries.len().saturating_sub(limit);
      entries.drain(..skip);
    }

    Ok(entries)
  }
}

/// Thread-safe handle to a JSONL journal file
#[derive(Clone)]
pub struct RunJournal {
  inner: Arc<Mutex<JournalFile>>,
}

impl RunJournal {
  /// Open (or create) the journal at `path`, creating parent directories
  pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
    let file = JournalFile::open(path.as_ref())?;
    Ok(Self { inner: Arc::new(Mutex::new(file)) })
  }

  pub async fn path(&self) -> PathBuf {
    self.inner.lock().await.path.clone()
  }

  /// Append an entry
  pub async fn record(
    &self,
    level: &str,
    message: &str,
    component: &str,
    context: Option<JournalContext>,
  ) -> std::io::Result<()> {
    let entry = JournalEntry {
      timestamp: Utc::now(),
      level: level.to_string(),
      message: message.to_string(),
      component: component.to_string(),
      context,
    };
    self.inner.lock().await.append(&entry)
  }

  /// Read entries back, optionally filtered by level (`"all"` matches every level)
  pub async fn entries(
    &self,
    limit: Option<usize>,
    level: Option<&str>,
  ) -> std::io::Result<Vec<JournalEntry>> {
    self.inner.lock().await.read(limit, level)
  }

  /// Fire-and-forget helpers. A journal that cannot be written must not stop the job.
  pub async fn info(&self, message: &str, component: &str, context: JournalContext) {
    let _ = self.record("info", message, component, Some(context)).await;
  }

  pub async fn warn(&self, message: &str, component: &str, context: JournalContext) {
    let _ = self.record("warn", message, component, Some(context)).await;
  }

  pub async fn error(&self, message: &str, component: &str, context: JournalContext) {
    let _ = self.record("error", message, component, Some(context)).await;
  }

  pub async fn success(&self, message: &str, component: &str, context: JournalContext) {
    let _ = self.record("success", message, component, Some(context)).await;
  }
}
