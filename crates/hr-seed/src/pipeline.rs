//! Seeding pipeline
//!
//! Generate every record up front, then index them one at a time: render the
//! summary, embed it, insert it. Each external call is awaited before the next
//! one starts, so at most one request is ever in flight.
//!
//! Failure boundaries:
//! - connecting to the store and generating records are fatal for the run
//! - an embedding failure or a rejected insert skips that record only
//! - losing the store connection mid-run aborts, since every later insert would fail too

use std::fmt;

use bentley::journal::{JournalContext, RunJournal};
use thiserror::Error;

use crate::employee::{render_summary, EmployeeRecord};
use crate::generator::{GenerationError, RecordGenerator};
use crate::services::document_store::{DocumentStore, IndexStatus, IndexedDocument, StoreError};
use crate::services::embeddings::Embedder;
use crate::services::ServiceError;

const COMPONENT: &str = "seed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Embedding,
  Storage,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Stage::Embedding => write!(f, "embedding"),
      Stage::Storage => write!(f, "storage"),
    }
  }
}

/// A record that was skipped, and why
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
  pub employee_id: String,
  pub stage: Stage,
  pub reason: String,
}

/// What happened to each record of a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexReport {
  pub indexed: Vec<String>,
  pub skipped: Vec<RecordFailure>,
}

impl IndexReport {
  pub fn attempted(&self) -> usize {
    self.indexed.len() + self.skipped.len()
  }
}

#[derive(Debug, Error)]
pub enum SeedError {
  #[error("could not connect to the document store: {0}")]
  Connection(#[source] StoreError),

  #[error(transparent)]
  Generation(#[from] GenerationError),

  #[error("could not {action}: {source}")]
  Store {
    action: &'static str,
    #[source]
    source: StoreError,
  },

  /// The connection dropped partway through; `report` covers the records handled before that
  #[error("lost the document store connection after {} records: {source}", .report.attempted())]
  ConnectionLost {
    report: IndexReport,
    #[source]
    source: StoreError,
  },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedOptions {
  /// Delete existing documents before indexing
  pub clear: bool,
  /// Ensure the vector search index exists after indexing
  pub create_index: bool,
}

/// Indexes records into a document store, one at a time
pub struct Indexer<'a> {
  embedder: &'a dyn Embedder,
  store: &'a dyn DocumentStore,
  journal: Option<&'a RunJournal>,
  run_id: String,
}

impl<'a> Indexer<'a> {
  pub fn new(embedder: &'a dyn Embedder, store: &'a dyn DocumentStore) -> Self {
    Self { embedder, store, journal: None, run_id: uuid::Uuid::new_v4().to_string() }
  }

  pub fn with_journal(mut self, journal: Option<&'a RunJournal>) -> Self {
    self.journal = journal;
    self
  }

  pub fn run_id(&self) -> &str {
    &self.run_id
  }

  /// Index every record in order. Per-record failures are collected in the report.
  pub async fn index_records(&self, records: Vec<EmployeeRecord>) -> Result<IndexReport, SeedError> {
    let mut report = IndexReport::default();

    for record in records {
      let employee_id = record.employee_id.clone();
      match self.index_one(record).await {
        Ok(()) => {
          bentley::success!("Successfully processed & saved record: {employee_id}");
          self.journal_success(&employee_id).await;
          report.indexed.push(employee_id);
        }
        Err(RecordError::Store(source)) if source.is_connection() => {
          bentley::error!("Lost the document store connection while saving {employee_id}");
          let reason = source.to_string();
          self.journal_skip(&employee_id, Stage::Storage, &reason).await;
          report.skipped.push(RecordFailure { employee_id, stage: Stage::Storage, reason });
          return Err(SeedError::ConnectionLost { report, source });
        }
        Err(error) => {
          let stage = error.stage();
          let reason = error.to_string();
          bentley::warn!("Skipped record {employee_id} at {stage}: {reason}");
          tracing::warn!(employee_id = %employee_id, %stage, %reason, "record skipped");
          self.journal_skip(&employee_id, stage, &reason).await;
          report.skipped.push(RecordFailure { employee_id, stage, reason });
        }
      }
    }

    Ok(report)
  }

  async fn index_one(&self, record: EmployeeRecord) -> Result<(), RecordError> {
    let summary = render_summary(&record);
    tracing::debug!(employee_id = %record.employee_id, chars = summary.len(), "summary rendered");

    let embedding = self.embedder.embed(&summary).await.map_err(RecordError::Embedding)?;

    let document = IndexedDocument { page_content: summary, metadata: record, embedding };
    self.store.insert(&document).await.map_err(RecordError::Store)
  }

  async fn journal_success(&self, employee_id: &str) {
    if let Some(journal) = self.journal {
      let context = JournalContext::for_run(&self.run_id).with_employee(employee_id);
      journal.success("record indexed", COMPONENT, context).await;
    }
  }

  async fn journal_skip(&self, employee_id: &str, stage: Stage, reason: &str) {
    if let Some(journal) = self.journal {
      let context = JournalContext::for_run(&self.run_id)
        .with_employee(employee_id)
        .with_stage(&stage.to_string());
      journal.error(&format!("record skipped: {reason}"), COMPONENT, context).await;
    }
  }
}

#[derive(Debug, Error)]
enum RecordError {
  #[error(transparent)]
  Embedding(ServiceError),
  #[error(transparent)]
  Store(StoreError),
}

impl RecordError {
  fn stage(&self) -> Stage {
    match self {
      RecordError::Embedding(_) => Stage::Embedding,
      RecordError::Store(_) => Stage::Storage,
    }
  }
}

/// Run the whole job against an already-connected store.
/// Generation happens once, before anything is written.
pub async fn seed(
  generator: &RecordGenerator<'_>,
  indexer: &Indexer<'_>,
  store: &dyn DocumentStore,
  options: SeedOptions,
) -> Result<IndexReport, SeedError> {
  bentley::info!("Generating synthetic employee records");
  let records = generator.generate().await?;
  bentley::info!("Generated {} records", records.len());

  if options.clear && records.is_empty() {
    bentley::warn!("Generator returned no records; leaving the collection untouched");
  } else if options.clear {
    let removed = store.clear().await.map_err(|source| SeedError::Store { action: "clear the collection", source })?;
    bentley::info!("Cleared {removed} existing documents");
  }

  let report = indexer.index_records(records).await?;

  if options.create_index {
    match store
      .ensure_vector_index()
      .await
      .map_err(|source| SeedError::Store { action: "create the vector index", source })?
    {
      IndexStatus::Created => bentley::info!("Vector index created; Atlas builds it in the background"),
      IndexStatus::AlreadyExists => bentley::info!("Vector index already exists"),
    }
  }

  Ok(report)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::employee::validate_employee;
  use crate::services::completion::MockTextGenerator;
  use crate::services::document_store::MockDocumentStore;
  use crate::services::embeddings::MockEmbedder;
  use mockall::Sequence;
  use serde_json::json;
  use std::sync::{Arc, Mutex};

  fn record(id: &str) -> EmployeeRecord {
    validate_employee(&record_json(id)).unwrap()
  }

  fn record_json(id: &str) -> serde_json::Value {
    json!({
      "employee_id": id,
      "first_name": "Mara",
      "last_name": "Quinn",
      "date_of_birth": "1988-02-14",
      "address": { "street": "40 Elm St", "city": "Austin", "state": "TX",
                   "postal_code": "73301", "country": "USA" },
      "contact_details": { "email": "mara.quinn@example.com", "phone_number": "512-555-0110" },
      "job_details": { "job_title": "Recruiter", "department": "People", "manager": "Ola Berg",
                       "hire_date": "2018-01-08", "salary": 74000, "currency": "USD" },
      "work_location": { "nearest_office": "Austin", "is_remote": true },
      "reporting_manager": null,
      "skills": ["Sourcing"],
      "performance_review": [],
      "benefits": { "health_insurance": "HMO", "retirement_plan": "401k", "paid_time_off": "18 days" },
      "emergency_contact": { "name": "Lee Quinn", "relationship": "Spouse", "phone_number": "512-555-0111" },
      "notes": format!("Record {id}")
    })
  }

  fn embedding_failure() -> ServiceError {
    ServiceError::Malformed { service: "embeddings", reason: "quota exceeded".to_string() }
  }

  /// Store that records every inserted employee id
  fn recording_store(inserted: Arc<Mutex<Vec<String>>>) -> MockDocumentStore {
    let mut store = MockDocumentStore::new();
    store.expect_insert().returning(move |doc| {
      inserted.lock().unwrap().push(doc.employee_id().to_string());
      Ok(())
    });
    store
  }

  #[tokio::test]
  async fn test_failed_embedding_skips_only_that_record() {
    let mut embedder = MockEmbedder::new();
    embedder.expect_embed().times(3).returning(|text| {
      if text.contains("Employee ID: E002") {
        Err(embedding_failure())
      } else {
        Ok(vec![0.1; 4])
      }
    });

    let inserted = Arc::new(Mutex::new(Vec::new()));
    let store = recording_store(inserted.clone());

    let indexer = Indexer::new(&embedder, &store);
    let report = indexer.index_records(vec![record("E001"), record("E002"), record("E003")]).await.unwrap();

    assert_eq!(*inserted.lock().unwrap(), vec!["E001", "E003"]);
    assert_eq!(report.indexed, vec!["E001", "E003"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].employee_id, "E002");
    assert_eq!(report.skipped[0].stage, Stage::Embedding);
    assert!(report.skipped[0].reason.contains("quota exceeded"));
  }

  #[tokio::test]
  async fn test_rejected_insert_does_not_stop_later_records() {
    let mut embedder = MockEmbedder::new();
    embedder.expect_embed().times(3).returning(|_| Ok(vec![0.5; 4]));

    let mut store = MockDocumentStore::new();
    store.expect_insert().times(3).returning(|doc| {
      if doc.employee_id() == "E001" {
        Err(StoreError::Operation { operation: "insert", reason: "document too large".to_string() })
      } else {
        Ok(())
      }
    });

    let report = Indexer::new(&embedder, &store)
      .index_records(vec![record("E001"), record("E002"), record("E003")])
      .await
      .unwrap();

    assert_eq!(report.indexed, vec!["E002", "E003"]);
    assert_eq!(report.skipped[0].stage, Stage::Storage);
  }

  #[tokio::test]
  async fn test_connection_loss_aborts_with_partial_report() {
    let mut embedder = MockEmbedder::new();
    embedder.expect_embed().times(2).returning(|_| Ok(vec![0.5; 4]));

    let mut store = MockDocumentStore::new();
    let mut seq = Sequence::new();
    store.expect_insert().times(1).in_sequence(&mut seq).returning(|_| Ok(()));
    store
      .expect_insert()
      .times(1)
      .in_sequence(&mut seq)
      .returning(|_| Err(StoreError::Connection("server selection timeout".to_string())));

    let err = Indexer::new(&embedder, &store)
      .index_records(vec![record("E001"), record("E002"), record("E003")])
      .await
      .unwrap_err();

    match err {
      SeedError::ConnectionLost { report, .. } => {
        assert_eq!(report.indexed, vec!["E001"]);
        assert_eq!(report.skipped[0].employee_id, "E002");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[tokio::test]
  async fn test_each_record_is_embedded_once_and_stored_with_its_summary() {
    let records = vec![record("E001"), record("E002")];
    let expected = records.clone();

    let mut embedder = MockEmbedder::new();
    embedder.expect_embed().times(2).returning(|_| Ok(vec![0.25; 4]));

    let stored = Arc::new(Mutex::new(Vec::new()));
    let captured = stored.clone();
    let mut store = MockDocumentStore::new();
    store.expect_insert().times(2).returning(move |doc| {
      captured.lock().unwrap().push(doc.clone());
      Ok(())
    });

    Indexer::new(&embedder, &store).index_records(records).await.unwrap();

    let stored = stored.lock().unwrap();
    for (document, original) in stored.iter().zip(&expected) {
      assert_eq!(&document.metadata, original);
      assert_eq!(document.page_content, render_summary(original));
      assert_eq!(document.embedding, vec![0.25; 4]);
    }
  }

  #[tokio::test]
  async fn test_journal_records_outcomes() {
    let dir = tempfile::TempDir::new().unwrap();
    let journal = RunJournal::open(dir.path().join("seed.jsonl")).unwrap();

    let mut embedder = MockEmbedder::new();
    embedder.expect_embed().returning(|text| {
      if text.contains("Employee ID: E002") {
        Err(embedding_failure())
      } else {
        Ok(vec![0.1; 4])
      }
    });
    let store = recording_store(Arc::new(Mutex::new(Vec::new())));

    let indexer = Indexer::new(&embedder, &store).with_journal(Some(&journal));
    indexer.index_records(vec![record("E001"), record("E002")]).await.unwrap();

    let errors = journal.entries(None, Some("error")).await.unwrap();
    assert_eq!(errors.len(), 1);
    let context = errors[0].context.clone().unwrap();
    assert_eq!(context.employee_id.as_deref(), Some("E002"));
    assert_eq!(context.stage.as_deref(), Some("embedding"));
    assert_eq!(context.run_id.as_deref(), Some(indexer.run_id()));

    assert_eq!(journal.entries(None, Some("success")).await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn test_seed_generates_once_then_clears_indexes_and_ensures_index() {
    let response = json!([record_json("E001"), record_json("E002")]).to_string();
    let mut text = MockTextGenerator::new();
    text.expect_complete().times(1).returning(move |_| Ok(response.clone()));

    let mut embedder = MockEmbedder::new();
    embedder.expect_embed().times(2).returning(|_| Ok(vec![0.1; 4]));

    let mut seq = Sequence::new();
    let mut store = MockDocumentStore::new();
    store.expect_clear().times(1).in_sequence(&mut seq).returning(|| Ok(5));
    store.expect_insert().times(2).in_sequence(&mut seq).returning(|_| Ok(()));
    store
      .expect_ensure_vector_index()
      .times(1)
      .in_sequence(&mut seq)
      .returning(|| Ok(IndexStatus::AlreadyExists));

    let generator = RecordGenerator::new(&text, 2);
    let indexer = Indexer::new(&embedder, &store);
    let options = SeedOptions { clear: true, create_index: true };
    let report = seed(&generator, &indexer, &store, options).await.unwrap();

    assert_eq!(report.indexed, vec!["E001", "E002"]);
  }

  #[tokio::test]
  async fn test_seed_aborts_before_indexing_when_generation_fails() {
    let mut text = MockTextGenerator::new();
    text.expect_complete().times(1).returning(|_| Ok("not json".to_string()));

    let mut embedder = MockEmbedder::new();
    embedder.expect_embed().times(0);
    let mut store = MockDocumentStore::new();
    store.expect_clear().times(0);
    store.expect_insert().times(0);

    let generator = RecordGenerator::new(&text, 2);
    let indexer = Indexer::new(&embedder, &store);
    let err = seed(&generator, &indexer, &store, SeedOptions { clear: true, create_index: false })
      .await
      .unwrap_err();

    assert!(matches!(err, SeedError::Generation(GenerationError::Parse { .. })));
  }

  #[tokio::test]
  async fn test_empty_generation_does_not_clear_the_collection() {
    let mut text = MockTextGenerator::new();
    text.expect_complete().times(1).returning(|_| Ok("[]".to_string()));

    let mut embedder = MockEmbedder::new();
    embedder.expect_embed().times(0);
    let mut store = MockDocumentStore::new();
    store.expect_clear().times(0);
    store.expect_insert().times(0);

    let generator = RecordGenerator::new(&text, 3);
    let indexer = Indexer::new(&embedder, &store);
    let report = seed(&generator, &indexer, &store, SeedOptions { clear: true, create_index: false })
      .await
      .unwrap();

    assert_eq!(report.attempted(), 0);
  }

  #[tokio::test]
  async fn test_seed_defaults_neither_clear_nor_create_index() {
    let response = json!([record_json("E001")]).to_string();
    let mut text = MockTextGenerator::new();
    text.expect_complete().returning(move |_| Ok(response.clone()));

    let mut embedder = MockEmbedder::new();
    embedder.expect_embed().returning(|_| Ok(vec![0.1; 4]));

    let mut store = MockDocumentStore::new();
    store.expect_clear().times(0);
    store.expect_ensure_vector_index().times(0);
    store.expect_insert().times(1).returning(|_| Ok(()));

    let generator = RecordGenerator::new(&text, 1);
    let indexer = Indexer::new(&embedder, &store);
    let report = seed(&generator, &indexer, &store, SeedOptions::default()).await.unwrap();
    assert_eq!(report.attempted(), 1);
  }
}
