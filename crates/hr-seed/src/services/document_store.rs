//! Document store abstraction for indexed employee summaries
//!
//! The pipeline only needs to insert documents, optionally clear the
//! collection, ensure the vector index exists, and run a similarity query.
//! [`super::atlas::AtlasStore`] is the production implementation.

use async_trait::async_trait;
use thiserror::Error;

use crate::employee::EmployeeRecord;

/// Summary text, the record it came from, and the summary's embedding.
/// Built right before an insert and dropped right after.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedDocument {
  pub page_content: String,
  pub metadata: EmployeeRecord,
  pub embedding: Vec<f32>,
}

impl IndexedDocument {
  pub fn employee_id(&self) -> &str {
    &self.metadata.employee_id
  }
}

#[derive(Debug, Error)]
pub enum StoreError {
  /// The store cannot be reached at all; nothing else will succeed either
  #[error("document store unreachable: {0}")]
  Connection(String),

  #[error("document store {operation} failed: {reason}")]
  Operation { operation: &'static str, reason: String },
}

impl StoreError {
  pub fn is_connection(&self) -> bool {
    matches!(self, StoreError::Connection(_))
  }
}

/// Outcome of ensuring the vector search index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
  Created,
  AlreadyExists,
}

/// One similarity search result
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
  pub employee_id: String,
  pub name: String,
  pub summary: String,
  pub score: f64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
  /// Insert one document. Never replaces an existing document with the same employee id.
  async fn insert(&self, document: &IndexedDocument) -> Result<(), StoreError>;

  /// Delete every document in the collection, returning how many were removed
  async fn clear(&self) -> Result<u64, StoreError>;

  async fn ensure_vector_index(&self) -> Result<IndexStatus, StoreError>;

  /// Nearest documents to `query_vector`, best first
  async fn search(&self, query_vector: &[f32], limit: usize) -> Result<Vec<SearchHit>, StoreError>;
}
