//! BSON layout of stored employee documents
//!
//! A stored document is the employee record's fields at the top level plus
//! the summary under the text key and the vector under the embedding key:
//!
//! ```text
//! { employee_id, first_name, ..., notes, <text_key>: "...", <embedding_key>: [f64; N] }
//! ```

use mongodb::bson::{self, Bson, Document};

use crate::services::document_store::{IndexedDocument, StoreError};

/// Names of the two fields the store adds to every record
#[derive(Debug, Clone, Copy)]
pub struct DocumentKeys<'a> {
  pub text_key: &'a str,
  pub embedding_key: &'a str,
}

pub fn to_document(document: &IndexedDocument, keys: DocumentKeys<'_>) -> Result<Document, StoreError> {
  let mut stored = bson::to_document(&document.metadata).map_err(|e| StoreError::Operation {
    operation: "serialize",
    reason: format!("employee {}: {e}", document.employee_id()),
  })?;

  for key in [keys.text_key, keys.embedding_key] {
    if stored.contains_key(key) {
      return Err(StoreError::Operation {
        operation: "serialize",
        reason: format!("field '{key}' would overwrite employee data"),
      });
    }
  }

  stored.insert(keys.text_key, document.page_content.as_str());
  stored.insert(keys.embedding_key, vector_to_bson(&document.embedding));
  Ok(stored)
}

pub fn vector_to_bson(vector: &[f32]) -> Bson {
  Bson::Array(vector.iter().map(|v| Bson::Double(f64::from(*v))).collect())
}
