//! Vector search index management

use mongodb::bson::{doc, Document};
use mongodb::error::ErrorKind;
use mongodb::Database;

use super::connection::classify;
use crate::config::StoreSettings;
use crate::services::document_store::{IndexStatus, StoreError};

/// Server code for `IndexAlreadyExists`
const INDEX_ALREADY_EXISTS: i32 = 68;

pub const SIMILARITY: &str = "cosine";

/// `createSearchIndexes` command for the configured vector index
pub fn create_index_command(settings: &StoreSettings) -> Result<Document, StoreError> {
  let dimensions = i32::try_from(settings.dimensions).map_err(|_| StoreError::Operation {
    operation: "create index",
    reason: format!("{} dimensions is too large for a vector index", settings.dimensions),
  })?;

  Ok(doc! {
    "createSearchIndexes": settings.collection.as_str(),
    "indexes": [{
      "name": settings.index_name.as_str(),
      "type": "vectorSearch",
      "definition": {
        "fields": [{
          "type": "vector",
          "path": settings.embedding_key.as_str(),
          "numDimensions": dimensions,
          "similarity": SIMILARITY,
        }],
      },
    }],
  })
}

/// Create the index unless one with the same name already exists
pub async fn ensure_vector_index(database: &Database, settings: &StoreSettings) -> Result<IndexStatus, StoreError> {
  match database.run_command(create_index_command(settings)?).await {
    Ok(_) => {
      bentley::info!(
        "Created vector index '{}' on {}.{} ({} dims, {SIMILARITY})",
        settings.index_name,
        settings.database,
        settings.collection,
        settings.dimensions
      );
      Ok(IndexStatus::Created)
    }
    Err(error) if is_already_exists(error.kind.as_ref()) => Ok(IndexStatus::AlreadyExists),
    Err(error) => Err(classify("create index", error)),
  }
}

fn is_already_exists(kind: &ErrorKind) -> bool {
  match kind {
    ErrorKind::Command(command) => command.code == INDEX_ALREADY_EXISTS || command.code_name == "IndexAlreadyExists",
    _ => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_index_command_describes_vector_field() {
    let mut settings = StoreSettings::with_defaults("mongodb://localhost:27017");
    settings.embedding_key = "vector".to_string();

    let command = create_index_command(&settings).unwrap();
    assert_eq!(command.get_str("createSearchIndexes").unwrap(), "employees");

    let index = command.get_array("indexes").unwrap()[0].as_document().unwrap();
    assert_eq!(index.get_str("name").unwrap(), "vector_index");
    assert_eq!(index.get_str("type").unwrap(), "vectorSearch");

    let field = index.get_document("definition").unwrap().get_array("fields").unwrap()[0]
      .as_document()
      .unwrap();
    assert_eq!(field.get_str("path").unwrap(), "vector");
    assert_eq!(field.get_i32("numDimensions").unwrap(), 1536);
    assert_eq!(field.get_str("similarity").unwrap(), "cosine");
  }

  #[test]
  fn test_oversized_dimensions_are_rejected() {
    let mut settings = StoreSettings::with_defaults("mongodb://localhost:27017");
    settings.dimensions = usize::MAX;

    let err = create_index_command(&settings).unwrap_err();
    assert!(matches!(err, StoreError::Operation { operation: "create index", .. }));
  }
}
