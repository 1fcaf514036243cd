//! MongoDB Atlas implementation of [`DocumentStore`]
//!
//! Documents go into one collection; similarity queries run through an Atlas
//! Vector Search index over the embedding field.

pub mod connection;
pub mod documents;
pub mod index_manager;
pub mod search;

use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::{Client, Collection, Database};

use crate::config::StoreSettings;
use crate::services::document_store::{DocumentStore, IndexStatus, IndexedDocument, SearchHit, StoreError};
use connection::classify;
use documents::{to_document, DocumentKeys};

/// Connected store. Call [`AtlasStore::close`] when done.
pub struct AtlasStore {
  client: Client,
  database: Database,
  collection: Collection<Document>,
  settings: StoreSettings,
}

impl AtlasStore {
  /// Connect and verify the deployment answers a ping
  pub async fn connect(settings: &StoreSettings) -> Result<Self, StoreError> {
    let client = connection::connect(&settings.uri).await?;
    let database = client.database(&settings.database);
    let collection = database.collection::<Document>(&settings.collection);

    bentley::info!("Connected to document store, using {}.{}", settings.database, settings.collection);
    Ok(Self { client, database, collection, settings: settings.clone() })
  }

  /// Release the connection pool
  pub async fn close(self) {
    self.client.shutdown().await;
    tracing::debug!("document store connection closed");
  }

  fn keys(&self) -> DocumentKeys<'_> {
    DocumentKeys { text_key: &self.settings.text_key, embedding_key: &self.settings.embedding_key }
  }
}

#[async_trait]
impl DocumentStore for AtlasStore {
  async fn insert(&self, document: &IndexedDocument) -> Result<(), StoreError> {
    let stored = to_document(document, self.keys())?;
    self.collection.insert_one(stored).await.map_err(|e| classify("insert", e))?;
    Ok(())
  }

  async fn clear(&self) -> Result<u64, StoreError> {
    let result = self.collection.delete_many(doc! {}).await.map_err(|e| classify("clear", e))?;
    Ok(result.deleted_count)
  }

  async fn ensure_vector_index(&self) -> Result<IndexStatus, StoreError> {
    index_manager::ensure_vector_index(&self.database, &self.settings).await
  }

  async fn search(&self, query_vector: &[f32], limit: usize) -> Result<Vec<SearchHit>, StoreError> {
    search::search_similar(&self.collection, &self.settings, query_vector, limit).await
  }
}
