//! `$vectorSearch` aggregation helpers

use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::Collection;

use super::connection::classify;
use super::documents::vector_to_bson;
use crate::config::StoreSettings;
use crate::services::document_store::{SearchHit, StoreError};

/// Candidates scanned per requested result
const CANDIDATE_FACTOR: usize = 10;

/// Atlas rejects `numCandidates` above this
const MAX_CANDIDATES: usize = 10_000;

pub fn vector_search_pipeline(settings: &StoreSettings, query_vector: &[f32], limit: usize) -> Vec<Document> {
  let limit = limit.clamp(1, MAX_CANDIDATES);
  let mut stage = Document::new();
  stage.insert("index", settings.index_name.as_str());
  stage.insert("path", settings.embedding_key.as_str());
  stage.insert("queryVector", vector_to_bson(query_vector));
  stage.insert("numCandidates", limit.saturating_mul(CANDIDATE_FACTOR).min(MAX_CANDIDATES) as i64);
  stage.insert("limit", limit as i64);

  let mut projection = doc! {
    "_id": 0,
    "employee_id": 1,
    "first_name": 1,
    "last_name": 1,
    "score": { "$meta": "vectorSearchScore" },
  };
  projection.insert(settings.text_key.as_str(), 1);

  vec![doc! { "$vectorSearch": stage }, doc! { "$project": projection }]
}

pub async fn search_similar(
  collection: &Collection<Document>,
  settings: &StoreSettings,
  query_vector: &[f32],
  limit: usize,
) -> Result<Vec<SearchHit>, StoreError> {
  let pipeline = vector_search_pipeline(settings, query_vector, limit);
  let cursor = collection.aggregate(pipeline).await.map_err(|e| classify("search", e))?;
  let results: Vec<Document> = cursor.try_collect().await.map_err(|e| classify("search", e))?;

  results.iter().map(|result| hit_from_document(result, &settings.text_key)).collect()
}

pub fn hit_from_document(result: &Document, text_key: &str) -> Result<SearchHit, StoreError> {
  let field = |name: &str| {
    result.get_str(name).map(str::to_string).map_err(|_| StoreError::Operation {
      operation: "search",
      reason: format!("result is missing '{name}'"),
    })
  };

  Ok(SearchHit {
    employee_id: field("employee_id")?,
    name: format!("{} {}", field("first_name")?, field("last_name")?),
    summary: field(text_key)?,
    score: result.get_f64("score").map_err(|_| StoreError::Operation {
      operation: "search",
      reason: "result is missing 'score'".to_string(),
    })?,
  })
}
