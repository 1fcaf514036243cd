//! Embeddings through an OpenAI-compatible `/embeddings` endpoint

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http::{build_client, endpoint, post_json};
use super::ServiceError;
use crate::config::EmbeddingSettings;

const SERVICE: &str = "embeddings";

/// Turns one text into one fixed-length vector.
/// Implementations reject vectors of the wrong length.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Embedder: Send + Sync {
  async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError>;
}

pub struct OpenAiEmbeddings {
  client: Client,
  endpoint: String,
  model: String,
  dimensions: usize,
  /// Only newer models accept an explicit `dimensions` parameter
  request_dimensions: bool,
}

impl OpenAiEmbeddings {
  pub fn new(
    api_key: &str,
    base_url: &str,
    model: &str,
    dimensions: usize,
    timeout: Duration,
  ) -> Result<Self> {
    anyhow::ensure!(!model.trim().is_empty(), "missing embedding model name");
    anyhow::ensure!(dimensions > 0, "embedding dimensions must be positive");
    let client = build_client("OpenAI", api_key, timeout)?;
    Ok(Self {
      client,
      endpoint: endpoint(base_url, "embeddings"),
      model: model.to_string(),
      dimensions,
      request_dimensions: model.starts_with("text-embedding-3"),
    })
  }

  pub fn from_settings(settings: &EmbeddingSettings) -> Result<Self> {
    Self::new(
      &settings.api_key,
      &settings.base_url,
      &settings.model,
      settings.dimensions,
      settings.timeout,
    )
  }
}

#[async_trait]
impl Embedder for OpenAiEmbeddings {
  async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
    let request = EmbeddingRequest {
      model: &self.model,
      input: text,
      dimensions: self.request_dimensions.then_some(self.dimensions),
    };

    let parsed: EmbeddingResponse = post_json(&self.client, &self.endpoint, SERVICE, &request).await?;
    let embedding = parsed.data.into_iter().next().map(|entry| entry.embedding).ok_or_else(|| {
      ServiceError::Malformed { service: SERVICE, reason: "response contained no embeddings".to_string() }
    })?;

    if embedding.len() != self.dimensions {
      return Err(ServiceError::Malformed {
        service: SERVICE,
        reason: format!("expected {} dimensions, got {}", self.dimensions, embedding.len()),
      });
    }

    Ok(embedding)
  }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
  model: &'a str,
  input: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
  #[serde(default)]
  data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
  embedding: Vec<f32>,
}
