//! Shared plumbing for OpenAI-compatible JSON APIs

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::ServiceError;

/// Build a client that sends the bearer token and JSON content type on every request
pub(crate) fn build_client(service: &str, api_key: &str, timeout: Duration) -> Result<Client> {
  anyhow::ensure!(!api_key.trim().is_empty(), "missing {service} API key");

  let mut headers = HeaderMap::new();
  let auth = format!("Bearer {}", api_key.trim());
  headers.insert(
    AUTHORIZATION,
    HeaderValue::from_str(&auth).with_context(|| format!("invalid {service} API key"))?,
  );
  headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

  Client::builder()
    .timeout(timeout)
    .default_headers(headers)
    .build()
    .with_context(|| format!("failed to build {service} HTTP client"))
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
  format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// POST `body` and decode a successful JSON response
pub(crate) async fn post_json<B, R>(
  client: &Client,
  endpoint: &str,
  service: &'static str,
  body: &B,
) -> Result<R, ServiceError>
where
  B: Serialize + ?Sized,
  R: DeserializeOwned,
{
  let started = std::time::Instant::now();
  let response = client
    .post(endpoint)
    .json(body)
    .send()
    .await
    .map_err(|source| ServiceError::Transport { service, source })?;

  let status = response.status();
  tracing::debug!(service, %status, elapsed_ms = started.elapsed().as_millis() as u64, "response received");

  if !status.is_success() {
    let body = response.text().await.unwrap_or_else(|_| "<body unavailable>".to_string());
    return Err(ServiceError::Status { service, status, body });
  }

  response
    .json::<R>()
    .await
    .map_err(|e| ServiceError::Malformed { service, reason: e.to_string() })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_endpoint_joins_without_double_slashes() {
    assert_eq!(endpoint("https://api.openai.com/v1/", "/embeddings"), "https://api.openai.com/v1/embeddings");
    assert_eq!(endpoint("http://localhost:8080", "chat/completions"), "http://localhost:8080/chat/completions");
  }

  #[test]
  fn test_build_client_rejects_blank_key() {
    let err = build_client("OpenAI", "   ", Duration::from_secs(5)).unwrap_err();
    assert!(err.to_string().contains("missing OpenAI API key"));
  }
}
