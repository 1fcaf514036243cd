//! Clients for the external services the seeding job depends on
//!
//! Each capability sits behind a trait so the pipeline can be driven by mocks:
//! [`completion::TextGenerator`], [`embeddings::Embedder`] and
//! [`document_store::DocumentStore`].

pub mod atlas;
pub mod completion;
pub mod document_store;
pub mod embeddings;
mod http;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to an HTTP API (completion or embeddings)
#[derive(Debug, Error)]
pub enum ServiceError {
  #[error("request to {service} failed: {source}")]
  Transport {
    service: &'static str,
    #[source]
    source: reqwest::Error,
  },

  #[error("{service} returned {status}: {body}")]
  Status { service: &'static str, status: StatusCode, body: String },

  #[error("{service} response was malformed: {reason}")]
  Malformed { service: &'static str, reason: String },
}
