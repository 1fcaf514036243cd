//! Text generation through an OpenAI-compatible chat completions API

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http::{build_client, endpoint, post_json};
use super::ServiceError;
use crate::config::GenerationSettings;

const SERVICE: &str = "chat completions";

/// Anything that turns a prompt into a single block of text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
  async fn complete(&self, prompt: &str) -> Result<String, ServiceError>;
}

/// Chat completions client; each prompt is sent as one user message
pub struct OpenAiChat {
  client: Client,
  endpoint: String,
  model: String,
  temperature: f32,
}

impl OpenAiChat {
  pub fn new(
    api_key: &str,
    base_url: &str,
    model: &str,
    temperature: f32,
    timeout: Duration,
  ) -> Result<Self> {
    anyhow::ensure!(!model.trim().is_empty(), "missing chat model name");
    let client = build_client("OpenAI", api_key, timeout)?;
    Ok(Self {
      client,
      endpoint: endpoint(base_url, "chat/completions"),
      model: model.to_string(),
      temperature,
    })
  }

  pub fn from_settings(settings: &GenerationSettings) -> Result<Self> {
    Self::new(
      &settings.api_key,
      &settings.base_url,
      &settings.model,
      settings.temperature,
      settings.timeout,
    )
  }
}

#[async_trait]
impl TextGenerator for OpenAiChat {
  async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
    let body = ChatRequest {
      model: &self.model,
      temperature: self.temperature,
      messages: vec![ChatMessage { role: "user", content: prompt }],
    };

    let parsed: ChatResponse = post_json(&self.client, &self.endpoint, SERVICE, &body).await?;
    parsed
      .choices
      .into_iter()
      .next()
      .and_then(|choice| choice.message.content)
      .ok_or_else(|| ServiceError::Malformed {
        service: SERVICE,
        reason: "response contained no message content".to_string(),
      })
  }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  temperature: f32,
  messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
  role: &'a str,
  content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
  message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
  content: Option<String>,
}
