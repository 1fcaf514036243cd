//! Runtime configuration
//!
//! Every setting can come from a flag or an environment variable; `.env` is
//! loaded before parsing. Secrets are resolved and checked up front so a
//! missing key fails the command before any network call.

use std::time::Duration;

use clap::Args;
use thiserror::Error;
use url::Url;

use crate::employee::contract::EMPLOYEE_FIELDS;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_DIMENSIONS: usize = 1536;
pub const DEFAULT_DATABASE: &str = "hr_database";
pub const DEFAULT_COLLECTION: &str = "employees";
pub const DEFAULT_INDEX_NAME: &str = "vector_index";
pub const DEFAULT_TEXT_KEY: &str = "embedding_text";
pub const DEFAULT_EMBEDDING_KEY: &str = "embedding";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
  #[error("{0} is not set")]
  MissingEnv(&'static str),

  #[error("invalid {field}: {reason}")]
  Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
  ConfigError::Invalid { field, reason: reason.into() }
}

/// Flags shared by every command that talks to OpenAI
#[derive(Args, Debug, Clone)]
pub struct OpenAiArgs {
  /// API key for text generation
  #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
  pub openai_api_key: Option<String>,

  /// API key for embeddings (defaults to OPENAI_API_KEY)
  #[arg(long, env = "EMBEDDINGS_API_KEY", hide_env_values = true)]
  pub embeddings_api_key: Option<String>,

  /// Base URL of the OpenAI-compatible API
  #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
  pub openai_base_url: String,

  #[arg(long, default_value = DEFAULT_CHAT_MODEL)]
  pub chat_model: String,

  /// Sampling temperature for record generation
  #[arg(long, default_value_t = 0.7)]
  pub temperature: f32,

  #[arg(long, default_value = DEFAULT_EMBEDDING_MODEL)]
  pub embedding_model: String,

  /// Length of every embedding vector (must match the vector index)
  #[arg(long, default_value_t = DEFAULT_DIMENSIONS)]
  pub dimensions: usize,

  /// Per-request timeout in seconds
  #[arg(long, default_value_t = 60)]
  pub timeout_secs: u64,
}

/// Flags describing where documents are stored
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
  /// Connection string for the document store
  #[arg(long, env = "MONGODB_ATLAS_URI", hide_env_values = true)]
  pub mongodb_uri: Option<String>,

  #[arg(long, default_value = DEFAULT_DATABASE)]
  pub database: String,

  #[arg(long, default_value = DEFAULT_COLLECTION)]
  pub collection: String,

  /// Name of the vector search index
  #[arg(long, default_value = DEFAULT_INDEX_NAME)]
  pub index_name: String,

  /// Field that holds the summary text in stored documents
  #[arg(long, default_value = DEFAULT_TEXT_KEY)]
  pub text_key: String,

  /// Field that holds the embedding vector in stored documents
  #[arg(long, default_value = DEFAULT_EMBEDDING_KEY)]
  pub embedding_key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  pub temperature: f32,
  pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingSettings {
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  pub dimensions: usize,
  pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreSettings {
  pub uri: String,
  pub database: String,
  pub collection: String,
  pub index_name: String,
  pub text_key: String,
  pub embedding_key: String,
  pub dimensions: usize,
}

impl StoreSettings {
  /// Settings with the default names, for a given connection string
  pub fn with_defaults(uri: &str) -> Self {
    Self {
      uri: uri.to_string(),
      database: DEFAULT_DATABASE.to_string(),
      collection: DEFAULT_COLLECTION.to_string(),
      index_name: DEFAULT_INDEX_NAME.to_string(),
      text_key: DEFAULT_TEXT_KEY.to_string(),
      embedding_key: DEFAULT_EMBEDDING_KEY.to_string(),
      dimensions: DEFAULT_DIMENSIONS,
    }
  }
}

impl OpenAiArgs {
  pub fn generation(&self) -> Result<GenerationSettings, ConfigError> {
    let api_key = non_blank(&self.openai_api_key).ok_or(ConfigError::MissingEnv("OPENAI_API_KEY"))?;
    if !(0.0..=2.0).contains(&self.temperature) {
      return Err(invalid("temperature", format!("{} is outside 0.0..=2.0", self.temperature)));
    }

    Ok(GenerationSettings {
      api_key,
      base_url: validate_base_url(&self.openai_base_url)?,
      model: require_name("chat model", &self.chat_model)?,
      temperature: self.temperature,
      timeout: self.timeout()?,
    })
  }

  pub fn embeddings(&self) -> Result<EmbeddingSettings, ConfigError> {
    let api_key = non_blank(&self.embeddings_api_key)
      .or_else(|| non_blank(&self.openai_api_key))
      .ok_or(ConfigError::MissingEnv("EMBEDDINGS_API_KEY or OPENAI_API_KEY"))?;
    if self.dimensions == 0 {
      return Err(invalid("dimensions", "must be greater than zero"));
    }

    Ok(EmbeddingSettings {
      api_key,
      base_url: validate_base_url(&self.openai_base_url)?,
      model: require_name("embedding model", &self.embedding_model)?,
      dimensions: self.dimensions,
      timeout: self.timeout()?,
    })
  }

  fn timeout(&self) -> Result<Duration, ConfigError> {
    if self.timeout_secs == 0 {
      return Err(invalid("timeout", "must be at least one second"));
    }
    Ok(Duration::from_secs(self.timeout_secs))
  }
}

impl StoreArgs {
  pub fn settings(&self, dimensions: usize) -> Result<StoreSettings, ConfigError> {
    let uri = non_blank(&self.mongodb_uri).ok_or(ConfigError::MissingEnv("MONGODB_ATLAS_URI"))?;
    if !uri.starts_with("mongodb://") && !uri.starts_with("mongodb+srv://") {
      return Err(invalid("connection string", "must start with mongodb:// or mongodb+srv://"));
    }

    let settings = StoreSettings {
      uri,
      database: require_name("database", &self.database)?,
      collection: require_name("collection", &self.collection)?,
      index_name: require_name("index name", &self.index_name)?,
      text_key: require_name("text key", &self.text_key)?,
      embedding_key: require_name("embedding key", &self.embedding_key)?,
      dimensions,
    };
    validate_document_keys(&settings.text_key, &settings.embedding_key)?;
    Ok(settings)
  }
}

/// Stored documents put the record fields at the top level next to the text
/// and vector fields, so those two names must be distinct and unused by records.
pub fn validate_document_keys(text_key: &str, embedding_key: &str) -> Result<(), ConfigError> {
  if text_key == embedding_key {
    return Err(invalid("embedding key", "must differ from the text key"));
  }
  for (field, key) in [("text key", text_key), ("embedding key", embedding_key)] {
    if key == "_id" || EMPLOYEE_FIELDS.iter().any(|f| f.name == key) {
      return Err(invalid(field, format!("'{key}' is already used by employee documents")));
    }
  }
  Ok(())
}

fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
  let url = Url::parse(raw).map_err(|e| invalid("base URL", e.to_string()))?;
  if !matches!(url.scheme(), "http" | "https") {
    return Err(invalid("base URL", "must be an http(s) URL"));
  }
  Ok(raw.trim_end_matches('/').to_string())
}

fn require_name(field: &'static str, value: &str) -> Result<String, ConfigError> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(invalid(field, "must not be empty"));
  }
  Ok(trimmed.to_string())
}

fn non_blank(value: &Option<String>) -> Option<String> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
