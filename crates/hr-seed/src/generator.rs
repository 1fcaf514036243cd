//! Synthetic record generation
//!
//! One prompt, one completion, one strict parse. Nothing is retried or
//! repaired: output that is not a JSON array of valid employee records fails
//! the whole generation step.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::employee::contract::{format_instructions, validate_employee_at};
use crate::employee::{EmployeeRecord, ValidationError};
use crate::services::completion::TextGenerator;
use crate::services::ServiceError;

pub const DEFAULT_RECORD_COUNT: usize = 10;

static FENCED_BLOCK: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?s)```(?:json|JSON)?[ \t]*\r?\n?(.*?)```").expect("fence pattern is valid"));

#[derive(Debug, Error)]
pub enum GenerationError {
  #[error("text generation request failed: {0}")]
  Request(#[from] ServiceError),

  /// The response is not a JSON array at all
  #[error("could not parse generated records: {reason}")]
  Parse { reason: String },

  /// The response is an array but an element does not match the record contract
  #[error("generated record failed validation: {0}")]
  Validation(#[from] ValidationError),
}

/// The instruction sent to the text generator
pub fn build_prompt(count: usize) -> String {
  format!(
    "You are a helpful assistant that generates employee data. Generate {count} fictional employee \
     records. Each record should include the following fields: employee_id, first_name, last_name, \
     date_of_birth, address, contact_details, job_details, work_location, reporting_manager, skills, \
     performance_review, benefits, emergency_contact, notes. Ensure variety in the data and realistic \
     values.\n\n{}",
    format_instructions()
  )
}

/// Parse a raw completion into records. A bare array is parsed as-is; otherwise
/// a fenced code block, if present, is parsed instead of the surrounding text.
pub fn parse_generation(text: &str) -> Result<Vec<EmployeeRecord>, GenerationError> {
  let payload = extract_payload(text);
  if payload.is_empty() {
    return Err(GenerationError::Parse { reason: "response was empty".to_string() });
  }

  let value: Value =
    serde_json::from_str(payload).map_err(|e| GenerationError::Parse { reason: format!("invalid JSON: {e}") })?;

  let items = value.as_array().ok_or_else(|| GenerationError::Parse {
    reason: format!("expected a JSON array of records, found {}", describe(&value)),
  })?;

  items
    .iter()
    .enumerate()
    .map(|(i, item)| validate_employee_at(item, &format!("[{i}]")).map_err(GenerationError::from))
    .collect()
}

fn extract_payload(text: &str) -> &str {
  let trimmed = text.trim();
  if trimmed.starts_with('[') {
    return trimmed;
  }

  FENCED_BLOCK
    .captures(text)
    .and_then(|captures| captures.get(1))
    .map_or(text, |m| m.as_str())
    .trim()
}

fn describe(value: &Value) -> &'static str {
  match value {
    Value::Object(_) => "an object",
    Value::String(_) => "a string",
    Value::Number(_) => "a number",
    Value::Bool(_) => "a boolean",
    Value::Null => "null",
    Value::Array(_) => "an array",
  }
}

/// Asks a [`TextGenerator`] for a batch of synthetic employees
pub struct RecordGenerator<'a> {
  generator: &'a dyn TextGenerator,
  count: usize,
}

impl<'a> RecordGenerator<'a> {
  pub fn new(generator: &'a dyn TextGenerator, count: usize) -> Self {
    Self { generator, count }
  }

  pub async fn generate(&self) -> Result<Vec<EmployeeRecord>, GenerationError> {
    let prompt = build_prompt(self.count);
    tracing::debug!(count = self.count, prompt_chars = prompt.len(), "requesting synthetic records");

    let response = self.generator.complete(&prompt).await?;
    let records = parse_generation(&response)?;

    if records.len() != self.count {
      bentley::warn!("Requested {} records but the generator returned {}", self.count, records.len());
    }
    Ok(records)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::services::completion::MockTextGenerator;
  use mockall::predicate::function;
  use serde_json::json;

  fn record_json(id: &str) -> Value {
    json!({
      "employee_id": id,
      "first_name": "Lin",
      "last_name": "Okafor",
      "date_of_birth": "1991-04-23",
      "address": { "street": "5 Harbor Rd", "city": "Portland", "state": "OR",
                   "postal_code": "97201", "country": "USA" },
      "contact_details": { "email": "lin.okafor@example.com", "phone_number": "503-555-0142" },
      "job_details": { "job_title": "Data Engineer", "department": "Platform", "manager": "Sam Reyes",
                       "hire_date": "2020-08-17", "salary": 128000, "currency": "USD" },
      "work_location": { "nearest_office": "Portland", "is_remote": false },
      "reporting_manager": "Sam Reyes",
      "skills": ["Rust", "Kafka"],
      "performance_review": [{ "review_date": "2023-12-01", "rating": 4.5, "comments": "Strong quarter" }],
      "benefits": { "health_insurance": "PPO", "retirement_plan": "401k", "paid_time_off": "20 days" },
      "emergency_contact": { "name": "Ade Okafor", "relationship": "Sibling", "phone_number": "503-555-0199" },
      "notes": "Mentors new hires."
    })
  }

  #[test]
  fn test_prompt_embeds_count_and_format_instructions() {
    let prompt = build_prompt(7);
    assert!(prompt.contains("Generate 7 fictional employee records"));
    assert!(prompt.contains("```json"));
    assert!(prompt.contains("\"emergency_contact\""));
  }

  #[test]
  fn test_parse_plain_array() {
    let text = json!([record_json("E001"), record_json("E002")]).to_string();
    let records = parse_generation(&text).unwrap();
    let ids: Vec<_> = records.iter().map(|r| r.employee_id.as_str()).collect();
    assert_eq!(ids, vec!["E001", "E002"]);
  }

  #[test]
  fn test_parse_fenced_block_with_chatter() {
    let text = format!(
      "Here are your records:\n```json\n{}\n```\nLet me know if you need more.",
      json!([record_json("E010")])
    );
    assert_eq!(parse_generation(&text).unwrap().len(), 1);
  }

  #[test]
  fn test_bare_array_keeps_backticks_inside_values() {
    let mut record = record_json("E004");
    record["notes"] = json!("Wrote the ```sql``` style guide");
    let text = json!([record]).to_string();

    let records = parse_generation(&text).unwrap();
    assert_eq!(records[0].notes, "Wrote the ```sql``` style guide");
  }

  #[test]
  fn test_parse_rejects_non_json() {
    let err = parse_generation("Sorry, I can't help with that.").unwrap_err();
    assert!(matches!(err, GenerationError::Parse { .. }));
  }

  #[test]
  fn test_parse_rejects_single_object() {
    let err = parse_generation(&record_json("E001").to_string()).unwrap_err();
    match err {
      GenerationError::Parse { reason } => assert!(reason.contains("an object")),
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn test_parse_rejects_empty_response() {
    assert!(matches!(parse_generation("  \n "), Err(GenerationError::Parse { .. })));
  }

  #[test]
  fn test_invalid_element_reports_indexed_path() {
    let mut bad = record_json("E002");
    bad["contact_details"]["email"] = json!("not-an-email");
    let text = json!([record_json("E001"), bad]).to_string();

    match parse_generation(&text).unwrap_err() {
      GenerationError::Validation(err) => assert_eq!(err.path(), "[1].contact_details.email"),
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn test_empty_array_is_zero_records() {
    assert!(parse_generation("[]").unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_generate_issues_exactly_one_request() {
    let mut generator = MockTextGenerator::new();
    let response = json!([record_json("E001"), record_json("E002"), record_json("E003")]).to_string();
    generator
      .expect_complete()
      .with(function(|prompt: &str| prompt.contains("Generate 3 fictional employee records")))
      .times(1)
      .returning(move |_| Ok(response.clone()));

    let records = RecordGenerator::new(&generator, 3).generate().await.unwrap();
    assert_eq!(records.len(), 3);
  }

  #[tokio::test]
  async fn test_generate_does_not_retry_unparseable_output() {
    let mut generator = MockTextGenerator::new();
    generator.expect_complete().times(1).returning(|_| Ok("{ truncated".to_string()));

    let err = RecordGenerator::new(&generator, 10).generate().await.unwrap_err();
    assert!(matches!(err, GenerationError::Parse { .. }));
  }
}
