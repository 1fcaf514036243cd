//! Field contract for employee records
//!
//! The contract is a static table of every field with its kind and whether it
//! may be null. Untyped JSON is checked against the table first so failures
//! name the exact field path (`job_details.salary`, `performance_review[1].rating`).
//! Only contract fields survive into the normalized value, which then
//! deserializes into [`EmployeeRecord`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use schemars::schema_for;
use serde_json::{Map, Value};
use thiserror::Error;

use super::EmployeeRecord;

/// Why a value did not match the employee contract
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
  #[error("{path}: required field is missing")]
  Missing { path: String },

  #[error("{path}: required field is null")]
  UnexpectedNull { path: String },

  #[error("{path}: expected {expected}, found {found}")]
  WrongType { path: String, expected: &'static str, found: &'static str },

  #[error("{path}: '{value}' is not a valid email address")]
  InvalidEmail { path: String, value: String },

  #[error("{path}: '{value}' is not a valid date")]
  InvalidDate { path: String, value: String },

  #[error("{path}: {reason}")]
  Mismatch { path: String, reason: String },
}

impl ValidationError {
  /// Path of the offending field, `""` for the root value
  pub fn path(&self) -> &str {
    match self {
      ValidationError::Missing { path }
      | ValidationError::UnexpectedNull { path }
      | ValidationError::WrongType { path, .. }
      | ValidationError::InvalidEmail { path, .. }
      | ValidationError::InvalidDate { path, .. }
      | ValidationError::Mismatch { path, .. } => path,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
  Text,
  Email,
  Date,
  Number,
  Flag,
  TextList,
  Object(&'static [Field]),
  ObjectList(&'static [Field]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
  Required,
  /// May be absent or null
  Nullable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
  pub name: &'static str,
  pub kind: FieldKind,
  pub presence: Presence,
}

const fn required(name: &'static str, kind: FieldKind) -> Field {
  Field { name, kind, presence: Presence::Required }
}

const fn nullable(name: &'static str, kind: FieldKind) -> Field {
  Field { name, kind, presence: Presence::Nullable }
}

use FieldKind::*;

const ADDRESS: &[Field] = &[
  required("street", Text),
  required("city", Text),
  required("state", Text),
  required("postal_code", Text),
  required("country", Text),
];

const CONTACT_DETAILS: &[Field] = &[required("email", Email), required("phone_number", Text)];

const JOB_DETAILS: &[Field] = &[
  required("job_title", Text),
  required("department", Text),
  required("manager", Text),
  required("hire_date", Date),
  required("salary", Number),
  required("currency", Text),
];

const WORK_LOCATION: &[Field] = &[required("nearest_office", Text), required("is_remote", Flag)];

const PERFORMANCE_REVIEW: &[Field] = &[
  required("review_date", Date),
  required("rating", Number),
  required("comments", Text),
];

const BENEFITS: &[Field] = &[
  required("health_insurance", Text),
  required("retirement_plan", Text),
  required("paid_time_off", Text),
];

const EMERGENCY_CONTACT: &[Field] = &[
  required("name", Text),
  required("relationship", Text),
  required("phone_number", Text),
];

/// Every top-level field of an employee record
pub const EMPLOYEE_FIELDS: &[Field] = &[
  required("employee_id", Text),
  required("first_name", Text),
  required("last_name", Text),
  required("date_of_birth", Date),
  required("address", Object(ADDRESS)),
  required("contact_details", Object(CONTACT_DETAILS)),
  required("job_details", Object(JOB_DETAILS)),
  required("work_location", Object(WORK_LOCATION)),
  nullable("reporting_manager", Text),
  required("skills", TextList),
  required("performance_review", ObjectList(PERFORMANCE_REVIEW)),
  required("benefits", Object(BENEFITS)),
  required("emergency_contact", Object(EMERGENCY_CONTACT)),
  required("notes", Text),
];

/// Case-insensitive; leading dots and `..` are rejected separately
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)^[a-z0-9_'+\-.]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$")
    .expect("email pattern is valid")
});

/// Validate one untyped value as an employee record
pub fn validate_employee(value: &Value) -> Result<EmployeeRecord, ValidationError> {
  validate_employee_at(value, "")
}

/// Validate with every reported path prefixed by `base` (e.g. `[3]` for array items)
pub fn validate_employee_at(value: &Value, base: &str) -> Result<EmployeeRecord, ValidationError> {
  let normalized = check_object(value, EMPLOYEE_FIELDS, base)?;
  serde_json::from_value(normalized)
    .map_err(|e| ValidationError::Mismatch { path: base.to_string(), reason: e.to_string() })
}

/// Instructions that tell a text generator the exact output contract
pub fn format_instructions() -> String {
  let schema = schema_for!(Vec<EmployeeRecord>);
  let schema_json = serde_json::to_string_pretty(&schema).unwrap_or_default();

  format!(
    "Respond with a single JSON array and nothing else. Every element must be an employee \
     record that validates against the JSON Schema below.\n\
     - Every property is required unless the schema allows null; use null for a missing reporting_manager.\n\
     - Dates are strings in YYYY-MM-DD form.\n\
     - Numbers are JSON numbers, booleans are true or false, never strings.\n\
     - Do not add comments or trailing commas.\n\n\
     ```json\n{schema_json}\n```"
  )
}

fn check_object(value: &Value, fields: &[Field], base: &str) -> Result<Value, ValidationError> {
  let object = value.as_object().ok_or_else(|| wrong_type(base, "object", value))?;
  let mut normalized = Map::with_capacity(fields.len());

  for field in fields {
    let path = field_path(base, field.name);
    let checked = match object.get(field.name) {
      None | Some(Value::Null) if field.presence == Presence::Nullable => Value::Null,
      None => return Err(ValidationError::Missing { path }),
      Some(Value::Null) => return Err(ValidationError::UnexpectedNull { path }),
      Some(inner) => check_value(inner, field.kind, &path)?,
    };
    normalized.insert(field.name.to_string(), checked);
  }

  Ok(Value::Object(normalized))
}

fn check_value(value: &Value, kind: FieldKind, path: &str) -> Result<Value, ValidationError> {
  match kind {
    Text => expect_str(value, path).map(|s| Value::String(s.to_string())),
    Email => {
      let email = expect_str(value, path)?;
      if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail { path: path.to_string(), value: email.into() });
      }
      Ok(Value::String(email.to_string()))
    }
    Date => {
      let raw = expect_str(value, path)?;
      let date = parse_date(raw)
        .ok_or_else(|| ValidationError::InvalidDate { path: path.to_string(), value: raw.into() })?;
      Ok(Value::String(date.format("%Y-%m-%d").to_string()))
    }
    Number if value.is_number() => Ok(value.clone()),
    Number => Err(wrong_type(path, "number", value)),
    Flag if value.is_boolean() => Ok(value.clone()),
    Flag => Err(wrong_type(path, "boolean", value)),
    TextList => {
      let items = expect_array(value, path)?;
      items
        .iter()
        .enumerate()
        .map(|(i, item)| check_value(item, Text, &index_path(path, i)))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
    }
    Object(fields) => check_object(value, fields, path),
    ObjectList(fields) => {
      let items = expect_array(value, path)?;
      items
        .iter()
        .enumerate()
        .map(|(i, item)| check_object(item, fields, &index_path(path, i)))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
    }
  }
}

fn expect_str<'a>(value: &'a Value, path: &str) -> Result<&'a str, ValidationError> {
  value.as_str().ok_or_else(|| wrong_type(path, "string", value))
}

fn expect_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, ValidationError> {
  value.as_array().ok_or_else(|| wrong_type(path, "array", value))
}

fn wrong_type(path: &str, expected: &'static str, found: &Value) -> ValidationError {
  ValidationError::WrongType { path: path.to_string(), expected, found: json_kind(found) }
}

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}

fn field_path(base: &str, name: &str) -> String {
  if base.is_empty() {
    name.to_string()
  } else {
    format!("{base}.{name}")
  }
}

fn index_path(base: &str, index: usize) -> String {
  format!("{base}[{index}]")
}

pub fn is_valid_email(candidate: &str) -> bool {
  !candidate.starts_with('.') && !candidate.contains("..") && EMAIL_PATTERN.is_match(candidate)
}

/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (converted to UTC), and offset-less timestamps
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
  let raw = raw.trim();
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc).date_naive()))
    .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok().map(|dt| dt.date()))
}
