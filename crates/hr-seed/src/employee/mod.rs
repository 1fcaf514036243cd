//! Employee records
//!
//! `EmployeeRecord` is the only domain entity. Records arrive as untyped JSON
//! from the completion service, pass through [`contract::validate_employee`],
//! and are projected into searchable text by [`summary::render_summary`].

pub mod contract;
pub mod summary;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use contract::{format_instructions, validate_employee, ValidationError};
pub use summary::render_summary;

/// One synthetic employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EmployeeRecord {
  /// Unique employee identifier, e.g. "E001"
  pub employee_id: String,
  pub first_name: String,
  pub last_name: String,
  /// ISO-8601 calendar date (YYYY-MM-DD)
  pub date_of_birth: NaiveDate,
  pub address: Address,
  pub contact_details: ContactDetails,
  pub job_details: JobDetails,
  pub work_location: WorkLocation,
  /// Name of the reporting manager, or null when there is none
  #[serde(default)]
  pub reporting_manager: Option<String>,
  pub skills: Vec<String>,
  pub performance_review: Vec<PerformanceReview>,
  pub benefits: Benefits,
  pub emergency_contact: EmergencyContact,
  pub notes: String,
}

impl EmployeeRecord {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Address {
  pub street: String,
  pub city: String,
  pub state: String,
  pub postal_code: String,
  pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContactDetails {
  #[schemars(email)]
  pub email: String,
  pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JobDetails {
  pub job_title: String,
  pub department: String,
  pub manager: String,
  /// ISO-8601 calendar date (YYYY-MM-DD)
  pub hire_date: NaiveDate,
  pub salary: f64,
  /// ISO-4217 currency code, e.g. "USD"
  pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WorkLocation {
  pub nearest_office: String,
  pub is_remote: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PerformanceReview {
  /// ISO-8601 calendar date (YYYY-MM-DD)
  pub review_date: NaiveDate,
  pub rating: f64,
  pub comments: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Benefits {
  pub health_insurance: String,
  pub retirement_plan: String,
  pub paid_time_off: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EmergencyContact {
  pub name: String,
  pub relationship: String,
  pub phone_number: String,
}
