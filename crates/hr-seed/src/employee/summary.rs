//! Searchable text for an employee record
//!
//! The summary is what gets embedded, so its labels and section order are part
//! of the stored data format: changing them makes new documents score
//! differently from ones already in the collection.

use chrono::{NaiveDate, NaiveTime};

use super::{EmployeeRecord, PerformanceReview};

/// Render the summary for one record. Sections are separated by a blank line.
pub fn render_summary(employee: &EmployeeRecord) -> String {
  [
    identity_section(employee),
    job_section(employee),
    format!("Skills: {}", employee.skills.join(", ")),
    reviews_section(&employee.performance_review),
    work_location_section(employee),
    benefits_section(employee),
    emergency_contact_section(employee),
    format!("Notes: {}", employee.notes),
  ]
  .join("\n\n")
}

/// Dates are rendered as midnight UTC timestamps, e.g. `2024-01-01T00:00:00.000Z`
pub fn iso_timestamp(date: NaiveDate) -> String {
  date.and_time(NaiveTime::MIN).and_utc().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn identity_section(employee: &EmployeeRecord) -> String {
  let address = &employee.address;
  let contact = &employee.contact_details;
  [
    format!("Employee ID: {}", employee.employee_id),
    format!("Name: {}", employee.full_name()),
    format!("Date of Birth: {}", iso_timestamp(employee.date_of_birth)),
    format!(
      "Address: {}, {}, {} {}, {}",
      address.street, address.city, address.state, address.postal_code, address.country
    ),
    format!("Email: {}", contact.email),
    format!("Phone: {}", contact.phone_number),
  ]
  .join("\n")
}

fn job_section(employee: &EmployeeRecord) -> String {
  let job = &employee.job_details;
  let reporting = match &employee.reporting_manager {
    Some(manager) => format!(" and reports to {manager}"),
    None => String::new(),
  };
  format!(
    "Job Details: {} in the {} department, managed by {}{}. Hired on {} with a salary of {} {}.",
    job.job_title,
    job.department,
    job.manager,
    reporting,
    iso_timestamp(job.hire_date),
    job.salary,
    job.currency
  )
}

fn reviews_section(reviews: &[PerformanceReview]) -> String {
  if reviews.is_empty() {
    return "Performance Reviews:\nNone".to_string();
  }

  let entries: Vec<String> = reviews
    .iter()
    .map(|review| {
      format!(
        "Review Date: {}\nRating: {}\nComments: {}",
        iso_timestamp(review.review_date),
        review.rating,
        review.comments
      )
    })
    .collect();

  format!("Performance Reviews:\n{}", entries.join("\n\n"))
}

fn work_location_section(employee: &EmployeeRecord) -> String {
  let location = &employee.work_location;
  format!(
    "Work Location:\nNearest Office: {}\nRemote: {}",
    location.nearest_office,
    if location.is_remote { "Yes" } else { "No" }
  )
}

fn benefits_section(employee: &EmployeeRecord) -> String {
  let benefits = &employee.benefits;
  format!(
    "Benefits:\nHealth Insurance: {}\nRetirement Plan: {}\nPaid Time Off: {}",
    benefits.health_insurance, benefits.retirement_plan, benefits.paid_time_off
  )
}

fn emergency_contact_section(employee: &EmployeeRecord) -> String {
  let contact = &employee.emergency_contact;
  format!(
    "Emergency Contact:\nName: {}\nRelationship: {}\nPhone: {}",
    contact.name, contact.relationship, contact.phone_number
  )
}
