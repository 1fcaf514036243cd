use bentley::*;

#[test]
fn test_basic_logging_functions() {
  info("Generating synthetic employee records");
  warn("Skipping record E002");
  error("Embedding request failed");
  debug("Summary rendered");
  success("Successfully processed & saved record: E001");
}

#[test]
fn test_multiline_messages() {
  let multiline = "Employee ID: E001\nName: Ada Lovelace\nSkills: Go, SQL";
  info(multiline);
  warn(multiline);
  success(multiline);
}

#[test]
fn test_macros_accept_format_arguments() {
  let id = "E003";
  let count = 2;
  bentley::info!("Indexing {count} records");
  bentley::success!("Successfully processed & saved record: {id}");
  bentley::warn!("Skipped {} of {}", 1, count);
  bentley::announce!("Seeding {}", "hr_database.employees");
  bentley::flourish!("Database seeding completed");
}
