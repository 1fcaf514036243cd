use bentley::*;

fn main() {
  announce("Seeding hr_database.employees");

  info("Generating 3 synthetic employee records");
  success("Successfully processed & saved record: E001");
  warn("Skipped E002 at embedding: upstream returned 429");
  success("Successfully processed & saved record: E003");

  info("Multi-line summaries keep their prefix\nEmployee ID: E001\nSkills: Go, SQL");

  flourish("Database seeding completed: 2 indexed, 1 skipped");
}
