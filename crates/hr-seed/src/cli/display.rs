//! Terminal formatting for command output

use bentley::journal::JournalEntry;
use colored::*;

use crate::pipeline::IndexReport;
use crate::services::document_store::SearchHit;

/// Wrap text to fit within a width, keeping blank lines between paragraphs
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();

  for paragraph in text.split('\n') {
    if paragraph.trim().is_empty() {
      lines.push(String::new());
      continue;
    }

    let mut current = String::new();
    for word in paragraph.split_whitespace() {
      if current.is_empty() {
        current = word.to_string();
      } else if current.len() + 1 + word.len() <= width {
        current.push(' ');
        current.push_str(word);
      } else {
        lines.push(std::mem::take(&mut current));
        current = word.to_string();
      }
    }

    if !current.is_empty() {
      lines.push(current);
    }
  }

  lines
}

/// First `max_lines` lines of a summary, with a marker when something was cut
pub fn preview(summary: &str, max_lines: usize) -> String {
  let lines: Vec<&str> = summary.lines().collect();
  if lines.len() <= max_lines {
    return summary.to_string();
  }
  format!("{}\n… ({} more lines)", lines[..max_lines].join("\n"), lines.len() - max_lines)
}

pub fn display_report(report: &IndexReport) {
  if report.skipped.is_empty() {
    bentley::flourish!("Database seeding completed: {} records indexed", report.indexed.len());
    return;
  }

  bentley::warn!(
    "Database seeding completed: {} indexed, {} skipped",
    report.indexed.len(),
    report.skipped.len()
  );
  for failure in &report.skipped {
    println!("  {} {} ({}): {}", "✗".red(), failure.employee_id.yellow(), failure.stage, failure.reason);
  }
}

pub fn display_search_hit(rank: usize, hit: &SearchHit, full: bool) {
  println!(
    "{} {} {} {}",
    format!("#{rank}").bold(),
    hit.employee_id.cyan(),
    hit.name.yellow().bold(),
    format!("(score {:.4})", hit.score).dimmed()
  );

  let body = if full { hit.summary.clone() } else { preview(&hit.summary, 4) };
  for line in wrap_text(&body, 80) {
    println!("  {line}");
  }
  println!();
}

pub fn format_journal_entry(entry: &JournalEntry) -> String {
  let level = match entry.level.as_str() {
    "error" => entry.level.red().bold(),
    "warn" => entry.level.yellow().bold(),
    "info" => entry.level.blue().bold(),
    "success" => entry.level.bright_green().bold(),
    _ => entry.level.normal(),
  };

  let mut line = format!(
    "{} [{}] {}",
    entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().cyan(),
    level,
    entry.message
  );

  if let Some(context) = &entry.context {
    let mut parts = Vec::new();
    if let Some(run_id) = &context.run_id {
      parts.push(format!("run: {}", run_id.bright_blue()));
    }
    if let Some(employee_id) = &context.employee_id {
      parts.push(format!("employee: {}", employee_id.yellow()));
    }
    if let Some(stage) = &context.stage {
      parts.push(format!("stage: {}", stage.magenta()));
    }
    if !parts.is_empty() {
      line.push_str(&format!("\n    {}", parts.join(", ")));
    }
  }

  line
}

#[cfg(test)]
mod tests {
  use super::*;
  use bentley::journal::JournalContext;
  use chrono::{TimeZone, Utc};

  #[test]
  fn test_wrap_text_respects_width() {
    let lines = wrap_text("Skills: Rust, Kafka, PostgreSQL, Terraform", 20);
    assert!(lines.iter().all(|line| line.len() <= 20));
    assert_eq!(lines.join(" "), "Skills: Rust, Kafka, PostgreSQL, Terraform");
  }

  #[test]
  fn test_wrap_text_keeps_blank_lines() {
    let lines = wrap_text("Notes: a\n\nSkills: b", 80);
    assert_eq!(lines, vec!["Notes: a", "", "Skills: b"]);
  }

  #[test]
  fn test_preview_short_summary_is_unchanged() {
    assert_eq!(preview("one\ntwo", 4), "one\ntwo");
  }

  #[test]
  fn test_preview_counts_hidden_lines() {
    let text = "a\nb\nc\nd\ne\nf";
    let shown = preview(text, 4);
    assert!(shown.starts_with("a\nb\nc\nd\n"));
    assert!(shown.ends_with("(2 more lines)"));
  }

  #[test]
  fn test_journal_entry_includes_context() {
    colored::control::set_override(false);
    let entry = JournalEntry {
      timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
      level: "error".to_string(),
      message: "record skipped: timeout".to_string(),
      component: "seed".to_string(),
      context: Some(JournalContext::for_run("run-1").with_employee("E002").with_stage("embedding")),
    };

    let line = format_journal_entry(&entry);
    assert!(line.starts_with("2024-03-01 09:30:00 [error] record skipped: timeout"));
    assert!(line.contains("run: run-1, employee: E002, stage: embedding"));
  }
}
