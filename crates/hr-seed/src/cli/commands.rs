use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use bentley::journal::{JournalContext, RunJournal};
use colored::*;

use crate::cli::display::{display_report, display_search_hit, format_journal_entry};
use crate::config::{OpenAiArgs, StoreArgs};
use crate::employee::contract::format_instructions;
use crate::employee::render_summary;
use crate::generator::{parse_generation, RecordGenerator};
use crate::pipeline::{self, Indexer, SeedError, SeedOptions};
use crate::services::atlas::AtlasStore;
use crate::services::completion::OpenAiChat;
use crate::services::document_store::DocumentStore;
use crate::services::embeddings::{Embedder, OpenAiEmbeddings};

const JOURNAL_COMPONENT: &str = "seed";

/// Where `--journal` writes when no path is given
pub fn default_journal_path() -> PathBuf {
  dirs::data_local_dir()
    .unwrap_or_else(std::env::temp_dir)
    .join("hr-seed")
    .join("seed-runs.jsonl")
}

/// Generate, embed and store a batch of synthetic employees
pub async fn seed(
  openai: &OpenAiArgs,
  store: &StoreArgs,
  count: usize,
  options: SeedOptions,
  journal_path: Option<PathBuf>,
) -> Result<()> {
  if count == 0 {
    return Err(anyhow!("--count must be at least 1"));
  }

  let generation = openai.generation()?;
  let embeddings = openai.embeddings()?;
  let store_settings = store.settings(embeddings.dimensions)?;

  let chat = OpenAiChat::from_settings(&generation)?;
  let embedder = OpenAiEmbeddings::from_settings(&embeddings)?;
  let journal = journal_path
    .map(|path| RunJournal::open(&path).with_context(|| format!("failed to open run journal at {}", path.display())))
    .transpose()?;

  bentley::announce!("Seeding {} employees into {}.{}", count, store_settings.database, store_settings.collection);
  let atlas = AtlasStore::connect(&store_settings).await.map_err(SeedError::Connection)?;

  let generator = RecordGenerator::new(&chat, count);
  let indexer = Indexer::new(&embedder, &atlas).with_journal(journal.as_ref());
  let run_id = indexer.run_id().to_string();

  if let Some(journal) = &journal {
    let message = format!("run started: {count} records requested");
    journal.info(&message, JOURNAL_COMPONENT, JournalContext::for_run(&run_id)).await;
  }
  tracing::info!(%run_id, count, clear = options.clear, create_index = options.create_index, "seed run started");

  let outcome = pipeline::seed(&generator, &indexer, &atlas, options).await;
  atlas.close().await;

  match outcome {
    Ok(report) => {
      if let Some(journal) = &journal {
        let message = format!("run finished: {} indexed, {} skipped", report.indexed.len(), report.skipped.len());
        journal.success(&message, JOURNAL_COMPONENT, JournalContext::for_run(&run_id)).await;
        bentley::debug!("Run journal written to {}", journal.path().await.display());
      }
      display_report(&report);
      Ok(())
    }
    Err(error) => {
      if let Some(journal) = &journal {
        journal.error(&format!("run failed: {error}"), JOURNAL_COMPONENT, JournalContext::for_run(&run_id)).await;
      }
      if let SeedError::ConnectionLost { report, .. } = &error {
        display_report(report);
      }
      Err(error.into())
    }
  }
}

/// Embed a free-text query and list the closest stored employees
pub async fn search(openai: &OpenAiArgs, store: &StoreArgs, terms: &[String], limit: usize, full: bool) -> Result<()> {
  let query = terms.join(" ");
  if query.trim().is_empty() {
    return Err(anyhow!("search query is empty"));
  }

  let embeddings = openai.embeddings()?;
  let store_settings = store.settings(embeddings.dimensions)?;
  let embedder = OpenAiEmbeddings::from_settings(&embeddings)?;

  let vector = embedder.embed(&query).await.context("failed to embed the search query")?;

  let atlas = AtlasStore::connect(&store_settings).await.map_err(SeedError::Connection)?;
  let outcome = atlas.search(&vector, limit).await;
  atlas.close().await;
  let hits = outcome.context("vector search failed")?;

  if hits.is_empty() {
    println!("No matching employees. Is the vector index '{}' built?", store_settings.index_name);
    return Ok(());
  }

  println!("{} {}\n", "Results for".dimmed(), query.bold());
  for (rank, hit) in hits.iter().enumerate() {
    display_search_hit(rank + 1, hit, full);
  }
  Ok(())
}

/// Validate a JSON file of records and print the summary each would be indexed with
pub fn render(path: &Path) -> Result<()> {
  let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  let records = parse_generation(&text).with_context(|| format!("{} does not hold valid employee records", path.display()))?;

  for (i, record) in records.iter().enumerate() {
    if i > 0 {
      println!();
    }
    println!("{}", format!("=== {} ({}) ===", record.employee_id, record.full_name()).blue().bold());
    println!("{}", render_summary(record));
  }
  Ok(())
}

/// Print the format instructions sent to the generator
pub fn schema() -> Result<()> {
  println!("{}", format_instructions());
  Ok(())
}

/// Show recent entries from a run journal
pub async fn journal(path: Option<PathBuf>, limit: usize, level: &str) -> Result<()> {
  let path = path.unwrap_or_else(default_journal_path);
  if !path.exists() {
    println!("No journal found at {}", path.display());
    return Ok(());
  }

  let journal = RunJournal::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
  let entries = journal.entries(Some(limit), Some(level)).await?;

  if entries.is_empty() {
    println!("No journal entries found.");
    return Ok(());
  }

  for entry in &entries {
    println!("{}", format_journal_entry(entry));
  }
  Ok(())
}
