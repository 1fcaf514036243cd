use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hr_seed::cli::commands;
use hr_seed::config::{OpenAiArgs, StoreArgs};
use hr_seed::generator::DEFAULT_RECORD_COUNT;
use hr_seed::pipeline::SeedOptions;

#[derive(Parser)]
#[command(name = "hr-seed")]
#[command(about = "Seed a vector-searchable HR collection with synthetic employees")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CARGO_PKG_NAME"), ")"))]
struct Cli {
  /// Log progress from every layer, not just this tool
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Generate records, embed their summaries and store them
  Seed {
    /// Number of records to request from the generator
    #[arg(short, long, default_value_t = DEFAULT_RECORD_COUNT)]
    count: usize,
    /// Delete existing documents in the collection first
    #[arg(long)]
    clear: bool,
    /// Create the vector search index after indexing if it is missing
    #[arg(long)]
    create_index: bool,
    /// Append a JSONL run journal (default location when no path is given)
    #[arg(long, value_name = "PATH")]
    journal: Option<Option<PathBuf>>,
    #[command(flatten)]
    openai: OpenAiArgs,
    #[command(flatten)]
    store: StoreArgs,
  },
  /// Find stored employees similar to a free-text query
  Search {
    /// Query text
    #[arg(required = true)]
    terms: Vec<String>,
    /// Maximum number of results
    #[arg(short, long, default_value = "5")]
    limit: usize,
    /// Print whole summaries instead of a preview
    #[arg(long)]
    full: bool,
    #[command(flatten)]
    openai: OpenAiArgs,
    #[command(flatten)]
    store: StoreArgs,
  },
  /// Validate a JSON file of records and print their summaries
  Render {
    path: PathBuf,
  },
  /// Print the record format instructions given to the generator
  Schema,
  /// Show recent run journal entries
  Journal {
    /// Journal file (defaults to the seed command's default location)
    #[arg(long, value_name = "PATH")]
    path: Option<PathBuf>,
    /// Maximum number of entries to show
    #[arg(short, long, default_value = "50")]
    limit: usize,
    /// Filter by level (info, warn, error, success, all)
    #[arg(long, default_value = "all")]
    level: String,
  },
}

fn init_tracing(verbose: bool) {
  let fallback = if verbose { "hr_seed=debug,mongodb=info,info" } else { "hr_seed=info,mongodb=warn,warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

  tracing_subscriber::registry()
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
    .with(filter)
    .init();
}

async fn handle(command: Command) -> Result<()> {
  match command {
    Command::Seed { count, clear, create_index, journal, openai, store } => {
      let journal = journal.map(|path| path.unwrap_or_else(commands::default_journal_path));
      commands::seed(&openai, &store, count, SeedOptions { clear, create_index }, journal).await
    }
    Command::Search { terms, limit, full, openai, store } => {
      commands::search(&openai, &store, &terms, limit, full).await
    }
    Command::Render { path } => commands::render(&path),
    Command::Schema => commands::schema(),
    Command::Journal { path, limit, level } => commands::journal(path, limit, &level).await,
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  dotenvy::dotenv().ok();
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  if let Err(error) = handle(cli.command).await {
    bentley::error!("{error:#}");
    std::process::exit(1);
  }
  Ok(())
}
