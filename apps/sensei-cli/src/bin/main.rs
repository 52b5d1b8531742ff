use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

use sensei_core::config::{Config, Settings};
use sensei_core::types::AskRequest;
use sensei_embed::build_provider;
use sensei_rag::RagService;
use sensei_vector::{ingest, open_collection, IngestOptions};

#[derive(Parser)]
#[command(name = "sensei", version, about = "Study-question answering over a DSA notes corpus")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chunk, embed and store the corpus
    Ingest {
        /// Corpus directory (defaults to corpus.root)
        #[arg(long)]
        corpus: Option<PathBuf>,
        #[arg(long)]
        max_chunks: Option<usize>,
        #[arg(long)]
        batch_size: Option<usize>,
        /// Pause between embedding batches
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Delete existing points first
        #[arg(long)]
        rebuild: bool,
    },
    /// Answer a question and print the response as JSON
    Ask {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        k: Option<usize>,
        question: String,
    },
    /// Show provider, collection and point count
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    sensei_core::telemetry::init();
    let cli = Cli::parse();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let mut settings = config.settings()?;
    let result = run(cli.command, config.env_name(), &mut settings).await;
    if let Err(e) = &result {
        error!(error = %format!("{e:#}"), "command failed");
    }
    result
}

async fn run(command: Command, env_name: &str, settings: &mut Settings) -> Result<()> {
    match command {
        Command::Ingest { corpus, max_chunks, batch_size, delay_ms, rebuild } => {
            if let Some(dir) = corpus { settings.corpus.root = dir.to_string_lossy().to_string(); }
            if max_chunks.is_some() { settings.ingest.max_chunks = max_chunks; }
            if let Some(n) = batch_size { settings.ingest.batch_size = n; }
            if delay_ms.is_some() { settings.ingest.batch_delay_ms = delay_ms; }
            settings.validate()?;

            let root = settings.corpus.root_path();
            println!("📚 Ingesting from {}", root.display());
            let provider = build_provider(&settings.embedding)?;
            let collection = open_collection(&settings.vector, provider.as_ref()).await?;
            let opts = IngestOptions { rebuild, ..IngestOptions::from(&settings.ingest) };
            if rebuild { println!("🧹 Clearing collection {}", collection.name()); }
            let written = ingest(&root, &collection, provider.as_ref(), &opts).await?;
            println!("✅ Ingested {} chunks into {} ({} points total)", written, collection.name(), collection.count().await?);
        }
        Command::Ask { user_id, k, question } => {
            let service = RagService::connect(settings).await?;
            let response = match k {
                Some(k) => service.answer(&user_id, &question, k).await,
                None => service.ask(&AskRequest { user_id, question }).await,
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Status => {
            let provider = build_provider(&settings.embedding)?;
            let collection = open_collection(&settings.vector, provider.as_ref()).await?;
            println!("Env:        {}", env_name);
            println!("Provider:   {} ({})", provider.embedder_id(), settings.embedding.provider);
            println!("Dimension:  {}", provider.dim());
            println!("Collection: {} @ {}", collection.name(), settings.vector.uri_path());
            println!("Points:     {}", collection.count().await?);
            println!("Corpus:     {}", settings.corpus.root_path().display());
        }
    }
    Ok(())
}
