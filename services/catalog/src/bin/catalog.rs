//! services/catalog/src/bin/catalog.rs

use catalog_lib::{
    adapters::{FreeDictionaryAdapter, SqliteWordStore},
    config::Config,
    error::CatalogError,
    WordCatalogService,
};
use clap::{Parser, Subcommand};
use sqlx::sqlite::SqlitePoolOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vocab_core::WordFilter;

#[derive(Parser)]
#[command(name = "catalog", about = "Personal vocabulary catalog")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import words from a CSV file.
    Import { file: PathBuf },
    /// Export the whole catalog to a CSV file.
    Export { file: PathBuf },
    /// Print a random word.
    Random,
    /// Look up the dictionary definition of a catalogued word.
    Define { id: i64 },
    /// Print the number of catalogued words.
    Stats,
}

#[tokio::main]
async fn main() -> Result<(), CatalogError> {
    let cli = Cli::parse();

    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded.");

    // --- 2. Connect to Database & Apply Schema ---
    info!("Connecting to database...");
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(SqliteWordStore::new(pool));
    store.apply_schema().await?;
    info!("Database schema ready.");

    // --- 3. Build the Service ---
    let dictionary = Arc::new(FreeDictionaryAdapter::new(
        &config.dictionary_url,
        config.dictionary_timeout,
    )?);
    let service = WordCatalogService::new(store, dictionary);

    // Ctrl-C cancels whatever is in flight.
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    // --- 4. Run the Command ---
    match cli.command {
        Command::Import { file } => {
            let input = tokio::fs::File::open(&file).await?;
            let result = service.import_csv(input, &cancel).await?;
            println!("imported: {}, skipped: {}", result.imported, result.skipped);
            for error in &result.errors {
                println!("  {}", error);
            }
        }
        Command::Export { file } => {
            let output = tokio::fs::File::create(&file).await?;
            service.export_csv(output, &cancel).await?;
            info!("Exported catalog to {}", file.display());
        }
        Command::Random => {
            let word = service.random(&cancel).await?;
            println!("{} ({}, learned {})", word.word, word.source, word.date_learned);
        }
        Command::Define { id } => {
            let definition = service.get_definition(id, &cancel).await?;
            let json = serde_json::to_string_pretty(&definition)
                .map_err(|e| CatalogError::Io(e.into()))?;
            println!("{}", json);
        }
        Command::Stats => {
            let total = service.count(&WordFilter::default(), &cancel).await?;
            println!("{} words catalogued", total);
        }
    }

    Ok(())
}
