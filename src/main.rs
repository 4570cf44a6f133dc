// TubeLens - channel analytics console
// Analyze a YouTube channel's uploads, mine the titles for recurring phrases,
// and brainstorm content ideas with an AI provider.

mod analytics;
mod api;
mod app;
mod commands;
mod dispatch;
mod error;
mod ingest;
mod models;
mod store;
mod utils;

use std::env;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::commands::Outcome;
use crate::store::JsonFileStore;

#[derive(Parser, Debug)]
#[command(name = "tubelens", about = "YouTube channel analytics console")]
struct Args {
    /// Path of the JSON key/value store holding credentials and sessions
    #[arg(long, default_value = "tubelens_store.json")]
    store: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "tubelens=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    info!("Starting TubeLens (store: {})", args.store.display());

    // Build HTTP client shared by every API call
    let http_client = reqwest::Client::builder()
        .user_agent("TubeLens/1.0")
        .build()?;

    let store = JsonFileStore::new(&args.store);
    let mut app = App::new(http_client, Box::new(store))?;

    println!("TubeLens - type 'help' for commands.");

    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        if let Outcome::Quit = commands::dispatch(&mut app, &line).await {
            break;
        }
    }

    info!("Goodbye!");
    Ok(())
}
