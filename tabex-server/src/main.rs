//! tabex export server
//!
//! Serves CSV report exports over HTTP, backed by a SQLite record store.
//!
//! Usage:
//!   tabex-server --port 5000 --database tabex.db
//!   tabex-server import --collection products --file products.json

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tabex_export::FileSink;
use tabex_model::Record;
use tabex_server::{AppState, build_router};
use tabex_store::{RecordStore, SqliteRecordStore};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "tabex-server")]
#[command(about = "On-demand CSV report exports")]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, env = "TABEX_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// HTTP port
    #[arg(short, long, env = "TABEX_PORT", default_value = "5000")]
    port: u16,

    /// Path to the SQLite record store
    #[arg(short, long, env = "TABEX_DATABASE", default_value = "tabex.db")]
    database: PathBuf,

    /// Directory stored reports are written to and served from
    #[arg(long, env = "TABEX_REPORTS_DIR", default_value = "tmp/reports")]
    reports_dir: PathBuf,

    /// Public origin for report URLs, e.g. https://reports.example.com
    #[arg(long, env = "TABEX_PUBLIC_URL")]
    public_url: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long, env = "TABEX_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a JSON array of records into a collection
    Import {
        /// Target collection, e.g. products or bookings
        #[arg(short, long)]
        collection: String,

        /// JSON file holding an array of objects
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let store = Arc::new(SqliteRecordStore::new(&args.database));

    match args.command.take() {
        Some(Command::Import { collection, file }) => import(&store, &collection, &file),
        None => serve(args, store).await,
    }
}

async fn serve(args: Args, store: Arc<SqliteRecordStore>) -> Result<()> {
    info!("tabex server starting...");
    if let Err(e) = store.connect() {
        warn!("Record store not ready, will retry per request: {}", e);
    }

    let sink = FileSink::new(&args.reports_dir);
    let mut state = AppState::new(store, sink);
    if let Some(url) = &args.public_url {
        state = state.with_public_url(url);
    }
    let app = build_router(Arc::new(state));

    let addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on {}", addr);
    info!("Reports directory: {:?}", args.reports_dir);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn import(store: &SqliteRecordStore, collection: &str, file: &Path) -> Result<()> {
    let text = fs::read_to_string(file).with_context(|| format!("Failed to read {file:?}"))?;
    let value: Value = serde_json::from_str(&text).context("Failed to parse import file")?;
    let Value::Array(items) = value else {
        bail!("Import file must hold a JSON array");
    };
    let records = items
        .into_iter()
        .map(Record::from_value)
        .collect::<Result<Vec<_>, _>>()
        .context("Every imported item must be a JSON object")?;
    let count = store
        .insert_many(collection, &records)
        .context("Failed to store imported records")?;
    info!("Imported {} records into {}", count, collection);
    Ok(())
}
