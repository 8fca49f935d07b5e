//! add-type-field - assign `type = "topic"` to legacy topics
//!
//! Usage:
//!   add-type-field [DB_URL]
//!   add-type-field --env-file ../.env
//!   add-type-field --log-level debug
//!
//! Without an argument the connection string is read from DB_URL / MONGO_URL
//! in the env file, then from the process environment. DB_NAME selects the
//! database (default: opo).

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use opo_backfill::{execute, write_config_help, ConfigSources, Report, Settings};
use opo_mongodb::{Connection, MongoTopicStore, PoolConfig};

#[derive(Parser)]
#[command(name = "add-type-field")]
#[command(about = "Backfill the 'type' field on topics that lack it", long_about = None)]
#[command(version)]
struct Cli {
    /// MongoDB connection string (overrides DB_URL / MONGO_URL)
    db_url: Option<String>,

    /// Env file searched for DB_URL / MONGO_URL
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let sources = ConfigSources::from_process(cli.db_url, cli.env_file);
    let mut report = Report::new(io::stdout());

    match execute(&sources, connect_mongodb, &mut report).await {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(err) if err.is_config() => {
            eprintln!("❌ Error: {}", err);
            write_config_help(&mut io::stdout()).context("Failed to print usage help")?;
            Ok(ExitCode::FAILURE)
        }
        Err(err) => {
            eprintln!("❌ Error: {}", err);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn connect_mongodb(settings: Settings) -> opo_common::Result<MongoTopicStore> {
    let connection = Connection::connect(
        &settings.db_url,
        &settings.database_name,
        PoolConfig::default(),
    )
    .await?;
    Ok(MongoTopicStore::with_collection(
        connection,
        settings.collection_name,
    ))
}

/// Initialize logging based on log level
fn init_logging(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .try_init()
        .ok(); // Ignore error if already initialized

    Ok(())
}
