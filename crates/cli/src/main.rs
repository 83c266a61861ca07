use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use regdesk_core::Config;
use regdesk_service::RegistrationDesk;
use regdesk_storage::{BlobStore, KeyValueStore, SqliteStore};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "regdesk")]
#[command(about = "Local registration desk with draft recovery and edit sessions", long_about = None)]
struct Cli {
    /// Data directory (overrides REGDESK_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in and submit the form; resumes an active edit session
    Register {
        /// Form field, e.g. `--set countryCode=RO`
        #[arg(short, long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
        /// Photo files; the one read last is attached
        #[arg(short, long)]
        photo: Vec<PathBuf>,
    },
    /// Show the form as it would open, or edit it and let autosave keep it
    Draft {
        #[arg(short, long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },
    /// Drop every edit session and the draft
    New,
    /// Show the active edit session
    Session,
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    Show {
        id: String,
    },
    Remove {
        id: String,
    },
    Stats,
    /// Candidate markers by country (needs REGDESK_GEO_API_URL)
    Map,
}

pub(crate) fn ensure_data_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create data directory {}", dir.display()))
}

pub(crate) fn open_desk(config: &Config) -> Result<Arc<RegistrationDesk>> {
    ensure_data_dir(&config.data_dir)?;
    let store = Arc::new(SqliteStore::open(&config.db_path(), config.db_pool_size)?);
    let kv: Arc<dyn KeyValueStore> = store.clone();
    let blobs: Arc<dyn BlobStore> = store;
    Ok(Arc::new(RegistrationDesk::new(kv, blobs, config)))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let desk = open_desk(&config)?;

    match cli.command {
        Commands::Register { set, photo } => commands::form::run_register(desk, &set, photo).await,
        Commands::Draft { set } => commands::form::run_draft(desk, &set, config.draft_debounce).await,
        Commands::New => commands::form::run_new(desk).await,
        Commands::Session => commands::form::run_session(&desk),
        Commands::List { search } => commands::dashboard::run_list(&desk, search.as_deref()),
        Commands::Show { id } => commands::dashboard::run_show(&desk, &id).await,
        Commands::Remove { id } => commands::dashboard::run_remove(&desk, &id).await,
        Commands::Stats => commands::dashboard::run_stats(&desk),
        Commands::Map => commands::dashboard::run_map(&desk, config.geo_api_url.as_deref()).await,
    }
}
