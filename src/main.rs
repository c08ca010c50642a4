//! App Core Engine CLI - serve the GraphQL facade and manage its database

use clap::{Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use app_core_engine::config::{self, EngineConfig};
use app_core_engine::graphql::{self, SchemaCache};
use app_core_engine::server::{self, AppState};
use app_core_engine::storage::SqliteStore;
use app_core_engine::ui::{self, Icons};
use app_core_engine::Engine;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "app-core-engine")]
#[command(version)]
#[command(about = "GraphQL facade over apps, app configs and conversation threads")]
#[command(long_about = r#"
App Core Engine stores installed apps, their per-platform configuration and
the conversation threads opened through them, and serves them over GraphQL.

Example usage:
  app-core-engine init
  app-core-engine serve --port 4000
  app-core-engine stats
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the GraphQL endpoint
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind
        #[arg(short, long)]
        bind: Option<IpAddr>,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Write a default config and create the tables
    Init {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Show row counts of every table
    Stats {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Print the GraphQL schema
    Schema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut settings = config::load_config(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Serve { port, bind, database } => {
            if let Some(port) = port {
                settings.port = port;
            }
            if let Some(bind) = bind {
                settings.bind = bind;
            }
            if let Some(database) = database {
                settings.database = database;
            }
            serve(settings).await
        }
        Commands::Init { database, force } => {
            if let Some(database) = database {
                settings.database = database;
            }
            let path = cli.config.unwrap_or_else(config::default_config_path);
            init(&path, &settings, force)
        }
        Commands::Stats { database } => {
            if let Some(database) = database {
                settings.database = database;
            }
            stats(&settings)
        }
        Commands::Schema => {
            println!("{}", graphql::sdl()?);
            Ok(())
        }
    };

    if let Err(err) = result {
        ui::error(&format!("{:#}", err));
        std::process::exit(1);
    }
    Ok(())
}

fn open_store(settings: &EngineConfig) -> anyhow::Result<SqliteStore> {
    config::ensure_db_dir(&settings.database)?;
    let store = SqliteStore::open(&settings.database)?;
    Ok(store)
}

async fn serve(settings: EngineConfig) -> anyhow::Result<()> {
    let store = open_store(&settings)?;
    let engine = Engine::new(Arc::new(store))
        .with_retry(settings.retry)
        .with_page_size(settings.default_page_size);

    ui::header("App Core Engine");
    ui::info("Database", &settings.database.display().to_string());
    ui::info("Endpoint", &format!("{}:{}/graphql", settings.bind, settings.port));

    let state = AppState::new(Arc::new(engine), Arc::new(SchemaCache::new()));
    server::start_server(settings.bind, settings.port, state).await
}

fn init(path: &std::path::Path, settings: &EngineConfig, force: bool) -> anyhow::Result<()> {
    config::write_config(path, settings, force)?;
    ui::success(&format!("Wrote {}", path.display()));

    let store = open_store(settings)?;
    ui::info(
        &format!("{} Tables ready", Icons::DATABASE),
        &settings.database.display().to_string(),
    );
    ui::summary_row("Rows:", &store.stats()?.total().to_string());
    Ok(())
}

fn stats(settings: &EngineConfig) -> anyhow::Result<()> {
    let store = open_store(settings)?;
    let stats = store.stats()?;

    ui::section(&format!("{} Statistics ({})", Icons::STATS, settings.database.display()));
    println!("{}", ui::stats_table(&stats));
    Ok(())
}
