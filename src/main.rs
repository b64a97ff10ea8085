use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lukyasha_tracker::api::{build_router, state::AppState};
use lukyasha_tracker::calculate::StandingsEngine;
use lukyasha_tracker::config::AppConfig;
use lukyasha_tracker::models::{EventId, EventTable};
use lukyasha_tracker::storage::{SqliteStore, TournamentStore};

#[derive(Parser)]
#[command(name = "lukyasha-tracker")]
#[command(about = "Tournament tracker with league standings and leaderboards")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides the config file)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Create the database schema and exit
    InitDb,

    /// Print an event's standings and leaderboards
    Standings {
        /// Event id
        #[arg(long)]
        event: EventId,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    config.validate()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with((!cli.json_logs).then(|| tracing_subscriber::fmt::layer()))
        .with(cli.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .init();

    tracing::info!("Starting lukyasha-tracker v{}", env!("CARGO_PKG_VERSION"));

    let store = SqliteStore::connect(&config.storage_config())
        .await
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let store: Arc<dyn TournamentStore> = Arc::new(store);
            let app = build_router(AppState::from_config(store, &config));
            let addr = config.server.bind_addr();
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::InitDb => {
            // connecting already created the schema
            println!("Database ready at {}", config.database_path.display());
        }
        Commands::Standings { event, json } => {
            let engine = StandingsEngine::new(Arc::new(store));
            let table = engine.event_table(event).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                print_table(&table);
            }
        }
    }

    Ok(())
}

fn print_table(table: &EventTable) {
    println!(
        "{:<4} {:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>5} {:>4}",
        "#", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"
    );
    for (i, row) in table.standings.iter().enumerate() {
        println!(
            "{:<4} {:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>+5} {:>4}",
            i + 1,
            row.team.name,
            row.played,
            row.wins,
            row.draws,
            row.losses,
            row.goals_for,
            row.goals_against,
            row.goal_difference,
            row.points
        );
    }

    for (title, board) in [
        ("Top scorers", &table.top_scorers),
        ("Top assists", &table.top_assists),
    ] {
        println!("\n=== {} ===", title);
        if board.is_empty() {
            println!("  (none)");
        }
        for entry in board {
            println!("  {:<24} {:<24} {:>3}", entry.player, entry.team, entry.count);
        }
    }
}
