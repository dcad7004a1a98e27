use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tenhou_stats::api::{build_router, state::AppState};
use tenhou_stats::config::AppConfig;
use tenhou_stats::models::{Category, Metrics, PlayerId};
use tenhou_stats::source;
use tenhou_stats::storage::IdentityFile;
use tenhou_stats::store::{SnapshotStore, StatsState};

#[derive(Parser)]
#[command(name = "tenhou-stats")]
#[command(about = "Tenhou mahjong statistics from parsed game logs")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

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
    /// Print the derived stats for the saved (or given) player
    Show {
        /// Select this player first. Like `set-id`, this replaces the saved
        /// identifier.
        #[arg(long)]
        id: Option<String>,

        /// Print JSON instead of cards
        #[arg(long)]
        json: bool,
    },

    /// Save the player identifier
    SetId {
        /// Tenhou player name
        id: String,
    },

    /// Forget the saved player identifier
    ClearId,

    /// Guess the local player from the available snapshots
    GuessId {
        /// Save the guess as the player identifier
        #[arg(long)]
        save: bool,
    },

    /// Start the API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn parse_id(raw: &str) -> Result<PlayerId> {
    match PlayerId::parse(raw) {
        Some(id) => Ok(id),
        None => bail!("Player identifier must not be blank"),
    }
}

fn print_cards(metrics: &Metrics) {
    for category in Category::ALL {
        println!("== {} ==", category);
        for card in metrics.category(category) {
            for (label, value) in card.iter() {
                println!("  {:<24} {}", label, value);
            }
            println!();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    init_tracing(&config.log_level, cli.json_logs);
    tracing::info!("Starting tenhou-stats v{}", env!("CARGO_PKG_VERSION"));

    let source = source::from_config(&config).context("Failed to set up snapshot source")?;
    let identity = IdentityFile::for_storage(&config.storage());

    match cli.command {
        Commands::Show { id, json } => {
            let store = SnapshotStore::open(source, identity).await?;
            if let Some(raw) = id {
                store.select(parse_id(&raw)?).await?;
            }

            match store.settled().await {
                StatsState::Absent => {
                    eprintln!("No player identifier set. Use `set-id <name>` or `guess-id --save`.");
                }
                StatsState::Failed { id, error } => {
                    bail!("Could not load stats for {}: {}", id, error);
                }
                StatsState::Ready { id, metrics, .. } => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&*metrics)?);
                    } else {
                        println!("Player: {}\n", id);
                        print_cards(&metrics);
                    }
                }
                StatsState::Loading { .. } => bail!("Stats did not finish loading"),
            }
        }
        Commands::SetId { id } => {
            let id = parse_id(&id)?;
            identity.save(&id)?;
            println!(
                "Player identifier set to {} (saved in {})",
                id,
                identity.path().display()
            );
        }
        Commands::ClearId => {
            identity.clear()?;
            println!("Player identifier cleared");
        }
        Commands::GuessId { save } => match source.guess_identifier().await? {
            Some(id) => {
                println!("{}", id);
                if save {
                    identity.save(&id)?;
                    tracing::info!("Saved guessed identifier {}", id);
                }
            }
            None => {
                eprintln!("No player could be guessed from the {} source", source.name());
            }
        },
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let store = SnapshotStore::open(source, identity).await?;
            let app = build_router(AppState::new(store.clone()), &config.server);

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!("Listening on http://{}", addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                    tracing::info!("Shutting down");
                })
                .await?;

            store.shutdown().await;
        }
    }

    Ok(())
}
