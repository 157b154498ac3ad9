//! backerline CLI
//!
//! Runs the backer sync on a schedule and answers `!focus <name>` lookups
//! typed on stdin, or performs a single operation and exits.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use backerline::{
    bot::{BotHandler, ConsoleTransport, Response, render},
    config::{load_config, load_config_strict, load_credentials},
    error::Result,
    models::Config,
    pipeline::{CycleOutcome, Scheduler, run_sync},
    services::{HttpPledgeSource, QueryResolver, SyncEngine},
    storage::{LocalSnapshotStore, SnapshotStore},
    utils::natural_age,
};
use clap::{Parser, Subcommand};
use tokio::io::BufReader;

/// backerline - campaign backer place-in-line bot
#[derive(Parser, Debug)]
#[command(
    name = "backerline",
    version,
    about = "Campaign backer place-in-line bot"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sync hourly and answer commands read from stdin
    Serve,

    /// Run one sync cycle and exit
    Sync,

    /// Look up a backer by exact display name
    Lookup {
        /// Display name, matched exactly
        name: String,

        /// Print the reply as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show current snapshot info
    Info,

    /// Validate configuration file
    Validate,
}

/// Initialize logging; `RUST_LOG` overrides the configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn build_engine(config: &Config, store: Arc<LocalSnapshotStore>) -> Result<SyncEngine> {
    let source = Arc::new(HttpPledgeSource::new(&config.source)?);
    Ok(SyncEngine::new(source, store, &config.sync))
}

/// Load the file strictly, without falling back to defaults.
fn validate(path: &Path) -> Result<()> {
    log::info!("Validating configuration...");
    let config = match load_config_strict(path) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Config validation failed for {}: {}", path.display(), e);
            return Err(e);
        }
    };
    log::info!("✓ Config OK");
    log::info!("    source: {}", config.source.base_url);
    log::info!("    interval: {}s", config.sync.interval_secs);
    log::info!("    snapshot: {}", config.storage.snapshot_path.display());
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Peek at the file for the log level; loading proper happens once logging is up.
    let level = Config::load(&cli.config)
        .map(|c| c.logging.level)
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.verbose, &level);

    if matches!(cli.command, Command::Validate) {
        return validate(&cli.config);
    }

    let config = load_config(&cli.config)?;

    let store = Arc::new(LocalSnapshotStore::new(&config.storage.snapshot_path));
    let resolver = QueryResolver::new(Arc::clone(&store) as Arc<dyn SnapshotStore>);

    match cli.command {
        Command::Serve => {
            let credentials = load_credentials(&config.bot)?;
            let engine = Arc::new(build_engine(&config, Arc::clone(&store))?);
            let sync_task = Scheduler::new(engine, config.sync.interval()).spawn();

            let handler = BotHandler::new(resolver, config.bot.clone())?;
            let transport = ConsoleTransport::new(credentials, handler);
            let stdin = BufReader::new(tokio::io::stdin());

            tokio::select! {
                served = transport.run(stdin, tokio::io::stdout()) => {
                    log::info!("Input closed after {} replies", served?);
                }
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Interrupted, shutting down");
                }
            }
            sync_task.abort();
        }

        Command::Sync => {
            let engine = build_engine(&config, store)?;
            match run_sync(&engine).await {
                CycleOutcome::Synced(summary) => {
                    log::info!(
                        "Snapshot saved to {} ({} backers)",
                        summary.write.location,
                        summary.write.count
                    );
                }
                CycleOutcome::Aborted(e) | CycleOutcome::PersistFailed(e) => return Err(e),
            }
        }

        Command::Lookup { name, json } => {
            let response = Response::Resolved(resolver.resolve(&name).await);
            let reply = render(&response, &config.bot);
            if json {
                println!("{}", serde_json::to_string_pretty(&reply)?);
            } else {
                print!("{reply}");
            }
        }

        Command::Info => {
            log::info!("Snapshot: {}", store.location());
            match store.read().await? {
                Some(snapshot) => {
                    let now = chrono::Utc::now();
                    log::info!("Backers: {}", snapshot.backers.len());
                    log::info!(
                        "Last updated: {} ({})",
                        snapshot.updated_at,
                        natural_age(snapshot.age_at(now))
                    );
                }
                None => log::info!("No snapshot found yet."),
            }
        }

        // returned early above
        Command::Validate => {}
    }

    log::info!("Done!");

    Ok(())
}
