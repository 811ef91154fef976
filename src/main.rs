//! wg-panel main entry point
//!
//! This binary serves as the main entry point for the WireGuard panel.
//! It handles CLI parsing, logging setup, and server startup.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wg_panel::{
    api::{self, AppState},
    config::Config,
    panel::PeerManager,
    security,
    wireguard::WgCommand,
    APP_NAME, VERSION,
};

/// WireGuard peer administration panel
#[derive(Parser, Debug)]
#[command(name = APP_NAME, version = VERSION, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (defaults and environment only when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server
    Serve,

    /// Print all clients with telemetry
    List,

    /// Print roster-wide totals
    Stats,

    /// Print the configuration file of a client
    ShowConfig {
        /// Client identifier
        id: String,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Execute command
    if let Err(e) = run(cli).await {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Initialize structured logging with tracing
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Build the manager for the configured interface
fn build_manager(config: Config) -> PeerManager {
    let tool = WgCommand::new(config.wireguard.interface.clone());
    PeerManager::new(config, Arc::new(tool))
}

/// Warn early when the `wg` binary cannot be run
async fn check_tools(config: &Config) {
    let tool = WgCommand::new(config.wireguard.interface.clone());
    if !tool.is_available().await {
        warn!("`wg` is not available on PATH; key generation and telemetry will fail");
    }
}

/// Run the CLI command
async fn run(cli: Cli) -> anyhow::Result<()> {
    let load_config = || Config::load(cli.config.as_deref());

    match cli.command {
        Commands::Serve => {
            let config = load_config()?;
            info!("Starting {} v{}", APP_NAME, VERSION);
            info!(
                "Interface {} (endpoint {}), roster {:?}",
                config.wireguard.interface,
                config.endpoint(),
                config.clients_file()
            );
            if config.wireguard.host.is_empty() {
                warn!("WG_HOST is not set; client configs will have an empty endpoint host");
            }
            security::audit_environment(&config.clients_file());
            check_tools(&config).await;

            let addr = config.bind_addr();
            let manager = build_manager(config);
            manager.init().await?;

            api::serve(Arc::new(AppState::new(manager)), &addr).await?;
            info!("Shutting down");
            Ok(())
        }
        Commands::List => {
            let manager = build_manager(load_config()?);
            for view in manager.list().await? {
                let c = &view.client;
                println!(
                    "{}\t{}\t{}\t{}\trx {}\ttx {}\t{}{}",
                    c.id,
                    c.name,
                    c.address,
                    if c.enabled { "enabled" } else { "disabled" },
                    view.bandwidth.received,
                    view.bandwidth.sent,
                    view.last_seen,
                    if view.expired { "\texpired" } else { "" },
                );
            }
            Ok(())
        }
        Commands::Stats => {
            let stats = build_manager(load_config()?).stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
        Commands::ShowConfig { id } => {
            let file = build_manager(load_config()?).client_config(&id).await?;
            println!("# {}", file.file_name());
            println!("{}", file.contents);
            Ok(())
        }
        Commands::Version => {
            println!("{} v{}", APP_NAME, VERSION);
            Ok(())
        }
    }
}
