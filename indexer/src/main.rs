//! ERC-20 holder indexer CLI.
//!
//! Entry point for the indexer binary. Provides subcommands for:
//! - `serve` - run the HTTP API (scans continue on a background loop)
//! - `index` - run a single RPC log scan and exit
//! - `bootstrap` - run a single explorer-backed bootstrap and exit

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use erc20_holder_indexer::config::Settings;
use erc20_holder_indexer::facade::Indexer;
use erc20_holder_indexer::http::router;

#[derive(Parser, Debug)]
#[command(name = "erc20-holder-indexer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Deployment environment, selects `config/{environment}.toml`.
    #[arg(short, long, default_value = "default")]
    environment: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server.
    Serve {
        /// Run one RPC scan before serving requests.
        #[arg(long)]
        scan_on_start: bool,
    },

    /// Run a single RPC log scan up to the confirmation-adjusted safe head.
    Index {
        /// Start block override, used only if the store has no prior progress.
        #[arg(long)]
        from_block: Option<u64>,
    },

    /// Bootstrap from the block explorer, starting after the last scanned block.
    Bootstrap {
        /// Start block override, used only if the store has no prior progress.
        #[arg(long)]
        from_block: Option<u64>,

        /// Explorer API key override.
        #[arg(long)]
        api_key: Option<String>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let settings = match Settings::load(&cli.environment) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    if let Err(errors) = settings.validate() {
        for e in &errors {
            error!(error = %e, "invalid configuration");
        }
        return std::process::ExitCode::FAILURE;
    }

    info!(version = erc20_holder_indexer::VERSION, chain_id = settings.chain_id, "starting erc20-holder-indexer");

    let indexer = match Indexer::new(settings.clone()).await {
        Ok(idx) => Arc::new(idx),
        Err(e) => {
            error!(error = %e, "failed to initialize indexer");
            return std::process::ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Serve { scan_on_start } => run_serve(indexer, &settings, scan_on_start).await,
        Commands::Index { from_block } => run_index(indexer, &settings, from_block).await,
        Commands::Bootstrap { from_block, api_key } => {
            run_bootstrap(indexer, &settings, from_block, api_key).await
        }
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fatal error");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run_serve(
    indexer: Arc<Indexer>,
    settings: &Settings,
    scan_on_start: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if scan_on_start {
        match indexer.scan(settings.start_block, settings.batch_size, settings.confirmations).await {
            Ok(last) => info!(last_scanned_block = last, "initial scan complete"),
            Err(e) => error!(error = %e, "initial scan failed, serving with existing data"),
        }
    }

    let addr: SocketAddr = settings.bind_addr.parse()?;
    let app = router(indexer);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_index(
    indexer: Arc<Indexer>,
    settings: &Settings,
    from_block: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = from_block.or(settings.start_block);
    let last = indexer.scan(start, settings.batch_size, settings.confirmations).await?;
    info!(last_scanned_block = last, "scan complete");
    Ok(())
}

async fn run_bootstrap(
    indexer: Arc<Indexer>,
    settings: &Settings,
    from_block: Option<u64>,
    api_key: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = from_block.or(settings.start_block);
    let last = indexer
        .bootstrap(api_key.as_deref(), start, settings.bootstrap_offset, bootstrap_sleep(settings))
        .await?;
    info!(last_scanned_block = last, "bootstrap complete");
    Ok(())
}

fn bootstrap_sleep(settings: &Settings) -> Duration {
    settings.bootstrap_sleep()
}
