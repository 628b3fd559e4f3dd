//! feeindex CLI — sync `FeesCollected` events into a store and serve them.
//!
//! Usage:
//! ```bash
//! feeindex run                     # API + scheduler until the first error
//! feeindex sync [--json]           # one sync cycle
//! feeindex status                  # resume point vs. chain head
//! feeindex info                    # effective configuration
//! ```
//!
//! Every setting is a flag with an environment fallback; a `.env` file in the
//! working directory is loaded first.

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use feeindex_api::ApiServer;
use feeindex_core::cursor::CursorTracker;
use feeindex_core::indexer::{
    CycleOutcome, IndexerConfig, DEFAULT_CONTRACT_ADDRESS, DEFAULT_DATABASE_URL, DEFAULT_RPC_URL,
};
use feeindex_evm::{fees_collected_topic, EvmRpcClient, HttpRpcClient, IndexerBuilder, SyncScheduler};
use feeindex_storage::StoreKind;

mod logging;

#[derive(Parser)]
#[command(
    name = "feeindex",
    about = "Index LI.FI FeesCollected events and serve them per integrator",
    version
)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, global = true, env = "FEEINDEX_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit JSON structured logs
    #[arg(long, global = true, env = "FEEINDEX_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Settings {
    /// FeeCollector contract address
    #[arg(long, global = true, env = "FEEINDEX_CONTRACT_ADDRESS", default_value = DEFAULT_CONTRACT_ADDRESS)]
    contract_address: String,

    /// JSON-RPC endpoint
    #[arg(long, global = true, env = "FEEINDEX_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// First block to sync when the store is empty
    #[arg(long, global = true, env = "FEEINDEX_START_BLOCK", default_value_t = 61_500_000)]
    start_block: u64,

    /// Interval between sync cycles (ms)
    #[arg(long, global = true, env = "FEEINDEX_POLL_INTERVAL_MS", default_value_t = 600_000)]
    poll_interval_ms: u64,

    /// Pause between chunks (ms)
    #[arg(long, global = true, env = "FEEINDEX_CHUNK_DELAY_MS", default_value_t = 1_000)]
    chunk_delay_ms: u64,

    /// Maximum to - from of one eth_getLogs range (inclusive span up to chunk_size + 1 blocks)
    #[arg(long, global = true, env = "FEEINDEX_CHUNK_SIZE", default_value_t = 1_000)]
    chunk_size: u64,

    /// Store connection string: memory, sqlite:<path>, postgres://…
    #[arg(long, global = true, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database_url: String,

    /// Read endpoint port
    #[arg(long, global = true, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Per-request RPC timeout (ms)
    #[arg(long, global = true, env = "FEEINDEX_REQUEST_TIMEOUT_MS", default_value_t = 30_000)]
    request_timeout_ms: u64,
}

impl Settings {
    fn to_config(&self) -> Result<IndexerConfig> {
        let config = IndexerBuilder::new()
            .contract_address(&self.contract_address)
            .rpc_url(&self.rpc_url)
            .start_block(self.start_block)
            .poll_interval_ms(self.poll_interval_ms)
            .chunk_delay_ms(self.chunk_delay_ms)
            .chunk_size(self.chunk_size)
            .database_url(&self.database_url)
            .api_port(self.port)
            .request_timeout_ms(self.request_timeout_ms)
            .build()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the read endpoint and sync on every poll interval
    Run,

    /// Run exactly one sync cycle
    Sync {
        /// Print the cycle report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the resume point, chain head and blocks behind
    Status,

    /// Show the effective configuration
    Info,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_json);

    if let Err(e) = run(cli).await {
        tracing::error!(error = format!("{e:#}"), "feeindex exiting");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.settings.to_config().context("invalid configuration")?;

    match cli.command {
        Commands::Run => cmd_run(config).await,
        Commands::Sync { json } => cmd_sync(config, json).await,
        Commands::Status => cmd_status(config).await,
        Commands::Info => {
            cmd_info(&config);
            Ok(())
        }
    }
}

fn rpc_client(config: &IndexerConfig) -> Result<HttpRpcClient> {
    HttpRpcClient::new(config.rpc_url.clone(), config.request_timeout())
        .context("building RPC client")
}

async fn cmd_run(config: IndexerConfig) -> Result<()> {
    let store = feeindex_storage::connect(&config.database_url)
        .await
        .context("opening store")?;
    let client = rpc_client(&config)?;

    let server = ApiServer::new(config.api_port, Arc::clone(&store));
    let scheduler = Arc::new(SyncScheduler::new(config, client, store).context("building scheduler")?);

    tokio::select! {
        res = scheduler.run() => res.context("sync cycle failed"),
        res = server.run() => res.context("fee events API stopped"),
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down");
            Ok(())
        }
    }
}

async fn cmd_sync(config: IndexerConfig, json: bool) -> Result<()> {
    let store = feeindex_storage::connect(&config.database_url)
        .await
        .context("opening store")?;
    let client = rpc_client(&config)?;
    let scheduler = SyncScheduler::new(config, client, store).context("building scheduler")?;

    match scheduler.run_cycle().await.context("sync cycle failed")? {
        CycleOutcome::UpToDate { resume_block, head_block } => {
            println!("Up to date: next block {resume_block}, chain head {head_block}");
        }
        CycleOutcome::Synced(report) if json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        CycleOutcome::Synced(report) => {
            println!("Synced blocks {} to {}", report.resume_block, report.head_block);
            println!("  Chunks:        {}", report.chunks.len());
            println!("  Events stored: {}", report.events_stored);
            println!("  Started at:    {}", report.started_at.to_rfc3339());
        }
        CycleOutcome::Skipped => println!("Another cycle is in flight"),
    }
    Ok(())
}

async fn cmd_status(config: IndexerConfig) -> Result<()> {
    let store = feeindex_storage::connect(&config.database_url)
        .await
        .context("opening store")?;
    let cursor = CursorTracker::new(store, config.start_block);
    let resume = cursor.resume_point().await.context("reading resume point")?;
    let head = rpc_client(&config)?
        .get_block_number()
        .await
        .context("reading chain head")?;

    println!("Resume point: {resume}");
    println!("Chain head:   {head}");
    println!("Behind:       {} blocks", head.saturating_add(1).saturating_sub(resume));
    Ok(())
}

fn cmd_info(config: &IndexerConfig) {
    println!("feeindex v{}", env!("CARGO_PKG_VERSION"));
    println!("  Contract:       {}", config.contract_address);
    println!("  Event topic0:   {}", fees_collected_topic());
    println!("  RPC URL:        {}", config.rpc_url);
    println!("  Start block:    {}", config.start_block);
    println!("  Chunk size:     {} blocks", config.chunk_size);
    println!("  Chunk delay:    {} ms", config.chunk_delay_ms);
    println!("  Poll interval:  {} ms", config.poll_interval_ms);
    println!("  RPC timeout:    {} ms", config.request_timeout_ms);
    println!(
        "  Store:          {:?} ({})",
        StoreKind::from_url(&config.database_url),
        config.database_url
    );
    println!("  API port:       {}", config.api_port);
}
