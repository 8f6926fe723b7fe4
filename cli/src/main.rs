//! ChainBind CLI — tail oracle price events, query prices, decode logs.
//!
//! # Commands
//! ```
//! chainbind tail    --ws <url> --address <addr> [--from-block N] [--price <wei>...]
//! chainbind logs    --ws <url> --address <addr> --from-block N --to-block M
//! chainbind price   --rpc <url> --address <addr> [--one-inch]
//! chainbind version --rpc <url> --address <addr>
//! chainbind parse   --file <log.json>
//! ```

use std::str::FromStr;
use std::sync::Arc;

use alloy_primitives::U256;
use anyhow::{Context, Result};
use chainbind_contract::{CallOpts, FilterOpts, WatchOpts};
use chainbind_core::{ContractEvent, RawLog};
use chainbind_oracle::{GgpPriceUpdated, Oracle};
use chainbind_stream::WsLogSource;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod rpc;

use rpc::HttpProvider;

#[derive(Parser)]
#[command(
    name = "chainbind",
    about = "Typed contract bindings for the GoGoPool Oracle — ChainBind CLI",
    version
)]
struct Cli {
    /// Raise log verbosity (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON structured logs
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow GGPPriceUpdated events live
    Tail {
        /// WebSocket JSON-RPC endpoint (ws:// or wss://)
        #[arg(long)]
        ws: String,
        /// Oracle contract address
        #[arg(long)]
        address: String,
        /// First block to include (default: head)
        #[arg(long)]
        from_block: Option<u64>,
        /// Only show updates to these exact prices (wei)
        #[arg(long, num_args = 0..)]
        price: Vec<String>,
    },

    /// Fetch historical GGPPriceUpdated events over a block range
    Logs {
        /// WebSocket JSON-RPC endpoint
        #[arg(long)]
        ws: String,
        /// Oracle contract address
        #[arg(long)]
        address: String,
        #[arg(long)]
        from_block: u64,
        #[arg(long)]
        to_block: u64,
    },

    /// Read the current GGP price
    Price {
        /// HTTP JSON-RPC endpoint
        #[arg(long)]
        rpc: String,
        /// Oracle contract address
        #[arg(long)]
        address: String,
        /// Read the 1inch TWAP instead of the stored price
        #[arg(long)]
        one_inch: bool,
    },

    /// Read the contract version
    Version {
        /// HTTP JSON-RPC endpoint
        #[arg(long)]
        rpc: String,
        /// Oracle contract address
        #[arg(long)]
        address: String,
    },

    /// Decode a raw log from a JSON file, offline
    Parse {
        /// Path to a JSON file containing one raw log object
        #[arg(long)]
        file: String,
    },
}

fn init_tracing(verbose: u8, json: bool) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("chainbind={level},warn")));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Tail {
            ws,
            address,
            from_block,
            price,
        } => cmd_tail(ws, address, from_block, price).await,
        Commands::Logs {
            ws,
            address,
            from_block,
            to_block,
        } => cmd_logs(ws, address, from_block, to_block).await,
        Commands::Price {
            rpc,
            address,
            one_inch,
        } => cmd_price(rpc, address, one_inch).await,
        Commands::Version { rpc, address } => cmd_version(rpc, address).await,
        Commands::Parse { file } => cmd_parse(file),
    }
}

fn parse_prices(raw: &[String]) -> Result<Vec<U256>> {
    raw.iter()
        .map(|s| U256::from_str(s).with_context(|| format!("bad price value: {s}")))
        .collect()
}

fn print_event(event: &GgpPriceUpdated) {
    let line = serde_json::json!({
        "price": event.price.to_string(),
        "timestamp": event.timestamp.to_string(),
        "block": event.raw.block_number,
        "tx": event.raw.tx_hash,
    });
    println!("{line}");
}

async fn cmd_tail(
    ws: String,
    address: String,
    from_block: Option<u64>,
    price: Vec<String>,
) -> Result<()> {
    let price_filter = parse_prices(&price)?;
    let source = Arc::new(WsLogSource::new(ws));
    let oracle = Oracle::read_only(address, source);

    let (sink, mut events) = mpsc::channel(256);
    let mut watch = oracle
        .watch_price_updated(&WatchOpts { from_block }, sink, price_filter)
        .await
        .context("failed to open watch")?;
    info!("watching GGPPriceUpdated (ctrl-c to stop)");

    loop {
        tokio::select! {
            maybe_event = events.recv() => match maybe_event {
                Some(event) => print_event(&event),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("stopping");
                watch.cancel();
                break;
            }
        }
    }

    if let Err(e) = watch.join().await {
        warn!("watch ended with error: {e}");
        anyhow::bail!("watch failed: {e}");
    }
    Ok(())
}

async fn cmd_logs(ws: String, address: String, from_block: u64, to_block: u64) -> Result<()> {
    let source = Arc::new(WsLogSource::new(ws));
    let oracle = Oracle::read_only(address, source);

    let mut it = oracle
        .filter_price_updated(&FilterOpts::range(from_block, Some(to_block)), vec![])
        .await
        .context("failed to open filter")?;

    let mut count = 0usize;
    while it.advance().await {
        if let Some(event) = it.current() {
            print_event(event);
            count += 1;
        }
    }
    if let Some(e) = it.error() {
        anyhow::bail!("log retrieval failed after {count} events: {e}");
    }
    info!(count, "done");
    Ok(())
}

async fn cmd_price(rpc: String, address: String, one_inch: bool) -> Result<()> {
    let provider = Arc::new(HttpProvider::new(rpc));
    let oracle = Oracle::caller(address, provider);

    let quote = if one_inch {
        oracle
            .get_ggp_price_in_avax_from_one_inch(&CallOpts::latest())
            .await?
    } else {
        oracle.get_ggp_price_in_avax(&CallOpts::latest()).await?
    };
    println!(
        "{}",
        serde_json::json!({
            "price": quote.price.to_string(),
            "timestamp": quote.timestamp.to_string(),
        })
    );
    Ok(())
}

async fn cmd_version(rpc: String, address: String) -> Result<()> {
    let provider = Arc::new(HttpProvider::new(rpc));
    let oracle = Oracle::caller(address, provider);
    println!("{}", oracle.version(&CallOpts::latest()).await?);
    Ok(())
}

fn cmd_parse(file: String) -> Result<()> {
    let content = std::fs::read_to_string(&file).with_context(|| format!("reading {file}"))?;
    let raw: RawLog = serde_json::from_str(&content).context("log file is not a raw log")?;
    let event = GgpPriceUpdated::decode(&raw).context("log is not a GGPPriceUpdated event")?;
    print_event(&event);
    Ok(())
}
