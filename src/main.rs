//! GridCheckpoint - Main Entry Point
//!
//! Connects to the execution bridge, streams ticks through the grid
//! checkpoint engine and sends the resulting trades back over the bridge.
//! With `--stdin` it replays JSON tick lines from standard input instead and
//! prints trades to standard output.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use grid_checkpoint::common::channels::{create_tick_channel_with_size, create_trade_channel};
use grid_checkpoint::config::{load_config, AppConfig};
use grid_checkpoint::{
    BridgeConnection, BridgeTradeSink, ChannelTradeSink, InMemoryStore, TickIngress, TickProcessor,
    UuidNonce,
};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Comma-separated list of symbols to subscribe on the bridge
    #[arg(long)]
    symbols: Option<String>,

    /// Bridge address (host:port); overrides the config file
    #[arg(long, env = "GRID_BRIDGE_ADDRESS")]
    bridge: Option<String>,

    /// Read ticks from stdin and print trades to stdout instead of using the bridge
    #[arg(long)]
    stdin: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let mut config = load_config(Some(&args.config))?;
    if let Some(symbols) = &args.symbols {
        config.bridge.symbols = symbols.split(',').map(|s| s.trim().to_string()).collect();
    }
    if let Some(address) = &args.bridge {
        config.bridge.address = address.clone();
    }

    // Initialize logging
    let log_level = args.log_level.as_deref().unwrap_or(config.settings.log_level.as_str());
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting GridCheckpoint engine");
    info!("Configuration file: {}", args.config);
    info!(
        gap = %config.engine.default_gap,
        eclipse_buffer = %config.engine.default_eclipse_buffer,
        range_width = config.engine.range_width,
        "Engine defaults"
    );

    if args.stdin {
        run_stdin(config).await
    } else {
        run_bridge(config).await
    }
}

async fn run_stdin(config: AppConfig) -> Result<()> {
    let (trade_tx, mut trade_rx) = create_trade_channel();
    let processor = Arc::new(TickProcessor::new(
        config.engine.clone(),
        Arc::new(InMemoryStore::new()),
        Arc::new(ChannelTradeSink::new(trade_tx)),
        Arc::new(UuidNonce),
    ));

    let printer = tokio::spawn(async move {
        while let Some(trade) = trade_rx.recv().await {
            match serde_json::to_string(&trade) {
                Ok(line) => println!("{}", line),
                Err(e) => error!("Failed to encode trade: {}", e),
            }
        }
    });

    let (tick_tx, tick_rx) = create_tick_channel_with_size(config.settings.channel_size);
    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tick_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    let ingress = TickIngress::with_queue_size(processor, config.settings.channel_size);
    let stats = ingress.run(tick_rx).await;
    reader.await?;
    printer.await?;

    info!(trades = stats.trades, "Replay finished");
    Ok(())
}

async fn run_bridge(config: AppConfig) -> Result<()> {
    let connection = BridgeConnection::new(config.bridge.address.clone());
    let processor = Arc::new(TickProcessor::new(
        config.engine.clone(),
        Arc::new(InMemoryStore::new()),
        Arc::new(BridgeTradeSink::new(connection.writer())),
        Arc::new(UuidNonce),
    ));
    let reconnect_delay = Duration::from_millis(config.bridge.reconnect_delay_ms);

    loop {
        let (tick_tx, tick_rx) = create_tick_channel_with_size(config.settings.channel_size);

        let reader = match connection.connect(tick_tx).await {
            Ok(reader) => reader,
            Err(e) => {
                warn!(address = connection.address(), "Bridge connection failed: {}", e);
                if shutdown_during(reconnect_delay).await {
                    break;
                }
                continue;
            }
        };

        if let Err(e) = connection.subscribe(&config.bridge.symbols).await {
            error!("Failed to subscribe: {}", e);
        }

        let ingress = TickIngress::with_queue_size(processor.clone(), config.settings.channel_size);
        tokio::select! {
            stats = ingress.run(tick_rx) => {
                info!(processed = stats.processed, trades = stats.trades, "Bridge stream ended, reconnecting");
                reader.abort();
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal, cleaning up...");
                if let Err(e) = connection.unsubscribe(&config.bridge.symbols).await {
                    warn!("Failed to unsubscribe: {}", e);
                }
                connection.disconnect().await;
                reader.abort();
                break;
            }
        }

        if shutdown_during(reconnect_delay).await {
            break;
        }
    }

    Ok(())
}

/// Sleep for `delay`; true if ctrl-c arrived first
async fn shutdown_during(delay: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => false,
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal while waiting to reconnect");
            true
        }
    }
}
