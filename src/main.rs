//! Entropify service
//!
//! - **serve** — connection watcher, reservoir monitor and HTTP server
//!   (`/health`, `/status`, `/tx/{hash}`).
//! - **watch** — poll one transaction until its receipt lands and print the
//!   decoded random value.
//! - **count** — read the entropy reservoir count once.

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use entropify::api::{self, AppState};
use entropify::config::AppConfig;
use entropify::connection::{ConnectionWatcher, ProbeTarget};
use entropify::format::{format_address, format_tx_hash};
use entropify::metrics::Metrics;
use entropify::poller::{TransactionWatcher, TxPhase};
use entropify::provider::StarknetProvider;
use entropify::reservoir::{read_count, ReservoirMonitor};
use entropify::rpc::RpcClient;

#[derive(Parser)]
#[command(name = "entropify")]
#[command(about = "Starknet randomness provider companion")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service (default)
    Serve,
    /// Wait for a transaction's receipt and print its random value
    Watch {
        /// Transaction hash returned when the request was submitted
        tx_hash: String,
    },
    /// Print the entropy reservoir count
    Count,
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn,actix_server=warn")),
        )
        .with_target(true)
        .with_ansi(true)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("invalid configuration")?;
    let provider: Arc<dyn StarknetProvider> =
        Arc::new(RpcClient::new(&config.rpc_url).context("failed to build RPC client")?);

    info!(rpc = %config.rpc_url, "Endpoint configured");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, provider).await,
        Command::Watch { tx_hash } => watch(config, provider, tx_hash).await,
        Command::Count => {
            let count = read_count(provider.as_ref(), &config.reservoir_address).await?;
            println!("{count}");
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, provider: Arc<dyn StarknetProvider>) -> Result<()> {
    info!(
        provider = %format_address(&config.random_provider_address),
        reservoir = %format_address(&config.reservoir_address),
        "Starting entropify"
    );

    let connection = ConnectionWatcher::start(
        provider.clone(),
        ProbeTarget {
            expected_chain_id: config.expected_chain_id.clone(),
            account: config.account_address.clone(),
        },
        config.connection_check_interval,
    );

    let reservoir = ReservoirMonitor::start(
        provider.clone(),
        config.reservoir_address.clone(),
        config.count_refresh_interval,
    );

    let addr = ("0.0.0.0", config.http_port);
    let state = web::Data::new(AppState {
        config,
        provider,
        metrics: Arc::new(Metrics::new()),
        connection: connection.subscribe(),
        reservoir_count: reservoir.subscribe(),
    });

    info!(addr = ?addr, "Starting HTTP server");

    let result = HttpServer::new(move || App::new().app_data(state.clone()).configure(api::configure))
        .bind(addr)
        .context("failed to bind HTTP server")?
        .run()
        .await;

    connection.stop().await;
    reservoir.stop().await;

    result.context("HTTP server failed")
}

async fn watch(config: AppConfig, provider: Arc<dyn StarknetProvider>, tx_hash: String) -> Result<()> {
    let metrics = Arc::new(Metrics::new());
    let watcher = TransactionWatcher::new(
        provider,
        &tx_hash,
        &config.rand_event_key,
        config.receipt_poll_interval,
        metrics.clone(),
    );
    let mut progress = watcher.subscribe();

    println!("Transaction: {}", format_tx_hash(&tx_hash));
    println!("Explorer:    {}", config.explorer_url(&tx_hash));

    let run = tokio::spawn(watcher.run());
    let reporter = tokio::spawn(async move {
        let mut last_phase = TxPhase::Pending;
        while progress.changed().await.is_ok() {
            let status = progress.borrow_and_update().clone();
            if let Some(err) = &status.last_error {
                warn!(kind = ?err.kind, "{}", err.kind.user_message());
            }
            if status.phase() != last_phase {
                last_phase = status.phase();
                info!(phase = ?last_phase, "Transaction progress");
            }
        }
    });

    let status = tokio::select! {
        joined = run => joined.context("watcher task failed")?,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping");
            reporter.abort();
            return Ok(());
        }
    };

    // The reporter ends once the watcher's sender is dropped.
    if let Err(e) = reporter.await {
        warn!(error = %e, "Progress reporter failed");
    }
    info!(metrics = %metrics.to_json(), "Watch finished");

    match (&status.random_value, &status.revert_reason) {
        (Some(value), _) => println!("Random number: {value}"),
        (None, Some(reason)) => println!("Transaction reverted: {reason}"),
        (None, None) => println!("Transaction confirmed without a Rand event"),
    }

    Ok(())
}
