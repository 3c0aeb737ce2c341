//! Service entrypoint: wires the notification sink, the alert manager
//! and the monitoring jobs together, then runs until SIGINT/SIGTERM.

mod config;

use anyhow::{Context, Result};
use lendmon_alert::AlertManager;
use lendmon_chain::{
    chains_from_env, AlchemyPrices, ChainConfig, ChainId, JsonRpcOracle, OracleConfig,
    OracleMonitor, ReferencePrices,
};
use lendmon_notify::telegram::TelegramTarget;
use lendmon_notify::Notifier;
use lendmon_positions::{AggregateHealthJob, ConcentrationJob, HealthJob, PositionStore};
use lendmon_worker::Worker;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so RUST_LOG from the file reaches the filter below.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("warning: .env not loaded: {e}");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("lendmon=info".parse()?))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = Config::load_or_default(&config_path);
    tracing::info!(path = %config_path, "loaded configuration");

    let alchemy_key =
        std::env::var("ALCHEMY_PRICE_API_KEY").context("ALCHEMY_PRICE_API_KEY is required")?;

    let notifier = Notifier::new(
        TelegramTarget::from_parts(
            env_opt("TELEGRAM_BUSINESS_BOT_TOKEN"),
            env_opt("TELEGRAM_BUSINESS_CHAT_ID"),
        ),
        TelegramTarget::from_parts(
            env_opt("TELEGRAM_DEVELOPER_BOT_TOKEN"),
            env_opt("TELEGRAM_DEVELOPER_CHAT_ID"),
        ),
        env_opt("SLACK_WEBHOOK_URL"),
    );
    if !notifier.business_configured() {
        tracing::warn!("business alerts not configured");
    }
    if !notifier.developer_configured() {
        tracing::warn!("developer alerts not configured");
    }

    let alerts = Arc::new(AlertManager::new(Arc::new(notifier)));
    tracing::info!("initialized alert manager");

    let mut worker = Worker::new();

    let enabled_chains = std::env::var("ENABLED_CHAINS").unwrap_or_else(|_| "base".to_string());
    let chains = chains_from_env(&enabled_chains).context("failed to parse enabled chains")?;
    tracing::info!(count = chains.len(), chains = %enabled_chains, "monitoring chains");

    let prices: Arc<dyn ReferencePrices> = Arc::new(AlchemyPrices::new(alchemy_key.clone()));
    for chain in chains {
        let chain_name = chain.name;
        let token_count = chain.tokens.len();
        match setup_oracle_monitor(
            chain,
            &alchemy_key,
            prices.clone(),
            alerts.clone(),
            config.oracle.clone(),
        ) {
            Ok(monitor) => {
                worker.register(Arc::new(monitor));
                tracing::info!(chain = chain_name, tokens = token_count, "registered oracle monitor");
            }
            Err(e) => {
                tracing::error!(chain = chain_name, error = %e, "failed to set up oracle monitor");
            }
        }
    }

    match env_opt("DATABASE_URL") {
        Some(database_url) => {
            if let Err(e) = setup_position_jobs(&database_url, &alerts, &config, &mut worker).await
            {
                tracing::warn!(error = %e, "database monitors not available");
            }
        }
        None => {
            tracing::info!("DATABASE_URL not configured, database monitors disabled");
        }
    }

    tracing::info!(jobs = worker.job_count(), "starting monitoring jobs");
    let cancel = CancellationToken::new();
    worker.start(cancel.clone());

    shutdown_signal().await;
    tracing::info!("shutdown signal received");

    cancel.cancel();
    worker.wait().await;
    worker.close().await;

    let active = alerts.get_active_incidents();
    if !active.is_empty() {
        tracing::info!(count = active.len(), "shutting down with active incidents");
    }
    tracing::info!("monitors stopped gracefully");
    Ok(())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Chain-specific `<CHAIN>_RPC_URL` override, with Alchemy defaults for
/// the chains it hosts.
fn rpc_url(chain: &ChainConfig, alchemy_key: &str) -> Option<String> {
    let env_key = format!("{}_RPC_URL", chain.id.to_string().to_uppercase());
    if let Some(url) = env_opt(&env_key) {
        return Some(url);
    }
    match chain.id {
        ChainId::Base => Some(format!(
            "https://base-mainnet.g.alchemy.com/v2/{alchemy_key}"
        )),
        ChainId::Optimism => Some(format!(
            "https://opt-mainnet.g.alchemy.com/v2/{alchemy_key}"
        )),
        ChainId::Moonbeam | ChainId::Moonriver => None,
    }
}

fn setup_oracle_monitor(
    chain: ChainConfig,
    alchemy_key: &str,
    prices: Arc<dyn ReferencePrices>,
    alerts: Arc<AlertManager>,
    oracle_config: OracleConfig,
) -> Result<OracleMonitor> {
    let url = rpc_url(&chain, alchemy_key)
        .with_context(|| format!("no RPC URL configured for {}", chain.name))?;
    let reader = JsonRpcOracle::new(url, chain.oracle_address)?;
    Ok(OracleMonitor::new(
        chain,
        Arc::new(reader),
        prices,
        alerts,
        oracle_config,
    ))
}

async fn setup_position_jobs(
    database_url: &str,
    alerts: &Arc<AlertManager>,
    config: &Config,
    worker: &mut Worker,
) -> Result<()> {
    let store = PositionStore::connect(database_url).await?;

    worker.register(Arc::new(HealthJob::new(
        store.clone(),
        alerts.clone(),
        config.health_factor.clone(),
    )));
    tracing::info!("registered health factor monitor");

    worker.register(Arc::new(AggregateHealthJob::new(
        store.clone(),
        alerts.clone(),
        config.health_factor.clone(),
    )));
    tracing::info!("registered aggregate health monitor");

    worker.register(Arc::new(ConcentrationJob::new(
        store,
        alerts.clone(),
        config.concentration.clone(),
    )));
    tracing::info!("registered concentration monitor");

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
