use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use lendmon_alert::{AlertManager, AlertPolicy, Observation};
use lendmon_common::types::{AlertKey, Severity};
use lendmon_worker::Job;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Semaphore;

use crate::config::OracleConfig;
use crate::prices::ReferencePrices;
use crate::registry::{ChainConfig, TokenMeta};
use crate::rpc::{decode_price, OracleReader};

const MAX_CONCURRENT_TOKENS: usize = 5;
const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: std::time::Duration = std::time::Duration::from_millis(500);
/// Failure count at which the circuit opens and ticks are skipped.
const CIRCUIT_OPEN_AFTER: u32 = 5;

/// Per-run health bookkeeping, shared with the fan-out tasks' results.
struct Health {
    failures: u32,
    consecutive_err: u32,
    last_success: DateTime<Utc>,
}

/// Periodic oracle price check for one chain.
pub struct OracleMonitor {
    chain: ChainConfig,
    reader: Arc<dyn OracleReader>,
    prices: Arc<dyn ReferencePrices>,
    alerts: Arc<AlertManager>,
    config: OracleConfig,
    name: String,
    health: Mutex<Health>,
}

struct TokenPrices {
    onchain: f64,
    reference: f64,
    deviation: f64,
}

struct TokenOutcome {
    meta: TokenMeta,
    outcome: Result<TokenPrices>,
}

impl OracleMonitor {
    pub fn new(
        chain: ChainConfig,
        reader: Arc<dyn OracleReader>,
        prices: Arc<dyn ReferencePrices>,
        alerts: Arc<AlertManager>,
        config: OracleConfig,
    ) -> Self {
        let name = format!("oracle_{}", chain.id);
        register_policies(&alerts, &config, &name);
        Self {
            chain,
            reader,
            prices,
            alerts,
            config,
            name,
            health: Mutex::new(Health {
                failures: 0,
                consecutive_err: 0,
                last_success: Utc::now(),
            }),
        }
    }

    async fn check_all_tokens(&self) -> Vec<TokenOutcome> {
        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_TOKENS));
        let mut handles = Vec::new();

        for meta in self.chain.tokens.values() {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };
            let reader = self.reader.clone();
            let prices = self.prices.clone();
            let network = self.chain.price_network;
            let meta = *meta;

            let handle = tokio::spawn(async move {
                let outcome = check_token(reader, prices, network, meta).await;
                drop(permit);
                TokenOutcome { meta, outcome }
            });
            handles.push((meta, handle));
        }

        let mut results = Vec::new();
        for (meta, handle) in handles {
            match handle.await {
                Ok(outcome) => results.push(outcome),
                Err(e) => results.push(TokenOutcome {
                    meta,
                    outcome: Err(anyhow!("token check panicked: {e}")),
                }),
            }
        }
        results
    }

    async fn process_token(&self, meta: &TokenMeta, prices: &TokenPrices) {
        let severity = classify_deviation(prices.deviation, meta.is_stablecoin, &self.config);
        tracing::info!(
            job = %self.name,
            token = meta.symbol,
            deviation = %format!("{:.4}%", prices.deviation),
            onchain = prices.onchain,
            reference = prices.reference,
            severity = %severity,
            "token checked"
        );

        let key = AlertKey::new(self.name.clone(), meta.symbol, metric_name(meta));
        let obs = Observation {
            key,
            severity,
            value: prices.deviation,
            summary: String::new(),
            details: format_details(&self.chain, meta, prices),
            business_alert: true,
            slack_message: format_slack(&self.chain, meta, prices),
        };
        if let Err(e) = self.alerts.observe(obs).await {
            tracing::error!(job = %self.name, token = meta.symbol, error = %e, "observe failed");
        }
    }

    async fn observe_token_error(&self, symbol: &str, err: &anyhow::Error) {
        let key = AlertKey::new(self.name.clone(), symbol, "token_error");
        let obs = Observation {
            key,
            severity: Severity::Warning,
            value: 1.0,
            summary: String::new(),
            details: format!(
                "Chain: {}\nToken: {}\nError: {:#}",
                self.chain.name, symbol, err
            ),
            business_alert: false,
            slack_message: String::new(),
        };
        if let Err(e) = self.alerts.observe(obs).await {
            tracing::error!(job = %self.name, token = symbol, error = %e, "observe failed");
        }
    }

    async fn update_system_health(&self, success_count: usize, error_count: usize) {
        let (consecutive_err, last_success) = {
            let mut health = self.lock_health();
            if success_count > 0 {
                health.last_success = Utc::now();
                health.consecutive_err = 0;
            } else {
                health.consecutive_err += 1;
            }
            (health.consecutive_err, health.last_success)
        };

        let token_count = self.chain.tokens.len();
        if token_count == 0 {
            return;
        }
        let error_rate = error_count as f64 / token_count as f64 * 100.0;
        let severity = health_severity(error_rate);

        let key = AlertKey::new(self.name.clone(), "system", "system_health");
        let obs = Observation {
            key,
            severity,
            value: error_rate,
            summary: String::new(),
            details: format!(
                "Chain: {}\nSuccess: {:.1}%\nFailed: {}/{}\nConsecutive errors: {}\nLast success: {}",
                self.chain.name,
                100.0 - error_rate,
                error_count,
                token_count,
                consecutive_err,
                last_success.format("%H:%M:%S"),
            ),
            business_alert: false,
            slack_message: String::new(),
        };
        if let Err(e) = self.alerts.observe(obs).await {
            tracing::error!(job = %self.name, error = %e, "observe failed");
        }
    }

    fn lock_health(&self) -> MutexGuard<'_, Health> {
        self.health
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    pub(crate) fn failure_count(&self) -> u32 {
        self.lock_health().failures
    }
}

#[async_trait]
impl Job for OracleMonitor {
    fn name(&self) -> &str {
        &self.name
    }

    fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.config.check_interval_seconds.max(1))
    }

    async fn run(&self) -> Result<()> {
        tracing::info!(
            job = %self.name,
            chain = self.chain.name,
            tokens = self.chain.tokens.len(),
            "checking tokens"
        );

        let failures = self.lock_health().failures;
        if failures >= CIRCUIT_OPEN_AFTER {
            tracing::warn!(job = %self.name, failures, "circuit open, skipping check");
            bail!("circuit breaker open");
        }

        let results = self.check_all_tokens().await;

        let mut error_count = 0usize;
        let mut success_count = 0usize;
        for result in &results {
            match &result.outcome {
                Ok(prices) => {
                    success_count += 1;
                    self.process_token(&result.meta, prices).await;
                }
                Err(e) => {
                    error_count += 1;
                    tracing::warn!(
                        job = %self.name,
                        token = result.meta.symbol,
                        error = %e,
                        "token check failed"
                    );
                    self.observe_token_error(result.meta.symbol, e).await;
                }
            }
        }

        self.update_system_health(success_count, error_count).await;

        let token_count = self.chain.tokens.len();
        if token_count == 0 {
            return Ok(());
        }
        let error_rate = error_count as f64 / token_count as f64;
        {
            let mut health = self.lock_health();
            if error_rate > 0.5 {
                health.failures += 1;
            } else {
                health.failures = 0;
            }
        }
        if error_rate > 0.5 {
            bail!("high error rate: {:.1}%", error_rate * 100.0);
        }
        Ok(())
    }
}

async fn check_token(
    reader: Arc<dyn OracleReader>,
    prices: Arc<dyn ReferencePrices>,
    network: &'static str,
    meta: TokenMeta,
) -> Result<TokenPrices> {
    anyhow::ensure!(meta.decimals <= 36, "invalid decimals: {}", meta.decimals);

    let raw = with_retry(|| {
        let reader = reader.clone();
        async move { reader.underlying_price(meta.market_address).await }
    })
    .await
    .map_err(|e| anyhow!("onchain price: {e:#}"))?;
    let onchain = decode_price(raw, meta.decimals)?;

    let mut reference = 0.0;
    if !meta.skip_reference_price {
        let address = meta
            .price_address
            .ok_or_else(|| anyhow!("no reference price address"))?;
        reference = with_retry(|| {
            let prices = prices.clone();
            async move { prices.usd_price(network, address).await }
        })
        .await
        .map_err(|e| anyhow!("reference price: {e:#}"))?;
    }

    let deviation = compute_deviation(onchain, reference, &meta)?;
    Ok(TokenPrices {
        onchain,
        reference,
        deviation,
    })
}

/// Deviation in percent against the peg (stablecoins) or the reference
/// price (volatile tokens). Native tokens without a feed observe the
/// oracle price only.
pub(crate) fn compute_deviation(onchain: f64, reference: f64, meta: &TokenMeta) -> Result<f64> {
    if meta.is_stablecoin && meta.peg_value > 0.0 {
        return Ok(((onchain - meta.peg_value) / meta.peg_value * 100.0).abs());
    }
    if reference > 0.0 {
        return Ok(((onchain - reference) / reference * 100.0).abs());
    }
    if meta.skip_reference_price {
        return Ok(0.0);
    }
    bail!(
        "cannot compute deviation: no reference price (ref={:.6}, peg={:.2})",
        reference,
        meta.peg_value
    )
}

pub(crate) fn classify_deviation(
    deviation: f64,
    is_stablecoin: bool,
    config: &OracleConfig,
) -> Severity {
    let thresholds = if is_stablecoin {
        &config.stablecoin
    } else {
        &config.volatile
    };
    if deviation >= thresholds.critical_threshold_percent {
        Severity::Critical
    } else if deviation >= thresholds.warning_threshold_percent {
        Severity::Warning
    } else {
        Severity::Ok
    }
}

pub(crate) fn health_severity(error_rate: f64) -> Severity {
    if error_rate >= 50.0 {
        Severity::Critical
    } else if error_rate >= 30.0 {
        Severity::Warning
    } else {
        Severity::Ok
    }
}

pub(crate) fn metric_name(meta: &TokenMeta) -> &'static str {
    if meta.is_stablecoin {
        "price_deviation_stable"
    } else {
        "price_deviation_volatile"
    }
}

fn format_details(chain: &ChainConfig, meta: &TokenMeta, prices: &TokenPrices) -> String {
    if meta.is_stablecoin {
        format!(
            "Token: {}\nChain: {}\nDeviation: {:.2}%\nOnchain: ${:.6}\nPeg: ${:.2}\nReference: ${:.6}",
            meta.symbol, chain.name, prices.deviation, prices.onchain, meta.peg_value, prices.reference,
        )
    } else {
        format!(
            "Token: {}\nChain: {}\nDeviation: {:.2}%\nOnchain: ${:.6}\nReference: ${:.6}",
            meta.symbol, chain.name, prices.deviation, prices.onchain, prices.reference,
        )
    }
}

fn format_slack(chain: &ChainConfig, meta: &TokenMeta, prices: &TokenPrices) -> String {
    let title = if meta.is_stablecoin {
        "ALERT: STABLECOIN DEPEG"
    } else {
        "ALERT: ORACLE PRICE DEVIATION"
    };
    format!(
        "{}\nToken: {}\nChain: {}\nDeviation: {:.2}%\nOnchain: ${:.6}\nReference: ${:.6}",
        title, meta.symbol, chain.name, prices.deviation, prices.onchain, prices.reference,
    )
}

/// Retries a transient operation with linear backoff.
async fn with_retry<T, F, Fut>(mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                attempt += 1;
                if attempt >= MAX_RETRIES {
                    return Err(e);
                }
                tokio::time::sleep(RETRY_DELAY * attempt).await;
            }
        }
    }
}

fn register_policies(alerts: &AlertManager, config: &OracleConfig, job: &str) {
    alerts.register_policy(job, "price_deviation_stable", config.stablecoin.policy());
    alerts.register_policy(job, "price_deviation_volatile", config.volatile.policy());
    alerts.register_policy(
        job,
        "system_health",
        AlertPolicy {
            min_value_change: 10.0,
            cooldown_warning: Duration::minutes(15),
            cooldown_critical: Duration::minutes(5),
            dynamic_cooldowns: Vec::new(),
            reminder_interval: Duration::minutes(30),
            trigger_threshold: 30.0,
            consecutive_ok_required: 1,
        },
    );
}
