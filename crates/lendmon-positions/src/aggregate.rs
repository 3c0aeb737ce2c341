use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use lendmon_alert::{AlertManager, Observation};
use lendmon_common::types::AlertKey;
use lendmon_worker::Job;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::HealthFactorConfig;
use crate::store::{AggregateMetrics, PositionStore};
use crate::{classify, format_usd};

const JOB_NAME: &str = "health_aggregate";
const ENTITY: &str = "protocol";

/// Systemic health factor monitoring: risky-count spikes, weighted
/// average drift, and 24 h supply/borrow deltas, all on one aggregate
/// query per tick.
pub struct AggregateHealthJob {
    store: PositionStore,
    alerts: Arc<AlertManager>,
    config: HealthFactorConfig,
    baselines: Mutex<Baselines>,
}

struct Baselines {
    last_avg_hf: f64,
    last_hf_check: DateTime<Utc>,
    last_risky_count: i64,
    last_risky_check: DateTime<Utc>,
    last_supply: f64,
    last_supply_check: DateTime<Utc>,
    last_borrow: f64,
    last_borrow_check: DateTime<Utc>,
}

impl AggregateHealthJob {
    pub fn new(
        store: PositionStore,
        alerts: Arc<AlertManager>,
        config: HealthFactorConfig,
    ) -> Self {
        alerts.register_policy(
            JOB_NAME,
            "risky_count_spike",
            config.risky_count_spike.policy(Duration::hours(4)),
        );
        alerts.register_policy(
            JOB_NAME,
            "avg_hf_drop",
            config.avg_hf_drop.policy(Duration::hours(2)),
        );
        alerts.register_policy(
            JOB_NAME,
            "withdrawal_spike",
            config.withdrawal_spike.policy(Duration::zero()),
        );
        alerts.register_policy(
            JOB_NAME,
            "borrow_spike",
            config.borrow_spike.policy(Duration::zero()),
        );

        let now = Utc::now();
        Self {
            store,
            alerts,
            config,
            // Backdated 24 h baselines make the spike checks evaluate on
            // the first tick; the HF baseline starts fresh.
            baselines: Mutex::new(Baselines {
                last_avg_hf: 0.0,
                last_hf_check: now,
                last_risky_count: 0,
                last_risky_check: now - Duration::hours(24),
                last_supply: 0.0,
                last_supply_check: now - Duration::hours(24),
                last_borrow: 0.0,
                last_borrow_check: now - Duration::hours(24),
            }),
        }
    }

    async fn check_risky_count_spike(&self, metrics: &AggregateMetrics) {
        let now = Utc::now();
        let decision = {
            let mut b = self.lock_baselines();
            if now - b.last_risky_check >= Duration::hours(24) {
                let baseline = b.last_risky_count;
                b.last_risky_count = metrics.risky_positions;
                b.last_risky_check = now;
                Some(baseline)
            } else {
                None
            }
        };
        let Some(baseline) = decision else { return };

        let percent_increase = risky_spike_percent(metrics.risky_positions, baseline);
        let cfg = &self.config.risky_count_spike;
        let severity = classify(
            percent_increase,
            cfg.warning_threshold_percent,
            cfg.critical_threshold_percent,
        );

        let obs = Observation {
            key: AlertKey::new(JOB_NAME, ENTITY, "risky_count_spike"),
            severity,
            value: percent_increase,
            summary: String::new(),
            details: format!(
                "Risky positions (HF < 1.2): {} (24h ago: {})\nChange: {:.1}%\nTotal positions: {}",
                metrics.risky_positions, baseline, percent_increase, metrics.total_positions,
            ),
            business_alert: true,
            slack_message: String::new(),
        };
        if let Err(e) = self.alerts.observe(obs).await {
            tracing::error!(job = JOB_NAME, error = %e, "observe failed");
        }
    }

    async fn check_avg_hf_drop(&self, metrics: &AggregateMetrics) {
        let now = Utc::now();
        let decision = {
            let mut b = self.lock_baselines();
            let decision = if now - b.last_hf_check >= Duration::hours(1) && b.last_avg_hf > 0.0 {
                let prior = b.last_avg_hf;
                b.last_hf_check = now;
                Some(prior)
            } else {
                None
            };
            // The prior value advances on every tick regardless.
            b.last_avg_hf = metrics.weighted_avg_hf;
            decision
        };
        let Some(prior) = decision else { return };

        let drop = prior - metrics.weighted_avg_hf;
        let cfg = &self.config.avg_hf_drop;
        let severity = classify(drop, cfg.warning_threshold, cfg.critical_threshold);

        let obs = Observation {
            key: AlertKey::new(JOB_NAME, ENTITY, "avg_hf_drop"),
            severity,
            value: drop,
            summary: String::new(),
            details: format!(
                "Weighted Avg HF: {:.4} (1h ago: {:.4})\nDrop: {:.4}\nTotal Collateral: ${}\nTotal Borrow: ${}",
                metrics.weighted_avg_hf,
                prior,
                drop,
                format_usd(metrics.total_supplied),
                format_usd(metrics.total_borrowed),
            ),
            business_alert: true,
            slack_message: String::new(),
        };
        if let Err(e) = self.alerts.observe(obs).await {
            tracing::error!(job = JOB_NAME, error = %e, "observe failed");
        }
    }

    async fn check_withdrawal_spike(&self, metrics: &AggregateMetrics) {
        let now = Utc::now();
        let decision = {
            let mut b = self.lock_baselines();
            if now - b.last_supply_check >= Duration::hours(24) && b.last_supply > 0.0 {
                let baseline = b.last_supply;
                b.last_supply = metrics.total_supplied;
                b.last_supply_check = now;
                Some(baseline)
            } else if b.last_supply == 0.0 {
                // First sighting seeds the baseline silently.
                b.last_supply = metrics.total_supplied;
                b.last_supply_check = now;
                None
            } else {
                None
            }
        };
        let Some(baseline) = decision else { return };

        let change = metrics.total_supplied - baseline;
        let percent_change = change / baseline * 100.0;
        let percent_decrease = -percent_change;
        let cfg = &self.config.withdrawal_spike;
        let severity = classify(
            percent_decrease,
            cfg.warning_threshold_percent,
            cfg.critical_threshold_percent,
        );

        let obs = Observation {
            key: AlertKey::new(JOB_NAME, ENTITY, "withdrawal_spike"),
            severity,
            value: percent_decrease,
            summary: String::new(),
            details: format!(
                "Supply Change: {:.2}% (24h)\nCurrent Supply: ${}\n24h ago: ${}\nChange: ${}",
                percent_change,
                format_usd(metrics.total_supplied),
                format_usd(baseline),
                format_usd(change),
            ),
            business_alert: true,
            slack_message: String::new(),
        };
        if let Err(e) = self.alerts.observe(obs).await {
            tracing::error!(job = JOB_NAME, error = %e, "observe failed");
        }
    }

    async fn check_borrow_spike(&self, metrics: &AggregateMetrics) {
        let now = Utc::now();
        let decision = {
            let mut b = self.lock_baselines();
            if now - b.last_borrow_check >= Duration::hours(24) && b.last_borrow > 0.0 {
                let baseline = b.last_borrow;
                b.last_borrow = metrics.total_borrowed;
                b.last_borrow_check = now;
                Some(baseline)
            } else if b.last_borrow == 0.0 {
                b.last_borrow = metrics.total_borrowed;
                b.last_borrow_check = now;
                None
            } else {
                None
            }
        };
        let Some(baseline) = decision else { return };

        let change = metrics.total_borrowed - baseline;
        let percent_change = change / baseline * 100.0;
        let cfg = &self.config.borrow_spike;
        let severity = classify(
            percent_change,
            cfg.warning_threshold_percent,
            cfg.critical_threshold_percent,
        );

        let obs = Observation {
            key: AlertKey::new(JOB_NAME, ENTITY, "borrow_spike"),
            severity,
            value: percent_change,
            summary: String::new(),
            details: format!(
                "Borrow Change: {:.2}% (24h)\nCurrent Borrow: ${}\n24h ago: ${}\nChange: ${}",
                percent_change,
                format_usd(metrics.total_borrowed),
                format_usd(baseline),
                format_usd(change),
            ),
            business_alert: true,
            slack_message: String::new(),
        };
        if let Err(e) = self.alerts.observe(obs).await {
            tracing::error!(job = JOB_NAME, error = %e, "observe failed");
        }
    }

    fn lock_baselines(&self) -> MutexGuard<'_, Baselines> {
        self.baselines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Job for AggregateHealthJob {
    fn name(&self) -> &str {
        JOB_NAME
    }

    fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.config.check_interval_seconds.max(1))
    }

    async fn run(&self) -> Result<()> {
        let metrics = self
            .store
            .aggregate_metrics()
            .await
            .context("failed to get aggregate metrics")?;

        self.check_risky_count_spike(&metrics).await;
        self.check_avg_hf_drop(&metrics).await;
        self.check_withdrawal_spike(&metrics).await;
        self.check_borrow_spike(&metrics).await;

        tracing::info!(
            job = JOB_NAME,
            risky = metrics.risky_positions,
            total = metrics.total_positions,
            weighted_avg_hf = %format!("{:.4}", metrics.weighted_avg_hf),
            supply = %format_usd(metrics.total_supplied),
            borrow = %format_usd(metrics.total_borrowed),
            "aggregates checked"
        );
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.store.close().await;
        Ok(())
    }
}

/// Percent growth of the risky-position count against its 24 h
/// baseline. The floor on the denominator keeps an empty baseline from
/// dividing by zero.
pub(crate) fn risky_spike_percent(current: i64, baseline: i64) -> f64 {
    (current - baseline) as f64 / baseline.max(1) as f64 * 100.0
}
