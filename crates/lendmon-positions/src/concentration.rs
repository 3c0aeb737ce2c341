use anyhow::Result;
use async_trait::async_trait;
use lendmon_alert::{AlertManager, Observation};
use lendmon_common::types::{AlertKey, Severity};
use lendmon_worker::Job;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::ConcentrationConfig;
use crate::store::{BorrowerShare, PositionStore};
use crate::{classify, format_usd};

const JOB_NAME: &str = "concentration";
const TOP_BORROWERS: i64 = 10;

/// Whale supply and borrow concentration monitoring.
pub struct ConcentrationJob {
    store: PositionStore,
    alerts: Arc<AlertManager>,
    config: ConcentrationConfig,
    /// Whale addresses seen on the previous run, for drop-out clearing.
    previous_whales: Mutex<HashSet<String>>,
}

impl ConcentrationJob {
    pub fn new(
        store: PositionStore,
        alerts: Arc<AlertManager>,
        config: ConcentrationConfig,
    ) -> Self {
        alerts.register_policy(JOB_NAME, "whale_supply", config.whale_supply.policy());
        alerts.register_policy(JOB_NAME, "borrow_top10", config.borrow_top10.policy());
        alerts.register_policy(JOB_NAME, "borrow_single", config.borrow_single.policy());
        Self {
            store,
            alerts,
            config,
            previous_whales: Mutex::new(HashSet::new()),
        }
    }

    async fn check_whale_positions(&self) -> Result<()> {
        let cfg = &self.config.whale_supply;
        let whales = self
            .store
            .whale_positions(cfg.warning_threshold_percent)
            .await?;

        let mut current: HashSet<String> = HashSet::new();
        for whale in &whales {
            current.insert(whale.user_address.clone());

            let severity = classify(
                whale.percentage,
                cfg.warning_threshold_percent,
                cfg.critical_threshold_percent,
            );
            tracing::info!(
                job = JOB_NAME,
                address = %whale.user_address,
                concentration = %format!("{:.2}%", whale.percentage),
                supply = %format_usd(whale.total_supplied),
                severity = %severity,
                "whale position"
            );

            let obs = Observation {
                key: AlertKey::new(JOB_NAME, whale.user_address.clone(), "whale_supply"),
                severity,
                value: whale.percentage,
                summary: String::new(),
                details: format!(
                    "Supply Concentration: {:.2}%\nSupply: ${}\nAddress: {}",
                    whale.percentage,
                    format_usd(whale.total_supplied),
                    whale.user_address,
                ),
                business_alert: true,
                slack_message: String::new(),
            };
            if let Err(e) = self.alerts.observe(obs).await {
                tracing::error!(job = JOB_NAME, error = %e, "observe failed");
            }
        }

        // Whales that fell below the threshold get explicit OK readings
        // so the manager can clear them through hysteresis.
        let dropped = {
            let mut previous = self.lock_whales();
            let dropped = dropped_whales(&previous, &current);
            *previous = current;
            dropped
        };
        for address in dropped {
            let obs = Observation {
                key: AlertKey::new(JOB_NAME, address, "whale_supply"),
                severity: Severity::Ok,
                value: 0.0,
                summary: String::new(),
                details: String::new(),
                business_alert: false,
                slack_message: String::new(),
            };
            if let Err(e) = self.alerts.observe(obs).await {
                tracing::error!(job = JOB_NAME, error = %e, "observe failed");
            }
        }

        if !whales.is_empty() {
            tracing::info!(job = JOB_NAME, count = whales.len(), "whale positions found");
        }
        Ok(())
    }

    async fn check_borrow_concentration(&self) -> Result<()> {
        let total_borrows = self.store.total_borrowed().await?;
        if total_borrows == 0.0 {
            // Nothing borrowed: clear any standing concentration alert.
            let obs = Observation {
                key: AlertKey::new(JOB_NAME, "protocol", "borrow_top10"),
                severity: Severity::Ok,
                value: 0.0,
                summary: String::new(),
                details: String::new(),
                business_alert: false,
                slack_message: String::new(),
            };
            if let Err(e) = self.alerts.observe(obs).await {
                tracing::error!(job = JOB_NAME, error = %e, "observe failed");
            }
            return Ok(());
        }

        let top = self.store.top_borrowers(total_borrows, TOP_BORROWERS).await?;
        let Some(shares) = concentration_shares(&top, total_borrows) else {
            return Ok(());
        };

        tracing::info!(
            job = JOB_NAME,
            top10 = %format!("{:.2}%", shares.top10_percentage),
            single_max = %format!("{:.2}%", shares.max_single_percentage),
            total = %format_usd(total_borrows),
            "borrow concentration"
        );

        let cfg = &self.config.borrow_top10;
        let obs = Observation {
            key: AlertKey::new(JOB_NAME, "protocol", "borrow_top10"),
            severity: classify(
                shares.top10_percentage,
                cfg.warning_threshold_percent,
                cfg.critical_threshold_percent,
            ),
            value: shares.top10_percentage,
            summary: String::new(),
            details: format!(
                "Top 10 Borrow Concentration: {:.2}%\nTop 10 Borrows: ${}\nTotal Borrows: ${}",
                shares.top10_percentage,
                format_usd(shares.top10_sum),
                format_usd(total_borrows),
            ),
            business_alert: true,
            slack_message: String::new(),
        };
        if let Err(e) = self.alerts.observe(obs).await {
            tracing::error!(job = JOB_NAME, error = %e, "observe failed");
        }

        let cfg = &self.config.borrow_single;
        let obs = Observation {
            key: AlertKey::new(JOB_NAME, shares.max_address.clone(), "borrow_single"),
            severity: classify(
                shares.max_single_percentage,
                cfg.warning_threshold_percent,
                cfg.critical_threshold_percent,
            ),
            value: shares.max_single_percentage,
            summary: String::new(),
            details: format!(
                "Single Wallet Borrow: {:.2}%\nBorrow: ${}\nTotal Borrows: ${}\nAddress: {}",
                shares.max_single_percentage,
                format_usd(shares.max_single),
                format_usd(total_borrows),
                shares.max_address,
            ),
            business_alert: true,
            slack_message: String::new(),
        };
        if let Err(e) = self.alerts.observe(obs).await {
            tracing::error!(job = JOB_NAME, error = %e, "observe failed");
        }

        Ok(())
    }

    fn lock_whales(&self) -> MutexGuard<'_, HashSet<String>> {
        self.previous_whales
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Job for ConcentrationJob {
    fn name(&self) -> &str {
        JOB_NAME
    }

    fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.config.check_interval_seconds.max(1))
    }

    async fn run(&self) -> Result<()> {
        if let Err(e) = self.check_whale_positions().await {
            tracing::error!(job = JOB_NAME, error = %e, "whale check failed");
        }
        if let Err(e) = self.check_borrow_concentration().await {
            tracing::error!(job = JOB_NAME, error = %e, "borrow concentration check failed");
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.store.close().await;
        Ok(())
    }
}

pub(crate) struct ConcentrationShares {
    pub top10_sum: f64,
    pub top10_percentage: f64,
    pub max_single: f64,
    pub max_single_percentage: f64,
    pub max_address: String,
}

/// Aggregates the top-borrower rows into the two concentration
/// readings. None when there are no borrowers at all.
pub(crate) fn concentration_shares(
    top: &[BorrowerShare],
    total_borrows: f64,
) -> Option<ConcentrationShares> {
    let largest = top.first()?;
    let top10_sum: f64 = top.iter().map(|b| b.total_borrowed).sum();
    Some(ConcentrationShares {
        top10_sum,
        top10_percentage: top10_sum / total_borrows * 100.0,
        max_single: largest.total_borrowed,
        max_single_percentage: largest.total_borrowed / total_borrows * 100.0,
        max_address: largest.user_address.clone(),
    })
}

/// Addresses that were whales last run but are absent now.
pub(crate) fn dropped_whales(
    previous: &HashSet<String>,
    current: &HashSet<String>,
) -> Vec<String> {
    previous.difference(current).cloned().collect()
}
