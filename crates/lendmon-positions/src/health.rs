use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use lendmon_alert::{AlertManager, AlertPolicy, Observation};
use lendmon_common::types::{AlertKey, Severity};
use lendmon_worker::Job;
use std::sync::Arc;

use crate::config::HealthFactorConfig;
use crate::store::PositionStore;
use crate::format_usd;

const JOB_NAME: &str = "health_factor";

/// Database operations whose failures get their own alert keys.
const DB_OPERATIONS: [&str; 2] = ["freshness_check", "query_positions"];

/// Individual position sweep plus data-staleness watchdog.
///
/// Risky positions are fetched and logged only: per-user alerts are
/// deliberately not emitted, aggregate monitoring carries the systemic
/// signal without flooding the channel during downturns.
pub struct HealthJob {
    store: PositionStore,
    alerts: Arc<AlertManager>,
    config: HealthFactorConfig,
}

impl HealthJob {
    pub fn new(
        store: PositionStore,
        alerts: Arc<AlertManager>,
        config: HealthFactorConfig,
    ) -> Self {
        alerts.register_policy(
            JOB_NAME,
            "data_staleness",
            AlertPolicy {
                min_value_change: 60.0,
                cooldown_warning: Duration::hours(1),
                cooldown_critical: Duration::minutes(30),
                dynamic_cooldowns: Vec::new(),
                reminder_interval: Duration::hours(4),
                trigger_threshold: 5.0,
                consecutive_ok_required: 1,
            },
        );
        Self {
            store,
            alerts,
            config,
        }
    }

    async fn check_data_freshness(&self) -> Result<()> {
        let Some(last_update) = self.store.last_update().await? else {
            tracing::warn!(job = JOB_NAME, "UserPositions table is empty");
            return Ok(());
        };

        let age_hours = (Utc::now() - last_update).num_seconds() as f64 / 3600.0;
        let severity = staleness_severity(age_hours);

        let obs = Observation {
            key: AlertKey::new(JOB_NAME, "database", "data_staleness"),
            severity,
            value: age_hours,
            summary: "UserPositions data freshness".to_string(),
            details: format!(
                "Last update: {}\nAge: {:.1} hours",
                last_update.format("%Y-%m-%d %H:%M:%S UTC"),
                age_hours,
            ),
            business_alert: false,
            slack_message: String::new(),
        };
        if let Err(e) = self.alerts.observe(obs).await {
            tracing::error!(job = JOB_NAME, error = %e, "observe failed");
        }
        Ok(())
    }

    async fn observe_database_error(&self, operation: &str, err: &anyhow::Error) {
        let obs = Observation {
            key: AlertKey::new(JOB_NAME, "database", format!("{operation}_error")),
            severity: Severity::Critical,
            value: 1.0,
            summary: format!("Database operation failed: {operation}"),
            details: format!("Error: {err:#}"),
            business_alert: false,
            slack_message: String::new(),
        };
        if let Err(e) = self.alerts.observe(obs).await {
            tracing::error!(job = JOB_NAME, error = %e, "observe failed");
        }
    }

    async fn clear_database_errors(&self) {
        for operation in DB_OPERATIONS {
            let obs = Observation {
                key: AlertKey::new(JOB_NAME, "database", format!("{operation}_error")),
                severity: Severity::Ok,
                value: 0.0,
                summary: "Database operational".to_string(),
                details: String::new(),
                business_alert: false,
                slack_message: String::new(),
            };
            if let Err(e) = self.alerts.observe(obs).await {
                tracing::error!(job = JOB_NAME, error = %e, "observe failed");
            }
        }
    }
}

#[async_trait]
impl Job for HealthJob {
    fn name(&self) -> &str {
        JOB_NAME
    }

    fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.config.check_interval_seconds.max(1))
    }

    async fn run(&self) -> Result<()> {
        if let Err(e) = self.check_data_freshness().await {
            self.observe_database_error("freshness_check", &e).await;
            return Err(e).context("failed to check data freshness");
        }

        let positions = match self
            .store
            .risky_positions(
                self.config.position.warning_threshold,
                self.config.position.query_limit,
            )
            .await
        {
            Ok(positions) => positions,
            Err(e) => {
                self.observe_database_error("query_positions", &e).await;
                return Err(e).context("failed to get risky positions");
            }
        };

        self.clear_database_errors().await;

        for pos in &positions {
            tracing::debug!(
                job = JOB_NAME,
                address = %pos.user_address,
                health_factor = %format!("{:.4}", pos.health_factor),
                supply = %format_usd(pos.total_supplied),
                borrow = %format_usd(pos.total_borrowed),
                "risky position"
            );
        }
        tracing::info!(job = JOB_NAME, count = positions.len(), "processed risky positions");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.store.close().await;
        Ok(())
    }
}

pub(crate) fn staleness_severity(age_hours: f64) -> Severity {
    if age_hours > 10.0 {
        Severity::Critical
    } else if age_hours > 5.0 {
        Severity::Warning
    } else {
        Severity::Ok
    }
}
