use chrono::Duration;
use lendmon_alert::{AlertPolicy, DynamicCooldown};
use serde::Deserialize;

/// Oracle monitoring thresholds, one block per token class.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub check_interval_seconds: u64,
    pub stablecoin: OracleThresholds,
    pub volatile: OracleThresholds,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            check_interval_seconds: 120,
            stablecoin: OracleThresholds::stablecoin_defaults(),
            volatile: OracleThresholds::volatile_defaults(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OracleThresholds {
    pub warning_threshold_percent: f64,
    pub critical_threshold_percent: f64,
    pub min_value_change_percent: f64,
    pub cooldown_warning_minutes: i64,
    pub cooldown_critical_minutes: i64,
    pub consecutive_ok_required: u32,
    pub dynamic_cooldowns: Vec<DynamicCooldownConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DynamicCooldownConfig {
    pub threshold_percent: f64,
    pub cooldown_seconds: i64,
}

impl OracleThresholds {
    pub fn stablecoin_defaults() -> Self {
        Self {
            warning_threshold_percent: 1.0,
            critical_threshold_percent: 2.0,
            min_value_change_percent: 0.2,
            cooldown_warning_minutes: 30,
            cooldown_critical_minutes: 5,
            consecutive_ok_required: 3,
            dynamic_cooldowns: vec![
                DynamicCooldownConfig {
                    threshold_percent: 10.0,
                    cooldown_seconds: 10,
                },
                DynamicCooldownConfig {
                    threshold_percent: 5.0,
                    cooldown_seconds: 30,
                },
            ],
        }
    }

    pub fn volatile_defaults() -> Self {
        Self {
            warning_threshold_percent: 3.0,
            critical_threshold_percent: 5.0,
            min_value_change_percent: 1.0,
            cooldown_warning_minutes: 30,
            cooldown_critical_minutes: 5,
            consecutive_ok_required: 1,
            dynamic_cooldowns: vec![
                DynamicCooldownConfig {
                    threshold_percent: 20.0,
                    cooldown_seconds: 10,
                },
                DynamicCooldownConfig {
                    threshold_percent: 10.0,
                    cooldown_seconds: 30,
                },
            ],
        }
    }

    /// Alert policy carrying these thresholds.
    pub fn policy(&self) -> AlertPolicy {
        AlertPolicy {
            min_value_change: self.min_value_change_percent,
            cooldown_warning: Duration::minutes(self.cooldown_warning_minutes),
            cooldown_critical: Duration::minutes(self.cooldown_critical_minutes),
            dynamic_cooldowns: self
                .dynamic_cooldowns
                .iter()
                .map(|dc| DynamicCooldown {
                    threshold: dc.threshold_percent,
                    cooldown: Duration::seconds(dc.cooldown_seconds),
                })
                .collect(),
            reminder_interval: Duration::zero(),
            trigger_threshold: self.warning_threshold_percent,
            consecutive_ok_required: self.consecutive_ok_required,
        }
    }
}

impl Default for OracleThresholds {
    fn default() -> Self {
        Self::stablecoin_defaults()
    }
}
