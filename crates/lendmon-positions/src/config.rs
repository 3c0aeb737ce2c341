use chrono::Duration;
use lendmon_alert::AlertPolicy;
use serde::Deserialize;

/// Health factor monitoring thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HealthFactorConfig {
    pub check_interval_seconds: u64,
    pub position: PositionConfig,
    pub risky_count_spike: SpikeConfig,
    pub avg_hf_drop: DropConfig,
    pub withdrawal_spike: SpikeConfig,
    pub borrow_spike: SpikeConfig,
}

impl Default for HealthFactorConfig {
    fn default() -> Self {
        Self {
            check_interval_seconds: 300,
            position: PositionConfig::default(),
            risky_count_spike: SpikeConfig {
                warning_threshold_percent: 25.0,
                critical_threshold_percent: 50.0,
                min_value_change_percent: 5.0,
                cooldown_warning_minutes: 60,
                cooldown_critical_minutes: 30,
                consecutive_ok_required: 2,
            },
            avg_hf_drop: DropConfig::default(),
            withdrawal_spike: SpikeConfig::default(),
            borrow_spike: SpikeConfig::default(),
        }
    }
}

/// Query bounds for the individual-position sweep.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PositionConfig {
    pub warning_threshold: f64,
    pub query_limit: i64,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            warning_threshold: 1.5,
            query_limit: 100,
        }
    }
}

/// Percent-change checks against a 24 h baseline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpikeConfig {
    pub warning_threshold_percent: f64,
    pub critical_threshold_percent: f64,
    pub min_value_change_percent: f64,
    pub cooldown_warning_minutes: i64,
    pub cooldown_critical_minutes: i64,
    pub consecutive_ok_required: u32,
}

impl Default for SpikeConfig {
    fn default() -> Self {
        Self {
            warning_threshold_percent: 10.0,
            critical_threshold_percent: 20.0,
            min_value_change_percent: 2.0,
            cooldown_warning_minutes: 60,
            cooldown_critical_minutes: 30,
            consecutive_ok_required: 2,
        }
    }
}

impl SpikeConfig {
    pub fn policy(&self, reminder: Duration) -> AlertPolicy {
        AlertPolicy {
            min_value_change: self.min_value_change_percent,
            cooldown_warning: Duration::minutes(self.cooldown_warning_minutes),
            cooldown_critical: Duration::minutes(self.cooldown_critical_minutes),
            dynamic_cooldowns: Vec::new(),
            reminder_interval: reminder,
            trigger_threshold: self.warning_threshold_percent,
            consecutive_ok_required: self.consecutive_ok_required,
        }
    }
}

/// Absolute-drop check on the weighted average health factor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DropConfig {
    pub warning_threshold: f64,
    pub critical_threshold: f64,
    pub min_value_change: f64,
    pub cooldown_warning_minutes: i64,
    pub cooldown_critical_minutes: i64,
    pub consecutive_ok_required: u32,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            warning_threshold: 0.05,
            critical_threshold: 0.2,
            min_value_change: 0.02,
            cooldown_warning_minutes: 30,
            cooldown_critical_minutes: 15,
            consecutive_ok_required: 2,
        }
    }
}

impl DropConfig {
    pub fn policy(&self, reminder: Duration) -> AlertPolicy {
        AlertPolicy {
            min_value_change: self.min_value_change,
            cooldown_warning: Duration::minutes(self.cooldown_warning_minutes),
            cooldown_critical: Duration::minutes(self.cooldown_critical_minutes),
            dynamic_cooldowns: Vec::new(),
            reminder_interval: reminder,
            trigger_threshold: self.warning_threshold,
            consecutive_ok_required: self.consecutive_ok_required,
        }
    }
}

/// Concentration monitoring thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConcentrationConfig {
    pub check_interval_seconds: u64,
    pub whale_supply: ThresholdConfig,
    pub borrow_top10: ThresholdConfig,
    pub borrow_single: ThresholdConfig,
}

impl Default for ConcentrationConfig {
    fn default() -> Self {
        Self {
            check_interval_seconds: 600,
            whale_supply: ThresholdConfig {
                warning_threshold_percent: 10.0,
                critical_threshold_percent: 20.0,
                min_value_change_percent: 1.0,
                cooldown_warning_minutes: 60,
                cooldown_critical_minutes: 30,
                consecutive_ok_required: 3,
            },
            borrow_top10: ThresholdConfig {
                warning_threshold_percent: 80.0,
                critical_threshold_percent: 90.0,
                min_value_change_percent: 2.0,
                cooldown_warning_minutes: 60,
                cooldown_critical_minutes: 30,
                consecutive_ok_required: 3,
            },
            borrow_single: ThresholdConfig {
                warning_threshold_percent: 40.0,
                critical_threshold_percent: 50.0,
                min_value_change_percent: 2.0,
                cooldown_warning_minutes: 60,
                cooldown_critical_minutes: 30,
                consecutive_ok_required: 3,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub warning_threshold_percent: f64,
    pub critical_threshold_percent: f64,
    pub min_value_change_percent: f64,
    pub cooldown_warning_minutes: i64,
    pub cooldown_critical_minutes: i64,
    pub consecutive_ok_required: u32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            warning_threshold_percent: 10.0,
            critical_threshold_percent: 20.0,
            min_value_change_percent: 1.0,
            cooldown_warning_minutes: 60,
            cooldown_critical_minutes: 30,
            consecutive_ok_required: 3,
        }
    }
}

impl ThresholdConfig {
    pub fn policy(&self) -> AlertPolicy {
        AlertPolicy {
            min_value_change: self.min_value_change_percent,
            cooldown_warning: Duration::minutes(self.cooldown_warning_minutes),
            cooldown_critical: Duration::minutes(self.cooldown_critical_minutes),
            dynamic_cooldowns: Vec::new(),
            reminder_interval: Duration::zero(),
            trigger_threshold: self.warning_threshold_percent,
            consecutive_ok_required: self.consecutive_ok_required,
        }
    }
}
