use chrono::Duration;
use lendmon_common::types::Severity;

/// A value-dependent cooldown override: readings at or above `threshold`
/// use `cooldown` instead of the severity default.
#[derive(Debug, Clone)]
pub struct DynamicCooldown {
    pub threshold: f64,
    pub cooldown: Duration,
}

/// Per-(job, metric) alerting behaviour.
#[derive(Debug, Clone)]
pub struct AlertPolicy {
    /// Minimum absolute percent change in the metric required to resend
    /// at the same severity once the cooldown has elapsed.
    pub min_value_change: f64,

    pub cooldown_warning: Duration,
    pub cooldown_critical: Duration,

    /// Sorted by threshold descending; the first entry whose threshold
    /// is at or below the current value wins.
    pub dynamic_cooldowns: Vec<DynamicCooldown>,

    /// When positive, a Critical incident re-sends a reminder to the
    /// developer channel every interval even without a value change.
    pub reminder_interval: Duration,

    /// Advisory: the value at which the producing job is expected to
    /// classify the metric as non-OK. Classification happens in the
    /// jobs, never in the manager.
    pub trigger_threshold: f64,

    /// OK readings needed before an incident clears.
    pub consecutive_ok_required: u32,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            min_value_change: 10.0,
            cooldown_warning: Duration::minutes(15),
            cooldown_critical: Duration::minutes(5),
            dynamic_cooldowns: Vec::new(),
            reminder_interval: Duration::minutes(60),
            trigger_threshold: 0.0,
            consecutive_ok_required: 2,
        }
    }
}

impl AlertPolicy {
    /// Resolves the effective cooldown for a same-severity repeat.
    /// Dynamic cooldowns take precedence over the severity defaults.
    pub fn cooldown_for(&self, severity: Severity, value: f64) -> Duration {
        for dc in &self.dynamic_cooldowns {
            if value >= dc.threshold {
                return dc.cooldown;
            }
        }
        match severity {
            Severity::Critical => self.cooldown_critical,
            _ => self.cooldown_warning,
        }
    }
}
