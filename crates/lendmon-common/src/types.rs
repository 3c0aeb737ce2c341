use serde::{Deserialize, Serialize};

/// Alert severity. Ordering is total and drives escalation tests:
/// `Ok < Warning < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Warning,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Ok => write!(f, "OK"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ok" => Ok(Severity::Ok),
            "warning" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("unknown severity: {s}")),
        }
    }
}

/// Identity of a logical alert instance.
///
/// `job` names a scheduled job (e.g. `oracle_base`), `entity` the
/// monitored subject (token symbol, wallet address, or a sentinel like
/// `protocol`), `metric` the signal (e.g. `price_deviation_stable`).
/// The triple must be stable across observations for the same incident.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub job: String,
    pub entity: String,
    pub metric: String,
}

impl AlertKey {
    pub fn new(
        job: impl Into<String>,
        entity: impl Into<String>,
        metric: impl Into<String>,
    ) -> Self {
        Self {
            job: job.into(),
            entity: entity.into(),
            metric: metric.into(),
        }
    }
}

impl std::fmt::Display for AlertKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.job, self.entity, self.metric)
    }
}
