use anyhow::Result;
use chrono::{DateTime, Utc};
use lendmon_common::clock::{Clock, SystemClock};
use lendmon_common::types::{AlertKey, Severity};
use lendmon_notify::AlertSink;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use crate::policy::AlertPolicy;
use crate::routing::{route, AlertKind, Route};

/// One observation of a risk signal, already classified by the
/// producing job. `slack_message` is the separately formatted body for
/// the Slack webhook; it only travels with business sends.
#[derive(Debug, Clone)]
pub struct Observation {
    pub key: AlertKey,
    pub severity: Severity,
    pub value: f64,
    pub summary: String,
    pub details: String,
    pub business_alert: bool,
    pub slack_message: String,
}

/// Lifecycle state of one active alert instance. The stored severity is
/// never OK: an OK signal is represented by the entry's absence, with
/// `consecutive_ok` counting readings toward clearance in between.
#[derive(Debug, Clone)]
pub struct AlertState {
    pub severity: Severity,
    pub first_triggered: DateTime<Utc>,
    pub last_sent: DateTime<Utc>,
    pub last_value: f64,
    pub last_message: String,
    pub consecutive_ok: u32,
}

/// Decision record produced under the state lock. The lock is released
/// before any network send; `state` is persisted only after the primary
/// send succeeded.
struct Outbound {
    kind: AlertKind,
    message: String,
    route: Route,
    slack_message: String,
    state: AlertState,
}

enum Action {
    Nothing,
    Clear,
    Send(Box<Outbound>),
}

struct Inner {
    states: HashMap<AlertKey, AlertState>,
    policies: HashMap<String, AlertPolicy>,
}

/// Stateful alert lifecycle manager. Safe for concurrent use from any
/// number of producer jobs; observations for the same key are
/// serialised through the state lock.
pub struct AlertManager {
    inner: RwLock<Inner>,
    sink: Arc<dyn AlertSink>,
    clock: Arc<dyn Clock>,
}

impl AlertManager {
    pub fn new(sink: Arc<dyn AlertSink>) -> Self {
        Self::with_clock(sink, Arc::new(SystemClock))
    }

    pub fn with_clock(sink: Arc<dyn AlertSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                states: HashMap::new(),
                policies: HashMap::new(),
            }),
            sink,
            clock,
        }
    }

    /// Registers the policy for a job/metric pair, overwriting any prior
    /// entry. Called once per pair at startup.
    pub fn register_policy(&self, job: &str, metric: &str, policy: AlertPolicy) {
        let mut inner = self.write();
        inner.policies.insert(policy_key(job, metric), policy);
    }

    /// Processes one observation. Returns an error only when the primary
    /// notification send failed; in that case the stored state is left
    /// exactly as it was before the attempt.
    pub async fn observe(&self, obs: Observation) -> Result<()> {
        let action = self.evaluate(&obs);

        match action {
            Action::Nothing => Ok(()),
            Action::Clear => {
                let mut inner = self.write();
                inner.states.remove(&obs.key);
                tracing::info!(key = %obs.key, "incident cleared");
                Ok(())
            }
            Action::Send(out) => {
                self.dispatch(&out).await?;
                tracing::info!(
                    key = %obs.key,
                    severity = %out.state.severity,
                    kind = ?out.kind,
                    business = out.route.business,
                    "alert sent"
                );
                let mut inner = self.write();
                inner.states.insert(obs.key.clone(), out.state);
                Ok(())
            }
        }
    }

    /// Snapshot of every active incident.
    pub fn get_active_incidents(&self) -> HashMap<AlertKey, AlertState> {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        inner
            .states
            .iter()
            .filter(|(_, s)| s.severity != Severity::Ok)
            .map(|(k, s)| (k.clone(), s.clone()))
            .collect()
    }

    /// Drops all state. Testing only.
    pub fn clear_all(&self) {
        let mut inner = self.write();
        inner.states.clear();
    }

    /// Runs the decision procedure for one observation under the state
    /// lock. Hysteresis bookkeeping (the consecutive-OK counter, the
    /// counter reset on non-OK readings) is applied in place; everything
    /// that requires a send comes back as a decision record.
    fn evaluate(&self, obs: &Observation) -> Action {
        let mut inner = self.write();
        let now = self.clock.now();
        let policy = inner
            .policies
            .get(&policy_key(&obs.key.job, &obs.key.metric))
            .cloned()
            .unwrap_or_default();

        if obs.severity == Severity::Ok {
            let Some(state) = inner.states.get_mut(&obs.key) else {
                return Action::Nothing;
            };
            state.consecutive_ok += 1;
            if state.consecutive_ok >= policy.consecutive_ok_required {
                // Recoveries are silent; absence from the active set is
                // the signal.
                return Action::Clear;
            }
            return Action::Nothing;
        }

        if let Some(state) = inner.states.get_mut(&obs.key) {
            state.consecutive_ok = 0;
        }

        let Some(state) = inner.states.get(&obs.key).cloned() else {
            let kind = AlertKind::NewIncident;
            let message = format_message(kind, &obs.key.metric, &obs.details);
            return Action::Send(Box::new(Outbound {
                kind,
                route: route(kind, obs.business_alert, obs.severity),
                slack_message: obs.slack_message.clone(),
                state: AlertState {
                    severity: obs.severity,
                    first_triggered: now,
                    last_sent: now,
                    last_value: obs.value,
                    last_message: message.clone(),
                    consecutive_ok: 0,
                },
                message,
            }));
        };

        if obs.severity > state.severity {
            let kind = AlertKind::Escalation;
            let message = format_message(kind, &obs.key.metric, &obs.details);
            return Action::Send(Box::new(Outbound {
                kind,
                route: route(kind, obs.business_alert, obs.severity),
                slack_message: obs.slack_message.clone(),
                state: AlertState {
                    severity: obs.severity,
                    first_triggered: state.first_triggered,
                    last_sent: now,
                    last_value: obs.value,
                    last_message: message.clone(),
                    consecutive_ok: 0,
                },
                message,
            }));
        }

        if obs.severity < state.severity {
            let kind = AlertKind::Deescalation;
            let message = format_message(kind, &obs.key.metric, &obs.details);
            return Action::Send(Box::new(Outbound {
                kind,
                route: route(kind, obs.business_alert, obs.severity),
                slack_message: String::new(),
                state: AlertState {
                    severity: obs.severity,
                    first_triggered: state.first_triggered,
                    last_sent: now,
                    last_value: obs.value,
                    last_message: message.clone(),
                    consecutive_ok: 0,
                },
                message,
            }));
        }

        // Same severity from here on.
        let since_sent = now - state.last_sent;
        let since_first = now - state.first_triggered;

        // Periodic reminder for still-critical incidents, checked ahead
        // of the cooldown gate so a long-running incident resurfaces
        // even when nothing changed.
        if obs.severity == Severity::Critical
            && policy.reminder_interval > chrono::Duration::zero()
            && since_first >= policy.reminder_interval
            && since_sent >= policy.reminder_interval
        {
            let kind = AlertKind::Reminder;
            let message = format_message(kind, &obs.key.metric, &obs.details);
            return Action::Send(Box::new(Outbound {
                kind,
                route: route(kind, obs.business_alert, obs.severity),
                slack_message: String::new(),
                state: AlertState {
                    severity: obs.severity,
                    first_triggered: state.first_triggered,
                    last_sent: now,
                    last_value: obs.value,
                    last_message: message.clone(),
                    consecutive_ok: 0,
                },
                message,
            }));
        }

        if since_sent < policy.cooldown_for(obs.severity, obs.value) {
            return Action::Nothing;
        }

        let percent_change = if state.last_value != 0.0 {
            ((obs.value - state.last_value) / state.last_value * 100.0).abs()
        } else if obs.value != 0.0 {
            // From zero to anything is a full swing.
            100.0
        } else {
            0.0
        };
        if percent_change < policy.min_value_change {
            return Action::Nothing;
        }

        let kind = AlertKind::Update;
        let r = route(kind, obs.business_alert, obs.severity);
        let message = format_message(kind, &obs.key.metric, &obs.details);
        Action::Send(Box::new(Outbound {
            kind,
            route: r,
            slack_message: if r.slack {
                obs.slack_message.clone()
            } else {
                String::new()
            },
            state: AlertState {
                severity: obs.severity,
                first_triggered: state.first_triggered,
                last_sent: now,
                last_value: obs.value,
                last_message: message.clone(),
                consecutive_ok: 0,
            },
            message,
        }))
    }

    /// Performs the sends for one decision record, outside the state
    /// lock. The first target is primary and its failure propagates;
    /// the Slack fan-out and the developer mirror of a business alert
    /// are best-effort.
    async fn dispatch(&self, out: &Outbound) -> Result<()> {
        if out.route.business {
            self.sink.send_business(&out.message).await?;
            if out.route.slack && !out.slack_message.is_empty() {
                if let Err(e) = self.sink.send_slack(&out.slack_message).await {
                    tracing::warn!(error = %e, "slack alert failed");
                }
            }
            if let Err(e) = self.sink.send_developer(&out.message).await {
                tracing::warn!(error = %e, "developer copy failed");
            }
            return Ok(());
        }
        self.sink.send_developer(&out.message).await
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn policy_key(job: &str, metric: &str) -> String {
    format!("{job}:{metric}")
}

/// Human title for a metric. Job names vary per chain, so the lookup is
/// metric-based.
fn alert_title(metric: &str) -> String {
    let fixed = match metric {
        "price_deviation_stable" => Some("STABLECOIN DEPEG ALERT"),
        "price_deviation_volatile" => Some("ORACLE PRICE DEVIATION"),
        "system_health" => Some("ORACLE SYSTEM HEALTH"),
        "data_staleness" => Some("DATA STALE"),
        "token_error" => Some("TOKEN PRICE ERROR"),
        "risky_count_spike" => Some("RISKY POSITIONS SPIKE"),
        "avg_hf_drop" => Some("AVERAGE HEALTH FACTOR DROP"),
        "withdrawal_spike" => Some("WITHDRAWAL SPIKE ALERT"),
        "borrow_spike" => Some("BORROW SPIKE ALERT"),
        "whale_supply" => Some("WHALE POSITION ALERT"),
        "borrow_top10" => Some("BORROW CONCENTRATION - TOP 10"),
        "borrow_single" => Some("BORROW CONCENTRATION - SINGLE WALLET"),
        _ => None,
    };
    match fixed {
        Some(title) => title.to_string(),
        None => metric.replace('_', " ").to_uppercase(),
    }
}

fn format_message(kind: AlertKind, metric: &str, details: &str) -> String {
    let emoji = match kind {
        AlertKind::Deescalation => "✅",
        _ => "🚨",
    };
    format!("{emoji} {}\n\n{}", alert_title(metric), details)
}
