use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use lendmon_common::clock::Clock;
use lendmon_common::types::{AlertKey, Severity};
use lendmon_notify::AlertSink;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::manager::{AlertManager, Observation};
use crate::policy::{AlertPolicy, DynamicCooldown};
use crate::routing::{route, AlertKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Business,
    Developer,
    Slack,
}

#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<(Channel, String)>>,
    fail_business: AtomicBool,
    fail_developer: AtomicBool,
}

impl RecordingSink {
    fn sends(&self) -> Vec<(Channel, String)> {
        self.sent.lock().unwrap().clone()
    }

    fn count(&self, channel: Channel) -> usize {
        self.sends().iter().filter(|(c, _)| *c == channel).count()
    }

    fn total(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    fn last(&self) -> (Channel, String) {
        self.sends().last().cloned().expect("no sends recorded")
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn send_business(&self, message: &str) -> Result<()> {
        if self.fail_business.load(Ordering::SeqCst) {
            anyhow::bail!("business endpoint down");
        }
        self.sent
            .lock()
            .unwrap()
            .push((Channel::Business, message.to_string()));
        Ok(())
    }

    async fn send_developer(&self, message: &str) -> Result<()> {
        if self.fail_developer.load(Ordering::SeqCst) {
            anyhow::bail!("developer endpoint down");
        }
        self.sent
            .lock()
            .unwrap()
            .push((Channel::Developer, message.to_string()));
        Ok(())
    }

    async fn send_slack(&self, message: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((Channel::Slack, message.to_string()));
        Ok(())
    }
}

struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    fn advance(&self, d: Duration) {
        *self.now.lock().unwrap() += d;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

struct Harness {
    manager: AlertManager,
    sink: Arc<RecordingSink>,
    clock: Arc<ManualClock>,
}

fn harness() -> Harness {
    let start = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let sink = Arc::new(RecordingSink::default());
    let clock = Arc::new(ManualClock::new(start));
    let manager = AlertManager::with_clock(sink.clone(), clock.clone());
    Harness {
        manager,
        sink,
        clock,
    }
}

fn key() -> AlertKey {
    AlertKey::new("oracle_base", "USDC", "price_deviation_stable")
}

fn business_obs(key: &AlertKey, severity: Severity, value: f64) -> Observation {
    Observation {
        key: key.clone(),
        severity,
        value,
        summary: String::new(),
        details: format!("Deviation: {value:.2}%"),
        business_alert: true,
        slack_message: format!("ALERT\nDeviation: {value:.2}%"),
    }
}

fn developer_obs(key: &AlertKey, severity: Severity, value: f64) -> Observation {
    Observation {
        key: key.clone(),
        severity,
        value,
        summary: String::new(),
        details: format!("value {value:.2}"),
        business_alert: false,
        slack_message: String::new(),
    }
}

fn tight_policy() -> AlertPolicy {
    AlertPolicy {
        min_value_change: 0.0,
        cooldown_warning: Duration::minutes(15),
        cooldown_critical: Duration::minutes(5),
        dynamic_cooldowns: Vec::new(),
        reminder_interval: Duration::zero(),
        trigger_threshold: 0.0,
        consecutive_ok_required: 2,
    }
}

#[tokio::test]
async fn new_incident_fans_out_to_business_slack_and_developer() {
    let h = harness();
    let k = key();

    h.manager
        .observe(business_obs(&k, Severity::Critical, 2.3))
        .await
        .unwrap();

    let sends = h.sink.sends();
    assert_eq!(sends.len(), 3);
    assert_eq!(sends[0].0, Channel::Business);
    assert_eq!(sends[1].0, Channel::Slack);
    assert_eq!(sends[2].0, Channel::Developer);
    assert!(sends[0].1.starts_with("🚨 STABLECOIN DEPEG ALERT"));
    // Business message and developer mirror carry the same body.
    assert_eq!(sends[0].1, sends[2].1);
}

#[tokio::test]
async fn developer_alert_skips_business_channels() {
    let h = harness();
    let k = AlertKey::new("oracle_base", "WETH", "token_error");

    h.manager
        .observe(developer_obs(&k, Severity::Warning, 1.0))
        .await
        .unwrap();

    assert_eq!(h.sink.total(), 1);
    assert_eq!(h.sink.last().0, Channel::Developer);
}

#[tokio::test]
async fn empty_slack_message_is_not_sent() {
    let h = harness();
    let k = key();
    let mut obs = business_obs(&k, Severity::Critical, 2.3);
    obs.slack_message = String::new();

    h.manager.observe(obs).await.unwrap();

    assert_eq!(h.sink.count(Channel::Slack), 0);
    assert_eq!(h.sink.count(Channel::Business), 1);
    assert_eq!(h.sink.count(Channel::Developer), 1);
}

#[tokio::test]
async fn cooldown_suppresses_same_severity_repeat() {
    let h = harness();
    let k = key();
    let mut policy = tight_policy();
    policy.cooldown_critical = Duration::minutes(10);
    h.manager
        .register_policy("oracle_base", "price_deviation_stable", policy);

    h.manager
        .observe(business_obs(&k, Severity::Critical, 2.3))
        .await
        .unwrap();
    h.clock.advance(Duration::minutes(5));
    h.manager
        .observe(business_obs(&k, Severity::Critical, 2.3))
        .await
        .unwrap();

    assert_eq!(h.sink.count(Channel::Business), 1);
}

#[tokio::test]
async fn min_change_gate_requires_material_movement() {
    let h = harness();
    let k = key();
    let mut policy = tight_policy();
    policy.min_value_change = 5.0;
    h.manager
        .register_policy("oracle_base", "price_deviation_stable", policy);

    h.manager
        .observe(business_obs(&k, Severity::Critical, 100.0))
        .await
        .unwrap();
    h.clock.advance(Duration::minutes(15));
    h.manager
        .observe(business_obs(&k, Severity::Critical, 102.0))
        .await
        .unwrap();
    assert_eq!(h.sink.count(Channel::Business), 1);

    h.clock.advance(Duration::minutes(15));
    h.manager
        .observe(business_obs(&k, Severity::Critical, 110.0))
        .await
        .unwrap();
    assert_eq!(h.sink.count(Channel::Business), 2);
}

#[tokio::test]
async fn dynamic_cooldown_takes_precedence_over_severity_default() {
    let policy = AlertPolicy {
        min_value_change: 0.0,
        cooldown_critical: Duration::seconds(300),
        dynamic_cooldowns: vec![
            DynamicCooldown {
                threshold: 20.0,
                cooldown: Duration::seconds(10),
            },
            DynamicCooldown {
                threshold: 10.0,
                cooldown: Duration::seconds(30),
            },
        ],
        reminder_interval: Duration::zero(),
        ..AlertPolicy::default()
    };

    // Worst reading, shortest silence window.
    let h = harness();
    let k = key();
    h.manager
        .register_policy("oracle_base", "price_deviation_stable", policy.clone());
    h.manager
        .observe(business_obs(&k, Severity::Critical, 25.0))
        .await
        .unwrap();
    h.clock.advance(Duration::seconds(5));
    h.manager
        .observe(business_obs(&k, Severity::Critical, 25.0))
        .await
        .unwrap();
    assert_eq!(h.sink.count(Channel::Business), 1);
    h.clock.advance(Duration::seconds(6));
    h.manager
        .observe(business_obs(&k, Severity::Critical, 25.0))
        .await
        .unwrap();
    assert_eq!(h.sink.count(Channel::Business), 2);

    // Middle band.
    let h = harness();
    h.manager
        .register_policy("oracle_base", "price_deviation_stable", policy.clone());
    h.manager
        .observe(business_obs(&k, Severity::Critical, 15.0))
        .await
        .unwrap();
    h.clock.advance(Duration::seconds(11));
    h.manager
        .observe(business_obs(&k, Severity::Critical, 15.0))
        .await
        .unwrap();
    assert_eq!(h.sink.count(Channel::Business), 1);
    h.clock.advance(Duration::seconds(20));
    h.manager
        .observe(business_obs(&k, Severity::Critical, 15.0))
        .await
        .unwrap();
    assert_eq!(h.sink.count(Channel::Business), 2);

    // Below every dynamic threshold the severity default applies.
    let h = harness();
    h.manager
        .register_policy("oracle_base", "price_deviation_stable", policy);
    h.manager
        .observe(business_obs(&k, Severity::Critical, 5.0))
        .await
        .unwrap();
    h.clock.advance(Duration::seconds(31));
    h.manager
        .observe(business_obs(&k, Severity::Critical, 5.0))
        .await
        .unwrap();
    assert_eq!(h.sink.count(Channel::Business), 1);
    h.clock.advance(Duration::seconds(270));
    h.manager
        .observe(business_obs(&k, Severity::Critical, 5.0))
        .await
        .unwrap();
    assert_eq!(h.sink.count(Channel::Business), 2);
}

#[tokio::test]
async fn escalation_fires_regardless_of_cooldown_and_value() {
    let h = harness();
    let k = key();
    h.manager
        .register_policy("oracle_base", "price_deviation_stable", tight_policy());

    h.manager
        .observe(business_obs(&k, Severity::Warning, 1.2))
        .await
        .unwrap();
    let first_triggered = h.manager.get_active_incidents()[&k].first_triggered;

    h.clock.advance(Duration::seconds(20));
    h.manager
        .observe(business_obs(&k, Severity::Critical, 1.2))
        .await
        .unwrap();

    assert_eq!(h.sink.count(Channel::Business), 2);
    let incidents = h.manager.get_active_incidents();
    assert_eq!(incidents[&k].severity, Severity::Critical);
    assert_eq!(incidents[&k].first_triggered, first_triggered);
}

#[tokio::test]
async fn deescalation_routes_to_developer_only() {
    let h = harness();
    let k = key();
    h.manager
        .register_policy("oracle_base", "price_deviation_stable", tight_policy());

    h.manager
        .observe(business_obs(&k, Severity::Warning, 1.2))
        .await
        .unwrap();
    h.clock.advance(Duration::seconds(20));
    h.manager
        .observe(business_obs(&k, Severity::Critical, 2.3))
        .await
        .unwrap();
    h.clock.advance(Duration::seconds(20));
    h.manager
        .observe(business_obs(&k, Severity::Warning, 1.2))
        .await
        .unwrap();

    assert_eq!(h.sink.count(Channel::Business), 2);
    assert_eq!(h.sink.count(Channel::Slack), 2);
    assert_eq!(h.sink.count(Channel::Developer), 3);
    let (channel, message) = h.sink.last();
    assert_eq!(channel, Channel::Developer);
    assert!(message.starts_with("✅"));
    assert_eq!(
        h.manager.get_active_incidents()[&k].severity,
        Severity::Warning
    );
}

#[tokio::test]
async fn recovery_is_silent_and_needs_consecutive_oks() {
    let h = harness();
    let k = key();
    h.manager
        .register_policy("oracle_base", "price_deviation_stable", tight_policy());

    h.manager
        .observe(business_obs(&k, Severity::Warning, 1.2))
        .await
        .unwrap();
    h.manager
        .observe(business_obs(&k, Severity::Ok, 0.1))
        .await
        .unwrap();
    assert_eq!(h.manager.get_active_incidents().len(), 1);

    h.manager
        .observe(business_obs(&k, Severity::Ok, 0.1))
        .await
        .unwrap();
    assert!(h.manager.get_active_incidents().is_empty());

    // The only send was the original warning; no recovery message.
    assert_eq!(h.sink.total(), 3);
    assert!(h.sink.sends().iter().all(|(_, m)| !m.starts_with("✅")));
}

#[tokio::test]
async fn non_ok_reading_resets_hysteresis_counter() {
    let h = harness();
    let k = key();
    h.manager
        .register_policy("oracle_base", "price_deviation_stable", tight_policy());

    h.manager
        .observe(business_obs(&k, Severity::Warning, 1.2))
        .await
        .unwrap();
    h.manager
        .observe(business_obs(&k, Severity::Ok, 0.1))
        .await
        .unwrap();
    // Flap back to warning: the counter starts over.
    h.manager
        .observe(business_obs(&k, Severity::Warning, 1.2))
        .await
        .unwrap();
    h.manager
        .observe(business_obs(&k, Severity::Ok, 0.1))
        .await
        .unwrap();
    assert_eq!(h.manager.get_active_incidents().len(), 1);

    h.manager
        .observe(business_obs(&k, Severity::Ok, 0.1))
        .await
        .unwrap();
    assert!(h.manager.get_active_incidents().is_empty());
}

#[tokio::test]
async fn ok_without_state_is_a_noop() {
    let h = harness();
    h.manager
        .observe(business_obs(&key(), Severity::Ok, 0.0))
        .await
        .unwrap();
    assert_eq!(h.sink.total(), 0);
    assert!(h.manager.get_active_incidents().is_empty());
}

#[tokio::test]
async fn reminder_goes_to_developer_only() {
    let h = harness();
    let k = key();
    let policy = AlertPolicy {
        min_value_change: 1000.0,
        cooldown_critical: Duration::minutes(5),
        reminder_interval: Duration::minutes(30),
        dynamic_cooldowns: Vec::new(),
        ..AlertPolicy::default()
    };
    h.manager
        .register_policy("oracle_base", "price_deviation_stable", policy);

    h.manager
        .observe(business_obs(&k, Severity::Critical, 2.3))
        .await
        .unwrap();
    assert_eq!(h.sink.count(Channel::Business), 1);

    h.clock.advance(Duration::minutes(31));
    h.manager
        .observe(business_obs(&k, Severity::Critical, 2.3))
        .await
        .unwrap();

    // One extra developer send, nothing new on business or Slack.
    assert_eq!(h.sink.count(Channel::Business), 1);
    assert_eq!(h.sink.count(Channel::Slack), 1);
    assert_eq!(h.sink.count(Channel::Developer), 2);
    let (channel, message) = h.sink.last();
    assert_eq!(channel, Channel::Developer);
    assert!(message.starts_with("🚨"));

    // Reminder resets the clock: ten minutes later nothing fires.
    h.clock.advance(Duration::minutes(10));
    h.manager
        .observe(business_obs(&k, Severity::Critical, 2.3))
        .await
        .unwrap();
    assert_eq!(h.sink.count(Channel::Developer), 2);
}

#[tokio::test]
async fn warning_incident_never_reminds() {
    let h = harness();
    let k = key();
    let policy = AlertPolicy {
        min_value_change: 1000.0,
        cooldown_warning: Duration::minutes(5),
        reminder_interval: Duration::minutes(30),
        ..AlertPolicy::default()
    };
    h.manager
        .register_policy("oracle_base", "price_deviation_stable", policy);

    h.manager
        .observe(business_obs(&k, Severity::Warning, 1.2))
        .await
        .unwrap();
    h.clock.advance(Duration::minutes(45));
    h.manager
        .observe(business_obs(&k, Severity::Warning, 1.2))
        .await
        .unwrap();

    assert_eq!(h.sink.count(Channel::Developer), 1);
}

#[tokio::test]
async fn warning_update_stays_off_the_business_channel() {
    let h = harness();
    let k = key();
    let policy = AlertPolicy {
        min_value_change: 1.0,
        cooldown_warning: Duration::minutes(1),
        reminder_interval: Duration::zero(),
        ..AlertPolicy::default()
    };
    h.manager
        .register_policy("oracle_base", "price_deviation_stable", policy);

    h.manager
        .observe(business_obs(&k, Severity::Warning, 1.2))
        .await
        .unwrap();
    h.clock.advance(Duration::minutes(2));
    h.manager
        .observe(business_obs(&k, Severity::Warning, 2.4))
        .await
        .unwrap();

    assert_eq!(h.sink.count(Channel::Business), 1);
    assert_eq!(h.sink.count(Channel::Slack), 1);
    assert_eq!(h.sink.count(Channel::Developer), 2);
}

#[tokio::test]
async fn critical_update_reaches_business_and_slack() {
    let h = harness();
    let k = key();
    let policy = AlertPolicy {
        min_value_change: 1.0,
        cooldown_critical: Duration::minutes(1),
        reminder_interval: Duration::zero(),
        ..AlertPolicy::default()
    };
    h.manager
        .register_policy("oracle_base", "price_deviation_stable", policy);

    h.manager
        .observe(business_obs(&k, Severity::Critical, 2.3))
        .await
        .unwrap();
    h.clock.advance(Duration::minutes(2));
    h.manager
        .observe(business_obs(&k, Severity::Critical, 3.1))
        .await
        .unwrap();

    assert_eq!(h.sink.count(Channel::Business), 2);
    assert_eq!(h.sink.count(Channel::Slack), 2);
}

#[tokio::test]
async fn last_sent_is_monotone_and_bounded_by_first_triggered() {
    let h = harness();
    let k = key();
    h.manager
        .register_policy("oracle_base", "price_deviation_stable", tight_policy());

    let mut prev_sent = None;
    for (minutes, severity, value) in [
        (0i64, Severity::Warning, 1.2),
        (1, Severity::Critical, 2.5),
        (7, Severity::Critical, 9.0),
        (9, Severity::Warning, 1.1),
    ] {
        h.clock.advance(Duration::minutes(minutes));
        h.manager
            .observe(business_obs(&k, severity, value))
            .await
            .unwrap();
        let incidents = h.manager.get_active_incidents();
        let state = &incidents[&k];
        assert!(state.first_triggered <= state.last_sent);
        if let Some(prev) = prev_sent {
            assert!(state.last_sent >= prev);
        }
        prev_sent = Some(state.last_sent);
    }
}

#[tokio::test]
async fn primary_send_failure_leaves_state_untouched() {
    let h = harness();
    let k = key();

    h.sink.fail_business.store(true, Ordering::SeqCst);
    let err = h
        .manager
        .observe(business_obs(&k, Severity::Critical, 2.3))
        .await;
    assert!(err.is_err());
    assert!(h.manager.get_active_incidents().is_empty());

    // Once the endpoint recovers the same observation opens the incident.
    h.sink.fail_business.store(false, Ordering::SeqCst);
    h.manager
        .observe(business_obs(&k, Severity::Critical, 2.3))
        .await
        .unwrap();
    assert_eq!(h.manager.get_active_incidents().len(), 1);
}

#[tokio::test]
async fn secondary_failures_do_not_propagate() {
    let h = harness();
    let k = key();

    // Developer mirror fails, business primary succeeds.
    h.sink.fail_developer.store(true, Ordering::SeqCst);
    h.manager
        .observe(business_obs(&k, Severity::Critical, 2.3))
        .await
        .unwrap();
    assert_eq!(h.sink.count(Channel::Business), 1);
    assert_eq!(h.manager.get_active_incidents().len(), 1);
}

#[tokio::test]
async fn zero_baseline_counts_as_full_change() {
    let h = harness();
    let k = key();
    let policy = AlertPolicy {
        min_value_change: 50.0,
        cooldown_critical: Duration::minutes(1),
        reminder_interval: Duration::zero(),
        ..AlertPolicy::default()
    };
    h.manager
        .register_policy("oracle_base", "price_deviation_stable", policy);

    h.manager
        .observe(business_obs(&k, Severity::Critical, 0.0))
        .await
        .unwrap();
    h.clock.advance(Duration::minutes(2));
    h.manager
        .observe(business_obs(&k, Severity::Critical, 3.0))
        .await
        .unwrap();

    assert_eq!(h.sink.count(Channel::Business), 2);
}

#[tokio::test]
async fn unregistered_keys_fall_back_to_the_default_policy() {
    let h = harness();
    let k = AlertKey::new("some_job", "thing", "odd_metric");

    h.manager
        .observe(business_obs(&k, Severity::Critical, 100.0))
        .await
        .unwrap();

    // Default critical cooldown is five minutes.
    h.clock.advance(Duration::minutes(4));
    h.manager
        .observe(business_obs(&k, Severity::Critical, 150.0))
        .await
        .unwrap();
    assert_eq!(h.sink.count(Channel::Business), 1);

    h.clock.advance(Duration::minutes(2));
    h.manager
        .observe(business_obs(&k, Severity::Critical, 150.0))
        .await
        .unwrap();
    assert_eq!(h.sink.count(Channel::Business), 2);

    // Unknown metrics render via the fallback title.
    assert!(h.sink.sends()[0].1.contains("ODD METRIC"));
}

#[tokio::test]
async fn stablecoin_depeg_lifecycle() {
    let h = harness();
    let k = key();
    let policy = AlertPolicy {
        min_value_change: 0.2,
        cooldown_warning: Duration::minutes(30),
        cooldown_critical: Duration::minutes(5),
        dynamic_cooldowns: vec![
            DynamicCooldown {
                threshold: 10.0,
                cooldown: Duration::seconds(10),
            },
            DynamicCooldown {
                threshold: 5.0,
                cooldown: Duration::seconds(30),
            },
        ],
        reminder_interval: Duration::zero(),
        trigger_threshold: 2.0,
        consecutive_ok_required: 3,
    };
    h.manager
        .register_policy("oracle_base", "price_deviation_stable", policy);

    // Depeg: full fan-out.
    h.manager
        .observe(business_obs(&k, Severity::Critical, 2.3))
        .await
        .unwrap();
    assert_eq!(h.sink.total(), 3);

    // One minute later, unchanged: inside the cooldown.
    h.clock.advance(Duration::minutes(1));
    h.manager
        .observe(business_obs(&k, Severity::Critical, 2.3))
        .await
        .unwrap();
    assert_eq!(h.sink.count(Channel::Business), 1);

    // Past cooldown but the move is under the min-change gate.
    h.clock.advance(Duration::minutes(5));
    h.manager
        .observe(business_obs(&k, Severity::Critical, 2.302))
        .await
        .unwrap();
    assert_eq!(h.sink.count(Channel::Business), 1);

    // A material worsening resends.
    h.clock.advance(Duration::minutes(6));
    h.manager
        .observe(business_obs(&k, Severity::Critical, 3.1))
        .await
        .unwrap();
    assert_eq!(h.sink.count(Channel::Business), 2);
}

#[tokio::test]
async fn whale_dropout_clears_after_explicit_oks() {
    let h = harness();
    let k = AlertKey::new("concentration", "0xabc", "whale_supply");
    let policy = AlertPolicy {
        consecutive_ok_required: 2,
        ..AlertPolicy::default()
    };
    h.manager
        .register_policy("concentration", "whale_supply", policy);

    h.manager
        .observe(business_obs(&k, Severity::Warning, 12.0))
        .await
        .unwrap();
    assert_eq!(h.manager.get_active_incidents().len(), 1);

    // Address disappears from the result set: explicit OK readings.
    for _ in 0..2 {
        h.manager
            .observe(developer_obs(&k, Severity::Ok, 0.0))
            .await
            .unwrap();
    }
    assert!(h.manager.get_active_incidents().is_empty());
    // Only the original warning fan-out was ever sent.
    assert_eq!(h.sink.count(Channel::Business), 1);
}

#[tokio::test]
async fn clear_all_resets_state() {
    let h = harness();
    h.manager
        .observe(business_obs(&key(), Severity::Critical, 2.0))
        .await
        .unwrap();
    assert_eq!(h.manager.get_active_incidents().len(), 1);
    h.manager.clear_all();
    assert!(h.manager.get_active_incidents().is_empty());
}

#[test]
fn routing_matrix_covers_every_kind() {
    use Severity::{Critical, Warning};

    for severity in [Warning, Critical] {
        for kind in [AlertKind::NewIncident, AlertKind::Escalation] {
            let r = route(kind, true, severity);
            assert!(r.business && r.developer && r.slack);
            let r = route(kind, false, severity);
            assert!(!r.business && r.developer && !r.slack);
        }

        for kind in [AlertKind::Deescalation, AlertKind::Reminder] {
            for business in [true, false] {
                let r = route(kind, business, severity);
                assert!(!r.business && r.developer && !r.slack);
            }
        }
    }

    // Updates: business only for critical business alerts.
    let r = route(AlertKind::Update, true, Critical);
    assert!(r.business && r.slack && r.developer);
    let r = route(AlertKind::Update, true, Warning);
    assert!(!r.business && !r.slack && r.developer);
    let r = route(AlertKind::Update, false, Critical);
    assert!(!r.business && !r.slack && r.developer);
}
