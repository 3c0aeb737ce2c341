//! Position-level risk monitoring against the protocol database.
//!
//! Three jobs share the read-only `UserPositions` table: individual
//! health factors and data staleness, aggregate protocol metrics
//! (risky-count spikes, weighted health factor drift, supply/borrow
//! deltas) and wallet-level concentration.

pub mod aggregate;
pub mod concentration;
pub mod config;
pub mod health;
pub mod store;


pub use aggregate::AggregateHealthJob;
pub use concentration::ConcentrationJob;
pub use config::{ConcentrationConfig, HealthFactorConfig};
pub use health::HealthJob;
pub use store::PositionStore;

use lendmon_common::types::Severity;

/// Compact dollar rendering for alert bodies.
pub(crate) fn format_usd(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.2}K", value / 1_000.0)
    } else {
        format!("{value:.2}")
    }
}

/// Two-threshold severity classification shared by every check.
pub(crate) fn classify(value: f64, warning: f64, critical: f64) -> Severity {
    if value >= critical {
        Severity::Critical
    } else if value >= warning {
        Severity::Warning
    } else {
        Severity::Ok
    }
}
