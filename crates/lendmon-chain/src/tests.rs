use alloy::primitives::U256;
use anyhow::{bail, Result};
use async_trait::async_trait;
use lendmon_alert::AlertManager;
use lendmon_notify::AlertSink;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::config::OracleConfig;
use crate::oracle::{
    classify_deviation, compute_deviation, health_severity, metric_name, OracleMonitor,
};
use crate::prices::{usd_from_response, PriceResponse, ReferencePrices};
use crate::registry::{base_chain, chains_from_env, ChainConfig, ChainId, TokenMeta};
use crate::rpc::{decode_price, OracleReader};
use crate::tokens::moonbeam_tokens;
use lendmon_common::types::Severity;
use lendmon_worker::Job;

fn stable(symbol: &'static str) -> TokenMeta {
    TokenMeta {
        symbol,
        market_address: "0x0000000000000000000000000000000000000001",
        decimals: 18,
        is_stablecoin: true,
        peg_value: 1.0,
        price_address: None,
        skip_reference_price: false,
    }
}

fn volatile(symbol: &'static str) -> TokenMeta {
    TokenMeta {
        symbol,
        market_address: "0x0000000000000000000000000000000000000002",
        decimals: 18,
        is_stablecoin: false,
        peg_value: 0.0,
        price_address: Some("0x0000000000000000000000000000000000000003"),
        skip_reference_price: false,
    }
}

fn native(symbol: &'static str) -> TokenMeta {
    TokenMeta {
        symbol,
        market_address: "0x0000000000000000000000000000000000000004",
        decimals: 18,
        is_stablecoin: false,
        peg_value: 0.0,
        price_address: None,
        skip_reference_price: true,
    }
}

#[test]
fn deviation_against_peg_for_stablecoins() {
    let meta = stable("USDC");
    let dev = compute_deviation(0.97, 0.0, &meta).unwrap();
    assert!((dev - 3.0).abs() < 1e-9);
}

#[test]
fn deviation_against_reference_for_volatile_tokens() {
    let meta = volatile("WETH");
    let dev = compute_deviation(105.0, 100.0, &meta).unwrap();
    assert!((dev - 5.0).abs() < 1e-9);
}

#[test]
fn native_tokens_suppress_the_deviation_check() {
    let meta = native("GLMR");
    assert_eq!(compute_deviation(0.25, 0.0, &meta).unwrap(), 0.0);
}

#[test]
fn missing_reference_without_skip_flag_is_an_error() {
    let mut meta = volatile("WETH");
    meta.price_address = None;
    assert!(compute_deviation(100.0, 0.0, &meta).is_err());
}

#[test]
fn deviation_classification_uses_per_class_thresholds() {
    let config = OracleConfig::default();
    // Stablecoin: warning at 1%, critical at 2%.
    assert_eq!(classify_deviation(0.5, true, &config), Severity::Ok);
    assert_eq!(classify_deviation(1.5, true, &config), Severity::Warning);
    assert_eq!(classify_deviation(2.5, true, &config), Severity::Critical);
    // Volatile: warning at 3%, critical at 5%.
    assert_eq!(classify_deviation(2.5, false, &config), Severity::Ok);
    assert_eq!(classify_deviation(3.5, false, &config), Severity::Warning);
    assert_eq!(classify_deviation(6.0, false, &config), Severity::Critical);
}

#[test]
fn health_severity_thresholds() {
    assert_eq!(health_severity(10.0), Severity::Ok);
    assert_eq!(health_severity(35.0), Severity::Warning);
    assert_eq!(health_severity(60.0), Severity::Critical);
}

#[test]
fn metric_name_follows_token_class() {
    assert_eq!(metric_name(&stable("USDC")), "price_deviation_stable");
    assert_eq!(metric_name(&volatile("WETH")), "price_deviation_volatile");
}

#[test]
fn decode_price_scales_by_decimals() {
    // 2 * 10^30 with 6 decimals: divisor 10^30.
    let raw = U256::from(10u64).pow(U256::from(30u64)) * U256::from(2u64);
    assert!((decode_price(raw, 6).unwrap() - 2.0).abs() < 1e-9);

    // 18 decimals: divisor 10^18.
    let raw = U256::from(10u64).pow(U256::from(18u64)) * U256::from(1850u64);
    assert!((decode_price(raw, 18).unwrap() - 1850.0).abs() < 1e-6);
}

#[test]
fn decode_price_rejects_oversized_decimals() {
    assert!(decode_price(U256::from(1u64), 37).is_err());
}

#[test]
fn usd_price_parsed_from_response() {
    let body = r#"{
        "data": [{
            "prices": [
                {"currency": "eur", "value": "0.93"},
                {"currency": "usd", "value": "1.0005"}
            ]
        }]
    }"#;
    let resp: PriceResponse = serde_json::from_str(body).unwrap();
    assert!((usd_from_response(&resp).unwrap() - 1.0005).abs() < 1e-9);
}

#[test]
fn missing_usd_quote_is_an_error() {
    let body = r#"{"data": [{"prices": [{"currency": "eur", "value": "0.93"}]}]}"#;
    let resp: PriceResponse = serde_json::from_str(body).unwrap();
    assert!(usd_from_response(&resp).is_err());

    let empty: PriceResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
    assert!(usd_from_response(&empty).is_err());
}

#[test]
fn chains_resolve_from_env_value() {
    let chains = chains_from_env("base, optimism").unwrap();
    assert_eq!(chains.len(), 2);
    assert_eq!(chains[0].id, ChainId::Base);
    assert_eq!(chains[1].id, ChainId::Optimism);

    assert_eq!(chains_from_env("").unwrap()[0].id, ChainId::Base);
    assert!(chains_from_env("solana").is_err());
}

#[test]
fn catalogues_carry_expected_token_classes() {
    let base = base_chain();
    let usdc = &base.tokens["usdc"];
    assert!(usdc.is_stablecoin);
    assert_eq!(usdc.peg_value, 1.0);
    assert_eq!(usdc.decimals, 6);

    let glmr = &moonbeam_tokens()["glmr"];
    assert!(glmr.skip_reference_price);
    assert!(glmr.price_address.is_none());
}

// Fan-out behaviour under partial failure.

#[derive(Default)]
struct CountingSink {
    business: Mutex<Vec<String>>,
    developer: Mutex<Vec<String>>,
}

#[async_trait]
impl AlertSink for CountingSink {
    async fn send_business(&self, message: &str) -> Result<()> {
        self.business.lock().unwrap().push(message.to_string());
        Ok(())
    }

    async fn send_developer(&self, message: &str) -> Result<()> {
        self.developer.lock().unwrap().push(message.to_string());
        Ok(())
    }

    async fn send_slack(&self, _message: &str) -> Result<()> {
        Ok(())
    }
}

struct FlakyReader {
    failing: HashSet<&'static str>,
}

#[async_trait]
impl OracleReader for FlakyReader {
    async fn underlying_price(&self, market_address: &str) -> Result<U256> {
        if self.failing.contains(market_address) {
            bail!("rpc timeout");
        }
        // Peg-perfect price for 18 decimals.
        Ok(U256::from(10u64).pow(U256::from(18u64)))
    }
}

struct NoPrices;

#[async_trait]
impl ReferencePrices for NoPrices {
    async fn usd_price(&self, _network: &str, _token_address: &str) -> Result<f64> {
        bail!("reference API unavailable")
    }
}

const MARKETS: [&str; 10] = [
    "0x0000000000000000000000000000000000000010",
    "0x0000000000000000000000000000000000000011",
    "0x0000000000000000000000000000000000000012",
    "0x0000000000000000000000000000000000000013",
    "0x0000000000000000000000000000000000000014",
    "0x0000000000000000000000000000000000000015",
    "0x0000000000000000000000000000000000000016",
    "0x0000000000000000000000000000000000000017",
    "0x0000000000000000000000000000000000000018",
    "0x0000000000000000000000000000000000000019",
];
const KEYS: [&str; 10] = ["t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7", "t8", "t9"];

fn test_chain() -> ChainConfig {
    let mut tokens = HashMap::new();
    for (key, market) in KEYS.into_iter().zip(MARKETS.into_iter()) {
        tokens.insert(
            key,
            TokenMeta {
                symbol: key,
                market_address: market,
                decimals: 18,
                is_stablecoin: true,
                peg_value: 1.0,
                price_address: None,
                skip_reference_price: true,
            },
        );
    }
    ChainConfig {
        id: ChainId::Base,
        name: "Testnet",
        oracle_address: "0x0000000000000000000000000000000000000099",
        price_network: "test-mainnet",
        tokens,
    }
}

fn monitor_with_failures(failing: usize) -> (OracleMonitor, Arc<CountingSink>) {
    let sink = Arc::new(CountingSink::default());
    let alerts = Arc::new(AlertManager::new(sink.clone()));
    let reader = FlakyReader {
        failing: MARKETS[..failing].iter().copied().collect(),
    };
    let monitor = OracleMonitor::new(
        test_chain(),
        Arc::new(reader),
        Arc::new(NoPrices),
        alerts,
        OracleConfig::default(),
    );
    (monitor, sink)
}

#[tokio::test(start_paused = true)]
async fn fan_out_isolates_failures_and_reports_health() {
    let (monitor, sink) = monitor_with_failures(6);

    let err = monitor.run().await.unwrap_err();
    assert!(err.to_string().contains("high error rate"));

    // Six token_error incidents plus one critical system_health, all on
    // the developer channel; the healthy tokens sit at their peg and
    // produce no sends.
    let developer = sink.developer.lock().unwrap().clone();
    assert_eq!(developer.len(), 7);
    assert_eq!(
        developer
            .iter()
            .filter(|m| m.contains("TOKEN PRICE ERROR"))
            .count(),
        6
    );
    assert_eq!(
        developer
            .iter()
            .filter(|m| m.contains("ORACLE SYSTEM HEALTH"))
            .count(),
        1
    );
    assert!(sink.business.lock().unwrap().is_empty());
    assert_eq!(monitor.failure_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn circuit_opens_after_repeated_bad_runs() {
    let (monitor, _sink) = monitor_with_failures(6);

    for _ in 0..5 {
        let err = monitor.run().await.unwrap_err();
        assert!(err.to_string().contains("high error rate"));
    }
    assert_eq!(monitor.failure_count(), 5);

    let err = monitor.run().await.unwrap_err();
    assert!(err.to_string().contains("circuit breaker open"));
}

#[tokio::test(start_paused = true)]
async fn healthy_run_resets_the_failure_counter() {
    let (monitor, _sink) = monitor_with_failures(6);
    monitor.run().await.unwrap_err();
    assert_eq!(monitor.failure_count(), 1);

    let (healthy, sink) = monitor_with_failures(0);
    healthy.run().await.unwrap();
    assert_eq!(healthy.failure_count(), 0);
    assert!(sink.developer.lock().unwrap().is_empty());
}
