use alloy::primitives::{Address, U256};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// 4-byte selector of `getUnderlyingPrice(address)`.
const GET_UNDERLYING_PRICE: &str = "fc57d4df";

const RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw on-chain price source. The production implementation speaks
/// JSON-RPC; tests substitute their own.
#[async_trait]
pub trait OracleReader: Send + Sync {
    /// Returns the oracle's price word for a market, scaled by
    /// `10^(36 - decimals)`.
    async fn underlying_price(&self, market_address: &str) -> Result<U256>;
}

/// `eth_call`-based reader against a single oracle contract.
pub struct JsonRpcOracle {
    client: reqwest::Client,
    rpc_url: String,
    oracle: Address,
}

impl JsonRpcOracle {
    pub fn new(rpc_url: impl Into<String>, oracle_address: &str) -> Result<Self> {
        let oracle: Address = oracle_address
            .parse()
            .with_context(|| format!("invalid oracle address: {oracle_address}"))?;
        let client = reqwest::Client::builder()
            .timeout(RPC_TIMEOUT)
            .build()
            .unwrap_or_default();
        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
            oracle,
        })
    }
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[async_trait]
impl OracleReader for JsonRpcOracle {
    async fn underlying_price(&self, market_address: &str) -> Result<U256> {
        let market: Address = market_address
            .parse()
            .with_context(|| format!("invalid market address: {market_address}"))?;

        // Selector plus one left-padded address argument.
        let calldata = format!(
            "0x{GET_UNDERLYING_PRICE}{:0>64}",
            alloy::hex::encode(market)
        );
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [{ "to": self.oracle.to_string(), "data": calldata }, "latest"],
        });

        let resp = self
            .client
            .post(&self.rpc_url)
            .json(&payload)
            .send()
            .await
            .context("eth_call request failed")?;
        let status = resp.status();
        if !status.is_success() {
            bail!("rpc endpoint returned status {status}");
        }

        let body: RpcResponse = resp.json().await.context("invalid rpc response")?;
        if let Some(err) = body.error {
            bail!("rpc error {}: {}", err.code, err.message);
        }
        let result = body.result.context("rpc response missing result")?;
        let word = result.trim_start_matches("0x");
        if word.is_empty() {
            bail!("empty eth_call result");
        }
        U256::from_str_radix(word, 16).context("malformed price word")
    }
}

/// Converts the oracle's fixed-point word into USD. The oracle scales
/// every price by `10^(36 - decimals)`.
pub fn decode_price(raw: U256, decimals: u32) -> Result<f64> {
    anyhow::ensure!(decimals <= 36, "invalid decimals: {decimals}");
    let value: f64 = raw
        .to_string()
        .parse()
        .context("price word out of f64 range")?;
    Ok(value / 10f64.powi((36 - decimals) as i32))
}
