use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const API_TIMEOUT: Duration = Duration::from_secs(10);

/// Off-chain USD reference prices. The production implementation calls
/// the Alchemy token-price API; tests substitute their own.
#[async_trait]
pub trait ReferencePrices: Send + Sync {
    async fn usd_price(&self, network: &str, token_address: &str) -> Result<f64>;
}

/// Alchemy `tokens/by-address` price client.
pub struct AlchemyPrices {
    client: reqwest::Client,
    api_key: String,
}

impl AlchemyPrices {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(API_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PriceResponse {
    #[serde(default)]
    data: Vec<PriceData>,
}

#[derive(Debug, Deserialize)]
struct PriceData {
    #[serde(default)]
    prices: Vec<PriceQuote>,
}

#[derive(Debug, Deserialize)]
struct PriceQuote {
    currency: String,
    value: String,
}

/// Picks the first USD quote out of a price response.
pub(crate) fn usd_from_response(resp: &PriceResponse) -> Result<f64> {
    let Some(first) = resp.data.first() else {
        bail!("no price data");
    };
    if first.prices.is_empty() {
        bail!("no price data");
    }
    for quote in &first.prices {
        if quote.currency == "usd" {
            return quote
                .value
                .parse()
                .with_context(|| format!("malformed usd price: {}", quote.value));
        }
    }
    bail!("no USD price")
}

#[async_trait]
impl ReferencePrices for AlchemyPrices {
    async fn usd_price(&self, network: &str, token_address: &str) -> Result<f64> {
        let url = format!(
            "https://api.g.alchemy.com/prices/v1/{}/tokens/by-address",
            self.api_key
        );
        let payload = json!({
            "addresses": [{ "network": network, "address": token_address }],
        });

        let resp = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .context("price request failed")?;
        let status = resp.status();
        if !status.is_success() {
            let body: String = resp
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(4096)
                .collect();
            bail!("price API status {status}: {body}");
        }

        let body: PriceResponse = resp.json().await.context("invalid price response")?;
        usd_from_response(&body)
    }
}
