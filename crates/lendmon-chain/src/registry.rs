use anyhow::{bail, Result};
use std::collections::HashMap;

use crate::tokens;

/// Supported blockchain networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainId {
    Base,
    Optimism,
    Moonbeam,
    Moonriver,
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainId::Base => write!(f, "base"),
            ChainId::Optimism => write!(f, "optimism"),
            ChainId::Moonbeam => write!(f, "moonbeam"),
            ChainId::Moonriver => write!(f, "moonriver"),
        }
    }
}

/// Per-token metadata. Addresses live as static strings in the
/// catalogue and are parsed at call time.
#[derive(Debug, Clone, Copy)]
pub struct TokenMeta {
    pub symbol: &'static str,
    /// Market contract the oracle is queried with.
    pub market_address: &'static str,
    pub decimals: u32,
    pub is_stablecoin: bool,
    /// Expected peg, meaningful only for stablecoins.
    pub peg_value: f64,
    /// Underlying token address for reference-price lookups.
    pub price_address: Option<&'static str>,
    /// Native tokens without an off-chain feed: the oracle price is
    /// still observed, the deviation check is suppressed.
    pub skip_reference_price: bool,
}

impl TokenMeta {
    pub(crate) const fn volatile(
        symbol: &'static str,
        market_address: &'static str,
        decimals: u32,
        price_address: &'static str,
    ) -> Self {
        Self {
            symbol,
            market_address,
            decimals,
            is_stablecoin: false,
            peg_value: 0.0,
            price_address: Some(price_address),
            skip_reference_price: false,
        }
    }

    pub(crate) const fn stable(
        symbol: &'static str,
        market_address: &'static str,
        decimals: u32,
        peg_value: f64,
        price_address: &'static str,
    ) -> Self {
        Self {
            symbol,
            market_address,
            decimals,
            is_stablecoin: true,
            peg_value,
            price_address: Some(price_address),
            skip_reference_price: false,
        }
    }

    pub(crate) const fn native(
        symbol: &'static str,
        market_address: &'static str,
        decimals: u32,
    ) -> Self {
        Self {
            symbol,
            market_address,
            decimals,
            is_stablecoin: false,
            peg_value: 0.0,
            price_address: None,
            skip_reference_price: true,
        }
    }
}

/// Read-only configuration for one monitored chain.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub id: ChainId,
    pub name: &'static str,
    pub oracle_address: &'static str,
    /// Network name understood by the reference-price API.
    pub price_network: &'static str,
    /// Keyed by lowercase symbol.
    pub tokens: HashMap<&'static str, TokenMeta>,
}

/// Resolves the chain list from the `ENABLED_CHAINS` value. An empty
/// value means Base only.
pub fn chains_from_env(enabled: &str) -> Result<Vec<ChainConfig>> {
    if enabled.trim().is_empty() {
        return Ok(vec![base_chain()]);
    }

    let mut configs = Vec::new();
    for id in enabled.split(',') {
        let cfg = match id.trim().to_lowercase().as_str() {
            "base" => base_chain(),
            "optimism" => optimism_chain(),
            "moonbeam" => moonbeam_chain(),
            "moonriver" => moonriver_chain(),
            other => bail!("unsupported chain: {other}"),
        };
        configs.push(cfg);
    }
    Ok(configs)
}

pub fn base_chain() -> ChainConfig {
    ChainConfig {
        id: ChainId::Base,
        name: "Base",
        oracle_address: "0xEC942bE8A8114bFD0396A5052c36027f2cA6a9d0",
        price_network: "base-mainnet",
        tokens: tokens::base_tokens(),
    }
}

pub fn optimism_chain() -> ChainConfig {
    ChainConfig {
        id: ChainId::Optimism,
        name: "Optimism",
        oracle_address: "0x2f1490bD6aD10C9CE42a2829afa13EAc0b746dcf",
        price_network: "opt-mainnet",
        tokens: tokens::optimism_tokens(),
    }
}

pub fn moonbeam_chain() -> ChainConfig {
    ChainConfig {
        id: ChainId::Moonbeam,
        name: "Moonbeam",
        oracle_address: "0xED301cd3EB27217BDB05C4E9B820a8A3c8B665f9",
        price_network: "moonbeam-mainnet",
        tokens: tokens::moonbeam_tokens(),
    }
}

pub fn moonriver_chain() -> ChainConfig {
    ChainConfig {
        id: ChainId::Moonriver,
        name: "Moonriver",
        oracle_address: "0xED301cd3EB27217BDB05C4E9B820a8A3c8B665f9",
        price_network: "moonriver-mainnet",
        tokens: tokens::moonriver_tokens(),
    }
}
