//! On-chain oracle monitoring.
//!
//! Holds the static chain/token catalogue, the JSON-RPC oracle price
//! reader, the off-chain reference price client and the per-chain
//! [`oracle::OracleMonitor`] job that compares the two and feeds the
//! alert manager.

pub mod config;
pub mod oracle;
pub mod prices;
pub mod registry;
pub mod rpc;
pub mod tokens;

#[cfg(test)]
mod tests;

pub use config::OracleConfig;
pub use oracle::OracleMonitor;
pub use prices::{AlchemyPrices, ReferencePrices};
pub use registry::{chains_from_env, ChainConfig, ChainId, TokenMeta};
pub use rpc::{JsonRpcOracle, OracleReader};
