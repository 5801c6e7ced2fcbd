pub mod address;
pub mod chunk;
pub mod config;
pub mod decoder;
pub mod error;
pub mod fetcher;
pub mod rpc;
pub mod summary;

use bitcoin::consensus::encode;
use bitcoin::Transaction;

pub use config::RpcConfig;
pub use decoder::{DecodeOptions, from_bytes, from_tx};
pub use error::{Error, Result};
pub use fetcher::{fetch_with, from_hash};
pub use rpc::{RpcClient, TransactionSource};
pub use summary::TransactionSummary;

/// Decode a hex-encoded Bitcoin transaction
pub fn decode_transaction(hex: &str) -> Result<Transaction> {
    let tx_bytes = hex::decode(hex.trim())?;

    Ok(encode::deserialize::<Transaction>(&tx_bytes)?)
}
