use log::debug;

use crate::config::RpcConfig;
use crate::decoder::{self, DecodeOptions};
use crate::error::Result;
use crate::rpc::{RpcClient, TransactionSource};
use crate::summary::TransactionSummary;

/// Fetch a transaction from the node, `config` defaults to [`RpcConfig::from_env`]
pub async fn from_hash(
    hash: &str,
    verbose: bool,
    config: Option<RpcConfig>,
) -> Result<TransactionSummary> {
    let config = match config {
        Some(config) => config,
        None => RpcConfig::from_env()?,
    };
    let client = RpcClient::new(&config);
    fetch_with(&client, hash, verbose, &DecodeOptions::default()).await
}

/// Fetch through any [`TransactionSource`] and summarize
pub async fn fetch_with<S>(
    source: &S,
    hash: &str,
    verbose: bool,
    options: &DecodeOptions,
) -> Result<TransactionSummary>
where
    S: TransactionSource + ?Sized,
{
    if verbose {
        let transaction = source.verbose_transaction(hash).await?;
        debug!(
            "fetched {} ({} bytes, {:?} confirmations)",
            hash,
            transaction.hex.len() / 2,
            transaction.confirmations
        );

        // a zero count is left out, same as an unconfirmed one
        let options = DecodeOptions {
            confirmations: transaction.confirmations.filter(|&count| count > 0),
            ..*options
        };
        let mut summary = decoder::from_tx(&transaction.hex, &options)?;
        if let [input] = transaction.vin.as_slice() {
            summary.coinbase = input.coinbase.clone();
        }
        summary.tx.raw = Some(transaction.hex);
        Ok(summary)
    } else {
        let hex = source.raw_transaction(hash).await?;
        debug!("fetched {} ({} bytes)", hash, hex.len() / 2);

        let options = DecodeOptions {
            confirmations: None,
            ..*options
        };
        let mut summary = decoder::from_tx(&hex, &options)?;
        summary.tx.raw = Some(hex);
        Ok(summary)
    }
}
