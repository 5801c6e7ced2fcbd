use bitcoin::consensus::encode;
use bitcoin::{Network, Transaction, TxIn, TxOut};
use log::debug;

use crate::address;
use crate::chunk::{self, ChunkEncoding};
use crate::error::Result;
use crate::summary::{InputRecord, OutputRecord, Receiver, Sender, TransactionSummary, TxInfo};

/// Options for [`from_tx`] and [`from_bytes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Copied into the summary as `confirmations`
    pub confirmations: Option<u64>,
    /// Also emit every data push as hex under `h<idx>`
    pub hex: bool,
    /// Network used to render P2PKH addresses
    pub network: Network,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            confirmations: None,
            hex: false,
            network: Network::Bitcoin,
        }
    }
}

/// Summarize a hex-encoded transaction
pub fn from_tx(raw_hex: &str, options: &DecodeOptions) -> Result<TransactionSummary> {
    let tx = crate::decode_transaction(raw_hex)?;
    Ok(summarize(&tx, options))
}

/// Summarize a consensus-encoded transaction
pub fn from_bytes(bytes: &[u8], options: &DecodeOptions) -> Result<TransactionSummary> {
    let tx: Transaction = encode::deserialize(bytes)?;
    Ok(summarize(&tx, options))
}

/// Build the summary of an already parsed transaction
pub fn summarize(tx: &Transaction, options: &DecodeOptions) -> TransactionSummary {
    let txid = tx.compute_txid();
    debug!(
        "summarizing {} ({} inputs, {} outputs)",
        txid,
        tx.input.len(),
        tx.output.len()
    );

    let inputs = tx
        .input
        .iter()
        .enumerate()
        .map(|(index, input)| input_record(index as u32, input, options))
        .collect();
    let outputs = tx
        .output
        .iter()
        .enumerate()
        .map(|(index, output)| output_record(index as u32, output, options))
        .collect();

    TransactionSummary {
        tx: TxInfo {
            txid: txid.to_string(),
            raw: None,
        },
        inputs,
        outputs,
        lock: tx.lock_time.to_consensus_u32(),
        confirmations: options.confirmations,
        coinbase: None,
    }
}

fn input_record(index: u32, input: &TxIn, options: &DecodeOptions) -> InputRecord {
    let chunks = chunk::chunks(&input.script_sig);
    let encoding = ChunkEncoding {
        text: false,
        hex: options.hex,
    };

    InputRecord {
        index,
        sequence: input.sequence.0,
        chunks: chunk::encode_all(&chunks, encoding),
        sender: Sender {
            prev_txid: input.previous_output.txid.to_string(),
            prev_index: input.previous_output.vout,
            address: address::input_address(&chunks, options.network),
        },
    }
}

fn output_record(index: u32, output: &TxOut, options: &DecodeOptions) -> OutputRecord {
    let chunks = chunk::chunks(&output.script_pubkey);
    let encoding = ChunkEncoding {
        text: true,
        hex: options.hex,
    };

    OutputRecord {
        index,
        chunks: chunk::encode_all(&chunks, encoding),
        receiver: Receiver {
            value: output.value.to_sat(),
            index,
            address: address::output_address(&output.script_pubkey, &chunks, options.network),
        },
    }
}
