use bitcoin::hashes::Hash;
use bitcoin::{Address, Network, PubkeyHash, PublicKey, Script};

use crate::chunk::Chunk;

/// Public key of a `<sig> <pubkey>` unlocking script
pub fn p2pkh_input_key(chunks: &[Chunk<'_>]) -> Option<PublicKey> {
    match chunks {
        [Chunk::Push(sig), Chunk::Push(key)] if !sig.is_empty() => PublicKey::from_slice(key).ok(),
        _ => None,
    }
}

/// Sender address of a P2PKH spend
pub fn input_address(chunks: &[Chunk<'_>], network: Network) -> Option<String> {
    let key = p2pkh_input_key(chunks)?;
    non_empty(Address::p2pkh(key.pubkey_hash(), network).to_string())
}

/// Receiver address of a P2PKH locking script, taken from its third chunk
pub fn output_address(script: &Script, chunks: &[Chunk<'_>], network: Network) -> Option<String> {
    if !script.is_p2pkh() {
        return None;
    }
    let hash = PubkeyHash::from_slice(chunks.get(2)?.data()?).ok()?;
    non_empty(Address::p2pkh(hash, network).to_string())
}

fn non_empty(address: String) -> Option<String> {
    (!address.is_empty()).then_some(address)
}
