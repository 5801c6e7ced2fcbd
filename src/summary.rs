use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::chunk::EncodedChunk;

/// Compact, JSON-serializable view of one transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionSummary {
    pub tx: TxInfo,
    #[serde(rename = "in")]
    pub inputs: Vec<InputRecord>,
    #[serde(rename = "out")]
    pub outputs: Vec<OutputRecord>,
    pub lock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u64>,
    /// Coinbase script reported by the node
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coinbase: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxInfo {
    #[serde(rename = "h")]
    pub txid: String,
    /// Raw transaction hex, only set when fetched from a node
    #[serde(rename = "r", skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// Where an input's coins come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sender {
    #[serde(rename = "h")]
    pub prev_txid: String,
    #[serde(rename = "i")]
    pub prev_index: u32,
    #[serde(rename = "a", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Where an output's coins go
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receiver {
    #[serde(rename = "v")]
    pub value: u64,
    #[serde(rename = "i")]
    pub index: u32,
    #[serde(rename = "a", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
    pub index: u32,
    pub sequence: u32,
    pub chunks: Vec<EncodedChunk>,
    pub sender: Sender,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub index: u32,
    pub chunks: Vec<EncodedChunk>,
    pub receiver: Receiver,
}

impl Serialize for InputRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("i", &self.index)?;
        map.serialize_entry("seq", &self.sequence)?;
        for chunk in &self.chunks {
            chunk.serialize_fields(&mut map)?;
        }
        map.serialize_entry("e", &self.sender)?;
        map.end()
    }
}

impl Serialize for OutputRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("i", &self.index)?;
        for chunk in &self.chunks {
            chunk.serialize_fields(&mut map)?;
        }
        map.serialize_entry("e", &self.receiver)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{ChunkValue, SizeTier};
    use serde_json::json;

    fn data_chunk(index: usize, base64: &str, text: Option<&str>) -> EncodedChunk {
        EncodedChunk {
            index,
            value: ChunkValue::Data {
                len: 0,
                tier: SizeTier::Regular,
                base64: base64.to_string(),
                text: text.map(str::to_string),
                hex: None,
            },
        }
    }

    #[test]
    fn test_absent_optionals_are_omitted() {
        let summary = TransactionSummary {
            tx: TxInfo {
                txid: "ab".to_string(),
                raw: None,
            },
            inputs: vec![],
            outputs: vec![OutputRecord {
                index: 0,
                chunks: vec![],
                receiver: Receiver {
                    value: 10,
                    index: 0,
                    address: None,
                },
            }],
            lock: 0,
            confirmations: None,
            coinbase: None,
        };

        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            json!({
                "tx": { "h": "ab" },
                "in": [],
                "out": [{ "i": 0, "e": { "v": 10, "i": 0 } }],
                "lock": 0
            })
        );
    }

    #[test]
    fn test_record_key_order() {
        let input = InputRecord {
            index: 1,
            sequence: 7,
            chunks: vec![
                EncodedChunk {
                    index: 0,
                    value: ChunkValue::Opcode(0),
                },
                data_chunk(1, "AA==", None),
            ],
            sender: Sender {
                prev_txid: "00".to_string(),
                prev_index: 2,
                address: Some("1abc".to_string()),
            },
        };
        assert_eq!(
            serde_json::to_string(&input).unwrap(),
            r#"{"i":1,"seq":7,"b0":{"op":0},"b1":"AA==","e":{"h":"00","i":2,"a":"1abc"}}"#
        );

        let output = OutputRecord {
            index: 0,
            chunks: vec![data_chunk(0, "aGk=", Some("hi"))],
            receiver: Receiver {
                value: 0,
                index: 0,
                address: None,
            },
        };
        assert_eq!(
            serde_json::to_string(&output).unwrap(),
            r#"{"i":0,"b0":"aGk=","s0":"hi","e":{"v":0,"i":0}}"#
        );
    }
}
