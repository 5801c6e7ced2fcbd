use base64::{Engine as _, engine::general_purpose::STANDARD as b64};
use bitcoin::opcodes::{Opcode, all};
use bitcoin::script::{Instruction, Script};
use log::warn;
use serde::Serialize;
use serde::ser::SerializeMap;

/// Payloads at least this long go under the `lb`/`ls` keys
pub const LARGE_PAYLOAD: usize = 512;
/// Payloads at least this long go under the `xlb`/`xls` keys
pub const EXTRA_LARGE_PAYLOAD: usize = 1_000_000;

/// One opcode-or-data element of a script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunk<'a> {
    /// Opcode without payload, `OP_0` included
    Op(u8),
    /// Data push, empty when made with a zero-length `OP_PUSHDATA`
    Push(&'a [u8]),
    /// Bytes left after a push that runs past the end of the script
    Unparsed(&'a [u8]),
}

impl<'a> Chunk<'a> {
    /// Payload of a data push
    pub fn data(&self) -> Option<&'a [u8]> {
        match *self {
            Chunk::Push(data) => Some(data),
            _ => None,
        }
    }
}

/// Split a script into chunks, a truncated push ends it with [`Chunk::Unparsed`]
pub fn chunks(script: &Script) -> Vec<Chunk<'_>> {
    let bytes = script.as_bytes();
    let mut chunks = Vec::new();
    let mut cursor = 0;

    for item in script.instruction_indices() {
        match item {
            Ok((pos, Instruction::Op(opcode))) => {
                chunks.push(Chunk::Op(opcode.to_u8()));
                cursor = pos + 1;
            }
            Ok((pos, Instruction::PushBytes(push))) => {
                let opcode = bytes[pos];
                if opcode == all::OP_PUSHBYTES_0.to_u8() {
                    chunks.push(Chunk::Op(opcode));
                } else {
                    chunks.push(Chunk::Push(push.as_bytes()));
                }
                cursor = pos + push_header_len(opcode) + push.len();
            }
            Err(err) => {
                warn!(
                    "script parsing stopped at byte {} of {}: {}",
                    cursor,
                    bytes.len(),
                    err
                );
                chunks.push(Chunk::Unparsed(&bytes[cursor..]));
                break;
            }
        }
    }

    chunks
}

/// Opcode byte plus length prefix of a push
fn push_header_len(opcode: u8) -> usize {
    if opcode == all::OP_PUSHDATA1.to_u8() {
        2
    } else if opcode == all::OP_PUSHDATA2.to_u8() {
        3
    } else if opcode == all::OP_PUSHDATA4.to_u8() {
        5
    } else {
        1
    }
}

/// Key tier selected by payload length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    Regular,
    Large,
    ExtraLarge,
}

impl SizeTier {
    pub fn for_len(len: usize) -> Self {
        if len >= EXTRA_LARGE_PAYLOAD {
            SizeTier::ExtraLarge
        } else if len >= LARGE_PAYLOAD {
            SizeTier::Large
        } else {
            SizeTier::Regular
        }
    }

    /// Key prefix of the base64 field
    pub fn data_prefix(self) -> &'static str {
        match self {
            SizeTier::Regular => "b",
            SizeTier::Large => "lb",
            SizeTier::ExtraLarge => "xlb",
        }
    }

    /// Key prefix of the UTF-8 text field
    pub fn text_prefix(self) -> &'static str {
        match self {
            SizeTier::Regular => "s",
            SizeTier::Large => "ls",
            SizeTier::ExtraLarge => "xls",
        }
    }
}

/// Which extra representations to produce for data pushes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkEncoding {
    /// UTF-8 text field, outputs only
    pub text: bool,
    /// `h<idx>` hex field
    pub hex: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkValue {
    Opcode(u8),
    Raw(Vec<u8>),
    Data {
        len: usize,
        tier: SizeTier,
        base64: String,
        text: Option<String>,
        hex: Option<String>,
    },
}

/// A chunk together with its position in the script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedChunk {
    pub index: usize,
    pub value: ChunkValue,
}

#[derive(Serialize)]
struct OpcodeField {
    op: u8,
}

#[derive(Serialize)]
struct RawField {
    raw: String,
}

impl EncodedChunk {
    pub fn new(index: usize, chunk: &Chunk<'_>, encoding: ChunkEncoding) -> Self {
        let value = match *chunk {
            Chunk::Op(opcode) => ChunkValue::Opcode(opcode),
            Chunk::Unparsed(bytes) => ChunkValue::Raw(bytes.to_vec()),
            Chunk::Push(data) => ChunkValue::Data {
                len: data.len(),
                tier: SizeTier::for_len(data.len()),
                base64: b64.encode(data),
                text: encoding
                    .text
                    .then(|| String::from_utf8_lossy(data).into_owned()),
                hex: encoding.hex.then(|| hex::encode(data)),
            },
        };

        EncodedChunk { index, value }
    }

    /// Write tier, text and hex fields into a record being serialized
    pub fn serialize_fields<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        let index = self.index;
        match &self.value {
            ChunkValue::Opcode(op) => map.serialize_entry(&format!("b{index}"), &OpcodeField { op: *op }),
            ChunkValue::Raw(bytes) => map.serialize_entry(
                &format!("b{index}"),
                &RawField {
                    raw: hex::encode(bytes),
                },
            ),
            ChunkValue::Data {
                tier,
                base64,
                text,
                hex,
                ..
            } => {
                map.serialize_entry(&format!("{}{index}", tier.data_prefix()), base64)?;
                if let Some(text) = text {
                    map.serialize_entry(&format!("{}{index}", tier.text_prefix()), text)?;
                }
                if let Some(hex) = hex {
                    map.serialize_entry(&format!("h{index}"), hex)?;
                }
                Ok(())
            }
        }
    }

    /// Short human-readable description, e.g. `OP_DUP` or `PUSH[20]`
    pub fn label(&self) -> String {
        match &self.value {
            ChunkValue::Opcode(op) => Opcode::from(*op).to_string(),
            ChunkValue::Raw(bytes) => format!("RAW[{}]", bytes.len()),
            ChunkValue::Data { len, .. } => format!("PUSH[{}]", len),
        }
    }
}

/// Encode every chunk of a script, keyed by position
pub fn encode_all(chunks: &[Chunk<'_>], encoding: ChunkEncoding) -> Vec<EncodedChunk> {
    chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| EncodedChunk::new(index, chunk, encoding))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::ScriptBuf;
    use bitcoin::script::PushBytesBuf;
    use serde::Serializer;
    use serde_json::{Value, json};

    struct Fields<'a>(&'a [EncodedChunk]);

    impl Serialize for Fields<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(None)?;
            for chunk in self.0 {
                chunk.serialize_fields(&mut map)?;
            }
            map.end()
        }
    }

    fn fields(script: &Script, encoding: ChunkEncoding) -> Value {
        let encoded = encode_all(&chunks(script), encoding);
        serde_json::to_value(Fields(&encoded)).unwrap()
    }

    fn push_script(len: usize) -> ScriptBuf {
        let data = PushBytesBuf::try_from(vec![0x61; len]).unwrap();
        ScriptBuf::builder().push_slice(data).into_script()
    }

    #[test]
    fn test_size_tier_boundaries() {
        assert_eq!(SizeTier::for_len(0), SizeTier::Regular);
        assert_eq!(SizeTier::for_len(511), SizeTier::Regular);
        assert_eq!(SizeTier::for_len(512), SizeTier::Large);
        assert_eq!(SizeTier::for_len(999_999), SizeTier::Large);
        assert_eq!(SizeTier::for_len(1_000_000), SizeTier::ExtraLarge);
    }

    #[test]
    fn test_tier_keys_on_real_pushes() {
        let encoding = ChunkEncoding {
            text: true,
            hex: false,
        };
        let cases = [
            (511, "b0", "s0"),
            (512, "lb0", "ls0"),
            (999_999, "lb0", "ls0"),
            (1_000_000, "xlb0", "xls0"),
        ];

        for (len, data_key, text_key) in cases {
            let value = fields(&push_script(len), encoding);
            let object = value.as_object().unwrap();
            assert_eq!(object.len(), 2, "payload of {} bytes", len);
            assert!(object.contains_key(data_key), "payload of {} bytes", len);
            assert_eq!(object[text_key].as_str().unwrap().len(), len);
        }
    }

    #[test]
    fn test_p2pkh_script_chunks() {
        let script = ScriptBuf::from_hex("76a914751e76e8199196d454941c45d1b3a323f1433bd688ac").unwrap();
        let chunks = chunks(&script);

        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[0], Chunk::Op(0x76));
        assert_eq!(chunks[1], Chunk::Op(0xa9));
        assert_eq!(chunks[2].data().map(<[u8]>::len), Some(20));
        assert_eq!(chunks[3], Chunk::Op(0x88));
        assert_eq!(chunks[4], Chunk::Op(0xac));

        let value = fields(&script, ChunkEncoding::default());
        assert_eq!(value["b0"], json!({ "op": 118 }));
        assert_eq!(value["b2"], json!("dR526BmRltRUlBxF0bOjI/FDO9Y="));
        assert_eq!(value["b4"], json!({ "op": 172 }));
    }

    #[test]
    fn test_op_0_is_an_opcode_but_empty_pushdata_is_data() {
        let script = ScriptBuf::from_bytes(vec![0x00, 0x4c, 0x00]);
        assert_eq!(chunks(&script), vec![Chunk::Op(0), Chunk::Push(&[])]);

        let value = fields(
            &script,
            ChunkEncoding {
                text: true,
                hex: true,
            },
        );
        assert_eq!(value, json!({ "b0": { "op": 0 }, "b1": "", "s1": "", "h1": "" }));
    }

    #[test]
    fn test_hex_field_added_for_every_tier() {
        let encoding = ChunkEncoding {
            text: false,
            hex: true,
        };
        let value = fields(&push_script(600), encoding);
        assert_eq!(value["h0"], json!("61".repeat(600)));
        assert!(value.get("lb0").is_some());
        assert!(value.get("ls0").is_none());
    }

    #[test]
    fn test_text_is_lossy_utf8() {
        let script = ScriptBuf::from_bytes(vec![0x03, b'o', b'k', 0xff]);
        let value = fields(
            &script,
            ChunkEncoding {
                text: true,
                hex: false,
            },
        );
        assert_eq!(value["s0"], json!("ok\u{fffd}"));
    }

    #[test]
    fn test_truncated_push_passes_remainder_through() {
        let script = ScriptBuf::from_bytes(vec![0x51, 0x4c, 0x05, 0x01, 0x02]);
        let chunks = chunks(&script);
        assert_eq!(
            chunks,
            vec![Chunk::Op(0x51), Chunk::Unparsed(&[0x4c, 0x05, 0x01, 0x02])]
        );

        let value = fields(&script, ChunkEncoding::default());
        assert_eq!(value["b1"], json!({ "raw": "4c050102" }));
    }

    #[test]
    fn test_cursor_tracks_pushdata_headers() {
        let mut bytes = vec![0x4d, 0x00, 0x02];
        bytes.extend(vec![0x61; 512]);
        bytes.extend([0x02, 0x01]);
        let script = ScriptBuf::from_bytes(bytes);

        let chunks = chunks(&script);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1], Chunk::Unparsed(&[0x02, 0x01]));
    }

    #[test]
    fn test_labels() {
        let script = ScriptBuf::from_bytes(vec![0x76, 0x02, 0xaa, 0xbb]);
        let labels: Vec<String> = encode_all(&chunks(&script), ChunkEncoding::default())
            .iter()
            .map(EncodedChunk::label)
            .collect();
        assert_eq!(labels, vec!["OP_DUP".to_string(), "PUSH[2]".to_string()]);
    }
}
