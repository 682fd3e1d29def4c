use crate::{error::InternalError, key::KeyPart};
use thiserror::Error as ThisError;

// ── Part tags (do not reorder) ─────────────────
const TAG_BYTES: u8 = 0x01;
const TAG_TEXT: u8 = 0x02;
const TAG_INT: u8 = 0x03;
const TAG_UINT: u8 = 0x04;
const TAG_BOOL: u8 = 0x05;

const ESCAPE: u8 = 0xFF;
const TERMINATOR: [u8; 2] = [0x00, 0x00];

///
/// KeyDecodeError
/// (decode / corruption boundary)
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum KeyDecodeError {
    #[error("unknown key part tag 0x{tag:02x} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },

    #[error("truncated key part at offset {offset}")]
    Truncated { offset: usize },

    #[error("invalid escape byte 0x{byte:02x} at offset {offset}")]
    InvalidEscape { byte: u8, offset: usize },

    #[error("invalid bool payload 0x{byte:02x}")]
    InvalidBool { byte: u8 },

    #[error("text key part is not valid utf-8")]
    InvalidUtf8,
}

impl From<KeyDecodeError> for InternalError {
    fn from(err: KeyDecodeError) -> Self {
        Self::store_corruption(format!("stored key is not canonically decodable: {err}"))
    }
}

/// Append the canonical encoding of one key part.
pub(super) fn encode_part(out: &mut Vec<u8>, part: &KeyPart) {
    match part {
        KeyPart::Bytes(bytes) => {
            out.push(TAG_BYTES);
            push_terminated_bytes(out, bytes);
        }
        KeyPart::Text(text) => {
            out.push(TAG_TEXT);
            push_terminated_bytes(out, text.as_bytes());
        }
        KeyPart::Int(v) => {
            out.push(TAG_INT);
            out.extend_from_slice(&ordered_i64_bytes(*v));
        }
        KeyPart::Uint(v) => {
            out.push(TAG_UINT);
            out.extend_from_slice(&v.to_be_bytes());
        }
        KeyPart::Bool(v) => {
            out.push(TAG_BOOL);
            out.push(u8::from(*v));
        }
    }
}

/// Decode a full canonical key back into its parts.
pub(super) fn decode_parts(bytes: &[u8]) -> Result<Vec<KeyPart>, KeyDecodeError> {
    let mut parts = Vec::new();
    let mut offset = 0;

    while offset < bytes.len() {
        let tag = bytes[offset];
        offset += 1;

        let part = match tag {
            TAG_BYTES => {
                let (raw, next) = read_terminated_bytes(bytes, offset)?;
                offset = next;
                KeyPart::Bytes(raw)
            }
            TAG_TEXT => {
                let (raw, next) = read_terminated_bytes(bytes, offset)?;
                offset = next;
                KeyPart::Text(String::from_utf8(raw).map_err(|_| KeyDecodeError::InvalidUtf8)?)
            }
            TAG_INT => {
                let raw = read_fixed::<8>(bytes, offset)?;
                offset += 8;
                KeyPart::Int(i64_from_ordered_bytes(raw))
            }
            TAG_UINT => {
                let raw = read_fixed::<8>(bytes, offset)?;
                offset += 8;
                KeyPart::Uint(u64::from_be_bytes(raw))
            }
            TAG_BOOL => {
                let [byte] = read_fixed::<1>(bytes, offset)?;
                offset += 1;
                match byte {
                    0 => KeyPart::Bool(false),
                    1 => KeyPart::Bool(true),
                    byte => return Err(KeyDecodeError::InvalidBool { byte }),
                }
            }
            tag => {
                return Err(KeyDecodeError::UnknownTag {
                    tag,
                    offset: offset - 1,
                });
            }
        };

        parts.push(part);
    }

    Ok(parts)
}

// Byte strings are escaped so tuple boundaries remain unambiguous.
fn push_terminated_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    for &byte in bytes {
        if byte == 0 {
            out.extend_from_slice(&[0, ESCAPE]);
        } else {
            out.push(byte);
        }
    }

    out.extend_from_slice(&TERMINATOR);
}

fn read_terminated_bytes(bytes: &[u8], start: usize) -> Result<(Vec<u8>, usize), KeyDecodeError> {
    let mut out = Vec::new();
    let mut offset = start;

    loop {
        let byte = *bytes
            .get(offset)
            .ok_or(KeyDecodeError::Truncated { offset })?;
        if byte != 0 {
            out.push(byte);
            offset += 1;
            continue;
        }

        let next = *bytes
            .get(offset + 1)
            .ok_or(KeyDecodeError::Truncated { offset: offset + 1 })?;
        match next {
            0 => return Ok((out, offset + 2)),
            ESCAPE => {
                out.push(0);
                offset += 2;
            }
            byte => {
                return Err(KeyDecodeError::InvalidEscape {
                    byte,
                    offset: offset + 1,
                });
            }
        }
    }
}

fn read_fixed<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N], KeyDecodeError> {
    bytes
        .get(offset..offset + N)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(KeyDecodeError::Truncated { offset })
}

const fn ordered_i64_bytes(value: i64) -> [u8; 8] {
    let biased = value.cast_unsigned() ^ (1u64 << 63);
    biased.to_be_bytes()
}

const fn i64_from_ordered_bytes(bytes: [u8; 8]) -> i64 {
    (u64::from_be_bytes(bytes) ^ (1u64 << 63)).cast_signed()
}
