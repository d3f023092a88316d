//! Proxy channel message helpers.
//!
//! Redirect requests travel over a raw plugin-message channel as a sequence of
//! length-prefixed strings in Java's modified UTF-8 (`DataOutput::writeUTF`).
//! Keeping the framing here lets the action pipeline and any proxy-side
//! consumer agree on the exact bytes.

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Channel name proxies listen on for server-switch requests.
pub const DEFAULT_CHANNEL: &str = "BungeeCord";

/// Request type token for a server switch.
pub const CONNECT_REQUEST: &str = "Connect";

/// Largest encoded string a single length prefix can describe.
pub const MAX_ENCODED_LEN: usize = u16::MAX as usize;

/// Requests understood by the proxy channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProxyRequest {
    Connect { server: String },
}

impl ProxyRequest {
    pub fn connect(server: impl Into<String>) -> Self {
        ProxyRequest::Connect {
            server: server.into(),
        }
    }

    pub fn request_type(&self) -> &'static str {
        match self {
            ProxyRequest::Connect { .. } => CONNECT_REQUEST,
        }
    }

    /// Encode the request as the raw channel payload.
    pub fn encode(&self) -> Result<Vec<u8>, ChannelError> {
        let mut out = Vec::new();
        write_utf(&mut out, self.request_type())?;
        match self {
            ProxyRequest::Connect { server } => write_utf(&mut out, server)?,
        }
        Ok(out)
    }

    /// Decode a raw channel payload. The whole buffer must be consumed.
    pub fn decode(mut input: &[u8]) -> Result<Self, ChannelError> {
        let kind = read_utf(&mut input)?;
        let request = match kind.as_str() {
            CONNECT_REQUEST => ProxyRequest::Connect {
                server: read_utf(&mut input)?,
            },
            _ => return Err(ChannelError::UnknownRequest(kind)),
        };
        if input.has_remaining() {
            return Err(ChannelError::TrailingBytes(input.remaining()));
        }
        Ok(request)
    }
}

/// Error conditions returned by the channel codec.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("frame truncated: needed {needed} more bytes")]
    Truncated { needed: usize },
    #[error("encoded string is {0} bytes, above the 65535 byte limit")]
    StringTooLong(usize),
    #[error("malformed modified UTF-8 at byte {0}")]
    MalformedUtf(usize),
    #[error("unpaired surrogate in decoded string")]
    UnpairedSurrogate,
    #[error("request type {0:?} is unknown")]
    UnknownRequest(String),
    #[error("{0} unread bytes after request")]
    TrailingBytes(usize),
}

/// Write `value` with a big-endian u16 length prefix in modified UTF-8.
pub fn write_utf<B: BufMut>(buf: &mut B, value: &str) -> Result<(), ChannelError> {
    let mut encoded = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007f => encoded.push(unit as u8),
            0x0000 | 0x0080..=0x07ff => {
                encoded.push(0xc0 | (unit >> 6) as u8);
                encoded.push(0x80 | (unit & 0x3f) as u8);
            }
            _ => {
                encoded.push(0xe0 | (unit >> 12) as u8);
                encoded.push(0x80 | ((unit >> 6) & 0x3f) as u8);
                encoded.push(0x80 | (unit & 0x3f) as u8);
            }
        }
    }
    if encoded.len() > MAX_ENCODED_LEN {
        return Err(ChannelError::StringTooLong(encoded.len()));
    }
    buf.put_u16(encoded.len() as u16);
    buf.put_slice(&encoded);
    Ok(())
}

/// Read one length-prefixed modified UTF-8 string.
pub fn read_utf<B: Buf>(buf: &mut B) -> Result<String, ChannelError> {
    if buf.remaining() < 2 {
        return Err(ChannelError::Truncated {
            needed: 2 - buf.remaining(),
        });
    }
    let length = buf.get_u16() as usize;
    if buf.remaining() < length {
        return Err(ChannelError::Truncated {
            needed: length - buf.remaining(),
        });
    }
    let mut raw = vec![0u8; length];
    buf.copy_to_slice(&mut raw);

    let mut units = Vec::with_capacity(length);
    let mut index = 0;
    while index < raw.len() {
        let lead = raw[index];
        let unit = match lead >> 4 {
            0x0..=0x7 => {
                index += 1;
                lead as u16
            }
            0xc | 0xd => {
                let next = continuation_byte(&raw, index + 1)?;
                index += 2;
                ((lead as u16 & 0x1f) << 6) | next
            }
            0xe => {
                let middle = continuation_byte(&raw, index + 1)?;
                let last = continuation_byte(&raw, index + 2)?;
                index += 3;
                ((lead as u16 & 0x0f) << 12) | (middle << 6) | last
            }
            _ => return Err(ChannelError::MalformedUtf(index)),
        };
        units.push(unit);
    }
    String::from_utf16(&units).map_err(|_| ChannelError::UnpairedSurrogate)
}

fn continuation_byte(raw: &[u8], index: usize) -> Result<u16, ChannelError> {
    match raw.get(index) {
        Some(byte) if byte & 0xc0 == 0x80 => Ok((byte & 0x3f) as u16),
        _ => Err(ChannelError::MalformedUtf(index)),
    }
}
