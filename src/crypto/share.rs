//! # Share Codec
//!
//! Binary layout of a partial key, stored base64-encoded in `<NNN>.key` files
//! and raw inside carrier images:
//!
//! ```text
//! ┌─────────┬─────────────┬───────────┬─────┬──────────────────────┐
//! │ version │ total_parts │ threshold │ tag │ payload (key length) │
//! │ 1 byte  │ 1 byte      │ 1 byte    │ 1 B │ N bytes              │
//! └─────────┴─────────────┴───────────┴─────┴──────────────────────┘
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::common::error::{Result, StegoError};

/// Format version written by this crate (ASCII `'1'`).
pub const SHARE_VERSION: u8 = b'1';

/// Bytes before the payload.
pub const HEADER_LEN: usize = 4;

/// One fragment of a split secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    pub version: u8,
    pub total_parts: u8,
    pub threshold: u8,
    /// x-coordinate this share was evaluated at. Never `0`.
    pub tag: u8,
    pub payload: Vec<u8>,
}

impl Share {
    /// Serialize as `version ‖ total_parts ‖ threshold ‖ tag ‖ payload`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.payload.len());
        bytes.extend_from_slice(&[self.version, self.total_parts, self.threshold, self.tag]);
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// Parse a serialized share. At least one payload byte is required.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() <= HEADER_LEN {
            return Err(StegoError::MalformedShare(format!(
                "expected at least {} bytes, got {}",
                HEADER_LEN + 1,
                bytes.len()
            )));
        }

        Ok(Self {
            version: bytes[0],
            total_parts: bytes[1],
            threshold: bytes[2],
            tag: bytes[3],
            payload: bytes[HEADER_LEN..].to_vec(),
        })
    }

    /// Standard base64 of [`to_bytes`](Self::to_bytes), as written to key files.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    pub fn from_base64(encoded: &str) -> Result<Self> {
        Self::from_bytes(&STANDARD.decode(encoded.trim())?)
    }
}
