//! # Symmetric Cipher
//!
//! AES in CFB mode (128-bit segments) over a fully buffered payload.
//!
//! ## Wire layout
//!
//! ```text
//! ┌──────────────┬───────────────────────────────┐
//! │ IV (16 bytes)│ plaintext XOR CFB keystream   │
//! └──────────────┴───────────────────────────────┘
//! ```
//!
//! There is no authentication tag: a flipped ciphertext bit decrypts to a
//! flipped plaintext bit. Integrity is checked out of band by
//! [`checksum`](super::checksum).

use aes::cipher::{AsyncStreamCipher, KeyIvInit};
use aes::{Aes128, Aes192, Aes256};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::common::error::{Result, StegoError};

/// Length of a freshly generated master key (AES-256).
pub const MASTER_KEY_LEN: usize = 32;

/// AES block size, also the IV length.
pub const IV_LEN: usize = 16;

type Aes128CfbEnc = cfb_mode::Encryptor<Aes128>;
type Aes192CfbEnc = cfb_mode::Encryptor<Aes192>;
type Aes256CfbEnc = cfb_mode::Encryptor<Aes256>;
type Aes128CfbDec = cfb_mode::Decryptor<Aes128>;
type Aes192CfbDec = cfb_mode::Decryptor<Aes192>;
type Aes256CfbDec = cfb_mode::Decryptor<Aes256>;

/// Generate a new 32-byte master key from the OS entropy source.
pub fn generate_key() -> Result<Vec<u8>> {
    let mut key = vec![0u8; MASTER_KEY_LEN];
    OsRng
        .try_fill_bytes(&mut key)
        .map_err(StegoError::RandomSource)?;
    Ok(key)
}

/// Encrypt `plaintext` under `key` (16, 24 or 32 bytes) with a random IV.
///
/// An empty plaintext yields the IV alone.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    check_key(key)?;

    let mut ciphertext = vec![0u8; IV_LEN + plaintext.len()];
    let (iv, body) = ciphertext.split_at_mut(IV_LEN);
    OsRng.try_fill_bytes(iv).map_err(StegoError::RandomSource)?;
    body.copy_from_slice(plaintext);

    let invalid = |_| StegoError::InvalidKey(key.len());
    match key.len() {
        16 => Aes128CfbEnc::new_from_slices(key, iv).map_err(invalid)?.encrypt(body),
        24 => Aes192CfbEnc::new_from_slices(key, iv).map_err(invalid)?.encrypt(body),
        _ => Aes256CfbEnc::new_from_slices(key, iv).map_err(invalid)?.encrypt(body),
    }

    Ok(ciphertext)
}

/// Split the IV prefix off `ciphertext` and decrypt the remainder.
pub fn decrypt(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    check_key(key)?;

    if ciphertext.len() < IV_LEN {
        return Err(StegoError::CiphertextTooShort(ciphertext.len()));
    }

    let (iv, body) = ciphertext.split_at(IV_LEN);
    let mut plaintext = body.to_vec();

    let invalid = |_| StegoError::InvalidKey(key.len());
    match key.len() {
        16 => Aes128CfbDec::new_from_slices(key, iv).map_err(invalid)?.decrypt(&mut plaintext),
        24 => Aes192CfbDec::new_from_slices(key, iv).map_err(invalid)?.decrypt(&mut plaintext),
        _ => Aes256CfbDec::new_from_slices(key, iv).map_err(invalid)?.decrypt(&mut plaintext),
    }

    Ok(plaintext)
}

fn check_key(key: &[u8]) -> Result<()> {
    match key.len() {
        16 | 24 | 32 => Ok(()),
        n => Err(StegoError::InvalidKey(n)),
    }
}
