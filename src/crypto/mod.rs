//! # Cryptographic Primitives
//!
//! - [`cipher`]: AES-CFB encryption of the payload under the master key
//! - [`gf256`]: The pinned GF(2⁸) field used by the sharer
//! - [`shamir`]: Threshold split/combine of the master key
//! - [`share`]: Binary and base64 encoding of a single share
//! - [`checksum`]: SHA-256 checksum records

pub mod checksum;
pub mod cipher;
pub mod gf256;
pub mod shamir;
pub mod share;

pub use share::Share;
