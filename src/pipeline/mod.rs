//! # Encryption and Decryption Pipelines
//!
//! The orchestrators sequence the primitives in [`crate::crypto`] and
//! [`crate::processing`] and manage the on-disk artifacts.
//!
//! ## Encrypter ([`encrypter`])
//! Generates the master key, encrypts the payload, splits the key and hides
//! the shares in carrier images.
//!
//! ## Decrypter ([`decrypter`])
//! Collects key material (master key, `.key` files, images), rebuilds the key
//! and writes the cleartext.
//!
//! ## Output layout
//!
//! ```text
//! out/
//! ├── secret.checksum         SHA-256 record of the plaintext
//! ├── secret.enc              IV ‖ AES-CFB ciphertext
//! ├── secret.enc.checksum
//! ├── secret.enc.key          base64 master key
//! ├── 001.key                 base64 share
//! ├── 001.png                 carrier with the share embedded
//! ├── 001.png.checksum
//! └── ...
//! ```

pub mod decrypter;
pub mod encrypter;

// Re-export for convenience
pub use decrypter::{Decrypter, KeySource};
pub use encrypter::{EncryptionOutput, Encrypter};
