pub mod common;
pub mod crypto;
pub mod pipeline;
pub mod processing;

pub use common::config::{Config, DecrypterConfig, EncrypterConfig};
pub use common::error::StegoError;
pub use pipeline::{Decrypter, EncryptionOutput, Encrypter, KeySource};
