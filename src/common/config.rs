//! # Configuration
//!
//! Explicit configuration handed to the [`Encrypter`](crate::pipeline::Encrypter)
//! and [`Decrypter`](crate::pipeline::Decrypter) constructors. Values can be
//! built in code or loaded from a TOML file with [`load_config`].
//!
//! ```toml
//! [encrypt]
//! parts = 5
//! threshold = 3
//! output_dir = "out"
//! images_dir = "images"
//!
//! [decrypt]
//! verify_checksums = true
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Example
/// ```ignore
/// let config: Config = load_config("stego.toml")?;
/// ```
pub fn load_config<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed reading config file '{}'", path.display()))?;
    let config: T = toml::from_str(&content)
        .with_context(|| format!("failed parsing config file '{}'", path.display()))?;
    Ok(config)
}

/// Top-level configuration file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub encrypt: EncrypterConfig,
    pub decrypt: DecrypterConfig,
}

/// Settings for one encryption run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncrypterConfig {
    /// Number of partial keys to produce. `0` or `1` emits only the master key.
    pub parts: u8,
    /// Partial keys needed to rebuild the master key.
    pub threshold: u8,
    /// Where every artifact is written. Created if missing.
    pub output_dir: PathBuf,
    /// Pool of carrier images (jpg/jpeg/png).
    pub images_dir: PathBuf,
}

impl Default for EncrypterConfig {
    fn default() -> Self {
        Self {
            parts: 0,
            threshold: 0,
            output_dir: PathBuf::from("out"),
            images_dir: PathBuf::from("images"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecrypterConfig {
    /// Refuse to decrypt when a stored checksum record does not match.
    pub verify_checksums: bool,
}

impl Default for DecrypterConfig {
    fn default() -> Self {
        Self {
            verify_checksums: true,
        }
    }
}
