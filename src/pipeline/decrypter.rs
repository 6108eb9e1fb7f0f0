//! # Decrypter
//!
//! Recovers the cleartext of a `<name>.enc` file from one of two key sources,
//! chosen once when the [`KeySource`] is resolved:
//!
//! ```text
//!            ┌──────────────────────┐
//!            │ CollectingKeyMaterial│
//!            └──────────┬───────────┘
//!        ┌──────────────┼──────────────────┐
//!        ▼              ▼                  ▼
//!  HasMasterKey  HasSufficientShares   Insufficient ──► error
//!        │              │
//!        │              ▼
//!        │          Combining
//!        └──────┬───────┘
//!               ▼
//!          Decrypting ──► Done (cleartext written to <name>)
//! ```
//!
//! With checksum verification enabled, every stored `*.checksum` record next to
//! an input (ciphertext, share images) and the one next to the cleartext
//! destination is checked. A mismatch aborts before anything is written.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::common::config::DecrypterConfig;
use crate::common::error::StegoError;
use crate::common::files;
use crate::crypto::{checksum, cipher, shamir, Share};
use crate::processing::steganography;

/// Distinct shares required before combining is attempted at all.
const MIN_SHARES: usize = 2;

/// Where the key for a decryption comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Base64 master key file (`<name>.enc.key`).
    MasterKeyFile(PathBuf),
    /// Partial keys from base64 `.key` files and/or carrier images.
    Shares {
        key_files: Vec<PathBuf>,
        image_files: Vec<PathBuf>,
    },
}

impl KeySource {
    /// Pick the key source from the raw inputs. A master key always wins;
    /// any partial keys supplied alongside it are ignored.
    pub fn resolve(
        master_key_file: Option<PathBuf>,
        key_files: Vec<PathBuf>,
        image_files: Vec<PathBuf>,
    ) -> Self {
        match master_key_file {
            Some(path) => {
                let ignored = key_files.len() + image_files.len();
                if ignored > 0 {
                    warn!("Master key supplied, ignoring {} partial keys", ignored);
                }
                KeySource::MasterKeyFile(path)
            }
            None => KeySource::Shares {
                key_files,
                image_files,
            },
        }
    }
}

/// Key material after collection, before any cryptographic operation.
enum KeyMaterial {
    MasterKey(Vec<u8>),
    Shares(Vec<Share>),
}

pub struct Decrypter {
    config: DecrypterConfig,
    source: KeySource,
}

impl Decrypter {
    pub fn new(config: DecrypterConfig, source: KeySource) -> Self {
        Self { config, source }
    }

    /// Decrypt `encrypted_file` and write the cleartext beside it, with the
    /// `.enc` suffix removed. Returns the cleartext path.
    pub fn decrypt(&self, encrypted_file: &Path) -> Result<PathBuf> {
        info!("Decrypting '{}'", display_name(encrypted_file));

        let output_file = cleartext_path(encrypted_file)?;

        let key = match self.collect_key_material()? {
            KeyMaterial::MasterKey(key) => {
                info!("Decrypting with master key");
                key
            }
            KeyMaterial::Shares(shares) => {
                info!("Decrypting with {} partial keys", shares.len());
                shamir::combine(&shares).context("failed combining parts")?
            }
        };

        let content = files::read_file(encrypted_file)?;
        self.verify_checksum(&content, encrypted_file)?;

        let cleartext = cipher::decrypt(&key, &content).context("failed decrypting content")?;
        self.verify_checksum(&cleartext, &output_file)?;

        files::write_file(&output_file, &cleartext).context("failed writing decoded file")?;
        info!("Decrypted file saved to: {}", output_file.display());

        Ok(output_file)
    }

    fn collect_key_material(&self) -> Result<KeyMaterial> {
        let (key_files, image_files) = match &self.source {
            KeySource::MasterKeyFile(path) => {
                let key = files::read_key(path).context("failed reading master key file")?;
                return Ok(KeyMaterial::MasterKey(key));
            }
            KeySource::Shares {
                key_files,
                image_files,
            } => (key_files, image_files),
        };

        let mut shares = Vec::with_capacity(key_files.len() + image_files.len());

        for path in key_files {
            let bytes = files::read_key(path).context("failed reading partial key file")?;
            let share = Share::from_bytes(&bytes)
                .with_context(|| format!("failed parsing partial key file '{}'", path.display()))?;
            debug!("Loaded partial key {} from '{}'", share.tag, path.display());
            shares.push(share);
        }

        for path in image_files {
            let image_bytes = files::read_file(path)?;
            self.verify_checksum(&image_bytes, path)?;

            let blob = steganography::extract_bytes(&image_bytes).with_context(|| {
                format!("failed reading partial key image file '{}'", path.display())
            })?;
            let share = Share::from_bytes(&blob).with_context(|| {
                format!("failed parsing partial key hidden in '{}'", path.display())
            })?;
            debug!("Loaded partial key {} from '{}'", share.tag, path.display());
            shares.push(share);
        }

        let distinct = shares.iter().map(|s| s.tag).collect::<BTreeSet<_>>().len();
        if distinct < MIN_SHARES {
            return Err(StegoError::InsufficientShares {
                have: distinct,
                need: MIN_SHARES,
            })
            .context("a master key or at least two distinct partial keys are required");
        }

        Ok(KeyMaterial::Shares(shares))
    }

    /// Check `content` against `<described>.checksum` when that record exists.
    fn verify_checksum(&self, content: &[u8], described: &Path) -> Result<()> {
        if !self.config.verify_checksums {
            return Ok(());
        }

        let record = files::with_suffix(described, "checksum");
        if !record.is_file() {
            warn!(
                "No checksum record for '{}', skipping verification",
                display_name(described)
            );
            return Ok(());
        }

        checksum::verify_against_file(content, described, &record)?;
        debug!("Checksum verified for '{}'", display_name(described));
        Ok(())
    }
}

/// `dir/secret.enc` -> `dir/secret`. Anything else is refused so the input
/// is never overwritten.
pub fn cleartext_path(encrypted_file: &Path) -> Result<PathBuf> {
    let name = encrypted_file
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_suffix(".enc"))
        .filter(|n| !n.is_empty());

    match name {
        Some(name) => Ok(encrypted_file.with_file_name(name)),
        None => Err(StegoError::Configuration(format!(
            "'{}' does not end in .enc",
            encrypted_file.display()
        ))
        .into()),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
