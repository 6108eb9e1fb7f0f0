//! # Encrypter
//!
//! Runs one encryption end to end:
//!
//! 1. Generate a master key and save it as `<name>.enc.key`
//! 2. Checksum the plaintext (`<name>.checksum`), encrypt it to `<name>.enc`
//!    and checksum the ciphertext (`<name>.enc.checksum`)
//! 3. With more than one part, split the master key into `<NNN>.key` files
//!    and hide each share in a carrier image (`<NNN>.png` +
//!    `<NNN>.png.checksum`)
//!
//! A failure stops the run immediately. Files already written stay on disk.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, info, warn};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::common::config::EncrypterConfig;
use crate::common::error::StegoError;
use crate::common::files;
use crate::crypto::{checksum, cipher, shamir};
use crate::processing::steganography;

/// Extensions accepted as carrier images (compared case-insensitively).
const CARRIER_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Paths of every artifact written by [`Encrypter::encrypt`].
#[derive(Debug, Clone, Default)]
pub struct EncryptionOutput {
    pub ciphertext: PathBuf,
    pub master_key: PathBuf,
    /// `<NNN>.key` files, in share order.
    pub share_keys: Vec<PathBuf>,
    /// `<NNN>.png` files; empty when no carrier images were available.
    pub share_images: Vec<PathBuf>,
}

pub struct Encrypter {
    config: EncrypterConfig,
}

impl Encrypter {
    /// Validate `config` and build an encrypter.
    ///
    /// # Errors
    ///
    /// [`StegoError::Configuration`] when `threshold > parts`, or when
    /// splitting is requested (`parts > 1`) with a zero threshold.
    pub fn new(config: EncrypterConfig) -> Result<Self> {
        let (parts, threshold) = (config.parts, config.threshold);

        if threshold > parts {
            return Err(StegoError::Configuration(format!(
                "threshold {} cannot exceed parts {}",
                threshold, parts
            ))
            .into());
        }

        if parts > 1 && threshold == 0 {
            return Err(StegoError::Configuration(format!(
                "threshold must be at least 1 when splitting into {} parts",
                parts
            ))
            .into());
        }

        Ok(Self { config })
    }

    /// Encrypt everything `reader` yields under the logical file `name`.
    pub fn encrypt(&self, mut reader: impl Read, name: &str) -> Result<EncryptionOutput> {
        check_name(name, self.config.parts)?;
        info!("🔒 Encrypting '{}'", name);

        let output_dir = &self.config.output_dir;
        fs::create_dir_all(output_dir).with_context(|| {
            format!("failed creating output directory '{}'", output_dir.display())
        })?;

        let base = output_dir.join(name);
        let encrypted_path = files::with_suffix(&base, "enc");

        let master_key = cipher::generate_key().context("failed generating master key")?;
        let master_key_path = files::write_key(&encrypted_path, &master_key)
            .with_context(|| format!("failed generating and saving master key '{}'", name))?;

        if self.config.parts <= 1 {
            info!("No parts requested. Only the master key will be generated.");
        }
        debug!("Generated master key: {}", STANDARD.encode(&master_key));

        let mut message = Vec::new();
        reader
            .read_to_end(&mut message)
            .context("failed reading message")?;

        checksum::write_checksum_record(&message, &base)
            .context("failed writing checksum file of original message")?;

        let encrypted = cipher::encrypt(&master_key, &message).context("failed encrypting message")?;
        files::write_file(&encrypted_path, &encrypted).context("failed writing encrypted file")?;
        checksum::write_checksum_record(&encrypted, &encrypted_path)
            .context("failed writing checksum file of encrypted message")?;

        let mut output = EncryptionOutput {
            ciphertext: encrypted_path,
            master_key: master_key_path,
            ..Default::default()
        };

        if self.config.parts > 1 {
            self.split_and_save_key(&master_key, &mut output)
                .context("failed splitting and saving master key")?;
        }

        info!("Encrypted files and keys saved to: {}", output_dir.display());

        Ok(output)
    }

    fn split_and_save_key(&self, master_key: &[u8], output: &mut EncryptionOutput) -> Result<()> {
        let (parts, threshold) = (self.config.parts, self.config.threshold);
        info!("Splitting key into {} parts (threshold: {})", parts, threshold);

        let shares = shamir::split(master_key, parts, threshold)?;

        let carriers = carrier_pool(&self.config.images_dir);
        if carriers.is_empty() {
            warn!(
                "No images found in '{}'. Partial keys are only written as .key files.",
                self.config.images_dir.display()
            );
        }
        let mut carriers = carriers.iter().cycle();

        for (i, share) in shares.iter().enumerate() {
            let number = format!("{:03}", i + 1);
            let base = self.config.output_dir.join(&number);
            let serialized = share.to_bytes();

            info!("🔑 Writing partial key {}", number);
            debug!("{}) {}", number, share.to_base64());

            let key_path = files::write_key(&base, &serialized)
                .with_context(|| format!("failed writing key file '{}'", base.display()))?;
            output.share_keys.push(key_path);

            let Some(carrier) = carriers.next() else {
                continue;
            };

            let image_path = files::with_suffix(&base, "png");
            debug!(
                "Writing partial key {} into image (carrier '{}')",
                number,
                carrier.display()
            );

            let carrier_bytes = files::read_file(carrier)?;
            let image_bytes = steganography::embed_bytes(&carrier_bytes, &serialized)
                .with_context(|| {
                    format!("failed encoding secret into image file '{}'", image_path.display())
                })?;
            files::write_file(&image_path, &image_bytes)?;
            checksum::write_checksum_record(&image_bytes, &image_path).with_context(|| {
                format!("failed writing checksum file of '{}'", image_path.display())
            })?;

            output.share_images.push(image_path);
        }

        Ok(())
    }
}

/// Carrier images found directly in `images_dir`, sorted by path.
///
/// A missing or unreadable directory yields an empty pool.
pub fn carrier_pool(images_dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(images_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("failed reading images folder '{}': {}", images_dir.display(), e);
            return Vec::new();
        }
    };

    let mut images: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_carrier(path))
        .collect();
    images.sort();
    images
}

fn is_carrier(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            CARRIER_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// The logical name becomes a file name inside the output directory.
///
/// When the key is split, the name must not land on a share artifact
/// (`<NNN>.key`, `<NNN>.png` or `<NNN>.png.checksum`): its checksum record
/// and later its cleartext would overwrite that file.
fn check_name(name: &str, parts: u8) -> Result<()> {
    let is_plain = !name.is_empty()
        && name != "."
        && name != ".."
        && Path::new(name).file_name().map(|n| n == name).unwrap_or(false);

    if !is_plain {
        return Err(StegoError::Configuration(format!(
            "'{}' is not a plain file name",
            name
        ))
        .into());
    }

    if parts > 1 {
        let collides = (1..=parts).any(|i| {
            ["key", "png", "png.checksum"]
                .iter()
                .any(|suffix| name.eq_ignore_ascii_case(&format!("{:03}.{}", i, suffix)))
        });
        if collides {
            return Err(StegoError::Configuration(format!(
                "'{}' clashes with a partial key file written to the same directory",
                name
            ))
            .into());
        }
    }
    Ok(())
}
