//! # File Helpers
//!
//! Create/read named byte blobs and base64 key files. Every failure carries
//! the offending path.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::error::StegoError;

/// Write `content` to `path`, replacing any existing file.
pub fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    fs::write(path, content)
        .with_context(|| format!("failed writing content to file '{}'", path.display()))?;
    debug!("Created file: {}", path.display());
    Ok(())
}

pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed reading file '{}'", path.display()))
}

/// Write `key` as standard base64 to `<path>.key` and return the new path.
pub fn write_key(path: &Path, key: &[u8]) -> Result<PathBuf> {
    let key_path = with_suffix(path, "key");
    write_file(&key_path, STANDARD.encode(key).as_bytes())?;
    Ok(key_path)
}

/// Read a base64 key file. Surrounding whitespace (e.g. a trailing newline
/// added by an editor) is ignored.
pub fn read_key(path: &Path) -> Result<Vec<u8>> {
    let encoded = read_file(path)?;
    let encoded = String::from_utf8_lossy(&encoded);

    STANDARD
        .decode(encoded.trim())
        .map_err(StegoError::from)
        .with_context(|| format!("failed decoding file '{}' from base64", path.display()))
}

/// Append `.suffix` to the full file name: `out/secret.enc` -> `out/secret.enc.key`.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
