//! SHA-256 checksum records.
//!
//! A record is `hex(SHA256(content))`, a TAB, then the base name of the file
//! it describes. It is stored beside that file as `<file>.checksum`.

use anyhow::Result;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::common::error::StegoError;
use crate::common::files;

/// Lowercase hex SHA-256 of `content`.
pub fn checksum(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// `<hex>\t<basename>` for `content` stored under `path`.
pub fn checksum_record(content: &[u8], path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}\t{}", checksum(content), name)
}

/// Write the record for `content` to `<path>.checksum`.
pub fn write_checksum_record(content: &[u8], path: &Path) -> Result<PathBuf> {
    let record_path = files::with_suffix(path, "checksum");
    files::write_file(&record_path, checksum_record(content, path).as_bytes())?;
    Ok(record_path)
}

/// Compare `content` against the digest field of `record`.
pub fn verify(content: &[u8], record: &str) -> bool {
    let expected = record.split('\t').next().unwrap_or_default().trim();
    expected.eq_ignore_ascii_case(&checksum(content))
}

/// Check `content` against the record stored at `record_path`.
pub fn verify_against_file(content: &[u8], described: &Path, record_path: &Path) -> Result<()> {
    let record = files::read_file(record_path)?;
    if verify(content, &String::from_utf8_lossy(&record)) {
        Ok(())
    } else {
        Err(StegoError::VerificationFailure(described.display().to_string()).into())
    }
}
