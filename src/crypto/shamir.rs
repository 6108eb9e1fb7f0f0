//! # Threshold Secret Sharing
//!
//! Shamir's scheme over [`Gf256`], applied independently to every byte of
//! the secret.
//!
//! ## Split
//!
//! For each byte `s` a random polynomial of degree `threshold - 1` with
//! constant term `s` is drawn and evaluated at `parts` distinct non-zero
//! x-coordinates (the share tags). The tags are a random selection from
//! `1..=255`; `0` is reserved because `f(0)` is the secret itself.
//!
//! ## Combine
//!
//! Duplicate tags collapse to one point, then `f(0)` is recovered by
//! Lagrange interpolation for every byte position. With fewer than
//! `threshold` distinct points the call fails instead of returning a wrong
//! secret.

use log::debug;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::RngCore;
use std::collections::BTreeMap;

use super::gf256::Gf256;
use super::share::{Share, SHARE_VERSION};
use crate::common::error::{Result, StegoError};

/// Split `secret` into `parts` shares, any `threshold` of which rebuild it.
///
/// Requires `1 <= threshold <= parts` (`parts <= 255` by type).
pub fn split(secret: &[u8], parts: u8, threshold: u8) -> Result<Vec<Share>> {
    if parts == 0 || threshold == 0 || threshold > parts {
        return Err(StegoError::InvalidParameters { parts, threshold });
    }

    let mut rng = OsRng;

    let mut tags: Vec<u8> = (1..=255).collect();
    tags.shuffle(&mut rng);
    tags.truncate(parts as usize);

    let mut payloads = vec![vec![0u8; secret.len()]; parts as usize];
    let mut coeffs = vec![Gf256::ZERO; threshold as usize];
    let mut random = vec![0u8; threshold as usize - 1];

    for (index, &byte) in secret.iter().enumerate() {
        rng.try_fill_bytes(&mut random)
            .map_err(StegoError::RandomSource)?;

        coeffs[0] = Gf256(byte);
        for (c, &r) in coeffs[1..].iter_mut().zip(&random) {
            *c = Gf256(r);
        }

        for (payload, &tag) in payloads.iter_mut().zip(&tags) {
            payload[index] = Gf256::eval_polynomial(&coeffs, Gf256(tag)).0;
        }
    }

    debug!("Split {} byte secret into {} parts (threshold {})", secret.len(), parts, threshold);

    Ok(tags
        .into_iter()
        .zip(payloads)
        .map(|(tag, payload)| Share {
            version: SHARE_VERSION,
            total_parts: parts,
            threshold,
            tag,
            payload,
        })
        .collect())
}

/// Rebuild the secret from shares of a single split.
///
/// # Errors
///
/// - [`StegoError::ProtocolMismatch`] if thresholds or payload lengths differ
/// - [`StegoError::MalformedShare`] if a share carries the reserved tag `0`
/// - [`StegoError::InsufficientShares`] if fewer than `threshold` distinct tags
pub fn combine(shares: &[Share]) -> Result<Vec<u8>> {
    let first = shares
        .first()
        .ok_or(StegoError::InsufficientShares { have: 0, need: 1 })?;
    let threshold = first.threshold;
    let secret_len = first.payload.len();

    let mut points: BTreeMap<u8, &[u8]> = BTreeMap::new();
    for share in shares {
        if share.threshold != threshold {
            return Err(StegoError::ProtocolMismatch(format!(
                "threshold {} differs from threshold {}",
                share.threshold, threshold
            )));
        }
        if share.payload.len() != secret_len {
            return Err(StegoError::ProtocolMismatch(format!(
                "payload length {} differs from length {}",
                share.payload.len(),
                secret_len
            )));
        }
        if share.tag == 0 {
            return Err(StegoError::MalformedShare("tag 0 is reserved".to_string()));
        }
        points.insert(share.tag, &share.payload);
    }

    let need = (threshold as usize).max(1);
    if points.len() < need {
        return Err(StegoError::InsufficientShares {
            have: points.len(),
            need,
        });
    }

    let mut xy: Vec<(Gf256, Gf256)> = points
        .keys()
        .map(|&tag| (Gf256(tag), Gf256::ZERO))
        .collect();

    let secret = (0..secret_len)
        .map(|index| {
            for ((_, y), payload) in xy.iter_mut().zip(points.values()) {
                *y = Gf256(payload[index]);
            }
            Gf256::interpolate_at_zero(&xy).map(|value| value.0)
        })
        .collect::<Option<Vec<u8>>>()
        .ok_or_else(|| StegoError::MalformedShare("repeated share tag".to_string()))?;

    Ok(secret)
}
