//! # Error Types
//!
//! Every component of the core reports failures through [`StegoError`].
//! The orchestrators in [`crate::pipeline`] wrap these with `anyhow` context
//! (operation and file name), so the typed error stays reachable at the
//! bottom of the causal chain via `downcast_ref`.

use thiserror::Error;

/// Failure taxonomy shared by the cipher, sharer, codec, stego channel and
/// integrity guard.
#[derive(Debug, Error)]
pub enum StegoError {
    /// Caller supplied an inconsistent configuration (e.g. threshold > parts).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The OS entropy source could not be read.
    #[error("random source unavailable")]
    RandomSource(#[source] rand::Error),

    /// AES key of unsupported length.
    #[error("invalid AES key length {0}: expected 16, 24 or 32 bytes")]
    InvalidKey(usize),

    #[error("ciphertext is {0} bytes, shorter than the 16-byte IV")]
    CiphertextTooShort(usize),

    /// Split bounds violated: `1 <= threshold <= parts <= 255`.
    #[error("invalid split parameters: parts {parts}, threshold {threshold}")]
    InvalidParameters { parts: u8, threshold: u8 },

    #[error("not enough parts provided: {have} distinct, threshold {need}")]
    InsufficientShares { have: usize, need: usize },

    /// Shares that cannot belong to the same split (threshold or length differ).
    #[error("shares do not agree: {0}")]
    ProtocolMismatch(String),

    #[error("malformed share: {0}")]
    MalformedShare(String),

    #[error("image too small: need {required} bits but only {available} bits available")]
    InsufficientCapacity { required: usize, available: usize },

    /// The length header read back from an image does not fit the image.
    #[error("corrupt stego data: header claims {claimed} bits but only {available} bits follow")]
    CorruptStegoData { claimed: usize, available: usize },

    #[error("failed checksum verification of '{0}'")]
    VerificationFailure(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Base64(#[from] base64::DecodeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StegoError>;
