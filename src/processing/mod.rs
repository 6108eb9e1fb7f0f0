//! # Image Processing and Steganography
//!
//! Hides serialized shares inside carrier images using LSB (Least Significant
//! Bit) steganography.

pub mod steganography;

// Re-export main functions for convenience
pub use steganography::{embed_bytes, extract_bytes};
