//! # Common Components
//!
//! Shared utilities used by the crypto primitives and the pipelines.
//!
//! ## Modules
//!
//! - [`error`]: The [`StegoError`](error::StegoError) taxonomy
//! - [`config`]: Configuration structures and TOML loading
//! - [`files`]: Byte-blob and base64 key file helpers

pub mod config;
pub mod error;
pub mod files;
