//! Bawwab Core Library
//!
//! Shared configuration, error types, and constants for the Bawwab
//! authentication gate.

pub mod config;
pub mod error;

pub use config::GateConfig;
pub use error::{Error, Result};

/// Bawwab version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Connect timeout used when the configuration leaves `timeout` at zero
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
