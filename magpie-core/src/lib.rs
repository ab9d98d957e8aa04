//! Magpie Core - shared configuration and error types
//!
//! This crate provides configuration loading, secrets management, and the
//! base error type shared by the Magpie crates.

pub mod config;
pub mod error;
pub mod secrets;

pub use config::{Config, DiffConfig, ExtractorConfig, RetryConfig};
pub use error::{Error, Result};
pub use secrets::Secrets;
