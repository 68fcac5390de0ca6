//! Error handling, configuration and retry support for the relay.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod retry;

// Re-export commonly used types
pub use config::{Config, ConfigBuilder, LogLevel, SinkKind};
pub use error::{RelayError, Result};
