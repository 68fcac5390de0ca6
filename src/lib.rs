//! jmx-relay - JMX metric normalizer and forwarder.
//!
//! Turns raw JMX attribute samples into flat, dotted metric names with a
//! numeric value and forwards the batch to an Ambari-style timeline
//! collector.
//!
//! # Architecture
//!
//! - `metrics`: name building, whitelist filtering, adaptation and sinks
//! - `core`: errors, configuration and retry support
//! - `cli`: command-line interface
//!
//! # Example
//!
//! ```no_run
//! use jmx_relay::metrics::{BatchContext, MemorySink, MetricAdapter, NameBuilder, RawSample};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = MetricAdapter::new(
//!         NameBuilder::new(["type", "name"]),
//!         BatchContext::new("broker-1", "kafka_broker"),
//!         Arc::new(MemorySink::new()),
//!     );
//!     let sample = RawSample::new("java.lang", "ThreadCount", 42i64, 1556079293324)
//!         .with_key("type", "Threading");
//!     adapter.handle(&[sample]).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod cli;
pub mod core;
pub mod metrics;

// Re-export core types for convenience
pub use crate::core::{Config, Result};
