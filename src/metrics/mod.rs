//! JMX sample normalization and forwarding.
//!
//! - `name`: flat metric names from object names and attributes
//! - `filter`: optional whitelist applied to built names
//! - `adapter`: batch conversion and hand-off to a sink
//! - `sink`, `timeline`: sink capability and its implementations

pub mod adapter;
pub mod filter;
pub mod name;
pub mod sink;
pub mod timeline;
pub mod types;

pub use adapter::MetricAdapter;
pub use filter::{MetricNameFilter, Whitelist};
pub use name::{build_name, NameBuilder};
pub use sink::{create_sink, write_timeline_line, MemorySink, MetricSink, StdoutSink};
pub use timeline::{TimelineMetric, TimelineMetrics, TimelineSink};
pub use types::{BatchContext, MetricKind, NormalizedMetric, RawSample, SampleValue};
