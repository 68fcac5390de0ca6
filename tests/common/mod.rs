//! Common test utilities and fixtures.

#![allow(dead_code)]

use jmx_relay::metrics::{
    BatchContext, MemorySink, MetricAdapter, NameBuilder, RawSample, SampleValue,
};
use std::sync::Arc;

pub const HOST: &str = "broker-1";
pub const APP: &str = "kafka_broker";
pub const EPOCH: i64 = 1556079293324;

/// Test fixture builder for creating samples with sensible defaults.
pub struct TestSampleBuilder {
    sample: RawSample,
}

impl TestSampleBuilder {
    pub fn new(domain: &str, attribute: &str) -> Self {
        Self {
            sample: RawSample::new(domain, attribute, 1i64, EPOCH),
        }
    }

    pub fn key(mut self, key: &str, value: &str) -> Self {
        self.sample = self.sample.with_key(key, value);
        self
    }

    pub fn value(mut self, value: impl Into<SampleValue>) -> Self {
        self.sample.value = value.into();
        self
    }

    pub fn path(mut self, segment: &str) -> Self {
        self.sample = self.sample.with_path_segment(segment);
        self
    }

    pub fn build(self) -> RawSample {
        self.sample
    }
}

/// Kafka request latency sample.
pub fn request_metrics_sample(value: impl Into<SampleValue>) -> RawSample {
    TestSampleBuilder::new("kafka.network", "99thPercentile")
        .key("type", "RequestMetrics")
        .key("name", "LocalTimeMs")
        .key("request", "Offsets")
        .value(value)
        .build()
}

/// JVM memory pool sample.
pub fn memory_pool_sample(value: impl Into<SampleValue>) -> RawSample {
    TestSampleBuilder::new("java.lang", "Value")
        .key("name", "PS Eden Space")
        .key("type", "MemoryPool")
        .value(value)
        .build()
}

/// Adapter over a recording sink with the default test context.
pub fn recording_adapter(key_priority: &[&str]) -> (MetricAdapter, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let adapter = MetricAdapter::new(
        NameBuilder::new(key_priority.iter().copied()),
        BatchContext::new(HOST, APP),
        Arc::clone(&sink) as Arc<dyn jmx_relay::metrics::MetricSink>,
    );
    (adapter, sink)
}
