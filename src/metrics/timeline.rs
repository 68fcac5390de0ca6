//! Ambari timeline collector payload and HTTP sink.

use super::sink::MetricSink;
use super::types::NormalizedMetric;
use crate::core::config::SinkConfig;
use crate::core::retry::{retry_with_config, RetryConfig};
use crate::core::{RelayError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Collector path accepting metric batches
pub const TIMELINE_METRICS_PATH: &str = "/ws/v1/timeline/metrics";

/// Batch body posted to the collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineMetrics {
    pub metrics: Vec<TimelineMetric>,
}

/// One metric series in collector format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineMetric {
    #[serde(rename = "metricname")]
    pub metric_name: String,
    #[serde(rename = "appid")]
    pub app_id: String,
    #[serde(rename = "hostname")]
    pub host_name: String,
    #[serde(rename = "starttime")]
    pub start_time: i64,
    #[serde(rename = "type")]
    pub metric_type: String,
    /// Values keyed by epoch millis
    pub metrics: BTreeMap<String, f64>,
}

impl From<&NormalizedMetric> for TimelineMetric {
    fn from(metric: &NormalizedMetric) -> Self {
        let mut values = BTreeMap::new();
        values.insert(metric.timestamp_millis.to_string(), metric.value);

        Self {
            metric_name: metric.name.clone(),
            app_id: metric.app_id.clone(),
            host_name: metric.host_id.clone(),
            start_time: metric.timestamp_millis,
            metric_type: metric.kind.as_str().to_string(),
            metrics: values,
        }
    }
}

impl TimelineMetrics {
    pub fn from_metrics(metrics: &[NormalizedMetric]) -> Self {
        Self {
            metrics: metrics.iter().map(TimelineMetric::from).collect(),
        }
    }
}

/// Sink posting batches to an Ambari Metrics collector.
pub struct TimelineSink {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    retry: RetryConfig,
}

impl TimelineSink {
    /// Create a sink for the collector at `collector_url`.
    pub fn new(collector_url: &str, timeout: Duration, max_attempts: u32) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", collector_url.trim_end_matches('/'), TIMELINE_METRICS_PATH),
            timeout,
            retry: RetryConfig::with_max_attempts(max_attempts),
        })
    }

    pub fn from_config(config: &SinkConfig) -> Result<Self> {
        Self::new(&config.collector_url, config.timeout, config.max_attempts)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Replace the backoff policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn post_once(&self, payload: &TimelineMetrics) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RelayError::Timeout {
                        timeout_ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    RelayError::Http(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if status.is_server_error() {
            Err(RelayError::network(format!("collector returned {}: {}", status, body)))
        } else {
            Err(RelayError::sink(format!("collector rejected batch with {}: {}", status, body)))
        }
    }
}

#[async_trait::async_trait]
impl MetricSink for TimelineSink {
    async fn forward(&self, metrics: &[NormalizedMetric]) -> Result<bool> {
        let payload = TimelineMetrics::from_metrics(metrics);

        retry_with_config(&self.retry, || self.post_once(&payload)).await?;

        tracing::debug!("Posted {} metrics to {}", metrics.len(), self.endpoint);
        Ok(true)
    }

    fn name(&self) -> &str {
        "timeline"
    }
}
