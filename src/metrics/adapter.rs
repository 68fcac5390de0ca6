//! Raw sample batches to normalized metrics, and on to a sink.

use super::filter::MetricNameFilter;
use super::name::NameBuilder;
use super::sink::MetricSink;
use super::types::{BatchContext, MetricKind, NormalizedMetric, RawSample};
use crate::core::{Config, Result};
use rand::Rng;
use std::sync::Arc;

/// Names of the synthetic metrics sent by [`MetricAdapter::probe`]
pub const PROBE_METRIC_NAMES: [&str; 3] = [
    "jmxrelay.probe.BytesInPerSec.count",
    "jmxrelay.probe.BytesOutPerSec.count",
    "jmxrelay.probe.heartbeat.count",
];

/// Converts raw JMX samples into GAUGE metrics and forwards them.
///
/// The adapter holds no mutable state; the optional filter is an immutable
/// snapshot shared with other adapters.
pub struct MetricAdapter {
    names: NameBuilder,
    context: BatchContext,
    filter: Option<Arc<dyn MetricNameFilter>>,
    sink: Arc<dyn MetricSink>,
    debug: bool,
}

impl MetricAdapter {
    pub fn new(names: NameBuilder, context: BatchContext, sink: Arc<dyn MetricSink>) -> Self {
        Self {
            names,
            context,
            filter: None,
            sink,
            debug: false,
        }
    }

    /// Adapter configured from `config`, without a filter.
    pub fn from_config(config: &Config, sink: Arc<dyn MetricSink>) -> Self {
        Self::new(
            NameBuilder::new(config.naming.key_priority.iter().cloned()),
            BatchContext::new(config.context.host_id.clone(), config.context.app_id.clone()),
            sink,
        )
        .with_debug(config.debug)
    }

    /// Only forward metrics whose name the filter accepts.
    pub fn with_filter(mut self, filter: Arc<dyn MetricNameFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Log every sample and created metric at debug level.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn context(&self) -> &BatchContext {
        &self.context
    }

    pub fn has_filter(&self) -> bool {
        self.filter.is_some()
    }

    /// Convert a batch. Non-numeric and filtered samples produce nothing.
    pub fn adapt(&self, batch: &[RawSample], context: &BatchContext) -> Vec<NormalizedMetric> {
        batch
            .iter()
            .filter_map(|sample| {
                if self.debug {
                    tracing::debug!("Raw sample: {:?}", sample);
                }
                self.adapt_sample(sample, context)
            })
            .collect()
    }

    /// Convert one sample, or `None` if it is skipped.
    pub fn adapt_sample(
        &self,
        sample: &RawSample,
        context: &BatchContext,
    ) -> Option<NormalizedMetric> {
        let Some(value) = sample.value.as_f64() else {
            tracing::trace!(
                "Skipping non-numeric attribute {}:{} = {:?}",
                sample.domain,
                sample.attribute_name,
                sample.value
            );
            return None;
        };

        let name = self.names.build(sample);

        if let Some(filter) = &self.filter {
            if !filter.accept(&name) {
                tracing::debug!("Metric {} is not in the whitelist", name);
                return None;
            }
        }

        let timestamp_millis = context.timestamp_override.unwrap_or(sample.timestamp_millis);
        Some(self.create_metric(name, value, timestamp_millis, context))
    }

    fn create_metric(
        &self,
        name: String,
        value: f64,
        timestamp_millis: i64,
        context: &BatchContext,
    ) -> NormalizedMetric {
        let kind = MetricKind::Gauge;
        if self.debug {
            tracing::debug!(
                "Creating metric: type={} time={} app_id={} host={} name={} value={}",
                kind,
                timestamp_millis,
                context.app_id,
                context.host_id,
                name,
                value
            );
        }

        NormalizedMetric {
            name,
            host_id: context.host_id.clone(),
            app_id: context.app_id.clone(),
            timestamp_millis,
            value,
            kind,
        }
    }

    /// Hand a batch to the sink and return its verdict.
    pub async fn forward(&self, metrics: &[NormalizedMetric]) -> Result<bool> {
        let accepted = self.sink.forward(metrics).await?;
        if accepted {
            tracing::debug!("Forwarded {} metrics to {} sink", metrics.len(), self.sink.name());
        } else {
            tracing::warn!("{} sink did not accept {} metrics", self.sink.name(), metrics.len());
        }
        Ok(accepted)
    }

    /// Adapt a batch with the configured context and forward the result.
    ///
    /// An empty result is logged and reported as success without calling
    /// the sink.
    pub async fn handle(&self, batch: &[RawSample]) -> Result<bool> {
        let metrics = self.adapt(batch, &self.context);

        if metrics.is_empty() {
            tracing::warn!("No metrics accepted from {} samples, nothing to forward", batch.len());
            return Ok(true);
        }

        tracing::debug!("Accepted {} of {} samples", metrics.len(), batch.len());
        self.forward(&metrics).await
    }

    /// Forward three synthetic gauges stamped with the current time.
    pub async fn probe(&self) -> Result<bool> {
        let now = chrono::Utc::now().timestamp_millis();
        tracing::info!("Sending probe metrics at {}", now);

        let metrics: Vec<NormalizedMetric> = {
            let mut rng = rand::thread_rng();
            PROBE_METRIC_NAMES
                .iter()
                .map(|name| {
                    let value = f64::from(rng.gen_range(0..100u32));
                    self.create_metric((*name).to_string(), value, now, &self.context)
                })
                .collect()
        };

        self.forward(&metrics).await
    }
}
