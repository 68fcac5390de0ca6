//! Sink capability receiving normalized metric batches.

use super::timeline::{TimelineMetrics, TimelineSink};
use super::types::NormalizedMetric;
use crate::core::config::{SinkConfig, SinkKind};
use crate::core::{RelayError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Destination for metric batches.
///
/// Implementations own their transport and reliability policy. `forward`
/// returns `Ok(true)` when the batch was accepted.
#[async_trait::async_trait]
pub trait MetricSink: Send + Sync {
    /// Deliver one batch.
    async fn forward(&self, metrics: &[NormalizedMetric]) -> Result<bool>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Build the sink selected by configuration.
pub fn create_sink(config: &SinkConfig) -> Result<Arc<dyn MetricSink>> {
    let sink: Arc<dyn MetricSink> = match config.kind {
        SinkKind::Timeline => Arc::new(TimelineSink::from_config(config)?),
        SinkKind::Stdout => Arc::new(StdoutSink),
    };
    tracing::debug!("Using {} sink", sink.name());
    Ok(sink)
}

/// In-memory sink recording every batch.
#[derive(Debug, Default)]
pub struct MemorySink {
    batches: Mutex<Vec<Vec<NormalizedMetric>>>,
    failure: Option<String>,
    reject: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink whose every forward fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Sink that records batches but reports them as not accepted.
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn batches(&self) -> Vec<Vec<NormalizedMetric>> {
        self.batches.lock().clone()
    }

    pub fn forward_count(&self) -> usize {
        self.batches.lock().len()
    }
}

#[async_trait::async_trait]
impl MetricSink for MemorySink {
    async fn forward(&self, metrics: &[NormalizedMetric]) -> Result<bool> {
        if let Some(message) = &self.failure {
            return Err(RelayError::sink(message.clone()));
        }
        self.batches.lock().push(metrics.to_vec());
        Ok(!self.reject)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Writes each batch to stdout as one timeline JSON document.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

/// Write `metrics` as a single newline-terminated timeline document.
pub async fn write_timeline_line<W>(writer: &mut W, metrics: &[NormalizedMetric]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(&TimelineMetrics::from_metrics(metrics))?;
    line.push(b'\n');

    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}

#[async_trait::async_trait]
impl MetricSink for StdoutSink {
    async fn forward(&self, metrics: &[NormalizedMetric]) -> Result<bool> {
        write_timeline_line(&mut tokio::io::stdout(), metrics).await?;
        Ok(true)
    }

    fn name(&self) -> &str {
        "stdout"
    }
}
