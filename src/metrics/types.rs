//! Raw and normalized metric records.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Scalar value carried by a raw JMX sample.
///
/// Attribute values arrive loosely typed; only integers, finite floats and
/// text that reads as a finite decimal number count as numeric.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleValue {
    /// Signed integer (int, long, short, byte attributes)
    Int(i64),
    /// Unsigned integer too large for `i64`
    UInt(u64),
    /// Floating point (double, float attributes)
    Float(f64),
    /// Boolean attribute
    Bool(bool),
    /// String attribute
    Text(String),
    /// Missing or null attribute
    #[default]
    Null,
}

impl SampleValue {
    /// Coerce to `f64`, or `None` when the value is not numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SampleValue::Int(v) => Some(*v as f64),
            SampleValue::UInt(v) => Some(*v as f64),
            SampleValue::Float(v) => Some(*v).filter(|v| v.is_finite()),
            SampleValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite()),
            SampleValue::Bool(_) | SampleValue::Null => None,
        }
    }

    /// True when [`as_f64`](Self::as_f64) yields a value.
    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }
}

impl From<i64> for SampleValue {
    fn from(v: i64) -> Self {
        SampleValue::Int(v)
    }
}

impl From<f64> for SampleValue {
    fn from(v: f64) -> Self {
        SampleValue::Float(v)
    }
}

impl From<&str> for SampleValue {
    fn from(v: &str) -> Self {
        SampleValue::Text(v.to_string())
    }
}

/// One attribute observation read from an MBean.
///
/// ```text
/// domain=kafka.network
/// hierarchy_keys={type=RequestMetrics, name=LocalTimeMs, request=Offsets}
/// attribute_name=99thPercentile
/// value=5.0
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawSample {
    /// Object name domain
    pub domain: String,
    /// Object name key properties; storage order carries no meaning
    #[serde(default)]
    pub hierarchy_keys: HashMap<String, String>,
    /// Attribute read from the MBean
    pub attribute_name: String,
    /// Composite/tabular path below the attribute
    #[serde(default)]
    pub extra_path: Vec<String>,
    /// Attribute value
    #[serde(default)]
    pub value: SampleValue,
    /// Capture time, epoch millis
    pub timestamp_millis: i64,
}

impl RawSample {
    /// Create a sample with no hierarchy keys or extra path.
    pub fn new(
        domain: impl Into<String>,
        attribute_name: impl Into<String>,
        value: impl Into<SampleValue>,
        timestamp_millis: i64,
    ) -> Self {
        Self {
            domain: domain.into(),
            hierarchy_keys: HashMap::new(),
            attribute_name: attribute_name.into(),
            extra_path: Vec::new(),
            value: value.into(),
            timestamp_millis,
        }
    }

    /// Add a hierarchy key property.
    pub fn with_key(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.hierarchy_keys.insert(key.into(), value.into());
        self
    }

    /// Append an extra path segment.
    pub fn with_path_segment(mut self, segment: impl Into<String>) -> Self {
        self.extra_path.push(segment.into());
        self
    }
}

/// Metric type tag reported to the collector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MetricKind {
    /// Point-in-time measurement
    Gauge,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "GAUGE",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat, timestamped metric ready for a sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMetric {
    /// Dotted metric name, never contains spaces
    pub name: String,
    pub host_id: String,
    pub app_id: String,
    pub timestamp_millis: i64,
    pub value: f64,
    pub kind: MetricKind,
}

/// Host/application context applied to a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchContext {
    pub host_id: String,
    pub app_id: String,
    /// Replaces every sample's own timestamp when set
    pub timestamp_override: Option<i64>,
}

impl BatchContext {
    /// Context that keeps each sample's capture time.
    pub fn new(host_id: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            host_id: host_id.into(),
            app_id: app_id.into(),
            timestamp_override: None,
        }
    }

    /// Stamp every metric of the batch with `timestamp_millis`.
    pub fn at(mut self, timestamp_millis: i64) -> Self {
        self.timestamp_override = Some(timestamp_millis);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(SampleValue::Int(42).as_f64(), Some(42.0));
        assert_eq!(SampleValue::UInt(u64::MAX).as_f64(), Some(u64::MAX as f64));
        assert_eq!(SampleValue::Float(5.5).as_f64(), Some(5.5));
        assert_eq!(SampleValue::from(" 17.25 ").as_f64(), Some(17.25));
    }

    #[test]
    fn test_non_numeric_values() {
        assert_eq!(SampleValue::from("NaNtext").as_f64(), None);
        assert_eq!(SampleValue::from("NaN").as_f64(), None);
        assert_eq!(SampleValue::from("inf").as_f64(), None);
        assert_eq!(SampleValue::from("").as_f64(), None);
        assert_eq!(SampleValue::Bool(true).as_f64(), None);
        assert_eq!(SampleValue::Null.as_f64(), None);
        assert!(!SampleValue::Null.is_numeric());
    }

    #[test]
    fn test_non_finite_floats_rejected() {
        assert_eq!(SampleValue::Float(f64::NAN).as_f64(), None);
        assert_eq!(SampleValue::Float(f64::INFINITY).as_f64(), None);
        assert_eq!(SampleValue::Float(f64::NEG_INFINITY).as_f64(), None);
        assert_eq!(SampleValue::Float(-0.5).as_f64(), Some(-0.5));
    }

    #[test]
    fn test_sample_value_from_json() {
        let values: Vec<SampleValue> =
            serde_json::from_str(r#"[3, -7, 18446744073709551615, 2.5, true, "12", null]"#)
                .unwrap();

        assert_eq!(
            values,
            vec![
                SampleValue::Int(3),
                SampleValue::Int(-7),
                SampleValue::UInt(u64::MAX),
                SampleValue::Float(2.5),
                SampleValue::Bool(true),
                SampleValue::Text("12".to_string()),
                SampleValue::Null,
            ]
        );
    }

    #[test]
    fn test_raw_sample_from_json_defaults() {
        let sample: RawSample = serde_json::from_str(
            r#"{"domain":"java.lang","attribute_name":"Count","timestamp_millis":1}"#,
        )
        .unwrap();

        assert!(sample.hierarchy_keys.is_empty());
        assert!(sample.extra_path.is_empty());
        assert_eq!(sample.value, SampleValue::Null);
    }

    #[test]
    fn test_metric_kind_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&MetricKind::Gauge).unwrap(), "\"GAUGE\"");
        assert_eq!(MetricKind::Gauge.to_string(), "GAUGE");
    }
}
