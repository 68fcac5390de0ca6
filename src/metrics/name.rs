//! Flat metric names from JMX object names.
//!
//! ```text
//! domain=kafka.network  keys={type=RequestMetrics, name=LocalTimeMs, request=Offsets}
//! attribute=99thPercentile
//!
//! kafka.network.RequestMetrics.LocalTimeMs.request.Offsets.99thpercentile
//! ```

use super::types::RawSample;
use std::collections::HashMap;

/// Separator between name segments
pub const NAME_SEPARATOR: char = '.';

/// Keys whose name is implied by position and never written out
const IMPLICIT_KEYS: [&str; 2] = ["type", "name"];

/// Attribute suffix that is dropped from names
const DEFAULT_ATTRIBUTE: &str = "value";

/// Build the flat metric name of one sample.
///
/// Hierarchy keys are visited in `key_priority` order; keys missing from the
/// sample or holding an empty value are skipped. Keys other than `type` and
/// `name` contribute `.key.value`, those two contribute only `.value`. The
/// lower-cased attribute is appended unless it is `value`, then the extra
/// path segments verbatim. Spaces are removed from the result.
pub fn build_name<S: AsRef<str>>(
    domain: &str,
    hierarchy_keys: &HashMap<String, String>,
    key_priority: &[S],
    attribute_name: &str,
    extra_path: &[String],
) -> String {
    let mut name = String::with_capacity(64);
    name.push_str(domain);

    for key in key_priority {
        let key = key.as_ref();
        let Some(value) = hierarchy_keys.get(key).filter(|v| !v.is_empty()) else {
            continue;
        };

        if !IMPLICIT_KEYS.contains(&key) {
            name.push(NAME_SEPARATOR);
            name.push_str(key);
        }
        name.push(NAME_SEPARATOR);
        name.push_str(value);
    }

    let suffix = attribute_name.to_lowercase();
    if suffix != DEFAULT_ATTRIBUTE {
        name.push(NAME_SEPARATOR);
        name.push_str(&suffix);
    }

    for segment in extra_path {
        name.push_str(segment);
    }

    name.retain(|c| c != ' ');
    name
}

/// Name builder bound to a configured key priority list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameBuilder {
    key_priority: Vec<String>,
}

impl NameBuilder {
    pub fn new<I, S>(key_priority: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key_priority: key_priority.into_iter().map(Into::into).collect(),
        }
    }

    pub fn key_priority(&self) -> &[String] {
        &self.key_priority
    }

    /// Build the name of `sample`.
    pub fn build(&self, sample: &RawSample) -> String {
        build_name(
            &sample.domain,
            &sample.hierarchy_keys,
            &self.key_priority,
            &sample.attribute_name,
            &sample.extra_path,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_request_metrics_name() {
        let name = build_name(
            "kafka.network",
            &keys(&[
                ("type", "RequestMetrics"),
                ("name", "LocalTimeMs"),
                ("request", "Offsets"),
            ]),
            &["type", "name", "request"],
            "99thPercentile",
            &[],
        );

        assert_eq!(name, "kafka.network.RequestMetrics.LocalTimeMs.request.Offsets.99thpercentile");
    }

    #[test]
    fn test_value_attribute_and_spaces_dropped() {
        let name = build_name(
            "java.lang",
            &keys(&[("name", "PS Eden Space"), ("type", "MemoryPool")]),
            &["type", "name"],
            "value",
            &[],
        );

        assert_eq!(name, "java.lang.MemoryPool.PSEdenSpace");
    }

    #[test]
    fn test_value_attribute_is_case_insensitive() {
        let name = build_name("d", &keys(&[("type", "T")]), &["type"], "Value", &[]);
        assert_eq!(name, "d.T");
    }

    #[test]
    fn test_missing_and_empty_keys_skipped() {
        let name = build_name(
            "kafka.server",
            &keys(&[("type", "BrokerTopicMetrics"), ("topic", "")]),
            &["type", "name", "topic"],
            "Count",
            &[],
        );

        assert_eq!(name, "kafka.server.BrokerTopicMetrics.count");
    }

    #[test]
    fn test_keys_outside_priority_ignored() {
        let name = build_name(
            "kafka.log",
            &keys(&[("type", "Log"), ("name", "Size"), ("partition", "0")]),
            &["type", "name"],
            "Value",
            &[],
        );

        assert_eq!(name, "kafka.log.Log.Size");
    }

    #[test]
    fn test_extra_path_appended_without_separator() {
        let name = build_name(
            "java.lang",
            &keys(&[("type", "Memory")]),
            &["type"],
            "HeapMemoryUsage",
            &[".used".to_string(), "_bytes".to_string()],
        );

        assert_eq!(name, "java.lang.Memory.heapmemoryusage.used_bytes");
    }

    #[test]
    fn test_priority_order_wins_over_sample_order() {
        let builder = NameBuilder::new(["name", "type"]);
        let sample = RawSample::new("d", "Count", 1i64, 0)
            .with_key("type", "A")
            .with_key("name", "B");

        assert_eq!(builder.build(&sample), "d.B.A.count");
    }

    #[test]
    fn test_name_never_contains_spaces() {
        let builder = NameBuilder::new(["type", "name", "request"]);
        let sample = RawSample::new(" my domain ", "Mean Rate", 1i64, 0)
            .with_key("type", "Request Metrics")
            .with_key("request", " Fetch Follower ")
            .with_path_segment(" extra ");

        let name = builder.build(&sample);
        assert!(!name.contains(' '));
        assert_eq!(name, "mydomain.RequestMetrics.request.FetchFollower.meanrateextra");
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let builder = NameBuilder::new(["type", "name", "request", "topic"]);
        let pairs = [
            ("request", "Produce"),
            ("topic", "events"),
            ("name", "TotalTimeMs"),
            ("type", "RequestMetrics"),
        ];

        let expected = builder.build(
            &pairs
                .iter()
                .fold(RawSample::new("kafka.network", "Count", 1i64, 0), |s, (k, v)| {
                    s.with_key(*k, *v)
                }),
        );

        for rotation in 0..pairs.len() {
            let mut rotated = pairs.to_vec();
            rotated.rotate_left(rotation);
            let sample = rotated
                .iter()
                .rev()
                .fold(RawSample::new("kafka.network", "Count", 1i64, 0), |s, (k, v)| {
                    s.with_key(*k, *v)
                });
            assert_eq!(builder.build(&sample), expected);
        }
    }
}
