//! Whitelist filtering of built metric names.
//!
//! Whitelist files hold one entry per line:
//!
//! ```text
//! # exact names
//! kafka.server.BrokerTopicMetrics.BytesInPerSec.count
//! # globs, `*` spans any characters
//! kafka.network.RequestMetrics.*.99thpercentile
//! # regular expressions after the `._p_` prefix
//! ._p_java\.lang\.MemoryPool\..*
//! ```

use crate::core::{RelayError, Result};
use ahash::AHashSet;
use regex::RegexSet;
use std::path::Path;

/// Prefix marking a whitelist line as a regular expression
pub const PATTERN_PREFIX: &str = "._p_";

/// Accept/reject decision on a built metric name.
pub trait MetricNameFilter: Send + Sync {
    /// Returns true if the metric should be forwarded
    fn accept(&self, name: &str) -> bool;
}

/// Immutable whitelist of exact names and patterns.
#[derive(Debug, Clone)]
pub struct Whitelist {
    exact: AHashSet<String>,
    patterns: RegexSet,
}

impl Whitelist {
    /// Load a whitelist file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RelayError::config(format!("Failed to read whitelist file {:?}: {}", path, e))
        })?;
        let whitelist = Self::parse(&content)?;

        tracing::info!(
            "Loaded whitelist from {:?}: {} names, {} patterns",
            path,
            whitelist.exact.len(),
            whitelist.patterns.len()
        );

        Ok(whitelist)
    }

    /// Parse whitelist content.
    pub fn parse(content: &str) -> Result<Self> {
        let mut exact = AHashSet::new();
        let mut patterns = Vec::new();

        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(pattern) = line.strip_prefix(PATTERN_PREFIX) {
                patterns.push(anchored(pattern));
            } else if line.contains('*') {
                patterns.push(glob_to_regex(line));
            } else {
                exact.insert(line.to_string());
            }
        }

        let patterns = RegexSet::new(&patterns).map_err(|e| {
            // RegexSet reports one error for the whole set; recompile to find the culprit
            let culprit = patterns
                .iter()
                .find(|p| regex::Regex::new(p).is_err())
                .cloned()
                .unwrap_or_default();
            RelayError::Filter {
                pattern: culprit,
                message: e.to_string(),
            }
        })?;

        Ok(Self { exact, patterns })
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetricNameFilter for Whitelist {
    fn accept(&self, name: &str) -> bool {
        self.exact.contains(name) || self.patterns.is_match(name)
    }
}

fn anchored(pattern: &str) -> String {
    format!("^(?:{})$", pattern)
}

fn glob_to_regex(glob: &str) -> String {
    let body = glob.split('*').map(regex::escape).collect::<Vec<_>>().join(".*");
    anchored(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const WHITELIST: &str = r"
# broker throughput
kafka.server.BrokerTopicMetrics.BytesInPerSec.count

kafka.network.RequestMetrics.*.99thpercentile
._p_java\.lang\.MemoryPool\.PS(Eden|Survivor)Space
";

    #[test]
    fn test_exact_names() {
        let whitelist = Whitelist::parse(WHITELIST).unwrap();
        assert!(whitelist.accept("kafka.server.BrokerTopicMetrics.BytesInPerSec.count"));
        assert!(!whitelist.accept("kafka.server.BrokerTopicMetrics.BytesOutPerSec.count"));
        assert_eq!(whitelist.len(), 3);
    }

    #[test]
    fn test_glob_entries() {
        let whitelist = Whitelist::parse(WHITELIST).unwrap();
        assert!(whitelist
            .accept("kafka.network.RequestMetrics.LocalTimeMs.request.Offsets.99thpercentile"));
        assert!(!whitelist.accept("kafka.network.RequestMetrics.LocalTimeMs.request.Offsets.mean"));
        // dots in globs are literal
        assert!(!whitelist.accept("kafkaXnetwork.RequestMetrics.a.99thpercentile"));
    }

    #[test]
    fn test_regex_entries_are_anchored() {
        let whitelist = Whitelist::parse(WHITELIST).unwrap();
        assert!(whitelist.accept("java.lang.MemoryPool.PSEdenSpace"));
        assert!(whitelist.accept("java.lang.MemoryPool.PSSurvivorSpace"));
        assert!(!whitelist.accept("java.lang.MemoryPool.PSEdenSpace.usage"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Whitelist::parse("._p_kafka.(unclosed").unwrap_err();
        match err {
            RelayError::Filter { pattern, .. } => assert_eq!(pattern, "^(?:kafka.(unclosed)$"),
            other => panic!("Expected filter error, got {other}"),
        }
    }

    #[test]
    fn test_empty_whitelist_rejects_everything() {
        let whitelist = Whitelist::parse("# nothing here\n\n").unwrap();
        assert!(whitelist.is_empty());
        assert!(!whitelist.accept("java.lang.Threading.threadcount"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "java.lang.Threading.threadcount").unwrap();

        let whitelist = Whitelist::load(file.path()).unwrap();
        assert!(whitelist.accept("java.lang.Threading.threadcount"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Whitelist::load(Path::new("/nonexistent/whitelist.txt")).unwrap_err();
        assert_eq!(err.category(), "config");
    }
}
