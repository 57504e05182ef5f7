//! Kernel metadata.
//!
//! Every kernel carries a `KernelMetadata` describing its identity and the
//! performance envelope it is expected to meet.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kernel metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KernelMetadata {
    /// Unique kernel identifier (e.g., "risk/gerber-statistic").
    pub id: String,

    /// Human-readable description.
    pub description: String,

    /// Expected throughput in asset pairs per second.
    pub expected_throughput: u64,

    /// Target latency in microseconds.
    pub target_latency_us: f64,

    /// Version of the kernel implementation.
    pub version: u32,
}

impl KernelMetadata {
    /// Create new batch kernel metadata.
    #[must_use]
    pub fn batch(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            expected_throughput: 10_000,
            target_latency_us: 50.0,
            version: 1,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the expected throughput.
    #[must_use]
    pub fn with_throughput(mut self, ops_per_sec: u64) -> Self {
        self.expected_throughput = ops_per_sec;
        self
    }

    /// Set the target latency.
    #[must_use]
    pub fn with_latency_us(mut self, latency_us: f64) -> Self {
        self.target_latency_us = latency_us;
        self
    }

    /// Set the version.
    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Returns the category part of the ID (`"risk"` for `"risk/gerber-statistic"`).
    #[must_use]
    pub fn category(&self) -> &str {
        self.id.split('/').next().unwrap_or(&self.id)
    }

    /// Returns the name part of the ID (`"gerber-statistic"` for `"risk/gerber-statistic"`).
    #[must_use]
    pub fn name(&self) -> &str {
        self.id.rsplit('/').next().unwrap_or(&self.id)
    }
}

impl Default for KernelMetadata {
    fn default() -> Self {
        Self::batch("unnamed")
    }
}

impl fmt::Display for KernelMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.id, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_metadata_batch() {
        let meta = KernelMetadata::batch("risk/gerber-statistic")
            .with_description("Gerber co-movement matrix")
            .with_throughput(1_000_000)
            .with_latency_us(500.0);

        assert_eq!(meta.id, "risk/gerber-statistic");
        assert_eq!(meta.expected_throughput, 1_000_000);
        assert_eq!(meta.version, 1);
    }

    #[test]
    fn test_id_parts() {
        let meta = KernelMetadata::batch("risk/gerber-statistic");
        assert_eq!(meta.category(), "risk");
        assert_eq!(meta.name(), "gerber-statistic");

        let flat = KernelMetadata::batch("flat");
        assert_eq!(flat.category(), "flat");
        assert_eq!(flat.name(), "flat");
    }

    #[test]
    fn test_display() {
        let meta = KernelMetadata::batch("risk/gerber-statistic").with_version(3);
        assert_eq!(meta.to_string(), "risk/gerber-statistic v3");
    }
}
