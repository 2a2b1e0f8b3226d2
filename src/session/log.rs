//! Session accumulation and metadata

use crate::types::Sample;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Descriptor of one capture run
///
/// Optionally persisted as a JSON sidecar next to the session CSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// When the pipeline entered its ingestion loop
    pub started_at: DateTime<Utc>,
    /// Human-readable description of the line source
    pub source: String,
    /// Configured sliding window capacity
    pub window_capacity: usize,
    /// Number of samples handed to the recorder
    pub total_samples: usize,
}

impl SessionMetadata {
    /// Create metadata for a run starting now
    pub fn new(source: impl Into<String>, window_capacity: usize) -> Self {
        Self {
            started_at: Utc::now(),
            source: source.into(),
            window_capacity,
            total_samples: 0,
        }
    }
}

/// Append-only log of every sample admitted during a run
///
/// Unlike the sliding window this grows without bound; the pipeline
/// only maintains it when full-session persistence is configured.
#[derive(Debug, Default)]
pub struct SessionLog {
    samples: Vec<Sample>,
}

impl SessionLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one admitted sample
    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// All samples in admission order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of samples accumulated
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if no samples were admitted
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_accumulates_in_order() {
        let mut log = SessionLog::new();
        assert!(log.is_empty());

        for i in 0..5 {
            log.push(Sample::new(i * 10, 1.0, 2.0));
        }
        assert_eq!(log.len(), 5);
        assert_eq!(log.samples()[0].millis, 0);
        assert_eq!(log.samples()[4].millis, 40);
    }

    #[test]
    fn test_metadata_serializes() {
        let mut metadata = SessionMetadata::new("serial COM6 @ 115200 baud", 100);
        metadata.total_samples = 42;
        let json = serde_json::to_string(&metadata).unwrap();
        let back: SessionMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.total_samples, 42);
        assert_eq!(back.window_capacity, 100);
        assert_eq!(back.source, "serial COM6 @ 115200 baud");
    }
}
