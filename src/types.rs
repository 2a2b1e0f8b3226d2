//! Core data types for the acquisition pipeline
//!
//! # Main Types
//!
//! - [`Sample`] - One parsed (timestamp, voltage1, voltage2) reading
//! - [`PipelineState`] - Lifecycle of the pipeline controller
//! - [`IngestStats`] - Counters accumulated over one run
//!
//! # Timestamps
//!
//! Sample timestamps are integer milliseconds supplied by the device.
//! They are expected to be non-decreasing within a session, but the
//! pipeline tolerates violations: a regressing timestamp is logged and
//! stored as-is, never corrected or re-sorted.

use serde::{Deserialize, Serialize};

/// A single dual-channel voltage reading
///
/// Immutable once constructed; every consumer (window, recorder, view)
/// works with copies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Device timestamp in milliseconds
    pub millis: u64,
    /// Lead 1 voltage in volts
    pub voltage1: f64,
    /// Lead 2 voltage in volts
    pub voltage2: f64,
}

impl Sample {
    /// Create a new sample
    pub fn new(millis: u64, voltage1: f64, voltage2: f64) -> Self {
        Self {
            millis,
            voltage1,
            voltage2,
        }
    }
}

/// State of the pipeline controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// Resources not yet acquired
    #[default]
    Idle,
    /// Ingestion loop executing
    Running,
    /// Flushing buffered data and releasing resources
    Draining,
    /// Terminal; shutdown report available
    Closed,
}

impl PipelineState {
    /// Check if the ingestion loop is active
    pub fn is_running(&self) -> bool {
        matches!(self, PipelineState::Running)
    }

    /// Check if the pipeline has reached its terminal state
    pub fn is_closed(&self) -> bool {
        matches!(self, PipelineState::Closed)
    }

    /// Display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            PipelineState::Idle => "Idle",
            PipelineState::Running => "Running",
            PipelineState::Draining => "Draining",
            PipelineState::Closed => "Closed",
        }
    }
}

/// Counters accumulated over one pipeline run
#[derive(Debug, Clone, Default)]
pub struct IngestStats {
    /// Raw lines read from the source
    pub lines_read: u64,
    /// Lines that failed to parse (skipped, never fatal)
    pub parse_failures: u64,
    /// Samples admitted to the window
    pub samples_admitted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_state() {
        assert!(PipelineState::Running.is_running());
        assert!(!PipelineState::Draining.is_running());
        assert!(PipelineState::Closed.is_closed());
        assert_eq!(PipelineState::default(), PipelineState::Idle);
        assert_eq!(PipelineState::Draining.display_name(), "Draining");
    }

    #[test]
    fn test_sample_roundtrips_serde() {
        let sample = Sample::new(120, 2.61, 3.14);
        let json = serde_json::to_string(&sample).unwrap();
        let back: Sample = serde_json::from_str(&json).unwrap();
        assert_eq!(sample, back);
    }
}
