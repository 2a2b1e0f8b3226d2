//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

use ecgdaq::relay::{RelayChannel, RelayError, RelayStats};
use ecgdaq::source::{LineSource, SourceError};
use ecgdaq::types::Sample;
use ecgdaq::view::ViewSink;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}

/// Line source replaying a fixed script, counting how often it is closed
pub struct ScriptedSource {
    script: VecDeque<Result<String, SourceError>>,
    closes: Arc<AtomicU32>,
}

impl ScriptedSource {
    /// Build from plain lines; the handle reports close() invocations
    pub fn new<I, S>(lines: I) -> (Self, Arc<AtomicU32>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let closes = Arc::new(AtomicU32::new(0));
        (
            Self {
                script: lines.into_iter().map(|l| Ok(l.into())).collect(),
                closes: Arc::clone(&closes),
            },
            closes,
        )
    }

    /// Build from a script of lines and injected errors
    pub fn with_script(script: Vec<Result<String, SourceError>>) -> (Self, Arc<AtomicU32>) {
        let closes = Arc::new(AtomicU32::new(0));
        (
            Self {
                script: script.into(),
                closes: Arc::clone(&closes),
            },
            closes,
        )
    }
}

impl LineSource for ScriptedSource {
    fn next_line(&mut self) -> Result<String, SourceError> {
        self.script
            .pop_front()
            .unwrap_or_else(|| Err(SourceError::Fatal("script exhausted".to_string())))
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn description(&self) -> String {
        "scripted test source".to_string()
    }
}

/// View sink collecting every snapshot it receives
pub struct CollectingView {
    snapshots: Arc<Mutex<Vec<Vec<Sample>>>>,
}

impl CollectingView {
    pub fn new() -> (Self, Arc<Mutex<Vec<Vec<Sample>>>>) {
        let snapshots = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                snapshots: Arc::clone(&snapshots),
            },
            snapshots,
        )
    }
}

impl ViewSink for CollectingView {
    fn on_snapshot(&mut self, snapshot: &[Sample]) {
        self.snapshots.lock().unwrap().push(snapshot.to_vec());
    }
}

/// Relay recording every line it is handed, optionally failing after
/// a number of sends
pub struct RecordingRelay {
    sent: Arc<Mutex<Vec<String>>>,
    fail_after: Option<usize>,
}

impl RecordingRelay {
    pub fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                sent: Arc::clone(&sent),
                fail_after: None,
            },
            sent,
        )
    }

    pub fn failing_after(n: usize) -> (Self, Arc<Mutex<Vec<String>>>) {
        let (mut relay, sent) = Self::new();
        relay.fail_after = Some(n);
        (relay, sent)
    }
}

impl RelayChannel for RecordingRelay {
    fn send(&mut self, line: &str) -> Result<(), RelayError> {
        let mut sent = self.sent.lock().unwrap();
        if let Some(limit) = self.fail_after {
            if sent.len() >= limit {
                return Err(RelayError::Disabled);
            }
        }
        sent.push(line.to_string());
        Ok(())
    }

    fn close(&mut self) {}

    fn stats(&self) -> RelayStats {
        RelayStats {
            lines_sent: self.sent.lock().unwrap().len() as u64,
            lines_dropped: 0,
        }
    }
}
