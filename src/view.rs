//! Live view sinks
//!
//! The pipeline pushes a window snapshot to a [`ViewSink`] once per
//! ingestion cycle. Rendering itself is out of scope for this crate;
//! the sink is the seam where a plotting frontend attaches. Shipped
//! implementations:
//!
//! - [`NullView`] ignores snapshots (headless capture)
//! - [`TraceView`] logs the latest sample at trace level
//! - [`ChannelView`] hands snapshots to a renderer thread over a
//!   bounded channel, dropping frames instead of blocking when the
//!   renderer falls behind

use crate::types::Sample;
use crossbeam_channel::{bounded, Receiver, Sender};

/// Consumer of window snapshots
pub trait ViewSink: Send {
    /// Receive a read-only snapshot of the current window
    fn on_snapshot(&mut self, snapshot: &[Sample]);
}

/// Sink that discards every snapshot
#[derive(Debug, Default)]
pub struct NullView;

impl ViewSink for NullView {
    fn on_snapshot(&mut self, _snapshot: &[Sample]) {}
}

/// Sink that logs the latest sample at trace level
#[derive(Debug, Default)]
pub struct TraceView;

impl ViewSink for TraceView {
    fn on_snapshot(&mut self, snapshot: &[Sample]) {
        if let Some(sample) = snapshot.last() {
            tracing::trace!(
                millis = sample.millis,
                voltage1 = sample.voltage1,
                voltage2 = sample.voltage2,
                window_len = snapshot.len(),
                "window updated"
            );
        }
    }
}

/// Sink that forwards snapshots to a renderer over a bounded channel
///
/// Uses `try_send`: a slow consumer costs dropped frames, never
/// ingestion latency.
#[derive(Debug)]
pub struct ChannelView {
    tx: Sender<Vec<Sample>>,
    dropped_frames: u64,
}

impl ChannelView {
    /// Create a view sink and the matching receiver end
    pub fn bounded(capacity: usize) -> (Self, Receiver<Vec<Sample>>) {
        let (tx, rx) = bounded(capacity.max(1));
        (
            Self {
                tx,
                dropped_frames: 0,
            },
            rx,
        )
    }

    /// Frames discarded because the consumer was behind
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }
}

impl ViewSink for ChannelView {
    fn on_snapshot(&mut self, snapshot: &[Sample]) {
        if self.tx.try_send(snapshot.to_vec()).is_err() {
            self.dropped_frames += 1;
        }
    }
}
