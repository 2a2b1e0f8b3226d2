//! Pipeline controller: the ingestion loop and its lifecycle
//!
//! [`PipelineController`] owns every resource of a run — line source,
//! sliding window, session log, recorder, optional relay, view sink —
//! and drives the `Idle -> Running -> Draining -> Closed` state
//! machine. All collaborators are injected, so tests drive the pipeline
//! with scripted fakes.
//!
//! # Ingestion cycle
//!
//! One cycle per raw line, fully processed before the next read:
//! forward the raw line to the relay (parsed or not), parse it, push
//! the sample into the window, hand a snapshot to the view sink. Parse
//! failures are counted and skipped. Transient source errors retry up
//! to a configured bound; a fatal source error or the interrupt flag
//! ends the loop.
//!
//! # Draining
//!
//! Exactly once per run: finalize the recorder, then release the source,
//! then the relay — each step guarded so one failure cannot skip the
//! others. The resulting [`ShutdownReport`] carries the run's counters
//! and determines the process exit status.

use crate::config::{DaqConfig, PersistMode};
use crate::error::Result;
use crate::parser;
use crate::relay::{RelayChannel, RelayStats};
use crate::session::{SessionLog, SessionMetadata, SessionRecorder};
use crate::source::{LineSource, SourceError};
use crate::types::{IngestStats, PipelineState, Sample};
use crate::view::ViewSink;
use crate::window::SampleWindow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Aggregate status of one completed run
#[derive(Debug, Clone)]
pub struct ShutdownReport {
    /// Ingestion counters
    pub stats: IngestStats,
    /// Rows written by the session recorder
    pub samples_persisted: usize,
    /// Why persistence failed, if it did
    pub persistence_error: Option<String>,
    /// Relay delivery counters, if a relay was attached at any point
    pub relay: Option<RelayStats>,
}

impl ShutdownReport {
    /// Check if the session recorder finalized successfully
    pub fn recorder_ok(&self) -> bool {
        self.persistence_error.is_none()
    }
}

/// Owner of the ingestion loop and all pipeline resources
pub struct PipelineController {
    source: Box<dyn LineSource>,
    view: Box<dyn ViewSink>,
    relay: Option<Box<dyn RelayChannel>>,
    recorder: SessionRecorder,
    window: SampleWindow,
    session_log: Option<SessionLog>,
    metadata: SessionMetadata,
    persist_mode: PersistMode,
    max_transient_retries: u32,
    running: Arc<AtomicBool>,
    state: PipelineState,
    stats: IngestStats,
    relay_stats: Option<RelayStats>,
    last_millis: Option<u64>,
    report: Option<ShutdownReport>,
}

impl PipelineController {
    /// Build a controller from a validated config and injected parts
    ///
    /// `running` is the cooperative cancellation flag: clearing it (for
    /// example from a Ctrl-C handler) makes the loop drain after the
    /// current cycle.
    pub fn new(
        config: &DaqConfig,
        source: Box<dyn LineSource>,
        view: Box<dyn ViewSink>,
        relay: Option<Box<dyn RelayChannel>>,
        recorder: SessionRecorder,
        running: Arc<AtomicBool>,
    ) -> Result<Self> {
        config.validate()?;
        let window = SampleWindow::new(config.window.capacity)?;
        let persist_mode = config.recording.persist_mode;
        let session_log = matches!(persist_mode, PersistMode::Full).then(SessionLog::new);
        let metadata = SessionMetadata::new(source.description(), config.window.capacity);

        Ok(Self {
            source,
            view,
            relay,
            recorder,
            window,
            session_log,
            metadata,
            persist_mode,
            max_transient_retries: config.source.max_transient_retries,
            running,
            state: PipelineState::Idle,
            stats: IngestStats::default(),
            relay_stats: None,
            last_millis: None,
            report: None,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Ingestion counters so far
    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    /// Run the ingestion loop until interrupted or the source fails,
    /// then drain
    pub fn run(&mut self) -> ShutdownReport {
        if self.state != PipelineState::Idle {
            return self.drain();
        }
        self.state = PipelineState::Running;
        tracing::info!(source = %self.source.description(), "pipeline running");

        let mut transient_streak = 0u32;
        while self.running.load(Ordering::SeqCst) {
            match self.source.next_line() {
                Ok(line) => {
                    transient_streak = 0;
                    self.process_line(&line);
                }
                Err(SourceError::Transient(msg)) => {
                    transient_streak += 1;
                    if transient_streak > self.max_transient_retries {
                        tracing::error!(
                            retries = self.max_transient_retries,
                            "source still failing after retries: {msg}"
                        );
                        break;
                    }
                    tracing::debug!(attempt = transient_streak, "transient source error: {msg}");
                }
                Err(SourceError::Fatal(msg)) => {
                    tracing::error!("fatal source error: {msg}");
                    break;
                }
            }
        }

        self.drain()
    }

    /// One ingestion cycle for a raw line
    fn process_line(&mut self, line: &str) {
        self.stats.lines_read += 1;

        // Relay path first, independent of parsing: the subscriber gets
        // the line verbatim even when it is malformed.
        let mut relay_failed = false;
        if let Some(relay) = self.relay.as_mut() {
            if let Err(e) = relay.send(line) {
                tracing::warn!(error = %e, "relay send failed, detaching relay");
                relay_failed = true;
            }
        }
        if relay_failed {
            self.detach_relay();
        }

        match parser::parse_line(line) {
            Ok(sample) => self.admit_sample(sample),
            Err(e) => {
                self.stats.parse_failures += 1;
                tracing::debug!(error = %e, line, "skipping unparsable line");
            }
        }
    }

    fn admit_sample(&mut self, sample: Sample) {
        if let Some(last) = self.last_millis {
            if sample.millis < last {
                tracing::debug!(
                    last,
                    millis = sample.millis,
                    "non-monotonic timestamp accepted"
                );
            }
        }
        self.last_millis = Some(sample.millis);

        if let Some(log) = self.session_log.as_mut() {
            log.push(sample);
        }
        self.window.push(sample);
        self.stats.samples_admitted += 1;

        let snapshot = self.window.snapshot();
        self.view.on_snapshot(&snapshot);
    }

    fn detach_relay(&mut self) {
        if let Some(mut relay) = self.relay.take() {
            relay.close();
            self.relay_stats = Some(relay.stats());
        }
    }

    /// Flush buffered data and release resources
    ///
    /// Idempotent: the first call performs the shutdown sequence and
    /// every later call returns the same report.
    pub fn drain(&mut self) -> ShutdownReport {
        if let Some(report) = &self.report {
            return report.clone();
        }
        self.state = PipelineState::Draining;
        tracing::info!("draining pipeline");

        let samples = match (self.persist_mode, self.session_log.as_ref()) {
            (PersistMode::Full, Some(log)) => log.samples().to_vec(),
            _ => self.window.snapshot(),
        };

        let (samples_persisted, persistence_error) =
            match self.recorder.finalize(&samples, &self.metadata) {
                Ok(count) => (count, None),
                Err(e) => {
                    tracing::error!(error = %e, "failed to persist session");
                    (0, Some(e.to_string()))
                }
            };

        self.source.close();
        self.detach_relay();

        self.state = PipelineState::Closed;
        let report = ShutdownReport {
            stats: self.stats.clone(),
            samples_persisted,
            persistence_error,
            relay: self.relay_stats.clone(),
        };
        tracing::info!(
            lines = report.stats.lines_read,
            parse_failures = report.stats.parse_failures,
            persisted = report.samples_persisted,
            "pipeline closed"
        );
        self.report = Some(report.clone());
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::RelayError;
    use crate::source::MockLineSource;
    use crate::view::NullView;

    struct FailingRelay {
        sent: Vec<String>,
        fail_after: usize,
    }

    impl RelayChannel for FailingRelay {
        fn send(&mut self, line: &str) -> std::result::Result<(), RelayError> {
            if self.sent.len() >= self.fail_after {
                return Err(RelayError::Disabled);
            }
            self.sent.push(line.to_string());
            Ok(())
        }

        fn close(&mut self) {}

        fn stats(&self) -> RelayStats {
            RelayStats {
                lines_sent: self.sent.len() as u64,
                lines_dropped: 0,
            }
        }
    }

    fn controller_with(
        source: MockLineSource,
        relay: Option<Box<dyn RelayChannel>>,
        capacity: usize,
    ) -> (PipelineController, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DaqConfig::default();
        config.window.capacity = capacity;
        config.recording.output_path = dir.path().join("session.csv");
        let recorder = SessionRecorder::new(&config.recording.output_path);
        let controller = PipelineController::new(
            &config,
            Box::new(source),
            Box::new(NullView),
            relay,
            recorder,
            Arc::new(AtomicBool::new(true)),
        )
        .unwrap();
        (controller, dir)
    }

    #[test]
    fn test_runs_to_source_exhaustion() {
        let source = MockLineSource::with_lines(["0, 1.0, 2.0", "10, 1.1, 2.1", "bogus"]);
        let (mut controller, _dir) = controller_with(source, None, 10);

        let report = controller.run();
        assert_eq!(controller.state(), PipelineState::Closed);
        assert_eq!(report.stats.lines_read, 3);
        assert_eq!(report.stats.samples_admitted, 2);
        assert_eq!(report.stats.parse_failures, 1);
        assert_eq!(report.samples_persisted, 2);
        assert!(report.recorder_ok());
    }

    #[test]
    fn test_transient_errors_retry_then_drain() {
        let source = MockLineSource::with_script(vec![
            Ok("0, 1.0, 2.0".to_string()),
            Err(SourceError::Transient("timeout".to_string())),
            Err(SourceError::Transient("timeout".to_string())),
            Ok("10, 1.1, 2.1".to_string()),
            Err(SourceError::Transient("timeout".to_string())),
            Err(SourceError::Transient("timeout".to_string())),
            Err(SourceError::Transient("timeout".to_string())),
            Err(SourceError::Transient("timeout".to_string())),
            Ok("20, 1.2, 2.2".to_string()),
        ]);
        let (mut controller, _dir) = controller_with(source, None, 10);

        // Default retry bound is 3: the streak of four exceeds it, so
        // the final line is never read.
        let report = controller.run();
        assert_eq!(report.stats.samples_admitted, 2);
    }

    #[test]
    fn test_drain_is_idempotent() {
        let source = MockLineSource::with_lines(["0, 1.0, 2.0"]);
        let (mut controller, _dir) = controller_with(source, None, 10);

        let first = controller.run();
        let second = controller.drain();
        assert_eq!(first.samples_persisted, second.samples_persisted);
        assert_eq!(first.stats.lines_read, second.stats.lines_read);
        // A second run after closing performs no further ingestion.
        let third = controller.run();
        assert_eq!(third.stats.lines_read, first.stats.lines_read);
    }

    #[test]
    fn test_relay_failure_detaches_but_ingestion_continues() {
        let relay = Box::new(FailingRelay {
            sent: Vec::new(),
            fail_after: 1,
        });
        let source = MockLineSource::with_lines(["0, 1.0, 2.0", "10, 1.1, 2.1", "20, 1.2, 2.2"]);
        let (mut controller, _dir) = controller_with(source, Some(relay), 10);

        let report = controller.run();
        // Relay died after one line; all three still ingested.
        assert_eq!(report.stats.samples_admitted, 3);
        assert_eq!(report.relay.unwrap().lines_sent, 1);
    }

    #[test]
    fn test_interrupt_flag_stops_before_first_read() {
        let source = MockLineSource::with_lines(["0, 1.0, 2.0"]);
        let dir = tempfile::tempdir().unwrap();
        let mut config = DaqConfig::default();
        config.recording.output_path = dir.path().join("session.csv");
        let recorder = SessionRecorder::new(&config.recording.output_path);
        let running = Arc::new(AtomicBool::new(false));
        let mut controller = PipelineController::new(
            &config,
            Box::new(source),
            Box::new(NullView),
            None,
            recorder,
            running,
        )
        .unwrap();

        let report = controller.run();
        assert_eq!(report.stats.lines_read, 0);
        assert!(report.recorder_ok());
    }

    #[test]
    fn test_full_mode_keeps_evicted_samples() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DaqConfig::default();
        config.window.capacity = 2;
        config.recording.persist_mode = PersistMode::Full;
        config.recording.output_path = dir.path().join("session.csv");
        let recorder = SessionRecorder::new(&config.recording.output_path);
        let source =
            MockLineSource::with_lines(["0, 1.0, 2.0", "10, 1.1, 2.1", "20, 1.2, 2.2"]);
        let mut controller = PipelineController::new(
            &config,
            Box::new(source),
            Box::new(NullView),
            None,
            recorder,
            Arc::new(AtomicBool::new(true)),
        )
        .unwrap();

        let report = controller.run();
        // Window holds 2, but the session log persisted all 3.
        assert_eq!(report.samples_persisted, 3);
    }
}
