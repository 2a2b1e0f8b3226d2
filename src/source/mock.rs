//! Mock line source for tests and hardware-free runs
//!
//! Two modes:
//!
//! - **Scripted**: replays a fixed sequence of lines and injected
//!   errors, then reports a fatal end-of-script. Used by unit tests to
//!   drive the pipeline deterministically.
//! - **Synthetic**: generates an endless paced dual-sine waveform in the
//!   live wire format, for running the full binary without a device
//!   (`cargo run --features mock-source -- --mock`).

use super::{LineSource, SourceError};
use std::collections::VecDeque;
use std::f64::consts::TAU;
use std::thread;
use std::time::Duration;

const SYNTHETIC_HEART_RATE_HZ: f64 = 1.2;

enum MockMode {
    Scripted(VecDeque<Result<String, SourceError>>),
    Synthetic { sample_rate_hz: u32, tick: u64 },
}

/// [`LineSource`] twin of [`super::SerialLineSource`] without hardware
pub struct MockLineSource {
    mode: MockMode,
    closed: bool,
}

impl MockLineSource {
    /// Replay the given lines, then end with a fatal error
    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode: MockMode::Scripted(lines.into_iter().map(|l| Ok(l.into())).collect()),
            closed: false,
        }
    }

    /// Replay a script of lines and injected errors verbatim
    pub fn with_script(script: Vec<Result<String, SourceError>>) -> Self {
        Self {
            mode: MockMode::Scripted(script.into()),
            closed: false,
        }
    }

    /// Endless paced dual-sine waveform at `sample_rate_hz`
    pub fn synthetic(sample_rate_hz: u32) -> Self {
        Self {
            mode: MockMode::Synthetic {
                sample_rate_hz: sample_rate_hz.max(1),
                tick: 0,
            },
            closed: false,
        }
    }

    /// Check if [`LineSource::close`] has been called
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl LineSource for MockLineSource {
    fn next_line(&mut self) -> Result<String, SourceError> {
        if self.closed {
            return Err(SourceError::Fatal("mock source closed".to_string()));
        }
        match &mut self.mode {
            MockMode::Scripted(script) => script
                .pop_front()
                .unwrap_or_else(|| Err(SourceError::Fatal("mock script exhausted".to_string()))),
            MockMode::Synthetic {
                sample_rate_hz,
                tick,
            } => {
                thread::sleep(Duration::from_millis(1_000 / u64::from(*sample_rate_hz)));
                let t = *tick as f64 / f64::from(*sample_rate_hz);
                let millis = *tick * 1_000 / u64::from(*sample_rate_hz);
                *tick += 1;
                let voltage1 = 2.5 + 0.5 * (TAU * SYNTHETIC_HEART_RATE_HZ * t).sin();
                let voltage2 = 2.5 + 0.45 * (TAU * SYNTHETIC_HEART_RATE_HZ * t + 0.8).sin();
                Ok(format!("{millis}, {voltage1:.2}, {voltage2:.2}"))
            }
        }
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn description(&self) -> String {
        match &self.mode {
            MockMode::Scripted(_) => "mock (scripted)".to_string(),
            MockMode::Synthetic { sample_rate_hz, .. } => {
                format!("mock (synthetic @ {sample_rate_hz} Hz)")
            }
        }
    }
}
