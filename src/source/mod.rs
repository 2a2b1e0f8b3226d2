//! Line sources: where raw sample lines come from
//!
//! This module provides the [`LineSource`] trait, the seam between the
//! pipeline and the physical transport. The shipped implementation reads
//! a serial port ([`SerialLineSource`]); a mock twin exists for tests
//! and hardware-free runs ([`MockLineSource`], behind the `mock-source`
//! feature).
//!
//! A source is a blocking producer: [`LineSource::next_line`] waits for
//! the next newline-terminated line. Failures are split into transient
//! errors (read timeout — the pipeline retries a bounded number of
//! times) and fatal errors (device disconnected — the pipeline drains).

pub mod serial;

#[cfg(any(test, feature = "mock-source"))]
pub mod mock;

pub use serial::SerialLineSource;

#[cfg(any(test, feature = "mock-source"))]
pub use mock::MockLineSource;

use thiserror::Error;

/// Failure modes of a line source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Recoverable read failure; retried up to the configured bound
    #[error("transient source error: {0}")]
    Transient(String),

    /// Unrecoverable failure; triggers pipeline draining
    #[error("fatal source error: {0}")]
    Fatal(String),
}

impl SourceError {
    /// Check if the error is worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Transient(_))
    }
}

/// A blocking producer of raw text lines
///
/// Implementations must be `Send` so the pipeline can run on a spawned
/// thread. The read is the pipeline's only blocking point per cycle;
/// implementations should bound it (e.g. with a read timeout surfaced
/// as [`SourceError::Transient`]) so an operator interrupt is observed
/// promptly.
pub trait LineSource: Send {
    /// Block until the next line is available
    ///
    /// The returned line carries no trailing newline.
    fn next_line(&mut self) -> Result<String, SourceError>;

    /// Release the underlying transport
    ///
    /// Must be safe to call more than once; errors are contained and
    /// logged, never propagated.
    fn close(&mut self);

    /// Human-readable description for logs and session metadata
    fn description(&self) -> String;
}
