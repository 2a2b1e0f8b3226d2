//! Error handling for the acquisition pipeline
//!
//! This module defines the crate-wide error type and a Result alias.
//! Component-local error enums ([`ParseError`], [`SourceError`],
//! [`RelayError`]) live next to the component that raises them and
//! convert into [`DaqError`] via `From`.
//!
//! Containment policy: only a fatal source error or the operator
//! interrupt may stop the ingestion loop. Parse failures are skipped,
//! transient source errors are retried a bounded number of times, relay
//! failures disable only the relay, and persistence failures are
//! surfaced in the shutdown report without blocking resource release.

use crate::parser::ParseError;
use crate::relay::RelayError;
use crate::source::SourceError;
use thiserror::Error;

/// Main error type for acquisition operations
#[derive(Error, Debug)]
pub enum DaqError {
    /// Errors related to configuration loading/validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors raised while parsing a raw line into a sample
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Errors raised by the line source
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Errors raised by the relay channel
    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),

    /// IO errors while persisting the session
    #[error("Persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    /// The session recorder was asked to finalize a second time
    #[error("Session recorder already finalized")]
    RecorderFinalized,
}

/// Result type alias for acquisition operations
pub type Result<T> = std::result::Result<T, DaqError>;
