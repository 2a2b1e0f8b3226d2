//! # ecgdaq: Serial ECG Data Acquisition
//!
//! A data acquisition pipeline for a two-lead ECG front end that streams
//! timestamped voltage samples over a serial line. The pipeline keeps a
//! bounded sliding window of recent samples for live inspection, persists
//! the captured session to a columnar CSV on shutdown, and can relay every
//! raw input line to a remote subscriber over TCP.
//!
//! ## Architecture
//!
//! - **Source**: a [`source::LineSource`] produces raw text lines; the
//!   shipped implementation reads a serial port, and a mock source exists
//!   for tests and hardware-free runs
//! - **Parser**: [`parser::parse_line`] turns a raw line into a [`types::Sample`]
//! - **Window**: [`window::SampleWindow`] bounds memory with FIFO eviction
//! - **View**: a [`view::ViewSink`] receives a window snapshot each cycle
//! - **Session**: [`session::SessionRecorder`] serializes the session once,
//!   at shutdown
//! - **Relay**: [`relay::TcpRelay`] forwards raw lines best-effort on a
//!   dedicated writer thread, decoupled by a bounded queue
//! - **Pipeline**: [`pipeline::PipelineController`] owns all of the above
//!   and drives the `Idle -> Running -> Draining -> Closed` lifecycle
//!
//! ## Concurrency
//!
//! Ingestion is a single logical thread: one line is fully processed before
//! the next is read. The only auxiliary thread is the relay writer, fed
//! through a bounded `crossbeam-channel` queue so a stalled subscriber can
//! never stall ingestion. Shutdown is cooperative via a shared
//! `Arc<AtomicBool>` cleared by the Ctrl-C handler.
//!
//! ## Example
//!
//! ```ignore
//! use ecgdaq::{
//!     config::DaqConfig,
//!     pipeline::PipelineController,
//!     session::SessionRecorder,
//!     source::SerialLineSource,
//!     view::TraceView,
//! };
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = DaqConfig::default();
//!     let source = Box::new(SerialLineSource::open(&config.source)?);
//!     let recorder = SessionRecorder::new(&config.recording.output_path);
//!     let running = Arc::new(AtomicBool::new(true));
//!
//!     let mut controller = PipelineController::new(
//!         &config,
//!         source,
//!         Box::new(TraceView::default()),
//!         None,
//!         recorder,
//!         running,
//!     )?;
//!     let report = controller.run();
//!     std::process::exit(if report.recorder_ok() { 0 } else { 1 });
//! }
//! ```

pub mod config;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod relay;
pub mod session;
pub mod source;
pub mod types;
pub mod view;
pub mod window;

// Re-export commonly used types
pub use config::{DaqConfig, PersistMode};
pub use error::{DaqError, Result};
pub use parser::{parse_line, ParseError};
pub use pipeline::{PipelineController, ShutdownReport};
pub use relay::{RelayChannel, RelayError, RelayStats, TcpRelay};
pub use session::{SessionLog, SessionMetadata, SessionRecorder};
pub use source::{LineSource, SerialLineSource, SourceError};
pub use types::{IngestStats, PipelineState, Sample};
pub use view::{ChannelView, NullView, TraceView, ViewSink};
pub use window::SampleWindow;

#[cfg(any(test, feature = "mock-source"))]
pub use source::MockLineSource;
