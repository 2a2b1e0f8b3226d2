//! Session capture and persistence
//!
//! A session is the full record of one pipeline run. This module
//! provides the append-only [`SessionLog`] accumulator (used by the
//! full-session persistence mode so samples evicted from the live
//! window are not lost), the [`SessionRecorder`] that serializes the
//! session to the columnar CSV format exactly once at shutdown, and the
//! [`columnar`] codec that owns the format's decorated cells.

pub mod columnar;
pub mod log;
pub mod recorder;

pub use log::{SessionLog, SessionMetadata};
pub use recorder::SessionRecorder;
