//! Serial port line source
//!
//! Reads newline-terminated ASCII from a serial device (the ECG front
//! end streams at 115200 baud by default). The read timeout doubles as
//! the pipeline's cancellation latency: a timeout surfaces as a
//! transient error, the loop checks the interrupt flag, and retries.
//!
//! A partial line interrupted by a timeout is kept in an accumulation
//! buffer and completed on a later read, so slow writers do not produce
//! torn lines.

use super::{LineSource, SourceError};
use crate::config::SourceConfig;
use crate::error::{DaqError, Result};
use serialport::SerialPort;
use std::io::{BufRead, BufReader};
use std::time::Duration;

/// [`LineSource`] over a serial port
pub struct SerialLineSource {
    port_name: String,
    baud_rate: u32,
    reader: Option<BufReader<Box<dyn SerialPort>>>,
    pending: String,
}

impl SerialLineSource {
    /// Open the configured port
    pub fn open(config: &SourceConfig) -> Result<Self> {
        let port = serialport::new(config.port.as_str(), config.baud_rate)
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .open()
            .map_err(|e| {
                DaqError::Source(SourceError::Fatal(format!(
                    "failed to open {}: {}",
                    config.port, e
                )))
            })?;

        tracing::info!(
            port = %config.port,
            baud = config.baud_rate,
            "serial port opened"
        );

        Ok(Self {
            port_name: config.port.clone(),
            baud_rate: config.baud_rate,
            reader: Some(BufReader::new(port)),
            pending: String::new(),
        })
    }

    /// Name of the underlying device
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl LineSource for SerialLineSource {
    fn next_line(&mut self) -> std::result::Result<String, SourceError> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| SourceError::Fatal("serial port already closed".to_string()))?;

        loop {
            match reader.read_line(&mut self.pending) {
                Ok(0) => return Err(SourceError::Fatal("serial stream ended".to_string())),
                Ok(_) => {
                    if self.pending.ends_with('\n') {
                        let line = self.pending.trim_end_matches(['\r', '\n']).to_string();
                        self.pending.clear();
                        return Ok(line);
                    }
                    // No newline yet; keep accumulating.
                }
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                    return Err(SourceError::Transient(format!(
                        "read timeout on {}",
                        self.port_name
                    )));
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(SourceError::Fatal(format!(
                        "read failed on {}: {}",
                        self.port_name, e
                    )));
                }
            }
        }
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            tracing::info!(port = %self.port_name, "serial port closed");
        }
    }

    fn description(&self) -> String {
        format!("serial {} @ {} baud", self.port_name, self.baud_rate)
    }
}

impl Drop for SerialLineSource {
    fn drop(&mut self) {
        self.close();
    }
}
