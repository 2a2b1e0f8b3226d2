//! Best-effort relay of raw input lines to a remote subscriber
//!
//! Every raw line read from the source is forwarded verbatim, parsed or
//! not, over a persistent TCP connection — one send per line, newline
//! framed, no delivery guarantee beyond the transport's own.
//!
//! The relay must never stall ingestion: [`TcpRelay::send`] only hands
//! the line to a bounded queue drained by a dedicated writer thread.
//! When the queue is full the *oldest* queued line is discarded
//! (bounded staleness beats backpressure for a best-effort live feed)
//! and the drop is counted. A remote-initiated close disables the relay
//! for the remainder of the session; ingestion and local recording
//! continue unaffected.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::io::Write;
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use thiserror::Error;

/// Failure modes of the relay channel
#[derive(Error, Debug)]
pub enum RelayError {
    /// Could not establish the connection; the session degrades to
    /// ingestion-only
    #[error("relay connect to {addr} failed: {source}")]
    Connect {
        /// Remote endpoint address
        addr: String,
        /// Underlying connection error
        #[source]
        source: std::io::Error,
    },

    /// The transport failed (typically the remote closed the
    /// connection); the relay stays disabled for the rest of the run
    #[error("relay disabled after transport failure")]
    Disabled,
}

/// Delivery counters for one relay session
#[derive(Debug, Clone, Default)]
pub struct RelayStats {
    /// Lines written to the transport
    pub lines_sent: u64,
    /// Lines discarded because the queue was full
    pub lines_dropped: u64,
}

/// A consumer of raw lines, forwarding them off-pipeline
///
/// Fire-and-forget per line. Implementations must be `Send`.
pub trait RelayChannel: Send {
    /// Hand one raw line to the relay; must not block on the transport
    fn send(&mut self, line: &str) -> Result<(), RelayError>;

    /// Flush outstanding lines and release the transport
    ///
    /// Safe to call more than once.
    fn close(&mut self);

    /// Delivery counters so far
    fn stats(&self) -> RelayStats;
}

/// [`RelayChannel`] over a persistent TCP connection
///
/// Owns a writer thread fed through a bounded queue. Dropping the relay
/// closes it.
pub struct TcpRelay {
    addr: String,
    tx: Option<Sender<String>>,
    // Second handle onto the queue, used only to discard the oldest
    // entry when the queue is full.
    overflow_rx: Receiver<String>,
    disabled: Arc<AtomicBool>,
    sent: Arc<AtomicU64>,
    dropped: u64,
    writer: Option<JoinHandle<()>>,
}

impl TcpRelay {
    /// Connect to the subscriber at `addr` (host:port)
    pub fn connect(addr: &str, queue_capacity: usize) -> Result<Self, RelayError> {
        let mut stream = TcpStream::connect(addr).map_err(|source| RelayError::Connect {
            addr: addr.to_string(),
            source,
        })?;
        let _ = stream.set_nodelay(true);

        let (tx, rx) = bounded::<String>(queue_capacity.max(1));
        let overflow_rx = rx.clone();
        let disabled = Arc::new(AtomicBool::new(false));
        let sent = Arc::new(AtomicU64::new(0));

        let writer = {
            let disabled = Arc::clone(&disabled);
            let sent = Arc::clone(&sent);
            let addr = addr.to_string();
            std::thread::spawn(move || {
                for line in rx {
                    let result = stream
                        .write_all(line.as_bytes())
                        .and_then(|_| stream.write_all(b"\n"));
                    if let Err(e) = result {
                        tracing::warn!(addr = %addr, error = %e, "relay remote closed");
                        disabled.store(true, Ordering::SeqCst);
                        break;
                    }
                    sent.fetch_add(1, Ordering::Relaxed);
                }
                let _ = stream.shutdown(Shutdown::Both);
            })
        };

        tracing::info!(addr = %addr, "relay connected");

        Ok(Self {
            addr: addr.to_string(),
            tx: Some(tx),
            overflow_rx,
            disabled,
            sent,
            dropped: 0,
            writer: Some(writer),
        })
    }

    /// Remote endpoint address
    pub fn addr(&self) -> &str {
        &self.addr
    }
}

impl RelayChannel for TcpRelay {
    fn send(&mut self, line: &str) -> Result<(), RelayError> {
        if self.disabled.load(Ordering::SeqCst) {
            return Err(RelayError::Disabled);
        }
        let tx = self.tx.as_ref().ok_or(RelayError::Disabled)?;

        match tx.try_send(line.to_string()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(returned)) => {
                // Discard the oldest queued line to make room for the
                // newest; the subscriber prefers fresh data over a
                // complete backlog.
                if self.overflow_rx.try_recv().is_ok() {
                    self.dropped += 1;
                }
                match tx.try_send(returned) {
                    Ok(()) => Ok(()),
                    Err(TrySendError::Full(_)) => {
                        self.dropped += 1;
                        Ok(())
                    }
                    Err(TrySendError::Disconnected(_)) => Err(RelayError::Disabled),
                }
            }
            Err(TrySendError::Disconnected(_)) => Err(RelayError::Disabled),
        }
    }

    fn close(&mut self) {
        // Dropping the sender disconnects the queue; the writer drains
        // what is left and exits.
        if let Some(tx) = self.tx.take() {
            drop(tx);
        }
        if let Some(writer) = self.writer.take() {
            let _ = writer.join();
            tracing::info!(
                addr = %self.addr,
                sent = self.sent.load(Ordering::Relaxed),
                dropped = self.dropped,
                "relay closed"
            );
        }
    }

    fn stats(&self) -> RelayStats {
        RelayStats {
            lines_sent: self.sent.load(Ordering::Relaxed),
            lines_dropped: self.dropped,
        }
    }
}

impl Drop for TcpRelay {
    fn drop(&mut self) {
        self.close();
    }
}
