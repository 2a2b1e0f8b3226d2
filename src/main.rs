//! ecgdaq - Main Entry Point
//!
//! Captures a two-lead ECG stream from a serial device, keeps a bounded
//! live window, persists the session to CSV on Ctrl-C, and optionally
//! relays every raw line to a TCP subscriber.

use anyhow::Context;
use clap::Parser;
use ecgdaq::config::DaqConfig;
use ecgdaq::pipeline::PipelineController;
use ecgdaq::relay::{RelayChannel, TcpRelay};
use ecgdaq::session::SessionRecorder;
use ecgdaq::source::{LineSource, SerialLineSource};
use ecgdaq::view::{TraceView, ViewSink};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[cfg(feature = "mock-source")]
const MOCK_SAMPLE_RATE_HZ: u32 = 250;

#[derive(Parser)]
#[command(
    name = "ecgdaq",
    version,
    about = "Serial ECG data acquisition with live window, CSV logging, and network relay"
)]
struct Cli {
    /// Serial port device (e.g. /dev/ttyACM0, COM6)
    #[arg(long)]
    port: Option<String>,

    /// Serial baud rate
    #[arg(long)]
    baud: Option<u32>,

    /// Sliding window capacity in samples
    #[arg(long)]
    capacity: Option<usize>,

    /// Destination path for the persisted session CSV
    #[arg(long)]
    output: Option<PathBuf>,

    /// Relay subscriber address (host:port)
    #[arg(long)]
    relay: Option<String>,

    /// What to persist at shutdown: window | full
    #[arg(long)]
    persist_mode: Option<String>,

    /// Write a JSON metadata sidecar next to the CSV
    #[arg(long)]
    meta: bool,

    /// TOML config file; CLI flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use the synthetic mock source instead of hardware
    #[cfg(feature = "mock-source")]
    #[arg(long)]
    mock: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = match cli.verbose {
        0 => "info",
        1 => "info,ecgdaq=debug",
        _ => "debug,ecgdaq=trace",
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            2
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let mut config = match &cli.config {
        Some(path) => DaqConfig::load(path)?,
        None => DaqConfig::default(),
    };
    apply_overrides(&mut config, &cli)?;
    config.validate()?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            tracing::info!("interrupt received, draining");
            running.store(false, Ordering::SeqCst);
        })
        .context("installing interrupt handler")?;
    }

    let source = build_source(&cli, &config)?;
    let relay = build_relay(&config);
    let recorder = SessionRecorder::new(&config.recording.output_path)
        .with_metadata_sidecar(config.recording.metadata_sidecar);
    let view: Box<dyn ViewSink> = Box::new(TraceView);

    let mut controller =
        PipelineController::new(&config, source, view, relay, recorder, running)?;
    let report = controller.run();

    if let Some(relay) = &report.relay {
        tracing::info!(
            sent = relay.lines_sent,
            dropped = relay.lines_dropped,
            "relay summary"
        );
    }
    tracing::info!(
        lines = report.stats.lines_read,
        parse_failures = report.stats.parse_failures,
        persisted = report.samples_persisted,
        "session complete"
    );
    if let Some(error) = &report.persistence_error {
        tracing::error!(%error, "session was not persisted");
    }

    Ok(if report.recorder_ok() { 0 } else { 1 })
}

fn apply_overrides(config: &mut DaqConfig, cli: &Cli) -> anyhow::Result<()> {
    if let Some(port) = &cli.port {
        config.source.port = port.clone();
    }
    if let Some(baud) = cli.baud {
        config.source.baud_rate = baud;
    }
    if let Some(capacity) = cli.capacity {
        config.window.capacity = capacity;
    }
    if let Some(output) = &cli.output {
        config.recording.output_path = output.clone();
    }
    if let Some(addr) = &cli.relay {
        let queue_capacity = config
            .relay
            .as_ref()
            .map(|r| r.queue_capacity)
            .unwrap_or(ecgdaq::config::DEFAULT_RELAY_QUEUE);
        config.relay = Some(ecgdaq::config::RelayConfig {
            addr: addr.clone(),
            queue_capacity,
        });
    }
    if let Some(mode) = &cli.persist_mode {
        config.recording.persist_mode = mode.parse()?;
    }
    if cli.meta {
        config.recording.metadata_sidecar = true;
    }
    Ok(())
}

fn build_source(cli: &Cli, config: &DaqConfig) -> anyhow::Result<Box<dyn LineSource>> {
    #[cfg(feature = "mock-source")]
    if cli.mock {
        return Ok(Box::new(ecgdaq::source::MockLineSource::synthetic(
            MOCK_SAMPLE_RATE_HZ,
        )));
    }

    if config.source.port.is_empty() {
        anyhow::bail!("no serial port configured; pass --port or set [source].port");
    }
    Ok(Box::new(SerialLineSource::open(&config.source)?))
}

fn build_relay(config: &DaqConfig) -> Option<Box<dyn RelayChannel>> {
    let relay_config = config.relay.as_ref()?;
    match TcpRelay::connect(&relay_config.addr, relay_config.queue_capacity) {
        Ok(relay) => Some(Box::new(relay)),
        Err(e) => {
            tracing::warn!(error = %e, "relay unavailable, continuing ingestion-only");
            None
        }
    }
}
