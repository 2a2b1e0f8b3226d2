//! Session recorder: serialize a captured session exactly once
//!
//! Invoked by the pipeline during draining with the samples to persist
//! (the final window snapshot, or the full session log depending on the
//! configured mode). Writes the columnar format of
//! [`super::columnar`]: fixed header, one decorated row per sample,
//! voltages at two decimals.
//!
//! Finalization is one-shot per controller lifetime; a second call is
//! an error. A persistence failure is surfaced to the shutdown report
//! but never prevents the pipeline from releasing its other resources.

use super::columnar;
use super::log::SessionMetadata;
use crate::error::{DaqError, Result};
use crate::types::Sample;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One-shot writer of the persisted session
#[derive(Debug)]
pub struct SessionRecorder {
    path: PathBuf,
    metadata_sidecar: bool,
    finalized: bool,
}

impl SessionRecorder {
    /// Create a recorder targeting `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            metadata_sidecar: false,
            finalized: false,
        }
    }

    /// Also write `<path>.meta.json` with the session metadata
    pub fn with_metadata_sidecar(mut self, enabled: bool) -> Self {
        self.metadata_sidecar = enabled;
        self
    }

    /// Destination of the session CSV
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the session was already finalized
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Serialize the session, returning the number of rows written
    pub fn finalize(&mut self, samples: &[Sample], metadata: &SessionMetadata) -> Result<usize> {
        if self.finalized {
            return Err(DaqError::RecorderFinalized);
        }
        // One shot even if the write fails; reopening the pipeline to
        // retry is not supported within one controller lifetime.
        self.finalized = true;

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", columnar::HEADER)?;
        for sample in samples {
            writeln!(writer, "{}", columnar::encode_row(sample))?;
        }
        writer.flush()?;

        if self.metadata_sidecar {
            self.write_sidecar(samples.len(), metadata)?;
        }

        tracing::info!(
            rows = samples.len(),
            path = %self.path.display(),
            "session persisted"
        );
        Ok(samples.len())
    }

    fn write_sidecar(&self, total_samples: usize, metadata: &SessionMetadata) -> Result<()> {
        let mut metadata = metadata.clone();
        metadata.total_samples = total_samples;
        let json = serde_json::to_string_pretty(&metadata)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(self.sidecar_path(), json)?;
        Ok(())
    }

    fn sidecar_path(&self) -> PathBuf {
        self.path.with_extension("meta.json")
    }
}
