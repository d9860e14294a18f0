//! JSON lines output for performance snapshots.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::models::PerformanceSnapshot;

/// Error writing a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("failed to serialize snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write snapshot: {0}")]
    Io(#[from] io::Error),
}

/// Writes one JSON document per snapshot, each followed by a newline.
pub struct SnapshotWriter<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> SnapshotWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            pretty: false,
        }
    }

    /// Emits indented JSON instead of one line per snapshot.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Serializes `snapshot` and flushes it to the underlying writer.
    pub fn write(&mut self, snapshot: &PerformanceSnapshot) -> Result<(), OutputError> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, snapshot)?;
        } else {
            serde_json::to_writer(&mut self.writer, snapshot)?;
        }
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Opens `path` for appending, creating it if needed.
pub fn open_append(path: &Path) -> io::Result<BufWriter<File>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BufWriter::new(file))
}
