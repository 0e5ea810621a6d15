//! # File Transport
//!
//! Writes the print stream to a local file. Useful as a virtual printer:
//! the output can be inspected, diffed, or later copied to a device with
//! `cat job.pcl > /dev/usb/lp0`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{AdapterState, PrinterAdapter};
use crate::error::{PrintStreamError, Result};

/// # File Adapter
///
/// The file is created (or truncated) on `open()`.
#[derive(Debug)]
pub struct FileAdapter {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    state: AdapterState,
}

impl FileAdapter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            writer: None,
            state: AdapterState::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PrinterAdapter for FileAdapter {
    fn open(&mut self) -> Result<()> {
        if self.state.is_open() {
            return Ok(());
        }
        if self.writer.is_some() {
            return Err(PrintStreamError::AlreadyConnected(format!(
                "{} is already open",
                self.path.display()
            )));
        }
        let file = File::create(&self.path)?;
        self.writer = Some(BufWriter::new(file));
        self.state.mark_open();
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.state.begin_send()?;
        let writer = self.writer.as_mut().ok_or(PrintStreamError::AdapterNotOpen)?;
        writer.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        self.state.mark_flushed();
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let flushed = if self.state.needs_flush() {
            self.flush()
        } else {
            Ok(())
        };
        if self.writer.take().is_some() {
            info!(path = %self.path.display(), "Output file closed");
        }
        self.state.mark_closed();
        flushed
    }

    fn is_open(&self) -> bool {
        self.state.is_open()
    }

    fn is_flushed(&self) -> bool {
        self.state.is_flushed()
    }

    fn document_title(&self) -> String {
        self.state.title().to_string()
    }

    fn set_document_title(&mut self, title: &str) {
        self.state.set_title(title);
    }
}

impl Drop for FileAdapter {
    fn drop(&mut self) {
        if self.state.is_open() || self.writer.is_some() {
            if let Err(e) = self.close() {
                warn!(error = %e, "Failed to close file adapter");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_close_flushes_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.pcl");

        let mut adapter = FileAdapter::new(&path);
        adapter.open().unwrap();
        adapter.send(b"\x1bE").unwrap();
        adapter.send(b"text").unwrap();
        adapter.close().unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"\x1bEtext".to_vec());
    }

    #[test]
    fn test_drop_closes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.zpl");
        {
            let mut adapter = FileAdapter::new(&path);
            adapter.open().unwrap();
            adapter.send(b"^XA\n^XZ\n").unwrap();
        }
        assert_eq!(fs::read(&path).unwrap(), b"^XA\n^XZ\n".to_vec());
    }

    #[test]
    fn test_send_before_open() {
        let mut adapter = FileAdapter::new("unused.bin");
        assert!(matches!(
            adapter.send(b"x"),
            Err(PrintStreamError::AdapterNotOpen)
        ));
    }
}
