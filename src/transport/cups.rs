//! # CUPS Queue Transport
//!
//! Hands the print stream to a CUPS queue. The queue should be configured
//! as a raw queue (Generic → Raw) so CUPS forwards PCL/ZPL untouched.
//!
//! ## Spooling
//!
//! `send()` appends to a temporary spool file. `flush()` submits that file
//! with `lp -d <queue> -t <title> -o raw <file>`, tagging the job with the
//! document title, then discards the spool. Nothing reaches the printer
//! until a flush (explicit or from `close()`).

use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use super::{AdapterState, PrinterAdapter};
use crate::error::{PrintStreamError, Result};

/// CUPS command-line submit program
pub const DEFAULT_LP_PROGRAM: &str = "lp";

/// # CUPS Printer Adapter
///
/// ## Example
///
/// ```no_run
/// use printstream::transport::{CupsAdapter, PrinterAdapter};
///
/// let mut adapter = CupsAdapter::new(Some("zebra-raw"));
/// adapter.set_document_title("shipping label");
/// adapter.open()?;
/// adapter.send(b"^XA\n^FDHello^FS\n^XZ\n")?;
/// adapter.close()?; // submits the job
/// # Ok::<(), printstream::PrintStreamError>(())
/// ```
#[derive(Debug)]
pub struct CupsAdapter {
    queue: Option<String>,
    program: String,
    /// Resolved submit program; `Some` while connected
    lp: Option<PathBuf>,
    spool: Option<NamedTempFile>,
    state: AdapterState,
}

impl CupsAdapter {
    /// Create an adapter for a queue name, or the default destination.
    pub fn new(queue: Option<&str>) -> Self {
        Self {
            queue: queue.map(str::to_string),
            program: DEFAULT_LP_PROGRAM.to_string(),
            lp: None,
            spool: None,
            state: AdapterState::new(),
        }
    }

    /// Use another submit program with `lp`-compatible arguments.
    pub fn with_lp_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    pub fn queue(&self) -> Option<&str> {
        self.queue.as_deref()
    }

    fn job_name(&self) -> String {
        let title = self.state.title();
        if title.is_empty() {
            "printstream job".to_string()
        } else {
            title.to_string()
        }
    }

    fn submit(&self, lp: &Path, spool: &Path) -> Result<()> {
        let mut cmd = Command::new(lp);
        if let Some(queue) = &self.queue {
            cmd.arg("-d").arg(queue);
        }
        cmd.arg("-t").arg(self.job_name()).arg("-o").arg("raw").arg(spool);

        let output = cmd.output().map_err(|e| {
            PrintStreamError::Transport(format!("Failed to run {}: {}", lp.display(), e))
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PrintStreamError::Transport(format!(
                "{} failed: {}",
                lp.display(),
                stderr.trim()
            )));
        }
        info!(
            queue = self.queue.as_deref().unwrap_or("default"),
            reply = %String::from_utf8_lossy(&output.stdout).trim(),
            "Job submitted"
        );
        Ok(())
    }
}

impl PrinterAdapter for CupsAdapter {
    #[instrument(skip(self), fields(queue = ?self.queue))]
    fn open(&mut self) -> Result<()> {
        if self.state.is_open() {
            return Ok(());
        }
        if self.lp.is_some() {
            return Err(PrintStreamError::AlreadyConnected(
                "already connected to CUPS".to_string(),
            ));
        }
        let lp = find_program(&self.program).ok_or_else(|| {
            PrintStreamError::Transport(format!("{} not found in PATH", self.program))
        })?;
        debug!(program = %lp.display(), "Using CUPS submit program");
        self.lp = Some(lp);
        self.state.mark_open();
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.state.begin_send()?;
        if self.spool.is_none() {
            let spool = tempfile::Builder::new()
                .prefix("printstream-")
                .suffix(".prn")
                .tempfile()?;
            debug!(path = %spool.path().display(), "Spool file created");
            self.spool = Some(spool);
        }
        if let Some(spool) = self.spool.as_mut() {
            spool.write_all(data)?;
        }
        Ok(())
    }

    #[instrument(skip(self), fields(queue = ?self.queue))]
    fn flush(&mut self) -> Result<()> {
        if let Some(spool) = self.spool.as_mut() {
            spool.flush()?;
            let path = spool.path().to_path_buf();
            let lp = self.lp.clone().ok_or(PrintStreamError::AdapterNotOpen)?;
            // Keep the spool on failure so the next flush resubmits it
            self.submit(&lp, &path)?;
            self.spool = None;
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
        self.lp = None;
        self.spool = None;
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

impl Drop for CupsAdapter {
    fn drop(&mut self) {
        if self.state.is_open() || self.lp.is_some() {
            if let Err(e) = self.close() {
                warn!(error = %e, "Failed to close CUPS adapter");
            }
        }
    }
}

/// A CUPS destination and its device URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CupsQueue {
    pub name: String,
    pub device_uri: String,
}

/// List the queues known to the local CUPS server (`lpstat -v`).
pub fn list_queues() -> Result<Vec<CupsQueue>> {
    let output = Command::new("lpstat")
        .arg("-v")
        .output()
        .map_err(|e| PrintStreamError::Transport(format!("Failed to run lpstat: {}", e)))?;
    if !output.status.success() {
        return Err(PrintStreamError::Transport(format!(
            "lpstat failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(parse_lpstat(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse `device for <queue>: <uri>` lines.
fn parse_lpstat(listing: &str) -> Vec<CupsQueue> {
    listing
        .lines()
        .filter_map(|line| {
            let rest = line.trim().strip_prefix("device for ")?;
            let (name, uri) = rest.split_once(':')?;
            Some(CupsQueue {
                name: name.trim().to_string(),
                device_uri: uri.trim().to_string(),
            })
        })
        .collect()
}

/// Locate a program either by explicit path or through `PATH`.
fn find_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|path| path.is_file())
}
