//! # Printer Transport Layer
//!
//! This module provides communication backends for sending encoded
//! documents to printers. A [`Document`](crate::document::Document) only
//! ever talks to a transport through the [`PrinterAdapter`] trait.
//!
//! ## Available Transports
//!
//! - [`socket`]: Raw TCP (JetDirect, port 9100)
//! - [`serial`]: Serial or USB-serial TTY (Unix)
//! - [`cups`]: CUPS print queue, spooled through a temporary file
//! - [`file`]: Write the stream to a local file
//! - [`MemoryAdapter`]: Record the stream in memory (tests, dry runs)
//!
//! ## Lifecycle
//!
//! ```text
//!            open()                 send(bytes)*
//! Closed ──────────────► Open ───────────────────► Open (unflushed)
//!   ▲                     │                           │
//!   │      close()        │        flush()            │
//!   └─────────────────────┴──◄── Open (flushed) ◄─────┘
//! ```
//!
//! `close()` flushes first when data was sent but not flushed, so nothing
//! is dropped silently. Adapters holding an OS resource also close
//! themselves on `Drop`.

pub mod cups;
pub mod file;
pub mod serial;
pub mod socket;

pub use cups::{CupsAdapter, CupsQueue};
pub use file::FileAdapter;
pub use serial::SerialAdapter;
pub use socket::SocketAdapter;

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::error::{PrintStreamError, Result};

/// Contract between a document and a physical or virtual printer.
pub trait PrinterAdapter {
    /// Acquire the transport. No-op when already open.
    ///
    /// Fails with [`PrintStreamError::AlreadyConnected`] when a handle
    /// exists while the adapter is flagged closed.
    fn open(&mut self) -> Result<()>;

    /// Transmit one chunk. Fails with [`PrintStreamError::AdapterNotOpen`]
    /// before `open()`.
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Push buffered data to the printer.
    fn flush(&mut self) -> Result<()>;

    /// Flush pending data, then release the transport. Idempotent.
    fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    fn is_flushed(&self) -> bool;

    /// Title of the document being transmitted.
    fn document_title(&self) -> String;

    /// Called by `Document::send()` before serialization begins.
    fn set_document_title(&mut self, title: &str);
}

/// Lets a runtime-selected `Box<dyn PrinterAdapter>` be attached to a
/// document like a concrete adapter.
impl<A: PrinterAdapter + ?Sized> PrinterAdapter for Box<A> {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        (**self).send(data)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn is_flushed(&self) -> bool {
        (**self).is_flushed()
    }

    fn document_title(&self) -> String {
        (**self).document_title()
    }

    fn set_document_title(&mut self, title: &str) {
        (**self).set_document_title(title)
    }
}

/// Lifecycle bookkeeping shared by every adapter.
///
/// Adapters keep one of these next to their transport handle and consult
/// it on each call, so the open/flushed rules live in a single place.
#[derive(Debug, Clone)]
pub struct AdapterState {
    open: bool,
    flushed: bool,
    title: String,
}

impl AdapterState {
    pub fn new() -> Self {
        Self {
            open: false,
            flushed: true,
            title: String::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_flushed(&self) -> bool {
        self.flushed
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    /// Record a successful open.
    pub fn mark_open(&mut self) {
        self.open = true;
        self.flushed = false;
    }

    /// Check the adapter may transmit and record unflushed data.
    pub fn begin_send(&mut self) -> Result<()> {
        if !self.open {
            return Err(PrintStreamError::AdapterNotOpen);
        }
        self.flushed = false;
        Ok(())
    }

    pub fn mark_flushed(&mut self) {
        self.flushed = true;
    }

    /// True when `close()` must flush before releasing the transport.
    pub fn needs_flush(&self) -> bool {
        self.open && !self.flushed
    }

    pub fn mark_closed(&mut self) {
        self.open = false;
    }
}

impl Default for AdapterState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// MEMORY ADAPTER
// ============================================================================

#[derive(Debug, Default)]
struct Recording {
    state: AdapterState,
    /// Bytes sent since the last flush; `Some` while the "transport" is held
    pending: Option<Vec<u8>>,
    chunks: Vec<Vec<u8>>,
    delivered: Vec<u8>,
    flush_count: usize,
}

/// # In-Memory Adapter
///
/// Records every chunk it is given. Clones share one recording, so a test
/// can keep a handle while the document owns another.
///
/// Sent bytes are held as pending until `flush()` moves them to
/// [`delivered`](MemoryAdapter::delivered), mirroring a spooling transport.
///
/// ## Example
///
/// ```
/// use printstream::transport::{MemoryAdapter, PrinterAdapter};
///
/// let probe = MemoryAdapter::new();
/// let mut adapter = probe.clone();
/// adapter.open()?;
/// adapter.send(b"\x1bE")?;
/// adapter.close()?;
///
/// assert_eq!(probe.delivered(), b"\x1bE");
/// # Ok::<(), printstream::PrintStreamError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryAdapter {
    inner: Rc<RefCell<Recording>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every chunk passed to `send()`, in order.
    pub fn chunks(&self) -> Vec<Vec<u8>> {
        self.inner.borrow().chunks.clone()
    }

    /// Concatenation of every chunk passed to `send()`.
    pub fn sent_bytes(&self) -> Vec<u8> {
        self.inner.borrow().chunks.concat()
    }

    pub fn send_count(&self) -> usize {
        self.inner.borrow().chunks.len()
    }

    /// Bytes that reached the "printer" through a flush.
    pub fn delivered(&self) -> Vec<u8> {
        self.inner.borrow().delivered.clone()
    }

    pub fn flush_count(&self) -> usize {
        self.inner.borrow().flush_count
    }
}

impl PrinterAdapter for MemoryAdapter {
    fn open(&mut self) -> Result<()> {
        let mut rec = self.inner.borrow_mut();
        if rec.state.is_open() {
            return Ok(());
        }
        if rec.pending.is_some() {
            return Err(PrintStreamError::AlreadyConnected(
                "memory buffer already assigned".to_string(),
            ));
        }
        rec.pending = Some(Vec::new());
        rec.state.mark_open();
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        let mut rec = self.inner.borrow_mut();
        rec.state.begin_send()?;
        if let Some(pending) = rec.pending.as_mut() {
            pending.extend_from_slice(data);
        }
        rec.chunks.push(data.to_vec());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let rec = &mut *self.inner.borrow_mut();
        if let Some(pending) = rec.pending.as_mut() {
            rec.delivered.append(pending);
        }
        rec.flush_count += 1;
        rec.state.mark_flushed();
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.inner.borrow().state.needs_flush() {
            debug!("Flushing memory adapter before close");
            self.flush()?;
        }
        let mut rec = self.inner.borrow_mut();
        rec.pending = None;
        rec.state.mark_closed();
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.inner.borrow().state.is_open()
    }

    fn is_flushed(&self) -> bool {
        self.inner.borrow().state.is_flushed()
    }

    fn document_title(&self) -> String {
        self.inner.borrow().state.title().to_string()
    }

    fn set_document_title(&mut self, title: &str) {
        self.inner.borrow_mut().state.set_title(title);
    }
}
