//! # Document Model
//!
//! A [`Document`] is an append-only list of [`ContentItem`]s for one
//! printer family. Helper vocabularies ([`crate::protocol::pcl`],
//! [`crate::protocol::zpl`], raster and barcode encoders) only use the
//! public `append` / `write*` surface, so every printer feature ends up as
//! ordered items here.
//!
//! ```
//! use printstream::document::Document;
//! use printstream::transport::MemoryAdapter;
//!
//! let probe = MemoryAdapter::new();
//! let mut doc = Document::hp_pcl()
//!     .with_title("invoice 42")
//!     .with_adapter(probe.clone())
//!     .after_send(|doc| doc.clear());
//!
//! doc.write_esc("E");
//! doc.write_line("Déjà vu");
//! doc.print()?;
//!
//! assert!(doc.is_empty());
//! assert_eq!(probe.delivered(), b"\x1bED\x82j\x85 vu\r\n");
//! # Ok::<(), printstream::PrintStreamError>(())
//! ```
//!
//! ## Transmission
//!
//! [`Document::send`] runs, in order:
//!
//! 1. Propagate the title to the adapter
//! 2. Run the `before_send` hook; [`SendFlow::Abort`] stops here
//! 3. Encode every item (text through the target codepage)
//! 4. Hand each encoded chunk to the adapter, in append order
//! 5. Run the `after_send` hook
//!
//! Any failure returns early and leaves the items untouched so the caller
//! can fix the transport and send again.

mod item;

pub use item::{CONTROL_ENCODING, ContentItem, ItemKind, Payload};

use std::fmt;

use tracing::{debug, info, instrument};

use crate::encoding::Codepage;
use crate::error::{PrintStreamError, Result};
use crate::printer::FamilyConfig;
use crate::transport::PrinterAdapter;

/// Outcome of the pre-send hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendFlow {
    #[default]
    Continue,
    /// Skip transmission and the post-send hook
    Abort,
}

impl From<bool> for SendFlow {
    fn from(proceed: bool) -> Self {
        if proceed {
            SendFlow::Continue
        } else {
            SendFlow::Abort
        }
    }
}

/// Pre-flight check run by [`Document::send`].
pub type BeforeSend = Box<dyn FnMut(&Document) -> SendFlow>;

/// Cleanup run after a successful [`Document::send`].
pub type AfterSend = Box<dyn FnMut(&mut Document)>;

/// Ordered print stream for one printer family.
pub struct Document {
    family: FamilyConfig,
    target_encoding: Codepage,
    title: String,
    items: Vec<ContentItem>,
    adapter: Option<Box<dyn PrinterAdapter>>,
    before_send: Option<BeforeSend>,
    after_send: Option<AfterSend>,
}

impl Document {
    /// Empty document using the family's default codepage.
    pub fn new(family: FamilyConfig) -> Self {
        Self {
            family,
            target_encoding: family.default_codepage,
            title: String::new(),
            items: Vec::new(),
            adapter: None,
            before_send: None,
            after_send: None,
        }
    }

    /// Document for HP PCL laser printers (CR+LF, `ESC` commands).
    pub fn hp_pcl() -> Self {
        Self::new(FamilyConfig::HP_PCL)
    }

    /// Document for Zebra ZPL label printers (LF, `^` commands).
    pub fn zpl() -> Self {
        Self::new(FamilyConfig::ZEBRA_ZPL)
    }

    // ========================================================================
    // CONFIGURATION
    // ========================================================================

    pub fn with_encoding(mut self, codepage: Codepage) -> Self {
        self.target_encoding = codepage;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Attach the transport. The adapter stays with the document for its
    /// whole life.
    pub fn with_adapter<A: PrinterAdapter + 'static>(mut self, adapter: A) -> Self {
        self.adapter = Some(Box::new(adapter));
        self
    }

    /// Install a pre-flight check. Returning `false` (or
    /// [`SendFlow::Abort`]) cancels the send.
    pub fn before_send<F, R>(mut self, mut hook: F) -> Self
    where
        F: FnMut(&Document) -> R + 'static,
        R: Into<SendFlow>,
    {
        self.before_send = Some(Box::new(move |doc| hook(doc).into()));
        self
    }

    /// Install a post-send cleanup, e.g. `|doc| doc.clear()`.
    pub fn after_send<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut Document) + 'static,
    {
        self.after_send = Some(Box::new(hook));
        self
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn family(&self) -> &FamilyConfig {
        &self.family
    }

    pub fn target_encoding(&self) -> Codepage {
        self.target_encoding
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn adapter(&self) -> Option<&dyn PrinterAdapter> {
        self.adapter.as_deref()
    }

    /// Mutable access for `open()` / `close()`.
    pub fn adapter_mut(&mut self) -> Option<&mut (dyn PrinterAdapter + 'static)> {
        self.adapter.as_deref_mut()
    }

    // ========================================================================
    // CONTENT
    // ========================================================================

    pub fn append(&mut self, item: ContentItem) {
        self.items.push(item);
    }

    /// Documents are built top to bottom; positional insertion always fails
    /// with [`PrintStreamError::NotSupported`].
    pub fn insert(&mut self, _index: usize, _item: ContentItem) -> Result<()> {
        Err(PrintStreamError::NotSupported(
            "insert into a document (append only)",
        ))
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn write(&mut self, text: &str) {
        self.append(ContentItem::text(text));
    }

    /// Append `text` followed by the family line terminator.
    pub fn write_line(&mut self, text: &str) {
        let mut line = String::with_capacity(text.len() + 2);
        line.push_str(text);
        line.push_str(self.family.line_terminator);
        self.append(ContentItem::text(line));
    }

    pub fn write_bytes(&mut self, data: impl Into<Vec<u8>>) {
        self.append(ContentItem::binary(data));
    }

    /// Append a raw control sequence.
    pub fn write_control(&mut self, seq: impl Into<String>) {
        self.append(ContentItem::control(seq));
    }

    /// Append `body` behind the family escape prefix as a control item.
    ///
    /// `write_esc("&l1H")` on an HP document yields `ESC&l1H`.
    pub fn write_esc(&mut self, body: &str) {
        let seq = self.family.command(body);
        self.write_control(seq);
    }

    // ========================================================================
    // SERIALIZATION
    // ========================================================================

    /// Encode every item, in order, without transmitting.
    pub fn encode_items(&self) -> Result<Vec<Vec<u8>>> {
        self.items
            .iter()
            .map(|item| item.encode(self.target_encoding))
            .collect()
    }

    /// The whole print stream as one buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.encode_items()?.concat())
    }

    /// Transmit the document through its adapter (see the module docs).
    ///
    /// The adapter must already be open. An empty document sends nothing
    /// but still runs both hooks.
    #[instrument(skip(self), fields(title = %self.title, items = self.items.len()))]
    pub fn send(&mut self) -> Result<()> {
        if let Some(adapter) = self.adapter.as_mut() {
            adapter.set_document_title(&self.title);
        }

        if self.run_before_send() == SendFlow::Abort {
            info!("Send cancelled by pre-send hook");
            return Ok(());
        }

        // Encode first so an unencodable character never leaves a
        // half-written job on the printer
        let chunks = self.encode_items()?;
        if !chunks.is_empty() {
            let adapter = self.adapter.as_mut().ok_or(PrintStreamError::NoAdapter)?;
            for chunk in &chunks {
                adapter.send(chunk)?;
            }
            debug!(
                chunks = chunks.len(),
                bytes = chunks.iter().map(Vec::len).sum::<usize>(),
                "Document transmitted"
            );
        }

        self.run_after_send();
        Ok(())
    }

    /// Open the adapter, send, and close it again on every path.
    ///
    /// The first error wins; a close failure after a failed send is logged
    /// by the adapter but not returned.
    pub fn print(&mut self) -> Result<()> {
        let adapter = self.adapter.as_mut().ok_or(PrintStreamError::NoAdapter)?;
        adapter.open()?;

        let sent = self.send();
        let closed = match self.adapter.as_mut() {
            Some(adapter) => adapter.close(),
            None => Ok(()),
        };
        sent.and(closed)
    }

    fn run_before_send(&mut self) -> SendFlow {
        let Some(mut hook) = self.before_send.take() else {
            return SendFlow::Continue;
        };
        let flow = hook(self);
        self.before_send = Some(hook);
        flow
    }

    fn run_after_send(&mut self) {
        let Some(mut hook) = self.after_send.take() else {
            return;
        };
        hook(self);
        self.after_send = Some(hook);
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("family", &self.family.name)
            .field("target_encoding", &self.target_encoding)
            .field("title", &self.title)
            .field("items", &self.items)
            .field("has_adapter", &self.adapter.is_some())
            .finish()
    }
}

impl Extend<ContentItem> for Document {
    fn extend<I: IntoIterator<Item = ContentItem>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryAdapter;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    fn open_probe() -> MemoryAdapter {
        let mut probe = MemoryAdapter::new();
        probe.open().unwrap();
        probe
    }

    #[test]
    fn test_write_line_uses_family_terminator() {
        let mut hp = Document::hp_pcl();
        hp.write_line("a");
        let mut zpl = Document::zpl();
        zpl.write_line("a");

        assert_eq!(hp.to_bytes().unwrap(), b"a\r\n".to_vec());
        assert_eq!(zpl.to_bytes().unwrap(), b"a\n".to_vec());
    }

    #[test]
    fn test_write_esc_uses_family_prefix() {
        let mut doc = Document::hp_pcl();
        doc.write_esc("&l1H");
        assert_eq!(doc.items(), &[ContentItem::control("\x1b&l1H")]);
    }

    #[test]
    fn test_insert_not_supported() {
        let mut doc = Document::hp_pcl();
        assert!(matches!(
            doc.insert(0, ContentItem::text("x")),
            Err(PrintStreamError::NotSupported(_))
        ));
        assert!(doc.is_empty());
    }

    #[test]
    fn test_send_transmits_item_per_chunk() {
        let probe = open_probe();
        let mut doc = Document::hp_pcl().with_adapter(probe.clone());
        doc.write_esc("E");
        doc.write("é");
        doc.write_bytes(vec![0x00, 0xFF]);

        doc.send().unwrap();

        assert_eq!(
            probe.chunks(),
            vec![b"\x1bE".to_vec(), vec![0x82], vec![0x00, 0xFF]]
        );
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn test_send_propagates_title() {
        let probe = open_probe();
        let mut doc = Document::zpl()
            .with_title("Zpl Label")
            .with_adapter(probe.clone());
        doc.send().unwrap();
        assert_eq!(probe.document_title(), "Zpl Label");
    }

    #[test]
    fn test_before_send_abort_skips_everything() {
        let probe = open_probe();
        let after_calls = Rc::new(Cell::new(0));
        let counter = after_calls.clone();
        let mut doc = Document::hp_pcl()
            .with_adapter(probe.clone())
            .before_send(|_: &Document| false)
            .after_send(move |_| counter.set(counter.get() + 1));
        doc.write("x");

        doc.send().unwrap();

        assert_eq!(probe.send_count(), 0);
        assert_eq!(after_calls.get(), 0);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_before_send_sees_document() {
        let probe = open_probe();
        let mut doc = Document::hp_pcl()
            .with_adapter(probe.clone())
            .before_send(|doc: &Document| !doc.is_empty());

        doc.send().unwrap();
        doc.write("x");
        doc.send().unwrap();

        assert_eq!(probe.send_count(), 1);
    }

    #[test]
    fn test_after_send_can_clear() {
        let probe = open_probe();
        let mut doc = Document::hp_pcl()
            .with_adapter(probe.clone())
            .after_send(|doc| doc.clear());
        doc.write("x");
        doc.send().unwrap();
        assert!(doc.is_empty());

        // Hook is kept for the next send
        doc.write("y");
        doc.send().unwrap();
        assert!(doc.is_empty());
        assert_eq!(probe.sent_bytes(), b"xy".to_vec());
    }

    #[test]
    fn test_unencodable_text_sends_nothing() {
        let probe = open_probe();
        let mut doc = Document::hp_pcl()
            .with_encoding(Codepage::Ascii)
            .with_adapter(probe.clone());
        doc.write("ok");
        doc.write("€");

        assert!(matches!(
            doc.send(),
            Err(PrintStreamError::Unencodable { ch: '€', .. })
        ));
        assert_eq!(probe.send_count(), 0);
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_send_without_adapter() {
        let mut empty = Document::hp_pcl();
        empty.send().unwrap();

        let mut doc = Document::hp_pcl();
        doc.write("x");
        assert!(matches!(doc.send(), Err(PrintStreamError::NoAdapter)));
        assert!(matches!(doc.print(), Err(PrintStreamError::NoAdapter)));
    }

    #[test]
    fn test_print_opens_and_closes() {
        let probe = MemoryAdapter::new();
        let mut doc = Document::zpl().with_adapter(probe.clone());
        doc.write_line("^XA");
        doc.write_line("^XZ");

        doc.print().unwrap();

        assert!(!probe.is_open());
        assert_eq!(probe.delivered(), b"^XA\n^XZ\n".to_vec());
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut doc = Document::zpl();
        doc.extend([ContentItem::text("a"), ContentItem::control("b")]);
        doc.write("c");
        assert_eq!(doc.to_bytes().unwrap(), b"abc".to_vec());
    }
}
