//! # Stream Tests
//!
//! End-to-end checks of complete print streams: documents built with the
//! PCL and ZPL vocabularies, sent through real adapters, compared byte for
//! byte.
//!
//! ## Test Coverage
//!
//! - **Encoding**: text items through a codepage, control items as UTF-8
//! - **Ordering**: the stream is the items' bytes in append order
//! - **Send protocol**: hooks, empty documents, failures leaving items intact
//! - **Encoders**: raster rows, Code 39, EAN-13 labels
//! - **Transports**: file and TCP adapters receiving a whole job

use std::cell::Cell;
use std::fs;
use std::io::Read;
use std::net::TcpListener;
use std::rc::Rc;
use std::thread;

use pretty_assertions::assert_eq;

use printstream::checksum::{calculate_ean13, ean13_checksum};
use printstream::document::{ContentItem, Document, ItemKind};
use printstream::encoding::Codepage;
use printstream::protocol::code39::Barcode39;
use printstream::protocol::raster::{self, RasterMatrix};
use printstream::protocol::{pcl, zpl};
use printstream::transport::{FileAdapter, MemoryAdapter, PrinterAdapter, SocketAdapter};
use printstream::PrintStreamError;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Document attached to an already open in-memory adapter.
fn recorded(doc: Document) -> (Document, MemoryAdapter) {
    let mut probe = MemoryAdapter::new();
    probe.open().unwrap();
    (doc.with_adapter(probe.clone()), probe)
}

// ============================================================================
// ENCODING
// ============================================================================

#[test]
fn test_cp850_text_is_single_byte() {
    let (mut doc, probe) = recorded(Document::hp_pcl().with_encoding(Codepage::Cp850));
    doc.write("é");
    doc.send().unwrap();
    assert_eq!(probe.sent_bytes(), vec![0x82]);
}

#[test]
fn test_codepage_only_applies_to_text() {
    let (mut doc, probe) = recorded(
        Document::hp_pcl().with_encoding(Codepage::from_label("iso-8859-15").unwrap()),
    );
    doc.write_control("\x1b(0N");
    doc.write("€");
    doc.write_bytes(vec![0xA4]);
    doc.send().unwrap();

    assert_eq!(
        probe.chunks(),
        vec![b"\x1b(0N".to_vec(), vec![0xA4], vec![0xA4]]
    );
}

// ============================================================================
// ORDERING AND SEND PROTOCOL
// ============================================================================

#[test]
fn test_stream_is_concatenation_in_append_order() {
    let items = [
        ContentItem::control("\x1bE"),
        ContentItem::text("Total: 12€".replace('€', "EUR")),
        ContentItem::binary(vec![0x00, 0x80]),
        ContentItem::text("ça"),
    ];

    let (mut doc, probe) = recorded(Document::hp_pcl());
    doc.extend(items.iter().cloned());
    doc.send().unwrap();

    let expected: Vec<u8> = items
        .iter()
        .flat_map(|item| item.encode(Codepage::Cp850).unwrap())
        .collect();
    assert_eq!(probe.sent_bytes(), expected);

    // Reordering items changes the stream
    let (mut reversed, probe_rev) = recorded(Document::hp_pcl());
    reversed.extend(items.iter().rev().cloned());
    reversed.send().unwrap();
    assert!(probe_rev.sent_bytes() != expected);
}

#[test]
fn test_clear_twice_leaves_empty() {
    let mut doc = Document::zpl();
    doc.write_line("^XA");
    doc.clear();
    assert!(doc.is_empty());
    doc.clear();
    assert!(doc.is_empty());
    assert_eq!(doc.to_bytes().unwrap(), Vec::<u8>::new());
}

#[test]
fn test_empty_send_runs_hooks_without_sending() {
    let before = Rc::new(Cell::new(0));
    let after = Rc::new(Cell::new(0));
    let (b, a) = (before.clone(), after.clone());

    let (mut doc, probe) = recorded(
        Document::hp_pcl()
            .before_send(move |_: &Document| {
                b.set(b.get() + 1);
                true
            })
            .after_send(move |_| a.set(a.get() + 1)),
    );
    doc.send().unwrap();

    assert_eq!(probe.send_count(), 0);
    assert_eq!((before.get(), after.get()), (1, 1));
}

#[test]
fn test_send_on_closed_adapter_keeps_items() {
    let probe = MemoryAdapter::new();
    let mut doc = Document::hp_pcl().with_adapter(probe.clone());
    pcl::reset_printer(&mut doc);
    doc.write_line("retry me");

    assert!(matches!(doc.send(), Err(PrintStreamError::AdapterNotOpen)));
    assert_eq!(doc.len(), 2);
    assert_eq!(probe.send_count(), 0);

    // Caller fixes the transport and retries
    doc.adapter_mut().unwrap().open().unwrap();
    doc.send().unwrap();
    assert_eq!(probe.sent_bytes(), b"\x1bEretry me\r\n".to_vec());
}

#[test]
fn test_close_after_send_flushes() {
    let probe = MemoryAdapter::new();
    let mut doc = Document::zpl().with_adapter(probe.clone());
    zpl::format_start(&mut doc);
    zpl::format_end(&mut doc);

    let adapter = doc.adapter_mut().unwrap();
    adapter.open().unwrap();
    doc.send().unwrap();
    assert!(probe.delivered().is_empty());

    doc.adapter_mut().unwrap().close().unwrap();
    assert_eq!(probe.delivered(), b"^XA\n^XZ\n".to_vec());
    assert_eq!(probe.flush_count(), 1);
}

#[test]
fn test_append_validates_raw_items() {
    assert!(matches!(
        ContentItem::from_raw(3, "not bytes"),
        Err(PrintStreamError::InvalidItem(_))
    ));
    let item = ContentItem::from_raw(2, "text").unwrap();
    assert_eq!(item.kind(), ItemKind::Text);
}

// ============================================================================
// ENCODERS
// ============================================================================

#[test]
fn test_raster_row_declares_byte_count() {
    let matrix = RasterMatrix::new(vec![vec![
        1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0,
    ]])
    .unwrap();
    let mut doc = Document::hp_pcl();
    raster::write_raster(&mut doc, &matrix);

    assert_eq!(
        doc.to_bytes().unwrap(),
        b"\x1b*b4W\x80\x80\xC0\x00".to_vec()
    );
}

#[test]
fn test_raster_graphic_from_bit_strings() {
    let matrix = RasterMatrix::from_bit_strings(&[
        "00000000 00000000 10000000 00000000",
        "00000000 00000000 11000000 00000000",
        "00000000 00000000 11100000",
    ])
    .unwrap();
    let mut doc = Document::hp_pcl();
    raster::write_graphic(&mut doc, &matrix, 75, true).unwrap();

    let mut expected = b"\x1b*t75R\x1b*r0F\x1b*r1A".to_vec();
    expected.extend(b"\x1b*b4W\x00\x00\x80\x00");
    expected.extend(b"\x1b*b4W\x00\x00\xC0\x00");
    expected.extend(b"\x1b*b3W\x00\x00\xE0");
    expected.extend(b"\x1b*rC");
    assert_eq!(doc.to_bytes().unwrap(), expected);
}

#[test]
fn test_code39_accepts_uppercase_only() {
    let mut doc = Document::hp_pcl();
    let mut barcode = Barcode39::new(&mut doc, 1).unwrap();
    barcode.write("MCHP00189").unwrap();
    assert!(matches!(
        barcode.code_to_sequences("mchp"),
        Err(PrintStreamError::UnsupportedCharacter { ch: 'm', .. })
    ));
    // start + 11 symbols × 9 elements × 2 + end
    assert_eq!(doc.len(), 2 + 11 * 9 * 2);
}

#[test]
fn test_code39_stream_prefix() {
    let mut doc = Document::hp_pcl();
    Barcode39::new(&mut doc, 1).unwrap().write("A").unwrap();
    let bytes = doc.to_bytes().unwrap();

    // '*' starts with narrow bar, then a wide space
    let mut prefix = b"\x1b*p-50Y".to_vec();
    prefix.extend(b"\x1b*c03a50b0P\x1b*p+03X");
    prefix.extend(b"\x1b*p+03X");
    prefix.extend(b"\x1b*p+07X");
    prefix.extend(b"\x1b*p+03X");
    assert_eq!(bytes[..prefix.len()].to_vec(), prefix);
    assert!(bytes.ends_with(b"\x1b*p+50Y"));
}

#[test]
fn test_ean13_label() {
    assert_eq!(ean13_checksum("323210000576").unwrap(), 1);
    let ean = calculate_ean13("323210000576").unwrap();
    assert_eq!(ean, "3232100005761");

    let mut doc = Document::zpl();
    zpl::format_start(&mut doc);
    zpl::ean13(&mut doc, (110, 40), &ean, 50).unwrap();
    zpl::format_end(&mut doc);
    assert_eq!(
        String::from_utf8(doc.to_bytes().unwrap()).unwrap(),
        "^XA\n^FO110,40^BEN,50,Y,N^FD3232100005761\n^FS\n^XZ\n"
    );
}

// ============================================================================
// TRANSPORTS
// ============================================================================

#[test]
fn test_print_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("label.zpl");

    let mut doc = Document::zpl()
        .with_title("label")
        .with_adapter(FileAdapter::new(&path))
        .after_send(|doc| doc.clear());
    zpl::format_start(&mut doc);
    let font = zpl::font("E", None, None).unwrap();
    zpl::field(&mut doc, (120, 11), Some(&font), "RASPBERRY.");
    zpl::format_end(&mut doc);
    doc.print().unwrap();

    assert!(doc.is_empty());
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "^XA\n^FO120,11^AEN,28,15^FDRASPBERRY.\n^FS\n^XZ\n"
    );
}

#[test]
fn test_print_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = thread::spawn(move || {
        let (mut conn, _) = listener.accept().unwrap();
        let mut received = Vec::new();
        conn.read_to_end(&mut received).unwrap();
        received
    });

    let adapter = SocketAdapter::new("127.0.0.1", port).unwrap();
    let mut doc = Document::hp_pcl().with_adapter(adapter);
    pcl::reset_printer(&mut doc);
    pcl::pitch(&mut doc, 16.66).unwrap();
    doc.write_line("Déjà");
    doc.print().unwrap();

    assert_eq!(
        server.join().unwrap(),
        b"\x1bE\x1b(s16.66HD\x82j\x85\r\n".to_vec()
    );
}
