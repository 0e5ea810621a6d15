//! # Printstream - PCL and ZPL Print Stream Builder
//!
//! Printstream builds printer-control byte streams for HP laser printers
//! (PCL) and Zebra label printers (ZPL) and sends them over a raw TCP
//! socket, a serial line or a CUPS queue. It provides:
//!
//! - **Document model**: ordered control, text and binary items with
//!   per-item encoding (control as UTF-8, text through a codepage, binary
//!   unchanged)
//! - **Command vocabularies**: PCL page/font/raster commands and ZPL
//!   label/field/graphic commands
//! - **Encoders**: bit matrix to PCL raster rows, Code 39 barcodes drawn
//!   with PCL rectangles, EAN-13 check digits
//! - **Transport**: TCP (port 9100), serial TTY, CUPS, file and in-memory
//!   adapters behind one [`PrinterAdapter`] trait
//!
//! ## Quick Start
//!
//! ```no_run
//! use printstream::{
//!     document::Document,
//!     protocol::{code39::Barcode39, pcl},
//!     transport::SocketAdapter,
//! };
//!
//! let adapter = SocketAdapter::new("192.168.1.206", 9100)?;
//! let mut doc = Document::hp_pcl()
//!     .with_title("Barcode test")
//!     .with_adapter(adapter);
//!
//! pcl::reset_printer(&mut doc);
//! pcl::symbol_set(&mut doc, pcl::SymbolSet::Pc850);
//! doc.write_line("Product code:");
//!
//! let mut barcode = Barcode39::new(&mut doc, 1)?;
//! barcode.write("MCHP00189")?;
//! let caption = barcode.barcode_message("MCHP00189")?;
//! doc.write_line("");
//! doc.write_line(&caption);
//! pcl::reset_printer(&mut doc);
//!
//! // Open, send every item in order, flush and close
//! doc.print()?;
//! # Ok::<(), printstream::PrintStreamError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`document`] | Content items and the document send protocol |
//! | [`encoding`] | Codepages for text items |
//! | [`protocol`] | PCL, raster, Code 39 and ZPL command builders |
//! | [`checksum`] | EAN-13 check digit |
//! | [`transport`] | Printer adapters |
//! | [`printer`] | Printer family constants |
//! | [`error`] | Error types |
//!
//! ## Supported Printers
//!
//! Tested with:
//! - HP LaserJet P3015 (PCL 5, JetDirect)
//! - Zebra LP 2824 Plus (ZPL II, 203 dpi, USB serial)

pub mod checksum;
pub mod document;
pub mod encoding;
pub mod error;
pub mod printer;
pub mod protocol;
pub mod transport;

// Re-exports for convenience
pub use document::{ContentItem, Document, ItemKind};
pub use encoding::Codepage;
pub use error::{PrintStreamError, Result};
pub use printer::FamilyConfig;
pub use transport::PrinterAdapter;
