//! # Printer Command Vocabularies
//!
//! Free functions that append printer commands to a
//! [`Document`](crate::document::Document). They only use the public
//! `append` / `write*` surface, so any document can be extended with any
//! vocabulary.
//!
//! ## Module Structure
//!
//! - [`pcl`]: HP PCL 5 page, font and raster commands
//! - [`raster`]: Bit matrix to PCL raster rows
//! - [`code39`]: Code 39 barcodes drawn with PCL rectangles
//! - [`zpl`]: Zebra ZPL II label, field and graphic commands
//!
//! ## Usage Example
//!
//! ```
//! use printstream::document::Document;
//! use printstream::protocol::{pcl, zpl};
//!
//! // HP job
//! let mut page = Document::hp_pcl();
//! pcl::reset_printer(&mut page);
//! pcl::symbol_set(&mut page, pcl::SymbolSet::Pc850);
//! pcl::bold(&mut page, true);
//! page.write_line("Invoice");
//! pcl::bold(&mut page, false);
//! pcl::reset_printer(&mut page);
//!
//! // Zebra label
//! let mut label = Document::zpl();
//! zpl::format_start(&mut label);
//! zpl::field(&mut label, (50, 50), Some(&zpl::font("D", None, None)?), "Hello");
//! zpl::format_end(&mut label);
//! # Ok::<(), printstream::PrintStreamError>(())
//! ```

pub mod code39;
pub mod pcl;
pub mod raster;
pub mod zpl;
