//! # Printstream CLI
//!
//! Command-line interface printing demo jobs on HP (PCL) and Zebra (ZPL)
//! printers.
//!
//! ## Usage
//!
//! ```bash
//! # Minimal HP page on a JetDirect printer
//! printstream --tcp 192.168.1.206 hp-minimal
//!
//! # Code 39 barcode with its caption
//! printstream --tcp 192.168.1.203:9100 hp-barcode39 MCHP00189
//!
//! # Thresholded image as PCL raster graphic
//! printstream --output raster.pcl hp-raster bitmap_tiny.png
//!
//! # Label on a Zebra behind a raw CUPS queue
//! printstream --cups zebra-raw zebra-label "RASPBERRY." "Pi.2......"
//!
//! # EAN-13 (check digit computed) over USB serial
//! printstream --serial /dev/ttyACM0 --baud 9600 zebra-ean13 323210000576
//!
//! # List CUPS queues
//! printstream cups-queues
//! ```
//!
//! Set `RUST_LOG=printstream=debug` to trace every chunk sent.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use printstream::{
    PrintStreamError,
    checksum::calculate_ean13,
    document::Document,
    encoding::Codepage,
    printer::FamilyConfig,
    protocol::{
        code39::Barcode39,
        pcl::{self, PaperSource, SymbolSet},
        raster::{self, RasterMatrix},
        zpl::{self, LineColor},
    },
    transport::{
        CupsAdapter, FileAdapter, PrinterAdapter, SerialAdapter, SocketAdapter, cups,
        serial::DEFAULT_BAUD,
    },
};

/// Printstream - PCL and ZPL printer utility
#[derive(Parser, Debug)]
#[command(name = "printstream")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    sink: Sink,

    /// Baud rate for --serial
    #[arg(long, default_value_t = DEFAULT_BAUD)]
    baud: u32,

    /// Text codepage (defaults to the printer family's, cp850)
    #[arg(long, value_name = "LABEL")]
    encoding: Option<Codepage>,

    /// Document title (CUPS job name)
    #[arg(long)]
    title: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Where the print stream goes. At most one may be given.
#[derive(Args, Debug)]
#[group(multiple = false)]
struct Sink {
    /// Raw TCP printer, HOST or HOST:PORT (port 9100 by default)
    #[arg(long, value_name = "HOST[:PORT]")]
    tcp: Option<String>,

    /// Serial device, e.g. /dev/ttyACM0
    #[arg(long, value_name = "DEVICE")]
    serial: Option<PathBuf>,

    /// CUPS raw queue name
    #[arg(long, value_name = "QUEUE")]
    cups: Option<String>,

    /// Write the stream to a file
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// HP: a few lines of text at every supported pitch
    HpMinimal,

    /// HP: a box drawn with PC-8 line characters
    HpAsciiBox,

    /// HP: Code 39 barcode with its caption
    HpBarcode39 {
        /// Code to encode (0-9, A-Z, space, - . $ / + %)
        code: String,

        /// Bar height multiplier (1 or 2)
        #[arg(long, default_value_t = 1)]
        height: u8,
    },

    /// HP: image thresholded to a raster graphic
    HpRaster {
        /// Image file (PNG, BMP, GIF, ...)
        image: PathBuf,

        /// Raster resolution (75, 100, 150, 200, 300, 600)
        #[arg(long, default_value_t = 75)]
        dpi: u16,
    },

    /// Zebra: one text field per line
    ZebraLabel {
        /// Lines of text
        #[arg(required = true)]
        lines: Vec<String>,

        /// Font as CODE or CODE,HEIGHT,WIDTH
        #[arg(long, default_value = "E")]
        font: String,

        /// Left margin in millimeters
        #[arg(long, default_value_t = 15.0)]
        margin_mm: f32,
    },

    /// Zebra: Code 39 barcode label
    ZebraBarcode39 {
        code: String,

        /// Bar height in dots
        #[arg(long, default_value_t = zpl::DEFAULT_BARCODE_HEIGHT)]
        height: u32,
    },

    /// Zebra: EAN-13 label from a 12 digit base
    ZebraEan13 {
        /// 12 digits; the check digit is appended
        base: String,
    },

    /// List CUPS queues and their device URIs
    CupsQueues,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "printstream=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), PrintStreamError> {
    let cli = Cli::parse();

    let mut doc = match &cli.command {
        Commands::CupsQueues => {
            for queue in cups::list_queues()? {
                println!("{}\t{}", queue.name, queue.device_uri);
            }
            return Ok(());
        }
        Commands::HpMinimal => {
            let mut doc = new_document(&cli, FamilyConfig::HP_PCL, "Minimal HP document")?;
            hp_minimal(&mut doc)?;
            doc
        }
        Commands::HpAsciiBox => {
            let mut doc = new_document(&cli, FamilyConfig::HP_PCL, "ASCII box")?;
            hp_ascii_box(&mut doc)?;
            doc
        }
        Commands::HpBarcode39 { code, height } => {
            let mut doc = new_document(&cli, FamilyConfig::HP_PCL, "Barcode 39")?;
            hp_barcode39(&mut doc, code, *height)?;
            doc
        }
        Commands::HpRaster { image, dpi } => {
            let matrix = RasterMatrix::open(image)?;
            println!("Image size (h,w) = ({},{})", matrix.height(), matrix.width());
            let mut doc = new_document(&cli, FamilyConfig::HP_PCL, "Raster graphic")?;
            hp_raster(&mut doc, &matrix, *dpi)?;
            doc
        }
        Commands::ZebraLabel {
            lines,
            font,
            margin_mm,
        } => {
            let font: zpl::FieldFont = font.parse()?;
            let mut doc = new_document(&cli, FamilyConfig::ZEBRA_ZPL, "Zpl label")?;
            zebra_label(&mut doc, lines, &font, *margin_mm);
            doc
        }
        Commands::ZebraBarcode39 { code, height } => {
            let mut doc = new_document(&cli, FamilyConfig::ZEBRA_ZPL, "Barcode doc")?;
            zpl::format_start(&mut doc);
            zpl::barcode39(&mut doc, (110, 80), code, *height);
            zpl::format_end(&mut doc);
            doc
        }
        Commands::ZebraEan13 { base } => {
            let ean = calculate_ean13(base)?;
            println!("EAN-13: {}", ean);
            let mut doc = new_document(&cli, FamilyConfig::ZEBRA_ZPL, "EAN13 doc")?;
            zpl::format_start(&mut doc);
            zpl::ean13(&mut doc, (110, 40), &ean, zpl::DEFAULT_BARCODE_HEIGHT)?;
            zpl::format_end(&mut doc);
            doc
        }
    };

    info!(items = doc.len(), title = doc.title(), "Printing");
    doc.print()?;
    println!("Printed successfully!");
    Ok(())
}

/// Document of `family` bound to the sink chosen on the command line.
fn new_document(
    cli: &Cli,
    family: FamilyConfig,
    default_title: &str,
) -> Result<Document, PrintStreamError> {
    let mut doc = Document::new(family)
        .with_title(cli.title.as_deref().unwrap_or(default_title))
        .with_adapter(sink_adapter(&cli.sink, cli.baud)?);
    if let Some(codepage) = cli.encoding {
        doc = doc.with_encoding(codepage);
    }
    Ok(doc)
}

fn sink_adapter(sink: &Sink, baud: u32) -> Result<Box<dyn PrinterAdapter>, PrintStreamError> {
    let adapter: Box<dyn PrinterAdapter> = if let Some(addr) = &sink.tcp {
        Box::new(SocketAdapter::from_addr(addr)?)
    } else if let Some(device) = &sink.serial {
        Box::new(SerialAdapter::new(device).with_baud(baud))
    } else if let Some(queue) = &sink.cups {
        Box::new(CupsAdapter::new(Some(queue)))
    } else if let Some(path) = &sink.output {
        Box::new(FileAdapter::new(path))
    } else {
        return Err(PrintStreamError::InvalidParameter(
            "choose a printer with --tcp, --serial, --cups or --output".to_string(),
        ));
    };
    Ok(adapter)
}

/// Reset, fixed spacing, no HMI, main tray, PC-850.
fn hp_page_setup(doc: &mut Document) {
    pcl::reset_printer(doc);
    pcl::spacing(doc, true);
    pcl::horizontal_motion_index(doc, 0);
    pcl::paper_source(doc, PaperSource::Tray);
    pcl::symbol_set(doc, SymbolSet::Pc850);
}

fn hp_minimal(doc: &mut Document) -> Result<(), PrintStreamError> {
    hp_page_setup(doc);
    doc.write_line("This is my first document");
    doc.write_line("which accepts accents like é and à");
    doc.write_line("Funny test");
    doc.write_line("");

    for cpi in pcl::PITCHES {
        pcl::pitch(doc, cpi)?;
        doc.write_line(&format!("print with cpi={}", cpi));
    }
    doc.write_line("");
    pcl::reset_printer(doc);
    Ok(())
}

fn hp_ascii_box(doc: &mut Document) -> Result<(), PrintStreamError> {
    pcl::reset_printer(doc);
    pcl::symbol_set(doc, SymbolSet::Pc8);
    pcl::horizontal_motion_index(doc, 0);
    pcl::paper_source(doc, PaperSource::Tray);
    pcl::pitch(doc, 10.0)?;

    // PC-8 box drawing characters
    let mut top = vec![0xDAu8];
    top.extend([0xC4; 10]);
    top.push(0xBF);
    let mut bottom = vec![0xC0u8];
    bottom.extend([0xC4; 10]);
    bottom.push(0xD9);

    doc.write_bytes(top);
    doc.write_line("");
    doc.write_bytes([0xB3u8]);
    doc.write("Bordering ");
    doc.write_bytes([0xB3u8]);
    doc.write_line("");
    doc.write_bytes(bottom);
    doc.write_line("");
    pcl::reset_printer(doc);
    Ok(())
}

fn hp_barcode39(doc: &mut Document, code: &str, height: u8) -> Result<(), PrintStreamError> {
    hp_page_setup(doc);
    pcl::pitch(doc, 10.0)?;
    doc.write_line("Code 39 barcode:");
    doc.write_line("");

    let mut barcode = Barcode39::new(doc, height)?;
    barcode.write(code)?;
    let caption = barcode.barcode_message(code)?;

    doc.write_line("");
    doc.write_line(&format!("    {}", caption));
    pcl::reset_printer(doc);
    Ok(())
}

fn hp_raster(doc: &mut Document, matrix: &RasterMatrix, dpi: u16) -> Result<(), PrintStreamError> {
    pcl::reset_printer(doc);
    doc.write("Raster Graphic Test");
    pcl::cursor_move(doc, 0, 50);
    raster::write_graphic(doc, matrix, dpi, true)?;

    // Continue below the image, converted from raster dots to PCL units
    let below = matrix.height() as u32 * u32::from(pcl::UNITS_PER_INCH) / u32::from(dpi);
    pcl::cursor_move(doc, 0, 50 + below + 50);
    doc.write_line("End of test");
    pcl::reset_printer(doc);
    Ok(())
}

fn zebra_label(doc: &mut Document, lines: &[String], font: &zpl::FieldFont, margin_mm: f32) {
    let x = doc.family().mm_to_units(margin_mm);
    let line_height = font.height + font.height / 8;

    zpl::format_start(doc);
    let mut y = 11;
    for line in lines {
        zpl::field(doc, (x, y), Some(font), line);
        y += line_height;
    }
    // Rule under the last line
    zpl::draw_box(doc, (x, y), 300, 2, 2, LineColor::Black);
    zpl::format_end(doc);
}
