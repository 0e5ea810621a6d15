//! # Zebra ZPL II Commands
//!
//! Helper vocabulary for Zebra label printers. ZPL commands are plain
//! ASCII, so every helper appends a text item to the [`Document`].
//!
//! ## Label Structure
//!
//! ```text
//! ^XA                      ← format start
//! ^FO50,50^ADN,36,20       ← field origin + font (same line)
//! ^FDHello                 ← field data
//! ^FS                      ← field separator
//! ^PQ1,0,0,Y               ← quantity
//! ^XZ                      ← format end
//! ```
//!
//! Positions and sizes are in dots. Millimetre helpers convert with the
//! printer's vertical resolution (203.2 dpi for 8 dots/mm heads).
//!
//! ## Fonts
//!
//! | Font | Default (h×w) | Gap | Charset |
//! |------|---------------|-----|---------|
//! | A | 9×5 | 1 | U-L-D |
//! | B | 11×7 | 2 | U |
//! | C, D | 18×10 | 2 | U-L-D |
//! | E | 28×15 | 5 | OCR-B |
//! | F | 26×13 | 3 | U-L-D |
//! | G | 60×40 | 8 | U-L-D |
//! | H | 21×13 | 6 | OCR-A |
//! | O | 15×12 | proportional | scalable |
//! | GS | 24×24 | proportional | symbols |
//!
//! Fonts P to V are accepted but have no default size.
//!
//! ## Reference
//!
//! ZPL II Programming Guide, "Fonts and Bar Codes".

use std::fmt;
use std::str::FromStr;

use crate::document::Document;
use crate::error::{PrintStreamError, Result};

/// Vertical resolution of 8 dots/mm print heads
pub const DEFAULT_RESOLUTION: f32 = 203.2;

/// Default height of barcode fields, in dots
pub const DEFAULT_BARCODE_HEIGHT: u32 = 50;

/// Largest `^LL` label length
pub const MAX_LABEL_LENGTH: u32 = 32000;

const MM_PER_INCH: f32 = 25.4;

/// Convert millimetres to dots, truncating.
pub fn mm_to_dots(mm: f32, resolution: f32) -> u32 {
    // Absorb f32 representation error so 25 mm at 203.2 dpi is 200, not 199
    (mm * resolution / MM_PER_INCH + 1e-3) as u32
}

// ============================================================================
// PARAMETER ENUMS
// ============================================================================

macro_rules! letter_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident = $code:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub fn code(&self) -> char {
                match self {
                    $($name::$variant => $code),+
                }
            }
        }

        impl TryFrom<char> for $name {
            type Error = PrintStreamError;

            fn try_from(c: char) -> Result<Self> {
                match c.to_ascii_uppercase() {
                    $($code => Ok($name::$variant),)+
                    other => Err(PrintStreamError::InvalidParameter(format!(
                        "invalid {} {:?}",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.code())
            }
        }
    };
}

letter_enum! {
    /// Field orientation
    Orientation {
        Normal = 'N',
        /// 90° clockwise
        Rotated = 'R',
        /// 180°
        Inverted = 'I',
        /// 270°, read from bottom up
        BottomUp = 'B',
    }
}

letter_enum! {
    /// Post-print action of `^MM`
    PrintMode {
        TearOff = 'T',
        PeelOff = 'P',
        Rewind = 'R',
        Applicator = 'A',
        Cutter = 'C',
        DelayedCutter = 'D',
        Rfid = 'F',
        Kiosk = 'K',
    }
}

letter_enum! {
    /// Media type of `^MN`
    MediaTracking {
        /// Continuous roll (receipt-like)
        Continuous = 'N',
        /// Non-continuous, web sensing
        WebSensing = 'Y',
        /// Non-continuous, web sensing (alternate)
        WebSensingAlt = 'W',
        /// Non-continuous, black mark sensing
        MarkSensing = 'M',
        /// Detected during calibration
        Auto = 'A',
        /// Continuous, variable length
        ContinuousVariable = 'V',
    }
}

letter_enum! {
    /// Line color of graphic fields
    LineColor {
        Black = 'B',
        White = 'W',
    }
}

// ============================================================================
// FONTS
// ============================================================================

/// Inter-character gap of a font
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharGap {
    Dots(u16),
    Proportional,
}

/// Built-in font characteristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    pub default_height: u32,
    pub default_width: u32,
    pub charsets: &'static [&'static str],
    pub gap: CharGap,
    /// Baseline in dots; `None` means three quarters of the height
    pub baseline: Option<u32>,
}

impl FontMetrics {
    /// Baseline offset for a font drawn `height` dots tall.
    pub fn baseline(&self, height: u32) -> u32 {
        self.baseline.unwrap_or(3 * height / 4)
    }
}

const ULD: &[&str] = &["U", "L", "D"];

#[rustfmt::skip]
static FONTS: [(&str, Option<FontMetrics>); 17] = [
    ("A",  Some(FontMetrics { default_height: 9,  default_width: 5,  charsets: ULD,         gap: CharGap::Dots(1), baseline: Some(7) })),
    ("B",  Some(FontMetrics { default_height: 11, default_width: 7,  charsets: &["U"],      gap: CharGap::Dots(2), baseline: Some(11) })),
    ("C",  Some(FontMetrics { default_height: 18, default_width: 10, charsets: ULD,         gap: CharGap::Dots(2), baseline: Some(14) })),
    ("D",  Some(FontMetrics { default_height: 18, default_width: 10, charsets: ULD,         gap: CharGap::Dots(2), baseline: Some(14) })),
    ("E",  Some(FontMetrics { default_height: 28, default_width: 15, charsets: &["OCR-B"],  gap: CharGap::Dots(5), baseline: Some(23) })),
    ("F",  Some(FontMetrics { default_height: 26, default_width: 13, charsets: ULD,         gap: CharGap::Dots(3), baseline: Some(21) })),
    ("G",  Some(FontMetrics { default_height: 60, default_width: 40, charsets: ULD,         gap: CharGap::Dots(8), baseline: Some(48) })),
    ("H",  Some(FontMetrics { default_height: 21, default_width: 13, charsets: &["OCR-A"],  gap: CharGap::Dots(6), baseline: Some(21) })),
    ("O",  Some(FontMetrics { default_height: 15, default_width: 12, charsets: &[],         gap: CharGap::Proportional, baseline: None })),
    ("GS", Some(FontMetrics { default_height: 24, default_width: 24, charsets: &["SYMBOL"], gap: CharGap::Proportional, baseline: None })),
    ("P",  None),
    ("Q",  None),
    ("R",  None),
    ("S",  None),
    // 17×8 gives a nice bold effect
    ("T",  None),
    ("U",  None),
    ("V",  None),
];

/// Metrics of a known font code. `Ok(None)` for fonts without a table
/// entry (P to V).
pub fn font_metrics(code: &str) -> Result<Option<&'static FontMetrics>> {
    FONTS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, metrics)| metrics.as_ref())
        .ok_or_else(|| PrintStreamError::InvalidParameter(format!("invalid font {}", code)))
}

/// Font selection of a field: code, height and width in dots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFont {
    pub code: &'static str,
    pub height: u32,
    pub width: u32,
}

/// Resolve a font, filling missing sizes from the font table.
///
/// `font("D", Some(36), Some(20))` fits a 1.25" × 1" label.
pub fn font(code: &str, height: Option<u32>, width: Option<u32>) -> Result<FieldFont> {
    let (code, metrics) = FONTS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(c, metrics)| (*c, metrics.as_ref()))
        .ok_or_else(|| PrintStreamError::InvalidParameter(format!("invalid font {}", code)))?;

    let default = |pick: fn(&FontMetrics) -> u32, what: &str| {
        metrics.map(pick).ok_or_else(|| {
            PrintStreamError::InvalidParameter(format!(
                "cannot resolve default {} for font {}",
                what, code
            ))
        })
    };

    let height = match height {
        Some(h) => h,
        None => default(|m| m.default_height, "height")?,
    };
    let width = match width {
        Some(w) => w,
        None => default(|m| m.default_width, "width")?,
    };
    Ok(FieldFont {
        code,
        height,
        width,
    })
}

impl FromStr for FieldFont {
    type Err = PrintStreamError;

    /// Parse `"D"` or `"D,36,20"`.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(',').map(str::trim);
        let code = parts.next().unwrap_or_default();
        let mut size = |what: &str| -> Result<Option<u32>> {
            parts
                .next()
                .map(|v| {
                    v.parse::<u32>().map_err(|_| {
                        PrintStreamError::InvalidParameter(format!("invalid font {} {:?}", what, v))
                    })
                })
                .transpose()
        };
        let height = size("height")?;
        let width = size("width")?;
        font(code, height, width)
    }
}

// ============================================================================
// LABEL FORMAT
// ============================================================================

/// `^XA`: start a label format.
pub fn format_start(doc: &mut Document) {
    doc.write_line("^XA");
}

/// `^XZ`: end a label format and print it.
pub fn format_end(doc: &mut Document) {
    doc.write_line("^XZ");
}

/// `^PQ`: number of labels to print, without pausing between them.
pub fn print_quantity(doc: &mut Document, quantity: u32) {
    doc.write_line(&format!("^PQ{},0,0,Y", quantity));
}

/// `^MM`: action after printing. `prepeel` only matters for peel modes.
pub fn print_mode(doc: &mut Document, mode: PrintMode, prepeel: bool) {
    doc.write_line(&format!("^MM{},{}", mode, u8::from(prepeel)));
}

/// `^MN`: media type and black mark offset in dots.
pub fn media_tracking(doc: &mut Document, tracking: MediaTracking, offset: i32) {
    doc.write_line(&format!("^MN{},{}", tracking, offset));
}

/// `^LL`: label length in dots for continuous media. Must precede the
/// first field.
pub fn label_length(doc: &mut Document, dots: u32) -> Result<()> {
    if !(1..=MAX_LABEL_LENGTH).contains(&dots) {
        return Err(PrintStreamError::InvalidParameter(format!(
            "label length must be 1..={} dots, got {}",
            MAX_LABEL_LENGTH, dots
        )));
    }
    doc.write_line(&format!("^LL{}", dots));
    Ok(())
}

/// `^LL` from a length in millimetres.
pub fn label_length_mm(doc: &mut Document, mm: f32, resolution: f32) -> Result<()> {
    label_length(doc, mm_to_dots(mm, resolution))
}

/// `^LH`: label home, the origin on pre-printed labels.
pub fn label_home(doc: &mut Document, x_mm: f32, y_mm: f32, resolution: f32) {
    doc.write_line(&format!(
        "^LH{},{}",
        mm_to_dots(x_mm, resolution),
        mm_to_dots(y_mm, resolution)
    ));
}

// ============================================================================
// FIELDS
// ============================================================================

/// `^FO`: field origin. Stays on the current line.
pub fn field_origin(doc: &mut Document, x: u32, y: u32) {
    doc.write(&format!("^FO{},{}", x, y));
}

/// `^A`: field font, normal orientation. Stays on the current line.
pub fn field_font(doc: &mut Document, font: &FieldFont) {
    doc.write(&format!("^A{}N,{},{}", font.code, font.height, font.width));
}

/// `^FD`: field data.
pub fn field_data(doc: &mut Document, data: &str) {
    doc.write_line(&format!("^FD{}", data));
}

/// `^FS`: closes every field opened by [`field_origin`].
pub fn field_separator(doc: &mut Document) {
    doc.write_line("^FS");
}

/// Origin, optional font, data and separator in one call.
///
/// ```
/// use printstream::document::Document;
/// use printstream::protocol::zpl;
///
/// let mut doc = Document::zpl();
/// let font = zpl::font("D", Some(36), Some(20))?;
/// zpl::field(&mut doc, (50, 50), Some(&font), "Hello");
/// assert_eq!(doc.to_bytes()?, b"^FO50,50^ADN,36,20^FDHello\n^FS\n");
/// # Ok::<(), printstream::PrintStreamError>(())
/// ```
pub fn field(doc: &mut Document, origin: (u32, u32), font: Option<&FieldFont>, data: &str) {
    field_origin(doc, origin.0, origin.1);
    if let Some(font) = font {
        field_font(doc, font);
    }
    field_data(doc, data);
    field_separator(doc);
}

fn yes_no(flag: bool) -> char {
    if flag { 'Y' } else { 'N' }
}

/// `^B3`: Code 39 barcode field. Data follows in [`field_data`].
pub fn field_barcode39(
    doc: &mut Document,
    orientation: Orientation,
    mod43_check: bool,
    height: u32,
    interpretation_line: bool,
    interpretation_above: bool,
) {
    doc.write(&format!(
        "^B3{},{},{},{},{}",
        orientation,
        yes_no(mod43_check),
        height,
        yes_no(interpretation_line),
        yes_no(interpretation_above)
    ));
}

/// `^BE`: EAN-13 barcode field. Data follows in [`field_data`].
pub fn field_ean13(
    doc: &mut Document,
    orientation: Orientation,
    height: u32,
    interpretation_line: bool,
    interpretation_above: bool,
) {
    doc.write(&format!(
        "^BE{},{},{},{}",
        orientation,
        height,
        yes_no(interpretation_line),
        yes_no(interpretation_above)
    ));
}

/// Complete Code 39 field with the human-readable line below.
pub fn barcode39(doc: &mut Document, origin: (u32, u32), data: &str, height: u32) {
    field_origin(doc, origin.0, origin.1);
    field_barcode39(doc, Orientation::Normal, false, height, true, false);
    field_data(doc, data);
    field_separator(doc);
}

/// Complete EAN-13 field. `ean` must be exactly 13 digits, see
/// [`crate::checksum::calculate_ean13`].
pub fn ean13(doc: &mut Document, origin: (u32, u32), ean: &str, height: u32) -> Result<()> {
    if ean.len() != 13 || !ean.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PrintStreamError::InvalidParameter(format!(
            "EAN-13 must be 13 digits, got {:?}",
            ean
        )));
    }
    field_origin(doc, origin.0, origin.1);
    field_ean13(doc, Orientation::Normal, height, true, false);
    field_data(doc, ean);
    field_separator(doc);
    Ok(())
}

// ============================================================================
// GRAPHICS
// ============================================================================

/// `^GB`: box, or a line when one side equals the thickness.
pub fn draw_box(
    doc: &mut Document,
    origin: (u32, u32),
    width: u32,
    height: u32,
    thickness: u32,
    color: LineColor,
) {
    field_origin(doc, origin.0, origin.1);
    doc.write_line(&format!("^GB{},{},{},{}", width, height, thickness, color));
    field_separator(doc);
}

/// `^GC`: circle of diameter `diameter` dots.
pub fn draw_circle(
    doc: &mut Document,
    origin: (u32, u32),
    diameter: u32,
    thickness: u32,
    color: LineColor,
) {
    field_origin(doc, origin.0, origin.1);
    doc.write_line(&format!("^GC{},{},{}", diameter, thickness, color));
    field_separator(doc);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ItemKind;
    use pretty_assertions::assert_eq;

    fn render(build: impl FnOnce(&mut Document)) -> String {
        let mut doc = Document::zpl();
        build(&mut doc);
        assert!(doc.items().iter().all(|i| i.kind() == ItemKind::Text));
        String::from_utf8(doc.to_bytes().unwrap()).unwrap()
    }

    #[test]
    fn test_format_frame() {
        let out = render(|d| {
            format_start(d);
            print_quantity(d, 3);
            format_end(d);
        });
        assert_eq!(out, "^XA\n^PQ3,0,0,Y\n^XZ\n");
    }

    #[test]
    fn test_media_setup() {
        let out = render(|d| {
            print_mode(d, PrintMode::TearOff, false);
            media_tracking(d, MediaTracking::Continuous, 0);
            label_length_mm(d, 25.0, DEFAULT_RESOLUTION).unwrap();
            label_home(d, 1.0, 2.0, DEFAULT_RESOLUTION);
        });
        assert_eq!(out, "^MMT,0\n^MNN,0\n^LL200\n^LH8,16\n");
    }

    #[test]
    fn test_label_length_bounds() {
        let mut doc = Document::zpl();
        assert!(label_length(&mut doc, 0).is_err());
        assert!(label_length(&mut doc, 32001).is_err());
        label_length(&mut doc, 32000).unwrap();
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_font_defaults() {
        assert_eq!(
            font("A", None, None).unwrap(),
            FieldFont {
                code: "A",
                height: 9,
                width: 5
            }
        );
        assert_eq!(font("GS", None, Some(30)).unwrap().height, 24);
        assert_eq!(font("T", Some(17), Some(8)).unwrap().width, 8);
        assert!(font("T", None, Some(8)).is_err());
        assert!(font("Z", Some(1), Some(1)).is_err());
    }

    #[test]
    fn test_font_metrics() {
        let o = font_metrics("O").unwrap().unwrap();
        assert_eq!(o.gap, CharGap::Proportional);
        assert_eq!(o.baseline(40), 30);
        assert_eq!(font_metrics("G").unwrap().unwrap().baseline(60), 48);
        assert!(font_metrics("P").unwrap().is_none());
    }

    #[test]
    fn test_font_from_str() {
        let font: FieldFont = "D,36,20".parse().unwrap();
        assert_eq!(font.height, 36);
        let font: FieldFont = "E".parse().unwrap();
        assert_eq!((font.height, font.width), (28, 15));
        assert!("D,tall".parse::<FieldFont>().is_err());
    }

    #[test]
    fn test_field_without_font() {
        let out = render(|d| field(d, (10, 20), None, "x"));
        assert_eq!(out, "^FO10,20^FDx\n^FS\n");
    }

    #[test]
    fn test_barcodes() {
        let out = render(|d| barcode39(d, (50, 50), "MCHP", DEFAULT_BARCODE_HEIGHT));
        assert_eq!(out, "^FO50,50^B3N,N,50,Y,N^FDMCHP\n^FS\n");

        let out = render(|d| ean13(d, (0, 0), "3232100005761", 80).unwrap());
        assert_eq!(out, "^FO0,0^BEN,80,Y,N^FD3232100005761\n^FS\n");
    }

    #[test]
    fn test_ean13_requires_thirteen_digits() {
        let mut doc = Document::zpl();
        assert!(ean13(&mut doc, (0, 0), "323210000576", 50).is_err());
        assert!(ean13(&mut doc, (0, 0), "323210000576X", 50).is_err());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_graphics() {
        let out = render(|d| {
            draw_box(d, (5, 5), 100, 50, 2, LineColor::Black);
            draw_circle(d, (10, 10), 40, 2, LineColor::White);
        });
        assert_eq!(
            out,
            "^FO5,5^GB100,50,2,B\n^FS\n^FO10,10^GC40,2,W\n^FS\n"
        );
    }

    #[test]
    fn test_letter_enums() {
        assert_eq!(Orientation::try_from('r').unwrap(), Orientation::Rotated);
        assert_eq!(PrintMode::Cutter.code(), 'C');
        assert!(MediaTracking::try_from('Q').is_err());
    }
}
