//! # HP PCL Commands
//!
//! Helper vocabulary for HP LaserJet (PCL 5) documents. Every helper
//! appends one `ESC`-prefixed control item to a [`Document`].
//!
//! Helpers do not check the document family. The prefix is always `ESC`,
//! so PCL sequences can also be mixed into a stream built with another
//! family (e.g. a printer with PCL emulation). Build HP jobs with
//! [`Document::hp_pcl`] to get CR+LF line endings.
//!
//! ## Command Shape
//!
//! ```text
//! ESC ( s 3 B
//!  │  │ │ │ └── terminator (uppercase = last command of the group)
//!  │  │ │ └──── value
//!  │  │ └────── group character
//!  │  └──────── parameterized character
//!  └─────────── 0x1B
//! ```
//!
//! ## Units
//!
//! Cursor positions are PCL units: 300 per inch unless the job changes
//! the unit of measure.
//!
//! ## Reference
//!
//! PCL 5 Printer Language Technical Reference Manual, chapters 4 to 8 and 15.

use std::fmt;
use std::str::FromStr;

use crate::document::Document;
use crate::error::{PrintStreamError, Result};

/// PCL escape character
pub const ESC: char = '\x1b';

/// Pitch values (characters per inch) accepted by [`pitch`]
pub const PITCHES: [f32; 8] = [5.0, 9.0, 10.0, 12.0, 15.0, 16.0, 16.66, 20.0];

/// Raster resolutions (dpi) accepted by [`raster_set_resolution`]
pub const RASTER_RESOLUTIONS: [u16; 6] = [75, 100, 150, 200, 300, 600];

/// Default PCL units per inch
pub const UNITS_PER_INCH: u16 = 300;

/// Append `ESC` + `body` as a control item.
///
/// Always uses the PCL escape character, whatever the document family;
/// unlike [`Document::write_esc`] this never picks up `^` from a ZPL
/// document.
pub fn write_esc(doc: &mut Document, body: &str) {
    let mut seq = String::with_capacity(body.len() + 1);
    seq.push(ESC);
    seq.push_str(body);
    doc.write_control(seq);
}

/// # Printer Reset (ESC E)
///
/// Restores user defaults, prints any partial page and deletes temporary
/// fonts and macros. Start and end every job with it.
pub fn reset_printer(doc: &mut Document) {
    write_esc(doc, "E");
}

// ============================================================================
// PAGE CONTROL
// ============================================================================

/// Paper source values of `ESC&l#H`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaperSource {
    /// Eject the current page; source unchanged
    Current = 0,
    /// Printer-specific tray
    #[default]
    Tray = 1,
    ManualFeed = 2,
    ManualEnvelope = 3,
    LowerTray = 4,
    Optional = 5,
    EnvelopeFeeder = 6,
}

impl PaperSource {
    pub fn from_code(code: u8) -> Result<Self> {
        let source = match code {
            0 => PaperSource::Current,
            1 => PaperSource::Tray,
            2 => PaperSource::ManualFeed,
            3 => PaperSource::ManualEnvelope,
            4 => PaperSource::LowerTray,
            5 => PaperSource::Optional,
            6 => PaperSource::EnvelopeFeeder,
            other => {
                return Err(PrintStreamError::InvalidParameter(format!(
                    "paper source must be 0..=6, got {}",
                    other
                )));
            }
        };
        Ok(source)
    }

    pub fn description(&self) -> &'static str {
        match self {
            PaperSource::Current => "Print the current page",
            PaperSource::Tray => "Feed paper from a printer-specific tray",
            PaperSource::ManualFeed => "Feed paper from manual input",
            PaperSource::ManualEnvelope => "Feed envelope from manual input",
            PaperSource::LowerTray => "Feed paper from lower tray",
            PaperSource::Optional => "Feed from optional paper source",
            PaperSource::EnvelopeFeeder => "Feed envelope from optional envelope feeder",
        }
    }
}

/// # Paper Source (ESC & l # H)
///
/// Prints the current page, then moves the cursor to the top margin of
/// the next page fed from `source`.
pub fn paper_source(doc: &mut Document, source: PaperSource) {
    write_esc(doc, &format!("&l{}H", source as u8));
}

// ============================================================================
// FONT SELECTION
// ============================================================================

/// Symbol sets of `ESC(#`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolSet {
    /// ISO 69: French
    Iso69,
    /// ISO 8859-1 Latin 1 (ECMA-94)
    Iso8859_1,
    /// ISO 6: ASCII
    Ascii,
    Legal,
    Roman8,
    /// PC-8, the PC-437 box drawing set
    Pc8,
    /// PC-850 Multilingual
    #[default]
    Pc850,
    /// 3 of 9 barcode font
    Barcode39,
    /// Windows 3.1 Latin 1
    Ansi,
}

impl SymbolSet {
    /// PCL identifier of the set
    pub fn code(&self) -> &'static str {
        match self {
            SymbolSet::Iso69 => "1F",
            SymbolSet::Iso8859_1 => "0N",
            SymbolSet::Ascii => "0U",
            SymbolSet::Legal => "1U",
            SymbolSet::Roman8 => "8U",
            SymbolSet::Pc8 => "10U",
            SymbolSet::Pc850 => "12U",
            SymbolSet::Barcode39 => "0Y",
            SymbolSet::Ansi => "19U",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SymbolSet::Iso69 => "ISO-69",
            SymbolSet::Iso8859_1 => "ISO-8859-1",
            SymbolSet::Ascii => "ASCII",
            SymbolSet::Legal => "LEGAL",
            SymbolSet::Roman8 => "ROMAN-8",
            SymbolSet::Pc8 => "PC-8",
            SymbolSet::Pc850 => "PC-850",
            SymbolSet::Barcode39 => "BARCODE-3-9",
            SymbolSet::Ansi => "ANSI",
        }
    }
}

impl FromStr for SymbolSet {
    type Err = PrintStreamError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ISO-69" => Ok(SymbolSet::Iso69),
            "ISO-8859-1" => Ok(SymbolSet::Iso8859_1),
            "ASCII" => Ok(SymbolSet::Ascii),
            "LEGAL" => Ok(SymbolSet::Legal),
            "ROMAN-8" => Ok(SymbolSet::Roman8),
            "PC-8" | "PC-437" => Ok(SymbolSet::Pc8),
            "PC-850" => Ok(SymbolSet::Pc850),
            "BARCODE-3-9" => Ok(SymbolSet::Barcode39),
            "ANSI" => Ok(SymbolSet::Ansi),
            _ => Err(PrintStreamError::InvalidParameter(format!(
                "unknown symbol set {}",
                s
            ))),
        }
    }
}

impl fmt::Display for SymbolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// # Symbol Set (ESC ( #)
///
/// Selects the primary font symbol set. Unknown sets fall back to Roman-8
/// on the printer. PC-850 pairs with the `cp850` text codepage.
///
/// ## Example
///
/// ```
/// use printstream::document::Document;
/// use printstream::protocol::pcl::{self, SymbolSet};
///
/// let mut doc = Document::hp_pcl();
/// pcl::symbol_set(&mut doc, SymbolSet::Pc850);
/// assert_eq!(doc.to_bytes()?, b"\x1b(12U");
/// # Ok::<(), printstream::PrintStreamError>(())
/// ```
pub fn symbol_set(doc: &mut Document, set: SymbolSet) {
    write_esc(doc, &format!("({}", set.code()));
}

/// # Pitch (ESC ( s # H)
///
/// Character size in characters per inch. Must be one of [`PITCHES`];
/// 10 cpi gives 80 columns on a portrait page, 16.66 cpi gives 132.
pub fn pitch(doc: &mut Document, cpi: f32) -> Result<()> {
    if !PITCHES.iter().any(|p| (p - cpi).abs() < f32::EPSILON) {
        return Err(PrintStreamError::InvalidParameter(format!(
            "pitch must be one of {:?}, got {}",
            PITCHES, cpi
        )));
    }
    write_esc(doc, &format!("(s{}H", format_value(cpi, 2)));
    Ok(())
}

/// # Spacing (ESC ( s # P)
///
/// Fixed (`0`) or proportional (`1`) spacing of the primary font.
/// Proportional spacing only applies when the font supports it.
pub fn spacing(doc: &mut Document, fixed: bool) {
    write_esc(doc, if fixed { "(s0P" } else { "(s1P" });
}

/// Typefaces of `ESC(s#T`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Typeface {
    #[default]
    LinePrinter,
    Arial,
    AntiqueOlive,
    ItcAvantGarde,
    CgCenturySchoolbook,
    CgTimes,
    Univers,
}

impl Typeface {
    pub fn code(&self) -> u16 {
        match self {
            Typeface::LinePrinter => 0,
            Typeface::Arial => 16602,
            Typeface::AntiqueOlive => 4168,
            Typeface::ItcAvantGarde => 4127,
            Typeface::CgCenturySchoolbook => 4119,
            Typeface::CgTimes => 4101,
            Typeface::Univers => 4148,
        }
    }
}

impl FromStr for Typeface {
    type Err = PrintStreamError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Line Printer" => Ok(Typeface::LinePrinter),
            "Arial" => Ok(Typeface::Arial),
            "Antique Olive" => Ok(Typeface::AntiqueOlive),
            "ITC Avant Garde" => Ok(Typeface::ItcAvantGarde),
            "CG Century Schoolbook" => Ok(Typeface::CgCenturySchoolbook),
            "CG Times" => Ok(Typeface::CgTimes),
            "Univers" => Ok(Typeface::Univers),
            _ => Err(PrintStreamError::InvalidParameter(format!(
                "unknown typeface {}",
                s
            ))),
        }
    }
}

/// # Typeface Family (ESC ( s # T)
pub fn typeface(doc: &mut Document, face: Typeface) {
    write_esc(doc, &format!("(s{}T", face.code()));
}

/// # Character Height (ESC ( s # V)
///
/// Height in points (default 12). Ignored by fixed-spacing fonts, but
/// remembered for the next proportional one.
pub fn font_height(doc: &mut Document, points: f32) -> Result<()> {
    if !(points > 0.0 && points.is_finite()) {
        return Err(PrintStreamError::InvalidParameter(format!(
            "font height must be positive, got {}",
            points
        )));
    }
    write_esc(doc, &format!("(s{}V", format_value(points, 2)));
    Ok(())
}

/// Font styles of `ESC(s#S`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Upright = 0,
    Italic = 1,
    Condensed = 4,
    CondensedItalic = 5,
    /// Extra condensed
    Compressed = 8,
    Expanded = 24,
    Outline = 32,
    Inline = 64,
    Shadowed = 128,
    OutlineShadowed = 160,
}

impl FromStr for FontStyle {
    type Err = PrintStreamError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "upright" => Ok(FontStyle::Upright),
            "italic" => Ok(FontStyle::Italic),
            "condensed" => Ok(FontStyle::Condensed),
            "condensed-italic" => Ok(FontStyle::CondensedItalic),
            "compressed" => Ok(FontStyle::Compressed),
            "expanded" => Ok(FontStyle::Expanded),
            "outline" => Ok(FontStyle::Outline),
            "inline" => Ok(FontStyle::Inline),
            "shadowed" => Ok(FontStyle::Shadowed),
            "outline-shadowed" => Ok(FontStyle::OutlineShadowed),
            _ => Err(PrintStreamError::InvalidParameter(format!(
                "unknown font style {}",
                s
            ))),
        }
    }
}

/// # Style (ESC ( s # S)
///
/// Posture, width and structure of the primary font.
pub fn style(doc: &mut Document, style: FontStyle) {
    write_esc(doc, &format!("(s{}S", style as u8));
}

/// Stroke weight of `ESC(s#B`, from ultra thin (-7) to ultra black (7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StrokeWeight(i8);

impl StrokeWeight {
    pub const ULTRA_THIN: Self = Self(-7);
    pub const EXTRA_THIN: Self = Self(-6);
    pub const THIN: Self = Self(-5);
    pub const EXTRA_LIGHT: Self = Self(-4);
    pub const LIGHT: Self = Self(-3);
    pub const DEMI_LIGHT: Self = Self(-2);
    pub const SEMI_LIGHT: Self = Self(-1);
    /// Medium, book
    pub const TEXT: Self = Self(0);
    pub const SEMI_BOLD: Self = Self(1);
    pub const DEMI_BOLD: Self = Self(2);
    pub const BOLD: Self = Self(3);
    pub const EXTRA_BOLD: Self = Self(4);
    pub const BLACK: Self = Self(5);
    pub const EXTRA_BLACK: Self = Self(6);
    pub const ULTRA_BLACK: Self = Self(7);

    const NAMES: [(&'static str, StrokeWeight); 15] = [
        ("ultra-thin", Self::ULTRA_THIN),
        ("extra-thin", Self::EXTRA_THIN),
        ("thin", Self::THIN),
        ("extra-light", Self::EXTRA_LIGHT),
        ("light", Self::LIGHT),
        ("demi-light", Self::DEMI_LIGHT),
        ("semi-light", Self::SEMI_LIGHT),
        ("text", Self::TEXT),
        ("semi-bold", Self::SEMI_BOLD),
        ("demi-bold", Self::DEMI_BOLD),
        ("bold", Self::BOLD),
        ("extra-bold", Self::EXTRA_BOLD),
        ("black", Self::BLACK),
        ("extra-black", Self::EXTRA_BLACK),
        ("ultra-black", Self::ULTRA_BLACK),
    ];

    pub fn new(weight: i8) -> Result<Self> {
        if !(-7..=7).contains(&weight) {
            return Err(PrintStreamError::InvalidParameter(format!(
                "stroke weight must be -7..=7, got {}",
                weight
            )));
        }
        Ok(Self(weight))
    }

    pub fn value(&self) -> i8 {
        self.0
    }
}

impl Default for StrokeWeight {
    fn default() -> Self {
        Self::TEXT
    }
}

impl FromStr for StrokeWeight {
    type Err = PrintStreamError;

    fn from_str(s: &str) -> Result<Self> {
        Self::NAMES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, weight)| *weight)
            .ok_or_else(|| {
                PrintStreamError::InvalidParameter(format!("unknown stroke weight {}", s))
            })
    }
}

/// # Stroke Weight (ESC ( s # B)
///
/// Thickness of the strokes composing the characters.
pub fn stroke_weight(doc: &mut Document, weight: StrokeWeight) {
    write_esc(doc, &format!("(s{}B", weight.value()));
}

/// Switch between bold and text weight.
pub fn bold(doc: &mut Document, on: bool) {
    stroke_weight(
        doc,
        if on {
            StrokeWeight::BOLD
        } else {
            StrokeWeight::TEXT
        },
    );
}

// ============================================================================
// LINE SPACING AND CURSOR
// ============================================================================

/// # Horizontal Motion Index (ESC & k # H)
///
/// Column width in 1/120 inch increments; `0` disables horizontal motion.
pub fn horizontal_motion_index(doc: &mut Document, increment: u16) {
    write_esc(doc, &format!("&k{}H", increment));
}

/// # Vertical Motion Index (ESC & l # D)
///
/// Line height in 1/48 inch increments. The factory setting 8 gives six
/// lines per inch; 7.27 fits 66 lines on a portrait page with half-inch
/// margins.
///
/// ## Example
///
/// ```
/// use printstream::document::Document;
/// use printstream::protocol::pcl;
///
/// let mut doc = Document::hp_pcl();
/// pcl::vertical_motion_index(&mut doc, 7.27)?;
/// assert_eq!(doc.to_bytes()?, b"\x1b&l7.2700D");
/// # Ok::<(), printstream::PrintStreamError>(())
/// ```
pub fn vertical_motion_index(doc: &mut Document, increment: f32) -> Result<()> {
    if !(increment >= 0.0 && increment.is_finite()) {
        return Err(PrintStreamError::InvalidParameter(format!(
            "vertical motion index must be >= 0, got {}",
            increment
        )));
    }
    write_esc(doc, &format!("&l{}D", format_value(increment, 4)));
    Ok(())
}

/// # Cursor Position (ESC * p # x # Y)
///
/// Move to an absolute position in PCL units ([`UNITS_PER_INCH`]).
pub fn cursor_move(doc: &mut Document, x: u32, y: u32) {
    write_esc(doc, &format!("*p{}x{}Y", x, y));
}

// ============================================================================
// RASTER GRAPHICS
// ============================================================================

/// # Start Raster Graphics (ESC * r # A)
///
/// `at_cursor = true` starts the image at the current cursor column,
/// `false` at the left edge of the logical page.
pub fn raster_start_graphic(doc: &mut Document, at_cursor: bool) {
    write_esc(doc, if at_cursor { "*r1A" } else { "*r0A" });
}

/// # End Raster Graphics (ESC * r C)
pub fn raster_end_graphic(doc: &mut Document) {
    write_esc(doc, "*rC");
}

/// # Raster Presentation Mode (ESC * r 0 F)
///
/// Only the default mode is emitted: raster follows the orientation of
/// the logical page.
pub fn raster_presentation_mode(doc: &mut Document) {
    write_esc(doc, "*r0F");
}

/// # Raster Resolution (ESC * t # R)
///
/// Must be one of [`RASTER_RESOLUTIONS`].
pub fn raster_set_resolution(doc: &mut Document, dpi: u16) -> Result<()> {
    if !RASTER_RESOLUTIONS.contains(&dpi) {
        return Err(PrintStreamError::InvalidParameter(format!(
            "raster resolution must be one of {:?}, got {}",
            RASTER_RESOLUTIONS, dpi
        )));
    }
    write_esc(doc, &format!("*t{}R", dpi));
    Ok(())
}

/// Integral values print without decimals, others with `decimals` places.
fn format_value(value: f32, decimals: usize) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.*}", decimals, value)
    }
}
