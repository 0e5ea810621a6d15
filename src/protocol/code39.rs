//! # Code 39 Barcodes (HP PCL)
//!
//! Draws 3-of-9 barcodes with PCL rectangle fills, so no barcode font
//! cartridge is needed. Each character is nine elements, three of them
//! wide:
//!
//! ```text
//! '1' = wb ns nb ws nb ns nb ns wb
//!        █  ░ ▌ ░░ ▌ ░ ▌ ░ █
//! ```
//!
//! ## Element Tokens
//!
//! | Token | PCL | Effect |
//! |-------|-----|--------|
//! | narrow bar | `ESC*c03a50b0P ESC*p+03X` | fill 3×50 dots, advance 3 |
//! | wide bar | `ESC*c07a50b0P ESC*p+07X` | fill 7×50 dots, advance 7 |
//! | narrow space | `ESC*p+03X` | advance 3 |
//! | wide space | `ESC*p+07X` | advance 7 |
//!
//! Sizes shown for 300 dpi and height 1. The bar height is one text line
//! (50 dots at 6 lpi) times the height multiplier.
//!
//! ## Framing
//!
//! The cursor is raised one line before the first bar and lowered again
//! after the last one. Every element token is followed by a narrow space,
//! and the message is wrapped in the `*` start/stop character.

use tracing::debug;

use super::pcl::ESC;
use crate::document::Document;
use crate::error::{PrintStreamError, Result};

/// Lines per inch used to size bar height
const LINES_PER_INCH: u16 = 6;

/// Wide element width relative to a narrow one
const WIDE_RATIO: f32 = 2.25;

/// One element of a Code 39 character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    NarrowBar,
    WideBar,
    NarrowSpace,
    WideSpace,
}

use Element::{NarrowBar as NB, NarrowSpace as NS, WideBar as WB, WideSpace as WS};

/// The 43-symbol alphabet with its element patterns.
#[rustfmt::skip]
static PATTERNS: [(char, [Element; 9]); 44] = [
    ('1', [WB, NS, NB, WS, NB, NS, NB, NS, WB]),
    ('2', [NB, NS, WB, WS, NB, NS, NB, NS, WB]),
    ('3', [WB, NS, WB, WS, NB, NS, NB, NS, NB]),
    ('4', [NB, NS, NB, WS, WB, NS, NB, NS, WB]),
    ('5', [WB, NS, NB, WS, WB, NS, NB, NS, NB]),
    ('6', [NB, NS, WB, WS, WB, NS, NB, NS, NB]),
    ('7', [NB, NS, NB, WS, NB, NS, WB, NS, WB]),
    ('8', [WB, NS, NB, WS, NB, NS, WB, NS, NB]),
    ('9', [NB, NS, WB, WS, NB, NS, WB, NS, NB]),
    ('0', [NB, NS, NB, WS, WB, NS, WB, NS, NB]),
    ('A', [WB, NS, NB, NS, NB, WS, NB, NS, WB]),
    ('B', [NB, NS, WB, NS, NB, WS, NB, NS, WB]),
    ('C', [WB, NS, WB, NS, NB, WS, NB, NS, NB]),
    ('D', [NB, NS, NB, NS, WB, WS, NB, NS, WB]),
    ('E', [WB, NS, NB, NS, WB, WS, NB, NS, NB]),
    ('F', [NB, NS, WB, NS, WB, WS, NB, NS, NB]),
    ('G', [NB, NS, NB, NS, NB, WS, WB, NS, WB]),
    ('H', [WB, NS, NB, NS, NB, WS, WB, NS, NB]),
    ('I', [NB, NS, WB, NS, NB, WS, WB, NS, NB]),
    ('J', [NB, NS, NB, NS, WB, WS, WB, NS, NB]),
    ('K', [WB, NS, NB, NS, NB, NS, NB, WS, WB]),
    ('L', [NB, NS, WB, NS, NB, NS, NB, WS, WB]),
    ('M', [WB, NS, WB, NS, NB, NS, NB, WS, NB]),
    ('N', [NB, NS, NB, NS, WB, NS, NB, WS, WB]),
    ('O', [WB, NS, NB, NS, WB, NS, NB, WS, NB]),
    ('P', [NB, NS, WB, NS, WB, NS, NB, WS, NB]),
    ('Q', [NB, NS, NB, NS, NB, NS, WB, WS, WB]),
    ('R', [WB, NS, NB, NS, NB, NS, WB, WS, NB]),
    ('S', [NB, NS, WB, NS, NB, NS, WB, WS, NB]),
    ('T', [NB, NS, NB, NS, WB, NS, WB, WS, NB]),
    ('U', [WB, WS, NB, NS, NB, NS, NB, NS, WB]),
    ('V', [NB, WS, WB, NS, NB, NS, NB, NS, WB]),
    ('W', [WB, WS, WB, NS, NB, NS, NB, NS, NB]),
    ('X', [NB, WS, NB, NS, WB, NS, NB, NS, WB]),
    ('Y', [WB, WS, NB, NS, WB, NS, NB, NS, NB]),
    ('Z', [NB, WS, WB, NS, WB, NS, NB, NS, NB]),
    ('-', [NB, WS, NB, NS, NB, NS, WB, NS, WB]),
    ('.', [WB, WS, NB, NS, NB, NS, WB, NS, NB]),
    (' ', [NB, WS, WB, NS, NB, NS, WB, NS, NB]),
    ('*', [NB, WS, NB, NS, WB, NS, WB, NS, NB]),
    ('$', [NB, WS, NB, WS, NB, WS, NB, NS, NB]),
    ('/', [NB, WS, NB, WS, NB, NS, NB, WS, NB]),
    ('+', [NB, WS, NB, NS, NB, WS, NB, WS, NB]),
    ('%', [NB, NS, NB, WS, NB, WS, NB, WS, NB]),
];

/// Element pattern of a supported character.
pub fn pattern(ch: char) -> Option<&'static [Element; 9]> {
    PATTERNS
        .iter()
        .find(|(c, _)| *c == ch)
        .map(|(_, elements)| elements)
}

pub fn is_supported(ch: char) -> bool {
    pattern(ch).is_some()
}

fn check_supported(code: &str) -> Result<()> {
    match code.chars().find(|c| !is_supported(*c)) {
        Some(ch) => Err(PrintStreamError::UnsupportedCharacter {
            ch,
            context: "Code 39 (0-9, A-Z, space, - . $ / + % *)",
        }),
        None => Ok(()),
    }
}

/// Precomputed PCL bytes for each element at a fixed geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Tokens {
    narrow_bar: Vec<u8>,
    wide_bar: Vec<u8>,
    narrow_space: Vec<u8>,
    wide_space: Vec<u8>,
    start: Vec<u8>,
    end: Vec<u8>,
}

impl Tokens {
    fn new(units_per_inch: u16, height: u8) -> Self {
        let dots_per_line = u32::from(units_per_inch / LINES_PER_INCH);
        let narrow = u32::from((units_per_inch / 100).max(1));
        let wide = (narrow as f32 * WIDE_RATIO).round() as u32;
        let bar_height = u32::from(height) * dots_per_line;

        let bar = |width: u32| {
            format!(
                "{ESC}*c{:02}a{}b0P{ESC}*p+{:02}X",
                width, bar_height, width
            )
            .into_bytes()
        };
        let space = |width: u32| format!("{ESC}*p+{:02}X", width).into_bytes();

        Self {
            narrow_bar: bar(narrow),
            wide_bar: bar(wide),
            narrow_space: space(narrow),
            wide_space: space(wide),
            start: format!("{ESC}*p-{}Y", dots_per_line).into_bytes(),
            end: format!("{ESC}*p+{}Y", dots_per_line).into_bytes(),
        }
    }

    fn get(&self, element: Element) -> &[u8] {
        match element {
            Element::NarrowBar => &self.narrow_bar,
            Element::WideBar => &self.wide_bar,
            Element::NarrowSpace => &self.narrow_space,
            Element::WideSpace => &self.wide_space,
        }
    }
}

/// # Code 39 Encoder
///
/// Bound to one HP PCL document; the element tokens are sized from that
/// document's resolution when the encoder is created.
///
/// ## Example
///
/// ```
/// use printstream::document::Document;
/// use printstream::protocol::code39::Barcode39;
///
/// let mut doc = Document::hp_pcl();
/// let mut barcode = Barcode39::new(&mut doc, 1)?;
/// barcode.write("MCHP00189")?;
/// let caption = barcode.barcode_message("MCHP00189")?;
/// barcode.document().write_line(&caption);
/// # Ok::<(), printstream::PrintStreamError>(())
/// ```
#[derive(Debug)]
pub struct Barcode39<'a> {
    owner: &'a mut Document,
    height: u8,
    tokens: Tokens,
}

impl<'a> Barcode39<'a> {
    /// Bind an encoder to `owner`. `height` multiplies the bar height and
    /// must be 1 or 2.
    pub fn new(owner: &'a mut Document, height: u8) -> Result<Self> {
        if owner.family().escape_prefix != ESC {
            return Err(PrintStreamError::InvalidParameter(format!(
                "Code 39 rendering needs an HP PCL document, not {}",
                owner.family().name
            )));
        }
        if !matches!(height, 1 | 2) {
            return Err(PrintStreamError::InvalidParameter(format!(
                "barcode height must be 1 or 2, got {}",
                height
            )));
        }
        let tokens = Tokens::new(owner.family().units_per_inch, height);
        Ok(Self {
            owner,
            height,
            tokens,
        })
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// The owning document, to keep writing around the barcode.
    pub fn document(&mut self) -> &mut Document {
        self.owner
    }

    /// Element tokens of one character.
    pub fn char_to_sequence(&self, ch: char) -> Result<Vec<&[u8]>> {
        let elements = pattern(ch).ok_or(PrintStreamError::UnsupportedCharacter {
            ch,
            context: "Code 39 (0-9, A-Z, space, - . $ / + % *)",
        })?;
        Ok(elements.iter().map(|e| self.tokens.get(*e)).collect())
    }

    /// Element tokens of `*code*`, with surrounding whitespace trimmed.
    ///
    /// Every character is checked before any token is produced.
    pub fn code_to_sequences(&self, code: &str) -> Result<Vec<&[u8]>> {
        let message = self.barcode_message(code)?;
        let mut tokens = Vec::with_capacity(message.len() * 9);
        for ch in message.chars() {
            tokens.extend(self.char_to_sequence(ch)?);
        }
        Ok(tokens)
    }

    /// Append the barcode for `code` to the owning document.
    ///
    /// Nothing is appended when `code` holds an unsupported character.
    pub fn write(&mut self, code: &str) -> Result<()> {
        let sequences: Vec<Vec<u8>> = self
            .code_to_sequences(code)?
            .into_iter()
            .map(<[u8]>::to_vec)
            .collect();

        self.owner.write_bytes(self.tokens.start.clone());
        for token in sequences {
            self.owner.write_bytes(token);
            self.owner.write_bytes(self.tokens.narrow_space.clone());
        }
        self.owner.write_bytes(self.tokens.end.clone());

        debug!(code = code.trim(), height = self.height, "Code 39 barcode appended");
        Ok(())
    }

    /// Caption printed under a barcode: `*CODE*`.
    pub fn barcode_message(&self, code: &str) -> Result<String> {
        let code = code.trim();
        check_supported(code)?;
        Ok(format!("*{}*", code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ContentItem, ItemKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_alphabet_size() {
        // 43 data symbols plus the start/stop character
        assert_eq!(PATTERNS.len(), 44);
        for (ch, elements) in PATTERNS.iter() {
            let wide = elements
                .iter()
                .filter(|e| matches!(e, Element::WideBar | Element::WideSpace))
                .count();
            assert_eq!(wide, 3, "{:?} must have three wide elements", ch);
        }
    }

    #[test]
    fn test_tokens_at_300_dpi() {
        let tokens = Tokens::new(300, 1);
        assert_eq!(tokens.narrow_bar, b"\x1b*c03a50b0P\x1b*p+03X".to_vec());
        assert_eq!(tokens.wide_bar, b"\x1b*c07a50b0P\x1b*p+07X".to_vec());
        assert_eq!(tokens.narrow_space, b"\x1b*p+03X".to_vec());
        assert_eq!(tokens.wide_space, b"\x1b*p+07X".to_vec());
        assert_eq!(tokens.start, b"\x1b*p-50Y".to_vec());
        assert_eq!(tokens.end, b"\x1b*p+50Y".to_vec());
    }

    #[test]
    fn test_double_height() {
        let tokens = Tokens::new(300, 2);
        assert_eq!(tokens.narrow_bar, b"\x1b*c03a100b0P\x1b*p+03X".to_vec());
    }

    #[test]
    fn test_height_validation() {
        let mut doc = Document::hp_pcl();
        assert!(matches!(
            Barcode39::new(&mut doc, 3),
            Err(PrintStreamError::InvalidParameter(_))
        ));
        let mut zpl = Document::zpl();
        assert!(Barcode39::new(&mut zpl, 1).is_err());
    }

    #[test]
    fn test_char_to_sequence() {
        let mut doc = Document::hp_pcl();
        let barcode = Barcode39::new(&mut doc, 1).unwrap();
        let seq = barcode.char_to_sequence('1').unwrap();
        assert_eq!(seq.len(), 9);
        assert_eq!(seq[0], b"\x1b*c07a50b0P\x1b*p+07X");
        assert_eq!(seq[1], b"\x1b*p+03X");
        assert_eq!(seq[3], b"\x1b*p+07X");

        assert!(matches!(
            barcode.char_to_sequence('a'),
            Err(PrintStreamError::UnsupportedCharacter { ch: 'a', .. })
        ));
    }

    #[test]
    fn test_code_to_sequences_wraps_message() {
        let mut doc = Document::hp_pcl();
        let barcode = Barcode39::new(&mut doc, 1).unwrap();
        let seq = barcode.code_to_sequences("  A1 ").unwrap();
        // *, A, 1, *
        assert_eq!(seq.len(), 4 * 9);
        assert_eq!(seq[..9].to_vec(), barcode.char_to_sequence('*').unwrap());
    }

    #[test]
    fn test_write_frames_and_spaces() {
        let mut doc = Document::hp_pcl();
        let mut barcode = Barcode39::new(&mut doc, 1).unwrap();
        barcode.write("0").unwrap();

        // start + 3 chars × 9 elements × (token + narrow space) + end
        assert_eq!(doc.len(), 1 + 3 * 9 * 2 + 1);
        assert!(doc.items().iter().all(|i| i.kind() == ItemKind::Binary));
        assert_eq!(doc.items()[0], ContentItem::binary(b"\x1b*p-50Y".to_vec()));
        assert_eq!(doc.items()[2], ContentItem::binary(b"\x1b*p+03X".to_vec()));
        assert_eq!(
            doc.items().last(),
            Some(&ContentItem::binary(b"\x1b*p+50Y".to_vec()))
        );
    }

    #[test]
    fn test_invalid_code_writes_nothing() {
        let mut doc = Document::hp_pcl();
        let mut barcode = Barcode39::new(&mut doc, 1).unwrap();
        assert!(barcode.write("MCHP-é").is_err());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_barcode_message() {
        let mut doc = Document::hp_pcl();
        let barcode = Barcode39::new(&mut doc, 1).unwrap();
        assert_eq!(barcode.barcode_message(" MCHP00189 ").unwrap(), "*MCHP00189*");
        assert!(barcode.barcode_message("mchp").is_err());
    }
}
