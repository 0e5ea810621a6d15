//! # Code Page 437 (PC-8)
//!
//! IBM PC character set, selected on HP printers with symbol set `10U`.
//! Carries the box-drawing characters used for framed text output.
//! ASCII (U+0000–U+007F) passes through unchanged.

/// Upper half of CP437, indexed by `byte - 0x80`.
#[rustfmt::skip]
const HIGH_HALF: [char; 128] = [
    // 0x80–0x8F: Accented uppercase/lowercase
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    // 0x90–0x9F: More accented, currency, ƒ
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    // 0xA0–0xAF: Spanish, fractions, punctuation
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    // 0xB0–0xBF: Shade blocks, box drawing
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    // 0xC0–0xCF
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    // 0xD0–0xDF: Box drawing, block elements
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    // 0xE0–0xEF: Greek letters and math
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    // 0xF0–0xFF: Math symbols, degree, non-breaking space
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{00A0}',
];

/// Map a Unicode character to its CP437 byte.
///
/// Returns `None` if the character has no CP437 representation.
pub fn encode_char(ch: char) -> Option<u8> {
    if (ch as u32) < 0x80 {
        return Some(ch as u8);
    }
    HIGH_HALF
        .iter()
        .position(|&c| c == ch)
        .map(|idx| 0x80 + idx as u8)
}
