//! # Code Page 850 (PC-850 Multilingual)
//!
//! Western European DOS code page, selected on HP printers with symbol set
//! `12U`. It trades most of CP437's Greek letters and double-line box
//! pieces for the accented capitals French and Portuguese text needs.

/// Upper half of CP850, indexed by `byte - 0x80`.
#[rustfmt::skip]
const HIGH_HALF: [char; 128] = [
    // 0x80–0x8F
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    // 0x90–0x9F
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', 'ø', '£', 'Ø', '×', 'ƒ',
    // 0xA0–0xAF
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '®', '¬', '½', '¼', '¡', '«', '»',
    // 0xB0–0xBF
    '░', '▒', '▓', '│', '┤', 'Á', 'Â', 'À', '©', '╣', '║', '╗', '╝', '¢', '¥', '┐',
    // 0xC0–0xCF
    '└', '┴', '┬', '├', '─', '┼', 'ã', 'Ã', '╚', '╔', '╩', '╦', '╠', '═', '╬', '¤',
    // 0xD0–0xDF
    'ð', 'Ð', 'Ê', 'Ë', 'È', 'ı', 'Í', 'Î', 'Ï', '┘', '┌', '█', '▄', '¦', 'Ì', '▀',
    // 0xE0–0xEF
    'Ó', 'ß', 'Ô', 'Ò', 'õ', 'Õ', 'µ', 'þ', 'Þ', 'Ú', 'Û', 'Ù', 'ý', 'Ý', '¯', '´',
    // 0xF0–0xFF: soft hyphen first, non-breaking space last
    '\u{00AD}', '±', '‗', '¾', '¶', '§', '÷', '¸', '°', '¨', '·', '¹', '³', '²', '■', '\u{00A0}',
];

/// Map a Unicode character to its CP850 byte.
pub fn encode_char(ch: char) -> Option<u8> {
    if (ch as u32) < 0x80 {
        return Some(ch as u8);
    }
    HIGH_HALF
        .iter()
        .position(|&c| c == ch)
        .map(|idx| 0x80 + idx as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_french_accents() {
        assert_eq!(encode_char('é'), Some(0x82));
        assert_eq!(encode_char('è'), Some(0x8A));
        assert_eq!(encode_char('à'), Some(0x85));
        assert_eq!(encode_char('ç'), Some(0x87));
        assert_eq!(encode_char('É'), Some(0x90));
        assert_eq!(encode_char('È'), Some(0xD4));
        assert_eq!(encode_char('Ê'), Some(0xD2));
    }

    #[test]
    fn test_differs_from_cp437() {
        // 0x9B is ¢ in CP437 but ø in CP850
        assert_eq!(encode_char('ø'), Some(0x9B));
        assert_eq!(encode_char('¢'), Some(0xBD));
        assert_eq!(encode_char('π'), None);
    }

    #[test]
    fn test_single_box_drawing_kept() {
        assert_eq!(encode_char('┌'), Some(0xDA));
        assert_eq!(encode_char('─'), Some(0xC4));
        assert_eq!(encode_char('═'), Some(0xCD));
    }

    #[test]
    fn test_table_has_no_duplicates() {
        for (i, a) in HIGH_HALF.iter().enumerate() {
            for b in &HIGH_HALF[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
