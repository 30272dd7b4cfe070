//! # Code Page Encoding
//!
//! Converts Unicode text to the single-byte code page the printer is told
//! to use with `ESC t n`.
//!
//! ASCII (U+0000–U+007F) passes through unchanged. The upper half covers
//! the Latin letters and punctuation that show up on Spanish-language
//! receipts. Characters outside the selected table are folded to their
//! unaccented base letter when one exists (`Á` → `A` on PC437), otherwise
//! replaced with `?`.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Character code tables supported by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodePage {
    /// PC437 (USA, Standard Europe). Lowercase Spanish accents only.
    Pc437,
    /// PC850 (Multilingual). Adds the uppercase accented vowels.
    #[default]
    Pc850,
}

impl CodePage {
    /// The `n` parameter for `ESC t n`.
    pub fn table_number(self) -> u8 {
        match self {
            CodePage::Pc437 => 0,
            CodePage::Pc850 => 2,
        }
    }
}

/// Encode a Unicode string for the given code page.
pub fn encode(s: &str, page: CodePage) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for ch in s.chars() {
        if (ch as u32) < 0x80 {
            out.push(ch as u8);
        } else if let Some(byte) = lookup(ch, page) {
            out.push(byte);
        } else if let Some(base) = fold_diacritic(ch) {
            out.push(base as u8);
        } else {
            warn!(
                character = %ch,
                codepoint = %format!("U+{:04X}", ch as u32),
                ?page,
                "unmapped character, replacing with '?'"
            );
            out.push(b'?');
        }
    }
    out
}

fn lookup(ch: char, page: CodePage) -> Option<u8> {
    shared_upper_half(ch).or_else(|| match page {
        CodePage::Pc437 => pc437_only(ch),
        CodePage::Pc850 => pc850_only(ch),
    })
}

/// Positions that are identical in PC437 and PC850.
fn shared_upper_half(ch: char) -> Option<u8> {
    let byte = match ch {
        'Ç' => 0x80,
        'ü' => 0x81,
        'é' => 0x82,
        'â' => 0x83,
        'ä' => 0x84,
        'à' => 0x85,
        'å' => 0x86,
        'ç' => 0x87,
        'ê' => 0x88,
        'ë' => 0x89,
        'è' => 0x8A,
        'ï' => 0x8B,
        'î' => 0x8C,
        'ì' => 0x8D,
        'Ä' => 0x8E,
        'Å' => 0x8F,
        'É' => 0x90,
        'æ' => 0x91,
        'Æ' => 0x92,
        'ô' => 0x93,
        'ö' => 0x94,
        'ò' => 0x95,
        'û' => 0x96,
        'ù' => 0x97,
        'ÿ' => 0x98,
        'Ö' => 0x99,
        'Ü' => 0x9A,
        '£' => 0x9C,
        'á' => 0xA0,
        'í' => 0xA1,
        'ó' => 0xA2,
        'ú' => 0xA3,
        'ñ' => 0xA4,
        'Ñ' => 0xA5,
        'ª' => 0xA6,
        'º' => 0xA7,
        '¿' => 0xA8,
        '¬' => 0xAA,
        '½' => 0xAB,
        '¼' => 0xAC,
        '¡' => 0xAD,
        '«' => 0xAE,
        '»' => 0xAF,
        '±' => 0xF1,
        '÷' => 0xF6,
        '°' => 0xF8,
        '·' => 0xFA,
        '²' => 0xFD,
        _ => return None,
    };
    Some(byte)
}

fn pc437_only(ch: char) -> Option<u8> {
    let byte = match ch {
        '¢' => 0x9B,
        '¥' => 0x9D,
        'ß' => 0xE1,
        'µ' => 0xE6,
        _ => return None,
    };
    Some(byte)
}

fn pc850_only(ch: char) -> Option<u8> {
    let byte = match ch {
        'ø' => 0x9B,
        'Ø' => 0x9D,
        '×' => 0x9E,
        '®' => 0xA9,
        'Á' => 0xB5,
        'Â' => 0xB6,
        'À' => 0xB7,
        '©' => 0xB8,
        '¢' => 0xBD,
        '¥' => 0xBE,
        'ã' => 0xC6,
        'Ã' => 0xC7,
        'Ê' => 0xD2,
        'Ë' => 0xD3,
        'È' => 0xD4,
        'Í' => 0xD6,
        'Î' => 0xD7,
        'Ï' => 0xD8,
        'Ì' => 0xDE,
        'Ó' => 0xE0,
        'ß' => 0xE1,
        'Ô' => 0xE2,
        'Ò' => 0xE3,
        'õ' => 0xE4,
        'Õ' => 0xE5,
        'µ' => 0xE6,
        'Ú' => 0xE9,
        'Û' => 0xEA,
        'Ù' => 0xEB,
        _ => return None,
    };
    Some(byte)
}

/// Strip the accent from a Latin letter.
fn fold_diacritic(ch: char) -> Option<char> {
    let base = match ch {
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => 'O',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ñ' => 'N',
        'ñ' => 'n',
        'Ç' => 'C',
        'ç' => 'c',
        '\u{2013}' | '\u{2014}' => '-',
        '\u{2018}' | '\u{2019}' => '\'',
        '\u{201C}' | '\u{201D}' => '"',
        '\u{00A0}' => ' ',
        _ => return None,
    };
    Some(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(encode("Total $30.000", CodePage::Pc850), b"Total $30.000");
    }

    #[test]
    fn test_spanish_lowercase_same_in_both_pages() {
        for page in [CodePage::Pc437, CodePage::Pc850] {
            assert_eq!(encode("ñandú", page), vec![0xA4, b'a', b'n', b'd', 0xA3]);
        }
    }

    #[test]
    fn test_uppercase_accent_pc850() {
        assert_eq!(encode("CAFÉ Ó", CodePage::Pc850), vec![b'C', b'A', b'F', 0x90, b' ', 0xE0]);
    }

    #[test]
    fn test_uppercase_accent_folds_on_pc437() {
        assert_eq!(encode("Ó", CodePage::Pc437), b"O");
        assert_eq!(encode("Ú", CodePage::Pc437), b"U");
    }

    #[test]
    fn test_unmapped_becomes_question_mark() {
        assert_eq!(encode("☕", CodePage::Pc850), b"?");
    }

    #[test]
    fn test_one_byte_per_char() {
        let s = "Señor Muñoz pagó ¡gracias!";
        assert_eq!(encode(s, CodePage::Pc850).len(), s.chars().count());
    }

    #[test]
    fn test_table_numbers() {
        assert_eq!(CodePage::Pc437.table_number(), 0);
        assert_eq!(CodePage::Pc850.table_number(), 2);
    }
}
