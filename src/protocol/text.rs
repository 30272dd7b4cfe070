//! # ESC/POS Text Styling Commands
//!
//! Alignment, emphasis, character size and code page selection.
//!
//! ## Text Alignment
//!
//! ```text
//! Left aligned (default)    |LEFT TEXT
//! Center aligned            |  CENTER TEXT
//! Right aligned             |      RIGHT TEXT
//! ```
//!
//! ## Character Size
//!
//! `GS ! n` packs two multipliers into one byte: the high nibble is the
//! width multiplier, the low nibble the height multiplier (0 = 1x ... 7 = 8x).
//! Receipts only use normal size and double height, since double width
//! would halve the already narrow 32-column line.

use super::commands::{ESC, GS};

// ============================================================================
// TEXT ALIGNMENT
// ============================================================================

/// Text alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

/// # Set Text Alignment (ESC a n)
///
/// ## Protocol Details
///
/// | Format  | Bytes     |
/// |---------|-----------|
/// | ASCII   | ESC a n   |
/// | Hex     | 1B 61 n   |
///
/// Takes effect at the start of the next line and stays until changed or
/// until `ESC @`.
///
/// ## Example
///
/// ```
/// use recibo::protocol::text::{align, Alignment};
///
/// assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
/// ```
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, b'a', alignment as u8]
}

// ============================================================================
// EMPHASIS
// ============================================================================

/// # Bold On (ESC E 1)
#[inline]
pub fn bold_on() -> Vec<u8> {
    vec![ESC, b'E', 1]
}

/// # Bold Off (ESC E 0)
#[inline]
pub fn bold_off() -> Vec<u8> {
    vec![ESC, b'E', 0]
}

// ============================================================================
// CHARACTER SIZE
// ============================================================================

/// # Select Character Size (GS ! n)
///
/// `height` and `width` are multipliers minus one, clamped to 0-7.
///
/// ## Protocol Details
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | GS ! n   |
/// | Hex     | 1D 21 n  |
///
/// ## Example
///
/// ```
/// use recibo::protocol::text::size;
///
/// // Double height, normal width
/// assert_eq!(size(1, 0), vec![0x1D, 0x21, 0x01]);
/// ```
pub fn size(height: u8, width: u8) -> Vec<u8> {
    let h = height.min(7);
    let w = width.min(7);
    vec![GS, b'!', (w << 4) | h]
}

// ============================================================================
// CODE PAGE
// ============================================================================

/// # Select Character Code Table (ESC t n)
///
/// Selects which single-byte table the printer uses for bytes 0x80-0xFF.
/// Must match the table used to encode text (see [`super::charset`]).
///
/// ## Protocol Details
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC t n  |
/// | Hex     | 1B 74 n  |
pub fn codepage(n: u8) -> Vec<u8> {
    vec![ESC, b't', n]
}
