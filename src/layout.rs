//! # Text Layout
//!
//! Line wrapping and two-column rows for a fixed character width.
//!
//! Widths are counted in characters, not bytes, since every character ends
//! up as exactly one byte in the printer's code page.

/// Columns on 58mm paper with the default font.
pub const DEFAULT_COLUMNS: usize = 32;

/// Greedy word wrap.
///
/// Words are packed onto a line while `len(line) + 1 + len(word) <= max_width`.
/// A word longer than `max_width` is hard-split into fixed-size fragments,
/// each on its own line. Always returns at least one line; empty input
/// yields a single empty line.
///
/// ```
/// use recibo::layout::wrap;
///
/// assert_eq!(wrap("Empanada de pollo grande", 12), vec!["Empanada de", "pollo grande"]);
/// assert_eq!(wrap("", 12), vec![""]);
/// ```
pub fn wrap(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_width {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            lines.extend(chars.chunks(max_width).map(|frag| frag.iter().collect::<String>()));
            continue;
        }

        if line.is_empty() {
            line.push_str(word);
            line_len = word_len;
        } else if line_len + 1 + word_len <= max_width {
            line.push(' ');
            line.push_str(word);
            line_len += 1 + word_len;
        } else {
            lines.push(std::mem::replace(&mut line, word.to_string()));
            line_len = word_len;
        }
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// `left`, padding, then `right`, pushing `right` to the column boundary.
///
/// Padding is `max(1, width - len(left) - len(right))` spaces, so an
/// oversized row still keeps one space between the columns.
///
/// ```
/// use recibo::layout::aligned_row;
///
/// assert_eq!(aligned_row("Subtotal:", "$30.000", 20), "Subtotal:    $30.000");
/// ```
pub fn aligned_row(left: &str, right: &str, width: usize) -> String {
    let used = left.chars().count() + right.chars().count();
    let pad = width.saturating_sub(used).max(1);
    format!("{}{}{}", left, " ".repeat(pad), right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_wrap_empty() {
        assert_eq!(wrap("", 32), vec![String::new()]);
        assert_eq!(wrap("   ", 32), vec![String::new()]);
    }

    #[test]
    fn test_wrap_fits_on_one_line() {
        assert_eq!(wrap("Gracias por su compra", 32), vec!["Gracias por su compra"]);
    }

    #[test]
    fn test_wrap_exact_boundary() {
        // "aaaa bbbb" is 9 chars: fits in 9, not in 8
        assert_eq!(wrap("aaaa bbbb", 9), vec!["aaaa bbbb"]);
        assert_eq!(wrap("aaaa bbbb", 8), vec!["aaaa", "bbbb"]);
    }

    #[test]
    fn test_wrap_collapses_whitespace() {
        assert_eq!(wrap("  a   b  ", 10), vec!["a b"]);
    }

    #[test]
    fn test_wrap_hard_splits_long_word() {
        assert_eq!(
            wrap("ab abcdefghij cd", 4),
            vec!["ab", "abcd", "efgh", "ij", "cd"]
        );
    }

    #[test]
    fn test_wrap_long_word_fragment_count() {
        let word = "x".repeat(70);
        let lines = wrap(&word, 32);
        assert_eq!(lines.len(), 70usize.div_ceil(32));
        assert_eq!(lines[0].len(), 32);
        assert_eq!(lines[1].len(), 32);
        assert_eq!(lines[2].len(), 6);
    }

    #[test]
    fn test_wrap_counts_characters_not_bytes() {
        // 8 characters, 10 bytes in UTF-8
        assert_eq!(wrap("Ñoño ají", 8), vec!["Ñoño ají"]);
    }

    #[test]
    fn test_wrap_lines_never_exceed_width() {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        let alphabet: Vec<char> = "abcdefñó ".chars().collect();

        for _ in 0..500 {
            let width = rng.random_range(1..=40);
            let len = rng.random_range(0..200);
            let text: String = (0..len)
                .map(|_| alphabet[rng.random_range(0..alphabet.len())])
                .collect();

            let lines = wrap(&text, width);
            assert!(!lines.is_empty());
            for line in &lines {
                assert!(
                    line.chars().count() <= width,
                    "line {:?} exceeds width {} for input {:?}",
                    line,
                    width,
                    text
                );
            }
            // No words are lost or reordered
            let rejoined: String = lines.concat().chars().filter(|c| !c.is_whitespace()).collect();
            let original: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            assert_eq!(rejoined, original);
        }
    }

    #[test]
    fn test_aligned_row_pads_to_width() {
        let row = aligned_row("2x Empanada", "$5.000", 32);
        assert_eq!(row.chars().count(), 32);
        assert!(row.starts_with("2x Empanada "));
        assert!(row.ends_with(" $5.000"));
    }

    #[test]
    fn test_aligned_row_overflow_keeps_one_space() {
        let left = "a".repeat(30);
        assert_eq!(aligned_row(&left, "$100", 32), format!("{} $100", left));
    }
}
