//! # Plain-Text Preview
//!
//! Renders a program as the lines a 1x-size printer would show, for the
//! CLI `preview` command and for tests that check layout without decoding
//! ESC/POS bytes.

use super::ops::{Op, Program};
use crate::protocol::text::Alignment;

impl Program {
    /// Render the program as plain lines `columns` characters wide.
    ///
    /// Alignment is applied with spaces, size changes are ignored and a cut
    /// is shown as a line of `✂`.
    pub fn to_plain_text(&self, columns: usize) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut alignment = Alignment::Left;

        for op in &self.ops {
            match op {
                Op::Init => alignment = Alignment::Left,
                Op::SetAlign(a) => alignment = *a,
                Op::Text(s) => current.push_str(s),
                Op::Newline => lines.push(place(&std::mem::take(&mut current), alignment, columns)),
                Op::Feed { lines: n } => {
                    if !current.is_empty() {
                        lines.push(place(&std::mem::take(&mut current), alignment, columns));
                    }
                    lines.extend(std::iter::repeat_n(String::new(), *n as usize));
                }
                Op::Cut { .. } => lines.push("\u{2702}".repeat(columns)),
                Op::SetBold(_) | Op::SetSize { .. } | Op::SetCodepage(_) => {}
            }
        }

        if !current.is_empty() {
            lines.push(place(&current, alignment, columns));
        }
        lines
    }
}

fn place(line: &str, alignment: Alignment, columns: usize) -> String {
    let len = line.chars().count();
    let slack = columns.saturating_sub(len);
    match alignment {
        Alignment::Left => line.to_string(),
        Alignment::Center => format!("{}{}", " ".repeat(slack / 2), line),
        Alignment::Right => format!("{}{}", " ".repeat(slack), line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_and_left() {
        let program: Program = vec![
            Op::Init,
            Op::SetAlign(Alignment::Center),
            Op::Text("HOLA".into()),
            Op::Newline,
            Op::SetAlign(Alignment::Left),
            Op::Text("x".into()),
            Op::Newline,
        ]
        .into_iter()
        .collect();

        assert_eq!(program.to_plain_text(10), vec!["   HOLA", "x"]);
    }

    #[test]
    fn test_feed_and_cut() {
        let program: Program = vec![
            Op::Text("fin".into()),
            Op::Newline,
            Op::Feed { lines: 2 },
            Op::Cut { partial: false },
        ]
        .into_iter()
        .collect();

        let lines = program.to_plain_text(4);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "");
        assert_eq!(lines[3], "\u{2702}".repeat(4));
    }
}
