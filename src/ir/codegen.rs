//! # Code Generation
//!
//! Converts IR programs to ESC/POS bytes.

use super::ops::{Op, Program};
use crate::protocol::charset::{self, CodePage};
use crate::protocol::{commands, text};

impl Program {
    /// Compile the IR program to ESC/POS bytes.
    ///
    /// Text is encoded with the most recent `SetCodepage`; before any, and
    /// after every `Init`, the printer's power-on table (PC437) applies.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut page = CodePage::Pc437;

        for op in &self.ops {
            match op {
                // ===== Printer Control =====
                Op::Init => {
                    out.extend(commands::init());
                    page = CodePage::Pc437;
                }
                Op::Cut { partial } => {
                    if *partial {
                        out.extend(commands::cut_partial());
                    } else {
                        out.extend(commands::cut_full());
                    }
                }
                Op::Feed { lines } => {
                    out.extend(commands::feed_lines(*lines));
                }
                Op::SetCodepage(p) => {
                    out.extend(text::codepage(p.table_number()));
                    page = *p;
                }

                // ===== Style Changes =====
                Op::SetAlign(align) => {
                    out.extend(text::align(*align));
                }
                Op::SetBold(enabled) => {
                    if *enabled {
                        out.extend(text::bold_on());
                    } else {
                        out.extend(text::bold_off());
                    }
                }
                Op::SetSize { height, width } => {
                    out.extend(text::size(*height, *width));
                }

                // ===== Content =====
                Op::Text(s) => {
                    out.extend(charset::encode(s, page));
                }
                Op::Newline => {
                    out.push(commands::LF);
                }
            }
        }

        out
    }
}
