//! # Text Components
//!
//! Single lines, wrapped paragraphs and headers.

use super::Component;
use crate::ir::Op;
use crate::layout::{self, DEFAULT_COLUMNS};
use crate::protocol::text::Alignment;

/// Shared styling for text components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Style {
    alignment: Option<Alignment>,
    bold: bool,
    double_height: bool,
}

impl Style {
    fn open(&self, ops: &mut Vec<Op>) {
        if let Some(align) = self.alignment {
            ops.push(Op::SetAlign(align));
        }
        if self.bold {
            ops.push(Op::SetBold(true));
        }
        if self.double_height {
            ops.push(Op::SetSize {
                height: 1,
                width: 0,
            });
        }
    }

    /// Undo bold and size. Alignment persists until the next component sets it.
    fn close(&self, ops: &mut Vec<Op>) {
        if self.double_height {
            ops.push(Op::SetSize {
                height: 0,
                width: 0,
            });
        }
        if self.bold {
            ops.push(Op::SetBold(false));
        }
    }
}

/// One line of text, printed as given.
///
/// ```
/// use recibo::components::*;
///
/// let caption = Text::new("VENTA CONFIRMADA").center().bold();
/// ```
pub struct Text {
    content: String,
    style: Style,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            style: Style::default(),
        }
    }

    pub fn bold(mut self) -> Self {
        self.style.bold = true;
        self
    }

    /// Double the character height (GS ! 0x01).
    pub fn double_height(mut self) -> Self {
        self.style.double_height = true;
        self
    }

    pub fn center(mut self) -> Self {
        self.style.alignment = Some(Alignment::Center);
        self
    }

    pub fn right(mut self) -> Self {
        self.style.alignment = Some(Alignment::Right);
        self
    }

    pub fn left(mut self) -> Self {
        self.style.alignment = Some(Alignment::Left);
        self
    }
}

impl Component for Text {
    fn emit(&self, ops: &mut Vec<Op>) {
        self.style.open(ops);
        ops.push(Op::Text(self.content.clone()));
        ops.push(Op::Newline);
        self.style.close(ops);
    }
}

/// Text wrapped to the line width, one `Text` + `Newline` per line.
///
/// An indent is prepended to every line and taken out of the wrap width.
///
/// ```
/// use recibo::components::*;
///
/// let address = Paragraph::new("Calle 10 # 43-12, Barrio El Poblado")
///     .width(32)
///     .center();
/// ```
pub struct Paragraph {
    content: String,
    width: usize,
    indent: usize,
    style: Style,
}

impl Paragraph {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            width: DEFAULT_COLUMNS,
            indent: 0,
            style: Style::default(),
        }
    }

    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn indent(mut self, spaces: usize) -> Self {
        self.indent = spaces;
        self
    }

    pub fn bold(mut self) -> Self {
        self.style.bold = true;
        self
    }

    pub fn double_height(mut self) -> Self {
        self.style.double_height = true;
        self
    }

    pub fn center(mut self) -> Self {
        self.style.alignment = Some(Alignment::Center);
        self
    }

    pub fn left(mut self) -> Self {
        self.style.alignment = Some(Alignment::Left);
        self
    }

    /// Wrapped lines, indent included.
    pub fn lines(&self) -> Vec<String> {
        let pad = " ".repeat(self.indent);
        layout::wrap(&self.content, self.width.saturating_sub(self.indent))
            .into_iter()
            .map(|line| format!("{}{}", pad, line))
            .collect()
    }
}

impl Component for Paragraph {
    fn emit(&self, ops: &mut Vec<Op>) {
        self.style.open(ops);
        for line in self.lines() {
            ops.push(Op::Text(line));
            ops.push(Op::Newline);
        }
        self.style.close(ops);
    }
}

/// Business name at the top of the receipt: centered, bold, double height,
/// wrapped to the line width.
pub struct Header {
    inner: Paragraph,
}

impl Header {
    pub fn new(content: impl Into<String>, width: usize) -> Self {
        Self {
            inner: Paragraph::new(content)
                .width(width)
                .center()
                .bold()
                .double_height(),
        }
    }
}

impl Component for Header {
    fn emit(&self, ops: &mut Vec<Op>) {
        self.inner.emit(ops);
    }
}
