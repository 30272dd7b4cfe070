//! # Layout Components
//!
//! Dividers, paper feed and label/value rows.

use super::Component;
use crate::ir::Op;
use crate::layout::{self, DEFAULT_COLUMNS};
use crate::protocol::text::Alignment;

/// Divider style options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DividerStyle {
    /// `--------`
    #[default]
    Dashed,
    /// `========`
    Equals,
}

/// A full-width horizontal rule.
///
/// ```
/// use recibo::components::Divider;
///
/// let rule = Divider::dashed().width(32);
/// ```
pub struct Divider {
    style: DividerStyle,
    width: usize,
}

impl Divider {
    pub fn new(style: DividerStyle) -> Self {
        Self {
            style,
            width: DEFAULT_COLUMNS,
        }
    }

    pub fn dashed() -> Self {
        Self::new(DividerStyle::Dashed)
    }

    pub fn equals() -> Self {
        Self::new(DividerStyle::Equals)
    }

    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

impl Default for Divider {
    fn default() -> Self {
        Self::dashed()
    }
}

impl Component for Divider {
    fn emit(&self, ops: &mut Vec<Op>) {
        let ch = match self.style {
            DividerStyle::Dashed => "-",
            DividerStyle::Equals => "=",
        };
        ops.push(Op::SetAlign(Alignment::Left));
        ops.push(Op::Text(ch.repeat(self.width)));
        ops.push(Op::Newline);
    }
}

/// Blank paper feed (ESC d n).
pub struct Spacer {
    lines: u8,
}

impl Spacer {
    pub fn lines(n: u8) -> Self {
        Self { lines: n }
    }
}

impl Component for Spacer {
    fn emit(&self, ops: &mut Vec<Op>) {
        if self.lines > 0 {
            ops.push(Op::Feed { lines: self.lines });
        }
    }
}

/// Label on the left, value pushed to the right edge.
///
/// ```
/// use recibo::components::Columns;
///
/// let row = Columns::new("Subtotal:", "$30.000").width(32);
/// let total = Columns::new("TOTAL:", "$30.000").bold().double_height();
/// let topping = Columns::new("Queso (x2)", "$4.000").indent(4);
/// ```
pub struct Columns {
    left: String,
    right: String,
    width: usize,
    indent: usize,
    bold: bool,
    double_height: bool,
}

impl Columns {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            width: DEFAULT_COLUMNS,
            indent: 0,
            bold: false,
            double_height: false,
        }
    }

    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Leading spaces, counted inside the width.
    pub fn indent(mut self, spaces: usize) -> Self {
        self.indent = spaces;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn double_height(mut self) -> Self {
        self.double_height = true;
        self
    }

    /// The row as printed.
    pub fn line(&self) -> String {
        let left = format!("{}{}", " ".repeat(self.indent), self.left);
        layout::aligned_row(&left, &self.right, self.width)
    }
}

impl Component for Columns {
    fn emit(&self, ops: &mut Vec<Op>) {
        ops.push(Op::SetAlign(Alignment::Left));
        if self.bold {
            ops.push(Op::SetBold(true));
        }
        if self.double_height {
            ops.push(Op::SetSize {
                height: 1,
                width: 0,
            });
        }

        ops.push(Op::Text(self.line()));
        ops.push(Op::Newline);

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

/// An empty line (just a newline character).
pub struct BlankLine;

impl Component for BlankLine {
    fn emit(&self, ops: &mut Vec<Op>) {
        ops.push(Op::Newline);
    }
}
