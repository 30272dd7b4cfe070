//! # Receipt Component
//!
//! The root container for building receipts.

use super::Component;
use crate::ir::Op;
use crate::protocol::charset::CodePage;

/// Receipt is the root container component.
///
/// It selects the code page, holds child components, and optionally ends
/// with a paper feed and a cut.
///
/// ## Example
///
/// ```
/// use recibo::components::*;
///
/// let receipt = Receipt::new()
///     .child(Header::new("LA AREPERA", 32))
///     .child(Divider::dashed())
///     .child(Columns::new("TOTAL:", "$30.000"))
///     .feed(4)
///     .cut();
///
/// let bytes = receipt.build();
/// assert!(bytes.ends_with(&[0x1D, 0x56, 0x00]));
/// ```
pub struct Receipt {
    codepage: Option<CodePage>,
    children: Vec<Box<dyn Component>>,
    feed: u8,
    cut: Option<bool>,
}

impl Default for Receipt {
    fn default() -> Self {
        Self::new()
    }
}

impl Receipt {
    pub fn new() -> Self {
        Self {
            codepage: None,
            children: Vec::new(),
            feed: 0,
            cut: None,
        }
    }

    /// Select a code page before any text.
    pub fn codepage(mut self, page: CodePage) -> Self {
        self.codepage = Some(page);
        self
    }

    pub fn child<C: Component + 'static>(mut self, component: C) -> Self {
        self.children.push(Box::new(component));
        self
    }

    pub fn children<I, C>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Component + 'static,
    {
        for c in components {
            self.children.push(Box::new(c));
        }
        self
    }

    /// Append a child in place, for builders that loop.
    pub fn push<C: Component + 'static>(&mut self, component: C) {
        self.children.push(Box::new(component));
    }

    /// Blank lines fed after the last child, before the cut.
    pub fn feed(mut self, lines: u8) -> Self {
        self.feed = lines;
        self
    }

    /// Full cut at the end.
    pub fn cut(mut self) -> Self {
        self.cut = Some(false);
        self
    }

    /// Partial cut at the end (leaves a hinge).
    pub fn partial_cut(mut self) -> Self {
        self.cut = Some(true);
        self
    }
}

impl Component for Receipt {
    fn emit(&self, ops: &mut Vec<Op>) {
        if let Some(page) = self.codepage {
            ops.push(Op::SetCodepage(page));
        }

        for child in &self.children {
            child.emit(ops);
        }

        if self.feed > 0 {
            ops.push(Op::Feed { lines: self.feed });
        }
        if let Some(partial) = self.cut {
            ops.push(Op::Cut { partial });
        }
    }
}
