//! # IR Opcodes
//!
//! The intermediate representation for receipts: a sequence of opcodes that
//! can be inspected, optimized and compiled to ESC/POS bytes.
//!
//! ```text
//! Components → IR (inspectable) → Optimizer → Codegen → Bytes
//! ```
//!
//! Each opcode is a single atomic operation. Style changes are individual
//! ops so the optimizer can drop the redundant ones.

use crate::protocol::charset::CodePage;
use crate::protocol::text::Alignment;

/// Style state tracked for optimization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyleState {
    pub alignment: Alignment,
    pub bold: bool,
    pub height_mult: u8,
    pub width_mult: u8,
}

/// IR opcodes
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    // ========== Printer Control ==========
    /// Initialize printer (ESC @). Resets style and code page.
    Init,

    /// Cut paper. `partial: true` leaves a small hinge.
    Cut { partial: bool },

    /// Print and feed `lines` blank lines.
    Feed { lines: u8 },

    /// Select the code page used for subsequent text.
    SetCodepage(CodePage),

    // ========== Style Changes ==========
    SetAlign(Alignment),

    SetBold(bool),

    /// Character size multipliers: 0 = 1x, 1 = 2x.
    SetSize { height: u8, width: u8 },

    // ========== Content ==========
    /// Text without trailing newline.
    Text(String),

    /// Line feed.
    Newline,
}

/// A compiled IR program.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub ops: Vec<Op>,
}

impl Program {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Create a program with an initial Init op.
    pub fn with_init() -> Self {
        Self {
            ops: vec![Op::Init],
        }
    }

    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    pub fn extend(&mut self, ops: impl IntoIterator<Item = Op>) {
        self.ops.extend(ops);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Op> {
        self.ops.iter()
    }
}

impl FromIterator<Op> for Program {
    fn from_iter<T: IntoIterator<Item = Op>>(iter: T) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Program {
    type Item = Op;
    type IntoIter = std::vec::IntoIter<Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Op;
    type IntoIter = std::slice::Iter<'a, Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_new() {
        assert!(Program::new().is_empty());
    }

    #[test]
    fn test_program_with_init() {
        let program = Program::with_init();
        assert_eq!(program.len(), 1);
        assert_eq!(program.ops[0], Op::Init);
    }

    #[test]
    fn test_style_state_default() {
        let state = StyleState::default();
        assert_eq!(state.alignment, Alignment::Left);
        assert!(!state.bold);
        assert_eq!(state.height_mult, 0);
        assert_eq!(state.width_mult, 0);
    }

    #[test]
    fn test_collect_program() {
        let program: Program = vec![Op::Init, Op::Text("x".into()), Op::Newline]
            .into_iter()
            .collect();
        assert_eq!(program.len(), 3);
    }
}
