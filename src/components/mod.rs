//! # Declarative Components
//!
//! Building blocks for receipts. Each component describes what it prints
//! and emits IR ops; layout math (wrapping, column padding) happens here so
//! the IR only ever sees finished lines.
//!
//! ```
//! use recibo::components::*;
//!
//! let receipt = Receipt::new()
//!     .child(Header::new("LA AREPERA", 32))
//!     .child(Divider::dashed())
//!     .child(Columns::new("2x Arepa", "$30.000"))
//!     .child(Columns::new("TOTAL:", "$30.000").bold().double_height())
//!     .cut();
//!
//! // Compile to IR (inspectable)
//! let ir = receipt.compile();
//! assert!(ir.len() > 5);
//!
//! // Generate bytes
//! let bytes = receipt.build();
//! assert_eq!(&bytes[..2], &[0x1B, 0x40]);
//! ```

mod layout;
mod receipt;
mod text;

pub use layout::*;
pub use receipt::*;
pub use text::*;

use crate::ir::{Op, Program};

/// Trait for declarative components.
pub trait Component {
    /// Emit IR ops for this component into the ops vector.
    fn emit(&self, ops: &mut Vec<Op>);
}

/// Extension trait for compiling components.
pub trait ComponentExt: Component {
    /// Compile to an IR program starting with an Init op.
    fn compile(&self) -> Program {
        let mut ops = vec![Op::Init];
        self.emit(&mut ops);
        Program { ops }
    }

    /// Compile, optimize, and generate bytes.
    fn build(&self) -> Vec<u8> {
        self.compile().optimize().to_bytes()
    }
}

impl<T: Component> ComponentExt for T {}

impl Component for Box<dyn Component> {
    fn emit(&self, ops: &mut Vec<Op>) {
        self.as_ref().emit(ops);
    }
}

impl<T: Component + ?Sized> Component for &T {
    fn emit(&self, ops: &mut Vec<Op>) {
        (*self).emit(ops);
    }
}
