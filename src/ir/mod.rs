//! # Intermediate Representation (IR)
//!
//! The IR is a "bytecode" that sits between declarative receipt components
//! and raw ESC/POS bytes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌───────────┐     ┌──────────┐
//! │ Components  │ ──► │     IR      │ ──► │ Optimizer │ ──► │ Codegen  │
//! │(declarative)│     │  (Vec<Op>)  │     │           │     │ (bytes)  │
//! └─────────────┘     └─────────────┘     └───────────┘     └──────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use recibo::ir::{Op, Program};
//! use recibo::protocol::text::Alignment;
//!
//! let mut program = Program::with_init();
//! program.push(Op::SetAlign(Alignment::Center));
//! program.push(Op::SetBold(true));
//! program.push(Op::Text("HOLA".into()));
//! program.push(Op::Newline);
//! program.push(Op::Cut { partial: false });
//!
//! let bytes = program.optimize().to_bytes();
//! assert!(bytes.ends_with(&[0x1D, 0x56, 0x00]));
//! ```

mod codegen;
mod ops;
mod optimize;
mod preview;

pub use ops::*;
