//! # Recibo - Sale Receipts for BLE Thermal Printers
//!
//! Recibo turns a point-of-sale sale record into an ESC/POS command stream
//! and delivers it to a 58mm/80mm thermal printer over Bluetooth LE. It
//! provides:
//!
//! - **Encoder**: declarative receipt components compiled through an IR
//! - **Layout**: fixed-width wrapping and label/value rows
//! - **Negotiation**: device selection, service and characteristic fallback
//! - **Transport**: ordered 512-byte chunks with a one-time write-mode fallback
//!
//! ## Quick Start
//!
//! ```no_run
//! use recibo::{PrintSession, PrinterProfile};
//! use recibo::sale::{MerchantProfile, Sale};
//! use recibo::transport::mock::MockHost;
//!
//! # async fn run(sale: Sale) -> Result<(), recibo::PrintError> {
//! let session = PrintSession::new(MockHost::new(), PrinterProfile::default());
//! let merchant = MerchantProfile::new("LA AREPERA");
//!
//! let outcome = session.print_receipt(&sale, &merchant, None).await?;
//! println!("{} ({} chunks)", outcome.message, outcome.report.chunks_sent);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | ESC/POS command builders and code pages |
//! | [`ir`] | Opcode program, optimizer, codegen, plain-text preview |
//! | [`components`] | Declarative receipt building blocks |
//! | [`layout`] | `wrap` and `aligned_row` |
//! | [`format`] | Money and timestamp rendering |
//! | [`sale`] | Sale and merchant records |
//! | [`receipt`] | Sale receipt encoder |
//! | [`transport`] | BLE capability traits, negotiation, chunked sender |
//! | [`session`] | `print_receipt` orchestration |
//! | [`printer`] | Printer profiles |
//! | [`error`] | Error types |

pub mod components;
pub mod error;
pub mod format;
pub mod ir;
pub mod layout;
pub mod printer;
pub mod protocol;
pub mod receipt;
pub mod sale;
pub mod session;
pub mod transport;

// Re-exports for convenience
pub use error::{ErrorKind, PrintError};
pub use printer::PrinterProfile;
pub use session::{PrintOutcome, PrintSession};
