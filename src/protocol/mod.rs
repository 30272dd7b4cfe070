//! # ESC/POS Protocol Implementation
//!
//! Low-level command builders for the ESC/POS dialect spoken by narrow
//! Bluetooth LE receipt printers.
//!
//! ## Module Structure
//!
//! - [`commands`]: Printer control (init, feed, cut)
//! - [`text`]: Alignment, emphasis, character size, code page selection
//! - [`charset`]: Unicode to single-byte code page encoding
//!
//! ## Usage Example
//!
//! ```
//! use recibo::protocol::{charset, commands, text};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(text::align(text::Alignment::Center));
//! data.extend(text::bold_on());
//! data.extend(charset::encode("RECIBO", charset::CodePage::Pc850));
//! data.push(commands::LF);
//! data.extend(text::bold_off());
//! data.extend(commands::cut_full());
//! ```

pub mod charset;
pub mod commands;
pub mod text;
