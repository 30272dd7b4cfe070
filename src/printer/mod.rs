//! # Printer Module
//!
//! Printer-family configuration.
//!
//! ## Modules
//!
//! - [`config`]: Layout, transport and locale settings

pub mod config;

pub use config::PrinterProfile;
