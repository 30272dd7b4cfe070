//! # Printer Profile
//!
//! Hardware, transport and locale settings for one family of Bluetooth LE
//! ESC/POS receipt printers.
//!
//! ## Built-in Profile
//!
//! | Property | Value |
//! |----------|-------|
//! | Paper | 58mm, 32 columns (Font A) |
//! | Primary service | `000018f0-0000-1000-8000-00805f9b34fb` |
//! | Alternate service | `e7810a71-73ae-499d-8c15-faa9aef0c3f2` |
//! | Chunk size | 512 bytes |
//! | Code page | PC850 |
//! | Clock | UTC−05:00 |
//!
//! ## Usage
//!
//! ```
//! use recibo::printer::PrinterProfile;
//!
//! let profile = PrinterProfile::default();
//! assert_eq!(profile.columns, 32);
//! assert_eq!(profile.chunk_size, 512);
//! ```
//!
//! Profiles can be stored as JSON; every field is optional and falls back
//! to the built-in value.

use std::path::Path;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ConfigError;
use crate::protocol::charset::CodePage;
use crate::transport::{DeviceFilter, WriteMode};

/// Primary GATT service exposed by most 58mm BLE receipt printers.
pub const PRIMARY_SERVICE: Uuid = Uuid::from_u128(0x000018f0_0000_1000_8000_00805f9b34fb);

/// Alternate service used by printers built on the other common BLE module.
pub const ALTERNATE_SERVICE: Uuid = Uuid::from_u128(0xe7810a71_73ae_499d_8c15_faa9aef0c3f2);

/// Write characteristic under [`PRIMARY_SERVICE`].
pub const PRIMARY_CHARACTERISTIC: Uuid = Uuid::from_u128(0x00002af1_0000_1000_8000_00805f9b34fb);

/// Write characteristic under [`ALTERNATE_SERVICE`].
pub const ALTERNATE_CHARACTERISTIC: Uuid =
    Uuid::from_u128(0xbef8d6c9_9c21_4c9e_b632_bd58c1009f9f);

/// Advertised name prefixes of this printer family.
pub const NAME_PREFIXES: &[&str] = &["MPT", "MTP", "PT-", "RPP", "POS", "Printer", "BlueTooth Printer"];

/// # Printer Profile
///
/// ## Layout
///
/// - **columns**: characters per line at normal size
/// - **codepage**: table used for bytes above 0x7F
/// - **feed_lines**: blank lines fed before the cut so the footer clears the tear bar
///
/// ## Transport
///
/// - **chunk_size**: bytes per GATT write
/// - **\*_delay_ms**: pacing between chunks, per write mode
/// - **settle_delay_ms**: wait after the last chunk before returning
/// - **discovery_timeout_ms**: limit on device selection; `None` leaves it to the host
///
/// ## Locale
///
/// - **utc_offset_minutes**: fixed offset used to print timestamps
/// - **currency_symbol**: prefix for amounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterProfile {
    pub name: String,
    pub columns: usize,
    pub codepage: CodePage,
    pub feed_lines: u8,

    pub primary_service: Uuid,
    pub alternate_service: Uuid,
    pub characteristics: Vec<Uuid>,
    pub name_prefixes: Vec<String>,

    pub chunk_size: usize,
    pub unacknowledged_delay_ms: u64,
    pub acknowledged_delay_ms: u64,
    pub settle_delay_ms: u64,
    pub discovery_timeout_ms: Option<u64>,

    pub utc_offset_minutes: i32,
    pub currency_symbol: String,
}

impl PrinterProfile {
    /// # Generic 58mm BLE Printer
    ///
    /// ```text
    /// ├─ 48mm printable ─┤
    /// │    32 columns    │
    /// ```
    pub fn generic_58mm() -> Self {
        Self {
            name: "Generic 58mm BLE".to_string(),
            columns: 32,
            codepage: CodePage::Pc850,
            feed_lines: 4,
            primary_service: PRIMARY_SERVICE,
            alternate_service: ALTERNATE_SERVICE,
            characteristics: vec![PRIMARY_CHARACTERISTIC, ALTERNATE_CHARACTERISTIC],
            name_prefixes: NAME_PREFIXES.iter().map(|p| p.to_string()).collect(),
            chunk_size: 512,
            unacknowledged_delay_ms: 20,
            acknowledged_delay_ms: 50,
            settle_delay_ms: 1500,
            discovery_timeout_ms: None,
            utc_offset_minutes: -5 * 60,
            currency_symbol: "$".to_string(),
        }
    }

    /// # Generic 80mm BLE Printer
    ///
    /// Same transport as the 58mm profile with a 48-column line.
    pub fn generic_80mm() -> Self {
        Self {
            name: "Generic 80mm BLE".to_string(),
            columns: 48,
            ..Self::generic_58mm()
        }
    }

    /// Profile with every delay set to zero. Used for simulated sessions.
    pub fn without_delays(mut self) -> Self {
        self.unacknowledged_delay_ms = 0;
        self.acknowledged_delay_ms = 0;
        self.settle_delay_ms = 0;
        self
    }

    /// Load a profile from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let profile: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        profile.validate()?;
        Ok(profile)
    }

    /// Reject values the encoder or sender cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns < 16 {
            return Err(ConfigError::Invalid(format!(
                "columns must be at least 16, got {}",
                self.columns
            )));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk_size must be > 0".to_string()));
        }
        Ok(())
    }

    /// Service UUIDs in resolution order.
    pub fn service_candidates(&self) -> Vec<Uuid> {
        vec![self.primary_service, self.alternate_service]
    }

    /// The broad discovery filter set: both services plus every name prefix.
    pub fn discovery_filters(&self) -> Vec<DeviceFilter> {
        let mut filters = vec![
            DeviceFilter::Service(self.primary_service),
            DeviceFilter::Service(self.alternate_service),
        ];
        filters.extend(
            self.name_prefixes
                .iter()
                .map(|prefix| DeviceFilter::NamePrefix(prefix.clone())),
        );
        filters
    }

    /// Pause after each chunk except the last.
    pub fn chunk_delay(&self, mode: WriteMode) -> Duration {
        match mode {
            WriteMode::Unacknowledged => Duration::from_millis(self.unacknowledged_delay_ms),
            WriteMode::Acknowledged => Duration::from_millis(self.acknowledged_delay_ms),
        }
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn discovery_timeout(&self) -> Option<Duration> {
        self.discovery_timeout_ms.map(Duration::from_millis)
    }

    /// Offset used to print sale timestamps. Out-of-range values fall back to UTC.
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }
}

impl Default for PrinterProfile {
    fn default() -> Self {
        Self::generic_58mm()
    }
}

// ============================================================================
// TESTS
// ============================================================================
