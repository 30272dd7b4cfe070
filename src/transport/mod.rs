//! # Printer Transport Layer
//!
//! Bluetooth LE plumbing between an encoded receipt and the printer.
//!
//! ## Layout
//!
//! - [`BleHost`] / [`GattDevice`]: the capability interface a wireless stack
//!   implements (discover, connect, resolve service and characteristic, write)
//! - [`negotiate`]: picks a device and a writable characteristic
//! - [`sender`]: ordered, chunked delivery with the write-mode fallback
//! - [`mock`]: scripted in-memory host for tests and `--simulate`
//! - `btle`: real adapter backed by btleplug (feature `ble`)
//!
//! ## Write Modes
//!
//! | Mode | GATT operation | Per-chunk cost |
//! |------|----------------|----------------|
//! | Unacknowledged | Write Without Response | none |
//! | Acknowledged | Write Request | one round trip |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TransportError;

#[cfg(feature = "ble")]
pub mod btle;
pub mod mock;
pub mod negotiate;
pub mod sender;

pub use negotiate::{NegotiatedConnection, negotiate};
pub use sender::{Chunk, SendReport, chunk, send};

/// How a chunk is written to the characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Write request; the peer confirms every write.
    Acknowledged,
    /// Write command; returns as soon as the host queued it.
    Unacknowledged,
}

impl WriteMode {
    pub fn other(self) -> Self {
        match self {
            WriteMode::Acknowledged => WriteMode::Unacknowledged,
            WriteMode::Unacknowledged => WriteMode::Acknowledged,
        }
    }
}

/// Write flags advertised by a characteristic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteSupport {
    pub acknowledged: bool,
    pub unacknowledged: bool,
}

impl WriteSupport {
    pub const BOTH: Self = Self {
        acknowledged: true,
        unacknowledged: true,
    };
    pub const ACKNOWLEDGED_ONLY: Self = Self {
        acknowledged: true,
        unacknowledged: false,
    };
    pub const UNACKNOWLEDGED_ONLY: Self = Self {
        acknowledged: false,
        unacknowledged: true,
    };
    pub const NONE: Self = Self {
        acknowledged: false,
        unacknowledged: false,
    };

    pub fn any(&self) -> bool {
        self.acknowledged || self.unacknowledged
    }

    pub fn supports(&self, mode: WriteMode) -> bool {
        match mode {
            WriteMode::Acknowledged => self.acknowledged,
            WriteMode::Unacknowledged => self.unacknowledged,
        }
    }

    /// Default mode for a fresh connection. Unacknowledged wins when both
    /// are available since it has no per-chunk round trip.
    pub fn preferred(&self) -> Option<WriteMode> {
        if self.unacknowledged {
            Some(WriteMode::Unacknowledged)
        } else if self.acknowledged {
            Some(WriteMode::Acknowledged)
        } else {
            None
        }
    }
}

/// A resolved GATT characteristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacteristicInfo {
    pub uuid: Uuid,
    pub service: Uuid,
    pub write: WriteSupport,
}

/// Device selection filter. A device matches a filter list if it matches
/// any entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceFilter {
    /// Exact advertised name
    Name(String),
    /// Advertised primary service
    Service(Uuid),
    /// Advertised name prefix
    NamePrefix(String),
}

impl DeviceFilter {
    pub fn matches(&self, name: Option<&str>, services: &[Uuid]) -> bool {
        match self {
            DeviceFilter::Name(expected) => name == Some(expected.as_str()),
            DeviceFilter::Service(uuid) => services.contains(uuid),
            DeviceFilter::NamePrefix(prefix) => name.is_some_and(|n| n.starts_with(prefix.as_str())),
        }
    }

    /// True if any filter in `filters` matches.
    pub fn any_matches(filters: &[DeviceFilter], name: Option<&str>, services: &[Uuid]) -> bool {
        filters.iter().any(|f| f.matches(name, services))
    }
}

/// Host side of a Bluetooth LE stack.
#[async_trait]
pub trait BleHost: Send + Sync {
    type Device: GattDevice;

    /// Whether the host has a usable Bluetooth LE adapter at all.
    async fn is_available(&self) -> bool;

    /// Devices the host already knows about, without user interaction.
    async fn paired_devices(&self) -> Result<Vec<Self::Device>, TransportError>;

    /// Ask for a device matching any of `filters`.
    ///
    /// On interactive hosts this is the device chooser; headless hosts scan
    /// and return the first match.
    async fn request_device(&self, filters: &[DeviceFilter]) -> Result<Self::Device, TransportError>;
}

/// One remote GATT device.
#[async_trait]
pub trait GattDevice: Send + Sync {
    /// Stable identifier, persisted by callers as [`crate::sale::PrinterIdentity::device_id`].
    fn id(&self) -> String;

    fn name(&self) -> Option<String>;

    async fn connect(&self) -> Result<(), TransportError>;

    async fn is_connected(&self) -> bool;

    async fn disconnect(&self) -> Result<(), TransportError>;

    /// Resolve a primary service by UUID.
    async fn primary_service(&self, uuid: Uuid) -> Result<Uuid, TransportError>;

    /// Resolve a characteristic under `service`.
    async fn characteristic(&self, service: Uuid, uuid: Uuid) -> Result<CharacteristicInfo, TransportError>;

    /// Every characteristic of every primary service, in discovery order.
    async fn all_characteristics(&self) -> Result<Vec<CharacteristicInfo>, TransportError>;

    async fn write(
        &self,
        characteristic: &CharacteristicInfo,
        data: &[u8],
        mode: WriteMode,
    ) -> Result<(), TransportError>;
}
