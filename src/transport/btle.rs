//! # btleplug Backend
//!
//! [`BleHost`] implementation over the first local Bluetooth adapter.
//!
//! Device selection is headless: `request_device` scans and returns the
//! first advertiser matching the filters. Device ids are Bluetooth
//! addresses (`AA:BB:CC:DD:EE:FF`), which is what callers persist as the
//! saved printer identity.
//!
//! ## Platform Notes
//!
//! - **Linux**: BlueZ over D-Bus; paired devices are listed without a scan
//! - **macOS**: CoreBluetooth; the terminal needs Bluetooth permission,
//!   otherwise every call fails with a permission error

use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{
    Central, CentralEvent, CharPropFlags, Characteristic, Manager as _, Peripheral as _,
    ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::StreamExt;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{BleHost, CharacteristicInfo, DeviceFilter, GattDevice, WriteMode, WriteSupport};
use crate::error::TransportError;

/// How long `request_device` scans before giving up.
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(10);

/// Host backed by the system Bluetooth stack.
pub struct BtleHost {
    adapter: Option<Adapter>,
    scan_timeout: Duration,
}

/// A device seen during a scan.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredDevice {
    pub id: String,
    pub name: Option<String>,
    pub services: Vec<Uuid>,
    pub rssi: Option<i16>,
}

impl BtleHost {
    /// Open the first adapter. A host without adapters is still returned;
    /// it reports itself as unavailable.
    pub async fn new() -> Result<Self, TransportError> {
        let manager = Manager::new().await.map_err(map_error)?;
        let adapter = manager.adapters().await.map_err(map_error)?.into_iter().next();
        if adapter.is_none() {
            warn!("No Bluetooth adapter found");
        }
        Ok(Self {
            adapter,
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
        })
    }

    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    fn adapter(&self) -> Result<&Adapter, TransportError> {
        self.adapter.as_ref().ok_or(TransportError::Unavailable)
    }

    /// Scan for `duration` and list every device seen.
    pub async fn scan(&self, duration: Duration) -> Result<Vec<DiscoveredDevice>, TransportError> {
        let adapter = self.adapter()?;
        adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(map_error)?;
        tokio::time::sleep(duration).await;
        stop_scan(adapter).await;

        let mut found = Vec::new();
        for peripheral in adapter.peripherals().await.map_err(map_error)? {
            let props = peripheral.properties().await.map_err(map_error)?;
            found.push(DiscoveredDevice {
                id: peripheral.address().to_string(),
                name: props.as_ref().and_then(|p| p.local_name.clone()),
                services: props.as_ref().map(|p| p.services.clone()).unwrap_or_default(),
                rssi: props.and_then(|p| p.rssi),
            });
        }
        Ok(found)
    }

    async fn find_matching(
        &self,
        adapter: &Adapter,
        filters: &[DeviceFilter],
    ) -> Result<Peripheral, TransportError> {
        let mut events = adapter.events().await.map_err(map_error)?;

        for peripheral in adapter.peripherals().await.map_err(map_error)? {
            if peripheral_matches(&peripheral, filters).await {
                return Ok(peripheral);
            }
        }

        while let Some(event) = events.next().await {
            if let CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) = event {
                let peripheral = adapter.peripheral(&id).await.map_err(map_error)?;
                if peripheral_matches(&peripheral, filters).await {
                    return Ok(peripheral);
                }
            }
        }
        Err(TransportError::NotFound("scan ended without a match".to_string()))
    }
}

#[async_trait]
impl BleHost for BtleHost {
    type Device = BtleDevice;

    async fn is_available(&self) -> bool {
        self.adapter.is_some()
    }

    async fn paired_devices(&self) -> Result<Vec<BtleDevice>, TransportError> {
        let adapter = self.adapter()?;
        let mut devices = Vec::new();
        for peripheral in adapter.peripherals().await.map_err(map_error)? {
            devices.push(BtleDevice::new(peripheral).await);
        }
        Ok(devices)
    }

    async fn request_device(&self, filters: &[DeviceFilter]) -> Result<BtleDevice, TransportError> {
        let adapter = self.adapter()?;
        adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(map_error)?;

        let result = tokio::time::timeout(self.scan_timeout, self.find_matching(adapter, filters)).await;
        stop_scan(adapter).await;

        let peripheral = result.map_err(|_| {
            TransportError::Timeout(format!("no matching printer within {:?}", self.scan_timeout))
        })??;
        Ok(BtleDevice::new(peripheral).await)
    }
}

async fn stop_scan(adapter: &Adapter) {
    if let Err(e) = adapter.stop_scan().await {
        debug!(error = %e, "Failed to stop scan");
    }
}

async fn peripheral_matches(peripheral: &Peripheral, filters: &[DeviceFilter]) -> bool {
    match peripheral.properties().await {
        Ok(Some(props)) => {
            DeviceFilter::any_matches(filters, props.local_name.as_deref(), &props.services)
        }
        _ => false,
    }
}

/// A remote device reached through btleplug.
pub struct BtleDevice {
    peripheral: Peripheral,
    name: Option<String>,
}

impl BtleDevice {
    async fn new(peripheral: Peripheral) -> Self {
        let name = match peripheral.properties().await {
            Ok(Some(props)) => props.local_name,
            _ => None,
        };
        Self { peripheral, name }
    }

    fn find(&self, service: Uuid, uuid: Uuid) -> Option<Characteristic> {
        self.peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.service_uuid == service && c.uuid == uuid)
    }
}

fn describe(characteristic: &Characteristic) -> CharacteristicInfo {
    CharacteristicInfo {
        uuid: characteristic.uuid,
        service: characteristic.service_uuid,
        write: WriteSupport {
            acknowledged: characteristic.properties.contains(CharPropFlags::WRITE),
            unacknowledged: characteristic
                .properties
                .contains(CharPropFlags::WRITE_WITHOUT_RESPONSE),
        },
    }
}

#[async_trait]
impl GattDevice for BtleDevice {
    fn id(&self) -> String {
        self.peripheral.address().to_string()
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    async fn connect(&self) -> Result<(), TransportError> {
        if !self.peripheral.is_connected().await.unwrap_or(false) {
            self.peripheral.connect().await.map_err(map_error)?;
        }
        self.peripheral.discover_services().await.map_err(map_error)
    }

    async fn is_connected(&self) -> bool {
        self.peripheral.is_connected().await.unwrap_or(false)
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.peripheral.disconnect().await.map_err(map_error)
    }

    async fn primary_service(&self, uuid: Uuid) -> Result<Uuid, TransportError> {
        self.peripheral
            .services()
            .iter()
            .find(|s| s.primary && s.uuid == uuid)
            .map(|s| s.uuid)
            .ok_or_else(|| TransportError::NotFound(format!("service {}", uuid)))
    }

    async fn characteristic(&self, service: Uuid, uuid: Uuid) -> Result<CharacteristicInfo, TransportError> {
        self.find(service, uuid)
            .map(|c| describe(&c))
            .ok_or_else(|| TransportError::NotFound(format!("characteristic {}", uuid)))
    }

    /// Ordered by service, then characteristic UUID; btleplug does not keep
    /// the device's own attribute order.
    async fn all_characteristics(&self) -> Result<Vec<CharacteristicInfo>, TransportError> {
        Ok(self
            .peripheral
            .services()
            .iter()
            .flat_map(|s| s.characteristics.iter().map(describe))
            .collect())
    }

    async fn write(
        &self,
        characteristic: &CharacteristicInfo,
        data: &[u8],
        mode: WriteMode,
    ) -> Result<(), TransportError> {
        let target = self
            .find(characteristic.service, characteristic.uuid)
            .ok_or_else(|| TransportError::Gatt(format!("characteristic {} vanished", characteristic.uuid)))?;
        let write_type = match mode {
            WriteMode::Acknowledged => WriteType::WithResponse,
            WriteMode::Unacknowledged => WriteType::WithoutResponse,
        };
        self.peripheral
            .write(&target, data, write_type)
            .await
            .map_err(|e| match map_error(e) {
                TransportError::Other(reason) => TransportError::Gatt(reason),
                mapped => mapped,
            })
    }
}

fn map_error(err: btleplug::Error) -> TransportError {
    match err {
        btleplug::Error::PermissionDenied => {
            TransportError::Insecure("Bluetooth permission denied".to_string())
        }
        btleplug::Error::DeviceNotFound => TransportError::NotFound("device not found".to_string()),
        btleplug::Error::NotConnected => TransportError::Disconnected,
        btleplug::Error::TimedOut(after) => TransportError::Timeout(format!("{:?}", after)),
        btleplug::Error::NoSuchCharacteristic | btleplug::Error::UnexpectedCharacteristic => {
            TransportError::Gatt(err.to_string())
        }
        btleplug::Error::NotSupported(reason) => TransportError::Gatt(reason),
        other => TransportError::Other(other.to_string()),
    }
}
