//! # In-Memory Bluetooth Host
//!
//! A scripted [`BleHost`] for tests and dry runs. Devices record every
//! accepted write and can be told to fail, drop the link, or hide services.
//!
//! ```
//! use recibo::transport::mock::{MockDevice, MockHost};
//! use recibo::transport::WriteSupport;
//!
//! let printer = MockDevice::printer("AA:BB:CC:00:11:22", "MPT-II", WriteSupport::BOTH);
//! let host = MockHost::new().with_discoverable(printer.clone());
//! assert!(printer.writes().is_empty());
//! # let _ = host;
//! ```
//!
//! Cloned devices share state, so a test can keep a handle while the
//! session owns another.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use super::{BleHost, CharacteristicInfo, DeviceFilter, GattDevice, WriteMode, WriteSupport};
use crate::error::TransportError;
use crate::printer::config::{PRIMARY_CHARACTERISTIC, PRIMARY_SERVICE};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// HOST
// ============================================================================

#[derive(Debug, Default)]
struct HostState {
    requests: Vec<Vec<DeviceFilter>>,
    request_failures: VecDeque<TransportError>,
    paired_failure: Option<TransportError>,
}

/// Scripted Bluetooth host.
#[derive(Debug, Clone)]
pub struct MockHost {
    available: bool,
    paired: Vec<MockDevice>,
    discoverable: Vec<MockDevice>,
    state: Arc<Mutex<HostState>>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            available: true,
            paired: Vec::new(),
            discoverable: Vec::new(),
            state: Arc::default(),
        }
    }

    /// Host without a Bluetooth adapter.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Device the host already knows; also discoverable.
    pub fn with_paired(mut self, device: MockDevice) -> Self {
        self.discoverable.push(device.clone());
        self.paired.push(device);
        self
    }

    pub fn with_discoverable(mut self, device: MockDevice) -> Self {
        self.discoverable.push(device);
        self
    }

    /// Queue an error for the next `request_device` call.
    pub fn fail_next_request(self, err: TransportError) -> Self {
        lock(&self.state).request_failures.push_back(err);
        self
    }

    pub fn fail_paired_listing(self, err: TransportError) -> Self {
        lock(&self.state).paired_failure = Some(err);
        self
    }

    /// Filter lists passed to `request_device`, in call order.
    pub fn requests(&self) -> Vec<Vec<DeviceFilter>> {
        lock(&self.state).requests.clone()
    }
}

#[async_trait]
impl BleHost for MockHost {
    type Device = MockDevice;

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn paired_devices(&self) -> Result<Vec<MockDevice>, TransportError> {
        if let Some(err) = lock(&self.state).paired_failure.clone() {
            return Err(err);
        }
        Ok(self.paired.clone())
    }

    async fn request_device(&self, filters: &[DeviceFilter]) -> Result<MockDevice, TransportError> {
        let mut state = lock(&self.state);
        state.requests.push(filters.to_vec());
        if let Some(err) = state.request_failures.pop_front() {
            return Err(err);
        }
        self.discoverable
            .iter()
            .find(|d| DeviceFilter::any_matches(filters, d.name.as_deref(), &d.advertised))
            .cloned()
            .ok_or(TransportError::Cancelled)
    }
}

// ============================================================================
// DEVICE
// ============================================================================

/// A write the device accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedWrite {
    pub mode: WriteMode,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct DeviceState {
    connected: bool,
    connect_failure: Option<TransportError>,
    writes: Vec<RecordedWrite>,
    attempts: usize,
    /// Failures keyed by 1-based write attempt
    scripted: HashMap<usize, TransportError>,
    failing_modes: HashMap<WriteMode, TransportError>,
    disconnect_after: Option<usize>,
    disconnects: usize,
}

/// Scripted GATT device.
#[derive(Debug, Clone)]
pub struct MockDevice {
    id: String,
    name: Option<String>,
    advertised: Vec<Uuid>,
    services: Vec<(Uuid, Vec<CharacteristicInfo>)>,
    state: Arc<Mutex<DeviceState>>,
}

impl MockDevice {
    /// Bare device with no services.
    pub fn new(id: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.map(str::to_string),
            advertised: Vec::new(),
            services: Vec::new(),
            state: Arc::default(),
        }
    }

    /// A printer exposing the primary service and characteristic.
    pub fn printer(id: impl Into<String>, name: &str, write: WriteSupport) -> Self {
        Self::new(id, Some(name))
            .advertising(PRIMARY_SERVICE)
            .with_service(PRIMARY_SERVICE, &[(PRIMARY_CHARACTERISTIC, write)])
    }

    pub fn advertising(mut self, service: Uuid) -> Self {
        self.advertised.push(service);
        self
    }

    pub fn with_service(mut self, service: Uuid, characteristics: &[(Uuid, WriteSupport)]) -> Self {
        let characteristics = characteristics
            .iter()
            .map(|&(uuid, write)| CharacteristicInfo {
                uuid,
                service,
                write,
            })
            .collect();
        self.services.push((service, characteristics));
        self
    }

    pub fn fail_connect(self, err: TransportError) -> Self {
        lock(&self.state).connect_failure = Some(err);
        self
    }

    /// Fail the `attempt`-th write call (1-based, retries included).
    pub fn fail_write(self, attempt: usize, err: TransportError) -> Self {
        lock(&self.state).scripted.insert(attempt, err);
        self
    }

    /// Fail every write in `mode`.
    pub fn fail_mode(self, mode: WriteMode, err: TransportError) -> Self {
        lock(&self.state).failing_modes.insert(mode, err);
        self
    }

    /// Report the link as down once `writes` writes were accepted.
    pub fn disconnect_after(self, writes: usize) -> Self {
        lock(&self.state).disconnect_after = Some(writes);
        self
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        lock(&self.state).writes.clone()
    }

    /// Accepted bytes, concatenated in write order.
    pub fn received(&self) -> Vec<u8> {
        lock(&self.state)
            .writes
            .iter()
            .flat_map(|w| w.bytes.iter().copied())
            .collect()
    }

    pub fn write_attempts(&self) -> usize {
        lock(&self.state).attempts
    }

    pub fn disconnect_calls(&self) -> usize {
        lock(&self.state).disconnects
    }
}

#[async_trait]
impl GattDevice for MockDevice {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    async fn connect(&self) -> Result<(), TransportError> {
        let mut state = lock(&self.state);
        if let Some(err) = state.connect_failure.clone() {
            return Err(err);
        }
        state.connected = true;
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        lock(&self.state).connected
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        let mut state = lock(&self.state);
        state.connected = false;
        state.disconnects += 1;
        Ok(())
    }

    async fn primary_service(&self, uuid: Uuid) -> Result<Uuid, TransportError> {
        self.services
            .iter()
            .find(|(service, _)| *service == uuid)
            .map(|(service, _)| *service)
            .ok_or_else(|| TransportError::NotFound(format!("service {}", uuid)))
    }

    async fn characteristic(&self, service: Uuid, uuid: Uuid) -> Result<CharacteristicInfo, TransportError> {
        self.services
            .iter()
            .filter(|(s, _)| *s == service)
            .flat_map(|(_, chars)| chars.iter())
            .find(|c| c.uuid == uuid)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(format!("characteristic {}", uuid)))
    }

    async fn all_characteristics(&self) -> Result<Vec<CharacteristicInfo>, TransportError> {
        Ok(self
            .services
            .iter()
            .flat_map(|(_, chars)| chars.iter().cloned())
            .collect())
    }

    async fn write(
        &self,
        characteristic: &CharacteristicInfo,
        data: &[u8],
        mode: WriteMode,
    ) -> Result<(), TransportError> {
        let mut state = lock(&self.state);
        state.attempts += 1;
        let attempt = state.attempts;

        if !state.connected {
            return Err(TransportError::Disconnected);
        }
        if let Some(err) = state.scripted.remove(&attempt) {
            return Err(err);
        }
        if let Some(err) = state.failing_modes.get(&mode) {
            return Err(err.clone());
        }
        if !characteristic.write.supports(mode) {
            return Err(TransportError::Gatt(format!("{:?} write not supported", mode)));
        }

        state.writes.push(RecordedWrite {
            mode,
            bytes: data.to_vec(),
        });
        if state.disconnect_after == Some(state.writes.len()) {
            state.connected = false;
        }
        Ok(())
    }
}
