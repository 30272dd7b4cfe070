//! # Capability Negotiation
//!
//! Turns an optional saved printer into a connected device with a known
//! writable characteristic.
//!
//! ## Resolution Order
//!
//! ```text
//! host available? ──no──► UnsupportedTransport
//!      │
//! saved id among paired devices? ──yes──┐
//!      │ no                             │
//! request_device([Name(saved)])         │
//!      │ fails                          │
//! request_device(services + prefixes)   │
//!      ▼                                ▼
//! connect ─► primary service ─► alternate service
//!      ▼
//! known characteristic UUIDs ─► first writable characteristic on the device
//! ```
//!
//! Every step tries its candidates in order and keeps the first success.
//! Only the error of the last candidate is reported.

use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{BleHost, CharacteristicInfo, DeviceFilter, GattDevice, WriteMode, WriteSupport};
use crate::error::{PrintError, TransportError};
use crate::printer::PrinterProfile;
use crate::sale::PrinterIdentity;

/// A connected printer and the characteristic receipts are written to.
///
/// Owned by a single print session; the sender mutates `write_mode` at most
/// once when it falls back.
#[derive(Debug)]
pub struct NegotiatedConnection<D> {
    pub(crate) device: D,
    pub service: Uuid,
    pub characteristic: CharacteristicInfo,
    pub(crate) write_mode: WriteMode,
}

impl<D: GattDevice> NegotiatedConnection<D> {
    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    pub fn write_support(&self) -> WriteSupport {
        self.characteristic.write
    }

    /// Drop the link. The connection is consumed either way.
    pub async fn disconnect(self) -> Result<(), TransportError> {
        debug!(device_id = %self.device.id(), "Disconnecting");
        self.device.disconnect().await
    }
}

/// Select, connect and resolve a printer.
pub async fn negotiate<H: BleHost>(
    host: &H,
    profile: &PrinterProfile,
    saved: Option<&PrinterIdentity>,
) -> Result<NegotiatedConnection<H::Device>, PrintError> {
    if !host.is_available().await {
        return Err(PrintError::UnsupportedTransport);
    }

    let device = select_device(host, profile, saved).await?;
    info!(device_id = %device.id(), name = ?device.name(), "Selected printer");

    device.connect().await.map_err(classify)?;

    let characteristic = resolve_characteristic(&device, profile).await?;
    let write_mode = characteristic
        .write
        .preferred()
        .ok_or(PrintError::CharacteristicUnsupported)?;

    info!(
        service = %characteristic.service,
        characteristic = %characteristic.uuid,
        ?write_mode,
        acknowledged = characteristic.write.acknowledged,
        unacknowledged = characteristic.write.unacknowledged,
        "Negotiated printer connection"
    );

    Ok(NegotiatedConnection {
        service: characteristic.service,
        characteristic,
        write_mode,
        device,
    })
}

/// Map a host failure during negotiation onto the error taxonomy.
pub(crate) fn classify(err: TransportError) -> PrintError {
    match err {
        TransportError::Unavailable => PrintError::UnsupportedTransport,
        TransportError::Insecure(reason) => PrintError::Security(reason),
        TransportError::Cancelled | TransportError::Timeout(_) | TransportError::NotFound(_) => {
            PrintError::DeviceNotFound(err.to_string())
        }
        other => PrintError::connection_lost(other.to_string()),
    }
}

/// Try `attempt` on each candidate in order, returning the first success
/// or the last failure.
async fn resolve_first<C, T, F, Fut>(
    what: &str,
    candidates: impl IntoIterator<Item = C>,
    mut attempt: F,
) -> Result<T, TransportError>
where
    C: Debug,
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    let mut last = None;
    for candidate in candidates {
        let label = format!("{:?}", candidate);
        match attempt(candidate).await {
            Ok(found) => return Ok(found),
            Err(e) => {
                debug!(what, candidate = %label, error = %e, "Candidate failed, trying next");
                last = Some(e);
            }
        }
    }
    Err(last.unwrap_or_else(|| TransportError::NotFound(format!("no {} candidates", what))))
}

async fn select_device<H: BleHost>(
    host: &H,
    profile: &PrinterProfile,
    saved: Option<&PrinterIdentity>,
) -> Result<H::Device, PrintError> {
    if let Some(identity) = saved {
        match host.paired_devices().await {
            Ok(devices) => {
                if let Some(device) = devices.into_iter().find(|d| d.id() == identity.device_id) {
                    debug!(device_id = %identity.device_id, "Using saved printer");
                    return Ok(device);
                }
                debug!(device_id = %identity.device_id, "Saved printer is not paired, requesting device");
            }
            Err(e) => warn!(error = %e, "Could not list paired devices"),
        }
    }

    let mut chains = Vec::new();
    if let Some(name) = saved
        .and_then(|s| s.display_name.as_deref())
        .filter(|n| !n.trim().is_empty())
    {
        chains.push(vec![DeviceFilter::Name(name.to_string())]);
    }
    chains.push(profile.discovery_filters());

    let timeout = profile.discovery_timeout();
    resolve_first("device filter", chains, move |filters| {
        request_device(host, filters, timeout)
    })
    .await
    .map_err(classify)
}

async fn request_device<H: BleHost>(
    host: &H,
    filters: Vec<DeviceFilter>,
    timeout: Option<Duration>,
) -> Result<H::Device, TransportError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, host.request_device(&filters))
            .await
            .map_err(|_| TransportError::Timeout(format!("no device selected within {:?}", limit)))?,
        None => host.request_device(&filters).await,
    }
}

async fn resolve_characteristic<D: GattDevice>(
    device: &D,
    profile: &PrinterProfile,
) -> Result<CharacteristicInfo, PrintError> {
    match resolve_first("service", profile.service_candidates(), move |uuid| {
        device.primary_service(uuid)
    })
    .await
    {
        Ok(service) => {
            let known = resolve_first(
                "characteristic",
                profile.characteristics.iter().copied(),
                move |uuid| writable(device, service, uuid),
            )
            .await;
            match known {
                Ok(characteristic) => return Ok(characteristic),
                Err(e) => debug!(%service, error = %e, "No known characteristic, enumerating"),
            }
        }
        Err(TransportError::Disconnected) => {
            return Err(PrintError::connection_lost(TransportError::Disconnected.to_string()));
        }
        Err(e) => warn!(error = %e, "Known services not found, enumerating"),
    }

    let all = device.all_characteristics().await.map_err(classify)?;
    all.into_iter()
        .find(|c| c.write.any())
        .ok_or(PrintError::CharacteristicUnsupported)
}

async fn writable<D: GattDevice>(
    device: &D,
    service: Uuid,
    uuid: Uuid,
) -> Result<CharacteristicInfo, TransportError> {
    let characteristic = device.characteristic(service, uuid).await?;
    if characteristic.write.any() {
        Ok(characteristic)
    } else {
        Err(TransportError::Gatt(format!("characteristic {} is not writable", uuid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert!(matches!(
            classify(TransportError::Cancelled),
            PrintError::DeviceNotFound(_)
        ));
        assert!(matches!(
            classify(TransportError::Timeout("x".into())),
            PrintError::DeviceNotFound(_)
        ));
        assert!(matches!(
            classify(TransportError::Insecure("http".into())),
            PrintError::Security(_)
        ));
        assert!(matches!(
            classify(TransportError::Unavailable),
            PrintError::UnsupportedTransport
        ));
        assert!(matches!(
            classify(TransportError::Other("adapter reset".into())),
            PrintError::ConnectionLost { progress: None, .. }
        ));
    }

    #[tokio::test]
    async fn test_resolve_first_returns_first_success() {
        let result = resolve_first("n", [1, 2, 3], |n| async move {
            if n >= 2 {
                Ok(n * 10)
            } else {
                Err(TransportError::NotFound(n.to_string()))
            }
        })
        .await;
        assert_eq!(result, Ok(20));
    }

    #[tokio::test]
    async fn test_resolve_first_reports_last_error() {
        let result: Result<(), _> = resolve_first("n", [1, 2], |n| async move {
            Err(TransportError::NotFound(n.to_string()))
        })
        .await;
        assert_eq!(result, Err(TransportError::NotFound("2".into())));
    }

    #[tokio::test]
    async fn test_resolve_first_empty() {
        let result: Result<(), _> =
            resolve_first("service", Vec::<u8>::new(), |_| async { Ok(()) }).await;
        assert!(matches!(result, Err(TransportError::NotFound(_))));
    }
}
