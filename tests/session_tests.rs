//! # Print Session Tests
//!
//! Negotiation, chunked delivery and error classification against the
//! scripted in-memory host.

mod common;

use std::future::pending;

use async_trait::async_trait;
use common::{fast_profile, merchant, simple_sale};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use recibo::error::{ChunkProgress, ErrorKind, PrintError, TransportError};
use recibo::printer::config::{
    ALTERNATE_CHARACTERISTIC, ALTERNATE_SERVICE, PRIMARY_CHARACTERISTIC, PRIMARY_SERVICE,
};
use recibo::receipt::{encode_receipt, test_page};
use recibo::sale::{MerchantProfile, PrinterIdentity};
use recibo::transport::mock::{MockDevice, MockHost};
use recibo::transport::{self, BleHost, DeviceFilter, GattDevice, WriteMode, WriteSupport};
use recibo::{PrintSession, PrinterProfile};

const ADDRESS: &str = "66:22:B3:10:7A:01";

fn printer(write: WriteSupport) -> MockDevice {
    MockDevice::printer(ADDRESS, "MPT-II", write)
}

fn session_with(device: &MockDevice) -> PrintSession<MockHost> {
    PrintSession::new(MockHost::new().with_discoverable(device.clone()), fast_profile())
}

fn stream(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

// ============================================================================
// END TO END
// ============================================================================

#[tokio::test]
async fn test_print_receipt_delivers_exact_stream() {
    let device = printer(WriteSupport::BOTH);
    let session = session_with(&device);

    let outcome = session
        .print_receipt(&simple_sale(), &merchant(), None)
        .await
        .unwrap();

    let expected = encode_receipt(&simple_sale(), &merchant(), session.profile());
    assert_eq!(device.received(), expected.as_bytes());
    assert_eq!(outcome.report.bytes_sent, expected.len());
    assert_eq!(outcome.report.total_chunks, expected.len().div_ceil(512));
    assert_eq!(outcome.report.mode, WriteMode::Unacknowledged);
    assert!(!outcome.report.switched_mode);
    assert!(device.writes().iter().all(|w| w.bytes.len() <= 512));

    assert!(!outcome.message.is_empty());
    assert!(!outcome.message.contains(ADDRESS));
    assert_eq!(device.disconnect_calls(), 0, "connection stays open on success");
}

#[tokio::test]
async fn test_print_test_page() {
    let device = printer(WriteSupport::ACKNOWLEDGED_ONLY);
    let session = session_with(&device);

    session.print_test_page(None).await.unwrap();
    assert_eq!(device.received(), test_page(session.profile()).into_bytes());
}

#[tokio::test]
async fn test_explicit_disconnect() {
    let device = printer(WriteSupport::BOTH);
    let session = session_with(&device);

    let conn = session.connect(None).await.unwrap();
    session.disconnect(conn).await;
    assert_eq!(device.disconnect_calls(), 1);
}

#[tokio::test]
async fn test_rejects_incomplete_input_before_touching_bluetooth() {
    let host = MockHost::new().with_discoverable(printer(WriteSupport::BOTH));
    let session = PrintSession::new(host, fast_profile());

    let err = session
        .print_receipt(&simple_sale(), &MerchantProfile::new("  "), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let mut empty = simple_sale();
    empty.items.clear();
    let err = session.print_receipt(&empty, &merchant(), None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let mut zero = simple_sale();
    zero.items[0].quantity = 0;
    let err = session.print_receipt(&zero, &merchant(), None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(err.to_string().contains("quantity 0"));

    assert!(session.host().requests().is_empty());
}

// ============================================================================
// SENDER
// ============================================================================

#[tokio::test]
async fn test_acknowledged_only_sends_three_chunks_without_switching() {
    let device = printer(WriteSupport::ACKNOWLEDGED_ONLY);
    let session = session_with(&device);
    let data = stream(1300);

    let mut conn = session.connect(None).await.unwrap();
    let report = transport::send(&mut conn, &data, session.profile()).await.unwrap();

    assert_eq!(report.chunks_sent, 3);
    assert!(!report.switched_mode);
    assert_eq!(device.write_attempts(), 3);

    let writes = device.writes();
    assert_eq!(writes.len(), 3);
    assert!(writes.iter().all(|w| w.mode == WriteMode::Acknowledged));
    assert_eq!(
        writes.iter().map(|w| w.bytes.len()).collect::<Vec<_>>(),
        vec![512, 512, 276]
    );
    assert_eq!(device.received(), data);
}

#[tokio::test]
async fn test_disconnect_after_second_chunk_aborts_at_third() {
    let device = printer(WriteSupport::BOTH).disconnect_after(2);
    let session = session_with(&device);
    let data = stream(5 * 512 - 100);

    let mut conn = session.connect(None).await.unwrap();
    let err = transport::send(&mut conn, &data, session.profile())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConnectionLost);
    assert_eq!(err.progress(), Some(ChunkProgress { chunk: 3, total: 5 }));
    assert!(err.is_partial());
    assert!(err.to_string().contains("chunk 3 of 5"));

    // Chunks 3 to 5 were never attempted
    assert_eq!(device.write_attempts(), 2);
    assert_eq!(device.received(), &data[..1024]);
}

#[tokio::test]
async fn test_first_chunk_failure_switches_mode_once() {
    let device = printer(WriteSupport::BOTH).fail_write(1, TransportError::Gatt("busy".into()));
    let session = session_with(&device);
    let data = stream(1300);

    let mut conn = session.connect(None).await.unwrap();
    assert_eq!(conn.write_mode(), WriteMode::Unacknowledged);

    let report = transport::send(&mut conn, &data, session.profile()).await.unwrap();
    assert!(report.switched_mode);
    assert_eq!(report.mode, WriteMode::Acknowledged);
    assert_eq!(report.chunks_sent, 3);

    // One failed attempt plus three accepted writes, all after the switch
    assert_eq!(device.write_attempts(), 4);
    assert!(device.writes().iter().all(|w| w.mode == WriteMode::Acknowledged));
    assert_eq!(device.received(), data);
}

#[tokio::test]
async fn test_failure_after_switch_is_fatal() {
    let device = printer(WriteSupport::BOTH)
        .fail_write(1, TransportError::Gatt("busy".into()))
        .fail_mode(WriteMode::Acknowledged, TransportError::Gatt("rejected".into()));
    let session = session_with(&device);

    let mut conn = session.connect(None).await.unwrap();
    let err = transport::send(&mut conn, &stream(1300), session.profile())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::WriteFailed);
    assert_eq!(err.progress(), Some(ChunkProgress { chunk: 1, total: 3 }));
    assert!(!err.is_partial());
    assert_eq!(device.write_attempts(), 2);
}

#[tokio::test]
async fn test_switch_is_not_repeated_on_later_chunks() {
    let device = printer(WriteSupport::BOTH)
        .fail_write(1, TransportError::Gatt("busy".into()))
        .fail_write(3, TransportError::Gatt("busy again".into()));
    let session = session_with(&device);

    let mut conn = session.connect(None).await.unwrap();
    let err = transport::send(&mut conn, &stream(1300), session.profile())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::WriteFailed);
    assert_eq!(err.progress(), Some(ChunkProgress { chunk: 2, total: 3 }));
}

#[tokio::test]
async fn test_single_mode_characteristic_cannot_fall_back() {
    let device = printer(WriteSupport::UNACKNOWLEDGED_ONLY)
        .fail_write(1, TransportError::Gatt("busy".into()));
    let session = session_with(&device);

    let mut conn = session.connect(None).await.unwrap();
    let err = transport::send(&mut conn, &stream(100), session.profile())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::WriteFailed);
    assert_eq!(device.write_attempts(), 1);
}

#[tokio::test]
async fn test_disconnect_during_write_is_connection_lost() {
    let device = printer(WriteSupport::BOTH).fail_write(2, TransportError::Disconnected);
    let session = session_with(&device);

    let mut conn = session.connect(None).await.unwrap();
    let err = transport::send(&mut conn, &stream(1300), session.profile())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConnectionLost);
    assert_eq!(err.progress(), Some(ChunkProgress { chunk: 2, total: 3 }));
    assert_eq!(device.write_attempts(), 2, "no mode switch for a dropped link");
}

#[tokio::test]
async fn test_empty_stream_sends_nothing() {
    let device = printer(WriteSupport::BOTH);
    let session = session_with(&device);

    let mut conn = session.connect(None).await.unwrap();
    let report = transport::send(&mut conn, &[], session.profile()).await.unwrap();
    assert_eq!(report.total_chunks, 0);
    assert_eq!(device.write_attempts(), 0);
}

// ============================================================================
// NEGOTIATION
// ============================================================================

#[tokio::test]
async fn test_no_bluetooth_is_unsupported_transport() {
    let session = PrintSession::new(MockHost::unavailable(), fast_profile());
    let err = session.connect(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedTransport);
}

#[tokio::test]
async fn test_saved_identity_skips_device_selection() {
    let device = printer(WriteSupport::BOTH);
    let host = MockHost::new().with_paired(device.clone());
    let session = PrintSession::new(host, fast_profile());
    let saved = PrinterIdentity {
        device_id: ADDRESS.to_string(),
        display_name: Some("MPT-II".to_string()),
    };

    session.connect(Some(&saved)).await.unwrap();
    assert!(session.host().requests().is_empty());
}

#[tokio::test]
async fn test_saved_name_tried_before_generic_filters() {
    let device = printer(WriteSupport::BOTH);
    let session = session_with(&device);
    let saved = PrinterIdentity {
        device_id: "gone".to_string(),
        display_name: Some("Impresora Caja 1".to_string()),
    };

    let conn = session.connect(Some(&saved)).await.unwrap();
    assert_eq!(conn.service, PRIMARY_SERVICE);

    let requests = session.host().requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], vec![DeviceFilter::Name("Impresora Caja 1".into())]);
    assert_eq!(requests[1], session.profile().discovery_filters());
}

#[tokio::test]
async fn test_unknown_printer_matched_by_name_prefix() {
    let device = MockDevice::new("11:22:33:44:55:66", Some("POS-5802DD"))
        .with_service(PRIMARY_SERVICE, &[(PRIMARY_CHARACTERISTIC, WriteSupport::BOTH)]);
    let session = session_with(&device);

    let conn = session.connect(None).await.unwrap();
    assert_eq!(conn.device().id(), "11:22:33:44:55:66");
}

#[tokio::test]
async fn test_cancelled_selection_is_device_not_found() {
    let host = MockHost::new().fail_next_request(TransportError::Cancelled);
    let session = PrintSession::new(host, fast_profile());
    let err = session.connect(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeviceNotFound);
}

#[tokio::test]
async fn test_insecure_context_is_security_error() {
    let host = MockHost::new()
        .with_discoverable(printer(WriteSupport::BOTH))
        .fail_next_request(TransportError::Insecure("page is not served over https".into()));
    let session = PrintSession::new(host, fast_profile());
    let err = session.connect(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SecurityError);
}

#[tokio::test]
async fn test_connect_failure_is_connection_lost() {
    let device = printer(WriteSupport::BOTH).fail_connect(TransportError::Other("le-connection-abort-by-local".into()));
    let session = session_with(&device);
    let err = session.connect(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConnectionLost);
}

#[tokio::test]
async fn test_alternate_service_fallback() {
    let device = MockDevice::new(ADDRESS, Some("MTP-3"))
        .advertising(ALTERNATE_SERVICE)
        .with_service(ALTERNATE_SERVICE, &[(ALTERNATE_CHARACTERISTIC, WriteSupport::ACKNOWLEDGED_ONLY)]);
    let session = session_with(&device);

    let conn = session.connect(None).await.unwrap();
    assert_eq!(conn.service, ALTERNATE_SERVICE);
    assert_eq!(conn.characteristic.uuid, ALTERNATE_CHARACTERISTIC);
    assert_eq!(conn.write_mode(), WriteMode::Acknowledged);
}

#[tokio::test]
async fn test_unknown_characteristic_found_by_enumeration() {
    let notify_only = Uuid::from_u128(0x2af0);
    let vendor_write = Uuid::from_u128(0x49535343_8841_43f4_a8d4_ecbe34729bb3);
    let vendor_service = Uuid::from_u128(0x49535343_fe7d_4ae5_8fa9_9fafd205e455);

    let device = MockDevice::new(ADDRESS, Some("Printer001"))
        .with_service(PRIMARY_SERVICE, &[(notify_only, WriteSupport::NONE)])
        .with_service(vendor_service, &[(vendor_write, WriteSupport::UNACKNOWLEDGED_ONLY)]);
    let session = session_with(&device);

    let conn = session.connect(None).await.unwrap();
    assert_eq!(conn.characteristic.uuid, vendor_write);
    assert_eq!(conn.service, vendor_service);
    assert_eq!(conn.write_mode(), WriteMode::Unacknowledged);
}

#[tokio::test]
async fn test_no_writable_characteristic() {
    let device = MockDevice::new(ADDRESS, Some("MPT-II"))
        .with_service(PRIMARY_SERVICE, &[(PRIMARY_CHARACTERISTIC, WriteSupport::NONE)]);
    let session = session_with(&device);

    let err = session.connect(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CharacteristicUnsupported);
}

/// Host whose device chooser never returns.
struct StalledHost;

#[async_trait]
impl BleHost for StalledHost {
    type Device = MockDevice;

    async fn is_available(&self) -> bool {
        true
    }

    async fn paired_devices(&self) -> Result<Vec<MockDevice>, TransportError> {
        Ok(Vec::new())
    }

    async fn request_device(&self, _filters: &[DeviceFilter]) -> Result<MockDevice, TransportError> {
        pending().await
    }
}

#[tokio::test]
async fn test_discovery_timeout_is_device_not_found() {
    let profile = PrinterProfile {
        discovery_timeout_ms: Some(20),
        ..fast_profile()
    };
    let session = PrintSession::new(StalledHost, profile);

    let err = session.connect(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeviceNotFound);
    assert!(matches!(err, PrintError::DeviceNotFound(_)));
}
