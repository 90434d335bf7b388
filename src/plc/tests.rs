//! Unit tests for the PLC client against a local fake controller.

use super::client::PlcClient;
use super::io::read_reply;
use crate::error::AppError;
use crate::wms::{CodecError, ProtocolMode};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const READY_STATUS: [u8; 20] = [0, 2, 2, 5, 0, 0x44, 3, 1, 0, 0, 0x01, 0, 0, 0, 0, 4, 0, 0, 0, 0];

/// Accept one connection, read `request_len` bytes, answer with `reply`.
async fn fake_plc(request_len: usize, reply: Vec<u8>) -> (u16, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = vec![0u8; request_len];
        socket.read_exact(&mut request).await.unwrap();
        socket.write_all(&reply).await.unwrap();
        socket.shutdown().await.unwrap();
        request
    });

    (port, handle)
}

#[tokio::test]
async fn test_request_status_simple() {
    let (port, plc) = fake_plc(2, READY_STATUS.to_vec()).await;
    let mut client = PlcClient::new("127.0.0.1", port, 2, ProtocolMode::Simple);

    client.connect().await.unwrap();
    let status = client.request_status().await.unwrap();
    client.disconnect().await.unwrap();

    assert_eq!(plc.await.unwrap(), vec![0, 2]);
    assert_eq!(status.software_version.to_string(), "2.5");
    assert!(status.installation_ready());
    assert_eq!(status.trolley_count, 3);
    assert_eq!(status.aisle_lighting.lit_aisles(), vec![1]);
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_open_aisle_legacy_frame() {
    let (port, plc) = fake_plc(6, READY_STATUS.to_vec()).await;
    let mut client = PlcClient::new("127.0.0.1", port, 2, ProtocolMode::Legacy);

    client.connect().await.unwrap();
    let status = client.open_aisle(4).await.unwrap();

    assert_eq!(plc.await.unwrap(), vec![0x02, 0x02, 0x4F, 0x04, 0x02 ^ 0x4F ^ 0x04, 0x03]);
    assert_eq!(status.last_open_aisle, 4);
}

#[tokio::test]
async fn test_open_aisle_rejects_out_of_range() {
    let mut client = PlcClient::new("127.0.0.1", 1, 2, ProtocolMode::Simple).with_max_aisle(19);

    assert!(matches!(client.open_aisle(0).await, Err(AppError::Validation(_))));
    assert!(matches!(client.open_aisle(20).await, Err(AppError::Validation(_))));
    assert!(client.check_aisle(19).is_ok());
}

#[tokio::test]
async fn test_short_reply_is_malformed() {
    let (port, plc) = fake_plc(2, vec![0u8; 12]).await;
    let mut client = PlcClient::new("127.0.0.1", port, 2, ProtocolMode::Simple);

    client.connect().await.unwrap();
    let result = client.request_status().await;
    plc.await.unwrap();

    match result {
        Err(AppError::Codec(CodecError::MalformedResponse { expected, actual })) => {
            assert_eq!(expected, 20);
            assert_eq!(actual, 12);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_closed_without_reply_is_transport_error() {
    let (port, plc) = fake_plc(2, Vec::new()).await;
    let mut client = PlcClient::new("127.0.0.1", port, 2, ProtocolMode::Simple);

    client.connect().await.unwrap();
    let err = client.request_status().await.unwrap_err();
    plc.await.unwrap();

    assert!(err.is_transport());
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_exchange_requires_connection() {
    let mut client = PlcClient::new("127.0.0.1", 1, 2, ProtocolMode::Simple);
    let err = client.request_status().await.unwrap_err();
    assert!(matches!(err, AppError::TcpConnectionFailed(_)));
}

#[tokio::test]
async fn test_fetch_status_disconnects() {
    let (port, plc) = fake_plc(2, READY_STATUS.to_vec()).await;
    let mut client = PlcClient::new("127.0.0.1", port, 2, ProtocolMode::Simple);

    let status = client.fetch_status().await.unwrap();
    plc.await.unwrap();

    assert!(status.system_healthy());
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_diagnose_reachable_controller() {
    let (port, plc) = fake_plc(2, READY_STATUS.to_vec()).await;
    let mut client = PlcClient::new("127.0.0.1", port, 2, ProtocolMode::Simple);

    let diagnosis = client.diagnose_connection().await;
    plc.await.unwrap();

    assert!(diagnosis.tcp_reachable);
    assert!(diagnosis.protocol_ok);
    assert_eq!(diagnosis.software_version.as_deref(), Some("2.5"));
    assert!(diagnosis.to_string().contains("Protocol OK: true"));
}

#[tokio::test]
async fn test_diagnose_keeps_existing_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let plc = tokio::spawn(async move {
        let (mut session, _) = listener.accept().await.unwrap();

        let (mut probe, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 2];
        probe.read_exact(&mut request).await.unwrap();
        probe.write_all(&READY_STATUS).await.unwrap();
        probe.shutdown().await.unwrap();

        session.read_exact(&mut request).await.unwrap();
        session.write_all(&READY_STATUS).await.unwrap();
        request
    });

    let mut client = PlcClient::new("127.0.0.1", port, 2, ProtocolMode::Simple);
    client.connect().await.unwrap();

    let diagnosis = client.diagnose_connection().await;
    assert!(diagnosis.protocol_ok);
    assert!(client.is_connected());

    let status = client.request_status().await.unwrap();
    assert_eq!(plc.await.unwrap(), [0, 2]);
    assert!(status.installation_ready());
    assert!(client.is_connected());
}

#[tokio::test]
async fn test_diagnose_unreachable_controller() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut client = PlcClient::new("127.0.0.1", port, 2, ProtocolMode::Simple);
    let diagnosis = client.diagnose_connection().await;

    assert!(!diagnosis.tcp_reachable);
    assert!(diagnosis.tcp_error.is_some());
    assert!(!diagnosis.protocol_ok);
}

#[tokio::test]
async fn test_read_reply_assembles_chunks() {
    let (mut client_side, mut plc_side) = tokio::io::duplex(64);

    let writer = tokio::spawn(async move {
        plc_side.write_all(&READY_STATUS[..7]).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        plc_side.write_all(&READY_STATUS[7..]).await.unwrap();
    });

    let reply = read_reply(&mut client_side, Duration::from_secs(2)).await.unwrap();
    writer.await.unwrap();

    assert_eq!(reply, READY_STATUS.to_vec());
}

#[tokio::test]
async fn test_read_reply_timeout() {
    let (mut client_side, _plc_side) = tokio::io::duplex(64);
    let err = read_reply(&mut client_side, Duration::from_millis(50)).await.unwrap_err();
    assert!(matches!(err, AppError::DeviceTimeout(_)));
}
