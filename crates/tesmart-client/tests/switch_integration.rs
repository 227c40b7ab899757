//! End-to-end tests: `SwitchClient` over a real `TcpTransport` against a fake
//! device listening on localhost.
//!
//! # The fake device
//!
//! ```text
//! SwitchClient ──TcpTransport──► 127.0.0.1:<ephemeral>
//!                                   accept
//!                                   read 6 bytes, record them
//!                                   if query: write the canned reply
//!                                   close
//! ```
//!
//! Each accepted connection handles exactly one frame, mirroring how the
//! driver opens a fresh connection per command.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tesmart_client::{SwitchClient, SwitchError, TcpTransport, TransportError, TransportTimings};
use tesmart_core::{encode_query_response, DeviceEndpoint, Dialect, PortMap, FRAME_LEN};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_test::{assert_err, assert_ok};

/// Opcodes the fake device answers with a reply.
const QUERY_OPCODES: [u8; 2] = [0x10, 0x01];

struct FakeDevice {
    endpoint: DeviceEndpoint,
    received: Arc<Mutex<Vec<[u8; FRAME_LEN]>>>,
}

impl FakeDevice {
    /// Starts a device that answers queries with `reply`.
    ///
    /// A legacy select (`AA BB 03 01 <port> EE`) shares its opcode with the
    /// legacy query, so the argument byte tells them apart: a query carries 0.
    async fn start(reply: Vec<u8>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        let received = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&received);

        tokio::spawn(async move {
            while let Ok((mut sock, _)) = listener.accept().await {
                let mut frame = [0u8; FRAME_LEN];
                if sock.read_exact(&mut frame).await.is_err() {
                    continue;
                }
                log.lock().expect("lock").push(frame);
                let is_query = QUERY_OPCODES.contains(&frame[3]) && frame[4] == 0x00;
                if is_query {
                    let _ = sock.write_all(&reply).await;
                }
            }
        });

        Self {
            endpoint: DeviceEndpoint::new("127.0.0.1", port),
            received,
        }
    }

    fn received(&self) -> Vec<[u8; FRAME_LEN]> {
        self.received.lock().expect("lock").clone()
    }
}

fn fast_transport() -> Arc<TcpTransport> {
    Arc::new(TcpTransport::new(TransportTimings {
        connect_timeout: Duration::from_secs(2),
        settle_delay: Duration::from_millis(10),
        read_timeout: Duration::from_millis(300),
    }))
}

fn hdmi_1_to_4() -> PortMap {
    let sources = (1..=4).map(|i| format!("HDMI {i}")).collect();
    PortMap::new(Dialect::Lan, sources, Vec::<String>::new()).expect("four sources fit")
}

// ── Query ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_lan_client_reads_source_from_enveloped_reply() {
    // Arrange
    let device = FakeDevice::start(vec![0xAA, 0xBB, 0x03, 0x10, 0x03, 0xEE]).await;
    let client = SwitchClient::new(
        "Desk",
        device.endpoint.clone(),
        Dialect::Lan,
        hdmi_1_to_4(),
        fast_transport(),
    );

    // Act
    let source = assert_ok!(client.get_current_source().await);

    // Assert
    assert_eq!(source, "HDMI 3");
    assert_eq!(
        device.received(),
        vec![[0xAA, 0xBB, 0x03, 0x10, 0x00, 0xEE]],
        "exactly one LAN query must be sent"
    );
}

#[tokio::test]
async fn test_repeated_query_opens_one_connection() {
    let device = FakeDevice::start(vec![0xAA, 0xBB, 0x03, 0x10, 0x02, 0xEE]).await;
    let client = SwitchClient::new(
        "Desk",
        device.endpoint.clone(),
        Dialect::Lan,
        hdmi_1_to_4(),
        fast_transport(),
    );

    assert_eq!(assert_ok!(client.get_current_source().await), "HDMI 2");
    assert_eq!(assert_ok!(client.get_current_source().await), "HDMI 2");

    assert_eq!(device.received().len(), 1);
}

#[tokio::test]
async fn test_legacy_client_round_trips_every_port() {
    for port in 1..=8u8 {
        // Arrange
        let reply = encode_query_response(Dialect::Legacy, port).expect("legacy port");
        let device = FakeDevice::start(reply.to_vec()).await;
        let map = PortMap::with_defaults(Dialect::Legacy);
        let expected = map.name_for_wire_index(port).expect("default name").to_string();
        let client = SwitchClient::new(
            "Rack",
            device.endpoint.clone(),
            Dialect::Legacy,
            map,
            fast_transport(),
        );

        // Act
        let source = assert_ok!(client.get_current_source().await);

        // Assert
        assert_eq!(source, expected, "port {port}");
        assert_eq!(device.received()[0], [0xAA, 0xBB, 0x03, 0x01, 0x00, 0xEE]);
    }
}

#[tokio::test]
async fn test_short_reply_is_transport_error_and_cache_stays_empty() {
    // Arrange – device answers with three bytes and hangs up
    let device = FakeDevice::start(vec![0xAA, 0xBB, 0x03]).await;
    let client = SwitchClient::new(
        "Desk",
        device.endpoint.clone(),
        Dialect::Lan,
        hdmi_1_to_4(),
        fast_transport(),
    );

    // Act
    let err = assert_err!(client.get_current_source().await);

    // Assert
    assert!(
        matches!(
            err,
            SwitchError::Transport(TransportError::ShortRead {
                expected: 6,
                received: 3,
                ..
            })
        ),
        "unexpected error: {err}"
    );
    assert_eq!(client.cached_source().await, None);
}

#[tokio::test]
async fn test_status_survives_unreadable_source() {
    let device = FakeDevice::start(vec![0xAA, 0xBB, 0x03, 0x10, 0x09, 0xEE]).await;
    let client = SwitchClient::new(
        "Desk",
        device.endpoint.clone(),
        Dialect::Lan,
        hdmi_1_to_4(),
        fast_transport(),
    );

    let status = client.status().await;

    assert_eq!(status.source, None, "port 9 is beyond the four sources");
    assert_eq!(status.sources.len(), 4);
}

// ── Commands ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_select_and_beeper_write_expected_frames() {
    // Arrange
    let device = FakeDevice::start(Vec::new()).await;
    let sources = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
    let map = PortMap::new(Dialect::Lan, sources, ["B"]).expect("three sources fit");
    let client = SwitchClient::new(
        "Desk",
        device.endpoint.clone(),
        Dialect::Lan,
        map,
        fast_transport(),
    );

    // Act
    assert_ok!(client.select_source("C").await);
    assert_ok!(client.set_beeper(true).await);

    // Assert – the device may still be recording the last frame
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        device.received(),
        vec![
            [0xAA, 0xBB, 0x03, 0x01, 0x03, 0xEE],
            [0xAA, 0xBB, 0x03, 0x02, 0x01, 0xEE],
        ]
    );
    assert_eq!(assert_ok!(client.get_current_source().await), "C");
    assert_eq!(device.received().len(), 2, "cached source needs no query");
}

#[tokio::test]
async fn test_select_on_unreachable_device_is_not_delivered_but_cached() {
    // Arrange – a port with no listener
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    let client = SwitchClient::new(
        "Gone",
        DeviceEndpoint::new("127.0.0.1", port),
        Dialect::Lan,
        hdmi_1_to_4(),
        fast_transport(),
    );

    // Act
    let err = assert_err!(client.select_source("HDMI 4").await);

    // Assert
    match err {
        SwitchError::NotDelivered { command, source } => {
            assert_eq!(command, "select");
            assert!(source.is_connection_error());
        }
        other => panic!("expected NotDelivered, got {other}"),
    }
    assert_eq!(client.cached_source().await.as_deref(), Some("HDMI 4"));
}
