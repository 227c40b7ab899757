//! TcpTransport: one short-lived TCP connection per device call.
//!
//! # Why not keep the connection open? (for beginners)
//!
//! The switch's embedded network stack is primitive: it has no message
//! framing beyond the fixed six bytes, no sequence numbers, and is known to
//! misbehave when a connection lingers.  Opening a fresh connection for every
//! command and closing it straight after matches how the device expects to be
//! driven.
//!
//! # Timing
//!
//! ```text
//! connect ──► write 6 bytes ──► [settle delay] ──► read ≤ 6 bytes ──► close
//!  ≤ connect_timeout            fixed 200 ms       ≤ read_timeout
//! ```
//!
//! The settle delay is not negotiated: the device simply needs some time
//! before its reply can be read.  Every step is bounded, so a call always
//! finishes; dropping the returned future cancels it at the next await point.

use std::time::Duration;

use async_trait::async_trait;
use tesmart_core::{DeviceEndpoint, Frame};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time,
};
use tracing::{debug, trace};

use crate::application::transport::{Transport, TransportError};

/// Wait between writing a query and reading its reply.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(200);

/// Upper bound on establishing the TCP connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on receiving a complete reply once the settle delay is over.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Deadlines and delays used by [`TcpTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportTimings {
    pub connect_timeout: Duration,
    pub settle_delay: Duration,
    pub read_timeout: Duration,
}

impl Default for TransportTimings {
    /// | Field           | Default  |
    /// |-----------------|----------|
    /// | connect_timeout | 5 s      |
    /// | settle_delay    | 200 ms   |
    /// | read_timeout    | 2 s      |
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// The production [`Transport`] over `tokio::net::TcpStream`.
///
/// Holds no connection state, so a single instance can be shared (behind an
/// `Arc`) by every configured device.
#[derive(Debug, Clone, Default)]
pub struct TcpTransport {
    timings: TransportTimings,
}

impl TcpTransport {
    /// Creates a transport with the given timings.
    pub fn new(timings: TransportTimings) -> Self {
        Self { timings }
    }

    async fn connect(&self, endpoint: &DeviceEndpoint) -> Result<TcpStream, TransportError> {
        let connect = TcpStream::connect((endpoint.host.as_str(), endpoint.port));
        match time::timeout(self.timings.connect_timeout, connect).await {
            Ok(Ok(stream)) => {
                // Six-byte commands must not sit in Nagle's buffer.
                if let Err(e) = stream.set_nodelay(true) {
                    trace!(%endpoint, "could not set TCP_NODELAY: {e}");
                }
                Ok(stream)
            }
            Ok(Err(source)) => Err(TransportError::Connect {
                endpoint: endpoint.clone(),
                source,
            }),
            Err(_elapsed) => Err(TransportError::ConnectTimeout {
                endpoint: endpoint.clone(),
                timeout: self.timings.connect_timeout,
            }),
        }
    }

    async fn write_frame(
        stream: &mut TcpStream,
        endpoint: &DeviceEndpoint,
        frame: Frame,
    ) -> Result<(), TransportError> {
        debug!(%endpoint, %frame, "writing frame");
        let write = async {
            stream.write_all(frame.as_bytes()).await?;
            stream.flush().await
        };
        write.await.map_err(|source| TransportError::Write {
            endpoint: endpoint.clone(),
            source,
        })
    }

    /// Reads until `buf` is full, the peer closes, or the read deadline passes.
    async fn read_reply(
        &self,
        stream: &mut TcpStream,
        endpoint: &DeviceEndpoint,
        response_size: usize,
    ) -> Result<Vec<u8>, TransportError> {
        let mut buf = vec![0u8; response_size];
        let mut filled = 0;
        let deadline = time::Instant::now() + self.timings.read_timeout;

        while filled < response_size {
            match time::timeout_at(deadline, stream.read(&mut buf[filled..])).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => filled += n,
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Ok(Err(source)) => {
                    return Err(TransportError::Read {
                        endpoint: endpoint.clone(),
                        source,
                    })
                }
                Err(_elapsed) => {
                    debug!(%endpoint, filled, "read deadline passed");
                    break;
                }
            }
        }

        if filled < response_size {
            return Err(TransportError::ShortRead {
                endpoint: endpoint.clone(),
                expected: response_size,
                received: filled,
            });
        }
        debug!(%endpoint, reply = ?buf, "received reply");
        Ok(buf)
    }

    async fn close(mut stream: TcpStream, endpoint: &DeviceEndpoint) {
        if let Err(e) = stream.shutdown().await {
            // The command is already written; a failed FIN is not worth surfacing.
            trace!(%endpoint, "shutdown after exchange failed: {e}");
        }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&self, endpoint: &DeviceEndpoint, frame: Frame) -> Result<(), TransportError> {
        let mut stream = self.connect(endpoint).await?;
        Self::write_frame(&mut stream, endpoint, frame).await?;
        Self::close(stream, endpoint).await;
        Ok(())
    }

    async fn send_and_receive(
        &self,
        endpoint: &DeviceEndpoint,
        frame: Frame,
        response_size: usize,
    ) -> Result<Vec<u8>, TransportError> {
        let mut stream = self.connect(endpoint).await?;
        Self::write_frame(&mut stream, endpoint, frame).await?;
        time::sleep(self.timings.settle_delay).await;
        let reply = self.read_reply(&mut stream, endpoint, response_size).await;
        Self::close(stream, endpoint).await;
        reply
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
