//! Transport contract: one exchange with a device per call.
//!
//! The switch never keeps a session open.  Every operation is either
//!
//! - **request-only** ([`Transport::send`]): connect, write six bytes, close; or
//! - **request/response** ([`Transport::send_and_receive`]): connect, write,
//!   wait for the device to settle, read the reply, close.
//!
//! Implementations never retry and never swallow an error; retry policy, if
//! any, belongs to the caller.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use tesmart_core::{DeviceEndpoint, Frame};
use thiserror::Error;

/// Errors raised while talking to a device.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The TCP connection could not be established (refused, unreachable, ...).
    #[error("could not connect to {endpoint}: {source}")]
    Connect {
        endpoint: DeviceEndpoint,
        #[source]
        source: io::Error,
    },

    /// The TCP connection was not established before the deadline.
    #[error("timed out after {timeout:?} connecting to {endpoint}")]
    ConnectTimeout {
        endpoint: DeviceEndpoint,
        timeout: Duration,
    },

    /// Writing the command frame failed.
    #[error("failed to write to {endpoint}: {source}")]
    Write {
        endpoint: DeviceEndpoint,
        #[source]
        source: io::Error,
    },

    /// Reading the reply failed with an I/O error.
    #[error("failed to read from {endpoint}: {source}")]
    Read {
        endpoint: DeviceEndpoint,
        #[source]
        source: io::Error,
    },

    /// The device closed the connection or went quiet before a full reply arrived.
    #[error("short read from {endpoint}: expected {expected} bytes, got {received}")]
    ShortRead {
        endpoint: DeviceEndpoint,
        expected: usize,
        received: usize,
    },
}

impl TransportError {
    /// Returns `true` for failures to reach or write to the device, as opposed
    /// to problems with its reply.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            TransportError::Connect { .. }
                | TransportError::ConnectTimeout { .. }
                | TransportError::Write { .. }
        )
    }
}

/// Trait for exchanging frames with a device.
///
/// The production implementation is
/// [`TcpTransport`](crate::infrastructure::network::tcp_transport::TcpTransport);
/// unit tests use the generated `MockTransport`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Opens a connection, writes `frame`, and closes the connection.
    async fn send(&self, endpoint: &DeviceEndpoint, frame: Frame) -> Result<(), TransportError>;

    /// Opens a connection, writes `frame`, waits for the device to settle, and
    /// reads up to `response_size` bytes before closing.
    ///
    /// Returns exactly `response_size` bytes on success.
    async fn send_and_receive(
        &self,
        endpoint: &DeviceEndpoint,
        frame: Frame,
        response_size: usize,
    ) -> Result<Vec<u8>, TransportError>;
}
