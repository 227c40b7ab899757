//! Binary codec for TESmart command and reply frames.
//!
//! Commands:
//! ```text
//! query   AA BB 03 10 00 EE   (LAN)      AA BB 03 01 00 EE   (legacy)
//! select  AA BB 03 01 <port> EE
//! beeper  AA BB 03 02 <01|00> EE
//! ```
//! Replies to a query are six bytes; where the port lives and how it is biased
//! is decided by the [`Dialect`].

use thiserror::Error;
use tracing::debug;

use crate::protocol::dialect::Dialect;
use crate::protocol::frame::{Frame, Opcode, FOOTER, FRAME_LEN, HEADER, LENGTH_BYTE};

/// Highest port number a single argument byte is ever allowed to carry.
pub const MAX_WIRE_PORTS: u8 = 16;

/// Errors that can occur during frame encoding or decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// A command argument is outside the range the device accepts.
    #[error("invalid port {port}: expected 1..={port_count}")]
    InvalidArgument { port: u8, port_count: u8 },

    /// The reply does not have the fixed frame length.
    #[error("malformed response: expected {expected} bytes, got {received}")]
    MalformedResponse { expected: usize, received: usize },

    /// The reply names a port outside the configured range.
    #[error("reply byte 0x{raw:02X} does not name a port in 1..={port_count}")]
    OutOfRange { raw: u8, port_count: u8 },
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Encodes the "which input is active?" query for `dialect`.
///
/// # Examples
///
/// ```rust
/// use tesmart_core::{encode_query, Dialect};
///
/// assert_eq!(encode_query(Dialect::Lan).as_bytes(), &[0xAA, 0xBB, 0x03, 0x10, 0x00, 0xEE]);
/// assert_eq!(encode_query(Dialect::Legacy).as_bytes(), &[0xAA, 0xBB, 0x03, 0x01, 0x00, 0xEE]);
/// ```
pub fn encode_query(dialect: Dialect) -> Frame {
    Frame::new(dialect.query_opcode(), 0x00)
}

/// Encodes a "switch to `port`" command.
///
/// `port_count` is the number of ports the caller is allowed to address
/// (the configured source count, capped by the dialect).
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidArgument`] if `port` is 0, greater than
/// `port_count`, or greater than [`MAX_WIRE_PORTS`].
pub fn encode_select(port: u8, port_count: u8) -> Result<Frame, ProtocolError> {
    let limit = port_count.min(MAX_WIRE_PORTS);
    if port == 0 || port > limit {
        return Err(ProtocolError::InvalidArgument {
            port,
            port_count: limit,
        });
    }
    Ok(Frame::new(Opcode::SelectSource, port))
}

/// Encodes a beeper on/off command.
pub fn encode_set_beeper(on: bool) -> Frame {
    Frame::new(Opcode::SetBeeper, u8::from(on))
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Decodes a query reply into a 1-based port number.
///
/// # Errors
///
/// - [`ProtocolError::MalformedResponse`] if `bytes` is not exactly
///   [`FRAME_LEN`] bytes long.
/// - [`ProtocolError::OutOfRange`] if the decoded port is outside
///   `1..=port_count` (this includes a legacy reply below the bias).
///
/// # Examples
///
/// ```rust
/// use tesmart_core::{decode_query_response, Dialect};
///
/// let reply = [0xAA, 0xBB, 0x03, 0x10, 0x03, 0xEE];
/// let port = decode_query_response(Dialect::Lan, &reply, 4).unwrap();
/// assert_eq!(port, 3);
///
/// let reply = [0xAA, 0xBB, 0x03, 0x01, 0x00, 22];
/// let port = decode_query_response(Dialect::Legacy, &reply, 8).unwrap();
/// assert_eq!(port, 1);
/// ```
pub fn decode_query_response(
    dialect: Dialect,
    bytes: &[u8],
    port_count: u8,
) -> Result<u8, ProtocolError> {
    if bytes.len() != FRAME_LEN {
        return Err(ProtocolError::MalformedResponse {
            expected: FRAME_LEN,
            received: bytes.len(),
        });
    }

    if bytes[..2] != HEADER || bytes[2] != LENGTH_BYTE {
        debug!(reply = ?bytes, "query reply carries an unexpected header");
    }

    let raw = bytes[dialect.reply_port_offset(bytes)];
    match dialect.port_from_reply_byte(raw) {
        Some(port) if port >= 1 && port <= port_count => Ok(port),
        _ => Err(ProtocolError::OutOfRange { raw, port_count }),
    }
}

/// Builds the reply a device of `dialect` would send while `port` is active.
///
/// Used by simulators and tests; the driver itself never sends replies.
/// LAN replies use the enveloped form, legacy replies put the biased port in
/// the last byte.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidArgument`] if `port` cannot be represented
/// by the dialect.
pub fn encode_query_response(
    dialect: Dialect,
    port: u8,
) -> Result<[u8; FRAME_LEN], ProtocolError> {
    let invalid = ProtocolError::InvalidArgument {
        port,
        port_count: dialect.max_ports(),
    };
    if port == 0 || port > dialect.max_ports() {
        return Err(invalid);
    }
    let byte = dialect.reply_byte_for_port(port).ok_or(invalid)?;
    let opcode = dialect.query_opcode() as u8;
    let reply = match dialect {
        Dialect::Lan => [HEADER[0], HEADER[1], LENGTH_BYTE, opcode, byte, FOOTER],
        Dialect::Legacy => [HEADER[0], HEADER[1], LENGTH_BYTE, opcode, 0x00, byte],
    };
    Ok(reply)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── encode ────────────────────────────────────────────────────────────────

    #[test]
    fn test_encode_query_lan_uses_opcode_10() {
        assert_eq!(
            encode_query(Dialect::Lan).as_bytes(),
            &[0xAA, 0xBB, 0x03, 0x10, 0x00, 0xEE]
        );
    }

    #[test]
    fn test_encode_query_legacy_uses_opcode_01() {
        assert_eq!(
            encode_query(Dialect::Legacy).as_bytes(),
            &[0xAA, 0xBB, 0x03, 0x01, 0x00, 0xEE]
        );
    }

    #[test]
    fn test_encode_select_writes_port_as_argument() {
        // Arrange / Act
        let frame = encode_select(3, 16).expect("port 3 is valid");

        // Assert
        assert_eq!(frame.as_bytes(), &[0xAA, 0xBB, 0x03, 0x01, 0x03, 0xEE]);
    }

    #[test]
    fn test_encode_select_port_16_is_hex_10() {
        let frame = encode_select(16, 16).unwrap();
        assert_eq!(frame.argument(), 0x10);
    }

    #[test]
    fn test_encode_select_rejects_port_zero() {
        assert_eq!(
            encode_select(0, 16),
            Err(ProtocolError::InvalidArgument {
                port: 0,
                port_count: 16
            })
        );
    }

    #[test]
    fn test_encode_select_rejects_port_beyond_count() {
        assert!(matches!(
            encode_select(5, 4),
            Err(ProtocolError::InvalidArgument { port: 5, port_count: 4 })
        ));
    }

    #[test]
    fn test_encode_select_caps_count_at_sixteen() {
        assert!(matches!(
            encode_select(17, 40),
            Err(ProtocolError::InvalidArgument { port_count: 16, .. })
        ));
    }

    #[test]
    fn test_encode_set_beeper_on_and_off() {
        assert_eq!(
            encode_set_beeper(true).as_bytes(),
            &[0xAA, 0xBB, 0x03, 0x02, 0x01, 0xEE]
        );
        assert_eq!(
            encode_set_beeper(false).as_bytes(),
            &[0xAA, 0xBB, 0x03, 0x02, 0x00, 0xEE]
        );
    }

    // ── decode ────────────────────────────────────────────────────────────────

    #[test]
    fn test_decode_lan_enveloped_reply() {
        let reply = [0xAA, 0xBB, 0x03, 0x10, 0x03, 0xEE];
        assert_eq!(decode_query_response(Dialect::Lan, &reply, 4), Ok(3));
    }

    #[test]
    fn test_decode_lan_bare_reply_reads_byte_five() {
        let reply = [0xAA, 0xBB, 0x03, 0x10, 0x00, 0x01];
        assert_eq!(decode_query_response(Dialect::Lan, &reply, 16), Ok(1));
    }

    #[test]
    fn test_decode_legacy_subtracts_bias() {
        let reply = [0xAA, 0xBB, 0x03, 0x01, 0x00, 22];
        assert_eq!(decode_query_response(Dialect::Legacy, &reply, 8), Ok(1));
    }

    #[test]
    fn test_decode_empty_bytes_returns_malformed() {
        assert_eq!(
            decode_query_response(Dialect::Lan, &[], 16),
            Err(ProtocolError::MalformedResponse {
                expected: 6,
                received: 0
            })
        );
    }

    #[test]
    fn test_decode_short_reply_returns_malformed() {
        let result = decode_query_response(Dialect::Lan, &[0xAA, 0xBB, 0x03, 0x10, 0x02], 16);
        assert!(matches!(result, Err(ProtocolError::MalformedResponse { received: 5, .. })));
    }

    #[test]
    fn test_decode_long_reply_returns_malformed() {
        let result = decode_query_response(Dialect::Lan, &[0u8; 7], 16);
        assert!(matches!(result, Err(ProtocolError::MalformedResponse { received: 7, .. })));
    }

    #[test]
    fn test_decode_port_beyond_configured_sources_is_out_of_range() {
        // Arrange: device reports port 5 but only four sources are configured
        let reply = [0xAA, 0xBB, 0x03, 0x10, 0x05, 0xEE];

        // Act
        let result = decode_query_response(Dialect::Lan, &reply, 4);

        // Assert
        assert_eq!(
            result,
            Err(ProtocolError::OutOfRange {
                raw: 5,
                port_count: 4
            })
        );
    }

    #[test]
    fn test_decode_lan_port_zero_is_out_of_range() {
        let reply = [0xAA, 0xBB, 0x03, 0x10, 0x00, 0xEE];
        assert!(matches!(
            decode_query_response(Dialect::Lan, &reply, 16),
            Err(ProtocolError::OutOfRange { raw: 0, .. })
        ));
    }

    #[test]
    fn test_decode_legacy_underflow_is_out_of_range() {
        let reply = [0xAA, 0xBB, 0x03, 0x01, 0x00, 0x03];
        assert!(matches!(
            decode_query_response(Dialect::Legacy, &reply, 8),
            Err(ProtocolError::OutOfRange { raw: 3, .. })
        ));
    }

    #[test]
    fn test_decode_ignores_unexpected_header() {
        let reply = [0x00, 0x00, 0x00, 0x00, 0x00, 0x02];
        assert_eq!(decode_query_response(Dialect::Lan, &reply, 16), Ok(2));
    }

    // ── synthetic replies ─────────────────────────────────────────────────────

    #[test]
    fn test_encode_query_response_lan_is_enveloped() {
        assert_eq!(
            encode_query_response(Dialect::Lan, 3),
            Ok([0xAA, 0xBB, 0x03, 0x10, 0x03, 0xEE])
        );
    }

    #[test]
    fn test_encode_query_response_legacy_biases_last_byte() {
        assert_eq!(
            encode_query_response(Dialect::Legacy, 1),
            Ok([0xAA, 0xBB, 0x03, 0x01, 0x00, 22])
        );
    }

    #[test]
    fn test_encode_query_response_rejects_port_beyond_dialect() {
        assert!(encode_query_response(Dialect::Legacy, 9).is_err());
        assert!(encode_query_response(Dialect::Lan, 0).is_err());
    }
}
