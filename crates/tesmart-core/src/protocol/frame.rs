//! The fixed 6-byte wire frame.
//!
//! Wire format:
//! ```text
//! [0xAA][0xBB][0x03][opcode:1][argument:1][0xEE]
//! ```
//! Every command and every reply is exactly [`FRAME_LEN`] bytes.  There is no
//! checksum, no sequence number, and no length prefix beyond the constant
//! `0x03`.

use std::fmt;

/// Total size of a frame in bytes.
pub const FRAME_LEN: usize = 6;

/// The two fixed leading bytes of every frame.
pub const HEADER: [u8; 2] = [0xAA, 0xBB];

/// The constant "length" byte at offset 2.
pub const LENGTH_BYTE: u8 = 0x03;

/// The fixed trailing byte of every frame.
pub const FOOTER: u8 = 0xEE;

/// Offset of the opcode byte.
pub const OPCODE_OFFSET: usize = 3;

/// Offset of the argument byte in a command.
pub const ARGUMENT_OFFSET: usize = 4;

/// Offset of the current-port byte in a bare (non-enveloped) query reply.
pub const PORT_OFFSET: usize = 5;

// ── Opcodes ───────────────────────────────────────────────────────────────────

/// Command opcodes understood by the switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Switch to the input given in the argument byte.  The legacy firmware
    /// also answers a query sent with this opcode and a zero argument.
    SelectSource = 0x01,
    /// Turn the audible beeper on (`01`) or off (`00`).
    SetBeeper = 0x02,
    /// Ask for the currently active input (LAN firmware).
    QuerySource = 0x10,
}

// ── Frame ─────────────────────────────────────────────────────────────────────

/// One encoded 6-byte frame, ready to be written to the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    /// Builds a command frame around `opcode` and `argument`.
    pub const fn new(opcode: Opcode, argument: u8) -> Self {
        Self([HEADER[0], HEADER[1], LENGTH_BYTE, opcode as u8, argument, FOOTER])
    }

    /// Returns the raw bytes of the frame.
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// Returns the opcode byte.
    pub fn opcode(&self) -> u8 {
        self.0[OPCODE_OFFSET]
    }

    /// Returns the argument byte.
    pub fn argument(&self) -> u8 {
        self.0[ARGUMENT_OFFSET]
    }
}

/// Formats the frame as contiguous uppercase hex, e.g. `AABB031000EE`.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

/// Returns `true` if `bytes` carries the fixed header, length byte, and footer.
///
/// Replies are never rejected for a missing envelope; the LAN dialect uses
/// this to decide which byte carries the port.
pub fn has_envelope(bytes: &[u8]) -> bool {
    bytes.len() == FRAME_LEN
        && bytes[..2] == HEADER
        && bytes[2] == LENGTH_BYTE
        && bytes[FRAME_LEN - 1] == FOOTER
}
