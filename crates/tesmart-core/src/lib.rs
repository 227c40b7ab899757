//! # tesmart-core
//!
//! Shared library for the TESmart switch driver containing the 6-byte wire
//! codec, the firmware dialect rules, and the port-to-name mapping.
//!
//! It has zero dependencies on sockets, async runtimes, or the file system, so
//! everything here can be unit-tested in isolation.
//!
//! # Architecture overview (for beginners)
//!
//! A TESmart HDMI switch is a small embedded box with several HDMI inputs and
//! one output.  It listens on a TCP port (5000 by default) and understands a
//! tiny binary protocol: every command and every reply is exactly six bytes.
//!
//! This crate (`tesmart-core`) is the pure foundation.  It defines:
//!
//! - **`protocol`** – How bytes travel over the wire.  Commands are encoded
//!   into `AA BB 03 <op> <arg> EE` frames and query replies are decoded back
//!   into a 1-based port number.  The two known firmware families
//!   ("dialects") differ in their query opcode and reply bias; that difference
//!   lives entirely in [`protocol::Dialect`].
//!
//! - **`domain`** – Plain data with no I/O: the device endpoint, the
//!   [`PortMap`] that translates between wire port numbers and the names a
//!   user configured ("PC", "Mac", ...), and the beeper [`SoundMode`].

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `tesmart_core::PortMap` instead of `tesmart_core::domain::port_map::PortMap`.
pub use domain::endpoint::{DeviceEndpoint, DEFAULT_DEVICE_PORT};
pub use domain::port_map::{default_sources, PortMap, PortMapError};
pub use domain::sound_mode::{ParseSoundModeError, SoundMode};
pub use protocol::codec::{
    decode_query_response, encode_query, encode_query_response, encode_select, encode_set_beeper,
    ProtocolError,
};
pub use protocol::dialect::Dialect;
pub use protocol::frame::{Frame, FRAME_LEN};
