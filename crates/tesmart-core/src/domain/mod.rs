//! Domain entities for the TESmart driver.
//!
//! This module contains pure data and translation rules with no
//! infrastructure dependencies.
//!
//! # What belongs here? (for beginners)
//!
//! The domain layer describes *what* a switch is from the driver's point of
//! view: where it lives on the network, which names its inputs carry, and
//! what sound modes it offers.  It never opens a socket or reads a file, so
//! every rule here can be tested in microseconds on any platform.

/// The TCP address of one switch.
pub mod endpoint;

/// Translation between wire port numbers and configured source names.
///
/// See [`port_map::PortMap`] for the main type.
pub mod port_map;

/// The beeper setting exposed as a "sound mode".
pub mod sound_mode;
