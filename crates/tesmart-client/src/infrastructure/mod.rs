//! Infrastructure layer for the switch driver.
//!
//! Contains the OS-facing adapters: TCP sockets and configuration storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `tesmart_core`, but MUST NOT be imported by the `application` layer.

pub mod network;
pub mod storage;
