//! Application layer for the switch driver.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure rules in `tesmart_core`) and the infrastructure (sockets, files).
//!
//! Code in this layer:
//!
//! - **Orchestrates** domain objects to fulfil a user goal ("switch the
//!   office KVM to the Mac").
//! - **Depends on abstractions** (the [`transport::Transport`] trait) rather
//!   than on a concrete socket, so tests can count exactly how many device
//!   exchanges a call performs.
//! - **Contains no OS calls** of its own.
//!
//! # Sub-modules
//!
//! - **`switch_client`** – The per-device aggregate: port map, cached active
//!   source, cached sound mode, and the four device operations.
//! - **`transport`** – The contract for one request (or request/response)
//!   exchange with a device.

pub mod switch_client;
pub mod transport;
