//! Network infrastructure.
//!
//! # Sub-modules
//!
//! - **`tcp_transport`** – The tokio implementation of
//!   [`crate::application::transport::Transport`]: one fresh TCP connection per
//!   device call, a fixed settle delay before reading a reply, and an explicit
//!   deadline on every blocking step.

pub mod tcp_transport;
