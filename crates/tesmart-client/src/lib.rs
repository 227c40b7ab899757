//! tesmart-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! ```text
//! main.rs (CLI)
//!  └─ infrastructure::storage   -- loads config.toml, builds clients
//!  └─ application::SwitchClient -- caches state, sequences requests
//!       └─ dyn Transport  ◄── infrastructure::network::TcpTransport
//!            └─ tesmart_core    -- frames, dialects, port map
//! ```

pub mod application;
pub mod infrastructure;

pub use application::switch_client::{SwitchClient, SwitchError, SwitchStatus};
pub use application::transport::{Transport, TransportError};
pub use infrastructure::network::tcp_transport::{TcpTransport, TransportTimings};
pub use infrastructure::storage::config::{load_config, AppConfig, ConfigError, DeviceConfig};
