//! SwitchClient: the operations a caller performs on one TESmart switch.
//!
//! # What this use case does (for beginners)
//!
//! A caller thinks in source *names* ("PC", "Mac").  The switch thinks in
//! six-byte frames carrying port *numbers*.  `SwitchClient` sits between the
//! two:
//!
//! ```text
//!   select_source("Mac")
//!        │  PortMap:  "Mac" → 2
//!        │  codec:    2 → AA BB 03 01 02 EE
//!        ▼
//!   Transport::send ──────────────────────────► device
//! ```
//!
//! It also remembers the last source it saw or asked for, so repeated
//! `get_current_source` calls do not hit the network.
//!
//! # Source cache
//!
//! ```text
//!   Unknown ──get_current_source (ok)──► Known(name)
//!   Unknown ──select_source(name)──────► Known(name)
//!   Known   ──select_source(other)─────► Known(other)
//! ```
//!
//! There is no transition back to `Unknown`.  Selecting a source updates the
//! cache *before* the device confirms anything (the device never does); a
//! failed send is still reported to the caller as
//! [`SwitchError::NotDelivered`].
//!
//! # Architecture
//!
//! The client depends only on the [`Transport`] trait and on `tesmart-core`.
//! The production transport is injected by `main`; unit tests inject a
//! `MockTransport` to count network calls.

use std::sync::Arc;

use tesmart_core::{
    decode_query_response, encode_query, encode_select, encode_set_beeper, DeviceEndpoint,
    Dialect, PortMap, PortMapError, ProtocolError, SoundMode, FRAME_LEN,
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::application::transport::{Transport, TransportError};

/// Errors returned by [`SwitchClient`] operations.
#[derive(Debug, Error)]
pub enum SwitchError {
    /// Encoding a command or decoding a reply failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A source name or port number did not resolve.
    #[error(transparent)]
    PortMap(#[from] PortMapError),

    /// The query exchange with the device failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A fire-and-forget command never reached the device.
    ///
    /// The client's cached state has already been updated when this is
    /// returned.
    #[error("{command} command was not delivered")]
    NotDelivered {
        command: &'static str,
        #[source]
        source: TransportError,
    },
}

/// Point-in-time view of a switch, as shown by `tesmart status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchStatus {
    pub name: String,
    pub endpoint: DeviceEndpoint,
    pub dialect: Dialect,
    pub available: bool,
    /// `None` when the source could not be determined.
    pub source: Option<String>,
    pub sources: Vec<String>,
    pub sound_mode: Option<SoundMode>,
}

/// Driver for a single switch.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct SwitchClient {
    name: String,
    unique_id: Option<String>,
    endpoint: DeviceEndpoint,
    dialect: Dialect,
    port_map: PortMap,
    transport: Arc<dyn Transport>,
    current_source: Mutex<Option<String>>,
    sound_mode: Mutex<Option<SoundMode>>,
}

impl SwitchClient {
    /// Creates a client with an empty cache.  No I/O happens here.
    pub fn new(
        name: impl Into<String>,
        endpoint: DeviceEndpoint,
        dialect: Dialect,
        port_map: PortMap,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            name: name.into(),
            unique_id: None,
            endpoint,
            dialect,
            port_map,
            transport,
            current_source: Mutex::new(None),
            sound_mode: Mutex::new(None),
        }
    }

    /// Attaches a stable identifier for hosts that track devices across renames.
    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unique_id(&self) -> Option<&str> {
        self.unique_id.as_deref()
    }

    pub fn endpoint(&self) -> &DeviceEndpoint {
        &self.endpoint
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn port_map(&self) -> &PortMap {
        &self.port_map
    }

    /// Highest port this client may address: the configured source count,
    /// capped by what the firmware supports.
    fn port_count(&self) -> u8 {
        self.port_map.port_count().min(self.dialect.max_ports())
    }

    // ── Source ────────────────────────────────────────────────────────────────

    /// Returns the active source name.
    ///
    /// Once a source is known it is returned from the cache without touching
    /// the network.  Otherwise the device is queried and the answer cached.
    /// A reply never replaces a source cached in the meantime by
    /// [`select_source`](Self::select_source); the cached name is returned
    /// instead.
    ///
    /// # Errors
    ///
    /// Transport, decoding, and mapping failures are returned as-is and leave
    /// the cache unchanged.
    pub async fn get_current_source(&self) -> Result<String, SwitchError> {
        if let Some(name) = self.current_source.lock().await.clone() {
            debug!(device = %self.name, source = %name, "source served from cache");
            return Ok(name);
        }

        let reply = self
            .transport
            .send_and_receive(&self.endpoint, encode_query(self.dialect), FRAME_LEN)
            .await?;
        let port = decode_query_response(self.dialect, &reply, self.port_count())?;
        let name = self.port_map.name_for_wire_index(port)?.to_string();

        debug!(device = %self.name, port, source = %name, "queried active source");
        // A select that completed while the query was in flight wins.
        let mut cache = self.current_source.lock().await;
        Ok(cache.get_or_insert(name).clone())
    }

    /// Returns the cached source without any I/O.
    pub async fn cached_source(&self) -> Option<String> {
        self.current_source.lock().await.clone()
    }

    /// Switches the device to the source called `name`.
    ///
    /// The cache is updated whether or not the command reaches the device.
    ///
    /// # Errors
    ///
    /// - [`SwitchError::PortMap`] if `name` is not configured; nothing is sent.
    /// - [`SwitchError::NotDelivered`] if the command could not be sent.
    pub async fn select_source(&self, name: &str) -> Result<(), SwitchError> {
        let port = self.port_map.wire_index_for_name(name)?;
        let frame = encode_select(port, self.port_count())?;

        let outcome = self.transport.send(&self.endpoint, frame).await;
        *self.current_source.lock().await = Some(name.to_string());

        match outcome {
            Ok(()) => {
                info!(device = %self.name, source = %name, port, "switched source");
                Ok(())
            }
            Err(source) => {
                warn!(device = %self.name, source_name = %name, "select not delivered: {source}");
                Err(SwitchError::NotDelivered {
                    command: "select",
                    source,
                })
            }
        }
    }

    /// Names the user may select, in port order, with ignored entries removed.
    pub fn list_sources(&self) -> Vec<String> {
        self.port_map.list_sources()
    }

    // ── Beeper ────────────────────────────────────────────────────────────────

    /// Turns the switch's beeper on or off.
    ///
    /// Like [`select_source`](Self::select_source), the cached sound mode is
    /// updated before the outcome is known.
    ///
    /// # Errors
    ///
    /// [`SwitchError::NotDelivered`] if the command could not be sent.
    pub async fn set_beeper(&self, on: bool) -> Result<(), SwitchError> {
        let outcome = self.transport.send(&self.endpoint, encode_set_beeper(on)).await;
        let mode = SoundMode::from_beeper(on);
        *self.sound_mode.lock().await = Some(mode);

        match outcome {
            Ok(()) => {
                info!(device = %self.name, %mode, "set sound mode");
                Ok(())
            }
            Err(source) => {
                warn!(device = %self.name, %mode, "beeper command not delivered: {source}");
                Err(SwitchError::NotDelivered {
                    command: "beeper",
                    source,
                })
            }
        }
    }

    /// Same as [`set_beeper`](Self::set_beeper), for callers holding a [`SoundMode`].
    pub async fn select_sound_mode(&self, mode: SoundMode) -> Result<(), SwitchError> {
        self.set_beeper(mode.beeper_on()).await
    }

    /// Last sound mode sent, if any.  The device cannot be asked.
    pub async fn sound_mode(&self) -> Option<SoundMode> {
        *self.sound_mode.lock().await
    }

    pub fn sound_mode_list(&self) -> &'static [SoundMode] {
        &SoundMode::ALL
    }

    // ── Status ────────────────────────────────────────────────────────────────

    /// Always `true`: the protocol has no liveness query.
    pub fn is_available(&self) -> bool {
        true
    }

    /// Collects a [`SwitchStatus`].
    ///
    /// Never fails: if the source cannot be determined it is reported as
    /// `None` and a warning is logged.
    pub async fn status(&self) -> SwitchStatus {
        let source = match self.get_current_source().await {
            Ok(name) => Some(name),
            Err(e) => {
                warn!(device = %self.name, endpoint = %self.endpoint, "could not read source: {e}");
                None
            }
        };

        SwitchStatus {
            name: self.name.clone(),
            endpoint: self.endpoint.clone(),
            dialect: self.dialect,
            available: self.is_available(),
            source,
            sources: self.list_sources(),
            sound_mode: self.sound_mode().await,
        }
    }
}

impl std::fmt::Debug for SwitchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwitchClient")
            .field("name", &self.name)
            .field("unique_id", &self.unique_id)
            .field("endpoint", &self.endpoint)
            .field("dialect", &self.dialect)
            .field("port_map", &self.port_map)
            .finish_non_exhaustive()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
