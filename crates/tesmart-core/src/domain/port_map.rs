//! Port map domain entity.
//!
//! A switch only knows its inputs by number (1, 2, 3, ...).  Users know them
//! by name ("Work laptop", "Gaming PC").  The [`PortMap`] is the two-way
//! dictionary between the two, plus an ignore list of names that should not
//! be offered for selection.
//!
//! ```text
//! sources = ["PC", "Mac", "Pi"]      ignore = {"Pi"}
//!
//!   wire index   1     2      3
//!   name        PC    Mac    Pi
//!   selectable  yes   yes    no
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::protocol::dialect::Dialect;

/// Errors raised by port map construction and lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortMapError {
    /// A wire index does not correspond to a configured source.
    #[error("port {index} is out of range: {len} source(s) configured")]
    OutOfRange { index: u8, len: u8 },

    /// A name was requested that is not in the source list.
    #[error("unknown source: {0:?}")]
    UnknownSource(String),

    /// More sources were configured than the firmware can address.
    #[error("{count} sources configured but the {dialect} firmware addresses at most {max}")]
    TooManySources {
        count: usize,
        max: u8,
        dialect: Dialect,
    },
}

/// Returns a fresh default source list for `dialect`.
///
/// LAN firmware: `"HDMI 1"` .. `"HDMI 16"`.  Legacy firmware: `"HDMI 0"` ..
/// `"HDMI 7"`.  Every call allocates a new list, so two clients never share
/// (and can never mutate) the same defaults.
pub fn default_sources(dialect: Dialect) -> Vec<String> {
    let first = u16::from(dialect.first_default_label());
    (0..u16::from(dialect.max_ports()))
        .map(|offset| format!("HDMI {}", first + offset))
        .collect()
}

/// Bidirectional mapping between 1-based wire indices and source names.
///
/// Built once from configuration and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMap {
    /// Position `i` holds the name of wire index `i + 1`.
    sources: Vec<String>,
    /// Names hidden from [`list_sources`](Self::list_sources).
    ignore: HashSet<String>,
}

impl PortMap {
    /// Creates a port map for a device speaking `dialect`.
    ///
    /// # Errors
    ///
    /// Returns [`PortMapError::TooManySources`] when `sources` has more
    /// entries than the dialect can address.
    pub fn new<I, S>(
        dialect: Dialect,
        sources: Vec<String>,
        ignore: I,
    ) -> Result<Self, PortMapError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let max = dialect.max_ports();
        if sources.len() > usize::from(max) {
            return Err(PortMapError::TooManySources {
                count: sources.len(),
                max,
                dialect,
            });
        }
        Ok(Self {
            sources,
            ignore: ignore.into_iter().map(Into::into).collect(),
        })
    }

    /// Creates a port map holding the dialect's [`default_sources`].
    pub fn with_defaults(dialect: Dialect) -> Self {
        Self {
            sources: default_sources(dialect),
            ignore: HashSet::new(),
        }
    }

    /// Returns the name at wire index `index` (1-based).
    ///
    /// # Errors
    ///
    /// Returns [`PortMapError::OutOfRange`] when no source sits at `index`.
    pub fn name_for_wire_index(&self, index: u8) -> Result<&str, PortMapError> {
        usize::from(index)
            .checked_sub(1)
            .and_then(|i| self.sources.get(i))
            .map(String::as_str)
            .ok_or(PortMapError::OutOfRange {
                index,
                len: self.port_count(),
            })
    }

    /// Returns the 1-based wire index of the first source called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PortMapError::UnknownSource`] when `name` is not configured.
    pub fn wire_index_for_name(&self, name: &str) -> Result<u8, PortMapError> {
        self.sources
            .iter()
            .position(|s| s == name)
            // The constructor caps the list at 16 entries, so this fits in a u8.
            .map(|i| (i + 1) as u8)
            .ok_or_else(|| PortMapError::UnknownSource(name.to_string()))
    }

    /// Returns every configured source that is not ignored, in wire order.
    ///
    /// An empty result means "nothing selectable" and is not an error.
    pub fn list_sources(&self) -> Vec<String> {
        self.sources
            .iter()
            .filter(|s| !self.ignore.contains(s.as_str()))
            .cloned()
            .collect()
    }

    /// Returns the full source list, ignored entries included.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Number of configured sources, as the highest addressable wire index.
    pub fn port_count(&self) -> u8 {
        self.sources.len() as u8
    }

    /// Number of configured sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns `true` if no sources are configured.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
