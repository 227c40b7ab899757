//! Beeper setting, exposed to callers as a named "sound mode".

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Whether the switch beeps when the input changes.
///
/// The device has no command to read this back, so the driver only ever
/// knows the last value it sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundMode {
    BeeperOn,
    BeeperOff,
}

impl SoundMode {
    /// Every sound mode, in the order it is offered to users.
    pub const ALL: [SoundMode; 2] = [SoundMode::BeeperOn, SoundMode::BeeperOff];

    /// Builds a sound mode from the beeper flag.
    pub fn from_beeper(on: bool) -> Self {
        if on {
            SoundMode::BeeperOn
        } else {
            SoundMode::BeeperOff
        }
    }

    /// Returns `true` for [`SoundMode::BeeperOn`].
    pub fn beeper_on(self) -> bool {
        matches!(self, SoundMode::BeeperOn)
    }

    /// User-facing label.
    pub fn label(self) -> &'static str {
        match self {
            SoundMode::BeeperOn => "Beeper On",
            SoundMode::BeeperOff => "Beeper Off",
        }
    }
}

impl fmt::Display for SoundMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned for an unrecognized sound mode label.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sound mode {0:?}; expected \"Beeper On\" or \"Beeper Off\"")]
pub struct ParseSoundModeError(pub String);

/// Accepts the labels (`"Beeper On"`) as well as the short forms `on`/`off`,
/// case-insensitively.
impl FromStr for SoundMode {
    type Err = ParseSoundModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beeper on" | "on" => Ok(SoundMode::BeeperOn),
            "beeper off" | "off" => Ok(SoundMode::BeeperOff),
            _ => Err(ParseSoundModeError(s.to_string())),
        }
    }
}
