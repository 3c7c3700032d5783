//! Error types
//!
//! Config errors are raised once, when a controller is built. The only
//! runtime failure is a surface resize while a test is in flight.

use std::fmt;

/// Invalid or unreadable test configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Starting rate must be above zero
    ZeroStartingRate,
    /// Starting rate must not exceed the maximum rate
    StartAboveMax { starting_hz: u32, max_hz: u32 },
    /// Decrease chance must be a probability
    DecreaseChanceOutOfRange(f64),
    /// Minimum wait must not exceed the maximum wait
    IntervalInverted { min_secs: u32, max_secs: u32 },
    /// Config file could not be read
    Io(std::io::Error),
    /// Config JSON could not be parsed
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroStartingRate => write!(f, "starting rate must be above 0 Hz"),
            ConfigError::StartAboveMax {
                starting_hz,
                max_hz,
            } => write!(
                f,
                "starting rate {starting_hz} Hz is above the maximum of {max_hz} Hz"
            ),
            ConfigError::DecreaseChanceOutOfRange(p) => {
                write!(f, "decrease chance {p} is not within 0..=1")
            }
            ConfigError::IntervalInverted { min_secs, max_secs } => write!(
                f,
                "minimum wait {min_secs}s is longer than maximum wait {max_secs}s"
            ),
            ConfigError::Io(e) => write!(f, "failed to read config: {e}"),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// A session-ending condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// The surface changed size while the test was counting down or running
    Resized,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Resized => write!(f, "surface resized during the test"),
        }
    }
}

impl std::error::Error for SessionError {}
