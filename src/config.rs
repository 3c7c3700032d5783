//! Test configuration
//!
//! Immutable for the length of a run. Persisted in LocalStorage on web,
//! read from a JSON file on native.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Parameters of a single perception test run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    /// Test length in whole seconds (counted from the end of the countdown)
    pub test_length_secs: u32,
    /// Display rate the test starts at
    pub starting_rate_hz: u32,
    /// Rates at or above this are never reached
    pub max_rate_hz: u32,
    /// Amount to change the rate by at each random interval
    pub update_step_hz: u32,
    /// Whether the rate may go back down
    pub allow_decrease: bool,
    /// Chance to decrease instead of increase (0.0 - 1.0)
    pub decrease_chance: f64,
    /// Minimum seconds to wait before changing the rate
    pub min_interval_secs: u32,
    /// Maximum seconds to wait before changing the rate (exclusive)
    pub max_interval_secs: u32,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            test_length_secs: 60,
            starting_rate_hz: 30,
            max_rate_hz: 90,
            update_step_hz: 15,
            allow_decrease: true,
            decrease_chance: 0.2,
            min_interval_secs: 4,
            max_interval_secs: 8,
        }
    }
}

impl TestConfig {
    /// Check the config invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_rate_hz == 0 {
            return Err(ConfigError::ZeroStartingRate);
        }
        if self.starting_rate_hz > self.max_rate_hz {
            return Err(ConfigError::StartAboveMax {
                starting_hz: self.starting_rate_hz,
                max_hz: self.max_rate_hz,
            });
        }
        if !(0.0..=1.0).contains(&self.decrease_chance) {
            return Err(ConfigError::DecreaseChanceOutOfRange(self.decrease_chance));
        }
        if self.min_interval_secs > self.max_interval_secs {
            return Err(ConfigError::IntervalInverted {
                min_secs: self.min_interval_secs,
                max_secs: self.max_interval_secs,
            });
        }
        Ok(())
    }

    /// Test length in milliseconds
    pub fn test_length_ms(&self) -> f64 {
        f64::from(self.test_length_secs) * 1000.0
    }

    /// Settings as shown to the user and written to exports
    pub fn display_settings(&self) -> DisplaySettings {
        DisplaySettings {
            test_length: self.test_length_secs,
            starting_hz: self.starting_rate_hz,
            max_hz: self.max_rate_hz,
            update_hz_by: self.update_step_hz,
            allow_hz_to_decrease: self.allow_decrease,
            chance_to_decrease_hz: self.decrease_chance,
            minimum_time_between_changes: self.min_interval_secs,
            maximum_time_between_changes: self.max_interval_secs,
        }
    }

    /// Parse and validate a config from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a config file
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "hz_bounce_config";

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded test config from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored config: {}", e),
                }
            }
        }

        log::info!("Using default test config");
        Self::default()
    }

    /// Native runs take their config from a file instead
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

/// Config renamed for display and export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(rename = "TestLength")]
    pub test_length: u32,
    #[serde(rename = "StartingHZ")]
    pub starting_hz: u32,
    #[serde(rename = "MaxHZ")]
    pub max_hz: u32,
    #[serde(rename = "UpdateHZBy")]
    pub update_hz_by: u32,
    #[serde(rename = "AllowHZToDecrease")]
    pub allow_hz_to_decrease: bool,
    #[serde(rename = "ChanceToDecreaseHZ")]
    pub chance_to_decrease_hz: f64,
    #[serde(rename = "MinimumTimeBetweenChanges")]
    pub minimum_time_between_changes: u32,
    #[serde(rename = "MaximumTimeBetweenChanges")]
    pub maximum_time_between_changes: u32,
}
