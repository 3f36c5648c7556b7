// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Slope Risk Simulation Core - Engine Configuration

//! Operator-tunable engine settings.
//!
//! Every section implements `Default` with the dashboard's values, so an
//! empty file (or no file) reproduces stock behaviour. The critical alert
//! threshold is a fixed constant, not a setting.
//!
//! ```toml
//! [timing]
//! run_delay_ms = 2000
//! pulse_interval_ms = 1000
//!
//! [tone]
//! frequency_hz = 800.0
//!
//! [catalog.zones.zone1]
//! name = "Haul Road Sector 7"
//! baseline_stability = 75
//! risk_level = 25
//! ai_confidence = 78.5
//! ```

use crate::alert::ToneSpec;
use crate::simulation::DEFAULT_RUN_DELAY_MS;
use crate::zones::{ZoneCatalog, ZoneProfile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("zone `{zone}`: {reason}")]
    InvalidZone { zone: String, reason: String },
    #[error("timing: {0}")]
    InvalidTiming(String),
    #[error("tone: {0}")]
    InvalidTone(String),
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Simulated analysis latency of one scenario run.
    pub run_delay_ms: u64,
    /// Spacing of alarm pulses while an alert is armed.
    pub pulse_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            run_delay_ms: DEFAULT_RUN_DELAY_MS,
            pulse_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub tone: ToneSpec,
    #[serde(default)]
    pub catalog: ZoneCatalog,
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!(path = %path.display(), zones = config.catalog.len(), "loaded engine config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.pulse_interval_ms == 0 {
            return Err(ConfigError::InvalidTiming("pulse_interval_ms must be positive".into()));
        }
        if !(self.tone.frequency_hz.is_finite() && self.tone.frequency_hz > 0.0) {
            return Err(ConfigError::InvalidTone("frequency_hz must be a positive number".into()));
        }
        if !(0.0..=1.0).contains(&self.tone.gain) {
            return Err(ConfigError::InvalidTone("gain must lie in 0.0..=1.0".into()));
        }
        for (id, profile) in self.catalog.iter() {
            validate_zone(id, profile)?;
        }
        validate_zone("fallback", &self.catalog.fallback)
    }
}

fn validate_zone(id: &str, profile: &ZoneProfile) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidZone {
        zone: id.to_string(),
        reason: reason.to_string(),
    };
    if profile.baseline_stability > 100 {
        return Err(invalid("baseline_stability must lie in 0..=100"));
    }
    if profile.risk_level > 100 {
        return Err(invalid("risk_level must lie in 0..=100"));
    }
    if !(0.0..=100.0).contains(&profile.ai_confidence) {
        return Err(invalid("ai_confidence must lie in 0.0..=100.0"));
    }
    Ok(())
}
