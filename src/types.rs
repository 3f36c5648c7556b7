// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Slope Risk Simulation Core - Type Definitions

use crate::adapter::clamp_to_domain;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Parameter Domains ──────────────────────────────────────────────────────

pub const RAINFALL_MIN: Decimal = dec!(0);
pub const RAINFALL_MAX: Decimal = dec!(100);
pub const SEISMIC_MIN: Decimal = dec!(0);
pub const SEISMIC_MAX: Decimal = dec!(5);

/// Stored precision (decimal places) for each numeric parameter. The
/// dashboard slider moves rainfall in whole mm/h; bridge callers may send
/// finer values, kept to 2 dp.
const RAINFALL_DP: u32 = 2;
const SEISMIC_DP: u32 = 1;

/// Stability index and failure probability floors/ceilings.
pub const STABILITY_FLOOR: u8 = 5;
pub const STABILITY_CEILING: u8 = 100;
pub const FAILURE_FLOOR: u8 = 5;
pub const FAILURE_CEILING: u8 = 95;

/// Failure probability shown before any simulation has run.
pub const BASE_FAILURE_PERCENT: u8 = 15;

// ─── Errors ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    #[error("unknown simulation parameter `{0}`")]
    UnknownKey(String),
}

// ─── Parameter Key ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ParameterKey {
    RainfallRate,
    SeismicMagnitude,
    RockBoltsApplied,
    DewateringApplied,
}

impl ParameterKey {
    pub const ALL: [ParameterKey; 4] = [
        Self::RainfallRate,
        Self::SeismicMagnitude,
        Self::RockBoltsApplied,
        Self::DewateringApplied,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RainfallRate => "rainfallRate",
            Self::SeismicMagnitude => "seismicMagnitude",
            Self::RockBoltsApplied => "rockBoltsApplied",
            Self::DewateringApplied => "dewateringApplied",
        }
    }

}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterKey {
    type Err = ParameterError;

    /// Accepts the camelCase wire names plus the short dashboard names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rainfallRate" | "rainfall_rate" | "rainfall" => Ok(Self::RainfallRate),
            "seismicMagnitude" | "seismic_magnitude" | "seismic" => Ok(Self::SeismicMagnitude),
            "rockBoltsApplied" | "rock_bolts_applied" | "rockBolts" => Ok(Self::RockBoltsApplied),
            "dewateringApplied" | "dewatering_applied" | "dewatering" => Ok(Self::DewateringApplied),
            other => Err(ParameterError::UnknownKey(other.to_string())),
        }
    }
}

/// Raw value written by a parameter edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterValue {
    Number(f64),
    Flag(bool),
}

/// What happened to a parameter edit. Edits never fail hard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Stored as given (after precision quantization).
    Applied,
    /// Out of domain; the nearest boundary was stored.
    Clamped,
    /// Ignored because a run is in progress.
    Locked,
    /// Ignored because the value has no meaning for the key (NaN, flag for a number).
    Rejected,
}

// ─── Simulation Parameters ──────────────────────────────────────────────────

/// Environmental triggers and proposed mitigations for one scenario.
///
/// Numeric fields are private so every write goes through the clamping
/// setters; a stored value is always inside its domain. Not `Deserialize`:
/// build one with `new` or the setters.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    #[serde(with = "rust_decimal::serde::float")]
    rainfall_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    seismic_magnitude: Decimal,
    pub rock_bolts_applied: bool,
    pub dewatering_applied: bool,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            rainfall_rate: dec!(60),
            seismic_magnitude: dec!(0),
            rock_bolts_applied: false,
            dewatering_applied: false,
        }
    }
}

impl SimulationParameters {
    /// Build a parameter set, clamping both numeric fields into their domains.
    pub fn new(rainfall_rate: f64, seismic_magnitude: f64, rock_bolts: bool, dewatering: bool) -> Self {
        let mut params = Self {
            rock_bolts_applied: rock_bolts,
            dewatering_applied: dewatering,
            ..Self::default()
        };
        params.set_rainfall_rate(rainfall_rate);
        params.set_seismic_magnitude(seismic_magnitude);
        params
    }

    pub fn rainfall_rate(&self) -> Decimal {
        self.rainfall_rate
    }

    pub fn seismic_magnitude(&self) -> Decimal {
        self.seismic_magnitude
    }

    pub fn set_rainfall_rate(&mut self, value: f64) -> UpdateOutcome {
        match clamp_to_domain(value, RAINFALL_MIN, RAINFALL_MAX, RAINFALL_DP) {
            Some((v, clamped)) => {
                self.rainfall_rate = v;
                if clamped { UpdateOutcome::Clamped } else { UpdateOutcome::Applied }
            }
            None => UpdateOutcome::Rejected,
        }
    }

    pub fn set_seismic_magnitude(&mut self, value: f64) -> UpdateOutcome {
        match clamp_to_domain(value, SEISMIC_MIN, SEISMIC_MAX, SEISMIC_DP) {
            Some((v, clamped)) => {
                self.seismic_magnitude = v;
                if clamped { UpdateOutcome::Clamped } else { UpdateOutcome::Applied }
            }
            None => UpdateOutcome::Rejected,
        }
    }

    /// Apply one edit. Mitigation flags accept a number (non-zero is on) so
    /// checkbox and slider edits share one entry point.
    pub fn apply(&mut self, key: ParameterKey, value: ParameterValue) -> UpdateOutcome {
        match (key, value) {
            (ParameterKey::RainfallRate, ParameterValue::Number(v)) => self.set_rainfall_rate(v),
            (ParameterKey::SeismicMagnitude, ParameterValue::Number(v)) => self.set_seismic_magnitude(v),
            (ParameterKey::RainfallRate | ParameterKey::SeismicMagnitude, ParameterValue::Flag(_)) => {
                UpdateOutcome::Rejected
            }
            (_, ParameterValue::Number(v)) if v.is_nan() => UpdateOutcome::Rejected,
            (ParameterKey::RockBoltsApplied, v) => {
                self.rock_bolts_applied = flag(v);
                UpdateOutcome::Applied
            }
            (ParameterKey::DewateringApplied, v) => {
                self.dewatering_applied = flag(v);
                UpdateOutcome::Applied
            }
        }
    }

    pub fn mitigations_applied(&self) -> u8 {
        self.rock_bolts_applied as u8 + self.dewatering_applied as u8
    }
}

fn flag(value: ParameterValue) -> bool {
    match value {
        ParameterValue::Flag(b) => b,
        ParameterValue::Number(n) => n != 0.0,
    }
}

// ─── Failure Class ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum FailureClass {
    Low,
    Medium,
    High,
}

impl FailureClass {
    pub fn from_percent(failure_percent: u8) -> Self {
        if failure_percent > 70 {
            Self::High
        } else if failure_percent > 40 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

// ─── Stability Status ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum StabilityStatus {
    Stable,
    Warning,
    Critical,
}

impl StabilityStatus {
    pub fn from_index(stability_index: u8) -> Self {
        if stability_index >= 70 {
            Self::Stable
        } else if stability_index >= 40 {
            Self::Warning
        } else {
            Self::Critical
        }
    }
}

// ─── Simulation Result ──────────────────────────────────────────────────────

/// Predicted outcome of one scenario. The failure class is always derived
/// from the failure probability and never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase", from = "RawSimulationResult")]
pub struct SimulationResult {
    stability_index: u8,
    failure_probability_percent: u8,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSimulationResult {
    stability_index: u8,
    failure_probability_percent: u8,
}

impl From<RawSimulationResult> for SimulationResult {
    fn from(raw: RawSimulationResult) -> Self {
        Self::new(raw.stability_index, raw.failure_probability_percent)
    }
}

impl SimulationResult {
    /// Clamps both values into their display domains.
    pub fn new(stability_index: u8, failure_probability_percent: u8) -> Self {
        Self {
            stability_index: stability_index.clamp(STABILITY_FLOOR, STABILITY_CEILING),
            failure_probability_percent: failure_probability_percent.clamp(FAILURE_FLOOR, FAILURE_CEILING),
        }
    }

    pub fn stability_index(&self) -> u8 {
        self.stability_index
    }

    pub fn failure_probability_percent(&self) -> u8 {
        self.failure_probability_percent
    }

    pub fn failure_class(&self) -> FailureClass {
        FailureClass::from_percent(self.failure_probability_percent)
    }

    pub fn stability_status(&self) -> StabilityStatus {
        StabilityStatus::from_index(self.stability_index)
    }

    /// High-stress heatmap is drawn below this stability.
    pub fn stress_overlay(&self) -> bool {
        self.stability_index < 40
    }

    pub fn report(&self) -> KpiReport {
        KpiReport {
            stability_index: self.stability_index,
            stability_status: self.stability_status(),
            failure_probability_percent: self.failure_probability_percent,
            failure_class: self.failure_class(),
            stress_overlay: self.stress_overlay(),
        }
    }
}

/// Render-ready snapshot of a result with its derived projections.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KpiReport {
    pub stability_index: u8,
    pub stability_status: StabilityStatus,
    pub failure_probability_percent: u8,
    pub failure_class: FailureClass,
    pub stress_overlay: bool,
}

// ─── Run Status ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Idle,
    Running,
    Complete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_simulator_reset_values() {
        let p = SimulationParameters::default();
        assert_eq!(p.rainfall_rate(), dec!(60));
        assert_eq!(p.seismic_magnitude(), dec!(0));
        assert!(!p.rock_bolts_applied);
        assert!(!p.dewatering_applied);
    }

    #[test]
    fn numeric_writes_clamp_to_boundaries() {
        let mut p = SimulationParameters::default();
        assert_eq!(p.set_rainfall_rate(140.0), UpdateOutcome::Clamped);
        assert_eq!(p.rainfall_rate(), dec!(100));
        assert_eq!(p.set_rainfall_rate(-1.0), UpdateOutcome::Clamped);
        assert_eq!(p.rainfall_rate(), dec!(0));
        assert_eq!(p.set_seismic_magnitude(7.2), UpdateOutcome::Clamped);
        assert_eq!(p.seismic_magnitude(), dec!(5));
        assert_eq!(p.set_seismic_magnitude(-0.5), UpdateOutcome::Clamped);
        assert_eq!(p.seismic_magnitude(), dec!(0));
    }

    #[test]
    fn nan_write_is_rejected_and_keeps_previous_value() {
        let mut p = SimulationParameters::default();
        assert_eq!(p.set_rainfall_rate(f64::NAN), UpdateOutcome::Rejected);
        assert_eq!(p.rainfall_rate(), dec!(60));
        assert_eq!(
            p.apply(ParameterKey::RockBoltsApplied, ParameterValue::Number(f64::NAN)),
            UpdateOutcome::Rejected
        );
        assert!(!p.rock_bolts_applied);
    }

    #[test]
    fn seismic_keeps_one_decimal() {
        let mut p = SimulationParameters::default();
        assert_eq!(p.set_seismic_magnitude(3.14), UpdateOutcome::Applied);
        assert_eq!(p.seismic_magnitude(), dec!(3.1));
    }

    #[test]
    fn apply_routes_flags_and_numbers() {
        let mut p = SimulationParameters::default();
        assert_eq!(p.apply(ParameterKey::RockBoltsApplied, ParameterValue::Flag(true)), UpdateOutcome::Applied);
        assert_eq!(p.apply(ParameterKey::DewateringApplied, ParameterValue::Number(1.0)), UpdateOutcome::Applied);
        assert_eq!(p.mitigations_applied(), 2);
        assert_eq!(p.apply(ParameterKey::RainfallRate, ParameterValue::Flag(true)), UpdateOutcome::Rejected);
        assert_eq!(p.rainfall_rate(), dec!(60));
    }

    #[test]
    fn parameter_key_parses_wire_and_short_names() {
        assert_eq!("rainfallRate".parse::<ParameterKey>(), Ok(ParameterKey::RainfallRate));
        assert_eq!("seismic".parse::<ParameterKey>(), Ok(ParameterKey::SeismicMagnitude));
        assert_eq!("rockBolts".parse::<ParameterKey>(), Ok(ParameterKey::RockBoltsApplied));
        assert_eq!(
            "snowfall".parse::<ParameterKey>(),
            Err(ParameterError::UnknownKey("snowfall".into()))
        );
        for key in ParameterKey::ALL {
            assert_eq!(key.as_str().parse::<ParameterKey>(), Ok(key));
        }
    }

    #[test]
    fn failure_class_boundaries() {
        assert_eq!(FailureClass::from_percent(70), FailureClass::Medium);
        assert_eq!(FailureClass::from_percent(71), FailureClass::High);
        assert_eq!(FailureClass::from_percent(40), FailureClass::Low);
        assert_eq!(FailureClass::from_percent(41), FailureClass::Medium);
    }

    #[test]
    fn stability_status_boundaries() {
        assert_eq!(StabilityStatus::from_index(70), StabilityStatus::Stable);
        assert_eq!(StabilityStatus::from_index(69), StabilityStatus::Warning);
        assert_eq!(StabilityStatus::from_index(40), StabilityStatus::Warning);
        assert_eq!(StabilityStatus::from_index(39), StabilityStatus::Critical);
    }

    #[test]
    fn result_construction_clamps_and_projects_class() {
        let r = SimulationResult::new(0, 99);
        assert_eq!(r.stability_index(), 5);
        assert_eq!(r.failure_probability_percent(), 95);
        assert_eq!(r.failure_class(), FailureClass::High);
        assert!(r.stress_overlay());
    }

    #[test]
    fn deserialized_result_is_clamped() {
        let r: SimulationResult =
            serde_json::from_str(r#"{"stabilityIndex":200,"failureProbabilityPercent":1}"#).unwrap();
        assert_eq!(r, SimulationResult::new(100, 5));
        assert_eq!(r.stability_index(), 100);
        assert_eq!(r.failure_probability_percent(), 5);
    }

    #[test]
    fn parameters_serialize_as_numbers() {
        let p = SimulationParameters::new(42.5, 1.2, true, false);
        let json = serde_json::to_value(p).unwrap();
        assert_eq!(json["rainfallRate"], serde_json::json!(42.5));
        assert_eq!(json["seismicMagnitude"], serde_json::json!(1.2));
        assert_eq!(json["rockBoltsApplied"], serde_json::json!(true));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn rainfall_outside_domain_stores_nearest_boundary(
            value in prop_oneof![-1.0e9f64..-1.0e-6, 100.000_001f64..1.0e9],
        ) {
            let mut p = SimulationParameters::default();
            prop_assert_eq!(p.set_rainfall_rate(value), UpdateOutcome::Clamped);
            let expected = if value < 0.0 { RAINFALL_MIN } else { RAINFALL_MAX };
            prop_assert_eq!(p.rainfall_rate(), expected);
        }

        #[test]
        fn seismic_outside_domain_stores_nearest_boundary(
            value in prop_oneof![-1.0e9f64..-1.0e-6, 5.000_001f64..1.0e9],
        ) {
            let mut p = SimulationParameters::default();
            prop_assert_eq!(p.set_seismic_magnitude(value), UpdateOutcome::Clamped);
            let expected = if value < 0.0 { SEISMIC_MIN } else { SEISMIC_MAX };
            prop_assert_eq!(p.seismic_magnitude(), expected);
        }

        #[test]
        fn stored_values_always_inside_domain(rain in any::<f64>(), seismic in any::<f64>()) {
            let p = SimulationParameters::new(rain, seismic, false, false);
            prop_assert!((RAINFALL_MIN..=RAINFALL_MAX).contains(&p.rainfall_rate()));
            prop_assert!((SEISMIC_MIN..=SEISMIC_MAX).contains(&p.seismic_magnitude()));
        }
    }
}
