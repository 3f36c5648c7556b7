// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Slope Risk Simulation Core - Stability Predictor
//
// Linear additive risk model. Environmental triggers push stability down and
// failure probability up; mitigations offset part of that. Outputs are clamped
// so downstream gauges always receive an interpretable percentage.

use crate::adapter::round_half_up;
use crate::types::{
    SimulationParameters, SimulationResult, BASE_FAILURE_PERCENT, FAILURE_CEILING, FAILURE_FLOOR,
    STABILITY_CEILING, STABILITY_FLOOR,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

// -- Model coefficients -------------------------------------------------------

const RAIN_STABILITY_LOSS: Decimal = dec!(0.4);
const SEISMIC_STABILITY_LOSS: Decimal = dec!(8);
const ROCK_BOLT_STABILITY_GAIN: Decimal = dec!(15);
const DEWATERING_STABILITY_GAIN: Decimal = dec!(10);

const RAIN_FAILURE_GAIN: Decimal = dec!(0.8);
const SEISMIC_FAILURE_GAIN: Decimal = dec!(16);
const ROCK_BOLT_FAILURE_RELIEF: Decimal = dec!(20);
const DEWATERING_FAILURE_RELIEF: Decimal = dec!(15);

// Summary thresholds for "environmental impact".
const HIGH_IMPACT_RAINFALL: Decimal = dec!(50);
const HIGH_IMPACT_SEISMIC: Decimal = dec!(2);

/// Unrounded, unclamped model deltas for one parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDeltas {
    pub stability: Decimal,
    pub failure: Decimal,
}

/// Compute the additive deltas before they are applied to a baseline.
pub fn risk_deltas(params: &SimulationParameters) -> RiskDeltas {
    let rain = params.rainfall_rate();
    let seismic = params.seismic_magnitude();

    let mut stability = -(rain * RAIN_STABILITY_LOSS) - seismic * SEISMIC_STABILITY_LOSS;
    let mut failure = rain * RAIN_FAILURE_GAIN + seismic * SEISMIC_FAILURE_GAIN;

    if params.rock_bolts_applied {
        stability += ROCK_BOLT_STABILITY_GAIN;
        failure -= ROCK_BOLT_FAILURE_RELIEF;
    }
    if params.dewatering_applied {
        stability += DEWATERING_STABILITY_GAIN;
        failure -= DEWATERING_FAILURE_RELIEF;
    }

    RiskDeltas { stability, failure }
}

/// Predict stability and failure probability for a zone baseline.
///
/// Pure and deterministic. `baseline` is expected in 0..=100; larger values
/// are clamped like any other out-of-range outcome.
pub fn predict(baseline: u8, params: &SimulationParameters) -> SimulationResult {
    let deltas = risk_deltas(params);
    let stability = clamp_round(
        Decimal::from(baseline) + deltas.stability,
        STABILITY_FLOOR,
        STABILITY_CEILING,
    );
    let failure = clamp_round(
        Decimal::from(BASE_FAILURE_PERCENT) + deltas.failure,
        FAILURE_FLOOR,
        FAILURE_CEILING,
    );
    SimulationResult::new(stability, failure)
}

/// KPI values shown before a run has completed: the zone as it stands.
pub fn baseline_result(baseline: u8) -> SimulationResult {
    SimulationResult::new(baseline, BASE_FAILURE_PERCENT)
}

fn clamp_round(value: Decimal, floor: u8, ceiling: u8) -> u8 {
    let rounded = round_half_up(value).clamp(Decimal::from(floor), Decimal::from(ceiling));
    rounded.to_u8().unwrap_or(floor)
}

// ---------------------------------------------------------------------------
// Scenario summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnvironmentalImpact {
    Low,
    High,
}

/// Post-run digest shown under the KPI cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub environmental_impact: EnvironmentalImpact,
    pub mitigations_applied: u8,
    pub mitigations_available: u8,
    /// Signed percentage-point change from the zone baseline.
    pub stability_change: i16,
}

impl ScenarioSummary {
    pub fn new(baseline: u8, params: &SimulationParameters, result: &SimulationResult) -> Self {
        let high = params.rainfall_rate() > HIGH_IMPACT_RAINFALL
            || params.seismic_magnitude() > HIGH_IMPACT_SEISMIC;
        Self {
            environmental_impact: if high { EnvironmentalImpact::High } else { EnvironmentalImpact::Low },
            mitigations_applied: params.mitigations_applied(),
            mitigations_available: 2,
            stability_change: i16::from(result.stability_index()) - i16::from(baseline),
        }
    }
}
