// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Slope Risk Simulation Core - Scenario Simulation Run

use tracing::{debug, info};

use crate::predictor::{self, ScenarioSummary};
use crate::types::*;

/// Default analysis latency before a run publishes its result.
pub const DEFAULT_RUN_DELAY_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running { started_ms: u64, ready_at_ms: u64 },
    Complete,
}

// ─── SimulationRun ───────────────────────────────────────────────────────────

/// One zone's scenario simulator: pending parameters, run status and the
/// last published result.
///
/// ```text
/// IDLE --run()--> RUNNING --(delay elapses)--> COMPLETE --run()--> RUNNING ...
/// IDLE | COMPLETE --reset()--> IDLE
/// ```
///
/// A run cannot be cancelled; the only way out of RUNNING is the delay
/// completing on a later [`SimulationRun::tick`].
#[derive(Debug, Clone)]
pub struct SimulationRun {
    zone: String,
    baseline_stability: u8,
    parameters: SimulationParameters,
    phase: Phase,
    last_result: Option<SimulationResult>,
    /// Digest of `last_result` against the parameters that produced it.
    last_summary: Option<ScenarioSummary>,
    run_delay_ms: u64,
    runs_completed: u32,
}

impl SimulationRun {
    /// `baseline_stability` is snapshotted here and never changes afterwards.
    pub fn new(zone: impl Into<String>, baseline_stability: u8, run_delay_ms: u64) -> Self {
        Self {
            zone: zone.into(),
            baseline_stability: baseline_stability.min(100),
            parameters: SimulationParameters::default(),
            phase: Phase::Idle,
            last_result: None,
            last_summary: None,
            run_delay_ms,
            runs_completed: 0,
        }
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn baseline_stability(&self) -> u8 {
        self.baseline_stability
    }

    pub fn parameters(&self) -> &SimulationParameters {
        &self.parameters
    }

    pub fn status(&self) -> RunStatus {
        match self.phase {
            Phase::Idle => RunStatus::Idle,
            Phase::Running { .. } => RunStatus::Running,
            Phase::Complete => RunStatus::Complete,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    pub fn last_result(&self) -> Option<SimulationResult> {
        self.last_result
    }

    pub fn runs_completed(&self) -> u32 {
        self.runs_completed
    }

    /// When the in-flight run will publish, if one is in flight.
    pub fn ready_at(&self) -> Option<u64> {
        match self.phase {
            Phase::Running { ready_at_ms, .. } => Some(ready_at_ms),
            _ => None,
        }
    }

    /// KPI values for display: the last result, or the zone as it stands
    /// if nothing has been simulated yet.
    pub fn kpi(&self) -> SimulationResult {
        self.last_result
            .unwrap_or_else(|| predictor::baseline_result(self.baseline_stability))
    }

    /// Summary of the last result, captured when it was published. Edits
    /// made after completion do not show up here until the next run.
    pub fn summary(&self) -> Option<ScenarioSummary> {
        self.last_summary
    }

    /// Edit one pending parameter. Ignored while a run is in flight.
    pub fn update_parameter(&mut self, key: ParameterKey, value: ParameterValue) -> UpdateOutcome {
        if self.is_running() {
            debug!(zone = %self.zone, %key, "parameter edit ignored while simulation is running");
            return UpdateOutcome::Locked;
        }
        let outcome = self.parameters.apply(key, value);
        if outcome == UpdateOutcome::Clamped {
            debug!(zone = %self.zone, %key, ?value, "parameter clamped to domain boundary");
        }
        outcome
    }

    /// Start a run. Returns `false` (and changes nothing) if one is in flight.
    pub fn run(&mut self, now_ms: u64) -> bool {
        if self.is_running() {
            debug!(zone = %self.zone, "run requested while already running");
            return false;
        }
        let ready_at_ms = now_ms.saturating_add(self.run_delay_ms);
        self.phase = Phase::Running { started_ms: now_ms, ready_at_ms };
        info!(
            zone = %self.zone,
            rainfall = %self.parameters.rainfall_rate(),
            seismic = %self.parameters.seismic_magnitude(),
            rock_bolts = self.parameters.rock_bolts_applied,
            dewatering = self.parameters.dewatering_applied,
            ready_at_ms,
            "simulation started"
        );
        true
    }

    /// Advance the clock. Returns the result published by this tick, if any.
    pub fn tick(&mut self, now_ms: u64) -> Option<SimulationResult> {
        let Phase::Running { started_ms, ready_at_ms } = self.phase else {
            return None;
        };
        if now_ms < ready_at_ms {
            return None;
        }
        let result = predictor::predict(self.baseline_stability, &self.parameters);
        self.last_result = Some(result);
        self.last_summary = Some(ScenarioSummary::new(self.baseline_stability, &self.parameters, &result));
        self.phase = Phase::Complete;
        self.runs_completed += 1;
        info!(
            zone = %self.zone,
            stability_index = result.stability_index(),
            failure_percent = result.failure_probability_percent(),
            failure_class = result.failure_class().label(),
            elapsed_ms = now_ms.saturating_sub(started_ms),
            "simulation complete"
        );
        Some(result)
    }

    /// Restore default parameters and clear the result. Returns `false`
    /// (and changes nothing) while a run is in flight.
    pub fn reset(&mut self) -> bool {
        if self.is_running() {
            debug!(zone = %self.zone, "reset ignored while simulation is running");
            return false;
        }
        self.parameters = SimulationParameters::default();
        self.last_result = None;
        self.last_summary = None;
        self.phase = Phase::Idle;
        true
    }
}
