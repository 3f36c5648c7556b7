// Scenario Runner Report Types
// Structured JSON output for offline review of the risk model and alert drills

use serde::Serialize;
use slope_engine::{AlertPhase, FailureClass};

// ─── Statistics (per-metric Monte Carlo aggregation) ────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n: 0 };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let stderr = std_dev / (n as f64).sqrt();
        let z = 1.96; // 95% CI
        Self {
            mean,
            std_dev,
            ci_lower: mean - z * stderr,
            ci_upper: mean + z * stderr,
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }
}

// ─── Fixed Scenario Check ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub label: String,
    pub baseline: u8,
    pub stability_index: u8,
    pub expected_stability_index: u8,
    pub failure_probability_percent: u8,
    pub expected_failure_probability_percent: u8,
    pub failure_class: FailureClass,
    pub expected_failure_class: FailureClass,
    pub pass: bool,
}

// ─── Monte Carlo Sweep ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl ClassCounts {
    pub fn record(&mut self, class: FailureClass) {
        match class {
            FailureClass::Low => self.low += 1,
            FailureClass::Medium => self.medium += 1,
            FailureClass::High => self.high += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub zone_id: String,
    pub zone_name: String,
    pub baseline: u8,
    pub seed: u64,
    pub stability_index: Stats,
    pub failure_probability_percent: Stats,
    pub classes: ClassCounts,
    pub bounds_violations: usize,
    pub nondeterministic: usize,
    pub pass: bool,
}

// ─── Alert Drill ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct DrillReport {
    pub zone_id: String,
    pub confidence: f64,
    pub expected_armed: bool,
    pub armed: bool,
    pub pulses_before_ack: usize,
    pub pulses_after_ack: usize,
    pub signals_started: usize,
    pub signals_active_after_ack: usize,
    pub phase_after_reobserve: AlertPhase,
    pub pass: bool,
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RunnerReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub samples_per_zone: usize,
    pub summary: Summary,
    pub checks: Vec<CheckResult>,
    pub sweeps: Vec<SweepReport>,
    pub drills: Vec<DrillReport>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}

impl Summary {
    pub fn from_flags(flags: impl IntoIterator<Item = bool>) -> Self {
        let (mut total, mut passed) = (0, 0);
        for pass in flags {
            total += 1;
            if pass {
                passed += 1;
            }
        }
        Self {
            total,
            passed,
            failed: total - passed,
            pass_rate: if total > 0 { passed as f64 / total as f64 } else { 1.0 },
        }
    }
}
