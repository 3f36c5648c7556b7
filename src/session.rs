// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Slope Risk Simulation Core - Zone Session

use serde::{Deserialize, Serialize};
use tracing::info;
use wasm_bindgen::prelude::*;

use crate::alert::{AlarmSignal, AlertSnapshot, CriticalAlertMonitor, RecordingSignal, SignalLog};
use crate::config::EngineConfig;
use crate::simulation::SimulationRun;
use crate::types::{KpiReport, RunStatus};
use crate::zones::{ZoneProfile, ZoneRiskStatus};

// ─── Render Snapshots ────────────────────────────────────────────────────────

/// Everything the page needs to redraw after one clock step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFrame {
    pub now_ms: u64,
    pub run_status: RunStatus,
    /// Result published by this step, if a run completed.
    pub completed: Option<KpiReport>,
    pub kpi: KpiReport,
    pub alert: AlertSnapshot,
    /// Alarm pulses emitted during this step.
    pub pulses: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneView {
    pub zone_id: String,
    pub name: String,
    pub minesite: String,
    pub last_update: String,
    pub baseline_stability: u8,
    pub risk_level: u8,
    pub risk_status: ZoneRiskStatus,
    pub ai_confidence: f64,
}

// ─── ZoneSession ─────────────────────────────────────────────────────────────

/// One opened zone: its scenario simulator and its critical-alert monitor.
///
/// Both are created fresh when the zone is opened and destroyed with the
/// session; dropping an armed session silences the alarm.
#[wasm_bindgen]
pub struct ZoneSession {
    pub(crate) zone_id: String,
    pub(crate) profile: ZoneProfile,
    pub(crate) run: SimulationRun,
    pub(crate) monitor: CriticalAlertMonitor,
    /// Set when the session owns a `RecordingSignal` whose events a player drains.
    pub(crate) signal_log: Option<SignalLog>,
    pub(crate) last_tick_ms: u64,
}

impl ZoneSession {
    /// Open `zone_id` and present its current confidence to the alert monitor.
    pub fn open(zone_id: &str, config: &EngineConfig, signal: Box<dyn AlarmSignal>, now_ms: u64) -> Self {
        let profile = config.catalog.lookup(zone_id).clone();
        let run = SimulationRun::new(zone_id, profile.baseline_stability, config.timing.run_delay_ms);
        let mut monitor = CriticalAlertMonitor::new(zone_id, signal, config.tone, config.timing.pulse_interval_ms);
        monitor.observe(profile.ai_confidence, now_ms);

        info!(
            zone = %zone_id,
            name = %profile.name,
            baseline = profile.baseline_stability,
            confidence = profile.ai_confidence,
            "zone session opened"
        );

        Self {
            zone_id: zone_id.to_string(),
            profile,
            run,
            monitor,
            signal_log: None,
            last_tick_ms: now_ms,
        }
    }

    /// Open with a [`RecordingSignal`] and keep its log for draining.
    pub fn open_recorded(zone_id: &str, config: &EngineConfig, now_ms: u64) -> Self {
        let log = SignalLog::new();
        let mut session = Self::open(zone_id, config, Box::new(RecordingSignal::new(log.clone())), now_ms);
        session.signal_log = Some(log);
        session
    }

    pub fn profile(&self) -> &ZoneProfile {
        &self.profile
    }

    pub fn zone_view(&self) -> ZoneView {
        ZoneView {
            zone_id: self.zone_id.clone(),
            name: self.profile.name.clone(),
            minesite: self.profile.minesite.clone(),
            last_update: self.profile.last_update.clone(),
            baseline_stability: self.profile.baseline_stability,
            risk_level: self.profile.risk_level,
            risk_status: self.profile.risk_status(),
            ai_confidence: self.profile.ai_confidence,
        }
    }

    pub fn simulation(&self) -> &SimulationRun {
        &self.run
    }

    pub fn simulation_mut(&mut self) -> &mut SimulationRun {
        &mut self.run
    }

    pub fn monitor(&self) -> &CriticalAlertMonitor {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut CriticalAlertMonitor {
        &mut self.monitor
    }

    pub fn signal_log(&self) -> Option<&SignalLog> {
        self.signal_log.as_ref()
    }

    /// Advance both state machines to `now_ms`.
    pub fn tick_core(&mut self, now_ms: u64) -> SessionFrame {
        self.last_tick_ms = now_ms;
        let completed = self.run.tick(now_ms).map(|r| r.report());
        let pulses = self.monitor.tick(now_ms);
        SessionFrame {
            now_ms,
            run_status: self.run.status(),
            completed,
            kpi: self.run.kpi().report(),
            alert: self.monitor.snapshot(),
            pulses,
        }
    }

    /// Current state without advancing the clock.
    pub fn frame(&self) -> SessionFrame {
        SessionFrame {
            now_ms: self.last_tick_ms,
            run_status: self.run.status(),
            completed: None,
            kpi: self.run.kpi().report(),
            alert: self.monitor.snapshot(),
            pulses: 0,
        }
    }

    /// Leave the zone view. Any armed alarm is torn down with the monitor.
    pub fn close(self) {
        info!(zone = %self.zone_id, alert = ?self.monitor.phase(), "zone session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertPhase;

    #[test]
    fn opening_high_confidence_zone_arms_alert() {
        let s = ZoneSession::open_recorded("sector7g", &EngineConfig::default(), 0);
        assert_eq!(s.monitor().phase(), AlertPhase::Armed);
        assert_eq!(s.signal_log().unwrap().count_pulses(), 1);
    }

    #[test]
    fn opening_calm_zone_stays_quiet() {
        let s = ZoneSession::open_recorded("zone3", &EngineConfig::default(), 0);
        assert_eq!(s.monitor().phase(), AlertPhase::Quiet);
        assert_eq!(s.simulation().baseline_stability(), 65);
        assert_eq!(s.zone_view().risk_status, ZoneRiskStatus::Warning);
    }

    #[test]
    fn frame_reports_completion_once() {
        let mut s = ZoneSession::open_recorded("zone3", &EngineConfig::default(), 0);
        s.simulation_mut().run(0);
        assert!(s.tick_core(1_000).completed.is_none());
        let f = s.tick_core(2_000);
        assert_eq!(f.run_status, RunStatus::Complete);
        assert_eq!(f.completed.unwrap().stability_index, 41);
        assert!(s.tick_core(3_000).completed.is_none());
        assert_eq!(s.frame().kpi.failure_probability_percent, 63);
    }

    #[test]
    fn closing_armed_session_silences_alarm() {
        let s = ZoneSession::open_recorded("sector7g", &EngineConfig::default(), 0);
        let log = s.signal_log().unwrap().clone();
        assert_eq!(log.active(), 1);
        s.close();
        assert_eq!(log.active(), 0);
    }
}
