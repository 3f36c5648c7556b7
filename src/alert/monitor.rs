// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Slope Risk Simulation Core - Critical Alert Monitor

//! Critical-alert state machine for one zone-detail session.
//!
//! ```text
//! QUIET --observe(conf > 92.5)--> ARMED --acknowledge()--> ACKNOWLEDGED
//! ```
//!
//! While ARMED a [`PulseGenerator`] emits one pulse at arm time and one per
//! interval after that. The generator exists only in ARMED: acknowledging or
//! dropping the monitor tears it down and releases the alarm signal.
//! ACKNOWLEDGED is terminal; a fresh episode needs a fresh monitor.

use super::signal::{AlarmSignal, SignalToken, ToneSpec};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// AI confidence (percent) above which a zone raises a critical alert.
pub const CRITICAL_CONFIDENCE_THRESHOLD: f64 = 92.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertPhase {
    Quiet,
    Armed,
    Acknowledged,
}

/// Immutable alert view handed to the modal/overlay renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSnapshot {
    pub phase: AlertPhase,
    pub armed: bool,
    pub acknowledged: bool,
    pub confidence_value: Option<f64>,
    /// Pulses emitted during this episode (visual pulses count even when silent).
    pub pulses_emitted: u64,
    /// Whether the current episode holds a working audio signal.
    pub audible: bool,
}

// ---------------------------------------------------------------------------
// PulseGenerator
// ---------------------------------------------------------------------------

/// Owned handle for the repeating alarm pulse of one armed episode.
#[derive(Debug)]
struct PulseGenerator {
    /// `None` when audio could not be started; pulses stay visual.
    token: Option<SignalToken>,
    interval_ms: u64,
    next_due_ms: u64,
}

impl PulseGenerator {
    fn start(signal: &mut dyn AlarmSignal, tone: &ToneSpec, interval_ms: u64, now_ms: u64, zone: &str) -> Self {
        let token = match signal.start(tone) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!(zone = %zone, error = %e, "alarm audio unavailable, continuing with visual alert only");
                None
            }
        };
        Self { token, interval_ms: interval_ms.max(1), next_due_ms: now_ms }
    }

    fn is_due(&self, now_ms: u64) -> bool {
        now_ms >= self.next_due_ms
    }

    /// Emit one pulse and schedule the next strictly after `now_ms`.
    /// Missed intervals are coalesced into this single pulse.
    fn fire(&mut self, signal: &mut dyn AlarmSignal, tone: &ToneSpec, now_ms: u64) {
        if let Some(token) = &self.token {
            signal.pulse(token, tone);
        }
        let missed = now_ms.saturating_sub(self.next_due_ms) / self.interval_ms;
        self.next_due_ms = self
            .next_due_ms
            .saturating_add(self.interval_ms.saturating_mul(missed.saturating_add(1)));
    }

    fn shutdown(self, signal: &mut dyn AlarmSignal) {
        if let Some(token) = self.token {
            signal.stop(token);
        }
    }
}

// ---------------------------------------------------------------------------
// CriticalAlertMonitor
// ---------------------------------------------------------------------------

pub struct CriticalAlertMonitor {
    zone: String,
    phase: AlertPhase,
    confidence: Option<f64>,
    pulses_emitted: u64,
    generator: Option<PulseGenerator>,
    signal: Box<dyn AlarmSignal>,
    tone: ToneSpec,
    pulse_interval_ms: u64,
}

impl CriticalAlertMonitor {
    pub fn new(
        zone: impl Into<String>,
        signal: Box<dyn AlarmSignal>,
        tone: ToneSpec,
        pulse_interval_ms: u64,
    ) -> Self {
        Self {
            zone: zone.into(),
            phase: AlertPhase::Quiet,
            confidence: None,
            pulses_emitted: 0,
            generator: None,
            signal,
            tone,
            pulse_interval_ms,
        }
    }

    pub fn phase(&self) -> AlertPhase {
        self.phase
    }

    pub fn is_armed(&self) -> bool {
        self.phase == AlertPhase::Armed
    }

    pub fn is_acknowledged(&self) -> bool {
        self.phase == AlertPhase::Acknowledged
    }

    pub fn confidence_value(&self) -> Option<f64> {
        self.confidence
    }

    pub fn pulses_emitted(&self) -> u64 {
        self.pulses_emitted
    }

    /// True while a pulse generator is alive. Only ever true in ARMED.
    pub fn generator_active(&self) -> bool {
        self.generator.is_some()
    }

    pub fn snapshot(&self) -> AlertSnapshot {
        AlertSnapshot {
            phase: self.phase,
            armed: self.is_armed(),
            acknowledged: self.is_acknowledged(),
            confidence_value: self.confidence,
            pulses_emitted: self.pulses_emitted,
            audible: self.generator.as_ref().is_some_and(|g| g.token.is_some()),
        }
    }

    /// Feed a new confidence reading.
    ///
    /// Arms on the first reading above the threshold while QUIET and emits the
    /// first pulse immediately. Readings while ARMED only update the stored
    /// value; readings after acknowledgment are ignored.
    pub fn observe(&mut self, confidence: f64, now_ms: u64) -> AlertPhase {
        if confidence.is_nan() {
            warn!(zone = %self.zone, "ignoring NaN confidence reading");
            return self.phase;
        }
        match self.phase {
            AlertPhase::Acknowledged => {
                debug!(zone = %self.zone, confidence, "alert acknowledged, reading ignored");
            }
            AlertPhase::Armed => {
                self.confidence = Some(confidence);
            }
            AlertPhase::Quiet => {
                self.confidence = Some(confidence);
                if confidence > CRITICAL_CONFIDENCE_THRESHOLD {
                    self.arm(now_ms);
                }
            }
        }
        self.phase
    }

    /// Operator silenced the alarm. No-op unless ARMED.
    pub fn acknowledge(&mut self) -> AlertPhase {
        if self.phase != AlertPhase::Armed {
            debug!(zone = %self.zone, phase = ?self.phase, "acknowledge ignored, alert not armed");
            return self.phase;
        }
        self.teardown();
        self.phase = AlertPhase::Acknowledged;
        info!(zone = %self.zone, pulses = self.pulses_emitted, "critical alert acknowledged");
        self.phase
    }

    /// Advance the pulse schedule. Returns the number of pulses emitted (0 or 1).
    pub fn tick(&mut self, now_ms: u64) -> u32 {
        let Some(generator) = self.generator.as_mut() else {
            return 0;
        };
        if !generator.is_due(now_ms) {
            return 0;
        }
        generator.fire(self.signal.as_mut(), &self.tone, now_ms);
        self.pulses_emitted += 1;
        1
    }

    fn arm(&mut self, now_ms: u64) {
        if self.generator.is_some() {
            return;
        }
        info!(
            zone = %self.zone,
            confidence = self.confidence.unwrap_or_default(),
            threshold = CRITICAL_CONFIDENCE_THRESHOLD,
            "critical alert armed"
        );
        self.phase = AlertPhase::Armed;
        self.generator = Some(PulseGenerator::start(
            self.signal.as_mut(),
            &self.tone,
            self.pulse_interval_ms,
            now_ms,
            &self.zone,
        ));
        self.tick(now_ms);
    }

    fn teardown(&mut self) {
        if let Some(generator) = self.generator.take() {
            generator.shutdown(self.signal.as_mut());
            debug!(zone = %self.zone, "alarm pulse generator torn down");
        }
    }
}

impl Drop for CriticalAlertMonitor {
    fn drop(&mut self) {
        if self.generator.is_some() {
            info!(zone = %self.zone, "session ended with alert still armed, silencing alarm");
            self.teardown();
        }
    }
}

impl std::fmt::Debug for CriticalAlertMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CriticalAlertMonitor")
            .field("zone", &self.zone)
            .field("phase", &self.phase)
            .field("confidence", &self.confidence)
            .field("pulses_emitted", &self.pulses_emitted)
            .field("generator", &self.generator)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::signal::{RecordingSignal, SignalEvent, SignalLog, SilentSignal};

    fn monitor() -> (CriticalAlertMonitor, SignalLog) {
        let log = SignalLog::new();
        let m = CriticalAlertMonitor::new(
            "sector7g",
            Box::new(RecordingSignal::new(log.clone())),
            ToneSpec::default(),
            1000,
        );
        (m, log)
    }

    #[test]
    fn below_threshold_never_arms() {
        let (mut m, log) = monitor();
        for t in 0..5 {
            assert_eq!(m.observe(89.3, t * 1000), AlertPhase::Quiet);
            m.tick(t * 1000);
        }
        assert!(!m.is_armed());
        assert!(!m.generator_active());
        assert!(log.events().is_empty());
    }

    #[test]
    fn threshold_is_exclusive() {
        let (mut m, _log) = monitor();
        assert_eq!(m.observe(92.5, 0), AlertPhase::Quiet);
        assert_eq!(m.observe(92.51, 0), AlertPhase::Armed);
    }

    #[test]
    fn arming_pulses_immediately_then_every_interval() {
        let (mut m, log) = monitor();
        m.observe(97.8, 10_000);
        assert!(m.is_armed());
        assert_eq!(log.count_starts(), 1);
        assert_eq!(log.count_pulses(), 1);

        assert_eq!(m.tick(10_500), 0);
        assert_eq!(m.tick(11_000), 1);
        assert_eq!(m.tick(11_999), 0);
        assert_eq!(m.tick(12_000), 1);
        assert_eq!(m.pulses_emitted(), 3);
        assert_eq!(log.count_pulses(), 3);
    }

    #[test]
    fn lagging_tick_coalesces_missed_pulses() {
        let (mut m, log) = monitor();
        m.observe(97.8, 0);
        assert_eq!(m.tick(4_500), 1);
        // next due at 5000, not 1000
        assert_eq!(m.tick(4_900), 0);
        assert_eq!(m.tick(5_000), 1);
        assert_eq!(log.count_pulses(), 3);
    }

    #[test]
    fn pulse_schedule_saturates_at_clock_limit() {
        let (mut m, log) = monitor();
        m.observe(97.8, u64::MAX - 500);
        assert_eq!(m.tick(u64::MAX - 1), 0);
        assert_eq!(m.tick(u64::MAX), 1);
        assert!(m.generator_active());
        assert_eq!(m.acknowledge(), AlertPhase::Acknowledged);
        assert_eq!(log.count_pulses(), 2);
        assert_eq!(log.active(), 0);
    }

    #[test]
    fn repeated_observation_keeps_one_generator() {
        let (mut m, log) = monitor();
        m.observe(95.0, 0);
        m.observe(95.0, 100);
        m.observe(99.0, 200);
        assert!(m.generator_active());
        assert_eq!(log.count_starts(), 1);
        assert_eq!(log.active(), 1);
        assert_eq!(log.count_pulses(), 1);
        assert_eq!(m.confidence_value(), Some(99.0));
    }

    #[test]
    fn acknowledge_tears_down_and_silences() {
        let (mut m, log) = monitor();
        m.observe(97.8, 0);
        m.tick(1_000);
        assert_eq!(m.acknowledge(), AlertPhase::Acknowledged);

        assert!(!m.is_armed());
        assert!(m.is_acknowledged());
        assert!(!m.generator_active());
        assert_eq!(log.active(), 0);

        let before = log.events().len();
        for t in 2..10 {
            assert_eq!(m.tick(t * 1000), 0);
        }
        assert_eq!(log.events().len(), before);
        assert!(matches!(log.events().last(), Some(SignalEvent::Stop { token: 1 })));
    }

    #[test]
    fn acknowledge_twice_is_harmless() {
        let (mut m, log) = monitor();
        m.observe(97.8, 0);
        assert_eq!(m.acknowledge(), AlertPhase::Acknowledged);
        assert_eq!(m.acknowledge(), AlertPhase::Acknowledged);
        assert_eq!(log.count_stops(), 1);
    }

    #[test]
    fn acknowledge_while_quiet_is_noop() {
        let (mut m, log) = monitor();
        assert_eq!(m.acknowledge(), AlertPhase::Quiet);
        assert!(!m.is_acknowledged());
        assert!(log.events().is_empty());
    }

    #[test]
    fn acknowledged_episode_does_not_rearm() {
        let (mut m, log) = monitor();
        m.observe(97.8, 0);
        m.acknowledge();
        assert_eq!(m.observe(97.8, 5_000), AlertPhase::Acknowledged);
        assert_eq!(m.observe(99.9, 6_000), AlertPhase::Acknowledged);
        assert_eq!(log.count_starts(), 1);
        assert!(!m.generator_active());
    }

    #[test]
    fn quiet_then_breach_arms() {
        let (mut m, _log) = monitor();
        m.observe(80.0, 0);
        assert_eq!(m.observe(93.0, 1_000), AlertPhase::Armed);
    }

    #[test]
    fn audio_failure_keeps_state_machine_correct() {
        let log = SignalLog::new();
        let mut m = CriticalAlertMonitor::new(
            "sector7g",
            Box::new(RecordingSignal::unavailable(log.clone())),
            ToneSpec::default(),
            1000,
        );
        m.observe(97.8, 0);
        assert!(m.is_armed());
        assert!(!m.snapshot().audible);
        assert_eq!(m.tick(1_000), 1);
        assert_eq!(m.pulses_emitted(), 2);

        m.acknowledge();
        assert!(m.is_acknowledged());
        assert!(log.events().is_empty());
    }

    #[test]
    fn dropping_armed_monitor_stops_signal() {
        let (mut m, log) = monitor();
        m.observe(97.8, 0);
        assert_eq!(log.active(), 1);
        drop(m);
        assert_eq!(log.active(), 0);
        assert_eq!(log.count_stops(), 1);
    }

    #[test]
    fn dropping_acknowledged_monitor_does_not_stop_twice() {
        let (mut m, log) = monitor();
        m.observe(97.8, 0);
        m.acknowledge();
        drop(m);
        assert_eq!(log.count_stops(), 1);
    }

    #[test]
    fn nan_reading_is_ignored() {
        let (mut m, _log) = monitor();
        assert_eq!(m.observe(f64::NAN, 0), AlertPhase::Quiet);
        assert_eq!(m.confidence_value(), None);
    }

    #[test]
    fn snapshot_reflects_phase() {
        let mut m = CriticalAlertMonitor::new("zone3", Box::new(SilentSignal::default()), ToneSpec::default(), 1000);
        let s = m.snapshot();
        assert!(!s.armed && !s.acknowledged);
        m.observe(97.8, 0);
        let s = m.snapshot();
        assert!(s.armed && !s.acknowledged && s.audible);
        assert_eq!(s.pulses_emitted, 1);
        m.acknowledge();
        let s = m.snapshot();
        assert!(!s.armed && s.acknowledged && !s.audible);
    }
}
