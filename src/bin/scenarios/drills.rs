// Alert Drills: open each zone, let the alarm pulse, acknowledge, verify silence
// Exercises the full session lifecycle against a recording signal

use slope_engine::{AlertPhase, EngineConfig, ZoneSession, CRITICAL_CONFIDENCE_THRESHOLD};

use crate::report::DrillReport;

const STEP_MS: u64 = 250;

pub fn run_drill(zone_id: &str, config: &EngineConfig, ring_ms: u64) -> DrillReport {
    let mut session = ZoneSession::open_recorded(zone_id, config, 0);
    let confidence = session.profile().ai_confidence;
    let expected_armed = confidence > CRITICAL_CONFIDENCE_THRESHOLD;
    let armed = session.monitor().is_armed();

    let mut now = 0;
    while now < ring_ms {
        now += STEP_MS;
        session.tick_core(now);
    }

    let (pulses_before_ack, signals_started) = match session.signal_log() {
        Some(log) => (log.count_pulses(), log.count_starts()),
        None => (0, 0),
    };

    session.monitor_mut().acknowledge();

    let ack_at = now;
    while now < ack_at + ring_ms {
        now += STEP_MS;
        session.tick_core(now);
    }
    let phase_after_reobserve = session.monitor_mut().observe(confidence, now);

    let (pulses_total, signals_active_after_ack) = match session.signal_log() {
        Some(log) => (log.count_pulses(), log.active()),
        None => (0, 0),
    };
    let pulses_after_ack = pulses_total - pulses_before_ack;

    let expected_phase = if expected_armed { AlertPhase::Acknowledged } else { AlertPhase::Quiet };
    let pass = armed == expected_armed
        && pulses_after_ack == 0
        && signals_active_after_ack == 0
        && signals_started <= 1
        && phase_after_reobserve == expected_phase
        && (!expected_armed || pulses_before_ack > 0);

    session.close();

    DrillReport {
        zone_id: zone_id.to_string(),
        confidence,
        expected_armed,
        armed,
        pulses_before_ack,
        pulses_after_ack,
        signals_started,
        signals_active_after_ack,
        phase_after_reobserve,
        pass,
    }
}
