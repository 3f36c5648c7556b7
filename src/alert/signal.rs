// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Slope Risk Simulation Core - Alarm Signal Capability

//! Audible alarm capability injected into the critical-alert monitor.
//!
//! A signal is started once per armed episode and hands back a
//! [`SignalToken`]. Pulses borrow the token; `stop` consumes it, so a
//! started signal can be torn down at most once.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    #[error("audio output unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// Tone
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One alarm beep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneSpec {
    pub frequency_hz: f64,
    pub gain: f64,
    pub duration_ms: u64,
    pub waveform: Waveform,
}

impl Default for ToneSpec {
    fn default() -> Self {
        Self {
            frequency_hz: 800.0,
            gain: 0.3,
            duration_ms: 200,
            waveform: Waveform::Square,
        }
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// Proof that a signal is running. Not `Clone`: exactly one owner may stop it.
#[derive(Debug, PartialEq, Eq)]
pub struct SignalToken(u64);

impl SignalToken {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SignalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "signal#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AlarmSignal
// ---------------------------------------------------------------------------

pub trait AlarmSignal {
    /// Acquire the audio output for a new episode.
    fn start(&mut self, tone: &ToneSpec) -> Result<SignalToken, SignalError>;

    /// Play one beep on a running signal.
    fn pulse(&mut self, token: &SignalToken, tone: &ToneSpec);

    /// Release everything acquired by `start`.
    fn stop(&mut self, token: SignalToken);
}

/// No audio at all; the alarm is visual only.
#[derive(Debug, Default)]
pub struct SilentSignal {
    next_id: u64,
}

impl AlarmSignal for SilentSignal {
    fn start(&mut self, _tone: &ToneSpec) -> Result<SignalToken, SignalError> {
        self.next_id += 1;
        Ok(SignalToken::new(self.next_id))
    }

    fn pulse(&mut self, _token: &SignalToken, _tone: &ToneSpec) {}

    fn stop(&mut self, _token: SignalToken) {}
}

// ---------------------------------------------------------------------------
// RecordingSignal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SignalEvent {
    Start { token: u64, tone: ToneSpec },
    Pulse { token: u64 },
    Stop { token: u64 },
}

/// Shared, drainable log of signal events.
#[derive(Debug, Clone, Default)]
pub struct SignalLog(Rc<RefCell<Vec<SignalEvent>>>);

impl SignalLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: SignalEvent) {
        self.0.borrow_mut().push(event);
    }

    /// Take every event recorded since the last drain.
    pub fn drain(&self) -> Vec<SignalEvent> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn events(&self) -> Vec<SignalEvent> {
        self.0.borrow().clone()
    }

    pub fn count_pulses(&self) -> usize {
        self.0.borrow().iter().filter(|e| matches!(e, SignalEvent::Pulse { .. })).count()
    }

    pub fn count_starts(&self) -> usize {
        self.0.borrow().iter().filter(|e| matches!(e, SignalEvent::Start { .. })).count()
    }

    pub fn count_stops(&self) -> usize {
        self.0.borrow().iter().filter(|e| matches!(e, SignalEvent::Stop { .. })).count()
    }

    /// Starts minus stops: how many signals are still holding audio.
    pub fn active(&self) -> usize {
        self.count_starts().saturating_sub(self.count_stops())
    }
}

/// Records every call into a [`SignalLog`] for a player that lives elsewhere
/// (the browser page drains it and plays the beeps with Web Audio).
#[derive(Debug, Default)]
pub struct RecordingSignal {
    log: SignalLog,
    next_id: u64,
    unavailable: bool,
}

impl RecordingSignal {
    pub fn new(log: SignalLog) -> Self {
        Self { log, next_id: 0, unavailable: false }
    }

    /// A signal whose `start` always fails, as when the platform denies audio.
    pub fn unavailable(log: SignalLog) -> Self {
        Self { unavailable: true, ..Self::new(log) }
    }

    pub fn log(&self) -> &SignalLog {
        &self.log
    }
}

impl AlarmSignal for RecordingSignal {
    fn start(&mut self, tone: &ToneSpec) -> Result<SignalToken, SignalError> {
        if self.unavailable {
            return Err(SignalError::Unavailable("audio context denied".to_string()));
        }
        self.next_id += 1;
        self.log.push(SignalEvent::Start { token: self.next_id, tone: *tone });
        Ok(SignalToken::new(self.next_id))
    }

    fn pulse(&mut self, token: &SignalToken, _tone: &ToneSpec) {
        self.log.push(SignalEvent::Pulse { token: token.id() });
    }

    fn stop(&mut self, token: SignalToken) {
        self.log.push(SignalEvent::Stop { token: token.id() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_signal_logs_lifecycle() {
        let log = SignalLog::new();
        let mut sig = RecordingSignal::new(log.clone());
        let tone = ToneSpec::default();

        let token = sig.start(&tone).unwrap();
        sig.pulse(&token, &tone);
        sig.pulse(&token, &tone);
        assert_eq!(log.active(), 1);
        sig.stop(token);

        assert_eq!(log.count_starts(), 1);
        assert_eq!(log.count_pulses(), 2);
        assert_eq!(log.count_stops(), 1);
        assert_eq!(log.active(), 0);
    }

    #[test]
    fn drain_empties_the_log() {
        let log = SignalLog::new();
        let mut sig = RecordingSignal::new(log.clone());
        let token = sig.start(&ToneSpec::default()).unwrap();
        sig.stop(token);
        assert_eq!(log.drain().len(), 2);
        assert!(log.drain().is_empty());
    }

    #[test]
    fn unavailable_signal_fails_to_start() {
        let log = SignalLog::new();
        let mut sig = RecordingSignal::unavailable(log.clone());
        assert!(matches!(sig.start(&ToneSpec::default()), Err(SignalError::Unavailable(_))));
        assert!(log.events().is_empty());
    }

    #[test]
    fn default_tone_is_the_dashboard_beep() {
        let tone = ToneSpec::default();
        assert_eq!(tone.frequency_hz, 800.0);
        assert_eq!(tone.duration_ms, 200);
        assert_eq!(tone.waveform, Waveform::Square);
    }

    #[test]
    fn events_serialize_with_kind_tag() {
        let json = serde_json::to_value(SignalEvent::Pulse { token: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "pulse", "token": 3 }));
    }
}
