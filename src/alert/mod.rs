//! Critical-alert monitoring: the ARMED/ACKNOWLEDGED state machine and the
//! alarm signal capability it drives.

pub mod monitor;
pub mod signal;

pub use monitor::{AlertPhase, AlertSnapshot, CriticalAlertMonitor, CRITICAL_CONFIDENCE_THRESHOLD};
pub use signal::{AlarmSignal, RecordingSignal, SignalError, SignalEvent, SignalLog, SignalToken, SilentSignal, ToneSpec, Waveform};
