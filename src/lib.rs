// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Slope Risk Simulation Core

pub mod types;
pub mod predictor;
pub mod simulation;
pub mod alert;
pub mod zones;
pub mod config;
pub mod session;
pub mod adapter;

pub use types::*;
pub use predictor::{predict, ScenarioSummary};
pub use simulation::SimulationRun;
pub use alert::{AlarmSignal, AlertPhase, AlertSnapshot, CriticalAlertMonitor, CRITICAL_CONFIDENCE_THRESHOLD};
pub use zones::{ZoneCatalog, ZoneProfile};
pub use config::{ConfigError, EngineConfig, TimingConfig};
pub use session::{SessionFrame, ZoneSession};

use wasm_bindgen::prelude::*;

fn to_js<T: serde::Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

fn js_error<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl ZoneSession {
    /// Open a zone from the built-in catalog.
    #[wasm_bindgen(constructor)]
    pub fn new(zone_id: &str, now_ms: f64) -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        ZoneSession::open_recorded(zone_id, &EngineConfig::default(), adapter::millis(now_ms))
    }

    /// Open a zone against a JSON `EngineConfig`.
    pub fn with_config(zone_id: &str, config_json: &str, now_ms: f64) -> Result<ZoneSession, JsValue> {
        let config = EngineConfig::from_json_str(config_json).map_err(js_error)?;
        Ok(ZoneSession::open_recorded(zone_id, &config, adapter::millis(now_ms)))
    }

    /// Slider edit. Returns the `UpdateOutcome` name.
    pub fn update_parameter(&mut self, key: &str, value: f64) -> Result<JsValue, JsValue> {
        let key: ParameterKey = key.parse().map_err(js_error)?;
        Ok(to_js(&self.run.update_parameter(key, ParameterValue::Number(value))))
    }

    /// Checkbox edit for a mitigation flag.
    pub fn set_mitigation(&mut self, key: &str, applied: bool) -> Result<JsValue, JsValue> {
        let key: ParameterKey = key.parse().map_err(js_error)?;
        Ok(to_js(&self.run.update_parameter(key, ParameterValue::Flag(applied))))
    }

    pub fn run(&mut self, now_ms: f64) -> bool {
        self.run.run(adapter::millis(now_ms))
    }

    pub fn reset(&mut self) -> bool {
        self.run.reset()
    }

    pub fn tick(&mut self, now_ms: f64) -> JsValue {
        let frame = self.tick_core(adapter::millis(now_ms));
        to_js(&frame)
    }

    pub fn observe(&mut self, confidence: f64, now_ms: f64) -> JsValue {
        to_js(&self.monitor.observe(confidence, adapter::millis(now_ms)))
    }

    pub fn acknowledge(&mut self) -> JsValue {
        to_js(&self.monitor.acknowledge())
    }

    pub fn status(&self) -> JsValue {
        to_js(&self.run.status())
    }

    pub fn get_parameters(&self) -> JsValue {
        to_js(self.run.parameters())
    }

    /// Last published result, or `null` before the first run completes.
    pub fn get_result(&self) -> JsValue {
        match self.run.last_result() {
            Some(r) => to_js(&r.report()),
            None => JsValue::NULL,
        }
    }

    pub fn get_kpi(&self) -> JsValue {
        to_js(&self.run.kpi().report())
    }

    pub fn get_summary(&self) -> JsValue {
        match self.run.summary() {
            Some(s) => to_js(&s),
            None => JsValue::NULL,
        }
    }

    pub fn get_alert(&self) -> JsValue {
        to_js(&self.monitor.snapshot())
    }

    pub fn get_zone(&self) -> JsValue {
        to_js(&self.zone_view())
    }

    /// Alarm start/pulse/stop events since the last call, for Web Audio playback.
    pub fn drain_signal_events(&self) -> JsValue {
        let events = self.signal_log.as_ref().map(|log| log.drain()).unwrap_or_default();
        to_js(&events)
    }
}
