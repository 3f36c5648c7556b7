// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Slope Risk Simulation Core - Zone Catalog

//! Read-only zone metadata injected into sessions.
//!
//! The catalog supplies each zone's baseline stability (for the simulator)
//! and latest AI confidence (for the critical-alert monitor). Unknown ids
//! resolve to the catalog's fallback profile.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DEFAULT_MINESITE: &str = "Ironstone Ridge Quarry";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ZoneRiskStatus {
    Stable,
    Warning,
    Critical,
}

impl ZoneRiskStatus {
    pub fn from_risk_level(risk_level: u8) -> Self {
        if risk_level >= 70 {
            Self::Critical
        } else if risk_level >= 50 {
            Self::Warning
        } else {
            Self::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneProfile {
    pub name: String,
    /// Known stability (0-100) before any simulated parameters.
    pub baseline_stability: u8,
    /// Monitored risk level (0-100).
    pub risk_level: u8,
    /// Latest AI confidence percentage for the zone's hazard call.
    pub ai_confidence: f64,
    #[serde(default = "default_minesite")]
    pub minesite: String,
    #[serde(default)]
    pub last_update: String,
}

fn default_minesite() -> String {
    DEFAULT_MINESITE.to_string()
}

impl ZoneProfile {
    pub fn new(name: &str, baseline_stability: u8, risk_level: u8, ai_confidence: f64, last_update: &str) -> Self {
        Self {
            name: name.to_string(),
            baseline_stability,
            risk_level,
            ai_confidence,
            minesite: default_minesite(),
            last_update: last_update.to_string(),
        }
    }

    pub fn risk_status(&self) -> ZoneRiskStatus {
        ZoneRiskStatus::from_risk_level(self.risk_level)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneCatalog {
    #[serde(default)]
    pub zones: BTreeMap<String, ZoneProfile>,
    #[serde(default = "ZoneCatalog::default_fallback")]
    pub fallback: ZoneProfile,
}

impl Default for ZoneCatalog {
    fn default() -> Self {
        let zones = [
            ("zone1", ZoneProfile::new("Haul Road Sector 7", 75, 25, 78.5, "2025-09-16 14:32:00")),
            ("zone2", ZoneProfile::new("North Face - Bench B2", 65, 35, 82.1, "2025-09-16 14:28:00")),
            ("zone3", ZoneProfile::new("South Wall - Bench C4", 65, 65, 89.3, "2025-09-16 14:25:00")),
            ("sector7g", ZoneProfile::new("Sector 7G - Overhang", 50, 98, 97.8, "2025-09-16 14:35:00")),
        ]
        .into_iter()
        .map(|(id, profile)| (id.to_string(), profile))
        .collect();

        Self { zones, fallback: Self::default_fallback() }
    }
}

impl ZoneCatalog {
    /// An empty catalog where every lookup hits `fallback`.
    pub fn empty(fallback: ZoneProfile) -> Self {
        Self { zones: BTreeMap::new(), fallback }
    }

    fn default_fallback() -> ZoneProfile {
        ZoneProfile::new("Unknown Zone", 50, 50, 70.0, "2025-09-16 14:30:00")
    }

    pub fn with_zone(mut self, id: impl Into<String>, profile: ZoneProfile) -> Self {
        self.zones.insert(id.into(), profile);
        self
    }

    pub fn get(&self, zone_id: &str) -> Option<&ZoneProfile> {
        self.zones.get(zone_id)
    }

    /// Profile for `zone_id`, or the fallback when the id is unknown.
    pub fn lookup(&self, zone_id: &str) -> &ZoneProfile {
        self.zones.get(zone_id).unwrap_or(&self.fallback)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.zones.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ZoneProfile)> {
        self.zones.iter().map(|(id, p)| (id.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
