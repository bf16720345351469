//! Fleet file loading.
//!
//! A fleet file is JSON holding the active reporter, the ambulance fleet,
//! the receiving hospitals and an optional configuration block:
//!
//! ```json
//! {
//!   "reporter": { "full_name": "Priya Sharma", "phone": "+91-9000000000" },
//!   "ambulances": [ ... ],
//!   "hospitals": [ ... ],
//!   "config": { "golden_hour_minutes": 60 }
//! }
//! ```
//!
//! Hospital records are validated on load.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use golden_hour_core::{Ambulance, Hospital, RescueConfig, RescueCoordinator, Reporter};

/// Contents of a fleet file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fleet {
    /// Active reporter
    #[serde(default)]
    pub reporter: Reporter,
    /// Ambulance fleet
    #[serde(default)]
    pub ambulances: Vec<Ambulance>,
    /// Receiving hospitals
    #[serde(default)]
    pub hospitals: Vec<Hospital>,
    /// Configuration overrides
    #[serde(default)]
    pub config: Option<RescueConfig>,
}

impl Fleet {
    /// Parse a fleet from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let fleet: Fleet = serde_json::from_str(text).context("Invalid fleet file")?;
        if let Some(config) = &fleet.config {
            config.validate().context("Invalid configuration in fleet file")?;
        }
        Ok(fleet)
    }

    /// Load a fleet file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fleet file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Failed to load {}", path.display()))
    }

    /// Effective configuration: the file's block or the defaults
    pub fn config(&self) -> RescueConfig {
        self.config.clone().unwrap_or_default()
    }

    /// Build a coordinator over this fleet
    pub fn into_coordinator(self, config: RescueConfig) -> RescueCoordinator {
        RescueCoordinator::new(config, self.reporter)
            .with_ambulances(self.ambulances)
            .with_hospitals(self.hospitals)
    }
}
