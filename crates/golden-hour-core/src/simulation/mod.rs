//! Simulated external services.
//!
//! Verification, dispatch and allocation each wait a fixed latency before
//! resolving. There is no failure mode, so nothing is retried, and a started
//! step is never cancelled.

use std::time::Duration;

use crate::domain::{Accident, Severity};
use crate::{RescueConfig, Result};

/// A step that takes simulated time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulatedStep {
    /// AI verification of the report
    Verification,
    /// Ambulance dispatch
    Dispatch,
    /// Hospital allocation
    Allocation,
}

impl std::fmt::Display for SimulatedStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulatedStep::Verification => write!(f, "verification"),
            SimulatedStep::Dispatch => write!(f, "dispatch"),
            SimulatedStep::Allocation => write!(f, "allocation"),
        }
    }
}

/// Fixed latency per simulated step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedLatency {
    /// Verification latency
    pub verification: Duration,
    /// Dispatch latency
    pub dispatch: Duration,
    /// Allocation latency
    pub allocation: Duration,
}

impl Default for SimulatedLatency {
    fn default() -> Self {
        Self::from_config(&RescueConfig::default())
    }
}

impl SimulatedLatency {
    /// Take latencies from configuration
    pub fn from_config(config: &RescueConfig) -> Self {
        Self {
            verification: Duration::from_millis(config.verification_latency_ms),
            dispatch: Duration::from_millis(config.dispatch_latency_ms),
            allocation: Duration::from_millis(config.allocation_latency_ms),
        }
    }

    /// No waiting at all
    pub fn instant() -> Self {
        Self {
            verification: Duration::ZERO,
            dispatch: Duration::ZERO,
            allocation: Duration::ZERO,
        }
    }

    /// Latency of one step
    pub fn for_step(&self, step: SimulatedStep) -> Duration {
        match step {
            SimulatedStep::Verification => self.verification,
            SimulatedStep::Dispatch => self.dispatch,
            SimulatedStep::Allocation => self.allocation,
        }
    }

    /// Wait out the latency of one step
    pub async fn wait(&self, step: SimulatedStep) {
        let delay = self.for_step(step);
        if delay.is_zero() {
            return;
        }
        tracing::debug!(step = %step, delay_ms = delay.as_millis() as u64, "Simulating latency");
        tokio::time::sleep(delay).await;
    }
}

/// Outcome of verifying a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Verification {
    /// Whether the report was confirmed
    pub verified: bool,
    /// Severity assessed by the verifier
    pub severity: Severity,
}

/// Confirms or rejects an accident report
#[async_trait::async_trait]
pub trait Verifier: Send + Sync {
    /// Verifier name
    fn name(&self) -> &str;

    /// Assess a report
    async fn verify(&self, accident: &Accident) -> Result<Verification>;
}

/// Verifier that confirms every report after a fixed delay and keeps the
/// reported severity
#[derive(Debug, Clone)]
pub struct SimulatedVerifier {
    latency: Duration,
}

impl SimulatedVerifier {
    /// Create a verifier with the given latency
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for SimulatedVerifier {
    fn default() -> Self {
        Self::new(SimulatedLatency::default().verification)
    }
}

#[async_trait::async_trait]
impl Verifier for SimulatedVerifier {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn verify(&self, accident: &Accident) -> Result<Verification> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(Verification {
            verified: true,
            severity: accident.severity(),
        })
    }
}
