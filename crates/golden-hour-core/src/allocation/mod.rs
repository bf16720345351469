//! Allocation context: hospital ranking and ambulance selection.

mod dispatch;
mod ranking;

pub use dispatch::AmbulanceSelector;
pub use ranking::{HospitalRanker, RankedHospital, RankingWeights};
