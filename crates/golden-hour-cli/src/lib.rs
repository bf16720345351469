//! Golden Hour CLI
//!
//! Command-line driver for the rescue coordination core. It loads a fleet
//! file (reporter, ambulances, hospitals) and runs operations against an
//! in-memory coordinator.
//!
//! # Features
//!
//! - **rescue**: Hospital ranking, end-to-end rescue simulation, analytics
//! - **version**: Display version information
//!
//! # Usage
//!
//! ```bash
//! # Rank hospitals for an accident location
//! golden-hour rescue rank --fleet fixtures/fleet.json --lat 13.628 --lon 79.419
//!
//! # Run one rescue end-to-end with simulated latency
//! golden-hour rescue simulate --fleet fixtures/fleet.json --severity critical
//!
//! # Same, without waiting
//! golden-hour rescue simulate --fleet fixtures/fleet.json --instant --format json
//! ```

use clap::{Parser, Subcommand};

pub mod fleet;
pub mod rescue;

/// Golden Hour Command Line Interface
#[derive(Parser, Debug)]
#[command(name = "golden-hour")]
#[command(author, version, about = "Road-accident rescue coordination inside the golden hour")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rescue coordination commands
    #[command(subcommand)]
    Rescue(rescue::RescueCommand),

    /// Display version information
    Version,
}
