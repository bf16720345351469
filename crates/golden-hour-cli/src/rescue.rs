//! Rescue CLI Subcommands
//!
//! This module provides CLI commands for rescue coordination:
//! - Hospital ranking for an accident location
//! - End-to-end rescue simulation with timeline and notifications
//! - Analytics over the simulated rescues

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use golden_hour_core::{
    Accident, AccidentStatus, AnalyticsSnapshot, NewAccident, Notification, RankedHospital,
    RescueConfig, RescueCoordinator, RiskLevel, Severity, TimelineEntry,
};

use crate::fleet::Fleet;

/// Rescue subcommand
#[derive(Subcommand, Debug)]
pub enum RescueCommand {
    /// Rank hospitals for an accident location
    Rank(RankArgs),

    /// Run rescues end-to-end with simulated latency
    Simulate(SimulateArgs),
}

/// Where the accident happened
#[derive(Args, Debug, Clone)]
pub struct LocationArgs {
    /// Fleet file (JSON)
    #[arg(short, long)]
    pub fleet: PathBuf,

    /// Accident latitude (fleet default location if not specified)
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Accident longitude (fleet default location if not specified)
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Accident place name
    #[arg(short, long)]
    pub location: Option<String>,
}

/// Arguments for the rank command
#[derive(Args, Debug)]
pub struct RankArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Show at most this many hospitals
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the simulate command
#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Reported severity
    #[arg(short, long, value_enum, default_value = "moderate")]
    pub severity: SeverityArg,

    /// Number of rescues to run one after another
    #[arg(short, long, default_value = "1")]
    pub count: u32,

    /// Skip simulated latency
    #[arg(long)]
    pub instant: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Severity argument enum for CLI
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SeverityArg {
    Critical,
    Moderate,
    Low,
}

impl From<SeverityArg> for Severity {
    fn from(val: SeverityArg) -> Self {
        match val {
            SeverityArg::Critical => Severity::Critical,
            SeverityArg::Moderate => Severity::Moderate,
            SeverityArg::Low => Severity::Low,
        }
    }
}

/// Output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum OutputFormat {
    /// Pretty table output
    #[default]
    Table,
    /// JSON output
    Json,
    /// Compact single-line output
    Compact,
}

// ============================================================================
// Display Structs for Tables
// ============================================================================

/// Ranked hospital display row
#[derive(Tabled, Serialize)]
struct RankRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Hospital")]
    name: String,
    #[tabled(rename = "ICU (free/total)")]
    icu: String,
    #[tabled(rename = "Readiness")]
    readiness: String,
    #[tabled(rename = "Distance")]
    distance: String,
    #[tabled(rename = "Score")]
    score: String,
}

impl From<&RankedHospital> for RankRow {
    fn from(ranked: &RankedHospital) -> Self {
        let h = &ranked.hospital;
        Self {
            rank: ranked.rank,
            name: h.name().to_string(),
            icu: format!("{}/{}", h.available_icu_beds(), h.total_icu_beds()),
            readiness: format!("{}%", h.readiness_percentage()),
            distance: h
                .distance_km()
                .map(|km| format!("{:.1} km", km))
                .unwrap_or_else(|| "-".to_string()),
            score: format!("{:.1}", ranked.score),
        }
    }
}

/// Timeline display row
#[derive(Tabled)]
struct TimelineRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Event")]
    event: String,
    #[tabled(rename = "Description")]
    description: String,
}

/// Notification display row
#[derive(Tabled)]
struct NotificationRow {
    #[tabled(rename = "Recipient")]
    recipient: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Message")]
    message: String,
}

/// One simulated rescue
#[derive(Serialize)]
struct RescueRun {
    accident: Accident,
    timeline: Vec<TimelineEntry>,
}

/// Full simulation output
#[derive(Serialize)]
struct SimulationReport {
    rescues: Vec<RescueRun>,
    notifications: Vec<Notification>,
    analytics: AnalyticsSnapshot,
}

// ============================================================================
// Command Execution
// ============================================================================

/// Execute a rescue command
pub async fn execute(command: RescueCommand) -> Result<()> {
    match command {
        RescueCommand::Rank(args) => execute_rank(args),
        RescueCommand::Simulate(args) => execute_simulate(args).await,
    }
}

/// Load the fleet and build a coordinator
fn load_coordinator(location: &LocationArgs, instant: bool) -> Result<RescueCoordinator> {
    let fleet = Fleet::load(&location.fleet)?;
    tracing::info!(
        fleet = %location.fleet.display(),
        ambulances = fleet.ambulances.len(),
        hospitals = fleet.hospitals.len(),
        "Fleet loaded"
    );
    let mut config = fleet.config();
    if instant {
        config = RescueConfig {
            verification_latency_ms: 0,
            dispatch_latency_ms: 0,
            allocation_latency_ms: 0,
            ..config
        };
    }
    Ok(fleet.into_coordinator(config))
}

/// Report built from the location arguments
fn new_accident(location: &LocationArgs, severity: Option<Severity>) -> NewAccident {
    NewAccident {
        latitude: location.lat,
        longitude: location.lon,
        location_name: location.location.clone(),
        severity,
        ..NewAccident::default()
    }
}

/// Execute the rank command
fn execute_rank(args: RankArgs) -> Result<()> {
    let coordinator = load_coordinator(&args.location, true)?;
    let accident = coordinator.create_accident(new_accident(&args.location, None))?;

    let mut rows: Vec<RankRow> = coordinator
        .rank_hospitals(accident.id())?
        .iter()
        .map(RankRow::from)
        .collect();
    if let Some(limit) = args.limit {
        rows.truncate(limit);
    }

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Compact => {
            for r in &rows {
                println!("{}\t{}\t{}\t{}\t{}", r.rank, r.name, r.icu, r.distance, r.score);
            }
        }
        OutputFormat::Table => {
            println!(
                "{} Hospitals for {} ({:.4}, {:.4})",
                "[RANK]".bright_cyan().bold(),
                accident.location().name.bold(),
                accident.location().latitude(),
                accident.location().longitude()
            );
            if rows.is_empty() {
                println!("{}", "No hospitals in fleet file".yellow());
            } else {
                let table = Table::new(rows).with(Style::rounded()).to_string();
                println!("{}", table);
            }
        }
    }

    Ok(())
}

/// Execute the simulate command
async fn execute_simulate(args: SimulateArgs) -> Result<()> {
    let coordinator = load_coordinator(&args.location, args.instant)?;
    let table = matches!(args.format, OutputFormat::Table);
    let mut rescues = Vec::new();

    for n in 1..=args.count.max(1) {
        let accident = run_rescue(&coordinator, &args, table)
            .await
            .with_context(|| format!("Rescue {} failed", n))?;
        tracing::info!(
            number = %accident.number(),
            minutes = accident.rescue_minutes().unwrap_or(0),
            "Simulated rescue completed"
        );
        let timeline = coordinator.timeline(accident.id())?;
        rescues.push(RescueRun { accident, timeline });
    }

    let report = SimulationReport {
        rescues,
        notifications: coordinator.notifications(),
        analytics: coordinator.analytics(),
    };

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Compact => {
            for run in &report.rescues {
                let a = &run.accident;
                println!(
                    "{}\t{}\t{}\t{}",
                    a.number(),
                    a.location().name,
                    a.status(),
                    a.rescue_minutes().unwrap_or(0)
                );
            }
        }
        OutputFormat::Table => print_report(&report, coordinator.config()),
    }

    Ok(())
}

/// Drive one accident from SOS to hand-over
async fn run_rescue(
    coordinator: &RescueCoordinator,
    args: &SimulateArgs,
    verbose: bool,
) -> Result<Accident> {
    let report = new_accident(&args.location, Some(args.severity.into()));

    let accident = coordinator.report_and_verify(report).await?;
    tracing::debug!(number = %accident.number(), "Simulated rescue started");
    step(verbose, "VERIFIED", &accident);
    if accident.status() != AccidentStatus::Verified {
        anyhow::bail!("Report {} could not be verified", accident.number());
    }

    let accident = coordinator.dispatch_nearest(accident.id()).await?;
    step(verbose, "DISPATCHED", &accident);

    let accident = coordinator.allocate_best(accident.id()).await?;
    step(verbose, "ALLOCATED", &accident);

    let accident = coordinator.complete(accident.id())?;
    step(verbose, "COMPLETED", &accident);

    Ok(accident)
}

fn step(verbose: bool, label: &str, accident: &Accident) {
    tracing::debug!(number = %accident.number(), step = label, status = %accident.status(), "Rescue step");
    if verbose {
        println!(
            "{} Accident {} at {} is {}",
            format!("[{}]", label).bright_cyan().bold(),
            accident.number(),
            accident.location().name,
            format_status(accident.status())
        );
    }
}

fn print_report(report: &SimulationReport, config: &RescueConfig) {
    for run in &report.rescues {
        println!();
        println!("{} {}", "Timeline".bold(), run.accident.number());
        let rows: Vec<TimelineRow> = run
            .timeline
            .iter()
            .map(|e| TimelineRow {
                time: e.timestamp.format("%H:%M:%S").to_string(),
                event: e.event_type.to_string(),
                description: e.description.clone(),
            })
            .collect();
        println!("{}", Table::new(rows).with(Style::rounded()));
    }

    println!();
    println!("{}", "Notifications".bold());
    let rows: Vec<NotificationRow> = report
        .notifications
        .iter()
        .map(|n| NotificationRow {
            recipient: n.recipient_type().to_string(),
            name: n.recipient_name().to_string(),
            message: n.message().to_string(),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));

    let analytics = &report.analytics;
    println!();
    println!("{}", "Analytics:".bold());
    println!("  {} {}", "Accidents:".dimmed(), analytics.total_accidents);
    println!("  {} {}", "Completed:".dimmed(), analytics.completed);
    if let Some(minutes) = analytics.average_rescue_minutes {
        println!("  {} {:.1} min", "Average rescue:".dimmed(), minutes);
    }
    if let Some(rate) = analytics.golden_hour_rate {
        println!(
            "  {} {:.0}% within {} min",
            "Golden hour:".dimmed(),
            rate,
            config.golden_hour_minutes
        );
    }
    for spot in &analytics.hotspots {
        println!(
            "  {} {} ({} accidents, {})",
            "Hotspot:".dimmed(),
            spot.zone_name,
            spot.accident_count,
            format_risk(spot.risk_level)
        );
    }
    println!(
        "  {} {}/{} ICU beds free",
        "Capacity:".dimmed(),
        analytics.capacity.available_icu_beds,
        analytics.capacity.total_icu_beds
    );
}

/// Format accident status with color
fn format_status(status: AccidentStatus) -> String {
    match status {
        AccidentStatus::Reported => "Reported".yellow().to_string(),
        AccidentStatus::Verified => "Verified".blue().to_string(),
        AccidentStatus::Dispatched => "Dispatched".cyan().to_string(),
        AccidentStatus::InProgress => "InProgress".magenta().to_string(),
        AccidentStatus::Completed => "Completed".green().bold().to_string(),
    }
}

/// Format hotspot risk with color
fn format_risk(risk: RiskLevel) -> String {
    match risk {
        RiskLevel::High => "High risk".red().bold().to_string(),
        RiskLevel::Medium => "Medium risk".yellow().to_string(),
        RiskLevel::Low => "Low risk".green().to_string(),
    }
}
