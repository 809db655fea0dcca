//! PlantWatch - predictive maintenance engine
//!
//! # Usage
//!
//! ```bash
//! # One-shot analysis of a fleet snapshot
//! plantwatch analyze --fleet fleet.json
//!
//! # Continuous monitoring (threshold checks every 30 s, analysis every 120 s)
//! plantwatch watch --fleet fleet.json
//!
//! # Convert raw samples from the simulator into readings
//! ./simulation --machines 2 | plantwatch ingest
//!
//! # Measure the gyroscope zero-rate offset from samples taken at rest
//! ./simulation --scenario normal --gyro-offset 0.8 | plantwatch calibrate
//! ```
//!
//! # Environment Variables
//!
//! - `PLANTWATCH_CONFIG`: Path to a plantwatch.toml (default: ./plantwatch.toml)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use plantwatch::config::{self, validation, PlantWatchConfig};
use plantwatch::monitor::{FleetFileSource, FleetMonitor, LogAlertSink};
use plantwatch::processing::{GyroBias, SampleIngestor};
use plantwatch::types::{FleetReport, TaggedSample};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "plantwatch")]
#[command(about = "PlantWatch predictive maintenance engine")]
#[command(version)]
struct CliArgs {
    /// Path to a plantwatch.toml (overrides PLANTWATCH_CONFIG and ./plantwatch.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Run one threshold pass and one analysis pass, then print the fleet report
    Analyze {
        /// Fleet snapshot file (JSON)
        #[arg(long)]
        fleet: PathBuf,
        /// Print the full report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Monitor a fleet snapshot until Ctrl+C, printing each report as a JSON line
    Watch {
        /// Fleet snapshot file (JSON), re-read on every pass
        #[arg(long)]
        fleet: PathBuf,
    },

    /// Read raw samples (JSON lines) from stdin and write processed samples to stdout
    Ingest,

    /// Average the gyroscope of raw samples (JSON lines on stdin) taken at
    /// rest and print the matching `[sensor]` setting
    Calibrate {
        /// Only use samples from this machine
        #[arg(long)]
        machine: Option<String>,
    },

    /// Validate a config file and report unknown or implausible keys
    CheckConfig {
        /// Config file to check
        path: PathBuf,
    },
}

// ============================================================================
// Commands
// ============================================================================

async fn run_analyze(fleet: PathBuf, json: bool) -> Result<()> {
    let source = FleetFileSource::new(&fleet);
    let mut monitor = FleetMonitor::new(source, LogAlertSink, config::get());

    let published = monitor
        .run_threshold_pass()
        .await
        .with_context(|| format!("Threshold pass over {} failed", fleet.display()))?;
    info!(alerts = published, "Threshold pass complete");

    let report = monitor
        .run_analysis_pass()
        .await
        .with_context(|| format!("Analysis pass over {} failed", fleet.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &FleetReport) {
    println!();
    println!(
        "  Fleet report  {}  ({} of {} machines analysed, efficiency {}%)",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.analyzed_machines,
        report.total_machines,
        report.fleet_efficiency
    );
    println!();
    for analysis in &report.analyses {
        println!(
            "  {:<20} {:<9} health {:>3}%  risk {:>3}  score {:>6.3}  vib {:<10} temp {:<10} service {} ({})",
            analysis.machine_name,
            analysis.status,
            analysis.trend.overall_health,
            analysis.risk_score,
            analysis.anomaly.anomaly_score,
            analysis.trend.vibration_trend,
            analysis.trend.temperature_trend,
            analysis.maintenance.estimated_date,
            analysis.maintenance.priority,
        );
        for rec in &analysis.anomaly.recommendations {
            println!("      - {rec}");
        }
    }
    for skipped in &report.skipped {
        println!("  {:<20} skipped: {}", skipped.machine_id, skipped.reason);
    }
    println!();
}

async fn run_watch(fleet: PathBuf) -> Result<()> {
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let (tx, mut rx) = mpsc::channel::<FleetReport>(8);
    let monitor = FleetMonitor::new(FleetFileSource::new(&fleet), LogAlertSink, config::get())
        .with_report_channel(tx);
    let handle = tokio::spawn(monitor.run(cancel_token));

    while let Some(report) = rx.recv().await {
        println!("{}", serde_json::to_string(&report)?);
    }

    let stats = handle.await.context("Fleet monitor task failed")?;
    info!(
        threshold_passes = stats.threshold_passes,
        analysis_passes = stats.analysis_passes,
        alerts = stats.alerts_published,
        "Monitoring finished"
    );
    Ok(())
}

async fn run_ingest() -> Result<()> {
    let mut ingestor = SampleIngestor::from_config(config::get());
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut processed = 0u64;

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<TaggedSample>(line) {
            Ok(sample) => {
                let ingested = ingestor.ingest(&sample);
                println!("{}", serde_json::to_string(&ingested)?);
                processed += 1;
            }
            Err(e) => warn!(error = %e, "Skipping malformed sample"),
        }
    }

    info!(samples = processed, machines = ingestor.machine_ids().count(), "Ingest finished");
    Ok(())
}

async fn run_calibrate(machine: Option<String>) -> Result<()> {
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut counts = Vec::new();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<TaggedSample>(line) {
            Ok(tagged) if machine.as_ref().map_or(true, |m| *m == tagged.machine_id) => {
                let s = tagged.sample;
                counts.push((s.gx, s.gy, s.gz));
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Skipping malformed sample"),
        }
    }

    if counts.is_empty() {
        anyhow::bail!("No samples to calibrate from");
    }

    let bias: [f64; 3] = GyroBias::calibrate(&counts, config::get().sensor.gyro_scale_lsb_per_dps).into();
    info!(samples = counts.len(), "Gyroscope calibration complete");
    println!("[sensor]");
    println!("gyro_bias_dps = [{:.4}, {:.4}, {:.4}]", bias[0], bias[1], bias[2]);
    Ok(())
}

fn run_check_config(path: PathBuf) -> Result<()> {
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let warnings = validation::validate_unknown_keys(&raw);
    for w in &warnings {
        println!("  warning: {w}");
    }
    let config = PlantWatchConfig::from_toml_str(&raw)?;
    for w in validation::validate_plausibility(&config) {
        println!("  warning: {w}");
    }
    println!("  {} is valid (site: {})", path.display(), config.site.name);
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    if let SubCommand::CheckConfig { path } = args.command {
        return run_check_config(path);
    }

    let plant_config = match &args.config {
        Some(path) => PlantWatchConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PlantWatchConfig::load(),
    };
    info!(
        site = %plant_config.site.name,
        window = plant_config.window.size,
        min_history = plant_config.detection.min_history,
        "PlantWatch starting"
    );
    config::init(plant_config);

    match args.command {
        SubCommand::Analyze { fleet, json } => run_analyze(fleet, json).await,
        SubCommand::Watch { fleet } => run_watch(fleet).await,
        SubCommand::Ingest => run_ingest().await,
        SubCommand::Calibrate { machine } => run_calibrate(machine).await,
        SubCommand::CheckConfig { .. } => Ok(()),
    }
}
