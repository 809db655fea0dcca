//! Machine Telemetry Simulation
//!
//! Generates raw IMU and environmental samples for a small fleet of machines
//! for testing PlantWatch. Scenarios:
//! - Normal operation (steady vibration and temperature)
//! - Bearing wear (vibration amplitude grows over the run)
//! - Overheating (temperature climbs toward and past the limit)
//!
//! # Usage
//! ```bash
//! # Stream raw samples into the ingest path
//! ./simulation --machines 3 --speed 10 | ./plantwatch ingest
//!
//! # Samples with a 0.8 °/s gyroscope offset, for calibration
//! ./simulation --scenario normal --gyro-offset 0.8 | ./plantwatch calibrate
//!
//! # Write a fleet snapshot for one-shot analysis
//! ./simulation --format fleet --scenario mixed > fleet.json
//! ./plantwatch analyze --fleet fleet.json
//! ```

use clap::Parser;
use rand::prelude::*;
use rand_distr::StandardNormal;
use std::time::Duration;

use plantwatch::config::{defaults, PlantWatchConfig};
use plantwatch::processing::SampleIngestor;
use plantwatch::types::{
    FleetSnapshot, Machine, MachineRecord, MachineThresholds, RawSample, TaggedSample,
};

// ============================================================================
// Machine Constants
// ============================================================================

/// Per-axis vibration amplitude of a healthy machine (g)
const BASE_VIBRATION_G: f64 = 0.03;
/// Vibration amplitude multiplier reached at the end of a bearing-wear run
const WORN_VIBRATION_FACTOR: f64 = 6.0;
/// Per-axis rotation noise (°/s)
const BASE_ROTATION_DPS: f64 = 1.5;
/// Operating temperature (°C)
const BASE_TEMPERATURE: f64 = 45.0;
/// Temperature gained by the end of an overheating run (°C)
const OVERHEAT_RISE: f64 = 50.0;
/// Relative humidity (%)
const BASE_HUMIDITY: f64 = 45.0;
/// Line pressure (bar)
const BASE_PRESSURE_BAR: f64 = 6.0;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "plantwatch-simulation")]
#[command(about = "Machine telemetry simulation for PlantWatch testing")]
#[command(version = "1.0")]
struct Args {
    /// Number of simulated machines
    #[arg(short, long, default_value = "3", value_parser = clap::value_parser!(u32).range(1..=50))]
    machines: u32,

    /// Samples generated per machine
    #[arg(short = 'n', long, default_value = "600")]
    samples: u32,

    /// Simulated time between samples in milliseconds
    #[arg(long, default_value = "1000")]
    interval_ms: u64,

    /// Time compression factor for jsonl output (0 = no delay)
    #[arg(short, long, default_value = "0")]
    speed: u32,

    /// Output format: jsonl (raw samples) or fleet (snapshot with processed readings)
    #[arg(short, long, default_value = "jsonl")]
    format: String,

    /// Scenario: normal, bearing_wear, overheating or mixed
    #[arg(long, default_value = "mixed")]
    scenario: String,

    /// Static gyroscope zero-rate offset added to every axis (°/s)
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    gyro_offset: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Suppress progress log (only output data)
    #[arg(short, long)]
    quiet: bool,
}

// ============================================================================
// Scenarios
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Scenario {
    Normal,
    BearingWear,
    Overheating,
}

impl Scenario {
    fn parse(name: &str) -> Option<Vec<Scenario>> {
        match name {
            "normal" => Some(vec![Scenario::Normal]),
            "bearing_wear" => Some(vec![Scenario::BearingWear]),
            "overheating" => Some(vec![Scenario::Overheating]),
            "mixed" => Some(vec![Scenario::Normal, Scenario::BearingWear, Scenario::Overheating]),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Scenario::Normal => "Normal Operation",
            Scenario::BearingWear => "Bearing Wear",
            Scenario::Overheating => "Overheating",
        }
    }
}

// ============================================================================
// Simulated Machine
// ============================================================================

struct SimulatedMachine {
    id: String,
    scenario: Scenario,
    gyro_offset_dps: f64,
    rng: StdRng,
}

impl SimulatedMachine {
    fn new(index: u32, scenario: Scenario, gyro_offset_dps: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s.wrapping_add(u64::from(index))),
            None => StdRng::from_entropy(),
        };
        Self {
            id: format!("machine-{}", index + 1),
            scenario,
            gyro_offset_dps,
            rng,
        }
    }

    fn machine(&self) -> Machine {
        Machine::new(self.id.clone(), format!("{} ({})", self.id, self.scenario.name()))
            .with_thresholds(MachineThresholds {
                max_pressure_psi: 1000.0,
                max_temperature: 80.0,
                max_humidity: 70.0,
                max_acceleration: 2.0,
                max_gyroscope: 250.0,
            })
    }

    fn noise(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }

    /// Sample at `progress` (0..1 through the run).
    fn sample(&mut self, progress: f64, timestamp_ms: i64) -> RawSample {
        let vibration_amp = match self.scenario {
            Scenario::BearingWear => BASE_VIBRATION_G * (1.0 + (WORN_VIBRATION_FACTOR - 1.0) * progress),
            Scenario::Normal | Scenario::Overheating => BASE_VIBRATION_G,
        };
        let temperature = match self.scenario {
            Scenario::Overheating => BASE_TEMPERATURE + OVERHEAT_RISE * progress,
            Scenario::Normal | Scenario::BearingWear => BASE_TEMPERATURE,
        };

        let accel_counts = |g: f64| (g * defaults::ACCEL_SCALE_LSB_PER_G).round() as i32;
        let gyro_counts = |dps: f64| (dps * defaults::GYRO_SCALE_LSB_PER_DPS).round() as i32;

        let ax = accel_counts(vibration_amp * self.noise());
        let ay = accel_counts(vibration_amp * self.noise());
        let az = accel_counts(defaults::GRAVITY_G + vibration_amp * self.noise());
        let rotation_amp = BASE_ROTATION_DPS * vibration_amp / BASE_VIBRATION_G;
        let offset = self.gyro_offset_dps;
        let gx = gyro_counts(offset + rotation_amp * self.noise());
        let gy = gyro_counts(offset + rotation_amp * self.noise());
        let gz = gyro_counts(offset + rotation_amp * self.noise());

        RawSample {
            ax,
            ay,
            az,
            gx,
            gy,
            gz,
            temperature: temperature + 0.5 * self.noise(),
            humidity: BASE_HUMIDITY + self.noise(),
            pressure: BASE_PRESSURE_BAR + 0.05 * self.noise(),
            timestamp_ms,
        }
    }
}

fn log_progress(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("[simulation] {message}");
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let scenarios = Scenario::parse(&args.scenario)
        .ok_or_else(|| format!("unknown scenario '{}'", args.scenario))?;
    let fleet_output = match args.format.as_str() {
        "jsonl" => false,
        "fleet" => true,
        other => return Err(format!("unknown format '{other}'").into()),
    };

    let mut machines: Vec<SimulatedMachine> = (0..args.machines)
        .map(|i| SimulatedMachine::new(i, scenarios[i as usize % scenarios.len()], args.gyro_offset, args.seed))
        .collect();

    for m in &machines {
        log_progress(&format!("{} -> {}", m.id, m.scenario.name()), args.quiet);
    }

    let interval_ms = i64::try_from(args.interval_ms)?;
    let start_ms = chrono::Utc::now().timestamp_millis() - interval_ms * i64::from(args.samples);
    let delay = if args.speed == 0 || fleet_output {
        None
    } else {
        Some(Duration::from_millis(args.interval_ms / u64::from(args.speed)))
    };

    let mut ingestor = SampleIngestor::from_config(&PlantWatchConfig::default());
    let total = args.samples.max(1);

    for step in 0..args.samples {
        let progress = f64::from(step) / f64::from(total);
        let timestamp_ms = start_ms + interval_ms * i64::from(step);

        for machine in &mut machines {
            let tagged = TaggedSample {
                machine_id: machine.id.clone(),
                sample: machine.sample(progress, timestamp_ms),
            };
            if fleet_output {
                ingestor.ingest(&tagged);
            } else {
                println!("{}", serde_json::to_string(&tagged)?);
            }
        }

        if step > 0 && step % 100 == 0 {
            log_progress(&format!("{step}/{} samples per machine", args.samples), args.quiet);
        }
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
    }

    if fleet_output {
        let snapshot = FleetSnapshot {
            machines: machines
                .iter()
                .map(|m| MachineRecord {
                    machine: m.machine(),
                    readings: ingestor.history(&m.id),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    log_progress("done", args.quiet);
    Ok(())
}
