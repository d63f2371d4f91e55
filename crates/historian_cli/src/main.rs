//! CLI entry point: smoke probe and sample-data seeding.
//!
//! # Responsibility
//! - Provide a minimal executable to verify core/api crate wiring.
//! - Seed a database with realistic sample sources and readings for local
//!   frontend development.

use clap::{Parser, Subcommand};
use historian_api::{
    configure_db_path, ingest_point, register_source, ApiError, RegisterSourceRequest,
};
use rand::Rng;
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "historian")]
#[command(about = "Data historian maintenance commands")]
struct Cli {
    /// Path to the SQLite database file
    #[arg(long, default_value = "historian.sqlite3")]
    db_path: PathBuf,

    /// Log level for file logging (trace|debug|info|warn|error)
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging stays off without it
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print core wiring diagnostics
    Probe,
    /// Register sample sources and ingest generated readings
    Seed {
        /// Readings to ingest per newly registered source
        #[arg(long, default_value_t = 50)]
        points_per_source: u32,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(message) = run(cli) {
        eprintln!("{message}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if let Some(log_dir) = cli.log_dir.as_ref() {
        let default_level = historian_core::default_log_level();
        let level = cli.log_level.as_deref().unwrap_or(default_level);
        let dir = log_dir
            .to_str()
            .ok_or_else(|| "log_dir must be valid UTF-8".to_string())?;
        historian_core::init_logging(level, dir)?;
    }

    configure_db_path(cli.db_path)?;

    match cli.command {
        Command::Probe => probe(),
        Command::Seed { points_per_source } => seed(points_per_source),
    }
}

fn probe() -> Result<(), String> {
    println!("historian_core ping={}", historian_core::ping());
    println!("historian_core version={}", historian_core::core_version());
    Ok(())
}

struct SampleSource {
    name: &'static str,
    source_type: &'static str,
    config: serde_json::Value,
}

fn sample_sources() -> Vec<SampleSource> {
    vec![
        SampleSource {
            name: "Houston Temperature Sensor",
            source_type: "temperature",
            config: json!({
                "latitude": 29.7604,
                "longitude": -95.3698,
                "unit": "celsius",
                "location": "Houston, TX"
            }),
        },
        SampleSource {
            name: "Dallas Humidity Monitor",
            source_type: "humidity",
            config: json!({
                "latitude": 32.7767,
                "longitude": -96.7970,
                "unit": "percent",
                "location": "Dallas, TX"
            }),
        },
        SampleSource {
            name: "Austin Pressure Gauge",
            source_type: "pressure",
            config: json!({
                "latitude": 30.2672,
                "longitude": -97.7431,
                "unit": "hPa",
                "location": "Austin, TX"
            }),
        },
        SampleSource {
            name: "San Antonio Wind Speed",
            source_type: "wind_speed",
            config: json!({
                "latitude": 29.4241,
                "longitude": -98.4936,
                "unit": "m/s",
                "location": "San Antonio, TX"
            }),
        },
    ]
}

fn seed(points_per_source: u32) -> Result<(), String> {
    println!("Seeding sample data into the historian...");

    let mut created = Vec::new();
    for sample in sample_sources() {
        let result = register_source(RegisterSourceRequest {
            name: sample.name.to_string(),
            source_type: sample.source_type.to_string(),
            config: Some(sample.config),
        });

        match result {
            Ok(source) => {
                println!("Created data source: {} (id {})", source.name, source.id);
                created.push(source);
            }
            Err(ApiError::DuplicateName(name)) => {
                println!("Skipping existing data source: {name}");
            }
            Err(err) => return Err(format!("failed to create source {}: {err}", sample.name)),
        }
    }

    let mut rng = rand::thread_rng();
    for source in &created {
        for _ in 0..points_per_source {
            let value = sample_value(&mut rng, source.source_type.as_str());
            ingest_point(source.id, value)
                .map_err(|err| format!("failed to ingest point for source {}: {err}", source.id))?;
        }
        println!("Created {points_per_source} data points for {}", source.name);
    }

    println!("Sample data seeding completed");
    Ok(())
}

/// Draws a reading from a plausible range for the source type.
fn sample_value(rng: &mut impl Rng, source_type: &str) -> f64 {
    let raw = match source_type {
        "temperature" => rng.gen_range(20.0..35.0),
        "humidity" => rng.gen_range(30.0..80.0),
        "pressure" => rng.gen_range(1000.0..1020.0),
        "wind_speed" => rng.gen_range(0.0..15.0),
        _ => rng.gen_range(0.0..100.0),
    };
    (raw * 100.0_f64).round() / 100.0
}
