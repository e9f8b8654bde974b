mod config;
mod predict;
mod rank;
mod spacetrack;

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::Config;
use crate::predict::{load_records, subpoint, RecordSet, Sgp4Propagator};
use crate::rank::{rank_candidates, write_ranking, write_rejected, write_subpoints};
use crate::spacetrack::Credentials;

#[derive(Parser)]
#[command(name = "sat-sighting")]
#[command(about = "Find the satellite seen in a sky photograph")]
struct Cli {
    /// YAML configuration file; built-in defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download element sets from Space-Track into the records file
    Fetch,
    /// Rank satellites by angular distance from the sun at the observation time
    Rank {
        /// Override the configured observation time (RFC 3339, optional "+ 5s" offset)
        #[arg(long)]
        time: Option<String>,
        /// Print the full ranking, including skipped records, as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the ground point below every satellite
    Subpoints {
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Check a configuration file and print the resolved observation
    Validate,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error reading config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    match cli.command {
        Commands::Fetch => fetch(&config),
        Commands::Rank { time, json } => rank(&config, time.as_deref(), json),
        Commands::Subpoints { time, json } => subpoints(&config, time.as_deref(), json),
        Commands::Validate => validate(&config),
    }
}

fn fetch(config: &Config) -> ExitCode {
    let params = match config.spacetrack.query_parameters() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let credentials = match Credentials::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(spacetrack::download(
        &config.spacetrack.base_url,
        &credentials,
        &params,
        &config.records_file,
    )) {
        Ok(count) => {
            println!(
                "Saved {} records to {}",
                count,
                config.records_file.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Data request failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load(config: &Config) -> Option<RecordSet> {
    match load_records(&config.records_file) {
        Ok(set) => {
            if let Err(e) = write_rejected(&mut io::stderr().lock(), &set.rejected) {
                log::warn!("Could not report rejected records: {}", e);
            }
            Some(set)
        }
        Err(e) => {
            eprintln!(
                "Error loading {}: {}",
                config.records_file.display(),
                e
            );
            None
        }
    }
}

fn rank(config: &Config, time: Option<&str>, json: bool) -> ExitCode {
    let event = match config.event.resolve(time) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let Some(set) = load(config) else {
        return ExitCode::FAILURE;
    };

    log::info!("Loaded {} satellites", set.records.len());
    let ranking = rank_candidates(&Sgp4Propagator, &set.records, &event, &config.ranking);

    let written = if json {
        print_json(&ranking)
    } else {
        write_ranking(&mut io::stdout().lock(), &ranking)
    };
    if let Err(e) = written {
        eprintln!("Error writing output: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn subpoints(config: &Config, time: Option<&str>, json: bool) -> ExitCode {
    let event = match config.event.resolve(time) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let Some(set) = load(config) else {
        return ExitCode::FAILURE;
    };

    let mut points = Vec::new();
    for record in &set.records {
        match record
            .to_satellite()
            .and_then(|satellite| subpoint(&satellite, event.instant))
        {
            Ok(point) => points.push(point),
            Err(e) => log::warn!("Error processing satellite {}: {}", record.display_name(), e),
        }
    }

    let written = if json {
        print_json(&points)
    } else {
        write_subpoints(&mut io::stdout().lock(), &points)
    };
    if let Err(e) = written {
        eprintln!("Error writing output: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn print_json<T: serde::Serialize>(value: &T) -> io::Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)
}

fn validate(config: &Config) -> ExitCode {
    let event = match config.event.resolve(None) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let params = match config.spacetrack.query_parameters() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Configuration is valid");
    println!(
        "  observer: {:.5}, {:.5} ({} m)",
        event.observer.latitude_deg, event.observer.longitude_deg, event.observer.altitude_m
    );
    println!("  time: {}", event.instant.to_rfc3339());
    println!(
        "  sun: altitude {:.2}°, azimuth {:.2}°",
        event.sun.altitude_deg, event.sun.azimuth_deg
    );
    println!(
        "  filters: altitude > {}°, range < {} km, top {}",
        config.ranking.min_altitude_deg, config.ranking.max_range_km, config.ranking.top_n
    );
    println!("  records file: {}", config.records_file.display());
    println!(
        "  query: {}",
        spacetrack::query_url(&config.spacetrack.base_url, &params)
    );
    ExitCode::SUCCESS
}
