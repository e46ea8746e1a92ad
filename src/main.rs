use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::Level;

use stationzones::compute_partition;
use stationzones::config::{FileConfig, validate_options};
use stationzones::domain::ConstraintSet;
use stationzones::geometry::Projector;
use stationzones::io::{
    ConstraintFile, CoordFrame, load_constraints, load_stations, to_facility_set, write_geojson,
};

/// Compute constrained Voronoi service areas for bike and metro stations
///
/// Examples:
///   # Partition a station list with no constraints
///   stationzones -s stations.csv
///
///   # Keep cells inside the city limits and out of the river
///   stationzones -s stations.csv -k city.json -o zones.geojson
///
///   # Same inputs, but ignore the constraint file
///   stationzones -s stations.csv -k city.json --unconstrained
///
///   # Use a config file
///   stationzones --config my-settings.toml
#[derive(Parser, Debug)]
#[command(name = "stationzones")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches stationzones.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Station list: CSV with name,lat,lng[,tag] columns or a JSON array
    #[arg(short = 's', long)]
    stations: Option<PathBuf>,

    /// Constraint JSON with an `outer` ring and `inner` obstacle rings
    #[arg(short = 'k', long)]
    constraints: Option<PathBuf>,

    /// Output GeoJSON path (defaults to zones.geojson)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Ignore constraints: no filtering, no clipping
    #[arg(long)]
    unconstrained: bool,

    /// Work in raw degrees instead of projecting to local meters
    #[arg(long)]
    no_project: bool,

    /// Padding of the diagram extent as a share of its larger side
    #[arg(long)]
    margin: Option<f64>,

    /// Coordinate coincidence tolerance, in engine units
    #[arg(long)]
    epsilon: Option<f64>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    init_logging(args.verbose);

    let file_config = match args.config {
        Some(ref config_path) => FileConfig::load_from(config_path)?,
        None => FileConfig::load().unwrap_or_default(),
    };

    let stations_path = args
        .stations
        .clone()
        .or_else(|| file_config.stations.clone());
    let constraints_path = args
        .constraints
        .clone()
        .or_else(|| file_config.constraints.clone());
    let output_path = args
        .output
        .clone()
        .or_else(|| file_config.output.clone())
        .unwrap_or_else(|| PathBuf::from("zones.geojson"));
    let verbose = args.verbose || file_config.verbose;

    let mut options = file_config.partition_options();
    if args.unconstrained {
        options.apply_constraints = false;
    }
    if let Some(margin) = args.margin {
        options.margin_ratio = margin;
    }
    if let Some(epsilon) = args.epsilon {
        options.epsilon = epsilon;
    }
    validate_options(&options).context("Invalid --epsilon or --margin")?;
    let project = file_config.project && !args.no_project;

    let Some(stations_path) = stations_path else {
        bail!("Must provide a station list with --stations/-s or in the config file");
    };

    println!("stationzones - Station Service Areas");
    println!("====================================");
    println!();

    if verbose {
        println!("Configuration:");
        println!("  Stations: {}", stations_path.display());
        match constraints_path {
            Some(ref p) => println!("  Constraints: {}", p.display()),
            None => println!("  Constraints: none"),
        }
        println!(
            "  Constraint mode: {}",
            if options.apply_constraints { "on" } else { "off" }
        );
        println!(
            "  Coordinates: {}",
            if project { "local meters" } else { "degrees" }
        );
        println!("  Margin: {}", options.margin_ratio);
        println!("  Epsilon: {:e}", options.epsilon);
        println!("  Output: {}", output_path.display());
        println!();
    }

    let spinner = create_spinner("Loading stations...");
    let start = Instant::now();
    let records = load_stations(&stations_path)?;
    spinner.finish_with_message(format!(
        "Loaded {} stations [{:.1}s]",
        records.len(),
        start.elapsed().as_secs_f32()
    ));

    let constraint_file = match constraints_path {
        Some(ref path) => {
            let spinner = create_spinner("Loading constraints...");
            let start = Instant::now();
            let file = load_constraints(path)?;
            spinner.finish_with_message(format!(
                "Loaded {} outer points and {} obstacles [{:.1}s]",
                file.outer.len(),
                file.inner.len(),
                start.elapsed().as_secs_f32()
            ));
            Some(file)
        }
        None => None,
    };

    let frame = if project {
        let coords: Vec<(f64, f64)> = records
            .iter()
            .map(|r| (r.lat, r.lng))
            .chain(constraint_file.iter().flat_map(ConstraintFile::coords))
            .collect();
        match Projector::centered_on(&coords) {
            Some(projector) => CoordFrame::Projected(projector),
            None => CoordFrame::Degrees,
        }
    } else {
        CoordFrame::Degrees
    };

    let facilities = to_facility_set(&records, &frame)?;
    let constraints = match constraint_file {
        Some(ref file) => file.to_constraint_set(&frame)?,
        None => ConstraintSet::unconstrained(),
    };

    let spinner = create_spinner("Computing service areas...");
    let start = Instant::now();
    let partition = compute_partition(facilities.as_slice(), &constraints, &options)
        .context("Failed to compute partition")?;
    spinner.finish_with_message(format!(
        "Computed {} cells [{:.1}s]",
        partition.cells.len(),
        start.elapsed().as_secs_f32()
    ));

    let spinner = create_spinner("Writing GeoJSON...");
    let start = Instant::now();
    write_geojson(&output_path, &partition, &facilities, &frame)?;
    spinner.finish_with_message(format!(
        "Wrote {} [{:.1}s]",
        output_path.display(),
        start.elapsed().as_secs_f32()
    ));

    println!();
    println!("Summary");
    println!("=======");
    println!("  Cells:     {}", partition.cells.len());
    println!("  Excluded:  {}", partition.excluded.len());
    println!("  Fallbacks: {}", partition.fallbacks.len());

    if verbose {
        for (id, reason) in &partition.excluded {
            let name = facilities.get(*id).map_or("?", |f| f.name.as_str());
            println!("  - {} {}: {}", id, name, reason);
        }
        for fallback in &partition.fallbacks {
            println!(
                "  ! {} kept its {:?}-stage shape: {}",
                fallback.facility, fallback.stage, fallback.error
            );
        }
    }

    println!();
    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
