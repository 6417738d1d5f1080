//! roadside CLI - Debug tool for reverse geocoding
//!
//! Usage:
//!   roadside-cli geocode <map.json> --lat <lat> --lon <lon> [--heading <deg>]
//!   roadside-cli trace <map.json> <trace.json>
//!   roadside-cli intersection <map.json> --lat <lat> --lon <lon>
//!   roadside-cli synth [--size <n>] [--output <file>]
//!
//! Loads a JSON map (`{"roads": [...], "pois": [...], "intersections": [...]}`)
//! and prints what the geocoder makes of a location or a whole GPS trace, with
//! the intersection classification and road directions behind each result.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Deserialize;

use roadside::geo_utils::bearing;
use roadside::synthetic::SyntheticGrid;
use roadside::{
    GeocodeError, GeocoderConfig, GpsPoint, Heading, MapRepository, OptionExt, ReverseGeocodeResult,
    ReverseGeocoder, RoadLookup, SecondaryRoadPolicy, SnapshotProvider, closest_intersection,
};

#[derive(Parser)]
#[command(name = "roadside-cli")]
#[command(about = "Debug tool for direction-aware reverse geocoding", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Geocoder configuration (JSON, camelCase fields)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Geocode a single location
    Geocode {
        /// Map file (JSON)
        map: PathBuf,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Compass heading in degrees; omit for unknown
        #[arg(long)]
        heading: Option<f64>,
    },

    /// Replay a GPS trace and print every significant change
    Trace {
        /// Map file (JSON)
        map: PathBuf,

        /// Trace file: JSON array of {"latitude", "longitude", "heading"?}
        trace: PathBuf,

        /// Print every fix, not only significant changes
        #[arg(long)]
        all: bool,
    },

    /// Find the intersection a waypoint snaps to
    Intersection {
        /// Map file (JSON)
        map: PathBuf,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },

    /// Write a synthetic street grid as a map file
    Synth {
        /// Streets in each direction
        #[arg(long, default_value = "10")]
        size: usize,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// One fix of a trace file.
#[derive(Deserialize)]
struct TraceFix {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    heading: Heading,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let outcome = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Geocode {
            map,
            lat,
            lon,
            heading,
        } => run_geocode(&map, config, lat, lon, heading),
        Commands::Trace { map, trace, all } => run_trace(&map, &trace, config, all),
        Commands::Intersection { map, lat, lon } => run_intersection(&map, config, lat, lon),
        Commands::Synth { size, output } => run_synth(size, output.as_deref()),
    });

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<GeocoderConfig, GeocodeError> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&json)?)
        }
        None => Ok(GeocoderConfig::default()),
    }
}

fn run_geocode(map: &Path, config: GeocoderConfig, lat: f64, lon: f64, heading: Option<f64>) -> Result<(), GeocodeError> {
    let repository = MapRepository::load(map)?;
    let location = GpsPoint::validated(lat, lon)?;
    let heading = match heading {
        Some(h) => Heading::try_new(h)?,
        None => Heading::UNKNOWN,
    };

    let radius = config.search_radius;
    let snapshot = repository
        .snapshot(location, radius)
        .ok_or_missing_snapshot(lat, lon)?;

    println!("\n{}", "=".repeat(60));
    println!("Geocoding {} heading {:?}", location, heading.value());
    println!(
        "Snapshot: {} roads, {} POIs, {} intersections within {:.0}m",
        snapshot.roads.len(),
        snapshot.pois.len(),
        snapshot.intersections.len(),
        radius
    );
    println!("{}", "=".repeat(60));

    let mut geocoder = ReverseGeocoder::new(config);
    let result = geocoder.reverse_geocode(location, &snapshot, heading);
    print_result(&result, &repository);

    if let ReverseGeocodeResult::Alongside(alongside) = &result {
        if let Some(intersection) = alongside
            .intersection_key
            .as_deref()
            .and_then(|key| snapshot.intersection(key))
        {
            let policy = SecondaryRoadPolicy::default();
            let context = geocoder.config().secondary_roads_context;
            println!("\n  Intersection {}:", intersection.key);
            println!("    H1 distinct main roads: {}", intersection.has_distinct_main_roads(&snapshot, &policy, context));
            println!("    H2 main with close:     {}", intersection.is_main_with_close(&snapshot, &policy, context));
            println!("    H3 on roundabout:       {}", intersection.is_main_on_roundabout(&snapshot, &policy, context));
            println!("    H4 road type change:    {}", intersection.has_road_type_change(&snapshot));
            println!("    H5 T with same road:    {}", intersection.is_t_intersection_with_same_road(&snapshot));
            println!("    Roads:");
            for direction in intersection.directions(&snapshot, heading) {
                println!(
                    "      {:<24} {:>6.1}°  {}",
                    direction.road_name, direction.bearing, direction.direction
                );
            }
        }
    }

    Ok(())
}

fn run_trace(map: &Path, trace: &Path, config: GeocoderConfig, all: bool) -> Result<(), GeocodeError> {
    let repository = MapRepository::load(map)?;
    let fixes: Vec<TraceFix> = serde_json::from_str(&fs::read_to_string(trace)?)?;

    println!("\n{}", "=".repeat(60));
    println!("Replaying {} fixes from {}", fixes.len(), trace.display());
    println!("{}", "=".repeat(60));

    let radius = config.search_radius;
    let mut geocoder = ReverseGeocoder::new(config);
    let mut last: Option<ReverseGeocodeResult> = None;
    let mut previous: Option<GpsPoint> = None;
    let mut announcements = 0usize;
    let mut missing = 0usize;

    for (i, fix) in fixes.iter().enumerate() {
        let location = GpsPoint::new(fix.latitude, fix.longitude);

        // Fall back to course over ground when the trace has no compass heading
        let heading = if fix.heading.is_valid() {
            fix.heading
        } else {
            previous
                .and_then(|p| bearing(&p, &location))
                .map(Heading::new)
                .unwrap_or(Heading::UNKNOWN)
        };
        previous = Some(location);

        let Some(snapshot) = repository.snapshot(location, radius) else {
            missing += 1;
            continue;
        };

        let result = geocoder.reverse_geocode(location, &snapshot, heading);
        let significant = last
            .as_ref()
            .is_none_or(|l| l.is_significantly_different(&result));

        if significant || all {
            print!("  #{:<5}", i);
            print_result(&result, &repository);
        }
        if significant {
            announcements += 1;
        }
        last = Some(result);
    }

    println!("\n{} announcements, {} fixes without map data", announcements, missing);
    Ok(())
}

fn run_intersection(map: &Path, config: GeocoderConfig, lat: f64, lon: f64) -> Result<(), GeocodeError> {
    let repository = MapRepository::load(map)?;
    let location = GpsPoint::validated(lat, lon)?;
    let snapshot = repository
        .snapshot(location, config.search_radius)
        .ok_or_missing_snapshot(lat, lon)?;

    match closest_intersection(&location, &snapshot) {
        Some(intersection) => println!(
            "{} \"{}\" at {} ({} roads)",
            intersection.key,
            intersection.localized_name(&repository),
            intersection.coordinate,
            intersection.road_keys.len()
        ),
        None => println!("No roads near {}", location),
    }
    Ok(())
}

fn run_synth(size: usize, output: Option<&Path>) -> Result<(), GeocodeError> {
    let map = SyntheticGrid::with_size(size).generate();
    println!(
        "Generated {} road segments, {} buildings, {} intersections",
        map.metadata.road_segments, map.metadata.buildings, map.metadata.intersections
    );

    let json = serde_json::to_string_pretty(&map.to_snapshot())?;
    match output {
        Some(path) => {
            fs::write(path, json)?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn print_result(result: &ReverseGeocodeResult, repository: &MapRepository) {
    let road_name = |key: Option<&str>| {
        key.and_then(|k| repository.road(k))
            .map(|r| r.localized_name.clone())
            .unwrap_or_else(|| "-".to_string())
    };

    match result {
        ReverseGeocodeResult::Inside(r) => {
            let name = repository
                .poi(&r.poi_key)
                .map(|p| p.localized_name.as_str())
                .unwrap_or("-");
            println!(" inside     {} ({}){}", name, r.poi_key, if r.was_destination { " [destination]" } else { "" });
        }
        ReverseGeocodeResult::Alongside(r) => {
            let intersection = r
                .intersection_key
                .as_deref()
                .and_then(|k| repository.intersections().iter().find(|i| i.key == k))
                .map(|i| i.localized_name_excluding(repository, Some(r.road_name.as_str())))
                .unwrap_or_else(|| "-".to_string());
            println!(
                " alongside  {} ({}) snapped to {}, next intersection: {}",
                r.road_name, r.road_key, r.road_snap_point, intersection
            );
            if r.closest_road_key != r.road_key {
                println!("             nearest road is {} (sticky)", road_name(Some(r.closest_road_key.as_str())));
            }
        }
        ReverseGeocodeResult::Generic(r) => {
            let poi = r
                .poi_key
                .as_deref()
                .and_then(|k| repository.poi(k))
                .map(|p| p.localized_name.as_str())
                .unwrap_or("-");
            println!(" generic    near road {}, place {}", road_name(r.road_key.as_deref()), poi);
        }
    }
}
