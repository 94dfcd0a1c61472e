use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;

use aoikit::api::search_place;
use aoikit::config::{EditorConfig, FileConfig};
use aoikit::geojson::{self, FeatureCollection, GeoJson};
use aoikit::geometry::{Extent, GeometryEngine, area_sq_km, project_geometry};
use aoikit::session::{AoiSession, is_selection_acceptable};

/// Inspect, measure and buffer Area of Interest GeoJSON
///
/// Examples:
///   # Check whether a drawn AOI can be exported
///   aoikit validate aoi.geojson
///
///   # Grow a set of points into one polygon, 500 m around each
///   aoikit buffer sites.geojson -d 500 -o sites-buffered.geojson
///
///   # Look up a place outline
///   aoikit search "Boulder, Colorado" -o boulder.geojson
#[derive(Parser, Debug)]
#[command(name = "aoikit")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches aoikit.toml if not provided)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report polygon validity and whether the selection is acceptable
    Validate {
        /// GeoJSON file (FeatureCollection, Feature or bare geometry)
        file: PathBuf,
    },
    /// Ellipsoidal area of every feature in km²
    Area { file: PathBuf },
    /// Buffer every feature and union the result into one shape
    Buffer {
        file: PathBuf,

        /// Buffer distance in meters
        #[arg(short = 'd', long)]
        distance: f64,

        /// Output file (defaults to stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// Geographic bounding box [minLon, minLat, maxLon, maxLat]
    Bbox { file: PathBuf },
    /// Find a place by name and print it as a GeoJSON feature
    Search {
        query: String,

        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let file_config = match args.config {
        Some(ref path) => {
            if !path.exists() {
                bail!("Config file not found: {:?}", path);
            }
            Some(FileConfig::from_path(path)?)
        }
        None => FileConfig::load(),
    };

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = EditorConfig::from(file_config.unwrap_or_default());

    match args.command {
        Command::Validate { file } => validate(&file, &config),
        Command::Area { file } => area(&file),
        Command::Buffer {
            file,
            distance,
            output,
        } => buffer(&file, distance, output.as_deref(), &config),
        Command::Bbox { file } => bbox(&file),
        Command::Search { query, output } => search(&query, output.as_deref(), &config),
    }
}

fn read_collection(path: &Path) -> Result<FeatureCollection> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let parsed: GeoJson = contents
        .parse()
        .with_context(|| format!("Failed to parse GeoJSON in {}", path.display()))?;
    Ok(parsed.into_feature_collection())
}

fn write_json<T: serde::Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize GeoJSON")?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn validate(path: &Path, config: &EditorConfig) -> Result<()> {
    let collection = read_collection(path)?;
    let engine = GeometryEngine::new();

    let valid = engine.all_valid(&collection);
    let acceptable = is_selection_acceptable(&collection, config.max_aoi_sq_km);

    println!("{}", file_name(path));
    println!("  Features: {}", collection.features.len());
    if let Some(kind) = collection.dominant_kind() {
        println!("  Geometry: {}", kind);
    }
    println!("  Valid polygon(s): {}", if valid { "yes" } else { "no" });
    println!("  Acceptable AOI: {}", if acceptable { "yes" } else { "no" });
    if let Some(max) = config.max_aoi_sq_km {
        println!("  Area limit: {:.1} km²", max);
    }

    if !acceptable {
        bail!("{} is not an acceptable area of interest", path.display());
    }
    Ok(())
}

fn area(path: &Path) -> Result<()> {
    let collection = read_collection(path)?;
    let mut total = 0.0;

    for (i, geometry) in collection.geometries().enumerate() {
        let geometry = geojson::to_geo(geometry)
            .with_context(|| format!("Feature {} has unreadable geometry", i))?;
        let sq_km = area_sq_km(&geometry);
        total += sq_km;
        println!("  Feature {}: {:.3} km²", i, sq_km);
    }
    println!("Total: {:.3} km²", total);
    Ok(())
}

fn buffer(path: &Path, distance: f64, output: Option<&Path>, config: &EditorConfig) -> Result<()> {
    let start = Instant::now();
    let collection = read_collection(path)?;

    let mut session = AoiSession::new(GeometryEngine::new())
        .with_limits(config.max_buffer_m, config.max_aoi_sq_km);
    session.set_from_import(collection, &file_name(path));

    let spinner = create_spinner(&format!("Buffering by {}m...", distance));
    let buffered = session.apply_buffer(distance).map(Clone::clone);
    spinner.finish_and_clear();
    let buffered = buffered.context("Buffer failed")?;

    log::info!("buffered in {:.2?}", start.elapsed());
    if !session.next_enabled() {
        log::warn!("buffered selection is not an acceptable AOI");
    }
    write_json(&buffered, output)
}

fn bbox(path: &Path) -> Result<()> {
    let collection = read_collection(path)?;
    let mut extent: Option<Extent> = None;

    for geometry in collection.geometries() {
        let projected = project_geometry(&geojson::to_geo(geometry)?);
        if let Some(e) = Extent::of_geometry(&projected) {
            match extent.as_mut() {
                Some(acc) => acc.extend(&e),
                None => extent = Some(e),
            }
        }
    }

    let Some(extent) = extent else {
        bail!("{} has no coordinates", path.display());
    };
    let [min_lon, min_lat, max_lon, max_lat] = extent.serialize();
    println!("[{}, {}, {}, {}]", min_lon, min_lat, max_lon, max_lat);
    Ok(())
}

fn search(query: &str, output: Option<&Path>, config: &EditorConfig) -> Result<()> {
    let spinner = create_spinner(&format!("Searching for {}...", query));
    let result = search_place(query, &config.nominatim);
    let result = match result {
        Ok(r) => {
            spinner.finish_with_message(format!("Found {}", r.name));
            r
        }
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e);
        }
    };

    let description = result.description();
    if !description.is_empty() {
        eprintln!("  {}", description);
    }
    write_json(&result.feature, output)
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
