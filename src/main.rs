//! layerscrub CLI - inspect slicer G-code layer by layer

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use layerscrub::{
    init_logging, AlignmentOffset, BoundingVolume, Config, LoadOutcome, MemoryScene, ObjectId,
    Point3, PreviewSession, SceneStats, ToolpathParser, UpdateSummary, BUILD_DATE, VERSION,
};

#[derive(Parser)]
#[command(name = "layerscrub")]
#[command(about = "Layer-by-layer preview of slicer G-code", long_about = None)]
struct Cli {
    /// Configuration file (.toml or .json); defaults to the per-user config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a per-layer summary of a G-code file
    Layers {
        /// G-code file produced by a slicer
        file: PathBuf,
    },
    /// Display one scrub position into an in-memory scene and report it as JSON
    Preview {
        /// G-code file produced by a slicer
        file: PathBuf,
        /// Layer index, starting at 0
        #[arg(short, long, default_value_t = 0)]
        layer: usize,
        /// Fraction of the layer's extrusion to show, 0.0 to 1.0
        #[arg(short, long, default_value_t = 1.0)]
        progress: f64,
        /// Source model minimum corner as X,Y,Z
        #[arg(long, value_parser = parse_point, requires = "source_max")]
        source_min: Option<Point3>,
        /// Source model maximum corner as X,Y,Z
        #[arg(long, value_parser = parse_point, requires = "source_min")]
        source_max: Option<Point3>,
    },
}

#[derive(Serialize)]
struct PreviewReport {
    file: PathBuf,
    layers: usize,
    bounds: BoundingVolume,
    alignment: AlignmentOffset,
    label: Option<String>,
    update: Option<UpdateSummary>,
    scene: SceneStats,
    scene_objects: usize,
}

fn parse_point(value: &str) -> std::result::Result<Point3, String> {
    let coords = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid coordinate in '{}': {}", value, e))?;
    match coords.as_slice() {
        [x, y, z] => Ok(Point3::new(*x, *y, *z)),
        _ => Err(format!("expected X,Y,Z, got '{}'", value)),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => match Config::default_path() {
            Ok(path) => Config::load_or_default(&path)
                .with_context(|| format!("Failed to load config {}", path.display())),
            Err(err) => {
                debug!("No default config location ({}), using defaults", err);
                Ok(Config::default())
            }
        },
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;
    debug!("layerscrub {} (built {})", VERSION, BUILD_DATE);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Layers { file } => show_layers(&config, &file),
        Commands::Preview {
            file,
            layer,
            progress,
            source_min,
            source_max,
        } => {
            let source = source_min
                .zip(source_max)
                .map(|(min, max)| BoundingVolume::from_corners(min, max));
            preview(&config, &file, layer, progress, source)
        }
    }
}

fn show_layers(config: &Config, file: &Path) -> Result<()> {
    let parsed = ToolpathParser::new(config.parser).parse_file(file)?;
    if parsed.is_empty() {
        println!("{}: no layers", file.display());
        return Ok(());
    }

    println!("{:>6}  {:>9}  {:>6}  {:>12}", "layer", "z (mm)", "paths", "length (mm)");
    for (index, layer) in parsed.layers.iter().enumerate() {
        println!(
            "{:>6}  {:>9.3}  {:>6}  {:>12.2}",
            index,
            layer.z(),
            layer.path_count(),
            layer.total_length()
        );
    }

    if parsed.bounds.is_valid() {
        println!(
            "extrusion bounds: min {} max {}",
            parsed.bounds.min, parsed.bounds.max
        );
    } else {
        println!("extrusion bounds: none");
    }
    println!(
        "{} layers, {} paths, {:.2}mm total, {} malformed line(s) skipped",
        parsed.layers.len(),
        parsed.path_count(),
        parsed.total_length(),
        parsed.stats.malformed_lines
    );
    Ok(())
}

fn preview(
    config: &Config,
    file: &Path,
    layer: usize,
    progress: f64,
    source: Option<BoundingVolume>,
) -> Result<()> {
    let parsed = ToolpathParser::new(config.parser).parse_file(file)?;
    let bounds = parsed.bounds;

    let mut scene = MemoryScene::new();
    let mut session = PreviewSession::<ObjectId>::new(&config.display);

    let update = match session.load(&mut scene, parsed, source.as_ref())? {
        LoadOutcome::Empty => None,
        LoadOutcome::Loaded { layers, .. } => {
            if layer >= layers {
                return Err(anyhow!(
                    "Layer {} does not exist, {} has {} layer(s)",
                    layer,
                    file.display(),
                    layers
                ));
            }
            Some(session.scrub(&mut scene, layer, progress)?)
        }
    };
    if let Some(label) = session.layer_label(layer) {
        info!("{}", label);
    }

    let report = PreviewReport {
        file: file.to_path_buf(),
        layers: session.layer_count(),
        bounds,
        alignment: session.alignment(),
        label: session.layer_label(layer),
        update,
        scene: scene.stats(),
        scene_objects: scene.len(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
