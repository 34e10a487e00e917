use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use isocontour::config::Params;
use isocontour::io::{GridReader, JsonGridReader, JsonMeshWriter, MeshWriter};
use isocontour::render;

/// Extract an isocontour from a 2D scalar grid and write it as line geometry.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Isovalue for contour extraction
    #[arg(long)]
    isovalue: f64,

    /// Input grid (JSON: dimensions, spacing, origin, values)
    #[arg(short, long, default_value = "Data/Isabel_2D.json")]
    input: PathBuf,

    /// Output mesh (JSON: points, lines)
    #[arg(short, long, default_value = "isocontour.json")]
    output: PathBuf,

    /// JSON file with extraction parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extract cell columns in parallel
    #[arg(long)]
    parallel: bool,

    /// Also save a PNG preview of the field with the contour drawn on it
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Exit with an error when no segment is produced
    #[arg(long)]
    fail_on_empty: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut params = match &args.config {
        Some(path) => Params::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Params::default(),
    };
    if args.parallel {
        params.parallel = true;
    }

    let grid = JsonGridReader::open(&args.input)
        .and_then(|mut reader| reader.read_grid())
        .with_context(|| format!("failed to read grid {}", args.input.display()))?;
    let [nx, ny] = grid.dimensions();
    let (min_v, max_v) = grid.value_range();
    info!(
        "Loaded {}x{} grid from {} (values in [{}, {}])",
        nx,
        ny,
        args.input.display(),
        min_v,
        max_v
    );

    let (extraction, timings) = isocontour::extract(&grid, args.isovalue, &params)?;

    info!("Timings:");
    for t in &timings {
        info!("  {:10} {:8.2} ms", t.name, t.ms);
    }
    let stats = &extraction.stats;
    info!(
        "{} cells, {} segments, {} polylines ({} closed)",
        stats.cells,
        stats.segments,
        extraction.polylines.len(),
        extraction.polylines.iter().filter(|p| p.closed).count()
    );
    if stats.saddle_cells > 0 {
        warn!("{} saddle cells left unresolved", stats.saddle_cells);
    }

    JsonMeshWriter::create(&args.output)
        .and_then(|mut writer| writer.write_mesh(&extraction.mesh))
        .with_context(|| format!("failed to write mesh {}", args.output.display()))?;
    info!("{} saved", args.output.display());

    if let Some(path) = &args.preview {
        render::render_preview(&grid, &extraction.mesh, &params)
            .and_then(|img| img.save_png(path))
            .with_context(|| format!("failed to save preview {}", path.display()))?;
        info!("Saved {}", path.display());
    }

    if let Some(empty) = extraction.empty_result() {
        if args.fail_on_empty {
            return Err(empty.into());
        }
        warn!("{empty}");
    }

    Ok(())
}
