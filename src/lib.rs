pub mod config;
pub mod contour;
pub mod error;
pub mod geom;
pub mod grid;
pub mod io;
pub mod mesh;
pub mod render;
pub mod stitch;

use std::time::Instant;

use log::{debug, info};

use config::Params;
use contour::ExtractionStats;
use error::{EmptyResultError, Error};
use grid::ScalarGrid;
use mesh::ContourMesh;
use stitch::Polyline;

pub use error::InvalidGridError;

/// Result of one extraction run.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub mesh: ContourMesh,
    pub polylines: Vec<Polyline>,
    pub stats: ExtractionStats,
    /// Data range of the input grid, kept for the empty-result notice.
    pub value_range: (f64, f64),
}

impl Extraction {
    /// Set when no segment was produced. Informational, not a failure.
    pub fn empty_result(&self) -> Option<EmptyResultError> {
        self.mesh.is_empty().then(|| EmptyResultError {
            isovalue: self.mesh.isovalue,
            min: self.value_range.0,
            max: self.value_range.1,
        })
    }
}

#[derive(Debug)]
pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// Extract the isocontour of `grid` at `isovalue` and stitch it into polylines.
pub fn extract(
    grid: &ScalarGrid,
    isovalue: f64,
    params: &Params,
) -> Result<(Extraction, Vec<Timing>), Error> {
    if !isovalue.is_finite() {
        return Err(Error::InvalidIsovalue(isovalue));
    }
    if !params.stitch_tolerance.is_finite() || params.stitch_tolerance < 0.0 {
        return Err(Error::InvalidStitchTolerance(params.stitch_tolerance));
    }

    let mut timings = Vec::new();
    let total_start = Instant::now();

    // 1. March cells
    let t = Instant::now();
    let (mesh, stats) = if params.parallel {
        contour::march_squares_par(grid, isovalue)
    } else {
        contour::march_squares(grid, isovalue)
    };
    timings.push(Timing {
        name: "march",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });
    if stats.saddle_cells + stats.odd_cells > 0 {
        debug!(
            "dropped {} saddle cells and {} cells with an odd crossing count",
            stats.saddle_cells, stats.odd_cells
        );
    }

    // 2. Stitch segments into polylines
    let t = Instant::now();
    let [dx, dy] = grid.spacing();
    let tolerance = params.stitch_tolerance * dx.abs().max(dy.abs());
    let polylines = stitch::connect_segments(&mesh, tolerance);
    timings.push(Timing {
        name: "stitch",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
    timings.push(Timing {
        name: "TOTAL",
        ms: total_ms,
    });
    for t in &timings {
        debug!("{:8} {:8.2} ms", t.name, t.ms);
    }

    let extraction = Extraction {
        mesh,
        polylines,
        stats,
        value_range: grid.value_range(),
    };
    if let Some(empty) = extraction.empty_result() {
        info!("{empty}");
    }

    Ok((extraction, timings))
}
