//! Isocontour extraction on a uniform grid.
//!
//! Each cell is resolved on its own: its four edges are tested for a strict
//! sign change of `value - iso`, crossings are placed by linear interpolation
//! and a segment is emitted only when exactly two edges cross. Cells with one,
//! three or four crossings (corners exactly at the isovalue, saddles) emit
//! nothing and are only counted in [`ExtractionStats`].

use rayon::prelude::*;
use serde::Serialize;

use crate::geom::Point2;
use crate::grid::ScalarGrid;
use crate::mesh::ContourMesh;

/// Corner offsets of cell `(i, j)` in cyclic order.
pub const CELL_CORNERS: [(usize, usize); 4] = [(0, 0), (1, 0), (1, 1), (0, 1)];

/// Edges as pairs of corner slots, in test order.
pub const CELL_EDGES: [(usize, usize); 4] = [(0, 1), (1, 2), (2, 3), (3, 0)];

/// True when `iso` lies strictly between `v1` and `v2`.
///
/// Endpoints exactly at `iso` never count, so flat edges at the isovalue and
/// crossings through a grid point are dropped.
#[inline]
pub fn crosses(v1: f64, v2: f64, iso: f64) -> bool {
    (v1 - iso) * (v2 - iso) < 0.0
}

/// Point on `p1`-`p2` where the linear interpolant of `v1`, `v2` equals `iso`.
///
/// Only meaningful when [`crosses`] holds, which guarantees `v1 != v2`.
#[inline]
pub fn interpolate_edge(p1: Point2, p2: Point2, v1: f64, v2: f64, iso: f64) -> Point2 {
    let t = (iso - v1) / (v2 - v1);
    p1.lerp(p2, t)
}

/// Edge crossings found in one cell, in edge order.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellCrossings {
    points: [Point2; 4],
    len: usize,
}

impl CellCrossings {
    fn push(&mut self, p: Point2) {
        self.points[self.len] = p;
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[Point2] {
        &self.points[..self.len]
    }

    /// The cell's segment; `None` unless exactly two edges cross.
    pub fn segment(&self) -> Option<(Point2, Point2)> {
        (self.len == 2).then(|| (self.points[0], self.points[1]))
    }
}

/// Test the four edges of cell `(i, j)`, whose lower-left corner is grid point `(i, j)`.
pub fn cell_crossings(grid: &ScalarGrid, i: usize, j: usize, iso: f64) -> CellCrossings {
    let mut pos = [Point2::default(); 4];
    let mut val = [0.0; 4];
    for (k, &(di, dj)) in CELL_CORNERS.iter().enumerate() {
        pos[k] = grid.position(i + di, j + dj);
        val[k] = grid.value(i + di, j + dj);
    }

    let mut out = CellCrossings::default();
    for &(a, b) in &CELL_EDGES {
        if crosses(val[a], val[b], iso) {
            out.push(interpolate_edge(pos[a], pos[b], val[a], val[b], iso));
        }
    }
    out
}

/// Per-run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    pub cells: usize,
    pub segments: usize,
    /// Cells with one or three crossings.
    pub odd_cells: usize,
    /// Cells with four crossings.
    pub saddle_cells: usize,
}

impl ExtractionStats {
    fn record(&mut self, crossings: usize) {
        self.cells += 1;
        match crossings {
            2 => self.segments += 1,
            1 | 3 => self.odd_cells += 1,
            4 => self.saddle_cells += 1,
            _ => {}
        }
    }

    fn merge(&mut self, other: &Self) {
        self.cells += other.cells;
        self.segments += other.segments;
        self.odd_cells += other.odd_cells;
        self.saddle_cells += other.saddle_cells;
    }
}

/// Walk the cells of column `i` bottom to top.
fn march_column<F>(grid: &ScalarGrid, i: usize, iso: f64, stats: &mut ExtractionStats, mut emit: F)
where
    F: FnMut(Point2, Point2),
{
    for j in 0..grid.ny().saturating_sub(1) {
        let crossings = cell_crossings(grid, i, j, iso);
        stats.record(crossings.len());
        if let Some((a, b)) = crossings.segment() {
            emit(a, b);
        }
    }
}

/// Extract the isocontour at `iso`, visiting columns of cells left to right
/// and each column bottom to top.
pub fn march_squares(grid: &ScalarGrid, iso: f64) -> (ContourMesh, ExtractionStats) {
    let mut mesh = ContourMesh::new(iso);
    let mut stats = ExtractionStats::default();
    for i in 0..grid.nx().saturating_sub(1) {
        march_column(grid, i, iso, &mut stats, |a, b| mesh.push_segment(a, b));
    }
    (mesh, stats)
}

/// Same output as [`march_squares`], with columns processed in parallel and
/// concatenated in column order.
pub fn march_squares_par(grid: &ScalarGrid, iso: f64) -> (ContourMesh, ExtractionStats) {
    let columns: Vec<(Vec<(Point2, Point2)>, ExtractionStats)> = (0..grid.nx().saturating_sub(1))
        .into_par_iter()
        .map(|i| {
            let mut segments = Vec::new();
            let mut stats = ExtractionStats::default();
            march_column(grid, i, iso, &mut stats, |a, b| segments.push((a, b)));
            (segments, stats)
        })
        .collect();

    let mut mesh = ContourMesh::new(iso);
    let mut stats = ExtractionStats::default();
    for (segments, column_stats) in columns {
        for (a, b) in segments {
            mesh.push_segment(a, b);
        }
        stats.merge(&column_stats);
    }
    (mesh, stats)
}
