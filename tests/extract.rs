use std::fs;
use std::path::PathBuf;

use isocontour::config::Params;
use isocontour::contour::{interpolate_edge, march_squares};
use isocontour::geom::Point2;
use isocontour::grid::ScalarGrid;
use isocontour::io::{GridDocument, GridReader, JsonGridReader, JsonMeshWriter, MeshWriter};
use isocontour::mesh::ContourMesh;

/// Distance from `center` sampled on an `n`x`n` grid.
fn radial(n: usize, spacing: f64, origin: [f64; 2], center: Point2) -> ScalarGrid {
    let mut values = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let p = Point2::new(
                origin[0] + x as f64 * spacing,
                origin[1] + y as f64 * spacing,
            );
            values.push(p.distance(center));
        }
    }
    ScalarGrid::new([n, n], [spacing, spacing], origin, values).unwrap()
}

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("isocontour-{}-{}", std::process::id(), name))
}

#[test_log::test]
fn single_cell_scenarios() {
    // Cyclic corner order (0,0), (1,0), (1,1), (0,1); flat order is row-major.
    let crossing = ScalarGrid::new([2, 2], [1.0, 1.0], [0.0, 0.0], vec![0.0, 10.0, 0.0, 10.0])
        .unwrap();
    let (mesh, _) = march_squares(&crossing, 5.0);
    assert_eq!(mesh.points, vec![Point2::new(0.5, 0.0), Point2::new(0.5, 1.0)]);
    assert_eq!(mesh.lines, vec![[0, 1]]);

    let saddle = ScalarGrid::new([2, 2], [1.0, 1.0], [0.0, 0.0], vec![0.0, 10.0, 10.0, 0.0])
        .unwrap();
    let (mesh, stats) = march_squares(&saddle, 5.0);
    assert!(mesh.is_empty());
    assert_eq!(stats.saddle_cells, 1);
}

#[test_log::test]
fn midpoint_interpolation() {
    let p = interpolate_edge(Point2::new(3.0, 1.0), Point2::new(3.0, 2.0), 0.0, 10.0, 5.0);
    assert_eq!(p, Point2::new(3.0, 1.5));
}

#[test_log::test]
fn out_of_range_isovalue_yields_empty_mesh() {
    let grid = radial(5, 1.0, [0.0, 0.0], Point2::new(2.0, 2.0));
    let (lo, hi) = grid.value_range();
    for iso in [lo - 1.0, hi + 1.0] {
        let (ex, _) = isocontour::extract(&grid, iso, &Params::default()).unwrap();
        assert!(ex.mesh.points.is_empty());
        assert!(ex.mesh.lines.is_empty());
        assert!(ex.empty_result().unwrap().out_of_range());
    }
}

#[test_log::test]
fn extraction_is_deterministic() {
    let grid = radial(23, 0.5, [-5.0, -5.0], Point2::new(0.3, -0.7));
    let params = Params::default();
    let (first, _) = isocontour::extract(&grid, 2.2, &params).unwrap();
    let (second, _) = isocontour::extract(&grid, 2.2, &params).unwrap();
    assert_eq!(first.mesh, second.mesh);
    assert_eq!(first.polylines, second.polylines);

    let parallel = Params {
        parallel: true,
        ..Params::default()
    };
    let (third, _) = isocontour::extract(&grid, 2.2, &parallel).unwrap();
    assert_eq!(first.mesh, third.mesh);
    assert_eq!(first.stats, third.stats);
}

#[test_log::test]
fn radial_midpoint_contour_is_closed_loop() {
    let center = Point2::new(1.0, 1.0);
    let grid = radial(3, 1.0, [0.0, 0.0], center);
    let (lo, hi) = grid.value_range();
    let iso = (lo + hi) / 2.0;

    let (ex, _) = isocontour::extract(&grid, iso, &Params::default()).unwrap();
    assert_eq!(ex.mesh.segment_count(), 4);
    assert_eq!(ex.polylines.len(), 1);
    let ring = &ex.polylines[0];
    assert!(ring.closed);
    assert_eq!(ring.len(), 4);
    // Crossings lie on grid lines through the center, where the field is exact.
    for p in &ring.points {
        assert!((p.distance(center) - iso).abs() < 1e-12);
    }
}

#[test_log::test]
fn fine_radial_contour_approximates_circle() {
    let center = Point2::new(0.0, 0.0);
    let grid = radial(41, 0.25, [-5.0, -5.0], center);
    let r = 3.1;

    let (ex, _) = isocontour::extract(&grid, r, &Params::default()).unwrap();
    assert_eq!(ex.stats.saddle_cells, 0);
    assert_eq!(ex.stats.odd_cells, 0);
    assert_eq!(ex.polylines.len(), 1);
    let ring = &ex.polylines[0];
    assert!(ring.closed);
    assert_eq!(ring.len(), ex.mesh.segment_count());
    for p in &ring.points {
        assert!((p.distance(center) - r).abs() < 0.01);
    }
}

#[test_log::test]
fn file_round_trip_through_reader_and_writer() {
    let grid = radial(9, 0.5, [1.0, 2.0], Point2::new(3.0, 4.0));
    let grid_path = scratch_path("grid.json");
    let mesh_path = scratch_path("mesh.json");
    fs::write(&grid_path, serde_json::to_string(&GridDocument::from(&grid)).unwrap()).unwrap();

    let loaded = JsonGridReader::open(&grid_path).unwrap().read_grid().unwrap();
    assert_eq!(loaded, grid);

    let (ex, _) = isocontour::extract(&loaded, 1.2, &Params::default()).unwrap();
    assert!(!ex.mesh.is_empty());
    JsonMeshWriter::create(&mesh_path)
        .unwrap()
        .write_mesh(&ex.mesh)
        .unwrap();

    let written: ContourMesh = serde_json::from_str(&fs::read_to_string(&mesh_path).unwrap()).unwrap();
    assert_eq!(written, ex.mesh);

    let _ = fs::remove_file(grid_path);
    let _ = fs::remove_file(mesh_path);
}
