//! Join contour segments into polylines.
//!
//! Neighbouring cells compute the crossing on their shared edge from opposite
//! ends, so matching endpoints agree only up to rounding. Endpoints are
//! bucketed on a `tolerance`-sized lattice and matched by distance.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use crate::geom::Point2;
use crate::mesh::ContourMesh;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polyline {
    pub points: Vec<Point2>,
    /// First and last point are joined; the closing point is not repeated.
    pub closed: bool,
}

impl Polyline {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

type Key = (i64, i64);

struct EndpointIndex<'a> {
    segments: &'a [(Point2, Point2)],
    buckets: HashMap<Key, Vec<usize>>,
    cell: f64,
    tolerance: f64,
}

impl<'a> EndpointIndex<'a> {
    fn new(segments: &'a [(Point2, Point2)], tolerance: f64) -> Self {
        // Buckets no finer than a few ulps of the largest coordinate keep
        // every key well inside i64, whatever the tolerance.
        let coord_scale = segments
            .iter()
            .flat_map(|&(a, b)| [a.x, a.y, b.x, b.y])
            .fold(1.0_f64, |m, c| m.max(c.abs()));
        let cell = tolerance.max(coord_scale * f64::EPSILON * 4.0);
        let mut buckets: HashMap<Key, Vec<usize>> = HashMap::new();
        for (k, &(a, b)) in segments.iter().enumerate() {
            buckets.entry(key(a, cell)).or_default().push(k);
            let kb = key(b, cell);
            if kb != key(a, cell) {
                buckets.entry(kb).or_default().push(k);
            }
        }
        Self {
            segments,
            buckets,
            cell,
            tolerance,
        }
    }

    /// Lowest-index unused segment with an endpoint within tolerance of `p`,
    /// returned with its opposite endpoint.
    fn take_touching(&self, p: Point2, used: &mut [bool]) -> Option<Point2> {
        let (kx, ky) = key(p, self.cell);
        let mut best: Option<(usize, Point2)> = None;
        for dx in -1..=1_i64 {
            for dy in -1..=1_i64 {
                let (Some(nx), Some(ny)) = (kx.checked_add(dx), ky.checked_add(dy)) else {
                    continue;
                };
                let Some(bucket) = self.buckets.get(&(nx, ny)) else {
                    continue;
                };
                for &k in bucket {
                    if used[k] || best.is_some_and(|(b, _)| b <= k) {
                        continue;
                    }
                    let (a, b) = self.segments[k];
                    if a.distance(p) <= self.tolerance {
                        best = Some((k, b));
                    } else if b.distance(p) <= self.tolerance {
                        best = Some((k, a));
                    }
                }
            }
        }
        let (k, other) = best?;
        used[k] = true;
        Some(other)
    }
}

#[inline]
fn key(p: Point2, cell: f64) -> Key {
    ((p.x / cell).floor() as i64, (p.y / cell).floor() as i64)
}

/// Stitch the mesh's segments into polylines.
///
/// Polylines are started from segments in mesh order and grown at both ends,
/// so the result is deterministic for a given mesh.
pub fn connect_segments(mesh: &ContourMesh, tolerance: f64) -> Vec<Polyline> {
    let segments: Vec<(Point2, Point2)> = mesh.segments().collect();
    let index = EndpointIndex::new(&segments, tolerance);
    let mut used = vec![false; segments.len()];
    let mut out = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let (a, b) = segments[start];
        let mut points = VecDeque::from([a, b]);

        while let Some(&tail) = points.back() {
            match index.take_touching(tail, &mut used) {
                Some(next) => points.push_back(next),
                None => break,
            }
        }
        while let Some(&head) = points.front() {
            match index.take_touching(head, &mut used) {
                Some(prev) => points.push_front(prev),
                None => break,
            }
        }

        let mut points: Vec<Point2> = points.into();
        let closed = points.len() > 2
            && points[0].distance(points[points.len() - 1]) <= tolerance;
        if closed {
            points.pop();
        }
        out.push(Polyline { points, closed });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh_of(segments: &[((f64, f64), (f64, f64))]) -> ContourMesh {
        let mut mesh = ContourMesh::new(0.0);
        for &((ax, ay), (bx, by)) in segments {
            mesh.push_segment(Point2::new(ax, ay), Point2::new(bx, by));
        }
        mesh
    }

    #[test]
    fn joins_chain_in_both_directions() {
        // Middle segment first so both ends have to grow.
        let mesh = mesh_of(&[
            ((1.0, 0.0), (2.0, 0.0)),
            ((2.0, 0.0), (3.0, 1.0)),
            ((0.0, 0.0), (1.0, 0.0)),
        ]);
        let lines = connect_segments(&mesh, 1e-9);
        assert_eq!(lines.len(), 1);
        assert!(!lines[0].closed);
        assert_eq!(
            lines[0].points,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(3.0, 1.0),
            ]
        );
    }

    #[test]
    fn closes_loop_within_tolerance() {
        let eps = 1e-13;
        let mesh = mesh_of(&[
            ((0.0, 0.0), (1.0, 0.0)),
            ((1.0, 1.0), (1.0 + eps, 0.0)),
            ((0.0, 1.0), (1.0, 1.0 - eps)),
            ((0.0, 1.0), (0.0, eps)),
        ]);
        let lines = connect_segments(&mesh, 1e-9);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].closed);
        assert_eq!(lines[0].len(), 4);
    }

    #[test]
    fn disjoint_segments_stay_apart() {
        let mesh = mesh_of(&[((0.0, 0.0), (1.0, 0.0)), ((5.0, 5.0), (6.0, 5.0))]);
        let lines = connect_segments(&mesh, 1e-6);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.len() == 2 && !l.closed));
    }

    #[test]
    fn zero_tolerance_joins_exact_matches() {
        let mesh = mesh_of(&[((0.0, 0.0), (1.0, 0.0)), ((1.0, 0.0), (1.0, 1.0))]);
        let lines = connect_segments(&mesh, 0.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 3);
    }

    #[test]
    fn far_from_origin_coordinates() {
        let mesh = mesh_of(&[
            ((1e13, 5.0), (1e13 + 1.0, 5.0)),
            ((1e13 + 1.0, 5.0), (1e13 + 1.0, 6.0)),
        ]);
        let lines = connect_segments(&mesh, 1e-6);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 3);

        let mesh = mesh_of(&[
            ((0.0, 0.0), (1.0, 0.0)),
            ((-3e300, 0.0), (-3e300, 1.0)),
        ]);
        let lines = connect_segments(&mesh, 0.0);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn empty_mesh_has_no_polylines() {
        assert!(connect_segments(&ContourMesh::new(1.0), 1e-6).is_empty());
    }
}
