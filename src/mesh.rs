use serde::{Deserialize, Serialize};

use crate::geom::Point2;

/// Line geometry produced by extraction: a point list plus index pairs into it.
///
/// Every segment owns two fresh points, so `points.len() == 2 * lines.len()`
/// and `lines[k] == [2k, 2k + 1]` for meshes built by the extractor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContourMesh {
    pub isovalue: f64,
    pub points: Vec<Point2>,
    pub lines: Vec<[usize; 2]>,
}

impl ContourMesh {
    pub fn new(isovalue: f64) -> Self {
        Self {
            isovalue,
            points: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Append a segment with two new sequential point ids.
    pub fn push_segment(&mut self, a: Point2, b: Point2) {
        let id = self.points.len();
        self.points.push(a);
        self.points.push(b);
        self.lines.push([id, id + 1]);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn segment_count(&self) -> usize {
        self.lines.len()
    }

    /// Iterate segments as endpoint pairs.
    pub fn segments(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
        self.lines
            .iter()
            .map(|&[a, b]| (self.points[a], self.points[b]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_get_sequential_ids() {
        let mut mesh = ContourMesh::new(1.5);
        mesh.push_segment(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0));
        mesh.push_segment(Point2::new(1.0, 0.0), Point2::new(1.0, 1.0));

        assert_eq!(mesh.points.len(), 4);
        assert_eq!(mesh.lines, vec![[0, 1], [2, 3]]);
        let segs: Vec<_> = mesh.segments().collect();
        assert_eq!(segs[1], (Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)));
    }
}
