//! Extrusion paths and the layers that own them.

use layerscrub_core::Point3;

/// Sum of segment lengths of a polyline.
pub fn polyline_length(points: &[Point3]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// One continuous extruded bead: a polyline of at least two points.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrusionPath {
    points: Vec<Point3>,
    length: f64,
}

impl ExtrusionPath {
    /// Build a path, or `None` when fewer than two points are given.
    pub fn new(points: Vec<Point3>) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let length = polyline_length(&points);
        Some(Self { points, length })
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Euclidean length, computed once at construction.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn start(&self) -> Point3 {
        self.points[0]
    }

    pub fn end(&self) -> Point3 {
        self.points[self.points.len() - 1]
    }

    /// The leading part of the path covering `distance` millimeters.
    ///
    /// Whole segments are copied while they fit; the segment that would
    /// overflow contributes a point interpolated at the remaining distance
    /// along its direction. Distances at or beyond the path length return
    /// the full point list; a distance of zero returns only the start.
    pub fn prefix(&self, distance: f64) -> Vec<Point3> {
        let mut partial = Vec::with_capacity(self.points.len());
        partial.push(self.points[0]);
        let mut consumed = 0.0;

        for w in self.points.windows(2) {
            let (a, b) = (w[0], w[1]);
            let seg = a.distance(b);
            if consumed + seg <= distance {
                partial.push(b);
                consumed += seg;
            } else {
                let remaining = distance - consumed;
                if remaining > 0.0 {
                    let direction = (b - a) / seg;
                    partial.push(a + direction * remaining);
                }
                break;
            }
        }

        partial
    }
}

/// All extrusion at one nominal Z height.
///
/// `total_length` is kept equal to the sum of the path lengths as paths
/// are added; there is no way to mutate paths afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    z: f64,
    paths: Vec<ExtrusionPath>,
    total_length: f64,
}

impl Layer {
    pub fn new(z: f64) -> Self {
        Self {
            z,
            paths: Vec::new(),
            total_length: 0.0,
        }
    }

    /// Append a path. Inputs with fewer than two points are ignored and
    /// `false` is returned.
    pub fn add_path(&mut self, points: Vec<Point3>) -> bool {
        match ExtrusionPath::new(points) {
            Some(path) => {
                self.total_length += path.length();
                self.paths.push(path);
                true
            }
            None => false,
        }
    }

    /// Height of the first move that opened this layer.
    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn paths(&self) -> &[ExtrusionPath] {
        &self.paths
    }

    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn point_count(&self) -> usize {
        self.paths.iter().map(|p| p.points().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn test_path_requires_two_points() {
        assert!(ExtrusionPath::new(vec![]).is_none());
        assert!(ExtrusionPath::new(vec![p(0.0, 0.0, 0.0)]).is_none());
        let path = ExtrusionPath::new(vec![p(0.0, 0.0, 0.0), p(3.0, 4.0, 0.0)]).unwrap();
        assert_eq!(path.length(), 5.0);
        assert_eq!(path.start(), p(0.0, 0.0, 0.0));
        assert_eq!(path.end(), p(3.0, 4.0, 0.0));
    }

    #[test]
    fn test_layer_accumulates_length() {
        let mut layer = Layer::new(0.2);
        assert!(layer.add_path(vec![p(0.0, 0.0, 0.2), p(5.0, 0.0, 0.2), p(5.0, 5.0, 0.2)]));
        assert!(layer.add_path(vec![p(0.0, 0.0, 0.2), p(0.0, 2.0, 0.2)]));
        assert_eq!(layer.path_count(), 2);
        assert_eq!(layer.point_count(), 5);
        assert_eq!(layer.total_length(), 12.0);
    }

    #[test]
    fn test_degenerate_paths_are_noops() {
        let mut layer = Layer::new(0.4);
        assert!(!layer.add_path(vec![]));
        assert!(!layer.add_path(vec![p(1.0, 1.0, 0.4)]));
        assert!(layer.is_empty());
        assert_eq!(layer.total_length(), 0.0);
    }

    #[test]
    fn test_prefix_interpolates_inside_segment() {
        let path =
            ExtrusionPath::new(vec![p(0.0, 0.0, 0.0), p(10.0, 0.0, 0.0), p(10.0, 10.0, 0.0)])
                .unwrap();
        assert_eq!(path.prefix(4.0), vec![p(0.0, 0.0, 0.0), p(4.0, 0.0, 0.0)]);
        assert_eq!(
            path.prefix(12.5),
            vec![p(0.0, 0.0, 0.0), p(10.0, 0.0, 0.0), p(10.0, 2.5, 0.0)]
        );
    }

    #[test]
    fn test_prefix_on_vertex_and_past_end() {
        let path =
            ExtrusionPath::new(vec![p(0.0, 0.0, 0.0), p(10.0, 0.0, 0.0), p(10.0, 10.0, 0.0)])
                .unwrap();
        assert_eq!(path.prefix(10.0), vec![p(0.0, 0.0, 0.0), p(10.0, 0.0, 0.0)]);
        assert_eq!(path.prefix(0.0), vec![p(0.0, 0.0, 0.0)]);
        assert_eq!(path.prefix(20.0), path.points().to_vec());
        assert_eq!(path.prefix(99.0), path.points().to_vec());
    }
}
