//! Alignment of reconstructed toolpaths with the source model

use layerscrub_core::{BoundingVolume, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Translation applied to every emitted point
///
/// X and Y move the toolpath's bounding-box center onto the source model's
/// center; Z moves the toolpath's lowest extrusion onto the model's base.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AlignmentOffset(Vector3);

impl AlignmentOffset {
    pub const ZERO: Self = Self(Vector3::ZERO);

    pub fn new(offset: Vector3) -> Self {
        Self(offset)
    }

    /// Offset that moves `toolpath` onto `source`.
    ///
    /// Returns `None` when either box is invalid (nothing was extruded, or
    /// the source bounds were never set).
    pub fn between(source: &BoundingVolume, toolpath: &BoundingVolume) -> Option<Self> {
        if !source.is_valid() || !toolpath.is_valid() {
            return None;
        }
        let centers = source.center() - toolpath.center();
        Some(Self(Vector3::new(
            centers.x,
            centers.y,
            source.min.z - toolpath.min.z,
        )))
    }

    pub fn vector(&self) -> Vector3 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == Vector3::ZERO
    }

    pub fn apply(&self, point: Point3) -> Point3 {
        point + self.0
    }

    pub fn apply_all(&self, points: &[Point3]) -> Vec<Point3> {
        points.iter().map(|p| *p + self.0).collect()
    }
}
