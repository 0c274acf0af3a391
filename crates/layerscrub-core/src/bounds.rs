//! Axis-aligned bounding volume accumulated while parsing toolpaths.

use crate::types::Point3;
use serde::{Deserialize, Serialize};

/// Axis-aligned box over a set of points.
///
/// A fresh volume is empty (and invalid) until the first point is added.
/// The parser only feeds it points where material is being deposited, so
/// its extent describes the printed part rather than the travel envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingVolume {
    pub min: Point3,
    pub max: Point3,
}

impl Default for BoundingVolume {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingVolume {
    /// An empty volume that absorbs the first point unioned into it.
    pub fn empty() -> Self {
        Self {
            min: Point3::splat(f64::MAX),
            max: Point3::splat(f64::MIN),
        }
    }

    /// Volume spanning two corners, in any order.
    pub fn from_corners(a: Point3, b: Point3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn union_point(&mut self, p: Point3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min.x <= self.max.x
            && self.min.y <= self.max.y
            // a single-layer print is flat, min.z == max.z is fine
            && self.min.z <= self.max.z
    }

    pub fn center(&self) -> Point3 {
        (self.min + self.max) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_invalid() {
        let bounds = BoundingVolume::empty();
        assert!(!bounds.is_valid());
        assert_eq!(bounds, BoundingVolume::default());
    }

    #[test]
    fn test_single_point_is_valid() {
        let mut bounds = BoundingVolume::empty();
        bounds.union_point(Point3::new(1.0, 2.0, 0.2));
        assert!(bounds.is_valid());
        assert_eq!(bounds.min, bounds.max);
        assert_eq!(bounds.center(), Point3::new(1.0, 2.0, 0.2));
    }

    #[test]
    fn test_union_grows_box() {
        let mut bounds = BoundingVolume::empty();
        bounds.union_point(Point3::new(0.0, 0.0, 0.2));
        bounds.union_point(Point3::new(10.0, -4.0, 1.0));
        assert_eq!(bounds.min, Point3::new(0.0, -4.0, 0.2));
        assert_eq!(bounds.max, Point3::new(10.0, 0.0, 1.0));
        assert_eq!(bounds.center(), Point3::new(5.0, -2.0, 0.6));
    }

    #[test]
    fn test_from_corners_orders_components() {
        let bounds =
            BoundingVolume::from_corners(Point3::new(5.0, 0.0, 3.0), Point3::new(1.0, 4.0, 0.0));
        assert_eq!(bounds.min, Point3::new(1.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(5.0, 4.0, 3.0));
    }
}
