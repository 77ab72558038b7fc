//! Axis-aligned bounding box

use crate::core::types::{DMat4, DVec3};

/// Axis-aligned bounding box defined by min and max corners
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    /// Create AABB from min and max corners
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Create AABB from center and half-extents
    pub fn from_center_half_extent(center: DVec3, half_extent: DVec3) -> Self {
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    /// Tightest box around a set of points. Inverted inputs come out normalized.
    pub fn from_points(points: &[DVec3]) -> Self {
        let mut min = DVec3::splat(f64::INFINITY);
        let mut max = DVec3::splat(f64::NEG_INFINITY);
        for &p in points {
            min = min.min(p);
            max = max.max(p);
        }
        // NaN coordinates are dropped by min/max; keep them visible instead
        if points.iter().any(|p| p.is_nan()) {
            return Self::new(DVec3::NAN, DVec3::NAN);
        }
        Self { min, max }
    }

    /// The 8 corner points, bit 0 = x, bit 1 = y, bit 2 = z (set = max side)
    pub fn corners(&self) -> [DVec3; 8] {
        std::array::from_fn(|i| {
            DVec3::new(
                if i & 1 != 0 { self.max.x } else { self.min.x },
                if i & 2 != 0 { self.max.y } else { self.min.y },
                if i & 4 != 0 { self.max.z } else { self.min.z },
            )
        })
    }

    /// Axis-aligned bounds of this box after an affine transform
    pub fn transformed(&self, m: &DMat4) -> Aabb {
        let corners = self.corners().map(|c| m.transform_point3(c));
        Aabb::from_points(&corners)
    }

    /// Get center point
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Get size (max - min)
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Get half-extents
    pub fn half_extent(&self) -> DVec3 {
        self.size() * 0.5
    }

    /// Squared distance from the box surface to a point (0 when inside)
    pub fn distance_squared_to_point(&self, p: DVec3) -> f64 {
        if p.is_nan() || self.min.is_nan() || self.max.is_nan() {
            return f64::NAN;
        }
        p.max(self.min).min(self.max).distance_squared(p)
    }
}
