//! Nested locality radii used to stage loading before full visibility processing

use crate::core::types::DVec3;
use super::aabb::Aabb;

/// Two nested spheres around a reference point (usually the viewer).
///
/// A box "passes" a radius test when any part of it lies within that radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalityRadii {
    pub center: DVec3,
    pub outer: f64,
    pub inner: f64,
}

impl LocalityRadii {
    pub fn new(center: DVec3, outer: f64, inner: f64) -> Self {
        Self { center, outer, inner }
    }

    /// Radii centered on the view-space origin
    pub fn around_viewer(outer: f64, inner: f64) -> Self {
        Self::new(DVec3::ZERO, outer, inner)
    }

    pub fn within_outer(&self, aabb: &Aabb) -> bool {
        aabb.distance_squared_to_point(self.center) <= self.outer * self.outer
    }

    pub fn within_inner(&self, aabb: &Aabb) -> bool {
        aabb.distance_squared_to_point(self.center) <= self.inner * self.inner
    }
}
