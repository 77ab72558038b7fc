//! View frustum for culling and projected-size estimation
//!
//! Planes are extracted from a projection matrix, so boxes are tested in view
//! space (camera at the origin looking down -Z).

use crate::core::types::{DMat4, DVec3, DVec4};
use super::aabb::Aabb;

/// A plane defined by normal and distance from origin
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub normal: DVec3,
    pub distance: f64,
}

impl Plane {
    pub fn new(normal: DVec3, distance: f64) -> Self {
        Self { normal, distance }
    }

    /// Signed distance from point to plane (positive = in front)
    pub fn distance_to_point(&self, point: DVec3) -> f64 {
        self.normal.dot(point) + self.distance
    }
}

/// Result of testing a box against the frustum
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intersection {
    Inside,
    Intersecting,
    Outside,
}

/// Perspective view frustum with 6 planes (Near, Far, Left, Right, Top, Bottom)
#[derive(Clone, Copy, Debug)]
pub struct ViewFrustum {
    pub planes: [Plane; 6],
    /// Vertical field of view in radians
    fov_y: f64,
    near: f64,
    /// Viewport height in pixels, used to scale projected sizes
    viewport_height: f64,
}

impl ViewFrustum {
    /// Build a right-handed perspective frustum.
    pub fn perspective(fov_y: f64, aspect: f64, near: f64, far: f64, viewport_height: f64) -> Self {
        let proj = DMat4::perspective_rh(fov_y, aspect, near, far);
        Self {
            planes: Self::extract_planes(&proj),
            fov_y,
            near,
            viewport_height,
        }
    }

    /// Extract frustum planes from a projection (or view-projection) matrix
    fn extract_planes(m: &DMat4) -> [Plane; 6] {
        let m = m.to_cols_array_2d();

        // Left: row3 + row0
        let left = Self::normalize_plane(DVec4::new(
            m[0][3] + m[0][0],
            m[1][3] + m[1][0],
            m[2][3] + m[2][0],
            m[3][3] + m[3][0],
        ));

        // Right: row3 - row0
        let right = Self::normalize_plane(DVec4::new(
            m[0][3] - m[0][0],
            m[1][3] - m[1][0],
            m[2][3] - m[2][0],
            m[3][3] - m[3][0],
        ));

        // Bottom: row3 + row1
        let bottom = Self::normalize_plane(DVec4::new(
            m[0][3] + m[0][1],
            m[1][3] + m[1][1],
            m[2][3] + m[2][1],
            m[3][3] + m[3][1],
        ));

        // Top: row3 - row1
        let top = Self::normalize_plane(DVec4::new(
            m[0][3] - m[0][1],
            m[1][3] - m[1][1],
            m[2][3] - m[2][1],
            m[3][3] - m[3][1],
        ));

        // Near: row2 alone for a [0, 1] depth range
        let near = Self::normalize_plane(DVec4::new(
            m[0][2],
            m[1][2],
            m[2][2],
            m[3][2],
        ));

        // Far: row3 - row2
        let far = Self::normalize_plane(DVec4::new(
            m[0][3] - m[0][2],
            m[1][3] - m[1][2],
            m[2][3] - m[2][2],
            m[3][3] - m[3][2],
        ));

        [near, far, left, right, top, bottom]
    }

    fn normalize_plane(plane: DVec4) -> Plane {
        let normal = DVec3::new(plane.x, plane.y, plane.z);
        let len = normal.length();
        if len == 0.0 {
            return Plane::new(normal, plane.w);
        }
        Plane {
            normal: normal / len,
            distance: plane.w / len,
        }
    }

    /// Classify an AABB against the frustum (conservative: boxes straddling a
    /// frustum corner may report `Intersecting` while being outside)
    pub fn classify_aabb(&self, aabb: &Aabb) -> Intersection {
        let mut result = Intersection::Inside;
        for plane in &self.planes {
            // Corner most aligned with plane normal (p-vertex) and its opposite (n-vertex)
            let p = DVec3::new(
                if plane.normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if plane.normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if plane.normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );
            let n = DVec3::new(
                if plane.normal.x >= 0.0 { aabb.min.x } else { aabb.max.x },
                if plane.normal.y >= 0.0 { aabb.min.y } else { aabb.max.y },
                if plane.normal.z >= 0.0 { aabb.min.z } else { aabb.max.z },
            );

            // Written as !(>= 0) so NaN boxes land outside
            if !(plane.distance_to_point(p) >= 0.0) {
                return Intersection::Outside;
            }
            if plane.distance_to_point(n) < 0.0 {
                result = Intersection::Intersecting;
            }
        }
        result
    }

    /// Approximate on-screen diameter of the box's bounding sphere, in pixels
    pub fn projected_size(&self, aabb: &Aabb) -> f64 {
        let radius = aabb.half_extent().length();
        let depth = (-aabb.center().z).max(self.near);
        radius / (depth * (self.fov_y * 0.5).tan()) * self.viewport_height
    }
}
