//! Local-space bounding volume with a memoized view-space box.
//!
//! Re-transforming 8 corners per node per frame is cheap but not free; most
//! boundary nodes sit under transforms that never change, so the view-space
//! box is cached in stages:
//!
//! - `Dirty`: extents (or the governing transform) changed, nothing is valid.
//! - `TransformPending`: object-space corners are cached, the view box is
//!   re-derived from them every frame.
//! - `Static`: the view box is final until the next invalidation and the
//!   corner cache has been dropped.

use log::trace;

use crate::core::types::DVec3;
use crate::math::Aabb;

use super::services::{InstancingProvider, TransformProvider};

/// Which cached geometry can be reused on the next refresh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CacheState {
    #[default]
    Dirty,
    TransformPending,
    Static,
}

impl CacheState {
    /// Legacy numeric memoization level (0, 1, 2).
    pub fn level(self) -> u8 {
        match self {
            CacheState::Dirty => 0,
            CacheState::TransformPending => 1,
            CacheState::Static => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// The six local-space extents of a boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Extents {
    pub xmin: f64,
    pub ymin: f64,
    pub zmin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub zmax: f64,
}

impl Extents {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self {
            xmin: min.x,
            ymin: min.y,
            zmin: min.z,
            xmax: max.x,
            ymax: max.y,
            zmax: max.z,
        }
    }

    pub fn min(&self) -> DVec3 {
        DVec3::new(self.xmin, self.ymin, self.zmin)
    }

    pub fn max(&self) -> DVec3 {
        DVec3::new(self.xmax, self.ymax, self.zmax)
    }

    /// Extents as written, without normalizing inverted axes.
    pub fn to_aabb(&self) -> Aabb {
        Aabb::new(self.min(), self.max())
    }

    /// First non-finite field, by name.
    pub fn first_non_finite(&self) -> Option<&'static str> {
        [
            ("xmin", self.xmin),
            ("ymin", self.ymin),
            ("zmin", self.zmin),
            ("xmax", self.xmax),
            ("ymax", self.ymax),
            ("zmax", self.zmax),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }
}

/// Bounding volume owned by a single boundary node.
#[derive(Clone, Debug, Default)]
pub struct BoundaryVolume {
    extents: Extents,
    cache: CacheState,
    /// Object-space corners, only held while the view box depends on a
    /// transform that may still change.
    corners: Option<[DVec3; 8]>,
    view_box: Aabb,
}

impl BoundaryVolume {
    pub fn new(extents: Extents) -> Self {
        Self {
            extents,
            ..Default::default()
        }
    }

    pub fn boundary(&self) -> Extents {
        self.extents
    }

    pub fn set_boundary(&mut self, extents: Extents) {
        self.extents = extents;
        self.invalidate();
    }

    pub fn set_extent(&mut self, axis: Axis, min: f64, max: f64) {
        match axis {
            Axis::X => {
                self.extents.xmin = min;
                self.extents.xmax = max;
            }
            Axis::Y => {
                self.extents.ymin = min;
                self.extents.ymax = max;
            }
            Axis::Z => {
                self.extents.zmin = min;
                self.extents.zmax = max;
            }
        }
        self.invalidate();
    }

    /// Force full recomputation on the next refresh.
    pub fn invalidate(&mut self) {
        self.cache = CacheState::Dirty;
        self.corners = None;
    }

    pub fn cache_state(&self) -> CacheState {
        self.cache
    }

    /// Whether the object-space corner cache is currently held.
    pub fn has_corner_cache(&self) -> bool {
        self.corners.is_some()
    }

    /// View-space box from the last refresh.
    pub fn view_box(&self) -> &Aabb {
        &self.view_box
    }

    /// Bring the view-space box up to date and return it.
    pub fn refresh(
        &mut self,
        transform: &dyn TransformProvider,
        instancing: &dyn InstancingProvider,
    ) -> &Aabb {
        if self.cache == CacheState::Dirty {
            let corners = self.extents.to_aabb().corners();
            if transform.is_identity() {
                self.view_box = Aabb::from_points(&corners);
                self.corners = None;
                self.cache = CacheState::Static;
                trace!("boundary cache static (identity transform)");
                return &self.view_box;
            }
            self.corners = Some(corners);
            self.cache = CacheState::TransformPending;
        }

        if self.cache == CacheState::TransformPending {
            let corners = *self
                .corners
                .get_or_insert_with(|| self.extents.to_aabb().corners());
            let m = transform.model_view();
            self.view_box = Aabb::from_points(&corners.map(|c| m.transform_point3(c)));

            if transform.is_fixed() && !instancing.is_instancing() {
                self.cache = CacheState::Static;
                self.corners = None;
                trace!("boundary cache static (fixed transform)");
            }
        }

        &self.view_box
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DMat4;
    use crate::scene::services::NodeTransform;

    fn unit_volume() -> BoundaryVolume {
        BoundaryVolume::new(Extents::new(DVec3::splat(-1.0), DVec3::splat(1.0)))
    }

    fn refresh(volume: &mut BoundaryVolume, t: NodeTransform) -> Aabb {
        *volume.refresh(&t, &t)
    }

    #[test]
    fn test_default_extents_are_zero() {
        let volume = BoundaryVolume::default();
        assert_eq!(volume.boundary(), Extents::default());
        assert_eq!(volume.cache_state(), CacheState::Dirty);
        assert_eq!(volume.cache_state().level(), 0);
    }

    #[test]
    fn test_identity_goes_straight_to_static() {
        let mut volume = unit_volume();
        let view = refresh(&mut volume, NodeTransform::identity());
        assert_eq!(view, Aabb::new(DVec3::splat(-1.0), DVec3::splat(1.0)));
        assert_eq!(volume.cache_state(), CacheState::Static);
        assert!(!volume.has_corner_cache());
    }

    #[test]
    fn test_moving_transform_stays_pending() {
        let mut volume = unit_volume();
        for i in 0..3 {
            let m = DMat4::from_translation(DVec3::new(0.0, 0.0, -10.0 * (i + 1) as f64));
            let view = refresh(&mut volume, NodeTransform::new(m));
            assert_eq!(view.center(), DVec3::new(0.0, 0.0, -10.0 * (i + 1) as f64));
            assert_eq!(volume.cache_state(), CacheState::TransformPending);
            assert_eq!(volume.cache_state().level(), 1);
            assert!(volume.has_corner_cache());
        }
    }

    #[test]
    fn test_fixed_transform_promotes_and_drops_corners() {
        let mut volume = unit_volume();
        let m = DMat4::from_translation(DVec3::new(5.0, 0.0, 0.0));
        refresh(&mut volume, NodeTransform::new(m).with_fixed(true));
        assert_eq!(volume.cache_state(), CacheState::Static);
        assert!(!volume.has_corner_cache());

        // A static cache ignores later transforms until invalidated
        let view = refresh(&mut volume, NodeTransform::new(DMat4::from_translation(DVec3::Y)));
        assert_eq!(view.center(), DVec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_instancing_blocks_promotion() {
        let mut volume = unit_volume();
        let m = DMat4::from_translation(DVec3::new(5.0, 0.0, 0.0));
        let t = NodeTransform::new(m).with_fixed(true).with_instancing(true);
        refresh(&mut volume, t);
        assert_eq!(volume.cache_state(), CacheState::TransformPending);
        assert!(volume.has_corner_cache());

        let moved = NodeTransform::new(DMat4::from_translation(DVec3::Y))
            .with_fixed(true)
            .with_instancing(true);
        let view = refresh(&mut volume, moved);
        assert_eq!(view.center(), DVec3::Y);
    }

    #[test]
    fn test_every_setter_resets_to_dirty() {
        let mut volume = unit_volume();
        refresh(&mut volume, NodeTransform::identity());
        volume.set_extent(Axis::X, -2.0, 2.0);
        assert_eq!(volume.cache_state(), CacheState::Dirty);

        refresh(&mut volume, NodeTransform::identity());
        volume.set_extent(Axis::Y, -2.0, 2.0);
        assert_eq!(volume.cache_state(), CacheState::Dirty);

        refresh(&mut volume, NodeTransform::identity());
        volume.set_extent(Axis::Z, -2.0, 2.0);
        assert_eq!(volume.cache_state(), CacheState::Dirty);

        refresh(&mut volume, NodeTransform::identity());
        volume.set_boundary(Extents::default());
        assert_eq!(volume.cache_state(), CacheState::Dirty);
    }

    #[test]
    fn test_setter_change_is_visible_after_refresh() {
        let mut volume = unit_volume();
        refresh(&mut volume, NodeTransform::identity());
        volume.set_extent(Axis::X, 0.0, 8.0);
        let view = refresh(&mut volume, NodeTransform::identity());
        assert_eq!(view.min.x, 0.0);
        assert_eq!(view.max.x, 8.0);
        assert_eq!(volume.boundary().xmax, 8.0);
    }

    #[test]
    fn test_inverted_extents_are_normalized() {
        let mut volume = BoundaryVolume::new(Extents::new(DVec3::ONE, DVec3::ZERO));
        let view = refresh(&mut volume, NodeTransform::identity());
        assert_eq!(view, Aabb::new(DVec3::ZERO, DVec3::ONE));
    }

    #[test]
    fn test_first_non_finite() {
        let mut extents = Extents::default();
        assert_eq!(extents.first_non_finite(), None);
        extents.zmax = f64::NAN;
        assert_eq!(extents.first_non_finite(), Some("zmax"));
        extents.ymin = f64::INFINITY;
        assert_eq!(extents.first_non_finite(), Some("ymin"));
    }
}
