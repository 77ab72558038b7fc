//! Traversal output.
//!
//! `RenderEntry` is one result of walking the scene graph: one entry per
//! shape that survived boundary culling and LOD selection this frame.

use glam::DMat4;

use crate::math::Aabb;

use super::node::SceneNodeId;

/// One entry in the rendered set, in visit order.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderEntry {
    pub node: SceneNodeId,
    /// World transform after propagation.
    pub world_transform: DMat4,
    /// World-space bounds of the shape.
    pub world_bounds: Aabb,
}

impl RenderEntry {
    pub fn new(node: SceneNodeId, world_transform: DMat4, local_bounds: &Aabb) -> Self {
        Self {
            node,
            world_transform,
            world_bounds: local_bounds.transformed(&world_transform),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn test_render_entry_world_bounds() {
        let local = Aabb::new(DVec3::ZERO, DVec3::ONE);
        let world = DMat4::from_translation(DVec3::new(4.0, 0.0, 8.0));
        let entry = RenderEntry::new(SceneNodeId(7), world, &local);
        assert_eq!(entry.node, SceneNodeId(7));
        assert_eq!(entry.world_bounds.min, DVec3::new(4.0, 0.0, 8.0));
        assert_eq!(entry.world_bounds.max, DVec3::new(5.0, 1.0, 9.0));
    }
}
