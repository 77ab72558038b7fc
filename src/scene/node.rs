//! Scene graph node types
//!
//! Core types for the retained scene graph: node IDs, transforms, content variants, and nodes.

use glam::{DMat4, DQuat, DVec3};

use crate::math::Aabb;

use super::boundary::BoundaryNode;

/// Unique identifier for a scene graph node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneNodeId(pub u64);

/// Local transform relative to the parent node.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalTransform {
    pub position: DVec3,
    pub rotation: DQuat,
    pub scale: f64,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            scale: 1.0,
        }
    }
}

impl LocalTransform {
    /// Identity transform (no translation, rotation, or scaling).
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a translation-only transform.
    pub fn from_position(position: DVec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Convert to a 4x4 matrix.
    pub fn to_mat4(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(
            DVec3::splat(self.scale),
            self.rotation,
            self.position,
        )
    }
}

/// What a scene node contains.
#[derive(Debug)]
pub enum NodeContent {
    /// A grouping node with no geometry of its own.
    Group,

    /// A culling / level-of-detail boundary around its children.
    Boundary(Box<BoundaryNode>),

    /// Renderable geometry with local-space bounds.
    Shape { bounds: Aabb },
}

impl NodeContent {
    pub fn boundary(node: BoundaryNode) -> Self {
        NodeContent::Boundary(Box::new(node))
    }
}

/// A single node in the scene graph.
#[derive(Debug)]
pub struct SceneNode {
    pub id: SceneNodeId,
    pub name: String,
    /// Hierarchy links are owned by the graph so LOD tables stay in step
    /// with their child counts.
    pub(crate) parent: Option<SceneNodeId>,
    pub(crate) children: Vec<SceneNodeId>,
    pub local_transform: LocalTransform,
    pub visible: bool,
    /// Transform is animated every frame; boundaries below never cache it.
    pub dynamic: bool,
    /// Subtree is drawn at several placements; boundaries below keep their
    /// object-space corners.
    pub shared: bool,
    pub content: NodeContent,
}

impl SceneNode {
    /// Create a new scene node.
    pub fn new(id: SceneNodeId, name: impl Into<String>, content: NodeContent) -> Self {
        Self {
            id,
            name: name.into(),
            parent: None,
            children: Vec::new(),
            local_transform: LocalTransform::identity(),
            visible: true,
            dynamic: false,
            shared: false,
            content,
        }
    }

    pub fn parent(&self) -> Option<SceneNodeId> {
        self.parent
    }

    pub fn children(&self) -> &[SceneNodeId] {
        &self.children
    }

    pub fn as_boundary(&self) -> Option<&BoundaryNode> {
        match &self.content {
            NodeContent::Boundary(b) => Some(b.as_ref()),
            _ => None,
        }
    }

    pub fn as_boundary_mut(&mut self) -> Option<&mut BoundaryNode> {
        match &mut self.content {
            NodeContent::Boundary(b) => Some(b.as_mut()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::volume::Extents;

    #[test]
    fn test_scene_node_id_equality() {
        let a = SceneNodeId(1);
        let b = SceneNodeId(1);
        let c = SceneNodeId(2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_local_transform_identity() {
        let t = LocalTransform::identity();
        assert_eq!(t.position, DVec3::ZERO);
        assert_eq!(t.rotation, DQuat::IDENTITY);
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.to_mat4(), DMat4::IDENTITY);
    }

    #[test]
    fn test_local_transform_from_position() {
        let pos = DVec3::new(10.0, 5.0, -3.0);
        let t = LocalTransform::from_position(pos);
        assert_eq!(t.position, pos);
        let m = t.to_mat4();
        let (_, _, translation) = m.to_scale_rotation_translation();
        assert!((translation - pos).length() < 1e-9);
    }

    #[test]
    fn test_local_transform_to_mat4_with_scale() {
        let t = LocalTransform {
            position: DVec3::new(1.0, 2.0, 3.0),
            rotation: DQuat::IDENTITY,
            scale: 2.0,
        };
        let m = t.to_mat4();
        let (scale, _, translation) = m.to_scale_rotation_translation();
        assert!((scale - DVec3::splat(2.0)).length() < 1e-9);
        assert!((translation - DVec3::new(1.0, 2.0, 3.0)).length() < 1e-9);
    }

    #[test]
    fn test_scene_node_new() {
        let node = SceneNode::new(SceneNodeId(0), "root", NodeContent::Group);
        assert_eq!(node.id, SceneNodeId(0));
        assert_eq!(node.name, "root");
        assert!(node.parent.is_none());
        assert!(node.children.is_empty());
        assert!(node.visible);
        assert!(!node.dynamic);
        assert!(!node.shared);
        assert!(node.as_boundary().is_none());
    }

    #[test]
    fn test_boundary_content_accessors() {
        let mut node = SceneNode::new(
            SceneNodeId(3),
            "lod",
            NodeContent::boundary(BoundaryNode::new(Extents::default())),
        );
        assert!(node.as_boundary().is_some());
        assert!(node.as_boundary_mut().is_some());
    }
}
