//! Scene graph: CPU-side hierarchy of nodes.
//!
//! Each frame, `traverse()` walks the tree depth-first, propagates world
//! transforms, lets every boundary node decide which of its children to
//! visit, and collects the shapes that survive into a flat `Vec<RenderEntry>`.

use std::collections::HashMap;

use glam::{DMat4, DVec3};
use log::{debug, warn};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::math::{LocalityRadii, ViewFrustum};

use super::boundary::{BoundaryNode, Visit};
use super::config::{BoundaryConfig, ViewConfig};
use super::flatten::RenderEntry;
use super::node::{LocalTransform, NodeContent, SceneNode, SceneNodeId};
use super::volume::CacheState;
use super::services::{FrameServices, NodeTransform};

/// Camera state for one traversal.
#[derive(Clone, Copy, Debug)]
pub struct ViewState {
    /// World-to-view matrix
    pub view: DMat4,
    pub frustum: ViewFrustum,
    pub locality: LocalityRadii,
}

impl ViewState {
    pub fn new(view: DMat4, frustum: ViewFrustum, locality: LocalityRadii) -> Self {
        Self { view, frustum, locality }
    }

    pub fn from_config(config: &ViewConfig, view: DMat4) -> Self {
        Self::new(view, config.frustum(), config.locality())
    }

    /// Camera at `eye` looking at `target`, +Y up.
    pub fn look_at(config: &ViewConfig, eye: DVec3, target: DVec3) -> Self {
        Self::from_config(config, DMat4::look_at_rh(eye, target, DVec3::Y))
    }
}

/// Counters for the last traversal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub nodes_visited: usize,
    pub boundaries_evaluated: usize,
    pub boundaries_culled: usize,
    pub shapes_rendered: usize,
    /// Static caches dropped because the view matrix changed.
    pub caches_invalidated: usize,
}

/// Inherited per-path state during traversal.
#[derive(Clone, Copy)]
struct PathState {
    world: DMat4,
    dynamic: bool,
    shared: bool,
}

struct Walk<'a> {
    view: &'a ViewState,
    view_fixed: bool,
    out: Vec<RenderEntry>,
    stats: FrameStats,
}

/// CPU-side scene graph driving boundary evaluation.
pub struct SceneGraph {
    nodes: HashMap<SceneNodeId, SceneNode>,
    root: SceneNodeId,
    next_id: u64,
    last_view: Option<DMat4>,
    last_stats: FrameStats,
}

impl SceneGraph {
    /// Create a new scene graph with a root Group node.
    pub fn new() -> Self {
        let root_id = SceneNodeId(0);
        let root_node = SceneNode::new(root_id, "root", NodeContent::Group);

        let mut nodes = HashMap::new();
        nodes.insert(root_id, root_node);

        Self {
            nodes,
            root: root_id,
            next_id: 1,
            last_view: None,
            last_stats: FrameStats::default(),
        }
    }

    /// Get the root node ID.
    pub fn root(&self) -> SceneNodeId {
        self.root
    }

    /// Allocate a fresh node ID.
    fn alloc_id(&mut self) -> SceneNodeId {
        let id = SceneNodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn node_mut(&mut self, id: SceneNodeId) -> Result<&mut SceneNode> {
        self.nodes.get_mut(&id).ok_or(Error::NodeNotFound(id.0))
    }

    /// Refuse a child-count change that would break the parent's LOD table.
    fn check_child_count(&self, parent: SceneNodeId, children: usize) -> Result<()> {
        match self
            .nodes
            .get(&parent)
            .and_then(SceneNode::as_boundary)
            .and_then(BoundaryNode::levels)
        {
            Some(table) => table.validate_children(children),
            None => Ok(()),
        }
    }

    /// Add a child node under `parent`. Returns the new node's ID.
    pub fn add_child(
        &mut self,
        parent: SceneNodeId,
        name: impl Into<String>,
        content: NodeContent,
    ) -> Result<SceneNodeId> {
        if !self.nodes.contains_key(&parent) {
            return Err(Error::NodeNotFound(parent.0));
        }
        self.check_child_count(parent, self.children(parent).count() + 1)?;

        let id = self.alloc_id();
        let mut node = SceneNode::new(id, name, content);
        node.parent = Some(parent);
        self.nodes.insert(id, node);

        // Register as child of parent
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Add a boundary node configured for its current (zero) children.
    ///
    /// Level tables usually need the children in place first; add them and
    /// then call [`SceneGraph::set_levels`].
    pub fn add_boundary(
        &mut self,
        parent: SceneNodeId,
        name: impl Into<String>,
        config: &BoundaryConfig,
    ) -> Result<SceneNodeId> {
        let boundary = BoundaryNode::from_config(config, 0)?;
        self.add_child(parent, name, NodeContent::boundary(boundary))
    }

    /// Add a renderable leaf.
    pub fn add_shape(
        &mut self,
        parent: SceneNodeId,
        name: impl Into<String>,
        bounds: crate::math::Aabb,
    ) -> Result<SceneNodeId> {
        self.add_child(parent, name, NodeContent::Shape { bounds })
    }

    /// IDs of a node and everything below it (BFS order).
    fn subtree(&self, id: SceneNodeId) -> Vec<SceneNodeId> {
        let mut ids = vec![id];
        let mut i = 0;
        while i < ids.len() {
            if let Some(node) = self.nodes.get(&ids[i]) {
                ids.extend_from_slice(&node.children);
            }
            i += 1;
        }
        ids
    }

    /// Drop cached boundary geometry below (and including) `id`.
    fn invalidate_subtree(&mut self, id: SceneNodeId) {
        for nid in self.subtree(id) {
            if let Some(boundary) = self.nodes.get_mut(&nid).and_then(SceneNode::as_boundary_mut) {
                boundary.invalidate();
            }
        }
    }

    /// Remove a node and its entire subtree. Removing the root is a no-op.
    pub fn remove(&mut self, id: SceneNodeId) -> Result<()> {
        if id == self.root {
            return Ok(());
        }
        let parent_id = self.nodes.get(&id).ok_or(Error::NodeNotFound(id.0))?.parent;
        if let Some(parent_id) = parent_id {
            self.check_child_count(parent_id, self.children(parent_id).count().saturating_sub(1))?;
        }

        let to_remove = self.subtree(id);

        // Detach from parent
        if let Some(parent) = parent_id.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != id);
        }

        // Remove all nodes in subtree
        for nid in to_remove {
            self.nodes.remove(&nid);
        }
        Ok(())
    }

    /// Move a node to a new parent. Cannot reparent the root or move a node
    /// below itself.
    pub fn reparent(&mut self, id: SceneNodeId, new_parent: SceneNodeId) -> Result<()> {
        if id == self.root {
            return Ok(());
        }
        if !self.nodes.contains_key(&new_parent) {
            return Err(Error::NodeNotFound(new_parent.0));
        }
        let old_parent = self.nodes.get(&id).ok_or(Error::NodeNotFound(id.0))?.parent;
        if self.subtree(id).contains(&new_parent) {
            warn!("Refusing to reparent node {} below itself", id.0);
            return Ok(());
        }
        if old_parent == Some(new_parent) {
            return Ok(());
        }
        if let Some(old_parent) = old_parent {
            self.check_child_count(old_parent, self.children(old_parent).count().saturating_sub(1))?;
        }
        self.check_child_count(new_parent, self.children(new_parent).count() + 1)?;

        // Detach from old parent
        if let Some(old_parent) = old_parent.and_then(|p| self.nodes.get_mut(&p)) {
            old_parent.children.retain(|c| *c != id);
        }

        // Attach to new parent
        self.node_mut(new_parent)?.children.push(id);
        self.node_mut(id)?.parent = Some(new_parent);

        self.invalidate_subtree(id);
        Ok(())
    }

    /// Set the local transform of a node.
    pub fn set_transform(&mut self, id: SceneNodeId, transform: LocalTransform) -> Result<()> {
        self.node_mut(id)?.local_transform = transform;
        self.invalidate_subtree(id);
        Ok(())
    }

    /// Set the visibility of a node.
    pub fn set_visible(&mut self, id: SceneNodeId, visible: bool) -> Result<()> {
        self.node_mut(id)?.visible = visible;
        Ok(())
    }

    /// Mark a node's transform as animated every frame.
    pub fn set_dynamic(&mut self, id: SceneNodeId, dynamic: bool) -> Result<()> {
        self.node_mut(id)?.dynamic = dynamic;
        self.invalidate_subtree(id);
        Ok(())
    }

    /// Mark a subtree as drawn at several placements.
    pub fn set_shared(&mut self, id: SceneNodeId, shared: bool) -> Result<()> {
        self.node_mut(id)?.shared = shared;
        self.invalidate_subtree(id);
        Ok(())
    }

    /// Get an immutable reference to a node.
    pub fn get(&self, id: SceneNodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Get a mutable reference to a node.
    pub fn get_mut(&mut self, id: SceneNodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    pub fn boundary(&self, id: SceneNodeId) -> Result<&BoundaryNode> {
        self.nodes
            .get(&id)
            .ok_or(Error::NodeNotFound(id.0))?
            .as_boundary()
            .ok_or(Error::NotABoundary(id.0))
    }

    pub fn boundary_mut(&mut self, id: SceneNodeId) -> Result<&mut BoundaryNode> {
        self.node_mut(id)?
            .as_boundary_mut()
            .ok_or(Error::NotABoundary(id.0))
    }

    /// Replace a boundary's LOD table, validated against its current children.
    pub fn set_levels(&mut self, id: SceneNodeId, levels: Vec<f64>) -> Result<()> {
        let children = self.children(id).count();
        self.boundary_mut(id)?.set_levels(levels, children)
    }

    /// Reconfigure a boundary's extents and levels against its current children.
    pub fn configure_boundary(&mut self, id: SceneNodeId, config: &BoundaryConfig) -> Result<()> {
        let children = self.children(id).count();
        self.boundary_mut(id)?.reconfigure(config, children)
    }

    /// Iterate over the children of a node.
    pub fn children(&self, id: SceneNodeId) -> impl Iterator<Item = SceneNodeId> + '_ {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    /// Total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Counters from the most recent traversal.
    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Run one frame: evaluate boundaries and collect the shapes to render.
    pub fn traverse(&mut self, view: &ViewState) -> Vec<RenderEntry> {
        // A moved camera changes every model-view matrix
        let view_fixed = self.last_view == Some(view.view);
        let caches_invalidated = if !view_fixed && self.last_view.is_some() {
            self.invalidate_static()
        } else {
            0
        };
        self.last_view = Some(view.view);

        let mut walk = Walk {
            view,
            view_fixed,
            out: Vec::new(),
            stats: FrameStats {
                caches_invalidated,
                ..Default::default()
            },
        };
        let path = PathState {
            world: DMat4::IDENTITY,
            dynamic: false,
            shared: false,
        };
        self.visit(self.root, path, &mut walk);

        walk.stats.shapes_rendered = walk.out.len();
        debug!(
            "Traversal: {} nodes, {} boundaries ({} culled), {} shapes",
            walk.stats.nodes_visited,
            walk.stats.boundaries_evaluated,
            walk.stats.boundaries_culled,
            walk.stats.shapes_rendered
        );
        self.last_stats = walk.stats;
        walk.out
    }

    /// Drop every view box that was frozen under the old view matrix.
    /// Pending caches re-derive from their corners anyway and keep them.
    fn invalidate_static(&mut self) -> usize {
        let mut count = 0;
        for node in self.nodes.values_mut() {
            if let Some(boundary) = node.as_boundary_mut() {
                if boundary.cache_state() == CacheState::Static {
                    boundary.invalidate();
                    count += 1;
                }
            }
        }
        count
    }

    fn visit(&mut self, id: SceneNodeId, parent: PathState, walk: &mut Walk<'_>) {
        let node = match self.nodes.get_mut(&id) {
            Some(n) => n,
            None => return,
        };

        if !node.visible {
            return;
        }
        walk.stats.nodes_visited += 1;

        let path = PathState {
            world: parent.world * node.local_transform.to_mat4(),
            dynamic: parent.dynamic || node.dynamic,
            shared: parent.shared || node.shared,
        };

        let visit = match &mut node.content {
            NodeContent::Group => Visit::All,
            NodeContent::Shape { bounds } => {
                walk.out.push(RenderEntry::new(id, path.world, bounds));
                Visit::All
            }
            NodeContent::Boundary(boundary) => {
                let transform = NodeTransform::new(walk.view.view * path.world)
                    .with_fixed(walk.view_fixed && !path.dynamic)
                    .with_instancing(path.shared);
                let services = FrameServices {
                    transform: &transform,
                    locality: &walk.view.locality,
                    frustum: &walk.view.frustum,
                    instancing: &transform,
                };
                walk.stats.boundaries_evaluated += 1;
                boundary.evaluate(node.children.len(), &services)
            }
        };

        let children = match visit {
            Visit::Skip => {
                walk.stats.boundaries_culled += 1;
                return;
            }
            Visit::All => node.children.clone(),
            Visit::Only(index) => node.children.get(index).copied().into_iter().collect(),
        };

        for child_id in children {
            self.visit(child_id, path, walk);
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
