//! Collaborator services consulted by a boundary node during evaluation.
//!
//! The node never computes transforms, radii or frustum math itself; the
//! traversal driver hands it these services once per node per frame.

use crate::core::types::DMat4;
use crate::math::{Aabb, Intersection, LocalityRadii, ViewFrustum};

/// Current model-to-view transform for the node being evaluated.
pub trait TransformProvider {
    fn model_view(&self) -> DMat4;

    /// The model-view matrix is exactly the identity.
    fn is_identity(&self) -> bool;

    /// The model-view matrix will not change for this subtree until the
    /// driver invalidates the node.
    fn is_fixed(&self) -> bool;
}

/// Staged-loading radius tests, in view space.
pub trait LocalityProvider {
    fn test_outer_radius(&self, view_box: &Aabb) -> bool;
    fn test_inner_radius(&self, view_box: &Aabb) -> bool;
}

/// View-frustum tests, in view space.
pub trait FrustumProvider {
    fn test_intersection(&self, view_box: &Aabb) -> Intersection;

    /// Apparent on-screen size; larger means bigger on screen.
    fn projected_size(&self, view_box: &Aabb) -> f64;
}

pub trait InstancingProvider {
    /// The subtree is drawn at more than one placement this frame.
    fn is_instancing(&self) -> bool;
}

/// Everything one boundary node needs for one evaluation.
#[derive(Clone, Copy)]
pub struct FrameServices<'a> {
    pub transform: &'a dyn TransformProvider,
    pub locality: &'a dyn LocalityProvider,
    pub frustum: &'a dyn FrustumProvider,
    pub instancing: &'a dyn InstancingProvider,
}

/// Per-node transform state computed by the traversal driver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeTransform {
    pub model_view: DMat4,
    pub fixed: bool,
    pub instancing: bool,
}

impl NodeTransform {
    pub fn new(model_view: DMat4) -> Self {
        Self {
            model_view,
            fixed: false,
            instancing: false,
        }
    }

    pub fn identity() -> Self {
        Self::new(DMat4::IDENTITY)
    }

    pub fn with_fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }

    pub fn with_instancing(mut self, instancing: bool) -> Self {
        self.instancing = instancing;
        self
    }
}

impl TransformProvider for NodeTransform {
    fn model_view(&self) -> DMat4 {
        self.model_view
    }

    fn is_identity(&self) -> bool {
        self.model_view == DMat4::IDENTITY
    }

    fn is_fixed(&self) -> bool {
        self.fixed
    }
}

impl InstancingProvider for NodeTransform {
    fn is_instancing(&self) -> bool {
        self.instancing
    }
}

impl LocalityProvider for LocalityRadii {
    fn test_outer_radius(&self, view_box: &Aabb) -> bool {
        self.within_outer(view_box)
    }

    fn test_inner_radius(&self, view_box: &Aabb) -> bool {
        self.within_inner(view_box)
    }
}

impl FrustumProvider for ViewFrustum {
    fn test_intersection(&self, view_box: &Aabb) -> Intersection {
        self.classify_aabb(view_box)
    }

    fn projected_size(&self, view_box: &Aabb) -> f64 {
        ViewFrustum::projected_size(self, view_box)
    }
}
