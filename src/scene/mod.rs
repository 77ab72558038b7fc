//! Scene graph with culling / level-of-detail boundary nodes

pub mod boundary;
pub mod classify;
pub mod config;
pub mod events;
pub mod flatten;
pub mod graph;
pub mod lod;
pub mod node;
pub mod services;
pub mod volume;

pub use boundary::{BoundaryNode, Visit};
pub use classify::{CascadeOutcome, LocalityState};
pub use config::{BoundaryConfig, ViewConfig};
pub use events::{BoundaryEvent, EventKind, EventNotifier, ListenerId};
pub use flatten::RenderEntry;
pub use graph::{FrameStats, SceneGraph, ViewState};
pub use lod::{LodSelector, LodTable};
pub use node::{LocalTransform, NodeContent, SceneNode, SceneNodeId};
pub use services::{
    FrameServices, FrustumProvider, InstancingProvider, LocalityProvider, NodeTransform,
    TransformProvider,
};
pub use volume::{Axis, BoundaryVolume, CacheState, Extents};
