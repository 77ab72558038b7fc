//! Rktri bounds - boundary culling and level-of-detail selection for a retained scene graph

pub mod core;
pub mod math;
pub mod scene;
