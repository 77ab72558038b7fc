//! Mathematical utilities and data structures

pub mod aabb;
pub mod frustum;
pub mod locality;

pub use aabb::Aabb;
pub use frustum::{Intersection, Plane, ViewFrustum};
pub use locality::LocalityRadii;
