//! Spatial bounds and shapes
//!
//! Axis-aligned bounding boxes and the capability trait shared by all
//! spatial-bound variants.

pub mod aabb;
pub mod shape;

pub use aabb::Aabb;
pub use shape::{AbstractShape, BoundingSphere};
