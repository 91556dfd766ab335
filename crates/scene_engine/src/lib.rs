//! # Scene Engine
//!
//! A component-based 3D scene-graph engine core.
//!
//! ## Features
//!
//! - **Scene Graph**: Tree of nodes carrying polymorphic components and a
//!   key/value data container for cross-component communication
//! - **Typed Signals**: Ordered observer registration with RAII
//!   subscription tokens
//! - **Lazy Bounding Volumes**: World-space bounds recomputed on demand
//!   from local geometry and the transform hierarchy
//! - **Physics Bridge**: Graphics/physics transform synchronization with
//!   scale/shear decomposition so the rigid-body side only ever sees
//!   rigid transforms
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_engine::prelude::*;
//!
//! let root = Node::create("root");
//! root.add_component(PhysicsWorld::create()).unwrap();
//!
//! let body = Node::create("body");
//! body.add_component(Transform::create()).unwrap();
//! body.add_component(Collider::create(ColliderData::new(1.0))).unwrap();
//!
//! root.add_child(&body).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;

pub mod component;
pub mod data;
pub mod events;
pub mod foundation;
pub mod physics;
pub mod scene;
pub mod spatial;

pub use scene::{Node, NodeRef, SceneError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        component::{BoundingBox, Component, Geometry, Surface, Transform},
        core::config::PhysicsConfig,
        data::{Container, PropertyValue},
        events::{Signal, Slot},
        foundation::math::{Mat4, Point3, Quat, Vec3},
        physics::{Collider, ColliderData, CollisionLayers, PhysicsWorld},
        scene::{Node, NodeRef, SceneError},
        spatial::{Aabb, AbstractShape, BoundingSphere},
    };
}
