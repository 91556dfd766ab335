//! Physics bridge: rigid-body proxies synchronized with the scene graph
//!
//! A [`PhysicsWorld`] component owns the active rigid bodies and steps the
//! simulation; a [`Collider`] component binds one scene node to one
//! [`ColliderData`] and keeps the node's transform and the body's rigid
//! pose reconciled in both directions. Scale and shear are decomposed out
//! of graphics transforms before they reach the physics side, and folded
//! back in on the way out.

pub mod collider;
pub mod collider_data;
pub mod collision_layers;
pub mod physics_world;

pub use collider::Collider;
pub use collider_data::ColliderData;
pub use collision_layers::CollisionLayers;
pub use physics_world::PhysicsWorld;
