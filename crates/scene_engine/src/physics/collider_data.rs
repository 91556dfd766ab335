//! Rigid-body-facing record shared between Collider and PhysicsWorld
//!
//! `ColliderData` is jointly owned (`Rc`) by the Collider that created it
//! and the PhysicsWorld it is registered with; either side dropping its
//! handle keeps the record alive for the other. Only
//! [`PhysicsWorld::remove_child`](crate::physics::PhysicsWorld::remove_child)
//! takes it out of active simulation, and Collider teardown always calls
//! it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::events::Signal;
use crate::foundation::math::Mat4;
use crate::physics::CollisionLayers;

static NEXT_COLLIDER_ID: AtomicU64 = AtomicU64::new(0);

/// Per-body record: identity, mass, collision filtering, the captured
/// scale/shear correction, and the signal the physics step reports
/// through.
pub struct ColliderData {
    id: u64,
    name: RefCell<String>,
    mass: f32,
    layer: Cell<u32>,
    mask: Cell<u32>,
    correction: Cell<Mat4>,
    graphics_world_transform_changed: Signal<(Rc<ColliderData>, Mat4)>,
}

impl ColliderData {
    /// Create a body record with the given mass (0 = static body)
    pub fn new(mass: f32) -> Rc<Self> {
        Rc::new(Self {
            id: NEXT_COLLIDER_ID.fetch_add(1, Ordering::Relaxed),
            name: RefCell::new(String::new()),
            mass,
            layer: Cell::new(CollisionLayers::DEFAULT),
            mask: Cell::new(CollisionLayers::ALL),
            correction: Cell::new(Mat4::identity()),
            graphics_world_transform_changed: Signal::new(),
        })
    }

    /// Unique body identifier
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The body's name, copied from its node at bind time
    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    /// Rename the body
    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.borrow_mut() = name.into();
    }

    /// The body's mass
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Whether the body is static (zero mass)
    pub fn is_static(&self) -> bool {
        self.mass == 0.0
    }

    /// The body's collision layer
    pub fn layer(&self) -> u32 {
        self.layer.get()
    }

    /// Assign the body's collision layer
    pub fn set_layer(&self, layer: u32) {
        self.layer.set(layer);
    }

    /// The body's collision mask
    pub fn mask(&self) -> u32 {
        self.mask.get()
    }

    /// Assign the body's collision mask
    pub fn set_mask(&self, mask: u32) {
        self.mask.set(mask);
    }

    /// The scale/shear captured at the last graphics→physics
    /// synchronization
    pub fn correction(&self) -> Mat4 {
        self.correction.get()
    }

    /// Record the scale/shear folded out of the graphics transform
    pub fn set_correction(&self, correction: Mat4) {
        self.correction.set(correction);
    }

    /// Fires after a simulation step with
    /// `(data, new graphics world transform)`: the body's rigid pose with
    /// the stored correction reapplied.
    pub fn graphics_world_transform_changed(&self) -> &Signal<(Rc<ColliderData>, Mat4)> {
        &self.graphics_world_transform_changed
    }
}
