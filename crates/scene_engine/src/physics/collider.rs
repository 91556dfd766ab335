//! Collider component: binds one scene node to one rigid body
//!
//! The collider resolves its [`PhysicsWorld`] by searching the target's
//! strict ancestors and requires exactly one match; zero or several leave
//! it inert until the next structural change re-runs the search. Bound,
//! it keeps both directions reconciled:
//!
//! - graphics → physics: on any world-transform change it decomposes the
//!   node's world matrix into a rigid pose plus a scale/shear correction
//!   and pushes the rigid part to the world;
//! - physics → graphics: after each step it folds the reported pose back
//!   into the node's local matrix, preserving the parent-relative chain.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::component::transform::MODEL_TO_WORLD;
use crate::component::{Component, Targets, Transform};
use crate::events::Slot;
use crate::foundation::math::{Mat4, Vec3};
use crate::physics::{ColliderData, PhysicsWorld};
use crate::scene::NodeRef;

/// Attaches a rigid-body proxy to exactly one scene node
pub struct Collider {
    data: Rc<ColliderData>,

    physics_world: RefCell<Weak<PhysicsWorld>>,
    target_transform: RefCell<Option<Rc<Transform>>>,

    targets: Targets,
    added_slot: RefCell<Option<Slot>>,
    removed_slot: RefCell<Option<Slot>>,
    transform_changed_slot: RefCell<Option<Slot>>,
    graphics_changed_slot: RefCell<Option<Slot>>,
}

impl Collider {
    /// Create a collider over the given body record
    pub fn create(data: Rc<ColliderData>) -> Rc<Self> {
        let collider = Rc::new(Self {
            data: data.clone(),
            physics_world: RefCell::new(Weak::new()),
            target_transform: RefCell::new(None),
            targets: Targets::new(),
            added_slot: RefCell::new(None),
            removed_slot: RefCell::new(None),
            transform_changed_slot: RefCell::new(None),
            graphics_changed_slot: RefCell::new(None),
        });

        let weak = Rc::downgrade(&collider);
        *collider.graphics_changed_slot.borrow_mut() = Some(
            data.graphics_world_transform_changed()
                .connect(move |(_data, graphics)| {
                    if let Some(collider) = weak.upgrade() {
                        collider.graphics_world_transform_changed_handler(*graphics);
                    }
                }),
        );

        collider
    }

    /// The collider's body record
    pub fn data(&self) -> &Rc<ColliderData> {
        &self.data
    }

    /// Whether the collider is bound to a physics world
    pub fn is_bound(&self) -> bool {
        self.target_transform.borrow().is_some()
            && self
                .physics_world
                .borrow()
                .upgrade()
                .is_some_and(|world| world.has_child(&self.data))
    }

    /// Resolve the collider's transform and physics world from its node.
    ///
    /// Idempotent: returns immediately when both references are live.
    /// Ensures the node carries a Transform (creating a default one),
    /// then searches the node's strict ancestors for a PhysicsWorld and
    /// requires exactly one match; zero or several leave the collider
    /// unbound until the next structural change calls back in here.
    pub fn initialize_from_node(self: Rc<Self>, node: &NodeRef) {
        if self.is_bound() {
            return;
        }

        if !node.has_component::<Transform>() {
            // A collider is meaningless without a pose to synchronize.
            if let Err(err) = node.add_component(Transform::create()) {
                log::error!("[{}] failed to attach a default transform: {err}", node.name());
                return;
            }
        }
        *self.target_transform.borrow_mut() = node.component::<Transform>();

        let worlds: Vec<NodeRef> = node
            .ancestors()
            .into_iter()
            .filter(|ancestor| ancestor.has_component::<PhysicsWorld>())
            .collect();

        if worlds.len() != 1 {
            log::debug!(
                "[{}] collider cannot be bound ({} physics worlds among ancestors)",
                node.name(),
                worlds.len()
            );
            return;
        }

        let Some(world) = worlds[0].component::<PhysicsWorld>() else {
            return;
        };

        self.data.set_name(node.name());
        *self.physics_world.borrow_mut() = Rc::downgrade(&world);
        world.add_child(&self.data);

        // Any later world-transform change re-syncs the physics side.
        let weak = Rc::downgrade(&self);
        *self.transform_changed_slot.borrow_mut() = Some(
            node.data()
                .property_changed(MODEL_TO_WORLD)
                .connect(move |_name| {
                    if let Some(collider) = weak.upgrade() {
                        collider.synchronize_physics_with_graphics();
                    }
                }),
        );

        self.synchronize_physics_with_graphics();
    }

    /// Push the target's current pose to the physics world.
    ///
    /// Decomposes the world matrix into a rigid part plus a scale/shear
    /// correction, records the correction on the body, and hands the
    /// rigid part over. No-op while unbound.
    pub fn synchronize_physics_with_graphics(&self) {
        let Some(transform) = self.target_transform.borrow().clone() else {
            return;
        };
        let Some(world) = self.physics_world.borrow().upgrade() else {
            return;
        };

        let graphics = transform.model_to_world();
        let (rigid, correction) = PhysicsWorld::remove_scaling_shear(&graphics);

        self.data.set_correction(correction);
        world.synchronize_physics_with_graphics(&self.data, rigid);
    }

    /// Fold a physics-reported graphics world transform back into the
    /// target's local matrix.
    ///
    /// `world_to_parent` is the inverse of the parent's world matrix, so
    /// the node keeps its place in the parent's coordinate space while
    /// taking on the physics-driven pose. The scale/shear correction the
    /// world reapplied is preserved rather than discarded.
    fn graphics_world_transform_changed_handler(&self, graphics: Mat4) {
        let Some(transform) = self.target_transform.borrow().clone() else {
            return;
        };

        let world = transform.model_to_world();
        let Some(world_inverse) = world.try_inverse() else {
            return;
        };
        let world_to_parent = transform.matrix() * world_inverse;

        transform.set_matrix(world_to_parent * graphics);
    }

    /// Translate the body in its own frame; no-op while unbound
    pub fn prepend_local_translation(&self, translation: Vec3) {
        if let Some(world) = self.physics_world.borrow().upgrade() {
            world.prepend_local_translation(&self.data, translation);
        }
    }

    /// Rotate the body around its own Y axis; no-op while unbound
    pub fn prepend_rotation_y(&self, radians: f32) {
        if let Some(world) = self.physics_world.borrow().upgrade() {
            world.prepend_rotation_y(&self.data, radians);
        }
    }

    /// Apply an impulse in the body's own frame; no-op while unbound
    pub fn apply_relative_impulse(&self, impulse: Vec3) {
        if let Some(world) = self.physics_world.borrow().upgrade() {
            world.apply_relative_impulse(&self.data, impulse);
        }
    }

    /// Unregister from the physics world and drop both cached references.
    /// Part of every teardown path, never optional.
    fn teardown_binding(&self) {
        self.transform_changed_slot.borrow_mut().take();

        if let Some(world) = self.physics_world.borrow().upgrade() {
            world.remove_child(&self.data);
        }
        *self.physics_world.borrow_mut() = Weak::new();
        *self.target_transform.borrow_mut() = None;
    }
}

impl Component for Collider {
    fn target_added(self: Rc<Self>, node: &NodeRef) {
        assert!(
            self.targets.is_empty(),
            "Collider cannot have more than one target."
        );
        self.targets.add(node);

        let weak = Rc::downgrade(&self);
        *self.added_slot.borrow_mut() =
            Some(node.added().connect(move |(node, _target, _parent)| {
                if let Some(collider) = weak.upgrade() {
                    collider.initialize_from_node(node);
                }
            }));

        let weak = Rc::downgrade(&self);
        *self.removed_slot.borrow_mut() =
            Some(node.removed().connect(move |(_node, _target, _parent)| {
                if let Some(collider) = weak.upgrade() {
                    collider.teardown_binding();
                }
            }));

        self.initialize_from_node(node);
    }

    fn target_removed(self: Rc<Self>, node: &NodeRef) {
        self.added_slot.borrow_mut().take();
        self.removed_slot.borrow_mut().take();

        self.teardown_binding();
        self.targets.remove(node);
    }

    fn targets(&self) -> Vec<NodeRef> {
        self.targets.all()
    }

    fn as_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}
