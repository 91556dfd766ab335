//! BoundingBox component: lazily derived world-space bounds
//!
//! Two independent dirty flags drive the cache: `invalid_box` (the local
//! geometry changed) and `invalid_world_space_box` (the world transform
//! changed). Change handlers only flip flags; the matrix work happens at
//! most once per query after any number of invalidations.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::component::transform::MODEL_TO_WORLD;
use crate::component::{world_matrix_of, Component, Surface, Targets, Transform};
use crate::events::Slot;
use crate::foundation::math::Vec3;
use crate::scene::NodeRef;
use crate::spatial::{Aabb, AbstractShape};

/// Derives a node's world-space bound from its geometry and transforms
pub struct BoundingBox {
    /// An explicitly supplied box is never recomputed from geometry
    fixed: bool,

    local_box: Cell<Aabb>,
    world_space_box: Cell<Aabb>,

    invalid_box: Cell<bool>,
    invalid_world_space_box: Cell<bool>,

    targets: Targets,
    added_slot: RefCell<Option<Slot>>,
    removed_slot: RefCell<Option<Slot>>,
    component_added_slot: RefCell<Option<Slot>>,
    component_removed_slot: RefCell<Option<Slot>>,
    model_to_world_slot: RefCell<Option<Slot>>,
}

impl BoundingBox {
    /// Create a bounding box derived from the target's geometry
    pub fn create() -> Rc<Self> {
        Self::new(false, Aabb::zero())
    }

    /// Create a fixed box from a center and explicit width/height/depth
    pub fn from_center_size(center: Vec3, width: f32, height: f32, depth: f32) -> Rc<Self> {
        let extents = Vec3::new(width * 0.5, height * 0.5, depth * 0.5);
        Self::new(true, Aabb::from_center_extents(center, extents))
    }

    /// Create a fixed box from two opposite corners
    pub fn from_corners(bottom_left: Vec3, top_right: Vec3) -> Rc<Self> {
        Self::new(true, Aabb::new(bottom_left, top_right))
    }

    fn new(fixed: bool, local_box: Aabb) -> Rc<Self> {
        Rc::new(Self {
            fixed,
            local_box: Cell::new(local_box),
            world_space_box: Cell::new(local_box),
            invalid_box: Cell::new(!fixed),
            invalid_world_space_box: Cell::new(true),
            targets: Targets::new(),
            added_slot: RefCell::new(None),
            removed_slot: RefCell::new(None),
            component_added_slot: RefCell::new(None),
            component_removed_slot: RefCell::new(None),
            model_to_world_slot: RefCell::new(None),
        })
    }

    /// The current world-space bound, recomputed first if any flag is set
    pub fn world_space_box(&self) -> Aabb {
        if self.invalid_box.get() {
            self.update();
        }
        if self.invalid_world_space_box.get() {
            self.update_world_space_box();
        }
        self.world_space_box.get()
    }

    /// The local-space bound, recomputed from geometry first if needed
    pub fn local_box(&self) -> Aabb {
        if self.invalid_box.get() {
            self.update();
        }
        self.local_box.get()
    }

    /// The world-space bound as a shape capability
    pub fn shape(&self) -> Rc<dyn AbstractShape> {
        Rc::new(self.world_space_box())
    }

    /// Recompute the local box from the target's geometry.
    ///
    /// Skipped for fixed boxes. Marks the local box valid and the world
    /// box invalid.
    pub fn update(&self) {
        if !self.fixed {
            let bounds = self
                .targets
                .first()
                .and_then(|node| node.component::<Surface>())
                .map_or_else(Aabb::zero, |surface| surface.geometry().compute_bounds());
            self.local_box.set(bounds);
        }
        self.invalid_box.set(false);
        self.invalid_world_space_box.set(true);
    }

    fn update_world_space_box(&self) {
        let world = match self.targets.first() {
            Some(node) => self.local_box.get().transformed(&world_matrix_of(&node)),
            None => self.local_box.get(),
        };
        self.world_space_box.set(world);
        self.invalid_world_space_box.set(false);
    }
}

impl Component for BoundingBox {
    fn target_added(self: Rc<Self>, node: &NodeRef) {
        assert!(
            self.targets.is_empty(),
            "BoundingBox cannot have more than one target."
        );
        self.targets.add(node);
        self.invalid_box.set(!self.fixed);
        self.invalid_world_space_box.set(true);

        let weak = Rc::downgrade(&self);
        *self.added_slot.borrow_mut() =
            Some(node.added().connect(move |(_node, _target, _parent)| {
                if let Some(bounds) = weak.upgrade() {
                    bounds.invalid_world_space_box.set(true);
                }
            }));

        let weak = Rc::downgrade(&self);
        *self.removed_slot.borrow_mut() =
            Some(node.removed().connect(move |(_node, _target, _parent)| {
                if let Some(bounds) = weak.upgrade() {
                    bounds.invalid_world_space_box.set(true);
                }
            }));

        let weak = Rc::downgrade(&self);
        *self.component_added_slot.borrow_mut() =
            Some(node.component_added().connect(move |(_node, component)| {
                if let Some(bounds) = weak.upgrade() {
                    bounds.component_changed_handler(component);
                }
            }));

        let weak = Rc::downgrade(&self);
        *self.component_removed_slot.borrow_mut() =
            Some(node.component_removed().connect(move |(_node, component)| {
                if let Some(bounds) = weak.upgrade() {
                    bounds.component_changed_handler(component);
                }
            }));

        let weak = Rc::downgrade(&self);
        *self.model_to_world_slot.borrow_mut() = Some(
            node.data()
                .property_changed(MODEL_TO_WORLD)
                .connect(move |_name| {
                    if let Some(bounds) = weak.upgrade() {
                        bounds.invalid_world_space_box.set(true);
                    }
                }),
        );
    }

    fn target_removed(self: Rc<Self>, node: &NodeRef) {
        self.added_slot.borrow_mut().take();
        self.removed_slot.borrow_mut().take();
        self.component_added_slot.borrow_mut().take();
        self.component_removed_slot.borrow_mut().take();
        self.model_to_world_slot.borrow_mut().take();

        self.targets.remove(node);
    }

    fn targets(&self) -> Vec<NodeRef> {
        self.targets.all()
    }

    fn as_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

impl BoundingBox {
    /// A geometry component appearing or disappearing dirties the local
    /// box; a transform doing so dirties the world box.
    fn component_changed_handler(&self, component: &Rc<dyn Component>) {
        let component = component.clone().as_any();
        if component.clone().downcast::<Surface>().is_ok() {
            if !self.fixed {
                self.invalid_box.set(true);
            }
            self.invalid_world_space_box.set(true);
        } else if component.downcast::<Transform>().is_ok() {
            self.invalid_world_space_box.set(true);
        }
    }
}
