//! Transform component: local and cached world matrices
//!
//! The world matrix is a lazily recomputed cache. Mutating a local matrix,
//! attaching/detaching a Transform, or reparenting only flips validity
//! flags and fires the `transform.model_to_world` container notification
//! on the affected subtree; the actual matrix products happen on the next
//! `model_to_world` pull. Consumers that track derived spatial state
//! (bounding boxes, colliders) subscribe to the container notification.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::component::{Component, Targets};
use crate::events::Slot;
use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::scene::NodeRef;

/// Container property used to broadcast world-transform invalidation.
///
/// Notification-only: the value is pulled through
/// [`Transform::model_to_world`], never stored.
pub const MODEL_TO_WORLD: &str = "transform.model_to_world";

/// Per-node local 4x4 matrix with a cached world matrix
pub struct Transform {
    local: Cell<Mat4>,
    world: Cell<Mat4>,
    world_valid: Cell<bool>,

    targets: Targets,
    added_slot: RefCell<Option<Slot>>,
    removed_slot: RefCell<Option<Slot>>,
}

impl Transform {
    /// Create an identity transform
    pub fn create() -> Rc<Self> {
        Self::from_matrix(Mat4::identity())
    }

    /// Create a transform with the given local matrix
    pub fn from_matrix(matrix: Mat4) -> Rc<Self> {
        Rc::new(Self {
            local: Cell::new(matrix),
            world: Cell::new(matrix),
            world_valid: Cell::new(false),
            targets: Targets::new(),
            added_slot: RefCell::new(None),
            removed_slot: RefCell::new(None),
        })
    }

    /// The local matrix
    pub fn matrix(&self) -> Mat4 {
        self.local.get()
    }

    /// Replace the local matrix, invalidating the world matrix of the
    /// whole subtree rooted at the target
    pub fn set_matrix(&self, matrix: Mat4) {
        self.local.set(matrix);
        match self.targets.first() {
            Some(node) => invalidate_world_subtree(&node),
            None => self.world_valid.set(false),
        }
    }

    /// Translate in the parent's frame (applied after the local matrix)
    pub fn append_translation(&self, offset: Vec3) {
        self.set_matrix(Mat4::translation(offset) * self.matrix());
    }

    /// Translate in the node's own frame (applied before the local matrix)
    pub fn prepend_translation(&self, offset: Vec3) {
        self.set_matrix(self.matrix() * Mat4::translation(offset));
    }

    /// Rotate around the parent-frame Y axis
    pub fn append_rotation_y(&self, radians: f32) {
        self.set_matrix(Mat4::rotation_y(radians) * self.matrix());
    }

    /// The node's world matrix, recomputed on demand.
    ///
    /// Walks to the nearest ancestor Transform when the cache is invalid;
    /// at most one matrix product per node per invalidation burst.
    pub fn model_to_world(&self) -> Mat4 {
        if !self.world_valid.get() {
            let parent_world = self
                .targets
                .first()
                .and_then(|node| node.parent())
                .map_or_else(Mat4::identity, |parent| world_matrix_of(&parent));
            self.world.set(parent_world * self.local.get());
            self.world_valid.set(true);
        }
        self.world.get()
    }
}

impl Component for Transform {
    fn target_added(self: Rc<Self>, node: &NodeRef) {
        assert!(
            self.targets.is_empty(),
            "Transform cannot have more than one target."
        );
        self.targets.add(node);

        let weak = Rc::downgrade(&self);
        *self.added_slot.borrow_mut() = Some(node.added().connect(move |(node, _target, _parent)| {
            if let Some(transform) = weak.upgrade() {
                transform.world_valid.set(false);
                node.data().notify(MODEL_TO_WORLD);
            }
        }));

        let weak = Rc::downgrade(&self);
        *self.removed_slot.borrow_mut() =
            Some(node.removed().connect(move |(node, _target, _parent)| {
                if let Some(transform) = weak.upgrade() {
                    transform.world_valid.set(false);
                    node.data().notify(MODEL_TO_WORLD);
                }
            }));

        // A fresh transform changes the world matrix of everything below.
        invalidate_world_subtree(node);
    }

    fn target_removed(self: Rc<Self>, node: &NodeRef) {
        self.added_slot.borrow_mut().take();
        self.removed_slot.borrow_mut().take();

        self.world_valid.set(false);
        invalidate_world_subtree(node);
        self.targets.remove(node);
    }

    fn targets(&self) -> Vec<NodeRef> {
        self.targets.all()
    }

    fn as_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// The world matrix of an arbitrary node: its own Transform's world matrix
/// when it carries one, the nearest ancestor's otherwise, identity when no
/// ancestor carries one either.
pub fn world_matrix_of(node: &NodeRef) -> Mat4 {
    if let Some(transform) = node.component::<Transform>() {
        return transform.model_to_world();
    }
    node.parent()
        .map_or_else(Mat4::identity, |parent| world_matrix_of(&parent))
}

/// Flip the world-validity flag on every Transform of a subtree and fire
/// the container notification on every subtree node, transform-bearing or
/// not. Flags only; no matrix math happens here.
fn invalidate_world_subtree(node: &NodeRef) {
    for descendant in node.descendants() {
        if let Some(transform) = descendant.component::<Transform>() {
            transform.world_valid.set(false);
        }
        descendant.data().notify(MODEL_TO_WORLD);
    }
}
