//! Components attachable to scene nodes
//!
//! A component is attached to zero or more target nodes and reacts to
//! hierarchy and data changes through its node's signals. Most components
//! enforce a single target: attaching a second one is a programming error
//! and panics.

pub mod bounding_box;
pub mod surface;
pub mod transform;

pub use bounding_box::BoundingBox;
pub use surface::{Geometry, Surface};
pub use transform::{world_matrix_of, Transform, MODEL_TO_WORLD};

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::scene::NodeRef;

/// Base capability set of every component: target bookkeeping plus the
/// attach/detach hooks invoked by `Node::add_component` /
/// `Node::remove_component`.
pub trait Component: Any {
    /// Invoked after the component is inserted into the node's component
    /// map. Components wire their subscriptions here.
    fn target_added(self: Rc<Self>, node: &NodeRef);

    /// Invoked after the component is removed from the node's component
    /// map, before the node's `component_removed` signal fires.
    /// Components revoke every subscription here, first thing.
    fn target_removed(self: Rc<Self>, node: &NodeRef);

    /// The nodes this component is currently attached to
    fn targets(&self) -> Vec<NodeRef>;

    /// Upcast for typed lookup through `Node::component::<T>()`
    fn as_any(self: Rc<Self>) -> Rc<dyn Any>;
}

/// Weak list of target nodes, shared bookkeeping for all components
pub struct Targets {
    nodes: RefCell<Vec<Weak<crate::scene::Node>>>,
}

impl Targets {
    /// Create an empty target list
    pub fn new() -> Self {
        Self {
            nodes: RefCell::new(Vec::new()),
        }
    }

    /// Record a new target
    pub fn add(&self, node: &NodeRef) {
        self.nodes.borrow_mut().push(Rc::downgrade(node));
    }

    /// Forget a target
    pub fn remove(&self, node: &NodeRef) {
        self.nodes
            .borrow_mut()
            .retain(|candidate| !candidate.upgrade().is_some_and(|c| Rc::ptr_eq(&c, node)));
    }

    /// The first live target, if any
    pub fn first(&self) -> Option<NodeRef> {
        self.nodes.borrow().iter().find_map(Weak::upgrade)
    }

    /// All live targets
    pub fn all(&self) -> Vec<NodeRef> {
        self.nodes.borrow().iter().filter_map(Weak::upgrade).collect()
    }

    /// Whether no live target is recorded
    pub fn is_empty(&self) -> bool {
        self.first().is_none()
    }
}

impl Default for Targets {
    fn default() -> Self {
        Self::new()
    }
}
