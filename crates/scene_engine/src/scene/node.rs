//! Scene node: hierarchy, components, and change signals
//!
//! A node owns its children (`Rc`), holds a weak back-reference to its
//! parent, carries at most one component instance per concrete type, and
//! exposes hierarchy and component signals that components subscribe to.
//!
//! Hierarchy signals fire on every node of a moved subtree, so a component
//! only ever has to watch its own node to hear about reparenting anywhere
//! above it.

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::component::Component;
use crate::data::Container;
use crate::events::Signal;
use crate::scene::SceneError;

/// Shared handle to a scene node
pub type NodeRef = Rc<Node>;

static NEXT_NODE_ID: AtomicU32 = AtomicU32::new(0);

/// A node in the scene graph
pub struct Node {
    // Set once inside `Rc::new_cyclic`; always upgradable afterwards.
    self_weak: Weak<Node>,

    id: u32,
    name: RefCell<String>,
    parent: RefCell<Weak<Node>>,
    children: RefCell<Vec<NodeRef>>,
    components: RefCell<HashMap<TypeId, Rc<dyn Component>>>,
    data: Container,

    added: Signal<(NodeRef, NodeRef, NodeRef)>,
    removed: Signal<(NodeRef, NodeRef, NodeRef)>,
    component_added: Signal<(NodeRef, Rc<dyn Component>)>,
    component_removed: Signal<(NodeRef, Rc<dyn Component>)>,
}

impl Node {
    /// Create a detached node with the given name
    pub fn create(name: impl Into<String>) -> NodeRef {
        let name = name.into();
        Rc::new_cyclic(|self_weak| Self {
            self_weak: self_weak.clone(),
            id: NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed),
            name: RefCell::new(name),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            components: RefCell::new(HashMap::new()),
            data: Container::new(),
            added: Signal::new(),
            removed: Signal::new(),
            component_added: Signal::new(),
            component_removed: Signal::new(),
        })
    }

    fn self_ref(&self) -> NodeRef {
        self.self_weak.upgrade().expect("node self-reference")
    }

    /// Unique node identifier
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The node's name
    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    /// Rename the node
    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.borrow_mut() = name.into();
    }

    /// The node's key/value data container
    pub fn data(&self) -> &Container {
        &self.data
    }

    // ------------------------------------------------------------------
    // Hierarchy
    // ------------------------------------------------------------------

    /// The parent node, if attached
    pub fn parent(&self) -> Option<NodeRef> {
        self.parent.borrow().upgrade()
    }

    /// The root of the tree this node belongs to (itself when detached)
    pub fn root(&self) -> NodeRef {
        self.ancestors().into_iter().last().unwrap_or_else(|| self.self_ref())
    }

    /// Snapshot of the node's children, in order
    pub fn children(&self) -> Vec<NodeRef> {
        self.children.borrow().clone()
    }

    /// Number of children
    pub fn children_count(&self) -> usize {
        self.children.borrow().len()
    }

    /// Child at the given index, if any
    pub fn child_at(&self, index: usize) -> Option<NodeRef> {
        self.children.borrow().get(index).cloned()
    }

    /// Strict ancestors, nearest first
    pub fn ancestors(&self) -> Vec<NodeRef> {
        let mut result = Vec::new();
        let mut current = self.parent();
        while let Some(node) = current {
            current = node.parent();
            result.push(node);
        }
        result
    }

    /// This node and its whole subtree, depth-first, document order
    pub fn descendants(&self) -> Vec<NodeRef> {
        let mut result = Vec::new();
        let mut stack = vec![self.self_ref()];
        while let Some(node) = stack.pop() {
            let children = node.children();
            result.push(node);
            // Push in reverse so the leftmost child is visited first.
            stack.extend(children.into_iter().rev());
        }
        result
    }

    /// Append a child to this node.
    ///
    /// A child that already has a parent is detached from it first (its
    /// subtree hears `removed` there before `added` here). Fires `added`
    /// on every node of the moved subtree with
    /// `(node, moved subtree root, new parent)`.
    pub fn add_child(&self, child: &NodeRef) -> Result<(), SceneError> {
        if self.id == child.id
            || self.ancestors().iter().any(|ancestor| Rc::ptr_eq(ancestor, child))
        {
            return Err(SceneError::WouldCreateCycle);
        }

        if let Some(old_parent) = child.parent() {
            old_parent.remove_child(child)?;
        }

        let self_ref = self.self_ref();
        self.children.borrow_mut().push(child.clone());
        *child.parent.borrow_mut() = Rc::downgrade(&self_ref);

        for node in child.descendants() {
            let args = (node.clone(), child.clone(), self_ref.clone());
            node.added.execute(&args);
        }

        Ok(())
    }

    /// Detach a child from this node.
    ///
    /// Fires `removed` on every node of the detached subtree with
    /// `(node, detached subtree root, old parent)`.
    pub fn remove_child(&self, child: &NodeRef) -> Result<(), SceneError> {
        let position = self
            .children
            .borrow()
            .iter()
            .position(|candidate| Rc::ptr_eq(candidate, child))
            .ok_or_else(|| SceneError::NotAChild(child.name()))?;

        self.children.borrow_mut().remove(position);
        *child.parent.borrow_mut() = Weak::new();

        let self_ref = self.self_ref();
        for node in child.descendants() {
            let args = (node.clone(), child.clone(), self_ref.clone());
            node.removed.execute(&args);
        }

        Ok(())
    }

    /// Fires on every node of a subtree that was just attached somewhere,
    /// with `(node, moved subtree root, new parent)`
    pub fn added(&self) -> &Signal<(NodeRef, NodeRef, NodeRef)> {
        &self.added
    }

    /// Fires on every node of a subtree that was just detached, with
    /// `(node, detached subtree root, old parent)`
    pub fn removed(&self) -> &Signal<(NodeRef, NodeRef, NodeRef)> {
        &self.removed
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    /// Attach a component to this node.
    ///
    /// At most one component per concrete type; a second insert of the
    /// same type is rejected. The component's `target_added` hook runs
    /// before the node's `component_added` signal fires.
    pub fn add_component<T: Component>(&self, component: Rc<T>) -> Result<(), SceneError> {
        let key = TypeId::of::<T>();
        {
            let mut components = self.components.borrow_mut();
            if components.contains_key(&key) {
                return Err(SceneError::DuplicateComponent(std::any::type_name::<T>()));
            }
            components.insert(key, component.clone());
        }

        let self_ref = self.self_ref();
        Component::target_added(component.clone(), &self_ref);

        let args = (self_ref, component as Rc<dyn Component>);
        self.component_added.execute(&args);
        Ok(())
    }

    /// Detach a component by type; returns it if it was attached.
    ///
    /// The component's `target_removed` hook runs (revoking all its
    /// subscriptions) before the node's `component_removed` signal fires,
    /// so no handler observes a half-torn-down component.
    pub fn remove_component<T: Component>(&self) -> Option<Rc<T>> {
        let removed = self.components.borrow_mut().remove(&TypeId::of::<T>())?;

        let self_ref = self.self_ref();
        Component::target_removed(removed.clone(), &self_ref);

        let args = (self_ref, removed.clone());
        self.component_removed.execute(&args);

        removed.as_any().downcast::<T>().ok()
    }

    /// Typed component lookup
    pub fn component<T: Component>(&self) -> Option<Rc<T>> {
        let component = self.components.borrow().get(&TypeId::of::<T>()).cloned()?;
        component.as_any().downcast::<T>().ok()
    }

    /// Check whether a component of the given type is attached
    pub fn has_component<T: Component>(&self) -> bool {
        self.components.borrow().contains_key(&TypeId::of::<T>())
    }

    /// Fires when a component is attached, with `(node, component)`
    pub fn component_added(&self) -> &Signal<(NodeRef, Rc<dyn Component>)> {
        &self.component_added
    }

    /// Fires when a component is detached, with `(node, component)`
    pub fn component_removed(&self) -> &Signal<(NodeRef, Rc<dyn Component>)> {
        &self.component_removed
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name.borrow())
            .field("children", &self.children.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_add_child_links_parent() {
        let parent = Node::create("parent");
        let child = Node::create("child");

        parent.add_child(&child).unwrap();

        assert_eq!(parent.children_count(), 1);
        assert!(Rc::ptr_eq(&child.parent().unwrap(), &parent));
        assert!(Rc::ptr_eq(&child.root(), &parent));
    }

    #[test]
    fn test_add_child_rejects_cycle() {
        let a = Node::create("a");
        let b = Node::create("b");
        let c = Node::create("c");

        a.add_child(&b).unwrap();
        b.add_child(&c).unwrap();

        assert!(matches!(c.add_child(&a), Err(SceneError::WouldCreateCycle)));
        assert!(matches!(a.add_child(&a), Err(SceneError::WouldCreateCycle)));
    }

    #[test]
    fn test_remove_child_requires_membership() {
        let parent = Node::create("parent");
        let stranger = Node::create("stranger");

        assert!(matches!(
            parent.remove_child(&stranger),
            Err(SceneError::NotAChild(_))
        ));
    }

    #[test]
    fn test_reparent_detaches_from_old_parent() {
        let first = Node::create("first");
        let second = Node::create("second");
        let child = Node::create("child");

        first.add_child(&child).unwrap();
        second.add_child(&child).unwrap();

        assert_eq!(first.children_count(), 0);
        assert_eq!(second.children_count(), 1);
        assert!(Rc::ptr_eq(&child.parent().unwrap(), &second));
    }

    #[test]
    fn test_added_fires_on_whole_subtree() {
        let root = Node::create("root");
        let mid = Node::create("mid");
        let leaf = Node::create("leaf");
        mid.add_child(&leaf).unwrap();

        let mid_seen = Rc::new(Cell::new(0));
        let leaf_seen = Rc::new(Cell::new(0));

        let mid_inner = mid_seen.clone();
        let _mid_slot = mid.added().connect(move |(_node, _target, _parent)| {
            mid_inner.set(mid_inner.get() + 1);
        });
        let leaf_inner = leaf_seen.clone();
        let _leaf_slot = leaf.added().connect(move |(_node, target, parent)| {
            assert_eq!(target.name(), "mid");
            assert_eq!(parent.name(), "root");
            leaf_inner.set(leaf_inner.get() + 1);
        });

        root.add_child(&mid).unwrap();

        assert_eq!(mid_seen.get(), 1);
        assert_eq!(leaf_seen.get(), 1);
    }

    #[test]
    fn test_removed_fires_on_whole_subtree() {
        let root = Node::create("root");
        let mid = Node::create("mid");
        let leaf = Node::create("leaf");
        mid.add_child(&leaf).unwrap();
        root.add_child(&mid).unwrap();

        let leaf_seen = Rc::new(Cell::new(0));
        let leaf_inner = leaf_seen.clone();
        let _slot = leaf.removed().connect(move |(_node, _target, _parent)| {
            leaf_inner.set(leaf_inner.get() + 1);
        });

        root.remove_child(&mid).unwrap();

        assert_eq!(leaf_seen.get(), 1);
        assert!(mid.parent().is_none());
    }

    #[test]
    fn test_descendants_document_order() {
        let root = Node::create("root");
        let a = Node::create("a");
        let b = Node::create("b");
        let a1 = Node::create("a1");

        root.add_child(&a).unwrap();
        root.add_child(&b).unwrap();
        a.add_child(&a1).unwrap();

        let names: Vec<String> = root.descendants().iter().map(|node| node.name()).collect();
        assert_eq!(names, vec!["root", "a", "a1", "b"]);
    }
}
