//! Scene graph: nodes, hierarchy, and component attachment

pub mod node;

pub use node::{Node, NodeRef};

use thiserror::Error;

/// Recoverable scene-graph errors surfaced to the caller
#[derive(Debug, Error)]
pub enum SceneError {
    /// A component of the same concrete type is already attached
    #[error("a component of type {0} is already attached to this node")]
    DuplicateComponent(&'static str),

    /// Re-linking would make a node its own ancestor
    #[error("adding this child would create a cycle in the scene graph")]
    WouldCreateCycle,

    /// The node is not a child of this parent
    #[error("node '{0}' is not a child of this node")]
    NotAChild(String),
}
