//! # Scene Module
//!
//! The node/component scene graph. Nodes and components live in a [`Scene`]
//! arena and refer to each other by [`NodeId`] / [`ComponentId`]; names are
//! made unique by an explicit [`AssetManager`].

mod assets;
mod component;
mod graph;
mod mesh;
mod node;
mod serialization;
mod transform;

pub use assets::{AssetManager, Registry};
pub use component::{Component, ComponentData, ComponentEntry, ComponentKind, MaterialComponent};
pub use graph::Scene;
pub use mesh::Mesh;
pub use node::Node;
pub use serialization::{ComponentPayload, ComponentSerialization, MeshSerialization, NodeSerialization};
pub use transform::{LocalTransform, Pivot, Transform};

use std::fmt;
use thiserror::Error;

slotmap::new_key_type! {
    /// Handle to a node in a [`Scene`].
    pub struct NodeId;
    /// Handle to a component in a [`Scene`].
    pub struct ComponentId;
}

/// The registries of an [`AssetManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Scene nodes.
    Node,
    /// Materials.
    Material,
    /// Viewports.
    Viewport,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssetKind::Node => "Node",
            AssetKind::Material => "Material",
            AssetKind::Viewport => "Viewport",
        })
    }
}

/// Errors raised by the scene graph and the asset registries.
#[derive(Error, Debug)]
pub enum SceneError {
    /// A name is already taken in a registry.
    #[error("{kind} named '{name}' is already registered")]
    DuplicateAsset {
        /// Registry.
        kind: AssetKind,
        /// Rejected name.
        name: String,
    },

    /// A name is not present in a registry.
    #[error("No {kind} named '{name}' is registered")]
    AssetNotFound {
        /// Registry.
        kind: AssetKind,
        /// Missing name.
        name: String,
    },

    /// The parent already has a child of that name.
    #[error("Node '{parent}' already has a child named '{child}'")]
    DuplicateChild {
        /// Parent name.
        parent: String,
        /// Child name.
        child: String,
    },

    /// The parent has no child of that name.
    #[error("Node '{parent}' has no child named '{child}'")]
    ChildNotFound {
        /// Parent name.
        parent: String,
        /// Child name.
        child: String,
    },

    /// The node has no component of that kind.
    #[error("Node '{node}' has no {kind} component")]
    ComponentNotFound {
        /// Node name.
        node: String,
        /// Requested kind.
        kind: ComponentKind,
    },

    /// A node handle that is not (or no longer) in the scene.
    #[error("Unknown node")]
    UnknownNode,

    /// A component handle that is not (or no longer) in the scene.
    #[error("Unknown component")]
    UnknownComponent,

    /// Appending would make a node its own ancestor.
    #[error("Cannot append '{child}' to '{parent}': a node cannot become its own descendant")]
    CyclicHierarchy {
        /// Parent name.
        parent: String,
        /// Child name.
        child: String,
    },

    /// A component of another kind was supplied.
    #[error("Expected a {expected} component, found {found}")]
    WrongComponentKind {
        /// Required kind.
        expected: ComponentKind,
        /// Supplied kind.
        found: ComponentKind,
    },

    /// Mesh positions do not divide into whole vertices.
    #[error("Mesh has {len} position values, which is not a multiple of {size}")]
    MeshSizeMismatch {
        /// Number of floats supplied.
        len: usize,
        /// Floats per vertex.
        size: u32,
    },

    /// JSON encoding or decoding failed.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
