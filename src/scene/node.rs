//! Scene graph node.

use super::{ComponentId, ComponentKind, NodeId};
use indexmap::IndexMap;

/// A vertex of the scene hierarchy.
///
/// Children are kept in insertion order and keyed by name. Components are
/// keyed by kind; hierarchy and components are changed through
/// [`Scene`](super::Scene) so both sides of every link stay consistent.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: IndexMap<String, NodeId>,
    pub(crate) components: IndexMap<ComponentKind, ComponentId>,
    layers: Vec<String>,
    tags: Vec<String>,
}

impl Node {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            parent: None,
            children: IndexMap::new(),
            components: IndexMap::new(),
            layers: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Node name, unique within its [`AssetManager`](super::AssetManager).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent node, `None` for roots.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children as `(name, id)` in insertion order.
    pub fn children(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.children.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Number of children.
    #[inline]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Attached components as `(kind, id)` in attachment order.
    pub fn components(&self) -> impl Iterator<Item = (ComponentKind, ComponentId)> + '_ {
        self.components.iter().map(|(kind, id)| (*kind, *id))
    }

    /// Layers this node is on.
    #[inline]
    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    /// Tags of this node.
    #[inline]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Put the node on a layer. Returns `false` if it already was.
    pub fn add_layer(&mut self, layer: impl Into<String>) -> bool {
        insert_unique(&mut self.layers, layer.into())
    }

    /// Take the node off a layer. Returns `false` if it was not on it.
    pub fn remove_layer(&mut self, layer: &str) -> bool {
        remove_entry(&mut self.layers, layer)
    }

    /// Add a tag. Returns `false` if it was already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        insert_unique(&mut self.tags, tag.into())
    }

    /// Remove a tag. Returns `false` if it was not present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        remove_entry(&mut self.tags, tag)
    }
}

fn insert_unique(list: &mut Vec<String>, value: String) -> bool {
    if list.contains(&value) {
        return false;
    }
    list.push(value);
    true
}

fn remove_entry(list: &mut Vec<String>, value: &str) -> bool {
    match list.iter().position(|v| v == value) {
        Some(index) => {
            list.remove(index);
            true
        }
        None => false,
    }
}
