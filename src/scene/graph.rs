//! The scene arena: nodes, components and the links between them.

use super::{
    AssetManager, Component, ComponentData, ComponentEntry, ComponentId, ComponentKind, Node, NodeId, SceneError,
    Transform,
};
use crate::math::Matrix4;
use slotmap::SlotMap;

/// Owns every node and component of a scene graph.
///
/// Parent and container links are plain ids, so a detached node or component
/// stays valid until it is destroyed explicitly.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: SlotMap<NodeId, Node>,
    components: SlotMap<ComponentId, ComponentEntry>,
}

impl Scene {
    /// Empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    // Nodes

    /// Create a root node and register its name in `assets`.
    pub fn create_node(&mut self, assets: &mut AssetManager, name: impl Into<String>) -> Result<NodeId, SceneError> {
        let name = name.into();
        let id = self.nodes.insert(Node::new(name.clone()));
        if let Err(err) = assets.nodes.add(name, id) {
            self.nodes.remove(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Detach `id` from its parent and drop it, its descendants and all of
    /// their components. Their names are unregistered from `assets`.
    pub fn destroy_node(&mut self, assets: &mut AssetManager, id: NodeId) -> Result<(), SceneError> {
        self.require_node(id)?;
        self.detach(id);

        for node_id in self.descendants(id) {
            let Some(node) = self.nodes.remove(node_id) else {
                continue;
            };
            for component in node.components.values() {
                self.components.remove(*component);
            }
            if assets.node(node.name()) == Some(node_id) {
                assets.nodes.delete(node.name())?;
            }
            log::debug!("Destroyed node '{}'", node.name());
        }
        Ok(())
    }

    /// Node data.
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Mutable node data (layers and tags).
    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Name of a node.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).map(Node::name)
    }

    /// Whether `id` is a live node.
    #[inline]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live components, attached or not.
    #[inline]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    fn require_node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.nodes.get(id).ok_or(SceneError::UnknownNode)
    }

    fn node_name(&self, id: NodeId) -> String {
        self.name(id).unwrap_or_default().to_owned()
    }

    // Hierarchy

    /// Parent of `id`.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(Node::parent)
    }

    /// Children of `id` in insertion order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(id)
            .map(|node| node.children.values().copied().collect())
            .unwrap_or_default()
    }

    /// Child of `parent` named `name`.
    pub fn child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes.get(parent)?.children.get(name).copied()
    }

    /// Topmost ancestor of `id` (itself when it has no parent).
    pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        self.nodes.get(current)?;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        Some(current)
    }

    /// Number of ancestors of `id`.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// `id` followed by all of its descendants, pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.values().rev().copied());
        }
        out
    }

    fn is_self_or_ancestor(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut current = Some(of);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn detach(&mut self, child: NodeId) {
        let Some(node) = self.nodes.get_mut(child) else {
            return;
        };
        let Some(parent) = node.parent.take() else {
            return;
        };
        let name = node.name().to_owned();
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.shift_remove(&name);
        }
    }

    /// Append `child` to `parent`, detaching it from any previous parent.
    ///
    /// Fails if `parent` already has a child of the same name or if `child`
    /// is `parent` or one of its ancestors.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        let parent_name = self.require_node(parent)?.name().to_owned();
        let child_name = self.require_node(child)?.name().to_owned();

        if self.is_self_or_ancestor(child, parent) {
            return Err(SceneError::CyclicHierarchy {
                parent: parent_name,
                child: child_name,
            });
        }
        if self.nodes[parent].children.contains_key(&child_name) {
            return Err(SceneError::DuplicateChild {
                parent: parent_name,
                child: child_name,
            });
        }

        self.detach(child);
        self.nodes[parent].children.insert(child_name.clone(), child);
        self.nodes[child].parent = Some(parent);
        log::debug!("Appended '{child_name}' to '{parent_name}'");
        Ok(())
    }

    /// Detach the child named `name` from `parent` and return it.
    pub fn remove_child(&mut self, parent: NodeId, name: &str) -> Result<NodeId, SceneError> {
        let node = self.nodes.get_mut(parent).ok_or(SceneError::UnknownNode)?;
        let child = node.children.shift_remove(name).ok_or_else(|| SceneError::ChildNotFound {
            parent: node.name().to_owned(),
            child: name.to_owned(),
        })?;
        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = None;
        }
        log::debug!("Removed '{}' from '{}'", name, self.node_name(parent));
        Ok(child)
    }

    // Components

    /// Put a component into the arena without attaching it.
    pub fn create_component(&mut self, data: impl Into<Component>) -> ComponentId {
        self.components.insert(ComponentEntry::new(data.into()))
    }

    /// Create a component and attach it to `node`.
    pub fn attach(&mut self, node: NodeId, data: impl Into<Component>) -> Result<ComponentId, SceneError> {
        self.require_node(node)?;
        let component = self.create_component(data);
        self.add_component(node, component)?;
        Ok(component)
    }

    /// Attach `component` to `node`.
    ///
    /// The component is first detached from its previous node. A component of
    /// the same kind already on `node` is evicted: its container is cleared
    /// and its id returned. The last component added of a kind wins.
    pub fn add_component(&mut self, node: NodeId, component: ComponentId) -> Result<Option<ComponentId>, SceneError> {
        self.require_node(node)?;
        let entry = self.components.get(component).ok_or(SceneError::UnknownComponent)?;
        let kind = entry.kind();

        if let Some(previous) = entry.container {
            if previous == node {
                return Ok(None);
            }
            if let Some(previous_node) = self.nodes.get_mut(previous) {
                previous_node.components.shift_remove(&kind);
            }
        }

        let evicted = self.nodes[node].components.insert(kind, component);
        if let Some(old) = evicted {
            if let Some(old_entry) = self.components.get_mut(old) {
                old_entry.container = None;
            }
            log::debug!("Evicted {kind} component from '{}'", self.node_name(node));
        }
        self.components[component].container = Some(node);
        Ok(evicted)
    }

    /// Detach the component of `kind` from `node` and return it. The
    /// component stays in the arena until destroyed.
    pub fn remove_component(&mut self, node: NodeId, kind: ComponentKind) -> Result<ComponentId, SceneError> {
        let node_data = self.nodes.get_mut(node).ok_or(SceneError::UnknownNode)?;
        let component = node_data
            .components
            .shift_remove(&kind)
            .ok_or_else(|| SceneError::ComponentNotFound {
                node: node_data.name().to_owned(),
                kind,
            })?;
        if let Some(entry) = self.components.get_mut(component) {
            entry.container = None;
        }
        Ok(component)
    }

    /// Detach and drop a component, returning its payload.
    pub fn destroy_component(&mut self, component: ComponentId) -> Option<Component> {
        let entry = self.components.remove(component)?;
        if let Some(node) = entry.container.and_then(|n| self.nodes.get_mut(n)) {
            node.components.shift_remove(&entry.kind());
        }
        Some(entry.data)
    }

    /// Component entry.
    #[inline]
    pub fn component(&self, component: ComponentId) -> Option<&ComponentEntry> {
        self.components.get(component)
    }

    /// Mutable component entry.
    #[inline]
    pub fn component_mut(&mut self, component: ComponentId) -> Option<&mut ComponentEntry> {
        self.components.get_mut(component)
    }

    /// Component of `kind` on `node`.
    pub fn component_by_kind(&self, node: NodeId, kind: ComponentKind) -> Option<ComponentId> {
        self.nodes.get(node)?.components.get(&kind).copied()
    }

    /// Component on `node` looked up by its name (`"Transform"`, `"Mesh"`, ...).
    pub fn component_by_name(&self, node: NodeId, name: &str) -> Option<ComponentId> {
        self.component_by_kind(node, ComponentKind::from_name(name)?)
    }

    /// Typed payload of a component.
    pub fn component_as<T: ComponentData>(&self, component: ComponentId) -> Option<&T> {
        T::from_ref(&self.components.get(component)?.data)
    }

    /// Mutable typed payload of a component.
    pub fn component_as_mut<T: ComponentData>(&mut self, component: ComponentId) -> Option<&mut T> {
        T::from_mut(&mut self.components.get_mut(component)?.data)
    }

    /// Typed payload of the component of kind `T` on `node`.
    pub fn get<T: ComponentData>(&self, node: NodeId) -> Option<&T> {
        self.component_as(self.component_by_kind(node, T::KIND)?)
    }

    /// Mutable typed payload of the component of kind `T` on `node`.
    pub fn get_mut<T: ComponentData>(&mut self, node: NodeId) -> Option<&mut T> {
        let component = self.component_by_kind(node, T::KIND)?;
        self.component_as_mut(component)
    }

    /// Whether `node` has an active component of kind `T`.
    pub fn has_active<T: ComponentData>(&self, node: NodeId) -> bool {
        self.component_by_kind(node, T::KIND)
            .and_then(|c| self.components.get(c))
            .is_some_and(|entry| entry.active)
    }

    /// Activate or deactivate a component.
    pub fn set_active(&mut self, component: ComponentId, active: bool) -> Result<(), SceneError> {
        self.components
            .get_mut(component)
            .ok_or(SceneError::UnknownComponent)?
            .active = active;
        Ok(())
    }

    // World matrices

    /// Recompute world matrices of `id` and its descendants, pre-order.
    ///
    /// The starting node combines with the world matrix of its ancestor
    /// chain. Nodes without a [`Transform`] act as identity and forward their
    /// parent's world matrix.
    pub fn update_world_matrices(&mut self, id: NodeId) {
        let parent_world = self.parent(id).map(|p| self.compute_world_matrix(p));
        self.update_world_recursive(id, parent_world);
    }

    fn update_world_recursive(&mut self, id: NodeId, parent_world: Option<Matrix4>) {
        let local = self.get::<Transform>(id).map(|t| *t.matrix()).unwrap_or_default();
        let world = match parent_world {
            Some(parent) => parent.multiply(&local),
            None => local,
        };
        if let Some(transform) = self.get_mut::<Transform>(id) {
            transform.set_world_matrix(world);
        }
        for child in self.children(id) {
            self.update_world_recursive(child, Some(world));
        }
    }

    /// World matrix of `id` from the last update pass.
    pub fn world_matrix(&self, id: NodeId) -> Option<Matrix4> {
        self.get::<Transform>(id).map(|t| *t.world_matrix())
    }

    /// World matrix of `id` composed from its ancestor chain right now,
    /// independent of any update pass.
    pub fn compute_world_matrix(&self, id: NodeId) -> Matrix4 {
        let mut world = Matrix4::IDENTITY;
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(transform) = self.get::<Transform>(node) {
                world = transform.matrix().multiply(&world);
            }
            current = self.parent(node);
        }
        world
    }
}
