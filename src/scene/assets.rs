//! Name registries for nodes, materials and viewports.

use super::{AssetKind, NodeId, SceneError};
use crate::material::Material;
use crate::viewport::SharedViewport;
use indexmap::IndexMap;
use std::sync::Arc;

/// Name-keyed registry that rejects duplicates.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    kind: AssetKind,
    entries: IndexMap<String, T>,
}

impl<T> Registry<T> {
    /// Empty registry for `kind`.
    pub fn new(kind: AssetKind) -> Self {
        Self {
            kind,
            entries: IndexMap::new(),
        }
    }

    /// Register `value` under `name`. The existing entry is kept on collision.
    pub fn add(&mut self, name: impl Into<String>, value: T) -> Result<(), SceneError> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(SceneError::DuplicateAsset { kind: self.kind, name });
        }
        log::debug!("Registered {} '{}'", self.kind, name);
        self.entries.insert(name, value);
        Ok(())
    }

    /// Entry for `name`.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    /// Unregister `name`, returning its entry.
    pub fn delete(&mut self, name: &str) -> Result<T, SceneError> {
        let value = self.entries.shift_remove(name).ok_or_else(|| SceneError::AssetNotFound {
            kind: self.kind,
            name: name.to_owned(),
        })?;
        log::debug!("Unregistered {} '{}'", self.kind, name);
        Ok(value)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The three registries shared by one scene and its viewports.
///
/// Entries are shared references; deleting one does not destroy the object.
#[derive(Debug, Clone)]
pub struct AssetManager {
    /// Node names.
    pub nodes: Registry<NodeId>,
    /// Materials.
    pub materials: Registry<Arc<Material>>,
    /// Viewports.
    pub viewports: Registry<SharedViewport>,
}

impl Default for AssetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetManager {
    /// Empty registries.
    pub fn new() -> Self {
        Self {
            nodes: Registry::new(AssetKind::Node),
            materials: Registry::new(AssetKind::Material),
            viewports: Registry::new(AssetKind::Viewport),
        }
    }

    /// Register a material under its own name.
    pub fn add_material(&mut self, material: Material) -> Result<Arc<Material>, SceneError> {
        let material = Arc::new(material);
        self.materials.add(material.name().to_owned(), Arc::clone(&material))?;
        Ok(material)
    }

    /// Material registered as `name`.
    pub fn material(&self, name: &str) -> Option<Arc<Material>> {
        self.materials.get(name).cloned()
    }

    /// Node registered as `name`.
    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.nodes.get(name).copied()
    }

    /// Viewport registered as `name`.
    pub fn viewport(&self, name: &str) -> Option<SharedViewport> {
        self.viewports.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_is_rejected_and_first_kept() {
        let mut registry = Registry::new(AssetKind::Node);
        registry.add("a", 1).unwrap();
        let err = registry.add("a", 2).unwrap_err();
        assert!(matches!(err, SceneError::DuplicateAsset { kind: AssetKind::Node, ref name } if name == "a"));
        assert_eq!(registry.get("a"), Some(&1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_delete() {
        let mut registry = Registry::new(AssetKind::Material);
        registry.add("a", 1).unwrap();
        registry.add("b", 2).unwrap();
        assert_eq!(registry.delete("a").unwrap(), 1);
        assert!(matches!(registry.delete("a"), Err(SceneError::AssetNotFound { .. })));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(registry.get("missing"), None);
    }
}
