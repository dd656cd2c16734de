//! Component kinds and their arena entries.

use super::{Mesh, NodeId, Pivot, Transform};
use crate::camera::Camera;
use crate::material::Material;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The closed set of component kinds. A node holds at most one of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    /// [`Transform`].
    Transform,
    /// [`Pivot`].
    Pivot,
    /// [`Mesh`].
    Mesh,
    /// [`MaterialComponent`].
    Material,
    /// [`Camera`].
    Camera,
}

impl ComponentKind {
    /// Every kind, in declaration order.
    pub const ALL: [ComponentKind; 5] = [
        ComponentKind::Transform,
        ComponentKind::Pivot,
        ComponentKind::Mesh,
        ComponentKind::Material,
        ComponentKind::Camera,
    ];

    /// Name a component of this kind is looked up by.
    pub const fn name(self) -> &'static str {
        match self {
            ComponentKind::Transform => "Transform",
            ComponentKind::Pivot => "Pivot",
            ComponentKind::Mesh => "Mesh",
            ComponentKind::Material => "Material",
            ComponentKind::Camera => "Camera",
        }
    }

    /// Kind for a component name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Attaches a shared [`Material`] to a node.
#[derive(Debug, Clone)]
pub struct MaterialComponent {
    material: Arc<Material>,
}

impl MaterialComponent {
    /// Wrap a shared material.
    pub fn new(material: Arc<Material>) -> Self {
        Self { material }
    }

    /// The material.
    #[inline]
    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }
}

/// Component payload.
#[derive(Debug, Clone)]
pub enum Component {
    /// Inherited local transform.
    Transform(Transform),
    /// Mesh-only local transform.
    Pivot(Pivot),
    /// Vertex data.
    Mesh(Mesh),
    /// Material attachment.
    Material(MaterialComponent),
    /// Camera.
    Camera(Camera),
}

impl Component {
    /// Kind of this component.
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Transform(_) => ComponentKind::Transform,
            Component::Pivot(_) => ComponentKind::Pivot,
            Component::Mesh(_) => ComponentKind::Mesh,
            Component::Material(_) => ComponentKind::Material,
            Component::Camera(_) => ComponentKind::Camera,
        }
    }

    /// Lookup name, derived from the kind.
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// A component in the scene arena.
#[derive(Debug, Clone)]
pub struct ComponentEntry {
    pub(crate) container: Option<NodeId>,
    /// Inactive components are ignored by the viewport.
    pub active: bool,
    /// Payload.
    pub data: Component,
}

impl ComponentEntry {
    pub(crate) fn new(data: Component) -> Self {
        Self {
            container: None,
            active: true,
            data,
        }
    }

    /// Node this component is attached to.
    #[inline]
    pub fn container(&self) -> Option<NodeId> {
        self.container
    }

    /// Kind of the payload.
    #[inline]
    pub fn kind(&self) -> ComponentKind {
        self.data.kind()
    }
}

/// Typed access to one variant of [`Component`].
pub trait ComponentData: Sized + Into<Component> {
    /// The kind this type is stored as.
    const KIND: ComponentKind;

    /// Borrow the payload if it is of this type.
    fn from_ref(component: &Component) -> Option<&Self>;

    /// Mutably borrow the payload if it is of this type.
    fn from_mut(component: &mut Component) -> Option<&mut Self>;
}

macro_rules! component_data {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Component {
            fn from(value: $ty) -> Self {
                Component::$variant(value)
            }
        }

        impl ComponentData for $ty {
            const KIND: ComponentKind = ComponentKind::$variant;

            fn from_ref(component: &Component) -> Option<&Self> {
                match component {
                    Component::$variant(value) => Some(value),
                    _ => None,
                }
            }

            fn from_mut(component: &mut Component) -> Option<&mut Self> {
                match component {
                    Component::$variant(value) => Some(value),
                    _ => None,
                }
            }
        }
    };
}

component_data!(Transform, Transform);
component_data!(Pivot, Pivot);
component_data!(Mesh, Mesh);
component_data!(MaterialComponent, Material);
component_data!(Camera, Camera);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in ComponentKind::ALL {
            assert_eq!(ComponentKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ComponentKind::from_name("Light"), None);
    }

    #[test]
    fn test_typed_access() {
        let mut component: Component = Pivot::new().into();
        assert_eq!(component.kind(), ComponentKind::Pivot);
        assert_eq!(component.name(), "Pivot");
        assert!(Pivot::from_ref(&component).is_some());
        assert!(Transform::from_mut(&mut component).is_none());
    }
}
