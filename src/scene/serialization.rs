//! Serializable descriptions of node subtrees.
//!
//! World matrices are transient and not written; materials are referenced by
//! their registered name.

use super::{
    AssetKind, AssetManager, Component, ComponentData, Mesh, MaterialComponent, NodeId, Pivot, Scene, SceneError,
    Transform,
};
use crate::camera::Camera;
use crate::geometry::BufferSpecification;
use serde::{Deserialize, Serialize};

/// Mesh data as stored; normals are recomputed on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshSerialization {
    /// Vertex positions.
    pub positions: Vec<f32>,
    /// Position layout.
    pub specification: BufferSpecification,
}

/// Payload of a stored component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComponentPayload {
    /// Local matrix of a transform.
    Transform(Transform),
    /// Local matrix of a pivot.
    Pivot(Pivot),
    /// Mesh data.
    Mesh(MeshSerialization),
    /// Registered material name.
    Material(String),
    /// Camera settings.
    Camera(Camera),
}

fn default_active() -> bool {
    true
}

/// A stored component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSerialization {
    /// Activation flag.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Component data.
    #[serde(flatten)]
    pub payload: ComponentPayload,
}

/// A stored node and its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSerialization {
    /// Node name.
    pub name: String,
    /// Layers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<String>,
    /// Tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Components in attachment order.
    #[serde(default)]
    pub components: Vec<ComponentSerialization>,
    /// Children in insertion order.
    #[serde(default)]
    pub children: Vec<NodeSerialization>,
}

impl NodeSerialization {
    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON.
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn payload_of(component: &Component) -> ComponentPayload {
    match component {
        Component::Transform(t) => ComponentPayload::Transform(Transform::from_matrix(*t.matrix())),
        Component::Pivot(p) => ComponentPayload::Pivot(*p),
        Component::Mesh(m) => ComponentPayload::Mesh(MeshSerialization {
            positions: m.positions().to_vec(),
            specification: *m.specification(),
        }),
        Component::Material(m) => ComponentPayload::Material(m.material().name().to_owned()),
        Component::Camera(c) => ComponentPayload::Camera(c.clone()),
    }
}

impl Scene {
    /// Describe `id` and its subtree.
    pub fn serialize_node(&self, id: NodeId) -> Result<NodeSerialization, SceneError> {
        let node = self.node(id).ok_or(SceneError::UnknownNode)?;

        let components = node
            .components()
            .filter_map(|(_, component)| self.component(component))
            .map(|entry| ComponentSerialization {
                active: entry.active,
                payload: payload_of(&entry.data),
            })
            .collect();

        let children = node
            .children()
            .map(|(_, child)| self.serialize_node(child))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NodeSerialization {
            name: node.name().to_owned(),
            layers: node.layers().to_vec(),
            tags: node.tags().to_vec(),
            components,
            children,
        })
    }

    /// Rebuild a subtree as a new root node. Names are registered in
    /// `assets`; on failure everything created so far is destroyed again.
    pub fn deserialize_node(
        &mut self,
        assets: &mut AssetManager,
        serialization: &NodeSerialization,
    ) -> Result<NodeId, SceneError> {
        let id = self.create_node(assets, serialization.name.clone())?;
        if let Err(err) = self.fill_node(assets, id, serialization) {
            self.destroy_node(assets, id)?;
            return Err(err);
        }
        Ok(id)
    }

    fn fill_node(
        &mut self,
        assets: &mut AssetManager,
        id: NodeId,
        serialization: &NodeSerialization,
    ) -> Result<(), SceneError> {
        if let Some(node) = self.node_mut(id) {
            for layer in &serialization.layers {
                node.add_layer(layer.clone());
            }
            for tag in &serialization.tags {
                node.add_tag(tag.clone());
            }
        }

        for stored in &serialization.components {
            let data: Component = match &stored.payload {
                ComponentPayload::Transform(t) => (*t).into(),
                ComponentPayload::Pivot(p) => (*p).into(),
                ComponentPayload::Mesh(m) => Mesh::with_specification(m.positions.clone(), m.specification)?.into(),
                ComponentPayload::Material(name) => {
                    let material = assets.material(name).ok_or_else(|| SceneError::AssetNotFound {
                        kind: AssetKind::Material,
                        name: name.clone(),
                    })?;
                    MaterialComponent::new(material).into()
                }
                ComponentPayload::Camera(c) => c.clone().into(),
            };
            let component = self.attach(id, data)?;
            self.set_active(component, stored.active)?;
        }

        for child in &serialization.children {
            let child_id = self.create_node(assets, child.name.clone())?;
            self.append_child(id, child_id)?;
            self.fill_node(assets, child_id, child)?;
        }
        Ok(())
    }
}

impl ComponentSerialization {
    /// The stored payload as `T`, if it is of that kind and needs no registry.
    pub fn decode<T: ComponentData + Clone>(&self) -> Option<T> {
        let component: Component = match &self.payload {
            ComponentPayload::Transform(t) => (*t).into(),
            ComponentPayload::Pivot(p) => (*p).into(),
            ComponentPayload::Camera(c) => c.clone().into(),
            ComponentPayload::Mesh(m) => Mesh::with_specification(m.positions.clone(), m.specification).ok()?.into(),
            ComponentPayload::Material(_) => return None,
        };
        T::from_ref(&component).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RecordingContext;
    use crate::material::{BasicShader, Material, ShaderDefinition};
    use crate::math::Vector3;
    use crate::scene::LocalTransform;

    fn sample(scene: &mut Scene, assets: &mut AssetManager) -> NodeId {
        let mut gl = RecordingContext::new(1, 1);
        let material = Material::new("red", BasicShader::compile(&mut gl).unwrap(), Vector3::new(1.0, 0.0, 0.0)).unwrap();
        let material = assets.add_material(material).unwrap();

        let root = scene.create_node(assets, "root").unwrap();
        let mut transform = Transform::new();
        transform.translate(Vector3::new(1.0, 2.0, 3.0));
        scene.attach(root, transform).unwrap();
        scene.node_mut(root).unwrap().add_tag("level");

        let child = scene.create_node(assets, "box").unwrap();
        scene.attach(child, Mesh::cube(2.0, 2.0, 2.0)).unwrap();
        let pivot = scene.attach(child, Pivot::new()).unwrap();
        scene.set_active(pivot, false).unwrap();
        scene.attach(child, MaterialComponent::new(material)).unwrap();
        scene.append_child(root, child).unwrap();
        root
    }

    #[test]
    fn test_json_rebuilds_equivalent_subtree() {
        let mut scene = Scene::new();
        let mut assets = AssetManager::new();
        let root = sample(&mut scene, &mut assets);
        let stored = scene.serialize_node(root).unwrap();
        let json = stored.to_json().unwrap();

        let mut other = Scene::new();
        let mut other_assets = AssetManager::new();
        other_assets.materials.add("red", assets.material("red").unwrap()).unwrap();
        let decoded = NodeSerialization::from_json(&json).unwrap();
        let rebuilt = other.deserialize_node(&mut other_assets, &decoded).unwrap();

        assert_eq!(other.serialize_node(rebuilt).unwrap(), stored);
        let child = other.child_by_name(rebuilt, "box").unwrap();
        assert_eq!(other.get::<Mesh>(child).unwrap().vertex_count(), 36);
        assert!(!other.has_active::<Pivot>(child));
        assert_eq!(other.node(rebuilt).unwrap().tags(), &["level".to_string()]);
        let position = other.get::<Transform>(rebuilt).unwrap().position();
        assert_eq!(position, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_missing_material_rolls_back() {
        let mut scene = Scene::new();
        let mut assets = AssetManager::new();
        let root = sample(&mut scene, &mut assets);
        let stored = scene.serialize_node(root).unwrap();

        let mut other = Scene::new();
        let mut other_assets = AssetManager::new();
        let err = other.deserialize_node(&mut other_assets, &stored).unwrap_err();
        assert!(matches!(err, SceneError::AssetNotFound { kind: AssetKind::Material, .. }));
        assert_eq!(other.node_count(), 0);
        assert!(other_assets.nodes.is_empty());
    }

    #[test]
    fn test_decode_payload() {
        let stored = ComponentSerialization {
            active: true,
            payload: ComponentPayload::Pivot(Pivot::new()),
        };
        assert_eq!(stored.decode::<Pivot>(), Some(Pivot::new()));
        assert_eq!(stored.decode::<Transform>(), None);
    }
}
