//! Viewport: renders one branch of a scene through one camera.

use crate::camera::Camera;
use crate::core::{Capability, EngineError, GraphicsContext, TextureHandle, VertexArrayHandle};
use crate::geometry::{quad_texture_coordinates, vertex_colors};
use crate::material::{Material, TextureLoader, TextureSource, STANDARD_MATERIAL, STANDARD_MATERIAL_COLOR};
use crate::math::Matrix4;
use crate::scene::{
    AssetKind, AssetManager, ComponentId, ComponentKind, MaterialComponent, Mesh, NodeId, Pivot, Scene, SceneError,
    Transform,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

/// A viewport shared between the asset registry and its owner.
pub type SharedViewport = Rc<RefCell<Viewport>>;

/// Statistics of one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderInfo {
    /// Number of draw calls issued.
    pub draw_calls: u32,
    /// Number of triangles drawn.
    pub triangles: u32,
    /// Frames rendered by this viewport so far.
    pub frame: u64,
}

/// Vertex array and texture of one mesh node.
#[derive(Debug, Clone, Copy)]
struct NodeBuffers {
    vertex_array: VertexArrayHandle,
    texture: Option<TextureHandle>,
}

/// Pairs a branch of the scene with a camera component.
///
/// GPU buffers are created once per mesh node, keyed by node handle, when the
/// node is first initialized. Buffers of destroyed nodes are dropped on the
/// next initialization.
#[derive(Debug)]
pub struct Viewport {
    name: String,
    root: NodeId,
    camera: ComponentId,
    buffers: HashMap<NodeId, NodeBuffers>,
    textures: TextureLoader,
    pixel_ratio: f32,
    frame: u64,
}

fn require_camera(scene: &Scene, camera: ComponentId) -> Result<(), SceneError> {
    let entry = scene.component(camera).ok_or(SceneError::UnknownComponent)?;
    if entry.kind() != ComponentKind::Camera {
        return Err(SceneError::WrongComponentKind {
            expected: ComponentKind::Camera,
            found: entry.kind(),
        });
    }
    Ok(())
}

/// The registered `standardMaterial`, created from [`BasicShader`](crate::material::BasicShader)
/// when missing.
pub fn standard_material(assets: &mut AssetManager, gl: &mut dyn GraphicsContext) -> Result<Arc<Material>, EngineError> {
    if let Some(material) = assets.material(STANDARD_MATERIAL) {
        return Ok(material);
    }
    let material = Material::standard(gl, STANDARD_MATERIAL_COLOR)?;
    Ok(assets.add_material(material)?)
}

impl Viewport {
    /// Create a viewport, initialize every node below `root` and register it
    /// in `assets` under `name`.
    pub fn new(
        name: impl Into<String>,
        root: NodeId,
        camera: ComponentId,
        scene: &mut Scene,
        assets: &mut AssetManager,
        gl: &mut dyn GraphicsContext,
    ) -> Result<SharedViewport, EngineError> {
        let name = name.into();
        if assets.viewports.contains(&name) {
            return Err(SceneError::DuplicateAsset {
                kind: AssetKind::Viewport,
                name,
            }
            .into());
        }
        if !scene.contains_node(root) {
            return Err(SceneError::UnknownNode.into());
        }
        require_camera(scene, camera)?;

        let mut viewport = Self {
            name: name.clone(),
            root,
            camera,
            buffers: HashMap::new(),
            textures: TextureLoader::new(),
            pixel_ratio: 1.0,
            frame: 0,
        };
        viewport.initialize_nodes(scene, assets, gl)?;

        let shared = Rc::new(RefCell::new(viewport));
        assets.viewports.add(name, Rc::clone(&shared))?;
        Ok(shared)
    }

    /// Viewport name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root of the rendered branch.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Camera component.
    #[inline]
    pub fn camera(&self) -> ComponentId {
        self.camera
    }

    /// Frames rendered so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Multiplier from client size to drawable size.
    #[inline]
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Set the multiplier from client size to drawable size.
    pub fn set_pixel_ratio(&mut self, ratio: f32) {
        if ratio > 0.0 {
            self.pixel_ratio = ratio;
        }
    }

    /// Texture images still decoding.
    pub fn pending_textures(&self) -> usize {
        self.textures.in_flight()
    }

    /// Render through another camera component.
    pub fn set_camera(&mut self, scene: &Scene, camera: ComponentId) -> Result<(), SceneError> {
        require_camera(scene, camera)?;
        self.camera = camera;
        Ok(())
    }

    /// Render another branch, initializing nodes that have no GPU buffers yet.
    pub fn set_root(
        &mut self,
        root: NodeId,
        scene: &mut Scene,
        assets: &mut AssetManager,
        gl: &mut dyn GraphicsContext,
    ) -> Result<(), EngineError> {
        if !scene.contains_node(root) {
            return Err(SceneError::UnknownNode.into());
        }
        self.root = root;
        self.initialize_nodes(scene, assets, gl)
    }

    /// Prepare every node of the branch for drawing, pre-order.
    ///
    /// Nodes get a [`Transform`] if they lack one. Mesh nodes without a
    /// material get the `standardMaterial`, then their position, color and
    /// (for enabled textures) texture coordinate buffers are uploaded and the
    /// texture starts loading. Nodes initialized before are left alone.
    pub fn initialize_nodes(
        &mut self,
        scene: &mut Scene,
        assets: &mut AssetManager,
        gl: &mut dyn GraphicsContext,
    ) -> Result<(), EngineError> {
        self.buffers.retain(|id, _| scene.contains_node(*id));
        for id in scene.descendants(self.root) {
            self.initialize_node(scene, assets, gl, id)?;
        }
        Ok(())
    }

    fn initialize_node(
        &mut self,
        scene: &mut Scene,
        assets: &mut AssetManager,
        gl: &mut dyn GraphicsContext,
        id: NodeId,
    ) -> Result<(), EngineError> {
        let name = scene.name(id).ok_or(SceneError::UnknownNode)?.to_owned();

        if scene.get::<Transform>(id).is_none() {
            log::debug!("No Transform attached to node '{name}', attaching one");
            scene.attach(id, Transform::new())?;
        }
        if scene.get::<Mesh>(id).is_none() {
            log::debug!("No Mesh attached to node '{name}'");
            return Ok(());
        }
        if scene.get::<MaterialComponent>(id).is_none() {
            log::warn!("No Material attached to node '{name}', attaching {STANDARD_MATERIAL}");
            let material = standard_material(assets, gl)?;
            scene.attach(id, MaterialComponent::new(material))?;
        }
        if self.buffers.contains_key(&id) {
            return Ok(());
        }

        let (Some(mesh), Some(material)) = (scene.get::<Mesh>(id), scene.get::<MaterialComponent>(id)) else {
            return Ok(());
        };
        let material = material.material();
        let vertex_count = mesh.vertex_count();

        let vertex_array = gl.create_vertex_array();
        gl.bind_vertex_array(Some(vertex_array))?;

        let position = gl.create_buffer();
        gl.buffer_data(position, bytemuck::cast_slice(mesh.positions()))?;
        gl.attribute_pointer(material.position_location(), position, mesh.specification())?;

        let color = gl.create_buffer();
        gl.buffer_data(color, bytemuck::cast_slice(&vertex_colors(material.color(), vertex_count)))?;
        gl.enable_vertex_attribute(material.color_location())?;
        gl.attribute_pointer(material.color_location(), color, material.color_specification())?;

        let mut texture = None;
        if let Some(settings) = material.enabled_texture() {
            let buffer = gl.create_buffer();
            gl.buffer_data(buffer, bytemuck::cast_slice(&quad_texture_coordinates(vertex_count)))?;
            gl.enable_vertex_attribute(settings.coordinate_location())?;
            gl.attribute_pointer(settings.coordinate_location(), buffer, settings.specification())?;

            let handle = gl.create_texture();
            let source = TextureSource::Path(settings.source().to_path_buf());
            self.textures.load(gl, handle, source, settings.status_handle())?;
            texture = Some(handle);
        }

        gl.bind_vertex_array(None)?;
        self.buffers.insert(id, NodeBuffers { vertex_array, texture });
        Ok(())
    }

    /// Render one frame of the branch.
    ///
    /// Does nothing unless the camera is enabled. Otherwise the drawable is
    /// resized to the client size, the camera re-projected, the frame cleared,
    /// world matrices updated from the true scene root and every active mesh
    /// of the branch drawn in hierarchy order.
    pub fn draw_scene(&mut self, scene: &mut Scene, gl: &mut dyn GraphicsContext) -> Result<RenderInfo, EngineError> {
        self.textures.poll(gl)?;

        let entry = scene.component(self.camera).ok_or(SceneError::UnknownComponent)?;
        let camera_node = entry.container();
        let enabled = entry.active && scene.component_as::<Camera>(self.camera).is_some_and(|c| c.enabled);
        if !enabled {
            return Ok(RenderInfo {
                frame: self.frame,
                ..Default::default()
            });
        }

        let (client_width, client_height) = gl.client_size();
        let width = (client_width as f32 * self.pixel_ratio) as u32;
        let height = (client_height as f32 * self.pixel_ratio) as u32;
        if gl.drawable_size() != (width, height) {
            gl.resize_drawable(width, height);
        }

        let camera = scene
            .component_as_mut::<Camera>(self.camera)
            .ok_or(SceneError::UnknownComponent)?;
        camera.fit(width, height);
        let clear_color = camera.clear_color();

        gl.set_viewport(0, 0, width, height);
        gl.clear(clear_color);
        gl.enable(Capability::CullFace);
        gl.enable(Capability::DepthTest);

        let scene_root = scene.root_of(self.root).ok_or(SceneError::UnknownNode)?;
        scene.update_world_matrices(scene_root);

        let camera_world = camera_node
            .map(|node| scene.compute_world_matrix(node))
            .unwrap_or_default();
        let view_projection = scene
            .component_as::<Camera>(self.camera)
            .ok_or(SceneError::UnknownComponent)?
            .view_projection(&camera_world);

        let mut info = RenderInfo::default();
        for id in scene.descendants(self.root) {
            self.draw_node(scene, gl, id, &view_projection, &mut info)?;
        }

        self.frame += 1;
        info.frame = self.frame;
        Ok(info)
    }

    fn draw_node(
        &self,
        scene: &Scene,
        gl: &mut dyn GraphicsContext,
        id: NodeId,
        view_projection: &Matrix4,
        info: &mut RenderInfo,
    ) -> Result<(), EngineError> {
        if !scene.has_active::<Mesh>(id) {
            return Ok(());
        }
        let (Some(mesh), Some(material)) = (scene.get::<Mesh>(id), scene.get::<MaterialComponent>(id)) else {
            return Ok(());
        };
        let Some(buffers) = self.buffers.get(&id) else {
            log::debug!("Node '{}' has no GPU buffers, skipping", scene.name(id).unwrap_or_default());
            return Ok(());
        };
        let material = material.material();

        material.shader().use_program(gl)?;
        gl.bind_vertex_array(Some(buffers.vertex_array))?;
        gl.enable_vertex_attribute(material.position_location())?;
        if let Some(texture) = buffers.texture {
            gl.bind_texture(texture)?;
        }

        let world = scene.world_matrix(id).unwrap_or_default();
        let object = match scene.get::<Pivot>(id).filter(|_| scene.has_active::<Pivot>(id)) {
            Some(pivot) => pivot.matrix().multiply(&world),
            None => world,
        };
        gl.uniform_matrix4(material.matrix_location(), &view_projection.multiply(&object))?;

        // The byte offset is applied by the attribute pointer, so drawing
        // starts at the first vertex it points at.
        let count = mesh.drawn_vertex_count() as u32;
        gl.draw_arrays(0, count)?;
        info.draw_calls += 1;
        info.triangles += count / 3;
        Ok(())
    }

    /// ASCII tree of the rendered branch.
    ///
    /// Indentation follows depth in the whole scene, so a branch below the
    /// scene root is drawn indented.
    pub fn scene_graph_string(&self, scene: &Scene) -> String {
        let mut output = String::from("SceneGraph for this viewport:\n \n");
        output.push_str(scene.name(self.root).unwrap_or_default());
        output.push_str("   => ROOTNODE");

        for id in scene.descendants(self.root).into_iter().skip(1) {
            output.push('\n');
            let depth = scene.depth(id);
            if depth > 1 {
                output.push('|');
                for _ in 1..depth {
                    output.push_str("   ");
                }
            }
            output.push_str("'--");
            output.push_str(scene.name(id).unwrap_or_default());
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BufferHandle, GlCommand, RecordingContext};
    use crate::geometry::BufferSpecification;
    use crate::material::{TextureShader, ShaderDefinition, TextureStatus};
    use crate::math::Vector3;
    use crate::scene::LocalTransform;

    struct Fixture {
        scene: Scene,
        assets: AssetManager,
        gl: RecordingContext,
        camera: ComponentId,
    }

    fn fixture() -> Fixture {
        let mut scene = Scene::new();
        let mut assets = AssetManager::new();
        let camera_node = scene.create_node(&mut assets, "camera").unwrap();
        scene
            .attach(camera_node, Transform::from_translation(Vector3::new(0.0, 0.0, 10.0)))
            .unwrap();
        let camera = scene.attach(camera_node, Camera::new()).unwrap();
        Fixture {
            scene,
            assets,
            gl: RecordingContext::new(640, 480),
            camera,
        }
    }

    fn viewport(f: &mut Fixture, root: NodeId) -> SharedViewport {
        Viewport::new("main", root, f.camera, &mut f.scene, &mut f.assets, &mut f.gl).unwrap()
    }

    #[test]
    fn test_single_mesh_draw_call() {
        let mut f = fixture();
        let cube = f.scene.create_node(&mut f.assets, "cube").unwrap();
        let mut transform = Transform::new();
        transform.translate(Vector3::new(1.0, 2.0, -3.0));
        transform.rotate_y(30.0);
        f.scene.attach(cube, transform).unwrap();
        f.scene.attach(cube, Mesh::cube(1.0, 1.0, 1.0)).unwrap();
        let material = Material::standard(&mut f.gl, Vector3::new(1.0, 0.0, 0.0)).unwrap();
        let material = f.assets.add_material(material).unwrap();
        f.scene.attach(cube, MaterialComponent::new(material)).unwrap();

        let viewport = viewport(&mut f, cube);
        f.gl.take_commands();
        let info = viewport.borrow_mut().draw_scene(&mut f.scene, &mut f.gl).unwrap();

        assert_eq!(info, RenderInfo { draw_calls: 1, triangles: 12, frame: 1 });
        assert_eq!(f.gl.draw_calls(), vec![(0, 36)]);

        let projection = Matrix4::perspective(640.0 / 480.0, 45.0, 1.0, 2000.0);
        let view = Matrix4::translation(Vector3::new(0.0, 0.0, 10.0)).inverse();
        let world = Matrix4::translation(Vector3::new(1.0, 2.0, -3.0)).multiply(&Matrix4::rotation_y(30.0));
        let expected = projection.multiply(&view).multiply(&world);
        let uploaded = f.gl.uploaded_matrices();
        assert_eq!(uploaded.len(), 1);
        assert!(uploaded[0].approx_eq(&expected, 1e-5));
    }

    #[test]
    fn test_frame_setup_order() {
        let mut f = fixture();
        let root = f.scene.create_node(&mut f.assets, "root").unwrap();
        let viewport = viewport(&mut f, root);
        f.gl.take_commands();
        viewport.borrow_mut().draw_scene(&mut f.scene, &mut f.gl).unwrap();
        assert_eq!(
            f.gl.commands(),
            &[
                GlCommand::SetViewport { x: 0, y: 0, width: 640, height: 480 },
                GlCommand::Clear([0.0, 0.0, 0.0, 1.0]),
                GlCommand::Enable(Capability::CullFace),
                GlCommand::Enable(Capability::DepthTest),
            ]
        );
    }

    #[test]
    fn test_auto_heal_and_buffers() {
        let mut f = fixture();
        let root = f.scene.create_node(&mut f.assets, "root").unwrap();
        let child = f.scene.create_node(&mut f.assets, "child").unwrap();
        f.scene.append_child(root, child).unwrap();
        f.scene.attach(child, Mesh::cube(1.0, 1.0, 1.0)).unwrap();

        viewport(&mut f, root);
        assert!(f.scene.get::<Transform>(root).is_some());
        assert!(f.scene.get::<Transform>(child).is_some());
        assert!(f.scene.get::<MaterialComponent>(root).is_none());
        let material = f.scene.get::<MaterialComponent>(child).unwrap();
        assert_eq!(material.material().name(), STANDARD_MATERIAL);
        assert!(f.assets.material(STANDARD_MATERIAL).is_some());

        let buffers = f
            .gl
            .commands()
            .iter()
            .filter(|c| matches!(c, GlCommand::BufferData { .. }))
            .count();
        assert_eq!(buffers, 2);
        assert!(f.gl.commands().contains(&GlCommand::BufferData {
            buffer: BufferHandle(0),
            len: 36 * 3 * 4
        }));
    }

    #[test]
    fn test_disabled_camera_draws_nothing() {
        let mut f = fixture();
        let cube = f.scene.create_node(&mut f.assets, "cube").unwrap();
        f.scene.attach(cube, Mesh::cube(1.0, 1.0, 1.0)).unwrap();
        let viewport = viewport(&mut f, cube);
        f.scene.component_as_mut::<Camera>(f.camera).unwrap().enabled = false;
        f.gl.take_commands();

        let info = viewport.borrow_mut().draw_scene(&mut f.scene, &mut f.gl).unwrap();
        assert_eq!(info, RenderInfo::default());
        assert!(f.gl.commands().is_empty());
    }

    #[test]
    fn test_resize_refits_camera() {
        let mut f = fixture();
        let root = f.scene.create_node(&mut f.assets, "root").unwrap();
        let viewport = viewport(&mut f, root);
        f.gl.set_client_size(200, 100);
        viewport.borrow_mut().set_pixel_ratio(2.0);
        viewport.borrow_mut().draw_scene(&mut f.scene, &mut f.gl).unwrap();

        assert!(f.gl.commands().contains(&GlCommand::ResizeDrawable { width: 400, height: 200 }));
        let camera = f.scene.component_as::<Camera>(f.camera).unwrap();
        let expected = Matrix4::perspective(2.0, 45.0, 1.0, 2000.0);
        assert!(camera.projection_matrix().approx_eq(&expected, 1e-6));
    }

    #[test]
    fn test_children_draw_in_order_with_pivot() {
        let mut f = fixture();
        let root = f.scene.create_node(&mut f.assets, "root").unwrap();
        let a = f.scene.create_node(&mut f.assets, "a").unwrap();
        let b = f.scene.create_node(&mut f.assets, "b").unwrap();
        f.scene.append_child(root, a).unwrap();
        f.scene.append_child(a, b).unwrap();
        f.scene.attach(a, Transform::from_translation(Vector3::new(5.0, 0.0, 0.0))).unwrap();
        f.scene.attach(a, Mesh::new(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]).unwrap()).unwrap();
        f.scene.attach(a, Pivot::from_matrix(Matrix4::scaling(Vector3::splat(2.0)))).unwrap();
        f.scene.attach(b, Mesh::cube(1.0, 1.0, 1.0)).unwrap();

        let viewport = viewport(&mut f, root);
        f.gl.take_commands();
        viewport.borrow_mut().draw_scene(&mut f.scene, &mut f.gl).unwrap();
        assert_eq!(f.gl.draw_calls(), vec![(0, 3), (0, 36)]);

        let camera = f.scene.component_as::<Camera>(f.camera).unwrap();
        let camera_world = Matrix4::translation(Vector3::new(0.0, 0.0, 10.0));
        let vp = camera.view_projection(&camera_world);
        let a_world = Matrix4::translation(Vector3::new(5.0, 0.0, 0.0));
        let uploaded = f.gl.uploaded_matrices();
        let a_expected = vp.multiply(&Matrix4::scaling(Vector3::splat(2.0)).multiply(&a_world));
        assert!(uploaded[0].approx_eq(&a_expected, 1e-5));
        // The pivot does not reach the child.
        assert!(uploaded[1].approx_eq(&vp.multiply(&a_world), 1e-5));
    }

    #[test]
    fn test_inactive_mesh_is_skipped() {
        let mut f = fixture();
        let cube = f.scene.create_node(&mut f.assets, "cube").unwrap();
        let mesh = f.scene.attach(cube, Mesh::cube(1.0, 1.0, 1.0)).unwrap();
        let viewport = viewport(&mut f, cube);
        f.scene.set_active(mesh, false).unwrap();
        let info = viewport.borrow_mut().draw_scene(&mut f.scene, &mut f.gl).unwrap();
        assert_eq!(info.draw_calls, 0);
        assert!(f.gl.draw_calls().is_empty());
    }

    #[test]
    fn test_world_update_starts_at_scene_root() {
        let mut f = fixture();
        let world = f.scene.create_node(&mut f.assets, "world").unwrap();
        let branch = f.scene.create_node(&mut f.assets, "branch").unwrap();
        f.scene.append_child(world, branch).unwrap();
        f.scene.attach(world, Transform::from_translation(Vector3::new(0.0, 3.0, 0.0))).unwrap();
        f.scene.attach(branch, Mesh::cube(1.0, 1.0, 1.0)).unwrap();

        let viewport = viewport(&mut f, branch);
        viewport.borrow_mut().draw_scene(&mut f.scene, &mut f.gl).unwrap();
        let position = f.scene.world_matrix(branch).unwrap().translation_part();
        assert!(position.approx_eq(&Vector3::new(0.0, 3.0, 0.0), 1e-6));
        assert_eq!(f.gl.draw_calls().len(), 1);
    }

    #[test]
    fn test_set_root_initializes_new_branch() {
        let mut f = fixture();
        let first = f.scene.create_node(&mut f.assets, "first").unwrap();
        let second = f.scene.create_node(&mut f.assets, "second").unwrap();
        f.scene.attach(second, Mesh::cube(1.0, 1.0, 1.0)).unwrap();

        let viewport = viewport(&mut f, first);
        assert!(f.scene.get::<MaterialComponent>(second).is_none());
        viewport
            .borrow_mut()
            .set_root(second, &mut f.scene, &mut f.assets, &mut f.gl)
            .unwrap();
        assert!(f.scene.get::<MaterialComponent>(second).is_some());
        let info = viewport.borrow_mut().draw_scene(&mut f.scene, &mut f.gl).unwrap();
        assert_eq!(info.draw_calls, 1);
    }

    #[test]
    fn test_textured_mesh_starts_loading() {
        let mut f = fixture();
        let mut material = Material::new("crate", TextureShader::compile(&mut f.gl).unwrap(), Vector3::ONE).unwrap();
        material.add_texture("/missing/crate.png").unwrap();
        let material = f.assets.add_material(material).unwrap();
        let cube = f.scene.create_node(&mut f.assets, "cube").unwrap();
        f.scene.attach(cube, Mesh::cube(1.0, 1.0, 1.0)).unwrap();
        f.scene.attach(cube, MaterialComponent::new(Arc::clone(&material))).unwrap();

        let viewport = viewport(&mut f, cube);
        let commands = f.gl.commands().to_vec();
        assert!(commands.contains(&GlCommand::EnableVertexAttribute(2)));
        assert!(commands.contains(&GlCommand::BufferData { buffer: BufferHandle(2), len: 36 * 2 * 4 }));
        assert!(commands
            .iter()
            .any(|c| matches!(c, GlCommand::TextureImage { width: 1, height: 1, .. })));
        assert_eq!(material.texture_status(), Some(TextureStatus::Pending));

        f.gl.take_commands();
        viewport.borrow_mut().draw_scene(&mut f.scene, &mut f.gl).unwrap();
        assert!(f.gl.commands().iter().any(|c| matches!(c, GlCommand::BindTexture(_))));
    }

    #[test]
    fn test_recreated_node_gets_fresh_buffers() {
        let mut f = fixture();
        let root = f.scene.create_node(&mut f.assets, "root").unwrap();
        let old = f.scene.create_node(&mut f.assets, "a").unwrap();
        f.scene.append_child(root, old).unwrap();
        f.scene.attach(old, Mesh::new(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]).unwrap()).unwrap();
        let viewport = viewport(&mut f, root);

        f.scene.destroy_node(&mut f.assets, old).unwrap();
        let new = f.scene.create_node(&mut f.assets, "a").unwrap();
        f.scene.append_child(root, new).unwrap();
        f.scene.attach(new, Mesh::cube(1.0, 1.0, 1.0)).unwrap();
        f.gl.take_commands();
        viewport
            .borrow_mut()
            .initialize_nodes(&mut f.scene, &mut f.assets, &mut f.gl)
            .unwrap();

        assert!(f.scene.get::<MaterialComponent>(new).is_some());
        assert!(f.gl.commands().contains(&GlCommand::CreateVertexArray(VertexArrayHandle(1))));
        assert!(f.gl.commands().contains(&GlCommand::BufferData {
            buffer: BufferHandle(2),
            len: 36 * 3 * 4
        }));

        f.gl.take_commands();
        viewport.borrow_mut().draw_scene(&mut f.scene, &mut f.gl).unwrap();
        assert!(f.gl.commands().contains(&GlCommand::BindVertexArray(Some(VertexArrayHandle(1)))));
        assert_eq!(f.gl.draw_calls(), vec![(0, 36)]);
    }

    #[test]
    fn test_stream_offset_applied_once() {
        let mut f = fixture();
        let node = f.scene.create_node(&mut f.assets, "offset").unwrap();
        let specification = BufferSpecification {
            offset: 12,
            ..BufferSpecification::positions()
        };
        let positions = vec![0.0; 18];
        f.scene
            .attach(node, Mesh::with_specification(positions, specification).unwrap())
            .unwrap();

        let viewport = viewport(&mut f, node);
        f.gl.take_commands();
        let info = viewport.borrow_mut().draw_scene(&mut f.scene, &mut f.gl).unwrap();
        assert_eq!(f.gl.draw_calls(), vec![(0, 5)]);
        assert_eq!(info.triangles, 1);
    }

    #[test]
    fn test_duplicate_viewport_name() {
        let mut f = fixture();
        let root = f.scene.create_node(&mut f.assets, "root").unwrap();
        viewport(&mut f, root);
        let err = Viewport::new("main", root, f.camera, &mut f.scene, &mut f.assets, &mut f.gl).unwrap_err();
        assert!(matches!(err, EngineError::Scene(SceneError::DuplicateAsset { kind: AssetKind::Viewport, .. })));
        assert!(f.assets.viewport("main").is_some());
    }

    #[test]
    fn test_camera_must_be_camera() {
        let mut f = fixture();
        let root = f.scene.create_node(&mut f.assets, "root").unwrap();
        let transform = f.scene.attach(root, Transform::new()).unwrap();
        let err = Viewport::new("main", root, transform, &mut f.scene, &mut f.assets, &mut f.gl).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Scene(SceneError::WrongComponentKind { expected: ComponentKind::Camera, .. })
        ));
    }

    #[test]
    fn test_scene_graph_string() {
        let mut f = fixture();
        let root = f.scene.create_node(&mut f.assets, "root").unwrap();
        let a = f.scene.create_node(&mut f.assets, "a").unwrap();
        let b = f.scene.create_node(&mut f.assets, "b").unwrap();
        let c = f.scene.create_node(&mut f.assets, "c").unwrap();
        f.scene.append_child(root, a).unwrap();
        f.scene.append_child(a, b).unwrap();
        f.scene.append_child(root, c).unwrap();

        let viewport = viewport(&mut f, root);
        let expected = "SceneGraph for this viewport:\n \nroot   => ROOTNODE\n'--a\n|   '--b\n'--c";
        assert_eq!(viewport.borrow().scene_graph_string(&f.scene), expected);
    }
}
