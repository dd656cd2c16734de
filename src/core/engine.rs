//! Main engine entry point.

use super::{ContextError, FrameEvent, FrameLoop, GraphicsContext, RenderConfig, WgpuGraphics};
use crate::camera::{Camera, ProjectionDefaults};
use crate::material::Material;
use crate::math::Vector3;
use crate::scene::{AssetKind, AssetManager, ComponentId, NodeId, Scene, SceneError, Transform};
use crate::viewport::{RenderInfo, SharedViewport, Viewport};
use thiserror::Error;

/// Errors raised while building or rendering scenes.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Scene graph or registry failure.
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Graphics failure.
    #[error(transparent)]
    Context(#[from] ContextError),
}

/// The main Fudge engine.
///
/// Owns the graphics context, the scene arena, the asset registries and the
/// frame loop. The `standardMaterial` is registered on construction.
pub struct Engine<G: GraphicsContext = WgpuGraphics> {
    graphics: G,
    scene: Scene,
    assets: AssetManager,
    frame_loop: FrameLoop,
    config: RenderConfig,
    info: RenderInfo,
}

impl Engine<WgpuGraphics> {
    /// Create an engine on a window or canvas with the default configuration.
    pub async fn new<W>(window: W, width: u32, height: u32) -> Result<Self, EngineError>
    where
        W: Into<wgpu::SurfaceTarget<'static>>,
    {
        EngineBuilder::new().build(window, width, height).await
    }

    /// Handle a host resize of the displayed surface. The drawable follows on
    /// the next rendered frame.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.graphics.set_client_size(width, height);
    }

    /// Get the device.
    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.graphics.context().device
    }

    /// Get the queue.
    #[inline]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.graphics.context().queue
    }
}

impl<G: GraphicsContext> Engine<G> {
    /// Create an engine on an existing graphics context.
    pub fn with_graphics(mut graphics: G, config: RenderConfig) -> Result<Self, EngineError> {
        let mut assets = AssetManager::new();
        let material = Material::standard(&mut graphics, config.standard_material_color)?;
        assets.add_material(material)?;
        log::debug!("Engine started");

        Ok(Self {
            graphics,
            scene: Scene::new(),
            assets,
            frame_loop: FrameLoop::new(),
            config,
            info: RenderInfo::default(),
        })
    }

    /// The scene arena.
    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable scene arena.
    #[inline]
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Asset registries.
    #[inline]
    pub fn assets(&self) -> &AssetManager {
        &self.assets
    }

    /// Mutable asset registries.
    #[inline]
    pub fn assets_mut(&mut self) -> &mut AssetManager {
        &mut self.assets
    }

    /// Scene and registries borrowed together.
    pub fn scene_and_assets(&mut self) -> (&mut Scene, &mut AssetManager) {
        (&mut self.scene, &mut self.assets)
    }

    /// The graphics context.
    #[inline]
    pub fn graphics(&self) -> &G {
        &self.graphics
    }

    /// Mutable graphics context, e.g. for compiling shaders.
    #[inline]
    pub fn graphics_mut(&mut self) -> &mut G {
        &mut self.graphics
    }

    /// The frame loop.
    #[inline]
    pub fn frame_loop(&mut self) -> &mut FrameLoop {
        &mut self.frame_loop
    }

    /// Active configuration.
    #[inline]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Statistics summed over the viewports of the last frame.
    #[inline]
    pub fn info(&self) -> RenderInfo {
        self.info
    }

    /// Create a named root node.
    pub fn create_node(&mut self, name: impl Into<String>) -> Result<NodeId, EngineError> {
        Ok(self.scene.create_node(&mut self.assets, name)?)
    }

    /// Create a node carrying a [`Transform`] and a [`Camera`] built from
    /// the configured projection and background color.
    pub fn create_camera(&mut self, name: impl Into<String>) -> Result<(NodeId, ComponentId), EngineError> {
        let node = self.create_node(name)?;
        self.scene.attach(node, Transform::new())?;
        let mut camera = Camera::with_defaults(self.config.projection);
        camera.background_color = self.config.background_color;
        let camera = self.scene.attach(node, camera)?;
        Ok((node, camera))
    }

    /// Create and register a viewport rendering `root` through `camera`.
    pub fn create_viewport(
        &mut self,
        name: impl Into<String>,
        root: NodeId,
        camera: ComponentId,
    ) -> Result<SharedViewport, EngineError> {
        let viewport = Viewport::new(name, root, camera, &mut self.scene, &mut self.assets, &mut self.graphics)?;
        viewport.borrow_mut().set_pixel_ratio(self.config.pixel_ratio);
        Ok(viewport)
    }

    /// A registered viewport.
    pub fn viewport(&self, name: &str) -> Option<SharedViewport> {
        self.assets.viewport(name)
    }

    /// Re-initialize the nodes of a viewport's branch, e.g. after adding meshes.
    pub fn refresh_viewport(&mut self, name: &str) -> Result<(), EngineError> {
        let viewport = self.require_viewport(name)?;
        let mut viewport = viewport.borrow_mut();
        viewport.initialize_nodes(&mut self.scene, &mut self.assets, &mut self.graphics)
    }

    /// Draw one viewport without presenting.
    pub fn render(&mut self, name: &str) -> Result<RenderInfo, EngineError> {
        let viewport = self.require_viewport(name)?;
        let info = viewport.borrow_mut().draw_scene(&mut self.scene, &mut self.graphics)?;
        Ok(info)
    }

    /// Draw every registered viewport in registration order and present.
    pub fn render_all(&mut self) -> Result<RenderInfo, EngineError> {
        let viewports: Vec<SharedViewport> = self
            .assets
            .viewports
            .names()
            .filter_map(|name| self.assets.viewport(name))
            .collect();

        let mut total = RenderInfo::default();
        for viewport in &viewports {
            let info = viewport.borrow_mut().draw_scene(&mut self.scene, &mut self.graphics)?;
            total.draw_calls += info.draw_calls;
            total.triangles += info.triangles;
            total.frame = total.frame.max(info.frame);
        }
        self.graphics.present()?;
        self.info = total;
        Ok(total)
    }

    /// Advance the frame loop to `timestamp` (milliseconds) and, if it is
    /// running, render all viewports.
    pub fn frame(&mut self, timestamp: f64) -> Result<Option<FrameEvent>, EngineError> {
        let Some(event) = self.frame_loop.tick(timestamp) else {
            return Ok(None);
        };
        self.render_all()?;
        Ok(Some(event))
    }

    /// Remove a viewport from the registry.
    pub fn remove_viewport(&mut self, name: &str) -> Result<SharedViewport, EngineError> {
        Ok(self.assets.viewports.delete(name)?)
    }

    fn require_viewport(&self, name: &str) -> Result<SharedViewport, SceneError> {
        self.assets.viewport(name).ok_or_else(|| SceneError::AssetNotFound {
            kind: AssetKind::Viewport,
            name: name.to_owned(),
        })
    }
}

impl<G: GraphicsContext> std::fmt::Debug for Engine<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("nodes", &self.scene.node_count())
            .field("viewports", &self.assets.viewports.len())
            .field("info", &self.info)
            .finish()
    }
}

/// Builder for configuring the engine.
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    config: RenderConfig,
}

impl EngineBuilder {
    /// Create a new engine builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Set power preference.
    pub fn power_preference(mut self, preference: wgpu::PowerPreference) -> Self {
        self.config.power_preference = preference;
        self
    }

    /// Set present mode.
    pub fn present_mode(mut self, mode: wgpu::PresentMode) -> Self {
        self.config.present_mode = mode;
        self
    }

    /// Set alpha blending.
    pub fn alpha(mut self, enabled: bool) -> Self {
        self.config.alpha = enabled;
        self
    }

    /// Set the device pixel ratio applied by new viewports.
    pub fn pixel_ratio(mut self, ratio: f32) -> Self {
        self.config.pixel_ratio = ratio;
        self
    }

    /// Set projection parameters for new cameras.
    pub fn projection(mut self, projection: ProjectionDefaults) -> Self {
        self.config.projection = projection;
        self
    }

    /// Set the clear color of new cameras.
    pub fn background_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.config.background_color = Vector3::new(r, g, b);
        self
    }

    /// Set the base color of the `standardMaterial`.
    pub fn standard_material_color(mut self, color: Vector3) -> Self {
        self.config.standard_material_color = color;
        self
    }

    /// The configuration built so far.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Build the engine on a window or canvas.
    pub async fn build<W>(self, window: W, width: u32, height: u32) -> Result<Engine, EngineError>
    where
        W: Into<wgpu::SurfaceTarget<'static>>,
    {
        let context = super::Context::new(window, width, height, &self.config).await?;
        let graphics = WgpuGraphics::new(context);
        Engine::with_graphics(graphics, self.config)
    }

    /// Build the engine on an existing graphics context.
    pub fn build_with<G: GraphicsContext>(self, graphics: G) -> Result<Engine<G>, EngineError> {
        Engine::with_graphics(graphics, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GlCommand, RecordingContext};
    use crate::material::STANDARD_MATERIAL;
    use crate::scene::{LocalTransform, Mesh, MaterialComponent};

    fn engine() -> Engine<RecordingContext> {
        EngineBuilder::new()
            .background_color(0.2, 0.3, 0.4)
            .standard_material_color(Vector3::new(0.5, 0.5, 0.5))
            .build_with(RecordingContext::new(320, 240))
            .unwrap()
    }

    #[test]
    fn test_standard_material_registered() {
        let engine = engine();
        let material = engine.assets().material(STANDARD_MATERIAL).unwrap();
        assert_eq!(material.color(), Vector3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_camera_uses_config() {
        let mut engine = engine();
        let (_, camera) = engine.create_camera("camera").unwrap();
        let camera = engine.scene().component_as::<Camera>(camera).unwrap();
        assert_eq!(camera.background_color, Vector3::new(0.2, 0.3, 0.4));
        assert_eq!(camera.field_of_view(), 45.0);
    }

    #[test]
    fn test_frame_renders_and_presents() {
        let mut engine = engine();
        let (camera_node, camera) = engine.create_camera("camera").unwrap();
        engine
            .scene_mut()
            .get_mut::<Transform>(camera_node)
            .unwrap()
            .translate_z(5.0);
        let cube = engine.create_node("cube").unwrap();
        engine.scene_mut().attach(cube, Mesh::cube(1.0, 1.0, 1.0)).unwrap();
        engine.create_viewport("main", cube, camera).unwrap();

        let material = engine.scene().get::<MaterialComponent>(cube).unwrap();
        assert_eq!(material.material().name(), STANDARD_MATERIAL);

        assert_eq!(engine.frame(0.0).unwrap(), None);
        engine.frame_loop().start();
        engine.graphics_mut().take_commands();
        let event = engine.frame(16.0).unwrap().unwrap();
        assert_eq!(event.frame, 1);
        assert_eq!(engine.info(), RenderInfo { draw_calls: 1, triangles: 12, frame: 1 });
        assert_eq!(engine.graphics().commands().last(), Some(&GlCommand::Present));
        assert!(engine.graphics().commands().contains(&GlCommand::Clear([0.2, 0.3, 0.4, 1.0])));
    }

    #[test]
    fn test_missing_viewport() {
        let mut engine = engine();
        let err = engine.render("nowhere").unwrap_err();
        assert!(matches!(
            err,
            EngineError::Scene(SceneError::AssetNotFound { kind: AssetKind::Viewport, .. })
        ));
    }

    #[test]
    fn test_refresh_picks_up_new_meshes() {
        let mut engine = engine();
        let (_, camera) = engine.create_camera("camera").unwrap();
        let root = engine.create_node("root").unwrap();
        engine.create_viewport("main", root, camera).unwrap();

        let child = engine.create_node("child").unwrap();
        let (scene, _) = engine.scene_and_assets();
        scene.append_child(root, child).unwrap();
        scene.attach(child, Mesh::cube(2.0, 2.0, 2.0)).unwrap();
        assert_eq!(engine.render("main").unwrap().draw_calls, 0);

        engine.refresh_viewport("main").unwrap();
        assert_eq!(engine.render("main").unwrap().draw_calls, 1);

        engine.remove_viewport("main").unwrap();
        assert!(engine.viewport("main").is_none());
    }
}
