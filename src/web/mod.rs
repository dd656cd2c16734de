//! Web bindings for the Fudge engine.
//!
//! Attaches an [`Engine`] to a canvas element and exposes a small
//! JavaScript-friendly API via wasm-bindgen. The host drives frames from
//! `requestAnimationFrame`.

use wasm_bindgen::prelude::*;
use web_sys::{window, HtmlCanvasElement};

use crate::core::{ContextError, Engine, EngineBuilder, EngineError};
use crate::math::Vector3;
use crate::scene::{LocalTransform, Mesh, NodeId, Transform};

const ROOT_NODE: &str = "root";
const CAMERA_NODE: &str = "camera";
const MAIN_VIEWPORT: &str = "main";

fn js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Look up a canvas element by id.
pub fn canvas_by_id(canvas_id: &str) -> Result<HtmlCanvasElement, ContextError> {
    let not_found = || ContextError::CanvasNotFound(canvas_id.to_owned());
    window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(canvas_id))
        .ok_or_else(not_found)?
        .dyn_into()
        .map_err(|_| not_found())
}

/// Render statistics exposed to JavaScript.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy)]
pub struct RenderStats {
    /// Number of draw calls.
    pub draw_calls: u32,
    /// Number of triangles rendered.
    pub triangles: u32,
    /// Frames rendered so far.
    pub frame: u64,
    /// Smoothed frames per second.
    pub fps: f64,
}

/// An engine bound to one canvas, rendering a `root` node through a
/// `camera` node in the `main` viewport.
#[wasm_bindgen]
pub struct FudgeApp {
    canvas: HtmlCanvasElement,
    engine: Engine,
    root: NodeId,
    camera_node: NodeId,
}

#[wasm_bindgen]
impl FudgeApp {
    /// Attach to the canvas with id `canvas_id`.
    #[wasm_bindgen]
    pub async fn new(canvas_id: &str) -> Result<FudgeApp, JsValue> {
        let canvas = canvas_by_id(canvas_id).map_err(js_error)?;
        let ratio = window().map_or(1.0, |w| w.device_pixel_ratio()) as f32;
        let width = (canvas.client_width() as f32 * ratio) as u32;
        let height = (canvas.client_height() as f32 * ratio) as u32;
        canvas.set_width(width.max(1));
        canvas.set_height(height.max(1));

        let surface = wgpu::SurfaceTarget::Canvas(canvas.clone());
        let mut engine = EngineBuilder::new()
            .pixel_ratio(ratio)
            .build(surface, width.max(1), height.max(1))
            .await
            .map_err(js_error)?;
        engine.resize(canvas.client_width() as u32, canvas.client_height() as u32);

        let (root, camera_node) = Self::create_scene(&mut engine).map_err(js_error)?;
        engine.frame_loop().start();
        log::info!("Attached to canvas '{canvas_id}' at {width}x{height}");

        Ok(Self {
            canvas,
            engine,
            root,
            camera_node,
        })
    }

    fn create_scene(engine: &mut Engine) -> Result<(NodeId, NodeId), EngineError> {
        let root = engine.create_node(ROOT_NODE)?;
        let (camera_node, camera) = engine.create_camera(CAMERA_NODE)?;
        if let Some(transform) = engine.scene_mut().get_mut::<Transform>(camera_node) {
            transform.translate_z(10.0);
        }
        engine.create_viewport(MAIN_VIEWPORT, root, camera)?;
        Ok((root, camera_node))
    }

    /// Add a box below the root node at the given position.
    #[wasm_bindgen(js_name = addCube)]
    pub fn add_cube(&mut self, name: &str, size: f32, x: f32, y: f32, z: f32) -> Result<(), JsValue> {
        self.try_add_cube(name, size, Vector3::new(x, y, z)).map_err(js_error)
    }

    fn try_add_cube(&mut self, name: &str, size: f32, position: Vector3) -> Result<(), EngineError> {
        let node = self.engine.create_node(name)?;
        let scene = self.engine.scene_mut();
        scene.append_child(self.root, node)?;
        scene.attach(node, Transform::from_translation(position))?;
        scene.attach(node, Mesh::cube(size, size, size))?;
        self.engine.refresh_viewport(MAIN_VIEWPORT)
    }

    /// Rotate a node about its local Y axis.
    #[wasm_bindgen(js_name = rotateY)]
    pub fn rotate_y(&mut self, name: &str, degrees: f32) {
        let Some(node) = self.engine.assets().node(name) else {
            return;
        };
        if let Some(transform) = self.engine.scene_mut().get_mut::<Transform>(node) {
            transform.rotate_y(degrees);
        }
    }

    /// Move the camera to `(x, y, z)` looking at the scene origin.
    #[wasm_bindgen(js_name = lookFrom)]
    pub fn look_from(&mut self, x: f32, y: f32, z: f32) {
        if let Some(transform) = self.engine.scene_mut().get_mut::<Transform>(self.camera_node) {
            transform.reset();
            transform.translate(Vector3::new(x, y, z));
            transform.look_at(Vector3::ZERO, Vector3::UP);
        }
    }

    /// Call on canvas resize.
    pub fn resize(&mut self) {
        self.engine
            .resize(self.canvas.client_width() as u32, self.canvas.client_height() as u32);
    }

    /// Render one frame at the `requestAnimationFrame` timestamp.
    pub fn frame(&mut self, timestamp: f64) -> Result<RenderStats, JsValue> {
        self.engine.frame(timestamp).map_err(js_error)?;
        Ok(self.stats())
    }

    /// Resume rendering.
    pub fn start(&mut self) {
        self.engine.frame_loop().start();
    }

    /// Pause rendering; frames are ignored until restarted.
    pub fn stop(&mut self) {
        self.engine.frame_loop().stop();
    }

    /// Statistics of the last frame.
    pub fn stats(&mut self) -> RenderStats {
        let info = self.engine.info();
        RenderStats {
            draw_calls: info.draw_calls,
            triangles: info.triangles,
            frame: info.frame,
            fps: self.engine.frame_loop().fps_average(),
        }
    }

    /// ASCII dump of the rendered branch.
    #[wasm_bindgen(js_name = sceneGraph)]
    pub fn scene_graph(&self) -> String {
        self.engine
            .viewport(MAIN_VIEWPORT)
            .map(|viewport| viewport.borrow().scene_graph_string(self.engine.scene()))
            .unwrap_or_default()
    }
}
