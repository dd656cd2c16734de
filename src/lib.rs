//! # Fudge - Retained-Mode Scene Graph Renderer
//!
//! Fudge renders a tree of named nodes through wgpu. Nodes carry components
//! (transform, pivot, mesh, material, camera); a viewport walks a branch of
//! the tree each frame, composes world matrices and issues one draw call per
//! mesh.
//!
//! ## Features
//!
//! - **Math**: column-major 4x4 matrices and 3-vectors, angles in degrees
//! - **Core**: the graphics boundary, wgpu bring-up, frame loop and engine
//! - **Scene**: node/component arena with name registries and JSON serialization
//! - **Material**: WGSL shaders, base colors and asynchronously loaded textures
//!
//! ## Example
//!
//! ```ignore
//! use fudge::prelude::*;
//!
//! let mut engine = EngineBuilder::new().build(window, 800, 600).await?;
//! let (_, camera) = engine.create_camera("camera")?;
//! let cube = engine.create_node("cube")?;
//! engine.scene_mut().attach(cube, Mesh::cube(1.0, 1.0, 1.0))?;
//! engine.create_viewport("main", cube, camera)?;
//!
//! engine.frame_loop().start();
//! engine.frame(timestamp)?;
//! ```

#![warn(missing_docs)]

#[cfg(feature = "web")]
use wasm_bindgen::prelude::*;

pub mod camera;
pub mod core;
pub mod geometry;
pub mod material;
pub mod math;
pub mod scene;
pub mod viewport;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub mod web;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::camera::*;
    pub use crate::core::*;
    pub use crate::geometry::*;
    pub use crate::material::*;
    pub use crate::math::*;
    pub use crate::scene::*;
    pub use crate::viewport::*;
}

/// Initialize the engine for WASM environments.
/// Sets up panic hooks for better error messages in the browser console.
#[cfg(feature = "web")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Engine version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const NAME: &str = "Fudge";
