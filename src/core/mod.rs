//! # Core Module
//!
//! The graphics boundary and engine bring-up: the [`GraphicsContext`] trait
//! with its headless and wgpu implementations, shader reflection, the frame
//! loop and the [`Engine`] that ties a scene to a surface.

mod context;
mod engine;
mod frame_loop;
mod graphics;
mod recording;
mod reflect;
mod wgpu_graphics;

pub use context::{Context, ContextError};
pub use engine::{Engine, EngineBuilder, EngineError};
pub use frame_loop::{FrameEvent, FrameLoop, ListenerId};
pub use graphics::{
    AttributeLocation, BufferHandle, Capability, GraphicsContext, ProgramHandle, ProgramInfo, TextureHandle,
    UniformLocation, VertexArrayHandle,
};
pub use recording::{GlCommand, RecordingContext};
pub use reflect::{FRAGMENT_ENTRY, VERTEX_ENTRY};
pub use wgpu_graphics::WgpuGraphics;

use crate::camera::ProjectionDefaults;
use crate::material::STANDARD_MATERIAL_COLOR;
use crate::math::Vector3;

/// Render configuration options.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Power preference for GPU selection.
    pub power_preference: wgpu::PowerPreference,
    /// Present mode (vsync).
    pub present_mode: wgpu::PresentMode,
    /// Request a premultiplied-alpha surface so disabled camera backgrounds show through.
    pub alpha: bool,
    /// Multiplier applied to the client size when sizing the drawable.
    pub pixel_ratio: f32,
    /// Projection parameters for new cameras.
    pub projection: ProjectionDefaults,
    /// Clear color of new cameras.
    pub background_color: Vector3,
    /// Base color of the auto-attached `standardMaterial`.
    pub standard_material_color: Vector3,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha: false,
            pixel_ratio: 1.0,
            projection: ProjectionDefaults::default(),
            background_color: Vector3::ZERO,
            standard_material_color: STANDARD_MATERIAL_COLOR,
        }
    }
}
