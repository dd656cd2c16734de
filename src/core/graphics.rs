//! The immediate-mode graphics boundary the viewport draws through.
//!
//! Resources are addressed by small copyable handles. State such as the bound
//! vertex array or the program in use is implicit, as in a GL context: an
//! attribute pointer applies to the currently bound vertex array, a uniform
//! upload applies to the program in use.

use super::ContextError;
use crate::geometry::BufferSpecification;
use crate::math::Matrix4;
use std::collections::HashMap;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            /// Raw index of this handle inside its context.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

handle!(
    /// A vertex data buffer.
    BufferHandle
);
handle!(
    /// A vertex array object: the set of attribute bindings used by one draw.
    VertexArrayHandle
);
handle!(
    /// A 2D RGBA texture.
    TextureHandle
);
handle!(
    /// A compiled shader program.
    ProgramHandle
);

/// Vertex attribute location as declared by `@location(n)` in the shader.
pub type AttributeLocation = u32;

/// Bind group / binding pair of a shader resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation {
    /// Bind group index.
    pub group: u32,
    /// Binding index inside the group.
    pub binding: u32,
}

/// Pipeline features toggled with [`GraphicsContext::enable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Discard back-facing (clockwise) triangles.
    CullFace,
    /// Depth test against a cleared depth buffer.
    DepthTest,
}

/// A compiled program plus its reflected interface.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramInfo {
    /// Program handle.
    pub handle: ProgramHandle,
    /// Vertex inputs by name.
    pub attributes: HashMap<String, AttributeLocation>,
    /// Resource bindings by name.
    pub uniforms: HashMap<String, UniformLocation>,
    /// Whether the fragment stage samples a texture.
    pub samples_texture: bool,
}

/// A GPU context exposing immediate-mode style operations.
///
/// Operations on handles this context did not create fail with
/// [`ContextError::UnknownHandle`].
pub trait GraphicsContext {
    /// Allocate an empty vertex buffer.
    fn create_buffer(&mut self) -> BufferHandle;

    /// Replace the contents of a buffer.
    fn buffer_data(&mut self, buffer: BufferHandle, data: &[u8]) -> Result<(), ContextError>;

    /// Allocate a vertex array object.
    fn create_vertex_array(&mut self) -> VertexArrayHandle;

    /// Bind a vertex array; `None` unbinds.
    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) -> Result<(), ContextError>;

    /// Source attribute `location` of the bound vertex array from `buffer`.
    fn attribute_pointer(
        &mut self,
        location: AttributeLocation,
        buffer: BufferHandle,
        specification: &BufferSpecification,
    ) -> Result<(), ContextError>;

    /// Enable attribute `location` on the bound vertex array.
    fn enable_vertex_attribute(&mut self, location: AttributeLocation) -> Result<(), ContextError>;

    /// Compile and link a WGSL program with `vs_main` / `fs_main` entry points.
    fn compile_program(&mut self, label: &str, source: &str) -> Result<ProgramInfo, ContextError>;

    /// Make `program` current for subsequent uniform uploads and draws.
    fn use_program(&mut self, program: ProgramHandle) -> Result<(), ContextError>;

    /// Upload a 4x4 matrix uniform for the current program.
    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &Matrix4) -> Result<(), ContextError>;

    /// Allocate a texture.
    fn create_texture(&mut self) -> TextureHandle;

    /// Replace a texture's image with tightly packed RGBA8 pixels.
    fn texture_image(&mut self, texture: TextureHandle, width: u32, height: u32, rgba: &[u8]) -> Result<(), ContextError>;

    /// Bind a texture for subsequent draws.
    fn bind_texture(&mut self, texture: TextureHandle) -> Result<(), ContextError>;

    /// Draw `count` vertices of the bound vertex array as a triangle list.
    fn draw_arrays(&mut self, first: u32, count: u32) -> Result<(), ContextError>;

    /// Set the output rectangle in pixels.
    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32);

    /// Clear color and depth for the frame.
    fn clear(&mut self, color: [f32; 4]);

    /// Enable a pipeline capability for subsequent draws.
    fn enable(&mut self, capability: Capability);

    /// Current size of the backing surface.
    fn drawable_size(&self) -> (u32, u32);

    /// Size the host displays the surface at.
    fn client_size(&self) -> (u32, u32);

    /// Resize the backing surface.
    fn resize_drawable(&mut self, width: u32, height: u32);

    /// Finish the frame.
    fn present(&mut self) -> Result<(), ContextError>;
}
