//! Headless graphics context that records every call.

use super::graphics::{
    AttributeLocation, BufferHandle, Capability, GraphicsContext, ProgramHandle, ProgramInfo, TextureHandle,
    UniformLocation, VertexArrayHandle,
};
use super::reflect::reflect;
use super::ContextError;
use crate::geometry::BufferSpecification;
use crate::math::Matrix4;

/// One recorded graphics call.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCommand {
    /// `create_buffer`.
    CreateBuffer(BufferHandle),
    /// `buffer_data`, with the uploaded byte count.
    BufferData {
        /// Target buffer.
        buffer: BufferHandle,
        /// Bytes uploaded.
        len: usize,
    },
    /// `create_vertex_array`.
    CreateVertexArray(VertexArrayHandle),
    /// `bind_vertex_array`.
    BindVertexArray(Option<VertexArrayHandle>),
    /// `attribute_pointer`.
    AttributePointer {
        /// Attribute location.
        location: AttributeLocation,
        /// Source buffer.
        buffer: BufferHandle,
        /// Stream layout.
        specification: BufferSpecification,
    },
    /// `enable_vertex_attribute`.
    EnableVertexAttribute(AttributeLocation),
    /// `compile_program`.
    CompileProgram(ProgramHandle),
    /// `use_program`.
    UseProgram(ProgramHandle),
    /// `uniform_matrix4`.
    UniformMatrix4 {
        /// Uniform location.
        location: UniformLocation,
        /// Uploaded matrix.
        matrix: Matrix4,
    },
    /// `create_texture`.
    CreateTexture(TextureHandle),
    /// `texture_image`.
    TextureImage {
        /// Target texture.
        texture: TextureHandle,
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
    },
    /// `bind_texture`.
    BindTexture(TextureHandle),
    /// `draw_arrays`.
    DrawArrays {
        /// First vertex.
        first: u32,
        /// Vertex count.
        count: u32,
    },
    /// `set_viewport`.
    SetViewport {
        /// Left edge.
        x: u32,
        /// Top edge.
        y: u32,
        /// Width.
        width: u32,
        /// Height.
        height: u32,
    },
    /// `clear`.
    Clear([f32; 4]),
    /// `enable`.
    Enable(Capability),
    /// `resize_drawable`.
    ResizeDrawable {
        /// New width.
        width: u32,
        /// New height.
        height: u32,
    },
    /// `present`.
    Present,
}

/// A [`GraphicsContext`] without a GPU.
///
/// Handles are validated the way a real context would reject them, and every
/// successful call is appended to a command log that tests can inspect.
#[derive(Debug, Default)]
pub struct RecordingContext {
    commands: Vec<GlCommand>,
    buffers: u32,
    vertex_arrays: u32,
    programs: u32,
    textures: u32,
    bound_vertex_array: Option<VertexArrayHandle>,
    current_program: Option<ProgramHandle>,
    drawable: (u32, u32),
    client: (u32, u32),
}

impl RecordingContext {
    /// Create a context whose drawable and client area are `width` x `height`.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            drawable: (width, height),
            client: (width, height),
            ..Default::default()
        }
    }

    /// Simulate the host resizing the displayed surface.
    pub fn set_client_size(&mut self, width: u32, height: u32) {
        self.client = (width, height);
    }

    /// All recorded commands, oldest first.
    pub fn commands(&self) -> &[GlCommand] {
        &self.commands
    }

    /// Drain the command log.
    pub fn take_commands(&mut self) -> Vec<GlCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Recorded draw calls as `(first, count)`.
    pub fn draw_calls(&self) -> Vec<(u32, u32)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                GlCommand::DrawArrays { first, count } => Some((*first, *count)),
                _ => None,
            })
            .collect()
    }

    /// Recorded matrix uploads, in order.
    pub fn uploaded_matrices(&self) -> Vec<Matrix4> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                GlCommand::UniformMatrix4 { matrix, .. } => Some(*matrix),
                _ => None,
            })
            .collect()
    }

    fn check(index: u32, count: u32, kind: &'static str) -> Result<(), ContextError> {
        if index < count {
            Ok(())
        } else {
            Err(ContextError::UnknownHandle(kind))
        }
    }
}

impl GraphicsContext for RecordingContext {
    fn create_buffer(&mut self) -> BufferHandle {
        let handle = BufferHandle(self.buffers);
        self.buffers += 1;
        self.commands.push(GlCommand::CreateBuffer(handle));
        handle
    }

    fn buffer_data(&mut self, buffer: BufferHandle, data: &[u8]) -> Result<(), ContextError> {
        Self::check(buffer.0, self.buffers, "buffer")?;
        self.commands.push(GlCommand::BufferData { buffer, len: data.len() });
        Ok(())
    }

    fn create_vertex_array(&mut self) -> VertexArrayHandle {
        let handle = VertexArrayHandle(self.vertex_arrays);
        self.vertex_arrays += 1;
        self.commands.push(GlCommand::CreateVertexArray(handle));
        handle
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) -> Result<(), ContextError> {
        if let Some(vao) = vertex_array {
            Self::check(vao.0, self.vertex_arrays, "vertex array")?;
        }
        self.bound_vertex_array = vertex_array;
        self.commands.push(GlCommand::BindVertexArray(vertex_array));
        Ok(())
    }

    fn attribute_pointer(
        &mut self,
        location: AttributeLocation,
        buffer: BufferHandle,
        specification: &BufferSpecification,
    ) -> Result<(), ContextError> {
        Self::check(buffer.0, self.buffers, "buffer")?;
        self.bound_vertex_array.ok_or(ContextError::UnknownHandle("vertex array"))?;
        if specification.vertex_format().is_none() {
            return Err(ContextError::UnsupportedVertexFormat {
                size: specification.size,
                data_type: specification.data_type,
                normalize: specification.normalize,
            });
        }
        self.commands.push(GlCommand::AttributePointer {
            location,
            buffer,
            specification: *specification,
        });
        Ok(())
    }

    fn enable_vertex_attribute(&mut self, location: AttributeLocation) -> Result<(), ContextError> {
        self.bound_vertex_array.ok_or(ContextError::UnknownHandle("vertex array"))?;
        self.commands.push(GlCommand::EnableVertexAttribute(location));
        Ok(())
    }

    fn compile_program(&mut self, label: &str, source: &str) -> Result<ProgramInfo, ContextError> {
        let reflection = reflect(label, source)?;
        let handle = ProgramHandle(self.programs);
        self.programs += 1;
        self.commands.push(GlCommand::CompileProgram(handle));
        Ok(ProgramInfo {
            handle,
            attributes: reflection.attributes,
            uniforms: reflection.uniforms,
            samples_texture: reflection.samples_texture,
        })
    }

    fn use_program(&mut self, program: ProgramHandle) -> Result<(), ContextError> {
        Self::check(program.0, self.programs, "program")?;
        self.current_program = Some(program);
        self.commands.push(GlCommand::UseProgram(program));
        Ok(())
    }

    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &Matrix4) -> Result<(), ContextError> {
        self.current_program.ok_or(ContextError::UnknownHandle("program"))?;
        self.commands.push(GlCommand::UniformMatrix4 { location, matrix: *matrix });
        Ok(())
    }

    fn create_texture(&mut self) -> TextureHandle {
        let handle = TextureHandle(self.textures);
        self.textures += 1;
        self.commands.push(GlCommand::CreateTexture(handle));
        handle
    }

    fn texture_image(&mut self, texture: TextureHandle, width: u32, height: u32, _rgba: &[u8]) -> Result<(), ContextError> {
        Self::check(texture.0, self.textures, "texture")?;
        self.commands.push(GlCommand::TextureImage { texture, width, height });
        Ok(())
    }

    fn bind_texture(&mut self, texture: TextureHandle) -> Result<(), ContextError> {
        Self::check(texture.0, self.textures, "texture")?;
        self.commands.push(GlCommand::BindTexture(texture));
        Ok(())
    }

    fn draw_arrays(&mut self, first: u32, count: u32) -> Result<(), ContextError> {
        self.bound_vertex_array.ok_or(ContextError::UnknownHandle("vertex array"))?;
        self.current_program.ok_or(ContextError::UnknownHandle("program"))?;
        self.commands.push(GlCommand::DrawArrays { first, count });
        Ok(())
    }

    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.commands.push(GlCommand::SetViewport { x, y, width, height });
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.commands.push(GlCommand::Clear(color));
    }

    fn enable(&mut self, capability: Capability) {
        self.commands.push(GlCommand::Enable(capability));
    }

    fn drawable_size(&self) -> (u32, u32) {
        self.drawable
    }

    fn client_size(&self) -> (u32, u32) {
        self.client
    }

    fn resize_drawable(&mut self, width: u32, height: u32) {
        self.drawable = (width, height);
        self.commands.push(GlCommand::ResizeDrawable { width, height });
    }

    fn present(&mut self) -> Result<(), ContextError> {
        self.commands.push(GlCommand::Present);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_foreign_handles() {
        let mut gl = RecordingContext::new(4, 4);
        let err = gl.buffer_data(BufferHandle(3), &[0; 4]).unwrap_err();
        assert!(matches!(err, ContextError::UnknownHandle("buffer")));
        let err = gl.draw_arrays(0, 3).unwrap_err();
        assert!(matches!(err, ContextError::UnknownHandle("vertex array")));
    }

    #[test]
    fn test_attribute_pointer_needs_bound_vertex_array() {
        let mut gl = RecordingContext::new(4, 4);
        let buffer = gl.create_buffer();
        let spec = BufferSpecification::positions();
        assert!(gl.attribute_pointer(0, buffer, &spec).is_err());

        let vao = gl.create_vertex_array();
        gl.bind_vertex_array(Some(vao)).unwrap();
        gl.attribute_pointer(0, buffer, &spec).unwrap();
        assert_eq!(
            gl.commands().last(),
            Some(&GlCommand::AttributePointer { location: 0, buffer, specification: spec })
        );
    }

    #[test]
    fn test_records_draws() {
        let mut gl = RecordingContext::new(4, 4);
        let program = gl.compile_program("basic", include_str!("../shaders/basic.wgsl")).unwrap();
        let vao = gl.create_vertex_array();
        gl.use_program(program.handle).unwrap();
        gl.bind_vertex_array(Some(vao)).unwrap();
        gl.uniform_matrix4(program.uniforms["u_matrix"], &Matrix4::IDENTITY).unwrap();
        gl.draw_arrays(0, 36).unwrap();
        assert_eq!(gl.draw_calls(), vec![(0, 36)]);
        assert_eq!(gl.uploaded_matrices(), vec![Matrix4::IDENTITY]);
    }
}
