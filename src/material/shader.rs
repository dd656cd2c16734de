//! Shader programs and their reflected interfaces.

use crate::core::{AttributeLocation, ContextError, GraphicsContext, ProgramHandle, ProgramInfo, UniformLocation};

/// A compiled program with name-based lookup of its inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Shader {
    name: String,
    program: ProgramInfo,
}

impl Shader {
    /// Compile `source` (WGSL with `vs_main` / `fs_main`) on `gl`.
    pub fn compile(gl: &mut dyn GraphicsContext, name: &str, source: &str) -> Result<Self, ContextError> {
        let program = gl.compile_program(name, source)?;
        Ok(Self {
            name: name.to_owned(),
            program,
        })
    }

    /// Shader name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Program handle.
    #[inline]
    pub fn program(&self) -> ProgramHandle {
        self.program.handle
    }

    /// Location of a vertex input, if the program declares it.
    pub fn attribute_location(&self, name: &str) -> Option<AttributeLocation> {
        self.program.attributes.get(name).copied()
    }

    /// Location of a bound resource, if the program declares it.
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.program.uniforms.get(name).copied()
    }

    /// Whether the program samples a texture.
    #[inline]
    pub fn samples_texture(&self) -> bool {
        self.program.samples_texture
    }

    /// Make this program current.
    pub fn use_program(&self, gl: &mut dyn GraphicsContext) -> Result<(), ContextError> {
        gl.use_program(self.program.handle)
    }
}

/// A shader known at compile time.
pub trait ShaderDefinition {
    /// Program name.
    const NAME: &'static str;
    /// WGSL source.
    const SOURCE: &'static str;

    /// Compile this shader on `gl`.
    fn compile(gl: &mut dyn GraphicsContext) -> Result<Shader, ContextError> {
        Shader::compile(gl, Self::NAME, Self::SOURCE)
    }
}

/// Vertex-colored, untextured geometry.
pub struct BasicShader;

impl ShaderDefinition for BasicShader {
    const NAME: &'static str = "BasicShader";
    const SOURCE: &'static str = include_str!("../shaders/basic.wgsl");
}

/// Vertex-colored geometry modulated by a texture.
pub struct TextureShader;

impl ShaderDefinition for TextureShader {
    const NAME: &'static str = "TextureShader";
    const SOURCE: &'static str = include_str!("../shaders/texture.wgsl");
}
