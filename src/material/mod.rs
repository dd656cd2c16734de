//! Materials: a shader, a base color and an optional texture.

mod shader;
mod texture;

pub use shader::{BasicShader, Shader, ShaderDefinition, TextureShader};
pub use texture::{read_status, SharedTextureStatus, TextureLoader, TextureSource, TextureStatus, PLACEHOLDER_PIXEL};

use crate::core::{AttributeLocation, ContextError, GraphicsContext, UniformLocation};
use crate::geometry::BufferSpecification;
use crate::math::Vector3;
use std::path::PathBuf;

/// Name of the material auto-attached to meshes without one.
pub const STANDARD_MATERIAL: &str = "standardMaterial";
/// Default base color of the standard material.
pub const STANDARD_MATERIAL_COLOR: Vector3 = Vector3::new(0.75, 0.75, 0.75);

/// Vertex position input.
pub const POSITION_ATTRIBUTE: &str = "a_position";
/// Vertex color input.
pub const COLOR_ATTRIBUTE: &str = "a_color";
/// Texture coordinate input.
pub const TEXTURE_COORDINATE_ATTRIBUTE: &str = "a_texture_coordinate";
/// Combined object-to-clip matrix.
pub const MATRIX_UNIFORM: &str = "u_matrix";

/// Texture settings of a material.
#[derive(Debug, Clone)]
pub struct MaterialTexture {
    source: PathBuf,
    /// Whether meshes using the material upload texture coordinates and sample the image.
    pub enabled: bool,
    coordinate_location: AttributeLocation,
    specification: BufferSpecification,
    status: SharedTextureStatus,
}

impl MaterialTexture {
    /// Image path.
    pub fn source(&self) -> &std::path::Path {
        &self.source
    }

    /// Location of `a_texture_coordinate`.
    pub fn coordinate_location(&self) -> AttributeLocation {
        self.coordinate_location
    }

    /// Layout of the texture coordinate stream.
    pub fn specification(&self) -> &BufferSpecification {
        &self.specification
    }

    /// Handle shared with the loader.
    pub fn status_handle(&self) -> SharedTextureStatus {
        self.status.clone()
    }

    /// Current load state.
    pub fn status(&self) -> TextureStatus {
        read_status(&self.status)
    }
}

/// A shader bound to a base color, with attribute and uniform locations
/// resolved once at construction.
#[derive(Debug, Clone)]
pub struct Material {
    name: String,
    shader: Shader,
    color: Vector3,
    position_location: AttributeLocation,
    color_location: AttributeLocation,
    matrix_location: UniformLocation,
    color_specification: BufferSpecification,
    texture: Option<MaterialTexture>,
}

fn require<T>(value: Option<T>, name: &str) -> Result<T, ContextError> {
    value.ok_or_else(|| ContextError::MissingShaderInput(name.to_owned()))
}

impl Material {
    /// Create a material. The shader must declare `a_position`, `a_color`
    /// and `u_matrix`.
    pub fn new(name: impl Into<String>, shader: Shader, color: Vector3) -> Result<Self, ContextError> {
        let position_location = require(shader.attribute_location(POSITION_ATTRIBUTE), POSITION_ATTRIBUTE)?;
        let color_location = require(shader.attribute_location(COLOR_ATTRIBUTE), COLOR_ATTRIBUTE)?;
        let matrix_location = require(shader.uniform_location(MATRIX_UNIFORM), MATRIX_UNIFORM)?;
        Ok(Self {
            name: name.into(),
            shader,
            color,
            position_location,
            color_location,
            matrix_location,
            color_specification: BufferSpecification::colors(),
            texture: None,
        })
    }

    /// The `standardMaterial`: [`BasicShader`] with the given base color.
    pub fn standard(gl: &mut dyn GraphicsContext, color: Vector3) -> Result<Self, ContextError> {
        Self::new(STANDARD_MATERIAL, BasicShader::compile(gl)?, color)
    }

    /// Attach an image. The shader must declare `a_texture_coordinate`.
    /// Loading starts when a viewport initializes a mesh using this material.
    pub fn add_texture(&mut self, source: impl Into<PathBuf>) -> Result<(), ContextError> {
        let coordinate_location = require(
            self.shader.attribute_location(TEXTURE_COORDINATE_ATTRIBUTE),
            TEXTURE_COORDINATE_ATTRIBUTE,
        )?;
        self.texture = Some(MaterialTexture {
            source: source.into(),
            enabled: true,
            coordinate_location,
            specification: BufferSpecification::texture_coordinates(),
            status: SharedTextureStatus::default(),
        });
        Ok(())
    }

    /// Material name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shader.
    #[inline]
    pub fn shader(&self) -> &Shader {
        &self.shader
    }

    /// Base color, components in 0..1.
    #[inline]
    pub fn color(&self) -> Vector3 {
        self.color
    }

    /// Location of `a_position`.
    #[inline]
    pub fn position_location(&self) -> AttributeLocation {
        self.position_location
    }

    /// Location of `a_color`.
    #[inline]
    pub fn color_location(&self) -> AttributeLocation {
        self.color_location
    }

    /// Location of `u_matrix`.
    #[inline]
    pub fn matrix_location(&self) -> UniformLocation {
        self.matrix_location
    }

    /// Layout of the color stream.
    #[inline]
    pub fn color_specification(&self) -> &BufferSpecification {
        &self.color_specification
    }

    /// Texture settings, if an image was added.
    pub fn texture(&self) -> Option<&MaterialTexture> {
        self.texture.as_ref()
    }

    /// Mutable texture settings.
    pub fn texture_mut(&mut self) -> Option<&mut MaterialTexture> {
        self.texture.as_mut()
    }

    /// Texture settings if an image was added and is enabled.
    pub fn enabled_texture(&self) -> Option<&MaterialTexture> {
        self.texture.as_ref().filter(|t| t.enabled)
    }

    /// Load state of the texture, if any.
    pub fn texture_status(&self) -> Option<TextureStatus> {
        self.texture.as_ref().map(MaterialTexture::status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RecordingContext;

    #[test]
    fn test_resolves_locations() {
        let mut gl = RecordingContext::new(1, 1);
        let shader = BasicShader::compile(&mut gl).unwrap();
        let material = Material::new("red", shader, Vector3::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(material.name(), "red");
        assert_eq!(material.position_location(), 0);
        assert_eq!(material.color_location(), 1);
        assert_eq!(material.matrix_location(), UniformLocation { group: 0, binding: 0 });
        assert!(material.texture().is_none());
        assert_eq!(material.texture_status(), None);
    }

    #[test]
    fn test_texture_requires_coordinates() {
        let mut gl = RecordingContext::new(1, 1);
        let mut basic = Material::new("basic", BasicShader::compile(&mut gl).unwrap(), Vector3::ONE).unwrap();
        let err = basic.add_texture("crate.png").unwrap_err();
        assert!(matches!(err, ContextError::MissingShaderInput(ref n) if n == TEXTURE_COORDINATE_ATTRIBUTE));

        let mut textured = Material::new("textured", TextureShader::compile(&mut gl).unwrap(), Vector3::ONE).unwrap();
        textured.add_texture("crate.png").unwrap();
        let texture = textured.enabled_texture().unwrap();
        assert_eq!(texture.coordinate_location(), 2);
        assert_eq!(texture.source(), std::path::Path::new("crate.png"));
        assert_eq!(textured.texture_status(), Some(TextureStatus::Pending));

        textured.texture_mut().unwrap().enabled = false;
        assert!(textured.enabled_texture().is_none());
    }

    #[test]
    fn test_missing_matrix_uniform() {
        let source = r#"
            struct VertexOutput {
                @builtin(position) clip_position: vec4<f32>,
            };

            @vertex
            fn vs_main(@location(0) a_position: vec3<f32>, @location(1) a_color: vec3<f32>) -> VertexOutput {
                var out: VertexOutput;
                out.clip_position = vec4<f32>(a_position + a_color, 1.0);
                return out;
            }

            @fragment
            fn fs_main(vertex_in: VertexOutput) -> @location(0) vec4<f32> {
                return vec4<f32>(1.0, 1.0, 1.0, 1.0);
            }
        "#;
        let mut gl = RecordingContext::new(1, 1);
        let shader = Shader::compile(&mut gl, "unlit", source).unwrap();
        let err = Material::new("unlit", shader, Vector3::ONE).unwrap_err();
        assert!(matches!(err, ContextError::MissingShaderInput(ref n) if n == MATRIX_UNIFORM));
    }
}
