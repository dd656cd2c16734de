//! wgpu context management.

use super::RenderConfig;
use crate::geometry::DataType;
use thiserror::Error;

/// Errors raised by the graphics layer.
#[derive(Error, Debug)]
pub enum ContextError {
    /// Failed to request adapter.
    #[error("Failed to request adapter: no suitable GPU found")]
    AdapterRequest,

    /// Failed to request device.
    #[error("Failed to request device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    /// Failed to create surface.
    #[error("Failed to create surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    /// Surface is not supported by adapter.
    #[error("Surface not supported by adapter")]
    SurfaceNotSupported,

    /// Acquiring or presenting a surface texture failed.
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// The shader source could not be parsed or validated.
    #[error("Shader compilation failed: {0}")]
    ShaderCompile(String),

    /// The shader compiled but cannot form a program (missing entry points).
    #[error("Shader program link failed: {0}")]
    ShaderLink(String),

    /// A material requires an input its shader does not declare.
    #[error("Shader has no input or uniform named '{0}'")]
    MissingShaderInput(String),

    /// A uniform the backend cannot bind at the requested location.
    #[error("Uniform at group {group}, binding {binding} is not supported")]
    UnsupportedUniform {
        /// Bind group index.
        group: u32,
        /// Binding index within the group.
        binding: u32,
    },

    /// No GPU vertex format exists for this buffer layout.
    #[error("Unsupported vertex format: {size} x {data_type:?} (normalize: {normalize})")]
    UnsupportedVertexFormat {
        /// Scalars per vertex.
        size: u32,
        /// Scalar type.
        data_type: DataType,
        /// Normalization flag.
        normalize: bool,
    },

    /// Pixel data does not match the declared image size.
    #[error("Texture data is {actual} bytes, expected {expected}")]
    TextureSize {
        /// Bytes required for the declared size.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },

    /// A handle that was never created by this context, or nothing is bound.
    #[error("Unknown or unbound {0} handle")]
    UnknownHandle(&'static str),

    /// The host page has no canvas with the requested id.
    #[error("Canvas '{0}' not found")]
    CanvasNotFound(String),
}

/// The wgpu rendering context.
/// Owns the device, queue and the configured surface.
pub struct Context {
    /// The wgpu instance.
    pub instance: wgpu::Instance,
    /// The rendering surface.
    pub surface: wgpu::Surface<'static>,
    /// The GPU adapter.
    pub adapter: wgpu::Adapter,
    /// The GPU device.
    pub device: wgpu::Device,
    /// The command queue.
    pub queue: wgpu::Queue,
    /// Surface configuration.
    pub surface_config: wgpu::SurfaceConfiguration,
    /// Current surface texture format.
    pub surface_format: wgpu::TextureFormat,
    /// Depth texture format.
    pub depth_format: wgpu::TextureFormat,
    /// Current width.
    pub width: u32,
    /// Current height.
    pub height: u32,
}

impl Context {
    /// Create a new context from a window or canvas handle.
    pub async fn new<W>(window: W, width: u32, height: u32, config: &RenderConfig) -> Result<Self, ContextError>
    where
        W: Into<wgpu::SurfaceTarget<'static>>,
    {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: config.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(ContextError::AdapterRequest)?;

        let info = adapter.get_info();
        log::info!("Using adapter '{}' ({:?})", info.name, info.backend);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(ContextError::SurfaceNotSupported)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .ok_or(ContextError::SurfaceNotSupported)?;

        let required_limits =
            wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Fudge Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits,
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let width = width.max(1);
        let height = height.max(1);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: config.present_mode,
            alpha_mode: if config.alpha && surface_caps.alpha_modes.contains(&wgpu::CompositeAlphaMode::PreMultiplied) {
                wgpu::CompositeAlphaMode::PreMultiplied
            } else {
                alpha_mode
            },
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &surface_config);

        Ok(Self {
            instance,
            surface,
            adapter,
            device,
            queue,
            surface_config,
            surface_format,
            depth_format: wgpu::TextureFormat::Depth32Float,
            width,
            height,
        })
    }

    /// Resize the surface. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.width = width;
            self.height = height;
            self.surface_config.width = width;
            self.surface_config.height = height;
            self.surface.configure(&self.device, &self.surface_config);
        }
    }

    /// Reconfigure the surface with its current settings (after `Lost`/`Outdated`).
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Get the current surface texture.
    pub fn get_current_texture(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }

    /// Create a command encoder.
    pub fn create_command_encoder(&self) -> wgpu::CommandEncoder {
        self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Fudge Command Encoder"),
        })
    }

    /// Create a depth texture matching the surface size.
    pub fn create_depth_texture(&self) -> wgpu::Texture {
        self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.depth_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    }
}
