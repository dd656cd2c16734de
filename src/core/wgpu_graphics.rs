//! wgpu implementation of [`GraphicsContext`].
//!
//! Calls between two `present()`s are recorded as draw commands and replayed
//! in a single render pass. Each draw gets its own slot in a dynamic-offset
//! uniform buffer for its matrix; pipelines are cached per program, vertex
//! layout and capability set.

use super::graphics::{
    AttributeLocation, BufferHandle, Capability, GraphicsContext, ProgramHandle, ProgramInfo, TextureHandle,
    UniformLocation, VertexArrayHandle,
};
use super::reflect::{reflect, FRAGMENT_ENTRY, VERTEX_ENTRY};
use super::{Context, ContextError};
use crate::geometry::BufferSpecification;
use crate::math::Matrix4;
use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroU64;
use wgpu::util::DeviceExt;

const MATRIX_SIZE: u64 = std::mem::size_of::<Matrix4>() as u64;
const MATRIX_LOCATION: UniformLocation = UniformLocation { group: 0, binding: 0 };
const TEXTURE_LOCATION: UniformLocation = UniformLocation { group: 1, binding: 0 };
const SAMPLER_LOCATION: UniformLocation = UniformLocation { group: 1, binding: 1 };

#[derive(Debug, Clone, Copy)]
struct AttributeBinding {
    buffer: BufferHandle,
    specification: BufferSpecification,
    format: wgpu::VertexFormat,
    enabled: bool,
}

#[derive(Debug, Default)]
struct VertexArrayState {
    attributes: BTreeMap<AttributeLocation, AttributeBinding>,
}

struct ProgramState {
    label: String,
    module: wgpu::ShaderModule,
    attributes: Vec<AttributeLocation>,
    samples_texture: bool,
}

struct TextureState {
    bind_group: wgpu::BindGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineState {
    cull: bool,
    depth_test: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PipelineKey {
    program: ProgramHandle,
    layout: Vec<(AttributeLocation, wgpu::VertexFormat, u64)>,
    state: PipelineState,
}

#[derive(Debug, Clone)]
struct DrawCommand {
    program: ProgramHandle,
    vertex_array: VertexArrayHandle,
    texture: Option<TextureHandle>,
    matrix: Matrix4,
    first: u32,
    count: u32,
    state: PipelineState,
    viewport: Option<[u32; 4]>,
}

/// A [`GraphicsContext`] that renders to a wgpu surface.
pub struct WgpuGraphics {
    context: Context,
    buffers: Vec<Option<wgpu::Buffer>>,
    vertex_arrays: Vec<VertexArrayState>,
    programs: Vec<ProgramState>,
    textures: Vec<TextureState>,
    fallback_texture: TextureState,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    matrix_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniform_stride: u64,
    uniform_slots: u64,
    uniform_buffer: wgpu::Buffer,
    matrix_bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,

    bound_vertex_array: Option<VertexArrayHandle>,
    current_program: Option<ProgramHandle>,
    bound_texture: Option<TextureHandle>,
    pending_matrix: Matrix4,
    state: PipelineState,
    viewport: Option<[u32; 4]>,
    clear_color: wgpu::Color,
    draws: Vec<DrawCommand>,
    client: (u32, u32),
}

impl WgpuGraphics {
    /// Wrap an initialized [`Context`].
    pub fn new(context: Context) -> Self {
        let device = &context.device;

        let matrix_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Matrix Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: MATRIX_LOCATION.binding,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(MATRIX_SIZE),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: TEXTURE_LOCATION.binding,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: SAMPLER_LOCATION.binding,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Texture Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment).max(1);
        let uniform_stride = MATRIX_SIZE.div_ceil(alignment) * alignment;
        let uniform_slots = 64;
        let (uniform_buffer, matrix_bind_group) =
            Self::create_uniforms(device, &matrix_layout, uniform_stride, uniform_slots);

        let depth_view = context
            .create_depth_texture()
            .create_view(&wgpu::TextureViewDescriptor::default());

        let fallback_texture = Self::upload_texture(&context, &texture_layout, &sampler, 1, 1, &[255, 255, 255, 255]);
        let client = (context.width, context.height);

        Self {
            context,
            buffers: Vec::new(),
            vertex_arrays: Vec::new(),
            programs: Vec::new(),
            textures: Vec::new(),
            fallback_texture,
            pipelines: HashMap::new(),
            matrix_layout,
            texture_layout,
            sampler,
            uniform_stride,
            uniform_slots,
            uniform_buffer,
            matrix_bind_group,
            depth_view,
            bound_vertex_array: None,
            current_program: None,
            bound_texture: None,
            pending_matrix: Matrix4::IDENTITY,
            state: PipelineState {
                cull: false,
                depth_test: false,
            },
            viewport: None,
            clear_color: wgpu::Color::BLACK,
            draws: Vec::new(),
            client,
        }
    }

    /// The underlying context.
    #[inline]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Report the size the host displays the surface at (window or canvas resize).
    pub fn set_client_size(&mut self, width: u32, height: u32) {
        self.client = (width, height);
    }

    fn create_uniforms(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        slots: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Matrix Uniform Buffer"),
            size: stride * slots,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Matrix Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: MATRIX_LOCATION.binding,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(MATRIX_SIZE),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn upload_texture(
        context: &Context,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> TextureState {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = context.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Material Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        context.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = context.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Texture Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: TEXTURE_LOCATION.binding,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: SAMPLER_LOCATION.binding,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        TextureState { bind_group }
    }

    fn ensure_uniform_capacity(&mut self, draws: u64) {
        if draws <= self.uniform_slots {
            return;
        }
        let slots = draws.next_power_of_two();
        let (buffer, bind_group) =
            Self::create_uniforms(&self.context.device, &self.matrix_layout, self.uniform_stride, slots);
        self.uniform_buffer = buffer;
        self.matrix_bind_group = bind_group;
        self.uniform_slots = slots;
    }

    /// Resolve the pipeline key of a draw, or `None` if its inputs are incomplete.
    fn pipeline_key(&self, draw: &DrawCommand) -> Option<PipelineKey> {
        let program = self.programs.get(draw.program.index())?;
        let vao = self.vertex_arrays.get(draw.vertex_array.index())?;

        let mut layout = Vec::with_capacity(program.attributes.len());
        for location in &program.attributes {
            let Some(binding) = vao.attributes.get(location).filter(|b| b.enabled) else {
                log::warn!("Program '{}' reads attribute {location} which is not enabled; skipping draw", program.label);
                return None;
            };
            if self.buffers.get(binding.buffer.index()).map_or(true, Option::is_none) {
                log::warn!("Attribute {location} sources an empty buffer; skipping draw");
                return None;
            }
            layout.push((*location, binding.format, u64::from(binding.specification.byte_stride())));
        }

        Some(PipelineKey {
            program: draw.program,
            layout,
            state: draw.state,
        })
    }

    fn build_pipeline(&self, key: &PipelineKey) -> Option<wgpu::RenderPipeline> {
        let program = self.programs.get(key.program.index())?;
        let device = &self.context.device;

        let bind_group_layouts: Vec<&wgpu::BindGroupLayout> = if program.samples_texture {
            vec![&self.matrix_layout, &self.texture_layout]
        } else {
            vec![&self.matrix_layout]
        };
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Fudge Pipeline Layout"),
            bind_group_layouts: &bind_group_layouts,
            push_constant_ranges: &[],
        });

        let attributes: Vec<[wgpu::VertexAttribute; 1]> = key
            .layout
            .iter()
            .map(|(location, format, _)| {
                [wgpu::VertexAttribute {
                    format: *format,
                    offset: 0,
                    shader_location: *location,
                }]
            })
            .collect();
        let buffers: Vec<wgpu::VertexBufferLayout> = key
            .layout
            .iter()
            .zip(attributes.iter())
            .map(|((_, _, stride), attribute)| wgpu::VertexBufferLayout {
                array_stride: *stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attribute,
            })
            .collect();

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(program.label.as_str()),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &program.module,
                entry_point: Some(VERTEX_ENTRY),
                buffers: &buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &program.module,
                entry_point: Some(FRAGMENT_ENTRY),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.context.surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: key.state.cull.then_some(wgpu::Face::Back),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: self.context.depth_format,
                depth_write_enabled: key.state.depth_test,
                depth_compare: if key.state.depth_test {
                    wgpu::CompareFunction::Less
                } else {
                    wgpu::CompareFunction::Always
                },
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });
        Some(pipeline)
    }

    fn vertex_array_mut(&mut self) -> Result<&mut VertexArrayState, ContextError> {
        let handle = self.bound_vertex_array.ok_or(ContextError::UnknownHandle("vertex array"))?;
        self.vertex_arrays
            .get_mut(handle.index())
            .ok_or(ContextError::UnknownHandle("vertex array"))
    }
}

impl GraphicsContext for WgpuGraphics {
    fn create_buffer(&mut self) -> BufferHandle {
        self.buffers.push(None);
        BufferHandle(self.buffers.len() as u32 - 1)
    }

    fn buffer_data(&mut self, buffer: BufferHandle, data: &[u8]) -> Result<(), ContextError> {
        let slot = self
            .buffers
            .get_mut(buffer.index())
            .ok_or(ContextError::UnknownHandle("buffer"))?;
        *slot = (!data.is_empty()).then(|| {
            self.context.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: data,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            })
        });
        Ok(())
    }

    fn create_vertex_array(&mut self) -> VertexArrayHandle {
        self.vertex_arrays.push(VertexArrayState::default());
        VertexArrayHandle(self.vertex_arrays.len() as u32 - 1)
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) -> Result<(), ContextError> {
        if let Some(vao) = vertex_array {
            if vao.index() >= self.vertex_arrays.len() {
                return Err(ContextError::UnknownHandle("vertex array"));
            }
        }
        self.bound_vertex_array = vertex_array;
        Ok(())
    }

    fn attribute_pointer(
        &mut self,
        location: AttributeLocation,
        buffer: BufferHandle,
        specification: &BufferSpecification,
    ) -> Result<(), ContextError> {
        if buffer.index() >= self.buffers.len() {
            return Err(ContextError::UnknownHandle("buffer"));
        }
        let format = specification
            .vertex_format()
            .ok_or(ContextError::UnsupportedVertexFormat {
                size: specification.size,
                data_type: specification.data_type,
                normalize: specification.normalize,
            })?;
        let vao = self.vertex_array_mut()?;
        let enabled = vao.attributes.get(&location).is_some_and(|b| b.enabled);
        vao.attributes.insert(
            location,
            AttributeBinding {
                buffer,
                specification: *specification,
                format,
                enabled,
            },
        );
        Ok(())
    }

    fn enable_vertex_attribute(&mut self, location: AttributeLocation) -> Result<(), ContextError> {
        let vao = self.vertex_array_mut()?;
        match vao.attributes.get_mut(&location) {
            Some(binding) => binding.enabled = true,
            None => log::debug!("Enabling attribute {location} before it has a pointer"),
        }
        Ok(())
    }

    fn compile_program(&mut self, label: &str, source: &str) -> Result<ProgramInfo, ContextError> {
        let reflection = reflect(label, source)?;
        if let Some(location) = reflection
            .uniforms
            .values()
            .find(|l| ![MATRIX_LOCATION, TEXTURE_LOCATION, SAMPLER_LOCATION].contains(*l))
        {
            return Err(ContextError::UnsupportedUniform {
                group: location.group,
                binding: location.binding,
            });
        }

        let module = self.context.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let mut attributes: Vec<AttributeLocation> = reflection.attributes.values().copied().collect();
        attributes.sort_unstable();

        let handle = ProgramHandle(self.programs.len() as u32);
        self.programs.push(ProgramState {
            label: label.to_owned(),
            module,
            attributes,
            samples_texture: reflection.samples_texture,
        });
        log::debug!("Compiled program '{label}' as {handle:?}");

        Ok(ProgramInfo {
            handle,
            attributes: reflection.attributes,
            uniforms: reflection.uniforms,
            samples_texture: reflection.samples_texture,
        })
    }

    fn use_program(&mut self, program: ProgramHandle) -> Result<(), ContextError> {
        if program.index() >= self.programs.len() {
            return Err(ContextError::UnknownHandle("program"));
        }
        self.current_program = Some(program);
        Ok(())
    }

    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &Matrix4) -> Result<(), ContextError> {
        self.current_program.ok_or(ContextError::UnknownHandle("program"))?;
        if location != MATRIX_LOCATION {
            return Err(ContextError::UnsupportedUniform {
                group: location.group,
                binding: location.binding,
            });
        }
        self.pending_matrix = *matrix;
        Ok(())
    }

    fn create_texture(&mut self) -> TextureHandle {
        let state = Self::upload_texture(
            &self.context,
            &self.texture_layout,
            &self.sampler,
            1,
            1,
            &[255, 255, 255, 255],
        );
        self.textures.push(state);
        TextureHandle(self.textures.len() as u32 - 1)
    }

    fn texture_image(&mut self, texture: TextureHandle, width: u32, height: u32, rgba: &[u8]) -> Result<(), ContextError> {
        if texture.index() >= self.textures.len() {
            return Err(ContextError::UnknownHandle("texture"));
        }
        let expected = 4 * width as usize * height as usize;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(ContextError::TextureSize {
                expected,
                actual: rgba.len(),
            });
        }
        let state = Self::upload_texture(&self.context, &self.texture_layout, &self.sampler, width, height, rgba);
        self.textures[texture.index()] = state;
        Ok(())
    }

    fn bind_texture(&mut self, texture: TextureHandle) -> Result<(), ContextError> {
        if texture.index() >= self.textures.len() {
            return Err(ContextError::UnknownHandle("texture"));
        }
        self.bound_texture = Some(texture);
        Ok(())
    }

    fn draw_arrays(&mut self, first: u32, count: u32) -> Result<(), ContextError> {
        let vertex_array = self.bound_vertex_array.ok_or(ContextError::UnknownHandle("vertex array"))?;
        let program = self.current_program.ok_or(ContextError::UnknownHandle("program"))?;
        self.draws.push(DrawCommand {
            program,
            vertex_array,
            texture: self.bound_texture,
            matrix: self.pending_matrix,
            first,
            count,
            state: self.state,
            viewport: self.viewport,
        });
        Ok(())
    }

    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.viewport = Some([x, y, width, height]);
    }

    fn clear(&mut self, color: [f32; 4]) {
        let [r, g, b, a] = color.map(f64::from);
        self.clear_color = wgpu::Color { r, g, b, a };
    }

    fn enable(&mut self, capability: Capability) {
        match capability {
            Capability::CullFace => self.state.cull = true,
            Capability::DepthTest => self.state.depth_test = true,
        }
    }

    fn drawable_size(&self) -> (u32, u32) {
        (self.context.width, self.context.height)
    }

    fn client_size(&self) -> (u32, u32) {
        self.client
    }

    fn resize_drawable(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.context.resize(width, height);
        self.depth_view = self
            .context
            .create_depth_texture()
            .create_view(&wgpu::TextureViewDescriptor::default());
    }

    fn present(&mut self) -> Result<(), ContextError> {
        let draws = std::mem::take(&mut self.draws);

        let frame = match self.context.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.context.reconfigure();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let mut prepared = Vec::with_capacity(draws.len());
        for draw in draws {
            let Some(key) = self.pipeline_key(&draw) else {
                continue;
            };
            if !self.pipelines.contains_key(&key) {
                match self.build_pipeline(&key) {
                    Some(pipeline) => {
                        self.pipelines.insert(key.clone(), pipeline);
                    }
                    None => continue,
                }
            }
            prepared.push((draw, key));
        }

        self.ensure_uniform_capacity(prepared.len() as u64);
        if !prepared.is_empty() {
            let stride = self.uniform_stride as usize;
            let mut bytes = vec![0u8; stride * prepared.len()];
            for (i, (draw, _)) in prepared.iter().enumerate() {
                bytes[i * stride..i * stride + MATRIX_SIZE as usize].copy_from_slice(bytemuck::bytes_of(&draw.matrix));
            }
            self.context.queue.write_buffer(&self.uniform_buffer, 0, &bytes);
        }

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.context.create_command_encoder();
        let (target_width, target_height) = self.drawable_size();

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Viewport Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (i, (draw, key)) in prepared.iter().enumerate() {
                let (Some(pipeline), Some(program), Some(vao)) = (
                    self.pipelines.get(key),
                    self.programs.get(draw.program.index()),
                    self.vertex_arrays.get(draw.vertex_array.index()),
                ) else {
                    continue;
                };

                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &self.matrix_bind_group, &[(i as u64 * self.uniform_stride) as u32]);
                if program.samples_texture {
                    let texture = draw
                        .texture
                        .and_then(|t| self.textures.get(t.index()))
                        .unwrap_or(&self.fallback_texture);
                    pass.set_bind_group(1, &texture.bind_group, &[]);
                }

                for (slot, (location, _, _)) in key.layout.iter().enumerate() {
                    let buffer = vao
                        .attributes
                        .get(location)
                        .and_then(|b| Some((self.buffers.get(b.buffer.index())?.as_ref()?, b.specification.offset)));
                    if let Some((buffer, offset)) = buffer {
                        pass.set_vertex_buffer(slot as u32, buffer.slice(u64::from(offset)..));
                    }
                }

                let [x, y, w, h] = draw.viewport.unwrap_or([0, 0, target_width, target_height]);
                let x = x.min(target_width);
                let y = y.min(target_height);
                let w = w.min(target_width - x);
                let h = h.min(target_height - y);
                if w == 0 || h == 0 {
                    continue;
                }
                pass.set_viewport(x as f32, y as f32, w as f32, h as f32, 0.0, 1.0);
                pass.draw(draw.first..draw.first + draw.count, 0..1);
            }
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
