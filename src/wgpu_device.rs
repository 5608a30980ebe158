//! wgpu-backed implementation of the render device.
//!
//! [`GpuContext`] owns the core wgpu objects (surface, device, queue,
//! surface configuration); [`WgpuDevice`] layers the image-component
//! contract on top: a slot table of textures guarded by a generation
//! counter, and a batched 2D pipeline that draws [`Vertex2d`] buffers in
//! screen-space pixels.
//!
//! Draw calls issued through [`RenderDevice`] are batched per texture and
//! replayed into a caller-provided render pass by [`WgpuDevice::flush`].

use crate::device::{DeviceError, PixelFormat, RenderDevice, TextureHandle};
use crate::geometry::Vertex2d;
use std::ops::Range;
use std::sync::Arc;
use winit::window::Window;

/// Core GPU context holding wgpu resources.
///
/// Created once from a winit window; passed by reference wherever raw wgpu
/// access is needed. All fields are public to keep the escape hatch open.
pub struct GpuContext {
    /// The surface for presenting rendered frames to the window.
    pub surface: wgpu::Surface<'static>,
    /// The logical GPU device for creating resources and pipelines.
    pub device: wgpu::Device,
    /// The command queue for submitting work to the GPU.
    pub queue: wgpu::Queue,
    /// Current surface configuration (format, size, present mode).
    pub config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    /// Create a new GPU context from a winit window.
    ///
    /// # Panics
    ///
    /// Panics if no suitable GPU adapter is found or device creation fails.
    pub fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window).unwrap();

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("Failed to find a suitable GPU adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Retroframe Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))
        .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Self {
            surface,
            device,
            queue,
            config,
        }
    }

    /// Resize the surface. Zero-sized dimensions are ignored (window
    /// minimize produces them and they fail wgpu validation).
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Current surface width in pixels.
    pub fn width(&self) -> u32 {
        self.config.width
    }

    /// Current surface height in pixels.
    pub fn height(&self) -> u32 {
        self.config.height
    }
}

/// Uniforms for pixel-space to clip-space conversion.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ImageUniforms {
    resolution: [f32; 2],
    _padding: [f32; 2],
}

const MAX_VERTICES: usize = 16384;

struct TextureSlot {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// The production [`RenderDevice`].
///
/// Owns a slot table of live textures plus the textured pipeline that draws
/// them. A generation counter ties every issued [`TextureHandle`] to the
/// context that created it: [`invalidate`](Self::invalidate) bumps the
/// generation, after which all previously issued handles are stale and
/// destroy calls on them are silently ignored.
pub struct WgpuDevice {
    gpu: GpuContext,

    pipeline: wgpu::RenderPipeline,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,

    slots: Vec<Option<TextureSlot>>,
    generation: u32,

    // Current frame batches
    vertices: Vec<Vertex2d>,
    batches: Vec<(TextureHandle, Range<usize>)>,
    bound: Option<TextureHandle>,
}

impl WgpuDevice {
    pub fn new(gpu: GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Image Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/image.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Image Uniforms"),
            size: std::mem::size_of::<ImageUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Image Uniform Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Image Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Image Texture Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Image Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let blend_state = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Image Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[Vertex2d::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(blend_state),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Image Vertex Buffer"),
            size: (MAX_VERTICES * std::mem::size_of::<Vertex2d>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Linear filtering: images are shown downscaled far more often than
        // pixel-perfect.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Image Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            gpu,
            pipeline,
            texture_bind_group_layout,
            sampler,
            vertex_buffer,
            uniform_buffer,
            uniform_bind_group,
            slots: Vec::new(),
            generation: 0,
            vertices: Vec::with_capacity(1024),
            batches: Vec::new(),
            bound: None,
        }
    }

    /// Access the underlying GPU context.
    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    /// Resize the presentation surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }

    /// The context was lost or torn down: drop every texture slot and move
    /// to a new generation. All outstanding handles become stale.
    ///
    /// The host delivers this to components as `on_deinit`/`on_init`; no
    /// component polls device state.
    pub fn invalidate(&mut self) {
        for slot in self.slots.drain(..).flatten() {
            slot.texture.destroy();
        }
        self.generation += 1;
        self.clear_frame();
        log::debug!("device invalidated, generation {}", self.generation);
    }

    /// Drop all batched draw calls for a new frame.
    pub fn clear_frame(&mut self) {
        self.vertices.clear();
        self.batches.clear();
        self.bound = None;
    }

    /// Replay all batched draw calls into a render pass.
    pub fn flush(&self, render_pass: &mut wgpu::RenderPass) {
        if self.batches.is_empty() {
            return;
        }

        let uniforms = ImageUniforms {
            resolution: [self.gpu.width() as f32, self.gpu.height() as f32],
            _padding: [0.0, 0.0],
        };
        self.gpu
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
        self.gpu
            .queue
            .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.vertices));

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

        for (handle, range) in &self.batches {
            let Some(slot) = self
                .slots
                .get(handle.slot as usize)
                .and_then(|s| s.as_ref())
            else {
                continue;
            };
            render_pass.set_bind_group(1, &slot.bind_group, &[]);
            render_pass.draw(range.start as u32..range.end as u32, 0..1);
        }
    }
}

impl RenderDevice for WgpuDevice {
    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
        bytes: &[u8],
    ) -> Result<TextureHandle, DeviceError> {
        use wgpu::util::DeviceExt;

        let limit = self.gpu.device.limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > limit || height > limit {
            return Err(DeviceError::InvalidDimensions { width, height });
        }
        // wgpu has no packed 24-bit texture format.
        if format != PixelFormat::Rgba8 {
            return Err(DeviceError::UnsupportedFormat(format));
        }
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if bytes.len() != expected {
            return Err(DeviceError::BufferSizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }

        self.gpu.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

        let texture = self.gpu.device.create_texture_with_data(
            &self.gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some("Image Texture"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            bytes,
        );

        if pollster::block_on(self.gpu.device.pop_error_scope()).is_some() {
            texture.destroy();
            return Err(DeviceError::OutOfMemory);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Image Texture Bind Group"),
            layout: &self.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let slot = TextureSlot {
            texture,
            bind_group,
        };

        // Reuse the first free slot before growing the table.
        let index = match self.slots.iter().position(|s| s.is_none()) {
            Some(free) => {
                self.slots[free] = Some(slot);
                free
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };

        Ok(TextureHandle {
            slot: index as u32,
            generation: self.generation,
        })
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        if handle.generation != self.generation {
            return;
        }
        if let Some(entry) = self.slots.get_mut(handle.slot as usize) {
            if let Some(slot) = entry.take() {
                slot.texture.destroy();
            }
        }
    }

    fn texture_is_valid(&self, handle: TextureHandle) -> bool {
        handle.generation == self.generation
            && self
                .slots
                .get(handle.slot as usize)
                .is_some_and(|s| s.is_some())
    }

    fn bind_texture(&mut self, handle: TextureHandle) {
        self.bound = Some(handle);
    }

    fn draw(&mut self, vertices: &[Vertex2d]) {
        let Some(handle) = self.bound else {
            return;
        };
        if vertices.is_empty() || self.vertices.len() + vertices.len() > MAX_VERTICES {
            return;
        }

        let start = self.vertices.len();
        self.vertices.extend_from_slice(vertices);
        let range = start..self.vertices.len();

        // Extend the previous batch when the texture hasn't changed.
        if let Some((last, last_range)) = self.batches.last_mut() {
            if *last == handle && last_range.end == start {
                last_range.end = range.end;
                return;
            }
        }
        self.batches.push((handle, range));
    }
}
