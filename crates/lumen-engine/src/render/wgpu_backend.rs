use super::backend::{Backend, TextureDesc, Uniform};
use super::staging::FrameStaging;
use super::{Mat4, RenderTarget, Vertex};

/// Format of every image texture (raw RGBA8 bytes, no sRGB decode).
const IMAGE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// GPU texture owned by one image.
#[derive(Debug)]
pub struct WgpuTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    extent: wgpu::Extent3d,
}

/// wgpu implementation of [`Backend`].
///
/// wgpu records commands instead of drawing immediately, so vertex uploads
/// and draws are staged during the frame and replayed by [`flush`](Self::flush)
/// inside a single render pass. Each staged draw still becomes its own
/// `draw` call, in submission order.
///
/// Destroyed textures are kept until the next [`begin_frame`](Backend::begin_frame),
/// so a draw recorded before the delete never reaches the GPU with a dead
/// texture.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,

    pipeline: wgpu::RenderPipeline,
    texture_bgl: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    projection_ubo: wgpu::Buffer,
    projection_bind_group: wgpu::BindGroup,

    vbo: Option<wgpu::Buffer>,
    vbo_capacity: usize,

    projection: Mat4,
    frame: FrameStaging<wgpu::BindGroup, wgpu::Texture>,
}

impl WgpuBackend {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, surface_format: wgpu::TextureFormat) -> Self {
        let Pipeline { pipeline, projection_bgl, texture_bgl } = create_pipeline(device, surface_format);

        let projection_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen projection ubo"),
            size: std::mem::size_of::<Mat4>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let projection_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen projection bind group"),
            layout: &projection_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: projection_ubo.as_entire_binding(),
            }],
        });

        // Pixel-exact sampling for every image.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("lumen image sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self {
            device: device.clone(),
            queue: queue.clone(),
            pipeline,
            texture_bgl,
            sampler,
            projection_ubo,
            projection_bind_group,
            vbo: None,
            vbo_capacity: 0,
            projection: [[0.0; 4]; 4],
            frame: FrameStaging::new(),
        }
    }

    /// Replays the draws staged this frame into `target`, then clears the
    /// stage. Does nothing when no draw was staged.
    pub fn flush(&mut self, target: &mut RenderTarget<'_>) {
        if self.frame.draws().is_empty() {
            self.frame.reset();
            return;
        }

        self.ensure_vertex_capacity(self.frame.vertices().len());
        let Some(vbo) = self.vbo.as_ref() else { return };

        self.queue
            .write_buffer(vbo, 0, bytemuck::cast_slice(self.frame.vertices()));
        self.queue
            .write_buffer(&self.projection_ubo, 0, bytemuck::bytes_of(&self.projection));

        {
            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lumen image pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.projection_bind_group, &[]);
            rpass.set_vertex_buffer(0, vbo.slice(..));

            for draw in self.frame.draws() {
                rpass.set_bind_group(1, &draw.binding, &[]);
                rpass.draw(draw.vertices.clone(), 0..1);
            }
        }

        log::trace!("flushed {} image draws", self.frame.draws().len());
        self.frame.reset();
    }

    fn ensure_vertex_capacity(&mut self, required: usize) {
        if required <= self.vbo_capacity && self.vbo.is_some() {
            return;
        }

        let new_cap = required.next_power_of_two().max(64);
        self.vbo = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen image vbo"),
            size: (new_cap * std::mem::size_of::<Vertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.vbo_capacity = new_cap;
    }

    fn write_pixels(&self, texture: &wgpu::Texture, extent: wgpu::Extent3d, pixels: &[u8]) {
        let expected = (extent.width * extent.height) as usize * 4;
        if pixels.len() < expected {
            log::warn!(
                "pixel upload of {} bytes is smaller than {}x{} texture, skipped",
                pixels.len(),
                extent.width,
                extent.height
            );
            return;
        }

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &pixels[..expected],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(extent.width * 4),
                rows_per_image: Some(extent.height),
            },
            extent,
        );
    }
}

struct Pipeline {
    pipeline: wgpu::RenderPipeline,
    projection_bgl: wgpu::BindGroupLayout,
    texture_bgl: wgpu::BindGroupLayout,
}

fn create_pipeline(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Pipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("lumen image shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/image.wgsl").into()),
    });

    let projection_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("lumen projection bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: std::num::NonZeroU64::new(std::mem::size_of::<Mat4>() as u64),
            },
            count: None,
        }],
    });

    let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("lumen image texture bgl"),
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
        label: Some("lumen image pipeline layout"),
        bind_group_layouts: &[&projection_bgl, &texture_bgl],
        immediate_size: 0,
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("lumen image pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[Vertex::layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    Pipeline { pipeline, projection_bgl, texture_bgl }
}

impl Backend for WgpuBackend {
    type Texture = WgpuTexture;

    fn begin_frame(&mut self) {
        for texture in self.frame.begin() {
            texture.destroy();
        }
    }

    fn create_texture(&mut self, desc: &TextureDesc, pixels: &[u8]) -> WgpuTexture {
        // wgpu rejects zero-sized textures; an empty image gets a 1x1 that is never written.
        let extent = wgpu::Extent3d {
            width: u32::from(desc.width).max(1),
            height: u32::from(desc.height).max(1),
            depth_or_array_layers: 1,
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("lumen image texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: IMAGE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen image bind group"),
            layout: &self.texture_bgl,
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

        if desc.width > 0 && desc.height > 0 {
            self.write_pixels(&texture, extent, pixels);
        }

        WgpuTexture { texture, bind_group, extent }
    }

    fn destroy_texture(&mut self, texture: WgpuTexture) {
        self.frame.retire(texture.texture);
    }

    fn bind_texture(&mut self, texture: &WgpuTexture) {
        self.frame.bind(texture.bind_group.clone());
    }

    fn upload_pixels(&mut self, texture: &WgpuTexture, width: u16, height: u16, pixels: &[u8]) {
        if width == 0 || height == 0 {
            return;
        }
        debug_assert_eq!(u32::from(width), texture.extent.width);
        debug_assert_eq!(u32::from(height), texture.extent.height);
        self.write_pixels(&texture.texture, texture.extent, pixels);
    }

    fn upload_vertices(&mut self, vertices: &[Vertex]) {
        self.frame.upload(vertices);
    }

    fn set_uniform(&mut self, uniform: Uniform) {
        match uniform {
            Uniform::Projection(m) => self.projection = m,
            // Image textures always live in bind group 1.
            Uniform::TextureUnit(_) => {}
        }
    }

    fn draw_triangles(&mut self, vertex_count: u32) {
        if !self.frame.draw(vertex_count) {
            log::warn!("draw_triangles without a bound texture, skipped");
        }
    }
}
