use std::mem::offset_of;

use lib_gpu::{
    AddressMode, BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingResource, BindingType, BlendState, Buffer, BufferDescriptor,
    BufferInitDescriptor, BufferUsages, Color, ColorTargetState, ColorWrites,
    CommandEncoderDescriptor, DeviceExt, Extent3d, FilterMode, FragmentState, FrontFace,
    GpuContext, IndexFormat, LoadOp, MultisampleState, Operations, Origin3d,
    PipelineCompilationOptions, PipelineLayoutDescriptor, PolygonMode, PrimitiveState,
    PrimitiveTopology, RenderPassColorAttachment, RenderPassDescriptor, RenderPipeline,
    RenderPipelineDescriptor, SamplerBindingType, SamplerDescriptor, ShaderStages, StoreOp,
    TexelCopyBufferLayout, TexelCopyTextureInfo, Texture, TextureAspect, TextureDescriptor,
    TextureDimension, TextureFormat, TextureSampleType, TextureUsages, TextureView,
    TextureViewDescriptor, TextureViewDimension, VertexAttribute, VertexBufferLayout,
    VertexFormat, VertexState, VertexStepMode, include_wgsl,
};
use lib_math::{Vec4, vec4};

use crate::{BatchState, Font, Quad, QuadBatch, TextureAtlas, Vertex, quad_indices};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererConfig {
    pub max_quads: usize,
    pub atlas_width: u32,
    pub atlas_height: u32,
    pub clear_color: Vec4,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_quads: 1024,
            atlas_width: 256,
            atlas_height: 256,
            clear_color: vec4(0.8, 0.8, 0.8, 1.0),
        }
    }
}

/// Draws a [`QuadBatch`] with one indexed draw call per frame.
#[derive(Debug)]
pub struct Renderer {
    max_quads: usize,
    clear_color: Vec4,
    vertex_buf: Buffer,
    index_buf: Buffer,
    bind_group: BindGroup,
    pipeline: RenderPipeline,
    atlas: TextureAtlas,
    font: Font,
}

impl Renderer {
    pub fn new(
        ctx: GpuContext<'_>,
        config: &RendererConfig,
        atlas: TextureAtlas,
        font: Font,
    ) -> Self {
        let vertex_buf = ctx.device.create_buffer(&BufferDescriptor {
            label: Some("lib_renderer vertex buffer"),
            size: (config.max_quads * size_of::<Quad>()) as u64,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let index_buf = ctx.device.create_buffer_init(&BufferInitDescriptor {
            label: Some("lib_renderer index buffer"),
            contents: bytemuck::cast_slice(&quad_indices(config.max_quads)),
            usage: BufferUsages::INDEX,
        });

        let atlas_texture = upload_texture(
            ctx,
            "lib_renderer atlas texture",
            TextureFormat::Rgba8UnormSrgb,
            atlas.image().width(),
            atlas.image().height(),
            atlas.image().as_raw(),
        );

        let font_texture = upload_texture(
            ctx,
            "lib_renderer font texture",
            TextureFormat::R8Unorm,
            font.width(),
            font.height(),
            font.bitmap(),
        );

        let sampler = ctx.device.create_sampler(&SamplerDescriptor {
            label: Some("lib_renderer sampler"),
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            address_mode_w: AddressMode::ClampToEdge,
            anisotropy_clamp: 1,
            border_color: None,
            compare: None,
            lod_max_clamp: 32.0,
            lod_min_clamp: 0.0,
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Linear,
            mipmap_filter: FilterMode::Nearest,
        });

        let shader = ctx.device.create_shader_module(include_wgsl!("quad.wgsl"));

        let texture_entry = |binding| BindGroupLayoutEntry {
            binding,
            ty: BindingType::Texture {
                sample_type: TextureSampleType::Float { filterable: true },
                view_dimension: TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
            visibility: ShaderStages::FRAGMENT,
        };

        let bind_group_layout = ctx
            .device
            .create_bind_group_layout(&BindGroupLayoutDescriptor {
                label: Some("lib_renderer bind group layout"),
                entries: &[
                    texture_entry(0),
                    texture_entry(1),
                    BindGroupLayoutEntry {
                        binding: 2,
                        ty: BindingType::Sampler(SamplerBindingType::Filtering),
                        count: None,
                        visibility: ShaderStages::FRAGMENT,
                    },
                ],
            });

        let bind_group = ctx.device.create_bind_group(&BindGroupDescriptor {
            label: Some("lib_renderer bind group"),
            layout: &bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(
                        &atlas_texture.create_view(&TextureViewDescriptor::default()),
                    ),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::TextureView(
                        &font_texture.create_view(&TextureViewDescriptor::default()),
                    ),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: BindingResource::Sampler(&sampler),
                },
            ],
        });

        let pipeline = ctx
            .device
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: Some("lib_renderer pipeline"),
                cache: None,
                depth_stencil: None,
                layout: Some(
                    &ctx.device
                        .create_pipeline_layout(&PipelineLayoutDescriptor {
                            label: Some("lib_renderer pipeline layout"),
                            bind_group_layouts: &[&bind_group_layout],
                            push_constant_ranges: &[],
                        }),
                ),
                multiview: None,
                primitive: PrimitiveState {
                    front_face: FrontFace::Cw,
                    conservative: false,
                    cull_mode: None,
                    polygon_mode: PolygonMode::Fill,
                    strip_index_format: None,
                    topology: PrimitiveTopology::TriangleList,
                    unclipped_depth: false,
                },
                vertex: VertexState {
                    module: &shader,
                    entry_point: None,
                    compilation_options: PipelineCompilationOptions::default(),
                    buffers: &[VERTEX_BUFFER_LAYOUT],
                },
                fragment: Some(FragmentState {
                    module: &shader,
                    targets: &[Some(ColorTargetState {
                        blend: Some(BlendState::ALPHA_BLENDING),
                        format: ctx.surface_format,
                        write_mask: ColorWrites::all(),
                    })],
                    entry_point: None,
                    compilation_options: PipelineCompilationOptions::default(),
                }),
                multisample: MultisampleState::default(),
            });

        tracing::info!(
            max_quads = config.max_quads,
            atlas_width = atlas.image().width(),
            atlas_height = atlas.image().height(),
            textures = atlas.len(),
            "renderer created"
        );

        Self {
            max_quads: config.max_quads,
            clear_color: config.clear_color,
            vertex_buf,
            index_buf,
            bind_group,
            pipeline,
            atlas,
            font,
        }
    }

    pub fn atlas(&self) -> &TextureAtlas {
        &self.atlas
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn max_quads(&self) -> usize {
        self.max_quads
    }

    /// Uploads the batch's live quads, draws them into `output`, then resets the batch.
    pub fn submit(&self, batch: &mut QuadBatch, output: &TextureView, ctx: GpuContext<'_>) {
        assert_eq!(
            batch.state(),
            BatchState::Ready,
            "quad batch submitted before its frame finished"
        );
        assert!(
            batch.capacity() <= self.max_quads,
            "quad batch capacity {} exceeds renderer max_quads {}",
            batch.capacity(),
            self.max_quads
        );

        let quads = batch.quads();

        if !quads.is_empty() {
            ctx.queue
                .write_buffer(&self.vertex_buf, 0, bytemuck::cast_slice(quads));
        }

        let mut encoder = ctx
            .device
            .create_command_encoder(&CommandEncoderDescriptor::default());

        let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("lib_renderer render pass"),
            timestamp_writes: None,
            occlusion_query_set: None,
            depth_stencil_attachment: None,
            color_attachments: &[Some(RenderPassColorAttachment {
                view: output,
                depth_slice: None,
                ops: Operations {
                    load: LoadOp::Clear(Color {
                        r: self.clear_color.x as f64,
                        g: self.clear_color.y as f64,
                        b: self.clear_color.z as f64,
                        a: self.clear_color.w as f64,
                    }),
                    store: StoreOp::Store,
                },
                resolve_target: None,
            })],
        });

        if !quads.is_empty() {
            let vertex_bytes = (quads.len() * size_of::<Quad>()) as u64;

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.set_vertex_buffer(0, self.vertex_buf.slice(..vertex_bytes));
            pass.set_index_buffer(self.index_buf.slice(..), IndexFormat::Uint32);

            pass.draw_indexed(0..quads.len() as u32 * 6, 0, 0..1);
        }

        drop(pass);

        ctx.queue.submit([encoder.finish()]);

        tracing::trace!(quads = quads.len(), "quad batch submitted");

        batch.reset();
    }
}

fn upload_texture(
    ctx: GpuContext<'_>,
    label: &str,
    format: TextureFormat,
    width: u32,
    height: u32,
    bytes: &[u8],
) -> Texture {
    let texture = ctx.device.create_texture(&TextureDescriptor {
        label: Some(label),
        size: Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format,
        usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
        view_formats: &[],
    });

    let bytes_per_pixel = format.block_copy_size(None).unwrap_or(4);

    ctx.queue.write_texture(
        TexelCopyTextureInfo {
            texture: &texture,
            aspect: TextureAspect::All,
            mip_level: 0,
            origin: Origin3d::ZERO,
        },
        bytes,
        TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * bytes_per_pixel),
            rows_per_image: Some(height),
        },
        texture.size(),
    );

    texture
}

const VERTEX_BUFFER_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: size_of::<Vertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &[
        VertexAttribute {
            format: VertexFormat::Float32x3,
            offset: offset_of!(Vertex, position) as u64,
            shader_location: 0,
        },
        VertexAttribute {
            format: VertexFormat::Float32x4,
            offset: offset_of!(Vertex, color) as u64,
            shader_location: 1,
        },
        VertexAttribute {
            format: VertexFormat::Float32x2,
            offset: offset_of!(Vertex, uv) as u64,
            shader_location: 2,
        },
        VertexAttribute {
            format: VertexFormat::Uint32,
            offset: offset_of!(Vertex, draw_type) as u64,
            shader_location: 3,
        },
    ],
};
