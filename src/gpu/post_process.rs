//! Post-processing effects for screen-space rendering.
//!
//! Sprites are drawn into an offscreen HDR texture, then a fullscreen pass
//! adds bloom, film noise and a vignette on the way to the surface.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use super::shaders::POST_PROCESS_SHADER;

/// Format of the offscreen scene target. Float so bright cores survive
/// until the bloom pass.
pub const SCENE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Filter strengths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostParams {
    /// Film grain opacity.
    pub noise: f32,
    pub vignette_offset: f32,
    pub vignette_darkness: f32,
    pub bloom_intensity: f32,
    /// Luminance above which pixels bloom.
    pub bloom_threshold: f32,
}

impl Default for PostParams {
    fn default() -> Self {
        Self {
            noise: 0.05,
            vignette_offset: 0.1,
            vignette_darkness: 1.1,
            bloom_intensity: 1.5,
            bloom_threshold: 0.2,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct PostUniforms {
    resolution: [f32; 2],
    time: f32,
    noise: f32,
    vignette_offset: f32,
    vignette_darkness: f32,
    bloom_intensity: f32,
    bloom_threshold: f32,
}

/// GPU resources for post-processing.
pub struct PostProcessState {
    params: PostParams,
    /// Offscreen render target.
    texture: wgpu::Texture,
    /// View into the offscreen texture.
    pub view: wgpu::TextureView,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// Bind group layout (needed for recreation on resize).
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl PostProcessState {
    /// Create a new post-processing system.
    pub fn new(
        device: &wgpu::Device,
        params: PostParams,
        width: u32,
        height: u32,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let texture = create_scene_texture(device, width, height);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Sampler for the scene texture
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Scene Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Post-Process Uniforms"),
            size: std::mem::size_of::<PostUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Post-Process Shader"),
            source: wgpu::ShaderSource::Wgsl(POST_PROCESS_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Post-Process Bind Group Layout"),
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
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_group =
            create_bind_group(device, &bind_group_layout, &view, &sampler, &uniform_buffer);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Post-Process Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Post-Process Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
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

        Self {
            params,
            texture,
            view,
            pipeline,
            uniform_buffer,
            bind_group,
            bind_group_layout,
            sampler,
        }
    }

    /// Recreate the offscreen target and bind group after a resize.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.texture = create_scene_texture(device, width, height);
        self.view = self.texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.bind_group = create_bind_group(
            device,
            &self.bind_group_layout,
            &self.view,
            &self.sampler,
            &self.uniform_buffer,
        );
    }

    /// Upload this frame's filter uniforms.
    pub fn update(&self, queue: &wgpu::Queue, width: u32, height: u32, time: f32) {
        let p = &self.params;
        let uniforms = PostUniforms {
            resolution: [width as f32, height as f32],
            time,
            noise: p.noise,
            vignette_offset: p.vignette_offset,
            vignette_darkness: p.vignette_darkness,
            bloom_intensity: p.bloom_intensity,
            bloom_threshold: p.bloom_threshold,
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Draw the filtered scene into `target`.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Post-Process Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

fn create_scene_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Offscreen Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: SCENE_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    })
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    uniform_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Post-Process Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: uniform_buffer.as_entire_binding(),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniforms_match_shader_layout() {
        // vec2 + six f32 scalars.
        assert_eq!(std::mem::size_of::<PostUniforms>(), 32);
    }

    #[test]
    fn test_default_filters() {
        let p = PostParams::default();
        assert_eq!(p.noise, 0.05);
        assert_eq!(p.vignette_offset, 0.1);
        assert_eq!(p.vignette_darkness, 1.1);
    }
}
