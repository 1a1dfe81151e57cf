//! Shared pipeline plumbing for the scene layers.
//!
//! Every layer shader starts with [`LAYER_PRELUDE_WGSL`]: group 0 carries the
//! per-frame uniform and a per-layer uniform, group 1 (optional) a texture.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::frame::FrameUniform;

/// WGSL declarations shared by all layer shaders.
pub const LAYER_PRELUDE_WGSL: &str = r#"
struct Frame {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
    model: mat4x4<f32>,
    // x, y: viewport; z: elapsed seconds; w: lighting on
    params: vec4<f32>,
};

struct Layer {
    tint: vec4<f32>,
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> u_frame: Frame;
@group(0) @binding(1)
var<uniform> u_layer: Layer;
"#;

/// Per-layer constants (tint and four layer-specific scalars).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
pub struct LayerUniform {
    pub tint: [f32; 4],
    pub params: [f32; 4],
}

impl LayerUniform {
    pub fn new(tint: [f32; 4], params: [f32; 4]) -> Self {
        Self { tint, params }
    }

    pub fn tint(tint: [f32; 4]) -> Self {
        Self::new(tint, [0.0; 4])
    }
}

/// Additive blending: `src + dst`.
pub const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Layout of group 0: frame uniform at binding 0, layer uniform at binding 1.
pub fn layer_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let uniform_entry = |binding: u32, size: usize| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(size as u64),
        },
        count: None,
    };
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("layer-uniform-bgl"),
        entries: &[
            uniform_entry(0, std::mem::size_of::<FrameUniform>()),
            uniform_entry(1, std::mem::size_of::<LayerUniform>()),
        ],
    })
}

/// Uniform buffers and bind group for one draw.
pub struct LayerBinding {
    frame_buffer: wgpu::Buffer,
    layer_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl LayerBinding {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        layer: LayerUniform,
    ) -> Self {
        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label}-frame-uniform")),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let layer_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-layer-uniform")),
            contents: bytemuck::cast_slice(&[layer]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}-uniform-bg")),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: layer_buffer.as_entire_binding(),
                },
            ],
        });
        Self {
            frame_buffer,
            layer_buffer,
            bind_group,
        }
    }

    pub fn write_frame(&self, queue: &wgpu::Queue, uniform: &FrameUniform) {
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[*uniform]));
    }

    pub fn write_layer(&self, queue: &wgpu::Queue, uniform: &LayerUniform) {
        queue.write_buffer(&self.layer_buffer, 0, bytemuck::cast_slice(&[*uniform]));
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Device handles and layouts shared by every layer constructor.
#[derive(Clone, Copy)]
pub struct LayerContext<'a> {
    pub device: &'a wgpu::Device,
    pub surface_format: wgpu::TextureFormat,
    /// Group 0, from [`layer_bind_group_layout`].
    pub uniform_layout: &'a wgpu::BindGroupLayout,
    /// Group 1 for textured layers.
    pub texture_layout: &'a wgpu::BindGroupLayout,
}

/// Fixed-function state of one layer pipeline.
pub struct LayerPipelineDescriptor<'a> {
    pub label: &'a str,
    /// Shader body appended to [`LAYER_PRELUDE_WGSL`]; must define `vs_main` and `fs_main`.
    pub shader_body: &'a str,
    pub bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    pub vertex_buffers: &'a [wgpu::VertexBufferLayout<'a>],
    pub blend: Option<wgpu::BlendState>,
    pub depth: wgpu::DepthStencilState,
    pub cull_mode: Option<wgpu::Face>,
}

/// Full WGSL source for a layer shader body.
pub fn layer_shader_source(shader_body: &str) -> String {
    format!("{LAYER_PRELUDE_WGSL}\n{shader_body}")
}

/// Build a triangle-list pipeline rendering into the surface format.
pub fn create_layer_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    desc: &LayerPipelineDescriptor<'_>,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(desc.label),
        source: wgpu::ShaderSource::Wgsl(layer_shader_source(desc.shader_body).into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(desc.label),
        bind_group_layouts: desc.bind_group_layouts,
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: desc.vertex_buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: desc.cull_mode,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(desc.depth.clone()),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: desc.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_uniform_size() {
        assert_eq!(std::mem::size_of::<LayerUniform>(), 32);
    }

    #[test]
    fn test_shader_source_starts_with_prelude() {
        let src = layer_shader_source("fn body() {}");
        assert!(src.starts_with(LAYER_PRELUDE_WGSL));
        assert!(src.ends_with("fn body() {}"));
    }

    #[test]
    fn test_additive_blend_adds_source_and_destination() {
        assert_eq!(ADDITIVE_BLEND.color.src_factor, wgpu::BlendFactor::One);
        assert_eq!(ADDITIVE_BLEND.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(ADDITIVE_BLEND.color.operation, wgpu::BlendOperation::Add);
    }

    #[test]
    fn test_layer_binding_creation() {
        let Some((device, queue)) = crate::texture::create_test_device_queue() else {
            return;
        };
        let layout = layer_bind_group_layout(&device);
        let binding = LayerBinding::new(&device, &layout, "test", LayerUniform::tint([1.0; 4]));
        binding.write_layer(&queue, &LayerUniform::tint([0.5; 4]));
        queue.submit([]);
    }
}
