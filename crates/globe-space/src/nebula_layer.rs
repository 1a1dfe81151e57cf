//! Nebula layer: additive quads facing the scene centre, faded radially.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use globe_render::{
    ADDITIVE_BLEND, DepthBuffer, FrameState, FrameUniform, LayerBinding, LayerContext,
    LayerPipelineDescriptor, LayerUniform, create_layer_pipeline,
};
use wgpu::util::DeviceExt;

use crate::nebula::NebulaPatch;

const NEBULA_SHADER: &str = r#"
struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) local: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) local: vec2<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip = u_frame.view_proj * u_frame.model * vec4<f32>(in.position, 1.0);
    out.color = in.color;
    out.local = in.local;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let falloff = max(1.0 - length(in.local), 0.0);
    let strength = in.color.a * falloff;
    return vec4<f32>(in.color.rgb * strength, strength);
}
"#;

/// Corner vertex of a nebula quad.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
pub struct NebulaVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    /// Quad-local coordinate in [-1, 1]², used for the radial falloff.
    pub local: [f32; 2],
}

impl NebulaVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<NebulaVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Two triangles per patch, lying in the plane perpendicular to the
/// direction from the origin.
pub fn nebula_vertices(patches: &[NebulaPatch]) -> Vec<NebulaVertex> {
    const CORNERS: [[f32; 2]; 6] = [
        [-1.0, -1.0],
        [1.0, -1.0],
        [1.0, 1.0],
        [-1.0, -1.0],
        [1.0, 1.0],
        [-1.0, 1.0],
    ];

    let mut vertices = Vec::with_capacity(patches.len() * CORNERS.len());
    for patch in patches {
        let normal = -patch.position.normalize_or(Vec3::Z);
        let reference = if normal.y.abs() > 0.99 { Vec3::X } else { Vec3::Y };
        let tangent = normal.cross(reference).normalize();
        let bitangent = tangent.cross(normal);
        for [s, t] in CORNERS {
            let corner = patch.position + (tangent * s + bitangent * t) * patch.half_size;
            vertices.push(NebulaVertex {
                position: corner.to_array(),
                color: patch.color,
                local: [s, t],
            });
        }
    }
    vertices
}

/// Draws all nebula patches in one call.
pub struct NebulaLayer {
    pipeline: wgpu::RenderPipeline,
    vertices: Option<wgpu::Buffer>,
    vertex_count: u32,
    binding: LayerBinding,
}

impl NebulaLayer {
    pub fn new(ctx: LayerContext<'_>, patches: &[NebulaPatch]) -> Self {
        let pipeline = create_layer_pipeline(
            ctx.device,
            ctx.surface_format,
            &LayerPipelineDescriptor {
                label: "nebula-pipeline",
                shader_body: NEBULA_SHADER,
                bind_group_layouts: &[ctx.uniform_layout],
                vertex_buffers: &[NebulaVertex::layout()],
                blend: Some(ADDITIVE_BLEND),
                depth: DepthBuffer::backdrop_state(),
                cull_mode: None,
            },
        );

        let data = nebula_vertices(patches);
        let vertices = (!data.is_empty()).then(|| {
            ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("nebula-vertices"),
                contents: bytemuck::cast_slice(&data),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });
        let binding = LayerBinding::new(
            ctx.device,
            ctx.uniform_layout,
            "nebula",
            LayerUniform::tint([1.0; 4]),
        );

        Self {
            pipeline,
            vertices,
            vertex_count: data.len() as u32,
            binding,
        }
    }

    pub fn prepare(&self, queue: &wgpu::Queue, frame: &FrameState) {
        self.binding.write_frame(queue, &FrameUniform::sky(frame, Mat4::IDENTITY));
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        let Some(vertices) = &self.vertices else {
            return;
        };
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, self.binding.bind_group(), &[]);
        pass.set_vertex_buffer(0, vertices.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}
