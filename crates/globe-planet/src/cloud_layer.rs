//! Cloud layer. With a cloud mask it draws a textured shell just above the
//! surface; without one it draws the procedural triangles. Either way the
//! clouds turn about the planet axis with elapsed time, each mode at its own
//! rate, and are always lit.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use globe_render::{
    DepthBuffer, FrameState, FrameUniform, GpuTexture, LayerBinding, LayerContext,
    LayerPipelineDescriptor, LayerUniform, MeshBuffer, SphereVertex, create_layer_pipeline,
    generate_uv_sphere,
};
use wgpu::util::DeviceExt;

use crate::clouds::CloudPatch;
use crate::material::LIGHTING_WGSL;

/// Ambient / diffuse / specular / shininess for clouds.
const CLOUD_LIGHTING: [f32; 4] = [0.45, 0.55, 0.0, 1.0];

const TEXTURED_CLOUD_SHADER: &str = r#"
@group(1) @binding(0)
var cloud_texture: texture_2d<f32>;
@group(1) @binding(1)
var cloud_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip = u_frame.view_proj * u_frame.model * vec4<f32>(in.position, 1.0);
    out.normal = view_normal(in.normal);
    out.uv = in.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let mask = textureSample(cloud_texture, cloud_sampler, in.uv).rgb;
    let density = max(mask.r, max(mask.g, mask.b));
    let color = lit(u_layer.tint.rgb, normalize(in.normal));
    return vec4<f32>(color, density * u_layer.tint.a);
}
"#;

const PROCEDURAL_CLOUD_SHADER: &str = r#"
struct VertexInput {
    @location(0) position: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip: vec4<f32>,
    @location(0) normal: vec3<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip = u_frame.view_proj * u_frame.model * vec4<f32>(in.position, 1.0);
    out.normal = view_normal(normalize(in.position));
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = lit(u_layer.tint.rgb, normalize(in.normal));
    return vec4<f32>(color, u_layer.tint.a);
}
"#;

/// Which cloud representation the layer draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloudMode {
    Procedural,
    Textured,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct CloudVertex {
    position: [f32; 3],
}

impl CloudVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CloudVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Model matrix of the cloud shell after `elapsed` seconds.
pub fn cloud_model(elapsed: f32, rate: f32, scale: f32) -> Mat4 {
    Mat4::from_rotation_y(elapsed * rate) * Mat4::from_scale(Vec3::splat(scale))
}

enum CloudGeometry {
    Triangles {
        vertices: Option<wgpu::Buffer>,
        count: u32,
    },
    Shell {
        mesh: MeshBuffer,
        texture: wgpu::BindGroup,
    },
}

pub struct CloudLayer {
    pipeline: wgpu::RenderPipeline,
    geometry: CloudGeometry,
    binding: LayerBinding,
    scale: f32,
    rate: f32,
}

impl CloudLayer {
    /// Procedural triangles. `planet_radius` scales the unit-radius patches;
    /// `rate` is in radians per second.
    pub fn procedural(
        ctx: LayerContext<'_>,
        patches: &[CloudPatch],
        planet_radius: f32,
        rate: f32,
    ) -> Self {
        let shader_body = format!("{LIGHTING_WGSL}\n{PROCEDURAL_CLOUD_SHADER}");
        let pipeline = Self::pipeline(
            ctx,
            "procedural-cloud-pipeline",
            &shader_body,
            &[ctx.uniform_layout],
            CloudVertex::layout(),
            None,
        );

        let data: Vec<CloudVertex> = patches
            .iter()
            .flat_map(|p| p.vertices)
            .map(|v| CloudVertex {
                position: v.to_array(),
            })
            .collect();
        let vertices = (!data.is_empty()).then(|| {
            ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("cloud-vertices"),
                contents: bytemuck::cast_slice(&data),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });

        Self {
            pipeline,
            geometry: CloudGeometry::Triangles {
                vertices,
                count: data.len() as u32,
            },
            binding: Self::binding(ctx, [1.0, 1.0, 1.0, 0.6]),
            scale: planet_radius,
            rate,
        }
    }

    /// Textured shell of radius `radius`.
    pub fn textured(
        ctx: LayerContext<'_>,
        texture: &GpuTexture,
        radius: f32,
        rate: f32,
        slices: u32,
        stacks: u32,
    ) -> Self {
        let shader_body = format!("{LIGHTING_WGSL}\n{TEXTURED_CLOUD_SHADER}");
        let pipeline = Self::pipeline(
            ctx,
            "textured-cloud-pipeline",
            &shader_body,
            &[ctx.uniform_layout, ctx.texture_layout],
            SphereVertex::layout(),
            Some(wgpu::Face::Back),
        );
        let mesh = MeshBuffer::from_sphere(
            ctx.device,
            "cloud-sphere",
            &generate_uv_sphere(slices, stacks, false),
        );

        Self {
            pipeline,
            geometry: CloudGeometry::Shell {
                mesh,
                texture: texture.bind_group.clone(),
            },
            binding: Self::binding(ctx, [1.0; 4]),
            scale: radius,
            rate,
        }
    }

    fn pipeline(
        ctx: LayerContext<'_>,
        label: &str,
        shader_body: &str,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        vertex_layout: wgpu::VertexBufferLayout<'static>,
        cull_mode: Option<wgpu::Face>,
    ) -> wgpu::RenderPipeline {
        create_layer_pipeline(
            ctx.device,
            ctx.surface_format,
            &LayerPipelineDescriptor {
                label,
                shader_body,
                bind_group_layouts,
                vertex_buffers: &[vertex_layout],
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                depth: DepthBuffer::blended_state(),
                cull_mode,
            },
        )
    }

    fn binding(ctx: LayerContext<'_>, tint: [f32; 4]) -> LayerBinding {
        LayerBinding::new(
            ctx.device,
            ctx.uniform_layout,
            "clouds",
            LayerUniform::new(tint, CLOUD_LIGHTING),
        )
    }

    pub fn mode(&self) -> CloudMode {
        match self.geometry {
            CloudGeometry::Triangles { .. } => CloudMode::Procedural,
            CloudGeometry::Shell { .. } => CloudMode::Textured,
        }
    }

    pub fn prepare(&self, queue: &wgpu::Queue, frame: &FrameState) {
        let model = cloud_model(frame.elapsed, self.rate, self.scale);
        self.binding.write_frame(queue, &FrameUniform::body(frame, model));
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        match &self.geometry {
            CloudGeometry::Triangles { vertices, count } => {
                let Some(vertices) = vertices else {
                    return;
                };
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, self.binding.bind_group(), &[]);
                pass.set_vertex_buffer(0, vertices.slice(..));
                pass.draw(0..*count, 0..1);
            }
            CloudGeometry::Shell { mesh, texture } => {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, self.binding.bind_group(), &[]);
                pass.set_bind_group(1, texture, &[]);
                mesh.draw(pass);
            }
        }
    }
}
