//! Atmosphere shell: a translucent blue sphere slightly larger than the planet.
//! Drawn before the body without writing depth, so only the rim stays visible.

use glam::{Mat4, Vec3};
use globe_render::{
    DepthBuffer, FrameState, FrameUniform, LayerBinding, LayerContext, LayerPipelineDescriptor,
    LayerUniform, MeshBuffer, SphereVertex, create_layer_pipeline, generate_uv_sphere,
};

/// Translucent blue.
pub const ATMOSPHERE_TINT: [f32; 4] = [0.3, 0.6, 1.0, 0.15];

const ATMOSPHERE_SHADER: &str = r#"
struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip: vec4<f32>,
    @location(0) normal: vec3<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip = u_frame.view_proj * u_frame.model * vec4<f32>(in.position, 1.0);
    out.normal = (u_frame.view * u_frame.model * vec4<f32>(in.normal, 0.0)).xyz;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    // Thicker towards the limb.
    let facing = abs(normalize(in.normal).z);
    let alpha = u_layer.tint.a * (1.0 + 2.0 * (1.0 - facing));
    return vec4<f32>(u_layer.tint.rgb, clamp(alpha, 0.0, 1.0));
}
"#;

pub struct AtmosphereLayer {
    pipeline: wgpu::RenderPipeline,
    mesh: MeshBuffer,
    binding: LayerBinding,
    model: Mat4,
}

impl AtmosphereLayer {
    /// `radius` is the shell radius in world units.
    pub fn new(
        ctx: LayerContext<'_>,
        radius: f32,
        tint: [f32; 4],
        slices: u32,
        stacks: u32,
    ) -> Self {
        let pipeline = create_layer_pipeline(
            ctx.device,
            ctx.surface_format,
            &LayerPipelineDescriptor {
                label: "atmosphere-pipeline",
                shader_body: ATMOSPHERE_SHADER,
                bind_group_layouts: &[ctx.uniform_layout],
                vertex_buffers: &[SphereVertex::layout()],
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                depth: DepthBuffer::blended_state(),
                cull_mode: Some(wgpu::Face::Back),
            },
        );
        let mesh = MeshBuffer::from_sphere(
            ctx.device,
            "atmosphere-sphere",
            &generate_uv_sphere(slices, stacks, false),
        );
        let binding = LayerBinding::new(
            ctx.device,
            ctx.uniform_layout,
            "atmosphere",
            LayerUniform::tint(tint),
        );

        Self {
            pipeline,
            mesh,
            binding,
            model: Mat4::from_scale(Vec3::splat(radius)),
        }
    }

    pub fn prepare(&self, queue: &wgpu::Queue, frame: &FrameState) {
        self.binding.write_frame(queue, &FrameUniform::body(frame, self.model));
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, self.binding.bind_group(), &[]);
        self.mesh.draw(pass);
    }
}
