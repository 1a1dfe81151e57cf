//! Backdrop layer: a large inside-out sphere textured with the galaxy image,
//! dimmed so the star field reads on top of it.

use glam::Mat4;
use globe_render::{
    DepthBuffer, FrameState, FrameUniform, GpuTexture, LayerBinding, LayerContext,
    LayerPipelineDescriptor, LayerUniform, MeshBuffer, SphereVertex, create_layer_pipeline,
    generate_uv_sphere,
};

const BACKDROP_SHADER: &str = r#"
@group(1) @binding(0)
var backdrop_texture: texture_2d<f32>;
@group(1) @binding(1)
var backdrop_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip = u_frame.view_proj * u_frame.model * vec4<f32>(in.position, 1.0);
    out.uv = in.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(backdrop_texture, backdrop_sampler, in.uv);
    return vec4<f32>(color.rgb * u_layer.tint.rgb, 1.0);
}
"#;

/// Inside-out galaxy sphere centred on the planet.
pub struct BackdropLayer {
    pipeline: wgpu::RenderPipeline,
    mesh: MeshBuffer,
    binding: LayerBinding,
    texture: Option<wgpu::BindGroup>,
    model: Mat4,
}

impl BackdropLayer {
    /// Build the layer. Without a texture the layer draws nothing.
    pub fn new(
        ctx: LayerContext<'_>,
        texture: Option<&GpuTexture>,
        radius: f32,
        dim: f32,
        slices: u32,
        stacks: u32,
    ) -> Self {
        let pipeline = create_layer_pipeline(
            ctx.device,
            ctx.surface_format,
            &LayerPipelineDescriptor {
                label: "backdrop-pipeline",
                shader_body: BACKDROP_SHADER,
                bind_group_layouts: &[ctx.uniform_layout, ctx.texture_layout],
                vertex_buffers: &[SphereVertex::layout()],
                blend: None,
                depth: DepthBuffer::backdrop_state(),
                cull_mode: None,
            },
        );
        let mesh = MeshBuffer::from_sphere(
            ctx.device,
            "backdrop-sphere",
            &generate_uv_sphere(slices, stacks, true),
        );
        let binding = LayerBinding::new(
            ctx.device,
            ctx.uniform_layout,
            "backdrop",
            LayerUniform::tint([dim, dim, dim, 1.0]),
        );
        if texture.is_none() {
            log::warn!("Backdrop has no texture; layer disabled");
        }

        Self {
            pipeline,
            mesh,
            binding,
            texture: texture.map(|t| t.bind_group.clone()),
            model: Mat4::from_scale(glam::Vec3::splat(radius)),
        }
    }

    pub fn prepare(&self, queue: &wgpu::Queue, frame: &FrameState) {
        self.binding.write_frame(queue, &FrameUniform::sky(frame, self.model));
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        let Some(texture) = &self.texture else {
            return;
        };
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, self.binding.bind_group(), &[]);
        pass.set_bind_group(1, texture, &[]);
        self.mesh.draw(pass);
    }
}
