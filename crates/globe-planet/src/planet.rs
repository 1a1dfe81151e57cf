//! Planet body layer: the textured, optionally lit sphere at the planet radius.

use glam::{Mat4, Vec3};
use globe_render::{
    DepthBuffer, FrameState, FrameUniform, GpuTexture, LayerBinding, LayerContext,
    LayerPipelineDescriptor, MeshBuffer, SphereVertex, create_layer_pipeline, generate_uv_sphere,
};

use crate::material::{LIGHTING_WGSL, PlanetMaterial};

const PLANET_SHADER: &str = r#"
@group(1) @binding(0)
var surface_texture: texture_2d<f32>;
@group(1) @binding(1)
var surface_sampler: sampler;

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
    let albedo = textureSample(surface_texture, surface_sampler, in.uv).rgb * u_layer.tint.rgb;
    if u_frame.params.w > 0.5 {
        return vec4<f32>(lit(albedo, normalize(in.normal)), 1.0);
    }
    return vec4<f32>(albedo, 1.0);
}
"#;

pub struct PlanetLayer {
    pipeline: wgpu::RenderPipeline,
    mesh: MeshBuffer,
    binding: LayerBinding,
    texture: Option<wgpu::BindGroup>,
    model: Mat4,
}

impl PlanetLayer {
    /// Build the layer. Without a texture the layer draws nothing.
    pub fn new(
        ctx: LayerContext<'_>,
        texture: Option<&GpuTexture>,
        radius: f32,
        material: PlanetMaterial,
        slices: u32,
        stacks: u32,
    ) -> Self {
        let shader_body = format!("{LIGHTING_WGSL}\n{PLANET_SHADER}");
        let pipeline = create_layer_pipeline(
            ctx.device,
            ctx.surface_format,
            &LayerPipelineDescriptor {
                label: "planet-pipeline",
                shader_body: &shader_body,
                bind_group_layouts: &[ctx.uniform_layout, ctx.texture_layout],
                vertex_buffers: &[SphereVertex::layout()],
                blend: None,
                depth: DepthBuffer::opaque_state(),
                cull_mode: Some(wgpu::Face::Back),
            },
        );
        let mesh = MeshBuffer::from_sphere(
            ctx.device,
            "planet-sphere",
            &generate_uv_sphere(slices, stacks, false),
        );
        let binding =
            LayerBinding::new(ctx.device, ctx.uniform_layout, "planet", material.to_uniform());
        if texture.is_none() {
            log::warn!("Planet has no surface texture; layer disabled");
        }

        Self {
            pipeline,
            mesh,
            binding,
            texture: texture.map(|t| t.bind_group.clone()),
            model: Mat4::from_scale(Vec3::splat(radius)),
        }
    }

    pub fn prepare(&self, queue: &wgpu::Queue, frame: &FrameState) {
        self.binding.write_frame(queue, &FrameUniform::body(frame, self.model));
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
