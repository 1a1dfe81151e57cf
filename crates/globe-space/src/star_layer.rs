//! Star field layer: one instanced batch of screen-space quads per star class,
//! drawn in [`StarClass::DRAW_ORDER`] so larger points land on top.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use globe_render::{
    DepthBuffer, FrameState, FrameUniform, LayerBinding, LayerContext, LayerPipelineDescriptor,
    LayerUniform, create_layer_pipeline,
};
use wgpu::util::DeviceExt;

use crate::starfield::{StarClass, StarRecord};

const STAR_SHADER: &str = r#"
struct StarInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) idx: u32, star: StarInput) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-0.5, -0.5),
        vec2<f32>(0.5, -0.5),
        vec2<f32>(0.5, 0.5),
        vec2<f32>(-0.5, -0.5),
        vec2<f32>(0.5, 0.5),
        vec2<f32>(-0.5, 0.5),
    );
    let centre = u_frame.view_proj * u_frame.model * vec4<f32>(star.position, 1.0);
    // params.x is the point size in pixels; NDC spans two units per viewport.
    let offset = corners[idx] * u_layer.params.x * 2.0 / u_frame.params.xy;

    var out: VertexOutput;
    out.clip = vec4<f32>(centre.xy + offset * centre.w, centre.zw);
    out.color = star.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color * u_layer.tint.rgb, 1.0);
}
"#;

/// Per-instance star data.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
pub struct StarInstance {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl StarInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<StarInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Split stars into instance lists indexed by [`StarClass::index`].
pub fn partition_by_class(stars: &[StarRecord]) -> [Vec<StarInstance>; 4] {
    let mut batches: [Vec<StarInstance>; 4] = Default::default();
    for star in stars {
        batches[star.class.index()].push(StarInstance {
            position: star.position.to_array(),
            color: star.color,
        });
    }
    batches
}

struct StarBatch {
    class: StarClass,
    instances: wgpu::Buffer,
    count: u32,
    binding: LayerBinding,
}

/// Draws the whole star field.
pub struct StarFieldLayer {
    pipeline: wgpu::RenderPipeline,
    batches: Vec<StarBatch>,
}

impl StarFieldLayer {
    pub fn new(ctx: LayerContext<'_>, stars: &[StarRecord]) -> Self {
        let pipeline = create_layer_pipeline(
            ctx.device,
            ctx.surface_format,
            &LayerPipelineDescriptor {
                label: "star-pipeline",
                shader_body: STAR_SHADER,
                bind_group_layouts: &[ctx.uniform_layout],
                vertex_buffers: &[StarInstance::layout()],
                blend: None,
                depth: DepthBuffer::backdrop_state(),
                cull_mode: None,
            },
        );

        let mut partitioned = partition_by_class(stars);
        let batches = StarClass::DRAW_ORDER
            .iter()
            .filter_map(|&class| {
                let instances = std::mem::take(&mut partitioned[class.index()]);
                if instances.is_empty() {
                    return None;
                }
                let label = format!("stars-{class:?}");
                let buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&label),
                    contents: bytemuck::cast_slice(&instances),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let binding = LayerBinding::new(
                    ctx.device,
                    ctx.uniform_layout,
                    &label,
                    LayerUniform::new([1.0; 4], [class.point_size(), 0.0, 0.0, 0.0]),
                );
                Some(StarBatch {
                    class,
                    instances: buffer,
                    count: instances.len() as u32,
                    binding,
                })
            })
            .collect();

        Self { pipeline, batches }
    }

    /// Number of stars per non-empty class, in draw order.
    pub fn batch_sizes(&self) -> Vec<(StarClass, u32)> {
        self.batches.iter().map(|b| (b.class, b.count)).collect()
    }

    pub fn prepare(&self, queue: &wgpu::Queue, frame: &FrameState) {
        let uniform = FrameUniform::sky(frame, Mat4::IDENTITY);
        for batch in &self.batches {
            batch.binding.write_frame(queue, &uniform);
        }
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        for batch in &self.batches {
            pass.set_bind_group(0, batch.binding.bind_group(), &[]);
            pass.set_vertex_buffer(0, batch.instances.slice(..));
            pass.draw(0..6, 0..batch.count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::starfield::star_field;
    use globe_render::{create_test_device_queue, layer_bind_group_layout};

    #[test]
    fn test_instance_size() {
        assert_eq!(std::mem::size_of::<StarInstance>(), 24);
    }

    #[test]
    fn test_partition_keeps_every_star() {
        let stars = star_field(500, 42);
        let batches = partition_by_class(&stars);
        let total: usize = batches.iter().map(Vec::len).sum();
        assert_eq!(total, stars.len());
        assert_eq!(batches[StarClass::Bright.index()].len(), 50);
    }

    #[test]
    fn test_partition_preserves_generation_order() {
        let stars = star_field(200, 8);
        let batches = partition_by_class(&stars);
        let normals: Vec<[f32; 3]> = stars
            .iter()
            .filter(|s| s.class == StarClass::Normal)
            .map(|s| s.position.to_array())
            .collect();
        let batched: Vec<[f32; 3]> = batches[0].iter().map(|i| i.position).collect();
        assert_eq!(normals, batched);
    }

    #[test]
    fn test_layer_batches_follow_draw_order() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let uniform_layout = layer_bind_group_layout(&device);
        let texture_layout = globe_render::WgpuTextureUploader::new(&device, &queue);
        let ctx = LayerContext {
            device: &device,
            surface_format: wgpu::TextureFormat::Rgba8UnormSrgb,
            uniform_layout: &uniform_layout,
            texture_layout: texture_layout.bind_group_layout(),
        };
        let layer = StarFieldLayer::new(ctx, &star_field(2000, 42));
        let classes: Vec<StarClass> = layer.batch_sizes().iter().map(|(c, _)| *c).collect();
        assert_eq!(classes, StarClass::DRAW_ORDER.to_vec());
    }
}
