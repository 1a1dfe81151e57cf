//! wgpu plumbing shared by every scene layer: GPU context, depth buffer,
//! frame encoding, projection camera, sphere meshes, and the texture store.

pub mod camera;
pub mod depth;
pub mod frame;
pub mod gpu;
pub mod mesh;
pub mod pass;
pub mod pipeline;
pub mod texture;

pub use camera::{Camera, Projection};
pub use depth::DepthBuffer;
pub use frame::{FrameState, FrameUniform};
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use mesh::{MeshBuffer, SphereMesh, SphereVertex, generate_uv_sphere};
pub use pass::{FrameEncoder, RenderPassBuilder};
pub use pipeline::{
    ADDITIVE_BLEND, LAYER_PRELUDE_WGSL, LayerBinding, LayerContext, LayerPipelineDescriptor,
    LayerUniform, create_layer_pipeline, layer_bind_group_layout, layer_shader_source,
};
pub use texture::{
    FallbackEvent, GpuTexture, LoadedTexture, TextureError, TextureHandle, TextureOrigin,
    TextureStore, TextureUploader, WgpuTextureUploader, create_test_device_queue,
};
