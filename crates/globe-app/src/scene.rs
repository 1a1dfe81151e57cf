//! Scene composition: asset loading with procedural fallbacks, content
//! generation, and the six layers drawn back to front in a single pass.

use std::path::Path;

use globe_config::{AssetConfig, Config, SceneConfig};
use globe_planet::{
    ATMOSPHERE_TINT, AtmosphereLayer, CloudGenerator, CloudLayer, CloudMode, CloudPatch,
    PlanetLayer, PlanetMaterial, fallback_planet_texture,
};
use globe_render::{
    DepthBuffer, FrameEncoder, FrameState, LayerContext, LoadedTexture, RenderPassBuilder,
    TextureError, TextureHandle, TextureStore, TextureUploader, WgpuTextureUploader,
    layer_bind_group_layout,
};
use globe_space::{
    BackdropLayer, NebulaGenerator, NebulaLayer, NebulaPatch, StarFieldGenerator, StarFieldLayer,
    StarRecord, fallback_galaxy_texture,
};
use tracing::info;

/// The scene's layers in the order they are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneLayer {
    Backdrop,
    Nebula,
    Stars,
    Atmosphere,
    Planet,
    Clouds,
}

impl SceneLayer {
    /// Unlit background first, then the lit planet and its shells.
    pub const DRAW_ORDER: [SceneLayer; 6] = [
        SceneLayer::Backdrop,
        SceneLayer::Nebula,
        SceneLayer::Stars,
        SceneLayer::Atmosphere,
        SceneLayer::Planet,
        SceneLayer::Clouds,
    ];

    /// Whether the planet lighting toggle applies to this layer.
    pub fn follows_lighting_toggle(self) -> bool {
        matches!(self, SceneLayer::Planet)
    }
}

/// Textures the scene binds, loaded once before the frame loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneAssets {
    pub planet: LoadedTexture,
    pub galaxy: LoadedTexture,
    /// Absent when no cloud mask could be loaded; the clouds are then drawn
    /// as procedural geometry.
    pub clouds: TextureHandle,
}

/// Load the planet, galaxy and cloud images from `content_dir`. Missing or
/// unreadable files are replaced by generated content and recorded in the
/// store's fallback events; only an upload failure is an error.
pub fn load_scene_assets<U: TextureUploader>(
    store: &mut TextureStore<U>,
    content_dir: &Path,
    assets: &AssetConfig,
    scene: &SceneConfig,
) -> Result<SceneAssets, TextureError> {
    let planet_size = scene.planet_fallback_size;
    let planet = store.load_or_fallback(
        &content_dir.join(&assets.planet_texture),
        "planet",
        || fallback_planet_texture(planet_size),
    )?;

    let (galaxy_size, galaxy_seed) = (scene.galaxy_fallback_size, scene.galaxy_seed);
    let galaxy = store.load_or_fallback(
        &content_dir.join(&assets.galaxy_texture),
        "galaxy",
        || fallback_galaxy_texture(galaxy_size, galaxy_seed),
    )?;

    let clouds = store.load_or_record(
        &content_dir.join(&assets.cloud_texture),
        "procedural clouds",
    );

    info!(
        fallbacks = store.fallback_events().len(),
        textures = store.len(),
        "Scene assets loaded"
    );
    Ok(SceneAssets {
        planet,
        galaxy,
        clouds,
    })
}

/// Seeded geometry generated at startup.
#[derive(Debug, Clone)]
pub struct SceneContent {
    pub stars: Vec<StarRecord>,
    pub nebula: Vec<NebulaPatch>,
    pub clouds: Vec<CloudPatch>,
}

pub fn generate_content(scene: &SceneConfig) -> SceneContent {
    let stars = StarFieldGenerator::new(scene.star_seed, scene.star_count)
        .with_radius(scene.star_radius)
        .with_bright_stars(scene.bright_star_count, scene.bright_star_radius)
        .generate();
    let nebula = NebulaGenerator::new(scene.nebula_seed, scene.nebula_count)
        .with_shell(scene.nebula_inner_radius, scene.nebula_outer_radius)
        .generate();
    let clouds = CloudGenerator::new(scene.cloud_seed)
        .with_candidates(scene.cloud_candidates, scene.cloud_keep_fraction)
        .with_radius_scale(scene.cloud_geometry_scale)
        .generate();

    info!(
        stars = stars.len(),
        nebula_patches = nebula.len(),
        cloud_patches = clouds.len(),
        "Generated scene content"
    );
    SceneContent {
        stars,
        nebula,
        clouds,
    }
}

pub struct Scene {
    backdrop: BackdropLayer,
    nebula: NebulaLayer,
    stars: StarFieldLayer,
    atmosphere: AtmosphereLayer,
    planet: PlanetLayer,
    clouds: CloudLayer,
    depth: DepthBuffer,
    pass: RenderPassBuilder,
}

impl Scene {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        viewport: (u32, u32),
        store: &TextureStore<WgpuTextureUploader>,
        assets: &SceneAssets,
        content: &SceneContent,
        config: &Config,
    ) -> Self {
        let scene = &config.scene;
        let uniform_layout = layer_bind_group_layout(device);
        let ctx = LayerContext {
            device,
            surface_format,
            uniform_layout: &uniform_layout,
            texture_layout: store.uploader().bind_group_layout(),
        };
        let (slices, stacks) = (scene.sphere_slices, scene.sphere_stacks);

        let backdrop = BackdropLayer::new(
            ctx,
            store.get(assets.galaxy.handle),
            scene.backdrop_radius,
            scene.backdrop_dim,
            slices,
            stacks,
        );
        let nebula = NebulaLayer::new(ctx, &content.nebula);
        let stars = StarFieldLayer::new(ctx, &content.stars);
        let atmosphere = AtmosphereLayer::new(
            ctx,
            scene.planet_radius * scene.atmosphere_scale,
            ATMOSPHERE_TINT,
            slices,
            stacks,
        );
        let planet = PlanetLayer::new(
            ctx,
            store.get(assets.planet.handle),
            scene.planet_radius,
            PlanetMaterial::default(),
            slices,
            stacks,
        );
        let clouds = match store.get(assets.clouds) {
            Some(texture) => CloudLayer::textured(
                ctx,
                texture,
                scene.planet_radius * scene.cloud_texture_scale,
                scene.cloud_texture_rate,
                slices,
                stacks,
            ),
            None => CloudLayer::procedural(
                ctx,
                &content.clouds,
                scene.planet_radius,
                scene.cloud_geometry_rate,
            ),
        };

        let [r, g, b, a] = config.render.clear_color;
        Self {
            backdrop,
            nebula,
            stars,
            atmosphere,
            planet,
            clouds,
            depth: DepthBuffer::new(device, viewport.0, viewport.1),
            pass: RenderPassBuilder::new()
                .label("scene-pass")
                .clear_color(wgpu::Color { r, g, b, a }),
        }
    }

    pub fn cloud_mode(&self) -> CloudMode {
        self.clouds.mode()
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth.resize(device, width, height);
    }

    /// Upload per-frame uniforms, then clear and draw every layer in
    /// [`SceneLayer::DRAW_ORDER`] within one pass, and present.
    pub fn draw(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_texture: wgpu::SurfaceTexture,
        frame: &FrameState,
    ) {
        for layer in SceneLayer::DRAW_ORDER {
            self.prepare_layer(layer, queue, frame);
        }

        let mut encoder = FrameEncoder::new(device, surface_texture);
        {
            let mut pass = encoder.begin_render_pass(&self.pass, &self.depth);
            for layer in SceneLayer::DRAW_ORDER {
                self.render_layer(layer, &mut pass);
            }
        }
        encoder.submit(queue);
    }

    fn prepare_layer(&self, layer: SceneLayer, queue: &wgpu::Queue, frame: &FrameState) {
        match layer {
            SceneLayer::Backdrop => self.backdrop.prepare(queue, frame),
            SceneLayer::Nebula => self.nebula.prepare(queue, frame),
            SceneLayer::Stars => self.stars.prepare(queue, frame),
            SceneLayer::Atmosphere => self.atmosphere.prepare(queue, frame),
            SceneLayer::Planet => self.planet.prepare(queue, frame),
            SceneLayer::Clouds => self.clouds.prepare(queue, frame),
        }
    }

    fn render_layer(&self, layer: SceneLayer, pass: &mut wgpu::RenderPass<'_>) {
        match layer {
            SceneLayer::Backdrop => self.backdrop.render(pass),
            SceneLayer::Nebula => self.nebula.render(pass),
            SceneLayer::Stars => self.stars.render(pass),
            SceneLayer::Atmosphere => self.atmosphere.render(pass),
            SceneLayer::Planet => self.planet.render(pass),
            SceneLayer::Clouds => self.clouds.render(pass),
        }
    }
}
