//! Texture loading with procedural fallback.
//!
//! [`TextureStore`] owns every texture the scene binds. Image files are
//! decoded with the `image` crate and handed to a [`TextureUploader`]; a
//! missing or corrupt file never fails the session, it yields either the
//! absent handle or a caller-supplied fallback image plus a recorded
//! [`FallbackEvent`]. [`release_all`](TextureStore::release_all) frees each
//! texture exactly once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::RgbImage;

/// Opaque texture handle. `0` means absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

impl TextureHandle {
    /// The absent texture. Layers must skip or substitute when they see it.
    pub const ABSENT: TextureHandle = TextureHandle(0);

    pub fn is_absent(self) -> bool {
        self.0 == 0
    }

    pub fn id(self) -> u32 {
        self.0
    }
}

/// Errors that can occur while decoding or uploading a texture.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// The file could not be opened or decoded.
    #[error("failed to load {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Larger than the device can hold in one 2D texture.
    #[error("texture is {width}x{height}, the device limit is {max}")]
    TooLarge { width: u32, height: u32, max: u32 },

    /// Width or height is zero.
    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    /// Pixel data length doesn't match the dimensions.
    #[error("texture data size ({actual}) does not match expected ({expected}) for {width}x{height}")]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },
}

/// Where a texture's pixels came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureOrigin {
    File(PathBuf),
    Fallback { kind: String },
}

/// Result of [`TextureStore::load_or_fallback`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTexture {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
    pub origin: TextureOrigin,
}

/// A file that could not be used and the fallback that replaced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackEvent {
    pub path: PathBuf,
    pub kind: String,
    pub reason: String,
}

/// Backend that turns RGB8 pixels into a bindable texture.
pub trait TextureUploader {
    type Texture;

    fn upload(&mut self, label: &str, image: &RgbImage) -> Result<Self::Texture, TextureError>;

    /// Largest width or height [`upload`](Self::upload) accepts.
    fn max_dimension(&self) -> u32 {
        u32::MAX
    }

    fn release(&mut self, texture: Self::Texture);
}

struct StoredTexture<T> {
    texture: T,
    width: u32,
    height: u32,
}

/// Owner of all scene textures.
pub struct TextureStore<U: TextureUploader> {
    uploader: U,
    textures: HashMap<TextureHandle, StoredTexture<U::Texture>>,
    next_id: u32,
    fallback_events: Vec<FallbackEvent>,
}

impl<U: TextureUploader> TextureStore<U> {
    pub fn new(uploader: U) -> Self {
        Self {
            uploader,
            textures: HashMap::new(),
            next_id: 1,
            fallback_events: Vec::new(),
        }
    }

    /// Decode an image file to RGB8.
    pub fn decode(path: &Path) -> Result<RgbImage, TextureError> {
        let image = image::open(path).map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(image.to_rgb8())
    }

    /// Decode `path` and reject images the uploader cannot hold, so an
    /// oversized file takes the same fallback path as a corrupt one.
    fn decode_usable(&self, path: &Path) -> Result<RgbImage, TextureError> {
        let image = Self::decode(path)?;
        check_dimensions(&image, self.uploader.max_dimension())?;
        Ok(image)
    }

    /// Load a file. Any failure is logged and yields [`TextureHandle::ABSENT`].
    pub fn load(&mut self, path: &Path) -> TextureHandle {
        match self.decode_usable(path).and_then(|image| self.upload(&path.display().to_string(), &image))
        {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("Texture unavailable, continuing without it: {e}");
                TextureHandle::ABSENT
            }
        }
    }

    /// Load a file whose substitute is not a texture (procedural cloud
    /// geometry, for instance). A failure is recorded as a
    /// [`FallbackEvent`] of `kind` and yields [`TextureHandle::ABSENT`].
    pub fn load_or_record(&mut self, path: &Path, kind: &str) -> TextureHandle {
        match self.decode_usable(path).and_then(|image| self.upload(&path.display().to_string(), &image))
        {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("Could not use {}; falling back to {kind} ({e})", path.display());
                self.fallback_events.push(FallbackEvent {
                    path: path.to_path_buf(),
                    kind: kind.to_string(),
                    reason: e.to_string(),
                });
                TextureHandle::ABSENT
            }
        }
    }

    /// Load a file, or upload `fallback()` if it cannot be used. The
    /// fallback is recorded as a [`FallbackEvent`] and logged.
    pub fn load_or_fallback(
        &mut self,
        path: &Path,
        kind: &str,
        fallback: impl FnOnce() -> RgbImage,
    ) -> Result<LoadedTexture, TextureError> {
        let decoded = self.decode_usable(path);
        match decoded {
            Ok(image) => {
                let handle = self.upload(&path.display().to_string(), &image)?;
                log::info!(
                    "Loaded {} ({}x{})",
                    path.display(),
                    image.width(),
                    image.height()
                );
                Ok(LoadedTexture {
                    handle,
                    width: image.width(),
                    height: image.height(),
                    origin: TextureOrigin::File(path.to_path_buf()),
                })
            }
            Err(e) => {
                log::warn!(
                    "Could not use {}; generating procedural {kind} texture instead ({e})",
                    path.display()
                );
                self.fallback_events.push(FallbackEvent {
                    path: path.to_path_buf(),
                    kind: kind.to_string(),
                    reason: e.to_string(),
                });
                let image = fallback();
                let handle = self.procedural_fallback(kind, &image)?;
                Ok(LoadedTexture {
                    handle,
                    width: image.width(),
                    height: image.height(),
                    origin: TextureOrigin::Fallback {
                        kind: kind.to_string(),
                    },
                })
            }
        }
    }

    /// Upload a generated texture.
    pub fn procedural_fallback(
        &mut self,
        kind: &str,
        image: &RgbImage,
    ) -> Result<TextureHandle, TextureError> {
        self.upload(&format!("procedural-{kind}"), image)
    }

    /// Upload an already decoded image and register it.
    pub fn upload(&mut self, label: &str, image: &RgbImage) -> Result<TextureHandle, TextureError> {
        check_dimensions(image, self.uploader.max_dimension())?;
        let texture = self.uploader.upload(label, image)?;
        let handle = TextureHandle(self.next_id);
        self.next_id += 1;
        self.textures.insert(
            handle,
            StoredTexture {
                texture,
                width: image.width(),
                height: image.height(),
            },
        );
        Ok(handle)
    }

    /// The texture behind `handle`, or `None` for absent/released handles.
    pub fn get(&self, handle: TextureHandle) -> Option<&U::Texture> {
        self.textures.get(&handle).map(|t| &t.texture)
    }

    pub fn dimensions(&self, handle: TextureHandle) -> Option<(u32, u32)> {
        self.textures.get(&handle).map(|t| (t.width, t.height))
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn fallback_events(&self) -> &[FallbackEvent] {
        &self.fallback_events
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    /// Release every texture. Returns how many were released; a second
    /// call releases nothing.
    pub fn release_all(&mut self) -> usize {
        let released = self.textures.len();
        for (_, stored) in self.textures.drain() {
            self.uploader.release(stored.texture);
        }
        if released > 0 {
            log::info!("Released {released} textures");
        }
        released
    }
}

/// A GPU texture with its view and ready-to-bind group.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
    pub dimensions: (u32, u32),
}

/// Uploads RGB8 images as repeat-wrapped, linearly filtered sRGB textures.
pub struct WgpuTextureUploader {
    device: wgpu::Device,
    queue: wgpu::Queue,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl WgpuTextureUploader {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sampler-repeat-linear"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture-bind-group-layout"),
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
            ],
        });

        Self {
            device: device.clone(),
            queue: queue.clone(),
            bind_group_layout,
            sampler,
        }
    }

    /// Layout of the bind group attached to every [`GpuTexture`].
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }
}

impl TextureUploader for WgpuTextureUploader {
    type Texture = GpuTexture;

    fn upload(&mut self, label: &str, image: &RgbImage) -> Result<GpuTexture, TextureError> {
        check_dimensions(image, self.max_dimension())?;
        let (width, height) = image.dimensions();
        let rgba = rgb_to_rgba(image.as_raw(), width, height)?;

        use wgpu::util::DeviceExt;
        let texture = self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &rgba,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        Ok(GpuTexture {
            texture,
            view,
            bind_group,
            dimensions: (width, height),
        })
    }

    fn max_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    fn release(&mut self, texture: GpuTexture) {
        texture.texture.destroy();
    }
}

fn check_dimensions(image: &RgbImage, max: u32) -> Result<(), TextureError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroDimensions { width, height });
    }
    if width > max || height > max {
        return Err(TextureError::TooLarge { width, height, max });
    }
    Ok(())
}

/// Expand tightly packed RGB8 to RGBA8 with opaque alpha.
fn rgb_to_rgba(rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>, TextureError> {
    let expected = width as usize * height as usize * 3;
    if rgb.len() != expected {
        return Err(TextureError::DataSizeMismatch {
            actual: rgb.len(),
            expected,
            width,
            height,
        });
    }
    let mut rgba = Vec::with_capacity(expected / 3 * 4);
    for px in rgb.chunks_exact(3) {
        rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
    }
    Ok(rgba)
}

/// Headless device for GPU tests; `None` when no adapter is available.
#[doc(hidden)]
pub fn create_test_device_queue() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok()?;

        adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .ok()
    })
}
