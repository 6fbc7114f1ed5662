//! Textures rebuilt from the model's packed texture buffer.
//!
//! [`Texture`] is the CPU-side image plus its sampling settings, produced
//! once per allocated material. [`GpuTexture`] is the uploaded WGPU
//! counterpart with its view and sampler.

use anyhow::*;
use image::RgbaImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrapping {
    Repeat,
    ClampToEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Linear,
    Nearest,
}

/// An RGBA texture with its sampler configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    /// Id of the source texture in the model.
    pub source: usize,
    pub image: RgbaImage,
    pub wrap_s: Wrapping,
    pub wrap_t: Wrapping,
    pub filter: Filter,
    pub repeat: [f32; 2],
}

impl Texture {
    /// Build a repeat-wrapped, linearly filtered texture from packed RGB
    /// bytes.
    pub fn from_rgb(source: usize, width: u32, height: u32, rgb: &[u8]) -> Self {
        Self {
            source,
            image: unpack_rgb(width, height, rgb),
            wrap_s: Wrapping::Repeat,
            wrap_t: Wrapping::Repeat,
            filter: Filter::Linear,
            repeat: [1.0, 1.0],
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Expand `width * height` RGB pixels into RGBA with opaque alpha.
///
/// Pixels beyond the end of `rgb` stay black.
pub fn unpack_rgb(width: u32, height: u32, rgb: &[u8]) -> RgbaImage {
    let pixels = width as usize * height as usize;
    let mut rgba = vec![0u8; pixels * 4];
    for (dst, src) in rgba.chunks_exact_mut(4).zip(rgb.chunks_exact(3)) {
        dst[..3].copy_from_slice(src);
    }
    for dst in rgba.chunks_exact_mut(4) {
        dst[3] = 255;
    }
    // the buffer length always matches the dimensions
    RgbaImage::from_raw(width, height, rgba).unwrap_or_else(|| RgbaImage::new(width, height))
}

/// A GPU texture with a view and sampler.
#[derive(Clone, Debug)]
pub struct GpuTexture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl GpuTexture {
    /// Upload `texture` as sRGB RGBA8 with its wrapping and filtering.
    pub fn from_texture(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &Texture,
        label: Option<&str>,
    ) -> Result<Self> {
        let (width, height) = texture.image.dimensions();
        if width == 0 || height == 0 {
            bail!("texture {} has zero size", texture.source);
        }

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let gpu_texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &gpu_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            texture.image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = gpu_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = create_sampler(device, texture);

        Ok(Self {
            texture: gpu_texture,
            view,
            sampler,
        })
    }
}

fn address_mode(wrapping: Wrapping) -> wgpu::AddressMode {
    match wrapping {
        Wrapping::Repeat => wgpu::AddressMode::Repeat,
        Wrapping::ClampToEdge => wgpu::AddressMode::ClampToEdge,
    }
}

pub fn create_sampler(device: &wgpu::Device, texture: &Texture) -> wgpu::Sampler {
    let filter = match texture.filter {
        Filter::Linear => wgpu::FilterMode::Linear,
        Filter::Nearest => wgpu::FilterMode::Nearest,
    };
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("model texture sampler"),
        address_mode_u: address_mode(texture.wrap_s),
        address_mode_v: address_mode(texture.wrap_t),
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: filter,
        min_filter: filter,
        ..Default::default()
    })
}
