//! Texture resource management for wgpu
//!
//! Provides utilities for creating GPU textures, views, and samplers: depth
//! buffers, the key light's shadow map, and uploaded fabric textures.

use crate::fabric::{Anisotropy, ColorSpace, FabricPixels, FabricTexture, WrapMode};

/// GPU texture resource containing texture, view, and sampler
///
/// Bundles the three main components needed for texture operations:
/// - Texture: The actual GPU memory allocation
/// - View: Interface for shader access
/// - Sampler: Filtering and addressing configuration
#[derive(Clone)]
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl TextureResource {
    /// Standard depth buffer format used throughout the engine
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Creates a depth texture matching the surface configuration
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Square depth target for the key light, sampled with a comparison sampler
    pub fn create_shadow_map(device: &wgpu::Device, size: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Uploads a synthesized fabric texture with a full mip chain
    ///
    /// Textures larger than the device allows are replaced by the 1x1
    /// placeholder so the material still renders, untextured.
    pub fn from_fabric(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        fabric: &FabricTexture,
        max_anisotropy: u16,
        label: &str,
    ) -> Self {
        let max_dimension = device.limits().max_texture_dimension_2d;
        if !fits_device(fabric.size(), max_dimension) {
            log::warn!(
                "{}: {}px fabric exceeds the device limit of {}px, using placeholder",
                label,
                fabric.size(),
                max_dimension
            );
            return Self::from_fabric(device, queue, &FabricTexture::placeholder(), 1, label);
        }

        let format = match fabric.sampler.color_space {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        };
        let levels = mip_chain(&fabric.pixels);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: fabric.size(),
                height: fabric.size(),
                depth_or_array_layers: 1,
            },
            mip_level_count: levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, pixels) in levels.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &pixels.data,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * pixels.size),
                    rows_per_image: Some(pixels.size),
                },
                wgpu::Extent3d {
                    width: pixels.size,
                    height: pixels.size,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: address_mode(fabric.sampler.wrap_u),
            address_mode_v: address_mode(fabric.sampler.wrap_v),
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            anisotropy_clamp: resolve_anisotropy(fabric.sampler.anisotropy, max_anisotropy),
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

fn address_mode(wrap: WrapMode) -> wgpu::AddressMode {
    match wrap {
        WrapMode::Repeat => wgpu::AddressMode::Repeat,
        WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
    }
}

pub(crate) fn fits_device(size: u32, max_dimension: u32) -> bool {
    size > 0 && size <= max_dimension
}

/// Clamp value for the sampler; 1 disables anisotropic filtering
pub(crate) fn resolve_anisotropy(request: Anisotropy, device_max: u16) -> u16 {
    match request {
        Anisotropy::Disabled => 1,
        Anisotropy::Max => device_max.clamp(1, 16),
    }
}

/// Base level followed by 2x2 box-filtered reductions down to 1x1
pub(crate) fn mip_chain(base: &FabricPixels) -> Vec<FabricPixels> {
    let mut levels = vec![base.clone()];
    while let Some(last) = levels.last() {
        if last.size <= 1 {
            break;
        }
        let next = downsample(last);
        levels.push(next);
    }
    levels
}

fn downsample(src: &FabricPixels) -> FabricPixels {
    let size = (src.size / 2).max(1);
    let mut data = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let (sx, sy) = ((x * 2).min(src.size - 1), (y * 2).min(src.size - 1));
            let (sx1, sy1) = ((sx + 1).min(src.size - 1), (sy + 1).min(src.size - 1));
            let taps = [src.pixel(sx, sy), src.pixel(sx1, sy), src.pixel(sx, sy1), src.pixel(sx1, sy1)];
            for channel in 0..4 {
                let sum: u32 = taps.iter().map(|t| t[channel] as u32).sum();
                data.push(((sum + 2) / 4) as u8);
            }
        }
    }
    FabricPixels { size, data }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::Rgb8;

    #[test]
    fn test_mip_chain_reaches_one_texel() {
        let base = FabricPixels::solid(64, Rgb8::new(10, 20, 30));
        let levels = mip_chain(&base);
        assert_eq!(levels.len(), 7); // 64, 32, 16, 8, 4, 2, 1
        assert_eq!(levels.last().unwrap().size, 1);
        assert_eq!(levels.last().unwrap().pixel(0, 0), [10, 20, 30, 255]);
    }

    #[test]
    fn test_downsample_averages_quads() {
        let mut base = FabricPixels::solid(2, Rgb8::new(0, 0, 0));
        base.data[0] = 200; // red channel of (0, 0)
        base.data[4] = 100; // red channel of (1, 0)
        let half = downsample(&base);
        assert_eq!(half.size, 1);
        assert_eq!(half.pixel(0, 0)[0], 75);
    }

    #[test]
    fn test_device_limits() {
        assert!(fits_device(2048, 8192));
        assert!(fits_device(2048, 2048));
        assert!(!fits_device(2048, 1024));
        assert!(!fits_device(0, 1024));
    }

    #[test]
    fn test_anisotropy_resolution() {
        assert_eq!(resolve_anisotropy(Anisotropy::Max, 16), 16);
        assert_eq!(resolve_anisotropy(Anisotropy::Max, 1), 1);
        assert_eq!(resolve_anisotropy(Anisotropy::Max, 0), 1);
        assert_eq!(resolve_anisotropy(Anisotropy::Disabled, 16), 1);
    }
}
