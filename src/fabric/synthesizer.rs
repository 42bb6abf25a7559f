//! Fabric texture synthesis
//!
//! All passes work on a plain RGBA8 buffer and never touch the GPU, so the
//! same palette always produces byte-identical output.

use rayon::prelude::*;

use super::palette::{Palette, Rgb8};

/// Edge length of every garment texture
pub const FABRIC_RESOLUTION: u32 = 2048;

/// Gradient stop positions along the diagonal: base, mid, mid, highlight
const GRADIENT_STOPS: [f32; 4] = [0.0, 0.45, 0.55, 1.0];

const NOISE_FREQ_X: f32 = 0.03;
const NOISE_FREQ_Y: f32 = 0.05;
const NOISE_AMPLITUDE: f32 = 5.0;
/// Per-channel weight of the sheen noise (R, G, B)
const NOISE_CHANNEL_WEIGHTS: [f32; 3] = [1.0, 0.6, 0.35];

const STITCH_COUNT: u32 = 3200;
const STITCH_HASH_X: u32 = 53;
const STITCH_HASH_Y: u32 = 97;
const STITCH_LENGTH: u32 = 8;
const STITCH_ALPHA: f32 = 0x24 as f32 / 255.0;

/// Horizontal and vertical tiling factor applied on garments
const FABRIC_REPEAT: [f32; 2] = [1.6, 1.9];

/// A square RGBA8 pixel buffer, row-major, 4 bytes per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FabricPixels {
    pub size: u32,
    pub data: Vec<u8>,
}

impl FabricPixels {
    /// Allocates a buffer filled with one opaque color
    pub fn solid(size: u32, color: Rgb8) -> Self {
        let size = size.max(1);
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        for _ in 0..size * size {
            data.extend_from_slice(&[color.r, color.g, color.b, 255]);
        }
        Self { size, data }
    }

    /// RGBA value at (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = self.index(x, y);
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y * self.size + x) * 4) as usize
    }

    fn row_bytes(&self) -> usize {
        (self.size * 4) as usize
    }
}

/// Texture addressing outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
}

/// Anisotropic filtering request, resolved against the device at upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anisotropy {
    Disabled,
    /// Whatever the device supports, or none if it supports nothing
    Max,
}

/// How texel values are to be interpreted when sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Display-referred, decoded to linear by the sampler
    Srgb,
    Linear,
}

/// Sampling configuration that travels with a synthesized texture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerSettings {
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
    /// UV scale applied by the material
    pub repeat: [f32; 2],
    pub anisotropy: Anisotropy,
    pub color_space: ColorSpace,
}

impl SamplerSettings {
    /// Settings for garment fabric
    pub fn fabric() -> Self {
        Self {
            wrap_u: WrapMode::Repeat,
            wrap_v: WrapMode::Repeat,
            repeat: FABRIC_REPEAT,
            anisotropy: Anisotropy::Max,
            color_space: ColorSpace::Srgb,
        }
    }
}

/// A synthesized, immutable fabric texture and its sampler settings
#[derive(Debug, Clone)]
pub struct FabricTexture {
    pub palette: Option<Palette>,
    pub pixels: FabricPixels,
    pub sampler: SamplerSettings,
}

impl FabricTexture {
    /// Synthesizes the full-resolution texture for `palette`
    pub fn synthesize(palette: Palette) -> Self {
        Self::synthesize_with_resolution(palette, FABRIC_RESOLUTION)
    }

    pub fn synthesize_with_resolution(palette: Palette, size: u32) -> Self {
        Self {
            palette: Some(palette),
            pixels: synthesize(palette, size),
            sampler: SamplerSettings::fabric(),
        }
    }

    /// A 1x1 white stand-in for surfaces that cannot hold the real texture
    pub fn placeholder() -> Self {
        Self {
            palette: None,
            pixels: FabricPixels::solid(1, Rgb8::WHITE),
            sampler: SamplerSettings {
                repeat: [1.0, 1.0],
                anisotropy: Anisotropy::Disabled,
                ..SamplerSettings::fabric()
            },
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.palette.is_none()
    }

    pub fn size(&self) -> u32 {
        self.pixels.size
    }
}

/// Runs all three passes for `palette` at `size` x `size`
pub fn synthesize(palette: Palette, size: u32) -> FabricPixels {
    let mut pixels = fill_gradient(palette, size);
    apply_weave_noise(&mut pixels);
    overlay_stitches(&mut pixels, palette.weave);
    pixels
}

/// Fills a new buffer with the palette's diagonal gradient
///
/// The gradient runs from the top-left corner to the bottom-right corner and
/// holds `mid` flat between 45% and 55%. Colors are interpolated in sRGB at
/// pixel centers.
pub fn fill_gradient(palette: Palette, size: u32) -> FabricPixels {
    let size = size.max(1);
    let mut pixels = FabricPixels {
        size,
        data: vec![0; (size * size * 4) as usize],
    };
    let stops = [palette.base, palette.mid, palette.mid, palette.highlight];
    let row_bytes = pixels.row_bytes();
    let span = 2.0 * size as f32;

    pixels
        .data
        .par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let t = ((x as f32 + 0.5) + (y as f32 + 0.5)) / span;
                let color = sample_gradient(&stops, t);
                px.copy_from_slice(&[color[0], color[1], color[2], 255]);
            }
        });

    pixels
}

fn sample_gradient(stops: &[Rgb8; 4], t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let mut segment = 0;
    while segment < GRADIENT_STOPS.len() - 2 && t > GRADIENT_STOPS[segment + 1] {
        segment += 1;
    }
    let (t0, t1) = (GRADIENT_STOPS[segment], GRADIENT_STOPS[segment + 1]);
    let f = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
    let a = stops[segment].channels();
    let b = stops[segment + 1].channels();
    let mut out = [0u8; 3];
    for c in 0..3 {
        let v = a[c] as f32 + (b[c] as f32 - a[c] as f32) * f;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Adds the directional sheen: `(sin(x*0.03) + cos(y*0.05)) * 5`, weighted
/// per channel and clamped to the byte range
///
/// Alpha is left untouched.
pub fn apply_weave_noise(pixels: &mut FabricPixels) {
    let row_bytes = pixels.row_bytes();
    pixels
        .data
        .par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| {
            let row_term = (y as f32 * NOISE_FREQ_Y).cos();
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let noise = ((x as f32 * NOISE_FREQ_X).sin() + row_term) * NOISE_AMPLITUDE;
                for (channel, weight) in NOISE_CHANNEL_WEIGHTS.iter().enumerate() {
                    let v = px[channel] as f32 + noise * weight;
                    px[channel] = v.round().clamp(0.0, 255.0) as u8;
                }
            }
        });
}

/// Scatters 1x8 stitch dashes tinted with `accent` at low opacity
///
/// Dash origins come from a multiplicative index hash, so the pattern is the
/// same on every run. Dashes running past the bottom edge are clipped.
pub fn overlay_stitches(pixels: &mut FabricPixels, accent: Rgb8) {
    overlay_stitch_count(pixels, accent, STITCH_COUNT);
}

fn overlay_stitch_count(pixels: &mut FabricPixels, accent: Rgb8, count: u32) {
    let size = pixels.size;
    let tint = accent.channels();
    for i in 0..count {
        let x = i.wrapping_mul(STITCH_HASH_X) % size;
        let y0 = i.wrapping_mul(STITCH_HASH_Y) % size;
        let y1 = (y0 + STITCH_LENGTH).min(size);
        for y in y0..y1 {
            let idx = pixels.index(x, y);
            for c in 0..3 {
                let dst = pixels.data[idx + c] as f32;
                let v = dst * (1.0 - STITCH_ALPHA) + tint[c] as f32 * STITCH_ALPHA;
                pixels.data[idx + c] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesis_is_deterministic() {
        for palette in [Palette::JACKET, Palette::TROUSERS] {
            let a = synthesize(palette, 128);
            let b = synthesize(palette, 128);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_palettes_produce_different_buffers() {
        assert_ne!(
            synthesize(Palette::JACKET, 64),
            synthesize(Palette::TROUSERS, 64)
        );
    }

    #[test]
    fn test_gradient_corners_hit_end_stops() {
        let palette = Palette {
            base: Rgb8::new(0, 0, 0),
            mid: Rgb8::new(100, 100, 100),
            highlight: Rgb8::new(200, 200, 200),
            weave: Rgb8::WHITE,
        };
        let pixels = fill_gradient(palette, 256);
        let first = pixels.pixel(0, 0);
        let last = pixels.pixel(255, 255);
        assert!(first[0] <= 2);
        assert!(last[0] >= 198);
        assert_eq!(first[3], 255);

        // The centre sits in the flat mid band
        assert_eq!(pixels.pixel(128, 127)[0], 100);
        assert_eq!(pixels.pixel(120, 125)[0], 100);
    }

    #[test]
    fn test_weave_noise_weights_channels() {
        let mut pixels = FabricPixels::solid(4, Rgb8::new(100, 100, 100));
        apply_weave_noise(&mut pixels);
        // At the origin sin(0) + cos(0) = 1, so the noise is exactly 5
        assert_eq!(pixels.pixel(0, 0), [105, 103, 102, 255]);
    }

    #[test]
    fn test_weave_noise_clamps() {
        let mut bright = FabricPixels::solid(2, Rgb8::WHITE);
        apply_weave_noise(&mut bright);
        assert_eq!(bright.pixel(0, 0), [255, 255, 255, 255]);

        let mut dark = FabricPixels::solid(256, Rgb8::new(0, 0, 0));
        apply_weave_noise(&mut dark);
        // sin(157 * 0.03) + cos(63 * 0.05) is close to -2
        assert_eq!(dark.pixel(157, 63), [0, 0, 0, 255]);
    }

    #[test]
    fn test_single_stitch_blends_a_short_column() {
        let mut pixels = FabricPixels::solid(32, Rgb8::new(0, 0, 0));
        overlay_stitch_count(&mut pixels, Rgb8::WHITE, 1);
        for y in 0..8 {
            assert_eq!(pixels.pixel(0, y)[0], 36);
        }
        assert_eq!(pixels.pixel(0, 8)[0], 0);
        assert_eq!(pixels.pixel(1, 0)[0], 0);
    }

    #[test]
    fn test_stitches_clip_at_bottom_edge() {
        let mut pixels = FabricPixels::solid(4, Rgb8::new(0, 0, 0));
        overlay_stitch_count(&mut pixels, Rgb8::WHITE, 64);
        assert_eq!(pixels.data.len(), 4 * 4 * 4);
    }

    #[test]
    fn test_passes_compose_independently() {
        let palette = Palette::JACKET;
        let mut noise_first = fill_gradient(palette, 64);
        apply_weave_noise(&mut noise_first);
        overlay_stitches(&mut noise_first, palette.weave);
        assert_eq!(noise_first, synthesize(palette, 64));

        let mut stitches_only = fill_gradient(palette, 64);
        overlay_stitches(&mut stitches_only, palette.weave);
        assert_ne!(stitches_only, fill_gradient(palette, 64));
    }

    #[test]
    fn test_fabric_sampler_settings() {
        let texture = FabricTexture::synthesize_with_resolution(Palette::JACKET, 16);
        assert_eq!(texture.sampler.wrap_u, WrapMode::Repeat);
        assert_eq!(texture.sampler.wrap_v, WrapMode::Repeat);
        assert_eq!(texture.sampler.repeat, [1.6, 1.9]);
        assert_eq!(texture.sampler.anisotropy, Anisotropy::Max);
        assert_eq!(texture.sampler.color_space, ColorSpace::Srgb);
        assert!(!texture.is_placeholder());
        assert!(FabricTexture::placeholder().is_placeholder());
    }
}
