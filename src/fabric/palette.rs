//! Colors and garment palettes

/// An sRGB color with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const WHITE: Rgb8 = Rgb8::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from a `0xRRGGBB` literal
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
        }
    }

    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Decodes to linear-light floats for shading
    pub fn to_linear(self) -> [f32; 3] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        ]
    }

    /// Linear RGBA with the given alpha
    pub fn to_linear_rgba(self, alpha: f32) -> [f32; 4] {
        let [r, g, b] = self.to_linear();
        [r, g, b, alpha]
    }
}

fn srgb_to_linear(channel: u8) -> f32 {
    let c = channel as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// The four colors a fabric texture is woven from
///
/// Compared and hashed by value, which is what the texture cache keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Palette {
    pub base: Rgb8,
    pub mid: Rgb8,
    pub highlight: Rgb8,
    /// Stitch line tint
    pub weave: Rgb8,
}

impl Palette {
    /// Storm-blue parka shell
    pub const JACKET: Palette = Palette {
        base: Rgb8::hex(0x1b2a36),
        mid: Rgb8::hex(0x273b4a),
        highlight: Rgb8::hex(0x42566b),
        weave: Rgb8::hex(0xcde3ff),
    };

    /// Slate-green trouser twill
    pub const TROUSERS: Palette = Palette {
        base: Rgb8::hex(0x242f2f),
        mid: Rgb8::hex(0x1e2627),
        highlight: Rgb8::hex(0x3c4b4c),
        weave: Rgb8::hex(0xd0e5d5),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_unpacks_channels() {
        let c = Rgb8::hex(0x1b2a36);
        assert_eq!(c.channels(), [0x1b, 0x2a, 0x36]);
    }

    #[test]
    fn test_linear_conversion_endpoints() {
        assert_eq!(Rgb8::new(0, 0, 0).to_linear(), [0.0, 0.0, 0.0]);
        let white = Rgb8::WHITE.to_linear();
        for c in white {
            assert!((c - 1.0).abs() < 1e-6);
        }
        // Mid grey is darker in linear light
        assert!(Rgb8::new(128, 128, 128).to_linear()[0] < 0.25);
    }

    #[test]
    fn test_palettes_compare_by_value() {
        let copy = Palette {
            base: Rgb8::hex(0x1b2a36),
            mid: Rgb8::hex(0x273b4a),
            highlight: Rgb8::hex(0x42566b),
            weave: Rgb8::hex(0xcde3ff),
        };
        assert_eq!(copy, Palette::JACKET);
        assert_ne!(Palette::JACKET, Palette::TROUSERS);
    }
}
