//! Value-keyed fabric texture memoization

use std::collections::HashMap;
use std::sync::Arc;

use super::palette::Palette;
use super::synthesizer::{FabricTexture, FABRIC_RESOLUTION};

/// Holds one synthesized texture per distinct palette
///
/// Lookups compare palettes by value, so two separately constructed but equal
/// palettes share a texture. The cache lives as long as the mounted scene.
pub struct FabricCache {
    resolution: u32,
    textures: HashMap<Palette, Arc<FabricTexture>>,
    syntheses: usize,
}

impl FabricCache {
    /// A cache producing full-resolution textures
    pub fn new() -> Self {
        Self::with_resolution(FABRIC_RESOLUTION)
    }

    pub fn with_resolution(resolution: u32) -> Self {
        Self {
            resolution: resolution.max(1),
            textures: HashMap::new(),
            syntheses: 0,
        }
    }

    /// Returns the texture for `palette`, synthesizing it on first request
    pub fn get_or_synthesize(&mut self, palette: Palette) -> Arc<FabricTexture> {
        if let Some(texture) = self.textures.get(&palette) {
            return texture.clone();
        }

        log::debug!(
            "Synthesizing {}x{} fabric texture",
            self.resolution,
            self.resolution
        );
        let texture = Arc::new(FabricTexture::synthesize_with_resolution(
            palette,
            self.resolution,
        ));
        self.syntheses += 1;
        self.textures.insert(palette, texture.clone());
        texture
    }

    pub fn get(&self, palette: &Palette) -> Option<&Arc<FabricTexture>> {
        self.textures.get(palette)
    }

    /// Number of syntheses performed so far
    pub fn synthesis_count(&self) -> usize {
        self.syntheses
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Palette, &Arc<FabricTexture>)> {
        self.textures.iter()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl Default for FabricCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::Rgb8;

    #[test]
    fn test_cache_synthesizes_once_per_palette() {
        let mut cache = FabricCache::with_resolution(32);
        let a = cache.get_or_synthesize(Palette::JACKET);
        let b = cache.get_or_synthesize(Palette::JACKET);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.synthesis_count(), 1);

        cache.get_or_synthesize(Palette::TROUSERS);
        assert_eq!(cache.synthesis_count(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_keys_on_palette_value() {
        let mut cache = FabricCache::with_resolution(16);
        let original = cache.get_or_synthesize(Palette::TROUSERS);

        let rebuilt = Palette {
            base: Rgb8::hex(0x242f2f),
            mid: Rgb8::hex(0x1e2627),
            highlight: Rgb8::hex(0x3c4b4c),
            weave: Rgb8::hex(0xd0e5d5),
        };
        let hit = cache.get_or_synthesize(rebuilt);
        assert!(Arc::ptr_eq(&original, &hit));
        assert_eq!(cache.synthesis_count(), 1);
    }

    #[test]
    fn test_separate_caches_allocate_separately() {
        let mut first = FabricCache::with_resolution(16);
        let mut second = FabricCache::with_resolution(16);
        let a = first.get_or_synthesize(Palette::JACKET);
        let b = second.get_or_synthesize(Palette::JACKET);
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.pixels, b.pixels);
    }
}
