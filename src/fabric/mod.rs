//! # Procedural Fabric Textures
//!
//! Woven-fabric albedo maps generated on the CPU at mount time. Each garment
//! palette yields one square RGBA8 buffer built from three passes:
//!
//! - a diagonal four-stop gradient ([`fill_gradient`])
//! - a periodic per-channel sheen ([`apply_weave_noise`])
//! - a scatter of short stitch dashes ([`overlay_stitches`])
//!
//! The two overlay passes are plain buffer transforms and can be applied to
//! any [`FabricPixels`] independently. [`FabricCache`] memoizes whole textures
//! by palette value so each palette is synthesized once per mounted scene.
//!
//! ```rust
//! use runway::fabric::{FabricCache, Palette};
//!
//! let mut cache = FabricCache::with_resolution(64);
//! let jacket = cache.get_or_synthesize(Palette::JACKET);
//! let again = cache.get_or_synthesize(Palette::JACKET);
//! assert!(std::sync::Arc::ptr_eq(&jacket, &again));
//! ```

pub mod cache;
pub mod palette;
pub mod synthesizer;

pub use cache::FabricCache;
pub use palette::{Palette, Rgb8};
pub use synthesizer::{
    apply_weave_noise, fill_gradient, overlay_stitches, synthesize, Anisotropy, ColorSpace,
    FabricPixels, FabricTexture, SamplerSettings, WrapMode, FABRIC_RESOLUTION,
};
