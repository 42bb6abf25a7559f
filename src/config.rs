//! Scene configuration
//!
//! Render-surface and presentation settings for the showcase. Everything has a
//! studio default; the builder methods and [`SceneConfig::from_env`] exist for
//! hosts that want a different window or presentation mode.

use crate::fabric::Rgb8;

/// Output tone mapping operator applied before display encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneMapping {
    /// No tone mapping, values are clamped
    None,
    /// ACES filmic curve
    AcesFilmic,
}

/// Linear range fog that fades the far end of the runway
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogConfig {
    pub color: Rgb8,
    pub near: f32,
    pub far: f32,
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            color: Rgb8::hex(0x04050a),
            near: 28.0,
            far: 120.0,
        }
    }
}

/// Top-level scene and surface configuration
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Allowed device pixel ratio range, (min, max)
    pub pixel_ratio: (f64, f64),
    pub background: Rgb8,
    pub fog: FogConfig,
    pub tone_mapping: ToneMapping,
    pub exposure: f32,
    pub shadow_map_size: u32,
    pub vsync: bool,
    /// Logs shadow pass details every frame when set
    pub shadow_debug: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            title: "Runway".to_string(),
            width: 1200,
            height: 800,
            pixel_ratio: (1.0, 2.0),
            background: Rgb8::hex(0x04050a),
            fog: FogConfig::default(),
            tone_mapping: ToneMapping::AcesFilmic,
            exposure: 1.0,
            shadow_map_size: 2048,
            vsync: true,
            shadow_debug: false,
        }
    }
}

impl SceneConfig {
    /// Default configuration with `RUNWAY_VSYNC` and `RUNWAY_SHADOW_DEBUG` applied
    ///
    /// `RUNWAY_VSYNC=0` (or `false`/`off`) switches to immediate presentation.
    /// `RUNWAY_SHADOW_DEBUG` enables per-frame shadow logging when present.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var("RUNWAY_VSYNC") {
            config.vsync = parse_flag(&value).unwrap_or(config.vsync);
        }
        config.shadow_debug = std::env::var("RUNWAY_SHADOW_DEBUG").is_ok();
        config
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_owned();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_exposure(mut self, exposure: f32) -> Self {
        self.exposure = exposure.max(0.0);
        self
    }

    pub fn with_tone_mapping(mut self, tone_mapping: ToneMapping) -> Self {
        self.tone_mapping = tone_mapping;
        self
    }

    /// Clamps a window's device pixel ratio into the configured range
    pub fn clamp_pixel_ratio(&self, scale_factor: f64) -> f64 {
        let (min, max) = self.pixel_ratio;
        if scale_factor.is_finite() {
            scale_factor.clamp(min, max)
        } else {
            min
        }
    }

    /// Surface size for a window of `physical` pixels at `scale_factor`
    ///
    /// The window's logical size is rescaled by the clamped pixel ratio, so a
    /// 3x display renders at 2x and a 0.5x display renders at 1x.
    pub fn render_extent(&self, physical: (u32, u32), scale_factor: f64) -> (u32, u32) {
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        let ratio = self.clamp_pixel_ratio(scale);
        let logical_w = physical.0 as f64 / scale;
        let logical_h = physical.1 as f64 / scale;
        (
            ((logical_w * ratio).round() as u32).max(1),
            ((logical_h * ratio).round() as u32).max(1),
        )
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_ratio_is_clamped() {
        let config = SceneConfig::default();
        assert_eq!(config.clamp_pixel_ratio(0.5), 1.0);
        assert_eq!(config.clamp_pixel_ratio(1.5), 1.5);
        assert_eq!(config.clamp_pixel_ratio(3.0), 2.0);
        assert_eq!(config.clamp_pixel_ratio(f64::NAN), 1.0);
    }

    #[test]
    fn test_render_extent_follows_clamped_ratio() {
        let config = SceneConfig::default();
        // 3x display: logical 400x300, rendered at 2x
        assert_eq!(config.render_extent((1200, 900), 3.0), (800, 600));
        // 2x display renders at native size
        assert_eq!(config.render_extent((1600, 1000), 2.0), (1600, 1000));
        // 0.5x display is bumped up to 1x
        assert_eq!(config.render_extent((400, 300), 0.5), (800, 600));
        assert_eq!(config.render_extent((0, 0), 1.0), (1, 1));
    }

    #[test]
    fn test_flag_parsing() {
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag(" ON "), Some(true));
        assert_eq!(parse_flag("maybe"), None);
    }
}
