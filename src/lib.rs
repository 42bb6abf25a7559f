// src/lib.rs
//! Runway
//!
//! A studio-lit runway walk rendered with wgpu: procedurally built garments,
//! synthesized fabric textures, an animated lighting rig and an orbit camera.

pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod fabric;
pub mod gfx;
pub mod prelude;
pub mod showcase;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::RunwayApp;
pub use config::SceneConfig;
pub use error::{Result, RunwayError};

/// Creates a runway application configured from the environment
pub fn default() -> Result<RunwayApp> {
    RunwayApp::new(SceneConfig::from_env())
}
