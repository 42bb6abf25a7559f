// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles textures, buffers, and bind groups for rendering.

pub mod global_bindings;
pub mod material;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{
    AmbientLight, AreaLight, GlobalBindings, GlobalUBO, GlobalUBOContent, HemisphereLight,
    PointLight, SceneLights, SpotLight,
};
pub use material::{BlendMode, Material, MaterialId, MaterialManager};
pub use texture_resource::TextureResource;
