//! # Graphics Module
//!
//! Everything between the showcase's scene description and the GPU.
//!
//! - **Camera** ([`camera`]) - Damped orbit camera with clamped polar angle and zoom
//! - **Geometry** ([`geometry`]) - Parametric mesh builders and the memoizing library
//! - **Rendering** ([`rendering`]) - Shadow pass, lit surface pass and pipeline cache
//! - **Resources** ([`resources`]) - Global light bindings, materials and fabric textures
//! - **Scene** ([`scene`]) - Node arena and the objects placed on it
//!
//! The [`RenderEngine`] is created by [`RunwayApp`](crate::RunwayApp) once the
//! window exists:
//!
//! ```no_run
//! # async fn example(window: std::sync::Arc<winit::window::Window>) -> runway::Result<()> {
//! use runway::{gfx::RenderEngine, showcase::Showcase, SceneConfig};
//!
//! let config = SceneConfig::default();
//! let mut engine = RenderEngine::new(window, 1200, 800, &config).await?;
//! let mut showcase = Showcase::mount(1.5);
//! engine.upload_showcase(&mut showcase);
//!
//! showcase.update();
//! engine.render(&mut showcase.scene)?;
//! # Ok(())
//! # }
//! ```

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
