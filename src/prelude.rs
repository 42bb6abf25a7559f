//! # Runway Prelude
//!
//! Commonly used types in one import.
//!
//! ```no_run
//! use runway::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let app = RunwayApp::new(SceneConfig::default().with_vsync(false))?;
//!     app.run()
//! }
//! ```

// Application
pub use crate::app::RunwayApp;
pub use crate::clock::Clock;
pub use crate::config::{FogConfig, SceneConfig, ToneMapping};
pub use crate::error::{Result, RunwayError};

// Scene building blocks
pub use crate::fabric::{FabricCache, Palette, Rgb8};
pub use crate::gfx::camera::{CameraManager, OrbitCamera};
pub use crate::gfx::geometry::{GeometryData, GeometryLibrary};
pub use crate::gfx::scene::{NodeId, NodeTable, Scene, Transform};
pub use crate::showcase::{GeometryKey, Showcase, Side};

// Common external dependencies
pub use cgmath::{InnerSpace, Point3, Vector3, Zero};
