//! # Scene Management Module
//!
//! Node hierarchy, placed objects and vertex format for the showcase.
//!
//! ## Key Components
//!
//! - [`NodeTable`] - Flat arena of named transform nodes
//! - [`Object`] - Geometry attached to a node and drawn with a material
//! - [`Scene`] - Container handed to the renderer each frame
//! - [`Vertex3D`] - GPU vertex with position, normal and texture coordinates
//!
//! Mirrored objects share one `GeometryData` and one set of GPU buffers.

pub mod node;
pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use node::{Node, NodeId, NodeTable, Transform};
pub use object::{DrawObject, GpuMesh, Object};
pub use scene::{Scene, SceneStatistics};
pub use vertex::Vertex3D;
