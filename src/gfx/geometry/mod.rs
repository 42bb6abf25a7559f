//! # Procedural Geometry Generation
//!
//! Pure builders for every mesh in the showcase. Nothing is loaded from disk:
//! each function takes fixed numeric parameters and returns an immutable
//! [`GeometryData`]. Conventions follow a Y-up, right-handed world with
//! counter-clockwise front faces.
//!
//! ## Supported Shapes
//!
//! - **Box** - axis-aligned cuboid with per-face normals
//! - **Sphere** - full or partial UV sphere (hoods, heads)
//! - **Cylinder** - tapered, optionally open-ended (sleeves, legs, visors)
//! - **Torus** / **Ring** - trims, cuffs and the backdrop glow
//! - **Plane** - subdivided quad in the XY plane
//! - **Lathe** - a 2D profile revolved around the Y axis (torso)
//! - **Extrusion** - a beveled 2D outline swept along Z (boots)
//!
//! ## Usage
//!
//! ```rust
//! use runway::gfx::geometry::{generate_box, generate_cylinder, GeometryLibrary};
//!
//! let zipper = generate_box(0.05, 3.4, 0.06);
//! assert_eq!(zipper.triangle_count(), 12);
//!
//! let mut library = GeometryLibrary::new();
//! let sleeve = library.get_or_build("sleeve", || generate_cylinder(0.43, 0.52, 2.2, 88, 32, true));
//! let mirrored = library.get_or_build("sleeve", || unreachable!());
//! assert!(std::sync::Arc::ptr_eq(&sleeve, &mirrored));
//! ```

pub mod extrude;
pub mod lathe;
pub mod library;
pub mod primitives;

pub use extrude::{generate_extrusion, ExtrudeSettings};
pub use lathe::generate_lathe;
pub use library::GeometryLibrary;
pub use primitives::*;

use crate::gfx::scene::vertex::Vertex3D;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v), v = 0 at the bottom edge
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            tex_coords: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Appends one vertex and returns its index
    pub(crate) fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        self.normals.push(normal);
        self.tex_coords.push(uv);
        index
    }

    pub(crate) fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Axis-aligned bounds as (min, max)
    pub fn bounds(&self) -> ([f32; 3], [f32; 3]) {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for v in &self.vertices {
            for axis in 0..3 {
                min[axis] = min[axis].min(v[axis]);
                max[axis] = max[axis].max(v[axis]);
            }
        }
        (min, max)
    }

    /// Interleaves attributes into the renderer's vertex format
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        (0..self.vertices.len())
            .map(|i| Vertex3D {
                position: self.vertices[i],
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                tex_coords: self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect()
    }
}

impl Default for GeometryData {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn normalize3(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len > f32::EPSILON {
        [v[0] / len, v[1] / len, v[2] / len]
    } else {
        [0.0, 1.0, 0.0]
    }
}

pub(crate) fn cross3(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub(crate) fn sub3(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}
