//! Beveled extrusion of closed 2D outlines

use super::{cross3, normalize3, sub3, GeometryData};
use std::f32::consts::FRAC_PI_2;

/// Parameters for [`generate_extrusion`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrudeSettings {
    /// Number of layers along the straight part of the sweep
    pub steps: u32,
    /// Length of the straight sweep along +Z
    pub depth: f32,
    pub bevel_enabled: bool,
    /// How far the bevel extends beyond each end of the sweep
    pub bevel_thickness: f32,
    /// How far the bevel pushes the outline outward
    pub bevel_size: f32,
    pub bevel_segments: u32,
}

impl Default for ExtrudeSettings {
    fn default() -> Self {
        Self {
            steps: 1,
            depth: 1.0,
            bevel_enabled: true,
            bevel_thickness: 0.2,
            bevel_size: 0.1,
            bevel_segments: 3,
        }
    }
}

struct Layer {
    z: f32,
    offset: f32,
}

impl ExtrudeSettings {
    fn layers(&self) -> Vec<Layer> {
        let steps = self.steps.max(1);
        let mut layers = Vec::new();

        if !self.bevel_enabled || self.bevel_segments == 0 {
            for s in 0..=steps {
                layers.push(Layer { z: self.depth * s as f32 / steps as f32, offset: 0.0 });
            }
            return layers;
        }

        let segs = self.bevel_segments;
        let bevel = |b: u32| {
            let t = b as f32 / segs as f32;
            (self.bevel_thickness * (t * FRAC_PI_2).cos(), self.bevel_size * (t * FRAC_PI_2).sin())
        };

        for b in 0..segs {
            let (z, offset) = bevel(b);
            layers.push(Layer { z: -z, offset });
        }
        for s in 0..=steps {
            layers.push(Layer { z: self.depth * s as f32 / steps as f32, offset: self.bevel_size });
        }
        for b in (0..segs).rev() {
            let (z, offset) = bevel(b);
            layers.push(Layer { z: self.depth + z, offset });
        }

        layers
    }
}

/// Sweep a closed outline along +Z with optional rounded bevels
///
/// The outline may be given in either winding. Side walls and caps are flat
/// shaded: every side quad and both caps carry their own vertices. The back
/// cap sits at `-bevel_thickness` and the front cap at
/// `depth + bevel_thickness`. Outlines with fewer than three points produce
/// empty geometry.
pub fn generate_extrusion(outline: &[[f32; 2]], settings: &ExtrudeSettings) -> GeometryData {
    let mut data = GeometryData::new();
    if outline.len() < 3 {
        return data;
    }

    let mut contour = outline.to_vec();
    if signed_area(&contour) < 0.0 {
        contour.reverse();
    }

    let miters = miter_offsets(&contour);
    let layers = settings.layers();
    let n = contour.len();

    let point = |i: usize, layer: &Layer| -> [f32; 3] {
        let p = contour[i % n];
        let m = miters[i % n];
        [p[0] + m[0] * layer.offset, p[1] + m[1] * layer.offset, layer.z]
    };

    for pair in layers.windows(2) {
        let (lower, upper) = (&pair[0], &pair[1]);
        for i in 0..n {
            let a = point(i, lower);
            let b = point(i + 1, lower);
            let c = point(i + 1, upper);
            let d = point(i, upper);
            let normal = normalize3(cross3(sub3(c, a), sub3(d, b)));

            let along_x = (b[0] - a[0]).abs() >= (b[1] - a[1]).abs();
            let uv = |p: [f32; 3]| if along_x { [p[0], 1.0 - p[2]] } else { [p[1], 1.0 - p[2]] };

            let ia = data.push_vertex(a, normal, uv(a));
            let ib = data.push_vertex(b, normal, uv(b));
            let ic = data.push_vertex(c, normal, uv(c));
            let id = data.push_vertex(d, normal, uv(d));
            data.push_triangle(ia, ib, ic);
            data.push_triangle(ia, ic, id);
        }
    }

    let triangles = triangulate(&contour);
    if let (Some(back), Some(front)) = (layers.first(), layers.last()) {
        let base = data.vertices.len() as u32;
        for p in &contour {
            data.push_vertex([p[0], p[1], back.z], [0.0, 0.0, -1.0], *p);
        }
        for t in &triangles {
            data.push_triangle(base + t[2], base + t[1], base + t[0]);
        }

        let base = data.vertices.len() as u32;
        for p in &contour {
            data.push_vertex([p[0], p[1], front.z], [0.0, 0.0, 1.0], *p);
        }
        for t in &triangles {
            data.push_triangle(base + t[0], base + t[1], base + t[2]);
        }
    }

    data
}

fn signed_area(contour: &[[f32; 2]]) -> f32 {
    let n = contour.len();
    (0..n)
        .map(|i| {
            let p = contour[i];
            let q = contour[(i + 1) % n];
            p[0] * q[1] - q[0] * p[1]
        })
        .sum::<f32>()
        * 0.5
}

/// Per-vertex offsets that move every edge of a counter-clockwise outline
/// outward by one unit.
fn miter_offsets(contour: &[[f32; 2]]) -> Vec<[f32; 2]> {
    let n = contour.len();
    let edge_normal = |i: usize| {
        let p = contour[i % n];
        let q = contour[(i + 1) % n];
        let (dx, dy) = (q[0] - p[0], q[1] - p[1]);
        let len = (dx * dx + dy * dy).sqrt().max(f32::EPSILON);
        [dy / len, -dx / len]
    };

    (0..n)
        .map(|i| {
            let n1 = edge_normal(i + n - 1);
            let n2 = edge_normal(i);
            let denom = (1.0 + n1[0] * n2[0] + n1[1] * n2[1]).max(1e-3);
            [(n1[0] + n2[0]) / denom, (n1[1] + n2[1]) / denom]
        })
        .collect()
}

/// Ear clipping for a simple counter-clockwise polygon
fn triangulate(contour: &[[f32; 2]]) -> Vec<[u32; 3]> {
    let mut remaining: Vec<usize> = (0..contour.len()).collect();
    let mut triangles = Vec::with_capacity(contour.len().saturating_sub(2));

    while remaining.len() > 3 {
        let count = remaining.len();
        let ear = (0..count).find(|&k| {
            let prev = contour[remaining[(k + count - 1) % count]];
            let cur = contour[remaining[k]];
            let next = contour[remaining[(k + 1) % count]];
            if orient(prev, cur, next) <= 0.0 {
                return false;
            }
            remaining
                .iter()
                .map(|&i| contour[i])
                .filter(|p| *p != prev && *p != cur && *p != next)
                .all(|p| !inside_triangle(p, prev, cur, next))
        });

        // Numerically degenerate outline: fan the rest
        let k = ear.unwrap_or(0);
        let count = remaining.len();
        triangles.push([
            remaining[(k + count - 1) % count] as u32,
            remaining[k] as u32,
            remaining[(k + 1) % count] as u32,
        ]);
        remaining.remove(k);
    }

    if let [a, b, c] = remaining[..] {
        triangles.push([a as u32, b as u32, c as u32]);
    }
    triangles
}

fn orient(a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> f32 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

fn inside_triangle(p: [f32; 2], a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> bool {
    orient(a, b, p) >= 0.0 && orient(b, c, p) >= 0.0 && orient(c, a, p) >= 0.0
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{assert_well_formed, outward_ratio};
    use super::*;

    const BOOT: [[f32; 2]; 5] = [[-0.38, -0.22], [0.52, -0.22], [0.66, 0.12], [0.4, 0.32], [-0.28, 0.32]];

    fn boot_settings() -> ExtrudeSettings {
        ExtrudeSettings {
            steps: 4,
            depth: 0.58,
            bevel_enabled: true,
            bevel_thickness: 0.1,
            bevel_size: 0.07,
            bevel_segments: 6,
        }
    }

    #[test]
    fn test_boot_extrusion_counts() {
        let boot = generate_extrusion(&BOOT, &boot_settings());
        assert_well_formed(&boot);

        // 6 back bevel + 5 straight + 6 front bevel layers
        let gaps = 6 + 5 + 6 - 1;
        assert_eq!(boot.vertex_count(), gaps * 5 * 4 + 2 * 5);
        assert_eq!(boot.triangle_count(), gaps * 5 * 2 + 2 * 3);
        assert_eq!(outward_ratio(&boot), 1.0);
    }

    #[test]
    fn test_bevel_extends_beyond_depth() {
        let boot = generate_extrusion(&BOOT, &boot_settings());
        let (min, max) = boot.bounds();
        assert!((min[2] + 0.1).abs() < 1e-6);
        assert!((max[2] - 0.68).abs() < 1e-6);
        // Bevel pushes the outline outward
        assert!(min[0] < -0.38 - 0.05);
        assert!(max[1] > 0.32 + 0.05);
    }

    #[test]
    fn test_winding_is_normalized() {
        let mut clockwise = BOOT;
        clockwise.reverse();
        let a = generate_extrusion(&BOOT, &boot_settings());
        let b = generate_extrusion(&clockwise, &boot_settings());
        assert_eq!(a.triangle_count(), b.triangle_count());
        assert_eq!(outward_ratio(&b), 1.0);
    }

    #[test]
    fn test_unbeveled_square() {
        let square = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let settings = ExtrudeSettings { bevel_enabled: false, steps: 2, depth: 2.0, ..Default::default() };
        let prism = generate_extrusion(&square, &settings);
        assert_well_formed(&prism);
        assert_eq!(prism.triangle_count(), 2 * 4 * 2 + 2 * 2);
        assert_eq!(prism.bounds(), ([0.0, 0.0, 0.0], [1.0, 1.0, 2.0]));
    }

    #[test]
    fn test_triangulate_concave_outline() {
        // L-shape with a reflex corner
        let outline = [[0.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0], [1.0, 2.0], [0.0, 2.0]];
        let triangles = triangulate(&outline);
        assert_eq!(triangles.len(), 4);

        let area: f32 = triangles
            .iter()
            .map(|t| orient(outline[t[0] as usize], outline[t[1] as usize], outline[t[2] as usize]) * 0.5)
            .sum();
        assert!((area - 3.0).abs() < 1e-5);
    }
}
