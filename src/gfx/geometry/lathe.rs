//! Surfaces of revolution

use super::{normalize3, GeometryData};

/// Revolve a 2D profile around the Y axis
///
/// # Arguments
/// * `profile` - Points as `[radius, height]`, ordered bottom to top
/// * `segments` - Number of steps around the axis
/// * `phi_start` - Starting angle in radians
/// * `phi_length` - Swept angle in radians (`2 * PI` for a closed surface)
///
/// Profile normals are the 2D segment normals averaged at interior points, so
/// the revolved surface shades smoothly along the silhouette. Fewer than two
/// profile points produce empty geometry.
pub fn generate_lathe(profile: &[[f32; 2]], segments: u32, phi_start: f32, phi_length: f32) -> GeometryData {
    let mut data = GeometryData::new();
    if profile.len() < 2 {
        return data;
    }

    let segments = segments.max(1);
    let profile_normals = profile_normals(profile);
    let rows = profile.len() as u32;

    for i in 0..=segments {
        let phi = phi_start + i as f32 / segments as f32 * phi_length;
        let (sin_p, cos_p) = phi.sin_cos();

        for (j, (point, normal)) in profile.iter().zip(&profile_normals).enumerate() {
            data.push_vertex(
                [point[0] * sin_p, point[1], point[0] * cos_p],
                normalize3([normal[0] * sin_p, normal[1], normal[0] * cos_p]),
                [i as f32 / segments as f32, j as f32 / (rows - 1) as f32],
            );
        }
    }

    for i in 0..segments {
        for j in 0..rows - 1 {
            let base = j + i * rows;
            let a = base;
            let b = base + rows;
            let c = base + rows + 1;
            let d = base + 1;
            data.push_triangle(a, b, d);
            data.push_triangle(c, d, b);
        }
    }

    data
}

fn profile_normals(profile: &[[f32; 2]]) -> Vec<[f32; 2]> {
    let segment_normal = |j: usize| {
        let dx = profile[j + 1][0] - profile[j][0];
        let dy = profile[j + 1][1] - profile[j][1];
        normalize2([dy, -dx])
    };

    let last = profile.len() - 1;
    let mut normals = Vec::with_capacity(profile.len());
    let mut previous = segment_normal(0);
    normals.push(previous);

    for j in 1..last {
        let current = segment_normal(j);
        normals.push(normalize2([current[0] + previous[0], current[1] + previous[1]]));
        previous = current;
    }
    normals.push(previous);

    normals
}

fn normalize2(v: [f32; 2]) -> [f32; 2] {
    let len = (v[0] * v[0] + v[1] * v[1]).sqrt();
    if len > f32::EPSILON {
        [v[0] / len, v[1] / len]
    } else {
        [1.0, 0.0]
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{assert_well_formed, outward_ratio};
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_lathe_counts() {
        let profile = [[0.5, -1.0], [0.6, 0.0], [0.4, 1.0]];
        let lathe = generate_lathe(&profile, 12, 0.0, 2.0 * PI);
        assert_well_formed(&lathe);
        assert_eq!(lathe.vertex_count(), 13 * 3);
        assert_eq!(lathe.triangle_count(), 12 * 2 * 2);
        assert!(outward_ratio(&lathe) > 0.99);
    }

    #[test]
    fn test_lathe_preserves_profile_radius() {
        let profile = [[0.55, -1.8], [0.8, -0.4], [0.15, 2.05]];
        let lathe = generate_lathe(&profile, 32, 0.0, 2.0 * PI);

        for (i, v) in lathe.vertices.iter().enumerate() {
            let expected = profile[i % profile.len()];
            let radius = (v[0] * v[0] + v[2] * v[2]).sqrt();
            assert!((radius - expected[0]).abs() < 1e-5);
            assert_eq!(v[1], expected[1]);
        }
    }

    #[test]
    fn test_lathe_end_normals() {
        // Flat bottom rim: normal points straight down
        let profile = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];
        let lathe = generate_lathe(&profile, 4, 0.0, 2.0 * PI);
        let bottom = lathe.normals[0];
        assert!(bottom[1] < -0.999);

        // Vertical wall ends with an outward normal
        let top = lathe.normals[2];
        assert!(top[1].abs() < 1e-6);
        assert!((top[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_profile_is_empty() {
        assert_eq!(generate_lathe(&[[1.0, 0.0]], 16, 0.0, 2.0 * PI).vertex_count(), 0);
    }
}
