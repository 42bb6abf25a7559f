//! # Primitive Shape Generation
//!
//! This module contains functions to generate the parametric primitives the
//! showcase is assembled from. All shapes are generated with unit normals,
//! texture coordinates and counter-clockwise front faces.

use super::{normalize3, GeometryData};
use std::f32::consts::PI;

/// Generate an axis-aligned box centered at the origin
///
/// # Arguments
/// * `width` - Extent along X
/// * `height` - Extent along Y
/// * `depth` - Extent along Z
///
/// Each face has its own four vertices so normals stay flat.
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let mut data = GeometryData::new();
    let half = [width * 0.5, height * 0.5, depth * 0.5];

    // (normal, u axis, v axis) with u x v == normal
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];

    for (normal, u, v) in faces {
        let center = [normal[0] * half[0], normal[1] * half[1], normal[2] * half[2]];
        let u_ext = [u[0] * half[0], u[1] * half[1], u[2] * half[2]];
        let v_ext = [v[0] * half[0], v[1] * half[1], v[2] * half[2]];

        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
        let base = data.vertices.len() as u32;
        for (su, sv) in corners {
            let position = [
                center[0] + u_ext[0] * su + v_ext[0] * sv,
                center[1] + u_ext[1] * su + v_ext[1] * sv,
                center[2] + u_ext[2] * su + v_ext[2] * sv,
            ];
            data.push_vertex(position, normal, [(su + 1.0) * 0.5, (sv + 1.0) * 0.5]);
        }
        data.push_triangle(base, base + 1, base + 2);
        data.push_triangle(base, base + 2, base + 3);
    }

    data
}

/// Generate a full UV sphere
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `width_segments` - Number of longitude segments
/// * `height_segments` - Number of latitude segments
pub fn generate_sphere(radius: f32, width_segments: u32, height_segments: u32) -> GeometryData {
    generate_partial_sphere(radius, width_segments, height_segments, 0.0, 2.0 * PI, 0.0, PI)
}

/// Generate a sphere patch bounded in longitude and latitude
///
/// `phi` sweeps around the Y axis, `theta` runs from the north pole
/// (0) towards the south pole (PI). A hood is a patch that stops short of the
/// south pole. Poles only get triangles where the patch actually reaches them.
pub fn generate_partial_sphere(
    radius: f32,
    width_segments: u32,
    height_segments: u32,
    phi_start: f32,
    phi_length: f32,
    theta_start: f32,
    theta_length: f32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(3);
    let h_segs = height_segments.max(2);
    let theta_end = (theta_start + theta_length).min(PI);

    let row = w_segs + 1;
    for iy in 0..=h_segs {
        let v = iy as f32 / h_segs as f32;
        let theta = theta_start + v * theta_length;

        for ix in 0..=w_segs {
            let u = ix as f32 / w_segs as f32;
            let phi = phi_start + u * phi_length;

            let dir = [
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            ];
            data.push_vertex(
                [dir[0] * radius, dir[1] * radius, dir[2] * radius],
                normalize3(dir),
                [u, 1.0 - v],
            );
        }
    }

    for iy in 0..h_segs {
        for ix in 0..w_segs {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;

            if iy != 0 || theta_start > 0.0 {
                data.push_triangle(a, b, d);
            }
            if iy != h_segs - 1 || theta_end < PI {
                data.push_triangle(b, c, d);
            }
        }
    }

    data
}

/// Generate a flat plane in the XY plane facing +Z
///
/// # Arguments
/// * `width` - Width of the plane (X direction)
/// * `height` - Height of the plane (Y direction)
/// * `width_segments` - Number of subdivisions along width
/// * `height_segments` - Number of subdivisions along height
///
/// Rotate the owning node by -PI/2 around X to lay it on the floor.
pub fn generate_plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(1);
    let h_segs = height_segments.max(1);
    let seg_w = width / w_segs as f32;
    let seg_h = height / h_segs as f32;
    let row = w_segs + 1;

    for iy in 0..=h_segs {
        let y = iy as f32 * seg_h - height * 0.5;
        for ix in 0..=w_segs {
            let x = ix as f32 * seg_w - width * 0.5;
            data.push_vertex(
                [x, -y, 0.0],
                [0.0, 0.0, 1.0],
                [ix as f32 / w_segs as f32, 1.0 - iy as f32 / h_segs as f32],
            );
        }
    }

    for iy in 0..h_segs {
        for ix in 0..w_segs {
            let a = ix + row * iy;
            let b = ix + row * (iy + 1);
            let c = ix + 1 + row * (iy + 1);
            let d = ix + 1 + row * iy;
            data.push_triangle(a, b, d);
            data.push_triangle(b, c, d);
        }
    }

    data
}

/// Generate a tapered cylinder along the Y axis
///
/// # Arguments
/// * `radius_top` - Radius at +height/2
/// * `radius_bottom` - Radius at -height/2
/// * `height` - Total height
/// * `radial_segments` - Segments around the circumference
/// * `height_segments` - Rings along the height
/// * `open_ended` - Skip both caps (sleeves, trouser legs, visors)
pub fn generate_cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
    height_segments: u32,
    open_ended: bool,
) -> GeometryData {
    let mut data = GeometryData::new();

    let r_segs = radial_segments.max(3);
    let h_segs = height_segments.max(1);
    let half_height = height * 0.5;
    let slope = if height.abs() > f32::EPSILON {
        (radius_bottom - radius_top) / height
    } else {
        0.0
    };
    let row = r_segs + 1;

    for iy in 0..=h_segs {
        let v = iy as f32 / h_segs as f32;
        let radius = v * (radius_bottom - radius_top) + radius_top;
        for ix in 0..=r_segs {
            let u = ix as f32 / r_segs as f32;
            let theta = u * 2.0 * PI;
            let (sin_t, cos_t) = theta.sin_cos();
            data.push_vertex(
                [radius * sin_t, -v * height + half_height, radius * cos_t],
                normalize3([sin_t, slope, cos_t]),
                [u, 1.0 - v],
            );
        }
    }

    for ix in 0..r_segs {
        for iy in 0..h_segs {
            let a = iy * row + ix;
            let b = (iy + 1) * row + ix;
            let c = (iy + 1) * row + ix + 1;
            let d = iy * row + ix + 1;
            data.push_triangle(a, b, d);
            data.push_triangle(b, c, d);
        }
    }

    if !open_ended {
        if radius_top > 0.0 {
            push_cylinder_cap(&mut data, radius_top, half_height, r_segs, true);
        }
        if radius_bottom > 0.0 {
            push_cylinder_cap(&mut data, radius_bottom, -half_height, r_segs, false);
        }
    }

    data
}

fn push_cylinder_cap(data: &mut GeometryData, radius: f32, y: f32, segments: u32, top: bool) {
    let sign = if top { 1.0 } else { -1.0 };
    let normal = [0.0, sign, 0.0];

    let center_start = data.vertices.len() as u32;
    for _ in 0..segments {
        data.push_vertex([0.0, y, 0.0], normal, [0.5, 0.5]);
    }

    let ring_start = data.vertices.len() as u32;
    for ix in 0..=segments {
        let theta = ix as f32 / segments as f32 * 2.0 * PI;
        let (sin_t, cos_t) = theta.sin_cos();
        data.push_vertex(
            [radius * sin_t, y, radius * cos_t],
            normal,
            [cos_t * 0.5 + 0.5, sin_t * 0.5 * sign + 0.5],
        );
    }

    for ix in 0..segments {
        let c = center_start + ix;
        let i = ring_start + ix;
        if top {
            data.push_triangle(i, i + 1, c);
        } else {
            data.push_triangle(i + 1, i, c);
        }
    }
}

/// Generate a torus lying in the XY plane
///
/// # Arguments
/// * `radius` - Distance from the center to the middle of the tube
/// * `tube` - Tube radius
/// * `radial_segments` - Segments around the tube
/// * `tubular_segments` - Segments around the ring
pub fn generate_torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let r_segs = radial_segments.max(3);
    let t_segs = tubular_segments.max(3);
    let row = t_segs + 1;

    for j in 0..=r_segs {
        let v = j as f32 / r_segs as f32 * 2.0 * PI;
        for i in 0..=t_segs {
            let u = i as f32 / t_segs as f32 * 2.0 * PI;
            let position = [
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            ];
            let center = [radius * u.cos(), radius * u.sin(), 0.0];
            let normal = normalize3([
                position[0] - center[0],
                position[1] - center[1],
                position[2] - center[2],
            ]);
            data.push_vertex(
                position,
                normal,
                [i as f32 / t_segs as f32, j as f32 / r_segs as f32],
            );
        }
    }

    for j in 1..=r_segs {
        for i in 1..=t_segs {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            data.push_triangle(a, b, d);
            data.push_triangle(b, c, d);
        }
    }

    data
}

/// Generate a flat annulus in the XY plane facing +Z
///
/// Radii may be given in either order; swapping them only flips which side
/// faces forward, so render rings without back-face culling.
pub fn generate_ring(inner_radius: f32, outer_radius: f32, theta_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let segs = theta_segments.max(3);
    let row = segs + 1;
    let uv_radius = outer_radius.abs().max(inner_radius.abs()).max(f32::EPSILON);

    for radius in [inner_radius, outer_radius] {
        for i in 0..=segs {
            let theta = i as f32 / segs as f32 * 2.0 * PI;
            let (x, y) = (radius * theta.cos(), radius * theta.sin());
            data.push_vertex(
                [x, y, 0.0],
                [0.0, 0.0, 1.0],
                [(x / uv_radius + 1.0) * 0.5, (y / uv_radius + 1.0) * 0.5],
            );
        }
    }

    for i in 0..segs {
        let a = i;
        let b = i + row;
        let c = i + row + 1;
        let d = i + 1;
        data.push_triangle(a, b, d);
        data.push_triangle(b, c, d);
    }

    data
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{assert_well_formed, outward_ratio};
    use super::*;

    #[test]
    fn test_box_generation() {
        let b = generate_box(2.0, 4.0, 6.0);
        assert_eq!(b.vertex_count(), 24); // 6 faces * 4 vertices
        assert_eq!(b.triangle_count(), 12);
        assert_well_formed(&b);
        assert_eq!(outward_ratio(&b), 1.0);

        let (min, max) = b.bounds();
        assert_eq!(min, [-1.0, -2.0, -3.0]);
        assert_eq!(max, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(0.32, 16, 12);
        assert_well_formed(&sphere);
        assert_eq!(sphere.vertex_count(), 17 * 13);
        // Pole rows drop one triangle per quad
        assert_eq!(sphere.triangle_count(), (16 * 12 * 2 - 2 * 16) as usize);
        assert!(outward_ratio(&sphere) > 0.99);

        for v in &sphere.vertices {
            let r = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!((r - 0.32).abs() < 1e-5);
        }
    }

    #[test]
    fn test_partial_sphere_stops_above_south_pole() {
        let hood = generate_partial_sphere(0.9, 24, 16, 0.0, 2.0 * PI, 0.0, PI / 1.3);
        assert_well_formed(&hood);
        let (min, _) = hood.bounds();
        // Lowest point is at cos(PI / 1.3) * r, well above -r
        assert!((min[1] - 0.9 * (PI / 1.3).cos()).abs() < 1e-4);
        assert!(min[1] > -0.9 + 0.05);
        // Open bottom keeps both triangles on the last row
        assert_eq!(hood.triangle_count(), (24 * 16 * 2 - 24) as usize);
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(2.0, 2.0, 2, 2);
        assert_eq!(plane.vertex_count(), 9); // 3x3 grid
        assert_eq!(plane.indices.len(), 24); // 4 quads * 2 triangles * 3 indices
        assert_well_formed(&plane);
        assert_eq!(outward_ratio(&plane), 1.0);
    }

    #[test]
    fn test_open_cylinder_has_no_caps() {
        let sleeve = generate_cylinder(0.43, 0.52, 2.2, 8, 4, true);
        assert_well_formed(&sleeve);
        assert_eq!(sleeve.vertex_count(), 9 * 5);
        assert_eq!(sleeve.triangle_count(), 8 * 4 * 2);
        assert_eq!(outward_ratio(&sleeve), 1.0);

        // Tapers from the top radius to the bottom radius
        let top = sleeve.vertices[0];
        let bottom = sleeve.vertices[4 * 9];
        assert!((top[1] - 1.1).abs() < 1e-6);
        assert!((top[2] - 0.43).abs() < 1e-6);
        assert!((bottom[1] + 1.1).abs() < 1e-6);
        assert!((bottom[2] - 0.52).abs() < 1e-6);
    }

    #[test]
    fn test_closed_cylinder_adds_caps() {
        let open = generate_cylinder(1.0, 1.0, 1.0, 8, 1, true);
        let closed = generate_cylinder(1.0, 1.0, 1.0, 8, 1, false);
        assert_well_formed(&closed);
        assert_eq!(closed.triangle_count(), open.triangle_count() + 16);
        assert_eq!(outward_ratio(&closed), 1.0);
    }

    #[test]
    fn test_torus_generation() {
        let torus = generate_torus(0.6, 0.08, 8, 16);
        assert_well_formed(&torus);
        assert_eq!(torus.vertex_count(), 9 * 17);
        assert_eq!(torus.triangle_count(), 8 * 16 * 2);
        assert!(outward_ratio(&torus) > 0.99);

        let (min, max) = torus.bounds();
        assert!((max[0] - 0.68).abs() < 1e-5);
        assert!((min[2] + 0.08).abs() < 1e-3);
    }

    #[test]
    fn test_ring_generation() {
        let ring = generate_ring(5.4, 6.0, 16);
        assert_well_formed(&ring);
        assert_eq!(ring.vertex_count(), 2 * 17);
        assert_eq!(ring.triangle_count(), 32);
        assert_eq!(outward_ratio(&ring), 1.0);

        // Swapped radii produce the same footprint
        let swapped = generate_ring(6.0, 5.4, 16);
        assert_eq!(swapped.bounds(), ring.bounds());
    }
}
