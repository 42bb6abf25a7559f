use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use cgmath::*;
use std::f32::consts::PI;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Distance multiplier for one zoom step
pub const ZOOM_STEP: f32 = 0.95;

/// Camera orbiting a target on a sphere, Y up
///
/// `polar` is measured from +Y, `azimuth` around +Y starting at +Z. Rotation
/// input is queued and bled into the angles by `damping` every update, so a
/// flick keeps drifting for a few frames after the mouse stops.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub polar: f32,
    pub azimuth: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    /// Fraction of the queued rotation applied per update, 1 disables damping
    pub damping: f32,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
    pending_azimuth: f32,
    pending_polar: f32,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        let view = Matrix4::look_at_rh(eye, target, self.up);
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

impl OrbitCamera {
    pub fn new(distance: f32, polar: f32, azimuth: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            polar,
            azimuth,
            eye: Vector3::zero(), // Will be auto-calculated in `update()` nevertheless.
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            damping: 1.0,
            aspect,
            fovy: Rad(PI / 4.0),
            znear: 0.1,
            zfar: 1000.0,
            uniform: CameraUniform::default(),
            pending_azimuth: 0.0,
            pending_polar: 0.0,
        };
        camera.apply_bounds();
        camera.update_eye();
        camera
    }

    /// Orbit camera placed at `eye`, looking at `target`
    pub fn looking_at(eye: Vector3<f32>, target: Vector3<f32>, aspect: f32) -> Self {
        let offset = eye - target;
        let distance = offset.magnitude().max(f32::EPSILON);
        let polar = (offset.y / distance).clamp(-1.0, 1.0).acos();
        let azimuth = offset.x.atan2(offset.z);
        Self::new(distance, polar, azimuth, target, aspect)
    }

    /// The runway framing: eye (0, 4, 18) on the origin, 42 degree lens
    pub fn runway(aspect: f32) -> Self {
        let mut camera = Self::looking_at(Vector3::new(0.0, 4.0, 18.0), Vector3::zero(), aspect);
        camera.bounds = OrbitCameraBounds::runway();
        camera.damping = 0.08;
        camera.fovy = Deg(42.0).into();
        camera.znear = 0.1;
        camera.zfar = 200.0;
        camera.apply_bounds();
        camera.update_eye();
        camera
    }

    pub fn set_distance(&mut self, distance: f32) {
        if !distance.is_finite() {
            return;
        }
        self.distance = distance;
        self.apply_bounds();
        self.update_eye();
    }

    /// Positive steps move closer, each step scaling the distance by 0.95
    pub fn zoom(&mut self, steps: f32) {
        if !steps.is_finite() {
            return;
        }
        let scaled = self.distance * ZOOM_STEP.powf(steps);
        self.set_distance(scaled.min(f32::MAX));
    }

    /// Queues a rotation; it is applied gradually by [`OrbitCamera::update`]
    pub fn rotate(&mut self, delta_azimuth: f32, delta_polar: f32) {
        if delta_azimuth.is_finite() && delta_polar.is_finite() {
            self.pending_azimuth += delta_azimuth;
            self.pending_polar += delta_polar;
        }
    }

    /// Advances damping and recomputes the eye; call once per frame
    pub fn update(&mut self) {
        let factor = self.damping.clamp(f32::EPSILON, 1.0);
        self.azimuth += self.pending_azimuth * factor;
        self.polar += self.pending_polar * factor;
        self.pending_azimuth *= 1.0 - factor;
        self.pending_polar *= 1.0 - factor;

        self.azimuth %= 2.0 * PI;
        self.apply_bounds();
        self.update_eye();
    }

    /// Rotation still waiting to be applied
    pub fn pending_rotation(&self) -> (f32, f32) {
        (self.pending_azimuth, self.pending_polar)
    }

    fn apply_bounds(&mut self) {
        self.polar = self.polar.clamp(self.bounds.min_polar, self.bounds.max_polar);
        self.distance = self.distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
    }

    fn update_eye(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.polar, self.azimuth, self.distance, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_polar: f32,
    pub max_polar: f32,
}

impl OrbitCameraBounds {
    /// Keeps the audience between a high balcony and just above the floor
    pub fn runway() -> Self {
        Self {
            min_distance: Some(12.0),
            max_distance: Some(26.0),
            min_polar: PI / 3.0,
            max_polar: PI / 2.2,
        }
    }
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: None,
            max_distance: None,
            min_polar: f32::EPSILON,
            max_polar: PI - f32::EPSILON,
        }
    }
}

fn calculate_cartesian_eye_position(
    polar: f32,
    azimuth: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * polar.sin() * azimuth.sin(),
        distance * polar.cos(),
        distance * polar.sin() * azimuth.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runway_framing() {
        let camera = OrbitCamera::runway(1.5);
        assert!((camera.eye - Vector3::new(0.0, 4.0, 18.0)).magnitude() < 1e-4);
        assert!((camera.distance - 340f32.sqrt()).abs() < 1e-4);
        assert_eq!(camera.target, Vector3::zero());
        assert_eq!(camera.zfar, 200.0);
    }

    #[test]
    fn test_bounds_hold_under_huge_input() {
        let mut camera = OrbitCamera::runway(1.5);

        camera.zoom(1.0e6);
        assert_eq!(camera.distance, 12.0);
        camera.zoom(-1.0e6);
        assert_eq!(camera.distance, 26.0);

        camera.rotate(0.0, 1.0e6);
        for _ in 0..10 {
            camera.update();
            assert!(camera.polar <= PI / 2.2 + 1e-6);
            assert!(camera.polar >= PI / 3.0 - 1e-6);
        }
        assert!((camera.polar - PI / 2.2).abs() < 1e-6);

        camera.rotate(0.0, -1.0e9);
        camera.update();
        assert!((camera.polar - PI / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_input_is_ignored() {
        let mut camera = OrbitCamera::runway(1.5);
        let before = camera.eye;
        camera.zoom(f32::NAN);
        camera.rotate(f32::INFINITY, 0.0);
        camera.update();
        assert_eq!(camera.eye, before);
    }

    #[test]
    fn test_damping_spreads_rotation_over_frames() {
        let mut camera = OrbitCamera::runway(1.5);
        camera.rotate(0.5, 0.0);

        camera.update();
        assert!((camera.azimuth - 0.5 * 0.08).abs() < 1e-6);
        assert!((camera.pending_rotation().0 - 0.5 * 0.92).abs() < 1e-6);

        for _ in 0..200 {
            camera.update();
        }
        assert!((camera.azimuth - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_scales_distance() {
        let mut camera = OrbitCamera::runway(1.5);
        camera.set_distance(20.0);
        camera.zoom(1.0);
        assert!((camera.distance - 19.0).abs() < 1e-5);
        camera.zoom(-1.0);
        assert!((camera.distance - 20.0).abs() < 1e-4);
    }
}
