//! Studio lighting rig
//!
//! A fixed light set. Only the key spotlight and the rim area light move; both
//! are pure functions of elapsed time.

use cgmath::{InnerSpace, Matrix3, Matrix4, Point3, Rad, Vector3};

use crate::{
    clock::cycle_angle,
    fabric::Rgb8,
    gfx::resources::global_bindings::{
        AmbientLight, AreaLight, HemisphereLight, PointLight, SceneLights, SpotLight,
    },
};

/// Key spotlight sweep radius in world units
const KEY_SWEEP: f32 = 12.0;
const KEY_SWEEP_RATE: f32 = 0.4;
const KEY_TARGET_HEIGHT: f32 = 2.5;
const KEY_TARGET_DEPTH: f32 = -10.0;

const RIM_POSITION: [f32; 3] = [0.0, 9.0, -22.0];
const RIM_AIM: [f32; 3] = [0.0, 3.0, 0.0];
const RIM_YAW_RATE: f32 = 0.2;
const RIM_YAW_AMPLITUDE: f32 = 0.02;

/// Key spotlight position at time `t`
pub fn key_position(t: f64) -> Point3<f32> {
    Point3::new(cycle_angle(t, KEY_SWEEP_RATE).sin() * KEY_SWEEP, 14.0, 16.0)
}

/// Point the key spotlight aims at, at time `t`
pub fn key_target(t: f64) -> Point3<f32> {
    Point3::new(
        0.0,
        KEY_TARGET_HEIGHT,
        KEY_TARGET_DEPTH + cycle_angle(t, KEY_SWEEP_RATE).cos() * KEY_SWEEP,
    )
}

/// Rim light basis `(normal, right, up)` at time `t`
///
/// Faces (0, 3, 0) from its pinned position, then yaws about world Y by
/// `sin(t·0.2)·0.02`.
pub fn rim_orientation(t: f64) -> (Vector3<f32>, Vector3<f32>, Vector3<f32>) {
    let forward = (Point3::from(RIM_AIM) - Point3::from(RIM_POSITION)).normalize();
    let right = forward.cross(Vector3::unit_y()).normalize();
    let up = right.cross(forward);

    let yaw = Matrix3::from_angle_y(Rad(cycle_angle(t, RIM_YAW_RATE).sin() * RIM_YAW_AMPLITUDE));
    (yaw * forward, yaw * right, yaw * up)
}

/// The studio's lights and their per-frame motion
#[derive(Debug, Clone)]
pub struct LightingRig {
    lights: SceneLights,
    target_refreshes: u64,
}

impl LightingRig {
    pub fn new() -> Self {
        let (normal, right, up) = rim_orientation(0.0);
        let lights = SceneLights {
            ambient: AmbientLight {
                color: Rgb8::WHITE,
                intensity: 0.42,
            },
            hemisphere: HemisphereLight {
                sky: Rgb8::hex(0x4f5b86),
                ground: Rgb8::hex(0x0f0f14),
                intensity: 0.6,
            },
            spots: [
                SpotLight {
                    color: Rgb8::hex(0xf5f5f0),
                    intensity: 6.0,
                    position: Point3::new(10.0, 14.0, 16.0),
                    target_world: Matrix4::from_translation(Vector3::new(0.0, 0.0, 0.0)),
                    angle: std::f32::consts::PI / 6.0,
                    penumbra: 0.6,
                    cast_shadow: true,
                },
                SpotLight {
                    color: Rgb8::hex(0xffe9d6),
                    intensity: 3.5,
                    position: Point3::new(-8.0, 10.0, -12.0),
                    target_world: Matrix4::from_translation(Vector3::new(0.0, 0.0, 0.0)),
                    angle: std::f32::consts::PI / 7.0,
                    penumbra: 0.7,
                    cast_shadow: false,
                },
            ],
            area: AreaLight {
                color: Rgb8::hex(0x9bb7ff),
                intensity: 80.0,
                width: 18.0,
                height: 6.0,
                position: Point3::from(RIM_POSITION),
                normal,
                right,
                up,
            },
            points: [
                PointLight {
                    color: Rgb8::hex(0x89a7ff),
                    intensity: 2.0,
                    position: Point3::new(5.0, 5.0, 18.0),
                },
                PointLight {
                    color: Rgb8::hex(0xff9b70),
                    intensity: 2.0,
                    position: Point3::new(-5.0, 5.0, 18.0),
                },
            ],
        };

        Self {
            lights,
            target_refreshes: 0,
        }
    }

    /// Moves the key spotlight and rim light to their poses at time `t`
    ///
    /// The key target's world matrix is rebuilt whenever the target moves.
    /// The shading and shadow passes aim the cone from that matrix.
    pub fn update(&mut self, t: f64) {
        let key = &mut self.lights.spots[0];
        key.position.x = key_position(t).x;

        let target = key_target(t);
        if key.target() != target || self.target_refreshes == 0 {
            key.target_world = SpotLight::target_at(target);
            self.target_refreshes += 1;
        }

        let (normal, right, up) = rim_orientation(t);
        let rim = &mut self.lights.area;
        rim.position = Point3::from(RIM_POSITION);
        rim.normal = normal;
        rim.right = right;
        rim.up = up;
    }

    pub fn lights(&self) -> &SceneLights {
        &self.lights
    }

    /// World matrix of the key spotlight's aim target
    pub fn key_target_world(&self) -> Matrix4<f32> {
        self.lights.spots[0].target_world
    }

    /// How many times the key target's world matrix has been rebuilt
    pub fn target_refresh_count(&self) -> u64 {
        self.target_refreshes
    }
}

impl Default for LightingRig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_light_sweeps() {
        let mut rig = LightingRig::new();
        rig.update(0.0);
        let key = rig.lights().spots[0];
        assert_eq!(key.position, Point3::new(0.0, 14.0, 16.0));
        assert_eq!(key.target(), Point3::new(0.0, 2.5, 2.0));

        let t = std::f64::consts::FRAC_PI_2 / 0.4;
        rig.update(t);
        let key = rig.lights().spots[0];
        assert!((key.position.x - 12.0).abs() < 1e-4);
        assert!((key.target().z + 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_target_matrix_refreshes_when_aim_moves() {
        let mut rig = LightingRig::new();
        rig.update(1.0);
        assert_eq!(rig.target_refresh_count(), 1);

        // Same time, same aim: nothing to refresh
        rig.update(1.0);
        assert_eq!(rig.target_refresh_count(), 1);

        for frame in 1..=10 {
            let t = 1.0 + frame as f64 / 60.0;
            rig.update(t);
            let target = key_target(t);
            let world = rig.key_target_world();
            assert_eq!(world.w.truncate(), Vector3::new(target.x, target.y, target.z));
        }
        assert_eq!(rig.target_refresh_count(), 11);
    }

    #[test]
    fn test_shadow_projection_follows_refreshed_target() {
        use cgmath::Transform;

        let mut rig = LightingRig::new();
        rig.update(0.0);
        let stale = rig.lights().spots[0];

        let t = 2.5;
        rig.update(t);
        let key = rig.lights().spots[0];
        let aim = key_target(t);

        let clip = key.shadow_view_proj().transform_point(aim);
        assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);
        assert!((key.direction() - (aim - key.position).normalize()).magnitude() < 1e-5);

        // A light still holding the old target matrix aims somewhere else
        let stale_clip = SpotLight { position: key.position, ..stale }
            .shadow_view_proj()
            .transform_point(aim);
        assert!(stale_clip.x.abs() > 1e-2 || stale_clip.y.abs() > 1e-2);
    }

    #[test]
    fn test_rim_faces_stage_with_small_yaw() {
        let (normal, right, up) = rim_orientation(0.0);
        let aim = (Point3::from(RIM_AIM) - Point3::from(RIM_POSITION)).normalize();
        assert!((normal - aim).magnitude() < 1e-6);
        assert!(normal.dot(right).abs() < 1e-6);
        assert!(normal.dot(up).abs() < 1e-6);
        assert!(up.y > 0.0);

        for i in 0..50 {
            let t = i as f64 * 1.7;
            let (normal, _, _) = rim_orientation(t);
            let angle = normal.angle(aim).0;
            assert!(angle <= RIM_YAW_AMPLITUDE + 1e-4);
        }
    }

    #[test]
    fn test_static_lights_stay_put() {
        let mut rig = LightingRig::new();
        let before = *rig.lights();
        rig.update(42.0);
        let after = rig.lights();
        assert_eq!(before.spots[1], after.spots[1]);
        assert_eq!(before.points, after.points);
        assert_eq!(after.area.position, Point3::from(RIM_POSITION));
        assert!(after.spots[0].cast_shadow);
        assert!(!after.spots[1].cast_shadow);
    }
}
