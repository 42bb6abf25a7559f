//! # Garment Figure
//!
//! The rigged figure and its walk cycle. Every animated value is a pure
//! function of elapsed time; [`Figure::update`] writes them into the node
//! table once per frame.
//!
//! Position along the runway follows the loop phase and jumps back to the
//! start when the phase wraps. Bob, sway and limb swing are periodic in `t`
//! and stay continuous through the wrap.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use cgmath::Vector3;

use super::{garments, SceneBuilder, Side};
use crate::{
    clock::{cycle_angle, cycle_fraction},
    gfx::scene::{NodeId, NodeTable, Transform},
};

pub const TRAVEL_DISTANCE: f32 = 80.0;
/// Units per second
pub const WALK_SPEED: f32 = 6.0;
pub const START_Z: f32 = 40.0;
pub const END_Z: f32 = -40.0;
pub const BASE_HEIGHT: f32 = 1.4;

const BOB_RATE: f32 = 2.2;
const BOB_AMPLITUDE: f32 = 0.08;
const SWAY_AMPLITUDE: f32 = 0.08;
const STRIDE_RATE: f32 = 2.8;
const ARM_AMPLITUDE: f32 = 0.45;
const LEG_AMPLITUDE: f32 = 0.38;
const STRIDE_DEPTH: f32 = 0.12;

const SHOULDER: [f32; 3] = [0.95, 2.3, 0.0];
const SHOULDER_TILT: f32 = -0.12;
const HIP: [f32; 3] = [0.45, 0.8, 0.0];
const HIP_TILT: f32 = 0.03;

/// Seconds for one pass down the runway
pub fn loop_time() -> f64 {
    (TRAVEL_DISTANCE / WALK_SPEED) as f64
}

/// Position within the current pass, in `[0, 1)`
pub fn phase(t: f64) -> f32 {
    cycle_fraction(t, loop_time())
}

/// Root translation and yaw at time `t`
pub fn root_pose(t: f64) -> (Vector3<f32>, f32) {
    let phase = phase(t);
    let z = START_Z + (END_Z - START_Z) * phase;
    let y = BASE_HEIGHT + cycle_angle(t, BOB_RATE).sin() * BOB_AMPLITUDE;
    let yaw = PI + (phase * TAU).sin() * SWAY_AMPLITUDE;
    (Vector3::new(0.0, y, z), yaw)
}

pub fn arm_swing(t: f64) -> f32 {
    cycle_angle(t, STRIDE_RATE).sin() * ARM_AMPLITUDE
}

/// Legs lead the arms by a quarter cycle
pub fn leg_swing(t: f64) -> f32 {
    (cycle_angle(t, STRIDE_RATE) + FRAC_PI_2).sin() * LEG_AMPLITUDE
}

/// Forward/back hip offset for one leg
pub fn stride_depth(t: f64, side: Side) -> f32 {
    let angle = cycle_angle(t, STRIDE_RATE);
    match side {
        Side::Left => (angle + FRAC_PI_2).cos() * STRIDE_DEPTH,
        Side::Right => angle.cos() * STRIDE_DEPTH,
    }
}

/// Local transform of an arm pivot
pub fn arm_transform(t: f64, side: Side) -> Transform {
    let s = side.sign();
    Transform::from_translation(s * SHOULDER[0], SHOULDER[1], SHOULDER[2]).with_rotation(
        s * arm_swing(t),
        0.0,
        s * SHOULDER_TILT,
    )
}

/// Local transform of a leg pivot
pub fn leg_transform(t: f64, side: Side) -> Transform {
    let s = side.sign();
    Transform::from_translation(s * HIP[0], HIP[1], HIP[2] + stride_depth(t, side)).with_rotation(
        s * leg_swing(t),
        0.0,
        s * HIP_TILT,
    )
}

/// Node handles for the figure's animated groups
#[derive(Debug, Clone, Copy)]
pub struct Figure {
    pub root: NodeId,
    /// Indexed left, right
    pub arms: [NodeId; 2],
    pub legs: [NodeId; 2],
    pub torso: NodeId,
    pub trims: [NodeId; 4],
}

impl Figure {
    pub fn build(builder: &mut SceneBuilder) -> Self {
        let (translation, yaw) = root_pose(0.0);
        let root = builder.group(
            None,
            "figure",
            Transform::from_translation(translation.x, translation.y, translation.z).with_rotation(0.0, yaw, 0.0),
        );

        let arms = Side::BOTH.map(|side| garments::build_sleeve(builder, root, side));
        let legs = Side::BOTH.map(|side| garments::build_leg(builder, root, side));
        let torso = garments::build_jacket(builder, root);
        let trims = garments::build_trims(builder, root);

        Self {
            root,
            arms,
            legs,
            torso,
            trims,
        }
    }

    /// Writes the pose at time `t` into `nodes`
    ///
    /// Nodes missing from the table are skipped for this frame.
    pub fn update(&self, nodes: &mut NodeTable, t: f64) {
        if let Some(root) = nodes.transform_mut(self.root) {
            let (translation, yaw) = root_pose(t);
            root.translation = translation;
            root.rotation = Vector3::new(0.0, yaw, 0.0);
        }

        for (side, (arm, leg)) in Side::BOTH.into_iter().zip(self.arms.into_iter().zip(self.legs)) {
            if let Some(transform) = nodes.transform_mut(arm) {
                *transform = arm_transform(t, side);
            }
            if let Some(transform) = nodes.transform_mut(leg) {
                *transform = leg_transform(t, side);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        camera::{CameraController, CameraManager, OrbitCamera},
        geometry::GeometryLibrary,
        scene::Scene,
    };
    use crate::showcase::LightingRig;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn build_figure() -> (Scene, Figure) {
        let camera = CameraManager::new(OrbitCamera::runway(1.5), CameraController::default());
        let mut scene = Scene::new(camera, *LightingRig::new().lights());
        let mut geometries = GeometryLibrary::new();
        let figure = Figure::build(&mut SceneBuilder::new(&mut scene, &mut geometries));
        (scene, figure)
    }

    #[test]
    fn test_phase_stays_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let t = rng.random_range(0.0..10_000.0f64);
            let p = phase(t);
            assert!((0.0..1.0).contains(&p), "phase({}) = {}", t, p);
        }
        assert_eq!(phase(loop_time()), 0.0);
        assert_eq!(phase(0.0), 0.0);
    }

    #[test]
    fn test_runway_endpoints() {
        let l = loop_time();
        let eps = 1e-3;

        assert!((root_pose(0.0).0.z - START_Z).abs() < 1e-5);
        assert!(root_pose(l / 2.0).0.z.abs() < 1e-3);

        let before_wrap = root_pose(l - eps).0.z;
        assert!((before_wrap - (END_Z + eps as f32 * WALK_SPEED)).abs() < 1e-2);

        let after_wrap = root_pose(l + eps).0.z;
        assert!((after_wrap - START_Z).abs() < 1e-2);
    }

    #[test]
    fn test_z_stays_on_runway() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..2_000 {
            let t = rng.random_range(0.0..500.0f64);
            let z = root_pose(t).0.z;
            assert!(z <= START_Z && z > END_Z, "z({}) = {}", t, z);
        }
    }

    #[test]
    fn test_z_decreases_within_a_pass() {
        let l = loop_time();
        let mut previous = root_pose(0.0).0.z;
        for i in 1..100 {
            let z = root_pose(l * i as f64 / 100.0).0.z;
            assert!(z < previous);
            previous = z;
        }
    }

    #[test]
    fn test_bob_and_sway_are_continuous_through_wrap() {
        let l = loop_time();
        for cycle in 1..5 {
            let wrap = l * cycle as f64;
            let (before, yaw_before) = root_pose(wrap - 1e-3);
            let (after, yaw_after) = root_pose(wrap + 1e-3);
            assert!((before.y - after.y).abs() < 1e-3);
            assert!((yaw_before - yaw_after).abs() < 1e-3);
        }
    }

    #[test]
    fn test_bob_and_sway_periods() {
        let mut rng = StdRng::seed_from_u64(3);
        let bob_period = std::f64::consts::TAU / BOB_RATE as f64;
        for _ in 0..200 {
            let t = rng.random_range(0.0..60.0f64);
            assert!((root_pose(t).0.y - root_pose(t + bob_period).0.y).abs() < 1e-3);
            assert!((root_pose(t).1 - root_pose(t + loop_time()).1).abs() < 1e-3);
        }
    }

    #[test]
    fn test_walk_keeps_moving_after_days_of_uptime() {
        let start = 262_144.0;
        let mut depths = Vec::new();
        let mut swings = Vec::new();
        for frame in 0..60 {
            let t = start + frame as f64 / 60.0;
            depths.push(root_pose(t).0.z);
            swings.push(arm_swing(t));
        }

        for pair in depths.windows(2) {
            assert!(pair[1] != pair[0], "z froze at {}", pair[0]);
        }
        for pair in swings.windows(2) {
            assert!(pair[1] != pair[0], "arm swing froze at {}", pair[0]);
        }
    }

    #[test]
    fn test_limbs_mirror_each_other() {
        let (mut scene, figure) = build_figure();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let t = rng.random_range(0.0..100.0f64);
            figure.update(&mut scene.nodes, t);

            for pair in [figure.arms, figure.legs] {
                let left = scene.nodes.get(pair[0]).unwrap().transform;
                let right = scene.nodes.get(pair[1]).unwrap().transform;
                assert_eq!(left.rotation.x, -right.rotation.x);
                assert_eq!(left.rotation.z, -right.rotation.z);
                assert_eq!(left.translation.x, -right.translation.x);
            }
        }
    }

    #[test]
    fn test_legs_counter_swing_arms() {
        // A quarter stride cycle in, the arms are at full swing and the legs pass through zero
        let t = std::f64::consts::FRAC_PI_2 / STRIDE_RATE as f64;
        assert!((arm_swing(t) - ARM_AMPLITUDE).abs() < 1e-5);
        assert!(leg_swing(t).abs() < 1e-5);
        assert!((stride_depth(t, Side::Left) + STRIDE_DEPTH).abs() < 1e-5);
        assert!(stride_depth(t, Side::Right).abs() < 1e-5);
    }

    #[test]
    fn test_limbs_pivot_at_attachment_points() {
        let (mut scene, figure) = build_figure();
        figure.update(&mut scene.nodes, 0.7);
        scene.nodes.update_world_matrices();

        let root = scene.nodes.world_matrix(figure.root).unwrap();
        let shoulder = scene.nodes.world_position(figure.arms[0]).unwrap();
        let expected = root * cgmath::Vector4::new(SHOULDER[0], SHOULDER[1], SHOULDER[2], 1.0);
        assert!((shoulder.x - expected.x).abs() < 1e-4);
        assert!((shoulder.y - expected.y).abs() < 1e-4);
        assert!((shoulder.z - expected.z).abs() < 1e-4);
    }

    #[test]
    fn test_missing_nodes_are_skipped() {
        let (_, figure) = build_figure();
        let mut empty = NodeTable::new();
        figure.update(&mut empty, 5.0);
        assert!(empty.is_empty());

        // A table holding only the root still gets the root updated
        let mut partial = NodeTable::new();
        partial.insert("figure", None, Transform::identity());
        figure.update(&mut partial, loop_time() / 2.0);
        let root = partial.get(figure.root).unwrap().transform;
        assert!(root.translation.z.abs() < 1e-3);
        assert_eq!(partial.len(), 1);
    }
}
