//! Static runway environment
//!
//! Built once at mount; nothing here is touched per frame.

use std::f32::consts::FRAC_PI_2;

use super::{GeometryKey, SceneBuilder, Side};
use crate::{
    fabric::Rgb8,
    gfx::{
        resources::material::{Material, MaterialManager},
        scene::{NodeId, Transform},
    },
};

pub const RUNWAY: &str = "runway";
pub const PLATFORM: &str = "stage";
pub const BACKDROP: &str = "backdrop";
pub const WALL: &str = "wall";
pub const GLOW: &str = "glow";

const RECEIVE: (bool, bool) = (false, true);

pub fn register_materials(materials: &mut MaterialManager) {
    materials.add_material(
        Material::new(RUNWAY, Rgb8::hex(0x15161b))
            .with_metallic(0.55)
            .with_roughness(0.2)
            .with_env_intensity(1.4),
    );
    materials.add_material(
        Material::new(PLATFORM, Rgb8::hex(0x0d0e12))
            .with_metallic(0.3)
            .with_roughness(0.7),
    );
    materials.add_material(
        Material::new(BACKDROP, Rgb8::hex(0x14141c))
            .with_emission(Rgb8::hex(0x050a1a), 0.6)
            .with_roughness(0.9),
    );
    materials.add_material(
        Material::new(WALL, Rgb8::hex(0x090a10))
            .with_metallic(0.2)
            .with_roughness(0.8),
    );
    materials.add_material(
        Material::new(GLOW, Rgb8::hex(0x5162ff))
            .with_opacity(0.15)
            .unlit()
            .additive(),
    );
}

/// Handle to the stage's group node
#[derive(Debug, Clone, Copy)]
pub struct Stage {
    pub root: NodeId,
}

impl Stage {
    pub fn build(builder: &mut SceneBuilder) -> Self {
        let root = builder.group(None, "stage", Transform::identity());

        builder.mesh(
            root,
            "runway_floor",
            GeometryKey::RunwayFloor,
            Transform::identity().with_rotation(-FRAC_PI_2, 0.0, 0.0),
            RUNWAY,
            RECEIVE,
        );
        builder.mesh(
            root,
            "platform",
            GeometryKey::Platform,
            Transform::from_translation(0.0, -0.4, 0.0),
            PLATFORM,
            RECEIVE,
        );
        builder.mesh(
            root,
            "backdrop",
            GeometryKey::Backdrop,
            Transform::from_translation(0.0, 6.0, -40.0),
            BACKDROP,
            RECEIVE,
        );
        for side in Side::BOTH {
            let s = side.sign();
            builder.mesh(
                root,
                &format!("wall.{}", side.label()),
                GeometryKey::SideWall,
                // Toed in toward the runway
                Transform::from_translation(s * 7.5, 2.5, 0.0).with_rotation(0.0, s * 0.03, 0.0),
                WALL,
                RECEIVE,
            );
        }
        builder.mesh(
            root,
            "glow_ring",
            GeometryKey::GlowRing,
            Transform::from_translation(0.0, 3.4, -48.0),
            GLOW,
            (false, false),
        );

        Self { root }
    }
}
