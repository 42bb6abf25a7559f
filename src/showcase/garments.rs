//! Garment materials and the mesh groups each garment is assembled from

use std::f32::consts::{FRAC_PI_2, PI};

use super::{GeometryKey, SceneBuilder, Side};
use crate::{
    fabric::{Palette, Rgb8},
    gfx::{
        resources::material::{Material, MaterialManager},
        scene::{NodeId, Transform},
    },
};

pub const JACKET: &str = "jacket";
pub const TROUSERS: &str = "trousers";
pub const ZIPPER: &str = "zipper";
pub const POCKET: &str = "pocket";
pub const CUFF: &str = "cuff";
pub const BOOT: &str = "boot";
pub const COLLAR: &str = "collar";
pub const FACE: &str = "face";
pub const VISOR: &str = "visor";
pub const BELT: &str = "belt";

const CAST: (bool, bool) = (true, false);
const CAST_AND_RECEIVE: (bool, bool) = (true, true);

pub fn register_materials(materials: &mut MaterialManager) {
    materials.add_material(
        Material::new(JACKET, Rgb8::WHITE)
            .with_fabric(Palette::JACKET)
            .with_roughness(0.45)
            .with_metallic(0.25)
            .with_env_intensity(0.8),
    );
    materials.add_material(
        Material::new(TROUSERS, Rgb8::WHITE)
            .with_fabric(Palette::TROUSERS)
            .with_roughness(0.52)
            .with_metallic(0.18)
            .with_env_intensity(0.7),
    );
    materials.add_material(
        Material::new(ZIPPER, Rgb8::hex(0xd9e1f2))
            .with_metallic(0.9)
            .with_roughness(0.1),
    );
    materials.add_material(
        Material::new(POCKET, Rgb8::hex(0x172330))
            .with_roughness(0.5)
            .with_metallic(0.2),
    );
    materials.add_material(
        Material::new(CUFF, Rgb8::hex(0x0f1826))
            .with_metallic(0.2)
            .with_roughness(0.5),
    );
    materials.add_material(
        Material::new(BOOT, Rgb8::hex(0x20242f))
            .with_metallic(0.2)
            .with_roughness(0.6),
    );
    materials.add_material(
        Material::new(COLLAR, Rgb8::hex(0x1a2332))
            .with_roughness(0.4)
            .with_metallic(0.3),
    );
    materials.add_material(Material::new(FACE, Rgb8::hex(0xd3c4b9)).with_roughness(0.68));
    materials.add_material(
        Material::new(VISOR, Rgb8::hex(0x243044))
            .with_opacity(0.8)
            .with_roughness(0.2)
            .with_metallic(0.3),
    );
    materials.add_material(
        Material::new(BELT, Rgb8::hex(0x101721))
            .with_roughness(0.3)
            .with_metallic(0.5),
    );
}

/// Torso shell, hood, zipper and pocket flaps under one group
pub fn build_jacket(builder: &mut SceneBuilder, parent: NodeId) -> NodeId {
    let torso = builder.group(Some(parent), "torso", Transform::identity());

    builder.mesh(
        torso,
        "torso_shell",
        GeometryKey::Torso,
        Transform::from_translation(0.0, 2.2, 0.0),
        JACKET,
        CAST_AND_RECEIVE,
    );
    builder.mesh(
        torso,
        "hood",
        GeometryKey::Hood,
        Transform::from_translation(0.0, 3.4, 0.0),
        JACKET,
        CAST_AND_RECEIVE,
    );
    builder.mesh(
        torso,
        "zipper",
        GeometryKey::ZipperStrip,
        Transform::from_translation(0.0, 2.2, 0.76),
        ZIPPER,
        CAST,
    );
    for side in Side::BOTH {
        builder.mesh(
            torso,
            &format!("pocket_flap.{}", side.label()),
            GeometryKey::PocketFlap,
            Transform::from_translation(side.sign() * 0.6, 1.6, 0.7),
            POCKET,
            CAST,
        );
    }
    torso
}

/// Shoulder pivot at (±0.95, 2.3, 0) carrying the sleeve and cuff
pub fn build_sleeve(builder: &mut SceneBuilder, parent: NodeId, side: Side) -> NodeId {
    let s = side.sign();
    let arm = builder.group(
        Some(parent),
        &format!("arm.{}", side.label()),
        Transform::from_translation(s * 0.95, 2.3, 0.0).with_rotation(0.0, 0.0, s * -0.12),
    );

    builder.mesh(
        arm,
        &format!("sleeve.{}", side.label()),
        GeometryKey::Sleeve,
        Transform::identity().with_rotation(FRAC_PI_2, 0.0, 0.0),
        JACKET,
        CAST_AND_RECEIVE,
    );
    builder.mesh(
        arm,
        &format!("cuff.{}", side.label()),
        GeometryKey::Cuff,
        Transform::from_translation(0.0, -1.1, 0.0).with_rotation(FRAC_PI_2, 0.0, 0.0),
        CUFF,
        CAST,
    );
    arm
}

/// Hip pivot at (±0.45, 0.8, 0) carrying both leg segments and the boot
pub fn build_leg(builder: &mut SceneBuilder, parent: NodeId, side: Side) -> NodeId {
    let s = side.sign();
    let leg = builder.group(
        Some(parent),
        &format!("leg.{}", side.label()),
        Transform::from_translation(s * 0.45, 0.8, 0.0).with_rotation(0.0, 0.0, s * 0.03),
    );

    builder.mesh(
        leg,
        &format!("upper_leg.{}", side.label()),
        GeometryKey::UpperLeg,
        Transform::from_translation(0.0, 0.6, 0.0),
        TROUSERS,
        CAST_AND_RECEIVE,
    );
    builder.mesh(
        leg,
        &format!("lower_leg.{}", side.label()),
        GeometryKey::LowerLeg,
        Transform::from_translation(0.0, -0.25, 0.06).with_rotation(0.12, 0.0, 0.0),
        TROUSERS,
        CAST_AND_RECEIVE,
    );

    // The outline's toe points along +X; the left boot turns around to match
    let boot_yaw = if side == Side::Left { PI } else { 0.0 };
    builder.mesh(
        leg,
        &format!("boot.{}", side.label()),
        GeometryKey::Boot,
        Transform::from_translation(s * 0.02, -1.35, 0.02).with_rotation(0.0, boot_yaw, 0.0),
        BOOT,
        CAST_AND_RECEIVE,
    );
    leg
}

/// Collar, face, visor and belt, each on its own node under the root
pub fn build_trims(builder: &mut SceneBuilder, parent: NodeId) -> [NodeId; 4] {
    [
        builder.mesh(
            parent,
            "collar",
            GeometryKey::Collar,
            Transform::from_translation(0.0, 3.05, 0.0),
            COLLAR,
            CAST,
        ),
        builder.mesh(
            parent,
            "face",
            GeometryKey::Face,
            Transform::from_translation(0.0, 3.35, 0.0),
            FACE,
            CAST,
        ),
        builder.mesh(
            parent,
            "visor",
            GeometryKey::Visor,
            Transform::from_translation(0.0, 3.33, 0.27).with_rotation(0.0, PI, 0.0),
            VISOR,
            CAST,
        ),
        builder.mesh(
            parent,
            "belt",
            GeometryKey::Belt,
            Transform::from_translation(0.0, 1.6, 0.0),
            BELT,
            CAST,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::material::BlendMode;

    #[test]
    fn test_fabric_materials_request_both_palettes() {
        let mut materials = MaterialManager::new();
        register_materials(&mut materials);

        let fabrics = materials.required_fabrics();
        assert_eq!(fabrics.len(), 2);
        assert!(fabrics.contains(&Palette::JACKET));
        assert!(fabrics.contains(&Palette::TROUSERS));
    }

    #[test]
    fn test_only_visor_is_translucent() {
        let mut materials = MaterialManager::new();
        register_materials(&mut materials);

        for id in [JACKET, TROUSERS, ZIPPER, POCKET, CUFF, BOOT, COLLAR, FACE, BELT] {
            let material = materials.get_material(id).unwrap();
            assert_eq!(material.blend, BlendMode::Opaque, "{}", id);
        }
        let visor = materials.get_material(VISOR).unwrap();
        assert_eq!(visor.blend, BlendMode::Alpha);
        assert!((visor.opacity - 0.8).abs() < 1e-6);
    }
}
