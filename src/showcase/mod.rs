//! # Runway Showcase
//!
//! The mounted scene: stage, lighting rig and the walking garment figure,
//! plus the geometry and fabric caches they were built from.
//!
//! [`Showcase::mount`] is pure CPU work. Geometry, materials and fabric
//! textures are created exactly once here; the GPU copy is made by
//! [`RenderEngine::upload_showcase`](crate::gfx::rendering::RenderEngine::upload_showcase).
//! Each frame the clock is read once and the lighting and figure updates run
//! against it independently.
//!
//! ```rust
//! use runway::fabric::FabricCache;
//! use runway::showcase::Showcase;
//!
//! let mut showcase = Showcase::mount_with_fabrics(1.5, FabricCache::with_resolution(16));
//! showcase.advance_to(2.0);
//! assert_eq!(showcase.elapsed(), 2.0);
//! ```

pub mod figure;
pub mod garments;
pub mod lighting;
pub mod stage;

pub use figure::Figure;
pub use lighting::LightingRig;
pub use stage::Stage;

use std::f32::consts::PI;

use crate::{
    clock::Clock,
    fabric::FabricCache,
    gfx::{
        camera::{CameraController, CameraManager, OrbitCamera},
        geometry::{
            generate_box, generate_cylinder, generate_extrusion, generate_lathe, generate_partial_sphere,
            generate_plane, generate_ring, generate_sphere, generate_torus, ExtrudeSettings, GeometryData,
            GeometryLibrary,
        },
        scene::{NodeId, Object, Scene, Transform},
    },
};

/// Left or right half of the figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// +1 for the left side, -1 for the right
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Every distinct mesh in the showcase
///
/// Each key maps to one fixed builder call, so keys compare equal exactly when
/// their builder parameters do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKey {
    Torso,
    Hood,
    ZipperStrip,
    PocketFlap,
    Sleeve,
    Cuff,
    UpperLeg,
    LowerLeg,
    Boot,
    Collar,
    Face,
    Visor,
    Belt,
    RunwayFloor,
    Platform,
    Backdrop,
    SideWall,
    GlowRing,
}

/// Torso silhouette, revolved around Y
pub const TORSO_PROFILE: [[f32; 2]; 11] = [
    [0.0, -1.8],
    [0.55, -1.8],
    [0.7, -1.4],
    [0.78, -1.0],
    [0.8, -0.4],
    [0.78, 0.1],
    [0.75, 0.7],
    [0.68, 1.25],
    [0.55, 1.65],
    [0.32, 1.95],
    [0.15, 2.05],
];

/// Boot side outline, extruded along Z
pub const BOOT_OUTLINE: [[f32; 2]; 5] = [[-0.38, -0.22], [0.52, -0.22], [0.66, 0.12], [0.4, 0.32], [-0.28, 0.32]];

impl GeometryKey {
    pub fn build(self) -> GeometryData {
        match self {
            GeometryKey::Torso => generate_lathe(&TORSO_PROFILE, 160, 0.0, 2.0 * PI),
            GeometryKey::Hood => generate_partial_sphere(0.9, 96, 64, 0.0, 2.0 * PI, 0.0, PI / 1.3),
            GeometryKey::ZipperStrip => generate_box(0.05, 3.4, 0.06),
            GeometryKey::PocketFlap => generate_box(0.7, 0.18, 0.05),
            GeometryKey::Sleeve => generate_cylinder(0.43, 0.52, 2.2, 88, 32, true),
            GeometryKey::Cuff => generate_torus(0.43, 0.05, 32, 64),
            GeometryKey::UpperLeg => generate_cylinder(0.42, 0.5, 1.6, 88, 32, true),
            GeometryKey::LowerLeg => generate_cylinder(0.35, 0.4, 1.4, 88, 32, true),
            GeometryKey::Boot => generate_extrusion(
                &BOOT_OUTLINE,
                &ExtrudeSettings {
                    steps: 4,
                    depth: 0.58,
                    bevel_enabled: true,
                    bevel_thickness: 0.1,
                    bevel_size: 0.07,
                    bevel_segments: 6,
                },
            ),
            GeometryKey::Collar => generate_torus(0.6, 0.08, 48, 96),
            GeometryKey::Face => generate_sphere(0.32, 64, 64),
            GeometryKey::Visor => generate_cylinder(0.34, 0.34, 0.06, 48, 1, true),
            GeometryKey::Belt => generate_torus(0.58, 0.04, 32, 96),
            GeometryKey::RunwayFloor => generate_plane(14.0, 160.0, 64, 64),
            GeometryKey::Platform => generate_box(20.0, 0.5, 160.0),
            GeometryKey::Backdrop => generate_plane(18.0, 10.0, 1, 1),
            GeometryKey::SideWall => generate_box(1.2, 5.0, 160.0),
            GeometryKey::GlowRing => generate_ring(6.0, 5.4, 64),
        }
    }
}

/// Adds nodes and meshes to a scene, pulling geometry from the library
pub struct SceneBuilder<'a> {
    pub scene: &'a mut Scene,
    pub geometries: &'a mut GeometryLibrary<GeometryKey>,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(scene: &'a mut Scene, geometries: &'a mut GeometryLibrary<GeometryKey>) -> Self {
        Self { scene, geometries }
    }

    /// An empty transform node
    pub fn group(&mut self, parent: Option<NodeId>, name: &str, transform: Transform) -> NodeId {
        self.scene.nodes.insert(name, parent, transform)
    }

    /// A mesh on its own mount node under `parent`
    ///
    /// `shadows` is (cast, receive).
    pub fn mesh(
        &mut self,
        parent: NodeId,
        name: &str,
        key: GeometryKey,
        transform: Transform,
        material: &str,
        shadows: (bool, bool),
    ) -> NodeId {
        let node = self.scene.nodes.insert(name, Some(parent), transform);
        let geometry = self.geometries.get_or_build(key, || key.build());
        self.scene.add_object(
            Object::new(name, node, geometry)
                .with_material(material)
                .with_shadows(shadows.0, shadows.1),
        );
        node
    }
}

/// The complete mounted scene
pub struct Showcase {
    pub scene: Scene,
    pub geometries: GeometryLibrary<GeometryKey>,
    pub fabrics: FabricCache,
    pub lighting: LightingRig,
    pub stage: Stage,
    pub figure: Figure,
    clock: Clock,
}

impl Showcase {
    /// Builds the whole scene at full fabric resolution
    pub fn mount(aspect: f32) -> Self {
        Self::mount_with_fabrics(aspect, FabricCache::new())
    }

    /// Builds the scene, synthesizing fabrics into `fabrics`
    pub fn mount_with_fabrics(aspect: f32, mut fabrics: FabricCache) -> Self {
        let lighting = LightingRig::new();
        let camera = CameraManager::new(OrbitCamera::runway(aspect), CameraController::default());
        let mut scene = Scene::new(camera, *lighting.lights());
        let mut geometries = GeometryLibrary::new();

        stage::register_materials(&mut scene.material_manager);
        garments::register_materials(&mut scene.material_manager);

        let (stage, figure) = {
            let mut builder = SceneBuilder::new(&mut scene, &mut geometries);
            (Stage::build(&mut builder), Figure::build(&mut builder))
        };

        for palette in scene.material_manager.required_fabrics() {
            fabrics.get_or_synthesize(palette);
        }

        let mut showcase = Self {
            scene,
            geometries,
            fabrics,
            lighting,
            stage,
            figure,
            clock: Clock::start(),
        };
        showcase.animate(0.0);

        let stats = showcase.scene.get_statistics();
        log::info!(
            "Mounted showcase: {} nodes, {} objects, {} geometries, {} fabrics",
            stats.node_count,
            stats.object_count,
            showcase.geometries.build_count(),
            showcase.fabrics.synthesis_count()
        );
        showcase
    }

    /// Reads the clock and brings every animated node and light up to date
    ///
    /// Returns the elapsed time used for this frame.
    pub fn update(&mut self) -> f64 {
        let t = self.clock.tick();
        self.animate(t);
        t
    }

    /// Moves the clock to `t` and animates to it
    pub fn advance_to(&mut self, t: f64) {
        self.clock.advance_to(t);
        self.animate(self.clock.elapsed());
    }

    fn animate(&mut self, t: f64) {
        self.lighting.update(t);
        self.figure.update(&mut self.scene.nodes, t);
        self.scene.nodes.update_world_matrices();
        self.scene.lights = *self.lighting.lights();
        self.scene.camera_manager.update();
    }

    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed()
    }

    /// Updates the camera projection for a new surface size
    pub fn resize(&mut self, width: u32, height: u32) {
        self.scene.camera_manager.camera.resize_projection(width, height);
    }

    pub(crate) fn gpu_parts(&mut self) -> (&mut Scene, &FabricCache) {
        (&mut self.scene, &self.fabrics)
    }

    /// Releases every GPU resource and drops the scene
    pub fn unmount(mut self) {
        self.scene.release_gpu_resources();
        log::info!("Unmounted showcase after {:.2}s", self.clock.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn mount() -> Showcase {
        Showcase::mount_with_fabrics(1.5, FabricCache::with_resolution(16))
    }

    fn geometry_of(showcase: &Showcase, name: &str) -> Arc<GeometryData> {
        showcase
            .scene
            .find_object(name)
            .map(|object| object.geometry.clone())
            .unwrap_or_else(|| panic!("missing object {}", name))
    }

    #[test]
    fn test_mount_builds_each_geometry_once() {
        let showcase = mount();
        let distinct = showcase.scene.get_statistics().unique_geometries;
        assert_eq!(showcase.geometries.build_count(), distinct);
        assert_eq!(showcase.geometries.len(), 18);
        assert_eq!(showcase.fabrics.synthesis_count(), 2);
    }

    #[test]
    fn test_mirrored_parts_share_geometry() {
        let showcase = mount();
        for part in ["sleeve", "cuff", "upper_leg", "lower_leg", "boot"] {
            let left = geometry_of(&showcase, &format!("{}.left", part));
            let right = geometry_of(&showcase, &format!("{}.right", part));
            assert!(Arc::ptr_eq(&left, &right), "{} not shared", part);
        }
        let pocket_left = geometry_of(&showcase, "pocket_flap.left");
        let pocket_right = geometry_of(&showcase, "pocket_flap.right");
        assert!(Arc::ptr_eq(&pocket_left, &pocket_right));
    }

    #[test]
    fn test_frames_do_not_rebuild_resources() {
        let mut showcase = mount();
        let builds = showcase.geometries.build_count();
        for frame in 0..120 {
            showcase.advance_to(frame as f64 / 60.0);
        }
        assert_eq!(showcase.geometries.build_count(), builds);
        assert_eq!(showcase.fabrics.synthesis_count(), 2);
    }

    #[test]
    fn test_remount_starts_fresh() {
        let mut first = mount();
        first.advance_to(7.5);
        let old_sleeve = geometry_of(&first, "sleeve.left");
        let old_fabric = first.fabrics.iter().map(|(_, f)| f.clone()).next();
        first.unmount();

        let second = mount();
        assert_eq!(second.elapsed(), 0.0);
        let new_sleeve = geometry_of(&second, "sleeve.left");
        assert!(!Arc::ptr_eq(&old_sleeve, &new_sleeve));
        let new_fabric = second.fabrics.iter().map(|(_, f)| f.clone()).next();
        if let (Some(old), Some(new)) = (old_fabric, new_fabric) {
            assert!(!Arc::ptr_eq(&old, &new));
        }
    }

    #[test]
    fn test_scene_lights_follow_rig() {
        let mut showcase = mount();
        showcase.advance_to(3.0);
        assert_eq!(showcase.scene.lights, *showcase.lighting.lights());
        assert_eq!(showcase.scene.lights.spots[0].target(), lighting::key_target(3.0));
    }

    #[test]
    fn test_geometry_keys_build_valid_meshes() {
        for key in [GeometryKey::Boot, GeometryKey::Hood, GeometryKey::GlowRing, GeometryKey::Visor] {
            let mesh = key.build();
            assert!(mesh.triangle_count() > 0, "{:?} is empty", key);
            assert_eq!(mesh.indices.len() % 3, 0);
        }
    }
}
