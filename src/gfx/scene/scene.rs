use std::collections::HashMap;
use std::sync::Arc;

use cgmath::{EuclideanSpace, MetricSpace, Point3, Vector3};
use wgpu::Device;

use crate::{
    fabric::FabricCache,
    gfx::{
        camera::camera_utils::CameraManager,
        resources::{
            global_bindings::SceneLights,
            material::{BlendMode, Material, MaterialManager},
        },
    },
    wgpu_utils::binding_builder::BindGroupLayoutWithDesc,
};

use super::{
    node::NodeTable,
    object::{GpuMesh, Object},
};

/// Everything the renderer needs for a frame: nodes, objects, materials,
/// lights and the camera
pub struct Scene {
    pub camera_manager: CameraManager,
    pub nodes: NodeTable,
    pub objects: Vec<Object>,
    pub material_manager: MaterialManager, // Centralized material storage
    pub lights: SceneLights,
}

impl Scene {
    pub fn new(camera_manager: CameraManager, lights: SceneLights) -> Self {
        Self {
            camera_manager,
            nodes: NodeTable::new(),
            objects: Vec::new(),
            material_manager: MaterialManager::new(),
            lights,
        }
    }

    /// Adds an object and returns its index
    pub fn add_object(&mut self, object: Object) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    /// Initializes GPU resources for all objects and materials
    ///
    /// Objects sharing one `GeometryData` share one set of vertex and index
    /// buffers.
    pub fn init_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        object_layout: &BindGroupLayoutWithDesc,
        fabrics: &FabricCache,
        max_anisotropy: u16,
    ) {
        let mut uploaded: HashMap<usize, Arc<GpuMesh>> = HashMap::new();
        for object in self.objects.iter_mut() {
            let key = Arc::as_ptr(&object.geometry) as usize;
            let mesh = uploaded
                .entry(key)
                .or_insert_with(|| Arc::new(GpuMesh::upload(device, &object.geometry, &object.name)))
                .clone();
            object.init_gpu_resources(device, object_layout, mesh);
        }
        log::debug!(
            "Uploaded {} meshes for {} objects",
            uploaded.len(),
            self.objects.len()
        );

        self.material_manager
            .update_all_gpu_resources(device, queue, fabrics, max_anisotropy);
        self.update_all_transforms(queue);
    }

    /// Writes every object's node world matrix to its GPU buffer
    pub fn update_all_transforms(&mut self, queue: &wgpu::Queue) {
        for object in &mut self.objects {
            if let Some(world) = self.nodes.world_matrix(object.node) {
                object.update_transform(queue, world);
            }
        }
    }

    /// Drops GPU buffers and bind groups; the CPU scene is kept
    pub fn release_gpu_resources(&mut self) {
        for object in &mut self.objects {
            object.gpu_resources = None;
        }
        self.material_manager.release_gpu_resources();
    }

    /// Gets material for rendering an object
    ///
    /// Returns the material assigned to the object, or the default material
    /// if no material is assigned or the assigned material doesn't exist.
    pub fn get_material_for_object(&self, object: &Object) -> &Material {
        self.material_manager
            .get_material_for_object(object.get_material_id())
    }

    /// Visible objects whose material uses `blend`
    pub fn objects_with_blend(&self, blend: BlendMode) -> impl Iterator<Item = &Object> {
        self.objects
            .iter()
            .filter(move |object| object.visible && self.get_material_for_object(object).blend == blend)
    }

    /// Objects to draw with `blend`, in draw order
    ///
    /// Alpha-blended objects are sorted back to front from `eye`; everything
    /// else keeps insertion order.
    pub fn objects_in_draw_order(&self, blend: BlendMode, eye: Vector3<f32>) -> Vec<&Object> {
        let mut objects: Vec<&Object> = self.objects_with_blend(blend).collect();
        if blend == BlendMode::Alpha {
            let eye = Point3::from_vec(eye);
            let distance = |object: &Object| {
                self.nodes
                    .world_position(object.node)
                    .map(|p| p.distance2(eye))
                    .unwrap_or(0.0)
            };
            objects.sort_by(|a, b| distance(b).total_cmp(&distance(a)));
        }
        objects
    }

    /// Visible objects that write into the shadow map
    pub fn shadow_casters(&self) -> impl Iterator<Item = &Object> {
        self.objects
            .iter()
            .filter(|object| object.visible && object.cast_shadow)
    }

    pub fn find_object(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|object| object.name == name)
    }

    /// Gets statistics about the scene
    pub fn get_statistics(&self) -> SceneStatistics {
        let mut unique: Vec<*const _> = self.objects.iter().map(|o| Arc::as_ptr(&o.geometry)).collect();
        unique.sort();
        unique.dedup();

        SceneStatistics {
            object_count: self.objects.len(),
            node_count: self.nodes.len(),
            material_count: self.material_manager.len(),
            unique_geometries: unique.len(),
            total_triangles: self.objects.iter().map(|o| o.geometry.triangle_count()).sum(),
            total_vertices: self.objects.iter().map(|o| o.geometry.vertex_count()).sum(),
        }
    }
}

/// Scene statistics for debugging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneStatistics {
    pub object_count: usize,
    pub node_count: usize,
    pub material_count: usize,
    pub unique_geometries: usize,
    pub total_triangles: usize,
    pub total_vertices: usize,
}
