use std::ops::Range;
use std::sync::Arc;

use cgmath::{Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;
use wgpu::Device;

use crate::gfx::geometry::GeometryData;
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutWithDesc},
    uniform_buffer::UniformBuffer,
};

use super::node::NodeId;

/// Vertex and index buffers for one piece of geometry
///
/// Shared between every object that references the same `GeometryData`.
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    pub fn upload(device: &Device, geometry: &GeometryData, label: &str) -> Self {
        let vertices = geometry.to_vertices();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: geometry.indices.len() as u32,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

/// Per-object uniform: world matrix plus shading flags
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    /// receive shadow, unused x3
    pub flags: [f32; 4],
}

type ObjectUBO = UniformBuffer<ObjectUniform>;

// GPU resources struct to hold the transform uniform and its bind group
pub struct ObjectGpuResources {
    transform_ubo: ObjectUBO,
    transform_bind_group: wgpu::BindGroup,
    mesh: Arc<GpuMesh>,
}

/// A mesh placed in the scene: geometry hung off a node, drawn with a material
pub struct Object {
    pub name: String,
    pub node: NodeId,
    pub geometry: Arc<GeometryData>,
    pub material_id: Option<String>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub visible: bool,
    pub gpu_resources: Option<ObjectGpuResources>, // None until init_gpu_resources called
}

impl Object {
    pub fn new(name: &str, node: NodeId, geometry: Arc<GeometryData>) -> Self {
        Self {
            name: name.to_string(),
            node,
            geometry,
            material_id: None,
            cast_shadow: false,
            receive_shadow: false,
            visible: true,
            gpu_resources: None,
        }
    }

    pub fn with_material(mut self, material_id: &str) -> Self {
        self.material_id = Some(material_id.to_string());
        self
    }

    /// Builder pattern: shadow casting and receiving
    pub fn with_shadows(mut self, cast: bool, receive: bool) -> Self {
        self.cast_shadow = cast;
        self.receive_shadow = receive;
        self
    }

    pub fn get_material_id(&self) -> Option<&str> {
        self.material_id.as_deref()
    }

    pub fn uniform(&self, world: Matrix4<f32>) -> ObjectUniform {
        ObjectUniform {
            model: world.into(),
            flags: [if self.receive_shadow { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }

    pub fn init_gpu_resources(&mut self, device: &Device, layout: &BindGroupLayoutWithDesc, mesh: Arc<GpuMesh>) {
        let transform_ubo = ObjectUBO::new_with_data(device, &self.uniform(Matrix4::identity()));
        let transform_bind_group = BindGroupBuilder::new(layout)
            .resource(transform_ubo.binding_resource())
            .create(device, &format!("Transform Bind Group: {}", self.name));

        self.gpu_resources = Some(ObjectGpuResources {
            transform_ubo,
            transform_bind_group,
            mesh,
        });
    }

    /// Syncs the world matrix to the GPU if resources exist
    pub fn update_transform(&mut self, queue: &wgpu::Queue, world: Matrix4<f32>) {
        let uniform = self.uniform(world);
        if let Some(gpu) = &mut self.gpu_resources {
            gpu.transform_ubo.update_content(queue, uniform);
        }
    }

    /// Get the transform bind group for rendering
    pub fn get_transform_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu_resources
            .as_ref()
            .map(|res| &res.transform_bind_group)
    }
}

pub trait DrawObject<'a> {
    fn draw_mesh(&mut self, mesh: &'a GpuMesh);
    fn draw_mesh_instanced(&mut self, mesh: &'a GpuMesh, instances: Range<u32>);
    /// Binds the object's transform at `transform_slot` and draws it
    fn draw_object(&mut self, object: &'a Object, transform_slot: u32);
}

impl<'a, 'b> DrawObject<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b GpuMesh) {
        self.draw_mesh_instanced(mesh, 0..1);
    }

    fn draw_mesh_instanced(&mut self, mesh: &'b GpuMesh, instances: Range<u32>) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, instances);
    }

    fn draw_object(&mut self, object: &'b Object, transform_slot: u32) {
        // Skip drawing if not uploaded
        let Some(gpu) = &object.gpu_resources else {
            return;
        };
        self.set_bind_group(transform_slot, &gpu.transform_bind_group, &[]);
        self.draw_mesh(&gpu.mesh);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_box;
    use crate::gfx::scene::node::{NodeTable, Transform};

    #[test]
    fn test_uniform_carries_world_matrix_and_flags() {
        let mut nodes = NodeTable::new();
        let node = nodes.insert("zipper", None, Transform::from_translation(0.0, 2.2, 0.76));
        let zipper = Object::new("zipper", node, Arc::new(generate_box(0.05, 3.4, 0.06)))
            .with_shadows(true, false);

        let u = zipper.uniform(nodes.world_matrix(node).unwrap());
        assert_eq!(u.model[3], [0.0, 2.2, 0.76, 1.0]);
        assert_eq!(u.flags[0], 0.0);

        let floor = Object::new("floor", node, Arc::new(generate_box(1.0, 1.0, 1.0))).with_shadows(false, true);
        assert_eq!(floor.uniform(Matrix4::identity()).flags[0], 1.0);
    }
}
