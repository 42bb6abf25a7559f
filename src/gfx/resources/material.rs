//! Material system for PBR rendering
//!
//! Provides material definitions and centralized management with GPU resource handling.
//! Materials are stored in MaterialManager and objects reference them by ID.
//! Fabric textures are uploaded once per palette and shared by every material
//! that names that palette.

use std::collections::HashMap;
use wgpu::Device;

use crate::fabric::{FabricCache, FabricTexture, Palette, Rgb8, SamplerSettings};
use crate::gfx::resources::texture_resource::TextureResource;
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// Material ID for referencing materials
pub type MaterialId = String;

/// How a material's fragments combine with what is already in the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    Opaque,
    /// Straight-alpha "over" blending, drawn after opaque geometry
    Alpha,
    /// Added to the target without writing depth (glows)
    Additive,
}

/// GPU uniform data for materials
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    /// Linear RGB and opacity
    pub base_color: [f32; 4],
    /// Linear RGB already scaled by intensity
    pub emissive: [f32; 4],
    /// metallic, roughness, environment intensity, unlit flag
    pub params: [f32; 4],
    /// uv repeat (u, v), texture flag, unused
    pub texture: [f32; 4],
}

type MaterialUBO = UniformBuffer<MaterialUniform>;

struct MaterialGpu {
    ubo: MaterialUBO,
    bind_group: wgpu::BindGroup,
    bound_texture: Option<Palette>,
}

/// Material definition with PBR properties
///
/// Contains material properties and GPU resources. Materials are stored
/// centrally in MaterialManager and shared between objects.
pub struct Material {
    pub name: String,
    pub base_color: Rgb8,
    pub opacity: f32,
    pub metallic: f32,
    pub roughness: f32,
    /// Scales the hemisphere contribution to specular reflections
    pub env_intensity: f32,
    pub emissive: Rgb8,
    pub emissive_intensity: f32,
    /// Fabric texture multiplied into the base color
    pub fabric: Option<Palette>,
    pub uv_repeat: [f32; 2],
    pub blend: BlendMode,
    /// Skip lighting entirely and output the base color
    pub unlit: bool,

    gpu: Option<MaterialGpu>,
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default", Rgb8::new(204, 204, 204))
    }
}

impl Material {
    /// Creates an opaque dielectric material with roughness 1
    pub fn new(name: &str, base_color: Rgb8) -> Self {
        Self {
            name: name.to_string(),
            base_color,
            opacity: 1.0,
            metallic: 0.0,
            roughness: 1.0,
            env_intensity: 1.0,
            emissive: Rgb8::new(0, 0, 0),
            emissive_intensity: 1.0,
            fabric: None,
            uv_repeat: [1.0, 1.0],
            blend: BlendMode::Opaque,
            unlit: false,
            gpu: None,
        }
    }

    /// Builder pattern: Set metallic factor
    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic.clamp(0.0, 1.0);
        self
    }

    /// Builder pattern: Set roughness factor
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    pub fn with_env_intensity(mut self, intensity: f32) -> Self {
        self.env_intensity = intensity.max(0.0);
        self
    }

    /// Builder pattern: Set emissive color and strength
    pub fn with_emission(mut self, color: Rgb8, intensity: f32) -> Self {
        self.emissive = color;
        self.emissive_intensity = intensity.max(0.0);
        self
    }

    /// Multiplies a synthesized fabric into the base color, tiled per the
    /// fabric's sampler settings
    pub fn with_fabric(mut self, palette: Palette) -> Self {
        self.fabric = Some(palette);
        self.uv_repeat = SamplerSettings::fabric().repeat;
        self
    }

    /// Opacity below one switches the material to alpha blending
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        if self.opacity < 1.0 && self.blend == BlendMode::Opaque {
            self.blend = BlendMode::Alpha;
        }
        self
    }

    pub fn additive(mut self) -> Self {
        self.blend = BlendMode::Additive;
        self
    }

    pub fn unlit(mut self) -> Self {
        self.unlit = true;
        self
    }

    /// Shader-side view of this material
    pub fn uniform(&self) -> MaterialUniform {
        let [r, g, b] = self.base_color.to_linear();
        let [er, eg, eb] = self.emissive.to_linear();
        let k = self.emissive_intensity;
        MaterialUniform {
            base_color: [r, g, b, self.opacity],
            emissive: [er * k, eg * k, eb * k, 0.0],
            params: [
                self.metallic,
                self.roughness,
                self.env_intensity,
                if self.unlit { 1.0 } else { 0.0 },
            ],
            texture: [
                self.uv_repeat[0],
                self.uv_repeat[1],
                if self.fabric.is_some() { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }

    /// Updates GPU resources for this material
    ///
    /// The bind group is rebuilt only when the bound texture changes.
    fn update_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
        texture: &TextureResource,
        bound: Option<Palette>,
    ) {
        let needs_bind_group = match &self.gpu {
            Some(gpu) => gpu.bound_texture != bound,
            None => true,
        };

        if needs_bind_group {
            let ubo = MaterialUBO::new_with_data(device, &self.uniform());
            let bind_group = BindGroupBuilder::new(layout)
                .resource(ubo.binding_resource())
                .texture(&texture.view)
                .sampler(&texture.sampler)
                .create(device, &format!("Material Bind Group: {}", self.name));
            self.gpu = Some(MaterialGpu {
                ubo,
                bind_group,
                bound_texture: bound,
            });
        }

        let uniform = self.uniform();
        if let Some(gpu) = &mut self.gpu {
            gpu.ubo.update_content(queue, uniform);
        }
    }

    /// Gets the bind group for rendering
    pub fn get_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.as_ref().map(|gpu| &gpu.bind_group)
    }

    pub fn has_gpu_resources(&self) -> bool {
        self.gpu.is_some()
    }
}

/// Manages all materials in the engine
///
/// Centralized storage for all materials. Objects reference materials by ID
/// rather than storing material data directly, enabling efficient sharing
/// of GPU resources between objects.
pub struct MaterialManager {
    materials: HashMap<MaterialId, Material>,
    default_material: Material,
    layout: Option<BindGroupLayoutWithDesc>,
    textures: HashMap<Palette, TextureResource>,
    white: Option<TextureResource>,
}

impl MaterialManager {
    /// Creates a new material manager with a default material
    pub fn new() -> Self {
        Self {
            materials: HashMap::new(),
            default_material: Material::default(),
            layout: None,
            textures: HashMap::new(),
            white: None,
        }
    }

    /// Adds a material, replacing any previous material with the same name
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        let id = material.name.clone();
        self.materials.insert(id.clone(), material);
        id
    }

    pub fn get_material(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn get_material_mut(&mut self, id: &str) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    /// Gets material for an object with fallback to default
    pub fn get_material_for_object(&self, material_id: Option<&str>) -> &Material {
        material_id
            .and_then(|id| self.get_material(id))
            .unwrap_or(&self.default_material)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Palettes referenced by at least one material
    pub fn required_fabrics(&self) -> Vec<Palette> {
        let mut palettes: Vec<Palette> = Vec::new();
        for palette in self.materials.values().filter_map(|m| m.fabric) {
            if !palettes.contains(&palette) {
                palettes.push(palette);
            }
        }
        palettes
    }

    /// Uploads missing textures and syncs every material to the GPU
    ///
    /// Fabric palettes not present in `fabrics` fall back to a white texture
    /// so the material still renders with its base color.
    pub fn update_all_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        fabrics: &FabricCache,
        max_anisotropy: u16,
    ) {
        let layout = self.layout.get_or_insert_with(|| {
            BindGroupLayoutBuilder::new()
                .next_binding_fragment(binding_types::uniform())
                .next_binding_fragment(binding_types::texture_2d())
                .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
                .create(device, "Material Bind Group Layout")
        });
        let white = self.white.get_or_insert_with(|| {
            TextureResource::from_fabric(device, queue, &FabricTexture::placeholder(), 1, "White Texture")
        });

        for (palette, fabric) in fabrics.iter() {
            if !self.textures.contains_key(palette) {
                let texture = TextureResource::from_fabric(device, queue, fabric, max_anisotropy, "Fabric Texture");
                self.textures.insert(*palette, texture);
            }
        }

        let materials = self.materials.values_mut().chain(std::iter::once(&mut self.default_material));
        for material in materials {
            let (texture, bound) = match material.fabric {
                Some(palette) => match self.textures.get(&palette) {
                    Some(texture) => (texture, Some(palette)),
                    None => {
                        log::warn!("Material '{}' names a fabric that was never synthesized", material.name);
                        (&*white, None)
                    }
                },
                None => (&*white, None),
            };
            material.update_gpu_resources(device, queue, layout, texture, bound);
        }
    }

    /// Gets material bind group layout for pipeline creation
    pub fn get_bind_group_layout(&self) -> Option<&wgpu::BindGroupLayout> {
        self.layout.as_ref().map(|l| &l.layout)
    }

    /// Drops every GPU resource; CPU-side definitions are kept
    pub fn release_gpu_resources(&mut self) {
        for material in self.materials.values_mut() {
            material.gpu = None;
        }
        self.default_material.gpu = None;
        self.textures.clear();
        self.white = None;
        self.layout = None;
    }
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opacity_switches_to_alpha_blending() {
        let visor = Material::new("visor", Rgb8::hex(0x243044)).with_opacity(0.8);
        assert_eq!(visor.blend, BlendMode::Alpha);

        let glow = Material::new("glow", Rgb8::hex(0x5162ff)).additive().with_opacity(0.15);
        assert_eq!(glow.blend, BlendMode::Additive);
    }

    #[test]
    fn test_uniform_packs_linear_color_and_flags() {
        let jacket = Material::new("jacket", Rgb8::WHITE)
            .with_fabric(Palette::JACKET)
            .with_roughness(0.45)
            .with_metallic(0.25)
            .with_env_intensity(0.8);
        let u = jacket.uniform();
        for channel in u.base_color {
            assert!((channel - 1.0).abs() < 1e-6);
        }
        assert_eq!(u.params, [0.25, 0.45, 0.8, 0.0]);
        assert_eq!(u.texture, [1.6, 1.9, 1.0, 0.0]);

        let backdrop = Material::new("backdrop", Rgb8::hex(0x14141c)).with_emission(Rgb8::WHITE, 0.6);
        let emissive = backdrop.uniform().emissive;
        assert!((emissive[0] - 0.6).abs() < 1e-6);
        assert_eq!(emissive[3], 0.0);
        assert_eq!(backdrop.uniform().texture[2], 0.0);
    }

    #[test]
    fn test_missing_material_falls_back_to_default() {
        let mut manager = MaterialManager::new();
        let id = manager.add_material(Material::new("belt", Rgb8::hex(0x101721)));
        assert_eq!(manager.get_material_for_object(Some(&id)).name, "belt");
        assert_eq!(manager.get_material_for_object(Some("ghost")).name, "default");
        assert_eq!(manager.get_material_for_object(None).name, "default");
    }

    #[test]
    fn test_required_fabrics_are_deduplicated() {
        let mut manager = MaterialManager::new();
        manager.add_material(Material::new("jacket", Rgb8::WHITE).with_fabric(Palette::JACKET));
        manager.add_material(Material::new("hood", Rgb8::WHITE).with_fabric(Palette::JACKET));
        manager.add_material(Material::new("trousers", Rgb8::WHITE).with_fabric(Palette::TROUSERS));
        manager.add_material(Material::new("zipper", Rgb8::hex(0xd9e1f2)));

        let fabrics = manager.required_fabrics();
        assert_eq!(fabrics.len(), 2);
        assert!(fabrics.contains(&Palette::JACKET));
        assert!(fabrics.contains(&Palette::TROUSERS));
    }
}
