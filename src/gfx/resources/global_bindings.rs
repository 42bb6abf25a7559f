//! Global uniform bindings for camera, lights and frame settings
//!
//! Manages the GPU uniform buffer and bind group shared by every draw in a
//! frame: camera matrices, the full studio light set, fog, tone mapping and
//! the key light's shadow map.

use cgmath::{perspective, EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3};

use crate::{
    config::{SceneConfig, ToneMapping},
    fabric::Rgb8,
    gfx::{
        camera::{camera_utils::CameraUniform, orbit_camera::OPENGL_TO_WGPU_MATRIX},
        resources::texture_resource::TextureResource,
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Number of spot lights the shader evaluates
pub const MAX_SPOT_LIGHTS: usize = 2;
/// Number of point lights the shader evaluates
pub const MAX_POINT_LIGHTS: usize = 2;

const SHADOW_NEAR: f32 = 0.5;
const SHADOW_FAR: f32 = 80.0;

/// Uniform flat light added to every lit surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Rgb8,
    pub intensity: f32,
}

/// Sky/ground gradient light blended by the surface normal's Y
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphereLight {
    pub sky: Rgb8,
    pub ground: Rgb8,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub color: Rgb8,
    pub intensity: f32,
    pub position: Point3<f32>,
    /// World matrix of the aim target; the cone points at its origin
    pub target_world: Matrix4<f32>,
    /// Half-angle of the outer cone in radians
    pub angle: f32,
    /// Fraction of the cone over which the edge fades, 0..1
    pub penumbra: f32,
    pub cast_shadow: bool,
}

impl SpotLight {
    /// Target matrix placing the aim at `point`
    pub fn target_at(point: Point3<f32>) -> Matrix4<f32> {
        Matrix4::from_translation(point.to_vec())
    }

    /// Where the cone currently points, read from the target's world matrix
    pub fn target(&self) -> Point3<f32> {
        Point3::from_vec(self.target_world.w.truncate())
    }

    pub fn direction(&self) -> Vector3<f32> {
        let d = self.target() - self.position;
        if d.magnitude2() > f32::EPSILON {
            d.normalize()
        } else {
            -Vector3::unit_y()
        }
    }

    /// Cosines of the inner and outer cone edges
    pub fn cone_cosines(&self) -> (f32, f32) {
        let outer = self.angle.cos();
        let inner = (self.angle * (1.0 - self.penumbra.clamp(0.0, 1.0))).cos();
        (inner, outer)
    }

    /// Perspective view-projection covering the cone, for shadow rendering
    pub fn shadow_view_proj(&self) -> Matrix4<f32> {
        let direction = self.direction();
        let up = if direction.y.abs() > 0.99 {
            Vector3::unit_z()
        } else {
            Vector3::unit_y()
        };
        let view = Matrix4::look_at_rh(self.position, self.position + direction, up);
        let proj = perspective(Rad(self.angle * 2.0), 1.0, SHADOW_NEAR, SHADOW_FAR);
        OPENGL_TO_WGPU_MATRIX * proj * view
    }

    fn uniform(&self) -> SpotLightUniform {
        let (inner, outer) = self.cone_cosines();
        let d = self.direction();
        SpotLightUniform {
            position: [
                self.position.x,
                self.position.y,
                self.position.z,
                if self.cast_shadow { 1.0 } else { 0.0 },
            ],
            direction: [d.x, d.y, d.z, outer],
            color: radiance(self.color, self.intensity, inner),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Rgb8,
    pub intensity: f32,
    pub position: Point3<f32>,
}

/// Rectangular emitter, one-sided, facing along `normal`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaLight {
    pub color: Rgb8,
    pub intensity: f32,
    pub width: f32,
    pub height: f32,
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub right: Vector3<f32>,
    pub up: Vector3<f32>,
}

/// Every light in the studio, as sampled for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLights {
    pub ambient: AmbientLight,
    pub hemisphere: HemisphereLight,
    /// Only the first spot with `cast_shadow` gets a shadow map
    pub spots: [SpotLight; MAX_SPOT_LIGHTS],
    pub area: AreaLight,
    pub points: [PointLight; MAX_POINT_LIGHTS],
}

impl SceneLights {
    /// The light whose depth is rendered into the shadow map, if any
    pub fn shadow_caster(&self) -> Option<&SpotLight> {
        self.spots.iter().find(|spot| spot.cast_shadow)
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpotLightUniform {
    /// xyz position, w = casts shadow
    pub position: [f32; 4],
    /// xyz unit direction, w = cos(outer angle)
    pub direction: [f32; 4],
    /// rgb * intensity, w = cos(inner angle)
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct AreaLightUniform {
    pub position: [f32; 4],
    pub normal: [f32; 4],
    /// xyz unit right, w = half width
    pub right: [f32; 4],
    /// xyz unit up, w = half height
    pub up: [f32; 4],
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightUniform {
    pub position: [f32; 4],
    pub color: [f32; 4],
}

/// Global uniform buffer content structure
///
/// MUST match the `Globals` struct in the shaders exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub view_position: [f32; 4],
    /// Linear fog color, w unused
    pub fog_color: [f32; 4],
    /// near, far, exposure, encode sRGB in shader
    pub fog_params: [f32; 4],
    /// tone mapping operator, shadow bias, shadow texel size, unused
    pub render_params: [f32; 4],
    pub ambient: [f32; 4],
    pub hemi_sky: [f32; 4],
    pub hemi_ground: [f32; 4],
    pub spots: [SpotLightUniform; MAX_SPOT_LIGHTS],
    pub area: AreaLightUniform,
    pub points: [PointLightUniform; MAX_POINT_LIGHTS],
}

fn radiance(color: Rgb8, intensity: f32, w: f32) -> [f32; 4] {
    let [r, g, b] = color.to_linear();
    [r * intensity, g * intensity, b * intensity, w]
}

fn vec4(v: Vector3<f32>, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

impl GlobalUBOContent {
    /// Packs one frame's camera, lights and presentation settings
    ///
    /// `shadow_map_size` is the edge length of the shadow map actually
    /// allocated, which may be smaller than the configured size.
    pub fn new(
        camera: &CameraUniform,
        lights: &SceneLights,
        config: &SceneConfig,
        shadow_map_size: u32,
        encode_srgb: bool,
    ) -> Self {
        let light_view_proj = lights
            .shadow_caster()
            .map(|spot| spot.shadow_view_proj().into())
            .unwrap_or(camera.view_proj);
        let shadow_texel = 1.0 / shadow_map_size.max(1) as f32;
        let area = &lights.area;

        Self {
            view_proj: camera.view_proj,
            light_view_proj,
            view_position: camera.view_position,
            fog_color: config.fog.color.to_linear_rgba(1.0),
            fog_params: [
                config.fog.near,
                config.fog.far,
                config.exposure,
                if encode_srgb { 1.0 } else { 0.0 },
            ],
            render_params: [
                match config.tone_mapping {
                    ToneMapping::None => 0.0,
                    ToneMapping::AcesFilmic => 1.0,
                },
                0.0005,
                shadow_texel,
                0.0,
            ],
            ambient: radiance(lights.ambient.color, lights.ambient.intensity, 0.0),
            hemi_sky: radiance(lights.hemisphere.sky, lights.hemisphere.intensity, 0.0),
            hemi_ground: radiance(lights.hemisphere.ground, lights.hemisphere.intensity, 0.0),
            spots: lights.spots.map(|spot| spot.uniform()),
            area: AreaLightUniform {
                position: [area.position.x, area.position.y, area.position.z, 1.0],
                normal: vec4(area.normal, 0.0),
                right: vec4(area.right, area.width * 0.5),
                up: vec4(area.up, area.height * 0.5),
                color: radiance(area.color, area.intensity, 0.0),
            },
            points: lights.points.map(|point| PointLightUniform {
                position: [point.position.x, point.position.y, point.position.z, 1.0],
                color: radiance(point.color, point.intensity, 0.0),
            }),
        }
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Manages bind group layouts and bind groups for global uniforms
///
/// Bound to slot 0 in the lit pipelines: the uniform buffer plus the shadow
/// map and its comparison sampler. The shadow pass gets its own group with
/// only the uniform, since it renders into the shadow map.
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    shadow_pass_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
    shadow_pass_bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .next_binding_fragment(binding_types::depth_texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Comparison))
            .create(device, "Globals Bind Group Layout");

        let shadow_pass_layout = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .create(device, "Shadow Pass Globals Layout");

        GlobalBindings {
            bind_group_layout,
            shadow_pass_layout,
            bind_group: None,
            shadow_pass_bind_group: None,
        }
    }

    pub fn create_bind_group(&mut self, device: &wgpu::Device, ubo: &GlobalUBO, shadow_map: &TextureResource) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .texture(&shadow_map.view)
                .sampler(&shadow_map.sampler)
                .create(device, "Global Bind Group"),
        );
        self.shadow_pass_bind_group = Some(
            BindGroupBuilder::new(&self.shadow_pass_layout)
                .resource(ubo.binding_resource())
                .create(device, "Shadow Pass Global Bind Group"),
        );
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn shadow_pass_layout(&self) -> &wgpu::BindGroupLayout {
        &self.shadow_pass_layout.layout
    }

    /// `None` until [`GlobalBindings::create_bind_group`] has run
    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }

    pub fn shadow_pass_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.shadow_pass_bind_group.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Transform;

    fn key_spot() -> SpotLight {
        SpotLight {
            color: Rgb8::hex(0xf5f5f0),
            intensity: 6.0,
            position: Point3::new(10.0, 14.0, 16.0),
            target_world: SpotLight::target_at(Point3::new(0.0, 2.5, 2.0)),
            angle: std::f32::consts::PI / 6.0,
            penumbra: 0.6,
            cast_shadow: true,
        }
    }

    #[test]
    fn test_globals_size_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<GlobalUBOContent>() % 16, 0);
        assert_eq!(std::mem::size_of::<SpotLightUniform>(), 48);
        assert_eq!(std::mem::size_of::<AreaLightUniform>(), 80);
    }

    #[test]
    fn test_cone_cosines() {
        let (inner, outer) = key_spot().cone_cosines();
        assert!((outer - (std::f32::consts::PI / 6.0).cos()).abs() < 1e-6);
        assert!(inner > outer);

        let hard = SpotLight { penumbra: 0.0, ..key_spot() };
        let (inner, outer) = hard.cone_cosines();
        assert_eq!(inner, outer);
    }

    #[test]
    fn test_shadow_texel_uses_allocated_map_size() {
        let lights = SceneLights {
            ambient: AmbientLight {
                color: Rgb8::WHITE,
                intensity: 0.4,
            },
            hemisphere: HemisphereLight {
                sky: Rgb8::WHITE,
                ground: Rgb8::WHITE,
                intensity: 0.5,
            },
            spots: [key_spot(), SpotLight { cast_shadow: false, ..key_spot() }],
            area: AreaLight {
                color: Rgb8::WHITE,
                intensity: 1.0,
                width: 2.0,
                height: 1.0,
                position: Point3::new(0.0, 9.0, -22.0),
                normal: Vector3::unit_z(),
                right: Vector3::unit_x(),
                up: Vector3::unit_y(),
            },
            points: [PointLight {
                color: Rgb8::WHITE,
                intensity: 1.0,
                position: Point3::new(0.0, 5.0, 0.0),
            }; MAX_POINT_LIGHTS],
        };
        let config = SceneConfig {
            shadow_map_size: 8192,
            ..SceneConfig::default()
        };

        let content = GlobalUBOContent::new(&CameraUniform::default(), &lights, &config, 2048, false);
        assert_eq!(content.render_params[2], 1.0 / 2048.0);
        assert_eq!(content.light_view_proj, Into::<[[f32; 4]; 4]>::into(key_spot().shadow_view_proj()));
    }

    #[test]
    fn test_shadow_projection_centers_target() {
        let spot = key_spot();
        let clip = spot.shadow_view_proj().transform_point(spot.target());
        assert!(clip.x.abs() < 1e-4);
        assert!(clip.y.abs() < 1e-4);
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }
}
