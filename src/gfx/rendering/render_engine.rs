//! WGPU-based rendering engine for the runway showcase
//!
//! Owns the surface, device and every frame-level GPU resource: depth buffer,
//! key-light shadow map, global uniforms and the four scene pipelines.

use std::sync::Arc;
use wgpu::{Device, TextureFormat};

use crate::{
    config::SceneConfig,
    error::{Result, RunwayError},
    fabric::FabricCache,
    gfx::{
        resources::{
            global_bindings::{GlobalBindings, GlobalUBO, GlobalUBOContent},
            material::BlendMode,
            texture_resource::TextureResource,
        },
        scene::{object::DrawObject, scene::Scene},
    },
    showcase::Showcase,
    wgpu_utils::{
        binding_builder::{BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
    },
};

use super::pipeline_manager::{DepthConfig, PipelineConfig, PipelineManager, ADDITIVE_BLENDING};

const SHADOW_PIPELINE: &str = "shadow";
const OPAQUE_PIPELINE: &str = "pbr_opaque";
const ALPHA_PIPELINE: &str = "pbr_alpha";
const ADDITIVE_PIPELINE: &str = "pbr_additive";

/// Core rendering engine managing GPU resources and draw calls
///
/// Each frame runs a depth-only shadow pass from the key spotlight, then one
/// main pass that draws opaque, alpha-blended and additive objects in that
/// order.
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    shadow_map: TextureResource,
    /// Edge length of `shadow_map` after clamping to the device limit
    shadow_size: u32,
    format: TextureFormat,
    /// Surface is not sRGB, so the shader encodes output itself
    encode_srgb: bool,
    max_anisotropy: u16,
    present_modes: Vec<wgpu::PresentMode>,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    object_layout: BindGroupLayoutWithDesc,
    scene_config: SceneConfig,
    clear_color: wgpu::Color,
    frame_index: u64,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// Picks an adapter compatible with the surface, prefers an sRGB surface
    /// format and builds the shadow map, depth buffer and global bindings.
    /// Scene pipelines are created on [`RenderEngine::upload_scene`], once the
    /// material layout exists.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        scene_config: &SceneConfig,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        let info = adapter.get_info();
        log::info!("Using adapter '{}' ({:?})", info.name, info.backend);

        let max_anisotropy = if adapter
            .get_downlevel_capabilities()
            .flags
            .contains(wgpu::DownlevelFlags::ANISOTROPIC_FILTERING)
        {
            16
        } else {
            log::info!("Anisotropic filtering unavailable, sampling fabrics with 1x");
            1
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: adapter.limits().max_texture_dimension_2d.min(4096),
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(RunwayError::NoSurfaceFormat)?;
        let encode_srgb = !format.is_srgb();
        if encode_srgb {
            log::info!("Surface format {:?} is not sRGB, encoding in shader", format);
        }

        let present_mode = choose_present_mode(scene_config.vsync, &surface_capabilities.present_modes);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode,
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let shadow_size = scene_config
            .shadow_map_size
            .clamp(1, device.limits().max_texture_dimension_2d);
        let shadow_map = TextureResource::create_shadow_map(&device, shadow_size);

        let global_ubo = GlobalUBO::new(&device);
        let mut global_bindings = GlobalBindings::new(&device);
        global_bindings.create_bind_group(&device, &global_ubo, &shadow_map);

        let object_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(&device, "Transform Bind Group Layout");

        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());
        pipeline_manager.load_shader("pbr", include_str!("pbr.wgsl"));
        pipeline_manager.load_shader("shadow", include_str!("shadow_pass.wgsl"));

        // Both faces go into the shadow map so open meshes (hood, sleeves) still cast
        pipeline_manager.register_pipeline(
            SHADOW_PIPELINE,
            PipelineConfig::default_with_shader("shadow")
                .with_label("Shadow")
                .with_vertex_only()
                .with_cull_mode(None)
                .with_depth(DepthConfig::new(TextureResource::DEPTH_FORMAT).with_bias(2, 2.0))
                .with_bind_group_layouts(vec![
                    global_bindings.shadow_pass_layout().clone(),
                    object_layout.layout.clone(),
                ]),
        );

        // Clear values skip the shader, so a non-sRGB target gets encoded channels
        let [r, g, b] = if encode_srgb {
            scene_config.background.channels().map(|c| c as f32 / 255.0)
        } else {
            scene_config.background.to_linear()
        };
        let clear_color = wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        };

        log::info!(
            "Render engine ready: {}x{} {:?}, {:?}, shadow map {}",
            config.width,
            config.height,
            format,
            present_mode,
            shadow_size
        );

        Ok(RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            depth_texture,
            shadow_map,
            shadow_size,
            format,
            encode_srgb,
            max_anisotropy,
            present_modes: surface_capabilities.present_modes.clone(),
            pipeline_manager,
            global_ubo,
            global_bindings,
            object_layout,
            scene_config: scene_config.clone(),
            clear_color,
            frame_index: 0,
        })
    }

    /// Uploads a mounted showcase: meshes, fabric textures and materials
    pub fn upload_showcase(&mut self, showcase: &mut Showcase) {
        let (scene, fabrics) = showcase.gpu_parts();
        self.upload_scene(scene, fabrics);
    }

    /// Uploads a scene and creates the lit pipelines for its material layout
    pub fn upload_scene(&mut self, scene: &mut Scene, fabrics: &FabricCache) {
        scene.init_gpu_resources(
            &self.device,
            &self.queue,
            &self.object_layout,
            fabrics,
            self.max_anisotropy,
        );

        let Some(material_layout) = scene.material_manager.get_bind_group_layout().cloned() else {
            log::error!("Material layout missing after upload, lit pipelines not created");
            return;
        };
        self.register_lit_pipelines(material_layout);

        if let Err(errors) = self.pipeline_manager.create_all_pipelines() {
            for error in errors {
                log::error!("{}", error);
            }
        }

        let stats = scene.get_statistics();
        let pipelines = self.pipeline_manager.get_stats();
        log::info!(
            "Uploaded scene: {} objects, {} unique meshes, {} triangles, {} materials, {} pipelines",
            stats.object_count,
            stats.unique_geometries,
            stats.total_triangles,
            stats.material_count,
            pipelines.total_pipelines
        );
    }

    fn register_lit_pipelines(&mut self, material_layout: wgpu::BindGroupLayout) {
        let layouts = vec![
            self.global_bindings.bind_group_layout().clone(),
            self.object_layout.layout.clone(),
            material_layout,
        ];
        let depth = DepthConfig::new(TextureResource::DEPTH_FORMAT);

        self.pipeline_manager.register_pipeline(
            OPAQUE_PIPELINE,
            PipelineConfig::default_with_shader("pbr")
                .with_label("PBR Opaque")
                .with_bind_group_layouts(layouts.clone())
                .with_depth(depth.clone())
                .with_color_target(self.format, wgpu::BlendState::REPLACE),
        );

        self.pipeline_manager.register_pipeline(
            ALPHA_PIPELINE,
            PipelineConfig::default_with_shader("pbr")
                .with_label("PBR Alpha")
                .with_bind_group_layouts(layouts.clone())
                .with_depth(depth.clone().read_only())
                .with_color_target(self.format, wgpu::BlendState::ALPHA_BLENDING),
        );

        self.pipeline_manager.register_pipeline(
            ADDITIVE_PIPELINE,
            PipelineConfig::default_with_shader("pbr")
                .with_label("PBR Additive")
                .with_cull_mode(None)
                .with_bind_group_layouts(layouts)
                .with_depth(depth.read_only())
                .with_color_target(self.format, ADDITIVE_BLENDING),
        );
    }

    /// Renders one frame of `scene`
    ///
    /// Lost or outdated surfaces are reconfigured and the frame is skipped.
    /// Timeouts skip the frame. Only unrecoverable surface errors are returned.
    pub fn render(&mut self, scene: &mut Scene) -> Result<()> {
        scene.update_all_transforms(&self.queue);
        let scene: &Scene = scene;

        let content = GlobalUBOContent::new(
            &scene.camera_manager.camera.uniform,
            &scene.lights,
            &self.scene_config,
            self.shadow_size,
            self.encode_srgb,
        );
        self.global_ubo.update_content(&self.queue, content);

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::debug!("Surface acquire timed out, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(RunwayError::SurfaceAcquire(e)),
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        // PASS 1: key light depth
        {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Depth Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let has_caster = scene.lights.shadow_caster().is_some();
            if let (true, Some(pipeline), Some(globals)) = (
                has_caster,
                self.pipeline_manager.pipeline(SHADOW_PIPELINE),
                self.global_bindings.shadow_pass_bind_group(),
            ) {
                shadow_pass.set_pipeline(pipeline);
                shadow_pass.set_bind_group(0, globals, &[]);
                let mut casters = 0;
                for object in scene.shadow_casters() {
                    shadow_pass.draw_object(object, 1);
                    casters += 1;
                }
                if self.scene_config.shadow_debug {
                    log::debug!("Shadow pass frame {}: {} casters", self.frame_index, casters);
                }
            }
        }

        // PASS 2: lit scene
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(globals) = self.global_bindings.bind_group() {
                render_pass.set_bind_group(0, globals, &[]);

                let eye = scene.camera_manager.camera.eye;
                let passes = [
                    (OPAQUE_PIPELINE, BlendMode::Opaque),
                    (ALPHA_PIPELINE, BlendMode::Alpha),
                    (ADDITIVE_PIPELINE, BlendMode::Additive),
                ];
                for (name, blend) in passes {
                    let Some(pipeline) = self.pipeline_manager.pipeline(name) else {
                        continue;
                    };
                    render_pass.set_pipeline(pipeline);

                    for object in scene.objects_in_draw_order(blend, eye) {
                        let material = scene.get_material_for_object(object);
                        if let Some(material_bind_group) = material.get_bind_group() {
                            render_pass.set_bind_group(2, material_bind_group, &[]);
                            render_pass.draw_object(object, 1);
                        } else {
                            log::trace!(
                                "Skipping '{}' - material '{}' has no GPU resources",
                                object.name,
                                material.name
                            );
                        }
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        self.frame_index += 1;
        Ok(())
    }

    /// Resizes the surface and recreates the depth buffer
    ///
    /// Zero-sized requests (minimized windows) are ignored. The shadow map
    /// keeps its fixed resolution.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Returns current surface dimensions
    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Whether the shader applies the sRGB transfer function itself
    pub fn encodes_srgb(&self) -> bool {
        self.encode_srgb
    }

    /// Number of frames presented since creation
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Set VSync (vertical synchronization) state
    pub fn set_vsync(&mut self, enable: bool) {
        self.scene_config.vsync = enable;
        self.config.present_mode = choose_present_mode(enable, &self.present_modes);
        self.surface.configure(&self.device, &self.config);
    }
}

/// Fifo when vsync is requested, otherwise the first tear-allowed mode the
/// surface supports
fn choose_present_mode(vsync: bool, supported: &[wgpu::PresentMode]) -> wgpu::PresentMode {
    if vsync {
        return wgpu::PresentMode::Fifo;
    }
    [wgpu::PresentMode::Immediate, wgpu::PresentMode::Mailbox]
        .into_iter()
        .find(|mode| supported.contains(mode))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_mode_falls_back_to_fifo() {
        use wgpu::PresentMode::*;
        assert_eq!(choose_present_mode(true, &[Immediate, Fifo]), Fifo);
        assert_eq!(choose_present_mode(false, &[Fifo, Immediate]), Immediate);
        assert_eq!(choose_present_mode(false, &[Fifo, Mailbox]), Mailbox);
        assert_eq!(choose_present_mode(false, &[Fifo]), Fifo);
    }
}
