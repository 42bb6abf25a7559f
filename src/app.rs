use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::SceneConfig,
    error::Result,
    gfx::rendering::RenderEngine,
    showcase::Showcase,
};

/// Window, event loop and the mounted showcase
pub struct RunwayApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

/// Everything that lives only while the window is mounted
struct Mounted {
    window: Arc<Window>,
    render_engine: RenderEngine,
    showcase: Showcase,
}

struct AppState {
    config: SceneConfig,
    mounted: Option<Mounted>,
}

impl RunwayApp {
    /// Create a new runway application with the given configuration
    pub fn new(config: SceneConfig) -> Result<Self> {
        let event_loop = EventLoop::new()?;
        Ok(Self {
            event_loop,
            app_state: AppState {
                config,
                mounted: None,
            },
        })
    }

    /// Run the application until the window closes
    pub fn run(mut self) -> Result<()> {
        self.event_loop.set_control_flow(ControlFlow::Poll);
        self.event_loop.run_app(&mut self.app_state)?;
        Ok(())
    }
}

impl AppState {
    fn mount(&self, event_loop: &ActiveEventLoop) -> Result<Mounted> {
        let window = Arc::new(
            event_loop.create_window(
                WindowAttributes::default()
                    .with_title(self.config.title.as_str())
                    .with_inner_size(LogicalSize::new(self.config.width, self.config.height)),
            )?,
        );

        let size = window.inner_size();
        let (width, height) = self
            .config
            .render_extent((size.width, size.height), window.scale_factor());

        let mut render_engine = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            &self.config,
        ))?;

        let mut showcase = Showcase::mount(width as f32 / height as f32);
        render_engine.upload_showcase(&mut showcase);

        Ok(Mounted {
            window,
            render_engine,
            showcase,
        })
    }

    fn unmount(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            mounted.showcase.unmount();
        }
    }

    fn resize(&mut self) {
        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };
        let size = mounted.window.inner_size();
        let (width, height) = self
            .config
            .render_extent((size.width, size.height), mounted.window.scale_factor());
        mounted.render_engine.resize(width, height);
        mounted.showcase.resize(width, height);
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.mounted.is_some() {
            return;
        }

        match self.mount(event_loop) {
            Ok(mounted) => {
                mounted.window.request_redraw();
                self.mounted = Some(mounted);
            }
            Err(err) => {
                log::error!("Failed to mount runway scene: {}", err);
                event_loop.exit();
            }
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.unmount();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.unmount();
                event_loop.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => self.resize(),
            WindowEvent::RedrawRequested => {
                let Some(mounted) = self.mounted.as_mut() else {
                    return;
                };
                mounted.showcase.update();
                if let Err(err) = mounted.render_engine.render(&mut mounted.showcase.scene) {
                    log::error!("Render failed: {}", err);
                    self.unmount();
                    event_loop.exit();
                }
            }
            event => {
                if let Some(mounted) = self.mounted.as_mut() {
                    mounted.showcase.scene.camera_manager.process_window_event(&event);
                }
            }
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let Some(mounted) = self.mounted.as_mut() {
            mounted
                .showcase
                .scene
                .camera_manager
                .process_device_event(&event, &mounted.window);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mounted) = self.mounted.as_ref() {
            mounted.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.unmount();
    }
}
