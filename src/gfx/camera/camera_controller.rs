use std::f32::consts::PI;

use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    window::Window,
};

use super::orbit_camera::OrbitCamera;

/// Pixels of trackpad scroll that count as one wheel notch
const PIXELS_PER_LINE: f32 = 50.0;

/// Mouse input for the orbit camera: left drag orbits, wheel zooms
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    is_mouse_pressed: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            is_mouse_pressed: false,
        }
    }

    /// Handles button and wheel events; returns true when the camera changed
    pub fn process_window_event(&mut self, event: &WindowEvent, camera: &mut OrbitCamera) -> bool {
        match event {
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32 / PIXELS_PER_LINE
                    }
                };
                camera.zoom(notches * self.zoom_speed);
                true
            }
            WindowEvent::Focused(false) => {
                self.is_mouse_pressed = false;
                false
            }
            _ => false,
        }
    }

    /// Orbits on raw mouse motion while the left button is held
    ///
    /// A drag across the full window height turns the camera by a full circle.
    pub fn process_device_event(
        &mut self,
        event: &DeviceEvent,
        window: &Window,
        camera: &mut OrbitCamera,
    ) -> bool {
        match event {
            DeviceEvent::MouseMotion { delta } if self.is_mouse_pressed => {
                let height = window.inner_size().height.max(1) as f32;
                self.orbit(camera, (delta.0 as f32, delta.1 as f32), height);
                true
            }
            _ => false,
        }
    }

    fn orbit(&self, camera: &mut OrbitCamera, delta: (f32, f32), viewport_height: f32) {
        let scale = 2.0 * PI / viewport_height * self.rotate_speed;
        camera.rotate(-delta.0 * scale, -delta.1 * scale);
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_across_viewport_is_full_turn() {
        let controller = CameraController::default();
        let mut camera = OrbitCamera::runway(1.5);
        camera.damping = 1.0;
        let start = camera.azimuth;

        controller.orbit(&mut camera, (-400.0, 0.0), 800.0);
        camera.update();
        assert!((camera.azimuth - start - PI).abs() < 1e-4);
    }
}
