//! Error types for the runway renderer
//!
//! Only setup can fail outright. Everything on the frame path degrades
//! (skips a frame, falls back to a placeholder) instead of returning errors.

use thiserror::Error;

/// Errors raised while bringing up the window and GPU context
#[derive(Debug, Error)]
pub enum RunwayError {
    /// The platform could not provide a drawable surface for the window
    #[error("failed to create render surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    /// No GPU adapter is compatible with the surface
    #[error("no compatible GPU adapter: {0}")]
    AdapterUnavailable(#[from] wgpu::RequestAdapterError),

    /// The adapter refused to hand out a device with the requested limits
    #[error("failed to request GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    /// The surface reported no usable texture format
    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,

    /// Acquiring the next swapchain texture failed in a non-recoverable way
    #[error("failed to acquire surface texture: {0}")]
    SurfaceAcquire(wgpu::SurfaceError),

    /// The windowing event loop could not be created or exited abnormally
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// The OS refused to create the window
    #[error("failed to create window: {0}")]
    WindowCreation(#[from] winit::error::OsError),
}

/// Convenience result alias used across the crate
pub type Result<T> = std::result::Result<T, RunwayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_failures_convert_into_runway_error() {
        fn from_window(err: winit::error::OsError) -> RunwayError {
            err.into()
        }
        fn from_event_loop(err: winit::error::EventLoopError) -> RunwayError {
            err.into()
        }
        let mount_path: fn(winit::error::OsError) -> RunwayError = from_window;
        let run_path: fn(winit::error::EventLoopError) -> RunwayError = from_event_loop;
        let _ = (mount_path, run_path);

        assert_eq!(
            RunwayError::NoSurfaceFormat.to_string(),
            "surface reports no supported texture formats"
        );
        assert_eq!(
            RunwayError::SurfaceAcquire(wgpu::SurfaceError::OutOfMemory).to_string(),
            format!("failed to acquire surface texture: {}", wgpu::SurfaceError::OutOfMemory)
        );
    }
}
