//! Error types for the viewer and the frame exporter.
//!
//! The simulation tick path itself is infallible; everything that can
//! fail sits at the edges, in GPU/window setup and in PNG export.

use std::fmt;

/// Errors that can occur while bringing up the viewer window.
#[derive(Debug)]
pub enum ViewerError {
    /// Failed to create a rendering surface for the window.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    AdapterRequest(wgpu::RequestAdapterError),
    /// Failed to create the GPU device.
    DeviceRequest(wgpu::RequestDeviceError),
    /// Failed to create or run the event loop.
    EventLoop(winit::error::EventLoopError),
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::SurfaceCreation(e) => write!(f, "Failed to create surface: {}", e),
            ViewerError::AdapterRequest(e) => write!(
                f,
                "No compatible GPU adapter found ({}). Ensure your system supports Vulkan/Metal/DX12.",
                e
            ),
            ViewerError::DeviceRequest(e) => write!(f, "Failed to create GPU device: {}", e),
            ViewerError::EventLoop(e) => write!(f, "Event loop error: {}", e),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::SurfaceCreation(e) => Some(e),
            ViewerError::AdapterRequest(e) => Some(e),
            ViewerError::DeviceRequest(e) => Some(e),
            ViewerError::EventLoop(e) => Some(e),
        }
    }
}

impl From<wgpu::CreateSurfaceError> for ViewerError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        ViewerError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestAdapterError> for ViewerError {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        ViewerError::AdapterRequest(e)
    }
}

impl From<wgpu::RequestDeviceError> for ViewerError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        ViewerError::DeviceRequest(e)
    }
}

impl From<winit::error::EventLoopError> for ViewerError {
    fn from(e: winit::error::EventLoopError) -> Self {
        ViewerError::EventLoop(e)
    }
}

/// Errors that can occur when exporting a frame to disk.
#[derive(Debug)]
pub enum ExportError {
    /// Failed to encode the frame.
    Encode(image::ImageError),
    /// Failed to write to disk.
    Io(std::io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Encode(e) => write!(f, "Failed to encode frame: {}", e),
            ExportError::Io(e) => write!(f, "Failed to write frame: {}", e),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Encode(e) => Some(e),
            ExportError::Io(e) => Some(e),
        }
    }
}

impl From<image::ImageError> for ExportError {
    fn from(e: image::ImageError) -> Self {
        ExportError::Encode(e)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e)
    }
}
