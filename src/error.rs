//! Error types
//!
//! Asset failures are recoverable (a missing skybox face degrades to black, a
//! missing model simply never appears). Render and window failures only occur
//! during startup and are fatal.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while loading an image or model from disk
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to load image '{path}': {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("cube face '{path}' is {width}x{height}, expected {expected}x{expected}")]
    FaceSize {
        path: PathBuf,
        expected: u32,
        width: u32,
        height: u32,
    },

    #[error("failed to load model '{path}': {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("model '{0}' contains no meshes")]
    EmptyModel(PathBuf),

    #[error("loader for '{0}' stopped before delivering a result")]
    LoaderVanished(String),

    #[error("failed to start loader thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Failure while creating GPU resources
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to acquire device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported texture format")]
    NoSurfaceFormat,

    #[error("shader '{0}' is not loaded")]
    MissingShader(String),
}

/// Fatal application error returned from [`crate::DayNightApp::run`]
#[derive(Debug, Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
