//! # Graphics Module
//!
//! Everything needed to describe, light and draw the day/night scene.
//!
//! - **Camera System** ([`camera`]) - Orbit camera with damped controls
//! - **Scene Graph** ([`scene`]) - Arena of groups, meshes and lights
//! - **Lighting** ([`lighting`], [`day_night`]) - The five-light rig and its two presets
//! - **Assets** ([`geometry`], [`environment`], [`model_loader`]) - Primitives, cube maps, OBJ models
//! - **Picking** ([`picking`]) - Screen rays against scene geometry
//! - **Rendering** ([`rendering`], [`resources`]) - Shadow-mapped Blinn-Phong on wgpu

pub mod camera;
pub mod color;
pub mod day_night;
pub mod environment;
pub mod geometry;
pub mod lighting;
pub mod model_loader;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use color::Color;
pub use day_night::Mode;
pub use rendering::render_engine::RenderEngine;
