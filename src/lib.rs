//! # daynight
//!
//! A small lit 3D scene rendered with wgpu: five lights with shadow maps, a
//! ground plane, rotating textured cubes, twenty randomly placed shapes that
//! change color when clicked, an OBJ model loaded in the background, a
//! skybox, and a day/night toggle on the `d` and `n` keys.
//!
//! ```no_run
//! use daynight::{DayNightApp, SceneConfig};
//!
//! DayNightApp::new(SceneConfig::from_env()).run()?;
//! # Ok::<(), daynight::error::AppError>(())
//! ```
//!
//! All scene behavior lives in [`SceneOrchestrator`], which can be driven
//! without a window through the [`orchestrator::FrameRenderer`] trait.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod orchestrator;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::DayNightApp;
pub use config::SceneConfig;
pub use orchestrator::SceneOrchestrator;
