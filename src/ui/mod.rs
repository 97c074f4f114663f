//! # User Interface Module
//!
//! Dear ImGui overlay drawn on top of the scene. [`UiManager`] handles the
//! ImGui integration with winit and wgpu; [`panel`] holds the status panel
//! showing the current day/night label.

pub mod manager;
pub mod panel;

// Re-export main types
pub use manager::UiManager;
pub use panel::{status_panel, StatusInfo};
