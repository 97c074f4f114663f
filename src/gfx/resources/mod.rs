//! GPU resource management
//!
//! Handles images, materials, textures, and the bind groups shared by every draw.

pub mod global_bindings;
pub mod image_data;
pub mod material;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{GlobalBindings, GlobalUBO, GlobalUBOContent};
pub use image_data::ImageData;
pub use material::{Material, MaterialId, MaterialManager, TextureId};
pub use texture_resource::TextureResource;
