//! Decoded RGBA8 images ready for GPU upload

use std::path::Path;

use crate::error::AssetError;

/// Loaded image data in tightly packed RGBA8
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ImageData {
    /// Load and decode an image file, converting to RGBA8
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();
        log::debug!("Loading image from {:?}", path);

        let rgba = image::open(path)
            .map_err(|source| AssetError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = rgba.dimensions();

        log::debug!("Loaded image {}x{} from {:?}", width, height, path);

        Ok(Self {
            pixels: rgba.into_raw(),
            width,
            height,
        })
    }

    /// A single-color image, used as the stand-in for missing textures
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = (width * height) as usize;
        let mut pixels = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            pixels.extend_from_slice(&color);
        }

        Self {
            pixels,
            width,
            height,
        }
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }
}
