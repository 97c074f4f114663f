//! Cube-map scene backgrounds

use std::path::{Path, PathBuf};

use crate::error::AssetError;
use crate::gfx::resources::image_data::ImageData;

const BLACK: [u8; 4] = [0, 0, 0, 255];

/// Six square faces in +x, -x, +y, -y, +z, -z order
#[derive(Debug, Clone, PartialEq)]
pub struct CubeMap {
    size: u32,
    faces: [ImageData; 6],
}

impl CubeMap {
    /// Loads six face images, degrading every unusable face to black
    ///
    /// The first face that decodes fixes the face size; later faces with any
    /// other size count as failed. When no face loads at all the result is a
    /// 1x1 black cube. Failures are only logged at debug level.
    pub fn load(paths: &[PathBuf; 6]) -> Self {
        let mut size = None;
        let decoded: Vec<Option<ImageData>> = paths
            .iter()
            .map(|path| match load_face(path, size) {
                Ok(face) => {
                    size.get_or_insert(face.width);
                    Some(face)
                }
                Err(e) => {
                    log::debug!("Cube face unavailable, using black: {}", e);
                    None
                }
            })
            .collect();

        let size = size.unwrap_or(1);
        let mut decoded = decoded.into_iter();
        let faces = std::array::from_fn(|_| {
            decoded
                .next()
                .flatten()
                .unwrap_or_else(|| ImageData::solid_color(size, size, BLACK))
        });

        Self { size, faces }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn faces(&self) -> &[ImageData; 6] {
        &self.faces
    }
}

fn load_face(path: &Path, expected: Option<u32>) -> Result<ImageData, AssetError> {
    let face = ImageData::from_file(path)?;
    let expected = expected.unwrap_or(face.width);

    if !face.is_square() || face.width != expected {
        return Err(AssetError::FaceSize {
            path: path.to_path_buf(),
            expected,
            width: face.width,
            height: face.height,
        });
    }

    Ok(face)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str, size: u32, rgb: [u8; 3]) -> PathBuf {
        let path = dir.join(name);
        image::RgbImage::from_pixel(size, size, image::Rgb(rgb))
            .save(&path)
            .unwrap();
        path
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("daynight-cube-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_all_faces_missing_gives_black_cube() {
        let paths = std::array::from_fn(|i| PathBuf::from(format!("missing/face{}.png", i)));
        let cube = CubeMap::load(&paths);

        assert_eq!(cube.size(), 1);
        assert!(cube.faces().iter().all(|f| f.pixels == BLACK));
    }

    #[test]
    fn test_missing_and_mismatched_faces_turn_black() {
        let dir = temp_dir("partial");
        let good = write_png(&dir, "good.png", 4, [200, 10, 10]);
        let small = write_png(&dir, "small.png", 2, [10, 200, 10]);

        let paths = [
            good.clone(),
            dir.join("absent.png"),
            good.clone(),
            small,
            good.clone(),
            good,
        ];
        let cube = CubeMap::load(&paths);

        assert_eq!(cube.size(), 4);
        assert_eq!(&cube.faces()[0].pixels[..4], &[200, 10, 10, 255]);
        for black in [1, 3] {
            assert_eq!(cube.faces()[black].width, 4);
            assert!(cube.faces()[black].pixels.chunks_exact(4).all(|px| px == BLACK));
        }

        let _ = std::fs::remove_dir_all(dir);
    }
}
