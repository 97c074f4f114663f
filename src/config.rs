//! Startup configuration
//!
//! Every field has a default matching the demo scene. A few values can be
//! overridden from the environment so assets can live anywhere:
//!
//! - `DAYNIGHT_ASSET_DIR` - directory holding skybox faces, texture and model
//! - `DAYNIGHT_MODEL` - model file name inside the asset directory
//! - `DAYNIGHT_SEED` - RNG seed for shape placement and recoloring

use std::path::{Path, PathBuf};

/// Cube-map face file names in +x, -x, +y, -y, +z, -z order
pub const DEFAULT_SKYBOX_FACES: [&str; 6] =
    ["px.jpg", "nx.jpg", "py.jpg", "ny.jpg", "pz.jpg", "nz.jpg"];

/// Configuration consumed by [`crate::SceneOrchestrator`] and the host window
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub asset_dir: PathBuf,
    pub skybox_faces: [String; 6],
    pub texture_file: String,
    pub model_file: String,

    pub window_title: String,
    pub window_size: (u32, u32),

    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub camera_eye: [f32; 3],
    pub camera_target: [f32; 3],

    /// Fixed RNG seed; `None` seeds from the OS
    pub seed: Option<u64>,

    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    /// Fraction of the remaining orbit motion consumed per tick
    pub damping_factor: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("assets"),
            skybox_faces: DEFAULT_SKYBOX_FACES.map(String::from),
            texture_file: "texture.jpg".to_string(),
            model_file: "model.obj".to_string(),
            window_title: "Day / Night".to_string(),
            window_size: (1280, 720),
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            camera_eye: [0.0, 5.0, 15.0],
            camera_target: [0.0, 0.0, 0.0],
            seed: None,
            rotate_speed: 0.005,
            zoom_speed: 0.5,
            pan_speed: 0.01,
            damping_factor: 0.1,
        }
    }
}

impl SceneConfig {
    /// Default configuration with environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("DAYNIGHT_ASSET_DIR") {
            config.asset_dir = PathBuf::from(dir);
        }
        if let Ok(model) = std::env::var("DAYNIGHT_MODEL") {
            config.model_file = model;
        }
        if let Ok(seed) = std::env::var("DAYNIGHT_SEED") {
            match seed.parse::<u64>() {
                Ok(seed) => config.seed = Some(seed),
                Err(e) => log::warn!("Ignoring DAYNIGHT_SEED='{}': {}", seed, e),
            }
        }

        config
    }

    pub fn with_asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = dir.into();
        self
    }

    pub fn with_model_file(mut self, file: &str) -> Self {
        self.model_file = file.to_owned();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_damping(mut self, damping_factor: f32) -> Self {
        self.damping_factor = damping_factor.clamp(0.0, 1.0);
        self
    }

    /// Resolves an asset file name against the asset directory
    pub fn asset_path(&self, file: impl AsRef<Path>) -> PathBuf {
        self.asset_dir.join(file)
    }

    pub fn model_path(&self) -> PathBuf {
        self.asset_path(&self.model_file)
    }

    pub fn texture_path(&self) -> PathBuf {
        self.asset_path(&self.texture_file)
    }

    pub fn skybox_paths(&self) -> [PathBuf; 6] {
        self.skybox_faces.clone().map(|face| self.asset_path(face))
    }

    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skybox_paths_keep_face_order() {
        let config = SceneConfig::default().with_asset_dir("sky");
        let paths = config.skybox_paths();

        assert_eq!(paths[0], Path::new("sky").join("px.jpg"));
        assert_eq!(paths[3], Path::new("sky").join("ny.jpg"));
        assert_eq!(paths[5], Path::new("sky").join("nz.jpg"));
    }

    #[test]
    fn test_damping_is_clamped() {
        assert_eq!(SceneConfig::default().with_damping(4.0).damping_factor, 1.0);
        assert_eq!(SceneConfig::default().with_damping(-1.0).damping_factor, 0.0);
    }
}
