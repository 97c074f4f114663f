//! Background loading of external OBJ models
//!
//! Parsing happens on a worker thread; the result comes back through a
//! single-shot channel that the event loop polls once per frame with
//! [`ModelLoad::poll`].

use std::path::{Path, PathBuf};

use futures::channel::oneshot;

use crate::error::AssetError;
use crate::gfx::{color::Color, geometry::GeometryData};

/// Color used for model meshes without a diffuse material
pub const FALLBACK_MODEL_COLOR: Color = Color::new(0.8, 0.8, 0.8);

/// One mesh of a loaded model
#[derive(Debug, Clone)]
pub struct ModelMesh {
    pub name: String,
    pub geometry: GeometryData,
    pub color: Color,
}

/// A parsed model, not yet part of any scene
#[derive(Debug, Clone)]
pub struct ModelAsset {
    pub name: String,
    pub meshes: Vec<ModelMesh>,
}

/// Parses an OBJ file (and its MTL library, when present)
pub fn load_obj(path: &Path) -> Result<ModelAsset, AssetError> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| AssetError::Model {
        path: path.to_path_buf(),
        source,
    })?;

    let materials = materials.unwrap_or_else(|e| {
        log::debug!("No usable MTL for {:?} ({}), using default colors", path, e);
        Vec::new()
    });

    let meshes: Vec<ModelMesh> = models
        .into_iter()
        .filter(|model| !model.mesh.indices.is_empty())
        .map(|model| {
            let mesh = model.mesh;

            let color = mesh
                .material_id
                .and_then(|id| materials.get(id))
                .and_then(|material| material.diffuse)
                .map_or(FALLBACK_MODEL_COLOR, |[r, g, b]| Color::new(r, g, b));

            let vertices: Vec<[f32; 3]> = mesh
                .positions
                .chunks_exact(3)
                .map(|p| [p[0], p[1], p[2]])
                .collect();

            // Use normals from OBJ if available, otherwise calculate them
            let normals = if mesh.normals.len() == mesh.positions.len() {
                mesh.normals
                    .chunks_exact(3)
                    .map(|n| [n[0], n[1], n[2]])
                    .collect()
            } else {
                GeometryData::compute_smooth_normals(&vertices, &mesh.indices)
            };

            let tex_coords = if mesh.texcoords.len() / 2 == vertices.len() {
                mesh.texcoords
                    .chunks_exact(2)
                    .map(|t| [t[0], 1.0 - t[1]])
                    .collect()
            } else {
                vec![[0.0, 0.0]; vertices.len()]
            };

            ModelMesh {
                name: model.name,
                geometry: GeometryData {
                    vertices,
                    tex_coords,
                    normals,
                    indices: mesh.indices,
                },
                color,
            }
        })
        .collect();

    if meshes.is_empty() {
        return Err(AssetError::EmptyModel(path.to_path_buf()));
    }

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());

    log::debug!("Parsed model '{}' with {} meshes", name, meshes.len());

    Ok(ModelAsset { name, meshes })
}

type LoadResult = Result<ModelAsset, AssetError>;

enum LoadState {
    Waiting(oneshot::Receiver<LoadResult>),
    Ready(LoadResult),
    Consumed,
}

/// Single-shot handle to a model load in progress
///
/// [`ModelLoad::poll`] yields the outcome exactly once; afterwards the
/// handle is spent and keeps returning `None`.
pub struct ModelLoad {
    asset: String,
    state: LoadState,
}

impl ModelLoad {
    /// Parses the OBJ at `path` on a worker thread
    pub fn spawn(path: PathBuf) -> Self {
        let asset = path.display().to_string();
        Self::spawn_with(asset, move || load_obj(&path))
    }

    /// Runs `job` on a worker thread and delivers its result
    pub fn spawn_with<F>(asset: impl Into<String>, job: F) -> Self
    where
        F: FnOnce() -> LoadResult + Send + 'static,
    {
        let asset = asset.into();
        let (sender, receiver) = oneshot::channel();

        let spawned = std::thread::Builder::new()
            .name("model-loader".to_string())
            .spawn(move || {
                // The receiver may be gone if the app already shut down
                let _ = sender.send(job());
            });

        let state = match spawned {
            Ok(_) => {
                log::info!("Loading model '{}'", asset);
                LoadState::Waiting(receiver)
            }
            Err(e) => LoadState::Ready(Err(AssetError::Spawn(e))),
        };

        Self { asset, state }
    }

    /// A handle whose outcome is already known
    pub fn ready(asset: impl Into<String>, result: LoadResult) -> Self {
        Self {
            asset: asset.into(),
            state: LoadState::Ready(result),
        }
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// True until the outcome has been taken
    pub fn is_pending(&self) -> bool {
        !matches!(self.state, LoadState::Consumed)
    }

    /// Takes the outcome if the load has finished
    pub fn poll(&mut self) -> Option<LoadResult> {
        match std::mem::replace(&mut self.state, LoadState::Consumed) {
            LoadState::Waiting(mut receiver) => match receiver.try_recv() {
                Ok(Some(result)) => Some(result),
                Ok(None) => {
                    self.state = LoadState::Waiting(receiver);
                    None
                }
                Err(oneshot::Canceled) => Some(Err(AssetError::LoaderVanished(self.asset.clone()))),
            },
            LoadState::Ready(result) => Some(result),
            LoadState::Consumed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    const TRIANGLE_OBJ: &str = "o tri\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("daynight-model-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn wait(load: &mut ModelLoad) -> LoadResult {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(result) = load.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "model load never finished");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_load_obj_computes_missing_normals() {
        let path = temp_file("tri.obj", TRIANGLE_OBJ);
        let model = load_obj(&path).unwrap();

        assert_eq!(model.name, "tri");
        assert_eq!(model.meshes.len(), 1);
        let mesh = &model.meshes[0];
        assert_eq!(mesh.geometry.triangle_count(), 1);
        assert_eq!(mesh.geometry.normals[0], [0.0, 0.0, 1.0]);
        assert_eq!(mesh.color, FALLBACK_MODEL_COLOR);
    }

    #[test]
    fn test_missing_file_is_a_model_error() {
        let err = load_obj(Path::new("no/such/model.obj")).unwrap_err();
        assert!(matches!(err, AssetError::Model { .. }));
    }

    #[test]
    fn test_obj_without_faces_is_empty() {
        let path = temp_file("points.obj", "v 0 0 0\nv 1 0 0\n");
        assert!(matches!(load_obj(&path), Err(AssetError::EmptyModel(_))));
    }

    #[test]
    fn test_poll_yields_exactly_once() {
        let path = temp_file("once.obj", TRIANGLE_OBJ);
        let mut load = ModelLoad::spawn(path);

        assert!(wait(&mut load).is_ok());
        assert!(!load.is_pending());
        assert!(load.poll().is_none());
    }

    #[test]
    fn test_dropped_sender_reports_vanished_loader() {
        let mut load = ModelLoad::spawn_with("broken.obj", || panic!("worker died"));

        match wait(&mut load) {
            Err(AssetError::LoaderVanished(asset)) => assert_eq!(asset, "broken.obj"),
            other => panic!("unexpected outcome {:?}", other.map(|m| m.name)),
        }
    }
}
