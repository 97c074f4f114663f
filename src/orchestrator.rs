//! The demo scene and everything that happens to it
//!
//! [`SceneOrchestrator`] builds the scene once and then only reacts: to ticks
//! from the render loop, to clicks, key presses and resizes, and to the
//! background model load finishing. It never touches the GPU; frames are
//! handed to a [`FrameRenderer`], so the whole scene logic runs headless in
//! tests.

use std::f32::consts::PI;

use cgmath::{Rad, Vector3};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    config::SceneConfig,
    error::AssetError,
    gfx::{
        camera::{CameraController, CameraManager, OrbitCamera},
        color::Color,
        day_night::{Mode, ModeSettings},
        environment::CubeMap,
        geometry::primitives,
        lighting::LightingRig,
        model_loader::{ModelAsset, ModelLoad},
        picking::ObjectPicker,
        resources::{image_data::ImageData, material::Material},
        scene::{Background, MeshNode, Node, NodeId, Scene},
    },
};

/// Rotation added to the animated cubes every tick, in radians
pub const ROTATION_STEP: f32 = 0.01;

pub const SHAPE_COUNT: usize = 20;
pub const TEXTURED_CUBE_COUNT: usize = 5;

const SHAPE_COLORS: [u32; 5] = [0xff6347, 0x87ceeb, 0x8a2be2, 0x228b22, 0xffff00];
const GROUND_COLOR: u32 = 0x222222;
const DEBUG_CUBE_COLOR: u32 = 0x00ffcc;

/// Output surface size in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// A failed asset load, kept for the lifetime of the session
#[derive(Debug)]
pub struct Diagnostic {
    pub asset: String,
    pub cause: AssetError,
}

/// Everything needed to draw one frame
pub struct Frame<'a> {
    pub scene: &'a Scene,
    pub camera: &'a OrbitCamera,
    pub viewport: Viewport,
    pub status_label: &'a str,
}

/// Receives a finished frame description at the end of every tick
pub trait FrameRenderer {
    fn render(&mut self, frame: &Frame<'_>);
}

pub struct SceneOrchestrator {
    config: SceneConfig,
    scene: Scene,
    camera_manager: CameraManager,
    viewport: Viewport,
    picker: ObjectPicker,
    rng: StdRng,

    lights: LightingRig,
    ground: NodeId,
    debug_cube: NodeId,
    textured_cubes: Vec<NodeId>,
    shapes: Vec<NodeId>,
    model: Option<NodeId>,
    model_load: Option<ModelLoad>,

    mode: Mode,
    day_background: Background,
    status_label: &'static str,
    diagnostics: Vec<Diagnostic>,
}

impl SceneOrchestrator {
    /// Builds the complete static scene
    ///
    /// Missing skybox faces and a missing cube texture degrade silently.
    /// The model is not requested yet; call [`Self::start_model_load`].
    pub fn new(config: SceneConfig, viewport: Viewport) -> Self {
        let mut scene = Scene::new();
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let camera = OrbitCamera::from_eye(
            Vector3::from(config.camera_eye),
            Vector3::from(config.camera_target),
            Rad(config.fov_radians()),
            viewport.aspect(),
            config.near,
            config.far,
        );
        let controller = CameraController::new(config.rotate_speed, config.zoom_speed)
            .with_pan_speed(config.pan_speed)
            .with_damping(config.damping_factor);
        let camera_manager = CameraManager::new(camera, controller);

        let skybox = scene.add_cube_map(CubeMap::load(&config.skybox_paths()));
        let day_background = Background::CubeMap(skybox);
        scene.background = day_background;

        let lights = LightingRig::install(&mut scene);

        let plane = scene.add_geometry(primitives::generate_plane(40.0, 40.0, 1, 1));
        let ground_material = scene
            .materials
            .add_material(Material::new("ground", Color::from_hex(GROUND_COLOR)));
        let ground = scene.add(
            Node::mesh(
                "ground",
                MeshNode::new(plane, ground_material).with_shadows(false, true),
            )
            .with_rotation(-PI / 2.0, 0.0, 0.0)
            .with_position(0.0, -2.0, 0.0),
        );

        let cube = scene.add_geometry(primitives::generate_cube());
        let debug_material = scene
            .materials
            .add_material(Material::new("debug cube", Color::from_hex(DEBUG_CUBE_COLOR)));
        let debug_cube = scene.add(
            Node::mesh(
                "debug cube",
                MeshNode::new(cube, debug_material).with_shadows(true, false),
            )
            .with_position(-3.0, 0.0, 0.0),
        );

        let cube_material = match ImageData::from_file(&config.texture_path()) {
            Ok(image) => {
                let texture = scene.add_texture(image);
                Material::new("textured cube", Color::WHITE).with_texture(texture)
            }
            Err(e) => {
                log::warn!("Cube texture unavailable, using plain white: {}", e);
                Material::new("textured cube", Color::WHITE)
            }
        };
        let cube_material = scene.materials.add_material(cube_material);
        let textured_cubes = (0..TEXTURED_CUBE_COUNT)
            .map(|i| {
                scene.add(
                    Node::mesh(
                        &format!("textured cube {}", i),
                        MeshNode::new(cube, cube_material).with_shadows(true, true),
                    )
                    .with_position(i as f32 * 2.0 - 4.0, 0.0, 0.0),
                )
            })
            .collect();

        let shapes = Self::add_shapes(&mut scene, &mut rng);

        log::info!(
            "Scene ready: {} nodes, {} shapes, {} materials",
            scene.node_count(),
            shapes.len(),
            scene.materials.len()
        );

        Self {
            config,
            scene,
            camera_manager,
            viewport,
            picker: ObjectPicker::new(),
            rng,
            lights,
            ground,
            debug_cube,
            textured_cubes,
            shapes,
            model: None,
            model_load: None,
            mode: Mode::Day,
            day_background,
            status_label: Mode::Day.label(),
            diagnostics: Vec::new(),
        }
    }

    /// The 20 pickable shapes, cycling through five geometries and colors
    fn add_shapes(scene: &mut Scene, rng: &mut StdRng) -> Vec<NodeId> {
        let geometries = [
            scene.add_geometry(primitives::generate_cube()),
            scene.add_geometry(primitives::generate_sphere(0.5, 32, 32)),
            scene.add_geometry(primitives::generate_cone(0.4, 1.0, 32)),
            scene.add_geometry(primitives::generate_cylinder(0.3, 0.3, 1.0, 32)),
            scene.add_geometry(primitives::generate_torus(0.4, 0.15, 16, 100)),
        ];
        let templates = SHAPE_COLORS.map(|hex| {
            scene
                .materials
                .add_material(Material::new("shape", Color::from_hex(hex)))
        });

        (0..SHAPE_COUNT)
            .map(|i| {
                // Each shape gets its own copy so recoloring stays local
                let material = scene
                    .materials
                    .clone_material(templates[i % templates.len()])
                    .unwrap_or(templates[i % templates.len()]);

                let x = rng.random_range(-10.0..10.0);
                let y = rng.random_range(-5.0..5.0);
                let z = rng.random_range(-10.0..10.0);

                scene.add(
                    Node::mesh(
                        &format!("shape {}", i),
                        MeshNode::new(geometries[i % geometries.len()], material)
                            .with_shadows(true, true),
                    )
                    .with_position(x, y, z),
                )
            })
            .collect()
    }

    /// Starts parsing the configured model on a worker thread
    pub fn start_model_load(&mut self) {
        let load = ModelLoad::spawn(self.config.model_path());
        self.begin_model_load(load);
    }

    /// Tracks an already started load; it is applied by [`Self::poll_model_load`]
    pub fn begin_model_load(&mut self, load: ModelLoad) {
        if self.model.is_some() || self.model_load.is_some() {
            log::warn!("Model load for '{}' ignored, one is already tracked", load.asset());
            return;
        }
        self.model_load = Some(load);
    }

    /// Applies the model load outcome once it is available
    ///
    /// Returns true on the single call that consumed the outcome.
    pub fn poll_model_load(&mut self) -> bool {
        let Some(load) = self.model_load.as_mut() else {
            return false;
        };
        let Some(result) = load.poll() else {
            return false;
        };
        let asset = load.asset().to_owned();
        self.model_load = None;

        match result {
            Ok(model) => {
                let root = self.attach_model(model);
                log::info!("Model '{}' added as {:?}", asset, root);
                self.model = Some(root);
            }
            Err(cause) => {
                log::error!("Failed to load model '{}': {}", asset, cause);
                self.diagnostics.push(Diagnostic { asset, cause });
            }
        }
        true
    }

    fn attach_model(&mut self, model: ModelAsset) -> NodeId {
        let root = self.scene.add(
            Node::group(&model.name)
                .with_position(0.0, 0.0, -3.0)
                .with_uniform_scale(1.0),
        );

        for mesh in model.meshes {
            let geometry = self.scene.add_geometry(mesh.geometry);
            let material = self
                .scene
                .materials
                .add_material(Material::new(&mesh.name, mesh.color));
            self.scene
                .add_child(root, Node::mesh(&mesh.name, MeshNode::new(geometry, material)));
        }

        for id in self.scene.descendants(root) {
            if let Some(mesh) = self.scene.node_mut(id).and_then(Node::as_mesh_mut) {
                mesh.cast_shadow = true;
                mesh.receive_shadow = true;
            }
        }

        root
    }

    /// One render-loop step: animate, update the orbit controller, render
    pub fn tick(&mut self, renderer: &mut impl FrameRenderer) {
        for &id in &self.textured_cubes {
            if let Some(node) = self.scene.node_mut(id) {
                node.transform.rotation.x += ROTATION_STEP;
                node.transform.rotation.y += ROTATION_STEP;
            }
        }
        if let Some(node) = self.scene.node_mut(self.debug_cube) {
            node.transform.rotation.y += ROTATION_STEP;
        }

        self.camera_manager.update();

        renderer.render(&self.frame());
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            scene: &self.scene,
            camera: &self.camera_manager.camera,
            viewport: self.viewport,
            status_label: self.status_label,
        }
    }

    /// Switches mode for a `d`/`n` key; returns whether anything changed
    pub fn handle_key(&mut self, key: &str) -> bool {
        let next = self.mode.transition(key);
        if next == self.mode {
            return false;
        }
        self.set_mode(next);
        true
    }

    /// Applies every light intensity, the background and the label of `mode`
    pub fn set_mode(&mut self, mode: Mode) {
        let settings = ModeSettings::for_mode(mode, self.day_background);

        self.lights
            .set_intensities(&mut self.scene, settings.intensities);
        self.scene.background = settings.background;
        self.status_label = settings.label;
        self.mode = mode;

        log::info!("{}", settings.label);
    }

    /// Recolors the nearest shape under the cursor
    ///
    /// Only the 20 shapes are pickable. Returns the recolored node.
    pub fn handle_click(&mut self, x: f32, y: f32) -> Option<NodeId> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return None;
        }

        let ray = self.picker.screen_to_ray(
            (x, y),
            (self.viewport.width as f32, self.viewport.height as f32),
            &self.camera_manager.camera,
        );
        let hit = self.picker.pick(&ray, &self.scene, &self.shapes)?;

        let material = self.scene.mesh(hit.node)?.material;
        let color = Color::from_hex(self.rng.random_range(0..=0xffffff));
        let target = self.scene.materials.get_material_mut(material)?;
        target.color = color;

        log::debug!("Recolored {:?} to #{:06x}", hit.node, color.to_hex());
        Some(hit.node)
    }

    /// Updates the viewport and camera aspect; zero sizes are ignored
    pub fn handle_resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.viewport = Viewport::new(width, height);
        self.camera_manager.resize(width, height);
        true
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera_manager.camera
    }

    pub fn camera_manager_mut(&mut self) -> &mut CameraManager {
        &mut self.camera_manager
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn status_label(&self) -> &'static str {
        self.status_label
    }

    pub fn lights(&self) -> &LightingRig {
        &self.lights
    }

    pub fn ground(&self) -> NodeId {
        self.ground
    }

    pub fn debug_cube(&self) -> NodeId {
        self.debug_cube
    }

    pub fn textured_cubes(&self) -> &[NodeId] {
        &self.textured_cubes
    }

    pub fn shapes(&self) -> &[NodeId] {
        &self.shapes
    }

    pub fn model(&self) -> Option<NodeId> {
        self.model
    }

    /// True while a model load is tracked and its outcome not yet applied
    pub fn model_pending(&self) -> bool {
        self.model_load.as_ref().is_some_and(ModelLoad::is_pending)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Background shown in day mode
    pub fn day_background(&self) -> Background {
        self.day_background
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orchestrator() -> SceneOrchestrator {
        let config = SceneConfig::default()
            .with_asset_dir("does-not-exist")
            .with_seed(7);
        SceneOrchestrator::new(config, Viewport::new(800, 600))
    }

    #[test]
    fn test_scene_population() {
        let orchestrator = orchestrator();
        let scene = orchestrator.scene();

        // root + 5 lights + debug target + ground + debug cube + 5 cubes + 20 shapes
        assert_eq!(scene.node_count(), 1 + 5 + 1 + 1 + 1 + 5 + 20);
        assert_eq!(orchestrator.shapes().len(), SHAPE_COUNT);
        assert_eq!(orchestrator.textured_cubes().len(), TEXTURED_CUBE_COUNT);
        assert_eq!(scene.background, orchestrator.day_background());
    }

    #[test]
    fn test_shapes_have_own_materials() {
        let orchestrator = orchestrator();
        let scene = orchestrator.scene();

        let mut materials: Vec<_> = orchestrator
            .shapes()
            .iter()
            .map(|&id| scene.mesh(id).unwrap().material)
            .collect();
        materials.sort_by_key(|m| m.0);
        materials.dedup();
        assert_eq!(materials.len(), SHAPE_COUNT);
    }

    #[test]
    fn test_shape_positions_stay_in_bounds() {
        let orchestrator = orchestrator();
        for &id in orchestrator.shapes() {
            let p = orchestrator.scene().node(id).unwrap().transform.position;
            assert!((-10.0..10.0).contains(&p.x));
            assert!((-5.0..5.0).contains(&p.y));
            assert!((-10.0..10.0).contains(&p.z));
        }
    }

    #[test]
    fn test_textured_cubes_share_material() {
        let orchestrator = orchestrator();
        let scene = orchestrator.scene();
        let first = scene.mesh(orchestrator.textured_cubes()[0]).unwrap().material;

        for (i, &id) in orchestrator.textured_cubes().iter().enumerate() {
            assert_eq!(scene.mesh(id).unwrap().material, first);
            assert_eq!(scene.world_position(id).x, i as f32 * 2.0 - 4.0);
        }

        // Missing texture leaves a plain white surface
        let material = scene.materials.get_material(first).unwrap();
        assert!(material.texture.is_none());
        assert_eq!(material.color, Color::WHITE);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = orchestrator();
        let b = orchestrator();
        for (&sa, &sb) in a.shapes().iter().zip(b.shapes()) {
            assert_eq!(
                a.scene().node(sa).unwrap().transform.position,
                b.scene().node(sb).unwrap().transform.position
            );
        }
    }

    #[test]
    fn test_unrelated_key_is_ignored() {
        let mut orchestrator = orchestrator();
        assert!(!orchestrator.handle_key("x"));
        assert!(!orchestrator.handle_key("d"));
        assert_eq!(orchestrator.mode(), Mode::Day);
        assert!(orchestrator.handle_key("N"));
        assert_eq!(orchestrator.mode(), Mode::Night);
    }

    #[test]
    fn test_zero_resize_is_ignored() {
        let mut orchestrator = orchestrator();
        assert!(!orchestrator.handle_resize(0, 300));
        assert_eq!(orchestrator.viewport(), Viewport::new(800, 600));
    }
}
