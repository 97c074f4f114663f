use std::path::PathBuf;
use std::time::{Duration, Instant};

use cgmath::{InnerSpace, Vector3};
use daynight::{
    gfx::{
        day_night::Mode,
        lighting::LightIntensities,
        resources::material::MaterialId,
        scene::{Background, NodeId},
        Color,
    },
    orchestrator::{Frame, FrameRenderer, Viewport},
    SceneConfig, SceneOrchestrator,
};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;
const CENTER: (f32, f32) = (WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0);

/// Remembers what every frame looked like instead of drawing it
#[derive(Default)]
struct RecordingRenderer {
    labels: Vec<String>,
    node_counts: Vec<usize>,
}

impl FrameRenderer for RecordingRenderer {
    fn render(&mut self, frame: &Frame<'_>) {
        self.labels.push(frame.status_label.to_owned());
        self.node_counts.push(frame.scene.node_count());
    }
}

fn config() -> SceneConfig {
    SceneConfig::default()
        .with_asset_dir(std::env::temp_dir().join("daynight-no-assets"))
        .with_seed(42)
}

fn orchestrator() -> SceneOrchestrator {
    SceneOrchestrator::new(config(), Viewport::new(WIDTH, HEIGHT))
}

fn material_colors(orchestrator: &SceneOrchestrator) -> Vec<(MaterialId, Color)> {
    orchestrator
        .scene()
        .materials
        .iter()
        .map(|(id, material)| (id, material.color))
        .collect()
}

fn shape_material(orchestrator: &SceneOrchestrator, shape: NodeId) -> MaterialId {
    orchestrator.scene().mesh(shape).unwrap().material
}

fn place(orchestrator: &mut SceneOrchestrator, node: NodeId, position: Vector3<f32>) {
    orchestrator.scene_mut().node_mut(node).unwrap().transform.position = position;
}

/// Moves every shape out of view so tests control what lies under the cursor
fn clear_shapes(orchestrator: &mut SceneOrchestrator) {
    let shapes = orchestrator.shapes().to_vec();
    for (i, shape) in shapes.into_iter().enumerate() {
        place(orchestrator, shape, Vector3::new(200.0 + i as f32 * 5.0, 200.0, 200.0));
    }
}

fn wait_for_model(orchestrator: &mut SceneOrchestrator) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !orchestrator.poll_model_load() {
        assert!(Instant::now() < deadline, "model load never finished");
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn temp_asset_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("daynight-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn resize_updates_aspect_and_is_idempotent() {
    let mut orchestrator = orchestrator();

    assert!(orchestrator.handle_resize(1024, 512));
    let aspect = orchestrator.camera().aspect;
    let projection = orchestrator.camera().projection_matrix();
    assert!((aspect - 2.0).abs() < 1e-6);
    assert_eq!(orchestrator.viewport(), Viewport::new(1024, 512));

    assert!(orchestrator.handle_resize(1024, 512));
    assert_eq!(orchestrator.camera().aspect, aspect);
    assert_eq!(orchestrator.camera().projection_matrix(), projection);
    assert_eq!(orchestrator.viewport(), Viewport::new(1024, 512));
}

#[test]
fn day_night_round_trip_restores_everything() {
    let mut orchestrator = orchestrator();
    let lights = *orchestrator.lights();
    let day_intensities = lights.intensities(orchestrator.scene());
    let day_background = orchestrator.scene().background;
    assert_eq!(day_intensities, LightIntensities::DAY);

    orchestrator.handle_key("n");
    assert_eq!(lights.intensities(orchestrator.scene()), LightIntensities::NIGHT);

    orchestrator.handle_key("d");
    assert_eq!(lights.intensities(orchestrator.scene()), day_intensities);
    assert_eq!(orchestrator.scene().background, day_background);
    assert_eq!(orchestrator.status_label(), "Day Mode");
}

#[test]
fn night_twice_is_idempotent() {
    let mut orchestrator = orchestrator();
    orchestrator.handle_key("N");
    let intensities = orchestrator.lights().intensities(orchestrator.scene());
    let background = orchestrator.scene().background;

    assert!(!orchestrator.handle_key("n"));
    assert_eq!(orchestrator.lights().intensities(orchestrator.scene()), intensities);
    assert_eq!(orchestrator.scene().background, background);
    assert_eq!(orchestrator.mode(), Mode::Night);
}

#[test]
fn night_label_and_background() {
    let mut orchestrator = orchestrator();

    orchestrator.handle_key("n");
    assert_eq!(orchestrator.status_label(), "Night Mode");
    match orchestrator.scene().background {
        Background::Color(color) => assert_eq!(color.to_rgb8(), [13, 27, 42]),
        other => panic!("night background should be a flat color, got {:?}", other),
    }

    orchestrator.handle_key("D");
    assert_eq!(orchestrator.status_label(), "Day Mode");
    assert!(matches!(orchestrator.scene().background, Background::CubeMap(_)));
}

#[test]
fn clicking_a_lone_shape_recolors_only_it() {
    let mut orchestrator = orchestrator();
    clear_shapes(&mut orchestrator);
    let target = orchestrator.shapes()[0];
    place(&mut orchestrator, target, Vector3::new(0.0, 0.0, 0.0));

    let before = material_colors(&orchestrator);
    let hit = orchestrator.handle_click(CENTER.0, CENTER.1);
    assert_eq!(hit, Some(target));

    let target_material = shape_material(&orchestrator, target);
    for ((id, old), (_, new)) in before.iter().zip(material_colors(&orchestrator)) {
        if *id == target_material {
            assert_ne!(*old, new);
        } else {
            assert_eq!(*old, new, "material {:?} should be untouched", id);
        }
    }
}

#[test]
fn only_the_nearer_of_two_overlapping_shapes_changes() {
    let mut orchestrator = orchestrator();
    clear_shapes(&mut orchestrator);
    let far = orchestrator.shapes()[0];
    let near = orchestrator.shapes()[1];

    // Both sit on the line from the eye (0, 5, 15) to the origin
    place(&mut orchestrator, far, Vector3::new(0.0, 0.0, 0.0));
    place(&mut orchestrator, near, Vector3::new(0.0, 2.5, 7.5));

    let far_color = orchestrator
        .scene()
        .materials
        .get_material(shape_material(&orchestrator, far))
        .unwrap()
        .color;

    assert_eq!(orchestrator.handle_click(CENTER.0, CENTER.1), Some(near));

    let far_after = orchestrator
        .scene()
        .materials
        .get_material(shape_material(&orchestrator, far))
        .unwrap()
        .color;
    assert_eq!(far_color, far_after);
}

#[test]
fn clicking_empty_space_changes_nothing() {
    let mut orchestrator = orchestrator();
    clear_shapes(&mut orchestrator);
    let before = material_colors(&orchestrator);

    assert_eq!(orchestrator.handle_click(CENTER.0, CENTER.1), None);
    assert_eq!(orchestrator.handle_click(5.0, 5.0), None);
    assert_eq!(material_colors(&orchestrator), before);
}

#[test]
fn ticks_rotate_only_the_animated_cubes() {
    let mut orchestrator = orchestrator();
    let mut renderer = RecordingRenderer::default();

    let transform = |o: &SceneOrchestrator, id: NodeId| o.scene().node(id).unwrap().transform;
    let shapes_before: Vec<_> = orchestrator
        .shapes()
        .iter()
        .map(|&id| transform(&orchestrator, id))
        .collect();
    let ground_before = transform(&orchestrator, orchestrator.ground());

    for _ in 0..3 {
        orchestrator.tick(&mut renderer);
    }

    assert_eq!(renderer.labels, vec!["Day Mode"; 3]);

    for &cube in orchestrator.textured_cubes() {
        let rotation = transform(&orchestrator, cube).rotation;
        assert!((rotation.x - 0.03).abs() < 1e-5);
        assert!((rotation.y - 0.03).abs() < 1e-5);
        assert_eq!(rotation.z, 0.0);
    }

    let debug = transform(&orchestrator, orchestrator.debug_cube()).rotation;
    assert_eq!(debug.x, 0.0);
    assert!((debug.y - 0.03).abs() < 1e-5);

    for (&id, before) in orchestrator.shapes().iter().zip(&shapes_before) {
        assert_eq!(transform(&orchestrator, id), *before);
    }
    assert_eq!(transform(&orchestrator, orchestrator.ground()), ground_before);
}

#[test]
fn idle_ticks_keep_the_camera_still() {
    let mut orchestrator = orchestrator();
    let mut renderer = RecordingRenderer::default();
    let eye = orchestrator.camera().eye;

    for _ in 0..10 {
        orchestrator.tick(&mut renderer);
    }
    assert!((orchestrator.camera().eye - eye).magnitude() < 1e-4);
}

#[test]
fn missing_model_records_one_diagnostic() {
    let mut orchestrator = SceneOrchestrator::new(
        config().with_model_file("missing-model.obj"),
        Viewport::new(WIDTH, HEIGHT),
    );
    let node_count = orchestrator.scene().node_count();

    orchestrator.start_model_load();
    wait_for_model(&mut orchestrator);

    assert_eq!(orchestrator.diagnostics().len(), 1);
    assert!(orchestrator.diagnostics()[0].asset.contains("missing-model.obj"));
    assert_eq!(orchestrator.scene().node_count(), node_count);
    assert_eq!(orchestrator.model(), None);
    assert!(!orchestrator.model_pending());

    // The outcome is consumed exactly once
    assert!(!orchestrator.poll_model_load());
    assert_eq!(orchestrator.diagnostics().len(), 1);

    let mut renderer = RecordingRenderer::default();
    orchestrator.tick(&mut renderer);
    assert_eq!(renderer.node_counts, vec![node_count]);
}

#[test]
fn loaded_model_is_appended_once_with_shadows() {
    let dir = temp_asset_dir("model");
    std::fs::write(
        dir.join("model.obj"),
        "o quad\nv -1 0 0\nv 1 0 0\nv 1 1 0\nv -1 1 0\nf 1 2 3 4\n",
    )
    .unwrap();

    let mut orchestrator = SceneOrchestrator::new(
        config().with_asset_dir(&dir),
        Viewport::new(WIDTH, HEIGHT),
    );
    let node_count = orchestrator.scene().node_count();

    orchestrator.start_model_load();
    assert!(orchestrator.model_pending());
    wait_for_model(&mut orchestrator);

    let model = orchestrator.model().expect("model should be attached");
    let scene = orchestrator.scene();
    assert_eq!(scene.node_count(), node_count + 2);
    assert_eq!(scene.root_children().last(), Some(&model));
    assert_eq!(scene.world_position(model), Vector3::new(0.0, 0.0, -3.0));

    let meshes: Vec<_> = scene
        .descendants(model)
        .into_iter()
        .filter_map(|id| scene.mesh(id))
        .collect();
    assert_eq!(meshes.len(), 1);
    assert!(meshes.iter().all(|m| m.cast_shadow && m.receive_shadow));
    assert!(orchestrator.diagnostics().is_empty());

    assert!(!orchestrator.poll_model_load());
    assert_eq!(orchestrator.scene().node_count(), node_count + 2);
}

#[test]
fn model_is_not_pickable() {
    let dir = temp_asset_dir("pick");
    std::fs::write(
        dir.join("model.obj"),
        "o wall\nv -50 -50 0\nv 50 -50 0\nv 50 50 0\nv -50 50 0\nf 1 2 3 4\n",
    )
    .unwrap();

    let mut orchestrator = SceneOrchestrator::new(
        config().with_asset_dir(&dir),
        Viewport::new(WIDTH, HEIGHT),
    );
    clear_shapes(&mut orchestrator);
    orchestrator.start_model_load();
    wait_for_model(&mut orchestrator);
    let before = material_colors(&orchestrator);

    assert_eq!(orchestrator.handle_click(CENTER.0, CENTER.1), None);
    assert_eq!(material_colors(&orchestrator), before);
}
