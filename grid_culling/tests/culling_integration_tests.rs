//! Integration tests for the culling strategies
//!
//! These tests drive whole frames through the public API with a
//! MockRenderer standing in for the GPU. No GPU required.
//!
//! Run with: cargo test --test culling_integration_tests

use std::time::Duration;
use grid_culling::culling::{CullingConfig, Error, Scene, SceneObject, StrategyKind};
use grid_culling::culling::camera::{CameraPath, InputState};
use grid_culling::culling::render::{DrawMode, MeshHandle, MockRenderer};
use grid_culling::culling::scene::{GridPosition, AABB, ROOT};
use grid_culling::glam::Vec3;
use winit::keyboard::KeyCode;

const MESH: MeshHandle = MeshHandle(1);
const PROXY: MeshHandle = MeshHandle(2);

// ============================================================================
// Helper Functions
// ============================================================================

fn object() -> SceneObject {
    SceneObject {
        mesh: MESH,
        proxy_mesh: PROXY,
        bounds: AABB::new(Vec3::new(-0.4, 0.0, -0.4), Vec3::new(0.4, 0.8, 0.4)),
    }
}

fn create_scene(grid_size: u32, strategy: StrategyKind) -> (Scene, MockRenderer) {
    let mut renderer = MockRenderer::new();
    renderer.register_mesh(MESH, object().bounds);
    let config = CullingConfig { grid_size, strategy, ..Default::default() };
    let scene = Scene::new(&mut renderer, object(), config).unwrap();
    (scene, renderer)
}

/// Look at the whole grid from high above
fn overhead_path(grid_size: u32) -> CameraPath {
    let center = grid_size as f32 / 2.0;
    CameraPath::new(
        vec![Vec3::new(center, 4.0 * grid_size as f32, -center); 3],
        vec![Vec3::new(0.0, -1.0, -0.001); 3],
    ).unwrap()
}

/// Everything with j >= `row` is hidden behind a wall
fn wall_at_row(row: i32) -> impl FnMut(&AABB) -> bool + Send + 'static {
    move |aabb: &AABB| aabb.max.z > -(row as f32) + 0.5
}

fn drawn_cells(renderer: &MockRenderer) -> Vec<GridPosition> {
    renderer.draws_with_mode(DrawMode::Shaded).iter()
        .map(|draw| {
            let center = draw.world_aabb.center();
            GridPosition::new(center.x.round() as i32, (-center.z).round() as i32)
        })
        .collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_integration_stop_and_wait_four_by_four() {
    let (mut scene, mut renderer) = create_scene(4, StrategyKind::StopAndWait);
    assert_eq!(scene.render(&mut renderer).unwrap(), 16);

    let draws = renderer.draws();
    assert_eq!(draws.len(), 32);
    for pair in draws.chunks(2) {
        assert_eq!(pair[0].mode, DrawMode::Probe);
        assert_eq!(pair[1].mode, DrawMode::Shaded);
    }
}

#[test]
fn test_integration_chc_occluded_root() {
    let (mut scene, mut renderer) = create_scene(4, StrategyKind::Chc);
    scene.start_replay(overhead_path(4));
    renderer.set_visibility(|_| false);

    assert_eq!(scene.render(&mut renderer).unwrap(), 0);
    assert_eq!(scene.last_stats().queries_issued, 1);
    let tree = scene.quadtree();
    assert_eq!(tree.len(), 21);
    assert!(tree.children(ROOT).all(|child| tree.node(child).last_visited_frame == 0));
}

#[test]
fn test_integration_pipelined_cold_start() {
    let (mut scene, mut renderer) = create_scene(4, StrategyKind::Pipelined);
    renderer.set_visibility(wall_at_row(2));

    let drawn = scene.render(&mut renderer).unwrap();
    assert_eq!(drawn, 8);
    assert_eq!(renderer.draw_count(DrawMode::Probe), 16);

    let pvs = scene.pvs();
    assert_eq!(pvs.len(), 8);
    assert!(pvs.iter().all(|pos| pos.j < 2));
}

// ============================================================================
// Strategies agree
// ============================================================================

#[test]
fn test_integration_occlusion_strategies_agree_on_visible_set() {
    let mut results = Vec::new();
    for kind in [StrategyKind::StopAndWait, StrategyKind::Pipelined, StrategyKind::Chc] {
        let (mut scene, mut renderer) = create_scene(8, kind);
        scene.start_replay(overhead_path(8));
        renderer.set_visibility(wall_at_row(3));

        // Second frame: the temporal strategies have warmed up
        scene.render(&mut renderer).unwrap();
        renderer.clear();
        let drawn = scene.render(&mut renderer).unwrap();

        let mut cells = drawn_cells(&renderer);
        cells.sort_by_key(|pos| (pos.i, pos.j));
        assert_eq!(drawn, 24, "{}", kind);
        results.push(cells);
    }
    assert_eq!(results[0], results[1]);
    assert_eq!(results[1], results[2]);
}

#[test]
fn test_integration_chc_issues_fewer_queries_than_stop_and_wait() {
    let (mut chc, mut chc_renderer) = create_scene(16, StrategyKind::Chc);
    let (mut saw, mut saw_renderer) = create_scene(16, StrategyKind::StopAndWait);
    for (scene, renderer) in [(&mut chc, &mut chc_renderer), (&mut saw, &mut saw_renderer)] {
        scene.start_replay(overhead_path(16));
        renderer.set_visibility(wall_at_row(4));
        scene.render(renderer).unwrap();
    }
    assert_eq!(chc.last_stats().drawn, saw.last_stats().drawn);
    assert!(chc.last_stats().queries_issued < saw.last_stats().queries_issued);
}

#[test]
fn test_integration_pipelined_avoids_stalls_when_coherent() {
    let (mut scene, mut renderer) = create_scene(8, StrategyKind::Pipelined);
    scene.start_replay(overhead_path(8));
    renderer.set_latency(2);

    scene.render(&mut renderer).unwrap();
    renderer.clear();
    scene.render(&mut renderer).unwrap();
    // Everything came from the PVS: no result was needed this frame
    assert_eq!(renderer.blocking_stalls(), 0);
    assert_eq!(scene.last_stats().drawn, 64);
}

#[test]
fn test_integration_switching_every_frame() {
    let (mut scene, mut renderer) = create_scene(8, StrategyKind::Unculled);
    scene.start_replay(overhead_path(8));
    renderer.set_visibility(wall_at_row(6));

    for round in 0..3 {
        for kind in StrategyKind::ALL {
            scene.set_strategy(kind);
            let drawn = scene.render(&mut renderer).unwrap();
            let expected = if kind.uses_queries() { 48 } else { 64 };
            assert_eq!(drawn, expected, "{} (round {})", kind, round);
        }
    }
}

// ============================================================================
// Camera paths
// ============================================================================

#[test]
fn test_integration_record_and_replay_path() {
    let (mut scene, mut renderer) = create_scene(4, StrategyKind::Frustum);
    let mut input = InputState::new();
    scene.start_recording(2);

    input.press(KeyCode::KeyS);
    for _ in 0..20 {
        scene.update(Duration::from_millis(100), &input);
        scene.render(&mut renderer).unwrap();
    }
    input.release(KeyCode::KeyS);
    let recorded = scene.take_recorded_path().unwrap().unwrap();
    assert_eq!(recorded.segment_count(), 2);
    // Backing away along +Z
    assert!(recorded.positions()[2].z > recorded.positions()[0].z);

    let file = std::env::temp_dir().join("grid_culling_integration_path.txt");
    recorded.save(&file).unwrap();
    let loaded = CameraPath::load(&file).unwrap();
    std::fs::remove_file(&file).ok();
    assert_eq!(loaded.segment_count(), 2);

    scene.start_replay(loaded);
    for _ in 0..25 {
        scene.update(Duration::from_millis(100), &input);
        scene.render(&mut renderer).unwrap();
    }
    assert!(scene.camera().is_free_fly());

    let record = scene.take_fps_record().unwrap();
    assert!(record.is_finished());
    let mut out = Vec::new();
    record.write_to(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("0.0 "));
    assert_eq!(text.lines().count(), record.samples().len());
}

#[test]
fn test_integration_malformed_path_is_rejected() {
    let result = CameraPath::parse("2\n0 0 0\n1 1 1\n");
    assert!(matches!(result, Err(Error::ParseError(_))));
}
