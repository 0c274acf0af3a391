//! Scrubbing behavior of the display cache against an in-memory scene

use layerscrub_core::{BoundingVolume, DisplayError, Point3, Vector3};
use layerscrub_visualizer::{
    AlignmentOffset, DisplayCache, LayerRole, LoadOutcome, MemoryScene, ObjectId, ParsedToolpath,
    PreviewSession, ToolpathParser,
};

const TWO_BANDS: &str = "\
G1 X0 Y0 Z0.2
G1 X6 Y0 E1.0
G1 X6 Y4 E2.0
G1 Z0.4
G1 X6 Y9 E3.0
";

fn two_bands() -> ParsedToolpath {
    ToolpathParser::default().parse_str(TWO_BANDS)
}

/// `count` layers, each one 10mm path
fn stacked(count: usize) -> ParsedToolpath {
    let mut gcode = String::new();
    for i in 0..count {
        let z = 0.2 * (i + 1) as f64;
        gcode.push_str(&format!("G0 X0 Y0 Z{:.1}\n", z));
        gcode.push_str(&format!("G1 X10 Y0 E{}\n", i + 1));
    }
    ToolpathParser::default().parse_str(&gcode)
}

fn close(a: Point3, b: Point3) -> bool {
    a.distance(b) < 1e-9
}

#[test]
fn test_second_layer_at_half_progress() {
    let parsed = two_bands();
    let mut scene = MemoryScene::new();
    let mut cache = DisplayCache::<ObjectId>::default();

    let summary = cache.update(&mut scene, &parsed.layers, 1, 0.5).unwrap();

    assert_eq!(cache.high_water_mark(), Some(0));
    assert_eq!(cache.ghost_layer_indices().collect::<Vec<_>>(), vec![0]);
    assert_eq!(cache.ghost_handles(0).unwrap().len(), 1);
    let ghosts = scene.paths(LayerRole::Ghost);
    assert_eq!(ghosts.len(), 1);
    assert_eq!(ghosts[0], parsed.layers[0].paths()[0].points());

    let active = scene.paths(LayerRole::Active);
    assert_eq!(active.len(), 1);
    assert_eq!(summary.active_length, 2.5);
    assert_eq!(active[0][0], Point3::new(6.0, 4.0, 0.4));
    assert!(close(active[0][1], Point3::new(6.0, 6.5, 0.4)));

    let markers = scene.markers();
    assert_eq!(markers.len(), 1);
    assert!(close(markers[0], Point3::new(6.0, 6.5, 0.4)));
}

#[test]
fn test_step_up_adds_exactly_one_ghost_layer() {
    let parsed = stacked(10);
    let mut scene = MemoryScene::new();
    let mut cache = DisplayCache::<ObjectId>::default();

    for k in 1..9 {
        cache.update(&mut scene, &parsed.layers, k, 0.5).unwrap();
        let summary = cache.update(&mut scene, &parsed.layers, k + 1, 0.5).unwrap();
        assert_eq!(summary.ghost_layers_added, vec![k]);
        assert!(summary.ghost_layers_removed.is_empty());
        assert_eq!(summary.ghost_paths_added, 1);
        assert_eq!(cache.high_water_mark(), Some(k));
        assert!(cache.ghosts_contiguous());
    }
}

#[test]
fn test_step_down_removes_exactly_one_ghost_layer() {
    let parsed = stacked(10);
    let mut scene = MemoryScene::new();
    let mut cache = DisplayCache::<ObjectId>::default();

    for k in (1..9).rev() {
        cache.update(&mut scene, &parsed.layers, k + 1, 0.5).unwrap();
        let summary = cache.update(&mut scene, &parsed.layers, k, 0.5).unwrap();
        assert_eq!(summary.ghost_layers_removed, vec![k]);
        assert!(summary.ghost_layers_added.is_empty());
        assert_eq!(cache.high_water_mark(), Some(k - 1));
        assert_eq!(scene.paths(LayerRole::Ghost).len(), k);
    }
}

#[test]
fn test_reset_twice() {
    let parsed = stacked(4);
    let mut scene = MemoryScene::new();
    let mut cache = DisplayCache::<ObjectId>::default();
    cache.update(&mut scene, &parsed.layers, 3, 1.0).unwrap();

    assert_eq!(cache.reset(&mut scene), 0);
    assert!(cache.is_empty());
    assert!(scene.is_empty());

    assert_eq!(cache.reset(&mut scene), 0);
    assert!(cache.is_empty());
    assert_eq!(cache.high_water_mark(), None);
    assert_eq!(scene.redraw_depth(), 0);
}

#[test]
fn test_marker_is_raw_end_plus_offset() {
    let parsed = stacked(3);
    let offset = Vector3::new(-3.0, 7.5, 0.25);
    let mut scene = MemoryScene::new();
    let mut cache = DisplayCache::<ObjectId>::default();
    cache.set_alignment(AlignmentOffset::new(offset));

    let summary = cache.update(&mut scene, &parsed.layers, 2, 1.0).unwrap();
    let raw_end = parsed.layers[2].paths()[0].end();
    assert_eq!(summary.marker, Some(raw_end + offset));
    assert_eq!(scene.markers(), vec![raw_end + offset]);

    for (ghost, layer) in scene.paths(LayerRole::Ghost).iter().zip(&parsed.layers) {
        let expected: Vec<Point3> = layer.paths()[0].points().iter().map(|p| *p + offset).collect();
        assert_eq!(ghost.to_vec(), expected);
    }
}

#[test]
fn test_zero_length_layer_at_full_progress() {
    // nozzle primes in place: extrusion without any XY travel
    let parsed = ToolpathParser::default().parse_str("G1 X3 Y3 Z0.2\nG1 X3 Y3 E1\n");
    assert_eq!(parsed.layers[0].path_count(), 1);
    assert_eq!(parsed.layers[0].total_length(), 0.0);

    let mut scene = MemoryScene::new();
    let mut cache = DisplayCache::<ObjectId>::default();

    let summary = cache.update(&mut scene, &parsed.layers, 0, 1.0).unwrap();
    assert_eq!(summary.active_paths, 1);
    assert_eq!(summary.marker, Some(Point3::new(3.0, 3.0, 0.2)));
    assert_eq!(scene.paths(LayerRole::Active).len(), 1);

    let summary = cache.update(&mut scene, &parsed.layers, 0, 0.0).unwrap();
    assert_eq!(summary.active_paths, 0);
    assert_eq!(summary.marker, None);
    assert!(scene.markers().is_empty());
}

#[test]
fn test_out_of_range_arguments() {
    let parsed = stacked(2);
    let mut scene = MemoryScene::new();
    let mut cache = DisplayCache::<ObjectId>::default();

    assert!(matches!(
        cache.update(&mut scene, &parsed.layers, 2, 0.0),
        Err(DisplayError::InvalidArgument {
            argument: "target_layer",
            ..
        })
    ));
    assert!(matches!(
        cache.update(&mut scene, &parsed.layers, 0, 1.0001),
        Err(DisplayError::InvalidArgument {
            argument: "progress",
            ..
        })
    ));
    assert!(cache.is_empty());
}

#[test]
fn test_delete_failures_do_not_leak_bookkeeping() {
    let parsed = stacked(5);
    let mut scene = MemoryScene::new();
    let mut cache = DisplayCache::<ObjectId>::default();
    cache.update(&mut scene, &parsed.layers, 4, 0.5).unwrap();

    scene.set_fail_deletes(true);
    let summary = cache.update(&mut scene, &parsed.layers, 1, 0.5).unwrap();
    assert!(summary.scene_failures > 0);
    assert_eq!(cache.high_water_mark(), Some(0));
    assert!(cache.ghosts_contiguous());
    assert_eq!(cache.active_handles().len(), 1);

    assert!(cache.reset(&mut scene) > 0);
    assert!(cache.is_empty());
    assert_eq!(scene.redraw_depth(), 0);
}

#[test]
fn test_externally_deleted_handle_is_tolerated() {
    let parsed = stacked(3);
    let mut scene = MemoryScene::new();
    let mut cache = DisplayCache::<ObjectId>::default();
    cache.update(&mut scene, &parsed.layers, 2, 1.0).unwrap();

    let marker = *cache.marker_handle().unwrap();
    assert!(scene.remove_externally(marker));

    let summary = cache.update(&mut scene, &parsed.layers, 2, 0.5).unwrap();
    assert_eq!(summary.scene_failures, 1);
    assert_eq!(scene.markers().len(), 1);
    assert_eq!(scene.paths(LayerRole::Active).len(), 1);
}

#[test]
fn test_one_redraw_scope_per_call() {
    let parsed = stacked(6);
    let mut scene = MemoryScene::new();
    let mut cache = DisplayCache::<ObjectId>::default();

    cache.update(&mut scene, &parsed.layers, 5, 0.3).unwrap();
    cache.update(&mut scene, &parsed.layers, 2, 0.9).unwrap();
    cache.reset(&mut scene);

    let stats = scene.stats();
    assert_eq!(stats.redraw_scopes, 3);
    assert_eq!(stats.redraws, 3);
    assert_eq!(scene.redraw_depth(), 0);
}

#[test]
fn test_session_load_aligns_and_shows_first_layer() {
    let parsed = stacked(3);
    let source = BoundingVolume::from_corners(
        Point3::new(-5.0, -5.0, 0.0),
        Point3::new(5.0, 5.0, 0.6),
    );
    let mut scene = MemoryScene::new();
    let mut session = PreviewSession::<ObjectId>::default();

    let outcome = session.load(&mut scene, parsed, Some(&source)).unwrap();
    let LoadOutcome::Loaded { layers, summary } = outcome else {
        panic!("expected a loaded toolpath");
    };
    assert_eq!(layers, 3);
    assert_eq!(summary.active_length, 10.0);

    // extrusion ends at x 10, y 0 on every layer, z 0.2..0.6
    let offset = session.alignment().vector();
    assert!(close(offset, Vector3::new(-10.0, 0.0, -0.2)));
    assert_eq!(
        session.layer_label(0).as_deref(),
        Some("Z-Level: 0.00mm (Layer 1/3)")
    );
    assert_eq!(
        session.layer_label(2).as_deref(),
        Some("Z-Level: 0.40mm (Layer 3/3)")
    );
}

#[test]
fn test_session_flush_applies_latest_request() {
    let mut scene = MemoryScene::new();
    let mut session = PreviewSession::<ObjectId>::default();
    session.load(&mut scene, stacked(5), None).unwrap();

    session.request(1, 0.2);
    session.request(3, 0.4);
    session.slider_request(4, 500);
    let summary = session.flush(&mut scene).unwrap().unwrap();
    assert_eq!(summary.target_layer, 4);
    assert_eq!(summary.progress, 0.5);
    assert_eq!(session.cache().high_water_mark(), Some(3));
    assert!(session.flush(&mut scene).unwrap().is_none());
}

#[test]
fn test_session_reload_and_close() {
    let mut scene = MemoryScene::new();
    let mut session = PreviewSession::<ObjectId>::default();
    session.load(&mut scene, stacked(4), None).unwrap();
    session.scrub(&mut scene, 3, 1.0).unwrap();

    let outcome = session.load(&mut scene, ParsedToolpath::empty(), None).unwrap();
    assert_eq!(outcome, LoadOutcome::Empty);
    assert!(scene.is_empty());
    assert_eq!(session.layer_count(), 0);

    session.load(&mut scene, two_bands(), None).unwrap();
    assert!(!scene.is_empty());
    assert_eq!(session.close(&mut scene), 0);
    assert!(scene.is_empty());
    assert!(session.cache().is_empty());
}
