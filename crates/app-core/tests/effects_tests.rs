// Transient effects: candidate filtering, arc geometry, caps and pruning.

use app_core::{arc_candidates, AudioLevels, EffectsTracker, Node, ARC_MAX_OFFSET, ARC_SEGMENTS};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn test_node(id: u32, pos: Vec2, hue: f32) -> Node {
    Node {
        id,
        pos,
        vel: Vec2::ZERO,
        hue,
        base_hue: hue,
        cluster: None,
        color_similarity: 0.0,
        scale: 1.0,
        glow: 1.0,
        phase: 0.0,
        pulse_phase: 0.0,
        last_update: 0.0,
    }
}

fn audio_with_energy(energy: f32) -> AudioLevels {
    AudioLevels {
        energy,
        is_beat: true,
        ..AudioLevels::default()
    }
}

#[test]
fn candidates_require_hue_affinity_and_a_distance_band() {
    let nodes = vec![
        test_node(0, Vec2::new(0.0, 0.0), 100.0),
        test_node(1, Vec2::new(400.0, 0.0), 101.0), // qualifies against node 0
        test_node(2, Vec2::new(100.0, 0.0), 100.0), // too close to everything similar
        test_node(3, Vec2::new(900.0, 0.0), 250.0), // dissimilar hue
        test_node(4, Vec2::new(0.0, 500.0), 200.0), // dissimilar hue
    ];
    let candidates = arc_candidates(&nodes);
    assert_eq!(candidates.len(), 1, "exactly one qualifying pair: {candidates:?}");
    assert_eq!((candidates[0].start, candidates[0].end), (0, 1));
    assert!((candidates[0].distance - 400.0).abs() < 1e-3);
}

#[test]
fn candidates_rank_farthest_first() {
    let nodes = vec![
        test_node(0, Vec2::new(0.0, 0.0), 40.0),
        test_node(1, Vec2::new(350.0, 0.0), 40.0),
        test_node(2, Vec2::new(700.0, 0.0), 40.0),
    ];
    let candidates = arc_candidates(&nodes);
    assert_eq!(candidates.len(), 3);
    assert!((candidates[0].distance - 700.0).abs() < 1e-3, "farthest pair leads");
    for pair in candidates.windows(2) {
        assert!(
            pair[0].distance >= pair[1].distance,
            "candidates must be sorted by descending distance"
        );
    }
}

#[test]
fn arcs_have_exact_endpoints_and_bounded_offsets() {
    let nodes = vec![
        test_node(0, Vec2::new(0.0, 0.0), 120.0),
        test_node(1, Vec2::new(400.0, 0.0), 120.0),
    ];
    let candidates = arc_candidates(&nodes);
    let mut effects = EffectsTracker::new();
    let mut rng = StdRng::seed_from_u64(5);
    effects.record_lightning(&nodes, &candidates, &audio_with_energy(1.0), 0.0, &mut rng);
    assert_eq!(effects.arc_count(), 1);

    let snapshot = effects.snapshot(0.0);
    let arc = &snapshot.arcs[0];
    assert_eq!(arc.points.len(), ARC_SEGMENTS + 1);
    assert_eq!(arc.points[0], nodes[0].pos, "arc starts at the source node");
    assert_eq!(arc.points[ARC_SEGMENTS], nodes[1].pos, "arc ends at the target node");
    assert!((arc.opacity - 1.0).abs() < 1e-6, "fresh arc is fully opaque");

    // The chord is horizontal, so lateral displacement is purely vertical
    // and bounded by the intensity-scaled maximum.
    for point in arc.points.iter() {
        assert!(
            point.y.abs() <= ARC_MAX_OFFSET * 0.5 + 1e-3,
            "offset {} beyond the midpoint bound",
            point.y
        );
    }
}

#[test]
fn arc_count_is_capped_by_energy() {
    // Five qualifying pairs on a line: (0,1) (0,2) (1,2) (1,3) (2,3).
    let nodes = vec![
        test_node(0, Vec2::new(0.0, 0.0), 0.0),
        test_node(1, Vec2::new(310.0, 0.0), 0.0),
        test_node(2, Vec2::new(620.0, 0.0), 0.0),
        test_node(3, Vec2::new(930.0, 0.0), 0.0),
    ];
    let candidates = arc_candidates(&nodes);
    assert_eq!(candidates.len(), 5);

    let mut rng = StdRng::seed_from_u64(0);
    let mut effects = EffectsTracker::new();
    effects.record_lightning(&nodes, &candidates, &audio_with_energy(0.0), 0.0, &mut rng);
    assert_eq!(effects.arc_count(), 3, "zero energy caps at the base count");

    let mut effects = EffectsTracker::new();
    effects.record_lightning(&nodes, &candidates, &audio_with_energy(1.0), 0.0, &mut rng);
    assert_eq!(effects.arc_count(), 5, "full energy admits every candidate here");
}

#[test]
fn trails_carry_speed_intensity_and_expire() {
    let mut effects = EffectsTracker::new();
    let mut rng = StdRng::seed_from_u64(9);
    let node = test_node(0, Vec2::new(10.0, 0.0), 30.0);
    effects.record_trail(&node, Vec2::new(0.0, 0.0), 10.0, 1_000.0, &mut rng);
    assert_eq!(effects.trail_count(), 1);

    let snapshot = effects.snapshot(1_000.0);
    let trail = &snapshot.trails[0];
    assert_eq!(trail.from, Vec2::new(0.0, 0.0));
    assert_eq!(trail.to, node.pos);
    assert!((trail.intensity - 0.5).abs() < 1e-6, "speed 10 maps to half intensity");
    assert!((trail.opacity - 1.0).abs() < 1e-6);

    // Still alive within the minimum duration, faded but present.
    effects.prune(1_100.0);
    assert_eq!(effects.trail_count(), 1);
    let faded = &effects.snapshot(1_100.0).trails[0];
    assert!(faded.opacity > 0.0 && faded.opacity < 1.0);

    // Gone once the randomized duration (at most 500 ms) has fully elapsed.
    effects.prune(1_501.0);
    assert_eq!(effects.trail_count(), 0);
}

#[test]
fn arcs_expire_within_their_duration_band() {
    let nodes = vec![
        test_node(0, Vec2::new(0.0, 0.0), 10.0),
        test_node(1, Vec2::new(500.0, 0.0), 10.0),
    ];
    let candidates = arc_candidates(&nodes);
    let mut effects = EffectsTracker::new();
    let mut rng = StdRng::seed_from_u64(2);
    effects.record_lightning(&nodes, &candidates, &audio_with_energy(0.5), 0.0, &mut rng);
    assert_eq!(effects.arc_count(), 1);

    effects.prune(150.0);
    assert_eq!(effects.arc_count(), 1, "arcs live at least 200 ms");
    effects.prune(501.0);
    assert_eq!(effects.arc_count(), 0, "arcs never outlive 500 ms");
}
