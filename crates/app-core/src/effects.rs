//! Time-bounded transient effects: motion trails behind fast nodes and
//! lightning arcs between far-apart, similarly-hued nodes.

use glam::Vec2;
use rand::prelude::*;
use smallvec::SmallVec;

use crate::audio::AudioLevels;
use crate::constants::*;
use crate::graph::Node;
use crate::metrics::{hue_similarity, safe_distance};

/// Short line segment marking where a fast node just was.
#[derive(Clone, Copy, Debug)]
pub struct Trail {
    pub from: Vec2,
    pub to: Vec2,
    pub hue: f32,
    pub intensity: f32,
    pub timestamp: f64,
    pub duration: f64,
}

/// Jagged polyline between two nodes; endpoints are exact, interior points
/// carry a lateral offset that peaks at the midpoint.
#[derive(Clone, Debug)]
pub struct LightningArc {
    pub points: SmallVec<[Vec2; 16]>,
    pub hue: f32,
    pub intensity: f32,
    pub timestamp: f64,
    pub duration: f64,
}

/// Node pair eligible for a lightning arc, by index into the node slice.
#[derive(Clone, Copy, Debug)]
pub struct ArcCandidate {
    pub start: usize,
    pub end: usize,
    pub distance: f32,
}

/// Trail plus its display opacity at snapshot time.
#[derive(Clone, Copy, Debug)]
pub struct TrailView {
    pub from: Vec2,
    pub to: Vec2,
    pub hue: f32,
    pub intensity: f32,
    pub opacity: f32,
}

/// Arc plus its display opacity at snapshot time.
#[derive(Clone, Debug)]
pub struct ArcView {
    pub points: SmallVec<[Vec2; 16]>,
    pub hue: f32,
    pub intensity: f32,
    pub opacity: f32,
}

/// Per-frame effects output consumed by the renderer.
#[derive(Clone, Debug, Default)]
pub struct EffectsSnapshot {
    pub trails: Vec<TrailView>,
    pub arcs: Vec<ArcView>,
}

/// Node pairs that qualify for lightning this beat: strong hue affinity and
/// a separation that is neither trivial nor off-screen, ranked farthest
/// first so the most dramatic arcs win the per-beat cap.
pub fn arc_candidates(nodes: &[Node]) -> Vec<ArcCandidate> {
    let mut pairs = Vec::new();
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let delta = nodes[j].pos - nodes[i].pos;
            let dist = safe_distance(delta.x, delta.y);
            if dist <= ARC_MIN_DISTANCE || dist >= ARC_MAX_DISTANCE {
                continue;
            }
            if hue_similarity(nodes[i].hue, nodes[j].hue) > ARC_HUE_AFFINITY {
                pairs.push(ArcCandidate {
                    start: i,
                    end: j,
                    distance: dist,
                });
            }
        }
    }
    pairs.sort_by(|a, b| b.distance.total_cmp(&a.distance));
    pairs
}

/// Owns all live effects; prunes them once their duration elapses.
#[derive(Default)]
pub struct EffectsTracker {
    trails: Vec<Trail>,
    arcs: Vec<LightningArc>,
}

impl EffectsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trail_count(&self) -> usize {
        self.trails.len()
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// Record a motion trail from `prev` to the node's current position.
    /// Durations are randomized so simultaneous trails do not all vanish on
    /// the same frame.
    pub fn record_trail(
        &mut self,
        node: &Node,
        prev: Vec2,
        speed: f32,
        now_ms: f64,
        rng: &mut StdRng,
    ) {
        self.trails.push(Trail {
            from: prev,
            to: node.pos,
            hue: node.hue,
            intensity: (speed / TRAIL_INTENSITY_DIVISOR).min(1.0),
            timestamp: now_ms,
            duration: TRAIL_MIN_DURATION_MS + rng.gen::<f64>() * TRAIL_DURATION_SPREAD_MS,
        });
    }

    /// Spawn lightning arcs for the best candidates, capped by the current
    /// energy so a loud beat may arc more pairs than a quiet one.
    pub fn record_lightning(
        &mut self,
        nodes: &[Node],
        candidates: &[ArcCandidate],
        audio: &AudioLevels,
        now_ms: f64,
        rng: &mut StdRng,
    ) {
        let max_arcs = ARC_BASE_COUNT + (audio.energy * ARC_ENERGY_COUNT_GAIN) as usize;
        for pair in candidates.iter().take(max_arcs) {
            let start = &nodes[pair.start];
            let end = &nodes[pair.end];
            self.arcs
                .push(build_arc(start.pos, end.pos, start.hue, audio.energy, now_ms, rng));
        }
    }

    /// Drop every effect whose age has reached its duration.
    pub fn prune(&mut self, now_ms: f64) {
        self.trails
            .retain(|t| now_ms - t.timestamp < t.duration);
        self.arcs.retain(|a| now_ms - a.timestamp < a.duration);
    }

    /// Display snapshot with opacity fading linearly over each effect's
    /// lifetime.
    pub fn snapshot(&self, now_ms: f64) -> EffectsSnapshot {
        let opacity = |timestamp: f64, duration: f64| -> f32 {
            (1.0 - (now_ms - timestamp) / duration).max(0.0) as f32
        };
        EffectsSnapshot {
            trails: self
                .trails
                .iter()
                .map(|t| TrailView {
                    from: t.from,
                    to: t.to,
                    hue: t.hue,
                    intensity: t.intensity,
                    opacity: opacity(t.timestamp, t.duration),
                })
                .collect(),
            arcs: self
                .arcs
                .iter()
                .map(|a| ArcView {
                    points: a.points.clone(),
                    hue: a.hue,
                    intensity: a.intensity,
                    opacity: opacity(a.timestamp, a.duration),
                })
                .collect(),
        }
    }
}

/// Jagged path between two points. The lateral offset is scaled by
/// `sin(pi * t)` so displacement is zero at the endpoints and largest at
/// the midpoint.
fn build_arc(
    start: Vec2,
    end: Vec2,
    hue: f32,
    intensity: f32,
    now_ms: f64,
    rng: &mut StdRng,
) -> LightningArc {
    let delta = end - start;
    let length = safe_distance(delta.x, delta.y);
    let lateral = Vec2::new(-delta.y, delta.x) / length;
    let max_offset = ARC_MAX_OFFSET * intensity;

    let mut points: SmallVec<[Vec2; 16]> = SmallVec::new();
    for i in 0..=ARC_SEGMENTS {
        let t = i as f32 / ARC_SEGMENTS as f32;
        let base = start + delta * t;
        if i == 0 || i == ARC_SEGMENTS {
            points.push(base);
        } else {
            let offset =
                (rng.gen::<f32>() - 0.5) * max_offset * (std::f32::consts::PI * t).sin();
            points.push(base + lateral * offset);
        }
    }

    LightningArc {
        points,
        hue,
        intensity,
        timestamp: now_ms,
        duration: ARC_MIN_DURATION_MS + rng.gen::<f64>() * ARC_DURATION_SPREAD_MS,
    }
}
