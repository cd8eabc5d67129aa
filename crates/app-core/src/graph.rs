//! Graph data: nodes, undirected complete-graph edges and batch generation.

use glam::Vec2;
use rand::prelude::*;

use crate::constants::*;

/// One simulated node. Owned by the simulation context, mutated every step
/// and replaced wholesale on regeneration.
#[derive(Clone, Debug)]
pub struct Node {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Presented hue after audio-reactive shifting, degrees in \[0, 360).
    pub hue: f32,
    /// Hue assigned at generation; the anchor for audio hue shifts.
    pub base_hue: f32,
    /// Index into the current cluster-center list, if assigned.
    pub cluster: Option<usize>,
    /// Confidence of the current cluster assignment, \[0, 1\].
    pub color_similarity: f32,
    pub scale: f32,
    pub glow: f32,
    /// Free-running phase driving the per-node drift oscillation.
    pub phase: f32,
    /// Phase of the audio-reactive size pulse.
    pub pulse_phase: f32,
    /// Timestamp (ms) of the last simulation step that touched this node.
    pub last_update: f64,
}

impl Node {
    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// Undirected edge; `source < target` by construction, so each unordered
/// pair appears exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: u32,
    pub target: u32,
}

/// Clamp a requested node count to the supported range, warning when the
/// request is out of range. The previous behavior of silently failing is
/// deliberately avoided; the caller always gets a usable count.
pub fn clamp_node_count(requested: usize) -> usize {
    let n = requested.clamp(MIN_NODE_COUNT, MAX_NODE_COUNT);
    if n != requested {
        log::warn!(
            "node count {} outside [{}, {}], clamped to {}",
            requested,
            MIN_NODE_COUNT,
            MAX_NODE_COUNT,
            n
        );
    }
    n
}

/// Create `count` nodes evenly spaced on the spawn ring, hues spread once
/// around the color wheel.
pub fn spawn_nodes(count: usize, rng: &mut StdRng) -> Vec<Node> {
    (0..count)
        .map(|i| {
            let t = i as f32 / count as f32;
            let angle = t * std::f32::consts::TAU;
            let hue = t * 360.0;
            Node {
                id: i as u32,
                pos: Vec2::new(angle.cos(), angle.sin()) * SPAWN_RING_RADIUS,
                vel: Vec2::ZERO,
                hue,
                base_hue: hue,
                cluster: None,
                color_similarity: 0.0,
                scale: 1.0,
                glow: 1.0,
                phase: rng.gen::<f32>() * std::f32::consts::TAU,
                pulse_phase: rng.gen::<f32>() * std::f32::consts::TAU,
                last_update: 0.0,
            }
        })
        .collect()
}

/// All `n * (n - 1) / 2` edges of the complete graph over `count` nodes.
pub fn complete_edges(count: usize) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(count * (count.saturating_sub(1)) / 2);
    for i in 0..count as u32 {
        for j in (i + 1)..count as u32 {
            edges.push(Edge {
                source: i,
                target: j,
            });
        }
    }
    edges
}
