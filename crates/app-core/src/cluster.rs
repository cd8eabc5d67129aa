//! Periodic cluster layout: golden-ratio-cycled cluster counts, centers on
//! a fibonacci spiral, and hue/proximity node assignment.

use glam::Vec2;

use crate::constants::*;
use crate::graph::Node;
use crate::metrics::{hue_similarity, safe_distance};
use crate::state::Viewport;

/// Ephemeral attractor point; the whole list is replaced on each recompute.
#[derive(Clone, Copy, Debug)]
pub struct ClusterCenter {
    pub pos: Vec2,
    pub hue: f32,
    pub radius: f32,
}

/// Owns the cluster layout and the slow recompute schedule.
///
/// `maybe_recompute` is called once per frame but inspects the clock at most
/// once per ~16 ms and performs the heavy relayout only every 15 s.
pub struct ClusterController {
    centers: Vec<ClusterCenter>,
    phase: f32,
    last_recompute_ms: f64,
    last_clock_ms: f64,
    transition_progress: f32,
}

impl ClusterController {
    pub fn new() -> Self {
        Self {
            centers: Vec::new(),
            phase: 0.0,
            last_recompute_ms: 0.0,
            last_clock_ms: f64::NEG_INFINITY,
            transition_progress: 0.0,
        }
    }

    pub fn centers(&self) -> &[ClusterCenter] {
        &self.centers
    }

    /// Fade-in ramp of the current layout, \[0, 1\] over the 2 s after a
    /// recompute.
    pub fn transition_progress(&self) -> f32 {
        self.transition_progress
    }

    /// Phase accumulator position, \[0, 1); drives both the cluster count
    /// cycle and the sine weighting of the attraction force.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Throttled recompute entry point, called once per simulation step.
    pub fn maybe_recompute(&mut self, nodes: &mut [Node], viewport: Viewport, now_ms: f64) {
        if now_ms - self.last_clock_ms < CLUSTER_CLOCK_THROTTLE_MS {
            return;
        }
        self.last_clock_ms = now_ms;

        let elapsed = now_ms - self.last_recompute_ms;
        self.transition_progress = (elapsed / CLUSTER_TRANSITION_MS).min(1.0) as f32;
        if elapsed > CLUSTER_RECOMPUTE_MS {
            self.advance_phase();
            self.recompute(nodes, viewport, now_ms);
        }
    }

    /// Unconditional relayout, used when a graph is (re)generated so nodes
    /// never sit unassigned waiting for the slow schedule.
    pub fn force_recompute(&mut self, nodes: &mut [Node], viewport: Viewport, now_ms: f64) {
        self.recompute(nodes, viewport, now_ms);
    }

    fn advance_phase(&mut self) {
        self.phase = (self.phase + CLUSTER_PHASE_STEP) % 1.0;
    }

    fn recompute(&mut self, nodes: &mut [Node], viewport: Viewport, now_ms: f64) {
        self.last_recompute_ms = now_ms;
        self.transition_progress = 0.0;

        let count = self.cluster_count();
        let screen_radius = viewport.min_extent() * CLUSTER_SCREEN_FRACTION;

        self.centers.clear();
        if count == 1 {
            self.centers.push(ClusterCenter {
                pos: Vec2::ZERO,
                hue: 0.0,
                radius: 0.0,
            });
        } else {
            // Fibonacci spiral spreads centers spatially; the same golden
            // rotation spreads their hues chromatically.
            for i in 0..count {
                let golden = i as f32 * GOLDEN_RATIO;
                let angle = golden * std::f32::consts::TAU;
                let spiral_radius = screen_radius * (i as f32 / count as f32).sqrt();
                self.centers.push(ClusterCenter {
                    pos: Vec2::new(angle.cos(), angle.sin()) * spiral_radius,
                    hue: (golden * 360.0) % 360.0,
                    radius: CLUSTER_BASE_RADIUS + spiral_radius * CLUSTER_RADIUS_SPREAD,
                });
            }
        }

        self.assign_nodes(nodes, screen_radius);
    }

    /// Cluster count for the current phase: 1 to 9 on the golden-modulated
    /// half of the cycle, collapsing to a single cluster on the other half.
    fn cluster_count(&self) -> usize {
        if self.phase < 0.5 {
            let s = (self.phase * std::f32::consts::PI * GOLDEN_RATIO).sin();
            1 + (8.0 * s * s) as usize
        } else {
            1
        }
    }

    /// Each node picks the center maximizing hue similarity blended with
    /// proximity; ties break toward the lowest center index. The winning
    /// score is kept as the node's assignment confidence.
    fn assign_nodes(&self, nodes: &mut [Node], screen_radius: f32) {
        for node in nodes.iter_mut() {
            let mut best_score = -1.0_f32;
            let mut best = 0usize;
            for (idx, center) in self.centers.iter().enumerate() {
                let color = hue_similarity(node.hue, center.hue);
                let delta = center.pos - node.pos;
                let proximity =
                    1.0 / (1.0 + safe_distance(delta.x, delta.y) / screen_radius.max(1.0));
                let score = color * CLUSTER_HUE_WEIGHT + proximity * CLUSTER_PROXIMITY_WEIGHT;
                if score > best_score {
                    best_score = score;
                    best = idx;
                }
            }
            node.cluster = Some(best);
            node.color_similarity = best_score.max(0.0);
        }
    }
}

impl Default for ClusterController {
    fn default() -> Self {
        Self::new()
    }
}
