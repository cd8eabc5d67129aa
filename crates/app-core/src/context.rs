//! The owned simulation context: graph, cluster state, effects, modes and
//! the per-frame pipeline, created once and replaced wholesale on
//! regeneration. Collaborators (renderer, UI) talk to it through narrow
//! accessors instead of shared globals.

use std::sync::atomic::{AtomicBool, Ordering};

use glam::Vec2;
use rand::prelude::*;

use crate::audio::AudioLevels;
use crate::cluster::ClusterController;
use crate::effects::{arc_candidates, EffectsSnapshot, EffectsTracker};
use crate::error::SimError;
use crate::forces::apply_forces;
use crate::graph::{clamp_node_count, complete_edges, spawn_nodes, Edge, Node};
use crate::modes::ModeManager;
use crate::state::{RenderNode, Viewport};

/// Renderer-facing view of one frame.
#[derive(Clone, Debug, Default)]
pub struct FrameSnapshot {
    pub nodes: Vec<RenderNode>,
    pub effects: EffectsSnapshot,
}

/// One generation of the simulation. All node and cluster state lives here;
/// a regeneration replaces the graph in place behind the update guard.
pub struct Simulation {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    clusters: ClusterController,
    effects: EffectsTracker,
    modes: ModeManager,
    rng: StdRng,
    viewport: Viewport,
    /// Single in-flight update per generation; a second overlapping request
    /// is rejected, never queued.
    updating: AtomicBool,
    debug: bool,
}

/// Clears the update flag when the holding scope ends, including on early
/// returns.
struct UpdateGuard<'a>(&'a AtomicBool);

impl<'a> UpdateGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for UpdateGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Simulation {
    /// Build a simulation of `node_count` nodes (clamped to the supported
    /// range) with an initial cluster layout. `seed` makes whole runs
    /// reproducible.
    pub fn new(node_count: usize, viewport: Viewport, seed: u64) -> Self {
        let n = clamp_node_count(node_count);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut nodes = spawn_nodes(n, &mut rng);
        let edges = complete_edges(n);
        let mut clusters = ClusterController::new();
        clusters.force_recompute(&mut nodes, viewport, 0.0);
        log::info!("generated complete graph: {} nodes, {} edges", n, edges.len());
        Self {
            nodes,
            edges,
            clusters,
            effects: EffectsTracker::new(),
            modes: ModeManager::new(),
            rng,
            viewport,
            updating: AtomicBool::new(false),
            debug: false,
        }
    }

    /// Replace the graph with a fresh `node_count`-node generation.
    ///
    /// Rejected (no-op, warning) when another update currently holds the
    /// guard; the existing generation stays intact.
    pub fn regenerate(&mut self, node_count: usize, now_ms: f64) -> Result<(), SimError> {
        let Some(_guard) = UpdateGuard::try_acquire(&self.updating) else {
            log::warn!("graph update already in progress, regeneration ignored");
            return Err(SimError::UpdateInProgress);
        };
        let n = clamp_node_count(node_count);
        self.nodes = spawn_nodes(n, &mut self.rng);
        self.edges = complete_edges(n);
        self.effects = EffectsTracker::new();
        self.clusters
            .force_recompute(&mut self.nodes, self.viewport, now_ms);
        log::info!(
            "regenerated complete graph: {} nodes, {} edges",
            n,
            self.edges.len()
        );
        Ok(())
    }

    /// Advance one frame: cluster maintenance, forces and integration,
    /// effect spawning and pruning. Skipped with a warning if an update is
    /// already in flight.
    pub fn step(&mut self, audio: &AudioLevels, viewport: Viewport, now_ms: f64, dt: f32) {
        let Some(_guard) = UpdateGuard::try_acquire(&self.updating) else {
            log::warn!("graph update in progress, frame step skipped");
            return;
        };
        self.viewport = viewport;

        self.clusters
            .maybe_recompute(&mut self.nodes, viewport, now_ms);

        apply_forces(
            &mut self.nodes,
            &self.edges,
            &self.clusters,
            self.modes.active(),
            &mut self.effects,
            audio,
            viewport,
            &mut self.rng,
            now_ms,
            dt,
        );

        if audio.is_beat {
            let candidates = arc_candidates(&self.nodes);
            self.effects
                .record_lightning(&self.nodes, &candidates, audio, now_ms, &mut self.rng);
        }
        self.effects.prune(now_ms);
    }

    /// Switch the active visualization mode. Node positions and velocities
    /// carry over so the transition is fluid.
    pub fn set_mode(&mut self, name: &str) -> Result<(), SimError> {
        self.modes.set_mode(name)
    }

    pub fn current_mode(&self) -> &'static str {
        self.modes.current_name()
    }

    pub fn available_modes(&self) -> Vec<&'static str> {
        self.modes.available_modes()
    }

    /// Debug-overlay toggle from the UI; acknowledged but has no effect on
    /// the simulation.
    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
        log::info!("debug overlay {}", if enabled { "on" } else { "off" });
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Move one node directly (drag interactions, scripted setups). The
    /// next step resumes from the new position.
    pub fn set_node_position(&mut self, index: usize, pos: Vec2) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pos = pos;
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn clusters(&self) -> &ClusterController {
        &self.clusters
    }

    pub fn is_updating(&self) -> bool {
        self.updating.load(Ordering::SeqCst)
    }

    /// Renderer-facing view of the current frame.
    pub fn snapshot(&self, now_ms: f64) -> FrameSnapshot {
        FrameSnapshot {
            nodes: self
                .nodes
                .iter()
                .map(|n| RenderNode {
                    x: n.pos.x,
                    y: n.pos.y,
                    scale: n.scale,
                    glow: n.glow,
                    hue: n.hue,
                })
                .collect(),
            effects: self.effects.snapshot(now_ms),
        }
    }
}
