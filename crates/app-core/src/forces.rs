//! Per-frame force accumulation and integration.
//!
//! Forces are gathered per node in a fixed order (pairwise repulsion,
//! cluster attraction, edge springs, mode force, phase drift), integrated
//! with audio-adaptive damping and a speed clamp, and followed by a
//! boundary pass whose absolute clamp is authoritative: no node ever ends a
//! step outside the render bounds. A single explicit-Euler step per frame is
//! enough because damping keeps the system stable.

use glam::Vec2;
use rand::prelude::*;

use crate::audio::AudioLevels;
use crate::cluster::ClusterController;
use crate::constants::*;
use crate::effects::EffectsTracker;
use crate::graph::{Edge, Node};
use crate::metrics::{hue_similarity, safe_distance};
use crate::modes::VisualizationMode;
use crate::state::Viewport;

/// Advance every node by one frame.
#[allow(clippy::too_many_arguments)]
pub fn apply_forces(
    nodes: &mut [Node],
    edges: &[Edge],
    clusters: &ClusterController,
    mode: &dyn VisualizationMode,
    effects: &mut EffectsTracker,
    audio: &AudioLevels,
    viewport: Viewport,
    rng: &mut StdRng,
    now_ms: f64,
    dt: f32,
) {
    let total = nodes.len();
    if total == 0 {
        return;
    }

    // At the nominal 60 Hz cadence this is exactly 1; slower or faster hosts
    // get a bounded correction instead of a speed change.
    let frame_scale = (dt * TARGET_FPS).clamp(FRAME_SCALE_MIN, FRAME_SCALE_MAX);
    let time_sec = now_ms / 1000.0;
    let bounds = viewport.min_extent().max(1.0) * BOUNDS_VIEWPORT_SCALE;

    // Beats kick every node's size; the pulse phase restarts so the decay
    // reads as one synchronized flash.
    if audio.is_beat {
        for node in nodes.iter_mut() {
            node.scale = BEAT_SCALE_BASE + audio.energy * BEAT_SCALE_ENERGY_GAIN;
            node.pulse_phase = 0.0;
        }
    }

    let mut forces = vec![Vec2::ZERO; total];

    // 1. Pairwise repulsion, shaped by cluster membership and hue affinity.
    // Same-cluster similar-hue pairs barely repel; cross-cluster dissimilar
    // pairs repel hardest.
    let base_repulsion = BASE_REPULSION * (1.0 + audio.energy) * mode.repulsion_scale(audio);
    let music_cluster_effect = 1.0 + audio.energy * CLUSTER_MUSIC_GAIN;
    for i in 0..total {
        for j in 0..total {
            if i == j {
                continue;
            }
            let delta = nodes[j].pos - nodes[i].pos;
            let dist = safe_distance(delta.x, delta.y).max(MIN_SEPARATION);
            let color = hue_similarity(nodes[i].hue, nodes[j].hue);
            let same_cluster =
                nodes[i].cluster.is_some() && nodes[i].cluster == nodes[j].cluster;
            let multiplier = if same_cluster {
                (SAME_CLUSTER_BIAS + color) * music_cluster_effect
            } else {
                (OTHER_CLUSTER_BIAS + (1.0 - color)) / music_cluster_effect
            };
            let force = base_repulsion * multiplier / (dist * dist);
            forces[i] += delta / dist * (force * REPULSION_VELOCITY_GAIN);
        }
    }

    // 2. Cluster-center attraction, faded in over the transition window.
    // Nodes already well inside the radius get a mild push out instead, and
    // beats add a tangential impulse that spins the cluster.
    let transition = clusters.transition_progress();
    let phase_weight = (clusters.phase() * std::f32::consts::PI).sin();
    for (i, node) in nodes.iter().enumerate() {
        let Some(center) = node.cluster.and_then(|c| clusters.centers().get(c)) else {
            continue;
        };
        let delta = center.pos - node.pos;
        let cluster_force = CLUSTER_PULL
            * transition
            * (0.5 + node.color_similarity)
            * phase_weight
            * (1.0 + audio.energy);
        let cluster_radius = center.radius * (1.0 + audio.energy * CLUSTER_RADIUS_AUDIO_GAIN);
        let dist = safe_distance(delta.x, delta.y);
        let radius_force = if dist > cluster_radius {
            CLUSTER_OUTSIDE_PULL
        } else {
            CLUSTER_INSIDE_RELIEF
        };
        let mut f = delta * (cluster_force + radius_force);
        if audio.is_beat {
            let spiral_angle = delta.y.atan2(delta.x) + std::f32::consts::FRAC_PI_2;
            f += Vec2::new(spiral_angle.cos(), spiral_angle.sin())
                * (BEAT_SPIRAL_IMPULSE * audio.energy);
        }
        forces[i] += f;
    }

    // 3. Edge springs toward the rest length. Deliberately weak: on a
    // complete graph this overlaps with repulsion.
    let spring_k = SPRING_BASE + audio.bass_level * SPRING_BASS_GAIN;
    for edge in edges {
        let (s, t) = (edge.source as usize, edge.target as usize);
        let delta = nodes[t].pos - nodes[s].pos;
        let dist = safe_distance(delta.x, delta.y);
        let force = spring_k * (dist - SPRING_REST_LENGTH) / SPRING_REST_LENGTH;
        let dir = delta / dist;
        forces[s] += dir * force;
        forces[t] -= dir * force;
    }

    // 4. Active mode: target pull plus its audio term.
    for i in 0..total {
        forces[i] += mode.node_force(&nodes[i], i, total, audio, viewport, time_sec, rng);
    }

    // 5. Per-node phase drift. Scaled by the overall level so silence adds
    // no motion; the phase itself keeps running.
    let drift_level = audio.overall_level.min(1.0);
    for (i, node) in nodes.iter_mut().enumerate() {
        if drift_level > 0.0 {
            let drift = (DRIFT_FORCE_BASE + audio.spectrum.mid * DRIFT_MID_GAIN) * drift_level;
            forces[i] += Vec2::new(node.phase.cos(), node.phase.sin()) * drift;
        }
        node.phase += DRIFT_PHASE_STEP + audio.spectrum.high_mid * DRIFT_PHASE_AUDIO_GAIN;
    }

    // Integration: damping strengthens as energy rises, countering the
    // extra force injection; speed is clamped before the position advance.
    let damping = BASE_DAMPING - audio.energy * DAMPING_AUDIO_FACTOR;
    let max_speed = BASE_MAX_SPEED + audio.energy * SPEED_AUDIO_FACTOR;
    for (i, node) in nodes.iter_mut().enumerate() {
        node.vel = (node.vel + forces[i] * frame_scale) * damping;
        let speed = node.vel.length();
        if speed > max_speed {
            node.vel *= max_speed / speed;
        }
        let prev = node.pos;
        node.pos += node.vel * frame_scale;

        update_visuals(node, audio);

        let speed = node.vel.length();
        let threshold = (TRAIL_SPEED_BASE + audio.energy * TRAIL_SPEED_ENERGY_GAIN)
            * if audio.is_beat { TRAIL_BEAT_RELIEF } else { 1.0 };
        if speed > threshold {
            effects.record_trail(node, prev, speed, now_ms, rng);
        }
        node.last_update = now_ms;
    }

    // 6. Boundary pass, last so its absolute clamp cannot be undone.
    for node in nodes.iter_mut() {
        contain_node(node, bounds, audio, rng);
    }
}

/// Audio-reactive per-node attributes: hue shifted by the treble/bass
/// balance, size pulsing relaxed toward 1, glow flashed by beats.
fn update_visuals(node: &mut Node, audio: &AudioLevels) {
    node.hue = (node.base_hue
        + (audio.spectrum.treble - audio.spectrum.bass) * HUE_SHIFT_GAIN)
        .rem_euclid(360.0);

    node.pulse_phase += PULSE_PHASE_STEP + audio.energy * PULSE_PHASE_ENERGY_GAIN;
    let pulse = 0.2 + node.pulse_phase.sin() * 0.1;
    node.scale *= 1.0 + pulse * audio.energy;
    node.scale = 1.0 + (node.scale - 1.0) * SCALE_RELAX;

    node.glow = if audio.is_beat {
        BEAT_GLOW_BASE + audio.energy
    } else {
        1.0 + (node.glow - 1.0) * GLOW_DECAY
    };
}

/// Progressive containment: a soft cubic restoring force from 80% of the
/// allowed radius, a hard clamp with velocity damping from 90%, a long-range
/// center pull from 70%, energy-scaled jitter against equilibria, and an
/// absolute final clamp at the render bounds.
fn contain_node(node: &mut Node, bounds: f32, audio: &AudioLevels, rng: &mut StdRng) {
    let max_radius = bounds / 2.0 * BOUNDARY_USABLE_FRACTION;
    let soft_zone = max_radius * BOUNDARY_SOFT_FRACTION;
    let hard_zone = max_radius * BOUNDARY_HARD_FRACTION;
    let dist = safe_distance(node.pos.x, node.pos.y);

    if dist > max_radius - soft_zone {
        let excess = dist - (max_radius - soft_zone);
        let normalized = excess / soft_zone;
        let force = normalized.powi(3) * (0.5 + audio.energy * 0.5);
        let inward = -node.pos / dist;
        let tangent = Vec2::new(-inward.y, inward.x);
        node.vel += inward * force + tangent * (BOUNDARY_SPIRAL_FRACTION * force);

        if dist > max_radius - hard_zone {
            let limit = max_radius - hard_zone;
            node.pos = node.pos / dist * limit;
            node.vel *= BOUNDARY_CLAMP_DAMPING;
        }
    }

    if dist > max_radius * CENTER_PULL_START_FRACTION {
        let center_force = CENTER_PULL_GAIN * (dist / max_radius).powi(4);
        node.vel -= node.pos * center_force;
    }

    if audio.energy > JITTER_ENERGY_GATE {
        let noise = audio.energy * JITTER_GAIN;
        node.vel += Vec2::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5) * noise;
    }

    let absolute = bounds / 2.0;
    let radius = node.pos.length();
    if radius > absolute {
        node.pos *= absolute / radius;
        node.vel *= ABSOLUTE_BOUNCE_DAMPING;
    }
}
