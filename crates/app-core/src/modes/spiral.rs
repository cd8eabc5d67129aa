//! Spiral layout: nodes target a spiral whose turn count grows with bass,
//! with radial expansion and treble-timed rotation layered on top.

use glam::Vec2;
use rand::prelude::*;
use rand::rngs::StdRng;

use super::{audio_drive, layout_radius, VisualizationMode};
use crate::audio::AudioLevels;
use crate::graph::Node;
use crate::metrics::safe_distance;
use crate::state::Viewport;

const POSITION_FORCE: f32 = 0.1;
const BASE_TURNS: f32 = 3.0;
const TURNS_BASS_GAIN: f32 = 2.0;
const EXPANSION_BASS_GAIN: f32 = 30.0;
const ROTATION_TREBLE_GAIN: f32 = 15.0;
const JITTER_MID_GAIN: f32 = 10.0;

pub struct SpiralMode;

impl SpiralMode {
    fn target(index: usize, total: usize, viewport: Viewport, turns: f32) -> Vec2 {
        let total = total.max(1) as f32;
        let angle = index as f32 * std::f32::consts::TAU * turns / total;
        let radius = layout_radius(viewport) * index as f32 / total;
        Vec2::new(angle.cos(), angle.sin()) * radius
    }
}

impl VisualizationMode for SpiralMode {
    fn name(&self) -> &'static str {
        "spiral"
    }

    fn initial_position(&self, index: usize, total: usize, viewport: Viewport) -> Vec2 {
        Self::target(index, total, viewport, BASE_TURNS)
    }

    fn node_force(
        &self,
        node: &Node,
        index: usize,
        total: usize,
        audio: &AudioLevels,
        viewport: Viewport,
        time_sec: f64,
        rng: &mut StdRng,
    ) -> Vec2 {
        // The spiral tightens as the bass swells.
        let turns = BASE_TURNS + audio.bass_level * TURNS_BASS_GAIN;
        let target = Self::target(index, total, viewport, turns);
        let mut force = (target - node.pos) * POSITION_FORCE;

        let drive = audio_drive(audio);
        if drive > 0.0 {
            let dist = safe_distance(node.pos.x, node.pos.y);
            let radial = node.pos / dist;

            force += radial * (audio.bass_level * EXPANSION_BASS_GAIN);

            let rotation_angle = time_sec as f32 * (1.0 + audio.treble_level);
            let tangent = Vec2::new(-node.pos.y, node.pos.x) / dist;
            force +=
                tangent * (audio.treble_level * ROTATION_TREBLE_GAIN * rotation_angle.sin());

            force += Vec2::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5)
                * (audio.mid_level * JITTER_MID_GAIN);
        }
        force
    }
}
