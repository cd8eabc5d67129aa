//! Free-floating layout: center gravity plus swirling and pulsing audio
//! terms, with the strongest repulsion shaping of the four modes.

use glam::Vec2;
use rand::rngs::StdRng;

use super::{layout_radius, VisualizationMode};
use crate::audio::AudioLevels;
use crate::graph::Node;
use crate::state::Viewport;

const CENTER_FORCE: f32 = 0.02;
const SWIRL_BASS_GAIN: f32 = 50.0;
const PULSE_MID_GAIN: f32 = 40.0;
const REPULSION_BASS_GAIN: f32 = 0.5;

pub struct ClassicMode;

impl VisualizationMode for ClassicMode {
    fn name(&self) -> &'static str {
        "classic"
    }

    fn initial_position(&self, index: usize, total: usize, viewport: Viewport) -> Vec2 {
        let angle = index as f32 * std::f32::consts::TAU / total.max(1) as f32;
        Vec2::new(angle.cos(), angle.sin()) * layout_radius(viewport)
    }

    fn node_force(
        &self,
        node: &Node,
        index: usize,
        total: usize,
        audio: &AudioLevels,
        _viewport: Viewport,
        time_sec: f64,
        _rng: &mut StdRng,
    ) -> Vec2 {
        let t = time_sec as f32;
        let bass = audio.bass_level;
        let mid = audio.mid_level;

        // Slow swirl rotates every node's drive angle; fast pulse breathes it.
        let swirl = (t * 0.5).sin() * 0.5 + 0.5;
        let pulse = (t * 2.0).sin() * 0.5 + 0.5;

        let angle = index as f32 * std::f32::consts::TAU / total.max(1) as f32
            + swirl * std::f32::consts::TAU;
        let bass_force = bass * SWIRL_BASS_GAIN * (1.0 + pulse * 0.5);
        let mid_force = mid * PULSE_MID_GAIN * (1.0 + (t * 3.0).sin() * 0.3);

        let phase = t + index as f32;
        let mut force = Vec2::new(angle.cos(), angle.sin()) * bass_force
            + Vec2::new(phase.cos(), phase.sin()) * mid_force;

        // Center gravity keeps the cloud coherent between audio surges.
        force -= node.pos * (CENTER_FORCE * (1.0 + (bass + mid) * 0.2));
        force
    }

    fn repulsion_scale(&self, audio: &AudioLevels) -> f32 {
        1.0 + audio.bass_level * REPULSION_BASS_GAIN
    }
}
