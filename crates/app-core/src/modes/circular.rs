//! Ring layout: every node is pulled toward a fixed slot on a circle, with
//! bass-driven circular motion layered on top.

use glam::Vec2;
use rand::prelude::*;
use rand::rngs::StdRng;

use super::{audio_drive, layout_radius, VisualizationMode};
use crate::audio::AudioLevels;
use crate::graph::Node;
use crate::state::Viewport;

const POSITION_FORCE: f32 = 0.1;
const JITTER_GAIN: f32 = 20.0;
const ORBIT_BASS_GAIN: f32 = 10.0;

pub struct CircularMode;

impl VisualizationMode for CircularMode {
    fn name(&self) -> &'static str {
        "circular"
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
        viewport: Viewport,
        time_sec: f64,
        rng: &mut StdRng,
    ) -> Vec2 {
        let target = self.initial_position(index, total, viewport);
        let mut force = (target - node.pos) * POSITION_FORCE;

        let drive = audio_drive(audio);
        if drive > 0.0 {
            force += Vec2::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5)
                * (drive * JITTER_GAIN);

            let angle = time_sec as f32 * (1.0 + audio.bass_level);
            force += Vec2::new(angle.cos(), angle.sin()) * (audio.bass_level * ORBIT_BASS_GAIN);
        }
        force
    }
}
