//! Grid layout: nodes are pulled to the cells of a near-square grid while
//! bass waves, mid compression pulses and treble jitter deform it.

use glam::Vec2;
use rand::prelude::*;
use rand::rngs::StdRng;

use super::{audio_drive, layout_radius, VisualizationMode};
use crate::audio::AudioLevels;
use crate::graph::Node;
use crate::metrics::safe_divide;
use crate::state::Viewport;

const POSITION_FORCE: f32 = 0.1;
const WAVE_BASS_GAIN: f32 = 30.0;
const COMPRESS_MID_GAIN: f32 = 20.0;
const TREBLE_JITTER_GATE: f32 = 0.5;
const TREBLE_JITTER_GAIN: f32 = 15.0;

pub struct GridMode;

impl GridMode {
    fn columns(total: usize) -> usize {
        (total.max(1) as f32).sqrt().ceil() as usize
    }
}

impl VisualizationMode for GridMode {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn initial_position(&self, index: usize, total: usize, viewport: Viewport) -> Vec2 {
        let cols = Self::columns(total);
        let half = cols as f32 / 2.0;
        let grid_x = (index % cols) as f32 - half;
        let grid_y = (index / cols) as f32 - half;
        let cell = layout_radius(viewport) / half.max(1.0);
        Vec2::new(grid_x, grid_y) * cell
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
            let t = time_sec as f32;

            // Bass ripples travel across the grid by node index.
            let wave_phase = t * 2.0 + index as f32 * 0.1;
            force += Vec2::new(wave_phase.sin(), wave_phase.cos())
                * (audio.bass_level * WAVE_BASS_GAIN);

            // Mid frequencies breathe the whole grid toward/away from its
            // target cells; cells on an axis contribute nothing there.
            let grid_pulse = (t * 3.0).sin() * audio.mid_level * COMPRESS_MID_GAIN;
            force += Vec2::new(
                safe_divide(node.pos.x, target.x, 0.0) * grid_pulse,
                safe_divide(node.pos.y, target.y, 0.0) * grid_pulse,
            );

            if audio.treble_level > TREBLE_JITTER_GATE {
                force += Vec2::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5)
                    * (audio.treble_level * TREBLE_JITTER_GAIN);
            }
        }
        force
    }
}
