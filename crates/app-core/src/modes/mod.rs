//! Pluggable layout policies. Each mode defines an initial placement and a
//! per-node force contribution; the force engine integrates everything, so
//! switching modes mid-run never resets node positions or velocities.

mod circular;
mod classic;
mod grid;
mod spiral;

pub use circular::CircularMode;
pub use classic::ClassicMode;
pub use grid::GridMode;
pub use spiral::SpiralMode;

use fnv::FnvHashMap;
use glam::Vec2;
use rand::rngs::StdRng;

use crate::audio::AudioLevels;
use crate::error::SimError;
use crate::graph::Node;
use crate::state::Viewport;

/// Layout policy capability set.
pub trait VisualizationMode {
    fn name(&self) -> &'static str;

    /// Placement for node `index` of `total` when a layout is seeded.
    fn initial_position(&self, index: usize, total: usize, viewport: Viewport) -> Vec2;

    /// Mode-specific force on one node this frame (target pull plus the
    /// mode's audio-reactive term). Returned to the engine for integration.
    #[allow(clippy::too_many_arguments)]
    fn node_force(
        &self,
        node: &Node,
        index: usize,
        total: usize,
        audio: &AudioLevels,
        viewport: Viewport,
        time_sec: f64,
        rng: &mut StdRng,
    ) -> Vec2;

    /// Scale applied to the engine's pairwise repulsion term.
    fn repulsion_scale(&self, _audio: &AudioLevels) -> f32 {
        1.0
    }
}

/// Holds the registered modes and the active selection.
pub struct ModeManager {
    modes: FnvHashMap<&'static str, Box<dyn VisualizationMode>>,
    current: &'static str,
}

impl ModeManager {
    pub fn new() -> Self {
        let mut modes: FnvHashMap<&'static str, Box<dyn VisualizationMode>> =
            FnvHashMap::default();
        for mode in [
            Box::new(ClassicMode) as Box<dyn VisualizationMode>,
            Box::new(CircularMode),
            Box::new(GridMode),
            Box::new(SpiralMode),
        ] {
            modes.insert(mode.name(), mode);
        }
        Self {
            modes,
            current: ClassicMode.name(),
        }
    }

    /// Switch the active mode by name. An unknown name is a configuration
    /// error; the previous mode stays active.
    pub fn set_mode(&mut self, name: &str) -> Result<(), SimError> {
        match self.modes.get_key_value(name) {
            Some((&key, _)) => {
                self.current = key;
                log::info!("visualization mode set to {key}");
                Ok(())
            }
            None => {
                log::warn!("unknown visualization mode {name:?}, keeping {}", self.current);
                Err(SimError::UnknownMode(name.to_string()))
            }
        }
    }

    pub fn current_name(&self) -> &'static str {
        self.current
    }

    pub fn active(&self) -> &dyn VisualizationMode {
        self.modes[self.current].as_ref()
    }

    /// Registered mode names, sorted for stable presentation.
    pub fn available_modes(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.modes.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Seed placement for `total` nodes under the active mode.
    pub fn initial_positions(&self, total: usize, viewport: Viewport) -> Vec<Vec2> {
        (0..total)
            .map(|i| self.active().initial_position(i, total, viewport))
            .collect()
    }
}

impl Default for ModeManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared layout radius: modes target a ring/grid/spiral sized to the
/// smaller viewport extent.
pub(crate) fn layout_radius(viewport: Viewport) -> f32 {
    viewport.min_extent() * 0.4
}

/// Mean of the three presented band levels; modes gate their stochastic
/// terms on this so silence adds no motion.
pub(crate) fn audio_drive(audio: &AudioLevels) -> f32 {
    (audio.bass_level + audio.mid_level + audio.treble_level) / 3.0
}
