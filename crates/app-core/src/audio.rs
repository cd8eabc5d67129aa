//! Audio feature extraction: banded frequency levels, overall energy and
//! beat events.
//!
//! The analyzer consumes raw byte-magnitude spectra (one `u8` per frequency
//! bin, as produced by an FFT front-end) from up to two sources per frame: a
//! synthesized music source and a live microphone. When both are present the
//! per-band maximum wins, with the microphone boosted so live input stays
//! the more responsive of the two.

use std::collections::VecDeque;

use crate::constants::*;

/// Normalized \[0, 1\] energy per frequency band.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Spectrum {
    pub bass: f32,
    pub low_mid: f32,
    pub mid: f32,
    pub high_mid: f32,
    pub treble: f32,
}

/// Per-frame audio snapshot consumed by the simulation.
///
/// All fields are resolved here, once; downstream code never re-defaults
/// them. `Default` is the silent snapshot used whenever no source is
/// attached.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioLevels {
    pub bass_level: f32,
    pub mid_level: f32,
    pub treble_level: f32,
    pub overall_level: f32,
    /// Weighted loudness summary in \[0, 1\].
    pub energy: f32,
    pub is_beat: bool,
    pub spectrum: Spectrum,
}

/// Raw frequency-domain input from an audio source collaborator.
#[derive(Clone, Debug)]
pub struct SpectrumFrame {
    /// Byte magnitude per frequency bin, DC first.
    pub bins: Vec<u8>,
    /// Nominal sample rate of the source signal in Hz.
    pub sample_rate: f32,
}

impl SpectrumFrame {
    pub fn new(bin_count: usize, sample_rate: f32) -> Self {
        Self {
            bins: vec![0; bin_count],
            sample_rate,
        }
    }
}

/// Average magnitude over the bins covering `[lo_hz, hi_hz)`, normalized to
/// \[0, 1\]. The range is widened to at least one bin so narrow bands on
/// coarse spectra still report.
fn band_average(frame: &SpectrumFrame, lo_hz: f32, hi_hz: f32) -> f32 {
    let bins = frame.bins.len();
    if bins == 0 || frame.sample_rate <= 0.0 {
        return 0.0;
    }
    let nyquist = frame.sample_rate / 2.0;
    let lo = ((lo_hz * bins as f32 / nyquist) as usize).min(bins - 1);
    let hi = ((hi_hz * bins as f32 / nyquist) as usize).clamp(lo + 1, bins);
    let sum: u32 = frame.bins[lo..hi].iter().map(|&b| u32::from(b)).sum();
    sum as f32 / (hi - lo) as f32 / 255.0
}

fn overall_average(frame: &SpectrumFrame) -> f32 {
    if frame.bins.is_empty() {
        return 0.0;
    }
    let sum: u32 = frame.bins.iter().map(|&b| u32::from(b)).sum();
    sum as f32 / frame.bins.len() as f32 / 255.0
}

/// Band levels of a single source frame.
pub fn spectrum_of(frame: &SpectrumFrame) -> Spectrum {
    Spectrum {
        bass: band_average(frame, BASS_HZ.0, BASS_HZ.1),
        low_mid: band_average(frame, LOW_MID_HZ.0, LOW_MID_HZ.1),
        mid: band_average(frame, MID_HZ.0, MID_HZ.1),
        high_mid: band_average(frame, HIGH_MID_HZ.0, HIGH_MID_HZ.1),
        treble: band_average(frame, TREBLE_HZ.0, TREBLE_HZ.1),
    }
}

/// Stateful analyzer: merges sources and tracks the rolling bass statistics
/// that drive beat detection.
pub struct AudioAnalyzer {
    bass_history: VecDeque<f32>,
    last_beat_ms: f64,
}

impl Default for AudioAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioAnalyzer {
    pub fn new() -> Self {
        Self {
            bass_history: VecDeque::with_capacity(BEAT_WINDOW + 1),
            last_beat_ms: f64::NEG_INFINITY,
        }
    }

    /// Produce the frame's audio snapshot.
    ///
    /// With no source attached this returns the silent snapshot and leaves
    /// the beat statistics untouched, so a briefly unavailable analyser
    /// never stalls the caller.
    pub fn analyze(
        &mut self,
        music: Option<&SpectrumFrame>,
        mic: Option<&SpectrumFrame>,
        now_ms: f64,
    ) -> AudioLevels {
        if music.is_none() && mic.is_none() {
            return AudioLevels::default();
        }

        let mut spectrum = Spectrum::default();
        let mut overall = 0.0_f32;
        if let Some(frame) = music {
            spectrum = spectrum_of(frame);
            overall = overall_average(frame);
        }
        if let Some(frame) = mic {
            let m = spectrum_of(frame);
            spectrum.bass = spectrum.bass.max(m.bass * MIC_BASS_BOOST);
            spectrum.low_mid = spectrum.low_mid.max(m.low_mid * MIC_BAND_BOOST);
            spectrum.mid = spectrum.mid.max(m.mid * MIC_BAND_BOOST);
            spectrum.high_mid = spectrum.high_mid.max(m.high_mid * MIC_BAND_BOOST);
            spectrum.treble = spectrum.treble.max(m.treble * MIC_BAND_BOOST);
            overall = overall.max(overall_average(frame) * MIC_BAND_BOOST);
        }

        let [wb, wl, wm, wh, wt] = ENERGY_BAND_WEIGHTS;
        let energy = ((spectrum.bass * wb
            + spectrum.low_mid * wl
            + spectrum.mid * wm
            + spectrum.high_mid * wh
            + spectrum.treble * wt)
            / 5.0)
            .clamp(0.0, 1.0);

        let is_beat = self.detect_beat(spectrum.bass, energy, now_ms);

        AudioLevels {
            bass_level: spectrum.bass * BASS_LEVEL_GAIN,
            mid_level: spectrum.mid * MID_LEVEL_GAIN,
            treble_level: spectrum.treble * TREBLE_LEVEL_GAIN,
            overall_level: overall * OVERALL_LEVEL_GAIN,
            energy,
            is_beat,
            spectrum,
        }
    }

    /// Rolling-statistics beat detector over the bass band.
    ///
    /// A beat fires when the bass level spikes past the window's
    /// mean + stddev threshold while overall energy is high, rate-limited
    /// by a cooldown; the cooldown clock advances only when a beat fires.
    fn detect_beat(&mut self, bass: f32, energy: f32, now_ms: f64) -> bool {
        self.bass_history.push_back(bass);
        while self.bass_history.len() > BEAT_WINDOW {
            self.bass_history.pop_front();
        }

        let n = self.bass_history.len() as f32;
        let mean = self.bass_history.iter().sum::<f32>() / n;
        let variance = self
            .bass_history
            .iter()
            .map(|&b| (b - mean) * (b - mean))
            .sum::<f32>()
            / n;
        let stddev = variance.sqrt();

        let fired = bass > mean + stddev * BEAT_STDDEV_GAIN
            && energy > BEAT_ENERGY_GATE
            && now_ms - self.last_beat_ms > BEAT_COOLDOWN_MS;
        if fired {
            self.last_beat_ms = now_ms;
        }
        fired
    }
}
