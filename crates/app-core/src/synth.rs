//! Procedural spectrum source standing in for a live music stream.
//!
//! Instead of synthesizing samples and analyzing them, the generated signal
//! is rendered directly in the magnitude domain: three filtered voices, a
//! 200 ms rhythm pulse re-exciting the bass, slow LFOs wobbling the voice
//! fundamentals and a seeded noise floor. Deterministic for a given seed
//! and time sequence.

use rand::prelude::*;

use crate::audio::SpectrumFrame;

const BIN_COUNT: usize = 1024;
const SAMPLE_RATE: f32 = 44_100.0;

const PULSE_INTERVAL_MS: f64 = 200.0;
const PULSE_DECAY_MS: f64 = 90.0;
const NOISE_FLOOR: f32 = 4.0;

// Voice fundamentals (Hz) and their filter corners
const BASS_FUNDAMENTAL: f32 = 55.0;
const MID_FUNDAMENTAL: f32 = 110.0;
const HIGH_FUNDAMENTAL: f32 = 220.0;
const BASS_LOWPASS_HZ: f32 = 150.0;
const MID_BANDPASS_HZ: f32 = 800.0;
const HIGH_HIGHPASS_HZ: f32 = 1500.0;

pub struct SynthSpectrum {
    frame: SpectrumFrame,
    scratch: Vec<f32>,
    rng: StdRng,
    last_pulse_ms: f64,
    pulse_count: u64,
}

impl SynthSpectrum {
    pub fn new(seed: u64) -> Self {
        Self {
            frame: SpectrumFrame::new(BIN_COUNT, SAMPLE_RATE),
            scratch: vec![0.0; BIN_COUNT],
            rng: StdRng::seed_from_u64(seed),
            last_pulse_ms: 0.0,
            pulse_count: 0,
        }
    }

    /// Render the spectrum for `now_ms`. Call once per frame with a
    /// monotonically increasing clock.
    pub fn render(&mut self, now_ms: f64) -> &SpectrumFrame {
        while now_ms - self.last_pulse_ms >= PULSE_INTERVAL_MS {
            self.last_pulse_ms += PULSE_INTERVAL_MS;
            self.pulse_count += 1;
        }
        // Exponential decay since the last rhythm pulse
        let env = (-(now_ms - self.last_pulse_ms) / PULSE_DECAY_MS).exp() as f32;
        let t = now_ms / 1000.0;

        // LFO-wobbled fundamentals
        let tau = std::f64::consts::TAU;
        let bass_hz = BASS_FUNDAMENTAL + ((t * 0.2 * tau).sin() as f32) * 5.0;
        let mid_hz = MID_FUNDAMENTAL + ((t * 0.1 * tau).sin() as f32) * 10.0;
        let high_hz = HIGH_FUNDAMENTAL + ((t * 0.15 * tau).sin() as f32) * 15.0;

        self.scratch.fill(0.0);

        // Bass voice: odd-heavy harmonic stack through the lowpass, fully
        // pulse-driven. The broadband wash fattens the fundamental.
        for k in 1..=4 {
            let freq = bass_hz * k as f32;
            let rolloff = 1.0 / (1.0 + (freq / BASS_LOWPASS_HZ).powi(2));
            add_peak(&mut self.scratch, freq, 230.0 * env * rolloff);
        }
        add_wash(&mut self.scratch, 20.0, 140.0, 140.0 * env, &mut self.rng);

        // Mid voice through the bandpass, half steady, half pulsed
        let mid_amp = 130.0 * (0.6 + 0.4 * env);
        for k in 1..=8 {
            let freq = mid_hz * k as f32;
            let resp = 1.0 / (1.0 + ((freq - MID_BANDPASS_HZ) / 600.0).powi(2));
            add_peak(&mut self.scratch, freq, mid_amp * resp);
        }
        add_wash(
            &mut self.scratch,
            400.0,
            1000.0,
            90.0 * (0.5 + 0.5 * env),
            &mut self.rng,
        );

        // High voice through the highpass
        let high_amp = 90.0 * (0.5 + 0.5 * env);
        for k in 4..=20 {
            let freq = high_hz * k as f32;
            let ratio = (freq / HIGH_HIGHPASS_HZ).powi(2);
            add_peak(&mut self.scratch, freq, high_amp * ratio / (1.0 + ratio));
        }
        add_wash(
            &mut self.scratch,
            1500.0,
            5000.0,
            70.0 * (0.4 + 0.6 * env),
            &mut self.rng,
        );

        // Hat: treble burst on every pulse, accented on alternate pulses
        let hat_amp = if self.pulse_count % 2 == 0 { 180.0 } else { 240.0 };
        add_wash(&mut self.scratch, 5200.0, 12_000.0, hat_amp * env, &mut self.rng);

        for (bin, out) in self.scratch.iter().zip(self.frame.bins.iter_mut()) {
            let noise = self.rng.gen::<f32>() * NOISE_FLOOR;
            *out = (bin + noise).clamp(0.0, 255.0) as u8;
        }
        &self.frame
    }
}

#[inline]
fn bin_of(freq: f32) -> usize {
    (freq * BIN_COUNT as f32 / (SAMPLE_RATE / 2.0)) as usize
}

/// Deposit a narrow peak (center bin plus half-weight neighbors).
fn add_peak(scratch: &mut [f32], freq: f32, amplitude: f32) {
    let center = bin_of(freq);
    if center >= scratch.len() {
        return;
    }
    if center > 0 {
        scratch[center - 1] += amplitude * 0.5;
    }
    scratch[center] += amplitude;
    if center + 1 < scratch.len() {
        scratch[center + 1] += amplitude * 0.5;
    }
}

/// Spread a roughened band of energy over `[lo_hz, hi_hz)`.
fn add_wash(scratch: &mut [f32], lo_hz: f32, hi_hz: f32, amplitude: f32, rng: &mut StdRng) {
    let lo = bin_of(lo_hz).min(scratch.len());
    let hi = bin_of(hi_hz).min(scratch.len());
    for bin in &mut scratch[lo..hi] {
        *bin += amplitude * (0.75 + rng.gen::<f32>() * 0.5);
    }
}
