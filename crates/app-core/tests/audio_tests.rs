// Band extraction, source merging and beat detection.

use app_core::{AudioAnalyzer, AudioLevels, SpectrumFrame, ENERGY_BAND_WEIGHTS};

const BINS: usize = 1024;
const SAMPLE_RATE: f32 = 44_100.0;
const FRAME_MS: f64 = 16.0;

fn flat_frame(value: u8) -> SpectrumFrame {
    let mut frame = SpectrumFrame::new(BINS, SAMPLE_RATE);
    frame.bins.fill(value);
    frame
}

/// Frame with `value` only in the bins covering `[lo_hz, hi_hz)`, using the
/// same bin mapping as the analyzer.
fn band_frame(lo_hz: f32, hi_hz: f32, value: u8) -> SpectrumFrame {
    let mut frame = SpectrumFrame::new(BINS, SAMPLE_RATE);
    let nyquist = SAMPLE_RATE / 2.0;
    let lo = (lo_hz * BINS as f32 / nyquist) as usize;
    let hi = (hi_hz * BINS as f32 / nyquist) as usize;
    for bin in &mut frame.bins[lo..hi.max(lo + 1)] {
        *bin = value;
    }
    frame
}

#[test]
fn no_source_yields_silent_snapshot() {
    let mut analyzer = AudioAnalyzer::new();
    let levels = analyzer.analyze(None, None, 0.0);
    assert_eq!(levels, AudioLevels::default());
    assert_eq!(levels.energy, 0.0);
    assert!(!levels.is_beat);
}

#[test]
fn silent_spectrum_reports_zero_energy_and_no_beat() {
    let mut analyzer = AudioAnalyzer::new();
    let frame = flat_frame(0);
    for i in 0..30 {
        let levels = analyzer.analyze(Some(&frame), None, i as f64 * FRAME_MS);
        assert_eq!(levels.energy, 0.0, "silence carries no energy");
        assert!(!levels.is_beat, "silence carries no beats");
    }
}

#[test]
fn saturated_spectrum_pins_every_band_and_energy() {
    let mut analyzer = AudioAnalyzer::new();
    let levels = analyzer.analyze(Some(&flat_frame(255)), None, 0.0);
    for band in [
        levels.spectrum.bass,
        levels.spectrum.low_mid,
        levels.spectrum.mid,
        levels.spectrum.high_mid,
        levels.spectrum.treble,
    ] {
        assert!((band - 1.0).abs() < 1e-6, "saturated band should read 1.0, got {band}");
    }
    assert!((levels.energy - 1.0).abs() < 1e-6, "energy clamps to 1.0");
    assert!((levels.bass_level - 2.5).abs() < 1e-6, "bass presentation gain");
}

#[test]
fn energy_applies_the_band_weights() {
    let mut analyzer = AudioAnalyzer::new();
    // Only the bass band is lit; energy is its weight over the five bands.
    let levels = analyzer.analyze(Some(&band_frame(20.0, 140.0, 255)), None, 0.0);
    assert!((levels.spectrum.bass - 1.0).abs() < 1e-6);
    assert!(levels.spectrum.mid.abs() < 1e-6, "other bands stay dark");
    let expected = ENERGY_BAND_WEIGHTS[0] / 5.0;
    assert!(
        (levels.energy - expected).abs() < 1e-4,
        "bass-only energy: expected {expected}, got {}",
        levels.energy
    );
}

#[test]
fn microphone_bands_win_with_their_boost() {
    let mut analyzer = AudioAnalyzer::new();
    let music = flat_frame(100);
    let mic = flat_frame(100);
    let merged = analyzer.analyze(Some(&music), Some(&mic), 0.0);

    let base = 100.0 / 255.0;
    assert!(
        (merged.spectrum.bass - base * 2.0).abs() < 1e-4,
        "mic bass boosted x2.0, got {}",
        merged.spectrum.bass
    );
    assert!(
        (merged.spectrum.mid - base * 1.8).abs() < 1e-4,
        "mic mid boosted x1.8, got {}",
        merged.spectrum.mid
    );

    // A quiet microphone loses to the music source.
    let mut analyzer = AudioAnalyzer::new();
    let quiet_mic = flat_frame(10);
    let merged = analyzer.analyze(Some(&music), Some(&quiet_mic), 0.0);
    assert!(
        (merged.spectrum.mid - base).abs() < 1e-4,
        "music wins over a quiet microphone"
    );
}

#[test]
fn constant_signal_never_repeats_beats_within_cooldown() {
    let mut analyzer = AudioAnalyzer::new();
    let frame = flat_frame(200);
    let mut beat_times = Vec::new();
    for i in 0..100 {
        let now = i as f64 * FRAME_MS;
        if analyzer.analyze(Some(&frame), None, now).is_beat {
            beat_times.push(now);
        }
    }
    for pair in beat_times.windows(2) {
        assert!(
            pair[1] - pair[0] >= 200.0,
            "beats {} and {} violate the cooldown",
            pair[0],
            pair[1]
        );
    }
    assert!(
        beat_times.len() <= 1,
        "a constant signal is not a stream of beats, got {beat_times:?}"
    );
}

#[test]
fn impulse_after_baseline_fires_exactly_once_per_impulse() {
    let mut analyzer = AudioAnalyzer::new();
    let baseline = flat_frame(30);
    let impulse = flat_frame(255);

    // 12 baseline frames, a 3-frame impulse plateau, 22 baseline frames,
    // then a second 3-frame impulse ~400 ms after the first.
    let mut schedule = Vec::new();
    schedule.extend(std::iter::repeat(&baseline).take(12));
    schedule.extend(std::iter::repeat(&impulse).take(3));
    schedule.extend(std::iter::repeat(&baseline).take(22));
    schedule.extend(std::iter::repeat(&impulse).take(3));

    let mut beats = 0;
    for (i, frame) in schedule.into_iter().enumerate() {
        if analyzer.analyze(Some(frame), None, i as f64 * FRAME_MS).is_beat {
            beats += 1;
        }
    }
    assert_eq!(beats, 2, "one beat per qualifying impulse, no plateau retrigger");
}

#[test]
fn beat_requires_high_overall_energy() {
    let mut analyzer = AudioAnalyzer::new();
    let quiet = band_frame(20.0, 140.0, 20);
    let spike = band_frame(20.0, 140.0, 255);

    for i in 0..10 {
        assert!(!analyzer.analyze(Some(&quiet), None, i as f64 * FRAME_MS).is_beat);
    }
    // Bass spikes hard, but a bass-only spectrum keeps energy below the
    // gate, so no beat fires.
    let levels = analyzer.analyze(Some(&spike), None, 10.0 * FRAME_MS);
    assert!(levels.energy < 0.4, "bass-only energy stays under the gate");
    assert!(!levels.is_beat, "energy gate holds the beat back");
}
