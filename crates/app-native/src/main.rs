//! Headless native front-end: the synthesized spectrum source (and
//! optionally the live microphone) drives the simulation at ~60 Hz while
//! the engine's per-frame output is logged. Rendering is left to external
//! front-ends; this shell exercises the full audio -> analysis ->
//! simulation -> snapshot path.

use std::time::Duration;

use instant::Instant;

use app_core::{AudioAnalyzer, Simulation, SpectrumFrame, SynthSpectrum, Viewport};

mod mic;

struct Options {
    node_count: usize,
    mode: Option<String>,
    use_mic: bool,
    seconds: Option<u64>,
}

fn parse_args() -> Options {
    let mut opts = Options {
        node_count: 69,
        mode: None,
        use_mic: false,
        seconds: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mic" => opts.use_mic = true,
            "--mode" => opts.mode = args.next(),
            "--seconds" => opts.seconds = args.next().and_then(|s| s.parse().ok()),
            other => {
                if let Ok(n) = other.parse() {
                    opts.node_count = n;
                } else {
                    log::warn!("ignoring unrecognized argument {other:?}");
                }
            }
        }
    }
    opts
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();
    let opts = parse_args();

    let viewport = Viewport::new(1920.0, 1080.0);
    let mut sim = Simulation::new(opts.node_count, viewport, 42);
    if let Some(mode) = &opts.mode {
        if let Err(e) = sim.set_mode(mode) {
            log::warn!("{e}; staying on {}", sim.current_mode());
        }
    }
    log::info!(
        "modes available: {:?}, active: {}",
        sim.available_modes(),
        sim.current_mode()
    );

    let mut synth = SynthSpectrum::new(7);
    let mut analyzer = AudioAnalyzer::new();

    // Microphone acquisition is fire-and-observe: a failure is logged and
    // the run continues on the synthesized source alone.
    let mic = if opts.use_mic {
        match mic::MicCapture::start() {
            Ok(m) => Some(m),
            Err(e) => {
                log::error!("microphone unavailable, continuing without it: {e:#}");
                None
            }
        }
    } else {
        None
    };

    let start = Instant::now();
    let mut last = start;
    let mut mic_frame: Option<SpectrumFrame> = None;
    let mut beats = 0u64;
    let mut frames = 0u64;

    loop {
        let now = Instant::now();
        let dt = (now - last).as_secs_f32();
        last = now;
        let now_ms = start.elapsed().as_secs_f64() * 1000.0;

        if let Some(m) = &mic {
            // Drain to the newest frame; older ones are superseded.
            while let Ok(frame) = m.frames().try_recv() {
                mic_frame = Some(frame);
            }
            if let mic::MicStatus::Failed(reason) = m.status() {
                log::debug!("microphone degraded ({reason}), synth only");
                mic_frame = None;
            }
        }

        let music = synth.render(now_ms);
        let levels = analyzer.analyze(Some(music), mic_frame.as_ref(), now_ms);
        if levels.is_beat {
            beats += 1;
        }

        sim.step(&levels, viewport, now_ms, dt);
        frames += 1;

        if frames % 120 == 0 {
            let snapshot = sim.snapshot(now_ms);
            let head = snapshot.nodes.first().copied().unwrap_or_default();
            log::info!(
                "t={:5.1}s energy={:.2} beats={} clusters={} trails={} arcs={} node0=({:.0},{:.0})",
                now_ms / 1000.0,
                levels.energy,
                beats,
                sim.clusters().centers().len(),
                snapshot.effects.trails.len(),
                snapshot.effects.arcs.len(),
                head.x,
                head.y,
            );
        }

        if let Some(limit) = opts.seconds {
            if now_ms >= limit as f64 * 1000.0 {
                break;
            }
        }
        std::thread::sleep(Duration::from_millis(16));
    }

    log::info!("run complete: {frames} frames, {beats} beats");
}
