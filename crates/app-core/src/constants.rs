// Simulation and audio tuning constants shared across the engine.
//
// These express intended behavior (force gains, clamp limits, time windows)
// and keep magic numbers out of the force and analysis code.

// Graph configuration
pub const MIN_NODE_COUNT: usize = 3;
pub const MAX_NODE_COUNT: usize = 200;
pub const SPAWN_RING_RADIUS: f32 = 300.0; // world units

// Frequency bands (Hz)
pub const BASS_HZ: (f32, f32) = (20.0, 140.0);
pub const LOW_MID_HZ: (f32, f32) = (140.0, 400.0);
pub const MID_HZ: (f32, f32) = (400.0, 2600.0);
pub const HIGH_MID_HZ: (f32, f32) = (2600.0, 5200.0);
pub const TREBLE_HZ: (f32, f32) = (5200.0, 14000.0);

// Energy weighting per band, bass-heavy
pub const ENERGY_BAND_WEIGHTS: [f32; 5] = [1.4, 1.2, 1.0, 0.8, 0.6];

// Microphone input is favored over the synthesized source
pub const MIC_BASS_BOOST: f32 = 2.0;
pub const MIC_BAND_BOOST: f32 = 1.8;

// Presentation gains applied to the merged band levels
pub const BASS_LEVEL_GAIN: f32 = 2.5;
pub const MID_LEVEL_GAIN: f32 = 2.0;
pub const TREBLE_LEVEL_GAIN: f32 = 2.0;
pub const OVERALL_LEVEL_GAIN: f32 = 2.0;

// Beat detection (rolling statistics over the bass band)
pub const BEAT_WINDOW: usize = 20; // samples
pub const BEAT_STDDEV_GAIN: f32 = 0.6;
pub const BEAT_ENERGY_GATE: f32 = 0.4;
pub const BEAT_COOLDOWN_MS: f64 = 200.0;

// Pairwise repulsion
pub const BASE_REPULSION: f32 = -2000.0;
pub const REPULSION_VELOCITY_GAIN: f32 = 0.5;
pub const MIN_SEPARATION: f32 = 1.0; // floor before the inverse-square division
pub const SAME_CLUSTER_BIAS: f32 = 0.2;
pub const OTHER_CLUSTER_BIAS: f32 = 2.0;
pub const CLUSTER_MUSIC_GAIN: f32 = 2.0;

// Cluster-center attraction
pub const CLUSTER_PULL: f32 = 0.03;
pub const CLUSTER_OUTSIDE_PULL: f32 = 0.02;
pub const CLUSTER_INSIDE_RELIEF: f32 = -0.015; // mild push once well inside the radius
pub const CLUSTER_RADIUS_AUDIO_GAIN: f32 = 0.5;
pub const BEAT_SPIRAL_IMPULSE: f32 = 0.1;

// Edge springs (intentionally weak; the complete graph double-counts repulsion)
pub const SPRING_REST_LENGTH: f32 = 100.0;
pub const SPRING_BASE: f32 = 0.1;
pub const SPRING_BASS_GAIN: f32 = 0.2;

// Integration
pub const BASE_DAMPING: f32 = 0.90;
pub const DAMPING_AUDIO_FACTOR: f32 = 0.10;
pub const BASE_MAX_SPEED: f32 = 3.0;
pub const SPEED_AUDIO_FACTOR: f32 = 10.0;
pub const TARGET_FPS: f32 = 60.0;
pub const FRAME_SCALE_MIN: f32 = 0.5;
pub const FRAME_SCALE_MAX: f32 = 2.0;

// Per-node phase drift, silent when no audio is playing
pub const DRIFT_FORCE_BASE: f32 = 0.15;
pub const DRIFT_MID_GAIN: f32 = 0.5;
pub const DRIFT_PHASE_STEP: f32 = 0.02;
pub const DRIFT_PHASE_AUDIO_GAIN: f32 = 0.04;

// Stochastic jitter, prevents frozen force equilibria
pub const JITTER_ENERGY_GATE: f32 = 0.1;
pub const JITTER_GAIN: f32 = 0.08;

// Boundary containment
pub const BOUNDS_VIEWPORT_SCALE: f32 = 1.2; // world diameter per viewport min extent
pub const BOUNDARY_USABLE_FRACTION: f32 = 0.9;
pub const BOUNDARY_SOFT_FRACTION: f32 = 0.2; // soft force starts at 80% of max radius
pub const BOUNDARY_HARD_FRACTION: f32 = 0.1; // hard clamp at 90% of max radius
pub const BOUNDARY_SPIRAL_FRACTION: f32 = 0.05;
pub const BOUNDARY_CLAMP_DAMPING: f32 = 0.7;
pub const CENTER_PULL_START_FRACTION: f32 = 0.7;
pub const CENTER_PULL_GAIN: f32 = 0.004;
pub const ABSOLUTE_BOUNCE_DAMPING: f32 = -0.5;

// Audio-reactive node attributes
pub const HUE_SHIFT_GAIN: f32 = 20.0;
pub const BEAT_SCALE_BASE: f32 = 1.3;
pub const BEAT_SCALE_ENERGY_GAIN: f32 = 0.7;
pub const PULSE_PHASE_STEP: f32 = 0.1;
pub const PULSE_PHASE_ENERGY_GAIN: f32 = 0.2;
pub const SCALE_RELAX: f32 = 0.9;
pub const BEAT_GLOW_BASE: f32 = 1.5;
pub const GLOW_DECAY: f32 = 0.85;

// Cluster layout
pub const GOLDEN_RATIO: f32 = 1.618_034;
pub const CLUSTER_RECOMPUTE_MS: f64 = 15_000.0;
pub const CLUSTER_CLOCK_THROTTLE_MS: f64 = 16.0; // at most one clock inspection per ~frame
pub const CLUSTER_TRANSITION_MS: f64 = 2_000.0;
pub const CLUSTER_PHASE_STEP: f32 = 0.1;
pub const CLUSTER_SCREEN_FRACTION: f32 = 0.35;
pub const CLUSTER_BASE_RADIUS: f32 = 150.0;
pub const CLUSTER_RADIUS_SPREAD: f32 = 0.2;
pub const CLUSTER_HUE_WEIGHT: f32 = 0.7;
pub const CLUSTER_PROXIMITY_WEIGHT: f32 = 0.3;

// Motion trails
pub const TRAIL_SPEED_BASE: f32 = 1.0;
pub const TRAIL_SPEED_ENERGY_GAIN: f32 = 2.0;
pub const TRAIL_BEAT_RELIEF: f32 = 0.6; // beats lower the spawn threshold
pub const TRAIL_INTENSITY_DIVISOR: f32 = 20.0;
pub const TRAIL_MIN_DURATION_MS: f64 = 250.0;
pub const TRAIL_DURATION_SPREAD_MS: f64 = 250.0;

// Lightning arcs
pub const ARC_HUE_AFFINITY: f32 = 0.85;
pub const ARC_MIN_DISTANCE: f32 = 300.0;
pub const ARC_MAX_DISTANCE: f32 = 800.0;
pub const ARC_SEGMENTS: usize = 12;
pub const ARC_MAX_OFFSET: f32 = 50.0;
pub const ARC_BASE_COUNT: usize = 3;
pub const ARC_ENERGY_COUNT_GAIN: f32 = 4.0;
pub const ARC_MIN_DURATION_MS: f64 = 200.0;
pub const ARC_DURATION_SPREAD_MS: f64 = 300.0;
