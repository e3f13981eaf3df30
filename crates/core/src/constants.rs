//! Tuning constants carried over from empirical tuning.
//!
//! These are not derived values; keep them exact for behavioral parity.

// --- Surface ---

/// Upper bound on the backing-store scale factor.
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 1.5;
/// Delay before the first surface measurement after mount.
pub const INITIAL_MEASURE_DELAY_MS: u32 = 100;
/// Delay between measurements while layout reports a zero size.
pub const MEASURE_RETRY_DELAY_MS: u32 = 50;

// --- Signature ---

pub const MIN_STROKE_WIDTH: f64 = 1.0;
pub const MAX_STROKE_WIDTH: f64 = 4.0;
/// Weight of the previous width in the exponential width filter.
pub const VELOCITY_FILTER_WEIGHT: f64 = 0.7;
/// Minimum accumulated path length (logical px) for an acceptable signature.
pub const MIN_SIGNATURE_LENGTH: f64 = 250.0;

// --- Particle field ---

/// Width at or above which the field runs at full quality.
pub const WIDE_VIEWPORT_WIDTH: f64 = 1400.0;
/// Width at or above which the field uses the medium tier. Also the width
/// the reference grid must exceed to be drawn.
pub const MEDIUM_VIEWPORT_WIDTH: f64 = 1000.0;

pub const WIDE_TARGET_FPS: f64 = 60.0;
pub const NARROW_TARGET_FPS: f64 = 40.0;

pub const GRID_SPACING: f64 = 50.0;
pub const GRID_ALPHA: f32 = 0.02;

pub const SPATIAL_CELL_SIZE: f64 = 150.0;

/// Squared distance below which two particles are connected (~122 px).
pub const CONNECTION_DISTANCE_SQ: f64 = 15_000.0;
pub const MAX_CONNECTIONS_PER_PARTICLE: usize = 3;
/// Alpha of the connection stroke color itself.
pub const CONNECTION_COLOR_ALPHA: f32 = 0.12;
/// Alpha multiplier applied on top of the distance fade.
pub const CONNECTION_FADE_ALPHA: f64 = 0.3;

pub const POINTER_RADIUS: f64 = 100.0;
pub const POINTER_PUSH: f64 = 1.5;
/// Minimum interval between accepted pointer samples.
pub const POINTER_THROTTLE_MS: f64 = 24.0;

pub const PARTICLE_FADE_STEP: f32 = 0.01;

/// Auroras reverse once their center drifts this far past an edge.
pub const AURORA_MARGIN: f64 = 200.0;

/// Resize deltas below this in both dimensions are layout jitter.
pub const RESIZE_THRESHOLD: f64 = 50.0;
pub const RESIZE_DEBOUNCE_MS: u32 = 100;

// --- Static fallback ---

pub const BACKDROP_DOT_SPACING: f64 = 30.0;
/// Radius of the corner glow, including its blur falloff.
pub const BACKDROP_GLOW_RADIUS: f64 = 160.0;
pub const BACKDROP_GLOW_INSET: f64 = 100.0;
