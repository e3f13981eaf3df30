//! Velocity-driven stroke width.
//!
//! Faster pen motion draws thinner ink. The raw target width is passed
//! through an exponential filter so the line swells and thins smoothly
//! instead of jumping between samples.

use crate::constants::{MAX_STROKE_WIDTH, MIN_STROKE_WIDTH, VELOCITY_FILTER_WEIGHT};

/// Instantaneous velocity in logical px per millisecond.
///
/// A zero (or negative, from a misbehaving clock) elapsed time yields 0.
pub fn velocity(distance: f64, elapsed_ms: f64) -> f64 {
    if elapsed_ms > 0.0 {
        distance / elapsed_ms
    } else {
        0.0
    }
}

/// Width the stroke would take at `velocity` with no smoothing.
pub fn target_width(velocity: f64) -> f64 {
    (MAX_STROKE_WIDTH / (velocity + 1.0)).max(MIN_STROKE_WIDTH)
}

/// Blend the previous width toward the target for `velocity`.
pub fn smooth_width(previous: f64, velocity: f64) -> f64 {
    previous * VELOCITY_FILTER_WEIGHT + target_width(velocity) * (1.0 - VELOCITY_FILTER_WEIGHT)
}

/// Width used for the dot at the start of every stroke.
pub fn initial_width() -> f64 {
    (MIN_STROKE_WIDTH + MAX_STROKE_WIDTH) / 2.0
}
