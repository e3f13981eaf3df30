//! Cadence control: frame-rate governance and pointer throttling.

use crate::constants::{
    NARROW_TARGET_FPS, POINTER_THROTTLE_MS, WIDE_TARGET_FPS, WIDE_VIEWPORT_WIDTH,
};

pub fn target_fps(viewport_width: f64) -> f64 {
    if viewport_width < WIDE_VIEWPORT_WIDTH {
        NARROW_TARGET_FPS
    } else {
        WIDE_TARGET_FPS
    }
}

/// Decides which host frames actually run a simulation tick.
#[derive(Debug, Clone, Default)]
pub struct FrameGovernor {
    last_frame: Option<f64>,
}

impl FrameGovernor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the frame at `now` (ms) should run. Admitted frames keep the
    /// schedule's phase instead of drifting with host jitter.
    pub fn admit(&mut self, now: f64, viewport_width: f64) -> bool {
        let interval = 1000.0 / target_fps(viewport_width);
        let Some(last) = self.last_frame else {
            self.last_frame = Some(now);
            return true;
        };
        let delta = now - last;
        if delta < interval {
            return false;
        }
        self.last_frame = Some(now - delta % interval);
        true
    }
}

/// Drops pointer samples that arrive faster than the throttle interval.
#[derive(Debug, Clone, Default)]
pub struct PointerThrottle {
    last_sample: Option<f64>,
}

impl PointerThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, now: f64) -> bool {
        if let Some(last) = self.last_sample
            && now - last < POINTER_THROTTLE_MS
        {
            return false;
        }
        self.last_sample = Some(now);
        true
    }
}
