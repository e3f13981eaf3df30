use inkfield_protocol::{HostRequest, LayoutSize, ListenerKind, TimerKind};
use tracing::{debug, trace};

use super::SignaturePad;
use crate::constants::{INITIAL_MEASURE_DELAY_MS, MEASURE_RETRY_DELAY_MS};
use crate::host::HostBindings;
use crate::surface::{SurfaceError, SurfaceMetrics};

const TOUCH_SUPPRESSORS: [ListenerKind; 3] = [
    ListenerKind::TouchStartSuppressor,
    ListenerKind::TouchMoveSuppressor,
    ListenerKind::TouchEndSuppressor,
];

/// A signature pad mounted in a host container.
///
/// The pad only exists once the container reports a real size; until
/// then the controller keeps re-measuring.
#[derive(Debug)]
pub struct SignatureController {
    bindings: HostBindings,
    device_pixel_ratio: f64,
    pad: Option<SignaturePad>,
    mounted: bool,
}

impl SignatureController {
    pub fn new(device_pixel_ratio: f64) -> Self {
        Self {
            bindings: HostBindings::new(),
            device_pixel_ratio,
            pad: None,
            mounted: false,
        }
    }

    /// Attach the touch-scroll suppressors and schedule the first
    /// measurement.
    pub fn mount(&mut self) -> Vec<HostRequest> {
        let mut out = Vec::new();
        if self.mounted {
            return out;
        }
        self.mounted = true;
        for kind in TOUCH_SUPPRESSORS {
            self.bindings.attach(kind, &mut out);
        }
        self.bindings
            .schedule_timer(TimerKind::MeasureSurface, INITIAL_MEASURE_DELAY_MS, &mut out);
        out
    }

    /// Handle a fired timer. `layout` is the container's current size.
    pub fn on_timer(&mut self, id: u64, layout: LayoutSize) -> Vec<HostRequest> {
        let mut out = Vec::new();
        if self.bindings.timer_fired(id) != Some(TimerKind::MeasureSurface) {
            return out;
        }
        match SurfaceMetrics::from_layout(layout, self.device_pixel_ratio) {
            Ok(metrics) => {
                debug!(
                    width = metrics.backing_width(),
                    height = metrics.backing_height(),
                    "signature surface ready"
                );
                match &mut self.pad {
                    Some(pad) => pad.resize(metrics),
                    None => self.pad = Some(SignaturePad::new(metrics)),
                }
            }
            Err(SurfaceError::Degenerate { width, height }) => {
                trace!(width, height, "signature surface not laid out yet, retrying");
                self.bindings
                    .schedule_timer(TimerKind::MeasureSurface, MEASURE_RETRY_DELAY_MS, &mut out);
            }
        }
        out
    }

    /// Whether a touch event's default scrolling should be cancelled.
    pub fn should_suppress_touch(&self, on_surface: bool) -> bool {
        on_surface || self.pad.as_ref().is_some_and(SignaturePad::is_drawing)
    }

    pub fn pad(&self) -> Option<&SignaturePad> {
        self.pad.as_ref()
    }

    pub fn pad_mut(&mut self) -> Option<&mut SignaturePad> {
        self.pad.as_mut()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Cancel pending measurements and detach every suppressor.
    pub fn unmount(&mut self) -> Vec<HostRequest> {
        self.mounted = false;
        self.pad = None;
        self.bindings.release_all()
    }

    pub fn listeners(&self) -> impl Iterator<Item = ListenerKind> + '_ {
        self.bindings.listeners()
    }
}
