use inkfield_protocol::{HostRequest, LayoutSize, ListenerKind, Point, RenderCommand, TimerKind};
use serde::Serialize;
use tracing::{debug, trace};

use super::{FieldOptions, ParticleField, PointerThrottle, ResizeFilter, static_backdrop};
use crate::constants::{MEASURE_RETRY_DELAY_MS, RESIZE_DEBOUNCE_MS};
use crate::host::HostBindings;
use crate::surface::SurfaceMetrics;

/// Lifecycle of a mounted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldState {
    Uninitialized,
    /// Seeded for a real viewport, first frame not yet requested.
    Sized,
    Running,
    /// Low-capability device: only the static backdrop is drawn.
    Static,
    Disposed,
}

/// What the host should draw and do after a callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameOutput {
    pub commands: Vec<RenderCommand>,
    pub requests: Vec<HostRequest>,
}

impl FrameOutput {
    fn requests(requests: Vec<HostRequest>) -> Self {
        Self {
            commands: Vec::new(),
            requests,
        }
    }
}

/// Drives a [`ParticleField`] through mount, resize, frames, and teardown.
///
/// Every host resource is requested as a [`HostRequest`] and tracked, so
/// [`dispose`](Self::dispose) can release all of it at once.
#[derive(Debug)]
pub struct FieldController {
    options: FieldOptions,
    device_pixel_ratio: f64,
    seed: u64,
    state: FieldState,
    bindings: HostBindings,
    field: Option<ParticleField>,
    resize: ResizeFilter,
    throttle: PointerThrottle,
}

impl FieldController {
    pub fn new(options: FieldOptions, device_pixel_ratio: f64, seed: u64) -> Self {
        Self {
            options,
            device_pixel_ratio,
            seed,
            state: FieldState::Uninitialized,
            bindings: HostBindings::new(),
            field: None,
            resize: ResizeFilter::new(),
            throttle: PointerThrottle::new(),
        }
    }

    /// Mount into a container currently laid out at `layout`.
    ///
    /// Low-capability devices go straight to [`FieldState::Static`] and get
    /// the backdrop back without acquiring anything from the host.
    pub fn mount(&mut self, layout: LayoutSize) -> FrameOutput {
        if self.state != FieldState::Uninitialized || self.listeners().next().is_some() {
            return FrameOutput::default();
        }
        if self.options.low_capability {
            debug!("low-capability device, showing static backdrop");
            self.state = FieldState::Static;
            return FrameOutput {
                commands: self.static_layer(layout),
                requests: Vec::new(),
            };
        }

        let mut out = Vec::new();
        self.bindings.attach(ListenerKind::ContainerResize, &mut out);
        self.bindings.attach(ListenerKind::PointerMove, &mut out);
        self.try_size(layout, &mut out);
        FrameOutput::requests(out)
    }

    /// Seed for `layout` and start the loop, or retry measurement later.
    fn try_size(&mut self, layout: LayoutSize, out: &mut Vec<HostRequest>) {
        let Ok(metrics) = SurfaceMetrics::from_layout(layout, self.device_pixel_ratio) else {
            trace!(
                width = layout.width,
                height = layout.height,
                "field not laid out yet, retrying"
            );
            self.bindings
                .schedule_timer(TimerKind::MeasureSurface, MEASURE_RETRY_DELAY_MS, out);
            return;
        };
        self.field = Some(ParticleField::new(
            metrics.viewport(),
            self.options.theme,
            self.seed,
        ));
        self.resize.commit(layout);
        self.state = FieldState::Sized;
        debug!(width = layout.width, height = layout.height, "field sized");

        self.bindings.request_frame(out);
        self.state = FieldState::Running;
    }

    /// The container reported a new size. Handling is debounced: each
    /// notification replaces the pending one.
    pub fn on_resize(&mut self) -> Vec<HostRequest> {
        let mut out = Vec::new();
        if !self.is_live() {
            return out;
        }
        self.bindings.cancel_timers(TimerKind::ResizeDebounce, &mut out);
        self.bindings
            .schedule_timer(TimerKind::ResizeDebounce, RESIZE_DEBOUNCE_MS, &mut out);
        out
    }

    /// Handle a fired timer. `layout` is the container's current size.
    pub fn on_timer(&mut self, id: u64, layout: LayoutSize) -> Vec<HostRequest> {
        let mut out = Vec::new();
        match self.bindings.timer_fired(id) {
            Some(TimerKind::MeasureSurface) if self.state == FieldState::Uninitialized => {
                self.try_size(layout, &mut out);
            }
            Some(TimerKind::ResizeDebounce) => self.apply_resize(layout),
            _ => {}
        }
        out
    }

    fn apply_resize(&mut self, layout: LayoutSize) {
        if !self.resize.should_reseed(layout) {
            trace!(width = layout.width, height = layout.height, "resize below threshold");
            return;
        }
        let Ok(metrics) = SurfaceMetrics::from_layout(layout, self.device_pixel_ratio) else {
            return;
        };
        if let Some(field) = &mut self.field {
            field.reseed(metrics.viewport());
            self.resize.commit(layout);
        }
    }

    /// A pointer sample in surface coordinates at host time `now` (ms).
    pub fn on_pointer_move(&mut self, x: f64, y: f64, now: f64) {
        if self.state != FieldState::Running || !self.throttle.accept(now) {
            return;
        }
        if let Some(field) = &mut self.field {
            field.set_pointer(Some(Point::new(x, y)));
        }
    }

    /// A requested animation frame fired.
    ///
    /// The next frame is requested even when this one was skipped, so the
    /// loop keeps yielding to the host scheduler.
    pub fn on_frame(&mut self, id: u64, now: f64) -> FrameOutput {
        if self.state != FieldState::Running || !self.bindings.frame_fired(id) {
            return FrameOutput::default();
        }
        let commands = self
            .field
            .as_mut()
            .and_then(|field| field.tick(now))
            .unwrap_or_default();
        let mut requests = Vec::new();
        self.bindings.request_frame(&mut requests);
        FrameOutput { commands, requests }
    }

    /// The static fallback layer for `layout`.
    pub fn static_layer(&self, layout: LayoutSize) -> Vec<RenderCommand> {
        match SurfaceMetrics::from_layout(layout, self.device_pixel_ratio) {
            Ok(metrics) => static_backdrop(&metrics.viewport(), self.options.theme),
            Err(_) => Vec::new(),
        }
    }

    /// Cancel the pending frame and timers and detach every listener.
    pub fn dispose(&mut self) -> Vec<HostRequest> {
        if self.state == FieldState::Disposed {
            return Vec::new();
        }
        debug!(state = ?self.state, "disposing field");
        self.state = FieldState::Disposed;
        self.field = None;
        self.bindings.release_all()
    }

    fn is_live(&self) -> bool {
        matches!(self.state, FieldState::Sized | FieldState::Running)
    }

    pub fn state(&self) -> FieldState {
        self.state
    }

    pub fn field(&self) -> Option<&ParticleField> {
        self.field.as_ref()
    }

    pub fn options(&self) -> FieldOptions {
        self.options
    }

    pub fn listeners(&self) -> impl Iterator<Item = ListenerKind> + '_ {
        self.bindings.listeners()
    }

    /// True once the controller holds nothing on the host.
    pub fn is_idle(&self) -> bool {
        self.bindings.is_idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkfield_protocol::Theme;

    fn controller() -> FieldController {
        FieldController::new(FieldOptions::default(), 1.0, 7)
    }

    fn frame_id(requests: &[HostRequest]) -> Option<u64> {
        requests.iter().find_map(|r| match r {
            HostRequest::RequestFrame { id } => Some(*id),
            _ => None,
        })
    }

    fn timer_id(requests: &[HostRequest]) -> Option<u64> {
        requests.iter().find_map(|r| match r {
            HostRequest::ScheduleTimer { id, .. } => Some(*id),
            _ => None,
        })
    }

    #[test]
    fn low_capability_never_starts() {
        let mut ctl = FieldController::new(
            FieldOptions {
                theme: Theme::Dark,
                low_capability: true,
            },
            2.0,
            1,
        );
        let out = ctl.mount(LayoutSize::new(390.0, 844.0));
        assert!(out.requests.is_empty());
        assert!(!out.commands.is_empty());
        assert_eq!(ctl.state(), FieldState::Static);
        assert!(ctl.field().is_none());
        assert!(ctl.on_resize().is_empty());
        assert_eq!(ctl.listeners().count(), 0);
    }

    #[test]
    fn mount_starts_loop_and_frames_reschedule() {
        let mut ctl = controller();
        let out = ctl.mount(LayoutSize::new(1200.0, 800.0));
        assert_eq!(ctl.state(), FieldState::Running);
        assert_eq!(ctl.listeners().count(), 2);

        let first = frame_id(&out.requests).unwrap();
        let drawn = ctl.on_frame(first, 0.0);
        assert!(!drawn.commands.is_empty());
        let second = frame_id(&drawn.requests).unwrap();

        // under budget: nothing drawn but still rescheduled
        let skipped = ctl.on_frame(second, 5.0);
        assert!(skipped.commands.is_empty());
        assert!(frame_id(&skipped.requests).is_some());

        // stale id
        assert_eq!(ctl.on_frame(first, 100.0), FrameOutput::default());
    }

    #[test]
    fn degenerate_mount_polls_until_sized() {
        let mut ctl = controller();
        let out = ctl.mount(LayoutSize::new(0.0, 0.0));
        assert_eq!(ctl.state(), FieldState::Uninitialized);
        let retry = timer_id(&out.requests).unwrap();

        let sized = ctl.on_timer(retry, LayoutSize::new(900.0, 700.0));
        assert_eq!(ctl.state(), FieldState::Running);
        assert!(frame_id(&sized).is_some());
    }

    #[test]
    fn resize_is_debounced_and_thresholded() {
        let mut ctl = controller();
        ctl.mount(LayoutSize::new(1200.0, 800.0));
        let before = ctl.field().unwrap().particles().to_vec();

        let first = ctl.on_resize();
        let second = ctl.on_resize();
        let first_timer = timer_id(&first).unwrap();
        assert!(second.contains(&HostRequest::CancelTimer { id: first_timer }));

        ctl.on_timer(timer_id(&second).unwrap(), LayoutSize::new(1230.0, 820.0));
        assert_eq!(ctl.field().unwrap().particles(), before.as_slice());

        let big = ctl.on_resize();
        ctl.on_timer(timer_id(&big).unwrap(), LayoutSize::new(1600.0, 900.0));
        let field = ctl.field().unwrap();
        assert_eq!(field.particles().len(), 60);
        assert_eq!(field.auroras().len(), 3);
    }

    #[test]
    fn pointer_is_throttled() {
        let mut ctl = controller();
        ctl.mount(LayoutSize::new(800.0, 600.0));
        assert_eq!(ctl.field().unwrap().pointer(), None);
        ctl.on_pointer_move(10.0, 10.0, 0.0);
        ctl.on_pointer_move(20.0, 20.0, 10.0);
        assert_eq!(ctl.field().unwrap().pointer(), Some(Point::new(10.0, 10.0)));
        ctl.on_pointer_move(30.0, 30.0, 30.0);
        assert_eq!(ctl.field().unwrap().pointer(), Some(Point::new(30.0, 30.0)));
    }

    #[test]
    fn dispose_releases_everything() {
        let mut ctl = controller();
        let mounted = ctl.mount(LayoutSize::new(1200.0, 800.0));
        let pending = ctl.on_resize();
        let released = ctl.dispose();

        for req in mounted.requests.iter().chain(&pending) {
            let undo = match *req {
                HostRequest::AttachListener { id, .. } => HostRequest::DetachListener { id },
                HostRequest::ScheduleTimer { id, .. } => HostRequest::CancelTimer { id },
                HostRequest::RequestFrame { id } => HostRequest::CancelFrame { id },
                _ => continue,
            };
            assert!(released.contains(&undo), "missing {undo:?}");
        }
        assert!(ctl.is_idle());
        assert_eq!(ctl.state(), FieldState::Disposed);
        assert!(ctl.dispose().is_empty());
    }
}
