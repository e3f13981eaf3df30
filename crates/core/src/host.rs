//! Bookkeeping for host resources a controller has acquired.

use inkfield_protocol::{HostRequest, ListenerKind, TimerKind};

/// Tracks every frame, timer, and listener a controller asked the host for,
/// so teardown can release all of them in one synchronous pass.
#[derive(Debug, Default)]
pub struct HostBindings {
    next_id: u64,
    pending_frame: Option<u64>,
    timers: Vec<(u64, TimerKind)>,
    listeners: Vec<(u64, ListenerKind)>,
}

impl HostBindings {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Request the next animation frame. Only one frame is ever pending.
    pub fn request_frame(&mut self, out: &mut Vec<HostRequest>) {
        if let Some(id) = self.pending_frame.take() {
            out.push(HostRequest::CancelFrame { id });
        }
        let id = self.allocate();
        self.pending_frame = Some(id);
        out.push(HostRequest::RequestFrame { id });
    }

    /// Mark the pending frame as delivered. Returns false for stale ids.
    pub fn frame_fired(&mut self, id: u64) -> bool {
        if self.pending_frame == Some(id) {
            self.pending_frame = None;
            true
        } else {
            false
        }
    }

    pub fn schedule_timer(&mut self, kind: TimerKind, delay_ms: u32, out: &mut Vec<HostRequest>) {
        let id = self.allocate();
        self.timers.push((id, kind));
        out.push(HostRequest::ScheduleTimer { id, kind, delay_ms });
    }

    /// Cancel every pending timer of `kind`.
    pub fn cancel_timers(&mut self, kind: TimerKind, out: &mut Vec<HostRequest>) {
        self.timers.retain(|&(id, k)| {
            if k == kind {
                out.push(HostRequest::CancelTimer { id });
                false
            } else {
                true
            }
        });
    }

    /// Mark a timer as fired and return its kind, or `None` if it was
    /// already cancelled.
    pub fn timer_fired(&mut self, id: u64) -> Option<TimerKind> {
        let idx = self.timers.iter().position(|&(t, _)| t == id)?;
        Some(self.timers.remove(idx).1)
    }

    pub fn attach(&mut self, kind: ListenerKind, out: &mut Vec<HostRequest>) {
        let id = self.allocate();
        self.listeners.push((id, kind));
        out.push(HostRequest::AttachListener { id, kind });
    }

    pub fn listeners(&self) -> impl Iterator<Item = ListenerKind> + '_ {
        self.listeners.iter().map(|&(_, kind)| kind)
    }

    /// Release everything still held: pending frame, timers, listeners.
    pub fn release_all(&mut self) -> Vec<HostRequest> {
        let mut out = Vec::with_capacity(1 + self.timers.len() + self.listeners.len());
        if let Some(id) = self.pending_frame.take() {
            out.push(HostRequest::CancelFrame { id });
        }
        out.extend(
            self.timers
                .drain(..)
                .map(|(id, _)| HostRequest::CancelTimer { id }),
        );
        out.extend(
            self.listeners
                .drain(..)
                .map(|(id, _)| HostRequest::DetachListener { id }),
        );
        out
    }

    /// True once nothing is held on the host.
    pub fn is_idle(&self) -> bool {
        self.pending_frame.is_none() && self.timers.is_empty() && self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_all_undoes_every_acquisition() {
        let mut bindings = HostBindings::new();
        let mut out = Vec::new();
        bindings.attach(ListenerKind::PointerMove, &mut out);
        bindings.attach(ListenerKind::ContainerResize, &mut out);
        bindings.schedule_timer(TimerKind::ResizeDebounce, 100, &mut out);
        bindings.request_frame(&mut out);
        assert_eq!(out.len(), 4);

        let released = bindings.release_all();
        assert_eq!(released.len(), 4);
        assert!(released.contains(&HostRequest::DetachListener { id: 1 }));
        assert!(released.contains(&HostRequest::DetachListener { id: 2 }));
        assert!(released.contains(&HostRequest::CancelTimer { id: 3 }));
        assert!(released.contains(&HostRequest::CancelFrame { id: 4 }));
        assert!(bindings.is_idle());
    }

    #[test]
    fn stale_frames_and_timers_are_ignored() {
        let mut bindings = HostBindings::new();
        let mut out = Vec::new();
        bindings.request_frame(&mut out);
        bindings.request_frame(&mut out);
        // The first frame was cancelled when the second was requested.
        assert_eq!(out[1], HostRequest::CancelFrame { id: 1 });
        assert!(!bindings.frame_fired(1));
        assert!(bindings.frame_fired(2));

        bindings.schedule_timer(TimerKind::MeasureSurface, 50, &mut out);
        bindings.cancel_timers(TimerKind::MeasureSurface, &mut out);
        assert_eq!(bindings.timer_fired(3), None);
    }
}
