use serde::{Deserialize, Serialize};

/// Something a controller needs the host environment to do.
///
/// Controllers never touch the window or document directly. They allocate
/// an id for every frame, timer, and listener they acquire and describe it
/// here; the host mirrors those ids so that teardown can release exactly
/// what was acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostRequest {
    /// Schedule one animation-frame callback.
    RequestFrame { id: u64 },
    /// Cancel a previously requested frame that has not fired.
    CancelFrame { id: u64 },
    /// Fire `kind` once after `delay_ms`.
    ScheduleTimer { id: u64, kind: TimerKind, delay_ms: u32 },
    /// Cancel a pending timer.
    CancelTimer { id: u64 },
    /// Register a listener on a host-level resource.
    AttachListener { id: u64, kind: ListenerKind },
    /// Remove a listener registered with `AttachListener`.
    DetachListener { id: u64 },
}

/// Host listeners the controllers rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerKind {
    /// Resize observer on the container element.
    ContainerResize,
    /// Window-level pointer movement.
    PointerMove,
    /// Document-level non-passive touch listeners that cancel the default
    /// scrolling behavior.
    TouchStartSuppressor,
    TouchMoveSuppressor,
    TouchEndSuppressor,
}

/// Deferred work a controller can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Measure the surface again (layout not ready yet).
    MeasureSurface,
    /// Apply a debounced container resize.
    ResizeDebounce,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_serialize_with_op_tag() {
        let req = HostRequest::ScheduleTimer {
            id: 7,
            kind: TimerKind::MeasureSurface,
            delay_ms: 50,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(
            json,
            r#"{"op":"schedule_timer","id":7,"kind":"measure_surface","delay_ms":50}"#
        );
        let back: HostRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);
    }
}
