use std::time::{Duration, Instant};

use inkfield_protocol::HostRequest;

/// Plays the host side of the request protocol with wall-clock timers and
/// a fixed frame cadence.
pub struct TerminalHost {
    epoch: Instant,
    frame: Option<u64>,
    timers: Vec<(u64, Instant)>,
    listeners: Vec<u64>,
}

pub enum Due {
    Frame(u64),
    Timer(u64),
}

impl TerminalHost {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            frame: None,
            timers: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Milliseconds since the host started, the clock handed to the core.
    pub fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    pub fn apply(&mut self, requests: &[HostRequest]) {
        for req in requests {
            match *req {
                HostRequest::RequestFrame { id } => self.frame = Some(id),
                HostRequest::CancelFrame { id } => {
                    if self.frame == Some(id) {
                        self.frame = None;
                    }
                }
                HostRequest::ScheduleTimer { id, delay_ms, .. } => {
                    let due = Instant::now() + Duration::from_millis(u64::from(delay_ms));
                    self.timers.push((id, due));
                }
                HostRequest::CancelTimer { id } => self.timers.retain(|&(t, _)| t != id),
                HostRequest::AttachListener { id, .. } => self.listeners.push(id),
                HostRequest::DetachListener { id } => self.listeners.retain(|&l| l != id),
            }
        }
    }

    /// The next due callback, timers first.
    pub fn next_due(&mut self) -> Option<Due> {
        let now = Instant::now();
        if let Some(idx) = self.timers.iter().position(|&(_, due)| due <= now) {
            let (id, _) = self.timers.remove(idx);
            return Some(Due::Timer(id));
        }
        self.frame.take().map(Due::Frame)
    }

    pub fn is_listening(&self) -> bool {
        !self.listeners.is_empty()
    }

    pub fn holds_nothing(&self) -> bool {
        self.frame.is_none() && self.timers.is_empty() && self.listeners.is_empty()
    }
}
