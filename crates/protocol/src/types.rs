use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Rect anchored at the origin.
    pub fn sized(w: f64, h: f64) -> Self {
        Self::new(0.0, 0.0, w, h)
    }
}

/// Laid-out size of a host container, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutSize {
    pub width: f64,
    pub height: f64,
}

impl LayoutSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// The drawable area a command list targets.
///
/// `width`/`height` are logical units; `dpr` is the (already capped)
/// backing-store scale the renderer should apply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, dpr: f64) -> Self {
        Self { width, height, dpr }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::sized(self.width, self.height)
    }
}
