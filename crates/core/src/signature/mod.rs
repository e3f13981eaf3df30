//! Freehand signature capture.
//!
//! Pointer samples become variable-width ink: width follows pen velocity
//! through an exponential filter and every segment is drawn as a quadratic
//! curve over a three-point sliding window. Export rejects strokes too
//! short to be a real signature.

pub mod controller;
pub mod dialog;
pub mod pad;
pub mod width;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use controller::SignatureController;
pub use dialog::{Callbacks, SignatureConsumer, SignatureDialog};
pub use pad::SignaturePad;

/// One pointer sample in surface-relative logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    /// Capture time in milliseconds.
    pub t: f64,
}

impl StrokePoint {
    pub fn new(x: f64, y: f64, t: f64) -> Self {
        Self { x, y, t }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.t.is_finite()
    }

    pub fn position(&self) -> inkfield_protocol::Point {
        inkfield_protocol::Point::new(self.x, self.y)
    }
}

/// An exported signature. The engine keeps no reference to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureImage {
    /// PNG-encoded pixels.
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signature too short ({length:.0} of {required:.0}); please sign your full name")]
    TooShort { length: f64, required: f64 },
    #[error("signature surface is not ready")]
    NotReady,
    #[error("failed to encode signature: {0}")]
    Encode(#[from] image::ImageError),
}
