use serde::{Deserialize, Serialize};

use crate::theme::ThemeToken;
use crate::types::{Point, Rect};

/// A single, stateless render instruction.
///
/// The core emits a `Vec<RenderCommand>` per frame or per stroke segment.
/// Renderers consume this list sequentially; each command carries all the
/// data it needs, so there is no fill/stroke/alpha state to leak between
/// commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Reset a region to fully transparent.
    Clear { rect: Rect },

    /// Fill a rectangle.
    FillRect {
        rect: Rect,
        color: ThemeToken,
        alpha: f32,
    },

    /// Stroke a straight segment.
    DrawLine {
        from: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
        alpha: f32,
    },

    /// Fill a full circle.
    FillCircle {
        center: Point,
        radius: f64,
        color: ThemeToken,
        alpha: f32,
    },

    /// Stroke a quadratic Bezier curve with round caps and joins.
    StrokeQuadratic {
        from: Point,
        control: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
        alpha: f32,
    },

    /// Fill a disc with a radial gradient running from `color` at `alpha` in
    /// the center to fully transparent at `radius`.
    FillRadialGradient {
        center: Point,
        radius: f64,
        color: ThemeToken,
        alpha: f32,
    },

    /// Push an affine transform (applied to all subsequent commands until
    /// the matching `PopTransform`).
    PushTransform { translate: Point, scale: Point },

    /// Pop the most recent transform.
    PopTransform,

    /// Begin a logical group. Renderers may use this for batching or layer
    /// separation.
    BeginGroup { kind: GroupKind },

    /// End the current group.
    EndGroup,
}

/// Layers emitted by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    ReferenceGrid,
    Auroras,
    Particles,
    Connections,
    Backdrop,
    Ink,
}
