use inkfield_protocol::{GroupKind, Rect, RenderCommand, Theme, ThemeToken};
use tracing::debug;

use super::width::{initial_width, smooth_width, velocity};
use super::{SignatureError, SignatureImage, StrokePoint};
use crate::constants::{MAX_STROKE_WIDTH, MIN_SIGNATURE_LENGTH};
use crate::raster;
use crate::surface::SurfaceMetrics;
use crate::svg;

/// The signature drawing surface and its stroke state.
///
/// Ink is retained as render commands in logical units; it is the pad's
/// "raster" and is only turned into pixels on export.
#[derive(Debug, Clone)]
pub struct SignaturePad {
    metrics: SurfaceMetrics,
    points: Vec<StrokePoint>,
    total_length: f64,
    last_width: f64,
    drawing: bool,
    ink: Vec<RenderCommand>,
}

impl SignaturePad {
    pub fn new(metrics: SurfaceMetrics) -> Self {
        Self {
            metrics,
            points: Vec::new(),
            total_length: 0.0,
            last_width: MAX_STROKE_WIDTH,
            drawing: false,
            ink: Vec::new(),
        }
    }

    /// Start a stroke at `point` and return the origin dot.
    ///
    /// The accumulated length restarts at zero; earlier ink stays visible.
    /// Samples with non-finite coordinates or time are ignored.
    pub fn begin_stroke(&mut self, point: StrokePoint) -> Option<RenderCommand> {
        if !point.is_finite() {
            debug!(?point, "ignoring non-finite stroke start");
            return None;
        }
        self.drawing = true;
        self.points.clear();
        self.points.push(point);
        self.total_length = 0.0;
        self.last_width = initial_width();

        let dot = RenderCommand::FillCircle {
            center: point.position(),
            radius: initial_width() / 2.0,
            color: ThemeToken::Ink,
            alpha: 1.0,
        };
        self.ink.push(dot.clone());
        Some(dot)
    }

    /// Append `point` to the active stroke.
    ///
    /// Returns the curve segment to draw, if any. Nothing is drawn until
    /// three points are available for the sliding window, and samples
    /// arriving with no active stroke, or with non-finite values, are
    /// ignored.
    pub fn extend_stroke(&mut self, point: StrokePoint) -> Option<RenderCommand> {
        if !self.drawing || !point.is_finite() {
            return None;
        }
        let previous = *self.points.last()?;
        self.points.push(point);

        let distance = previous.position().distance_to(point.position());
        self.total_length += distance;

        let n = self.points.len();
        if n < 3 {
            return None;
        }

        let speed = velocity(distance, point.t - previous.t);
        let width = smooth_width(self.last_width, speed);
        self.last_width = width;

        let start = self.points[n - 3].position();
        let control = previous.position();
        let segment = RenderCommand::StrokeQuadratic {
            from: start,
            control,
            to: control.midpoint(point.position()),
            color: ThemeToken::Ink,
            width,
            alpha: 1.0,
        };
        self.ink.push(segment.clone());
        Some(segment)
    }

    /// Stop drawing. Ink and accumulated length are kept for export.
    pub fn end_stroke(&mut self) {
        self.drawing = false;
    }

    /// Erase all ink and forget the stroke.
    pub fn clear(&mut self) {
        self.ink.clear();
        self.points.clear();
        self.total_length = 0.0;
        self.drawing = false;
    }

    /// Rasterize the pad to PNG, or reject a stroke that is too short.
    pub fn export_or_reject(&self) -> Result<SignatureImage, SignatureError> {
        self.check_length()?;
        let width = self.metrics.backing_width();
        let height = self.metrics.backing_height();
        let pixels = raster::rasterize(
            &self.page_commands(),
            width,
            height,
            self.metrics.scale(),
            Theme::Light,
        );
        let png = raster::encode_png(&pixels)?;
        debug!(width, height, bytes = png.len(), "exported signature");
        Ok(SignatureImage { png, width, height })
    }

    /// Vector copy of the current ink as a standalone SVG document,
    /// subject to the same length check as the PNG export.
    pub fn export_svg(&self) -> Result<String, SignatureError> {
        self.check_length()?;
        let layout = self.metrics.layout();
        Ok(svg::render_svg(
            &self.page_commands(),
            layout.width,
            layout.height,
            Theme::Light,
        ))
    }

    fn check_length(&self) -> Result<(), SignatureError> {
        if !self.total_length.is_finite() || self.total_length < MIN_SIGNATURE_LENGTH {
            debug!(length = self.total_length, "rejecting short signature");
            return Err(SignatureError::TooShort {
                length: self.total_length,
                required: MIN_SIGNATURE_LENGTH,
            });
        }
        Ok(())
    }

    /// Background plus ink, as drawn by [`export_or_reject`](Self::export_or_reject).
    fn page_commands(&self) -> Vec<RenderCommand> {
        let layout = self.metrics.layout();
        let mut commands = Vec::with_capacity(self.ink.len() + 3);
        commands.push(RenderCommand::FillRect {
            rect: Rect::sized(layout.width, layout.height),
            color: ThemeToken::PadBackground,
            alpha: 1.0,
        });
        commands.push(RenderCommand::BeginGroup {
            kind: GroupKind::Ink,
        });
        commands.extend(self.ink.iter().cloned());
        commands.push(RenderCommand::EndGroup);
        commands
    }

    /// Re-size the surface. Ink keeps its logical coordinates.
    pub fn resize(&mut self, metrics: SurfaceMetrics) {
        self.metrics = metrics;
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.ink
    }

    pub fn metrics(&self) -> &SurfaceMetrics {
        &self.metrics
    }

    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    pub fn last_width(&self) -> f64 {
        self.last_width
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkfield_protocol::{LayoutSize, Point};

    fn pad() -> SignaturePad {
        let metrics = SurfaceMetrics::from_layout(LayoutSize::new(480.0, 256.0), 1.0).unwrap();
        SignaturePad::new(metrics)
    }

    #[test]
    fn begin_draws_a_dot_sized_from_average_width() {
        let mut pad = pad();
        let dot = pad.begin_stroke(StrokePoint::new(10.0, 10.0, 0.0));
        match dot {
            Some(RenderCommand::FillCircle { radius, center, .. }) => {
                assert_eq!(radius * 2.0, 2.5);
                assert_eq!(center, Point::new(10.0, 10.0));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(pad.is_drawing());
        assert_eq!(pad.last_width(), 2.5);
    }

    #[test]
    fn first_two_points_only_accumulate() {
        let mut pad = pad();
        pad.begin_stroke(StrokePoint::new(0.0, 0.0, 0.0));
        assert!(pad.extend_stroke(StrokePoint::new(3.0, 4.0, 10.0)).is_none());
        assert_eq!(pad.total_length(), 5.0);
        assert!(pad.extend_stroke(StrokePoint::new(6.0, 8.0, 20.0)).is_some());
        assert_eq!(pad.total_length(), 10.0);
    }

    #[test]
    fn segment_uses_sliding_window() {
        let mut pad = pad();
        pad.begin_stroke(StrokePoint::new(0.0, 0.0, 0.0));
        pad.extend_stroke(StrokePoint::new(10.0, 0.0, 10.0));
        let seg = pad.extend_stroke(StrokePoint::new(20.0, 10.0, 20.0));
        match seg {
            Some(RenderCommand::StrokeQuadratic {
                from, control, to, ..
            }) => {
                assert_eq!(from, Point::new(0.0, 0.0));
                assert_eq!(control, Point::new(10.0, 0.0));
                assert_eq!(to, Point::new(15.0, 5.0));
            }
            other => panic!("unexpected segment {other:?}"),
        }
    }

    #[test]
    fn extend_without_stroke_is_ignored() {
        let mut pad = pad();
        assert!(pad.extend_stroke(StrokePoint::new(1.0, 1.0, 0.0)).is_none());
        assert!(pad.points().is_empty());

        pad.begin_stroke(StrokePoint::new(0.0, 0.0, 0.0));
        pad.end_stroke();
        assert!(pad.extend_stroke(StrokePoint::new(50.0, 0.0, 5.0)).is_none());
        assert_eq!(pad.total_length(), 0.0);
    }

    #[test]
    fn new_stroke_resets_length_but_keeps_ink() {
        let mut pad = pad();
        pad.begin_stroke(StrokePoint::new(0.0, 0.0, 0.0));
        pad.extend_stroke(StrokePoint::new(100.0, 0.0, 10.0));
        pad.end_stroke();
        let ink_before = pad.commands().len();

        pad.begin_stroke(StrokePoint::new(0.0, 50.0, 100.0));
        assert_eq!(pad.total_length(), 0.0);
        assert_eq!(pad.commands().len(), ink_before + 1);
    }

    #[test]
    fn non_finite_samples_are_dropped() {
        let mut pad = pad();
        assert!(pad.begin_stroke(StrokePoint::new(f64::NAN, 0.0, 0.0)).is_none());
        assert!(!pad.is_drawing());

        pad.begin_stroke(StrokePoint::new(10.0, 10.0, 0.0));
        pad.extend_stroke(StrokePoint::new(12.0, 11.0, 5.0));
        assert!(pad.extend_stroke(StrokePoint::new(f64::NAN, 11.0, 10.0)).is_none());
        assert!(pad.extend_stroke(StrokePoint::new(f64::INFINITY, 11.0, 15.0)).is_none());
        assert!(pad.extend_stroke(StrokePoint::new(14.0, 11.0, f64::NAN)).is_none());

        assert_eq!(pad.points().len(), 2);
        assert!(pad.total_length().is_finite());
        assert!(matches!(
            pad.export_or_reject(),
            Err(SignatureError::TooShort { .. })
        ));
    }

    #[test]
    fn short_stroke_gets_no_svg() {
        let mut pad = pad();
        pad.begin_stroke(StrokePoint::new(0.0, 0.0, 0.0));
        pad.extend_stroke(StrokePoint::new(2.0, 1.0, 10.0));
        pad.extend_stroke(StrokePoint::new(4.0, 3.0, 20.0));
        assert!(matches!(
            pad.export_svg(),
            Err(SignatureError::TooShort { .. })
        ));
    }

    #[test]
    fn svg_export_contains_ink() {
        let mut pad = pad();
        pad.begin_stroke(StrokePoint::new(0.0, 0.0, 0.0));
        for i in 1..=30 {
            let x = i as f64 * 10.0;
            pad.extend_stroke(StrokePoint::new(x, (i % 2) as f64 * 10.0, x));
        }
        let svg = pad.export_svg().unwrap();
        assert!(svg.contains("<circle"));
        assert!(svg.contains("<path"));
        assert!(svg.contains("#000000"));
    }
}
