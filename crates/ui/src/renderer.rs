use egui::{Color32, CornerRadius, Mesh, Pos2, Rect, Shape, Stroke};
use inkfield_core::raster::flatten_quadratic;
use inkfield_protocol::{Point, RenderCommand, Theme};

use crate::theme;

/// Segments in the triangle fan approximating a radial gradient.
const GRADIENT_SEGMENTS: u32 = 48;

/// Transform state for PushTransform/PopTransform.
#[derive(Debug, Clone, Copy)]
struct Transform {
    tx: f64,
    ty: f64,
    sx: f64,
    sy: f64,
}

impl Transform {
    fn identity() -> Self {
        Self {
            tx: 0.0,
            ty: 0.0,
            sx: 1.0,
            sy: 1.0,
        }
    }

    fn apply(&self, p: Point, offset: Pos2) -> Pos2 {
        Pos2::new(
            (p.x * self.sx + self.tx) as f32 + offset.x,
            (p.y * self.sy + self.ty) as f32 + offset.y,
        )
    }

    fn scale_len(&self, len: f64) -> f32 {
        (len * self.sx.abs().max(self.sy.abs())) as f32
    }
}

/// Render a list of `RenderCommand` into an egui `Painter`.
///
/// `offset` is the top-left pixel position of the rendering area.
pub fn render_commands(
    painter: &egui::Painter,
    commands: &[RenderCommand],
    offset: Pos2,
    theme: Theme,
) {
    let mut transform_stack: Vec<Transform> = vec![Transform::identity()];

    for cmd in commands {
        let tf = transform_stack
            .last()
            .copied()
            .unwrap_or(Transform::identity());
        match cmd {
            RenderCommand::Clear { .. } => {
                // The panel frame already paints the themed background.
            }

            RenderCommand::FillRect { rect, color, alpha } => {
                let min = tf.apply(Point::new(rect.x, rect.y), offset);
                let max = tf.apply(Point::new(rect.x + rect.w, rect.y + rect.h), offset);
                painter.rect_filled(
                    Rect::from_two_pos(min, max),
                    CornerRadius::ZERO,
                    theme::color(*color, theme, *alpha),
                );
            }

            RenderCommand::DrawLine {
                from,
                to,
                color,
                width,
                alpha,
            } => {
                painter.line_segment(
                    [tf.apply(*from, offset), tf.apply(*to, offset)],
                    Stroke::new(tf.scale_len(*width), theme::color(*color, theme, *alpha)),
                );
            }

            RenderCommand::FillCircle {
                center,
                radius,
                color,
                alpha,
            } => {
                painter.circle_filled(
                    tf.apply(*center, offset),
                    tf.scale_len(*radius),
                    theme::color(*color, theme, *alpha),
                );
            }

            RenderCommand::StrokeQuadratic {
                from,
                control,
                to,
                color,
                width,
                alpha,
            } => {
                let points: Vec<Pos2> = flatten_quadratic(*from, *control, *to)
                    .into_iter()
                    .map(|p| tf.apply(p, offset))
                    .collect();
                let fill = theme::color(*color, theme, *alpha);
                let w = tf.scale_len(*width);
                // round caps so consecutive segments join without notches
                if let (Some(first), Some(last)) = (points.first(), points.last()) {
                    painter.circle_filled(*first, w / 2.0, fill);
                    painter.circle_filled(*last, w / 2.0, fill);
                }
                painter.add(Shape::line(points, Stroke::new(w, fill)));
            }

            RenderCommand::FillRadialGradient {
                center,
                radius,
                color,
                alpha,
            } => {
                if !center.is_finite() || !radius.is_finite() {
                    continue;
                }
                let c = tf.apply(*center, offset);
                let r = tf.scale_len(*radius);
                let inner = theme::color(*color, theme, *alpha);
                painter.add(Shape::mesh(radial_fan(c, r, inner)));
            }

            RenderCommand::PushTransform { translate, scale } => {
                let parent = tf;
                transform_stack.push(Transform {
                    tx: parent.tx + translate.x * parent.sx,
                    ty: parent.ty + translate.y * parent.sy,
                    sx: parent.sx * scale.x,
                    sy: parent.sy * scale.y,
                });
            }

            RenderCommand::PopTransform => {
                if transform_stack.len() > 1 {
                    transform_stack.pop();
                }
            }

            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {
                // Groups are semantic, no visual effect in egui
            }
        }
    }
}

/// Triangle fan from an opaque-ish center to a transparent rim; vertex
/// color interpolation gives the linear falloff.
fn radial_fan(center: Pos2, radius: f32, inner: Color32) -> Mesh {
    let mut mesh = Mesh::default();
    let rim = Color32::from_rgba_unmultiplied(inner.r(), inner.g(), inner.b(), 0);
    mesh.colored_vertex(center, inner);
    for i in 0..GRADIENT_SEGMENTS {
        let angle = i as f32 / GRADIENT_SEGMENTS as f32 * std::f32::consts::TAU;
        mesh.colored_vertex(center + radius * egui::vec2(angle.cos(), angle.sin()), rim);
    }
    for i in 0..GRADIENT_SEGMENTS {
        mesh.add_triangle(0, 1 + i, 1 + (i + 1) % GRADIENT_SEGMENTS);
    }
    mesh
}
