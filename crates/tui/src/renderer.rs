use inkfield_core::palette;
use inkfield_core::raster::flatten_quadratic;
use inkfield_protocol::{GroupKind, RenderCommand, Theme, ThemeToken};
use ratatui::style::Color;
use ratatui::widgets::canvas::{Circle, Context, Line, Points};

/// Terminals have no alpha; faint colors are boosted so the field stays
/// visible on a cell grid.
const ALPHA_BOOST: f32 = 6.0;

/// Solid color for a fill token, used as the canvas background.
pub fn fill(token: ThemeToken, theme: Theme) -> Color {
    rgb(palette::resolve(token, theme))
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb(r, g, b)
}

/// Mix `token` over the theme background at `alpha`.
fn tint(token: ThemeToken, alpha: f32, theme: Theme) -> Color {
    let fg = palette::resolve(token, theme);
    let bg = palette::resolve(ThemeToken::Background, theme);
    let a = (alpha * ALPHA_BOOST).clamp(0.0, 1.0);
    let mix = |f: u8, b: u8| (f32::from(f) * a + f32::from(b) * (1.0 - a)).round() as u8;
    Color::Rgb(mix(fg[0], bg[0]), mix(fg[1], bg[1]), mix(fg[2], bg[2]))
}

/// Paint commands onto a canvas whose y axis points up over a logical
/// surface `height` units tall.
pub fn paint(ctx: &mut Context<'_>, commands: &[RenderCommand], height: f64, theme: Theme) {
    let flip = |y: f64| height - y;
    let mut skipping = false;

    for cmd in commands {
        match cmd {
            // Too dense for braille cells.
            RenderCommand::BeginGroup {
                kind: GroupKind::ReferenceGrid,
            } => skipping = true,
            RenderCommand::EndGroup => skipping = false,
            _ if skipping => {}
            RenderCommand::DrawLine {
                from,
                to,
                color,
                alpha,
                ..
            } => ctx.draw(&Line {
                x1: from.x,
                y1: flip(from.y),
                x2: to.x,
                y2: flip(to.y),
                color: tint(*color, *alpha, theme),
            }),
            RenderCommand::FillCircle {
                center,
                color,
                alpha,
                ..
            } => ctx.draw(&Points {
                coords: &[(center.x, flip(center.y))],
                color: tint(*color, alpha * 2.0, theme),
            }),
            RenderCommand::StrokeQuadratic {
                from,
                control,
                to,
                color,
                alpha,
                ..
            } => {
                let pts = flatten_quadratic(*from, *control, *to);
                for pair in pts.windows(2) {
                    ctx.draw(&Line {
                        x1: pair[0].x,
                        y1: flip(pair[0].y),
                        x2: pair[1].x,
                        y2: flip(pair[1].y),
                        color: tint(*color, *alpha, theme),
                    });
                }
            }
            RenderCommand::FillRadialGradient {
                center,
                radius,
                color,
                alpha,
            } => ctx.draw(&Circle {
                x: center.x,
                y: flip(center.y),
                radius: *radius,
                color: tint(*color, *alpha, theme),
            }),
            RenderCommand::Clear { .. }
            | RenderCommand::FillRect { .. }
            | RenderCommand::PushTransform { .. }
            | RenderCommand::PopTransform
            | RenderCommand::BeginGroup { .. } => {}
        }
    }
}
