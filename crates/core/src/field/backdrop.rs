use inkfield_protocol::{GroupKind, Point, Rect, RenderCommand, Theme, ThemeToken, Viewport};

use crate::constants::{BACKDROP_DOT_SPACING, BACKDROP_GLOW_INSET, BACKDROP_GLOW_RADIUS};

const DOT_RADIUS: f64 = 1.0;
const DOT_ALPHA: f32 = 0.03;

/// The static decorative layer shown instead of the simulation on
/// low-capability devices: a base fill, one soft corner glow, and a faint
/// dot pattern. Drawn once; nothing animates.
pub fn static_backdrop(viewport: &Viewport, theme: Theme) -> Vec<RenderCommand> {
    let (w, h) = (viewport.width, viewport.height);
    let cols = (w / BACKDROP_DOT_SPACING).ceil().max(0.0) as usize;
    let rows = (h / BACKDROP_DOT_SPACING).ceil().max(0.0) as usize;

    let mut commands = Vec::with_capacity(cols * rows + 4);
    commands.push(RenderCommand::BeginGroup {
        kind: GroupKind::Backdrop,
    });

    let bounds = Rect::sized(w, h);
    commands.push(match theme {
        Theme::Light => RenderCommand::FillRect {
            rect: bounds,
            color: ThemeToken::Background,
            alpha: 1.0,
        },
        Theme::Dark => RenderCommand::Clear { rect: bounds },
    });

    commands.push(RenderCommand::FillRadialGradient {
        center: Point::new(w - BACKDROP_GLOW_INSET, BACKDROP_GLOW_INSET),
        radius: BACKDROP_GLOW_RADIUS,
        color: ThemeToken::BackdropGlow,
        alpha: match theme {
            Theme::Light => 0.2,
            Theme::Dark => 0.1,
        },
    });

    let half = BACKDROP_DOT_SPACING / 2.0;
    for row in 0..rows {
        for col in 0..cols {
            commands.push(RenderCommand::FillCircle {
                center: Point::new(
                    col as f64 * BACKDROP_DOT_SPACING + half,
                    row as f64 * BACKDROP_DOT_SPACING + half,
                ),
                radius: DOT_RADIUS,
                color: ThemeToken::BackdropDot,
                alpha: DOT_ALPHA,
            });
        }
    }

    commands.push(RenderCommand::EndGroup);
    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_pattern_tiles_the_viewport() {
        let cmds = static_backdrop(&Viewport::new(90.0, 60.0, 1.0), Theme::Light);
        let dots = cmds
            .iter()
            .filter(|c| matches!(c, RenderCommand::FillCircle { .. }))
            .count();
        assert_eq!(dots, 3 * 2);
        assert!(matches!(cmds[1], RenderCommand::FillRect { .. }));
    }

    #[test]
    fn dark_theme_clears_instead_of_filling() {
        let cmds = static_backdrop(&Viewport::new(90.0, 60.0, 1.0), Theme::Dark);
        assert!(matches!(cmds[1], RenderCommand::Clear { .. }));
    }
}
