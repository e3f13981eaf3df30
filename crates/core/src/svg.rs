//! SVG renderer: converts `RenderCommand` lists into standalone SVG strings.

use std::fmt::Write;

use inkfield_protocol::{RenderCommand, Theme, ThemeToken};

use crate::palette;

/// Render a list of commands as an SVG document string.
///
/// `width` and `height` define the SVG viewBox dimensions in logical units.
/// `theme` selects the color palette.
pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64, theme: Theme) -> String {
    let mut svg = String::with_capacity(commands.len() * 160 + 256);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}">"#,
    );

    let mut defs = String::new();
    let mut body = String::new();
    let mut gradient_id = 0usize;
    let mut open_groups = 0usize;

    for cmd in commands {
        match cmd {
            RenderCommand::Clear { .. } => {
                // SVG starts transparent; nothing to erase.
            }
            RenderCommand::FillRect { rect, color, alpha } => {
                let _ = write!(
                    body,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"{}/>"#,
                    rect.x,
                    rect.y,
                    rect.w,
                    rect.h,
                    fill(*color, theme),
                    opacity("fill-opacity", *alpha),
                );
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width: line_width,
                alpha,
            } => {
                let _ = write!(
                    body,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{line_width}"{}/>"#,
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    fill(*color, theme),
                    opacity("stroke-opacity", *alpha),
                );
            }
            RenderCommand::FillCircle {
                center,
                radius,
                color,
                alpha,
            } => {
                let _ = write!(
                    body,
                    r#"<circle cx="{}" cy="{}" r="{radius}" fill="{}"{}/>"#,
                    center.x,
                    center.y,
                    fill(*color, theme),
                    opacity("fill-opacity", *alpha),
                );
            }
            RenderCommand::StrokeQuadratic {
                from,
                control,
                to,
                color,
                width: line_width,
                alpha,
            } => {
                let _ = write!(
                    body,
                    r#"<path d="M{} {} Q{} {} {} {}" fill="none" stroke="{}" stroke-width="{line_width}" stroke-linecap="round" stroke-linejoin="round"{}/>"#,
                    from.x,
                    from.y,
                    control.x,
                    control.y,
                    to.x,
                    to.y,
                    fill(*color, theme),
                    opacity("stroke-opacity", *alpha),
                );
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
                gradient_id += 1;
                let stop = fill(*color, theme);
                let _ = write!(
                    defs,
                    r##"<radialGradient id="g{gradient_id}"><stop offset="0" stop-color="{stop}" stop-opacity="{alpha}"/><stop offset="1" stop-color="#ffffff" stop-opacity="0"/></radialGradient>"##,
                );
                let _ = write!(
                    body,
                    r#"<circle cx="{}" cy="{}" r="{radius}" fill="url(#g{gradient_id})"/>"#,
                    center.x, center.y,
                );
            }
            RenderCommand::PushTransform { translate, scale } => {
                open_groups += 1;
                let _ = write!(
                    body,
                    r#"<g transform="translate({} {}) scale({} {})">"#,
                    translate.x, translate.y, scale.x, scale.y,
                );
            }
            RenderCommand::PopTransform => {
                if open_groups > 0 {
                    open_groups -= 1;
                    body.push_str("</g>");
                }
            }
            // Logical groups don't affect static SVG output
            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
    }

    for _ in 0..open_groups {
        body.push_str("</g>");
    }

    if !defs.is_empty() {
        svg.push_str("<defs>");
        svg.push_str(&defs);
        svg.push_str("</defs>");
    }
    svg.push_str(&body);
    svg.push_str("</svg>");
    svg
}

fn fill(token: ThemeToken, theme: Theme) -> String {
    palette::hex(token, theme)
}

fn opacity(attr: &str, alpha: f32) -> String {
    if alpha >= 1.0 {
        String::new()
    } else {
        format!(r#" {attr}="{alpha}""#)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkfield_protocol::{Point, Rect};

    #[test]
    fn basic_svg_output() {
        let commands = vec![RenderCommand::FillRect {
            rect: Rect::new(10.0, 20.0, 100.0, 18.0),
            color: ThemeToken::Particle,
            alpha: 1.0,
        }];
        let svg = render_svg(&commands, 800.0, 400.0, Theme::Dark);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("#a78bfa"));
        assert!(!svg.contains("fill-opacity"));
    }

    #[test]
    fn gradients_get_unique_defs() {
        let blob = |x: f64| RenderCommand::FillRadialGradient {
            center: Point::new(x, 50.0),
            radius: 30.0,
            color: ThemeToken::AuroraViolet,
            alpha: 0.12,
        };
        let svg = render_svg(&[blob(10.0), blob(90.0)], 100.0, 100.0, Theme::Light);
        assert!(svg.contains(r#"id="g1""#));
        assert!(svg.contains(r#"id="g2""#));
        assert!(svg.contains(r#"stop-opacity="0.12""#));
    }

    #[test]
    fn unbalanced_transforms_are_closed() {
        let commands = vec![RenderCommand::PushTransform {
            translate: Point::new(0.0, 0.0),
            scale: Point::new(2.0, 2.0),
        }];
        let svg = render_svg(&commands, 10.0, 10.0, Theme::Light);
        assert!(svg.ends_with("</g></svg>"));
    }
}
