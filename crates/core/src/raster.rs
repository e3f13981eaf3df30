//! Software rasterizer: turns `RenderCommand` lists into RGBA pixels.
//!
//! Anti-aliasing is coverage-by-distance: every primitive is treated as a
//! shape with a signed distance and blended with a one-pixel ramp at its
//! edge. Good enough for ink and soft decorations, which is all the core
//! ever draws.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError, RgbaImage};
use inkfield_protocol::{Point, Rect, RenderCommand, Theme, ThemeToken};

use crate::palette;

/// Segments used to flatten one quadratic curve.
const CURVE_STEPS: usize = 16;

#[derive(Debug, Clone, Copy)]
struct Transform {
    tx: f64,
    ty: f64,
    sx: f64,
    sy: f64,
}

impl Transform {
    fn scale(s: f64) -> Self {
        Self {
            tx: 0.0,
            ty: 0.0,
            sx: s,
            sy: s,
        }
    }

    fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.sx + self.tx, p.y * self.sy + self.ty)
    }

    fn apply_len(&self, len: f64) -> f64 {
        len * (self.sx.abs() + self.sy.abs()) / 2.0
    }

    fn apply_rect(&self, r: Rect) -> Rect {
        let p = self.apply(Point::new(r.x, r.y));
        Rect::new(p.x, p.y, r.w * self.sx, r.h * self.sy)
    }
}

/// Straight-alpha float canvas.
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 4]>,
    theme: Theme,
}

impl Canvas {
    pub fn new(width: u32, height: u32, theme: Theme) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0.0; 4]; width as usize * height as usize],
            theme,
        }
    }

    /// Draw `commands`, with logical units mapped to pixels by `scale`.
    pub fn draw(&mut self, commands: &[RenderCommand], scale: f64) {
        let mut stack = vec![Transform::scale(scale)];
        for cmd in commands {
            let tf = stack.last().copied().unwrap_or(Transform::scale(scale));
            match cmd {
                RenderCommand::Clear { rect } => self.clear_rect(tf.apply_rect(*rect)),
                RenderCommand::FillRect { rect, color, alpha } => {
                    let r = tf.apply_rect(*rect);
                    let rgb = self.rgb(*color);
                    self.cover(r.x, r.y, r.x + r.w, r.y + r.h, rgb, |px, py| {
                        let inside = px >= r.x && px < r.x + r.w && py >= r.y && py < r.y + r.h;
                        if inside { *alpha } else { 0.0 }
                    });
                }
                RenderCommand::FillCircle {
                    center,
                    radius,
                    color,
                    alpha,
                } => {
                    let c = tf.apply(*center);
                    let r = tf.apply_len(*radius);
                    let rgb = self.rgb(*color);
                    let reach = r + 1.0;
                    self.cover(c.x - reach, c.y - reach, c.x + reach, c.y + reach, rgb, |px, py| {
                        let d = (px - c.x).hypot(py - c.y);
                        alpha * edge(r - d)
                    });
                }
                RenderCommand::DrawLine {
                    from,
                    to,
                    color,
                    width,
                    alpha,
                } => {
                    let pts = [tf.apply(*from), tf.apply(*to)];
                    let half = (tf.apply_len(*width) / 2.0).max(0.5);
                    let rgb = self.rgb(*color);
                    self.stroke_polyline(&pts, half, rgb, *alpha);
                }
                RenderCommand::StrokeQuadratic {
                    from,
                    control,
                    to,
                    color,
                    width,
                    alpha,
                } => {
                    let pts = flatten_quadratic(tf.apply(*from), tf.apply(*control), tf.apply(*to));
                    let half = (tf.apply_len(*width) / 2.0).max(0.5);
                    let rgb = self.rgb(*color);
                    self.stroke_polyline(&pts, half, rgb, *alpha);
                }
                RenderCommand::FillRadialGradient {
                    center,
                    radius,
                    color,
                    alpha,
                } => {
                    let c = tf.apply(*center);
                    let r = tf.apply_len(*radius);
                    if !c.is_finite() || !r.is_finite() || r <= 0.0 {
                        continue;
                    }
                    let rgb = self.rgb(*color);
                    self.cover(c.x - r, c.y - r, c.x + r, c.y + r, rgb, |px, py| {
                        let t = (px - c.x).hypot(py - c.y) / r;
                        if t < 1.0 { alpha * (1.0 - t) as f32 } else { 0.0 }
                    });
                }
                RenderCommand::PushTransform { translate, scale } => {
                    stack.push(Transform {
                        tx: tf.tx + translate.x * tf.sx,
                        ty: tf.ty + translate.y * tf.sy,
                        sx: tf.sx * scale.x,
                        sy: tf.sy * scale.y,
                    });
                }
                RenderCommand::PopTransform => {
                    if stack.len() > 1 {
                        stack.pop();
                    }
                }
                RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
            }
        }
    }

    fn rgb(&self, token: ThemeToken) -> [f32; 3] {
        palette::resolve(token, self.theme).map(|c| f32::from(c) / 255.0)
    }

    fn clear_rect(&mut self, r: Rect) {
        let Some((x0, y0, x1, y1)) = self.clip(r.x, r.y, r.x + r.w, r.y + r.h) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                self.pixels[y * self.width as usize + x] = [0.0; 4];
            }
        }
    }

    fn stroke_polyline(&mut self, pts: &[Point], half: f64, rgb: [f32; 3], alpha: f32) {
        if pts.iter().any(|p| !p.is_finite()) {
            return;
        }
        let (mut x0, mut y0) = (f64::INFINITY, f64::INFINITY);
        let (mut x1, mut y1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in pts {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        let pad = half + 1.0;
        self.cover(x0 - pad, y0 - pad, x1 + pad, y1 + pad, rgb, |px, py| {
            let p = Point::new(px, py);
            let d = pts
                .windows(2)
                .map(|seg| segment_distance(p, seg[0], seg[1]))
                .fold(f64::INFINITY, f64::min);
            alpha * edge(half - d)
        });
    }

    /// Integer pixel range covering the given float bounds, clipped.
    fn clip(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> Option<(usize, usize, usize, usize)> {
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            return None;
        }
        let cx0 = x0.floor().max(0.0) as usize;
        let cy0 = y0.floor().max(0.0) as usize;
        let cx1 = (x1.ceil().max(0.0) as usize).min(self.width as usize);
        let cy1 = (y1.ceil().max(0.0) as usize).min(self.height as usize);
        (cx0 < cx1 && cy0 < cy1).then_some((cx0, cy0, cx1, cy1))
    }

    /// Blend `rgb` over every pixel in the bounds, weighted by `coverage`
    /// evaluated at the pixel center.
    fn cover<F>(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, rgb: [f32; 3], coverage: F)
    where
        F: Fn(f64, f64) -> f32,
    {
        let Some((cx0, cy0, cx1, cy1)) = self.clip(x0, y0, x1, y1) else {
            return;
        };
        for y in cy0..cy1 {
            for x in cx0..cx1 {
                let a = coverage(x as f64 + 0.5, y as f64 + 0.5).clamp(0.0, 1.0);
                if a > 0.0 {
                    let idx = y * self.width as usize + x;
                    self.pixels[idx] = blend(self.pixels[idx], rgb, a);
                }
            }
        }
    }

    pub fn into_image(self) -> RgbaImage {
        let mut img = RgbaImage::new(self.width, self.height);
        for (dst, src) in img.pixels_mut().zip(self.pixels) {
            dst.0 = src.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        }
        img
    }
}

/// Source-over blend in straight alpha.
fn blend(dst: [f32; 4], rgb: [f32; 3], a: f32) -> [f32; 4] {
    let out_a = a + dst[3] * (1.0 - a);
    if out_a <= 0.0 {
        return [0.0; 4];
    }
    let mix = |s: f32, d: f32| (s * a + d * dst[3] * (1.0 - a)) / out_a;
    [mix(rgb[0], dst[0]), mix(rgb[1], dst[1]), mix(rgb[2], dst[2]), out_a]
}

/// One-pixel coverage ramp around a signed distance (positive = inside).
fn edge(signed: f64) -> f32 {
    (signed + 0.5).clamp(0.0, 1.0) as f32
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance_to(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Sample a quadratic Bezier into a polyline.
pub fn flatten_quadratic(from: Point, control: Point, to: Point) -> Vec<Point> {
    (0..=CURVE_STEPS)
        .map(|i| {
            let t = i as f64 / CURVE_STEPS as f64;
            let u = 1.0 - t;
            Point::new(
                u * u * from.x + 2.0 * u * t * control.x + t * t * to.x,
                u * u * from.y + 2.0 * u * t * control.y + t * t * to.y,
            )
        })
        .collect()
}

/// Rasterize a command list onto a transparent `width`×`height` image.
pub fn rasterize(
    commands: &[RenderCommand],
    width: u32,
    height: u32,
    scale: f64,
    theme: Theme,
) -> RgbaImage {
    let mut canvas = Canvas::new(width, height, theme);
    canvas.draw(commands, scale);
    canvas.into_image()
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ImageError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_is_opaque() {
        let img = rasterize(
            &[RenderCommand::FillRect {
                rect: Rect::sized(4.0, 4.0),
                color: ThemeToken::PadBackground,
                alpha: 1.0,
            }],
            4,
            4,
            1.0,
            Theme::Light,
        );
        assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn scale_maps_logical_to_backing_pixels() {
        let img = rasterize(
            &[RenderCommand::FillCircle {
                center: Point::new(10.0, 10.0),
                radius: 2.0,
                color: ThemeToken::Ink,
                alpha: 1.0,
            }],
            40,
            40,
            1.5,
            Theme::Light,
        );
        // Logical (10, 10) lands on backing (15, 15).
        assert_eq!(img.get_pixel(15, 15).0[3], 255);
        assert_eq!(img.get_pixel(5, 5).0[3], 0);
    }

    #[test]
    fn quadratic_stroke_marks_its_path() {
        let img = rasterize(
            &[RenderCommand::StrokeQuadratic {
                from: Point::new(2.0, 10.0),
                control: Point::new(10.0, 10.0),
                to: Point::new(18.0, 10.0),
                color: ThemeToken::Ink,
                width: 3.0,
                alpha: 1.0,
            }],
            20,
            20,
            1.0,
            Theme::Light,
        );
        assert!(img.get_pixel(10, 10).0[3] > 200);
        assert_eq!(img.get_pixel(10, 2).0[3], 0);
    }

    #[test]
    fn non_finite_gradient_is_skipped() {
        let img = rasterize(
            &[RenderCommand::FillRadialGradient {
                center: Point::new(f64::NAN, 0.0),
                radius: 10.0,
                color: ThemeToken::AuroraBlue,
                alpha: 0.5,
            }],
            8,
            8,
            1.0,
            Theme::Dark,
        );
        assert!(img.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn png_has_signature_bytes() {
        let img = RgbaImage::new(3, 2);
        let png = encode_png(&img).unwrap();
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    }
}
