use inkfield_protocol::{Point, RenderCommand, ThemeToken};
use rand::Rng;

use super::GeometryError;
use super::seeding::AuroraPreset;
use crate::constants::AURORA_MARGIN;

/// A large soft glow drifting behind the particle network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aurora {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: ThemeToken,
    pub alpha: f32,
    pub vx: f64,
    pub vy: f64,
}

impl Aurora {
    pub fn random<R: Rng + ?Sized>(
        rng: &mut R,
        width: f64,
        height: f64,
        preset: AuroraPreset,
    ) -> Self {
        Self {
            x: rng.r#gen::<f64>() * width,
            y: rng.r#gen::<f64>() * height,
            radius: rng.r#gen::<f64>() * 300.0 + 200.0,
            color: preset.color,
            alpha: preset.alpha,
            vx: (rng.r#gen::<f64>() - 0.5) * 0.2,
            vy: (rng.r#gen::<f64>() - 0.5) * 0.2,
        }
    }

    /// The gradient fill for this blob.
    ///
    /// Fails on non-finite geometry; callers skip the blob for the frame.
    pub fn gradient(&self) -> Result<RenderCommand, GeometryError> {
        if !self.x.is_finite() || !self.y.is_finite() || !self.radius.is_finite() {
            return Err(GeometryError::NonFinite {
                x: self.x,
                y: self.y,
            });
        }
        Ok(RenderCommand::FillRadialGradient {
            center: Point::new(self.x, self.y),
            radius: self.radius,
            color: self.color,
            alpha: self.alpha,
        })
    }
}

/// Drift one aurora, reversing once its center is a margin past an edge.
pub fn step_aurora(a: &mut Aurora, width: f64, height: f64) {
    a.x += a.vx;
    a.y += a.vy;

    if a.x < -AURORA_MARGIN || a.x > width + AURORA_MARGIN {
        a.vx = -a.vx;
    }
    if a.y < -AURORA_MARGIN || a.y > height + AURORA_MARGIN {
        a.vy = -a.vy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(x: f64, y: f64, vx: f64) -> Aurora {
        Aurora {
            x,
            y,
            radius: 300.0,
            color: ThemeToken::AuroraBlue,
            alpha: 0.08,
            vx,
            vy: 0.0,
        }
    }

    #[test]
    fn reverses_past_margin() {
        let mut a = blob(1200.5, 100.0, 0.1);
        step_aurora(&mut a, 1000.0, 800.0);
        assert_eq!(a.vx, -0.1);

        let mut inside = blob(1150.0, 100.0, 0.1);
        step_aurora(&mut inside, 1000.0, 800.0);
        assert_eq!(inside.vx, 0.1);
    }

    #[test]
    fn non_finite_geometry_is_rejected() {
        let a = blob(f64::INFINITY, 0.0, 0.0);
        assert!(matches!(a.gradient(), Err(GeometryError::NonFinite { .. })));
        assert!(blob(10.0, 10.0, 0.0).gradient().is_ok());
    }
}
